use std::time::Duration;

use tokio::time::Instant;

/// Single pending deadline after which the status indicator is hidden.
///
/// Arming replaces any earlier deadline, so at most one countdown exists.
#[derive(Debug, Default)]
pub struct HideTimer {
    deadline: Option<Instant>,
}

impl HideTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm(&mut self, delay: Duration) {
        self.deadline = Some(Instant::now() + delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Resolves when the armed deadline passes; never resolves when unarmed
    pub async fn expired(&self) {
        match self.deadline {
            Some(deadline) => tokio::time::sleep_until(deadline).await,
            None => std::future::pending().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_arm_replaces_previous_deadline() {
        let mut timer = HideTimer::new();
        timer.arm(Duration::from_secs(3));
        let first = timer.deadline().unwrap();

        tokio::time::advance(Duration::from_millis(500)).await;
        timer.arm(Duration::from_secs(3));
        let second = timer.deadline().unwrap();

        assert_eq!(second - first, Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_resolves_after_delay() {
        let mut timer = HideTimer::new();
        timer.arm(Duration::from_secs(3));

        let start = Instant::now();
        timer.expired().await;
        assert!(start.elapsed() >= Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unarmed_timer_never_expires() {
        let timer = HideTimer::new();
        let result = tokio::time::timeout(Duration::from_secs(60), timer.expired()).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_cancel_disarms() {
        let mut timer = HideTimer::new();
        timer.arm(Duration::from_secs(3));
        timer.cancel();
        assert!(!timer.is_armed());
    }
}
