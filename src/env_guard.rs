use std::collections::HashMap;

/// Variables exported while a session is active
pub const INSTANCE_VAR: &str = "TERMCLIP_INSTANCE";
pub const DIR_VAR: &str = "TERMCLIP_DIR";
pub const HOOK_VAR: &str = "TERMCLIP_HOOK";

/// A mutable set of environment variables
pub trait Environment {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
}

/// The environment of the running process, inherited by anything it spawns
#[derive(Debug, Default)]
pub struct ProcessEnv;

impl Environment for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn set(&mut self, key: &str, value: &str) {
        // SAFETY: only called from the controller on the runtime thread; the
        // daemon's helper threads never read the environment.
        unsafe { std::env::set_var(key, value) }
    }

    fn remove(&mut self, key: &str) {
        // SAFETY: see `set`
        unsafe { std::env::remove_var(key) }
    }
}

/// In-memory environment for tests and dry runs
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MemoryEnv {
    vars: HashMap<String, String>,
}

impl MemoryEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_var(mut self, key: &str, value: &str) -> Self {
        self.vars.insert(key.to_string(), value.to_string());
        self
    }
}

impl Environment for MemoryEnv {
    fn get(&self, key: &str) -> Option<String> {
        self.vars.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.vars.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.vars.remove(key);
    }
}

/// Reversible environment mutation.
///
/// `apply` records the prior value of every variable once, then sets the
/// new values. `revert` restores exactly what was recorded. Both are no-ops
/// when already in the target state.
#[derive(Debug, Clone)]
pub struct EnvGuard {
    vars: Vec<(String, String)>,
    saved: Option<Vec<(String, Option<String>)>>,
}

impl EnvGuard {
    pub fn new(vars: Vec<(String, String)>) -> Self {
        Self { vars, saved: None }
    }

    pub fn is_applied(&self) -> bool {
        self.saved.is_some()
    }

    pub fn apply(&mut self, env: &mut dyn Environment) {
        if self.saved.is_some() {
            return;
        }

        let saved = self
            .vars
            .iter()
            .map(|(key, _)| (key.clone(), env.get(key)))
            .collect();

        for (key, value) in &self.vars {
            env.set(key, value);
        }
        self.saved = Some(saved);
    }

    pub fn revert(&mut self, env: &mut dyn Environment) {
        let Some(saved) = self.saved.take() else {
            return;
        };

        for (key, previous) in saved {
            match previous {
                Some(value) => env.set(&key, &value),
                None => env.remove(&key),
            }
        }
    }
}
