//! Shell-side half of the drop-box protocol.
//!
//! The bridge is a POSIX `sh` script sourced into interactive shells. The
//! hook line passes the instance id, session directory and alias names as
//! assignments prefixed to `.`, since not every `sh` forwards arguments to a
//! sourced file. The script defines two functions: the copy alias writes stdin to a fresh drop
//! file, the tee alias does the same while passing stdin through to stdout.
//! Drop files are written as `<name>.part` and renamed to `<name>.tmp`, so
//! the daemon only ever observes complete files.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::error::SetupError;
use crate::session::InstanceId;

/// Glob the daemon watches for; matches the final name the bridge renames to
pub const DROP_FILE_PATTERN: &str = "*.tmp";

pub const BRIDGE_SCRIPT: &str = r#"# termclip shell bridge
# usage: termclip_instance=ID termclip_dir=DIR termclip_copy=NAME termclip_tee=NAME . BRIDGE

_termclip_instance="$termclip_instance"
_termclip_dir="$termclip_dir"

_termclip_next_name() {
    if [ ! -d "$_termclip_dir" ]; then
        echo "termclip: session $_termclip_instance is no longer active" >&2
        return 1
    fi
    printf '%s/%s%s' "$_termclip_dir" "$(date +%s)" \
        "$(od -An -N4 -tu4 /dev/urandom | tr -d ' \n')"
}

_termclip_copy() {
    _termclip_file="$(_termclip_next_name)" || return 1
    cat > "$_termclip_file.part" && mv "$_termclip_file.part" "$_termclip_file.tmp"
}

_termclip_tee() {
    _termclip_file="$(_termclip_next_name)" || return 1
    tee "$_termclip_file.part" && mv "$_termclip_file.part" "$_termclip_file.tmp"
}

unalias "$termclip_copy" 2>/dev/null
unalias "$termclip_tee" 2>/dev/null
eval "$termclip_copy() { _termclip_copy; }"
eval "$termclip_tee() { _termclip_tee; }"
"#;

static ALIAS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("alias regex is valid"));

/// Names of the two shell functions the bridge defines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aliases {
    pub copy: String,
    pub tee: String,
}

impl Aliases {
    pub fn new(copy: impl Into<String>, tee: impl Into<String>) -> Result<Self, SetupError> {
        let aliases = Self {
            copy: copy.into(),
            tee: tee.into(),
        };
        aliases.validate()?;
        Ok(aliases)
    }

    pub fn validate(&self) -> Result<(), SetupError> {
        validate_alias(&self.copy)?;
        validate_alias(&self.tee)?;
        if self.copy == self.tee {
            return Err(SetupError::DuplicateAlias(self.copy.clone()));
        }
        Ok(())
    }
}

/// Aliases are spliced into `eval`, so only shell identifiers are accepted
pub fn validate_alias(name: &str) -> Result<(), SetupError> {
    if ALIAS_RE.is_match(name) {
        Ok(())
    } else {
        Err(SetupError::InvalidAlias(name.to_string()))
    }
}

/// Quote a string for POSIX sh using single quotes
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// The line a shell evaluates to load the bridge for one session
pub fn hook_line(script: &Path, instance: &InstanceId, dir: &Path, aliases: &Aliases) -> String {
    let vars = [
        ("termclip_instance", instance.to_string()),
        ("termclip_dir", dir.to_string_lossy().into_owned()),
        ("termclip_copy", aliases.copy.clone()),
        ("termclip_tee", aliases.tee.clone()),
    ];

    let assignments: Vec<String> = vars
        .iter()
        .map(|(name, value)| format!("{}={}", name, shell_quote(value)))
        .collect();
    format!(
        "{} . {}",
        assignments.join(" "),
        shell_quote(&script.to_string_lossy())
    )
}

/// A bridge script written to disk for one session
#[derive(Debug)]
pub struct InstalledBridge {
    script_path: PathBuf,
    hook: String,
}

impl InstalledBridge {
    /// Write the bridge script next to the session directory as `<instance>.sh`
    pub fn install(
        root: &Path,
        instance: &InstanceId,
        session_dir: &Path,
        aliases: &Aliases,
    ) -> Result<Self, SetupError> {
        aliases.validate()?;

        let script_path = root.join(format!("{}.sh", instance));
        fs::write(&script_path, BRIDGE_SCRIPT).map_err(|source| SetupError::Bridge {
            path: script_path.clone(),
            source,
        })?;

        let hook = hook_line(&script_path, instance, session_dir, aliases);
        log::debug!("Installed shell bridge: {}", hook);

        Ok(Self { script_path, hook })
    }

    pub fn script_path(&self) -> &Path {
        &self.script_path
    }

    pub fn hook(&self) -> &str {
        &self.hook
    }

    pub fn uninstall(&self) {
        match fs::remove_file(&self.script_path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("Failed to remove bridge {:?}: {}", self.script_path, e),
        }
    }
}
