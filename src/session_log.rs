use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;

use crate::sshconfig::SshHostEntry;

/// How a connection was started.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectMethod {
    Ssh,
    Putty,
}

impl fmt::Display for ConnectMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectMethod::Ssh => write!(f, "SSH"),
            ConnectMethod::Putty => write!(f, "PuTTY"),
        }
    }
}

const STATUS_OK: &str = "✓ Erfolg";
const STATUS_FAILED: &str = "✗ Fehler";

/// Append-only connection history, one log file per host alias. Files are
/// never rotated or truncated.
pub struct SessionLog {
    dir: PathBuf,
}

impl SessionLog {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        SessionLog {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn append(
        &self,
        entry: &SshHostEntry,
        method: ConnectMethod,
        success: bool,
    ) -> Result<()> {
        std::fs::create_dir_all(&self.dir).with_context(|| {
            format!("failed to create session log directory {}", self.dir.display())
        })?;

        let path = self.dir.join(format!("{}.log", entry.alias));
        let line = Self::format_line(entry, method, success);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("failed to open session log {}", path.display()))?;
        file.write_all(line.as_bytes())
            .with_context(|| format!("failed to append to session log {}", path.display()))?;
        Ok(())
    }

    fn format_line(entry: &SshHostEntry, method: ConnectMethod, success: bool) -> String {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        let hostname = non_empty_or(entry.option("hostname"), "N/A");
        let user = non_empty_or(entry.option("user"), "N/A");
        let port = non_empty_or(entry.option("port"), "22");
        let status = if success { STATUS_OK } else { STATUS_FAILED };

        format!("[{timestamp}] {method} ({status}) | user@host: {user}@{hostname}:{port}\n")
    }
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() {
        fallback
    } else {
        value
    }
}
