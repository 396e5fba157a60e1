use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::warn;

use crate::config_edit;
use crate::keygen::{self, GeneratedKey, KeyType};
use crate::launch::{self, LaunchError};
use crate::notes::NoteStore;
use crate::session_log::{ConnectMethod, SessionLog};
use crate::sshconfig::{self, SshHostEntry};

/// Wires the core components to the conventional `~/.ssh` layout:
/// the config file, a `notes/` directory and a `session_logs/` directory.
/// Holds no entry state; every operation takes the host explicitly.
pub struct App {
    pub config_path: PathBuf,
    pub ssh_dir: PathBuf,
    pub notes: NoteStore,
    pub session_log: SessionLog,
}

impl App {
    pub fn new() -> Result<Self> {
        let home = dirs::home_dir().context("home directory not found")?;
        Ok(Self::with_ssh_dir(home.join(".ssh")))
    }

    pub fn with_ssh_dir(ssh_dir: PathBuf) -> Self {
        App {
            config_path: ssh_dir.join("config"),
            notes: NoteStore::new(ssh_dir.join("notes")),
            session_log: SessionLog::new(ssh_dir.join("session_logs")),
            ssh_dir,
        }
    }

    /// Re-reads the config on every call; entries are rebuilt, never
    /// cached.
    pub fn entries(&self) -> Vec<SshHostEntry> {
        sshconfig::load_entries(&self.config_path)
    }

    pub fn find_entry(&self, alias: &str) -> Option<SshHostEntry> {
        self.entries().into_iter().find(|entry| entry.alias == alias)
    }

    /// Launches ssh in a new terminal window and records the outcome.
    /// The log line is written for failures too, before the error is
    /// handed back.
    pub fn connect_ssh(&self, entry: &SshHostEntry) -> Result<()> {
        let result = launch::launch_ssh(&entry.alias);
        self.log_session(entry, ConnectMethod::Ssh, result.is_ok());
        result.map_err(Into::into)
    }

    pub fn connect_putty(&self, entry: &SshHostEntry) -> Result<()> {
        let putty = launch::find_putty().ok_or(LaunchError::PuttyNotFound)?;
        let result = launch::launch_putty(&putty, entry);
        self.log_session(entry, ConnectMethod::Putty, result.is_ok());
        result.map_err(Into::into)
    }

    fn log_session(&self, entry: &SshHostEntry, method: ConnectMethod, success: bool) {
        if let Err(err) = self.session_log.append(entry, method, success) {
            warn!("failed to write session log for {}: {err:#}", entry.alias);
        }
    }

    /// Generates a key pair and, when a host is given, inserts the private
    /// key path into that host's config block.
    pub fn generate_key(
        &self,
        key_type: KeyType,
        key_name: &str,
        update_host: Option<&SshHostEntry>,
    ) -> Result<GeneratedKey> {
        let generated = keygen::generate_key(&self.ssh_dir, key_type, key_name)?;

        if let Some(entry) = update_host {
            let inserted = config_edit::add_identity_file_to_config(
                &self.config_path,
                &entry.alias,
                &generated.private_key,
            )?;
            if !inserted {
                warn!(
                    "block '{}' has no directive line, config left unchanged",
                    entry.alias
                );
            }
        }

        Ok(generated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn entries_reload_from_disk() {
        let dir = TempDir::new().unwrap();
        let app = App::with_ssh_dir(dir.path().to_path_buf());
        assert!(app.entries().is_empty());

        std::fs::write(&app.config_path, "Host web\n  HostName w.example\n").unwrap();
        assert_eq!(app.entries().len(), 1);
        assert!(app.find_entry("web").is_some());
        assert!(app.find_entry("other").is_none());

        std::fs::write(&app.config_path, "Host web\nHost db\n").unwrap();
        assert_eq!(app.entries().len(), 2);
    }

    #[test]
    fn paths_follow_the_ssh_dir() {
        let app = App::with_ssh_dir(PathBuf::from("/home/bob/.ssh"));
        assert_eq!(app.config_path, PathBuf::from("/home/bob/.ssh/config"));
    }
}
