use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::sshconfig::SshHostEntry;

/// Persisted note record, one JSON file per fingerprint.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NoteRecord {
    pub host_alias: String,
    pub hostname: String,
    pub notes: String,
    pub hash: String,
}

/// Stores free-text notes for hosts under a fixed directory, addressed by
/// the host fingerprint. Two entries resolving to the same hostname share
/// a note file.
pub struct NoteStore {
    dir: PathBuf,
}

impl NoteStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        NoteStore {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// 12 hex chars identifying a host, derived from its hostname option
    /// when set and non-empty, otherwise its alias.
    pub fn fingerprint(entry: &SshHostEntry) -> String {
        let hostname = entry.option("hostname");
        let identifier = if hostname.is_empty() {
            entry.alias.as_str()
        } else {
            hostname
        };

        let digest = Sha256::digest(identifier.as_bytes());
        digest[..6].iter().map(|b| format!("{b:02x}")).collect()
    }

    fn note_path(&self, entry: &SshHostEntry) -> PathBuf {
        self.dir.join(format!("{}.json", Self::fingerprint(entry)))
    }

    /// Returns the saved notes for a host, or an empty string when no note
    /// file exists or the file cannot be decoded.
    pub fn load(&self, entry: &SshHostEntry) -> String {
        let path = self.note_path(entry);
        if !path.exists() {
            return String::new();
        }

        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) => {
                warn!("failed to read note file {}: {err}", path.display());
                return String::new();
            }
        };

        match serde_json::from_str::<NoteRecord>(&text) {
            Ok(record) => record.notes,
            Err(err) => {
                warn!("corrupt note file {}: {err}", path.display());
                String::new()
            }
        }
    }

    /// Overwrites the note record for a host. The notes directory is
    /// created on first use.
    pub fn save(&self, entry: &SshHostEntry, notes: &str) -> Result<()> {
        fs::create_dir_all(&self.dir).with_context(|| {
            format!("failed to create notes directory {}", self.dir.display())
        })?;

        let record = NoteRecord {
            host_alias: entry.alias.clone(),
            hostname: entry.option("hostname").to_string(),
            notes: notes.to_string(),
            hash: Self::fingerprint(entry),
        };

        let path = self.note_path(entry);
        let content =
            serde_json::to_string_pretty(&record).context("failed to serialize note record")?;
        fs::write(&path, content)
            .with_context(|| format!("failed to write note file {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entry(alias: &str, hostname: Option<&str>) -> SshHostEntry {
        let mut entry = SshHostEntry::new(alias);
        if let Some(hostname) = hostname {
            entry.options.insert("hostname".into(), hostname.into());
        }
        entry
    }

    #[test]
    fn fingerprint_is_stable_and_12_hex_chars() {
        let a = entry("web", Some("web.example.com"));
        let b = entry("web-alt", Some("web.example.com"));
        let fp = NoteStore::fingerprint(&a);
        assert_eq!(fp.len(), 12);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        // Same hostname means same note file, even under different aliases.
        assert_eq!(fp, NoteStore::fingerprint(&b));
    }

    #[test]
    fn fingerprint_falls_back_to_alias() {
        let with_hostname = entry("web", Some("web.example.com"));
        let alias_only = entry("web", None);
        assert_ne!(
            NoteStore::fingerprint(&with_hostname),
            NoteStore::fingerprint(&alias_only)
        );
        assert_eq!(
            NoteStore::fingerprint(&alias_only),
            NoteStore::fingerprint(&entry("web", Some("")))
        );
    }

    #[test]
    fn different_hostnames_fingerprint_differently() {
        assert_ne!(
            NoteStore::fingerprint(&entry("a", Some("one.example"))),
            NoteStore::fingerprint(&entry("b", Some("two.example")))
        );
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = NoteStore::new(dir.path().join("notes"));
        let host = entry("web", Some("web.example.com"));

        store.save(&host, "reboot fridays\nkernel pinned").unwrap();
        assert_eq!(store.load(&host), "reboot fridays\nkernel pinned");

        store.save(&host, "").unwrap();
        assert_eq!(store.load(&host), "");
    }

    #[test]
    fn load_missing_note_returns_empty() {
        let dir = TempDir::new().unwrap();
        let store = NoteStore::new(dir.path());
        assert_eq!(store.load(&entry("web", None)), "");
    }

    #[test]
    fn load_corrupt_note_returns_empty() {
        let dir = TempDir::new().unwrap();
        let store = NoteStore::new(dir.path());
        let host = entry("web", Some("web.example.com"));
        let path = dir
            .path()
            .join(format!("{}.json", NoteStore::fingerprint(&host)));
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(store.load(&host), "");
    }

    #[test]
    fn record_keeps_all_fields_and_unescaped_utf8() {
        let dir = TempDir::new().unwrap();
        let store = NoteStore::new(dir.path());
        let host = entry("web", Some("web.example.com"));
        store.save(&host, "Zugang über Bastion").unwrap();

        let path = dir
            .path()
            .join(format!("{}.json", NoteStore::fingerprint(&host)));
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("Zugang über Bastion"));
        // pretty writer indents nested fields by two spaces
        assert!(text.contains("\n  \"host_alias\""));

        let record: NoteRecord = serde_json::from_str(&text).unwrap();
        assert_eq!(record.host_alias, "web");
        assert_eq!(record.hostname, "web.example.com");
        assert_eq!(record.hash, NoteStore::fingerprint(&host));
    }

    #[test]
    fn hosts_sharing_hostname_share_the_note_file() {
        let dir = TempDir::new().unwrap();
        let store = NoteStore::new(dir.path());
        let first = entry("web", Some("shared.example"));
        let second = entry("web-backup", Some("shared.example"));

        store.save(&first, "from first").unwrap();
        assert_eq!(store.load(&second), "from first");
    }
}
