use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use clap::ValueEnum;
use thiserror::Error;

use crate::sshconfig::SshHostEntry;

/// Key algorithms `ssh-keygen` is invoked with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum KeyType {
    Ed25519,
    Ecdsa,
    Rsa,
}

impl KeyType {
    pub fn as_str(self) -> &'static str {
        match self {
            KeyType::Ed25519 => "ed25519",
            KeyType::Ecdsa => "ecdsa",
            KeyType::Rsa => "rsa",
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum KeygenError {
    #[error("ssh-keygen was not found in PATH")]
    ToolNotFound,
    #[error("ssh-keygen failed with {0}")]
    ToolFailed(std::process::ExitStatus),
    #[error("failed to run ssh-keygen: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum PubKeyError {
    #[error("public key not found: {}", .0.display())]
    Missing(PathBuf),
    #[error("public key is empty: {}", .0.display())]
    Empty(PathBuf),
    #[error("failed to read public key: {0}")]
    Io(#[from] io::Error),
}

/// Paths of a generated key pair.
#[derive(Clone, Debug)]
pub struct GeneratedKey {
    pub private_key: PathBuf,
    pub public_key: PathBuf,
}

/// `id_{type}` or `id_{type}_{name}`.
pub fn key_filename(key_type: KeyType, key_name: &str) -> String {
    if key_name.is_empty() {
        format!("id_{}", key_type.as_str())
    } else {
        format!("id_{}_{}", key_type.as_str(), key_name)
    }
}

/// Private and public key paths a generation run would produce.
pub fn key_paths(ssh_dir: &Path, key_type: KeyType, key_name: &str) -> GeneratedKey {
    let filename = key_filename(key_type, key_name);
    GeneratedKey {
        private_key: ssh_dir.join(&filename),
        public_key: ssh_dir.join(format!("{filename}.pub")),
    }
}

/// Generates a key pair by invoking `ssh-keygen` with an empty passphrase.
/// RSA keys get 4096 bits, ECDSA the nistp521 curve.
pub fn generate_key(
    ssh_dir: &Path,
    key_type: KeyType,
    key_name: &str,
) -> Result<GeneratedKey, KeygenError> {
    std::fs::create_dir_all(ssh_dir)?;
    let paths = key_paths(ssh_dir, key_type, key_name);

    let mut command = Command::new("ssh-keygen");
    command.arg("-t").arg(key_type.as_str());
    match key_type {
        KeyType::Rsa => {
            command.arg("-b").arg("4096");
        }
        KeyType::Ecdsa => {
            command.arg("-b").arg("521");
        }
        KeyType::Ed25519 => {}
    }
    command.arg("-f").arg(&paths.private_key).arg("-N").arg("");

    let status = command.status().map_err(|err| {
        if err.kind() == io::ErrorKind::NotFound {
            KeygenError::ToolNotFound
        } else {
            KeygenError::Io(err)
        }
    })?;

    if !status.success() {
        return Err(KeygenError::ToolFailed(status));
    }
    Ok(paths)
}

/// Reads a public key file, distinguishing a missing file from an empty
/// one; both abort an explicit copy/show request.
pub fn read_public_key(path: &Path) -> Result<String, PubKeyError> {
    if !path.exists() {
        return Err(PubKeyError::Missing(path.to_path_buf()));
    }
    let text = String::from_utf8_lossy(&std::fs::read(path)?)
        .trim()
        .to_string();
    if text.is_empty() {
        return Err(PubKeyError::Empty(path.to_path_buf()));
    }
    Ok(text)
}

/// First existing public key for a host: its IdentityFile (with a `.pub`
/// extension) when configured, then the default key names.
pub fn locate_public_key(ssh_dir: &Path, entry: Option<&SshHostEntry>) -> Option<PathBuf> {
    let mut candidates = vec![
        ssh_dir.join("id_ed25519.pub"),
        ssh_dir.join("id_rsa.pub"),
        ssh_dir.join("id_ecdsa.pub"),
    ];

    if let Some(entry) = entry {
        let identity = entry.option("identityfile");
        if !identity.is_empty() {
            candidates.insert(0, resolve_identity_path(identity).with_extension("pub"));
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

/// Expands `$VAR`/`${VAR}` references and a leading `~` in an
/// IdentityFile value. A reference to an unset variable leaves the value
/// as written.
pub fn resolve_identity_path(value: &str) -> PathBuf {
    match shellexpand::full(value) {
        Ok(expanded) => PathBuf::from(expanded.as_ref()),
        Err(_) => PathBuf::from(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn key_filename_without_name() {
        assert_eq!(key_filename(KeyType::Ed25519, ""), "id_ed25519");
        assert_eq!(key_filename(KeyType::Rsa, ""), "id_rsa");
    }

    #[test]
    fn key_filename_with_name() {
        assert_eq!(key_filename(KeyType::Ecdsa, "work"), "id_ecdsa_work");
    }

    #[test]
    fn key_paths_pair_up() {
        let paths = key_paths(Path::new("/home/bob/.ssh"), KeyType::Ed25519, "work");
        assert_eq!(paths.private_key, Path::new("/home/bob/.ssh/id_ed25519_work"));
        assert_eq!(
            paths.public_key,
            Path::new("/home/bob/.ssh/id_ed25519_work.pub")
        );
    }

    #[test]
    fn read_public_key_missing_and_empty_are_distinct() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("id_ed25519.pub");
        assert!(matches!(
            read_public_key(&missing),
            Err(PubKeyError::Missing(_))
        ));

        std::fs::write(&missing, "  \n").unwrap();
        assert!(matches!(
            read_public_key(&missing),
            Err(PubKeyError::Empty(_))
        ));
    }

    #[test]
    fn read_public_key_trims_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("id_rsa.pub");
        std::fs::write(&path, "ssh-rsa AAAA bob@host\n").unwrap();
        assert_eq!(read_public_key(&path).unwrap(), "ssh-rsa AAAA bob@host");
    }

    #[test]
    fn locate_public_key_prefers_identity_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("id_ed25519.pub"), "default").unwrap();
        std::fs::write(dir.path().join("id_rsa_web.pub"), "host specific").unwrap();

        let mut entry = SshHostEntry::new("web");
        entry.options.insert(
            "identityfile".into(),
            dir.path().join("id_rsa_web").display().to_string(),
        );

        let found = locate_public_key(dir.path(), Some(&entry)).unwrap();
        assert_eq!(found, dir.path().join("id_rsa_web.pub"));
    }

    #[test]
    fn locate_public_key_resolves_env_var_identity_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("id_rsa_web.pub"), "x").unwrap();
        std::env::set_var("SSHM_TEST_SSHDIR", dir.path());

        let mut entry = SshHostEntry::new("web");
        entry
            .options
            .insert("identityfile".into(), "$SSHM_TEST_SSHDIR/id_rsa_web".into());

        let found = locate_public_key(dir.path(), Some(&entry)).unwrap();
        assert_eq!(found, dir.path().join("id_rsa_web.pub"));
    }

    #[test]
    fn locate_public_key_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("id_rsa.pub"), "x").unwrap();
        let found = locate_public_key(dir.path(), None).unwrap();
        assert_eq!(found, dir.path().join("id_rsa.pub"));
    }

    #[test]
    fn locate_public_key_none_when_nothing_exists() {
        let dir = TempDir::new().unwrap();
        assert!(locate_public_key(dir.path(), None).is_none());
    }

    #[test]
    fn resolve_identity_path_keeps_absolute_paths() {
        assert_eq!(
            resolve_identity_path("/etc/ssh/key"),
            PathBuf::from("/etc/ssh/key")
        );
    }

    #[test]
    fn resolve_identity_path_expands_tilde() {
        let resolved = resolve_identity_path("~/.ssh/id_ed25519");
        if let Some(home) = dirs::home_dir() {
            assert_eq!(resolved, home.join(".ssh/id_ed25519"));
        }
    }

    #[test]
    fn resolve_identity_path_expands_env_vars() {
        std::env::set_var("SSHM_TEST_KEYDIR", "/home/bob");
        assert_eq!(
            resolve_identity_path("$SSHM_TEST_KEYDIR/.ssh/id_ed25519"),
            PathBuf::from("/home/bob/.ssh/id_ed25519")
        );
        assert_eq!(
            resolve_identity_path("${SSHM_TEST_KEYDIR}/key"),
            PathBuf::from("/home/bob/key")
        );
    }

    #[test]
    fn resolve_identity_path_keeps_unset_vars_as_written() {
        assert_eq!(
            resolve_identity_path("$SSHM_TEST_UNSET_93/key"),
            PathBuf::from("$SSHM_TEST_UNSET_93/key")
        );
    }
}
