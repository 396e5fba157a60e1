use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

use crate::sshconfig::SshHostEntry;

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("no supported terminal emulator found; install gnome-terminal, konsole or xterm")]
    NoTerminal,
    #[error("putty was not found in PATH or known install locations")]
    PuttyNotFound,
    #[error("failed to start {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// Tried in order; the first one present in PATH wins.
const TERMINAL_CANDIDATES: &[&[&str]] = &[
    &["gnome-terminal", "--"],
    &["konsole", "-e"],
    &["xterm", "-e"],
    &["x-terminal-emulator", "-e"],
    &["kitty", "-e"],
    &["alacritty", "-e"],
    &["wezterm", "start", "--"],
];

pub fn is_executable_in_path(name: &str) -> bool {
    let Some(paths) = std::env::var_os("PATH") else {
        return false;
    };
    std::env::split_paths(&paths).any(|dir| dir.join(name).exists())
}

/// Starts `ssh {alias}` in a new window of the first available terminal
/// emulator. Fire-and-forget: returns once the emulator was spawned, the
/// session's own outcome is never observed.
pub fn launch_ssh(alias: &str) -> Result<(), LaunchError> {
    for candidate in TERMINAL_CANDIDATES {
        if !is_executable_in_path(candidate[0]) {
            continue;
        }

        let mut command = Command::new(candidate[0]);
        command.args(&candidate[1..]).arg("ssh").arg(alias);
        return match command.spawn() {
            Ok(_) => Ok(()),
            Err(source) => Err(LaunchError::Spawn {
                command: candidate[0].to_string(),
                source,
            }),
        };
    }

    Err(LaunchError::NoTerminal)
}

fn putty_install_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    for var in ["ProgramFiles", "ProgramFiles(x86)"] {
        if let Some(dir) = std::env::var_os(var) {
            candidates.push(PathBuf::from(dir).join("PuTTY").join("putty.exe"));
        }
    }
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join("Downloads").join("putty.exe"));
    }
    candidates
}

/// Locates a PuTTY binary: PATH first, then conventional install paths.
pub fn find_putty() -> Option<PathBuf> {
    for name in ["putty", "putty.exe"] {
        if is_executable_in_path(name) {
            return Some(PathBuf::from(name));
        }
    }
    putty_install_candidates()
        .into_iter()
        .find(|path| path.exists())
}

/// PuTTY does not read the OpenSSH config, so the target is built from the
/// resolved hostname (falling back to the alias), user and port.
pub fn putty_args(entry: &SshHostEntry) -> Vec<String> {
    let hostname = entry.option("hostname");
    let hostname = if hostname.is_empty() {
        entry.alias.as_str()
    } else {
        hostname
    };
    let user = entry.option("user");
    let target = if user.is_empty() {
        hostname.to_string()
    } else {
        format!("{user}@{hostname}")
    };

    let mut args = vec!["-ssh".to_string(), target];
    let port = entry.option("port");
    if !port.is_empty() {
        args.push("-P".to_string());
        args.push(port.to_string());
    }
    args
}

pub fn launch_putty(putty: &Path, entry: &SshHostEntry) -> Result<(), LaunchError> {
    Command::new(putty)
        .args(putty_args(entry))
        .spawn()
        .map_err(|source| LaunchError::Spawn {
            command: putty.display().to_string(),
            source,
        })?;
    Ok(())
}
