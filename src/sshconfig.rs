use std::collections::HashMap;
use std::path::Path;

use tracing::warn;

/// One non-wildcard `Host` block from an OpenSSH client config.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SshHostEntry {
    /// First pattern on the `Host` line.
    pub alias: String,
    /// Directive name (lower-cased) to trimmed value. Last occurrence wins.
    pub options: HashMap<String, String>,
}

impl SshHostEntry {
    pub fn new(alias: impl Into<String>) -> Self {
        SshHostEntry {
            alias: alias.into(),
            options: HashMap::new(),
        }
    }

    /// Option value by lower-cased directive name, empty string if unset.
    pub fn option(&self, key: &str) -> &str {
        self.options.get(key).map(String::as_str).unwrap_or("")
    }

    /// Label shown in host lists: `alias  (user@hostname:port)` with the
    /// parts that are actually configured.
    pub fn display_line(&self) -> String {
        let hostname = self.option("hostname");
        let user = self.option("user");
        let port = self.option("port");

        let mut right = String::new();
        if !user.is_empty() && !hostname.is_empty() {
            right.push_str(user);
            right.push('@');
            right.push_str(hostname);
        } else if !hostname.is_empty() {
            right.push_str(hostname);
        }
        if !port.is_empty() {
            right.push(':');
            right.push_str(port);
        }
        if right.is_empty() {
            return format!("{}  (kein Hostname)", self.alias);
        }

        format!("{}  ({})", self.alias, right)
    }
}

fn is_wildcard(alias: &str) -> bool {
    alias.chars().any(|c| matches!(c, '*' | '?' | '!'))
}

/// Parses SSH client config text into host entries, in file order.
///
/// Only the first pattern of each `Host` line becomes the alias; blocks
/// whose alias is a wildcard or negation pattern are dropped after parsing
/// (their directive lines never leak into a neighboring entry). Directive
/// lines that do not split into a key and a value are skipped, as is
/// anything before the first `Host` line.
pub fn parse(text: &str) -> Vec<SshHostEntry> {
    let mut entries = Vec::new();
    let mut current: Option<SshHostEntry> = None;

    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((key, rest)) = line.split_once(char::is_whitespace) else {
            continue;
        };
        let rest = rest.trim();

        if key.eq_ignore_ascii_case("host") {
            if let Some(entry) = current.take() {
                entries.push(entry);
            }
            // A Host line may list several patterns; only the first one
            // is addressable as a single host.
            let alias = rest.split_whitespace().next().unwrap_or(rest);
            current = Some(SshHostEntry::new(alias));
            continue;
        }

        let Some(entry) = current.as_mut() else {
            continue;
        };
        let value = rest.trim_matches('"');
        entry
            .options
            .insert(key.to_ascii_lowercase(), value.to_string());
    }

    if let Some(entry) = current.take() {
        entries.push(entry);
    }

    entries.retain(|entry| !is_wildcard(&entry.alias));
    entries
}

/// Reads and parses a config file. A missing or unreadable file yields an
/// empty list; the user still gets a usable (if empty) host list.
pub fn load_entries(path: &Path) -> Vec<SshHostEntry> {
    if !path.exists() {
        return Vec::new();
    }

    match std::fs::read(path) {
        Ok(bytes) => parse(&String::from_utf8_lossy(&bytes)),
        Err(err) => {
            warn!("failed to read ssh config {}: {err}", path.display());
            Vec::new()
        }
    }
}
