use std::path::Path;

use anyhow::{Context, Result};

/// Inserts `  IdentityFile {identity_path}` into the block whose `Host`
/// line contains `target_alias`, right after the first directive line of
/// that block. Returns the rewritten text and whether a line was inserted.
///
/// Block matching is by substring, not by exact token: an alias that is a
/// substring of another alias can match the wrong block. Kept as-is for
/// compatibility with configs written against that behavior.
///
/// A block with no directive line before the next `Host` line (or end of
/// input) is left untouched and the flag stays false.
pub fn add_identity_file(
    config_text: &str,
    target_alias: &str,
    identity_path: &str,
) -> (String, bool) {
    let mut new_lines: Vec<String> = Vec::new();
    let mut in_target_block = false;
    let mut inserted = false;

    for line in config_text.split('\n') {
        new_lines.push(line.to_string());

        let trimmed = line.trim();
        let is_host_line = trimmed
            .get(..5)
            .map(|prefix| prefix.eq_ignore_ascii_case("host "))
            .unwrap_or(false);

        if is_host_line && line.contains(target_alias) {
            in_target_block = true;
        } else if in_target_block && is_host_line {
            in_target_block = false;
        } else if in_target_block
            && !inserted
            && !trimmed.is_empty()
            && !trimmed.starts_with('#')
        {
            new_lines.push(format!("  IdentityFile {identity_path}"));
            inserted = true;
        }
    }

    (new_lines.join("\n"), inserted)
}

/// Read-modify-write wrapper over [`add_identity_file`]. When nothing was
/// inserted the file is not rewritten.
pub fn add_identity_file_to_config(
    config_path: &Path,
    target_alias: &str,
    identity_path: &Path,
) -> Result<bool> {
    let text = std::fs::read_to_string(config_path)
        .with_context(|| format!("failed to read ssh config {}", config_path.display()))?;

    let (new_text, inserted) =
        add_identity_file(&text, target_alias, &identity_path.display().to_string());

    if inserted {
        std::fs::write(config_path, new_text)
            .with_context(|| format!("failed to write ssh config {}", config_path.display()))?;
    }

    Ok(inserted)
}
