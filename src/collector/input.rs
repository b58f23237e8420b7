//! Username list input

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Reads the username list, one username per line, skipping blank lines
///
/// The list is read once at start-up; input order is preserved because the
/// engine processes usernames in exactly this order.
pub fn read_usernames(path: &Path) -> std::io::Result<Vec<String>> {
    let file = File::open(path)?;
    let mut usernames = Vec::new();

    for line in BufReader::new(file).lines() {
        let line = line?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            usernames.push(trimmed.to_string());
        }
    }

    Ok(usernames)
}
