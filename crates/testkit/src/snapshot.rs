//! Golden-file snapshots.
//!
//! Values are stored as pretty JSON with every object's keys sorted, so the
//! files diff cleanly and do not depend on struct field order. A run compares
//! against the file on disk; `ROOMSIM_UPDATE_SNAPSHOTS=1` rewrites it instead.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Environment variable that switches snapshot assertions to update mode.
pub const UPDATE_SNAPSHOTS_ENV: &str = "ROOMSIM_UPDATE_SNAPSHOTS";

/// Compare `value` against the golden file at `path`, or rewrite the file
/// when update mode is on.
pub fn assert_json_snapshot<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> Result<()> {
    let path = path.as_ref();
    let actual = canonical_json(value)?;

    if update_mode() {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create snapshot directory {}", dir.display()))?;
        }
        return fs::write(path, &actual)
            .with_context(|| format!("Failed to write snapshot {}", path.display()));
    }

    let expected = fs::read_to_string(path).with_context(|| {
        format!(
            "No snapshot at {} (set {}=1 to record it)",
            path.display(),
            UPDATE_SNAPSHOTS_ENV
        )
    })?;

    match first_difference(&expected, &actual) {
        None => Ok(()),
        Some((line, want, got)) => anyhow::bail!(
            "Snapshot {} differs at line {}\n  expected: {}\n    actual: {}\n(set {}=1 to accept)",
            path.display(),
            line,
            want,
            got,
            UPDATE_SNAPSHOTS_ENV
        ),
    }
}

/// Canonical form used for golden files: sorted keys, two-space indent,
/// trailing newline.
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String> {
    let value = serde_json::to_value(value).context("Failed to serialize snapshot value")?;
    let mut text =
        serde_json::to_string_pretty(&sorted(value)).context("Failed to format snapshot JSON")?;
    text.push('\n');
    Ok(text)
}

fn update_mode() -> bool {
    std::env::var(UPDATE_SNAPSHOTS_ENV)
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

fn sorted(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(entries.into_iter().map(|(k, v)| (k, sorted(v))).collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sorted).collect()),
        other => other,
    }
}

/// 1-based line number and the two differing lines, if any.
fn first_difference(expected: &str, actual: &str) -> Option<(usize, String, String)> {
    if expected == actual {
        return None;
    }
    let mut want = expected.lines();
    let mut got = actual.lines();
    let mut line = 1;
    loop {
        match (want.next(), got.next()) {
            (Some(a), Some(b)) if a == b => line += 1,
            (None, None) => {
                // Only trailing whitespace differs.
                return Some((line, "<end>".into(), "<end>".into()));
            }
            (a, b) => {
                return Some((
                    line,
                    a.unwrap_or("<end>").to_string(),
                    b.unwrap_or("<end>").to_string(),
                ))
            }
        }
    }
}
