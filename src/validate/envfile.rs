use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnvFileError {
    #[error("failed to open env file '{}': {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid format at line {line}: {content} (expected KEY=VALUE)")]
    MissingSeparator { line: usize, content: String },

    #[error("empty key at line {line}")]
    EmptyKey { line: usize },
}

/// Reads a `KEY=VALUE` file. Blank lines and `#` comments are skipped, and a
/// key that appears twice keeps its last value.
pub fn parse(path: &Path) -> Result<BTreeMap<String, String>, EnvFileError> {
    let bytes = std::fs::read(path).map_err(|source| EnvFileError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    // Values are passed through even when they are not valid UTF-8.
    parse_str(&String::from_utf8_lossy(&bytes))
}

pub fn parse_str(content: &str) -> Result<BTreeMap<String, String>, EnvFileError> {
    let mut vars = BTreeMap::new();

    for (idx, raw) in content.lines().enumerate() {
        let line_number = idx + 1;
        let line = raw.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (key, value) = line
            .split_once('=')
            .ok_or_else(|| EnvFileError::MissingSeparator {
                line: line_number,
                content: line.to_string(),
            })?;

        let key = key.trim();
        if key.is_empty() {
            return Err(EnvFileError::EmptyKey { line: line_number });
        }

        if let Some(previous) = vars.insert(key.to_string(), unquote(value.trim()).to_string()) {
            log::debug!("env key {key} redefined at line {line_number} (was {previous:?})");
        }
    }

    Ok(vars)
}

fn unquote(value: &str) -> &str {
    if value.len() >= 2 {
        for quote in ['"', '\''] {
            if value.starts_with(quote) && value.ends_with(quote) {
                return &value[1..value.len() - 1];
            }
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comments_blanks_and_quotes() {
        let vars = parse_str("A=1\n# comment\n\nB=\"two words\"\n").unwrap();
        assert_eq!(vars.len(), 2);
        assert_eq!(vars["A"], "1");
        assert_eq!(vars["B"], "two words");
    }

    #[test]
    fn trims_and_splits_on_first_equals() {
        let vars = parse_str("  URL = postgres://u:p@h/db?a=b  \nQ='single'\n").unwrap();
        assert_eq!(vars["URL"], "postgres://u:p@h/db?a=b");
        assert_eq!(vars["Q"], "single");
    }

    #[test]
    fn mismatched_quotes_are_kept() {
        let vars = parse_str("A=\"open\nB='x\"\nC=\"\n").unwrap();
        assert_eq!(vars["A"], "\"open");
        assert_eq!(vars["B"], "'x\"");
        assert_eq!(vars["C"], "\"");
    }

    #[test]
    fn last_duplicate_wins() {
        let vars = parse_str("A=1\nA=2\n").unwrap();
        assert_eq!(vars["A"], "2");
    }

    #[test]
    fn missing_separator_reports_line() {
        let err = parse_str("A=1\n\nC\n").unwrap_err();
        assert!(matches!(err, EnvFileError::MissingSeparator { line: 3, .. }));
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn empty_key_reports_line() {
        let err = parse_str("# header\n=value\n").unwrap_err();
        assert!(matches!(err, EnvFileError::EmptyKey { line: 2 }));
    }

    #[test]
    fn missing_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.env");
        let err = parse(&path).unwrap_err();
        assert!(err.to_string().contains("nope.env"));
    }

    #[test]
    fn latin1_values_are_read_lossily() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.env");
        std::fs::write(&path, b"GREETING=caf\xe9\nPORT=8080\n").unwrap();

        let vars = parse(&path).unwrap();
        assert_eq!(vars["GREETING"], "caf\u{FFFD}");
        assert_eq!(vars["PORT"], "8080");
    }
}
