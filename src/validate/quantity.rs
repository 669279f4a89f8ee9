use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityKind {
    Cpu,
    Memory,
}

impl fmt::Display for QuantityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuantityKind::Cpu => f.write_str("CPU"),
            QuantityKind::Memory => f.write_str("memory"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid {kind} value: invalid {kind} format '{value}' (examples: {})", examples(.kind))]
pub struct QuantityError {
    pub kind: QuantityKind,
    pub value: String,
}

fn examples(kind: &QuantityKind) -> &'static str {
    match kind {
        QuantityKind::Cpu => "100m, 0.5, 1",
        QuantityKind::Memory => "128Mi, 1Gi, 512Ki",
    }
}

const MEMORY_SUFFIXES: [&str; 3] = ["Ki", "Mi", "Gi"];

/// Checks the shape of a CPU or memory quantity. An empty value means
/// "platform default" and is always accepted; range checks are left to the backend.
pub fn validate(value: &str, kind: QuantityKind) -> Result<(), QuantityError> {
    if value.is_empty() {
        return Ok(());
    }

    let valid = match kind {
        QuantityKind::Cpu => value.ends_with('m') || is_decimal(value),
        QuantityKind::Memory => MEMORY_SUFFIXES.iter().any(|s| value.ends_with(s)),
    };

    if valid {
        Ok(())
    } else {
        Err(QuantityError {
            kind,
            value: value.to_string(),
        })
    }
}

fn is_decimal(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii_digit() || c == '.')
        && s.chars().filter(|&c| c == '.').count() <= 1
        && s.chars().any(|c| c.is_ascii_digit())
}
