//! Instrument pool parsing.
//!
//! The pool is configured as a comma-separated list of `code:name` tokens.
//! Order is significant: it breaks ties in the strength ranking.

use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolEntry {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InstrumentPool {
    pub entries: Vec<PoolEntry>,
}

impl InstrumentPool {
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.code.as_str())
    }

    /// Display name for `code`, falling back to the code itself.
    pub fn name_of<'a>(&'a self, code: &'a str) -> &'a str {
        self.entries
            .iter()
            .find(|e| e.code == code)
            .map(|e| e.name.as_str())
            .unwrap_or(code)
    }
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum PoolError {
    #[error("empty token in instrument list")]
    EmptyToken,

    #[error("empty code in token: {0}")]
    EmptyCode(String),

    #[error("duplicate code: {0}")]
    DuplicateCode(String),
}

pub fn parse_pool(input: &str) -> Result<InstrumentPool, PoolError> {
    let mut entries = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(PoolError::EmptyToken);
        }

        let (code, name) = match trimmed.split_once(':') {
            Some((code, name)) => (code.trim(), name.trim()),
            None => (trimmed, ""),
        };
        if code.is_empty() {
            return Err(PoolError::EmptyCode(trimmed.to_string()));
        }
        if !seen.insert(code.to_string()) {
            return Err(PoolError::DuplicateCode(code.to_string()));
        }

        let name = if name.is_empty() { code } else { name };
        entries.push(PoolEntry {
            code: code.to_string(),
            name: name.to_string(),
        });
    }

    Ok(InstrumentPool { entries })
}
