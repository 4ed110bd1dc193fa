use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::SraError;

pub const RUN_PREFIX: &str = "SRR";

/// Numeric key of an SRA entry, as returned by `esearch`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SraId(String);

impl SraId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SraId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SraId {
    type Err = SraError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim();
        let is_valid = !normalized.is_empty() && normalized.chars().all(|ch| ch.is_ascii_digit());
        if !is_valid {
            return Err(SraError::InvalidSraId(value.to_string()));
        }
        Ok(Self(normalized.to_string()))
    }
}

/// A sequencing run accession such as `SRR390728`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunAccession(String);

impl RunAccession {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunAccession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RunAccession {
    type Err = SraError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim();
        let is_valid = normalized.starts_with(RUN_PREFIX)
            && normalized.len() > RUN_PREFIX.len()
            && normalized.is_ascii();
        if !is_valid {
            return Err(SraError::InvalidAccession(value.to_string()));
        }
        Ok(Self(normalized.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LibraryLayout {
    Single,
    Paired,
}

impl LibraryLayout {
    /// Maps the child tag of `LIBRARY_LAYOUT` in experiment XML.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "SINGLE" => Some(LibraryLayout::Single),
            "PAIRED" => Some(LibraryLayout::Paired),
            _ => None,
        }
    }
}

impl fmt::Display for LibraryLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LibraryLayout::Single => write!(f, "single"),
            LibraryLayout::Paired => write!(f, "paired"),
        }
    }
}

/// Filename convention appended to a run directory on the mirror.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FileNaming {
    #[default]
    Wildcard,
    Explicit,
}

impl fmt::Display for FileNaming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileNaming::Wildcard => write!(f, "wildcard"),
            FileNaming::Explicit => write!(f, "explicit"),
        }
    }
}

/// A run as listed by the archive. The accession is not prefix-checked here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunRecord {
    pub accession: String,
    pub layout: Option<LibraryLayout>,
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn parse_sra_id_trims() {
        let id: SraId = " 12345 ".parse().unwrap();
        assert_eq!(id.as_str(), "12345");
    }

    #[test]
    fn parse_run_accession_rejects_lowercase() {
        let err = "srr390728".parse::<RunAccession>().unwrap_err();
        assert_matches!(err, SraError::InvalidAccession(_));
    }

    #[test]
    fn layout_from_tag() {
        assert_eq!(LibraryLayout::from_tag("PAIRED"), Some(LibraryLayout::Paired));
        assert_eq!(LibraryLayout::from_tag("paired"), None);
    }
}
