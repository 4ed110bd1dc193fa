use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum SraError {
    #[error("SRA request failed: {0}")]
    Transport(String),

    #[error("SRA returned status {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("could not process SRA response: {0}")]
    BadResponse(String),

    #[error("no SRA result for search term: {0}")]
    #[diagnostic(help("check the accession or broaden the query"))]
    NotFound(String),

    #[error("search term {term} matched {count} SRA entries")]
    #[diagnostic(help("use a more specific accession so exactly one entry matches"))]
    AmbiguousResult { term: String, count: usize },

    #[error("invalid SRA run accession: {0}")]
    #[diagnostic(help("run accessions start with SRR, e.g. SRR390728"))]
    InvalidAccession(String),

    #[error("invalid numeric SRA id: {0}")]
    InvalidSraId(String),

    #[error("library layout required for explicit file naming of {0}")]
    #[diagnostic(help("pass --paired, or enable layout lookup with --layout"))]
    MissingLayout(String),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),
}
