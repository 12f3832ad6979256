//! Error types for netblocks.

use thiserror::Error;

/// Error type for netblocks operations.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Secret could not be resolved
    #[error("secret not available: {0}")]
    Secret(String),
}

/// Result type alias for netblocks operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for address canonicalization.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressParseError {
    /// Empty address text
    #[error("empty address")]
    Empty,

    /// Address portion could not be parsed for its family
    #[error("invalid {family} address: {text}")]
    InvalidAddress { family: &'static str, text: String },

    /// Prefix length is not a number or is too long for the family
    #[error("invalid prefix length in {0}")]
    InvalidPrefix(String),

    /// Range text could not be split into start and end
    #[error("invalid address range: {0}")]
    InvalidRange(String),

    /// Range with start above end, or mixed families
    #[error("empty address range: {0}")]
    EmptyRange(String),
}

/// Error produced while turning one dump object into records.
///
/// None of these are fatal to a run; callers log them and move on.
#[derive(Error, Debug)]
pub enum ParseError {
    /// Object could not be classified or its mandatory fields are missing
    #[error("{context}: format error: {reason}")]
    Format { context: ObjectContext, reason: String },

    /// ARIN network references an organization that was never defined
    #[error("{context}: unknown OrgID {org_id}")]
    Resolution {
        context: ObjectContext,
        org_id: String,
    },

    /// Address text could not be canonicalized
    #[error("{context}: {source}")]
    Address {
        context: ObjectContext,
        #[source]
        source: AddressParseError,
    },
}

impl ParseError {
    /// Context of the object that failed.
    pub fn context(&self) -> &ObjectContext {
        match self {
            ParseError::Format { context, .. } => context,
            ParseError::Resolution { context, .. } => context,
            ParseError::Address { context, .. } => context,
        }
    }
}

/// Location of an object inside its dump file, attached to every parse error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectContext {
    /// Dump file name
    pub file: String,
    /// Byte offset of the object's first line
    pub offset: u64,
    /// First line of the object
    pub snippet: String,
}

impl std::fmt::Display for ObjectContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{} [{}]", self.file, self.offset, self.snippet)
    }
}

/// Error type for the RPSL object grammar.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RpslError {
    /// No attributes at all
    #[error("empty object")]
    Empty,

    /// Line is neither `name: value` nor a continuation
    #[error("malformed attribute line: {0}")]
    MalformedLine(String),

    /// Continuation line before the first attribute
    #[error("continuation line without attribute: {0}")]
    OrphanContinuation(String),

    /// Class attribute without a value
    #[error("missing primary key for class {0}")]
    EmptyPrimaryKey(String),
}
