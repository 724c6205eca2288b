use crate::DocId;

/// Errors returned by the search server.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Malformed input: bad document id, control characters, broken minus word.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The referenced document is not in the index.
    #[error("document not found: {0}")]
    NotFound(DocId),
    /// Positional lookup past the end of the document id set, or a word id
    /// past the `u32` range of the dictionary.
    #[error("index {index} is out of range (length {len})")]
    OutOfRange { index: usize, len: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
