use crate::parser::ParseError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DviError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(ParseError),

    #[error("Invalid page number: {0}")]
    InvalidPageNumber(usize),

    #[error("Document unusable: {0}")]
    DocumentUnusable(String),
}

pub type Result<T> = std::result::Result<T, DviError>;
