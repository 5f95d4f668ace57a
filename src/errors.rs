use thiserror::Error;

/// Error type for pattern graph construction and matching.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PatternGraphError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("no match for the target graph")]
    NoMatch,
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl PatternGraphError {
    pub fn config<T: Into<String>>(msg: T) -> Self {
        PatternGraphError::Config(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        PatternGraphError::NotFound(msg.into())
    }

    pub fn invalid_input<T: Into<String>>(msg: T) -> Self {
        PatternGraphError::InvalidInput(msg.into())
    }

    /// `NoMatch` is an ordinary query outcome rather than a fault.
    pub fn is_no_match(&self) -> bool {
        matches!(self, PatternGraphError::NoMatch)
    }
}

pub type Result<T, E = PatternGraphError> = std::result::Result<T, E>;
