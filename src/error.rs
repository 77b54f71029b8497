use thiserror::Error;

/// Failures the trainer core reports to its caller.
///
/// None of these are fatal: each one either leaves state untouched or is a
/// recoverable transition the host displays to the user.
#[derive(Debug, Error)]
pub enum TrainerError {
    #[error("unknown dictionary `{0}`")]
    NotFound(String),

    #[error("{what} {index} out of range (0..{len})")]
    Range {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("failed to load dictionary `{id}`: {reason}")]
    Load { id: String, reason: String },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A single ledger line that could not be read back.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("line {line}: {reason}")]
pub struct ParseError {
    pub line: usize,
    pub reason: String,
}

impl TrainerError {
    pub fn load(id: &str, reason: impl Into<String>) -> Self {
        TrainerError::Load {
            id: id.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TrainerError>;
