use codememo_core::MemoError;
use thiserror::Error;

/// Result type for graph parser operations
pub type Result<T> = std::result::Result<T, ParserError>;

/// Errors raised while ingesting an external graph description
#[derive(Error, Debug)]
pub enum ParserError {
    /// The source is not well formed for the parser's format
    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// No parser is registered for this format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Invalid parser options
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    /// Unfolding the graph would create more nodes than allowed
    #[error("Graph unfolds into more than {limit} nodes")]
    TooManyNodes { limit: usize },

    /// The resulting forest was rejected
    #[error(transparent)]
    Graph(#[from] MemoError),
}

impl ParserError {
    /// Create a parse error
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }

    /// Create an unsupported format error
    pub fn unsupported_format(format: impl Into<String>) -> Self {
        Self::UnsupportedFormat(format.into())
    }
}
