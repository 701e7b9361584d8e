/// A malformed grammar line, reported by [`crate::Grammar::parse_strict`].
///
/// Line numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GrammarError {
    #[error("line {line}: missing \"->\"")]
    MissingArrow { line: usize },

    #[error("line {line}: too many \"->\"")]
    TooManyArrows { line: usize },

    #[error("line {line}: empty left side")]
    EmptyLeftSide { line: usize },

    #[error("line {line}: left side contains whitespace")]
    LeftSideContainsWhitespace { line: usize },
}

/// Anything that can go wrong while asking the remote oracle for a suggestion.
///
/// Never leaves [`crate::oracle::GeminiOracle`]: `suggest` logs it and answers
/// with no suggestion instead.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    /// Transport failure, timeout or non-success status.
    #[error("oracle request failed: {0}")]
    Request(#[from] ureq::Error),

    /// The response body was not the expected JSON shape.
    #[error("malformed oracle response: {0}")]
    Malformed(String),

    /// The response carried no usable text.
    #[error("oracle returned an empty suggestion")]
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    MissingEnv(&'static str),

    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}
