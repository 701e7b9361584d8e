//! Correction oracles: the parser's only collaborator.
//!
//! An oracle receives a natural-language description of a mismatch and answers
//! with at most one replacement token. It must never fail loudly: transport and
//! service errors become `None`.

mod gemini;

pub use gemini::GeminiOracle;

pub trait CorrectionOracle {
    fn suggest(&self, error_description: &str) -> Option<String>;
}

/// Never suggests anything, so every recoverable mismatch becomes a failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOracle;

impl CorrectionOracle for NoOracle {
    fn suggest(&self, _error_description: &str) -> Option<String> {
        None
    }
}

impl<F> CorrectionOracle for F
where
    F: Fn(&str) -> Option<String>,
{
    fn suggest(&self, error_description: &str) -> Option<String> {
        self(error_description)
    }
}

/// Reduce a free-form reply to its first whitespace-delimited word.
pub fn first_token(reply: &str) -> Option<String> {
    reply.split_whitespace().next().map(|s| s.to_string())
}
