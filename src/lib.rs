extern crate wasm_bindgen;

use wasm_bindgen::prelude::*;

pub mod config;
pub mod error;
pub mod grammar;
pub mod oracle;

pub use config::{DuplicatePolicy, OracleConfig, ParserConfig};
pub use error::{ConfigError, GrammarError, OracleError};
pub use grammar::predictive::{FailureReason, ParseOutcome, PredictiveParser, Step};
pub use grammar::{tokenize, Grammar};
pub use oracle::{CorrectionOracle, GeminiOracle, NoOracle};

/// Parse grammar text, skipping malformed lines.
pub fn parse_grammar(text: &str) -> Grammar {
    Grammar::parse(text)
}

/// Run the predictive parser with the default configuration.
pub fn parse(
    tokens: &mut Vec<String>,
    grammar: &Grammar,
    oracle: &dyn CorrectionOracle,
) -> ParseOutcome {
    grammar::predictive::parse(tokens, grammar, oracle)
}

/// Parse `input` against `grammar` without a correction oracle.
#[wasm_bindgen]
pub fn parse_to_json(grammar: &str, input: &str) -> String {
    let g = Grammar::parse(grammar);
    if g.start_symbol().is_none() {
        return serde_json::json!({ "error": "grammar has no productions" }).to_string();
    }
    let mut tokens = tokenize(input);
    parse(&mut tokens, &g, &NoOracle).to_json()
}

#[cfg(test)]
mod parse_tests {
    use crate::{grammar::EXPRESSION_GRAMMAR, parse, parse_grammar, tokenize, NoOracle};
    use pretty_assertions::assert_eq;

    #[test]
    fn grammar_round_trip() {
        let g = parse_grammar("A -> x y | z");
        assert_eq!(
            g.productions("A").unwrap(),
            &[
                vec!["x".to_string(), "y".to_string()],
                vec!["z".to_string()]
            ][..]
        );
    }

    #[test]
    fn expression_is_accepted_without_corrections() {
        let g = parse_grammar(EXPRESSION_GRAMMAR);
        let mut tokens = tokenize("id + id * id");
        let outcome = parse(&mut tokens, &g, &NoOracle);
        assert!(outcome.success);
        assert_eq!(outcome.corrections().count(), 0);
    }

    #[test]
    fn json_entry_point() {
        let out: serde_json::Value =
            serde_json::from_str(&crate::parse_to_json(EXPRESSION_GRAMMAR, "id + +")).unwrap();
        assert_eq!(out["success"], false);
        assert_eq!(out["failure_token"], "+");
        assert_eq!(out["failure"], "no_valid_correction");
    }

    #[test]
    fn json_entry_point_without_grammar() {
        assert_eq!(
            crate::parse_to_json("  \n", "id"),
            r#"{"error":"grammar has no productions"}"#
        );
    }
}
