use std::fmt;

use serde::Serialize;
use tracing::{debug, trace};

use crate::{config::ParserConfig, oracle::CorrectionOracle, Grammar};

use super::{pretty_print::ProductionOutput, END_MARK, EPSILON};

/// One entry of the parse trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Step {
    /// Stack after popping `top`, with the current lookahead.
    State {
        stack: Vec<String>,
        top: String,
        lookahead: String,
    },
    Match {
        terminal: String,
    },
    Expand {
        non_terminal: String,
        production: Vec<String>,
    },
    Correction {
        position: usize,
        original: String,
        replacement: String,
    },
    /// The oracle was asked and gave nothing usable.
    RejectedSuggestion {
        position: usize,
        original: String,
        suggestion: Option<String>,
    },
    Accept,
    Failure {
        reason: FailureReason,
        token: String,
    },
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::State {
                stack,
                top,
                lookahead,
            } => write!(
                f,
                "Stack: [{}], Top: {}, Current Token: {}",
                stack.join(", "),
                top,
                lookahead
            ),
            Step::Match { terminal } => write!(f, "Matched terminal: {}", terminal),
            Step::Expand {
                non_terminal,
                production,
            } => write!(
                f,
                "Expanding {}",
                ProductionOutput::single(non_terminal, production).to_plaintext(0, false)
            ),
            Step::Correction {
                position,
                original,
                replacement,
            } => write!(
                f,
                "Error at '{}' (token {}) -> Suggested Replacement: '{}'",
                original, position, replacement
            ),
            Step::RejectedSuggestion {
                position,
                original,
                suggestion: Some(suggestion),
            } => write!(
                f,
                "Error at '{}' (token {}) -> Rejected Suggestion: '{}'",
                original, position, suggestion
            ),
            Step::RejectedSuggestion {
                position,
                original,
                suggestion: None,
            } => write!(
                f,
                "Error at '{}' (token {}) -> No Suggestion",
                original, position
            ),
            Step::Accept => write!(f, "Accepted"),
            Step::Failure { reason, token } => {
                write!(f, "Parsing failed at '{}': {}", token, reason)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    NoStartSymbol,
    UnexpectedTerminal,
    NoValidCorrection,
    CorrectionLimitExceeded,
    TrailingInput,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FailureReason::NoStartSymbol => "grammar has no start symbol",
            FailureReason::UnexpectedTerminal => "unexpected token",
            FailureReason::NoValidCorrection => "no valid correction found",
            FailureReason::CorrectionLimitExceeded => "too many corrections",
            FailureReason::TrailingInput => "unconsumed input after end of derivation",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseOutcome {
    pub success: bool,
    pub steps: Vec<Step>,
    pub failure_token: Option<String>,
    pub failure: Option<FailureReason>,
}

impl ParseOutcome {
    pub fn corrections(&self) -> impl Iterator<Item = &Step> {
        self.steps
            .iter()
            .filter(|s| matches!(s, Step::Correction { .. }))
    }
}

impl Grammar {
    /// First alternative of `non_terminal` that can start with `lookahead`.
    ///
    /// The first alternative whose leading symbol is the lookahead itself or ε
    /// wins. ε alternatives are always eligible, so one declared before a
    /// matching alternative shadows it. Only when no alternative qualifies that
    /// way are alternatives led by a non-terminal tried, in order, each eligible
    /// when a production would be selected for that non-terminal.
    pub fn select_production(&self, non_terminal: &str, lookahead: &str) -> Option<&[String]> {
        self.select_production_guarded(non_terminal, lookahead, &mut Vec::new())
    }

    fn select_production_guarded<'g>(
        &'g self,
        non_terminal: &str,
        lookahead: &str,
        visiting: &mut Vec<&'g str>,
    ) -> Option<&'g [String]> {
        let nt = self.get_non_terminal(non_terminal)?;
        let literal = nt
            .productions
            .iter()
            .find(|production| match production.first() {
                Some(first) => first == lookahead || first == EPSILON,
                None => true,
            });
        if let Some(production) = literal {
            return Some(production.as_slice());
        }

        // left recursion
        if visiting.contains(&nt.name.as_str()) {
            return None;
        }
        visiting.push(nt.name.as_str());
        let derived = nt.productions.iter().find(|production| {
            production.first().map_or(false, |first| {
                self.is_non_terminal(first)
                    && self
                        .select_production_guarded(first, lookahead, visiting)
                        .is_some()
            })
        });
        visiting.pop();
        derived.map(|production| production.as_slice())
    }
}

pub fn error_description(token: &str, non_terminal: &str) -> String {
    format!(
        "Error: Unexpected token '{}' when expecting '{}'. Suggest a correction.",
        token, non_terminal
    )
}

/// Table-free LL(1) driver over an explicit symbol stack.
pub struct PredictiveParser<'a> {
    grammar: &'a Grammar,
    oracle: &'a dyn CorrectionOracle,
    config: ParserConfig,
}

impl<'a> PredictiveParser<'a> {
    pub fn new(grammar: &'a Grammar, oracle: &'a dyn CorrectionOracle) -> Self {
        Self::with_config(grammar, oracle, ParserConfig::default())
    }

    pub fn with_config(
        grammar: &'a Grammar,
        oracle: &'a dyn CorrectionOracle,
        config: ParserConfig,
    ) -> Self {
        Self {
            grammar,
            oracle,
            config,
        }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Run the derivation. Accepted corrections are written back into `tokens`.
    pub fn parse(&self, tokens: &mut Vec<String>) -> ParseOutcome {
        let mut steps: Vec<Step> = Vec::new();

        let start = match self
            .config
            .start_symbol
            .as_deref()
            .or_else(|| self.grammar.start_symbol())
        {
            Some(start) => start.to_string(),
            None => {
                let token = tokens.first().map_or(END_MARK, |t| t.as_str()).to_string();
                return fail(steps, FailureReason::NoStartSymbol, token);
            }
        };

        let mut stack: Vec<String> = vec![END_MARK.to_string(), start];
        let mut index: usize = 0;
        let mut corrections: usize = 0;

        while let Some(top) = stack.pop() {
            let lookahead = tokens.get(index).map_or(END_MARK, |t| t.as_str()).to_string();
            trace!(top = %top, lookahead = %lookahead, depth = stack.len(), "step");
            steps.push(Step::State {
                stack: stack.clone(),
                top: top.clone(),
                lookahead: lookahead.clone(),
            });

            if top == EPSILON {
                continue;
            } else if top == END_MARK {
                return self.finish(steps, tokens, index);
            } else if index < tokens.len() && top == tokens[index] {
                steps.push(Step::Match { terminal: top });
                index += 1;
            } else if self.grammar.is_non_terminal(&top) {
                if let Some(production) = self.grammar.select_production(&top, &lookahead) {
                    steps.push(Step::Expand {
                        non_terminal: top.clone(),
                        production: production.to_vec(),
                    });
                    stack.extend(production.iter().rev().cloned());
                    continue;
                }

                if corrections >= self.config.max_corrections {
                    debug!(corrections, "correction budget exhausted");
                    return fail(steps, FailureReason::CorrectionLimitExceeded, lookahead);
                }
                let suggestion = self.ask_oracle(&lookahead, &top);
                let Some(replacement) = suggestion
                    .clone()
                    .filter(|s| self.is_valid_suggestion(s))
                else {
                    steps.push(Step::RejectedSuggestion {
                        position: index,
                        original: lookahead.clone(),
                        suggestion,
                    });
                    return fail(steps, FailureReason::NoValidCorrection, lookahead);
                };

                corrections += 1;
                if index < tokens.len() {
                    tokens[index] = replacement.clone();
                } else {
                    tokens.push(replacement.clone());
                }
                steps.push(Step::Correction {
                    position: index,
                    original: lookahead,
                    replacement,
                });
                stack.push(top);
            } else {
                return fail(steps, FailureReason::UnexpectedTerminal, lookahead);
            }
        }

        // The end marker sits at the bottom of the stack and returns above.
        self.finish(steps, tokens, index)
    }

    fn finish(&self, mut steps: Vec<Step>, tokens: &[String], index: usize) -> ParseOutcome {
        if index < tokens.len() && !self.config.allow_trailing_input {
            return fail(steps, FailureReason::TrailingInput, tokens[index].clone());
        }
        steps.push(Step::Accept);
        ParseOutcome {
            success: true,
            steps,
            failure_token: None,
            failure: None,
        }
    }

    /// One oracle round trip. A blank answer counts as no answer.
    fn ask_oracle(&self, token: &str, non_terminal: &str) -> Option<String> {
        let description = error_description(token, non_terminal);
        debug!(%token, %non_terminal, "asking oracle for a correction");
        let suggestion = self.oracle.suggest(&description)?;
        let suggestion = suggestion.trim();
        (!suggestion.is_empty()).then(|| suggestion.to_string())
    }

    /// Suggestions must be symbols of the grammar.
    fn is_valid_suggestion(&self, suggestion: &str) -> bool {
        let valid =
            self.grammar.is_non_terminal(suggestion) || self.grammar.is_terminal(suggestion);
        if !valid {
            debug!(%suggestion, "rejecting suggestion outside the grammar");
        }
        valid
    }
}

fn fail(mut steps: Vec<Step>, reason: FailureReason, token: String) -> ParseOutcome {
    steps.push(Step::Failure {
        reason,
        token: token.clone(),
    });
    ParseOutcome {
        success: false,
        steps,
        failure_token: Some(token),
        failure: Some(reason),
    }
}

/// Parse `tokens` with the default configuration.
pub fn parse(
    tokens: &mut Vec<String>,
    grammar: &Grammar,
    oracle: &dyn CorrectionOracle,
) -> ParseOutcome {
    PredictiveParser::new(grammar, oracle).parse(tokens)
}
