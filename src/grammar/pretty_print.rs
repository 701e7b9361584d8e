use crowbook_text_processing::escape;

use super::{
    predictive::{ParseOutcome, Step},
    Grammar, END_MARK, EPSILON,
};

#[derive(Debug, Clone)]
pub struct ProductionOutput<'a> {
    pub left: &'a str,
    pub rights: Vec<Vec<&'a str>>,
}

impl<'a> ProductionOutput<'a> {
    /// One alternative, as printed by expansion steps of a trace.
    pub fn single(left: &'a str, production: &'a [String]) -> Self {
        Self {
            left,
            rights: vec![production.iter().map(|s| s.as_str()).collect()],
        }
    }

    pub fn to_plaintext(&self, left_width: usize, multiline: bool) -> String {
        self.rights
            .iter()
            .map(|right| right.join(" "))
            .enumerate()
            .map(|(i, right)| {
                if i == 0 {
                    format!("{:>width$} -> {}", self.left, right, width = left_width)
                } else if multiline {
                    format!("{:>width$}  | {}", "", right, width = left_width)
                } else {
                    format!(" | {}", right)
                }
            })
            .collect::<Vec<_>>()
            .join(if multiline { "\n" } else { "" })
    }

    pub fn to_latex(&self, and_sign: bool) -> String {
        if self.rights.is_empty() {
            return String::new();
        }

        let left = if and_sign {
            format!("{} & \\rightarrow &", escape::tex(self.left))
        } else {
            format!("{} \\rightarrow ", escape::tex(self.left))
        };
        let right = self
            .rights
            .iter()
            .map(|right| {
                right
                    .iter()
                    .map(|s| escape::tex(*s))
                    .collect::<Vec<_>>()
                    .join(" \\ ")
            })
            .collect::<Vec<_>>()
            .join(" \\mid ");

        (left + &right).replace(EPSILON, "\\epsilon")
    }
}

pub struct ProductionOutputVec<'a> {
    productions: Vec<ProductionOutput<'a>>,
}

impl ProductionOutputVec<'_> {
    pub fn to_plaintext(&self) -> String {
        let left_max_len = self
            .productions
            .iter()
            .map(|p| p.left.chars().count())
            .max()
            .unwrap_or(0);
        self.productions
            .iter()
            .map(|s| s.to_plaintext(left_max_len, true))
            .collect::<Vec<String>>()
            .join("\n")
    }

    pub fn to_latex(&self) -> String {
        std::iter::once("\\[\\begin{array}{cll}".to_string())
            .chain(self.productions.iter().map(|s| s.to_latex(true)))
            .chain(std::iter::once("\\end{array}\\]".to_string()))
            .collect::<Vec<String>>()
            .join("\\\\\n")
    }
}

impl Grammar {
    pub fn to_production_output_vec(&self) -> ProductionOutputVec {
        let productions = self
            .non_terminals()
            .map(|nt| ProductionOutput {
                left: nt.name.as_str(),
                rights: nt
                    .productions
                    .iter()
                    .map(|production| production.iter().map(|s| s.as_str()).collect())
                    .collect(),
            })
            .collect();
        ProductionOutputVec { productions }
    }
}

impl ParseOutcome {
    pub fn summary(&self) -> String {
        match (&self.failure_token, &self.failure) {
            (Some(token), Some(reason)) => {
                format!("Parsing Failed! Error at token '{}' ({}).", token, reason)
            }
            _ => "Parsing Successful!".to_string(),
        }
    }

    pub fn to_plaintext(&self) -> String {
        std::iter::once(self.summary())
            .chain(self.steps.iter().map(|step| step.to_string()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn to_latex(&self) -> String {
        let summary = match &self.failure_token {
            Some(token) => format!(
                "Parsing Failed! Error at token '{}'.",
                tex_symbol(token)
            ),
            None => "Parsing Successful!".to_string(),
        };
        let items = self
            .steps
            .iter()
            .map(|step| format!("  \\item {}", step.to_latex()))
            .collect::<Vec<_>>()
            .join("\n");
        format!(
            "\\textbf{{{}}}\n\\begin{{enumerate}}\n{}\n\\end{{enumerate}}",
            summary, items
        )
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap()
    }
}

/// Escape a grammar symbol for LaTeX text mode.
fn tex_symbol(symbol: &str) -> String {
    match symbol {
        END_MARK => "\\$".to_string(),
        EPSILON => "$\\epsilon$".to_string(),
        _ => escape::tex(symbol).into_owned(),
    }
}

impl Step {
    pub fn to_latex(&self) -> String {
        match self {
            Step::State {
                stack,
                top,
                lookahead,
            } => format!(
                "Stack: [{}], Top: {}, Current Token: {}",
                stack
                    .iter()
                    .map(|s| tex_symbol(s))
                    .collect::<Vec<_>>()
                    .join(", "),
                tex_symbol(top),
                tex_symbol(lookahead)
            ),
            Step::Match { terminal } => format!("Matched terminal: {}", tex_symbol(terminal)),
            Step::Expand {
                non_terminal,
                production,
            } => format!(
                "Expanding ${}$",
                ProductionOutput::single(non_terminal, production).to_latex(false)
            ),
            Step::Correction {
                position,
                original,
                replacement,
            } => format!(
                "Error at '{}' (token {}) $\\rightarrow$ Suggested Replacement: '{}'",
                tex_symbol(original),
                position,
                tex_symbol(replacement)
            ),
            Step::RejectedSuggestion {
                position,
                original,
                suggestion,
            } => format!(
                "Error at '{}' (token {}) $\\rightarrow$ {}",
                tex_symbol(original),
                position,
                match suggestion {
                    Some(s) => format!("Rejected Suggestion: '{}'", tex_symbol(s)),
                    None => "No Suggestion".to_string(),
                }
            ),
            Step::Accept => "Accepted".to_string(),
            Step::Failure { reason, token } => {
                format!("Parsing failed at '{}': {}", tex_symbol(token), reason)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        grammar::{predictive::parse, tokenize, EXPRESSION_GRAMMAR},
        oracle::NoOracle,
        Grammar,
    };
    use pretty_assertions::assert_eq;

    #[test]
    fn production_listing() {
        let g = Grammar::parse("S -> a B | ε\nB -> b");
        assert_eq!(
            g.to_production_output_vec().to_plaintext(),
            "S -> a B\n   | ε\nB -> b"
        );
        assert_eq!(
            g.to_production_output_vec().to_latex(),
            "\\[\\begin{array}{cll}\\\\\nS & \\rightarrow &a \\ B \\mid \\epsilon\\\\\nB & \\rightarrow &b\\\\\n\\end{array}\\]"
        );
    }

    #[test]
    fn outcome_plaintext() {
        let g = Grammar::parse(EXPRESSION_GRAMMAR);
        let mut tokens = tokenize("id + +");
        let text = parse(&mut tokens, &g, &NoOracle).to_plaintext();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("Parsing Failed! Error at token '+' (no valid correction found).")
        );
        assert_eq!(lines.next(), Some("Stack: [$], Top: E, Current Token: id"));
        assert_eq!(lines.next(), Some("Expanding E -> T E'"));
        assert_eq!(
            text.lines().last(),
            Some("Parsing failed at '+': no valid correction found")
        );
    }

    #[test]
    fn outcome_json() {
        let g = Grammar::parse("S -> a");
        let mut tokens = tokenize("a");
        let json: serde_json::Value =
            serde_json::from_str(&parse(&mut tokens, &g, &NoOracle).to_json()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "success": true,
                "steps": [
                    { "kind": "state", "stack": ["$"], "top": "S", "lookahead": "a" },
                    { "kind": "expand", "non_terminal": "S", "production": ["a"] },
                    { "kind": "state", "stack": ["$"], "top": "a", "lookahead": "a" },
                    { "kind": "match", "terminal": "a" },
                    { "kind": "state", "stack": [], "top": "$", "lookahead": "$" },
                    { "kind": "accept" }
                ],
                "failure_token": null,
                "failure": null
            })
        );
    }

    #[test]
    fn outcome_latex() {
        let g = Grammar::parse("S -> a");
        let mut tokens = tokenize("a");
        assert_eq!(
            parse(&mut tokens, &g, &NoOracle).to_latex(),
            "\\textbf{Parsing Successful!}
\\begin{enumerate}
  \\item Stack: [\\$], Top: S, Current Token: a
  \\item Expanding $S \\rightarrow a$
  \\item Stack: [\\$], Top: a, Current Token: a
  \\item Matched terminal: a
  \\item Stack: [], Top: \\$, Current Token: \\$
  \\item Accepted
\\end{enumerate}"
        );
    }

    #[test]
    fn failed_outcome_latex() {
        let g = Grammar::parse("S -> a B\nB -> b | ε");
        let mut tokens = tokenize("a c");
        let latex = parse(&mut tokens, &g, &NoOracle).to_latex();
        assert!(latex.starts_with("\\textbf{Parsing Failed! Error at token 'c'.}\n"));
        assert!(latex.contains("  \\item Expanding $B \\rightarrow \\epsilon$\n"));
        assert!(latex.contains("  \\item Parsing failed at 'c': unconsumed input after end of derivation\n"));
    }
}
