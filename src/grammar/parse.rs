use tracing::debug;

use crate::{config::DuplicatePolicy, error::GrammarError, Grammar};

use super::EPSILON;

impl Grammar {
    /// Parse `NonTerminal -> Alt1 | Alt2` lines, skipping anything malformed.
    pub fn parse(grammar: &str) -> Self {
        Self::parse_with(grammar, DuplicatePolicy::Overwrite)
    }

    pub fn parse_with(grammar: &str, policy: DuplicatePolicy) -> Self {
        let mut raw_productions: Vec<(usize, &str)> = Vec::new();
        let mut g = Self::new();

        for (i, line) in grammar.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let Some((left, rights)) = line.split_once("->") else {
                debug!(line = i + 1, "skipping grammar line without \"->\"");
                continue;
            };
            let left = left.trim();
            if left.is_empty() {
                debug!(line = i + 1, "skipping grammar line with empty left side");
                continue;
            }
            raw_productions.push((g.get_or_add_non_terminal(left), rights));
        }

        g.build(raw_productions, policy);
        g
    }

    /// Like [`Grammar::parse_with`], but malformed lines are errors.
    pub fn parse_strict(grammar: &str, policy: DuplicatePolicy) -> Result<Self, GrammarError> {
        let mut raw_productions: Vec<(usize, &str)> = Vec::new();
        let mut g = Self::new();

        for (i, line) in grammar.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let parts: Vec<&str> = line.split("->").collect();
            if parts.len() == 1 {
                return Err(GrammarError::MissingArrow { line: i + 1 });
            } else if parts.len() > 2 {
                return Err(GrammarError::TooManyArrows { line: i + 1 });
            }
            let left = parts[0].trim();
            if left.is_empty() {
                return Err(GrammarError::EmptyLeftSide { line: i + 1 });
            } else if left.split_whitespace().count() != 1 {
                return Err(GrammarError::LeftSideContainsWhitespace { line: i + 1 });
            }
            raw_productions.push((g.get_or_add_non_terminal(left), parts[1]));
        }

        g.build(raw_productions, policy);
        Ok(g)
    }

    fn build(&mut self, raw_productions: Vec<(usize, &str)>, policy: DuplicatePolicy) {
        for (left, rights) in raw_productions {
            let productions: Vec<Vec<String>> = rights
                .split('|')
                .map(|right| {
                    let symbols: Vec<String> =
                        right.split_whitespace().map(|s| s.to_string()).collect();
                    if symbols.is_empty() {
                        vec![EPSILON.to_string()]
                    } else {
                        symbols
                    }
                })
                .collect();

            let nt = &mut self.non_terminals[left];
            match policy {
                DuplicatePolicy::Overwrite => {
                    if !nt.productions.is_empty() {
                        debug!(non_terminal = %nt.name, "redeclared non-terminal replaces earlier alternatives");
                    }
                    nt.productions = productions;
                }
                DuplicatePolicy::Append => nt.productions.extend(productions),
            }
        }
        self.collect_terminals();
    }
}

#[cfg(test)]
mod tests {
    use crate::{config::DuplicatePolicy, error::GrammarError, grammar::EPSILON, Grammar};
    use pretty_assertions::assert_eq;

    fn prods(g: &Grammar, name: &str) -> Vec<Vec<String>> {
        g.productions(name).unwrap().to_vec()
    }

    fn v(symbols: &[&str]) -> Vec<String> {
        symbols.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn simple_parse() {
        let g = Grammar::parse("A -> x y | z");
        assert_eq!(prods(&g, "A"), vec![v(&["x", "y"]), v(&["z"])]);
        assert_eq!(g.start_symbol(), Some("A"));
        assert_eq!(g.terminals().collect::<Vec<_>>(), vec!["x", "y", "z"]);
    }

    #[test]
    fn simple_parse_with_space() {
        let g = Grammar::parse("  S -> a ");
        assert_eq!(prods(&g, "S"), vec![v(&["a"])]);
    }

    #[test]
    fn empty_parse() {
        let g = Grammar::parse("  \n  ");
        assert!(g.is_empty());
        assert_eq!(g.start_symbol(), None);
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let g = Grammar::parse("S -> a B\nnot a rule\n| c\n-> d\nB -> b");
        assert_eq!(
            g.non_terminals().map(|nt| nt.name.as_str()).collect::<Vec<_>>(),
            vec!["S", "B"]
        );
        assert_eq!(prods(&g, "B"), vec![v(&["b"])]);
    }

    #[test]
    fn splits_on_first_arrow_only() {
        let g = Grammar::parse("S -> a -> b");
        assert_eq!(prods(&g, "S"), vec![v(&["a", "->", "b"])]);
    }

    #[test]
    fn non_terminals_used_before_declaration_are_not_terminals() {
        let g = Grammar::parse(crate::grammar::EXPRESSION_GRAMMAR);
        assert_eq!(
            g.terminals().collect::<Vec<_>>(),
            vec!["+", "*", "(", ")", "id"]
        );
        assert!(g.is_non_terminal("E'"));
        assert!(!g.is_terminal(EPSILON));
    }

    #[test]
    fn empty_alternative_is_epsilon() {
        let g = Grammar::parse("A -> x |");
        assert_eq!(prods(&g, "A"), vec![v(&["x"]), v(&[EPSILON])]);
    }

    #[test]
    fn redeclaration_overwrites_by_default() {
        let g = Grammar::parse("A -> x\nB -> y\nA -> z");
        assert_eq!(prods(&g, "A"), vec![v(&["z"])]);
        assert_eq!(g.start_symbol(), Some("A"));
        assert_eq!(g.terminals().collect::<Vec<_>>(), vec!["z", "y"]);
    }

    #[test]
    fn redeclaration_appends_when_asked() {
        let g = Grammar::parse_with("A -> x\nA -> z | ε", DuplicatePolicy::Append);
        assert_eq!(prods(&g, "A"), vec![v(&["x"]), v(&["z"]), v(&[EPSILON])]);
    }

    #[test]
    fn strict_accepts_well_formed() {
        let strict =
            Grammar::parse_strict(crate::grammar::EXPRESSION_GRAMMAR, DuplicatePolicy::Overwrite)
                .unwrap();
        assert_eq!(strict, Grammar::parse(crate::grammar::EXPRESSION_GRAMMAR));
    }

    #[test]
    fn strict_reports_malformed_lines() {
        let parse = |s| Grammar::parse_strict(s, DuplicatePolicy::Overwrite);
        assert_eq!(
            parse("S -> a -> b"),
            Err(GrammarError::TooManyArrows { line: 1 })
        );
        assert_eq!(parse("-> a"), Err(GrammarError::EmptyLeftSide { line: 1 }));
        assert_eq!(
            parse("S -> a\n| a b"),
            Err(GrammarError::MissingArrow { line: 2 })
        );
        assert_eq!(
            parse("\nS a S -> x"),
            Err(GrammarError::LeftSideContainsWhitespace { line: 2 })
        );
    }
}
