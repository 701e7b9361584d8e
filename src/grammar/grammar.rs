use std::collections::HashMap;

use super::EPSILON;

pub type Production = Vec<String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonTerminal {
    pub index: usize,
    pub name: String,
    pub productions: Vec<Production>,
}

impl NonTerminal {
    pub fn new(index: usize, name: String) -> Self {
        Self {
            index,
            name,
            productions: Vec::new(),
        }
    }
}

/// Mapping from non-terminal to its ordered alternatives.
///
/// Built once by [`Grammar::parse`] and only read afterwards. Non-terminals keep
/// the position of their first declaration, so the first one doubles as the
/// default start symbol.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grammar {
    pub(crate) non_terminals: Vec<NonTerminal>,
    pub(crate) symbol_table: HashMap<String, usize>,
    pub(crate) terminals: Vec<String>,
}

impl Grammar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn non_terminals(&self) -> impl Iterator<Item = &NonTerminal> {
        self.non_terminals.iter()
    }

    pub fn terminals(&self) -> impl Iterator<Item = &str> {
        self.terminals.iter().map(|t| t.as_str())
    }

    pub fn get_non_terminal(&self, name: &str) -> Option<&NonTerminal> {
        self.symbol_table
            .get(name)
            .map(|&idx| &self.non_terminals[idx])
    }

    pub fn productions(&self, name: &str) -> Option<&[Production]> {
        self.get_non_terminal(name)
            .map(|nt| nt.productions.as_slice())
    }

    pub fn is_non_terminal(&self, name: &str) -> bool {
        self.symbol_table.contains_key(name)
    }

    pub fn is_terminal(&self, name: &str) -> bool {
        self.terminals.iter().any(|t| t == name)
    }

    pub fn start_symbol(&self) -> Option<&str> {
        self.non_terminals.first().map(|nt| nt.name.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.non_terminals.is_empty()
    }

    pub(crate) fn add_non_terminal(&mut self, name: &str) -> usize {
        let idx = self.non_terminals.len();
        self.non_terminals
            .push(NonTerminal::new(idx, name.to_string()));
        self.symbol_table.insert(name.to_string(), idx);
        idx
    }

    pub(crate) fn get_or_add_non_terminal(&mut self, name: &str) -> usize {
        match self.symbol_table.get(name) {
            Some(&idx) => idx,
            None => self.add_non_terminal(name),
        }
    }

    /// Collect every leaf symbol that is neither a non-terminal nor ε, in order
    /// of first appearance. Must run after all left sides are known.
    pub(crate) fn collect_terminals(&mut self) {
        let mut terminals: Vec<String> = Vec::new();
        for nt in &self.non_terminals {
            for symbol in nt.productions.iter().flatten() {
                if symbol != EPSILON
                    && !self.symbol_table.contains_key(symbol)
                    && !terminals.contains(symbol)
                {
                    terminals.push(symbol.clone());
                }
            }
        }
        self.terminals = terminals;
    }
}
