pub mod grammar;
pub mod parse;
pub mod predictive;
pub mod pretty_print;
pub use grammar::Grammar;

pub const EPSILON: &str = "ε";
pub const END_MARK: &str = "$";

/// The expression grammar used as the default input of the front-ends.
pub const EXPRESSION_GRAMMAR: &str = "E -> T E'
E' -> + T E' | ε
T -> F T'
T' -> * F T' | ε
F -> ( E ) | id";

/// Split an input string into the whitespace-delimited tokens the parser consumes.
pub fn tokenize(input: &str) -> Vec<String> {
    input.split_whitespace().map(|s| s.to_string()).collect()
}
