use std::{fs, io::Read, path::PathBuf, process, time::Duration};

use clap::{Parser, ValueEnum};
use tracing::warn;

use ll1_recovery::{
    tokenize, CorrectionOracle, DuplicatePolicy, GeminiOracle, Grammar, NoOracle, OracleConfig,
    ParserConfig, PredictiveParser,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Plain,
    Latex,
    Json,
}

/// LL(1) predictive parser with oracle-driven error recovery.
///
/// The correction oracle is Gemini; it is used when GEMINI_API_KEY is set.
#[derive(Parser, Debug)]
#[command(name = "ll1-recovery", version)]
struct Cli {
    /// Grammar file, one `NonTerminal -> Alt1 | Alt2` rule per line (stdin when absent)
    grammar: Option<PathBuf>,

    /// Space-separated input tokens
    #[arg(short, long)]
    input: String,

    /// Start symbol (defaults to the first declared non-terminal)
    #[arg(long)]
    start: Option<String>,

    /// Corrections accepted before giving up
    #[arg(long, default_value_t = ll1_recovery::config::DEFAULT_MAX_CORRECTIONS)]
    max_corrections: usize,

    /// Ignore tokens left over once the derivation is complete
    #[arg(long)]
    allow_trailing: bool,

    /// Merge alternatives of a non-terminal declared on several lines
    #[arg(long)]
    append_duplicates: bool,

    /// Reject malformed grammar lines instead of skipping them
    #[arg(long)]
    strict: bool,

    /// Never ask the correction oracle
    #[arg(long)]
    no_oracle: bool,

    /// Gemini model name
    #[arg(long)]
    model: Option<String>,

    /// Oracle request timeout in seconds
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,

    /// Print the parsed grammar before the trace
    #[arg(long)]
    print_grammar: bool,

    #[arg(short, long, default_value = "plain", value_enum)]
    format: OutputFormat,
}

/// Enable with `RUST_LOG=ll1_recovery=debug`.
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn read_grammar(path: Option<&PathBuf>) -> std::io::Result<String> {
    match path {
        Some(path) => fs::read_to_string(path),
        None => {
            let mut input = String::new();
            std::io::stdin().lock().read_to_string(&mut input)?;
            Ok(input)
        }
    }
}

fn build_oracle(cli: &Cli) -> Box<dyn CorrectionOracle> {
    if cli.no_oracle {
        return Box::new(NoOracle);
    }
    let config = OracleConfig::from_env().and_then(|mut config| {
        config.timeout = Duration::from_secs(cli.timeout_secs);
        match &cli.model {
            Some(model) => config.with_model(model.clone()),
            None => Ok(config),
        }
    });
    match config {
        Ok(config) => Box::new(GeminiOracle::new(config)),
        Err(e) => {
            warn!(error = %e, "running without correction oracle");
            Box::new(NoOracle)
        }
    }
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let text = match read_grammar(cli.grammar.as_ref()) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("error: failed to read grammar: {}", e);
            process::exit(2);
        }
    };

    let policy = if cli.append_duplicates {
        DuplicatePolicy::Append
    } else {
        DuplicatePolicy::Overwrite
    };
    let grammar = if cli.strict {
        match Grammar::parse_strict(&text, policy) {
            Ok(g) => g,
            Err(e) => {
                eprintln!("error: {}", e);
                process::exit(2);
            }
        }
    } else {
        Grammar::parse_with(&text, policy)
    };

    if cli.print_grammar {
        let t = grammar.to_production_output_vec();
        println!(
            "{}",
            match cli.format {
                OutputFormat::Latex => t.to_latex(),
                OutputFormat::Plain | OutputFormat::Json => t.to_plaintext(),
            }
        );
    }

    let oracle = build_oracle(&cli);
    let config = ParserConfig {
        start_symbol: cli.start.clone(),
        max_corrections: cli.max_corrections,
        allow_trailing_input: cli.allow_trailing,
    };
    let parser = PredictiveParser::with_config(&grammar, oracle.as_ref(), config);

    let mut tokens = tokenize(&cli.input);
    let outcome = parser.parse(&mut tokens);

    println!(
        "{}",
        match cli.format {
            OutputFormat::Plain => outcome.to_plaintext(),
            OutputFormat::Latex => outcome.to_latex(),
            OutputFormat::Json => outcome.to_json(),
        }
    );
    if outcome.corrections().next().is_some() && cli.format == OutputFormat::Plain {
        println!("Corrected input: {}", tokens.join(" "));
    }

    if !outcome.success {
        process::exit(1);
    }
}
