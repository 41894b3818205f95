//! # Simple Lexer CLI
//!
//! Prints the tokens of a source file (or standard input), one
//! `"{text}\t\t{kind}"` line per token, or a JSON token report.
//!
//! Text output is written as each token is recognized, so tokens from
//! an interactive standard input appear line by line.

use clap::{ArgAction, Parser, ValueEnum};
use simple_lexer::config::runtime::{FileProcessorPreferences, LogLevel, LoggingPreferences};
use simple_lexer::file_processor::{FileProcessingResult, FileProcessor};
use simple_lexer::lexical::{self, LexerError, TokenCounts, Tokenizer};
use simple_lexer::logging;
use simple_lexer::output::{self, TokenReport};
use simple_lexer::source::{CharSource, ReaderSource, StrSource};
use simple_lexer::tokens::TokenStream;
use simple_lexer::{log_error, log_info};
use std::error::Error;
use std::io::{self, BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// One `text<TAB><TAB>kind` line per token
    Text,
    /// Pretty-printed JSON token report
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "simple-lexer")]
#[command(version, about = "Tokenize a source file with the simple_lexer DFA", long_about = None)]
struct Cli {
    /// Source file to tokenize; standard input when omitted or `-`
    file: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Print token counts to stderr after the tokens
    #[arg(long)]
    stats: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// Input path, or `None` for standard input
    fn input_path(&self) -> Option<&Path> {
        self.file
            .as_deref()
            .filter(|path| path.as_os_str() != "-")
    }

    fn log_level(&self) -> LogLevel {
        match self.verbose {
            0 => LogLevel::Warning,
            1 => LogLevel::Info,
            _ => LogLevel::Debug,
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(cli.log_level())?;

    log_info!("simple-lexer starting",
        "input" => input_label(&cli),
        "format" => format!("{:?}", cli.format)
    );

    let stdout = io::stdout();
    let counts = match cli.format {
        // Stdout is line buffered, so each token line reaches the terminal
        // as soon as it is recognized
        OutputFormat::Text if cli.input_path().is_none() => {
            let stdin = io::stdin();
            stream_reader(stdin.lock(), &mut stdout.lock())?
        }
        OutputFormat::Text => {
            let mut out = BufWriter::new(stdout.lock());
            let counts = stream_file(&load_file(&cli)?, &mut out)?;
            out.flush()?;
            counts
        }
        OutputFormat::Json => {
            let stream = collect_input(&cli)?;
            let report = TokenReport::new(input_label(&cli), &stream);
            let report = if cli.stats {
                report.with_counts(&stream)
            } else {
                report
            };

            let mut out = BufWriter::new(stdout.lock());
            report.write_json(&mut out)?;
            out.flush()?;
            lexical::get_token_counts(&stream)
        }
    };

    log::debug!("wrote {} tokens", counts.total);

    if cli.stats {
        print_stats(&counts);
    }

    Ok(())
}

/// Route library events into `env_logger`
///
/// `RUST_LOG` wins over the `-v` default, and the library's own level
/// follows whatever filter `env_logger` ended up with.
fn init_logging(level: LogLevel) -> Result<(), Box<dyn Error>> {
    let filter = match level {
        LogLevel::Error => "error",
        LogLevel::Warning => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    let preferences = LoggingPreferences {
        min_log_level: library_log_level(log::max_level()),
        ..LoggingPreferences::default()
    };
    logging::config::init_runtime_preferences(preferences)?;
    logging::init_global_logging()?;
    Ok(())
}

/// Library level that lets through everything the facade filter allows
fn library_log_level(filter: log::LevelFilter) -> LogLevel {
    match filter {
        log::LevelFilter::Off | log::LevelFilter::Error => LogLevel::Error,
        log::LevelFilter::Warn => LogLevel::Warning,
        log::LevelFilter::Info => LogLevel::Info,
        log::LevelFilter::Debug | log::LevelFilter::Trace => LogLevel::Debug,
    }
}

fn input_label(cli: &Cli) -> String {
    cli.input_path()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Write each token as soon as the tokenizer produces it
fn stream_tokens<S, W>(tokenizer: &mut Tokenizer<S>, out: &mut W) -> Result<TokenCounts, Box<dyn Error>>
where
    S: CharSource,
    W: Write,
{
    let mut counts = TokenCounts::default();
    while let Some(token) = tokenizer.next_token()? {
        output::write_token(out, &token)?;
        counts.record(&token);
    }
    Ok(counts)
}

/// Stream tokens from a reader, surfacing the read error that ended it
fn stream_reader<R, W>(reader: R, out: &mut W) -> Result<TokenCounts, Box<dyn Error>>
where
    R: BufRead,
    W: Write,
{
    let mut tokenizer = lexical::create_tokenizer(ReaderSource::new(reader));
    let counts = stream_tokens(&mut tokenizer, out)?;
    out.flush()?;

    match tokenizer.source_mut().take_error() {
        Some(error) => {
            let error = LexerError::from(error);
            log_error!(error.error_code(), "Failed to read standard input",
                "error" => &error,
                "tokens_written" => counts.total
            );
            Err(error.into())
        }
        None => Ok(counts),
    }
}

fn stream_file<W: Write>(file_result: &FileProcessingResult, out: &mut W) -> Result<TokenCounts, Box<dyn Error>> {
    logging::with_file_context(file_result.metadata.path.clone(), 0, || {
        let mut tokenizer = lexical::create_tokenizer(StrSource::new(&file_result.source));
        stream_tokens(&mut tokenizer, out)
    })
}

fn load_file(cli: &Cli) -> Result<FileProcessingResult, Box<dyn Error>> {
    let path = cli.input_path().ok_or("No input file given")?;
    let path_str = path.to_str().ok_or_else(|| {
        format!("Input path is not valid UTF-8: {}", path.display())
    })?;

    let processor = FileProcessor::from_preferences(&FileProcessorPreferences::default());
    Ok(processor.process_file(path_str)?)
}

/// Tokenize the whole input for the JSON report
fn collect_input(cli: &Cli) -> Result<TokenStream, Box<dyn Error>> {
    if cli.input_path().is_none() {
        let stdin = io::stdin();
        return lexical::tokenize_reader(stdin.lock()).map_err(|e| {
            log_error!(e.error_code(), "Failed to tokenize standard input", "error" => &e);
            e.into()
        });
    }

    Ok(lexical::tokenize_file_result(load_file(cli)?)?)
}

fn print_stats(counts: &TokenCounts) {
    let stderr = io::stderr();
    let mut err = stderr.lock();

    // Best effort; stdout already carries the result
    let _ = writeln!(err, "\n=== Token Summary ===");
    let _ = writeln!(err, "Total: {}", counts.total);
    let _ = writeln!(err, "Keywords: {}", counts.keywords);
    let _ = writeln!(err, "Identifiers: {}", counts.identifiers);
    let _ = writeln!(err, "Literals: {}", counts.literals);
    let _ = writeln!(err, "Operators: {}", counts.operators);
    let _ = writeln!(err, "Punctuation: {}", counts.punctuation);
    for (kind, count) in &counts.by_kind {
        let _ = writeln!(err, "  {:<16}{}", kind, count);
    }
}
