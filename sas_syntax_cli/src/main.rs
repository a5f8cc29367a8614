//! # SAS Syntax CLI
//!
//! Runs the editing operations over a file and prints text or JSON.
//! Positions are byte offsets (`120`) or 1-based `line:column` pairs
//! (`7:5`).

use clap::{Args, Parser, Subcommand};
use sas_syntax::buffer::SourceBuffer;
use sas_syntax::config::runtime::{parse_log_level, LogLevel, RuntimeConfig};
use sas_syntax::editing::{apply_indentation, Editor};
use sas_syntax::logging::{self, LogEvent, Logger, LoggingService};
use sas_syntax::style::{highlight, DefaultStyleMap};
use sas_syntax::{log_info, TextBuffer};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "sas-syntax", version, about = "Statement, block and indentation queries for SAS source files")]
struct Cli {
    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// TOML file with lexical, scanning, indentation and logging preferences
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// error, warning, info or debug
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every token with its kind
    Tokens {
        file: PathBuf,
        /// Show logical tokens: comments dropped, `data =` merged
        #[arg(long)]
        resolved: bool,
    },
    /// Show the statement around a position
    Statement { file: PathBuf, position: Position },
    /// Show the block around a position, or navigate between blocks
    Block(BlockArgs),
    /// Target column for the line containing a position
    Indent { file: PathBuf, position: Position },
    /// Target columns for a region, or the whole file
    Reindent {
        file: PathBuf,
        #[arg(long)]
        start: Option<Position>,
        #[arg(long)]
        end: Option<Position>,
        /// Print the reindented text
        #[arg(long)]
        apply: bool,
    },
    /// Styled spans for every non-plain token
    Highlight { file: PathBuf },
}

#[derive(Args)]
struct BlockArgs {
    file: PathBuf,
    position: Position,
    /// The first block starting after the position
    #[arg(long, conflicts_with_all = ["previous", "submit"])]
    next: bool,
    /// The last block starting before the position
    #[arg(long, conflicts_with = "submit")]
    previous: bool,
    /// The text to submit: the block, or the line when no block is found
    #[arg(long)]
    submit: bool,
}

#[derive(Debug, Clone, Copy)]
enum Position {
    Offset(usize),
    LineColumn { line: usize, column: usize },
}

impl std::str::FromStr for Position {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let number = |part: &str| {
            part.trim()
                .parse::<usize>()
                .map_err(|_| format!("invalid position '{}'", value))
        };
        match value.split_once(':') {
            Some((line, column)) => {
                let (line, column) = (number(line)?, number(column)?);
                if line == 0 || column == 0 {
                    return Err(format!("line and column are 1-based in '{}'", value));
                }
                Ok(Position::LineColumn { line, column })
            }
            None => Ok(Position::Offset(number(value)?)),
        }
    }
}

impl Position {
    fn resolve(self, buffer: &dyn TextBuffer) -> CliResult<usize> {
        match self {
            Position::Offset(offset) => Ok(offset),
            Position::LineColumn { line, column } => {
                let map = buffer.source_map();
                let start = map
                    .line_start(line - 1)
                    .ok_or_else(|| format!("line {} is past the end of the file", line))?;
                let end = map.line_end(line - 1).unwrap_or_else(|| buffer.len());
                Ok((start + column - 1).min(end))
            }
        }
    }
}

/// Forwards engine events to the `log` facade
struct LogBridge;

impl Logger for LogBridge {
    fn log(&self, event: &LogEvent) {
        let level = match event.level {
            logging::LogLevel::Error => log::Level::Error,
            logging::LogLevel::Warning => log::Level::Warn,
            logging::LogLevel::Info => log::Level::Info,
            logging::LogLevel::Debug => log::Level::Debug,
        };
        log::log!(target: "sas_syntax", level, "{}", event.format());
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> CliResult<()> {
    let config = load_config(cli.config.as_deref())?;
    init_logging(&cli, &config)?;

    let editor = Editor::from_config(&config);
    let file = match &cli.command {
        Command::Tokens { file, .. }
        | Command::Statement { file, .. }
        | Command::Indent { file, .. }
        | Command::Reindent { file, .. }
        | Command::Highlight { file } => file,
        Command::Block(args) => &args.file,
    };
    let text = sas_syntax::load_file(file)?;
    let buffer = SourceBuffer::with_preferences(&text, config.lexical.clone());
    let name = file.display().to_string();

    logging::with_buffer_context(&name, || {
        log_info!("Running command", "bytes" => buffer.len());
        execute(&cli, &editor, &buffer)
    })
}

fn load_config(path: Option<&Path>) -> CliResult<RuntimeConfig> {
    let Some(path) = path else {
        return Ok(RuntimeConfig::default());
    };
    let source = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read config {}: {}", path.display(), e))?;
    Ok(RuntimeConfig::from_toml_str(&source)?)
}

fn init_logging(cli: &Cli, config: &RuntimeConfig) -> CliResult<()> {
    let level = match &cli.log_level {
        Some(value) => {
            parse_log_level(value).ok_or_else(|| format!("unknown log level '{}'", value))?
        }
        None if cli.config.is_some() => config.logging.min_log_level,
        None => LogLevel::Warning,
    };

    let filter = match level {
        LogLevel::Error => log::LevelFilter::Error,
        LogLevel::Warning => log::LevelFilter::Warn,
        LogLevel::Info => log::LevelFilter::Info,
        LogLevel::Debug => log::LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(filter)
        .parse_default_env()
        .format_timestamp(None)
        .try_init()?;

    logging::config::init_runtime_preferences(config.logging.clone())?;
    let service = LoggingService::new(Arc::new(LogBridge), level.to_events_log_level());
    logging::init_global_logging_with_service(Arc::new(service))?;
    Ok(())
}

fn execute(cli: &Cli, editor: &Editor, buffer: &SourceBuffer) -> CliResult<()> {
    let text = buffer.text();
    match &cli.command {
        Command::Tokens { resolved, .. } => {
            let tokens = if *resolved {
                editor.logical_tokens(buffer)
            } else {
                editor.tokens(buffer)
            };
            emit(cli, &tokens, |out| {
                for token in &tokens {
                    out.push(format!(
                        "{}..{}\t{}\t{}",
                        token.start,
                        token.end,
                        token.kind,
                        token.lexeme.escape_debug()
                    ));
                }
            })
        }
        Command::Statement { position, .. } => {
            let range = editor.statement(buffer, position.resolve(buffer)?)?;
            let statement = StatementOutput {
                start: range.start,
                end: range.end,
                text: &text[range.clone()],
            };
            emit(cli, &statement, |out| {
                out.push(format!("{}..{}\t{}", range.start, range.end, statement.text.escape_debug()));
            })
        }
        Command::Block(args) => block(cli, editor, buffer, args),
        Command::Indent { position, .. } => {
            let column = editor.indent_for(buffer, position.resolve(buffer)?)?;
            emit(cli, &column, |out| out.push(column.to_string()))
        }
        Command::Reindent {
            start, end, apply, ..
        } => {
            let start = start.map(|p| p.resolve(buffer)).transpose()?.unwrap_or(0);
            let end = end
                .map(|p| p.resolve(buffer))
                .transpose()?
                .unwrap_or_else(|| buffer.len());
            let lines = editor.reindent_region(buffer, start, end)?;
            if *apply {
                print!("{}", apply_indentation(buffer, &lines));
                return Ok(());
            }
            emit(cli, &lines, |out| {
                for line in lines.iter().filter(|line| line.needs_change()) {
                    out.push(format!("{}\t{} -> {}", line.line, line.current, line.target));
                }
            })
        }
        Command::Highlight { .. } => {
            let spans = highlight(buffer, &DefaultStyleMap);
            emit(cli, &spans, |out| {
                for span in &spans {
                    out.push(format!(
                        "{}..{}\t{}\t{}",
                        span.start,
                        span.end,
                        span.face,
                        text[span.start..span.end].escape_debug()
                    ));
                }
            })
        }
    }
}

fn block(cli: &Cli, editor: &Editor, buffer: &SourceBuffer, args: &BlockArgs) -> CliResult<()> {
    let offset = args.position.resolve(buffer)?;

    if args.submit {
        let submission = editor.submission(buffer, offset)?;
        let source = match &submission.block {
            Some(block) => block.kind.as_str(),
            None => "line",
        };
        return emit(cli, &submission, |out| {
            out.push(format!("{}\t{}..{}", source, submission.start, submission.end));
        });
    }

    let block = if args.next {
        editor.next_block(buffer, offset)?
    } else if args.previous {
        editor.previous_block(buffer, offset)?
    } else {
        Some(editor.locate_enclosing_block(buffer, offset)?)
    };

    emit(cli, &block, |out| match &block {
        Some(block) => out.push(format!(
            "{}\t{}\t{}..{}",
            block.kind.as_str(),
            block.kind.name().unwrap_or("-"),
            block.start,
            block.end
        )),
        None => out.push("none".to_string()),
    })
}

#[derive(Serialize)]
struct StatementOutput<'a> {
    start: usize,
    end: usize,
    text: &'a str,
}

/// Print `value` as JSON, or the lines `text` produces
fn emit<T, F>(cli: &Cli, value: &T, text: F) -> CliResult<()>
where
    T: Serialize + ?Sized,
    F: FnOnce(&mut Vec<String>),
{
    if cli.json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        let mut lines = Vec::new();
        text(&mut lines);
        for line in lines {
            println!("{}", line);
        }
    }
    Ok(())
}
