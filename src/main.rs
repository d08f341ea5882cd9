mod debug_report;

use chrono::{DateTime, Utc};
use curalex::{
    Analysis, HeuristicChunker, ResourceConfig, Resources, UserAnalysis, analyze_message, analyze_message_verbose,
    classify_user,
};
use serde::Serialize;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use tracing::warn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const DEFAULT_RESOURCES: &str = "data";
const LOG_ENV: &str = "CURALEX_LOG";

fn main() {
    init_tracing();

    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    let resources = match load_resources(&config.source) {
        Ok(resources) => resources,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    };
    let chunker = HeuristicChunker::new();

    match &config.mode {
        Mode::Corpus(path) => {
            if let Err(err) = run_corpus(path, &resources, &chunker) {
                eprintln!("error: failed to read corpus '{}': {err}", path.display());
                std::process::exit(1);
            }
        }
        Mode::Message(message) => run_message(message, &config, &resources, &chunker),
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| "warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

/// One analyzed post, as a downstream store would persist it.
#[derive(Serialize)]
struct Record<'a> {
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<UserAnalysis>,
    /// Absent when the author was classified as not relevant.
    analysis: Option<Analysis>,
    created_at: DateTime<Utc>,
}

fn run_message(message: &str, config: &CliConfig, resources: &Resources, chunker: &HeuristicChunker) {
    let user = config
        .user
        .as_deref()
        .map(|name| classify_user(name, config.description.as_deref().unwrap_or(""), &resources.user));
    let relevant = user.as_ref().is_none_or(UserAnalysis::is_relevant);

    if config.verbose {
        if let Some(user) = &user {
            debug_report::print_user(user, config.color);
        }
        if relevant {
            let report = analyze_message_verbose(message, &resources.message, chunker);
            debug_report::print_run(&report, config.color);
        }
        return;
    }

    let analysis = relevant.then(|| analyze_message(message, &resources.message, chunker));
    let record = Record { message, user, analysis, created_at: Utc::now() };
    match serde_json::to_string_pretty(&record) {
        Ok(json) => println!("{json}"),
        Err(err) => {
            eprintln!("error: failed to serialize record: {err}");
            std::process::exit(1);
        }
    }
}

/// Print `solution, problem, rule, message` for every line with an answer.
fn run_corpus(path: &Path, resources: &Resources, chunker: &HeuristicChunker) -> io::Result<()> {
    let text = std::fs::read_to_string(path)?;
    let mut found = 0usize;
    let mut total = 0usize;
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        total += 1;
        let analysis = analyze_message(line, &resources.message, chunker);
        if let Analysis::Found { solution, problem, rule } = &analysis {
            found += 1;
            println!("{solution}\t{problem}\t{}\t{line}", rule.template);
        }
    }
    if found == 0 && total > 0 {
        warn!(lines = total, "no line of the corpus produced an answer");
    }
    Ok(())
}

enum ResourceSource {
    Dir(PathBuf),
    Config(PathBuf),
}

fn load_resources(source: &ResourceSource) -> curalex::Result<Resources> {
    match source {
        ResourceSource::Dir(dir) => Resources::load_dir(dir),
        ResourceSource::Config(path) => Resources::load(&ResourceConfig::from_json_file(path)?),
    }
}

enum Mode {
    Message(String),
    Corpus(PathBuf),
}

struct CliConfig {
    mode: Mode,
    source: ResourceSource,
    user: Option<String>,
    description: Option<String>,
    verbose: bool,
    color: bool,
}

fn parse_args() -> Result<CliConfig, String> {
    let mut message: Option<String> = None;
    let mut corpus: Option<PathBuf> = None;
    let mut source: Option<ResourceSource> = None;
    let mut user: Option<String> = None;
    let mut description: Option<String> = None;
    let mut verbose = false;
    let mut color = io::stdout().is_terminal();
    let mut args = std::env::args().skip(1).peekable();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("curalex {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "-v" | "--verbose" => verbose = true,
            "--color" => color = true,
            "--no-color" => color = false,
            "--resources" | "-r" => {
                let value = args.next().ok_or_else(|| "error: --resources expects a value".to_string())?;
                set_source(&mut source, ResourceSource::Dir(value.into()))?;
            }
            "--config" | "-c" => {
                let value = args.next().ok_or_else(|| "error: --config expects a value".to_string())?;
                set_source(&mut source, ResourceSource::Config(value.into()))?;
            }
            "--user" | "-u" => {
                user = Some(args.next().ok_or_else(|| "error: --user expects a value".to_string())?);
            }
            "--description" | "-d" => {
                description = Some(args.next().ok_or_else(|| "error: --description expects a value".to_string())?);
            }
            "--corpus" => {
                let value = args.next().ok_or_else(|| "error: --corpus expects a value".to_string())?;
                corpus = Some(value.into());
            }
            "--" => {
                let rest = args.collect::<Vec<_>>().join(" ");
                if !rest.trim().is_empty() {
                    set_message(&mut message, rest)?;
                }
                break;
            }
            _ if arg.starts_with("--resources=") => {
                let value = arg.trim_start_matches("--resources=");
                set_source(&mut source, ResourceSource::Dir(value.into()))?;
            }
            _ if arg.starts_with("--config=") => {
                let value = arg.trim_start_matches("--config=");
                set_source(&mut source, ResourceSource::Config(value.into()))?;
            }
            _ if arg.starts_with("--user=") => user = Some(arg.trim_start_matches("--user=").to_string()),
            _ if arg.starts_with("--description=") => {
                description = Some(arg.trim_start_matches("--description=").to_string());
            }
            _ if arg.starts_with("--corpus=") => corpus = Some(arg.trim_start_matches("--corpus=").into()),
            _ if arg.starts_with('-') => {
                return Err(format!("error: unknown option '{arg}'"));
            }
            _ => {
                let rest = std::iter::once(arg).chain(args).collect::<Vec<_>>().join(" ");
                set_message(&mut message, rest)?;
                break;
            }
        }
    }

    if description.is_some() && user.is_none() {
        return Err("error: --description requires --user".to_string());
    }
    let source = source.unwrap_or_else(|| ResourceSource::Dir(DEFAULT_RESOURCES.into()));

    let mode = match (corpus, message) {
        (Some(_), Some(_)) => return Err("error: --corpus cannot be combined with a message".to_string()),
        (Some(path), None) => Mode::Corpus(path),
        (None, Some(message)) => Mode::Message(message),
        (None, None) => Mode::Message(read_stdin_input()?),
    };

    if let Mode::Message(message) = &mode {
        if message.trim().is_empty() {
            return Err(format!("error: no message provided\n\n{}", help_text()));
        }
    }

    Ok(CliConfig { mode, source, user, description, verbose, color })
}

fn set_message(slot: &mut Option<String>, value: String) -> Result<(), String> {
    if slot.is_some() {
        return Err("error: message provided multiple times".to_string());
    }
    *slot = Some(value);
    Ok(())
}

fn set_source(slot: &mut Option<ResourceSource>, value: ResourceSource) -> Result<(), String> {
    if slot.is_some() {
        return Err("error: use only one of --resources and --config".to_string());
    }
    *slot = Some(value);
    Ok(())
}

fn read_stdin_input() -> Result<String, String> {
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).map_err(|err| format!("error: failed to read stdin: {err}"))?;
    Ok(buffer.trim().to_string())
}

fn print_help() {
    println!("{}", help_text());
}

fn help_text() -> String {
    format!(
        "curalex {version}

Extracts disease-treatment relations from short posts and classifies their authors.

Usage:
  curalex [OPTIONS] [--] <message...>
  curalex [OPTIONS] --corpus <file>

Options:
  -r, --resources <dir>      Resource directory. Default: {default_resources}
  -c, --config <file>        JSON resource configuration (instead of --resources).
  -u, --user <name>          Author display name to classify.
  -d, --description <text>   Author profile description (requires --user).
      --corpus <file>        Analyze every line of a file; prints
                             solution, problem, rule and message, tab separated.
  -v, --verbose              Print a stage-by-stage report instead of JSON.
  --color                    Force ANSI color output.
  --no-color                 Disable ANSI color output.
  -h, --help                 Show this help message.
  -V, --version              Print version information.

Without a message argument the message is read from stdin.

Environment:
  {log_env}                Log filter (e.g. curalex=debug). Default: warn.

Exit codes:
  0  Success.
  1  Resource or corpus load failure.
  2  Invalid arguments or missing input.
",
        version = env!("CARGO_PKG_VERSION"),
        default_resources = DEFAULT_RESOURCES,
        log_env = LOG_ENV,
    )
}
