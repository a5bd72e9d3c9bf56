use std::env;
use std::fs;
use std::io::{self, Read};
use std::process;

use log::{debug, info};
use richpost_core::{Diagnostic, DiagnosticSeverity, ParseResult, RenderOptions, Sanitizer};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
enum CliError {
    #[error("failed to read {path}: {source}")]
    Read { path: String, source: io::Error },
    #[error("failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Usage(String),
}

impl CliError {
    fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => 2,
            CliError::Read { .. } | CliError::Json(_) => 1,
        }
    }
}

#[derive(Clone, Copy)]
enum DiagnosticsMode {
    Json,
    Pretty,
}

struct Args {
    input: Option<String>,
    json: bool,
    strict: bool,
    diagnostics: Option<DiagnosticsMode>,
    options: RenderOptions,
}

#[derive(Serialize)]
struct JsonResult<'a> {
    text: &'a str,
    mentions: &'a [String],
    urls: &'a [String],
    images: &'a [String],
}

impl<'a> From<&'a ParseResult> for JsonResult<'a> {
    fn from(result: &'a ParseResult) -> Self {
        Self {
            text: &result.text,
            mentions: &result.mentions,
            urls: &result.urls,
            images: &result.images,
        }
    }
}

#[derive(Serialize)]
struct JsonDiagnostic<'a> {
    code: &'a str,
    severity: &'a str,
    message: &'a str,
    start: JsonPosition,
    end: JsonPosition,
}

#[derive(Serialize)]
struct JsonPosition {
    line: usize,
    character: usize,
}

fn main() {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("warn"));

    match run() {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("{}", err);
            if let CliError::Usage(_) = err {
                print_usage();
            }
            process::exit(err.exit_code());
        }
    }
}

fn run() -> Result<i32, CliError> {
    let Some(args) = parse_args(env::args().skip(1))? else {
        print_usage();
        return Ok(0);
    };

    let source = read_source(args.input.as_deref())?;
    info!("rendering {} bytes", source.len());

    let sanitizer = Sanitizer::with_options(args.options);
    debug!("render options: {:?}", sanitizer.options());
    let report = sanitizer.report(&source);

    if let Some(mode) = args.diagnostics {
        emit_diagnostics(&report.diagnostics, mode)?;
    }

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&JsonResult::from(&report.result))?
        );
    } else {
        print!("{}", report.result.text);
    }

    let warned = report
        .diagnostics
        .iter()
        .any(|diag| diag.severity == DiagnosticSeverity::Warning);
    Ok(if args.strict && warned { 1 } else { 0 })
}

/// Returns `None` when help was requested.
fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Option<Args>, CliError> {
    let mut parsed = Args {
        input: None,
        json: false,
        strict: false,
        diagnostics: None,
        options: RenderOptions::default(),
    };

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(None),
            "--json" => parsed.json = true,
            "--strict" => parsed.strict = true,
            "--no-youtube" => parsed.options.embed_youtube = false,
            "--no-media" => parsed.options.embed_media = false,
            "--media-width" => parsed.options.media_width = size_flag(&arg, args.next())?,
            "--youtube-height" => parsed.options.youtube_height = size_flag(&arg, args.next())?,
            "--diagnostics" => {
                parsed.diagnostics = Some(match args.next().as_deref() {
                    Some("json") => DiagnosticsMode::Json,
                    Some("pretty") => DiagnosticsMode::Pretty,
                    _ => return Err(CliError::Usage("--diagnostics expects: json | pretty".into())),
                });
            }
            _ if parsed.input.is_none() => parsed.input = Some(arg),
            _ => return Err(CliError::Usage(format!("unexpected argument: {}", arg))),
        }
    }

    Ok(Some(parsed))
}

fn size_flag(flag: &str, value: Option<String>) -> Result<u32, CliError> {
    let value = value.unwrap_or_default();
    value
        .parse()
        .map_err(|_| CliError::Usage(format!("{} expects a number, got {:?}", flag, value)))
}

fn read_source(input: Option<&str>) -> Result<String, CliError> {
    match input {
        Some(path) => fs::read_to_string(path).map_err(|source| CliError::Read {
            path: path.to_string(),
            source,
        }),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|source| CliError::Read {
                    path: "stdin".to_string(),
                    source,
                })?;
            Ok(buffer)
        }
    }
}

fn print_usage() {
    eprintln!(
        "Usage: richpost [--json] [--strict] [--no-youtube] [--no-media] [--media-width N] [--youtube-height N] [--diagnostics json|pretty] [input]"
    );
}

fn emit_diagnostics(diagnostics: &[Diagnostic], mode: DiagnosticsMode) -> Result<(), CliError> {
    match mode {
        DiagnosticsMode::Json => {
            let items: Vec<JsonDiagnostic<'_>> = diagnostics
                .iter()
                .map(|diag| JsonDiagnostic {
                    code: diag.code,
                    severity: diag.severity.label(),
                    message: &diag.message,
                    start: JsonPosition {
                        line: diag.range.start.line,
                        character: diag.range.start.character,
                    },
                    end: JsonPosition {
                        line: diag.range.end.line,
                        character: diag.range.end.character,
                    },
                })
                .collect();
            eprintln!("{}", serde_json::to_string_pretty(&items)?);
        }
        DiagnosticsMode::Pretty => {
            for diag in diagnostics {
                eprintln!(
                    "{}:{}:{} {} {}",
                    diag.range.start.line + 1,
                    diag.range.start.character + 1,
                    diag.severity.label(),
                    diag.code,
                    diag.message
                );
            }
        }
    }
    Ok(())
}
