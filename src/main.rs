//! rdf2solr: turn RDF triple files into Solr JSON update commands.
//!
//! Every positional file `name.ext` is converted into `name.json`, holding
//! one templated line per triple whose predicate is `--predicate`.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::{error, info};

use rdf2solr::{Config, OutputFraming, DEFAULT_TEMPLATE};

/// Convert RDF triple files (.ttl, .nt, .xml) into Solr JSON update commands.
#[derive(Parser)]
#[command(name = "rdf2solr", version, long_about = None)]
struct Cli {
  /// RDF predicate to match.
  #[arg(long, env = "RDF2SOLR_PREDICATE")]
  predicate: String,

  /// Name of the field in Solr to store the value.
  #[arg(long, default_value = "")]
  field: String,

  /// Template printed as one line of the JSON command per matching triple.
  /// Available vars are {{.Subject}}, {{.Object}} and {{.Field}}.
  /// {{.Subject}} and {{.Object}} are JSON escaped, quotes included, so the
  /// template should NOT put quotes around them.
  #[arg(long, default_value = DEFAULT_TEMPLATE)]
  template: String,

  /// Omit the comma after the last line so the output is valid JSON.
  #[arg(long)]
  strict_json: bool,

  /// Truncate existing output files instead of writing over them in place.
  #[arg(long)]
  truncate: bool,

  /// Number of files processed at once (0 = one per CPU). Default: all of them.
  #[arg(short, long)]
  jobs: Option<usize>,

  /// Write a JSON summary of the run to this file.
  #[arg(long)]
  report: Option<PathBuf>,

  /// Log format: text (default) or json.
  #[arg(long, default_value = "text")]
  log_format: LogFormat,

  /// Verbosity level (-v, -vv).
  #[arg(short, long, action = clap::ArgAction::Count)]
  verbose: u8,

  /// RDF files to convert.
  #[arg(required = true)]
  inputs: Vec<PathBuf>,
}

#[derive(Clone, Debug, clap::ValueEnum)]
enum LogFormat {
  Text,
  Json,
}

fn init_tracing(cli: &Cli) {
  use tracing_subscriber::{fmt, EnvFilter};

  let filter = match cli.verbose {
    0 => "rdf2solr=info",
    1 => "rdf2solr=debug",
    _ => "rdf2solr=trace",
  };
  let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

  match cli.log_format {
    LogFormat::Text => {
      fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
    },
    LogFormat::Json => {
      fmt()
        .json()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    },
  }
}

fn build_config(cli: &Cli) -> Result<Config, rdf2solr::errors::ConfigError> {
  let framing = if cli.strict_json { OutputFraming::Strict } else { OutputFraming::Legacy };
  Ok(
    Config::new(&cli.predicate, cli.field.as_str(), &cli.template, cli.inputs.clone())?
      .with_framing(framing)
      .with_truncate(cli.truncate)
      .with_jobs(cli.jobs),
  )
}

/* Flags that also exist as single-dash long options, e.g. `-predicate`.
Clap would read those as `-p redicate`. */
const SINGLE_DASH_FLAGS: [&str; 3] = ["predicate", "field", "template"];

/// Rewrites `-predicate`, `-field` and `-template` (and their `-name=value`
/// forms) to the double-dash spelling. Nothing after a bare `--` is touched.
fn long_flags<I: IntoIterator<Item = OsString>>(args: I) -> Vec<OsString> {
  let mut past_separator = false;
  args
    .into_iter()
    .map(|arg| {
      if past_separator {
        return arg
      }
      let rewritten = match arg.to_str() {
        Some("--") => {
          past_separator = true;
          None
        },
        Some(text) => text.strip_prefix('-').and_then(|flag| {
          let name = flag.split('=').next().unwrap_or(flag);
          if SINGLE_DASH_FLAGS.contains(&name) {
            Some(OsString::from(format!("--{}", flag)))
          }
          else {
            None
          }
        }),
        None => None,
      };
      rewritten.unwrap_or(arg)
    })
    .collect()
}

/// Runs the conversion and returns the process exit code. Only a bad
/// configuration is fatal, per-file failures are logged and still give 0.
fn run_cli(cli: &Cli) -> i32 {
  let config = match build_config(cli) {
    Ok(config) => config,
    Err(e) => {
      error!(error = %e, "invalid configuration");
      return 1
    },
  };
  info!(predicate = config.predicate().as_str(), "using predicate");

  let summary = rdf2solr::run(&config);
  if let Some(path) = &cli.report {
    if let Err(e) = summary.write_json(path) {
      error!(file = %path.display(), error = %e, "could not write run report");
    }
  }
  0
}

fn main() {
  let cli = Cli::parse_from(long_flags(std::env::args_os()));
  init_tracing(&cli);
  process::exit(run_cli(&cli));
}

#[cfg(test)]
mod unit_tests {
  use super::*;

  fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(long_flags(args.iter().map(OsString::from))).unwrap()
  }

  #[test]
  fn single_dash_long_flags() {
    let cli = parse(&["rdf2solr", "-predicate", "http://p", "-field", "title", "a.nt"]);
    assert_eq!(cli.predicate, "http://p");
    assert_eq!(cli.field, "title");
    assert_eq!(cli.template, DEFAULT_TEMPLATE);
    assert_eq!(cli.inputs, vec![PathBuf::from("a.nt")]);
  }
  #[test]
  fn mixed_dashes_and_equals_forms() {
    let cli = parse(&["rdf2solr", "--predicate", "http://p", "-field=title", "-template={{.Object}}", "a.nt", "b.ttl"]);
    assert_eq!(cli.predicate, "http://p");
    assert_eq!(cli.field, "title");
    assert_eq!(cli.template, "{{.Object}}");
    assert_eq!(cli.inputs, vec![PathBuf::from("a.nt"), PathBuf::from("b.ttl")]);
  }
  #[test]
  fn other_args_are_left_alone() {
    let args = long_flags(["rdf2solr", "-vv", "-j", "2", "-fieldx", "--", "-field"].iter().map(OsString::from));
    assert_eq!(args, ["rdf2solr", "-vv", "-j", "2", "-fieldx", "--", "-field"].iter().map(OsString::from).collect::<Vec<_>>());
  }
  #[test]
  fn bad_predicate_or_template_fails_startup() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("a.nt");
    std::fs::write(&input, "<http://s> <http://p> \"o\" .\n").unwrap();
    let input = input.to_str().unwrap();

    assert_eq!(run_cli(&parse(&["rdf2solr", "-predicate", "not an iri", input])), 1);
    assert_eq!(run_cli(&parse(&["rdf2solr", "-predicate", "http://p", "-template", "{{.Subject", input])), 1);
    assert!(!dir.path().join("a.json").exists());
  }
  #[test]
  fn per_file_errors_still_exit_zero() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.nt");
    let unknown = dir.path().join("data.rdf");
    std::fs::write(&unknown, "").unwrap();
    let report = dir.path().join("report.json");

    let code = run_cli(&parse(&[
      "rdf2solr",
      "-predicate",
      "http://p",
      "--report",
      report.to_str().unwrap(),
      missing.to_str().unwrap(),
      unknown.to_str().unwrap(),
    ]));

    assert_eq!(code, 0);
    let summary: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(summary["files"][0]["status"], "skipped");
    assert_eq!(summary["files"][1]["status"], "failed");
  }
}
