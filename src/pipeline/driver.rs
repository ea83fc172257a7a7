/*
  Fans the input files out over threads, one pipeline each, and waits
  for all of them before handing back a summary.
*/

use std::any::Any;
use std::collections::{HashSet, VecDeque};
use std::fs::File;
use std::io::BufWriter;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::thread;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::pipeline::coordinator::{output_path_for, FilePipeline, PipelineReport};
use crate::rdf::format::Format;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
  /// The pipeline ran to the end of the input.
  Completed(PipelineReport),
  /// The input was opened but its pipeline stopped early.
  Failed { input: PathBuf, error: String },
  /// The input could not be opened, or its output file belongs to an
  /// earlier input. No pipeline was started.
  Skipped { input: PathBuf, error: String },
}
impl FileOutcome {
  pub fn input(&self) -> &Path {
    match self {
      FileOutcome::Completed(report) => report.input.as_path(),
      FileOutcome::Failed { input, .. } | FileOutcome::Skipped { input, .. } => input.as_path(),
    }
  }
}

/// Per-file outcomes of a run, in command line order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
  pub files: Vec<FileOutcome>,
}
impl RunSummary {
  pub fn completed(&self) -> impl Iterator<Item = &PipelineReport> {
    self.files.iter().filter_map(|outcome| match outcome {
      FileOutcome::Completed(report) => Some(report),
      _ => None,
    })
  }
  pub fn failed(&self) -> usize {
    self.files.iter().filter(|o| matches!(o, FileOutcome::Failed { .. })).count()
  }
  pub fn skipped(&self) -> usize {
    self.files.iter().filter(|o| matches!(o, FileOutcome::Skipped { .. })).count()
  }
  pub fn write_json(&self, path: &Path) -> std::io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut out, self)?;
    std::io::Write::flush(&mut out)
  }
}

struct Job<'p> {
  index: usize,
  path: &'p Path,
  file: File,
}

/* The output file `path` would write, if no earlier input claimed it.
Unknown formats never create an output so they claim nothing. */
fn claim_output(claimed: &mut HashSet<PathBuf>, path: &Path) -> Result<(), PathBuf> {
  if !Format::from_path(path).is_known() {
    return Ok(())
  }
  let resolved = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
  let output = output_path_for(&resolved);
  if claimed.contains(&output) {
    return Err(output)
  }
  claimed.insert(output);
  Ok(())
}

/// Opens every configured input and runs a pipeline for each one that
/// opened. Blocks until all pipelines are done.
///
/// Only the first of several inputs sharing an output file is run.
///
/// Nothing here fails the run: unreadable inputs, aborted pipelines and
/// even panicking ones are logged and recorded in the summary.
pub fn run(config: &Config) -> RunSummary {
  let mut outcomes: Vec<(usize, FileOutcome)> = Vec::new();
  let mut jobs = Vec::new();
  let mut claimed = HashSet::new();
  for (index, path) in config.inputs().iter().enumerate() {
    match File::open(path) {
      Ok(file) => match claim_output(&mut claimed, path) {
        Ok(()) => jobs.push(Job { index, path: path.as_path(), file }),
        Err(output) => {
          warn!(file = %path.display(), output = %output.display(), "output file already used by an earlier input, ignoring");
          outcomes.push((index, FileOutcome::Skipped {
            input: path.clone(),
            error: format!("output file {} already used by an earlier input", output.display()),
          }));
        },
      },
      Err(e) => {
        error!(file = %path.display(), error = %e, "error opening input file, ignoring");
        outcomes.push((index, FileOutcome::Skipped {
          input: path.clone(),
          error: e.to_string(),
        }));
      },
    }
  }

  let pipeline = FilePipeline::new(config);
  let finished = match config.jobs() {
    None => run_per_file(pipeline, jobs),
    Some(workers) => run_pooled(pipeline, jobs, workers),
  };
  outcomes.extend(finished);
  outcomes.sort_by_key(|(index, _)| *index);

  let summary = RunSummary {
    files: outcomes.into_iter().map(|(_, outcome)| outcome).collect(),
  };
  info!(
    completed = summary.completed().count(),
    failed = summary.failed(),
    skipped = summary.skipped(),
    "all files processed"
  );
  summary
}

/* One thread per opened file, all started before any is joined */
fn run_per_file(pipeline: FilePipeline<'_>, jobs: Vec<Job<'_>>) -> Vec<(usize, FileOutcome)> {
  thread::scope(|scope| {
    let handles: Vec<_> = jobs
      .into_iter()
      .map(|job| {
        let (index, path) = (job.index, job.path);
        (index, path, scope.spawn(move || run_job(pipeline, job)))
      })
      .collect();
    handles
      .into_iter()
      .map(|(index, path, handle)| match handle.join() {
        Ok(outcome) => outcome,
        Err(payload) => (index, panicked(path, payload)),
      })
      .collect()
  })
}

/* At most `workers` threads, each pulling the next file off a shared queue */
fn run_pooled(pipeline: FilePipeline<'_>, jobs: Vec<Job<'_>>, workers: usize) -> Vec<(usize, FileOutcome)> {
  let workers = workers.max(1).min(jobs.len());
  let queue = Mutex::new(jobs.into_iter().collect::<VecDeque<_>>());
  let results = Mutex::new(Vec::new());
  thread::scope(|scope| {
    for _ in 0..workers {
      scope.spawn(|| loop {
        let next = queue.lock().unwrap_or_else(PoisonError::into_inner).pop_front();
        let job = match next {
          Some(job) => job,
          None => break,
        };
        let outcome = run_job(pipeline, job);
        results.lock().unwrap_or_else(PoisonError::into_inner).push(outcome);
      });
    }
  });
  results.into_inner().unwrap_or_else(PoisonError::into_inner)
}

fn run_job(pipeline: FilePipeline<'_>, job: Job<'_>) -> (usize, FileOutcome) {
  let Job { index, path, file } = job;
  let outcome = match panic::catch_unwind(AssertUnwindSafe(|| pipeline.run(path, file))) {
    Ok(Ok(report)) => FileOutcome::Completed(report),
    Ok(Err(e)) => {
      error!(file = %path.display(), error = %e, "pipeline aborted");
      FileOutcome::Failed {
        input: path.to_path_buf(),
        error: e.to_string(),
      }
    },
    Err(payload) => panicked(path, payload),
  };
  (index, outcome)
}

fn panicked(path: &Path, payload: Box<dyn Any + Send>) -> FileOutcome {
  let message = payload
    .downcast_ref::<&str>()
    .map(|s| s.to_string())
    .or_else(|| payload.downcast_ref::<String>().cloned())
    .unwrap_or_else(|| "unknown panic".to_string());
  error!(file = %path.display(), panic = %message, "pipeline panicked");
  FileOutcome::Failed {
    input: path.to_path_buf(),
    error: format!("panicked: {}", message),
  }
}

#[cfg(test)]
mod unit_tests {
  use super::*;

  #[test]
  fn panic_payloads() {
    let outcome = panicked(Path::new("a.nt"), Box::new("boom"));
    assert_eq!(outcome, FileOutcome::Failed { input: PathBuf::from("a.nt"), error: "panicked: boom".to_string() });
    let outcome = panicked(Path::new("b.nt"), Box::new(String::from("bang")));
    assert_eq!(outcome.input(), Path::new("b.nt"));
  }
  #[test]
  fn summary_counts() {
    let summary = RunSummary {
      files: vec![
        FileOutcome::Skipped { input: "a".into(), error: "missing".into() },
        FileOutcome::Failed { input: "b".into(), error: "bad".into() },
      ],
    };
    assert_eq!(summary.completed().count(), 0);
    assert_eq!(summary.failed(), 1);
    assert_eq!(summary.skipped(), 1);
    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["files"][0]["status"], "skipped");
    assert_eq!(json["files"][1]["input"], "b");
  }
  #[test]
  fn shared_output_is_claimed_once() {
    let dir = tempfile::tempdir().unwrap();
    for name in &["a.nt", "a.ttl", "a.rdf", "b.nt"] {
      std::fs::write(dir.path().join(name), "").unwrap();
    }
    let mut claimed = HashSet::new();
    assert_eq!(claim_output(&mut claimed, &dir.path().join("a.nt")), Ok(()));
    let output = claim_output(&mut claimed, &dir.path().join("a.ttl")).unwrap_err();
    assert_eq!(output.file_name().and_then(|n| n.to_str()), Some("a.json"));
    assert!(claim_output(&mut claimed, &dir.path().join("a.nt")).is_err());
    assert!(claim_output(&mut claimed, &dir.path().join(".").join("a.nt")).is_err());
    assert_eq!(claim_output(&mut claimed, &dir.path().join("a.rdf")), Ok(()));
    assert_eq!(claim_output(&mut claimed, &dir.path().join("b.nt")), Ok(()));
  }
}
