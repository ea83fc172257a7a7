//! Run configuration, built once at startup and shared by reference with
//! every pipeline.

use std::path::PathBuf;

use oxiri::Iri;
use serde::Serialize;

use crate::errors::ConfigError;
use crate::render::template::Template;

/// How the JSON array around the rendered lines is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OutputFraming {
  /// Every line is followed by `,\n`, the last one included.
  Legacy,
  /// Separators only between lines, so the file is valid JSON.
  Strict,
}
impl Default for OutputFraming {
  fn default() -> Self {
    OutputFraming::Legacy
  }
}

#[derive(Debug, Clone)]
pub struct Config {
  predicate: Iri<String>,
  field: String,
  template: Template,
  inputs: Vec<PathBuf>,
  framing: OutputFraming,
  truncate: bool,
  jobs: Option<usize>,
}
impl Config {
  pub fn new(
    predicate: &str,
    field: impl Into<String>,
    template: &str,
    inputs: Vec<PathBuf>,
  ) -> Result<Self, ConfigError> {
    let predicate = Iri::parse(predicate.to_string()).map_err(|source| ConfigError::InvalidPredicate {
      iri: predicate.to_string(),
      source,
    })?;
    let template = Template::parse(template)?;
    if inputs.is_empty() {
      return Err(ConfigError::NoInputs)
    }
    Ok(Config {
      predicate,
      field: field.into(),
      template,
      inputs,
      framing: OutputFraming::default(),
      truncate: false,
      jobs: None,
    })
  }
  pub fn with_framing(mut self, framing: OutputFraming) -> Self {
    self.framing = framing;
    self
  }
  /// Truncate pre-existing output files instead of writing over them in place.
  pub fn with_truncate(mut self, truncate: bool) -> Self {
    self.truncate = truncate;
    self
  }
  /// `None` runs one thread per input file, `Some(0)` one per logical CPU.
  pub fn with_jobs(mut self, jobs: Option<usize>) -> Self {
    self.jobs = jobs;
    self
  }
  pub fn predicate(&self) -> &Iri<String> {
    &self.predicate
  }
  pub fn field(&self) -> &str {
    &self.field
  }
  pub fn template(&self) -> &Template {
    &self.template
  }
  pub fn inputs(&self) -> &[PathBuf] {
    &self.inputs
  }
  pub fn framing(&self) -> OutputFraming {
    self.framing
  }
  pub fn truncate(&self) -> bool {
    self.truncate
  }
  pub fn jobs(&self) -> Option<usize> {
    match self.jobs {
      Some(0) => Some(num_cpus::get()),
      jobs => jobs,
    }
  }
}
