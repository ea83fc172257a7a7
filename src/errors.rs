use std::path::PathBuf;

/* Startup errors. Any of these aborts the whole run before a single
file is touched. */
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
  #[error("invalid predicate IRI {iri:?}: {source}")]
  InvalidPredicate {
    iri: String,
    source: oxiri::IriParseError,
  },
  #[error("invalid template: {0}")]
  Template(#[from] TemplateError),
  #[error("no input files given")]
  NoInputs,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
  #[error("unclosed action starting at byte {offset}")]
  UnclosedAction { offset: usize },
  #[error("empty action at byte {offset}")]
  EmptyAction { offset: usize },
  #[error("unknown field {name:?} at byte {offset}, expected .Subject, .Object or .Field")]
  UnknownField { name: String, offset: usize },
}

/// Failure to decode one unit of a triple stream.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
  #[error("{0}")]
  Turtle(#[from] rio_turtle::TurtleError),
  #[error("{0}")]
  RdfXml(#[from] rio_xml::RdfXmlError),
  #[error("cannot decode triples of an unknown format")]
  UnknownFormat,
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
  #[error("could not escape term as JSON: {0}")]
  Escape(#[from] serde_json::Error),
  #[error("could not write rendered line: {0}")]
  Io(#[from] std::io::Error),
}

/* Errors that stop a single file's pipeline. Siblings keep going. */
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
  #[error("unsupported file extension for {}, expected .ttl, .nt or .xml", .0.display())]
  UnsupportedFormat(PathBuf),
  #[error("error opening output file {}: {source}", path.display())]
  OutputOpen {
    path: PathBuf,
    source: std::io::Error,
  },
  #[error("error writing output file {}: {source}", path.display())]
  Write {
    path: PathBuf,
    source: std::io::Error,
  },
}
