use std::path::Path;

use serde::Serialize;

/// Triple serialization of an input file, picked from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Format {
  Turtle,
  NTriples,
  RdfXml,
  Unknown,
}
impl Format {
  /// `ttl`, `nt` and `xml` are recognised, matched case-sensitively.
  /// Anything else, including no extension at all, is `Unknown`.
  pub fn from_path(path: &Path) -> Self {
    match path.extension().and_then(|ext| ext.to_str()) {
      Some(ext) => Self::from_extension(ext),
      None => Format::Unknown,
    }
  }
  pub fn from_extension(ext: &str) -> Self {
    match ext {
      "ttl" => Format::Turtle,
      "nt" => Format::NTriples,
      "xml" => Format::RdfXml,
      _ => Format::Unknown,
    }
  }
  pub fn is_known(self) -> bool {
    self != Format::Unknown
  }
  /* Line based formats resynchronise on the next line after a syntax
  error. The others lose track of where they are. */
  pub fn recovers_from_errors(self) -> bool {
    self == Format::NTriples
  }
}
impl std::fmt::Display for Format {
  fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
    match self {
      Format::Turtle => write!(f, "Turtle"),
      Format::NTriples => write!(f, "N-Triples"),
      Format::RdfXml => write!(f, "RDF/XML"),
      Format::Unknown => write!(f, "unknown"),
    }
  }
}

#[cfg(test)]
mod unit_tests {
  use super::*;
  #[test]
  fn known_suffixes() {
    assert_eq!(Format::from_path(Path::new("data/a.ttl")), Format::Turtle);
    assert_eq!(Format::from_path(Path::new("data/a.nt")), Format::NTriples);
    assert_eq!(Format::from_path(Path::new("data/a.xml")), Format::RdfXml);
  }
  #[test]
  fn other_suffixes_are_unknown() {
    for name in &["a.rdf", "a.json", "a.TTL", "a.nt.gz", "a", "dir.ttl/a", ".ttl"] {
      assert_eq!(Format::from_path(Path::new(name)), Format::Unknown, "{}", name);
    }
  }
  #[test]
  fn only_ntriples_recovers() {
    assert!(Format::NTriples.recovers_from_errors());
    assert!(!Format::Turtle.recovers_from_errors());
    assert!(!Format::RdfXml.recovers_from_errors());
    assert!(!Format::Unknown.is_known());
  }
}
