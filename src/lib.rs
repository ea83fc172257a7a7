//! Convert RDF triple files (Turtle, N-Triples, RDF/XML) into Solr JSON
//! update commands.
//!
//! Every input file gets its own pipeline: the triples are decoded in
//! streaming, filtered on a single predicate and each match is rendered
//! through a template into `<input stem>.json`.

/* Exports */

pub mod config;
pub mod errors;
pub mod pipeline;
pub mod rdf;
pub mod render;

pub use config::{Config, OutputFraming};
pub use pipeline::coordinator::{FilePipeline, PipelineReport};
pub use pipeline::driver::{run, RunSummary};
pub use rdf::decoder::{Decoded, TripleDecoder};
pub use rdf::filter::PredicateFilter;
pub use rdf::format::Format;
pub use render::template::Template;
pub use render::{LineRenderer, RenderContext, DEFAULT_TEMPLATE};

/* Common Definitions */

use rio_api::model::{Subject, Term, Triple as RioTriple};

/// A decoded statement, detached from the parser's buffers.
///
/// IRIs are kept bare (`http://ex.org/s`), every other term keeps its
/// N-Triples form (`_:b0`, `"hello"`, `"hi"@en`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Triple {
  pub subject: String,
  pub predicate: String,
  pub object: String,
}
impl Triple {
  pub fn new(subject: impl Into<String>, predicate: impl Into<String>, object: impl Into<String>) -> Self {
    Triple {
      subject: subject.into(),
      predicate: predicate.into(),
      object: object.into(),
    }
  }
}
impl<'a> From<&RioTriple<'a>> for Triple {
  fn from(t: &RioTriple<'a>) -> Self {
    let subject = match &t.subject {
      Subject::NamedNode(n) => n.iri.to_string(),
      other => other.to_string(),
    };
    let object = match &t.object {
      Term::NamedNode(n) => n.iri.to_string(),
      other => other.to_string(),
    };
    Triple {
      subject,
      predicate: t.predicate.iri.to_string(),
      object,
    }
  }
}

#[cfg(test)]
mod unit_tests {
  use super::*;
  use rio_api::model::{BlankNode, Literal, NamedNode};

  #[test]
  fn named_nodes_are_bare() {
    let rio = RioTriple {
      subject: NamedNode { iri: "http://ex.org/s" }.into(),
      predicate: NamedNode { iri: "http://ex.org/p" },
      object: NamedNode { iri: "http://ex.org/o" }.into(),
    };
    assert_eq!(
      Triple::from(&rio),
      Triple::new("http://ex.org/s", "http://ex.org/p", "http://ex.org/o")
    );
  }
  #[test]
  fn literals_and_blanks_keep_ntriples_form() {
    let rio = RioTriple {
      subject: BlankNode { id: "b0" }.into(),
      predicate: NamedNode { iri: "http://ex.org/p" },
      object: Literal::LanguageTaggedString { value: "hi", language: "en" }.into(),
    };
    let t = Triple::from(&rio);
    assert_eq!(t.subject, "_:b0");
    assert_eq!(t.object, "\"hi\"@en");
  }
  #[test]
  fn simple_literal_is_quoted() {
    let rio = RioTriple {
      subject: NamedNode { iri: "http://s" }.into(),
      predicate: NamedNode { iri: "http://p" },
      object: Literal::Simple { value: "hello" }.into(),
    };
    assert_eq!(Triple::from(&rio).object, "\"hello\"");
  }
}
