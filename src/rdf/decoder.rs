/*
  Pull based decoding of a triple stream on top of the rio parsers.
*/

extern crate rio_api;
extern crate rio_turtle;
extern crate rio_xml;

use std::collections::VecDeque;
use std::io::BufRead;
use std::path::Path;

use oxiri::Iri;
use rio_api::model::Triple as RioTriple;
use rio_api::parser::TriplesParser;
use rio_turtle::{NTriplesParser, TurtleParser};
use rio_xml::RdfXmlParser;

use crate::errors::DecodeError;
use crate::rdf::format::Format;
use crate::Triple;

/* A parser that reports the same error this many times in a row, the first
one included, is considered stuck and the stream ends. */
const MAX_REPEATED_ERRORS: usize = 16;

/* Run of identical consecutive step errors */
#[derive(Debug, Default)]
struct ErrorStreak {
  last: Option<String>,
  length: usize,
}
impl ErrorStreak {
  /* Returns true once the same message has been seen MAX_REPEATED_ERRORS times in a row */
  fn record(&mut self, message: String) -> bool {
    if self.last.as_ref() == Some(&message) {
      self.length += 1;
    }
    else {
      self.last = Some(message);
      self.length = 1;
    }
    self.length >= MAX_REPEATED_ERRORS
  }
  fn reset(&mut self) {
    self.last = None;
    self.length = 0;
  }
}

/// Outcome of a single pull on a [`TripleDecoder`].
#[derive(Debug)]
pub enum Decoded {
  Item(Triple),
  Error(DecodeError),
  End,
}

enum RioParser<R: BufRead> {
  Turtle(TurtleParser<R>),
  NTriples(NTriplesParser<R>),
  RdfXml(RdfXmlParser<R>),
}
impl<R: BufRead> RioParser<R> {
  fn is_end(&self) -> bool {
    match self {
      RioParser::Turtle(p) => p.is_end(),
      RioParser::NTriples(p) => p.is_end(),
      RioParser::RdfXml(p) => p.is_end(),
    }
  }
  fn parse_step(
    &mut self,
    on_triple: &mut impl FnMut(RioTriple<'_>) -> Result<(), DecodeError>,
  ) -> Result<(), DecodeError> {
    match self {
      RioParser::Turtle(p) => p.parse_step(on_triple),
      RioParser::NTriples(p) => p.parse_step(on_triple),
      RioParser::RdfXml(p) => p.parse_step(on_triple),
    }
  }
}

/// Lazy, finite and non-restartable sequence of triples read from `R`.
///
/// Each call to [`decode`](TripleDecoder::decode) hands back the next triple,
/// an error for a malformed unit, or `End` once the input is exhausted.
/// An error never ends the sequence by itself for formats that can
/// resynchronise (N-Triples); Turtle and RDF/XML stop after their first
/// syntax error.
pub struct TripleDecoder<R: BufRead> {
  parser: RioParser<R>,
  format: Format,
  buffer: VecDeque<Triple>,
  pending_error: Option<DecodeError>,
  streak: ErrorStreak,
  finished: bool,
}
impl<R: BufRead> TripleDecoder<R> {
  pub fn new(reader: R, format: Format, base_iri: Option<Iri<String>>) -> Result<Self, DecodeError> {
    let parser = match format {
      Format::Turtle => RioParser::Turtle(TurtleParser::new(reader, base_iri)),
      Format::NTriples => RioParser::NTriples(NTriplesParser::new(reader)),
      Format::RdfXml => RioParser::RdfXml(RdfXmlParser::new(reader, base_iri)),
      Format::Unknown => return Err(DecodeError::UnknownFormat),
    };
    Ok(TripleDecoder {
      parser,
      format,
      buffer: VecDeque::new(),
      pending_error: None,
      streak: ErrorStreak::default(),
      finished: false,
    })
  }
  pub fn format(&self) -> Format {
    self.format
  }
  pub fn decode(&mut self) -> Decoded {
    loop {
      /* Triples a step produced before failing come out ahead of its error */
      if let Some(triple) = self.buffer.pop_front() {
        return Decoded::Item(triple)
      }
      if let Some(error) = self.pending_error.take() {
        return Decoded::Error(error)
      }
      if self.finished || self.parser.is_end() {
        self.finished = true;
        return Decoded::End
      }
      let buffer = &mut self.buffer;
      let step = self.parser.parse_step(&mut |t| {
        buffer.push_back(Triple::from(&t));
        Ok(())
      });
      match step {
        Ok(()) => self.streak.reset(),
        Err(error) => {
          let stuck = self.streak.record(error.to_string());
          if stuck || !self.format.recovers_from_errors() {
            self.finished = true;
          }
          self.pending_error = Some(error);
        },
      }
    }
  }
}
impl<R: BufRead> Iterator for TripleDecoder<R> {
  type Item = Result<Triple, DecodeError>;

  fn next(&mut self) -> Option<Self::Item> {
    match self.decode() {
      Decoded::Item(triple) => Some(Ok(triple)),
      Decoded::Error(error) => Some(Err(error)),
      Decoded::End => None,
    }
  }
}

/// Base IRI handed to the Turtle and RDF/XML parsers so that relative IRIs
/// in a file resolve against its location.
pub fn base_iri_for(path: &Path) -> Option<Iri<String>> {
  let absolute = std::fs::canonicalize(path).ok()?;
  Iri::parse(format!("file://{}", absolute.to_str()?)).ok()
}
