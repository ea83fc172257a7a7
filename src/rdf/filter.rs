use oxiri::Iri;

use crate::Triple;

/// Keeps the triples whose predicate is exactly the configured IRI.
///
/// Comparison is plain string equality on the IRI, so `http://ex.org/p`
/// and `http://ex.org/p/` are different predicates.
#[derive(Debug, Clone, Copy)]
pub struct PredicateFilter<'a> {
  target: &'a str,
}
impl<'a> PredicateFilter<'a> {
  pub fn new(target: &'a Iri<String>) -> Self {
    PredicateFilter { target: target.as_str() }
  }
  pub fn target(&self) -> &'a str {
    self.target
  }
  pub fn matches(&self, triple: &Triple) -> bool {
    self.matches_iri(&triple.predicate)
  }
  pub fn matches_iri(&self, predicate: &str) -> bool {
    self.target == predicate
  }
}

#[cfg(test)]
mod unit_tests {
  use super::*;

  fn iri(s: &str) -> Iri<String> {
    Iri::parse(s.to_string()).unwrap()
  }

  #[test]
  fn exact_match() {
    let target = iri("http://ex.org/p");
    let filter = PredicateFilter::new(&target);
    assert!(filter.matches(&Triple::new("http://s", "http://ex.org/p", "\"o\"")));
    assert!(!filter.matches(&Triple::new("http://s", "http://ex.org/q", "\"o\"")));
  }
  #[test]
  fn trailing_slash_matters() {
    let target = iri("http://ex.org/p/");
    let filter = PredicateFilter::new(&target);
    assert!(!filter.matches_iri("http://ex.org/p"));
    assert!(filter.matches_iri("http://ex.org/p/"));
  }
  #[test]
  fn no_normalization() {
    let target = iri("http://EX.org/p");
    let filter = PredicateFilter::new(&target);
    assert!(!filter.matches_iri("http://ex.org/p"));
  }
}
