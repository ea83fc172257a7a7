/*
  Everything needed to turn an RDF file into a stream of
  owned triples and pick out the ones we care about.
*/

pub mod decoder;
pub mod filter;
pub mod format;
