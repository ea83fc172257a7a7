/*
  One input file, one output file. Decodes the input, keeps the triples
  with the configured predicate and writes one rendered line per match
  inside a JSON array.
*/

use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{Config, OutputFraming};
use crate::errors::{PipelineError, RenderError};
use crate::rdf::decoder::{base_iri_for, Decoded, TripleDecoder};
use crate::rdf::filter::PredicateFilter;
use crate::rdf::format::Format;
use crate::render::{LineRenderer, RenderContext};
use crate::Triple;

/// Counters for a file that made it through its pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineReport {
  pub input: PathBuf,
  pub output: PathBuf,
  pub format: Format,
  pub triples_read: usize,
  pub matched: usize,
  pub written: usize,
  pub decode_errors: usize,
  pub render_errors: usize,
}

/// `name.ext` becomes `name.json` next to it.
pub fn output_path_for(input: &Path) -> PathBuf {
  input.with_extension("json")
}

/* Writes the `[`, separators and `]` around the rendered lines */
struct FramedWriter<W: Write> {
  out: W,
  framing: OutputFraming,
  elements: usize,
}
impl<W: Write> FramedWriter<W> {
  fn new(out: W, framing: OutputFraming) -> Self {
    FramedWriter { out, framing, elements: 0 }
  }
  fn begin(&mut self) -> std::io::Result<()> {
    self.out.write_all(b"[")
  }
  /* Separator and line go out in a single write, so a failed element
  leaves no stray separator behind and is not counted. */
  fn element(&mut self, line: &str) -> std::io::Result<()> {
    let mut buf = Vec::with_capacity(line.len() + 2);
    match self.framing {
      OutputFraming::Legacy => {
        buf.extend_from_slice(line.as_bytes());
        buf.extend_from_slice(b",\n");
      },
      OutputFraming::Strict => {
        buf.extend_from_slice(if self.elements == 0 { b"\n" } else { b",\n" });
        buf.extend_from_slice(line.as_bytes());
      },
    }
    self.out.write_all(&buf)?;
    self.elements += 1;
    Ok(())
  }
  /* A legacy element already ends on a newline, so the closing bracket
  only needs its own when nothing was written. */
  fn finish(mut self) -> std::io::Result<W> {
    let closing: &[u8] = match self.framing {
      OutputFraming::Legacy if self.elements > 0 => b"]",
      _ => b"\n]",
    };
    self.out.write_all(closing)?;
    self.out.flush()?;
    Ok(self.out)
  }
}

/// Runs files through decode → filter → render → write.
///
/// Holds only borrowed, read-only state so one value can be shared by
/// every thread of a run.
#[derive(Debug, Clone, Copy)]
pub struct FilePipeline<'a> {
  config: &'a Config,
  filter: PredicateFilter<'a>,
  renderer: LineRenderer<'a>,
}
impl<'a> FilePipeline<'a> {
  pub fn new(config: &'a Config) -> Self {
    FilePipeline {
      config,
      filter: PredicateFilter::new(config.predicate()),
      renderer: LineRenderer::new(config.template()),
    }
  }
  fn open_output(&self, path: &Path) -> Result<File, PipelineError> {
    OpenOptions::new()
      .read(true)
      .write(true)
      .create(true)
      .truncate(self.config.truncate())
      .open(path)
      .map_err(|source| PipelineError::OutputOpen {
        path: path.to_path_buf(),
        source,
      })
  }
  fn render_line(&self, triple: &Triple) -> Result<String, RenderError> {
    let ctx = RenderContext::new(triple, self.config.field())?;
    Ok(self.renderer.render(&ctx))
  }
  /* A line that fails to render or write is dropped, the file goes on */
  fn write_match<W: Write>(
    &self,
    writer: &mut FramedWriter<W>,
    triple: &Triple,
    input_path: &Path,
    report: &mut PipelineReport,
  ) {
    let written = self
      .render_line(triple)
      .and_then(|line| writer.element(&line).map_err(RenderError::from));
    match written {
      Ok(()) => report.written += 1,
      Err(error) => {
        report.render_errors += 1;
        warn!(file = %input_path.display(), subject = %triple.subject, %error, "dropping line");
      },
    }
  }
  /// Processes the already opened `input` found at `input_path`.
  ///
  /// Decode and render failures are logged and skipped. Only an unknown
  /// format or trouble with the output file ends the pipeline early.
  pub fn run(&self, input_path: &Path, input: File) -> Result<PipelineReport, PipelineError> {
    let format = Format::from_path(input_path);
    /* Unknown is the only format the decoder refuses */
    let mut decoder = TripleDecoder::new(BufReader::new(input), format, base_iri_for(input_path))
      .map_err(|_| PipelineError::UnsupportedFormat(input_path.to_path_buf()))?;
    info!(file = %input_path.display(), %format, "detected triple format");
    let output_path = output_path_for(input_path);
    let output = self.open_output(&output_path)?;
    let write_error = |source| PipelineError::Write {
      path: output_path.clone(),
      source,
    };
    let mut writer = FramedWriter::new(BufWriter::new(output), self.config.framing());
    writer.begin().map_err(write_error)?;

    let mut report = PipelineReport {
      input: input_path.to_path_buf(),
      output: output_path.clone(),
      format,
      triples_read: 0,
      matched: 0,
      written: 0,
      decode_errors: 0,
      render_errors: 0,
    };
    loop {
      let triple = match decoder.decode() {
        Decoded::Item(triple) => triple,
        Decoded::Error(error) => {
          report.decode_errors += 1;
          warn!(file = %input_path.display(), %error, "skipping malformed triple");
          continue
        },
        Decoded::End => break,
      };
      report.triples_read += 1;
      if !self.filter.matches(&triple) {
        continue
      }
      report.matched += 1;
      self.write_match(&mut writer, &triple, input_path, &mut report);
    }

    writer.finish().map_err(write_error)?;
    /* Input and output handles close here */
    drop(decoder);
    debug!(file = %input_path.display(), output = %output_path.display(), "closed input and output");
    info!(
      file = %input_path.display(),
      triples = report.triples_read,
      matched = report.matched,
      written = report.written,
      decode_errors = report.decode_errors,
      render_errors = report.render_errors,
      "finished reading file"
    );
    Ok(report)
  }
}
