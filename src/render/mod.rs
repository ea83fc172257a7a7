/*
  Rendering of one matching triple into a line of the Solr update command.
*/

pub mod template;

use std::io::Write;

use crate::errors::RenderError;
use crate::Triple;
use template::{Placeholder, Segment, Template};

/// `{{.Subject}}` and `{{.Object}}` are already JSON string literals when
/// substituted, so the template must not quote them. `{{.Field}}` goes in raw.
pub const DEFAULT_TEMPLATE: &str = r#"{"id":{{.Subject}},"{{.Field}}":{"add":{{.Object}}}}"#;

/// Escapes `value` as a JSON string literal, surrounding quotes included.
pub fn escape_json(value: &str) -> Result<String, RenderError> {
  Ok(serde_json::to_string(value)?)
}

/// Values substituted into the template for a single matching triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderContext<'a> {
  pub subject: String,
  pub object: String,
  pub field: &'a str,
}
impl<'a> RenderContext<'a> {
  pub fn new(triple: &Triple, field: &'a str) -> Result<Self, RenderError> {
    Ok(RenderContext {
      subject: escape_json(&triple.subject)?,
      object: escape_json(&triple.object)?,
      field,
    })
  }
  fn value(&self, placeholder: Placeholder) -> &str {
    match placeholder {
      Placeholder::Subject => &self.subject,
      Placeholder::Object => &self.object,
      Placeholder::Field => self.field,
    }
  }
}

#[derive(Debug, Clone, Copy)]
pub struct LineRenderer<'a> {
  template: &'a Template,
}
impl<'a> LineRenderer<'a> {
  pub fn new(template: &'a Template) -> Self {
    LineRenderer { template }
  }
  pub fn render(&self, ctx: &RenderContext<'_>) -> String {
    let mut line = String::with_capacity(self.template.source().len() + ctx.subject.len() + ctx.object.len());
    for segment in self.template.segments() {
      match segment {
        Segment::Text(text) => line.push_str(text),
        Segment::Value(placeholder) => line.push_str(ctx.value(*placeholder)),
      }
    }
    line
  }
  /// Renders the whole line before touching `out`, so a failing context
  /// never leaves half a line behind.
  pub fn render_to<W: Write>(&self, ctx: &RenderContext<'_>, out: &mut W) -> Result<(), RenderError> {
    out.write_all(self.render(ctx).as_bytes())?;
    Ok(())
  }
}
