/*
  Parsing of the line template. Only three actions exist:
  {{.Subject}}, {{.Object}} and {{.Field}}.
*/

use crate::errors::TemplateError;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
  Subject,
  Object,
  Field,
}
impl Placeholder {
  fn from_action(action: &str, offset: usize) -> Result<Self, TemplateError> {
    match action {
      "" => Err(TemplateError::EmptyAction { offset }),
      ".Subject" => Ok(Placeholder::Subject),
      ".Object" => Ok(Placeholder::Object),
      ".Field" => Ok(Placeholder::Field),
      other => Err(TemplateError::UnknownField {
        name: other.to_string(),
        offset,
      }),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Segment {
  Text(String),
  Value(Placeholder),
}

/// A line template, parsed once at startup and then shared read-only by
/// every pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
  source: String,
  segments: Vec<Segment>,
}
impl Template {
  pub fn parse(source: &str) -> Result<Self, TemplateError> {
    let mut segments = Vec::new();
    let mut rest = source;
    let mut offset = 0;
    while let Some(start) = rest.find(OPEN) {
      if start > 0 {
        segments.push(Segment::Text(rest[..start].to_string()));
      }
      let action_offset = offset + start;
      let after_open = &rest[start + OPEN.len()..];
      let end = match after_open.find(CLOSE) {
        Some(end) => end,
        None => return Err(TemplateError::UnclosedAction { offset: action_offset }),
      };
      let action = after_open[..end].trim();
      segments.push(Segment::Value(Placeholder::from_action(action, action_offset)?));
      let consumed = start + OPEN.len() + end + CLOSE.len();
      rest = &rest[consumed..];
      offset += consumed;
    }
    if !rest.is_empty() {
      segments.push(Segment::Text(rest.to_string()));
    }
    Ok(Template {
      source: source.to_string(),
      segments,
    })
  }
  pub fn source(&self) -> &str {
    &self.source
  }
  pub fn placeholders(&self) -> impl Iterator<Item = Placeholder> + '_ {
    self.segments.iter().filter_map(|segment| match segment {
      Segment::Value(p) => Some(*p),
      Segment::Text(_) => None,
    })
  }
  pub(crate) fn segments(&self) -> &[Segment] {
    &self.segments
  }
}
impl std::str::FromStr for Template {
  type Err = TemplateError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Template::parse(s)
  }
}

#[cfg(test)]
mod unit_tests {
  use super::*;
  use crate::render::DEFAULT_TEMPLATE;

  #[test]
  fn default_template() {
    let template = Template::parse(DEFAULT_TEMPLATE).unwrap();
    assert_eq!(
      template.placeholders().collect::<Vec<_>>(),
      vec![Placeholder::Subject, Placeholder::Field, Placeholder::Object]
    );
    assert_eq!(template.source(), DEFAULT_TEMPLATE);
  }
  #[test]
  fn spaces_inside_actions() {
    let template = Template::parse("{{ .Subject }}-{{.Object  }}").unwrap();
    assert_eq!(
      template.segments(),
      &[
        Segment::Value(Placeholder::Subject),
        Segment::Text("-".to_string()),
        Segment::Value(Placeholder::Object),
      ]
    );
  }
  #[test]
  fn plain_text_and_stray_close() {
    let template = Template::parse("no actions }} here").unwrap();
    assert_eq!(template.segments(), &[Segment::Text("no actions }} here".to_string())]);
    assert!(Template::parse("").unwrap().segments().is_empty());
  }
  #[test]
  fn unclosed_action() {
    assert_eq!(
      Template::parse("{\"id\":{{.Subject}, \"x\":1}"),
      Err(TemplateError::UnclosedAction { offset: 6 })
    );
  }
  #[test]
  fn unknown_and_empty_actions() {
    assert_eq!(
      Template::parse("ab{{.Predicate}}"),
      Err(TemplateError::UnknownField { name: ".Predicate".to_string(), offset: 2 })
    );
    assert_eq!(Template::parse("{{ }}"), Err(TemplateError::EmptyAction { offset: 0 }));
  }
}
