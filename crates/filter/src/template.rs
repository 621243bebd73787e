//! Metric key templates
//!
//! A template is a string with `%{field}` interpolation markers, compiled
//! once into literal and field segments and resolved once per event. A
//! field the event cannot render is left as its literal `%{field}` text,
//! so a missing field yields a distinct (and greppable) metric key rather
//! than dropping the event.

use crate::error::FilterError;
use crate::FilterResult;
use crate::event::Event;

#[cfg(test)]
#[path = "template_test.rs"]
mod tests;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(String),
}

/// Compiled `%{field}` interpolation template
#[derive(Debug, Clone)]
pub struct KeyTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl KeyTemplate {
    /// Compile a template string
    ///
    /// Fails on an unterminated `%{` or an empty field name; both are
    /// configuration mistakes better caught at startup than per event.
    pub fn parse(template: &str) -> FilterResult<Self> {
        let mut segments = Vec::new();
        let mut rest = template;

        while let Some(start) = rest.find("%{") {
            if start > 0 {
                segments.push(Segment::Literal(rest[..start].to_string()));
            }

            let after = &rest[start + 2..];
            let end = after.find('}').ok_or_else(|| {
                FilterError::template(format!("unterminated %{{ in \"{template}\""))
            })?;

            let field = &after[..end];
            if field.is_empty() {
                return Err(FilterError::template(format!(
                    "empty field name in \"{template}\""
                )));
            }

            segments.push(Segment::Field(field.to_string()));
            rest = &after[end + 1..];
        }

        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }

        Ok(Self {
            source: template.to_string(),
            segments,
        })
    }

    /// The template string this was compiled from
    #[inline]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether the template contains no interpolation markers
    #[inline]
    pub fn is_static(&self) -> bool {
        !self
            .segments
            .iter()
            .any(|s| matches!(s, Segment::Field(_)))
    }

    /// Render the metric key for an event
    pub fn resolve(&self, event: &Event) -> String {
        let mut key = String::with_capacity(self.source.len());

        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => key.push_str(text),
                Segment::Field(name) => match event.field_str(name) {
                    Some(value) => key.push_str(&value),
                    None => {
                        key.push_str("%{");
                        key.push_str(name);
                        key.push('}');
                    }
                },
            }
        }

        key
    }
}
