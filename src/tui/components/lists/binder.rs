//! Projection of records into slots through line templates.

use super::record::{BindingError, FieldPath, Record};
use super::slot_pool::Slot;

/// Writes an item into a slot
pub trait ItemBinder<T: Record> {
    /// Bind `item`, found at absolute `index`, into `slot`
    fn bind(&self, item: &T, index: usize, selected: bool, slot: &mut Slot);
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(FieldPath),
}

/// One parsed template line, e.g. `"{name} ({stats.distance} km)"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineTemplate {
    segments: Vec<Segment>,
}

impl LineTemplate {
    /// Parse a template; `{{` and `}}` produce literal braces
    pub fn parse(template: &str) -> Result<Self, BindingError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = template.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut path = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(c) => path.push(c),
                            None => {
                                return Err(BindingError::UnclosedPlaceholder(
                                    template.to_string(),
                                ))
                            }
                        }
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Field(FieldPath::parse(&path)?));
                }
                '}' => return Err(BindingError::UnmatchedBrace(template.to_string())),
                c => literal.push(c),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self { segments })
    }

    /// Render against a record, unresolved fields become empty text
    pub fn render<T: Record>(&self, item: &T) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(path) => {
                    if let Some(value) = item.lookup(path) {
                        out.push_str(&value);
                    }
                }
            }
        }
        out
    }
}

/// Binder driven by a list of line templates
#[derive(Debug, Clone)]
pub struct TemplateBinder {
    lines: Vec<LineTemplate>,
}

impl TemplateBinder {
    pub fn new(lines: Vec<LineTemplate>) -> Self {
        Self { lines }
    }

    /// Parse every template line
    pub fn parse<S: AsRef<str>>(templates: &[S]) -> Result<Self, BindingError> {
        let lines = templates
            .iter()
            .map(|t| LineTemplate::parse(t.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(lines))
    }
}

impl<T: Record> ItemBinder<T> for TemplateBinder {
    fn bind(&self, item: &T, index: usize, selected: bool, slot: &mut Slot) {
        slot.set_lines(self.lines.iter().map(|line| line.render(item)));
        slot.stamp(index, item.identity(), selected);
    }
}
