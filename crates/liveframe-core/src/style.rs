//! Inline style application to text selections and elements.

use crate::document::Document;
use crate::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A set of CSS declarations.
///
/// Property names may be given in CSS form (`font-weight`) or in the
/// camelCase form a JS host passes (`fontWeight`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct StyleProps {
    declarations: BTreeMap<String, String>,
}

impl StyleProps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style declaration.
    pub fn with(mut self, property: &str, value: &str) -> Self {
        self.set(property, value);
        self
    }

    pub fn set(&mut self, property: &str, value: &str) {
        self.declarations.insert(css_property_name(property), value.to_string());
    }

    pub fn font_weight(value: &str) -> Self {
        Self::new().with("font-weight", value)
    }

    pub fn font_style(value: &str) -> Self {
        Self::new().with("font-style", value)
    }

    /// A `color` declaration, validated as a CSS color.
    pub fn color(value: &str) -> EngineResult<Self> {
        peniko::color::parse_color(value.trim())
            .map_err(|_| EngineError::InvalidColor(value.to_string()))?;
        Ok(Self::new().with("color", value.trim()))
    }

    /// Parse a JSON object of declarations.
    pub fn from_json(json: &str) -> EngineResult<Self> {
        serde_json::from_str(json).map_err(|e| EngineError::InvalidStyle(e.to_string()))
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Declarations as `(css-property, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.declarations.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Write every declaration onto `element`'s inline style.
    pub fn apply_to<D: Document>(&self, doc: &D, element: &D::Element) {
        for (property, value) in self.iter() {
            doc.set_style(element, property, value);
        }
    }
}

impl From<BTreeMap<String, String>> for StyleProps {
    fn from(raw: BTreeMap<String, String>) -> Self {
        let mut props = Self::new();
        for (property, value) in &raw {
            props.set(property, value);
        }
        props
    }
}

impl From<StyleProps> for BTreeMap<String, String> {
    fn from(props: StyleProps) -> Self {
        props.declarations
    }
}

/// Convert `fontWeight` to `font-weight`. CSS names and custom properties pass through.
fn css_property_name(name: &str) -> String {
    if name.starts_with("--") || !name.chars().any(|c| c.is_ascii_uppercase()) {
        return name.to_string();
    }
    let mut out = String::with_capacity(name.len() + 4);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Where a style ended up.
#[derive(Debug, Clone, PartialEq)]
pub enum StyledRegion<E> {
    /// The selection was wrapped in this new `span`.
    Wrapped(E),
    /// Wrapping failed; the selection's common ancestor was styled instead.
    Ancestor(E),
    /// No usable selection; the selected target was styled.
    Target(E),
    /// Nothing to style.
    Nothing,
}

/// Apply `props` to the cached text selection, or to `target` without one.
pub fn apply_style<D: Document>(
    doc: &D,
    props: &StyleProps,
    range: Option<&D::Range>,
    target: Option<&D::Element>,
) -> EngineResult<StyledRegion<D::Element>> {
    if let Some(range) = range.filter(|r| !doc.is_range_collapsed(r)) {
        let span = doc.create_element("span")?;
        props.apply_to(doc, &span);
        match doc.surround_range(range, &span) {
            Ok(()) => return Ok(StyledRegion::Wrapped(span)),
            Err(e) => {
                log::debug!("Falling back to ancestor styling: {}", e);
                if let Some(ancestor) = doc.range_common_ancestor(range) {
                    props.apply_to(doc, &ancestor);
                    return Ok(StyledRegion::Ancestor(ancestor));
                }
            }
        }
    }
    match target {
        Some(el) => {
            props.apply_to(doc, el);
            Ok(StyledRegion::Target(el.clone()))
        }
        None => Ok(StyledRegion::Nothing),
    }
}

/// Font weight after toggling bold from `current` (a computed value).
pub fn toggled_font_weight(current: &str) -> &'static str {
    match current.trim() {
        "700" | "bold" => "400",
        _ => "700",
    }
}

/// Font style after toggling italic from `current` (a computed value).
pub fn toggled_font_style(current: &str) -> &'static str {
    match current.trim() {
        "italic" => "normal",
        _ => "italic",
    }
}
