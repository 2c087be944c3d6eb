//! One-shot insertion tools.

use crate::config::EditorConfig;
use crate::document::Document;
use crate::error::{EngineError, EngineResult};
use crate::scale::{self, px};
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// What the next pointer press inserts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertMode {
    Text,
}

/// One-shot insert state: armed by the host, consumed by the next pointer press.
#[derive(Debug, Clone, Default)]
pub struct InsertTool {
    pending: Option<InsertMode>,
}

impl InsertTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> Option<InsertMode> {
        self.pending
    }

    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// Arm text insertion and show the insert cursor on the canvas.
    pub fn arm<D: Document>(&mut self, doc: &D, cursor: &str) -> EngineResult<()> {
        let body = doc.body().ok_or(EngineError::EnvironmentNotReady)?;
        self.pending = Some(InsertMode::Text);
        doc.set_style(&body, "cursor", cursor);
        Ok(())
    }

    /// Disarm and reset the cursor.
    pub fn disarm<D: Document>(&mut self, doc: &D) {
        self.pending = None;
        if let Some(body) = doc.body() {
            doc.remove_style(&body, "cursor");
        }
    }

    /// Consume the armed insert: create a text element at `at` (content space)
    /// on top of every other top-level element.
    ///
    /// The tool is disarmed even if creating the element fails.
    pub fn place<D: Document>(&mut self, doc: &D, at: Point, config: &EditorConfig) -> EngineResult<D::Element> {
        let mode = self.pending.take();
        self.disarm(doc);
        match mode {
            Some(InsertMode::Text) => place_text(doc, at, config),
            None => Err(EngineError::Dom("no insert armed".to_string())),
        }
    }
}

fn place_text<D: Document>(doc: &D, at: Point, config: &EditorConfig) -> EngineResult<D::Element> {
    let root = scale::content_root(doc).ok_or(EngineError::EnvironmentNotReady)?;
    let z_index = next_z_index(doc, &root, config.z_index_baseline);
    let style = &config.insert_text;

    let el = doc.create_element("div")?;
    doc.set_text_content(&el, &style.placeholder);
    doc.set_style(&el, "position", "absolute");
    doc.set_style(&el, "left", &px(at.x));
    doc.set_style(&el, "top", &px(at.y));
    doc.set_style(&el, "font-size", &style.font_size);
    doc.set_style(&el, "color", &style.color);
    doc.set_style(&el, "line-height", &style.line_height);
    doc.set_style(&el, "pointer-events", "auto");
    doc.set_style(&el, "z-index", &z_index.to_string());
    doc.append_child(&root, &el)?;
    log::debug!("Inserted text element at ({}, {}) with z-index {}", at.x, at.y, z_index);
    Ok(el)
}

/// One above the highest numeric z-index among `parent`'s children, or
/// `baseline + 1` when none has one.
pub fn next_z_index<D: Document>(doc: &D, parent: &D::Element, baseline: i64) -> i64 {
    doc.children(parent)
        .iter()
        .filter_map(|child| parse_z_index(&doc.computed_style(child, "z-index")))
        .max()
        .unwrap_or(baseline)
        .saturating_add(1)
}

/// Parse a z-index the way `parseInt` would: leading sign and digits only.
fn parse_z_index(value: &str) -> Option<i64> {
    let value = value.trim();
    let digits_end = value
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
        .map(|(i, _)| i)
        .unwrap_or(value.len());
    value[..digits_end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::MemoryDocument;

    #[test]
    fn test_arm_sets_cursor() {
        let doc = MemoryDocument::new();
        let mut tool = InsertTool::new();
        tool.arm(&doc, "text").unwrap();
        assert_eq!(tool.pending(), Some(InsertMode::Text));
        assert_eq!(doc.inline_style(&doc.body().unwrap(), "cursor").as_deref(), Some("text"));
    }

    #[test]
    fn test_arm_unloaded_document() {
        let doc = MemoryDocument::unloaded();
        let mut tool = InsertTool::new();
        assert_eq!(tool.arm(&doc, "text"), Err(EngineError::EnvironmentNotReady));
        assert!(!tool.is_armed());
    }

    #[test]
    fn test_place_is_one_shot() {
        let doc = MemoryDocument::new();
        let config = EditorConfig::default();
        let mut tool = InsertTool::new();
        tool.arm(&doc, "text").unwrap();

        let el = tool.place(&doc, Point::new(120.0, 80.0), &config).unwrap();
        assert!(!tool.is_armed());
        assert_eq!(doc.inline_style(&doc.body().unwrap(), "cursor"), None);
        assert_eq!(doc.inline_style(&el, "left").as_deref(), Some("120px"));
        assert_eq!(doc.inline_style(&el, "top").as_deref(), Some("80px"));
        assert_eq!(doc.inline_style(&el, "position").as_deref(), Some("absolute"));
        assert_eq!(doc.text_content(&el), "Double-click to edit");

        assert!(tool.place(&doc, Point::ZERO, &config).is_err());
    }

    #[test]
    fn test_z_index_default_baseline() {
        let doc = MemoryDocument::new();
        let body = doc.body().unwrap();
        doc.append_element(body, "div");
        assert_eq!(next_z_index(&doc, &body, 9998), 9999);
    }

    #[test]
    fn test_z_index_above_siblings() {
        let doc = MemoryDocument::new();
        let body = doc.body().unwrap();
        for z in ["3", "auto", "10050", "-4"] {
            let el = doc.append_element(body, "div");
            doc.set_style(&el, "z-index", z);
        }
        assert_eq!(next_z_index(&doc, &body, 9998), 10051);
    }

    #[test]
    fn test_parse_z_index() {
        assert_eq!(parse_z_index("12"), Some(12));
        assert_eq!(parse_z_index("-3"), Some(-3));
        assert_eq!(parse_z_index("7px"), Some(7));
        assert_eq!(parse_z_index("auto"), None);
        assert_eq!(parse_z_index(""), None);
    }
}
