//! In-memory document implementation.
//!
//! A small DOM-like tree with just enough layout to exercise the engine
//! headlessly: every node carries a layout box (offset and size relative to
//! its parent), inline `left`/`top`/`width`/`height` in px override that box,
//! and `transform: scale()` / `zoom` scale the subtree from its top-left corner.

use super::Document;
use crate::error::{EngineError, EngineResult};
use crate::scale::parse_transform_scale;
use kurbo::{Point, Rect, Size, Vec2};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use uuid::Uuid;

/// Unique identifier for a node.
pub type NodeId = Uuid;

/// CSS properties resolved from the nearest ancestor when not set inline.
const INHERITED: &[&str] = &["font-weight", "font-style", "color", "font-size", "line-height", "cursor"];

#[derive(Debug, Clone)]
enum NodeKind {
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
        style: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    layout: Rect,
}

impl Node {
    fn element(tag: &str) -> Self {
        Self {
            kind: NodeKind::Element {
                tag: tag.to_ascii_lowercase(),
                attributes: Vec::new(),
                style: Vec::new(),
            },
            parent: None,
            children: Vec::new(),
            layout: Rect::ZERO,
        }
    }

    fn text(text: &str) -> Self {
        Self {
            kind: NodeKind::Text(text.to_string()),
            parent: None,
            children: Vec::new(),
            layout: Rect::ZERO,
        }
    }

    fn is_element(&self) -> bool {
        matches!(self.kind, NodeKind::Element { .. })
    }

    fn style(&self, property: &str) -> Option<&str> {
        match &self.kind {
            NodeKind::Element { style, .. } => style
                .iter()
                .find(|(k, _)| k == property)
                .map(|(_, v)| v.as_str()),
            NodeKind::Text(_) => None,
        }
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        match &self.kind {
            NodeKind::Element { attributes, .. } => attributes
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str()),
            NodeKind::Text(_) => None,
        }
    }
}

/// A position inside the tree: a character offset in a text node, or a
/// child index in an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Boundary {
    pub node: NodeId,
    pub offset: usize,
}

/// A text selection range over a [`MemoryDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryRange {
    pub start: Boundary,
    pub end: Boundary,
}

/// Headless document used for native runs and tests.
#[derive(Debug)]
pub struct MemoryDocument {
    nodes: RefCell<HashMap<NodeId, Node>>,
    root: Option<NodeId>,
    body: Option<NodeId>,
    viewport: Cell<Size>,
    focused: Cell<Option<NodeId>>,
    listeners_claimed: Cell<bool>,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocument {
    /// Create a loaded document with `<html><head></head><body></body></html>`.
    pub fn new() -> Self {
        let mut nodes = HashMap::new();
        let root = Uuid::new_v4();
        let head = Uuid::new_v4();
        let body = Uuid::new_v4();

        let mut html = Node::element("html");
        html.children = vec![head, body];
        let mut head_node = Node::element("head");
        head_node.parent = Some(root);
        let mut body_node = Node::element("body");
        body_node.parent = Some(root);

        nodes.insert(root, html);
        nodes.insert(head, head_node);
        nodes.insert(body, body_node);

        Self {
            nodes: RefCell::new(nodes),
            root: Some(root),
            body: Some(body),
            viewport: Cell::new(Size::ZERO),
            focused: Cell::new(None),
            listeners_claimed: Cell::new(false),
        }
    }

    /// Create a document whose frame has not finished loading.
    pub fn unloaded() -> Self {
        Self {
            nodes: RefCell::new(HashMap::new()),
            root: None,
            body: None,
            viewport: Cell::new(Size::ZERO),
            focused: Cell::new(None),
            listeners_claimed: Cell::new(false),
        }
    }

    /// Builder-style viewport size.
    pub fn with_viewport(self, width: f64, height: f64) -> Self {
        self.viewport.set(Size::new(width, height));
        self
    }

    /// Resize the hosting frame.
    pub fn set_viewport(&self, size: Size) {
        self.viewport.set(size);
    }

    /// Create an element and append it to `parent`.
    pub fn append_element(&self, parent: NodeId, tag: &str) -> NodeId {
        let id = Uuid::new_v4();
        self.nodes.borrow_mut().insert(id, Node::element(tag));
        self.attach(parent, id, None);
        id
    }

    /// Create a text node and append it to `parent`.
    pub fn append_text(&self, parent: NodeId, text: &str) -> NodeId {
        let id = Uuid::new_v4();
        self.nodes.borrow_mut().insert(id, Node::text(text));
        self.attach(parent, id, None);
        id
    }

    /// Set the layout box of a node relative to its parent.
    pub fn set_layout(&self, id: NodeId, layout: Rect) {
        if let Some(node) = self.nodes.borrow_mut().get_mut(&id) {
            node.layout = layout;
        }
    }

    /// A range inside a single text node.
    pub fn text_range(&self, node: NodeId, start: usize, end: usize) -> MemoryRange {
        MemoryRange {
            start: Boundary { node, offset: start },
            end: Boundary { node, offset: end },
        }
    }

    /// A range between two arbitrary boundaries.
    pub fn range(&self, start: NodeId, start_offset: usize, end: NodeId, end_offset: usize) -> MemoryRange {
        MemoryRange {
            start: Boundary { node: start, offset: start_offset },
            end: Boundary { node: end, offset: end_offset },
        }
    }

    /// Element that currently has keyboard focus.
    pub fn focused(&self) -> Option<NodeId> {
        self.focused.get()
    }

    /// Parent of a node.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.borrow().get(&id).and_then(|n| n.parent)
    }

    /// All child nodes (text included).
    pub fn child_nodes(&self, id: NodeId) -> Vec<NodeId> {
        self.nodes
            .borrow()
            .get(&id)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    /// Lowercase tag name of an element.
    pub fn tag_name(&self, id: NodeId) -> Option<String> {
        match self.nodes.borrow().get(&id).map(|n| &n.kind) {
            Some(NodeKind::Element { tag, .. }) => Some(tag.clone()),
            _ => None,
        }
    }

    /// Number of nodes alive in the tree (attached or not).
    pub fn node_count(&self) -> usize {
        self.nodes.borrow().len()
    }

    fn attach(&self, parent: NodeId, child: NodeId, index: Option<usize>) {
        let mut nodes = self.nodes.borrow_mut();
        if !nodes.contains_key(&parent) {
            return;
        }
        let old_parent = nodes.get(&child).and_then(|n| n.parent);
        if let Some(old) = old_parent {
            if let Some(node) = nodes.get_mut(&old) {
                node.children.retain(|&c| c != child);
            }
        }
        if let Some(node) = nodes.get_mut(&child) {
            node.parent = Some(parent);
        }
        if let Some(node) = nodes.get_mut(&parent) {
            let index = index.unwrap_or(node.children.len()).min(node.children.len());
            node.children.insert(index, child);
        }
    }

    fn remove_subtree(nodes: &mut HashMap<NodeId, Node>, id: NodeId) {
        if let Some(node) = nodes.remove(&id) {
            for child in node.children {
                Self::remove_subtree(nodes, child);
            }
        }
    }

    fn ancestors_inclusive(nodes: &HashMap<NodeId, Node>, id: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(cur) = current {
            chain.push(cur);
            current = nodes.get(&cur).and_then(|n| n.parent);
        }
        chain
    }

    fn box_size(node: &Node) -> Size {
        let width = node.style("width").and_then(parse_px).unwrap_or(node.layout.width());
        let height = node.style("height").and_then(parse_px).unwrap_or(node.layout.height());
        Size::new(width, height)
    }

    fn box_offset(node: &Node) -> Vec2 {
        let x = node.style("left").and_then(parse_px).unwrap_or(node.layout.x0);
        let y = node.style("top").and_then(parse_px).unwrap_or(node.layout.y0);
        Vec2::new(x, y)
    }

    fn own_scale(node: &Node) -> Vec2 {
        let (sx, sy) = node
            .style("transform")
            .and_then(parse_transform_scale)
            .unwrap_or((1.0, 1.0));
        let zoom = node
            .style("zoom")
            .and_then(|z| z.trim().parse::<f64>().ok())
            .unwrap_or(1.0);
        Vec2::new(sx * zoom, sy * zoom)
    }

    fn extent(nodes: &HashMap<NodeId, Node>, id: NodeId) -> Size {
        let Some(node) = nodes.get(&id) else {
            return Size::ZERO;
        };
        let own = Self::box_size(node);
        let mut width = own.width;
        let mut height = own.height;
        for child in &node.children {
            let Some(child_node) = nodes.get(child) else {
                continue;
            };
            if !child_node.is_element() {
                continue;
            }
            let offset = Self::box_offset(child_node);
            let child_extent = Self::extent(nodes, *child);
            width = width.max(offset.x + child_extent.width);
            height = height.max(offset.y + child_extent.height);
        }
        Size::new(width, height)
    }

    fn write_html(nodes: &HashMap<NodeId, Node>, id: NodeId, out: &mut String) {
        let Some(node) = nodes.get(&id) else {
            return;
        };
        match &node.kind {
            NodeKind::Text(text) => out.push_str(&escape_html(text)),
            NodeKind::Element { tag, attributes, style } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attributes {
                    out.push_str(&format!(" {}=\"{}\"", name, escape_html(value)));
                }
                if !style.is_empty() {
                    let declarations: Vec<String> =
                        style.iter().map(|(k, v)| format!("{}: {};", k, v)).collect();
                    out.push_str(&format!(" style=\"{}\"", escape_html(&declarations.join(" "))));
                }
                out.push('>');
                for child in &node.children {
                    Self::write_html(nodes, *child, out);
                }
                out.push_str(&format!("</{}>", tag));
            }
        }
    }

    fn collect_text(nodes: &HashMap<NodeId, Node>, id: NodeId, out: &mut String) {
        if let Some(node) = nodes.get(&id) {
            match &node.kind {
                NodeKind::Text(text) => out.push_str(text),
                NodeKind::Element { .. } => {
                    for child in &node.children {
                        Self::collect_text(nodes, *child, out);
                    }
                }
            }
        }
    }

    fn matches_selector(node: &Node, selector: &str) -> bool {
        let NodeKind::Element { tag, .. } = &node.kind else {
            return false;
        };
        let selector = selector.trim();
        if let Some(class) = selector.strip_prefix('.') {
            node.attribute("class")
                .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
        } else if let Some(id) = selector.strip_prefix('#') {
            node.attribute("id") == Some(id)
        } else {
            tag.eq_ignore_ascii_case(selector)
        }
    }

    /// Split the text node at `offset`, returning the node that now starts at
    /// that offset. Returns `None` when the offset is at the end of the node.
    fn split_text(&self, node: NodeId, offset: usize) -> Option<NodeId> {
        let (text, parent) = {
            let nodes = self.nodes.borrow();
            let n = nodes.get(&node)?;
            match &n.kind {
                NodeKind::Text(t) => (t.clone(), n.parent?),
                NodeKind::Element { .. } => return None,
            }
        };
        let chars: Vec<char> = text.chars().collect();
        if offset == 0 {
            return Some(node);
        }
        if offset >= chars.len() {
            return self.next_sibling(node);
        }
        let head: String = chars[..offset].iter().collect();
        let tail: String = chars[offset..].iter().collect();
        let tail_id = Uuid::new_v4();
        {
            let mut nodes = self.nodes.borrow_mut();
            if let Some(n) = nodes.get_mut(&node) {
                n.kind = NodeKind::Text(head);
            }
            nodes.insert(tail_id, Node::text(&tail));
        }
        let index = self.index_in_parent(node).map(|i| i + 1);
        self.attach(parent, tail_id, index);
        Some(tail_id)
    }

    fn index_in_parent(&self, node: NodeId) -> Option<usize> {
        let nodes = self.nodes.borrow();
        let parent = nodes.get(&node)?.parent?;
        nodes.get(&parent)?.children.iter().position(|&c| c == node)
    }

    fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let nodes = self.nodes.borrow();
        let parent = nodes.get(&node)?.parent?;
        let siblings = &nodes.get(&parent)?.children;
        let index = siblings.iter().position(|&c| c == node)?;
        siblings.get(index + 1).copied()
    }

    /// The element a boundary sits in: the text node's parent, or the element itself.
    fn boundary_parent(&self, boundary: Boundary) -> Option<NodeId> {
        let nodes = self.nodes.borrow();
        let node = nodes.get(&boundary.node)?;
        if node.is_element() {
            Some(boundary.node)
        } else {
            node.parent
        }
    }

    /// Resolve a boundary to the first node at or after it, splitting text if needed.
    fn resolve_boundary(&self, boundary: Boundary) -> Option<NodeId> {
        let is_element = self
            .nodes
            .borrow()
            .get(&boundary.node)
            .is_some_and(Node::is_element);
        if is_element {
            self.child_nodes(boundary.node).get(boundary.offset).copied()
        } else {
            self.split_text(boundary.node, boundary.offset)
        }
    }
}

impl Document for MemoryDocument {
    type Element = NodeId;
    type Range = MemoryRange;

    fn root(&self) -> Option<NodeId> {
        self.root
    }

    fn body(&self) -> Option<NodeId> {
        self.body
    }

    fn viewport_size(&self) -> Size {
        self.viewport.get()
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        let root = self.root?;
        let nodes = self.nodes.borrow();
        let mut stack = vec![root];
        while let Some(current) = stack.pop() {
            let node = nodes.get(&current)?;
            if node.attribute("id") == Some(id) {
                return Some(current);
            }
            stack.extend(node.children.iter().rev());
        }
        None
    }

    fn create_element(&self, tag: &str) -> EngineResult<NodeId> {
        if self.root.is_none() {
            return Err(EngineError::EnvironmentNotReady);
        }
        let id = Uuid::new_v4();
        self.nodes.borrow_mut().insert(id, Node::element(tag));
        Ok(id)
    }

    fn append_child(&self, parent: &NodeId, child: &NodeId) -> EngineResult<()> {
        {
            let nodes = self.nodes.borrow();
            if !nodes.contains_key(parent) || !nodes.contains_key(child) {
                return Err(EngineError::Dom("unknown node".to_string()));
            }
            if Self::ancestors_inclusive(&nodes, *parent).contains(child) {
                return Err(EngineError::Dom("cannot append an ancestor".to_string()));
            }
        }
        self.attach(*parent, *child, None);
        Ok(())
    }

    fn children(&self, parent: &NodeId) -> Vec<NodeId> {
        let nodes = self.nodes.borrow();
        nodes
            .get(parent)
            .map(|n| {
                n.children
                    .iter()
                    .copied()
                    .filter(|c| nodes.get(c).is_some_and(Node::is_element))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn move_children(&self, from: &NodeId, to: &NodeId) -> EngineResult<()> {
        let moving: Vec<NodeId> = self.child_nodes(*from).into_iter().filter(|c| c != to).collect();
        for child in moving {
            self.append_child(to, &child)?;
        }
        Ok(())
    }

    fn set_style(&self, element: &NodeId, property: &str, value: &str) {
        if let Some(node) = self.nodes.borrow_mut().get_mut(element) {
            if let NodeKind::Element { style, .. } = &mut node.kind {
                match style.iter_mut().find(|(k, _)| k == property) {
                    Some(entry) => entry.1 = value.to_string(),
                    None => style.push((property.to_string(), value.to_string())),
                }
            }
        }
    }

    fn remove_style(&self, element: &NodeId, property: &str) {
        if let Some(node) = self.nodes.borrow_mut().get_mut(element) {
            if let NodeKind::Element { style, .. } = &mut node.kind {
                style.retain(|(k, _)| k != property);
            }
        }
    }

    fn inline_style(&self, element: &NodeId, property: &str) -> Option<String> {
        self.nodes
            .borrow()
            .get(element)
            .and_then(|n| n.style(property))
            .map(str::to_string)
    }

    fn computed_style(&self, element: &NodeId, property: &str) -> String {
        let nodes = self.nodes.borrow();
        let own = nodes.get(element).and_then(|n| n.style(property));
        let value = match own {
            Some(v) => Some(v.to_string()),
            None if INHERITED.contains(&property) => Self::ancestors_inclusive(&nodes, *element)
                .into_iter()
                .skip(1)
                .find_map(|a| nodes.get(&a).and_then(|n| n.style(property)).map(str::to_string)),
            None => None,
        };
        match value {
            Some(v) => normalize_computed(property, &v),
            None => default_computed(property).to_string(),
        }
    }

    fn set_attribute(&self, element: &NodeId, name: &str, value: &str) -> EngineResult<()> {
        let mut nodes = self.nodes.borrow_mut();
        let node = nodes
            .get_mut(element)
            .ok_or_else(|| EngineError::Dom("unknown node".to_string()))?;
        match &mut node.kind {
            NodeKind::Element { attributes, .. } => {
                match attributes.iter_mut().find(|(k, _)| k == name) {
                    Some(entry) => entry.1 = value.to_string(),
                    None => attributes.push((name.to_string(), value.to_string())),
                }
                Ok(())
            }
            NodeKind::Text(_) => Err(EngineError::Dom("text nodes have no attributes".to_string())),
        }
    }

    fn remove_attribute(&self, element: &NodeId, name: &str) {
        if let Some(node) = self.nodes.borrow_mut().get_mut(element) {
            if let NodeKind::Element { attributes, .. } = &mut node.kind {
                attributes.retain(|(k, _)| k != name);
            }
        }
    }

    fn attribute(&self, element: &NodeId, name: &str) -> Option<String> {
        self.nodes
            .borrow()
            .get(element)
            .and_then(|n| n.attribute(name))
            .map(str::to_string)
    }

    fn set_text_content(&self, element: &NodeId, text: &str) {
        let old = {
            let mut nodes = self.nodes.borrow_mut();
            match nodes.get_mut(element) {
                Some(node) if node.is_element() => std::mem::take(&mut node.children),
                Some(node) => {
                    node.kind = NodeKind::Text(text.to_string());
                    return;
                }
                None => return,
            }
        };
        {
            let mut nodes = self.nodes.borrow_mut();
            for child in old {
                Self::remove_subtree(&mut nodes, child);
            }
        }
        self.append_text(*element, text);
    }

    fn text_content(&self, element: &NodeId) -> String {
        let mut out = String::new();
        Self::collect_text(&self.nodes.borrow(), *element, &mut out);
        out
    }

    fn focus(&self, element: &NodeId) {
        if self.nodes.borrow().contains_key(element) {
            self.focused.set(Some(*element));
        }
    }

    fn is_content_editable(&self, element: &NodeId) -> bool {
        let nodes = self.nodes.borrow();
        for id in Self::ancestors_inclusive(&nodes, *element) {
            match nodes.get(&id).and_then(|n| n.attribute("contenteditable")) {
                Some("false") => return false,
                Some(_) => return true,
                None => {}
            }
        }
        false
    }

    fn closest_matches(&self, element: &NodeId, selectors: &[String]) -> bool {
        let nodes = self.nodes.borrow();
        Self::ancestors_inclusive(&nodes, *element).into_iter().any(|id| {
            nodes
                .get(&id)
                .is_some_and(|n| selectors.iter().any(|s| Self::matches_selector(n, s)))
        })
    }

    fn scroll_size(&self, element: &NodeId) -> Size {
        Self::extent(&self.nodes.borrow(), *element)
    }

    fn offset_size(&self, element: &NodeId) -> Size {
        self.nodes
            .borrow()
            .get(element)
            .map(Self::box_size)
            .unwrap_or(Size::ZERO)
    }

    fn client_rect(&self, element: &NodeId) -> Rect {
        let nodes = self.nodes.borrow();
        let mut chain = Self::ancestors_inclusive(&nodes, *element);
        chain.reverse();

        let mut origin = Point::ZERO;
        let mut scale = Vec2::new(1.0, 1.0);
        for id in &chain {
            let Some(node) = nodes.get(id) else {
                return Rect::ZERO;
            };
            let offset = Self::box_offset(node);
            origin += Vec2::new(offset.x * scale.x, offset.y * scale.y);
            let own = Self::own_scale(node);
            scale = Vec2::new(scale.x * own.x, scale.y * own.y);
        }
        let size = nodes.get(element).map(Self::box_size).unwrap_or(Size::ZERO);
        Rect::from_origin_size(origin, Size::new(size.width * scale.x, size.height * scale.y))
    }

    fn outer_html(&self, element: &NodeId) -> String {
        let mut out = String::new();
        Self::write_html(&self.nodes.borrow(), *element, &mut out);
        out
    }

    fn is_range_collapsed(&self, range: &MemoryRange) -> bool {
        range.start == range.end
    }

    fn surround_range(&self, range: &MemoryRange, wrapper: &NodeId) -> EngineResult<()> {
        let start_parent = self.boundary_parent(range.start);
        let end_parent = self.boundary_parent(range.end);
        let parent = match (start_parent, end_parent) {
            (Some(a), Some(b)) if a == b => a,
            _ => {
                return Err(EngineError::RangeWrap(
                    "range partially selects an element".to_string(),
                ));
            }
        };
        if self.parent(*wrapper).is_some() {
            return Err(EngineError::RangeWrap("wrapper is already attached".to_string()));
        }

        // Split the end first so the start boundary's offsets stay valid.
        let end_node = self.resolve_boundary(range.end);
        let start_node = self.resolve_boundary(range.start);

        let children = self.child_nodes(parent);
        let from = match start_node {
            Some(node) => children.iter().position(|&c| c == node).unwrap_or(children.len()),
            None => children.len(),
        };
        let to = match end_node {
            Some(node) => children.iter().position(|&c| c == node).unwrap_or(children.len()),
            None => children.len(),
        };
        if from > to {
            return Err(EngineError::RangeWrap("range boundaries are reversed".to_string()));
        }

        for child in &children[from..to] {
            self.attach(*wrapper, *child, None);
        }
        self.attach(parent, *wrapper, Some(from));
        Ok(())
    }

    fn range_common_ancestor(&self, range: &MemoryRange) -> Option<NodeId> {
        let nodes = self.nodes.borrow();
        let start_chain = Self::ancestors_inclusive(&nodes, range.start.node);
        let end_chain = Self::ancestors_inclusive(&nodes, range.end.node);
        let common = start_chain.into_iter().find(|id| end_chain.contains(id))?;
        nodes.get(&common).filter(|n| n.is_element()).map(|_| common)
    }

    fn claim_listeners(&self) -> bool {
        !self.listeners_claimed.replace(true)
    }

    fn release_listeners(&self) {
        self.listeners_claimed.set(false);
    }
}

/// Parse a CSS pixel length such as `"120px"` or `"120"`.
pub(crate) fn parse_px(value: &str) -> Option<f64> {
    let value = value.trim();
    value.strip_suffix("px").unwrap_or(value).trim().parse().ok()
}

fn default_computed(property: &str) -> &'static str {
    match property {
        "font-weight" => "400",
        "font-style" => "normal",
        "color" => "rgb(0, 0, 0)",
        "z-index" => "auto",
        "transform" => "none",
        "zoom" => "1",
        "position" => "static",
        "overflow" => "visible",
        "cursor" => "auto",
        _ => "",
    }
}

fn normalize_computed(property: &str, value: &str) -> String {
    match property {
        "font-weight" => match value {
            "normal" => "400".to_string(),
            "bold" => "700".to_string(),
            other => other.to_string(),
        },
        "transform" if value.trim_start().starts_with("scale") => match parse_transform_scale(value) {
            Some((sx, sy)) => format!("matrix({}, 0, 0, {}, 0, 0)", sx, sy),
            None => value.to_string(),
        },
        _ => value.to_string(),
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listener_claim_is_exclusive() {
        let doc = MemoryDocument::new();
        assert!(doc.claim_listeners());
        assert!(!doc.claim_listeners());
        doc.release_listeners();
        assert!(doc.claim_listeners());
    }

    #[test]
    fn test_new_document_structure() {
        let doc = MemoryDocument::new();
        let root = doc.root().unwrap();
        let body = doc.body().unwrap();
        assert_eq!(doc.parent(body), Some(root));
        assert_eq!(doc.children(&root).len(), 2);
        assert_eq!(doc.outer_html(&root), "<html><head></head><body></body></html>");
    }

    #[test]
    fn test_unloaded_document() {
        let doc = MemoryDocument::unloaded();
        assert!(doc.root().is_none());
        assert!(doc.body().is_none());
        assert_eq!(doc.create_element("div"), Err(EngineError::EnvironmentNotReady));
    }

    #[test]
    fn test_append_moves_node() {
        let doc = MemoryDocument::new();
        let body = doc.body().unwrap();
        let a = doc.append_element(body, "div");
        let b = doc.append_element(body, "div");
        doc.append_child(&a, &b).unwrap();
        assert_eq!(doc.children(&body), vec![a]);
        assert_eq!(doc.children(&a), vec![b]);
        assert!(doc.append_child(&b, &a).is_err());
    }

    #[test]
    fn test_computed_style_inherits_and_normalizes() {
        let doc = MemoryDocument::new();
        let body = doc.body().unwrap();
        let outer = doc.append_element(body, "div");
        let inner = doc.append_element(outer, "span");
        assert_eq!(doc.computed_style(&inner, "font-weight"), "400");
        doc.set_style(&outer, "font-weight", "bold");
        assert_eq!(doc.computed_style(&inner, "font-weight"), "700");
        assert_eq!(doc.computed_style(&inner, "z-index"), "auto");
        doc.set_style(&outer, "transform", "scale(0.5)");
        assert_eq!(doc.computed_style(&outer, "transform"), "matrix(0.5, 0, 0, 0.5, 0, 0)");
    }

    #[test]
    fn test_client_rect_applies_ancestor_scale() {
        let doc = MemoryDocument::new();
        let body = doc.body().unwrap();
        let child = doc.append_element(body, "div");
        doc.set_layout(child, Rect::new(100.0, 50.0, 300.0, 150.0));
        doc.set_style(&body, "transform", "scale(0.5)");

        let rect = doc.client_rect(&child);
        assert!((rect.x0 - 50.0).abs() < 1e-9);
        assert!((rect.y0 - 25.0).abs() < 1e-9);
        assert!((rect.width() - 100.0).abs() < 1e-9);
        assert_eq!(doc.offset_size(&child), Size::new(200.0, 100.0));
    }

    #[test]
    fn test_scroll_size_includes_overflowing_children() {
        let doc = MemoryDocument::new();
        let body = doc.body().unwrap();
        let child = doc.append_element(body, "div");
        doc.set_layout(child, Rect::new(0.0, 0.0, 1600.0, 1200.0));
        assert_eq!(doc.scroll_size(&body), Size::new(1600.0, 1200.0));
        assert_eq!(doc.scroll_size(&doc.root().unwrap()), Size::new(1600.0, 1200.0));
    }

    #[test]
    fn test_closest_matches_ancestor_class() {
        let doc = MemoryDocument::new();
        let body = doc.body().unwrap();
        let control = doc.append_element(body, "div");
        doc.set_attribute(&control, "class", "moveable-control-box moveable-control").unwrap();
        let inner = doc.append_element(control, "span");
        let selectors = vec![".moveable-control".to_string()];
        assert!(doc.closest_matches(&inner, &selectors));
        assert!(!doc.closest_matches(&body, &selectors));
    }

    #[test]
    fn test_surround_within_text_node() {
        let doc = MemoryDocument::new();
        let body = doc.body().unwrap();
        let p = doc.append_element(body, "p");
        let text = doc.append_text(p, "hello world");
        let span = doc.create_element("span").unwrap();

        doc.surround_range(&doc.text_range(text, 6, 11), &span).unwrap();
        assert_eq!(doc.outer_html(&p), "<p>hello <span>world</span></p>");
        assert_eq!(doc.text_content(&span), "world");
    }

    #[test]
    fn test_surround_across_elements_fails() {
        let doc = MemoryDocument::new();
        let body = doc.body().unwrap();
        let a = doc.append_element(body, "b");
        let ta = doc.append_text(a, "bold");
        let tb = doc.append_text(body, " plain");
        let span = doc.create_element("span").unwrap();

        let range = doc.range(ta, 2, tb, 3);
        assert!(matches!(doc.surround_range(&range, &span), Err(EngineError::RangeWrap(_))));
        assert_eq!(doc.range_common_ancestor(&range), Some(body));
        // Nothing was mutated.
        assert_eq!(doc.text_content(&body), "bold plain");
    }

    #[test]
    fn test_common_ancestor_of_text_node_is_not_element() {
        let doc = MemoryDocument::new();
        let body = doc.body().unwrap();
        let text = doc.append_text(body, "abc");
        assert_eq!(doc.range_common_ancestor(&doc.text_range(text, 0, 2)), None);
    }

    #[test]
    fn test_set_text_content_replaces_children() {
        let doc = MemoryDocument::new();
        let body = doc.body().unwrap();
        let div = doc.append_element(body, "div");
        doc.append_element(div, "span");
        let before = doc.node_count();
        doc.set_text_content(&div, "fresh");
        assert_eq!(doc.text_content(&div), "fresh");
        assert!(doc.children(&div).is_empty());
        assert_eq!(doc.node_count(), before);
    }

    #[test]
    fn test_content_editable_inherits() {
        let doc = MemoryDocument::new();
        let body = doc.body().unwrap();
        let div = doc.append_element(body, "div");
        let span = doc.append_element(div, "span");
        assert!(!doc.is_content_editable(&span));
        doc.set_attribute(&div, "contenteditable", "true").unwrap();
        assert!(doc.is_content_editable(&span));
        doc.remove_attribute(&div, "contenteditable");
        assert!(!doc.is_content_editable(&span));
    }

    #[test]
    fn test_outer_html_escapes() {
        let doc = MemoryDocument::new();
        let body = doc.body().unwrap();
        let div = doc.append_element(body, "div");
        doc.set_style(&div, "left", "10px");
        doc.set_style(&div, "top", "20px");
        doc.append_text(div, "a < b");
        assert_eq!(
            doc.outer_html(&div),
            "<div style=\"left: 10px; top: 20px;\">a &lt; b</div>"
        );
    }
}
