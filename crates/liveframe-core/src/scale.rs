//! Scale model: fitting content to the viewport and mapping pointer
//! coordinates between viewport space and content space.
//!
//! Content space is the unscaled layout of the embedded document. Viewport
//! space is what the host sees. Three strategies put the content into the
//! viewport, and each needs its own way of recovering the active scale:
//!
//! - [`ScaleStrategy::Transform`]: `transform: scale(s)` on the body. The scale is
//!   read back by decomposing the computed transform matrix.
//! - [`ScaleStrategy::Zoom`]: `zoom: s` on a wrapper that the body's original
//!   children are moved into. The scale is the cached factor.
//! - [`ScaleStrategy::RectRatio`]: same styling as `Transform`. The scale is the
//!   ratio of the rendered rect to the layout box.

use crate::document::Document;
use crate::error::{EngineError, EngineResult};
use kurbo::{Affine, Point, Size, Vec2};
use serde::{Deserialize, Serialize};

/// `id` of the wrapper element used by [`ScaleStrategy::Zoom`].
pub const SCALE_WRAPPER_ID: &str = "__liveframe_scale_wrapper";

/// How the content is scaled into the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleStrategy {
    /// CSS `transform: scale()` on the body.
    Transform,
    /// CSS `zoom` on a wrapper element.
    #[default]
    Zoom,
    /// `transform` styling, with the scale measured from client rect vs. offset size.
    RectRatio,
}

impl ScaleStrategy {
    /// Whether this strategy scales a dedicated wrapper instead of the body.
    pub fn uses_wrapper(self) -> bool {
        matches!(self, Self::Zoom)
    }
}

/// Result of fitting content into a viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleSnapshot {
    /// Unscaled content extent.
    pub content: Size,
    /// Visible viewport extent.
    pub viewport: Size,
    /// Uniform content→viewport factor.
    pub scale: f64,
}

/// Compute the uniform scale that fits `content` entirely inside `viewport`.
///
/// Returns `None` when either side has no measurable extent.
pub fn fit_content(viewport: Size, content: Size) -> Option<ScaleSnapshot> {
    let valid = |s: Size| s.width.is_finite() && s.height.is_finite() && s.width > 0.0 && s.height > 0.0;
    if !valid(viewport) || !valid(content) {
        return None;
    }
    let scale = (viewport.width / content.width).min(viewport.height / content.height);
    Some(ScaleSnapshot { content, viewport, scale })
}

/// Affine mapping between viewport and content coordinates.
///
/// `origin` is where content (0, 0) lands in the viewport and `scale` is the
/// per-axis content→viewport factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerMapping {
    pub origin: Point,
    pub scale: Vec2,
}

impl PointerMapping {
    /// Identity mapping.
    pub const IDENTITY: Self = Self {
        origin: Point::ZERO,
        scale: Vec2::new(1.0, 1.0),
    };

    /// Content → viewport transform.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.origin.to_vec2()) * Affine::scale_non_uniform(self.scale.x, self.scale.y)
    }

    /// Viewport → content transform.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale_non_uniform(1.0 / self.scale.x, 1.0 / self.scale.y)
            * Affine::translate(-self.origin.to_vec2())
    }

    pub fn to_content(&self, viewport_point: Point) -> Point {
        self.inverse_transform() * viewport_point
    }

    pub fn to_viewport(&self, content_point: Point) -> Point {
        self.transform() * content_point
    }
}

/// Extract `(scale_x, scale_y)` from a CSS transform value.
///
/// Understands `scale(s)`, `scale(sx, sy)`, `matrix(a, b, c, d, e, f)` and
/// `matrix3d(...)`. For matrices the diagonal terms are taken as the scale.
pub fn parse_transform_scale(value: &str) -> Option<(f64, f64)> {
    let value = value.trim();
    let open = value.find('(')?;
    let close = value.rfind(')')?;
    if close <= open {
        return None;
    }
    let name = value[..open].trim();
    let args: Vec<f64> = value[open + 1..close]
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::parse::<f64>)
        .collect::<Result<_, _>>()
        .ok()?;

    let (sx, sy) = match (name, args.len()) {
        ("scale", 1) => (args[0], args[0]),
        ("scale", 2) => (args[0], args[1]),
        ("matrix", 6) => (args[0], args[3]),
        ("matrix3d", 16) => (args[0], args[5]),
        _ => return None,
    };
    (sx.is_finite() && sy.is_finite()).then_some((sx, sy))
}

pub(crate) fn px(value: f64) -> String {
    format!("{}px", value)
}

/// The element receiving the scale for `strategy`.
///
/// For `Zoom` this is the wrapper once it exists.
pub fn scale_container<D: Document>(doc: &D, strategy: ScaleStrategy) -> Option<D::Element> {
    if strategy.uses_wrapper() {
        if let Some(wrapper) = doc.element_by_id(SCALE_WRAPPER_ID) {
            return Some(wrapper);
        }
    }
    doc.body()
}

/// Element new content is appended to: the wrapper if content was migrated, else the body.
pub fn content_root<D: Document>(doc: &D) -> Option<D::Element> {
    doc.element_by_id(SCALE_WRAPPER_ID).or_else(|| doc.body())
}

/// Make sure the zoom wrapper exists and holds the body's original children.
///
/// Idempotent: the migration runs only when the wrapper is first created.
pub fn ensure_wrapper<D: Document>(doc: &D) -> EngineResult<D::Element> {
    if let Some(wrapper) = doc.element_by_id(SCALE_WRAPPER_ID) {
        return Ok(wrapper);
    }
    let body = doc.body().ok_or(EngineError::EnvironmentNotReady)?;
    let wrapper = doc.create_element("div")?;
    doc.set_attribute(&wrapper, "id", SCALE_WRAPPER_ID)?;
    doc.set_style(&wrapper, "position", "relative");
    doc.move_children(&body, &wrapper)?;
    doc.append_child(&body, &wrapper)?;
    log::debug!("Migrated body children into scale wrapper");
    Ok(wrapper)
}

/// Unscaled content extent: the larger of root, body and wrapper scroll sizes.
pub fn measure_content<D: Document>(doc: &D) -> EngineResult<Size> {
    let root = doc.root().ok_or(EngineError::EnvironmentNotReady)?;
    let body = doc.body().ok_or(EngineError::EnvironmentNotReady)?;
    let mut size = doc.scroll_size(&root);
    let body_size = doc.scroll_size(&body);
    size.width = size.width.max(body_size.width);
    size.height = size.height.max(body_size.height);
    if let Some(wrapper) = doc.element_by_id(SCALE_WRAPPER_ID) {
        let inner = doc.scroll_size(&wrapper);
        size.width = size.width.max(inner.width);
        size.height = size.height.max(inner.height);
    }
    Ok(size)
}

/// Apply `snapshot` with `strategy`, returning the scaled element.
pub fn apply_scale<D: Document>(
    doc: &D,
    strategy: ScaleStrategy,
    snapshot: &ScaleSnapshot,
) -> EngineResult<D::Element> {
    let root = doc.root().ok_or(EngineError::EnvironmentNotReady)?;
    let body = doc.body().ok_or(EngineError::EnvironmentNotReady)?;

    doc.set_style(&root, "overflow", "hidden");
    doc.set_style(&body, "overflow", "hidden");
    doc.set_style(&body, "margin", "0");
    doc.set_style(&body, "touch-action", "none");

    let width = px(snapshot.content.width);
    let height = px(snapshot.content.height);
    match strategy {
        ScaleStrategy::Transform | ScaleStrategy::RectRatio => {
            doc.set_style(&body, "width", &width);
            doc.set_style(&body, "height", &height);
            doc.set_style(&body, "transform-origin", "top left");
            doc.set_style(&body, "transform", &format!("scale({})", snapshot.scale));
            Ok(body)
        }
        ScaleStrategy::Zoom => {
            let wrapper = ensure_wrapper(doc)?;
            doc.set_style(&wrapper, "width", &width);
            doc.set_style(&wrapper, "height", &height);
            doc.set_style(&wrapper, "overflow", "hidden");
            doc.set_style(&wrapper, "zoom", &snapshot.scale.to_string());
            Ok(wrapper)
        }
    }
}

/// Remove the scale properties `strategy` wrote, before switching to another one.
pub fn clear_scale<D: Document>(doc: &D, strategy: ScaleStrategy) {
    match strategy {
        ScaleStrategy::Transform | ScaleStrategy::RectRatio => {
            if let Some(body) = doc.body() {
                doc.remove_style(&body, "transform");
                doc.remove_style(&body, "transform-origin");
            }
        }
        ScaleStrategy::Zoom => {
            if let Some(wrapper) = doc.element_by_id(SCALE_WRAPPER_ID) {
                doc.remove_style(&wrapper, "zoom");
            }
        }
    }
}

/// Resolve the current viewport↔content mapping.
///
/// `cached` is the last applied factor, used directly by `Zoom`.
pub fn pointer_mapping<D: Document>(
    doc: &D,
    strategy: ScaleStrategy,
    cached: Vec2,
) -> EngineResult<PointerMapping> {
    let container = scale_container(doc, strategy).ok_or(EngineError::EnvironmentNotReady)?;
    let rect = doc.client_rect(&container);
    let scale = match strategy {
        ScaleStrategy::Transform => {
            let matrix = doc.computed_style(&container, "transform");
            let (sx, sy) = parse_transform_scale(&matrix).unwrap_or((1.0, 1.0));
            Vec2::new(sx, sy)
        }
        ScaleStrategy::Zoom => cached,
        ScaleStrategy::RectRatio => {
            let offset = doc.offset_size(&container);
            Vec2::new(
                ratio_or_one(rect.width(), offset.width),
                ratio_or_one(rect.height(), offset.height),
            )
        }
    };
    if !(scale.x.is_finite() && scale.y.is_finite()) || scale.x <= 0.0 || scale.y <= 0.0 {
        return Ok(PointerMapping { origin: rect.origin(), scale: Vec2::new(1.0, 1.0) });
    }
    Ok(PointerMapping { origin: rect.origin(), scale })
}

fn ratio_or_one(num: f64, den: f64) -> f64 {
    let r = num / den;
    if r.is_finite() && r > 0.0 { r } else { 1.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::MemoryDocument;
    use kurbo::Rect;

    const STRATEGIES: [ScaleStrategy; 3] =
        [ScaleStrategy::Transform, ScaleStrategy::Zoom, ScaleStrategy::RectRatio];

    fn large_document() -> MemoryDocument {
        let doc = MemoryDocument::new().with_viewport(800.0, 600.0);
        let body = doc.body().unwrap();
        let page = doc.append_element(body, "div");
        doc.set_layout(page, Rect::new(0.0, 0.0, 1600.0, 1200.0));
        doc
    }

    fn fit(doc: &MemoryDocument, strategy: ScaleStrategy) -> ScaleSnapshot {
        let content = measure_content(doc).unwrap();
        let snapshot = fit_content(doc.viewport_size(), content).unwrap();
        apply_scale(doc, strategy, &snapshot).unwrap();
        snapshot
    }

    fn assert_point(a: Point, b: Point) {
        assert!((a.x - b.x).abs() < 1e-9, "{a:?} != {b:?}");
        assert!((a.y - b.y).abs() < 1e-9, "{a:?} != {b:?}");
    }

    #[test]
    fn test_fit_content_picks_limiting_axis() {
        let snap = fit_content(Size::new(800.0, 600.0), Size::new(1600.0, 1200.0)).unwrap();
        assert!((snap.scale - 0.5).abs() < f64::EPSILON);

        let snap = fit_content(Size::new(800.0, 100.0), Size::new(400.0, 400.0)).unwrap();
        assert!((snap.scale - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_fit_content_zero_extent() {
        assert!(fit_content(Size::ZERO, Size::new(10.0, 10.0)).is_none());
        assert!(fit_content(Size::new(10.0, 10.0), Size::new(0.0, 10.0)).is_none());
        assert!(fit_content(Size::new(-5.0, 10.0), Size::new(10.0, 10.0)).is_none());
    }

    #[test]
    fn test_fit_content_idempotent() {
        let a = fit_content(Size::new(1024.0, 768.0), Size::new(1300.0, 2000.0));
        let b = fit_content(Size::new(1024.0, 768.0), Size::new(1300.0, 2000.0));
        assert_eq!(a, b);
    }

    #[test]
    fn test_apply_is_idempotent_on_document() {
        for strategy in STRATEGIES {
            let doc = large_document();
            let first = fit(&doc, strategy);
            let second = fit(&doc, strategy);
            assert_eq!(first, second, "{strategy:?}");
        }
    }

    #[test]
    fn test_parse_transform_scale() {
        assert_eq!(parse_transform_scale("scale(0.5)"), Some((0.5, 0.5)));
        assert_eq!(parse_transform_scale("scale(2, 3)"), Some((2.0, 3.0)));
        assert_eq!(parse_transform_scale("matrix(0.5, 0, 0, 0.25, 10, 20)"), Some((0.5, 0.25)));
        assert_eq!(
            parse_transform_scale("matrix3d(0.5, 0, 0, 0, 0, 0.5, 0, 0, 0, 0, 1, 0, 0, 0, 0, 1)"),
            Some((0.5, 0.5))
        );
        assert_eq!(parse_transform_scale("none"), None);
        assert_eq!(parse_transform_scale("matrix(1, 2)"), None);
        assert_eq!(parse_transform_scale("scale(abc)"), None);
    }

    #[test]
    fn test_pointer_mapping_scenario_all_strategies() {
        for strategy in STRATEGIES {
            let doc = large_document();
            let snapshot = fit(&doc, strategy);
            let cached = Vec2::new(snapshot.scale, snapshot.scale);
            let mapping = pointer_mapping(&doc, strategy, cached).unwrap();
            let content = mapping.to_content(Point::new(400.0, 300.0));
            assert_point(content, Point::new(800.0, 600.0));
        }
    }

    #[test]
    fn test_roundtrip_all_strategies() {
        for strategy in STRATEGIES {
            let doc = large_document();
            doc.set_viewport(Size::new(733.0, 411.0));
            let snapshot = fit(&doc, strategy);
            let cached = Vec2::new(snapshot.scale, snapshot.scale);
            let mapping = pointer_mapping(&doc, strategy, cached).unwrap();
            for p in [Point::new(0.0, 0.0), Point::new(123.4, 56.7), Point::new(732.0, 410.0)] {
                assert_point(mapping.to_viewport(mapping.to_content(p)), p);
            }
        }
    }

    #[test]
    fn test_wrapper_migration_is_idempotent() {
        let doc = large_document();
        let body = doc.body().unwrap();
        let original = doc.children(&body);

        let wrapper = ensure_wrapper(&doc).unwrap();
        assert_eq!(doc.children(&body), vec![wrapper]);
        assert_eq!(doc.children(&wrapper), original);

        let again = ensure_wrapper(&doc).unwrap();
        assert_eq!(again, wrapper);
        assert_eq!(doc.children(&body), vec![wrapper]);
    }

    #[test]
    fn test_apply_transform_styles() {
        let doc = large_document();
        fit(&doc, ScaleStrategy::Transform);
        let body = doc.body().unwrap();
        let root = doc.root().unwrap();
        assert_eq!(doc.inline_style(&body, "transform").as_deref(), Some("scale(0.5)"));
        assert_eq!(doc.inline_style(&body, "transform-origin").as_deref(), Some("top left"));
        assert_eq!(doc.inline_style(&body, "width").as_deref(), Some("1600px"));
        assert_eq!(doc.inline_style(&root, "overflow").as_deref(), Some("hidden"));
        assert_eq!(doc.inline_style(&body, "touch-action").as_deref(), Some("none"));
    }

    #[test]
    fn test_clear_scale_removes_properties() {
        let doc = large_document();
        fit(&doc, ScaleStrategy::Transform);
        clear_scale(&doc, ScaleStrategy::Transform);
        let body = doc.body().unwrap();
        assert_eq!(doc.inline_style(&body, "transform"), None);

        fit(&doc, ScaleStrategy::Zoom);
        clear_scale(&doc, ScaleStrategy::Zoom);
        let wrapper = doc.element_by_id(SCALE_WRAPPER_ID).unwrap();
        assert_eq!(doc.inline_style(&wrapper, "zoom"), None);
    }

    #[test]
    fn test_measure_unloaded_document() {
        let doc = MemoryDocument::unloaded();
        assert_eq!(measure_content(&doc), Err(EngineError::EnvironmentNotReady));
    }
}
