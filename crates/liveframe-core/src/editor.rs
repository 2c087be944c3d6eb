//! Editor: the host-facing engine for one embedded document.
//!
//! An [`Editor`] owns the document handle, the manipulation library adapter
//! and all per-document [`EditorState`]. Host calls never fail: errors are
//! absorbed here and logged, because the host may call in while the frame is
//! still loading or mid-navigation.

use crate::config::EditorConfig;
use crate::document::Document;
use crate::edit::EditMode;
use crate::error::{EngineError, EngineResult};
use crate::input::{EditorEvent, EventOutcome};
use crate::manipulation::{ManipulationEvent, Manipulator};
use crate::router::{EventRouter, Route};
use crate::scale::{self, ScaleSnapshot, ScaleStrategy};
use crate::selection::SelectionController;
use crate::style::{self, StyleProps, StyledRegion};
use crate::tools::InsertTool;
use kurbo::{Point, Vec2};
use std::future::Future;

/// Mutable per-document editing state.
#[derive(Debug)]
pub struct EditorState<E, R, B> {
    pub(crate) selection: SelectionController<E, B>,
    pub(crate) edit: EditMode<E>,
    pub(crate) insert: InsertTool,
    /// Clone of the last non-empty text selection.
    pub(crate) selection_range: Option<R>,
    /// Cached content→viewport factors.
    pub(crate) scale: Vec2,
    pub(crate) snapshot: Option<ScaleSnapshot>,
    pub(crate) strategy: ScaleStrategy,
    pub(crate) router: EventRouter,
}

impl<E, R, B> EditorState<E, R, B> {
    fn new(config: &EditorConfig) -> Self {
        Self {
            selection: SelectionController::default(),
            edit: EditMode::default(),
            insert: InsertTool::new(),
            selection_range: None,
            scale: Vec2::new(1.0, 1.0),
            snapshot: None,
            strategy: config.strategy,
            router: EventRouter::new(config.overlay_selectors.clone()),
        }
    }
}

/// Editing engine bound to one document.
pub struct Editor<D: Document, M: Manipulator<D>> {
    document: D,
    manipulator: Option<M>,
    config: EditorConfig,
    state: EditorState<D::Element, D::Range, M::Binding>,
}

impl<D: Document, M: Manipulator<D>> Editor<D, M> {
    /// Create an editor without a manipulation library.
    ///
    /// Selection only tracks the target until [`attach_manipulator`](Self::attach_manipulator)
    /// is called. With the `Zoom` strategy the body's children are moved
    /// into the scale wrapper right away, before anything else touches the
    /// content.
    pub fn new(document: D, config: EditorConfig) -> Self {
        let state = EditorState::new(&config);
        let editor = Self {
            document,
            manipulator: None,
            config,
            state,
        };
        if editor.state.strategy.uses_wrapper() && editor.document.body().is_some() {
            if let Err(e) = scale::ensure_wrapper(&editor.document) {
                log::warn!("Failed to prepare scale wrapper: {}", e);
            }
        }
        editor
    }

    /// Create an editor, install its listeners and wait for the manipulation
    /// library to load.
    ///
    /// A failed load leaves the editor usable with selection degraded to
    /// target tracking.
    pub async fn initialize<F>(document: D, config: EditorConfig, library: F) -> Self
    where
        F: Future<Output = EngineResult<M>>,
    {
        let mut editor = Self::new(document, config);
        editor.install_listeners();
        match library.await {
            Ok(manipulator) => editor.attach_manipulator(manipulator),
            Err(e) => log::warn!("Manipulation library failed to load: {}", e),
        }
        log::info!("Editor initialized (strategy: {:?})", editor.state.strategy);
        editor
    }

    /// Mark the listener set installed. Returns `true` only the first time
    /// for the document, when the platform layer must actually attach its
    /// listeners.
    ///
    /// The mark lives on the document, so a second editor over the same
    /// document stays passive and never routes events.
    pub fn install_listeners(&mut self) -> bool {
        if self.state.router.is_installed() {
            return false;
        }
        if !self.document.claim_listeners() {
            log::debug!("Document already has editor listeners");
            return false;
        }
        self.state.router.install()
    }

    /// Provide the manipulation library once it becomes available.
    pub fn attach_manipulator(&mut self, manipulator: M) {
        self.manipulator = Some(manipulator);
        log::debug!("Manipulation library attached");
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn has_manipulator(&self) -> bool {
        self.manipulator.is_some()
    }

    /// Currently selected element.
    pub fn target(&self) -> Option<&D::Element> {
        self.state.selection.target()
    }

    /// Live manipulation binding.
    pub fn binding(&self) -> Option<&M::Binding> {
        self.state.selection.binding()
    }

    pub fn edit_mode(&self) -> &EditMode<D::Element> {
        &self.state.edit
    }

    pub fn is_insert_armed(&self) -> bool {
        self.state.insert.is_armed()
    }

    /// Cached text selection.
    pub fn selection_range(&self) -> Option<&D::Range> {
        self.state.selection_range.as_ref()
    }

    /// Last applied scale snapshot.
    pub fn snapshot(&self) -> Option<&ScaleSnapshot> {
        self.state.snapshot.as_ref()
    }

    /// Cached content→viewport scale factors.
    pub fn scale(&self) -> Vec2 {
        self.state.scale
    }

    pub fn strategy(&self) -> ScaleStrategy {
        self.state.strategy
    }

    /// Dispatch an input event. The returned outcome must be applied to the
    /// original platform event.
    pub fn handle_event(&mut self, event: EditorEvent<D::Element, D::Range>) -> EventOutcome {
        let armed = self.state.insert.is_armed();
        match self.state.router.route(&self.document, event, armed) {
            Route::InsertText { client } => {
                let result = self.insert_text_at(client);
                self.absorb("insert text", result);
                EventOutcome::PASS
            }
            Route::OverlayControl => EventOutcome::stop_propagation(),
            Route::Select(el) => {
                self.select_target(el);
                EventOutcome::PASS
            }
            Route::EnterEdit(el) => {
                let result = self.state.edit.enter(&self.document, el);
                self.absorb("enter edit", result);
                EventOutcome::PASS
            }
            Route::SelectionChanged(range) => {
                self.state.selection_range = range;
                EventOutcome::PASS
            }
            Route::Key(key) => self.state.edit.handle_key(&self.document, &key),
            Route::Ignore => EventOutcome::PASS,
        }
    }

    /// Apply a geometry change reported by the manipulation overlay.
    pub fn handle_manipulation(&mut self, event: ManipulationEvent) {
        let result = self.state.selection.apply_manipulation(&self.document, &event);
        self.absorb(event.name(), result);
    }

    /// Make `element` the manipulation target.
    pub fn select_target(&mut self, element: D::Element) {
        let result = self.state.selection.select(
            &self.document,
            self.manipulator.as_mut(),
            element,
            self.state.strategy,
            &self.config.capabilities,
        );
        self.absorb("select target", result);
    }

    /// Release the manipulation overlay.
    pub fn teardown(&mut self) {
        self.state.selection.release();
        log::debug!("Editor torn down");
    }

    /// Full markup of the document, or an empty string when it is not loaded.
    pub fn serialize_document(&self) -> String {
        match self.document.root() {
            Some(root) => self.document.outer_html(&root),
            None => String::new(),
        }
    }

    /// Scale the content to fit the viewport.
    pub fn fit_to_viewport(&mut self) {
        let result = self.try_fit_to_viewport();
        self.absorb("fit to viewport", result);
    }

    fn try_fit_to_viewport(&mut self) -> EngineResult<()> {
        let content = scale::measure_content(&self.document)?;
        let viewport = self.document.viewport_size();
        let snapshot = scale::fit_content(viewport, content)
            .ok_or(EngineError::ZeroExtent("viewport or content"))?;
        scale::apply_scale(&self.document, self.state.strategy, &snapshot)?;
        self.state.scale = Vec2::new(snapshot.scale, snapshot.scale);
        self.state.snapshot = Some(snapshot);
        log::debug!(
            "Fitted {}x{} content into {}x{} viewport at scale {}",
            content.width,
            content.height,
            viewport.width,
            viewport.height,
            snapshot.scale
        );
        self.refresh_overlay()
    }

    /// Switch to another scaling strategy, clearing the previous one's styling.
    pub fn set_strategy(&mut self, strategy: ScaleStrategy) {
        if strategy == self.state.strategy {
            return;
        }
        scale::clear_scale(&self.document, self.state.strategy);
        self.state.strategy = strategy;
        if self.state.snapshot.is_some() {
            self.fit_to_viewport();
        } else {
            let result = self.refresh_overlay();
            self.absorb("switch strategy", result);
        }
    }

    fn refresh_overlay(&mut self) -> EngineResult<()> {
        self.state.selection.refresh(
            &self.document,
            self.manipulator.as_mut(),
            self.state.strategy,
            &self.config.capabilities,
        )
    }

    /// Map a viewport point to content space with the active strategy.
    pub fn to_content(&self, client: Point) -> Option<Point> {
        scale::pointer_mapping(&self.document, self.state.strategy, self.state.scale)
            .ok()
            .map(|mapping| mapping.to_content(client))
    }

    /// Arm the one-shot text insert for the next pointer press.
    pub fn arm_text_insert(&mut self) {
        let result = self.state.insert.arm(&self.document, &self.config.insert_cursor);
        self.absorb("arm text insert", result);
    }

    fn insert_text_at(&mut self, client: Point) -> EngineResult<()> {
        let mapping = match scale::pointer_mapping(&self.document, self.state.strategy, self.state.scale) {
            Ok(mapping) => mapping,
            Err(e) => {
                self.state.insert.disarm(&self.document);
                return Err(e);
            }
        };
        let at = mapping.to_content(client);
        let el = self.state.insert.place(&self.document, at, &self.config)?;
        self.select_target(el);
        Ok(())
    }

    /// Apply `props` to the selected text, or to the target without a selection.
    pub fn apply_inline_style(&mut self, props: &StyleProps) {
        let result = style::apply_style(
            &self.document,
            props,
            self.state.selection_range.as_ref(),
            self.state.selection.target(),
        );
        match result {
            Ok(StyledRegion::Nothing) => log::debug!("No selection or target to style"),
            Ok(_) => {
                let result = self.refresh_overlay();
                self.absorb("apply inline style", result);
            }
            Err(e) => self.absorb::<()>("apply inline style", Err(e)),
        }
    }

    /// Make the selection bold without toggling.
    pub fn bold_selected(&mut self) {
        self.apply_inline_style(&StyleProps::font_weight("700"));
    }

    /// Toggle bold, deciding the direction from the target's computed weight.
    pub fn toggle_bold(&mut self) {
        let current = self.computed_target_style("font-weight", "normal");
        self.apply_inline_style(&StyleProps::font_weight(style::toggled_font_weight(&current)));
    }

    /// Toggle italic, deciding the direction from the target's computed style.
    pub fn toggle_italic(&mut self) {
        let current = self.computed_target_style("font-style", "normal");
        self.apply_inline_style(&StyleProps::font_style(style::toggled_font_style(&current)));
    }

    pub fn set_text_color(&mut self, color: &str) {
        match StyleProps::color(color) {
            Ok(props) => self.apply_inline_style(&props),
            Err(e) => self.absorb::<()>("set text color", Err(e)),
        }
    }

    fn computed_target_style(&self, property: &str, fallback: &str) -> String {
        match self.state.selection.target() {
            Some(el) => self.document.computed_style(el, property),
            None => fallback.to_string(),
        }
    }

    fn absorb<T>(&self, operation: &str, result: EngineResult<T>) {
        if let Err(e) = result {
            if e.is_transient() {
                log::debug!("{} skipped: {}", operation, e);
            } else {
                log::warn!("{} failed: {}", operation, e);
            }
        }
    }
}

impl<D: Document, M: Manipulator<D>> Drop for Editor<D, M> {
    fn drop(&mut self) {
        if self.state.router.is_installed() {
            self.document.release_listeners();
        }
    }
}
