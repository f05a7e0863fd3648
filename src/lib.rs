//! span-editor: a minimal rich-text editor widget
//!
//! This crate makes a container element editable and keeps its text split
//! into one inline span per word, so a toolbar can toggle inline formats
//! (bold, italic, underline) on a double-clicked word.
//! - [`Editor`] holds the logic and runs against any [`Dom`]
//! - [`dom::MemoryDom`] backs native use and tests
//! - [`WasmEditor`] wires the editor to browser events

pub mod config;
pub mod debounce;
pub mod dom;
pub mod error;
pub mod format;
pub mod source;
pub mod wasm;
pub mod wrap;

// Re-export WASM types for direct use
pub use wasm::WasmEditor;

// Re-export primary types
pub use config::EditorConfig;
pub use debounce::Debouncer;
pub use dom::{Dom, MemoryDom, WebDom};
pub use error::{DomError, EditorError, Result};
pub use format::FormatKind;
pub use source::{SourceError, TextSource};

use dom::markup;
use wrap::WrapInput;

/// The editor state for one container
pub struct Editor<D: Dom> {
    dom: D,
    /// The editable surface; `None` leaves the editor inert
    holder: Option<D::Node>,
    /// Toolbar containers whose clicks toggle formats
    controls: Vec<D::Node>,
    /// The word span currently carrying the selection marker
    selected: Option<D::Node>,
    debouncer: Debouncer,
    config: EditorConfig,
}

impl<D: Dom> Editor<D> {
    /// Make `holder` editable. Without a holder the editor does nothing.
    pub fn new(mut dom: D, holder: Option<D::Node>, config: EditorConfig) -> Result<Self> {
        match &holder {
            Some(node) => {
                dom.set_attribute(node, "contenteditable", "true")?;
                dom.set_style(node, "outline", "none")?;
            }
            None => tracing::debug!("no editor container; editing disabled"),
        }

        Ok(Self {
            dom,
            holder,
            controls: Vec::new(),
            selected: None,
            debouncer: Debouncer::from_millis(config.debounce_ms),
            config,
        })
    }

    pub fn dom(&self) -> &D {
        &self.dom
    }

    pub fn dom_mut(&mut self) -> &mut D {
        &mut self.dom
    }

    pub fn container(&self) -> Option<&D::Node> {
        self.holder.as_ref()
    }

    pub fn selected(&self) -> Option<&D::Node> {
        self.selected.as_ref()
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn debouncer(&self) -> &Debouncer {
        &self.debouncer
    }

    /// Replace the container content with `source`, one span per word.
    ///
    /// Deferred sources are awaited first; a failing source returns
    /// [`EditorError::TextSource`] with the source's message and leaves the
    /// container untouched.
    pub async fn apply_text(&mut self, source: impl Into<TextSource>) -> Result<()> {
        let text = source.into().resolve().await?;
        self.apply_resolved(&text)
    }

    /// Synchronous half of [`Editor::apply_text`] for already-available text
    pub fn apply_resolved(&mut self, text: &str) -> Result<()> {
        let Some(holder) = self.holder.clone() else {
            return Ok(());
        };

        let html = wrap::wrap(WrapInput::Text(&markup::escape_text(text)));
        self.dom.set_inner_html(&holder, &html)?;
        self.selected = None;

        tracing::debug!(bytes = text.len(), "applied text");
        Ok(())
    }

    /// Register a toolbar container. Clicks inside it reach
    /// [`Editor::handle_control_click`].
    pub fn attach_control(&mut self, controls: D::Node) {
        if !self.controls.contains(&controls) {
            self.controls.push(controls);
        }
    }

    /// A key was released in the container.
    ///
    /// Returns the debounce revision to hand back to
    /// [`Editor::debounce_elapsed`] once the quiet period has passed, or
    /// `None` when there is nothing to re-wrap.
    pub fn handle_keyup(&mut self) -> Option<u64> {
        let holder = self.holder.as_ref()?;
        if self.dom.text_content(holder).is_empty() {
            return None;
        }
        Some(self.debouncer.trigger())
    }

    /// Timer callback for a keyup. Re-wraps only if no later keyup superseded
    /// `revision`; returns whether it did.
    pub fn debounce_elapsed(&mut self, revision: u64) -> Result<bool> {
        if !self.debouncer.fire(revision) {
            return Ok(false);
        }
        self.wrap_typed(self.config.caret_to_end)?;
        Ok(true)
    }

    /// Rebuild the word spans from the container's current markup
    pub fn wrap_typed(&mut self, move_cursor_to_end: bool) -> Result<()> {
        let Some(holder) = self.holder.clone() else {
            return Ok(());
        };

        let fragments = self.dom.child_fragments(&holder);
        let html = wrap::wrap(WrapInput::Fragments(&fragments));
        tracing::trace!(%html, "re-wrapped typed text");

        self.dom.set_inner_html(&holder, &html)?;
        // The old spans are gone, and the selection with them
        self.selected = None;

        if move_cursor_to_end {
            if let Some(last) = self.dom.children(&holder).last() {
                self.dom.place_caret_at_end(last)?;
            }
        }
        Ok(())
    }

    /// Select the word span containing `target`. Returns whether the
    /// selection changed.
    pub fn handle_double_click(&mut self, target: &D::Node) -> Result<bool> {
        let Some(word) = self.word_span_of(target) else {
            return Ok(false);
        };

        self.clear_selection()?;
        self.dom.add_class(&word, &self.config.selected_class)?;
        self.selected = Some(word);
        Ok(true)
    }

    /// Drop the selection and its marker class
    pub fn clear_selection(&mut self) -> Result<()> {
        if let Some(previous) = self.selected.take() {
            self.dom
                .remove_class(&previous, &self.config.selected_class)?;
        }
        Ok(())
    }

    /// A click landed on `target` inside an attached toolbar. Toggles the
    /// format the control names, if any. Returns whether a format changed.
    pub fn handle_control_click(&mut self, target: &D::Node) -> Result<bool> {
        if self.selected.is_none() || !self.is_control(target) {
            return Ok(false);
        }
        let Some(value) = self.dom.attribute(target, &self.config.format_attribute) else {
            return Ok(false);
        };

        match value.parse::<FormatKind>() {
            Ok(kind) => self.apply_format(kind),
            Err(err) => {
                tracing::debug!(%err, "ignoring control");
                Ok(false)
            }
        }
    }

    /// Toggle `kind` on the selected word.
    ///
    /// A bare word gets a new wrapper carrying the format class. A word that
    /// already has a wrapper gets the class toggled on that first child, so
    /// formats accumulate on a single wrapper.
    pub fn apply_format(&mut self, kind: FormatKind) -> Result<bool> {
        let Some(selected) = self.selected.clone() else {
            return Ok(false);
        };

        match self.dom.children(&selected).first() {
            None => {
                let inner = self.dom.inner_html(&selected);
                let wrapped = format!(r#"<span class="{}">{inner}</span>"#, kind.class_name());
                self.dom.set_inner_html(&selected, &wrapped)?;
                tracing::debug!(format = %kind, "wrapped selection");
            }
            Some(wrapper) => {
                let enabled = self.dom.toggle_class(wrapper, kind.class_name())?;
                tracing::debug!(format = %kind, enabled, "toggled format");
            }
        }
        Ok(true)
    }

    /// The direct child of the container that holds `target`
    fn word_span_of(&self, target: &D::Node) -> Option<D::Node> {
        let holder = self.holder.as_ref()?;
        let mut node = target.clone();
        loop {
            let parent = self.dom.parent(&node)?;
            if &parent == holder {
                return Some(node);
            }
            node = parent;
        }
    }

    fn is_control(&self, target: &D::Node) -> bool {
        let mut node = Some(target.clone());
        while let Some(current) = node {
            if self.controls.contains(&current) {
                return true;
            }
            node = self.dom.parent(&current);
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::NodeId;
    use crate::source::{block_on, SourceError};

    const PAGE: &str = r#"<div id="file"></div><div id="format-actions"><button data-formatType="bold">B</button><button data-formatType="italic">I</button><button data-formatType="underline">U</button><button data-formatType="strike">S</button><span id="label">Format</span></div>"#;

    fn page_editor() -> Editor<MemoryDom> {
        let dom = MemoryDom::from_html(PAGE).unwrap();
        let holder = dom.get_element_by_id("file");
        let controls = dom.get_element_by_id("format-actions").unwrap();
        let mut editor = Editor::new(dom, holder, EditorConfig::default()).unwrap();
        editor.attach_control(controls);
        editor
    }

    fn holder(editor: &Editor<MemoryDom>) -> NodeId {
        *editor.container().unwrap()
    }

    fn words(editor: &Editor<MemoryDom>) -> Vec<NodeId> {
        editor.dom().children(&holder(editor))
    }

    fn button(editor: &Editor<MemoryDom>, format: &str) -> NodeId {
        let controls = editor.dom().get_element_by_id("format-actions").unwrap();
        editor
            .dom()
            .children(&controls)
            .into_iter()
            .find(|b| editor.dom().attribute(b, "data-formattype").as_deref() == Some(format))
            .unwrap()
    }

    fn click(editor: &mut Editor<MemoryDom>, format: &str) -> bool {
        let target = button(editor, format);
        editor.handle_control_click(&target).unwrap()
    }

    #[test]
    fn test_construction_makes_container_editable() {
        let editor = page_editor();
        let holder = holder(&editor);
        assert_eq!(
            editor.dom().attribute(&holder, "contenteditable").as_deref(),
            Some("true")
        );
        assert_eq!(
            editor.dom().attribute(&holder, "style").as_deref(),
            Some("outline: none;")
        );
    }

    #[test]
    fn test_missing_container_is_inert() {
        let dom = MemoryDom::from_html(PAGE).unwrap();
        let body = dom.body();
        let before = dom.inner_html(&body);
        let mut editor = Editor::new(dom, None, EditorConfig::default()).unwrap();

        block_on(editor.apply_text("hello world")).unwrap();
        assert_eq!(editor.handle_keyup(), None);
        editor.wrap_typed(true).unwrap();

        assert_eq!(editor.dom().inner_html(&body), before);
        assert_eq!(editor.dom().caret(), None);
    }

    #[test]
    fn test_apply_text_hello_world() {
        let mut editor = page_editor();
        block_on(editor.apply_text("hello world")).unwrap();

        let spans = words(&editor);
        assert_eq!(spans.len(), 2);
        let texts: Vec<String> = spans.iter().map(|s| editor.dom().text_content(s)).collect();
        assert_eq!(texts.join(" "), "hello world");
        assert_eq!(
            editor.dom().inner_html(&holder(&editor)),
            "<span>hello</span> <span>world</span>"
        );
    }

    #[test]
    fn test_apply_text_escapes_markup() {
        let mut editor = page_editor();
        block_on(editor.apply_text("<b>x</b> & y")).unwrap();
        assert_eq!(words(&editor).len(), 3);
        assert_eq!(editor.dom().text_content(&holder(&editor)), "<b>x</b> & y");
    }

    #[test]
    fn test_apply_deferred_text() {
        let mut editor = page_editor();
        block_on(editor.apply_text(source::sample_text())).unwrap();
        let text = editor.dom().text_content(&holder(&editor));
        assert_eq!(text, source::SAMPLE_PASSAGE);
        assert_eq!(words(&editor).len(), source::SAMPLE_PASSAGE.split(' ').count());
    }

    #[test]
    fn test_rejected_source_surfaces_message() {
        let mut editor = page_editor();
        block_on(editor.apply_text("keep me")).unwrap();

        let failing = TextSource::deferred(async { Err(SourceError::new("network error")) });
        let err = block_on(editor.apply_text(failing)).unwrap_err();
        assert_eq!(err.to_string(), "network error");
        assert_eq!(err.source_message(), Some("network error"));
        assert_eq!(editor.dom().text_content(&holder(&editor)), "keep me");
    }

    #[test]
    fn test_double_click_selects_word_span() {
        let mut editor = page_editor();
        block_on(editor.apply_text("hello world")).unwrap();
        let spans = words(&editor);

        assert!(editor.handle_double_click(&spans[1]).unwrap());
        assert_eq!(editor.selected(), Some(&spans[1]));
        assert!(editor.dom().has_class(&spans[1], "selected"));
    }

    #[test]
    fn test_double_click_inside_wrapper_selects_parent() {
        let mut editor = page_editor();
        block_on(editor.apply_text("hello world")).unwrap();
        let spans = words(&editor);

        editor.handle_double_click(&spans[0]).unwrap();
        click(&mut editor, "bold");
        let wrapper = editor.dom().children(&spans[0])[0];

        editor.handle_double_click(&spans[1]).unwrap();
        editor.handle_double_click(&wrapper).unwrap();
        assert_eq!(editor.selected(), Some(&spans[0]));
        assert!(!editor.dom().has_class(&wrapper, "selected"));
    }

    #[test]
    fn test_only_one_selection_marker() {
        let mut editor = page_editor();
        block_on(editor.apply_text("one two three")).unwrap();
        let holder = holder(&editor);

        for span in words(&editor) {
            editor.handle_double_click(&span).unwrap();
            assert_eq!(editor.dom().elements_with_class(holder, "selected"), vec![span]);
        }
    }

    #[test]
    fn test_double_click_outside_words_is_ignored() {
        let mut editor = page_editor();
        block_on(editor.apply_text("hello")).unwrap();
        let holder = holder(&editor);
        let label = editor.dom().get_element_by_id("label").unwrap();

        assert!(!editor.handle_double_click(&holder).unwrap());
        assert!(!editor.handle_double_click(&label).unwrap());
        assert_eq!(editor.selected(), None);
    }

    #[test]
    fn test_bold_wraps_bare_selection() {
        let mut editor = page_editor();
        block_on(editor.apply_text("hello world")).unwrap();
        let span = words(&editor)[0];
        editor.handle_double_click(&span).unwrap();

        assert!(click(&mut editor, "bold"));
        assert_eq!(
            editor.dom().inner_html(&span),
            r#"<span class="bold">hello</span>"#
        );
    }

    #[test]
    fn test_same_format_toggles_off() {
        let mut editor = page_editor();
        block_on(editor.apply_text("hello")).unwrap();
        let span = words(&editor)[0];
        editor.handle_double_click(&span).unwrap();

        editor.apply_format(FormatKind::Underline).unwrap();
        let wrapper = editor.dom().children(&span)[0];
        assert_eq!(editor.dom().attribute(&wrapper, "class").as_deref(), Some("underline"));

        editor.apply_format(FormatKind::Underline).unwrap();
        assert_eq!(editor.dom().children(&span), vec![wrapper]);
        assert!(!editor.dom().has_class(&wrapper, "underline"));
    }

    #[test]
    fn test_formats_accumulate_on_one_wrapper() {
        let mut editor = page_editor();
        block_on(editor.apply_text("hello")).unwrap();
        let span = words(&editor)[0];
        editor.handle_double_click(&span).unwrap();

        click(&mut editor, "bold");
        click(&mut editor, "italic");
        let wrappers = editor.dom().children(&span);
        assert_eq!(wrappers.len(), 1);
        assert!(editor.dom().has_class(&wrappers[0], "bold"));
        assert!(editor.dom().has_class(&wrappers[0], "italic"));

        click(&mut editor, "bold");
        assert!(!editor.dom().has_class(&wrappers[0], "bold"));
        assert!(editor.dom().has_class(&wrappers[0], "italic"));
    }

    #[test]
    fn test_control_clicks_without_effect() {
        let mut editor = page_editor();
        block_on(editor.apply_text("hello")).unwrap();

        // No selection yet
        assert!(!click(&mut editor, "bold"));

        let span = words(&editor)[0];
        editor.handle_double_click(&span).unwrap();
        let before = editor.dom().inner_html(&span);

        assert!(!click(&mut editor, "strike"));
        let label = editor.dom().get_element_by_id("label").unwrap();
        assert!(!editor.handle_control_click(&label).unwrap());
        // A word is not a toolbar control
        assert!(!editor.handle_control_click(&span).unwrap());
        assert_eq!(editor.dom().inner_html(&span), before);
    }

    #[test]
    fn test_keyup_debounces_rewrap() {
        let mut editor = page_editor();
        block_on(editor.apply_text("hello")).unwrap();
        let holder = holder(&editor);
        let span = words(&editor)[0];
        editor.dom_mut().set_inner_html(&span, "hello there").unwrap();

        let first = editor.handle_keyup().unwrap();
        let second = editor.handle_keyup().unwrap();
        assert!(!editor.debounce_elapsed(first).unwrap());
        assert_eq!(words(&editor).len(), 1);

        assert!(editor.debounce_elapsed(second).unwrap());
        assert_eq!(
            editor.dom().inner_html(&holder),
            "<span>hello</span> <span>there</span>"
        );
        let last = *words(&editor).last().unwrap();
        assert_eq!(editor.dom().caret().map(|c| (c.node, c.offset)), Some((last, 5)));
    }

    #[test]
    fn test_keyup_on_empty_container_does_nothing() {
        let mut editor = page_editor();
        assert_eq!(editor.handle_keyup(), None);
        assert!(!editor.debouncer().is_pending());
    }

    #[test]
    fn test_rewrap_keeps_format_on_first_subword() {
        let mut editor = page_editor();
        block_on(editor.apply_text("hello")).unwrap();
        let span = words(&editor)[0];
        editor.handle_double_click(&span).unwrap();
        click(&mut editor, "bold");

        let wrapper = editor.dom().children(&span)[0];
        editor.dom_mut().set_inner_html(&wrapper, "hello big world").unwrap();
        editor.wrap_typed(false).unwrap();

        assert_eq!(
            editor.dom().inner_html(&holder(&editor)),
            r#"<span><span class="bold">hello</span></span> <span>big</span> <span>world</span>"#
        );
        assert_eq!(editor.selected(), None);
        assert_eq!(editor.dom().caret(), None);
    }

    #[test]
    fn test_rewrap_picks_up_loose_text() {
        let mut editor = page_editor();
        let holder = holder(&editor);
        editor
            .dom_mut()
            .set_inner_html(&holder, "<span>hi</span> typed here")
            .unwrap();

        let revision = editor.handle_keyup().unwrap();
        editor.debounce_elapsed(revision).unwrap();
        assert_eq!(
            editor.dom().inner_html(&holder),
            "<span>hi</span> <span>typed</span> <span>here</span>"
        );
    }

    #[test]
    fn test_repeated_rewraps_keep_memory_bounded() {
        let mut editor = page_editor();
        block_on(editor.apply_text("one two three four five")).unwrap();
        let span = words(&editor)[1];
        editor.handle_double_click(&span).unwrap();
        click(&mut editor, "italic");

        editor.wrap_typed(true).unwrap();
        let slots = editor.dom().slot_count();
        for _ in 0..1_000 {
            let revision = editor.handle_keyup().unwrap();
            assert!(editor.debounce_elapsed(revision).unwrap());
        }

        assert_eq!(editor.dom().slot_count(), slots);
        assert_eq!(
            editor.dom().text_content(&holder(&editor)),
            "one two three four five"
        );
    }

    #[test]
    fn test_custom_config() {
        let dom = MemoryDom::from_html(r#"<div id="file"></div><p id="bar"><i data-fmt="italic">I</i></p>"#)
            .unwrap();
        let holder = dom.get_element_by_id("file");
        let bar = dom.get_element_by_id("bar").unwrap();
        let config =
            EditorConfig::from_json(r#"{"selectedClass": "picked", "formatAttribute": "data-fmt"}"#)
                .unwrap();
        let mut editor = Editor::new(dom, holder, config).unwrap();
        editor.attach_control(bar);
        block_on(editor.apply_text("word")).unwrap();

        let span = words(&editor)[0];
        editor.handle_double_click(&span).unwrap();
        assert!(editor.dom().has_class(&span, "picked"));

        let italic = editor.dom().children(&bar)[0];
        assert!(editor.handle_control_click(&italic).unwrap());
        assert_eq!(
            editor.dom().inner_html(&span),
            r#"<span class="italic">word</span>"#
        );
    }
}
