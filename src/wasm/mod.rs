//! WASM bindings for the editor

use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{future_to_promise, spawn_local, JsFuture};
use web_sys::{Element, Event, EventTarget, HtmlElement};

use crate::dom::js_message;
use crate::source::{self, SourceError};
use crate::{Dom, Editor, EditorConfig, EditorError, FormatKind, TextSource, WebDom};

/// Initialize panic hook and route `tracing` events to the browser console
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    // Already installed when the host calls init twice
    #[cfg(target_arch = "wasm32")]
    let _ = tracing_wasm::try_set_as_global_default();
}

fn to_js(err: EditorError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// State shared between the wrapper and its event callbacks
struct Shared {
    editor: Editor<WebDom>,
    /// Re-wrap timer for the latest keyup; replacing it cancels the old one
    pending: Option<Timeout>,
}

struct Listener {
    target: EventTarget,
    event: &'static str,
    closure: Closure<dyn FnMut(Event)>,
}

/// WASM-exposed editor wrapper.
///
/// Event listeners live as long as this object; JS must keep it alive while
/// the editor is on the page.
#[wasm_bindgen]
pub struct WasmEditor {
    shared: Rc<RefCell<Shared>>,
    listeners: Vec<Listener>,
}

#[wasm_bindgen]
impl WasmEditor {
    /// Make `container` editable and start listening for typing and
    /// double-clicks. A missing container yields an inert editor.
    #[wasm_bindgen(constructor)]
    pub fn new(
        container: Option<HtmlElement>,
        config_json: Option<String>,
    ) -> Result<WasmEditor, JsValue> {
        let config = match config_json {
            Some(json) => EditorConfig::from_json(&json).map_err(to_js)?,
            None => EditorConfig::default(),
        };
        let dom = WebDom::from_window().ok_or_else(|| JsValue::from_str("no document available"))?;
        let holder: Option<Element> = container.map(Into::into);

        let editor = Editor::new(dom, holder.clone(), config).map_err(to_js)?;
        let mut this = Self {
            shared: Rc::new(RefCell::new(Shared {
                editor,
                pending: None,
            })),
            listeners: Vec::new(),
        };

        if let Some(holder) = holder {
            this.listen_surface(&holder)?;
        }
        Ok(this)
    }

    /// Fill the container with `text`, a string or a Promise of one.
    ///
    /// The returned Promise rejects with the source's message when the text
    /// Promise rejects. Other values are ignored.
    #[wasm_bindgen(js_name = applyText)]
    pub fn apply_text(&self, text: JsValue) -> js_sys::Promise {
        let shared = Rc::clone(&self.shared);
        future_to_promise(async move {
            let source = if let Some(text) = text.as_string() {
                TextSource::Ready(text)
            } else if let Ok(promise) = text.dyn_into::<js_sys::Promise>() {
                TextSource::deferred(async move {
                    let value = JsFuture::from(promise)
                        .await
                        .map_err(|err| SourceError::new(js_message(&err)))?;
                    value
                        .as_string()
                        .ok_or_else(|| SourceError::new("text source resolved to a non-string"))
                })
            } else {
                return Ok(JsValue::UNDEFINED);
            };

            // No borrow is held while the source is pending
            let text = source.resolve().await.map_err(to_js)?;
            shared
                .borrow_mut()
                .editor
                .apply_resolved(&text)
                .map_err(to_js)?;
            Ok(JsValue::UNDEFINED)
        })
    }

    /// Route clicks on `controls` to format toggles
    #[wasm_bindgen(js_name = attachControl)]
    pub fn attach_control(&mut self, controls: Element) -> Result<(), JsValue> {
        self.shared
            .borrow_mut()
            .editor
            .attach_control(controls.clone());

        let shared = Rc::clone(&self.shared);
        self.listen(&controls, "click", move |event: Event| {
            let Some(target) = event_element(&event) else {
                return;
            };
            if let Err(err) = shared.borrow_mut().editor.handle_control_click(&target) {
                tracing::warn!(%err, "format toggle failed");
            }
        })
    }

    /// Toggle a format on the selected word. Unknown names are ignored.
    #[wasm_bindgen(js_name = applyFormat)]
    pub fn apply_format(&self, format: &str) -> Result<bool, JsValue> {
        let Ok(kind) = format.parse::<FormatKind>() else {
            return Ok(false);
        };
        self.shared
            .borrow_mut()
            .editor
            .apply_format(kind)
            .map_err(to_js)
    }

    /// Current container markup
    #[wasm_bindgen(js_name = getHtml)]
    pub fn get_html(&self) -> String {
        let shared = self.shared.borrow();
        shared
            .editor
            .container()
            .map(|holder| shared.editor.dom().inner_html(holder))
            .unwrap_or_default()
    }

    /// Clear selection
    #[wasm_bindgen(js_name = clearSelection)]
    pub fn clear_selection(&self) -> Result<(), JsValue> {
        self.shared
            .borrow_mut()
            .editor
            .clear_selection()
            .map_err(to_js)
    }
}

impl WasmEditor {
    fn listen(
        &mut self,
        target: &EventTarget,
        event: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<(), JsValue> {
        let closure = Closure::<dyn FnMut(Event)>::new(handler);
        target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
        self.listeners.push(Listener {
            target: target.clone(),
            event,
            closure,
        });
        Ok(())
    }

    fn listen_surface(&mut self, holder: &Element) -> Result<(), JsValue> {
        let shared = Rc::clone(&self.shared);
        self.listen(holder, "keyup", move |_event: Event| {
            let mut state = shared.borrow_mut();
            let Some(revision) = state.editor.handle_keyup() else {
                return;
            };
            let delay = state.editor.config().debounce_ms;
            let timer_state = Rc::clone(&shared);
            state.pending = Some(Timeout::new(delay, move || {
                let mut state = timer_state.borrow_mut();
                if let Err(err) = state.editor.debounce_elapsed(revision) {
                    tracing::warn!(%err, "re-wrap failed");
                }
            }));
        })?;

        let shared = Rc::clone(&self.shared);
        self.listen(holder, "dblclick", move |event: Event| {
            let Some(target) = event_element(&event) else {
                return;
            };
            if let Err(err) = shared.borrow_mut().editor.handle_double_click(&target) {
                tracing::warn!(%err, "selection failed");
            }
        })
    }
}

impl Drop for WasmEditor {
    fn drop(&mut self) {
        for listener in self.listeners.drain(..) {
            let _ = listener.target.remove_event_listener_with_callback(
                listener.event,
                listener.closure.as_ref().unchecked_ref(),
            );
        }
        // Breaks the Rc cycle through the pending timer callback
        if let Ok(mut state) = self.shared.try_borrow_mut() {
            state.pending = None;
        }
    }
}

fn event_element(event: &Event) -> Option<Element> {
    event.target()?.dyn_into::<Element>().ok()
}

/// Page bootstrap: find the editable surface and the toolbar by id, load the
/// sample passage and wire the toolbar. Keep the returned editor alive.
#[wasm_bindgen]
pub fn mount(
    surface_id: &str,
    toolbar_id: &str,
    config_json: Option<String>,
) -> Result<WasmEditor, JsValue> {
    let document = WebDom::from_window()
        .ok_or_else(|| JsValue::from_str("no document available"))?
        .document()
        .clone();

    let holder = document
        .get_element_by_id(surface_id)
        .and_then(|element| element.dyn_into::<HtmlElement>().ok());
    if holder.is_none() {
        tracing::warn!(surface_id, "editor surface not found");
    }

    let mut editor = WasmEditor::new(holder, config_json)?;

    let shared = Rc::clone(&editor.shared);
    spawn_local(async move {
        let result = match source::sample_text().resolve().await {
            Ok(text) => shared.borrow_mut().editor.apply_resolved(&text),
            Err(err) => Err(err),
        };
        if let Err(err) = result {
            tracing::error!(%err, "failed to load initial text");
        }
    });

    if let Some(controls) = document.get_element_by_id(toolbar_id) {
        editor.attach_control(controls)?;
    }
    Ok(editor)
}
