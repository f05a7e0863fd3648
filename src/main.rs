//! span-editor demo (native, for testing purposes only)
//! The main interface is through WASM bindings; this drives the same editor
//! against an in-memory DOM and prints the resulting markup.
//!
//! Usage: span-editor [TEXT_FILE]

use anyhow::{Context, Result};
use span_editor::source::SAMPLE_PASSAGE;
use span_editor::{Dom, Editor, EditorConfig, FormatKind, MemoryDom};

const PAGE: &str = r#"<div id="file"></div><div id="format-actions"><button data-formatType="bold">B</button><button data-formatType="italic">I</button><button data-formatType="underline">U</button></div>"#;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let text = match std::env::args().nth(1) {
        Some(path) => {
            std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?
        }
        None => SAMPLE_PASSAGE.to_string(),
    };

    let dom = MemoryDom::from_html(PAGE)?;
    let holder = dom.get_element_by_id("file");
    let controls = dom
        .get_element_by_id("format-actions")
        .context("toolbar missing from page")?;

    let mut editor = Editor::new(dom, holder, EditorConfig::default())?;
    editor.attach_control(controls);
    editor.apply_resolved(text.trim_end())?;

    let holder = *editor.container().context("editor has no container")?;
    let words = editor.dom().children(&holder);
    println!("{} words", words.len());

    // Format the first three words the way toolbar clicks would
    for (word, format) in words.iter().zip(FormatKind::ALL) {
        editor.handle_double_click(word)?;
        editor.apply_format(format)?;
    }
    editor.clear_selection()?;

    println!("{}", editor.dom().inner_html(&holder));
    Ok(())
}
