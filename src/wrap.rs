//! Word wrapping: turns text into one `<span>` per space-delimited word

use std::sync::LazyLock;

use regex::Regex;

/// Matches the text between the first opening tag and the last closing tag
static BETWEEN_TAGS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r">(.*)<").unwrap_or_else(|e| panic!("invalid tag pattern: {e}"))
});

/// Content to wrap
#[derive(Debug, Clone, Copy)]
pub enum WrapInput<'a> {
    /// Raw text (already escaped if it came from plain text)
    Text(&'a str),
    /// Inner HTML of each existing word span, in order
    Fragments(&'a [String]),
}

/// Wrap every space-separated token in its own span
pub fn wrap_to_spans(text: &str) -> String {
    text.split(' ')
        .map(|word| format!("<span>{word}</span>"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Re-wrap word fragments.
///
/// A fragment that is itself wrapped in a tag keeps that tag around its first
/// sub-word only; the remaining sub-words become plain spans after it.
pub fn split_by_elements(fragments: &[String]) -> String {
    fragments
        .iter()
        .map(|fragment| rewrap_fragment(fragment))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn wrap(input: WrapInput<'_>) -> String {
    match input {
        WrapInput::Text(text) => wrap_to_spans(text),
        WrapInput::Fragments(fragments) => split_by_elements(fragments),
    }
}

fn rewrap_fragment(fragment: &str) -> String {
    let Some(caps) = BETWEEN_TAGS.captures(fragment) else {
        return wrap_to_spans(fragment);
    };
    let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
        return wrap_to_spans(fragment);
    };

    let mut words = inner.as_str().split(' ');
    let first = words.next().unwrap_or_default();
    let rest: Vec<String> = words.map(|word| format!("<span>{word}</span>")).collect();

    let mut kept = String::with_capacity(fragment.len() + 16);
    kept.push_str("<span>");
    kept.push_str(&fragment[..whole.start()]);
    kept.push('>');
    kept.push_str(first);
    kept.push('<');
    kept.push_str(&fragment[whole.end()..]);
    kept.push_str("</span>");

    if rest.is_empty() {
        kept
    } else {
        format!("{kept} {}", rest.join(" "))
    }
}
