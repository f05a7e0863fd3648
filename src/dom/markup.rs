//! Inline HTML fragment tokenizer and serializer
//!
//! Covers the subset the editor produces and the browser hands back from
//! `innerHTML`: elements with quoted or bare attributes, text, and the common
//! named/numeric character references. No comments, doctypes or raw-text
//! elements.

use pulldown_cmark_escape::{escape_html, escape_html_body_text};
use smallvec::SmallVec;

use crate::error::DomError;

pub type Attributes = SmallVec<[(String, String); 2]>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Start {
        name: String,
        attrs: Attributes,
        self_closing: bool,
    },
    End {
        name: String,
    },
    Text(String),
}

/// Elements that never have children or an end tag
pub fn is_void(name: &str) -> bool {
    matches!(name, "br" | "img" | "hr" | "input" | "wbr")
}

pub fn tokenize(html: &str) -> Result<Vec<Token>, DomError> {
    let mut tokens = Vec::new();
    let mut rest = html;

    while !rest.is_empty() {
        match rest.find('<') {
            Some(0) => {
                let end = tag_end(rest)
                    .ok_or_else(|| DomError::Markup(format!("unterminated tag in {rest:?}")))?;
                tokens.push(parse_tag(&rest[1..end])?);
                rest = &rest[end + 1..];
            }
            Some(idx) => {
                tokens.push(Token::Text(decode_entities(&rest[..idx])));
                rest = &rest[idx..];
            }
            None => {
                tokens.push(Token::Text(decode_entities(rest)));
                rest = "";
            }
        }
    }

    Ok(tokens)
}

/// Byte index of the `>` closing the tag at the start of `rest`, skipping
/// quoted attribute values
fn tag_end(rest: &str) -> Option<usize> {
    let mut quote = None;
    for (idx, ch) in rest.char_indices().skip(1) {
        match (quote, ch) {
            (None, '"' | '\'') => quote = Some(ch),
            (Some(open), _) if ch == open => quote = None,
            (None, '>') => return Some(idx),
            _ => {}
        }
    }
    None
}

fn parse_tag(body: &str) -> Result<Token, DomError> {
    if let Some(name) = body.strip_prefix('/') {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomError::Markup("empty end tag".into()));
        }
        return Ok(Token::End {
            name: name.to_ascii_lowercase(),
        });
    }

    let (body, self_closing) = match body.strip_suffix('/') {
        Some(inner) => (inner, true),
        None => (body, false),
    };

    let body = body.trim();
    let name_end = body
        .find(|c: char| c.is_ascii_whitespace())
        .unwrap_or(body.len());
    let name = &body[..name_end];
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(DomError::Markup(format!("bad tag name {name:?}")));
    }

    Ok(Token::Start {
        name: name.to_ascii_lowercase(),
        attrs: parse_attributes(&body[name_end..])?,
        self_closing,
    })
}

fn parse_attributes(mut rest: &str) -> Result<Attributes, DomError> {
    let mut attrs = Attributes::new();

    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            break;
        }

        let name_end = rest
            .find(|c: char| c == '=' || c.is_ascii_whitespace())
            .unwrap_or(rest.len());
        let name = rest[..name_end].to_ascii_lowercase();
        rest = rest[name_end..].trim_start();

        let value = if let Some(after_eq) = rest.strip_prefix('=') {
            let after_eq = after_eq.trim_start();
            match after_eq.chars().next() {
                Some(quote @ ('"' | '\'')) => {
                    let close = after_eq[1..]
                        .find(quote)
                        .ok_or_else(|| DomError::Markup(format!("unclosed value for {name}")))?;
                    let value = decode_entities(&after_eq[1..close + 1]);
                    rest = &after_eq[close + 2..];
                    value
                }
                _ => {
                    let end = after_eq
                        .find(|c: char| c.is_ascii_whitespace())
                        .unwrap_or(after_eq.len());
                    let value = decode_entities(&after_eq[..end]);
                    rest = &after_eq[end..];
                    value
                }
            }
        } else {
            String::new()
        };

        attrs.push((name, value));
    }

    Ok(attrs)
}

pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(idx) = rest.find('&') {
        out.push_str(&rest[..idx]);
        rest = &rest[idx..];

        let decoded = rest.find(';').and_then(|semi| {
            let ch = match &rest[1..semi] {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some('\u{a0}'),
                num if num.starts_with("#x") || num.starts_with("#X") => {
                    u32::from_str_radix(&num[2..], 16).ok().and_then(char::from_u32)
                }
                num if num.starts_with('#') => num[1..].parse().ok().and_then(char::from_u32),
                _ => None,
            };
            ch.map(|ch| (ch, semi))
        });

        match decoded {
            Some((ch, semi)) => {
                out.push(ch);
                rest = &rest[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Append `text` escaped for use as element content
pub fn push_text(out: &mut String, text: &str) {
    escape_html_body_text(out, text).expect("writing to a String cannot fail");
}

/// Append `value` escaped for use inside a double-quoted attribute
pub fn push_attribute(out: &mut String, value: &str) {
    escape_html(out, value).expect("writing to a String cannot fail");
}

/// `text` escaped for use as element content
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    push_text(&mut out, text);
    out
}
