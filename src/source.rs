//! Text sources for the editor

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use crate::error::{EditorError, Result};

/// Failure reported by a deferred text source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    pub message: String,
}

impl SourceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A pending text value
pub type DeferredText = Pin<Box<dyn Future<Output = std::result::Result<String, SourceError>>>>;

/// Text handed to [`Editor::apply_text`](crate::Editor::apply_text)
pub enum TextSource {
    /// Literal text, applied synchronously
    Ready(String),
    /// Text that arrives later and may fail
    Deferred(DeferredText),
}

impl TextSource {
    pub fn deferred<F>(future: F) -> Self
    where
        F: Future<Output = std::result::Result<String, SourceError>> + 'static,
    {
        TextSource::Deferred(Box::pin(future))
    }

    /// Wait for the text. A failed source yields its message and nothing else.
    pub async fn resolve(self) -> Result<String> {
        match self {
            TextSource::Ready(text) => Ok(text),
            TextSource::Deferred(pending) => pending
                .await
                .map_err(|SourceError { message }| EditorError::TextSource(message)),
        }
    }
}

impl fmt::Debug for TextSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextSource::Ready(text) => f.debug_tuple("Ready").field(text).finish(),
            TextSource::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

impl From<String> for TextSource {
    fn from(text: String) -> Self {
        TextSource::Ready(text)
    }
}

impl From<&str> for TextSource {
    fn from(text: &str) -> Self {
        TextSource::Ready(text.to_string())
    }
}

/// Passage served by [`sample_text`]
pub const SAMPLE_PASSAGE: &str = "A year ago I was in the audience at a gathering of designers in San Francisco. \
There were four designers on stage, and two of them worked for me. I was there to support them. \
The topic of design responsibility came up, possibly brought up by one of my designers, \
I honestly don\u{2019}t remember the details. What I do remember is that at some point in the \
discussion I raised my hand and suggested, to this group of designers, that modern design \
problems were very complex. And we ought to need a license to solve them.";

/// Stand-in for a document fetch: resolves to a fixed passage
pub fn sample_text() -> TextSource {
    TextSource::deferred(async { Ok(SAMPLE_PASSAGE.to_string()) })
}

#[cfg(test)]
pub(crate) fn block_on<F: Future>(future: F) -> F::Output {
    use std::task::{Context, Poll, Waker};

    let mut future = std::pin::pin!(future);
    let mut cx = Context::from_waker(Waker::noop());
    match future.as_mut().poll(&mut cx) {
        Poll::Ready(output) => output,
        Poll::Pending => panic!("test future was not immediately ready"),
    }
}
