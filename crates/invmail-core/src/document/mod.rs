//! Document normalization: raw email-like bytes to plain text.

mod email;
mod outlook;

pub use email::normalize_eml;
pub use outlook::normalize_msg;

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Supported input encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Plain text file (`.txt`).
    Text,
    /// RFC 5322 message (`.eml`).
    Eml,
    /// Outlook message container (`.msg`).
    Msg,
}

impl DocumentKind {
    /// Map a file extension tag to a kind. Unknown tags yield `None`.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
            "txt" => Some(DocumentKind::Text),
            "eml" => Some(DocumentKind::Eml),
            "msg" => Some(DocumentKind::Msg),
            _ => None,
        }
    }

    /// Kind of the file at `path`, judged by its extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    pub fn extension(&self) -> &'static str {
        match self {
            DocumentKind::Text => "txt",
            DocumentKind::Eml => "eml",
            DocumentKind::Msg => "msg",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// An undecoded input document.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub kind: DocumentKind,
    pub bytes: Vec<u8>,
    /// Sender known from outside the document (e.g. the mailbox it came from).
    pub known_sender: Option<String>,
}

impl RawDocument {
    pub fn new(kind: DocumentKind, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            kind,
            bytes: bytes.into(),
            known_sender: None,
        }
    }

    pub fn text(text: &str) -> Self {
        Self::new(DocumentKind::Text, text.as_bytes())
    }

    pub fn with_known_sender(mut self, sender: impl Into<String>) -> Self {
        self.known_sender = Some(sender.into());
        self
    }
}

/// Recovered decoding problems. These never fail normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizeFallback {
    /// The `.msg` container could not be read; bytes were decoded as text.
    ContainerUnreadable,
    /// The `.eml` message could not be parsed; bytes were decoded as text.
    MessageUnreadable,
}

/// Plain text extracted from a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedText {
    pub body: String,
    /// Sender found in the document metadata.
    pub sender: Option<String>,
    /// Set when a fallback decoding path was taken.
    pub fallback: Option<NormalizeFallback>,
}

impl NormalizedText {
    pub fn plain(body: String) -> Self {
        Self {
            body,
            sender: None,
            fallback: None,
        }
    }
}

/// Extract a plain-text body and sender from a document.
///
/// Never fails: unreadable containers degrade to lossy text and an empty
/// input yields an empty body.
pub fn normalize(document: &RawDocument) -> NormalizedText {
    let mut normalized = match document.kind {
        DocumentKind::Text => NormalizedText::plain(decode_lossy(&document.bytes)),
        DocumentKind::Eml => normalize_eml(&document.bytes),
        DocumentKind::Msg => normalize_msg(&document.bytes),
    };

    if normalized.sender.is_none() {
        normalized.sender = document
            .known_sender
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
    }

    normalized
}

/// Decode UTF-8, dropping invalid byte sequences.
pub fn decode_lossy(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        out.push_str(chunk.valid());
    }
    out
}
