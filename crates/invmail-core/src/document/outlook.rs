//! Outlook (`.msg`) container normalization.
//!
//! A `.msg` file is an OLE2 compound file. Each MAPI property lives in a
//! stream named `__substg1.0_<tag><type>`, where type `001F` is UTF-16LE and
//! `001E` is 8-bit text.

use std::io::{self, Cursor, Read, Seek};

use cfb::CompoundFile;
use tracing::{debug, warn};

use super::{NormalizeFallback, NormalizedText, decode_lossy};

/// PR_BODY
const BODY_TAG: &str = "1000";

/// Sender address properties, most specific first:
/// PR_SENDER_SMTP_ADDRESS, PR_SENDER_EMAIL_ADDRESS,
/// PR_SENT_REPRESENTING_SMTP_ADDRESS, PR_SENT_REPRESENTING_EMAIL_ADDRESS.
const SENDER_TAGS: &[&str] = &["5D01", "0C1F", "5D02", "0065"];

/// Extract body and sender from an Outlook message.
///
/// Bytes that are not a compound file are decoded as plain text.
pub fn normalize_msg(bytes: &[u8]) -> NormalizedText {
    match read_message(bytes) {
        Ok(normalized) => normalized,
        Err(e) => {
            warn!(fallback = "container_unreadable", "Not a readable .msg container, decoding as text: {}", e);
            NormalizedText {
                body: decode_lossy(bytes),
                sender: None,
                fallback: Some(NormalizeFallback::ContainerUnreadable),
            }
        }
    }
}

fn read_message(bytes: &[u8]) -> io::Result<NormalizedText> {
    let mut file = CompoundFile::open(Cursor::new(bytes))?;

    let body = read_property(&mut file, BODY_TAG).unwrap_or_default();
    let sender = SENDER_TAGS
        .iter()
        .filter_map(|tag| read_property(&mut file, tag))
        .find(|value| value.contains('@'));

    debug!("Read .msg body of {} bytes, sender found: {}", body.len(), sender.is_some());

    Ok(NormalizedText {
        body,
        sender,
        fallback: None,
    })
}

fn read_property<F: Read + Seek>(file: &mut CompoundFile<F>, tag: &str) -> Option<String> {
    if let Some(raw) = read_stream(file, &format!("/__substg1.0_{}001F", tag)) {
        return Some(decode_utf16le(&raw));
    }
    read_stream(file, &format!("/__substg1.0_{}001E", tag))
        .map(|raw| decode_lossy(&raw).trim_end_matches('\0').to_string())
}

fn read_stream<F: Read + Seek>(file: &mut CompoundFile<F>, path: &str) -> Option<Vec<u8>> {
    if !file.is_stream(path) {
        return None;
    }
    let mut stream = file.open_stream(path).ok()?;
    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).ok()?;
    Some(buf)
}

fn decode_utf16le(raw: &[u8]) -> String {
    let units = raw
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]));

    char::decode_utf16(units)
        .filter_map(|c| c.ok())
        .collect::<String>()
        .trim_end_matches('\0')
        .to_string()
}
