//! RFC 5322 (`.eml`) message normalization.

use lazy_static::lazy_static;
use mailparse::body::Body;
use mailparse::{MailAddr, MailHeader, MailHeaderMap, ParsedMail};
use quoted_printable::ParseMode;
use regex::Regex;
use tracing::{debug, warn};

use super::{NormalizeFallback, NormalizedText, decode_lossy};

lazy_static! {
    // Soft line breaks or =XX escapes left in a decoded body
    static ref QP_ESCAPE: Regex = Regex::new(r"=(?:\r?\n|[0-9A-F]{2})").unwrap();
}

/// Extract the text/plain content and sender of an `.eml` message.
pub fn normalize_eml(bytes: &[u8]) -> NormalizedText {
    let mail = match mailparse::parse_mail(bytes) {
        Ok(mail) => mail,
        Err(e) => {
            warn!(fallback = "message_unreadable", "Failed to parse message, decoding as text: {}", e);
            return NormalizedText {
                body: decode_lossy(bytes),
                sender: None,
                fallback: Some(NormalizeFallback::MessageUnreadable),
            };
        }
    };

    let mut parts = Vec::new();
    if mail.subparts.is_empty() {
        parts.push(part_text(&mail));
    } else {
        collect_plain_parts(&mail, &mut parts);
    }
    debug!("Collected {} text part(s) from message", parts.len());

    let body = parts.join("\n");
    let sender = mail.headers.get_first_header("From").and_then(sender_address);

    NormalizedText {
        body,
        sender,
        fallback: None,
    }
}

fn collect_plain_parts(part: &ParsedMail<'_>, out: &mut Vec<String>) {
    if part.subparts.is_empty() {
        if part.ctype.mimetype.eq_ignore_ascii_case("text/plain") {
            let text = part_text(part);
            if !text.is_empty() {
                out.push(text);
            }
        }
        return;
    }

    for sub in &part.subparts {
        collect_plain_parts(sub, out);
    }
}

fn part_text(part: &ParsedMail<'_>) -> String {
    let text = match part.get_body() {
        Ok(body) => body,
        Err(e) => {
            debug!("Charset decoding failed, using raw body: {}", e);
            part.get_body_raw()
                .map(|raw| decode_lossy(&raw))
                .unwrap_or_default()
        }
    };

    if transfer_decoded(part) {
        text
    } else {
        decode_leftover_quoted_printable(text)
    }
}

/// Whether the part declared an encoding that `get_body` already undid.
fn transfer_decoded(part: &ParsedMail<'_>) -> bool {
    matches!(
        part.get_body_encoded(),
        Body::Base64(_) | Body::QuotedPrintable(_)
    )
}

/// Undo quoted-printable escapes in a part sent without a declared encoding.
///
/// Only pure ASCII text is touched; non-ASCII text is already decoded and
/// the escapes it seems to hold are literal.
fn decode_leftover_quoted_printable(body: String) -> String {
    if !body.is_ascii() || !QP_ESCAPE.is_match(&body) {
        return body;
    }

    match quoted_printable::decode(body.as_bytes(), ParseMode::Robust) {
        Ok(decoded) => decode_lossy(&decoded),
        Err(e) => {
            debug!("Quoted-printable decoding failed, keeping body: {}", e);
            body
        }
    }
}

/// Bare address from a `From` header, or the header text if it has none.
fn sender_address(header: &MailHeader<'_>) -> Option<String> {
    let parsed = mailparse::addrparse_header(header).ok().and_then(|list| {
        list.iter()
            .find_map(|addr| match addr {
                MailAddr::Single(info) => Some(info.addr.trim().to_string()),
                MailAddr::Group(group) => group.addrs.first().map(|info| info.addr.trim().to_string()),
            })
            .filter(|addr| addr.contains('@'))
    });

    parsed.or_else(|| {
        let raw = header.get_value().trim().to_string();
        (!raw.is_empty()).then_some(raw)
    })
}
