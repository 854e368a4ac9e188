//! Core library for extracting invoice data from emails.
//!
//! This crate provides:
//! - Text normalization for plain text, RFC 5322 (`.eml`) and Outlook (`.msg`) messages
//! - Structured-output extraction through a hosted model
//! - Regex fallback for vendor, total, currency, date and sender
//! - Field merging with defaults, and invoice storage

pub mod document;
pub mod error;
pub mod invoice;
pub mod models;
pub mod store;

pub use document::{normalize, DocumentKind, NormalizedText, RawDocument};
pub use error::{ConfigError, RemoteFailure, StoreError};
pub use invoice::{
    ConfiguredExtractor, FieldDefaults, InvoicePipeline, RemoteExtractor, StaticExtractor,
    UnavailableExtractor,
};
pub use models::config::InvmailConfig;
pub use models::invoice::{InvoiceDate, InvoiceRecord, PartialInvoice, StoredInvoice};
pub use store::{InvoiceStore, MemoryStore, SupabaseStore};

/// Re-export inference types.
pub use invmail_inference::{InferenceError, StructuredBackend};
