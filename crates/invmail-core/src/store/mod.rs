//! Invoice persistence.
//!
//! Records are written once and listed newest first. The invoice date is
//! always persisted as text.

mod memory;
mod supabase;

pub use memory::MemoryStore;
pub use supabase::SupabaseStore;

use std::future::Future;

use crate::error::StoreError;
use crate::models::invoice::{InvoiceRecord, StoredInvoice};

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Trait for invoice stores.
pub trait InvoiceStore: Send + Sync {
    /// Insert one record and return it as stored.
    fn save(&self, record: &InvoiceRecord) -> impl Future<Output = Result<StoredInvoice>> + Send;

    /// All stored records, most recently created first.
    fn list(&self) -> impl Future<Output = Result<Vec<StoredInvoice>>> + Send;
}
