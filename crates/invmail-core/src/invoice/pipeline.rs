//! Document-to-record pipeline.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use crate::document::{normalize, RawDocument};
use crate::error::StoreError;
use crate::models::invoice::{InvoiceRecord, StoredInvoice};
use crate::store::InvoiceStore;

use super::merger::{Clock, FieldDefaults, FieldMerger, SystemClock};
use super::remote::RemoteExtractor;

/// Turns raw documents into complete invoice records.
pub struct InvoicePipeline<E> {
    extractor: E,
    merger: FieldMerger,
    clock: Arc<dyn Clock>,
}

impl<E: RemoteExtractor> InvoicePipeline<E> {
    /// Pipeline with default field values and the system clock.
    pub fn new(extractor: E) -> Self {
        Self {
            extractor,
            merger: FieldMerger::default(),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_defaults(mut self, defaults: FieldDefaults) -> Self {
        self.merger = FieldMerger::new(defaults);
        self
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn extractor(&self) -> &E {
        &self.extractor
    }

    /// Extract a record from one document.
    ///
    /// Every field of the result is populated; failures along the way are
    /// logged and recovered.
    pub async fn process(&self, document: &RawDocument) -> InvoiceRecord {
        let start = Instant::now();

        let text = normalize(document);
        debug!(
            "Normalized {} document to {} chars",
            document.kind,
            text.body.len()
        );

        let outcome = self.extractor.extract(&text.body).await;
        let record = self.merger.merge(
            outcome,
            &text.body,
            text.sender.as_deref(),
            self.clock.today(),
        );

        info!(
            "Extracted invoice from {} ({} {}) in {:?}",
            record.vendor,
            record.total,
            record.currency,
            start.elapsed()
        );
        record
    }

    /// Extract a record and insert it into `store`.
    pub async fn process_and_save<S: InvoiceStore>(
        &self,
        document: &RawDocument,
        store: &S,
    ) -> Result<StoredInvoice, StoreError> {
        let record = self.process(document).await;
        store.save(&record).await
    }
}
