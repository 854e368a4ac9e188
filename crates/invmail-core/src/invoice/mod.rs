//! Invoice field extraction.
//!
//! A remote model is asked first; text rules fill whatever it leaves out
//! and take over entirely when it fails.

pub mod merger;
pub mod pipeline;
pub mod remote;
pub mod rules;

pub use merger::{Clock, FieldDefaults, FieldMerger, FixedClock, SystemClock};
pub use pipeline::InvoicePipeline;
pub use remote::{
    invoice_schema, ConfiguredExtractor, LlmRemoteExtractor, RemoteExtractor, StaticExtractor,
    UnavailableExtractor,
};
pub use rules::HeuristicMatcher;
