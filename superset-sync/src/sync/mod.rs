//! Export and import procedures
//!
//! Export pages through each collection and writes one file per record.
//! Import reads those files back in natural order, normalizes each record
//! for its entity type and submits it to the target instance.

pub mod export;
pub mod files;
pub mod import;
pub mod normalize;
pub mod slug;

pub use export::export_all;
pub use import::import_all;
