//! Input decoding and the zipped exchange format.
//!
//! This module handles:
//! - The column-oriented zipped object array codec
//! - Decoding the meta document into descriptors and dimension tables
//! - Decoding the data document into raw events
//! - Optimizing raw feed rows into events

pub mod events;
pub mod feed;
pub mod meta;
pub mod zipped;

// Re-export main types
pub use events::{decode_events, parse_data, DecodedData, RawData, StartDate};
pub use feed::{optimize_feed, zip_events, FeedRow, OptimizedFeed};
pub use meta::{decode_meta, parse_meta, DecodedMeta, RawMeta};
pub use zipped::{Row, ZippedObjectArray};
