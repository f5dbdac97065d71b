//! Vendor-datum coordinate correction.
//!
//! Converts GCJ-02 coordinates, as published by Chinese map providers, to
//! WGS84 so transit stops can be combined with other layers. All functions
//! are pure; batch conversion isolates malformed rows instead of failing.

pub mod batch;
pub mod gcj02;
pub mod types;

pub use batch::{convert_batch, convert_batch_concurrent};
pub use gcj02::{convert, convert_point, validate, validate_all};
pub use types::{BatchOutcome, CoordinateBatchRow, GeoPoint, PointRecord, SourceDatum};
