//! ovis-core: shared vocabulary for the ovis video annotation service
//!
//! Holds the types passed between the web dispatcher and the vision
//! engine: bounding boxes, detections, processing modes and outcomes,
//! plus the class-list cleaning the upload form relies on.

pub mod classes;
pub mod geometry;
pub mod types;

pub use classes::{clean_spaces, parse_class_list};
pub use geometry::BoundingBox;
pub use types::{Detection, Mode, ProcessedVideo};
