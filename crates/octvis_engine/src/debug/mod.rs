//! Debug module for visualization and introspection tools
//!
//! Pure observers of the simulation: nothing in here feeds back into the
//! physics tick.

pub mod report;
pub mod collision_debug;
pub mod octree_debug;

pub use report::{LogReportSink, ReportHistory, ReportSink, TickReport};
pub use collision_debug::{CollisionDebugColors, CollisionDebugRecorder, Highlight, TrackedContact};
pub use octree_debug::{collect_octant_boxes, OctantBox};
