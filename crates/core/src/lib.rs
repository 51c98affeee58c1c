//! Counts distinct individuals in per-image face detection sets.
//!
//! Overlapping detections of the same face are collapsed first, then the
//! survivors are grouped by descriptor distance with single-linkage
//! clustering. Each group is one person.

pub mod clustering;
pub mod detection;
pub mod input;
pub mod pipeline;
pub mod shared;

pub use clustering::domain::clustering_error::ClusteringError;
pub use clustering::domain::single_linkage_clusterer::cluster;
pub use detection::domain::overlap_deduplicator::dedupe;
pub use pipeline::count_individuals_use_case::count_individuals;
