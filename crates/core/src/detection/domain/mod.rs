pub mod detection_order;
pub mod overlap_deduplicator;
