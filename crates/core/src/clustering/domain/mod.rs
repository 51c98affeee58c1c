pub mod clustering_error;
pub mod disjoint_set;
pub mod distance_matrix;
pub mod face_clusterer;
pub mod single_linkage_clusterer;
