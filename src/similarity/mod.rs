//! Similarity computation, pairwise caching, and KNN search.

pub mod cache;
pub mod jaccard;
pub mod knn;
