//! Recommendation assembly: thresholding, relationship filtering,
//! explanations, and pagination.

pub mod assembler;
pub mod explain;
pub mod result_cache;
