//! Peermatch: people-to-people recommendation engine.
//!
//! Encodes heterogeneous, partially-missing profile attributes into a fixed
//! 142-slot binary vector, ranks all other users by Jaccard similarity over
//! the meaningful slots, and keeps repeated queries cheap with a pairwise
//! similarity cache invalidated by per-segment change fingerprints.

pub mod cli;
pub mod config;
pub mod error;
pub mod profile;
pub mod recommend;
pub mod schema;
pub mod similarity;
pub mod storage;
pub mod vector;
