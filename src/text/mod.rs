//! Query text processing
//!
//! This module turns raw user queries into the token sequences the
//! knowledgebase ranker scores against.

pub mod normalize;

pub use normalize::Normalizer;
