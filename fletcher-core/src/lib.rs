//! Selection of a representative document for a date range and an optional
//! dominant topic, over a corpus with precomputed document-topic weights.

pub mod corpus;
pub mod error;
pub mod selection;
