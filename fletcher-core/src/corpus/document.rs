use serde::{Deserialize, Serialize};
use std::ops::Range;

/// A single corpus entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Row of the document in its source file
    pub id: usize,
    pub title: String,
    pub text: String,
    /// Publication time in epoch seconds
    pub timestamp: i64,
}

/// Documents eligible for selection
///
/// Positions in the corpus line up with the rows of the topic matrix. The
/// corpus is expected to be sorted by timestamp; [`Corpus::span`] relies on it
/// and the selection context refuses corpora that are not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    documents: Vec<Document>,
}

impl Corpus {
    pub fn new(documents: Vec<Document>) -> Self {
        Self { documents }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&Document> {
        self.documents.get(position)
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    /// First position whose timestamp is smaller than the one before it
    pub fn first_unsorted_position(&self) -> Option<usize> {
        self.documents
            .windows(2)
            .position(|pair| pair[1].timestamp < pair[0].timestamp)
            .map(|position| position + 1)
    }

    /// Positions of the documents with `start <= timestamp < end`
    ///
    /// Two boundary searches over the sorted timestamps. An inverted interval
    /// yields an empty range.
    pub fn span(&self, start: i64, end: i64) -> Range<usize> {
        let lo = self.documents.partition_point(|d| d.timestamp < start);
        let hi = self.documents.partition_point(|d| d.timestamp < end);
        lo..hi.max(lo)
    }
}
