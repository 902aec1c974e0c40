use crate::corpus::{document::Corpus, topic_matrix::TopicMatrix, topic_vocabulary::TopicVocabulary};
use crate::error::ContextError;

use super::ranking::{TOP_K, TopicRanking};
use super::time_range::{ServerTimeZone, TimeRangeResolver};

use tracing::info;

/// Everything a selection reads, loaded once and never mutated afterwards
///
/// Only [`SelectionContextBuilder::build`] creates one, so every context in
/// circulation satisfies the corpus and matrix invariants.
#[derive(Debug)]
pub struct SelectionContext {
    corpus: Corpus,
    matrix: TopicMatrix,
    vocabulary: TopicVocabulary,
    resolver: TimeRangeResolver,
}

impl SelectionContext {
    pub fn builder() -> SelectionContextBuilder {
        SelectionContextBuilder::default()
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn matrix(&self) -> &TopicMatrix {
        &self.matrix
    }

    pub fn vocabulary(&self) -> &TopicVocabulary {
        &self.vocabulary
    }

    pub fn resolver(&self) -> &TimeRangeResolver {
        &self.resolver
    }

    /// Top topics of the document at `position`
    ///
    /// # Panics
    ///
    /// If `position` is not a corpus position.
    pub fn ranking(&self, position: usize) -> TopicRanking {
        TopicRanking::from_weights(self.matrix.row(position))
    }
}

#[derive(Debug, Default)]
pub struct SelectionContextBuilder {
    corpus: Option<Corpus>,
    matrix: Option<TopicMatrix>,
    vocabulary: Option<TopicVocabulary>,
    time_zone: ServerTimeZone,
}

impl SelectionContextBuilder {
    pub fn with_corpus(mut self, corpus: Corpus) -> Self {
        self.corpus = Some(corpus);
        self
    }

    pub fn with_matrix(mut self, matrix: TopicMatrix) -> Self {
        self.matrix = Some(matrix);
        self
    }

    /// Defaults to [`TopicVocabulary::default`] when not set
    pub fn with_vocabulary(mut self, vocabulary: TopicVocabulary) -> Self {
        self.vocabulary = Some(vocabulary);
        self
    }

    pub fn with_time_zone(mut self, time_zone: ServerTimeZone) -> Self {
        self.time_zone = time_zone;
        self
    }

    /// Check the invariants and freeze the context
    pub fn build(self) -> Result<SelectionContext, ContextError> {
        let corpus = self.corpus.ok_or(ContextError::Missing("corpus"))?;
        let matrix = self.matrix.ok_or(ContextError::Missing("topic matrix"))?;
        let vocabulary = self.vocabulary.unwrap_or_default();

        if corpus.is_empty() {
            return Err(ContextError::EmptyCorpus);
        }
        if vocabulary.len() < TOP_K {
            return Err(ContextError::TooFewTopics {
                topics: vocabulary.len(),
                required: TOP_K,
            });
        }
        if matrix.n_rows() != corpus.len() {
            return Err(ContextError::RowCountMismatch {
                rows: matrix.n_rows(),
                documents: corpus.len(),
            });
        }
        if matrix.n_columns() != vocabulary.len() {
            return Err(ContextError::ColumnCountMismatch {
                columns: matrix.n_columns(),
                topics: vocabulary.len(),
            });
        }
        if let Some(position) = corpus.first_unsorted_position() {
            let documents = corpus.documents();
            return Err(ContextError::UnsortedCorpus {
                position,
                previous: documents[position - 1].timestamp,
                current: documents[position].timestamp,
            });
        }
        if let Some((row, column)) = matrix.first_non_finite() {
            return Err(ContextError::NonFiniteWeight { row, column });
        }

        info!(
            documents = corpus.len(),
            topics = vocabulary.len(),
            time_zone = ?self.time_zone,
            "Selection context ready"
        );
        Ok(SelectionContext {
            corpus,
            matrix,
            vocabulary,
            resolver: TimeRangeResolver::new(self.time_zone),
        })
    }
}

/// Mock objects and functions for selection testing
pub mod test_corpus {
    use super::*;
    use crate::corpus::document::Document;
    use crate::selection::time_range::SECONDS_PER_DAY;
    use anyhow::Result;

    /// Midnight UTC on January 1st 2020
    pub const JAN_1_2020: i64 = 1_577_836_800;

    /// One document per day from January 1st 2020, published at noon UTC
    pub fn make_test_corpus(n_documents: usize) -> Corpus {
        Corpus::new(
            (0..n_documents)
                .map(|i| Document {
                    id: i,
                    title: format!("title{i}"),
                    text: format!("text{i}"),
                    timestamp: JAN_1_2020 + i as i64 * SECONDS_PER_DAY + SECONDS_PER_DAY / 2,
                })
                .collect(),
        )
    }

    /// Row `i` weighs 1.0 on column `dominant[i]` and 0.0 elsewhere, so its
    /// top three are the dominant column followed by the two lowest others
    pub fn make_test_matrix(dominant: &[usize], n_topics: usize) -> Result<TopicMatrix> {
        let weights = dominant
            .iter()
            .flat_map(|&d| (0..n_topics).map(move |j| if j == d { 1.0 } else { 0.0 }))
            .collect();
        TopicMatrix::from_row_major(n_topics, weights)
    }

    /// Daily corpus with the default vocabulary, dates read as UTC
    pub fn make_test_context(dominant: &[usize]) -> Result<SelectionContext> {
        let vocabulary = TopicVocabulary::default();
        Ok(SelectionContext::builder()
            .with_corpus(make_test_corpus(dominant.len()))
            .with_matrix(make_test_matrix(dominant, vocabulary.len())?)
            .with_vocabulary(vocabulary)
            .with_time_zone(ServerTimeZone::utc())
            .build()?)
    }
}
