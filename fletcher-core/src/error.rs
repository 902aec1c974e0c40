use thiserror::Error;

/// Failures a single selection request can produce
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("invalid date `{0}`, expected month/day/year")]
    InvalidDateFormat(String),
    #[error("invalid topic `{value}`, expected -1 or an index below {topics}")]
    InvalidTopicIndex { value: String, topics: usize },
    #[error("no documents match the requested dates and topic")]
    NoMatchingDocuments,
}

/// Violations of the corpus and matrix invariants, detected once while the
/// selection context is built
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContextError {
    #[error("missing {0} when building the selection context")]
    Missing(&'static str),
    #[error("the corpus contains no documents")]
    EmptyCorpus,
    #[error("the vocabulary has {topics} topics but at least {required} are required")]
    TooFewTopics { topics: usize, required: usize },
    #[error("the topic matrix has {rows} rows but the corpus has {documents} documents")]
    RowCountMismatch { rows: usize, documents: usize },
    #[error("the topic matrix has {columns} columns but the vocabulary has {topics} topics")]
    ColumnCountMismatch { columns: usize, topics: usize },
    #[error(
        "the corpus is not sorted by timestamp at position {position} ({previous} is followed by {current})"
    )]
    UnsortedCorpus {
        position: usize,
        previous: i64,
        current: i64,
    },
    #[error("non-finite topic weight at row {row}, column {column}")]
    NonFiniteWeight { row: usize, column: usize },
}
