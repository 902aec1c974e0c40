pub mod corpus_loader;
pub mod document;
pub mod topic_matrix;
pub mod topic_vocabulary;
