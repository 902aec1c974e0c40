pub mod json_error;
pub mod select_document;
pub mod topic_list;
