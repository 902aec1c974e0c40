pub mod candidate_selector;
pub mod ranking;
pub mod selection_context;
pub mod time_range;
