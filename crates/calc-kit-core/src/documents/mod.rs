pub mod artifact;
pub mod margins;
pub mod merge;
pub mod queue;
