pub mod analysis;
pub mod schedule;
