pub mod job;
pub mod terms;
