// Matching engine: corpus lifecycle, coverage scoring, ranking.

pub mod corpus;
pub mod handlers;
pub mod scorer;
