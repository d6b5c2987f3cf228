// Domain layer - Readings, derived series and summaries
pub mod error;
pub mod meter;
pub mod series;
pub mod summary;
