pub mod datasets;
pub mod results;
