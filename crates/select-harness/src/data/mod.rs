pub mod datasets;
pub mod encoding;
pub mod fixtures;
pub mod generator;
