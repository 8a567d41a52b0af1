pub mod assertions;
pub mod cli;
pub mod data;
pub mod error;
pub mod manifests;
pub mod query;
pub mod results;
pub mod runner;
pub mod scenarios;
pub mod storage;
