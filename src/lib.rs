//! jdkmatrix - JDK compatibility matrix for a corpus of Java projects
//!
//! Builds every project of a dataset with each JDK version of a range, in
//! throwaway containers, and classifies the failures from the captured logs.

pub mod cache;
pub mod classify;
pub mod cli;
pub mod config;
pub mod error;
pub mod executor;
pub mod join;
pub mod ledger;
pub mod orchestration;
pub mod project;
pub mod supervisor;
pub mod tabular;
pub mod ui;

pub use error::{MatrixError, MatrixResult};
