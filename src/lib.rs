//! Build-time generator of interface implementations whose accessors return
//! precomputed sets of the program's types, selected by annotation and
//! inheritance criteria.
pub mod model;
pub mod criteria;
pub mod program;
pub mod manifest;
pub mod reach;
pub mod predicate;
pub mod scan;
pub mod synth;
pub mod lower;
pub mod ir;
pub mod codegen;
pub mod report;
pub mod error;
pub mod cli;

pub use error::{Result, SilverError};
