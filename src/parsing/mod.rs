pub mod analyzer;

pub use analyzer::{Analyzer, Report};
