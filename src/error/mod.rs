pub mod error;

pub use error::{CompilationError, CompilationErrorKind, Found};
