pub mod error;
pub mod result;
pub mod source;
pub mod telemetry;
mod util;

pub use error::{Error, Result};
pub use result::ImportResult;
pub use source::{SourceSelector, SourceType};
pub use telemetry::*;
pub use util::*;
