mod error;

pub use error::{Result, StagingError};
