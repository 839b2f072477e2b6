//! Result type alias for Bookferry operations

use crate::Error;

/// Result type alias for Bookferry operations
pub type Result<T> = std::result::Result<T, Error>;
