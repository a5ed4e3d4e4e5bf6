//! Result type alias for es-sample

use super::errors::SampleError;

/// Result type alias for es-sample operations
///
/// # Examples
///
/// ```
/// use es_sample::domain::result::Result;
/// use es_sample::domain::errors::SampleError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(SampleError::Output("closed".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, SampleError>;
