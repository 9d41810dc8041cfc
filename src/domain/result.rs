//! Result type alias for pufgen

use super::errors::PufError;

/// Result type alias for pufgen operations
///
/// # Examples
///
/// ```
/// use pufgen::domain::result::Result;
/// use pufgen::domain::errors::PufError;
///
/// fn failing_function() -> Result<()> {
///     Err(PufError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, PufError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_with_question_mark() -> Result<()> {
        fn inner() -> Result<i32> {
            Ok(42)
        }

        let value = inner()?;
        assert_eq!(value, 42);
        Ok(())
    }
}
