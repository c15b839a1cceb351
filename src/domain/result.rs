//! Result type alias for the anonymizer
//!
//! This module provides a convenient Result type alias that uses
//! [`AnonymizerError`] as the error type.

use super::errors::AnonymizerError;

/// Result type alias for anonymizer operations
///
/// # Examples
///
/// ```
/// use data_anonymizer::domain::result::Result;
/// use data_anonymizer::domain::errors::AnonymizerError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(AnonymizerError::Configuration("no patterns".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, AnonymizerError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::AnonymizerError;

    #[test]
    fn test_result_err() {
        let result: Result<i32> = Err(AnonymizerError::Other("test error".to_string()));
        assert!(result.is_err());
    }

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
