use crate::error::AppError;

pub fn require_non_empty(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

pub fn require_positive(field: &str, value: i64) -> Result<(), AppError> {
    if value < 1 {
        return Err(AppError::Validation(format!("{field} must be >= 1")));
    }
    Ok(())
}

pub fn require_non_negative(field: &str, value: f64) -> Result<(), AppError> {
    if value < 0.0 {
        return Err(AppError::Validation(format!("{field} must be >= 0")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_non_empty() {
        assert!(require_non_empty("username", "sari").is_ok());
        assert!(require_non_empty("username", "").is_err());
        assert!(require_non_empty("username", "   ").is_err());
    }

    #[test]
    fn test_require_positive() {
        assert!(require_positive("quantity", 1).is_ok());
        assert!(require_positive("quantity", 0).is_err());
        assert!(require_positive("quantity", -3).is_err());
    }

    #[test]
    fn test_require_non_negative() {
        assert!(require_non_negative("price", 0.0).is_ok());
        assert!(require_non_negative("price", 12.5).is_ok());
        assert!(require_non_negative("price", -0.01).is_err());
    }
}
