//! Validation Utilities

use validator::ValidationErrors;

use super::error::{AppError, FieldError};

/// Convert validation errors to AppError
pub fn validation_error(errors: ValidationErrors) -> AppError {
    let field_errors: Vec<FieldError> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| FieldError {
                field: field.to_string(),
                message: e.message.clone().map(|m| m.to_string()).unwrap_or_default(),
            })
        })
        .collect();

    let message = field_errors
        .first()
        .map(|e| format!("{}: {}", e.field, e.message))
        .unwrap_or_else(|| "Validation failed".into());

    AppError::Validation(message)
}

/// Parse a snowflake id taken from a route segment or request body.
pub fn parse_id(raw: &str, what: &str) -> Result<i64, AppError> {
    raw.parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid {} ID", what)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Named {
        #[validate(length(min = 1, message = "Name is required"))]
        name: String,
    }

    #[test]
    fn test_validation_error_message() {
        let err = Named { name: String::new() }.validate().unwrap_err();
        match validation_error(err) {
            AppError::Validation(msg) => assert_eq!(msg, "name: Name is required"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42", "poem").unwrap(), 42);
        assert!(matches!(parse_id("abc", "poem"), Err(AppError::BadRequest(_))));
    }
}
