//! Request validation helpers built on the `validator` crate.

use validator::{Validate, ValidationErrors};

use crate::error::CoreError;

/// Run `Validate` on a request body and map failures to
/// [`CoreError::Validation`] with a stable, field-sorted message.
pub fn validate_request<T: Validate>(input: &T) -> Result<(), CoreError> {
    input
        .validate()
        .map_err(|errors| CoreError::Validation(describe(&errors)))
}

/// Render validation errors as `field: message; field: message`.
fn describe(errors: &ValidationErrors) -> String {
    let mut parts: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                let message = e
                    .message
                    .as_deref()
                    .unwrap_or_else(|| e.code.as_ref());
                format!("{field}: {message}")
            })
        })
        .collect();
    parts.sort();
    parts.join("; ")
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use validator::Validate;

    use super::*;

    #[derive(Validate)]
    struct Signup {
        #[validate(length(min = 2, message = "must be at least 2 characters"))]
        name: String,
        #[validate(email(message = "must be a valid email"))]
        email: String,
    }

    #[test]
    fn valid_input_passes() {
        let input = Signup {
            name: "Ama".into(),
            email: "ama@example.com".into(),
        };
        assert!(validate_request(&input).is_ok());
    }

    #[test]
    fn errors_are_listed_by_field() {
        let input = Signup {
            name: "A".into(),
            email: "not-an-email".into(),
        };
        let err = validate_request(&input).unwrap_err();
        assert_matches!(
            err,
            CoreError::Validation(msg)
                if msg == "email: must be a valid email; name: must be at least 2 characters"
        );
    }
}
