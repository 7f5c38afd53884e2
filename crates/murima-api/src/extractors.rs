//! Request body extraction with validation.
//!
//! Handlers take `Result<Json<T>, JsonRejection>` and call
//! [`extract_validated_json`] so JSON parse failures and business-rule
//! violations both surface as structured 422 responses instead of axum's
//! default plain-text rejection.

use axum::extract::rejection::JsonRejection;
use axum::Json;

use crate::error::AppError;

/// Request types that carry their own field-level validation.
///
/// The error string names the first failing field; it becomes the 422
/// response message verbatim.
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

/// Unwrap a JSON body and run its validation.
pub fn extract_validated_json<T: Validate>(
    body: Result<Json<T>, JsonRejection>,
) -> Result<T, AppError> {
    let Json(value) = body.map_err(|e| AppError::BadRequest(format!("invalid JSON body: {e}")))?;
    value.validate().map_err(AppError::Validation)?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Probe {
        name: String,
    }

    impl Validate for Probe {
        fn validate(&self) -> Result<(), String> {
            if self.name.is_empty() {
                return Err("name must be non-empty".to_string());
            }
            Ok(())
        }
    }

    #[test]
    fn valid_body_passes() {
        let probe = extract_validated_json(Ok(Json(Probe {
            name: "ok".to_string(),
        })))
        .unwrap();
        assert_eq!(probe.name, "ok");
    }

    #[test]
    fn failing_validation_becomes_validation_error() {
        let err = extract_validated_json(Ok(Json(Probe {
            name: String::new(),
        })))
        .unwrap_err();
        match err {
            AppError::Validation(msg) => assert!(msg.contains("name")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
