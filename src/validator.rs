use serde::de::DeserializeOwned;
use userhub_core::{AppError, FieldErrors};
use validator::Validate;

/// Pulls the field name out of a serde message such as
/// ``missing field `name` at line 1 column 2``.
fn quoted_field<'a>(message: &'a str, marker: &str) -> Option<&'a str> {
    message
        .split(marker)
        .nth(1)
        .and_then(|s| s.split('`').next())
        .filter(|s| !s.is_empty())
}

/// Decodes `body` as JSON into `T`, then validates it.
///
/// - A missing required field becomes a validation error naming the field
/// - Unknown fields and malformed JSON become a 400 request error
/// - Validation failures become a 400 validation error listing every field
pub fn decode_json<T>(body: &[u8]) -> Result<T, AppError>
where
    T: DeserializeOwned + Validate,
{
    let value: T = serde_json::from_slice(body).map_err(|err| {
        let message = err.to_string();

        if let Some(field) = quoted_field(&message, "missing field `") {
            return AppError::Validation(FieldErrors::single(
                field,
                format!("{} is a required field", field),
            ));
        }

        if let Some(field) = quoted_field(&message, "unknown field `") {
            return AppError::bad_request(format!("unknown field {:?}", field));
        }

        if err.is_data() {
            return AppError::bad_request(format!("invalid field type in request: {}", message));
        }

        AppError::bad_request("unable to decode request body")
    })?;

    value.validate()?;

    Ok(value)
}
