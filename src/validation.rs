use crate::error::{PlacesError, Result};

const MAX_ID_LEN: usize = 64;

/// Validates a document identifier taken from a request path or body.
///
/// Identifiers are 1 to 64 ASCII alphanumeric characters or hyphens. This
/// covers the UUIDs assigned at creation as well as short seeded ids like `u1`.
pub fn validate_id(field: &str, id: &str) -> Result<()> {
    if id.is_empty() || id.len() > MAX_ID_LEN {
        return Err(PlacesError::Validation(format!(
            "{}: must be between 1 and {} characters, got {}",
            field,
            MAX_ID_LEN,
            id.len()
        )));
    }

    if let Some(ch) = id.chars().find(|ch| !ch.is_ascii_alphanumeric() && *ch != '-') {
        return Err(PlacesError::Validation(format!(
            "{}: invalid character '{}'",
            field, ch
        )));
    }

    Ok(())
}
