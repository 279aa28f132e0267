use crate::error::{PlacesError, Result};
use crate::models::{NewPlace, PlaceUpdate, SignupRequest};
use crate::validation::validate_id;

const MIN_DESCRIPTION_LEN: usize = 5;
const MIN_PASSWORD_LEN: usize = 6;

fn invalid(field: &str, reason: &str) -> PlacesError {
    PlacesError::Validation(format!("{}: {}", field, reason))
}

fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(field, "must not be empty"));
    }
    Ok(())
}

fn require_min_len(field: &str, value: &str, min: usize) -> Result<()> {
    if value.trim().chars().count() < min {
        return Err(invalid(
            field,
            &format!("must be at least {} characters long", min),
        ));
    }
    Ok(())
}

/// Validates a place creation request. Reports the first failing field.
pub fn validate_new_place(place: &NewPlace) -> Result<()> {
    require_non_empty("title", &place.title)?;
    require_min_len("description", &place.description, MIN_DESCRIPTION_LEN)?;
    require_non_empty("address", &place.address)?;
    validate_id("creator", &place.creator)?;
    Ok(())
}

pub fn validate_place_update(update: &PlaceUpdate) -> Result<()> {
    require_non_empty("title", &update.title)?;
    require_min_len("description", &update.description, MIN_DESCRIPTION_LEN)?;
    Ok(())
}

/// Validates a signup request; `email` is expected to be normalized already
pub fn validate_signup(request: &SignupRequest) -> Result<()> {
    require_non_empty("name", &request.name)?;
    if !is_plausible_email(&request.email) {
        return Err(invalid("email", "must be a valid email address"));
    }
    if request.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(invalid(
            "password",
            &format!("must be at least {} characters long", MIN_PASSWORD_LEN),
        ));
    }
    Ok(())
}

fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain
            .split('.')
            .filter(|label| !label.is_empty())
            .count()
            >= 2
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}
