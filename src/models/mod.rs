pub mod place;
pub mod user;

pub use place::{Location, NewPlace, Place, PlaceUpdate};
pub use user::{normalize_email, LoginRequest, SignupRequest, User};
