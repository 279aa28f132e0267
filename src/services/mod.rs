pub mod places;
pub mod users;
pub mod validation;

pub use places::PlaceService;
pub use users::UserService;
pub use validation::{validate_new_place, validate_place_update, validate_signup};
