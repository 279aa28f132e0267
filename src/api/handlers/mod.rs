pub mod health;
pub mod places;
pub mod users;
