use serde::{Deserialize, Serialize};

/// Geographic coordinates resolved from a place's address
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub id: String,
    pub title: String,
    pub description: String,
    pub location: Location,
    pub address: String,
    pub image: Option<String>,
    /// Id of the owning user
    pub creator: String,
}

/// Request body for creating a place
#[derive(Debug, Clone, Deserialize)]
pub struct NewPlace {
    pub title: String,
    pub description: String,
    pub address: String,
    #[serde(default)]
    pub image: Option<String>,
    pub creator: String,
}

impl NewPlace {
    /// Materialize the place document under a fresh id
    pub fn into_place(self, id: String, location: Location) -> Place {
        Place {
            id,
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            location,
            address: self.address.trim().to_string(),
            image: self.image,
            creator: self.creator,
        }
    }
}

/// Request body for editing a place. Only title and description are mutable.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceUpdate {
    pub title: String,
    pub description: String,
}
