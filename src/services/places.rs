use std::sync::Arc;

use futures::future::BoxFuture;
use uuid::Uuid;

use crate::error::{PlacesError, Result};
use crate::geocoding::Geocoder;
use crate::models::{Location, NewPlace, Place, PlaceUpdate};
use crate::services::validation::{validate_new_place, validate_place_update};
use crate::store::{DocumentStore, Session};

fn place_not_found() -> PlacesError {
    PlacesError::NotFound("Could not find place for the provided id.".to_string())
}

/// Owns every mutation of a place together with its owner's `places` list.
pub struct PlaceService {
    store: Arc<dyn DocumentStore>,
    geocoder: Arc<dyn Geocoder>,
    max_transaction_retries: u32,
}

impl PlaceService {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        geocoder: Arc<dyn Geocoder>,
        max_transaction_retries: u32,
    ) -> Self {
        Self {
            store,
            geocoder,
            max_transaction_retries,
        }
    }

    pub async fn get_place(&self, id: &str) -> Result<Place> {
        self.store
            .find_place(id)
            .await?
            .ok_or_else(place_not_found)
    }

    /// All places created by a user. An empty result is reported as not found.
    pub async fn places_for_user(&self, user_id: &str) -> Result<Vec<Place>> {
        let places = self.store.find_places_by_creator(user_id).await?;
        if places.is_empty() {
            return Err(PlacesError::NotFound(
                "Could not find places for the provided user id.".to_string(),
            ));
        }
        Ok(places)
    }

    /// Validate, resolve the address, then create the place.
    ///
    /// Geocoding runs before any session is opened, so a geocoder failure
    /// never touches the store.
    pub async fn create_place(&self, new_place: NewPlace) -> Result<Place> {
        validate_new_place(&new_place)?;

        let location = self.geocoder.resolve(new_place.address.trim()).await?;
        self.create_place_at(new_place, location).await
    }

    /// Insert a place at a known location and append it to its creator's
    /// `places`, both in one transaction.
    pub async fn create_place_at(&self, new_place: NewPlace, location: Location) -> Result<Place> {
        validate_new_place(&new_place)?;

        let place = new_place.into_place(Uuid::new_v4().to_string(), location);
        tracing::info!(place_id = %place.id, user_id = %place.creator, "Creating place");

        let created = self
            .with_transaction("create_place", move |session| {
                let place = place.clone();
                Box::pin(async move {
                    let mut creator = session.find_user(&place.creator).await?.ok_or_else(|| {
                        PlacesError::NotFound(
                            "Could not find user for the provided id.".to_string(),
                        )
                    })?;

                    session.save_place(&place).await?;
                    creator.places.push(place.id.clone());
                    session.save_user(&creator).await?;

                    Ok(place)
                })
            })
            .await?;

        tracing::info!(place_id = %created.id, "Place created");
        Ok(created)
    }

    /// Edit title and description. Address, location and creator stay as they are.
    ///
    /// The store only replaces an existing place, so an update racing a
    /// delete either lands first or reports not found.
    pub async fn update_place(&self, id: &str, update: PlaceUpdate) -> Result<Place> {
        validate_place_update(&update)?;

        let place = self
            .store
            .update_place_details(id, update.title.trim(), update.description.trim())
            .await?
            .ok_or_else(place_not_found)?;
        tracing::info!(place_id = %id, "Place updated");

        Ok(place)
    }

    /// Remove a place and drop it from its creator's `places`, both in one
    /// transaction.
    pub async fn delete_place(&self, id: &str) -> Result<()> {
        let place_id = id.to_string();
        tracing::info!(place_id = %place_id, "Deleting place");

        self.with_transaction("delete_place", move |session| {
            let place_id = place_id.clone();
            Box::pin(async move {
                let place = session
                    .find_place(&place_id)
                    .await?
                    .ok_or_else(place_not_found)?;

                let mut creator = session.find_user(&place.creator).await?.ok_or_else(|| {
                    PlacesError::NotFound(
                        "Could not find the creator of this place.".to_string(),
                    )
                })?;

                session.remove_place(&place.id).await?;
                creator.places.retain(|p| *p != place.id);
                session.save_user(&creator).await?;

                Ok(())
            })
        })
        .await?;

        tracing::info!(place_id = %id, "Place deleted");
        Ok(())
    }

    /// Run `work` inside a fresh session and commit it.
    ///
    /// Every failure path aborts the session before the error is returned.
    /// Transient write conflicts re-run `work` in a new session, up to
    /// `max_transaction_retries` extra attempts.
    async fn with_transaction<T, F>(&self, operation: &'static str, work: F) -> Result<T>
    where
        T: Send,
        F: for<'s> Fn(&'s mut dyn Session) -> BoxFuture<'s, Result<T>> + Send + Sync,
    {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            let mut session = self.store.start_session().await?;

            let outcome = match work(session.as_mut()).await {
                Ok(value) => session
                    .commit()
                    .await
                    .map(|()| value)
                    .map_err(PlacesError::from),
                Err(err) => Err(err),
            };

            let err = match outcome {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if let Err(abort_err) = session.abort().await {
                tracing::warn!(operation, error = %abort_err, "Failed to abort transaction");
            }

            match &err {
                PlacesError::Storage(store_err)
                    if store_err.is_transient() && attempt <= self.max_transaction_retries =>
                {
                    tracing::warn!(operation, attempt, error = %store_err, "Retrying conflicted transaction");
                }
                _ => {
                    tracing::debug!(operation, attempt, error = %err, "Transaction aborted");
                    return Err(err);
                }
            }
        }
    }
}
