use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::{models::HouseModel, repository::HouseRepository, types::HouseRequest};
use crate::shared::{with_deadline, AppError};

/// Service for handling house business logic
pub struct HouseService {
    repository: Arc<dyn HouseRepository + Send + Sync>,
    store_timeout: Duration,
}

impl HouseService {
    pub fn new(repository: Arc<dyn HouseRepository + Send + Sync>, store_timeout: Duration) -> Self {
        Self {
            repository,
            store_timeout,
        }
    }

    /// Finds houses whose name contains the pattern, ignoring case
    #[instrument(skip(self))]
    pub async fn search_houses(&self, pattern: Option<&str>) -> Result<Vec<HouseModel>, AppError> {
        let pattern = pattern.map(str::trim).unwrap_or_default();
        if pattern.is_empty() {
            return Err(AppError::Validation(
                "houseName must have a value to search".to_string(),
            ));
        }

        let houses = with_deadline(
            self.store_timeout,
            "search_houses",
            self.repository.search_houses(pattern),
        )
        .await?;

        info!(match_count = houses.len(), "Houses searched");
        Ok(houses)
    }

    /// Stores a new house and returns its generated id
    #[instrument(skip(self, request))]
    pub async fn create_house(&self, request: HouseRequest) -> Result<String, AppError> {
        let house = HouseModel::new(request.name, request.access_code, request.notes);
        debug!(house_id = %house.id, "Generated house ID");

        with_deadline(
            self.store_timeout,
            "create_house",
            self.repository.create_house(&house),
        )
        .await?;

        info!(house_id = %house.id, "House created successfully");
        Ok(house.id)
    }

    #[instrument(skip(self))]
    pub async fn get_house(&self, house_id: &str) -> Result<HouseModel, AppError> {
        let house_id = parse_house_id(house_id)?;

        with_deadline(
            self.store_timeout,
            "get_house",
            self.repository.get_house(&house_id),
        )
        .await?
        .ok_or_else(|| AppError::NotFound("house not found".to_string()))
    }

    /// Replaces name, access code and notes of an existing house
    #[instrument(skip(self, request))]
    pub async fn update_house(&self, house_id: &str, request: HouseRequest) -> Result<(), AppError> {
        let house = HouseModel {
            id: parse_house_id(house_id)?,
            name: request.name,
            access_code: request.access_code,
            notes: request.notes,
        };

        with_deadline(
            self.store_timeout,
            "update_house",
            self.repository.update_house(&house),
        )
        .await?;

        info!(house_id = %house.id, "House updated successfully");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn delete_house(&self, house_id: &str) -> Result<(), AppError> {
        let house_id = parse_house_id(house_id)?;

        with_deadline(
            self.store_timeout,
            "delete_house",
            self.repository.delete_house(&house_id),
        )
        .await?;

        info!(house_id = %house_id, "House deleted successfully");
        Ok(())
    }
}

/// Normalizes a client-supplied id; anything that is not a UUID is a client error
fn parse_house_id(raw: &str) -> Result<String, AppError> {
    Uuid::parse_str(raw.trim())
        .map(|id| id.to_string())
        .map_err(|_| AppError::Validation("invalid house ID".to_string()))
}
