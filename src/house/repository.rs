use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Row};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::models::HouseModel;
use crate::shared::AppError;

/// Trait for house repository operations
#[async_trait]
pub trait HouseRepository {
    async fn create_house(&self, house: &HouseModel) -> Result<(), AppError>;
    async fn get_house(&self, house_id: &str) -> Result<Option<HouseModel>, AppError>;

    /// Case-insensitive substring search on the house name
    async fn search_houses(&self, pattern: &str) -> Result<Vec<HouseModel>, AppError>;

    /// Replaces name, access code and notes; `NotFound` only when the id does not exist
    async fn update_house(&self, house: &HouseModel) -> Result<(), AppError>;
    async fn delete_house(&self, house_id: &str) -> Result<(), AppError>;
}

/// In-memory implementation of HouseRepository for development and testing
pub struct InMemoryHouseRepository {
    houses: Mutex<HashMap<String, HouseModel>>,
}

impl Default for InMemoryHouseRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryHouseRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self {
            houses: Mutex::new(HashMap::new()),
        }
    }

    /// Creates an in-memory repository with pre-populated houses
    pub fn with_houses(houses: Vec<HouseModel>) -> Self {
        let house_map = houses
            .into_iter()
            .map(|house| (house.id.clone(), house))
            .collect();

        Self {
            houses: Mutex::new(house_map),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, HouseModel>>, AppError> {
        self.houses.lock().map_err(|_| {
            warn!("House store lock poisoned");
            AppError::DatabaseError("house store unavailable".to_string())
        })
    }

    /// Returns the current number of houses in the repository
    pub fn house_count(&self) -> usize {
        self.lock().map(|houses| houses.len()).unwrap_or(0)
    }
}

#[async_trait]
impl HouseRepository for InMemoryHouseRepository {
    #[instrument(skip(self, house))]
    async fn create_house(&self, house: &HouseModel) -> Result<(), AppError> {
        debug!(house_id = %house.id, "Creating house in memory");

        let mut houses = self.lock()?;
        if houses.contains_key(&house.id) {
            warn!(house_id = %house.id, "House already exists in memory");
            return Err(AppError::DatabaseError("House already exists".to_string()));
        }
        houses.insert(house.id.clone(), house.clone());

        debug!(house_id = %house.id, "House created successfully in memory");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_house(&self, house_id: &str) -> Result<Option<HouseModel>, AppError> {
        debug!(house_id = %house_id, "Fetching house from memory");

        let houses = self.lock()?;
        Ok(houses.get(house_id).cloned())
    }

    #[instrument(skip(self))]
    async fn search_houses(&self, pattern: &str) -> Result<Vec<HouseModel>, AppError> {
        debug!(pattern = %pattern, "Searching houses in memory");

        let needle = pattern.to_lowercase();
        let houses = self.lock()?;
        let mut matches: Vec<HouseModel> = houses
            .values()
            .filter(|house| house.name_contains(&needle))
            .cloned()
            .collect();
        // Same order as the SQL backend: lowercased name, bytewise, then id
        matches.sort_by_cached_key(|house| (house.name.to_lowercase(), house.id.clone()));

        debug!(match_count = matches.len(), "House search finished in memory");
        Ok(matches)
    }

    #[instrument(skip(self, house))]
    async fn update_house(&self, house: &HouseModel) -> Result<(), AppError> {
        debug!(house_id = %house.id, "Updating house in memory");

        let mut houses = self.lock()?;
        match houses.get_mut(&house.id) {
            Some(stored) => {
                stored.name = house.name.clone();
                stored.access_code = house.access_code.clone();
                stored.notes = house.notes.clone();
            }
            None => {
                warn!(house_id = %house.id, "House not found for update in memory");
                return Err(AppError::NotFound("house not found".to_string()));
            }
        }

        debug!(house_id = %house.id, "House updated successfully in memory");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_house(&self, house_id: &str) -> Result<(), AppError> {
        debug!(house_id = %house_id, "Deleting house from memory");

        let mut houses = self.lock()?;
        if houses.remove(house_id).is_none() {
            warn!(house_id = %house_id, "House not found for deletion in memory");
            return Err(AppError::NotFound("House not found".to_string()));
        }

        debug!(house_id = %house_id, "House deleted successfully from memory");
        Ok(())
    }
}

/// PostgreSQL implementation of house repository
pub struct PostgresHouseRepository {
    pool: PgPool,
}

impl PostgresHouseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Escapes LIKE metacharacters so the pattern is matched literally
fn escape_like(pattern: &str) -> String {
    let mut escaped = String::with_capacity(pattern.len());
    for ch in pattern.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn house_from_row(row: &PgRow) -> Result<HouseModel, sqlx::Error> {
    Ok(HouseModel {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        access_code: row.try_get("access_code")?,
        notes: row.try_get("notes")?,
    })
}

#[async_trait]
impl HouseRepository for PostgresHouseRepository {
    #[instrument(skip(self, house))]
    async fn create_house(&self, house: &HouseModel) -> Result<(), AppError> {
        debug!(house_id = %house.id, "Creating house in database");

        sqlx::query("INSERT INTO houses (id, name, access_code, notes) VALUES ($1, $2, $3, $4)")
            .bind(&house.id)
            .bind(&house.name)
            .bind(&house.access_code)
            .bind(&house.notes)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to create house in database");
                AppError::DatabaseError(e.to_string())
            })?;

        debug!(house_id = %house.id, "House created successfully in database");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_house(&self, house_id: &str) -> Result<Option<HouseModel>, AppError> {
        debug!(house_id = %house_id, "Fetching house from database");

        let row = sqlx::query("SELECT id, name, access_code, notes FROM houses WHERE id = $1")
            .bind(house_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, house_id = %house_id, "Failed to fetch house from database");
                AppError::DatabaseError(e.to_string())
            })?;

        row.as_ref()
            .map(house_from_row)
            .transpose()
            .map_err(|e| AppError::DatabaseError(e.to_string()))
    }

    #[instrument(skip(self))]
    async fn search_houses(&self, pattern: &str) -> Result<Vec<HouseModel>, AppError> {
        debug!(pattern = %pattern, "Searching houses in database");

        let rows = sqlx::query(
            r#"SELECT id, name, access_code, notes FROM houses
              WHERE name ILIKE '%' || $1 || '%' ESCAPE '\'
              ORDER BY LOWER(name) COLLATE "C", id"#,
        )
        .bind(escape_like(pattern))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to search houses");
            AppError::DatabaseError(e.to_string())
        })?;

        let houses = rows
            .iter()
            .map(house_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        debug!(match_count = houses.len(), "House search finished in database");
        Ok(houses)
    }

    #[instrument(skip(self, house))]
    async fn update_house(&self, house: &HouseModel) -> Result<(), AppError> {
        debug!(house_id = %house.id, "Updating house in database");

        // PostgreSQL counts matched rows, so an unchanged record still reports 1
        let result = sqlx::query(
            "UPDATE houses SET name = $2, access_code = $3, notes = $4 WHERE id = $1",
        )
        .bind(&house.id)
        .bind(&house.name)
        .bind(&house.access_code)
        .bind(&house.notes)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, house_id = %house.id, "Failed to update house in database");
            AppError::DatabaseError(e.to_string())
        })?;

        if result.rows_affected() == 0 {
            warn!(house_id = %house.id, "House not found for update");
            return Err(AppError::NotFound("house not found".to_string()));
        }

        debug!(house_id = %house.id, "House updated successfully in database");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_house(&self, house_id: &str) -> Result<(), AppError> {
        debug!(house_id = %house_id, "Deleting house from database");

        let result = sqlx::query("DELETE FROM houses WHERE id = $1")
            .bind(house_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, house_id = %house_id, "Failed to delete house from database");
                AppError::DatabaseError(e.to_string())
            })?;

        if result.rows_affected() == 0 {
            warn!(house_id = %house_id, "House not found for deletion");
            return Err(AppError::NotFound("House not found".to_string()));
        }

        debug!(house_id = %house_id, "House deleted successfully from database");
        Ok(())
    }
}
