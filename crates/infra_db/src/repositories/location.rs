//! Location repository implementation

use sqlx::PgPool;

use crate::error::DatabaseError;

/// Database row for the `location` table
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct LocationRow {
    pub location_id: i32,
    pub name: String,
    pub address: String,
}

/// Column values written for a location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLocation {
    pub name: String,
    pub address: String,
}

/// Repository for the `location` table. Locations are matched by exact name.
#[derive(Debug, Clone)]
pub struct LocationRepository {
    pool: PgPool,
}

impl LocationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<i32>, DatabaseError> {
        let key = sqlx::query_scalar::<_, i32>(
            "SELECT location_id FROM location WHERE name = $1 ORDER BY location_id LIMIT 1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(key)
    }

    pub async fn insert(&self, location: &NewLocation) -> Result<i32, DatabaseError> {
        let key = sqlx::query_scalar::<_, i32>(
            "INSERT INTO location (name, address) VALUES ($1, $2) RETURNING location_id",
        )
        .bind(&location.name)
        .bind(&location.address)
        .fetch_one(&self.pool)
        .await?;

        Ok(key)
    }

    pub async fn update(&self, location_id: i32, location: &NewLocation) -> Result<(), DatabaseError> {
        let result = sqlx::query("UPDATE location SET name = $2, address = $3 WHERE location_id = $1")
            .bind(location_id)
            .bind(&location.name)
            .bind(&location.address)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("location", location_id));
        }
        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<LocationRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, LocationRow>(
            "SELECT location_id, name, address FROM location ORDER BY location_id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
