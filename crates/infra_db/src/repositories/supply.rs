//! Supply repository implementation
//!
//! Supplies are insert-only. Ownership history lives in `supply_allocation`,
//! which is append-only: each row links a supply to exactly one person or
//! location, and the most recent row is the current holder.

use chrono::NaiveDate;
use sqlx::PgPool;

use crate::error::DatabaseError;

/// A supply row joined with its most recent allocation, if any
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct SupplyRow {
    pub supply_id: i32,
    #[sqlx(rename = "type")]
    pub supply_type: String,
    pub quantity: i32,
    pub comments: Option<String>,
    pub allocated_person_id: Option<i32>,
    pub allocated_location_id: Option<i32>,
    pub allocation_date: Option<NaiveDate>,
}

/// Column values written for a supply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSupply {
    pub supply_type: String,
    pub quantity: i32,
    pub comments: Option<String>,
}

/// Column values written for an allocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAllocation {
    pub supply_id: i32,
    pub person_id: Option<i32>,
    pub location_id: Option<i32>,
    pub allocation_date: NaiveDate,
}

/// Repository for the `supply` and `supply_allocation` tables
#[derive(Debug, Clone)]
pub struct SupplyRepository {
    pool: PgPool,
}

impl SupplyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, supply: &NewSupply) -> Result<i32, DatabaseError> {
        let key = sqlx::query_scalar::<_, i32>(
            "INSERT INTO supply (type, quantity, comments) VALUES ($1, $2, $3) RETURNING supply_id",
        )
        .bind(&supply.supply_type)
        .bind(supply.quantity)
        .bind(&supply.comments)
        .fetch_one(&self.pool)
        .await?;

        Ok(key)
    }

    /// Every supply with its latest allocation
    pub async fn list_with_latest_allocation(&self) -> Result<Vec<SupplyRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, SupplyRow>(
            r#"
            SELECT s.supply_id, s.type, s.quantity, s.comments,
                   latest.person_id AS allocated_person_id,
                   latest.location_id AS allocated_location_id,
                   latest.allocation_date
            FROM supply s
            LEFT JOIN LATERAL (
                SELECT sa.person_id, sa.location_id, sa.allocation_date
                FROM supply_allocation sa
                WHERE sa.supply_id = s.supply_id
                ORDER BY sa.allocation_date DESC, sa.allocation_id DESC
                LIMIT 1
            ) latest ON TRUE
            ORDER BY s.supply_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn insert_allocation(&self, allocation: &NewAllocation) -> Result<i32, DatabaseError> {
        let key = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO supply_allocation (supply_id, person_id, location_id, allocation_date)
            VALUES ($1, $2, $3, $4)
            RETURNING allocation_id
            "#,
        )
        .bind(allocation.supply_id)
        .bind(allocation.person_id)
        .bind(allocation.location_id)
        .bind(allocation.allocation_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(key)
    }

    /// Deletes the allocation history of every water supply whose latest
    /// allocation went to a person before `cutoff`
    pub async fn delete_expired_water_allocations(
        &self,
        cutoff: NaiveDate,
    ) -> Result<u64, DatabaseError> {
        let result = sqlx::query(
            r#"
            DELETE FROM supply_allocation
            WHERE supply_id IN (
                SELECT latest.supply_id
                FROM (
                    SELECT DISTINCT ON (sa.supply_id)
                           sa.supply_id, sa.person_id, sa.allocation_date
                    FROM supply_allocation sa
                    JOIN supply s ON s.supply_id = sa.supply_id
                    WHERE s.type = 'water'
                    ORDER BY sa.supply_id, sa.allocation_date DESC, sa.allocation_id DESC
                ) latest
                WHERE latest.person_id IS NOT NULL AND latest.allocation_date < $1
            )
            "#,
        )
        .bind(cutoff)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}
