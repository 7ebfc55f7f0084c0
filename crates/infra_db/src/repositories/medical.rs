//! Medical record repository implementation

use chrono::NaiveDate;
use sqlx::PgPool;

use crate::error::DatabaseError;

/// Database row for the `medical_record` table
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct MedicalRecordRow {
    pub medical_record_id: i32,
    pub location_id: i32,
    pub person_id: i32,
    pub date_of_treatment: NaiveDate,
    pub treatment_details: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMedicalRecord {
    pub location_id: i32,
    pub person_id: i32,
    pub date_of_treatment: NaiveDate,
    pub treatment_details: String,
}

/// Repository for the `medical_record` table; records are insert-only
#[derive(Debug, Clone)]
pub struct MedicalRecordRepository {
    pool: PgPool,
}

impl MedicalRecordRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, record: &NewMedicalRecord) -> Result<i32, DatabaseError> {
        let key = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO medical_record (location_id, person_id, date_of_treatment, treatment_details)
            VALUES ($1, $2, $3, $4)
            RETURNING medical_record_id
            "#,
        )
        .bind(record.location_id)
        .bind(record.person_id)
        .bind(record.date_of_treatment)
        .bind(&record.treatment_details)
        .fetch_one(&self.pool)
        .await?;

        Ok(key)
    }

    /// Every record in insertion order
    pub async fn list(&self) -> Result<Vec<MedicalRecordRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, MedicalRecordRow>(
            r#"
            SELECT medical_record_id, location_id, person_id, date_of_treatment, treatment_details
            FROM medical_record
            ORDER BY medical_record_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
