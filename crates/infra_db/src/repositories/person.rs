//! Person repository implementation
//!
//! Persons are identified in storage by their natural key, the exact
//! (first name, last name) pair. A missing last name matches a NULL column.

use chrono::NaiveDate;
use sqlx::PgPool;

use crate::error::DatabaseError;

/// Database row for the `person` table
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct PersonRow {
    pub person_id: i32,
    pub first_name: String,
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub entry_date: NaiveDate,
    pub comments: Option<String>,
    pub family_group: Option<String>,
}

/// Column values written for a person
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPerson {
    pub first_name: String,
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub entry_date: NaiveDate,
    pub comments: Option<String>,
    pub family_group: Option<String>,
}

impl NewPerson {
    /// Row as it reads back once stored under `person_id`
    pub fn into_row(self, person_id: i32) -> PersonRow {
        PersonRow {
            person_id,
            first_name: self.first_name,
            last_name: self.last_name,
            date_of_birth: self.date_of_birth,
            gender: self.gender,
            entry_date: self.entry_date,
            comments: self.comments,
            family_group: self.family_group,
        }
    }
}

/// Repository for the `person` table
#[derive(Debug, Clone)]
pub struct PersonRepository {
    pool: PgPool,
}

impl PersonRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Finds the key of the person with this exact name
    pub async fn find_by_name(
        &self,
        first_name: &str,
        last_name: Option<&str>,
    ) -> Result<Option<i32>, DatabaseError> {
        let key = sqlx::query_scalar::<_, i32>(
            r#"
            SELECT person_id
            FROM person
            WHERE first_name = $1 AND last_name IS NOT DISTINCT FROM $2
            ORDER BY person_id
            LIMIT 1
            "#,
        )
        .bind(first_name)
        .bind(last_name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(key)
    }

    pub async fn insert(&self, person: &NewPerson) -> Result<i32, DatabaseError> {
        let key = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO person (
                first_name, last_name, date_of_birth, gender,
                entry_date, comments, family_group
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING person_id
            "#,
        )
        .bind(&person.first_name)
        .bind(&person.last_name)
        .bind(person.date_of_birth)
        .bind(&person.gender)
        .bind(person.entry_date)
        .bind(&person.comments)
        .bind(&person.family_group)
        .fetch_one(&self.pool)
        .await?;

        Ok(key)
    }

    /// Overwrites every column of an existing person
    pub async fn update(&self, person_id: i32, person: &NewPerson) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE person
            SET first_name = $2, last_name = $3, date_of_birth = $4, gender = $5,
                entry_date = $6, comments = $7, family_group = $8
            WHERE person_id = $1
            "#,
        )
        .bind(person_id)
        .bind(&person.first_name)
        .bind(&person.last_name)
        .bind(person.date_of_birth)
        .bind(&person.gender)
        .bind(person.entry_date)
        .bind(&person.comments)
        .bind(&person.family_group)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("person", person_id));
        }
        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<PersonRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, PersonRow>(
            r#"
            SELECT person_id, first_name, last_name, date_of_birth, gender,
                   entry_date, comments, family_group
            FROM person
            ORDER BY person_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
