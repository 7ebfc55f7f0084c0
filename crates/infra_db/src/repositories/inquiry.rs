//! Inquiry repository implementation
//!
//! Inquirers are matched by (first name, last name, phone number) and shared
//! by every inquiry they file.

use chrono::NaiveDate;
use sqlx::PgPool;

use crate::error::DatabaseError;

/// An inquiry row joined with its inquirer
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct InquiryRow {
    pub inquiry_id: i32,
    pub inquirer_id: i32,
    pub inquirer_first_name: String,
    pub inquirer_last_name: Option<String>,
    pub phone_number: String,
    pub inquirer_info: Option<String>,
    pub seeking_id: i32,
    pub location_id: i32,
    pub date_of_inquiry: NaiveDate,
    pub comments: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInquirer {
    pub first_name: String,
    pub last_name: Option<String>,
    pub phone_number: String,
    pub info: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInquiry {
    pub inquirer_id: i32,
    pub seeking_id: i32,
    pub location_id: i32,
    pub date_of_inquiry: NaiveDate,
    pub comments: Option<String>,
}

/// Repository for the `inquirer` and `inquiry` tables
#[derive(Debug, Clone)]
pub struct InquiryRepository {
    pool: PgPool,
}

impl InquiryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_inquirer(
        &self,
        first_name: &str,
        last_name: Option<&str>,
        phone_number: &str,
    ) -> Result<Option<i32>, DatabaseError> {
        let key = sqlx::query_scalar::<_, i32>(
            r#"
            SELECT inquirer_id
            FROM inquirer
            WHERE first_name = $1
              AND last_name IS NOT DISTINCT FROM $2
              AND phone_number = $3
            ORDER BY inquirer_id
            LIMIT 1
            "#,
        )
        .bind(first_name)
        .bind(last_name)
        .bind(phone_number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(key)
    }

    pub async fn insert_inquirer(&self, inquirer: &NewInquirer) -> Result<i32, DatabaseError> {
        let key = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO inquirer (first_name, last_name, phone_number, info)
            VALUES ($1, $2, $3, $4)
            RETURNING inquirer_id
            "#,
        )
        .bind(&inquirer.first_name)
        .bind(&inquirer.last_name)
        .bind(&inquirer.phone_number)
        .bind(&inquirer.info)
        .fetch_one(&self.pool)
        .await?;

        Ok(key)
    }

    pub async fn insert(&self, inquiry: &NewInquiry) -> Result<i32, DatabaseError> {
        let key = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO inquiry (inquirer_id, seeking_id, location_id, date_of_inquiry, comments)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING inquiry_id
            "#,
        )
        .bind(inquiry.inquirer_id)
        .bind(inquiry.seeking_id)
        .bind(inquiry.location_id)
        .bind(inquiry.date_of_inquiry)
        .bind(&inquiry.comments)
        .fetch_one(&self.pool)
        .await?;

        Ok(key)
    }

    pub async fn list(&self) -> Result<Vec<InquiryRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, InquiryRow>(
            r#"
            SELECT q.inquiry_id, q.inquirer_id,
                   i.first_name AS inquirer_first_name,
                   i.last_name AS inquirer_last_name,
                   i.phone_number,
                   i.info AS inquirer_info,
                   q.seeking_id, q.location_id, q.date_of_inquiry, q.comments
            FROM inquiry q
            JOIN inquirer i ON i.inquirer_id = q.inquirer_id
            ORDER BY q.inquiry_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
