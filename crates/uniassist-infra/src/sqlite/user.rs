//! SQLite user repository implementation.
//!
//! Credits move only through the conditional `try_debit` and the additive
//! `credit` statements; `update` never writes the `credits` column.

use chrono::Utc;
use sqlx::Row;
use uniassist_core::repository::user::UserRepository;
use uniassist_types::error::RepositoryError;
use uniassist_types::user::{OtpChallenge, User, UserId};

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, query_error};

/// SQLite-backed implementation of `UserRepository`.
#[derive(Clone)]
pub struct SqliteUserRepository {
    pool: DatabasePool,
}

impl SqliteUserRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to domain User.
struct UserRow {
    id: String,
    name: String,
    email: String,
    password_hash: String,
    credits: i64,
    is_verified: bool,
    otp_hash: Option<String>,
    otp_expires_at: Option<String>,
    reset_hash: Option<String>,
    reset_expires_at: Option<String>,
    created_at: String,
    updated_at: String,
}

impl UserRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password_hash")?,
            credits: row.try_get("credits")?,
            is_verified: row.try_get("is_verified")?,
            otp_hash: row.try_get("otp_hash")?,
            otp_expires_at: row.try_get("otp_expires_at")?,
            reset_hash: row.try_get("reset_hash")?,
            reset_expires_at: row.try_get("reset_expires_at")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_user(self) -> Result<User, RepositoryError> {
        let id = self
            .id
            .parse::<UserId>()
            .map_err(|e| RepositoryError::Query(format!("invalid user id: {e}")))?;

        Ok(User {
            id,
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            credits: self.credits,
            is_verified: self.is_verified,
            verification: challenge(self.otp_hash, self.otp_expires_at)?,
            password_reset: challenge(self.reset_hash, self.reset_expires_at)?,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

fn challenge(
    hash: Option<String>,
    expires_at: Option<String>,
) -> Result<Option<OtpChallenge>, RepositoryError> {
    match (hash, expires_at) {
        (Some(code_hash), Some(expires_at)) => Ok(Some(OtpChallenge {
            code_hash,
            expires_at: parse_datetime(&expires_at)?,
        })),
        _ => Ok(None),
    }
}

fn challenge_columns(challenge: Option<&OtpChallenge>) -> (Option<String>, Option<String>) {
    match challenge {
        Some(c) => (Some(c.code_hash.clone()), Some(format_datetime(&c.expires_at))),
        None => (None, None),
    }
}

fn map_user_rows(rows: &[sqlx::sqlite::SqliteRow]) -> Result<Vec<User>, RepositoryError> {
    rows.iter()
        .map(|row| {
            UserRow::from_row(row)
                .map_err(query_error)
                .and_then(UserRow::into_user)
        })
        .collect()
}

impl SqliteUserRepository {
    async fn fetch_one_where(&self, column: &str, value: String) -> Result<Option<User>, RepositoryError> {
        // `column` is always a literal from this module.
        let row = sqlx::query(&format!("SELECT * FROM users WHERE {column} = ?"))
            .bind(value)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        match row {
            Some(row) => {
                let user_row = UserRow::from_row(&row).map_err(query_error)?;
                Ok(Some(user_row.into_user()?))
            }
            None => Ok(None),
        }
    }
}

impl UserRepository for SqliteUserRepository {
    async fn create(&self, user: &User) -> Result<User, RepositoryError> {
        let (otp_hash, otp_expires_at) = challenge_columns(user.verification.as_ref());
        let (reset_hash, reset_expires_at) = challenge_columns(user.password_reset.as_ref());

        let result = sqlx::query(
            "INSERT INTO users (id, name, email, password_hash, credits, is_verified, otp_hash, otp_expires_at, reset_hash, reset_expires_at, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(user.id.to_string())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.credits)
        .bind(user.is_verified)
        .bind(otp_hash)
        .bind(otp_expires_at)
        .bind(reset_hash)
        .bind(reset_expires_at)
        .bind(format_datetime(&user.created_at))
        .bind(format_datetime(&user.updated_at))
        .execute(&self.pool.writer)
        .await;

        match result {
            Ok(_) => Ok(user.clone()),
            Err(sqlx::Error::Database(db_err)) if db_err.message().contains("UNIQUE") => Err(
                RepositoryError::Conflict(format!("email '{}' already registered", user.email)),
            ),
            Err(e) => Err(query_error(e)),
        }
    }

    async fn get_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        self.fetch_one_where("id", id.to_string()).await
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        self.fetch_one_where("email", email.to_string()).await
    }

    async fn update(&self, user: &User) -> Result<(), RepositoryError> {
        let (otp_hash, otp_expires_at) = challenge_columns(user.verification.as_ref());
        let (reset_hash, reset_expires_at) = challenge_columns(user.password_reset.as_ref());

        let result = sqlx::query(
            "UPDATE users SET name = ?, email = ?, password_hash = ?, is_verified = ?, otp_hash = ?, otp_expires_at = ?, reset_hash = ?, reset_expires_at = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.is_verified)
        .bind(otp_hash)
        .bind(otp_expires_at)
        .bind(reset_hash)
        .bind(reset_expires_at)
        .bind(format_datetime(&user.updated_at))
        .bind(user.id.to_string())
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: &UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(query_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn try_debit(&self, id: &UserId, amount: i64) -> Result<Option<i64>, RepositoryError> {
        let row = sqlx::query(
            "UPDATE users SET credits = credits - ?, updated_at = ?
             WHERE id = ? AND credits >= ?
             RETURNING credits",
        )
        .bind(amount)
        .bind(format_datetime(&Utc::now()))
        .bind(id.to_string())
        .bind(amount)
        .fetch_optional(&self.pool.writer)
        .await
        .map_err(query_error)?;

        row.map(|r| r.try_get::<i64, _>("credits"))
            .transpose()
            .map_err(query_error)
    }

    async fn credit(&self, id: &UserId, amount: i64) -> Result<i64, RepositoryError> {
        let row = sqlx::query(
            "UPDATE users SET credits = credits + ?, updated_at = ?
             WHERE id = ?
             RETURNING credits",
        )
        .bind(amount)
        .bind(format_datetime(&Utc::now()))
        .bind(id.to_string())
        .fetch_optional(&self.pool.writer)
        .await
        .map_err(query_error)?
        .ok_or(RepositoryError::NotFound)?;

        row.try_get("credits").map_err(query_error)
    }

    async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM users ORDER BY created_at DESC")
            .fetch_all(&self.pool.reader)
            .await
            .map_err(query_error)?;
        map_user_rows(&rows)
    }

    async fn count(&self) -> Result<i64, RepositoryError> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool.reader)
            .await
            .map_err(query_error)?;
        Ok(row.0)
    }
}
