//! SQLite credit-purchase transaction repository.

use sqlx::Row;
use uniassist_core::repository::transaction::TransactionRepository;
use uniassist_types::credit::Transaction;
use uniassist_types::error::RepositoryError;
use uuid::Uuid;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, query_error};

/// SQLite-backed implementation of `TransactionRepository`.
#[derive(Clone)]
pub struct SqliteTransactionRepository {
    pool: DatabasePool,
}

impl SqliteTransactionRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

fn row_to_transaction(row: &sqlx::sqlite::SqliteRow) -> Result<Transaction, RepositoryError> {
    let id: String = row.try_get("id").map_err(query_error)?;
    let user_id: String = row.try_get("user_id").map_err(query_error)?;
    let amount: i64 = row.try_get("amount").map_err(query_error)?;
    let created_at: String = row.try_get("created_at").map_err(query_error)?;

    Ok(Transaction {
        id: Uuid::parse_str(&id)
            .map_err(|e| RepositoryError::Query(format!("invalid transaction id: {e}")))?,
        user_id: user_id
            .parse()
            .map_err(|e| RepositoryError::Query(format!("invalid user id: {e}")))?,
        plan_id: row.try_get("plan_id").map_err(query_error)?,
        amount: u32::try_from(amount)
            .map_err(|e| RepositoryError::Query(format!("invalid amount: {e}")))?,
        credits: row.try_get("credits").map_err(query_error)?,
        is_paid: row.try_get("is_paid").map_err(query_error)?,
        created_at: parse_datetime(&created_at)?,
    })
}

impl TransactionRepository for SqliteTransactionRepository {
    async fn create(&self, transaction: &Transaction) -> Result<Transaction, RepositoryError> {
        sqlx::query(
            "INSERT INTO transactions (id, user_id, plan_id, amount, credits, is_paid, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(transaction.id.to_string())
        .bind(transaction.user_id.to_string())
        .bind(&transaction.plan_id)
        .bind(i64::from(transaction.amount))
        .bind(transaction.credits)
        .bind(transaction.is_paid)
        .bind(format_datetime(&transaction.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;

        Ok(transaction.clone())
    }

    async fn get(&self, id: &Uuid) -> Result<Option<Transaction>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM transactions WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        row.as_ref().map(row_to_transaction).transpose()
    }

    async fn fulfill(&self, id: &Uuid) -> Result<Option<Transaction>, RepositoryError> {
        // Flip the paid flag and credit the owner in one transaction:
        // either both happen or neither does.
        let mut tx = self.pool.writer.begin().await.map_err(query_error)?;

        let row = sqlx::query(
            "UPDATE transactions SET is_paid = 1 WHERE id = ? AND is_paid = 0 RETURNING *",
        )
        .bind(id.to_string())
        .fetch_optional(&mut *tx)
        .await
        .map_err(query_error)?;

        let Some(row) = row else {
            let exists: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM transactions WHERE id = ?")
                .bind(id.to_string())
                .fetch_optional(&mut *tx)
                .await
                .map_err(query_error)?;
            return match exists {
                Some(_) => Ok(None),
                None => Err(RepositoryError::NotFound),
            };
        };

        let mut transaction = row_to_transaction(&row)?;
        transaction.is_paid = true;

        let credited = sqlx::query("UPDATE users SET credits = credits + ?, updated_at = ? WHERE id = ?")
            .bind(transaction.credits)
            .bind(format_datetime(&chrono::Utc::now()))
            .bind(transaction.user_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(query_error)?;
        if credited.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tx.commit().await.map_err(query_error)?;
        Ok(Some(transaction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::test_pool;
    use crate::sqlite::user::SqliteUserRepository;
    use crate::sqlite::user::tests::make_user;
    use chrono::Utc;
    use uniassist_core::repository::user::UserRepository;

    #[tokio::test]
    async fn test_fulfill_credits_exactly_once() {
        let pool = test_pool().await;
        let users = SqliteUserRepository::new(pool.clone());
        let repo = SqliteTransactionRepository::new(pool);

        let owner = make_user("payer@maju.edu.pk", 5);
        users.create(&owner).await.unwrap();

        let pending = Transaction {
            id: Uuid::now_v7(),
            user_id: owner.id,
            plan_id: "pro".to_string(),
            amount: 999,
            credits: 250,
            is_paid: false,
            created_at: Utc::now(),
        };
        repo.create(&pending).await.unwrap();
        let stored = repo.get(&pending.id).await.unwrap().unwrap();
        assert!(!stored.is_paid);
        assert_eq!(stored.amount, 999);

        let done = repo.fulfill(&pending.id).await.unwrap().unwrap();
        assert!(done.is_paid);
        assert_eq!(users.get_by_id(&owner.id).await.unwrap().unwrap().credits, 255);

        assert!(repo.fulfill(&pending.id).await.unwrap().is_none());
        assert_eq!(users.get_by_id(&owner.id).await.unwrap().unwrap().credits, 255);
        assert!(repo.get(&pending.id).await.unwrap().unwrap().is_paid);
    }

    #[tokio::test]
    async fn test_fulfill_unknown_transaction() {
        let repo = SqliteTransactionRepository::new(test_pool().await);
        assert!(matches!(
            repo.fulfill(&Uuid::now_v7()).await.unwrap_err(),
            RepositoryError::NotFound
        ));
        assert!(repo.get(&Uuid::now_v7()).await.unwrap().is_none());
    }
}
