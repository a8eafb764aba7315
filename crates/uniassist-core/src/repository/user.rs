//! User repository trait definition.

use uniassist_types::error::RepositoryError;
use uniassist_types::user::{User, UserId};

/// Repository trait for user account persistence.
///
/// Implementations live in uniassist-infra (e.g., `SqliteUserRepository`).
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
///
/// The credit balance is only ever changed through [`try_debit`] and
/// [`credit`], which are single atomic statements. [`update`] leaves the
/// balance untouched so a stale `User` can never overwrite a concurrent spend.
///
/// [`try_debit`]: UserRepository::try_debit
/// [`credit`]: UserRepository::credit
/// [`update`]: UserRepository::update
pub trait UserRepository: Send + Sync {
    /// Create a new user. Fails with `Conflict` when the email is taken.
    fn create(
        &self,
        user: &User,
    ) -> impl std::future::Future<Output = Result<User, RepositoryError>> + Send;

    fn get_by_id(
        &self,
        id: &UserId,
    ) -> impl std::future::Future<Output = Result<Option<User>, RepositoryError>> + Send;

    /// Look up by normalized email.
    fn get_by_email(
        &self,
        email: &str,
    ) -> impl std::future::Future<Output = Result<Option<User>, RepositoryError>> + Send;

    /// Persist profile, credential, verification, and OTP fields.
    fn update(
        &self,
        user: &User,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Delete a user. Returns whether a row was removed.
    fn delete(
        &self,
        id: &UserId,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    /// Subtract `amount` credits if the balance covers it.
    ///
    /// Returns the new balance, or `None` when the balance is insufficient
    /// (or the user does not exist). Never drives the balance negative.
    fn try_debit(
        &self,
        id: &UserId,
        amount: i64,
    ) -> impl std::future::Future<Output = Result<Option<i64>, RepositoryError>> + Send;

    /// Add `amount` credits and return the new balance.
    fn credit(
        &self,
        id: &UserId,
        amount: i64,
    ) -> impl std::future::Future<Output = Result<i64, RepositoryError>> + Send;

    /// All users, newest first.
    fn list(&self) -> impl std::future::Future<Output = Result<Vec<User>, RepositoryError>> + Send;

    fn count(&self) -> impl std::future::Future<Output = Result<i64, RepositoryError>> + Send;
}
