//! Credit purchase transaction repository trait definition.

use uniassist_types::credit::Transaction;
use uniassist_types::error::RepositoryError;
use uuid::Uuid;

pub trait TransactionRepository: Send + Sync {
    fn create(
        &self,
        transaction: &Transaction,
    ) -> impl std::future::Future<Output = Result<Transaction, RepositoryError>> + Send;

    fn get(
        &self,
        id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<Transaction>, RepositoryError>> + Send;

    /// Flip an unpaid transaction to paid and add its credits to the owner,
    /// atomically.
    ///
    /// Returns the transaction when this call performed the fulfillment and
    /// `None` when it was already paid. Fails with `NotFound` for an unknown id.
    fn fulfill(
        &self,
        id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<Transaction>, RepositoryError>> + Send;
}
