use chrono::Utc;
use sea_orm::TransactionTrait;
use uuid::Uuid;

use crate::{
    EngineError, ErrorKind, ResultEngine, Transaction, TransactionKind, TransactionRequest,
    accounts, guards, ledger, transactions,
    validation::{self, CheckedTransaction},
};

use super::{Engine, with_tx};

impl Engine {
    /// Apply a deposit, withdrawal or transfer and record it.
    ///
    /// Runs in one database transaction: the source account (and the
    /// destination for transfers) and the new transaction record are all
    /// written, or none of them is. The record is stamped with the commit
    /// time; a transfer produces a single record, on the source account.
    ///
    /// Checks run in this order: source exists, source is not closed, field
    /// validation, funds, then (transfers) destination exists and is not
    /// closed. If another writer updated one of the accounts in between, or
    /// holds the store's write lock, the call fails with
    /// [`EngineError::Conflict`] and nothing is kept.
    pub async fn create_transaction(&self, request: TransactionRequest) -> ResultEngine<Transaction> {
        let account_id = validation::require_account_id(request.account_id)?;
        let result = self.apply_transaction(account_id, &request).await;

        match &result {
            Ok(tx) => tracing::info!(
                transaction_id = %tx.id,
                %account_id,
                kind = tx.kind.as_str(),
                amount = %tx.amount,
                "transaction committed"
            ),
            Err(err) if err.kind() == ErrorKind::Rejected => {
                tracing::warn!(%account_id, "transaction rejected: {err}");
            }
            Err(err) => tracing::error!(%account_id, "transaction failed: {err}"),
        }
        result
    }

    async fn apply_transaction(
        &self,
        account_id: Uuid,
        request: &TransactionRequest,
    ) -> ResultEngine<Transaction> {
        with_tx!(self, |db_tx| {
            let source = accounts::get_by_id(&db_tx, account_id, "account").await?;
            guards::ensure_not_closed(&source).map_err(|_| {
                EngineError::IllegalState(format!(
                    "cannot transact against closed account {account_id}"
                ))
            })?;

            let CheckedTransaction {
                kind,
                amount,
                description,
                destination,
                destination_id,
                ..
            } = validation::validate_transaction_fields(request)?;
            tracing::debug!(%account_id, kind = kind.as_str(), %amount, "request validated");

            let destination_account = match (kind, destination_id) {
                (TransactionKind::Transfer, Some(destination_id)) => {
                    ledger::ensure_sufficient_funds(&source, amount)?;
                    let destination =
                        accounts::get_by_id(&db_tx, destination_id, "destination account")
                            .await?;
                    guards::ensure_not_closed(&destination).map_err(|_| {
                        EngineError::IllegalState(format!(
                            "cannot transfer to closed account {destination_id}"
                        ))
                    })?;
                    Some(destination)
                }
                _ => None,
            };

            let postings =
                ledger::plan_postings(kind, amount, &source, destination_account.as_ref())?;

            let mut source = source;
            source.balance = postings.source;
            accounts::save(&db_tx, &source).await?;
            if let (Some(mut destination), Some(balance)) =
                (destination_account, postings.destination)
            {
                destination.balance = balance;
                accounts::save(&db_tx, &destination).await?;
            }

            let tx = Transaction::record(
                account_id,
                kind,
                amount,
                description,
                destination,
                Utc::now(),
            );
            transactions::save(&db_tx, &tx).await?;
            Ok(tx)
        })
    }

    /// Validate a request against the current store state without applying
    /// it. Calling it twice on unchanged state gives the same verdict.
    pub async fn validate_transaction(
        &self,
        request: &TransactionRequest,
    ) -> ResultEngine<CheckedTransaction> {
        validation::validate_transaction(&self.database, request).await
    }
}
