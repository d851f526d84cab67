use chrono::{DateTime, Utc};
use sea_orm::TransactionTrait;
use uuid::Uuid;

use crate::{
    Account, AccountStatus, EngineError, NewAccount, ResultEngine, accounts, customers, guards,
    transactions, validation,
};

use super::{Engine, with_tx};

impl Engine {
    /// Open a new account for an existing customer.
    ///
    /// The opening date is stamped now. An account opened directly as
    /// `CLOSED` gets its closing date stamped too.
    pub async fn open_account(&self, new_account: NewAccount) -> ResultEngine<Account> {
        with_tx!(self, |db_tx| {
            if !customers::exists_by_id(&db_tx, new_account.customer_id).await? {
                return Err(EngineError::NotFound(format!(
                    "customer {}",
                    new_account.customer_id
                )));
            }
            validation::validate_account(&new_account)?;

            let account_number = new_account.account_number.trim().to_string();
            if accounts::number_taken(&db_tx, &account_number).await? {
                return Err(EngineError::IllegalState(format!(
                    "account number {account_number} already in use"
                )));
            }

            let (Some(kind), Some(status), Some(balance)) =
                (new_account.kind, new_account.status, new_account.balance)
            else {
                return Err(EngineError::InvalidArgument(
                    "account type, status and balance are required".to_string(),
                ));
            };
            let now = Utc::now();
            let account = Account {
                id: Uuid::new_v4(),
                account_number,
                kind,
                balance,
                opened_at: now,
                closed_at: (status == AccountStatus::Closed).then_some(now),
                status,
                customer_id: new_account.customer_id,
                version: 0,
            };
            accounts::insert(&db_tx, &account).await?;
            tracing::info!(account_id = %account.id, "account opened");
            Ok(account)
        })
    }

    /// Return an account snapshot from DB.
    pub async fn account(&self, account_id: Uuid) -> ResultEngine<Account> {
        accounts::get_by_id(&self.database, account_id, "account").await
    }

    pub async fn account_exists(&self, account_id: Uuid) -> ResultEngine<bool> {
        accounts::exists_by_id(&self.database, account_id).await
    }

    pub async fn accounts(&self) -> ResultEngine<Vec<Account>> {
        accounts::list(&self.database, None).await
    }

    pub async fn accounts_for_customer(&self, customer_id: Uuid) -> ResultEngine<Vec<Account>> {
        customers::get_by_id(&self.database, customer_id).await?;
        accounts::list(&self.database, Some(customer_id)).await
    }

    /// Move an account to the status named by `token` (`ACTIVE`, `INACTIVE`,
    /// `CLOSED`, any case).
    ///
    /// Closed accounts cannot change status. Moving into `CLOSED` stamps the
    /// closing date with the current time.
    pub async fn update_account_status(&self, account_id: Uuid, token: &str) -> ResultEngine<Account> {
        let status = validation::validate_status_token(token)?;
        if status == AccountStatus::Closed {
            return self.close_account(account_id, None).await;
        }

        with_tx!(self, |db_tx| {
            let mut account = accounts::get_by_id(&db_tx, account_id, "account").await?;
            guards::ensure_not_closed(&account)?;
            account.status = status;
            let account = accounts::save(&db_tx, &account).await?;
            tracing::info!(%account_id, status = status.as_str(), "account status updated");
            Ok(account)
        })
    }

    /// Close an account.
    ///
    /// `closed_at` defaults to now and must not be in the future.
    pub async fn close_account(
        &self,
        account_id: Uuid,
        closed_at: Option<DateTime<Utc>>,
    ) -> ResultEngine<Account> {
        let now = Utc::now();
        validation::validate_date_closed(closed_at, now)?;
        let closed_at = closed_at.unwrap_or(now);

        with_tx!(self, |db_tx| {
            let mut account = accounts::get_by_id(&db_tx, account_id, "account").await?;
            guards::ensure_not_closed(&account)?;
            if closed_at < account.opened_at {
                return Err(EngineError::InvalidArgument(
                    "date closed cannot precede date opened".to_string(),
                ));
            }
            account.status = AccountStatus::Closed;
            account.closed_at = Some(closed_at);
            let account = accounts::save(&db_tx, &account).await?;
            tracing::info!(%account_id, "account closed");
            Ok(account)
        })
    }

    /// Delete an account together with the transactions recorded on it.
    pub async fn delete_account(&self, account_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            accounts::get_by_id(&db_tx, account_id, "account").await?;
            let removed = transactions::delete_for_account(&db_tx, account_id).await?;
            accounts::delete(&db_tx, account_id).await?;
            tracing::info!(%account_id, removed, "account deleted");
            Ok(())
        })
    }
}
