use uuid::Uuid;

use crate::{ResultEngine, Transaction, accounts, transactions};

use super::Engine;

impl Engine {
    pub async fn transaction(&self, transaction_id: Uuid) -> ResultEngine<Transaction> {
        transactions::get_by_id(&self.database, transaction_id).await
    }

    /// All recorded transactions, oldest first.
    pub async fn transactions(&self) -> ResultEngine<Vec<Transaction>> {
        transactions::list(&self.database, None).await
    }

    /// Transactions whose source is `account_id`, oldest first.
    ///
    /// Incoming transfers are not listed: they are recorded on the sending
    /// account only.
    pub async fn transactions_for_account(&self, account_id: Uuid) -> ResultEngine<Vec<Transaction>> {
        accounts::get_by_id(&self.database, account_id, "account").await?;
        transactions::list(&self.database, Some(account_id)).await
    }
}
