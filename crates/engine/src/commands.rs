//! Command structs for engine operations.
//!
//! These types group the parameters of write operations (new customer, new
//! account, ledger request). Every field a caller may omit is an `Option`
//! so validation can report the missing field instead of failing at decode
//! time.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AccountKind, AccountStatus, TransactionKind};

/// Register a customer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewCustomer {
    pub full_name: String,
    pub email: Option<String>,
}

impl NewCustomer {
    #[must_use]
    pub fn new(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            email: None,
        }
    }

    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Open an account for an existing customer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NewAccount {
    pub customer_id: Uuid,
    pub account_number: String,
    #[serde(rename = "type")]
    pub kind: Option<AccountKind>,
    pub status: Option<AccountStatus>,
    pub balance: Option<Decimal>,
}

impl NewAccount {
    /// An active account with the given opening balance.
    #[must_use]
    pub fn new(
        customer_id: Uuid,
        account_number: impl Into<String>,
        kind: AccountKind,
        balance: Decimal,
    ) -> Self {
        Self {
            customer_id,
            account_number: account_number.into(),
            kind: Some(kind),
            status: Some(AccountStatus::Active),
            balance: Some(balance),
        }
    }

    #[must_use]
    pub fn status(mut self, status: AccountStatus) -> Self {
        self.status = Some(status);
        self
    }
}

/// A ledger request, as received from a caller.
///
/// `type` and enum values decode from their upper-case tokens
/// (`"DEPOSIT"`, `"TRANSFER"`, ...); unknown tokens are decode errors.
/// Amounts decode from decimal strings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    #[serde(rename = "type")]
    pub kind: Option<TransactionKind>,
    pub amount: Option<Decimal>,
    pub description: Option<String>,
    pub destination: Option<String>,
    pub account_id: Option<Uuid>,
}

impl TransactionRequest {
    #[must_use]
    pub fn new(kind: TransactionKind, account_id: Uuid, amount: Decimal) -> Self {
        Self {
            kind: Some(kind),
            amount: Some(amount),
            description: None,
            destination: None,
            account_id: Some(account_id),
        }
    }

    #[must_use]
    pub fn deposit(account_id: Uuid, amount: Decimal) -> Self {
        Self::new(TransactionKind::Deposit, account_id, amount)
    }

    #[must_use]
    pub fn withdrawal(account_id: Uuid, amount: Decimal) -> Self {
        Self::new(TransactionKind::Withdrawal, account_id, amount)
    }

    #[must_use]
    pub fn transfer(account_id: Uuid, destination: Uuid, amount: Decimal) -> Self {
        Self::new(TransactionKind::Transfer, account_id, amount).destination(destination.to_string())
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = Some(destination.into());
        self
    }
}
