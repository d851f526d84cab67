//! Balance arithmetic for ledger requests.
//!
//! Nothing here touches the store: given the accounts as read inside the
//! database transaction, [`plan_postings`] computes the balances to persist
//! or the reason the request must be refused.

use rust_decimal::Decimal;

use crate::{Account, EngineError, ResultEngine, TransactionKind, guards, validation};

/// New balances produced by one accepted request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Postings {
    pub source: Decimal,
    /// Set for transfers only.
    pub destination: Option<Decimal>,
}

/// Refuse a debit larger than the available balance.
pub fn ensure_sufficient_funds(account: &Account, amount: Decimal) -> ResultEngine<()> {
    if account.balance < amount {
        return Err(EngineError::IllegalState(format!(
            "insufficient funds in account {}",
            account.id
        )));
    }
    Ok(())
}

fn credit(balance: Decimal, amount: Decimal) -> ResultEngine<Decimal> {
    balance.checked_add(amount).ok_or_else(|| {
        EngineError::InvalidArgument(format!("amount {amount} overflows the balance"))
    })
}

/// Compute the balances an accepted request leaves behind.
///
/// `destination` must be `Some` exactly when `kind` is a transfer.
pub fn plan_postings(
    kind: TransactionKind,
    amount: Decimal,
    source: &Account,
    destination: Option<&Account>,
) -> ResultEngine<Postings> {
    if amount <= Decimal::ZERO {
        return Err(EngineError::InvalidArgument(
            "transaction amount must be greater than zero".to_string(),
        ));
    }
    guards::ensure_not_closed(source)?;

    let postings = match (kind, destination) {
        (TransactionKind::Deposit, None) => Postings {
            source: credit(source.balance, amount)?,
            destination: None,
        },
        (TransactionKind::Withdrawal, None) => {
            ensure_sufficient_funds(source, amount)?;
            Postings {
                source: source.balance - amount,
                destination: None,
            }
        }
        (TransactionKind::Transfer, Some(destination)) => {
            ensure_sufficient_funds(source, amount)?;
            guards::ensure_not_closed(destination)?;
            if destination.id == source.id {
                return Err(EngineError::InvalidArgument(
                    "source and destination accounts must differ".to_string(),
                ));
            }
            Postings {
                source: source.balance - amount,
                destination: Some(credit(destination.balance, amount)?),
            }
        }
        (TransactionKind::Transfer, None) => {
            return Err(EngineError::InvalidArgument(
                "transfer destination required".to_string(),
            ));
        }
        (TransactionKind::Deposit | TransactionKind::Withdrawal, Some(_)) => {
            return Err(EngineError::InvalidArgument(format!(
                "{} does not credit a destination account",
                kind.as_str()
            )));
        }
    };

    validation::validate_new_balance(Some(postings.source))?;
    if let Some(balance) = postings.destination {
        validation::validate_new_balance(Some(balance))?;
    }
    Ok(postings)
}
