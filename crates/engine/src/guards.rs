//! Account lifecycle guards shared by the ledger and account management.

use chrono::{DateTime, Utc};

use crate::{Account, EngineError, ResultEngine};

/// Refuse any mutation of a closed account.
pub fn ensure_not_closed(account: &Account) -> ResultEngine<()> {
    if account.is_closed() {
        return Err(EngineError::IllegalState(format!(
            "account {} is closed",
            account.id
        )));
    }
    Ok(())
}

/// A closing date may be now or in the past, never in the future.
pub fn ensure_close_date_valid(closed_at: DateTime<Utc>, now: DateTime<Utc>) -> ResultEngine<()> {
    if closed_at > now {
        return Err(EngineError::InvalidArgument(
            "date closed cannot be in the future".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    use super::*;
    use crate::{AccountKind, AccountStatus};

    fn account(status: AccountStatus) -> Account {
        Account {
            id: Uuid::new_v4(),
            account_number: "12345678".to_string(),
            kind: AccountKind::Checking,
            balance: dec!(10),
            opened_at: Utc::now(),
            closed_at: None,
            status,
            customer_id: Uuid::new_v4(),
            version: 0,
        }
    }

    #[test]
    fn open_and_inactive_accounts_pass() {
        assert!(ensure_not_closed(&account(AccountStatus::Active)).is_ok());
        assert!(ensure_not_closed(&account(AccountStatus::Inactive)).is_ok());
    }

    #[test]
    fn closed_account_is_illegal_state() {
        let err = ensure_not_closed(&account(AccountStatus::Closed)).unwrap_err();
        assert!(matches!(err, EngineError::IllegalState(_)));
    }

    #[test]
    fn close_date_boundaries() {
        let now = Utc::now();
        assert!(ensure_close_date_valid(now, now).is_ok());
        assert!(ensure_close_date_valid(now - Duration::days(1), now).is_ok());
        assert_eq!(
            ensure_close_date_valid(now + Duration::seconds(1), now).unwrap_err(),
            EngineError::InvalidArgument("date closed cannot be in the future".to_string())
        );
    }
}
