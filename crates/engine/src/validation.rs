//! Validation of incoming account and transaction data.
//!
//! Everything here runs before any mutation. The checks are pure except for
//! [`validate_transaction`], which reads the referenced accounts to confirm
//! they exist and are open.

use std::ops::RangeInclusive;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::ConnectionTrait;
use uuid::Uuid;

use crate::{
    AccountStatus, EngineError, NewAccount, ResultEngine, TransactionKind, TransactionRequest,
    accounts, guards, util::normalize_optional_text,
};

/// Maximum length, in characters, of a description or destination.
pub const MAX_TEXT_LEN: usize = 100;

/// Allowed length, in characters, of an account number.
pub const ACCOUNT_NUMBER_LEN: RangeInclusive<usize> = 8..=12;

/// A ledger request whose fields passed validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckedTransaction {
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub account_id: Uuid,
    pub description: Option<String>,
    /// Free text for deposits and withdrawals, the canonical account id for
    /// transfers.
    pub destination: Option<String>,
    /// Parsed destination, set for transfers only.
    pub destination_id: Option<Uuid>,
}

pub fn validate_account(account: &NewAccount) -> ResultEngine<()> {
    match account.balance {
        Some(balance) if balance >= Decimal::ZERO => {}
        _ => {
            return Err(EngineError::InvalidArgument(
                "account balance must be a positive value".to_string(),
            ));
        }
    }
    if account.kind.is_none() || account.status.is_none() {
        return Err(EngineError::InvalidArgument(
            "account type and status cannot be null".to_string(),
        ));
    }
    let len = account.account_number.trim().chars().count();
    if !ACCOUNT_NUMBER_LEN.contains(&len) {
        return Err(EngineError::InvalidArgument(format!(
            "account number must be between {} and {} characters",
            ACCOUNT_NUMBER_LEN.start(),
            ACCOUNT_NUMBER_LEN.end()
        )));
    }
    Ok(())
}

pub fn validate_new_balance(balance: Option<Decimal>) -> ResultEngine<Decimal> {
    match balance {
        Some(balance) if balance >= Decimal::ZERO => Ok(balance),
        _ => Err(EngineError::InvalidArgument(
            "new balance must be a positive value".to_string(),
        )),
    }
}

pub fn validate_date_closed(
    closed_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> ResultEngine<()> {
    match closed_at {
        Some(closed_at) => guards::ensure_close_date_valid(closed_at, now),
        None => Ok(()),
    }
}

pub fn validate_status_token(token: &str) -> ResultEngine<AccountStatus> {
    AccountStatus::try_from(token)
}

/// Check everything about a ledger request that does not need the store.
pub fn validate_transaction_fields(request: &TransactionRequest) -> ResultEngine<CheckedTransaction> {
    let amount = validate_amount(request.amount)?;
    let kind = validate_kind(request.kind)?;
    let account_id = require_account_id(request.account_id)?;
    validate_text_lengths(request)?;

    let (destination, destination_id) = match kind {
        TransactionKind::Transfer => {
            let id = parse_transfer_destination(request.destination.as_deref(), account_id)?;
            (Some(id.to_string()), Some(id))
        }
        TransactionKind::Deposit | TransactionKind::Withdrawal => {
            (normalize_optional_text(request.destination.as_deref()), None)
        }
    };

    Ok(CheckedTransaction {
        kind,
        amount,
        account_id,
        description: normalize_optional_text(request.description.as_deref()),
        destination,
        destination_id,
    })
}

/// Full validation of a ledger request, including the source and (for
/// transfers) the destination account state.
pub async fn validate_transaction<C: ConnectionTrait>(
    conn: &C,
    request: &TransactionRequest,
) -> ResultEngine<CheckedTransaction> {
    validate_amount(request.amount)?;
    validate_kind(request.kind)?;
    let account_id = require_account_id(request.account_id)?;
    let source = accounts::get_by_id(conn, account_id, "source account").await?;
    guards::ensure_not_closed(&source)?;

    let checked = validate_transaction_fields(request)?;
    if let Some(destination_id) = checked.destination_id {
        let destination = accounts::get_by_id(conn, destination_id, "destination account").await?;
        guards::ensure_not_closed(&destination)?;
    }
    Ok(checked)
}

fn validate_amount(amount: Option<Decimal>) -> ResultEngine<Decimal> {
    match amount {
        Some(amount) if amount > Decimal::ZERO => Ok(amount),
        _ => Err(EngineError::InvalidArgument(
            "transaction amount must be greater than zero".to_string(),
        )),
    }
}

fn validate_kind(kind: Option<TransactionKind>) -> ResultEngine<TransactionKind> {
    kind.ok_or_else(|| {
        EngineError::InvalidArgument("transaction type must not be null".to_string())
    })
}

pub(crate) fn require_account_id(account_id: Option<Uuid>) -> ResultEngine<Uuid> {
    account_id
        .ok_or_else(|| EngineError::InvalidArgument("account id must not be null".to_string()))
}

fn validate_text_lengths(request: &TransactionRequest) -> ResultEngine<()> {
    if let Some(description) = &request.description
        && description.chars().count() > MAX_TEXT_LEN
    {
        return Err(EngineError::InvalidArgument(format!(
            "description exceeds {MAX_TEXT_LEN} characters"
        )));
    }
    if let Some(destination) = &request.destination
        && destination.chars().count() > MAX_TEXT_LEN
    {
        return Err(EngineError::InvalidArgument(format!(
            "destination exceeds {MAX_TEXT_LEN} characters"
        )));
    }
    Ok(())
}

fn parse_transfer_destination(destination: Option<&str>, source_id: Uuid) -> ResultEngine<Uuid> {
    let destination = destination.map(str::trim).unwrap_or_default();
    if destination.is_empty() {
        return Err(EngineError::InvalidArgument(
            "transfer destination required".to_string(),
        ));
    }
    let id = Uuid::parse_str(destination).map_err(|_| {
        EngineError::InvalidArgument(format!(
            "invalid destination account id format: {destination}"
        ))
    })?;
    if id == source_id {
        return Err(EngineError::InvalidArgument(
            "source and destination accounts must differ".to_string(),
        ));
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::AccountKind;

    fn new_account() -> NewAccount {
        NewAccount::new(Uuid::new_v4(), "1234567890", AccountKind::Savings, dec!(0))
    }

    #[test]
    fn account_with_zero_balance_is_valid() {
        assert!(validate_account(&new_account()).is_ok());
    }

    #[test]
    fn account_rejects_negative_or_missing_balance() {
        let mut account = new_account();
        account.balance = Some(dec!(-0.01));
        assert!(matches!(
            validate_account(&account),
            Err(EngineError::InvalidArgument(_))
        ));
        account.balance = None;
        assert!(validate_account(&account).is_err());
    }

    #[test]
    fn account_requires_type_and_status() {
        let mut account = new_account();
        account.kind = None;
        assert_eq!(
            validate_account(&account).unwrap_err(),
            EngineError::InvalidArgument("account type and status cannot be null".to_string())
        );
        let mut account = new_account();
        account.status = None;
        assert!(validate_account(&account).is_err());
    }

    #[test]
    fn account_number_length_is_bounded() {
        let mut account = new_account();
        account.account_number = "1234567".to_string();
        assert!(validate_account(&account).is_err());
        account.account_number = "12345678".to_string();
        assert!(validate_account(&account).is_ok());
        account.account_number = "123456789012".to_string();
        assert!(validate_account(&account).is_ok());
        account.account_number = "1234567890123".to_string();
        assert!(validate_account(&account).is_err());
    }

    #[test]
    fn new_balance_must_be_non_negative() {
        assert_eq!(validate_new_balance(Some(dec!(0))).unwrap(), dec!(0));
        assert!(validate_new_balance(Some(dec!(-1))).is_err());
        assert!(validate_new_balance(None).is_err());
    }

    #[test]
    fn date_closed_in_future_is_rejected() {
        let now = Utc::now();
        assert!(validate_date_closed(None, now).is_ok());
        assert!(validate_date_closed(Some(now - Duration::hours(1)), now).is_ok());
        assert!(validate_date_closed(Some(now + Duration::hours(1)), now).is_err());
    }

    #[test]
    fn status_token_maps_or_fails() {
        assert_eq!(
            validate_status_token("inactive").unwrap(),
            AccountStatus::Inactive
        );
        assert!(matches!(
            validate_status_token("SUSPENDED"),
            Err(EngineError::InvalidArgument(_))
        ));
    }

    #[test]
    fn amount_must_be_strictly_positive() {
        let id = Uuid::new_v4();
        for amount in [dec!(0), dec!(-5)] {
            let err = validate_transaction_fields(&TransactionRequest::deposit(id, amount))
                .unwrap_err();
            assert_eq!(
                err,
                EngineError::InvalidArgument(
                    "transaction amount must be greater than zero".to_string()
                )
            );
        }
    }

    #[test]
    fn missing_type_and_account_are_reported() {
        let mut request = TransactionRequest::deposit(Uuid::new_v4(), dec!(1));
        request.kind = None;
        assert_eq!(
            validate_transaction_fields(&request).unwrap_err(),
            EngineError::InvalidArgument("transaction type must not be null".to_string())
        );

        let mut request = TransactionRequest::deposit(Uuid::new_v4(), dec!(1));
        request.account_id = None;
        assert_eq!(
            validate_transaction_fields(&request).unwrap_err(),
            EngineError::InvalidArgument("account id must not be null".to_string())
        );
    }

    #[test]
    fn text_fields_are_capped_at_one_hundred_chars() {
        let id = Uuid::new_v4();
        let ok = TransactionRequest::deposit(id, dec!(1)).description("é".repeat(100));
        assert!(validate_transaction_fields(&ok).is_ok());

        let long = TransactionRequest::deposit(id, dec!(1)).description("x".repeat(101));
        assert!(validate_transaction_fields(&long).is_err());

        let long = TransactionRequest::withdrawal(id, dec!(1)).destination("y".repeat(101));
        assert!(validate_transaction_fields(&long).is_err());
    }

    #[test]
    fn transfer_destination_must_parse() {
        let id = Uuid::new_v4();
        let request = TransactionRequest::new(TransactionKind::Transfer, id, dec!(1));
        assert_eq!(
            validate_transaction_fields(&request).unwrap_err(),
            EngineError::InvalidArgument("transfer destination required".to_string())
        );

        let request = request.destination("   ");
        assert!(validate_transaction_fields(&request).is_err());

        let request = TransactionRequest::new(TransactionKind::Transfer, id, dec!(1))
            .destination("not-an-account");
        assert!(matches!(
            validate_transaction_fields(&request),
            Err(EngineError::InvalidArgument(_))
        ));
    }

    #[test]
    fn self_transfer_is_rejected() {
        let id = Uuid::new_v4();
        let err = validate_transaction_fields(&TransactionRequest::transfer(id, id, dec!(1)))
            .unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidArgument("source and destination accounts must differ".to_string())
        );
    }

    #[test]
    fn transfer_destination_is_canonicalized() {
        let source = Uuid::new_v4();
        let destination = Uuid::new_v4();
        let request = TransactionRequest::new(TransactionKind::Transfer, source, dec!(1))
            .destination(format!("  {}  ", destination.simple()));
        let checked = validate_transaction_fields(&request).unwrap();
        assert_eq!(checked.destination_id, Some(destination));
        assert_eq!(checked.destination, Some(destination.to_string()));
    }

    #[test]
    fn deposit_keeps_free_text_destination() {
        let checked = validate_transaction_fields(
            &TransactionRequest::deposit(Uuid::new_v4(), dec!(1)).destination(" branch 12 "),
        )
        .unwrap();
        assert_eq!(checked.destination, Some("branch 12".to_string()));
        assert_eq!(checked.destination_id, None);
    }
}
