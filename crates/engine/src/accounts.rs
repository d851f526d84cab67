//! The module contains `Account` struct, its enumerations and the account
//! store.
//!
//! Balances are kept as [`Decimal`] and persisted as text, so the store
//! never rounds through a floating point type.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, entity::prelude::*, sea_query::Expr,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine,
    util::{parse_decimal, parse_uuid},
};

/// Product type of an account.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountKind {
    Checking,
    Savings,
    FixedDeposit,
}

impl AccountKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Checking => "CHECKING",
            Self::Savings => "SAVINGS",
            Self::FixedDeposit => "FIXED_DEPOSIT",
        }
    }
}

impl TryFrom<&str> for AccountKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "CHECKING" => Ok(Self::Checking),
            "SAVINGS" => Ok(Self::Savings),
            "FIXED_DEPOSIT" => Ok(Self::FixedDeposit),
            _ => Err(EngineError::InvalidArgument(format!(
                "invalid account type: {value}"
            ))),
        }
    }
}

impl FromStr for AccountKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s)
    }
}

/// Lifecycle status of an account.
///
/// `Closed` is terminal: a closed account can only be read.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    Active,
    Inactive,
    Closed,
}

impl AccountStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Inactive => "INACTIVE",
            Self::Closed => "CLOSED",
        }
    }
}

impl TryFrom<&str> for AccountStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "ACTIVE" => Ok(Self::Active),
            "INACTIVE" => Ok(Self::Inactive),
            "CLOSED" => Ok(Self::Closed),
            _ => Err(EngineError::InvalidArgument(format!(
                "invalid account status: {value}"
            ))),
        }
    }
}

impl FromStr for AccountStatus {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s)
    }
}

/// A bank account.
///
/// Values handed out by the engine are snapshots: changing a field here does
/// not touch the store. Balances only move through
/// [`Engine::create_transaction`](crate::Engine::create_transaction).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub account_number: String,
    pub kind: AccountKind,
    pub balance: Decimal,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub status: AccountStatus,
    pub customer_id: Uuid,
    /// Optimistic concurrency token, bumped by every persisted change.
    pub version: i64,
}

impl Account {
    pub fn is_closed(&self) -> bool {
        self.status == AccountStatus::Closed
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub account_number: String,
    pub kind: String,
    pub balance: String,
    pub opened_at: DateTimeUtc,
    pub closed_at: Option<DateTimeUtc>,
    pub status: String,
    pub customer_id: String,
    pub version: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
    #[sea_orm(
        belongs_to = "super::customers::Entity",
        from = "Column::CustomerId",
        to = "super::customers::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Customers,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl Related<super::customers::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Account> for ActiveModel {
    fn from(value: &Account) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            account_number: ActiveValue::Set(value.account_number.clone()),
            kind: ActiveValue::Set(value.kind.as_str().to_string()),
            balance: ActiveValue::Set(value.balance.to_string()),
            opened_at: ActiveValue::Set(value.opened_at),
            closed_at: ActiveValue::Set(value.closed_at),
            status: ActiveValue::Set(value.status.as_str().to_string()),
            customer_id: ActiveValue::Set(value.customer_id.to_string()),
            version: ActiveValue::Set(value.version),
        }
    }
}

impl TryFrom<Model> for Account {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "account")?,
            account_number: model.account_number,
            kind: AccountKind::try_from(model.kind.as_str())?,
            balance: parse_decimal(&model.balance, "balance")?,
            opened_at: model.opened_at,
            closed_at: model.closed_at,
            status: AccountStatus::try_from(model.status.as_str())?,
            customer_id: parse_uuid(&model.customer_id, "customer")?,
            version: model.version,
        })
    }
}

pub(crate) async fn find_by_id<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> ResultEngine<Option<Account>> {
    Entity::find_by_id(id.to_string())
        .one(conn)
        .await?
        .map(Account::try_from)
        .transpose()
}

/// Load an account or fail with `NotFound`, labeling the error with `role`
/// ("account", "destination account") so callers can tell which side was
/// missing.
pub(crate) async fn get_by_id<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
    role: &str,
) -> ResultEngine<Account> {
    find_by_id(conn, id)
        .await?
        .ok_or_else(|| EngineError::NotFound(format!("{role} {id}")))
}

pub(crate) async fn exists_by_id<C: ConnectionTrait>(conn: &C, id: Uuid) -> ResultEngine<bool> {
    Ok(find_by_id(conn, id).await?.is_some())
}

pub(crate) async fn number_taken<C: ConnectionTrait>(
    conn: &C,
    account_number: &str,
) -> ResultEngine<bool> {
    Ok(Entity::find()
        .filter(Column::AccountNumber.eq(account_number))
        .one(conn)
        .await?
        .is_some())
}

pub(crate) async fn list<C: ConnectionTrait>(
    conn: &C,
    customer_id: Option<Uuid>,
) -> ResultEngine<Vec<Account>> {
    let mut query = Entity::find().order_by_asc(Column::OpenedAt);
    if let Some(customer_id) = customer_id {
        query = query.filter(Column::CustomerId.eq(customer_id.to_string()));
    }
    query
        .all(conn)
        .await?
        .into_iter()
        .map(Account::try_from)
        .collect()
}

pub(crate) async fn insert<C: ConnectionTrait>(conn: &C, account: &Account) -> ResultEngine<()> {
    ActiveModel::from(account).insert(conn).await?;
    Ok(())
}

/// Persist the mutable fields of `account`.
///
/// The update only matches the row if its version is still the one the
/// caller read; otherwise another writer got there first and the call fails
/// with `Conflict`. Returns the account with its new version.
pub(crate) async fn save<C: ConnectionTrait>(conn: &C, account: &Account) -> ResultEngine<Account> {
    let next_version = account.version + 1;
    let result = Entity::update_many()
        .col_expr(Column::Kind, Expr::value(account.kind.as_str()))
        .col_expr(Column::Balance, Expr::value(account.balance.to_string()))
        .col_expr(Column::Status, Expr::value(account.status.as_str()))
        .col_expr(Column::ClosedAt, Expr::value(account.closed_at))
        .col_expr(Column::Version, Expr::value(next_version))
        .filter(Column::Id.eq(account.id.to_string()))
        .filter(Column::Version.eq(account.version))
        .exec(conn)
        .await?;
    if result.rows_affected == 0 {
        return Err(EngineError::Conflict(format!(
            "account {} was modified concurrently",
            account.id
        )));
    }

    let mut saved = account.clone();
    saved.version = next_version;
    Ok(saved)
}

pub(crate) async fn delete<C: ConnectionTrait>(conn: &C, id: Uuid) -> ResultEngine<()> {
    Entity::delete_by_id(id.to_string()).exec(conn).await?;
    Ok(())
}
