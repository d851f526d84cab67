//! Transaction records.
//!
//! A `Transaction` is written exactly once, by the ledger, when a request is
//! accepted. It is never updated afterwards.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveValue, ConnectionTrait, QueryFilter, QueryOrder, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine,
    util::{parse_decimal, parse_uuid},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
    Transfer,
}

impl TransactionKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Deposit => "DEPOSIT",
            Self::Withdrawal => "WITHDRAWAL",
            Self::Transfer => "TRANSFER",
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_uppercase().as_str() {
            "DEPOSIT" => Ok(Self::Deposit),
            "WITHDRAWAL" => Ok(Self::Withdrawal),
            "TRANSFER" => Ok(Self::Transfer),
            _ => Err(EngineError::InvalidArgument(format!(
                "invalid transaction type: {value}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub kind: TransactionKind,
    pub amount: Decimal,
    /// Commit time, assigned by the engine.
    pub occurred_at: DateTime<Utc>,
    pub description: Option<String>,
    /// For transfers, the id of the credited account.
    pub destination: Option<String>,
    /// The source account.
    pub account_id: Uuid,
}

impl Transaction {
    pub(crate) fn record(
        account_id: Uuid,
        kind: TransactionKind,
        amount: Decimal,
        description: Option<String>,
        destination: Option<String>,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            amount,
            occurred_at,
            description,
            destination,
            account_id,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub kind: String,
    pub amount: String,
    pub occurred_at: DateTimeUtc,
    pub description: Option<String>,
    pub destination: Option<String>,
    pub account_id: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::accounts::Entity",
        from = "Column::AccountId",
        to = "super::accounts::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Accounts,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            amount: ActiveValue::Set(tx.amount.to_string()),
            occurred_at: ActiveValue::Set(tx.occurred_at),
            description: ActiveValue::Set(tx.description.clone()),
            destination: ActiveValue::Set(tx.destination.clone()),
            account_id: ActiveValue::Set(tx.account_id.to_string()),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "transaction")?,
            kind: TransactionKind::try_from(model.kind.as_str())?,
            amount: parse_decimal(&model.amount, "amount")?,
            occurred_at: model.occurred_at,
            description: model.description,
            destination: model.destination,
            account_id: parse_uuid(&model.account_id, "account")?,
        })
    }
}

pub(crate) async fn save<C: ConnectionTrait>(conn: &C, tx: &Transaction) -> ResultEngine<()> {
    ActiveModel::from(tx).insert(conn).await?;
    Ok(())
}

pub(crate) async fn get_by_id<C: ConnectionTrait>(conn: &C, id: Uuid) -> ResultEngine<Transaction> {
    Entity::find_by_id(id.to_string())
        .one(conn)
        .await?
        .ok_or_else(|| EngineError::NotFound(format!("transaction {id}")))?
        .try_into()
}

/// List transactions oldest first, optionally restricted to one source
/// account.
pub(crate) async fn list<C: ConnectionTrait>(
    conn: &C,
    account_id: Option<Uuid>,
) -> ResultEngine<Vec<Transaction>> {
    let mut query = Entity::find()
        .order_by_asc(Column::OccurredAt)
        .order_by_asc(Column::Id);
    if let Some(account_id) = account_id {
        query = query.filter(Column::AccountId.eq(account_id.to_string()));
    }
    query
        .all(conn)
        .await?
        .into_iter()
        .map(Transaction::try_from)
        .collect()
}

pub(crate) async fn delete_for_account<C: ConnectionTrait>(
    conn: &C,
    account_id: Uuid,
) -> ResultEngine<u64> {
    let result = Entity::delete_many()
        .filter(Column::AccountId.eq(account_id.to_string()))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}
