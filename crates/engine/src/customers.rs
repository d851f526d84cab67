//! The module contains `Customer`, the owner of one or more accounts.

use sea_orm::{ActiveValue, ConnectionTrait, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, util::parse_uuid};

/// A bank customer.
///
/// The ledger only needs to know that a customer exists when an account is
/// opened; everything else about customers lives outside the engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: Uuid,
    pub full_name: String,
    pub email: Option<String>,
}

impl Customer {
    pub fn new(full_name: String, email: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            full_name,
            email,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "customers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub full_name: String,
    pub email: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::accounts::Entity")]
    Accounts,
}

impl Related<super::accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Accounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Customer> for ActiveModel {
    fn from(value: &Customer) -> Self {
        Self {
            id: ActiveValue::Set(value.id.to_string()),
            full_name: ActiveValue::Set(value.full_name.clone()),
            email: ActiveValue::Set(value.email.clone()),
        }
    }
}

impl TryFrom<Model> for Customer {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "customer")?,
            full_name: model.full_name,
            email: model.email,
        })
    }
}

pub(crate) async fn insert<C: ConnectionTrait>(conn: &C, customer: &Customer) -> ResultEngine<()> {
    ActiveModel::from(customer).insert(conn).await?;
    Ok(())
}

pub(crate) async fn get_by_id<C: ConnectionTrait>(conn: &C, id: Uuid) -> ResultEngine<Customer> {
    Entity::find_by_id(id.to_string())
        .one(conn)
        .await?
        .ok_or_else(|| EngineError::NotFound(format!("customer {id}")))?
        .try_into()
}

pub(crate) async fn exists_by_id<C: ConnectionTrait>(conn: &C, id: Uuid) -> ResultEngine<bool> {
    Ok(Entity::find_by_id(id.to_string()).one(conn).await?.is_some())
}
