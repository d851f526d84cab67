use sea_orm::DatabaseConnection;

use crate::ResultEngine;

mod accounts;
mod customers;
mod ledger;
mod transactions;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
///
/// The rollback happens when the uncommitted `DatabaseTransaction` is dropped.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Entry point of the back office: owns the database handle and is the only
/// component allowed to change account balances.
///
/// Share it behind an `Arc` across tasks; every operation opens
/// its own database transaction. The connection is not handed back out:
///
/// ```compile_fail
/// fn raw(engine: &engine::Engine) -> &sea_orm::DatabaseConnection {
///     engine.database()
/// }
/// ```
#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
        })
    }
}
