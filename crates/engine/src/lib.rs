//! Ledger engine of the bank back office.
//!
//! The [`Engine`] owns the database handle and is the only way to change an
//! account balance: deposits, withdrawals and transfers go through
//! [`Engine::create_transaction`], which validates the request, computes the
//! new balances and persists them together with one [`Transaction`] record
//! inside a single database transaction.
//!
//! Around the ledger sit the account lifecycle operations (open, change
//! status, close, delete) and read access to customers, accounts and
//! transactions.

pub use accounts::{Account, AccountKind, AccountStatus};
pub use commands::{NewAccount, NewCustomer, TransactionRequest};
pub use customers::Customer;
pub use error::{EngineError, ErrorKind};
pub use ledger::Postings;
pub use ops::{Engine, EngineBuilder};
pub use transactions::{Transaction, TransactionKind};
pub use validation::CheckedTransaction;

pub mod accounts;
mod commands;
pub mod customers;
mod error;
pub mod guards;
pub mod ledger;
mod ops;
pub mod transactions;
mod util;
pub mod validation;

type ResultEngine<T> = Result<T, EngineError>;
