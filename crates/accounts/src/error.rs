//! Ledger error taxonomy.

use thiserror::Error;

use malvader_core::{DomainError, Money};

use crate::account::AccountNumber;

/// Failures of ledger operations.
///
/// Every variant is recoverable: the shell reports it and returns to the menu.
/// Lookup misses are not errors (`find_*` return `Option`).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("an account with tax id {tax_id} already exists")]
    DuplicateIdentity { tax_id: String },

    #[error("invalid amount: {amount}")]
    InvalidAmount { amount: Money },

    #[error("insufficient funds in account {number}: requested {requested}, available {available}")]
    InsufficientFunds {
        number: AccountNumber,
        requested: Money,
        available: Money,
    },

    #[error("account {0} not found")]
    AccountNotFound(AccountNumber),

    #[error("account {0} not found or closed")]
    AccountNotFoundOrClosed(AccountNumber),

    #[error("credit limit {credit_limit} does not cover the balance of account {number} ({balance})")]
    CreditLimitBelowOverdraft {
        number: AccountNumber,
        balance: Money,
        credit_limit: Money,
    },

    #[error("account {number} can only be closed with a zero balance (balance: {balance})")]
    NonZeroBalance { number: AccountNumber, balance: Money },

    #[error("source and destination are the same account ({0})")]
    SameAccount(AccountNumber),

    #[error("ledger is full ({capacity} accounts)")]
    CapacityExceeded { capacity: usize },

    #[error(transparent)]
    Domain(#[from] DomainError),
}
