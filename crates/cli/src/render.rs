//! Text rendering of accounts and ledger failures.

use chrono::Local;

use malvader_accounts::{Account, LedgerError};
use malvader_core::DomainError;

pub fn account_details(account: &Account) -> String {
    let owner = account.owner();
    let registered = owner.registered_at().with_timezone(&Local).format("%d/%m/%Y");

    format!(
        "\n--- Account details ---\n\
         Account number: {number}\n\
         Name: {name}\n\
         CPF: {tax_id}\n\
         Phone: {phone}\n\
         Branch: {branch}\n\
         Status: {status}\n\
         Registered on: {registered}\n\
         Balance: {balance}\n\
         Total available: {available}\n\
         -----------------------",
        number = account.number(),
        name = owner.full_name(),
        tax_id = owner.tax_id(),
        phone = owner.phone(),
        branch = owner.branch(),
        status = owner.status().label(),
        balance = account.balance(),
        available = account.total_available(),
    )
}

/// User-facing message for a rejected operation.
pub fn error_message(err: &LedgerError) -> String {
    match err {
        LedgerError::DuplicateIdentity { .. } => "An account with this CPF already exists.".to_string(),
        LedgerError::InvalidAmount { .. } => "Invalid amount.".to_string(),
        LedgerError::InsufficientFunds { available, .. } => {
            format!("Insufficient funds (available: {available}).")
        }
        LedgerError::AccountNotFound(_) => "Account not found.".to_string(),
        LedgerError::AccountNotFoundOrClosed(number) => {
            format!("Account {number} not found or closed.")
        }
        LedgerError::CreditLimitBelowOverdraft { balance, .. } => {
            format!("The credit limit must cover the current balance ({balance}).")
        }
        LedgerError::NonZeroBalance { .. } => {
            "An account can only be closed when its balance is zero.".to_string()
        }
        LedgerError::SameAccount(_) => {
            "Source and destination must be different accounts.".to_string()
        }
        LedgerError::CapacityExceeded { capacity } => {
            format!("The bank cannot open more accounts (limit: {capacity}).")
        }
        LedgerError::Domain(DomainError::Validation(msg)) => format!("Invalid data: {msg}."),
        LedgerError::Domain(other) => format!("Operation failed: {other}."),
    }
}
