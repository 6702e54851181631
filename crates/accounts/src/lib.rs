//! Accounts module: customers, bank accounts and the in-memory ledger.
//!
//! Pure domain logic only: no terminal I/O, no persistence.

pub mod account;
pub mod customer;
pub mod error;
pub mod ledger;

pub use account::{
    Account, AccountClosed, AccountCommand, AccountEvent, AccountNumber, AccountOpened,
    ChangeCreditLimit, CloseAccount, ContactUpdated, CreditLimitChanged, Deposit, Deposited,
    OpenAccount, UpdateContact, Withdraw, Withdrawn,
};
pub use customer::{Customer, CustomerId, CustomerStatus, NewCustomer, limits};
pub use error::LedgerError;
pub use ledger::{Ledger, LedgerConfig, StatusFilter};

#[cfg(test)]
pub(crate) mod test_support {
    use crate::customer::NewCustomer;

    pub(crate) fn sample_customer(tax_id: &str) -> NewCustomer {
        NewCustomer {
            full_name: "Maria Silva".to_string(),
            email: "maria@example.com".to_string(),
            tax_id: tax_id.to_string(),
            phone: "61 99999-0000".to_string(),
            birth_date: "01/02/1990".to_string(),
            branch: "0001".to_string(),
        }
    }
}
