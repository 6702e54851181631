use chrono::{DateTime, Utc};

use malvader_core::{Aggregate, AggregateRoot, Money};
use malvader_events::Event;

use crate::account::{
    Account, AccountCommand, AccountEvent, AccountNumber, ChangeCreditLimit, CloseAccount, Deposit,
    OpenAccount, UpdateContact, Withdraw,
};
use crate::customer::{CustomerId, CustomerStatus, NewCustomer};
use crate::error::LedgerError;

/// Ledger settings. The defaults give an unbounded ledger with no overdraft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LedgerConfig {
    /// Maximum number of accounts (`None` = unbounded).
    pub max_accounts: Option<usize>,
    /// Credit limit given to newly registered accounts.
    pub default_credit_limit: Money,
}

/// Which accounts `Ledger::list` yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    Active,
    Closed,
    All,
}

impl StatusFilter {
    pub fn matches(self, status: CustomerStatus) -> bool {
        match self {
            StatusFilter::Active => status == CustomerStatus::Active,
            StatusFilter::Closed => status == CustomerStatus::Closed,
            StatusFilter::All => true,
        }
    }
}

/// The owning collection of every account and customer record.
///
/// Accounts are kept in creation order and never removed; closing an account
/// only flips its owner's status. All lookups take account numbers, so each
/// operation resolves and mutates its accounts in one call.
#[derive(Debug, Clone)]
pub struct Ledger {
    config: LedgerConfig,
    accounts: Vec<Account>,
    last_account_number: u32,
    last_customer_id: u32,
    clock: fn() -> DateTime<Utc>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(LedgerConfig::default())
    }
}

impl Ledger {
    pub fn new(config: LedgerConfig) -> Self {
        Self::with_clock(config, Utc::now)
    }

    /// Ledger whose registration dates and event timestamps come from `clock`.
    pub fn with_clock(config: LedgerConfig, clock: fn() -> DateTime<Utc>) -> Self {
        Self {
            config,
            accounts: Vec::new(),
            last_account_number: 0,
            last_customer_id: 0,
            clock,
        }
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Registers a new customer and opens their account.
    ///
    /// Nothing is stored and no counter moves when registration fails.
    pub fn register(&mut self, customer: NewCustomer) -> Result<&Account, LedgerError> {
        let result = self.try_register(customer);
        if let Err(err) = &result {
            tracing::warn!(error = %err, "registration rejected");
        }
        result
    }

    fn try_register(&mut self, customer: NewCustomer) -> Result<&Account, LedgerError> {
        if self.is_tax_id_registered(&customer.tax_id) {
            return Err(LedgerError::DuplicateIdentity {
                tax_id: customer.tax_id,
            });
        }
        if let Some(capacity) = self.config.max_accounts {
            if self.accounts.len() >= capacity {
                return Err(LedgerError::CapacityExceeded { capacity });
            }
        }

        let number = AccountNumber(self.last_account_number + 1);
        let customer_id = CustomerId(self.last_customer_id + 1);

        let mut account = Account::empty(number);
        let events = account.handle(&AccountCommand::OpenAccount(OpenAccount {
            number,
            customer_id,
            customer,
            credit_limit: self.config.default_credit_limit,
            occurred_at: (self.clock)(),
        }))?;
        apply_all(&mut account, &events);

        self.last_account_number = number.0;
        self.last_customer_id = customer_id.0;
        let idx = self.accounts.len();
        self.accounts.push(account);

        tracing::info!(account = %number, customer = %customer_id, "account registered");
        Ok(&self.accounts[idx])
    }

    /// Whether any account, active or closed, belongs to this tax id.
    pub fn is_tax_id_registered(&self, tax_id: &str) -> bool {
        self.find_by_tax_id(tax_id).is_some()
    }

    pub fn find_by_number(&self, number: AccountNumber) -> Option<&Account> {
        self.accounts.iter().find(|account| account.number() == number)
    }

    pub fn find_by_tax_id(&self, tax_id: &str) -> Option<&Account> {
        self.accounts
            .iter()
            .find(|account| account.owner().tax_id() == tax_id)
    }

    pub fn withdraw(&mut self, number: AccountNumber, amount: Money) -> Result<&Account, LedgerError> {
        let occurred_at = (self.clock)();
        self.execute(
            "withdraw",
            number,
            AccountCommand::Withdraw(Withdraw {
                amount,
                counterparty: None,
                occurred_at,
            }),
        )
    }

    pub fn deposit(&mut self, number: AccountNumber, amount: Money) -> Result<&Account, LedgerError> {
        let occurred_at = (self.clock)();
        self.execute(
            "deposit",
            number,
            AccountCommand::Deposit(Deposit {
                amount,
                counterparty: None,
                occurred_at,
            }),
        )
    }

    /// Moves `amount` from `source` to `destination`.
    ///
    /// Both legs are decided before either is applied: a rejected leg leaves
    /// both accounts untouched.
    pub fn transfer(
        &mut self,
        source: AccountNumber,
        destination: AccountNumber,
        amount: Money,
    ) -> Result<(&Account, &Account), LedgerError> {
        let result = self.try_transfer(source, destination, amount);
        if let Err(err) = &result {
            tracing::warn!(%source, %destination, error = %err, "transfer rejected");
        }
        let (src, dst) = result?;

        tracing::info!(%source, %destination, %amount, "transfer completed");
        Ok((&self.accounts[src], &self.accounts[dst]))
    }

    fn try_transfer(
        &mut self,
        source: AccountNumber,
        destination: AccountNumber,
        amount: Money,
    ) -> Result<(usize, usize), LedgerError> {
        let src = self.active_index(source)?;
        let dst = self.active_index(destination)?;
        if src == dst {
            return Err(LedgerError::SameAccount(source));
        }

        let occurred_at = (self.clock)();
        let debit = self.accounts[src].handle(&AccountCommand::Withdraw(Withdraw {
            amount,
            counterparty: Some(destination),
            occurred_at,
        }))?;
        let credit = self.accounts[dst].handle(&AccountCommand::Deposit(Deposit {
            amount,
            counterparty: Some(source),
            occurred_at,
        }))?;

        apply_all(&mut self.accounts[src], &debit);
        apply_all(&mut self.accounts[dst], &credit);
        Ok((src, dst))
    }

    /// Closes an account whose balance is exactly zero. Closed is terminal.
    pub fn close(&mut self, number: AccountNumber) -> Result<&Account, LedgerError> {
        let occurred_at = (self.clock)();
        let command = AccountCommand::CloseAccount(CloseAccount { occurred_at });

        let Some(idx) = self.index_of(number) else {
            let err = LedgerError::AccountNotFound(number);
            tracing::warn!(account = %number, error = %err, "close rejected");
            return Err(err);
        };
        self.execute_at("close", idx, command)
    }

    /// Overwrites the owner's phone and branch; nothing else changes.
    pub fn update_contact_info(
        &mut self,
        number: AccountNumber,
        phone: &str,
        branch: &str,
    ) -> Result<&Account, LedgerError> {
        let occurred_at = (self.clock)();
        self.execute(
            "update_contact_info",
            number,
            AccountCommand::UpdateContact(UpdateContact {
                phone: phone.to_string(),
                branch: branch.to_string(),
                occurred_at,
            }),
        )
    }

    /// Sets the overdraft allowance of an active account (not exposed on the menu).
    pub fn set_credit_limit(
        &mut self,
        number: AccountNumber,
        credit_limit: Money,
    ) -> Result<&Account, LedgerError> {
        let occurred_at = (self.clock)();
        self.execute(
            "set_credit_limit",
            number,
            AccountCommand::ChangeCreditLimit(ChangeCreditLimit {
                credit_limit,
                occurred_at,
            }),
        )
    }

    /// Accounts matching `filter`, in creation order. Each call starts over.
    pub fn list(&self, filter: StatusFilter) -> impl Iterator<Item = &Account> + '_ {
        self.accounts
            .iter()
            .filter(move |account| filter.matches(account.status()))
    }

    fn index_of(&self, number: AccountNumber) -> Option<usize> {
        self.accounts
            .iter()
            .position(|account| account.number() == number)
    }

    fn active_index(&self, number: AccountNumber) -> Result<usize, LedgerError> {
        self.index_of(number)
            .filter(|&idx| self.accounts[idx].is_active())
            .ok_or(LedgerError::AccountNotFoundOrClosed(number))
    }

    /// Resolves an active account, then runs `command` against it.
    fn execute(
        &mut self,
        operation: &'static str,
        number: AccountNumber,
        command: AccountCommand,
    ) -> Result<&Account, LedgerError> {
        match self.active_index(number) {
            Ok(idx) => self.execute_at(operation, idx, command),
            Err(err) => {
                tracing::warn!(operation, account = %number, error = %err, "operation rejected");
                Err(err)
            }
        }
    }

    fn execute_at(
        &mut self,
        operation: &'static str,
        idx: usize,
        command: AccountCommand,
    ) -> Result<&Account, LedgerError> {
        let account = &mut self.accounts[idx];
        let number = account.number();

        match account.handle(&command) {
            Ok(events) => {
                apply_all(account, &events);
                tracing::info!(operation, account = %number, balance = %account.balance(), "operation completed");
                Ok(&*account)
            }
            Err(err) => {
                tracing::warn!(operation, account = %number, error = %err, "operation rejected");
                Err(err)
            }
        }
    }
}

fn apply_all(account: &mut Account, events: &[AccountEvent]) {
    for event in events {
        account.apply(event);
        tracing::debug!(
            account = %account.number(),
            event_type = event.event_type(),
            version = account.version(),
            "applied account event"
        );
    }
}
