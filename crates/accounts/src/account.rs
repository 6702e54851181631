use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use malvader_core::{Aggregate, AggregateRoot, DomainError, Money};
use malvader_events::Event;

use crate::customer::{limits, validate_field, Customer, CustomerId, CustomerStatus, NewCustomer};
use crate::error::LedgerError;

/// Sequential account number (1-based, creation order).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountNumber(pub u32);

impl core::fmt::Display for AccountNumber {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Aggregate root: Account, with its owner embedded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    number: AccountNumber,
    owner: Customer,
    balance: Money,
    credit_limit: Money,
    version: u64,
    created: bool,
}

impl Account {
    /// Create an empty, not-yet-opened aggregate instance.
    pub fn empty(number: AccountNumber) -> Self {
        Self {
            number,
            owner: Customer::unregistered(),
            balance: Money::ZERO,
            credit_limit: Money::ZERO,
            version: 0,
            created: false,
        }
    }

    pub fn number(&self) -> AccountNumber {
        self.number
    }

    pub fn owner(&self) -> &Customer {
        &self.owner
    }

    pub fn status(&self) -> CustomerStatus {
        self.owner.status()
    }

    pub fn balance(&self) -> Money {
        self.balance
    }

    pub fn credit_limit(&self) -> Money {
        self.credit_limit
    }

    /// Balance plus credit limit: the ceiling for withdrawals and transfers.
    pub fn total_available(&self) -> Money {
        Money::from_cents(self.balance.cents().saturating_add(self.credit_limit.cents()))
    }

    /// Only active accounts accept deposits, withdrawals and updates.
    pub fn is_active(&self) -> bool {
        self.created && self.owner.is_active()
    }
}

impl AggregateRoot for Account {
    type Id = AccountNumber;

    fn id(&self) -> &Self::Id {
        &self.number
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: OpenAccount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenAccount {
    pub number: AccountNumber,
    pub customer_id: CustomerId,
    pub customer: NewCustomer,
    pub credit_limit: Money,
    pub occurred_at: DateTime<Utc>,
}

/// Command: Deposit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deposit {
    pub amount: Money,
    /// Source account when the deposit is the credit leg of a transfer.
    pub counterparty: Option<AccountNumber>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: Withdraw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Withdraw {
    pub amount: Money,
    /// Destination account when the withdrawal is the debit leg of a transfer.
    pub counterparty: Option<AccountNumber>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: UpdateContact (phone and branch only).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateContact {
    pub phone: String,
    pub branch: String,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ChangeCreditLimit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeCreditLimit {
    pub credit_limit: Money,
    pub occurred_at: DateTime<Utc>,
}

/// Command: CloseAccount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloseAccount {
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountCommand {
    OpenAccount(OpenAccount),
    Deposit(Deposit),
    Withdraw(Withdraw),
    UpdateContact(UpdateContact),
    ChangeCreditLimit(ChangeCreditLimit),
    CloseAccount(CloseAccount),
}

/// Event: AccountOpened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountOpened {
    pub number: AccountNumber,
    pub customer_id: CustomerId,
    pub customer: NewCustomer,
    pub credit_limit: Money,
    pub occurred_at: DateTime<Utc>,
}

/// Event: Deposited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deposited {
    pub number: AccountNumber,
    pub amount: Money,
    pub balance_after: Money,
    pub counterparty: Option<AccountNumber>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: Withdrawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Withdrawn {
    pub number: AccountNumber,
    pub amount: Money,
    pub balance_after: Money,
    pub counterparty: Option<AccountNumber>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ContactUpdated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactUpdated {
    pub number: AccountNumber,
    pub phone: String,
    pub branch: String,
    pub occurred_at: DateTime<Utc>,
}

/// Event: CreditLimitChanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditLimitChanged {
    pub number: AccountNumber,
    pub credit_limit: Money,
    pub occurred_at: DateTime<Utc>,
}

/// Event: AccountClosed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountClosed {
    pub number: AccountNumber,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountEvent {
    AccountOpened(AccountOpened),
    Deposited(Deposited),
    Withdrawn(Withdrawn),
    ContactUpdated(ContactUpdated),
    CreditLimitChanged(CreditLimitChanged),
    AccountClosed(AccountClosed),
}

impl Event for AccountEvent {
    fn event_type(&self) -> &'static str {
        match self {
            AccountEvent::AccountOpened(_) => "accounts.account.opened",
            AccountEvent::Deposited(_) => "accounts.account.deposited",
            AccountEvent::Withdrawn(_) => "accounts.account.withdrawn",
            AccountEvent::ContactUpdated(_) => "accounts.account.contact_updated",
            AccountEvent::CreditLimitChanged(_) => "accounts.account.credit_limit_changed",
            AccountEvent::AccountClosed(_) => "accounts.account.closed",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            AccountEvent::AccountOpened(e) => e.occurred_at,
            AccountEvent::Deposited(e) => e.occurred_at,
            AccountEvent::Withdrawn(e) => e.occurred_at,
            AccountEvent::ContactUpdated(e) => e.occurred_at,
            AccountEvent::CreditLimitChanged(e) => e.occurred_at,
            AccountEvent::AccountClosed(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Account {
    type Command = AccountCommand;
    type Event = AccountEvent;
    type Error = LedgerError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            AccountEvent::AccountOpened(e) => {
                self.number = e.number;
                self.owner = Customer::register(e.customer_id, e.customer.clone(), e.occurred_at);
                self.balance = Money::ZERO;
                self.credit_limit = e.credit_limit;
                self.created = true;
            }
            AccountEvent::Deposited(e) => {
                self.balance = e.balance_after;
            }
            AccountEvent::Withdrawn(e) => {
                self.balance = e.balance_after;
            }
            AccountEvent::ContactUpdated(e) => {
                self.owner.set_contact(&e.phone, &e.branch);
            }
            AccountEvent::CreditLimitChanged(e) => {
                self.credit_limit = e.credit_limit;
            }
            AccountEvent::AccountClosed(_) => {
                self.owner.close();
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            AccountCommand::OpenAccount(cmd) => self.handle_open(cmd),
            AccountCommand::Deposit(cmd) => self.handle_deposit(cmd),
            AccountCommand::Withdraw(cmd) => self.handle_withdraw(cmd),
            AccountCommand::UpdateContact(cmd) => self.handle_update_contact(cmd),
            AccountCommand::ChangeCreditLimit(cmd) => self.handle_change_credit_limit(cmd),
            AccountCommand::CloseAccount(cmd) => self.handle_close(cmd),
        }
    }
}

impl Account {
    fn ensure_active(&self) -> Result<(), LedgerError> {
        if !self.is_active() {
            return Err(LedgerError::AccountNotFoundOrClosed(self.number));
        }
        Ok(())
    }

    /// The resulting total must stay representable.
    fn ensure_total_fits(balance: Money, credit_limit: Money) -> Result<(), LedgerError> {
        balance.checked_add(credit_limit)?;
        Ok(())
    }

    fn handle_open(&self, cmd: &OpenAccount) -> Result<Vec<AccountEvent>, LedgerError> {
        if self.created {
            return Err(DomainError::conflict("account already exists").into());
        }
        cmd.customer.validate()?;
        if cmd.credit_limit.is_negative() {
            return Err(LedgerError::InvalidAmount {
                amount: cmd.credit_limit,
            });
        }

        Ok(vec![AccountEvent::AccountOpened(AccountOpened {
            number: cmd.number,
            customer_id: cmd.customer_id,
            customer: cmd.customer.clone(),
            credit_limit: cmd.credit_limit,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_deposit(&self, cmd: &Deposit) -> Result<Vec<AccountEvent>, LedgerError> {
        self.ensure_active()?;

        if !cmd.amount.is_positive() {
            return Err(LedgerError::InvalidAmount { amount: cmd.amount });
        }

        let balance_after = self.balance.checked_add(cmd.amount)?;
        Self::ensure_total_fits(balance_after, self.credit_limit)?;

        Ok(vec![AccountEvent::Deposited(Deposited {
            number: self.number,
            amount: cmd.amount,
            balance_after,
            counterparty: cmd.counterparty,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_withdraw(&self, cmd: &Withdraw) -> Result<Vec<AccountEvent>, LedgerError> {
        self.ensure_active()?;

        if !cmd.amount.is_positive() {
            return Err(LedgerError::InvalidAmount { amount: cmd.amount });
        }

        let available = self.total_available();
        if cmd.amount > available {
            return Err(LedgerError::InsufficientFunds {
                number: self.number,
                requested: cmd.amount,
                available,
            });
        }

        let balance_after = self.balance.checked_sub(cmd.amount)?;

        Ok(vec![AccountEvent::Withdrawn(Withdrawn {
            number: self.number,
            amount: cmd.amount,
            balance_after,
            counterparty: cmd.counterparty,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_update_contact(&self, cmd: &UpdateContact) -> Result<Vec<AccountEvent>, LedgerError> {
        self.ensure_active()?;

        validate_field("phone", &cmd.phone, limits::PHONE)?;
        validate_field("branch", &cmd.branch, limits::BRANCH)?;

        Ok(vec![AccountEvent::ContactUpdated(ContactUpdated {
            number: self.number,
            phone: cmd.phone.clone(),
            branch: cmd.branch.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_change_credit_limit(
        &self,
        cmd: &ChangeCreditLimit,
    ) -> Result<Vec<AccountEvent>, LedgerError> {
        self.ensure_active()?;

        if cmd.credit_limit.is_negative() {
            return Err(LedgerError::InvalidAmount {
                amount: cmd.credit_limit,
            });
        }
        // The balance may never end up below -credit_limit.
        if self.balance.checked_add(cmd.credit_limit)?.is_negative() {
            return Err(LedgerError::CreditLimitBelowOverdraft {
                number: self.number,
                balance: self.balance,
                credit_limit: cmd.credit_limit,
            });
        }

        Ok(vec![AccountEvent::CreditLimitChanged(CreditLimitChanged {
            number: self.number,
            credit_limit: cmd.credit_limit,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_close(&self, cmd: &CloseAccount) -> Result<Vec<AccountEvent>, LedgerError> {
        if !self.created {
            return Err(LedgerError::AccountNotFound(self.number));
        }
        self.ensure_active()?;

        if !self.balance.is_zero() {
            return Err(LedgerError::NonZeroBalance {
                number: self.number,
                balance: self.balance,
            });
        }

        Ok(vec![AccountEvent::AccountClosed(AccountClosed {
            number: self.number,
            occurred_at: cmd.occurred_at,
        })])
    }
}
