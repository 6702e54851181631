use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use malvader_core::{DomainError, DomainResult, Entity};

/// Maximum lengths (in characters) of the customer text fields.
pub mod limits {
    pub const FULL_NAME: usize = 49;
    pub const EMAIL: usize = 49;
    pub const TAX_ID: usize = 19;
    pub const PHONE: usize = 19;
    pub const BIRTH_DATE: usize = 19;
    pub const BRANCH: usize = 19;
}

/// Sequential customer identifier (1-based).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(pub u32);

impl core::fmt::Display for CustomerId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Lifecycle of a customer's account relationship.
///
/// `Active -> Closed` is the only transition; `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomerStatus {
    Active,
    Closed,
}

impl CustomerStatus {
    pub fn label(self) -> &'static str {
        match self {
            CustomerStatus::Active => "ACTIVE",
            CustomerStatus::Closed => "CLOSED",
        }
    }
}

/// Registration input: the customer text fields as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCustomer {
    pub full_name: String,
    pub email: String,
    /// CPF; unique across the ledger.
    pub tax_id: String,
    pub phone: String,
    pub birth_date: String,
    pub branch: String,
}

impl NewCustomer {
    /// Presence and length checks only; formats are not inspected.
    pub fn validate(&self) -> DomainResult<()> {
        validate_field("name", &self.full_name, limits::FULL_NAME)?;
        validate_field("email", &self.email, limits::EMAIL)?;
        validate_field("tax id", &self.tax_id, limits::TAX_ID)?;
        validate_field("phone", &self.phone, limits::PHONE)?;
        validate_field("birth date", &self.birth_date, limits::BIRTH_DATE)?;
        validate_field("branch", &self.branch, limits::BRANCH)?;
        Ok(())
    }
}

/// Rejects blank values and values longer than `max_chars` characters.
pub fn validate_field(field: &str, value: &str, max_chars: usize) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    if value.chars().count() > max_chars {
        return Err(DomainError::validation(format!(
            "{field} cannot be longer than {max_chars} characters"
        )));
    }
    Ok(())
}

/// Entity: the owner of exactly one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    id: CustomerId,
    full_name: String,
    email: String,
    tax_id: String,
    phone: String,
    birth_date: String,
    branch: String,
    registered_at: DateTime<Utc>,
    status: CustomerStatus,
}

impl Customer {
    pub(crate) fn register(id: CustomerId, details: NewCustomer, registered_at: DateTime<Utc>) -> Self {
        Self {
            id,
            full_name: details.full_name,
            email: details.email,
            tax_id: details.tax_id,
            phone: details.phone,
            birth_date: details.birth_date,
            branch: details.branch,
            registered_at,
            status: CustomerStatus::Active,
        }
    }

    /// Placeholder owner for an account aggregate that has not been opened yet.
    pub(crate) fn unregistered() -> Self {
        Self::register(CustomerId(0), NewCustomer::default(), DateTime::<Utc>::default())
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn tax_id(&self) -> &str {
        &self.tax_id
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn birth_date(&self) -> &str {
        &self.birth_date
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    pub fn registered_at(&self) -> DateTime<Utc> {
        self.registered_at
    }

    pub fn status(&self) -> CustomerStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == CustomerStatus::Active
    }

    pub(crate) fn set_contact(&mut self, phone: &str, branch: &str) {
        self.phone = phone.to_string();
        self.branch = branch.to_string();
    }

    pub(crate) fn close(&mut self) {
        self.status = CustomerStatus::Closed;
    }
}

impl Entity for Customer {
    type Id = CustomerId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_customer;

    #[test]
    fn valid_customer_passes_validation() {
        assert!(sample_customer("111").validate().is_ok());
    }

    #[test]
    fn blank_field_is_rejected() {
        let mut details = sample_customer("111");
        details.email = "   ".to_string();

        let err = details.validate().unwrap_err();
        assert_eq!(err, DomainError::validation("email cannot be empty"));
    }

    #[test]
    fn over_long_field_is_rejected() {
        let mut details = sample_customer("111");
        details.tax_id = "1".repeat(limits::TAX_ID + 1);

        match details.validate().unwrap_err() {
            DomainError::Validation(msg) => assert!(msg.contains("tax id")),
            other => panic!("Expected Validation error, got {other:?}"),
        }
    }

    #[test]
    fn length_is_counted_in_characters() {
        let name = "é".repeat(limits::FULL_NAME);
        assert!(validate_field("name", &name, limits::FULL_NAME).is_ok());
    }

    #[test]
    fn registered_customer_starts_active() {
        let customer = Customer::register(CustomerId(1), sample_customer("111"), Utc::now());
        assert_eq!(customer.status(), CustomerStatus::Active);
        assert!(customer.is_active());
        assert_eq!(*customer.id(), CustomerId(1));
        assert_eq!(customer.tax_id(), "111");
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&CustomerStatus::Closed).unwrap(), "\"closed\"");
    }
}
