//! Interactive menu loop driving the ledger.

use std::io::{BufRead, Write};

use malvader_accounts::{limits, Account, AccountNumber, Ledger, NewCustomer};

use crate::config::ShellConfig;
use crate::menu::{self, MenuOption};
use crate::prompt::{PromptError, PromptResult, Prompter};
use crate::render::{account_details, error_message};

/// What the loop does after handling one menu choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

/// One terminal session over one ledger.
///
/// Ledger failures are printed and the menu comes back; only I/O failures end
/// the session with an error. End of input ends it cleanly.
pub struct Shell<R, W> {
    ledger: Ledger,
    prompter: Prompter<R, W>,
    config: ShellConfig,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(config: ShellConfig, input: R, output: W) -> Self {
        Self {
            ledger: Ledger::new(config.ledger),
            prompter: Prompter::new(input, output),
            config,
        }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn into_output(self) -> W {
        self.prompter.into_output()
    }

    pub fn run(&mut self) -> PromptResult<()> {
        loop {
            match self.step() {
                Ok(Flow::Continue) => {}
                Ok(Flow::Exit) => break,
                Err(PromptError::InputClosed) => {
                    tracing::info!("input closed; ending session");
                    self.prompter.say("")?;
                    break;
                }
                Err(err) => return Err(err),
            }
        }
        self.prompter.flush()
    }

    fn step(&mut self) -> PromptResult<Flow> {
        self.prompter.say(menu::render(&self.config.bank_name))?;
        let choice: i64 = self.prompter.integer("Choose an option: ")?;

        let Some(option) = MenuOption::from_choice(choice) else {
            self.prompter.say("Invalid option.")?;
            self.pause()?;
            return Ok(Flow::Continue);
        };

        match option {
            MenuOption::CreateAccount => self.create_account()?,
            MenuOption::Withdraw => self.withdraw()?,
            MenuOption::Deposit => self.deposit()?,
            MenuOption::Transfer => self.transfer()?,
            MenuOption::Query => self.query()?,
            MenuOption::UpdateContact => self.update_contact()?,
            MenuOption::List => self.list()?,
            MenuOption::Close => self.close()?,
            MenuOption::Exit => {
                let confirm: i64 = self
                    .prompter
                    .integer("Are you sure you want to exit? (1 = yes / 0 = no): ")?;
                if confirm == 1 {
                    self.prompter.say("Shutting down...")?;
                    return Ok(Flow::Exit);
                }
                return Ok(Flow::Continue);
            }
        }

        self.pause()?;
        Ok(Flow::Continue)
    }

    fn pause(&mut self) -> PromptResult<()> {
        self.prompter.flush()?;
        if !self.config.pause.is_zero() {
            std::thread::sleep(self.config.pause);
        }
        Ok(())
    }

    /// `None` for numbers no account can carry (negative or out of range).
    fn account_number(&mut self, label: &str) -> PromptResult<Option<AccountNumber>> {
        let raw: i64 = self.prompter.integer(label)?;
        Ok(u32::try_from(raw).ok().map(AccountNumber))
    }

    fn active_account_number(&mut self, label: &str) -> PromptResult<Option<AccountNumber>> {
        let number = self.account_number(label)?;
        Ok(number.filter(|&number| self.is_active(number)))
    }

    fn is_active(&self, number: AccountNumber) -> bool {
        self.ledger
            .find_by_number(number)
            .is_some_and(Account::is_active)
    }

    fn create_account(&mut self) -> PromptResult<()> {
        self.prompter.say("Enter the customer details:")?;
        let full_name = self.prompter.text("Name: ", "name", limits::FULL_NAME)?;
        let email = self.prompter.text("E-mail: ", "e-mail", limits::EMAIL)?;
        let tax_id = self.prompter.text("CPF: ", "CPF", limits::TAX_ID)?;

        if self.ledger.is_tax_id_registered(&tax_id) {
            return self.prompter.say("An account with this CPF already exists.");
        }

        let phone = self.prompter.text("Phone: ", "phone", limits::PHONE)?;
        let branch = self.prompter.text("Branch: ", "branch", limits::BRANCH)?;
        let birth_date = self
            .prompter
            .text("Birth date: ", "birth date", limits::BIRTH_DATE)?;

        let customer = NewCustomer {
            full_name,
            email,
            tax_id,
            phone,
            birth_date,
            branch,
        };

        match self.ledger.register(customer) {
            Ok(account) => {
                let details = account_details(account);
                self.prompter.say("\nAccount created successfully!")?;
                self.prompter.say(details)
            }
            Err(err) => self.prompter.say(error_message(&err)),
        }
    }

    fn withdraw(&mut self) -> PromptResult<()> {
        let Some(number) = self.active_account_number("Account number: ")? else {
            return self.prompter.say("Account not found or closed.");
        };

        let amount = self.prompter.amount("Withdrawal amount: ")?;
        let message = match self.ledger.withdraw(number, amount) {
            Ok(account) => format!("Withdrawal completed. New balance: {}.", account.balance()),
            Err(err) => error_message(&err),
        };
        self.prompter.say(message)
    }

    fn deposit(&mut self) -> PromptResult<()> {
        let Some(number) = self.active_account_number("Account number: ")? else {
            return self.prompter.say("Account not found or closed.");
        };

        let amount = self.prompter.amount("Deposit amount: ")?;
        let message = match self.ledger.deposit(number, amount) {
            Ok(account) => format!("Deposit completed. New balance: {}.", account.balance()),
            Err(err) => error_message(&err),
        };
        self.prompter.say(message)
    }

    fn transfer(&mut self) -> PromptResult<()> {
        let source = self.active_account_number("Source account: ")?;
        let destination = self.active_account_number("Destination account: ")?;
        let (Some(source), Some(destination)) = (source, destination) else {
            return self.prompter.say("Invalid source or destination account.");
        };

        let amount = self.prompter.amount("Transfer amount: ")?;
        let message = match self.ledger.transfer(source, destination, amount) {
            Ok(_) => "Transfer completed.".to_string(),
            Err(err) => error_message(&err),
        };
        self.prompter.say(message)
    }

    fn query(&mut self) -> PromptResult<()> {
        let kind: i64 = self.prompter.integer("Query by (1) number or (2) CPF: ")?;
        let found = match kind {
            1 => {
                let number = self.account_number("Account number: ")?;
                number.and_then(|number| self.ledger.find_by_number(number))
            }
            2 => {
                let tax_id = self.prompter.line("CPF: ")?;
                self.ledger.find_by_tax_id(&tax_id)
            }
            _ => return self.prompter.say("Invalid option."),
        };

        let message = match found {
            Some(account) => account_details(account),
            None => "Account not found.".to_string(),
        };
        self.prompter.say(message)
    }

    fn update_contact(&mut self) -> PromptResult<()> {
        let Some(number) = self.active_account_number("Account number: ")? else {
            return self.prompter.say("Account not found or closed.");
        };

        let phone = self.prompter.text("New phone: ", "phone", limits::PHONE)?;
        let branch = self.prompter.text("New branch: ", "branch", limits::BRANCH)?;
        let message = match self.ledger.update_contact_info(number, &phone, &branch) {
            Ok(_) => "Customer details updated.".to_string(),
            Err(err) => error_message(&err),
        };
        self.prompter.say(message)
    }

    fn list(&mut self) -> PromptResult<()> {
        if self.ledger.is_empty() {
            return self.prompter.say("No accounts registered.");
        }

        let choice: i64 = self
            .prompter
            .integer("List (1) active, (2) closed, (3) all: ")?;
        let Some(filter) = menu::status_filter(choice) else {
            return self.prompter.say("Invalid option.");
        };

        let listing: Vec<String> = self.ledger.list(filter).map(account_details).collect();
        if listing.is_empty() {
            return self.prompter.say("No accounts match this filter.");
        }
        for details in listing {
            self.prompter.say(details)?;
        }
        Ok(())
    }

    fn close(&mut self) -> PromptResult<()> {
        let Some(number) = self.account_number("Account number: ")? else {
            return self.prompter.say("Account not found.");
        };
        let message = match self.ledger.close(number) {
            Ok(_) => "Account closed successfully.".to_string(),
            Err(err) => error_message(&err),
        };
        self.prompter.say(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use malvader_accounts::CustomerStatus;
    use malvader_core::Money;
    use std::io::Cursor;
    use std::time::Duration;

    fn run_session(script: &str) -> (Ledger, String) {
        run_session_with(ShellConfig::default(), script)
    }

    fn run_session_with(config: ShellConfig, script: &str) -> (Ledger, String) {
        run_script(config, script.as_bytes().to_vec())
    }

    fn run_script(config: ShellConfig, script: Vec<u8>) -> (Ledger, String) {
        let config = ShellConfig {
            pause: Duration::ZERO,
            ..config
        };
        let mut shell = Shell::new(config, Cursor::new(script), Vec::new());
        shell.run().unwrap();
        let ledger = shell.ledger().clone();
        let output = String::from_utf8(shell.into_output()).unwrap();
        (ledger, output)
    }

    fn create(tax_id: &str) -> String {
        format!("1\nMaria Silva\nmaria@example.com\n{tax_id}\n61 99999-0000\n0001\n01/02/1990\n")
    }

    #[test]
    fn create_deposit_withdraw_close_session() {
        let script = [
            create("111"),
            "3\n1\n100\n".to_string(),
            "2\n1\n150\n".to_string(),
            "2\n1\n100\n".to_string(),
            "8\n1\n".to_string(),
            "9\n1\n".to_string(),
        ]
        .concat();

        let (ledger, out) = run_session(&script);

        assert!(out.contains("Account created successfully!"));
        assert!(out.contains("Deposit completed. New balance: 100.00."));
        assert!(out.contains("Insufficient funds (available: 100.00)."));
        assert!(out.contains("Withdrawal completed. New balance: 0.00."));
        assert!(out.contains("Account closed successfully."));
        assert!(out.contains("Shutting down..."));

        let account = ledger.find_by_number(AccountNumber(1)).unwrap();
        assert_eq!(account.status(), CustomerStatus::Closed);
        assert_eq!(account.balance(), Money::ZERO);
    }

    #[test]
    fn duplicate_cpf_aborts_before_remaining_prompts() {
        let script = [create("111"), "1\nOther\no@example.com\n111\n".to_string(), "9\n1\n".to_string()].concat();

        let (ledger, out) = run_session(&script);

        assert!(out.contains("An account with this CPF already exists."));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn transfer_then_close_session() {
        let script = [
            create("111"),
            create("222"),
            "3\n1\n50\n".to_string(),
            "4\n1\n2\n50\n".to_string(),
            "8\n1\n".to_string(),
            "8\n2\n".to_string(),
            "9\n1\n".to_string(),
        ]
        .concat();

        let (ledger, out) = run_session(&script);

        assert!(out.contains("Transfer completed."));
        assert!(out.contains("Account closed successfully."));
        assert!(out.contains("An account can only be closed when its balance is zero."));
        assert_eq!(
            ledger.find_by_number(AccountNumber(2)).unwrap().balance(),
            Money::from_units(50).unwrap()
        );
    }

    #[test]
    fn operations_on_unknown_or_closed_accounts_skip_the_amount_prompt() {
        let script = [
            create("111"),
            "8\n1\n".to_string(),
            "3\n1\n".to_string(),
            "2\n7\n".to_string(),
            "4\n1\n7\n".to_string(),
            "6\n1\n".to_string(),
            "9\n1\n".to_string(),
        ]
        .concat();

        let (_, out) = run_session(&script);

        assert_eq!(out.matches("Account not found or closed.").count(), 3);
        assert!(out.contains("Invalid source or destination account."));
        assert!(!out.contains("Deposit amount: "));
        assert!(!out.contains("Withdrawal amount: "));
    }

    #[test]
    fn self_transfer_is_reported() {
        let script = [create("111"), "3\n1\n10\n".to_string(), "4\n1\n1\n5\n".to_string(), "9\n1\n".to_string()].concat();

        let (ledger, out) = run_session(&script);

        assert!(out.contains("Source and destination must be different accounts."));
        assert_eq!(
            ledger.find_by_number(AccountNumber(1)).unwrap().balance(),
            Money::from_units(10).unwrap()
        );
    }

    #[test]
    fn invalid_amount_is_reported() {
        let script = [create("111"), "3\n1\n0\n".to_string(), "3\n1\n-5\n".to_string(), "9\n1\n".to_string()].concat();

        let (_, out) = run_session(&script);
        assert_eq!(out.matches("Invalid amount.").count(), 2);
    }

    #[test]
    fn query_by_number_and_cpf_includes_closed_accounts() {
        let script = [
            create("111"),
            "8\n1\n".to_string(),
            "5\n1\n1\n".to_string(),
            "5\n2\n111\n".to_string(),
            "5\n2\n999\n".to_string(),
            "5\n3\n".to_string(),
            "9\n1\n".to_string(),
        ]
        .concat();

        let (_, out) = run_session(&script);

        assert_eq!(out.matches("Status: CLOSED").count(), 2);
        assert!(out.contains("Account not found."));
        assert!(out.contains("Invalid option."));
    }

    #[test]
    fn update_contact_changes_phone_and_branch() {
        let script = [create("111"), "6\n1\n11 2222-3333\n0099\n".to_string(), "9\n1\n".to_string()].concat();

        let (ledger, out) = run_session(&script);

        assert!(out.contains("Customer details updated."));
        let owner = ledger.find_by_number(AccountNumber(1)).unwrap().owner().clone();
        assert_eq!(owner.phone(), "11 2222-3333");
        assert_eq!(owner.branch(), "0099");
        assert_eq!(owner.full_name(), "Maria Silva");
    }

    #[test]
    fn list_honours_filters() {
        let script = [
            "7\n".to_string(),
            create("111"),
            create("222"),
            "8\n2\n".to_string(),
            "7\n1\n".to_string(),
            "7\n2\n".to_string(),
            "7\n4\n".to_string(),
            "9\n1\n".to_string(),
        ]
        .concat();

        let (_, out) = run_session(&script);

        assert!(out.contains("No accounts registered."));
        assert!(out.contains("Status: ACTIVE"));
        assert_eq!(out.matches("Status: CLOSED").count(), 1);
        assert!(out.contains("Invalid option."));
    }

    #[test]
    fn list_reports_empty_filter_result() {
        let script = [create("111"), "7\n2\n".to_string(), "9\n1\n".to_string()].concat();

        let (_, out) = run_session(&script);
        assert!(out.contains("No accounts match this filter."));
    }

    #[test]
    fn exit_requires_confirmation() {
        let (_, out) = run_session("9\n0\n42\n9\n1\n");

        assert_eq!(out.matches("Are you sure you want to exit?").count(), 2);
        assert!(out.contains("Invalid option."));
        assert!(out.contains("Shutting down..."));
    }

    #[test]
    fn negative_or_huge_account_numbers_are_not_found() {
        let script = [
            create("111"),
            "3\n-1\n".to_string(),
            "2\n4294967296\n".to_string(),
            "4\n-1\n1\n".to_string(),
            "5\n1\n-1\n".to_string(),
            "8\n-1\n".to_string(),
            "9\n1\n".to_string(),
        ]
        .concat();

        let (_, out) = run_session(&script);

        assert_eq!(out.matches("Account not found or closed.").count(), 2);
        assert!(out.contains("Invalid source or destination account."));
        assert_eq!(out.matches("Account not found.").count(), 2);
        assert!(!out.contains("Please enter a valid whole number."));
    }

    #[test]
    fn non_utf8_input_does_not_end_the_session() {
        let mut script = b"1\nJo\xe3o Silva\njoao@example.com\n111\n61 99999-0000\n0001\n01/02/1990\n".to_vec();
        script.extend_from_slice(b"9\n1\n");

        let (ledger, out) = run_script(ShellConfig::default(), script);

        assert!(out.contains("Account created successfully!"));
        assert!(out.contains("Shutting down..."));
        let account = ledger.find_by_number(AccountNumber(1)).unwrap();
        assert_eq!(account.owner().full_name(), "Jo\u{FFFD}o Silva");
    }

    #[test]
    fn end_of_input_ends_the_session_cleanly() {
        let (ledger, out) = run_session(&create("111")[..10]);

        assert!(ledger.is_empty());
        assert!(!out.contains("Shutting down..."));
    }

    #[test]
    fn configured_capacity_is_reported() {
        let mut config = ShellConfig::default();
        config.ledger.max_accounts = Some(1);
        let script = [create("111"), create("222"), "9\n1\n".to_string()].concat();

        let (ledger, out) = run_session_with(config, &script);

        assert!(out.contains("The bank cannot open more accounts (limit: 1)."));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn header_uses_configured_bank_name() {
        let config = ShellConfig {
            bank_name: "Banco Teste".to_string(),
            ..ShellConfig::default()
        };
        let (_, out) = run_session_with(config, "9\n1\n");
        assert!(out.contains(" Banco Teste "));
    }
}
