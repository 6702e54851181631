//! Main menu options.

use malvader_accounts::StatusFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuOption {
    CreateAccount,
    Withdraw,
    Deposit,
    Transfer,
    Query,
    UpdateContact,
    List,
    Close,
    Exit,
}

impl MenuOption {
    pub const ALL: [MenuOption; 9] = [
        MenuOption::CreateAccount,
        MenuOption::Withdraw,
        MenuOption::Deposit,
        MenuOption::Transfer,
        MenuOption::Query,
        MenuOption::UpdateContact,
        MenuOption::List,
        MenuOption::Close,
        MenuOption::Exit,
    ];

    pub fn from_choice(choice: i64) -> Option<Self> {
        let idx = usize::try_from(choice).ok()?.checked_sub(1)?;
        Self::ALL.get(idx).copied()
    }

    pub fn choice(self) -> usize {
        Self::ALL.iter().position(|&o| o == self).unwrap_or(0) + 1
    }

    pub fn label(self) -> &'static str {
        match self {
            MenuOption::CreateAccount => "Create account",
            MenuOption::Withdraw => "Withdraw",
            MenuOption::Deposit => "Deposit",
            MenuOption::Transfer => "Transfer",
            MenuOption::Query => "Query balance and details",
            MenuOption::UpdateContact => "Update customer details",
            MenuOption::List => "List accounts",
            MenuOption::Close => "Close account",
            MenuOption::Exit => "Exit",
        }
    }
}

/// Menu text, header included.
pub fn render(bank_name: &str) -> String {
    let rule = "=".repeat(38);
    let mut text = format!("\n{rule}\n{:=^38}\n{rule}\n", format!(" {bank_name} "));
    for option in MenuOption::ALL {
        text.push_str(&format!("{} - {}\n", option.choice(), option.label()));
    }
    text
}

/// Listing filter choice: 1 active, 2 closed, 3 all.
pub fn status_filter(choice: i64) -> Option<StatusFilter> {
    match choice {
        1 => Some(StatusFilter::Active),
        2 => Some(StatusFilter::Closed),
        3 => Some(StatusFilter::All),
        _ => None,
    }
}
