use anyhow::Context;

use malvader_cli::{config, Shell, ShellConfig};

fn main() -> anyhow::Result<()> {
    malvader_observability::init(config::log_format_from_env());

    let config = ShellConfig::from_env();
    tracing::info!(
        bank = %config.bank_name,
        max_accounts = ?config.ledger.max_accounts,
        default_credit_limit = %config.ledger.default_credit_limit,
        "starting session"
    );

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut shell = Shell::new(config, stdin.lock(), stdout.lock());
    shell.run().context("terminal session failed")?;

    tracing::info!(accounts = shell.ledger().len(), "session ended");
    Ok(())
}
