//! `church-console`: command-line administration for a church management
//! backend.
//!
//! ```bash
//! church-console login --email admin@example.org
//! church-console fields add --label "Baptism date" --required
//! church-console members add
//! church-console collections summary --from 2026-01-01 --format csv
//! ```

use clap::Parser;
use services::services::console_api::ConsoleApiError;

mod cli;
mod commands;
mod config;
mod credentials;
mod output;
mod prompt;

use cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    utils::logging::init(cli.verbose);

    let result = commands::run(cli).await;
    if let Err(e) = &result
        && e
            .downcast_ref::<ConsoleApiError>()
            .is_some_and(ConsoleApiError::is_auth_failure)
    {
        eprintln!("Your session has expired. Run `church-console login` to sign in again.");
    }
    result
}
