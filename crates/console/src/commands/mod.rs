pub mod auth;
pub mod collections;
pub mod entities;
pub mod fields;
pub mod members;
pub mod users;

use anyhow::{Context as _, bail};
use secrecy::SecretString;
use services::services::{console_api::ConsoleApiClient, export::ExportFormat};
use utils::paths;

use crate::{
    cli::{Cli, Command},
    config::ConsoleConfig,
    credentials::FileCredentialStore,
};

/// Everything a command needs, resolved from flags, environment and files
pub struct Context {
    pub server_url: String,
    pub config: ConsoleConfig,
    pub store: FileCredentialStore,
    pub format: ExportFormat,
    token_override: Option<String>,
}

impl Context {
    pub fn from_cli(cli: &Cli) -> anyhow::Result<Self> {
        let config_path = cli.config.clone().unwrap_or_else(paths::config_file);
        let config = ConsoleConfig::load(&config_path)?;
        let server_url = config.server_url(cli.url.as_deref());
        let format = cli.format.unwrap_or(config.ui.format);

        Ok(Self {
            server_url,
            format,
            store: FileCredentialStore::new(paths::credentials_file()),
            token_override: cli.token.clone(),
            config,
        })
    }

    pub fn spinner(&self) -> bool {
        self.config.ui.spinner
    }

    /// Client without a session, used for signing in
    pub fn anonymous_client(&self) -> anyhow::Result<ConsoleApiClient> {
        ConsoleApiClient::new(&self.server_url, self.config.timeout())
            .with_context(|| format!("Cannot use server url {}", self.server_url))
    }

    /// Client carrying the explicit token or the stored session
    pub fn client(&self) -> anyhow::Result<ConsoleApiClient> {
        let client = self.anonymous_client()?;
        if let Some(token) = &self.token_override {
            return Ok(client.with_token(SecretString::from(token.clone())));
        }

        match self.store.load()? {
            Some(credentials) => {
                if credentials.server_url != self.server_url {
                    tracing::warn!(
                        stored = %credentials.server_url,
                        current = %self.server_url,
                        "Stored session belongs to a different server"
                    );
                }
                Ok(client.with_token(credentials.token()))
            }
            None => bail!("Not signed in. Run `church-console login` first."),
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let ctx = Context::from_cli(&cli)?;
    tracing::debug!(server = %ctx.server_url, format = %ctx.format, "Starting console");

    match cli.command {
        Command::Login { email } => auth::login(&ctx, email).await,
        Command::Logout => auth::logout(&ctx),
        Command::Whoami => auth::whoami(&ctx),
        Command::Fields(command) => fields::run(&ctx, command).await,
        Command::Members(command) => members::run(&ctx, command).await,
        Command::Collections(command) => collections::run(&ctx, command).await,
        Command::Entities(command) => entities::run(&ctx, command).await,
        Command::Users(command) => users::run(&ctx, command).await,
    }
}
