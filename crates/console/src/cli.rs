use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use models::{
    collection::CollectionKind, entity::EntityKind, field_descriptor::FieldKind,
    member::MemberStatus, user::UserRole,
};
use services::services::export::ExportFormat;
use uuid::Uuid;

/// Administration console for church membership, finances and staff
#[derive(Parser, Debug)]
#[command(name = "church-console", version)]
pub struct Cli {
    /// Backend base URL, e.g. https://church.example.org/api
    #[arg(long, global = true, env = "CHURCH_CONSOLE_URL")]
    pub url: Option<String>,

    /// Access token; overrides stored credentials
    #[arg(long, global = true, env = "CHURCH_CONSOLE_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Path to config.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format for listings
    #[arg(long, global = true)]
    pub format: Option<ExportFormat>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Sign in and store the session token
    Login {
        #[arg(long)]
        email: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show the stored session
    Whoami,
    /// Manage custom member fields
    #[command(subcommand)]
    Fields(FieldsCommand),
    /// Manage members
    #[command(subcommand)]
    Members(MembersCommand),
    /// Record and report financial collections
    #[command(subcommand)]
    Collections(CollectionsCommand),
    /// Manage headquarters, branches and departments
    #[command(subcommand)]
    Entities(EntitiesCommand),
    /// Manage staff accounts
    #[command(subcommand)]
    Users(UsersCommand),
}

#[derive(Subcommand, Debug)]
pub enum FieldsCommand {
    List,
    /// Define a new custom field on member records
    Add {
        /// Label shown next to the control
        #[arg(long)]
        label: String,
        /// Record key; derived from the label when omitted
        #[arg(long)]
        name: Option<String>,
        #[arg(long, default_value = "text")]
        kind: FieldKind,
        #[arg(long)]
        required: bool,
        #[arg(long)]
        placeholder: Option<String>,
    },
    Remove {
        id: Uuid,
    },
}

#[derive(Subcommand, Debug)]
pub enum MembersCommand {
    List {
        /// Match against name, email or phone
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        entity: Option<Uuid>,
        #[arg(long)]
        status: Option<MemberStatus>,
    },
    Show {
        id: Uuid,
    },
    /// Fill in the member form interactively
    Add {
        #[arg(long, default_value = "active")]
        status: MemberStatus,
        #[arg(long)]
        entity: Option<Uuid>,
    },
    Edit {
        id: Uuid,
        #[arg(long)]
        status: Option<MemberStatus>,
    },
    Remove {
        id: Uuid,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Args, Debug, Default)]
pub struct CollectionFilterArgs {
    #[arg(long)]
    pub kind: Option<CollectionKind>,
    #[arg(long)]
    pub member: Option<Uuid>,
    /// First day included, YYYY-MM-DD
    #[arg(long)]
    pub from: Option<NaiveDate>,
    /// Last day included, YYYY-MM-DD
    #[arg(long)]
    pub to: Option<NaiveDate>,
}

#[derive(Subcommand, Debug)]
pub enum CollectionsCommand {
    List {
        #[command(flatten)]
        filter: CollectionFilterArgs,
    },
    /// Record a tithe, offering or other collection
    Record {
        /// Amount in major units, e.g. 1250.50
        #[arg(long)]
        amount: Option<String>,
        /// Prompted for when omitted
        #[arg(long)]
        kind: Option<CollectionKind>,
        #[arg(long)]
        member: Option<Uuid>,
        #[arg(long)]
        entity: Option<Uuid>,
        /// Defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long, default_value = "USD")]
        currency: String,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Totals per kind over the filtered collections
    Summary {
        #[command(flatten)]
        filter: CollectionFilterArgs,
    },
    Remove {
        id: Uuid,
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum EntitiesCommand {
    List,
    Add {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "branch")]
        kind: EntityKind,
        #[arg(long)]
        parent: Option<Uuid>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    Remove {
        id: Uuid,
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum UsersCommand {
    List,
    /// Create a staff account; the password is prompted for
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "staff")]
        role: UserRole,
        #[arg(long)]
        entity: Option<Uuid>,
    },
    /// Block a staff account from signing in
    Deactivate {
        id: Uuid,
    },
}
