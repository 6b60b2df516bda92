use crate::core::inventory::SearchBy;
use crate::core::reports::ReportKind;
use crate::models::inventory::InventoryKind;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Command-line interface definition for rPortal
/// Document portal, hospital inventory and event registrations on SQLite
#[derive(Parser)]
#[command(
    name = "rportal",
    version = env!("CARGO_PKG_VERSION"),
    about = "Document approval portal, hospital inventory tracker and event registration desk on a pooled SQLite database",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Print results as JSON instead of tables
    #[arg(global = true, long = "json")]
    pub json: bool,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the configuration and the database (tables + seed data)
    Init,

    /// Database maintenance
    Db {
        #[arg(long = "check", help = "Check database integrity")]
        check: bool,

        #[arg(long = "vacuum", help = "Optimize the database using VACUUM")]
        vacuum: bool,

        #[arg(long = "info", help = "Show database information")]
        info: bool,
    },

    /// Print the latest entries of the activity log
    Log {
        #[arg(long, default_value_t = 20, help = "Number of entries to show")]
        limit: usize,
    },

    /// Portal accounts
    User {
        #[command(subcommand)]
        action: UserCmd,
    },

    /// Document portal
    Doc {
        #[command(subcommand)]
        action: DocCmd,
    },

    /// Hospital inventory
    Inv {
        #[command(subcommand)]
        action: InvCmd,
    },

    /// Event registrations
    Reg {
        #[command(subcommand)]
        action: RegCmd,
    },
}

/// Who is acting. Checked against the `users` table on every call.
#[derive(Args, Debug, Clone)]
pub struct Credentials {
    #[arg(id = "user", long = "user", value_name = "EMAIL")]
    pub email: String,

    #[arg(long = "password")]
    pub password: String,
}

#[derive(Subcommand)]
pub enum UserCmd {
    /// Create an account
    Register {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,
    },

    /// Create a manager account (requires a manager's credentials)
    AddManager {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long = "new-password", help = "Password of the new account")]
        new_password: String,

        #[command(flatten)]
        creds: Credentials,
    },

    /// Check a pair of credentials
    Login {
        #[command(flatten)]
        creds: Credentials,
    },
}

#[derive(Subcommand)]
pub enum DocCmd {
    /// Upload a file (metadata only) and run enrichment on it
    Upload {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[arg(long)]
        description: Option<String>,

        #[command(flatten)]
        creds: Credentials,
    },

    /// List your documents
    List {
        #[command(flatten)]
        creds: Credentials,
    },

    /// Documents waiting for review (managers only)
    Pending {
        #[command(flatten)]
        creds: Credentials,
    },

    /// Document details with comments, tags and extracted metadata
    Show {
        id: i64,

        #[command(flatten)]
        creds: Credentials,
    },

    /// Approve a pending document (managers only)
    Approve {
        id: i64,

        #[command(flatten)]
        creds: Credentials,
    },

    /// Reject a pending document (managers only)
    Reject {
        id: i64,

        #[command(flatten)]
        creds: Credentials,
    },

    /// Search documents
    Search {
        #[arg(long, short)]
        query: Option<String>,

        #[arg(long, help = "Pending, Approved or Rejected")]
        status: Option<String>,

        #[arg(long = "type", help = "File extension, e.g. pdf")]
        file_type: Option<String>,

        #[arg(long, help = "Upload date (YYYY-MM-DD)")]
        date: Option<String>,

        #[arg(long, help = "Search every user's documents (managers only)")]
        all: bool,

        #[command(flatten)]
        creds: Credentials,
    },

    /// Comment on a document
    Comment {
        id: i64,
        text: String,

        #[command(flatten)]
        creds: Credentials,
    },

    /// Delete one of your documents
    Delete {
        id: i64,

        #[command(flatten)]
        creds: Credentials,
    },

    /// Replace the description of one of your documents
    Describe {
        id: i64,
        text: String,

        #[command(flatten)]
        creds: Credentials,
    },

    /// Your upload counters
    Stats {
        #[command(flatten)]
        creds: Credentials,
    },

    /// Document counts per status
    Status,

    /// Recently modified documents, or the enrichment log with --idp
    Activity {
        #[arg(long, default_value_t = 10)]
        limit: usize,

        #[arg(long, help = "Show the enrichment log instead")]
        idp: bool,
    },
}

#[derive(Subcommand)]
pub enum InvCmd {
    /// Add a piece of equipment
    AddEquipment {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        manufacturer: String,
        #[arg(long)]
        cost: String,
        #[arg(long)]
        location: Option<String>,
        #[arg(long = "last-maintenance", value_name = "YYYY-MM-DD")]
        last_maintenance: String,
        #[arg(long = "next-maintenance", value_name = "YYYY-MM-DD")]
        next_maintenance: String,
        #[arg(long)]
        status: Option<String>,
    },

    /// Add a medicine batch
    AddMedicine {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        manufacturer: String,
        #[arg(long)]
        quantity: String,
        #[arg(long)]
        cost: String,
        #[arg(long, value_name = "YYYY-MM-DD")]
        expiry: String,
    },

    /// Add a surgical supply
    AddSupply {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        manufacturer: String,
        #[arg(long)]
        cost: String,
        #[arg(long = "last-maintenance", value_name = "YYYY-MM-DD")]
        last_maintenance: String,
        #[arg(long = "next-maintenance", value_name = "YYYY-MM-DD")]
        next_maintenance: String,
        #[arg(long)]
        quantity: String,
        #[arg(long = "type")]
        supply_type: String,
    },

    /// List one inventory table
    List {
        #[arg(value_enum)]
        kind: InventoryKind,

        #[arg(long)]
        search: Option<String>,

        #[arg(long, value_enum, default_value = "name")]
        by: SearchBy,
    },

    /// Change one field of one item
    Update {
        #[arg(value_enum)]
        kind: InventoryKind,
        id: i64,
        field: String,
        value: String,
    },

    /// Expiring medicines, maintenance due, low stock
    Alerts,

    /// Item counts and number of alerts
    Dashboard,

    /// Inventory value report
    Report {
        #[arg(long, value_enum, default_value = "all")]
        kind: ReportKind,

        #[arg(long, value_name = "YYYY-MM-DD")]
        from: Option<String>,

        #[arg(long, value_name = "YYYY-MM-DD")]
        to: Option<String>,

        #[arg(long, value_name = "FILE", help = "Also write the detail rows as CSV")]
        csv: Option<PathBuf>,

        #[arg(long, short = 'f', help = "Overwrite an existing CSV file")]
        force: bool,
    },

    /// Search all inventory tables
    Search { term: String },

    /// Name suggestions for a partial term
    Suggest { term: String },
}

#[derive(Subcommand)]
pub enum RegCmd {
    /// Register one participant
    Individual {
        #[arg(long)]
        event: i64,
        #[arg(long)]
        name: String,
        #[arg(long = "national-id", help = "12-digit national ID (stored hashed)")]
        national_id: String,
    },

    /// Register a team
    Team {
        #[arg(long)]
        event: i64,
        #[arg(long)]
        leader: String,
        #[arg(long = "national-id", help = "12-digit national ID of the leader (stored hashed)")]
        national_id: String,
        #[arg(long = "member", required = true, help = "Team member name (repeatable)")]
        members: Vec<String>,
    },

    /// List all registrations
    List,

    /// Show a registration by its code
    Show { code: String },

    /// Events open for registration
    Events,

    /// Faculty directory
    Faculty {
        #[arg(long, help = "Only this department, e.g. CSE")]
        department: Option<String>,
    },
}
