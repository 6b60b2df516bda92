//! rPortal library root.
//! Exposes the CLI parser, the high-level run() function, and the pool,
//! executor and domain services behind it.

pub mod cli;
pub mod config;
pub mod core;
pub mod db;
pub mod errors;
pub mod logging;
pub mod models;
pub mod ui;
pub mod utils;

use clap::Parser;
use cli::parser::{Cli, Commands};
use config::Config;
use crate::core::enrich::Enricher;
use db::executor::QueryExecutor;
use errors::AppResult;
use tracing::debug;

/// Everything a command handler needs once the database is open.
pub struct AppContext {
    pub cfg: Config,
    pub exec: QueryExecutor,
    pub enricher: Enricher,
    pub json: bool,
}

/// Central command dispatcher
pub fn dispatch(cli: &Cli, ctx: &AppContext) -> AppResult<()> {
    match &cli.command {
        // handled before the database is opened
        Commands::Init => Ok(()),
        Commands::Db { .. } => cli::commands::db::handle(&cli.command, ctx),
        Commands::Log { .. } => cli::commands::log::handle(&cli.command, ctx),
        Commands::User { action } => cli::commands::user::handle(action, ctx),
        Commands::Doc { action } => cli::commands::doc::handle(action, ctx),
        Commands::Inv { action } => cli::commands::inv::handle(action, ctx),
        Commands::Reg { action } => cli::commands::reg::handle(action, ctx),
    }
}

/// Entry point used by main.rs
pub fn run() -> AppResult<()> {
    let cli = Cli::parse();

    if let Commands::Init = cli.command {
        let cfg = Config::load()?;
        logging::init_tracing(&cfg.log_level);
        return cli::commands::init::handle(&cli);
    }

    let mut cfg = Config::load()?;
    if let Some(custom_db) = &cli.db {
        cfg.database = custom_db.clone();
    }
    logging::init_tracing(&cfg.log_level);

    let (exec, report) = db::open_database(&cfg.database, cfg.pool_options(), &cfg.apps)?;
    debug!(seeded = ?report.seeded, "database ready");

    let ctx = AppContext {
        enricher: Enricher::from_config(cfg.nlp_enabled),
        exec,
        json: cli.json,
        cfg,
    };

    let result = dispatch(&cli, &ctx);
    ctx.exec.pool().close();
    result
}
