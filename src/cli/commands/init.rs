use crate::cli::parser::Cli;
use crate::config::Config;
use crate::db::open_database;
use crate::errors::AppResult;
use crate::ui::messages;
use std::fs;
use std::path::Path;

/// Handle the `init` command
///
/// This initializes:
///  - the config directory and file (skipped in test mode)
///  - the SQLite database with the tables of every configured application
///  - the demonstration rows, once per application
pub fn handle(cli: &Cli) -> AppResult<()> {
    let cfg = Config::init_all(cli.db.as_deref(), cli.test)?;
    let db_path = cfg.database.clone();

    if let Some(dir) = Path::new(&db_path).parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
    }

    let (exec, report) = open_database(&db_path, cfg.pool_options(), &cfg.apps)?;
    exec.pool().close();

    if cli.json {
        return messages::json(&report);
    }

    if !cli.test {
        messages::info(format!("Config file : {}", Config::config_file().display()));
    }
    messages::info(format!("Database    : {db_path}"));

    let sets: Vec<&str> = report.sets.iter().map(|s| s.name()).collect();
    messages::success(format!("Tables ready for: {}", sets.join(", ")));

    if report.seeded.is_empty() {
        messages::info("Seed data already present, nothing inserted.");
    } else {
        let seeded: Vec<&str> = report.seeded.iter().map(|s| s.name()).collect();
        messages::success(format!(
            "Inserted {} demonstration rows ({})",
            report.seed_rows,
            seeded.join(", ")
        ));
    }

    Ok(())
}
