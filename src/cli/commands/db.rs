use crate::AppContext;
use crate::cli::parser::Commands;
use crate::db::stats;
use crate::errors::AppResult;
use crate::ui::messages;
use crate::utils::colors::{CYAN, GREEN, RED, RESET};
use crate::utils::table::Table;
use serde_json::json;

pub fn handle(cmd: &Commands, ctx: &AppContext) -> AppResult<()> {
    if let Commands::Db {
        check,
        vacuum,
        info,
    } = cmd
    {
        let mut out = serde_json::Map::new();

        //
        // 1) INFO
        //
        if *info {
            let info = stats::db_info(&ctx.exec)?;
            if ctx.json {
                out.insert("info".into(), serde_json::to_value(&info)?);
            } else {
                messages::header("Database");
                println!("Path      : {}", info.path);
                println!("File size : {} bytes", info.file_size);
                println!(
                    "Pool      : {} connections, {} idle, {} in use (peak {})",
                    info.pool.size, info.pool.available, info.pool.in_use, info.pool.peak_in_use
                );
                println!();

                let mut t = Table::new(&["Table", "Rows"]);
                for tc in &info.tables {
                    t.add_row(vec![tc.table.clone(), tc.rows.to_string()]);
                }
                print!("{}", t.render());
                println!();
            }
        }

        //
        // 2) CHECK
        //
        if *check {
            if !ctx.json {
                println!("{}▶ Running integrity check…{}", CYAN, RESET);
            }
            let problem = stats::integrity_check(&ctx.exec)?;
            if ctx.json {
                out.insert("integrity".into(), json!(problem.as_deref().unwrap_or("ok")));
            } else {
                match problem {
                    None => println!("{}✔ Integrity check passed.{}\n", GREEN, RESET),
                    Some(p) => println!("{}✘ Integrity check failed:{} {}\n", RED, RESET, p),
                }
            }
        }

        //
        // 3) VACUUM
        //
        if *vacuum {
            if !ctx.json {
                println!("{}▶ Running VACUUM…{}", CYAN, RESET);
            }
            stats::vacuum(&ctx.exec)?;
            if ctx.json {
                out.insert("vacuum".into(), json!("done"));
            } else {
                println!("{}✔ Vacuum completed.{}\n", GREEN, RESET);
            }
        }

        if ctx.json {
            messages::json(&out)?;
        }
    }

    Ok(())
}
