use crate::AppContext;
use crate::cli::parser::Commands;
use crate::core::audit::AuditLogic;
use crate::errors::AppResult;
use crate::ui::messages;
use crate::utils::colors::{CYAN, GREEN, RED, RESET, YELLOW, colorize_optional};
use crate::utils::table::Table;

/// Color of an audit action in the listing.
fn color_for_action(action: &str) -> &'static str {
    match action {
        "add" | "upload" | "register" | "seed" => GREEN,
        "delete" | "reject" => RED,
        "update" | "approve" => YELLOW,
        _ => CYAN,
    }
}

pub fn handle(cmd: &Commands, ctx: &AppContext) -> AppResult<()> {
    if let Commands::Log { limit } = cmd {
        let entries = AuditLogic::recent(&ctx.exec, *limit)?;

        if ctx.json {
            return messages::json(&entries);
        }
        if entries.is_empty() {
            messages::info("Activity log is empty.");
            return Ok(());
        }

        let mut t = Table::new(&["ID", "When", "Actor", "Action", "Target", "Details"]);
        for e in &entries {
            let target = match e.target_id {
                Some(id) => format!("{} #{id}", e.target_type),
                None => e.target_type.clone(),
            };
            t.add_row(vec![
                e.id.to_string(),
                e.created_at.clone(),
                e.actor.clone(),
                format!("{}{}{RESET}", color_for_action(&e.action), e.action),
                target,
                colorize_optional(e.details.as_deref()),
            ]);
        }
        print!("{}", t.render());
    }

    Ok(())
}
