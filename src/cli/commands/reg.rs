use crate::AppContext;
use crate::cli::parser::RegCmd;
use crate::core::registrations::RegistrationLogic;
use crate::errors::{AppError, AppResult};
use crate::models::registration::{Registration, RegistrationType};
use crate::ui::messages;
use crate::utils::colors::colorize_optional;
use crate::utils::table::Table;

pub fn handle(cmd: &RegCmd, ctx: &AppContext) -> AppResult<()> {
    let exec = &ctx.exec;

    match cmd {
        RegCmd::Individual {
            event,
            name,
            national_id,
        } => {
            let reg = RegistrationLogic::register_individual(exec, *event, name, national_id)?;
            registered(ctx, &reg)?;
        }

        RegCmd::Team {
            event,
            leader,
            national_id,
            members,
        } => {
            let members: Vec<&str> = members.iter().map(String::as_str).collect();
            let reg = RegistrationLogic::register_team(exec, *event, leader, national_id, &members)?;
            registered(ctx, &reg)?;
        }

        RegCmd::List => {
            let regs = RegistrationLogic::list(exec)?;
            if ctx.json {
                return messages::json(&regs);
            }
            if regs.is_empty() {
                messages::info("No registrations yet.");
                return Ok(());
            }

            let mut t = Table::new(&["Code", "Event", "Type", "Registrant", "Members", "Date"]);
            for r in &regs {
                t.add_row(vec![
                    r.registration_code.clone(),
                    r.event_name.clone(),
                    r.registration_type.to_db_str().to_string(),
                    r.primary_registrant_name.clone(),
                    r.members.len().to_string(),
                    r.registration_date.clone(),
                ]);
            }
            print!("{}", t.render());
        }

        RegCmd::Show { code } => {
            let reg = RegistrationLogic::find_by_code(exec, code.trim())?
                .ok_or_else(|| AppError::NotFound(format!("registration {code}")))?;
            if ctx.json {
                return messages::json(&reg);
            }

            messages::header(format!("Registration {}", reg.registration_code));
            println!("Event      : {}", reg.event_name);
            println!("Type       : {}", reg.registration_type.to_db_str());
            println!("Registrant : {}", reg.primary_registrant_name);
            println!("Date       : {}", reg.registration_date);
            if reg.registration_type == RegistrationType::Team {
                println!("Members    : {}", reg.members.join(", "));
            }
        }

        RegCmd::Events => {
            let events = RegistrationLogic::events(exec)?;
            if ctx.json {
                return messages::json(&events);
            }
            if events.is_empty() {
                messages::info("No events yet.");
                return Ok(());
            }

            let mut t = Table::new(&["ID", "Event", "Category", "Date", "Registrations"]);
            for e in &events {
                t.add_row(vec![
                    e.id.to_string(),
                    e.name.clone(),
                    e.category.clone(),
                    colorize_optional(e.event_date.as_deref()),
                    e.registrations.to_string(),
                ]);
            }
            print!("{}", t.render());
        }

        RegCmd::Faculty { department } => {
            let faculty = RegistrationLogic::faculty(exec, department.as_deref())?;
            if ctx.json {
                return messages::json(&faculty);
            }
            if faculty.is_empty() {
                messages::info("No faculty found.");
                return Ok(());
            }

            let mut t = Table::new(&["ID", "Name", "Department", "Qualification", "Subjects", "Email"]);
            for f in &faculty {
                t.add_row(vec![
                    f.id.to_string(),
                    f.name.clone(),
                    colorize_optional(f.department.as_deref()),
                    colorize_optional(f.qualification.as_deref()),
                    colorize_optional(f.subjects.as_deref()),
                    colorize_optional(f.email.as_deref()),
                ]);
            }
            print!("{}", t.render());
        }
    }

    Ok(())
}

fn registered(ctx: &AppContext, reg: &Registration) -> AppResult<()> {
    if ctx.json {
        return messages::json(reg);
    }
    messages::success(format!(
        "Registered {} for {} with code {}",
        reg.primary_registrant_name, reg.event_name, reg.registration_code
    ));
    Ok(())
}
