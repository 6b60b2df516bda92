use crate::AppContext;
use crate::cli::parser::InvCmd;
use crate::core::alerts::AlertLogic;
use crate::core::fields::InventoryField;
use crate::core::inventory::{InventoryLogic, NewEquipment, NewMedicine, NewSupply, Search};
use crate::core::reports::{ReportLogic, ReportQuery};
use crate::errors::{AppError, AppResult};
use crate::models::inventory::{InventoryRows, Report};
use crate::ui::messages::{self, info, warning};
use crate::utils::colors::colorize_days_left;
use crate::utils::date::{parse_count, parse_date, parse_number, today};
use crate::utils::table::Table;
use std::io::{self, Write};
use std::path::Path;

/// Actor recorded in the activity log for inventory changes made here.
const CLI_ACTOR: &str = "cli";

pub fn handle(cmd: &InvCmd, ctx: &AppContext) -> AppResult<()> {
    let exec = &ctx.exec;

    match cmd {
        InvCmd::AddEquipment {
            id,
            name,
            manufacturer,
            cost,
            location,
            last_maintenance,
            next_maintenance,
            status,
        } => {
            let item = NewEquipment {
                equipment_id: *id,
                name: name.clone(),
                manufacturer: manufacturer.clone(),
                cost: parse_number("cost", cost)?,
                location: location.clone(),
                last_maintenance: parse_date(last_maintenance)?,
                next_maintenance: parse_date(next_maintenance)?,
                status: status.clone(),
            };
            InventoryLogic::add_equipment(exec, CLI_ACTOR, &item)?;
            added(ctx, "equipment", *id)?;
        }

        InvCmd::AddMedicine {
            id,
            name,
            manufacturer,
            quantity,
            cost,
            expiry,
        } => {
            let item = NewMedicine {
                medicine_id: *id,
                name: name.clone(),
                manufacturer: manufacturer.clone(),
                quantity: parse_count("quantity", quantity)?,
                cost: parse_number("cost", cost)?,
                expiry_date: parse_date(expiry)?,
            };
            InventoryLogic::add_medicine(exec, CLI_ACTOR, &item)?;
            added(ctx, "medicine", *id)?;
        }

        InvCmd::AddSupply {
            id,
            name,
            manufacturer,
            cost,
            last_maintenance,
            next_maintenance,
            quantity,
            supply_type,
        } => {
            let item = NewSupply {
                supply_id: *id,
                name: name.clone(),
                manufacturer: manufacturer.clone(),
                cost: parse_number("cost", cost)?,
                last_maintenance: parse_date(last_maintenance)?,
                next_maintenance: parse_date(next_maintenance)?,
                quantity: parse_count("quantity", quantity)?,
                supply_type: supply_type.clone(),
            };
            InventoryLogic::add_supply(exec, CLI_ACTOR, &item)?;
            added(ctx, "surgical supply", *id)?;
        }

        InvCmd::List { kind, search, by } => {
            let rows = InventoryLogic::list(
                exec,
                *kind,
                &Search {
                    term: search.clone(),
                    by: *by,
                },
            )?;
            if ctx.json {
                return messages::json(&rows);
            }
            if rows.is_empty() {
                info(format!("No {} found.", kind.label()));
                return Ok(());
            }
            print!("{}", rows_table(&rows).render());
        }

        InvCmd::Update {
            kind,
            id,
            field,
            value,
        } => {
            InventoryLogic::update_field(exec, CLI_ACTOR, *kind, *id, field, value).map_err(|e| {
                match e {
                    AppError::InvalidField(msg) => AppError::InvalidField(format!(
                        "{msg} (valid: {})",
                        InventoryField::names(*kind).join(", ")
                    )),
                    other => other,
                }
            })?;
            if ctx.json {
                return messages::json(&serde_json::json!({
                    "kind": kind,
                    "id": id,
                    "field": field,
                    "value": value,
                }));
            }
            messages::success(format!("Updated {} {id}: {field} = {value}", kind.label()));
        }

        InvCmd::Alerts => {
            let alerts = AlertLogic::alerts(exec, &ctx.cfg.alert_settings(), today())?;
            if ctx.json {
                return messages::json(&alerts);
            }
            if alerts.alert_count == 0 {
                messages::success("No alerts.");
                return Ok(());
            }

            if !alerts.expiring_medicines.is_empty() {
                messages::header("Expiring medicines");
                let mut t = Table::new(&["ID", "Name", "Expiry", "Days left", "Qty"]);
                for m in &alerts.expiring_medicines {
                    t.add_row(vec![
                        m.medicine.medicine_id.to_string(),
                        m.medicine.name.clone(),
                        m.medicine.expiry_date.clone(),
                        colorize_days_left(m.days_until_expiry),
                        m.medicine.quantity.to_string(),
                    ]);
                }
                print!("{}", t.render());
                println!();
            }

            if !alerts.maintenance_equipment.is_empty() {
                messages::header("Maintenance due");
                let mut t = Table::new(&["ID", "Name", "Location", "Next", "Days left"]);
                for m in &alerts.maintenance_equipment {
                    t.add_row(vec![
                        m.equipment.equipment_id.to_string(),
                        m.equipment.name.clone(),
                        m.equipment.location.clone(),
                        m.equipment.next_maintenance.clone(),
                        colorize_days_left(m.days_until_maintenance),
                    ]);
                }
                print!("{}", t.render());
                println!();
            }

            if !alerts.low_stock_items.is_empty() {
                messages::header("Low stock");
                let mut t = Table::new(&["Type", "ID", "Name", "Qty"]);
                for l in &alerts.low_stock_items {
                    t.add_row(vec![l.kind.clone(), l.id.to_string(), l.name.clone(), l.quantity.to_string()]);
                }
                print!("{}", t.render());
            }
        }

        InvCmd::Dashboard => {
            let dash = AlertLogic::dashboard(exec, &ctx.cfg.alert_settings(), today())?;
            if ctx.json {
                return messages::json(&dash);
            }
            messages::header("Inventory");
            println!("Equipment         : {}", dash.equipment_count);
            println!("Medicines         : {}", dash.medicine_count);
            println!("Surgical supplies : {}", dash.surgery_count);
            println!("Alerts            : {}", dash.alert_count);
        }

        InvCmd::Report {
            kind,
            from,
            to,
            csv,
            force,
        } => {
            let query = ReportQuery {
                kind: *kind,
                from: from.as_deref().map(parse_date).transpose()?,
                to: to.as_deref().map(parse_date).transpose()?,
            };
            let report = ReportLogic::report(exec, &query)?;

            if let Some(path) = csv {
                ensure_writable(path, *force)?;
                ReportLogic::write_csv(&report, path)?;
                if !ctx.json {
                    messages::success(format!("Report written to {}", path.display()));
                }
            }

            if ctx.json {
                return messages::json(&report);
            }
            print_report(&report);
        }

        InvCmd::Search { term } => {
            let hits = InventoryLogic::search(exec, term)?;
            if ctx.json {
                return messages::json(&hits);
            }
            if hits.is_empty() {
                info(format!("Nothing matches '{term}'."));
                return Ok(());
            }
            let mut t = Table::new(&["Type", "ID", "Name", "Manufacturer"]);
            for h in &hits {
                t.add_row(vec![h.kind.clone(), h.id.to_string(), h.name.clone(), h.manufacturer.clone()]);
            }
            print!("{}", t.render());
        }

        InvCmd::Suggest { term } => {
            let suggestions = InventoryLogic::suggestions(exec, term)?;
            if ctx.json {
                return messages::json(&suggestions);
            }
            for s in &suggestions {
                println!("{} ({})", s.name, s.kind);
            }
        }
    }

    Ok(())
}

fn added(ctx: &AppContext, what: &str, id: i64) -> AppResult<()> {
    if ctx.json {
        return messages::json(&serde_json::json!({ "added": what, "id": id }));
    }
    messages::success(format!("Added {what} with id {id}"));
    Ok(())
}

fn rows_table(rows: &InventoryRows) -> Table {
    match rows {
        InventoryRows::Equipment(items) => {
            let mut t = Table::new(&[
                "ID", "Name", "Manufacturer", "Cost", "Location", "Last maint.", "Next maint.", "Status",
            ]);
            for e in items {
                t.add_row(vec![
                    e.equipment_id.to_string(),
                    e.name.clone(),
                    e.manufacturer.clone(),
                    format!("{:.2}", e.cost),
                    e.location.clone(),
                    e.last_maintenance.clone(),
                    e.next_maintenance.clone(),
                    e.status.clone(),
                ]);
            }
            t
        }
        InventoryRows::Medicines(items) => {
            let mut t = Table::new(&["ID", "Name", "Manufacturer", "Qty", "Cost", "Expiry"]);
            for m in items {
                t.add_row(vec![
                    m.medicine_id.to_string(),
                    m.name.clone(),
                    m.manufacturer.clone(),
                    m.quantity.to_string(),
                    format!("{:.2}", m.cost),
                    m.expiry_date.clone(),
                ]);
            }
            t
        }
        InventoryRows::Surgery(items) => {
            let mut t = Table::new(&[
                "ID", "Name", "Manufacturer", "Cost", "Qty", "Type", "Last maint.", "Next maint.",
            ]);
            for s in items {
                t.add_row(vec![
                    s.supply_id.to_string(),
                    s.name.clone(),
                    s.manufacturer.clone(),
                    format!("{:.2}", s.cost),
                    s.quantity.to_string(),
                    s.supply_type.clone(),
                    s.last_maintenance.clone(),
                    s.next_maintenance.clone(),
                ]);
            }
            t
        }
    }
}

fn print_report(report: &Report) {
    let range = match (&report.start_date, &report.end_date) {
        (None, None) => "all dates".to_string(),
        (from, to) => format!(
            "{} .. {}",
            from.as_deref().unwrap_or("start"),
            to.as_deref().unwrap_or("today")
        ),
    };
    messages::header(format!("Inventory report ({range})"));

    let mut t = Table::new(&["Section", "Items", "Value"]);
    t.add_row(vec!["Equipment".into(), report.equipment_count.to_string(), format!("{:.2}", report.equipment_value)]);
    t.add_row(vec!["Medicines".into(), report.medicines_count.to_string(), format!("{:.2}", report.medicines_value)]);
    t.add_row(vec!["Surgical supplies".into(), report.surgery_count.to_string(), format!("{:.2}", report.surgery_value)]);
    t.add_row(vec!["Total".into(), report.total_items.to_string(), format!("{:.2}", report.total_value)]);
    print!("{}", t.render());

    if report.detailed_data.is_empty() {
        return;
    }
    println!();
    let mut d = Table::new(&["Type", "ID", "Name", "Manufacturer", "Cost", "Qty", "Detail", "Added"]);
    for r in &report.detailed_data {
        d.add_row(vec![
            r.kind.clone(),
            r.id.to_string(),
            r.name.clone(),
            r.manufacturer.clone(),
            format!("{:.2}", r.cost),
            r.quantity.map(|q| q.to_string()).unwrap_or_default(),
            r.detail.clone(),
            r.date_added.clone(),
        ]);
    }
    print!("{}", d.render());
}

/// Check that a file can be created or overwritten.
///
/// - Missing file → Ok
/// - Existing file with `force` → Ok
/// - Existing file without `force` → ask the user
fn ensure_writable(path: &Path, force: bool) -> AppResult<()> {
    if !path.exists() || force {
        return Ok(());
    }

    warning(format!("The file '{}' already exists.", path.display()));

    print!("Overwrite? [y/N]: ");
    io::stdout().flush().ok();

    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    let ans = answer.trim().to_ascii_lowercase();

    if ans == "y" || ans == "yes" {
        info("Existing file will be overwritten.");
        Ok(())
    } else {
        Err(AppError::from(io::Error::other(
            "Export cancelled: existing file not overwritten",
        )))
    }
}
