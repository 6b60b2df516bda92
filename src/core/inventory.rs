use crate::core::fields::InventoryField;
use crate::core::audit::AuditLogic;
use crate::db::executor::{QueryExecutor, like_contains};
use crate::errors::{AppError, AppResult};
use crate::models::audit::NewAuditEntry;
use crate::models::inventory::{
    Equipment, InventoryKind, InventoryRows, Medicine, SearchHit, Suggestion, SurgicalSupply,
};
use crate::utils::date::{format_date, today};
use chrono::NaiveDate;
use rusqlite::params;

/// Minimum length of a term before suggestions are looked up.
pub const SUGGEST_MIN_CHARS: usize = 2;
/// Suggestions returned per table.
pub const SUGGEST_PER_TABLE: i64 = 5;

const SELECT_EQUIPMENT: &str = "
    SELECT equipment_id, name, manufacturer, cost, location, last_maintenance,
           next_maintenance, status, date_added
    FROM equipment
    WHERE (?1 IS NULL OR equipment_id = ?1)
      AND (?2 IS NULL OR lower(name) LIKE ?2 ESCAPE '\\' OR lower(manufacturer) LIKE ?2 ESCAPE '\\')
    ORDER BY equipment_id";

const SELECT_MEDICINES: &str = "
    SELECT medicine_id, name, manufacturer, quantity, cost, expiry_date, date_added
    FROM medicines
    WHERE (?1 IS NULL OR medicine_id = ?1)
      AND (?2 IS NULL OR lower(name) LIKE ?2 ESCAPE '\\' OR lower(manufacturer) LIKE ?2 ESCAPE '\\')
    ORDER BY medicine_id";

const SELECT_SUPPLIES: &str = "
    SELECT supply_id, name, manufacturer, cost, last_maintenance, next_maintenance,
           quantity, supply_type, date_added
    FROM surgical_supplies
    WHERE (?1 IS NULL OR supply_id = ?1)
      AND (?2 IS NULL OR lower(name) LIKE ?2 ESCAPE '\\' OR lower(manufacturer) LIKE ?2 ESCAPE '\\')
    ORDER BY supply_id";

#[derive(Debug, Clone)]
pub struct NewEquipment {
    pub equipment_id: i64,
    pub name: String,
    pub manufacturer: String,
    pub cost: f64,
    pub location: Option<String>,
    pub last_maintenance: NaiveDate,
    pub next_maintenance: NaiveDate,
    pub status: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewMedicine {
    pub medicine_id: i64,
    pub name: String,
    pub manufacturer: String,
    pub quantity: i64,
    pub cost: f64,
    pub expiry_date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct NewSupply {
    pub supply_id: i64,
    pub name: String,
    pub manufacturer: String,
    pub cost: f64,
    pub last_maintenance: NaiveDate,
    pub next_maintenance: NaiveDate,
    pub quantity: i64,
    pub supply_type: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SearchBy {
    Id,
    #[default]
    Name,
}

/// Listing filter. With no term every row is returned.
#[derive(Debug, Clone, Default)]
pub struct Search {
    pub term: Option<String>,
    pub by: SearchBy,
}

impl Search {
    /// `(id, pattern)` parameters of the listing statements.
    fn bind(&self) -> AppResult<(Option<i64>, Option<String>)> {
        let Some(term) = self.term.as_deref().map(str::trim).filter(|t| !t.is_empty()) else {
            return Ok((None, None));
        };
        match self.by {
            SearchBy::Id => term
                .parse::<i64>()
                .map(|id| (Some(id), None))
                .map_err(|_| AppError::InvalidNumber("id".into())),
            SearchBy::Name => Ok((None, Some(like_pattern(term)))),
        }
    }
}

pub struct InventoryLogic;

impl InventoryLogic {
    pub fn add_equipment(exec: &QueryExecutor, actor: &str, item: &NewEquipment) -> AppResult<()> {
        check_text("name", &item.name)?;
        check_text("manufacturer", &item.manufacturer)?;
        check_amount("cost", item.cost)?;

        let location = non_empty(item.location.as_deref()).unwrap_or("Unknown");
        let status = non_empty(item.status.as_deref()).unwrap_or("Operational");

        Self::insert(exec, actor, InventoryKind::Equipment, item.equipment_id, |tx| {
            tx.execute(
                "INSERT INTO equipment
                    (equipment_id, name, manufacturer, cost, location, last_maintenance,
                     next_maintenance, status, date_added)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    item.equipment_id,
                    item.name.trim(),
                    item.manufacturer.trim(),
                    item.cost,
                    location,
                    format_date(item.last_maintenance),
                    format_date(item.next_maintenance),
                    status,
                    format_date(today()),
                ],
            )
        })
    }

    pub fn add_medicine(exec: &QueryExecutor, actor: &str, item: &NewMedicine) -> AppResult<()> {
        check_text("name", &item.name)?;
        check_text("manufacturer", &item.manufacturer)?;
        check_amount("cost", item.cost)?;
        check_count("quantity", item.quantity)?;

        Self::insert(exec, actor, InventoryKind::Medicines, item.medicine_id, |tx| {
            tx.execute(
                "INSERT INTO medicines
                    (medicine_id, name, manufacturer, quantity, cost, expiry_date, date_added)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    item.medicine_id,
                    item.name.trim(),
                    item.manufacturer.trim(),
                    item.quantity,
                    item.cost,
                    format_date(item.expiry_date),
                    format_date(today()),
                ],
            )
        })
    }

    pub fn add_supply(exec: &QueryExecutor, actor: &str, item: &NewSupply) -> AppResult<()> {
        check_text("name", &item.name)?;
        check_text("manufacturer", &item.manufacturer)?;
        check_text("supply_type", &item.supply_type)?;
        check_amount("cost", item.cost)?;
        check_count("quantity", item.quantity)?;

        Self::insert(exec, actor, InventoryKind::Surgery, item.supply_id, |tx| {
            tx.execute(
                "INSERT INTO surgical_supplies
                    (supply_id, name, manufacturer, cost, last_maintenance, next_maintenance,
                     quantity, supply_type, date_added)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    item.supply_id,
                    item.name.trim(),
                    item.manufacturer.trim(),
                    item.cost,
                    format_date(item.last_maintenance),
                    format_date(item.next_maintenance),
                    item.quantity,
                    item.supply_type.trim(),
                    format_date(today()),
                ],
            )
        })
    }

    /// Shared tail of the three `add_*`: insert + audit, with the primary key
    /// clash reported as "already exists".
    fn insert<F>(exec: &QueryExecutor, actor: &str, kind: InventoryKind, id: i64, stmt: F) -> AppResult<()>
    where
        F: FnOnce(&rusqlite::Transaction<'_>) -> rusqlite::Result<usize>,
    {
        exec.transaction(|tx| {
            stmt(tx)?;
            AuditLogic::append(tx, &NewAuditEntry::new(actor, "add", kind.label()).target(id))?;
            Ok(())
        })
        .map_err(|e| match e {
            AppError::Duplicate(_) => {
                AppError::Duplicate(format!("{} with id {id} already exists", kind.label()))
            }
            other => other,
        })
    }

    pub fn list(exec: &QueryExecutor, kind: InventoryKind, search: &Search) -> AppResult<InventoryRows> {
        let (id, pattern) = search.bind()?;
        Ok(match kind {
            InventoryKind::Equipment => {
                InventoryRows::Equipment(exec.query(SELECT_EQUIPMENT, params![id, pattern], Equipment::from_row)?)
            }
            InventoryKind::Medicines => {
                InventoryRows::Medicines(exec.query(SELECT_MEDICINES, params![id, pattern], Medicine::from_row)?)
            }
            InventoryKind::Surgery => InventoryRows::Surgery(exec.query(
                SELECT_SUPPLIES,
                params![id, pattern],
                SurgicalSupply::from_row,
            )?),
        })
    }

    /// Set one column of one row. The field name is resolved against the
    /// enumerated fields of `kind` and the value validated for its type.
    pub fn update_field(
        exec: &QueryExecutor,
        actor: &str,
        kind: InventoryKind,
        id: i64,
        field: &str,
        value: &str,
    ) -> AppResult<()> {
        let field = InventoryField::parse(kind, field)?;
        let value = field.kind().convert(field.column(), value)?;

        exec.transaction(|tx| {
            let n = tx.execute(field.update_sql(), params![value, id])?;
            if n == 0 {
                return Err(AppError::NotFound(format!("{} {id}", kind.label())));
            }
            AuditLogic::append(
                tx,
                &NewAuditEntry::new(actor, "update", kind.label())
                    .target(id)
                    .details(field.column()),
            )?;
            Ok(())
        })
    }

    /// Match `term` against name, manufacturer and id in all three tables.
    pub fn search(exec: &QueryExecutor, term: &str) -> AppResult<Vec<SearchHit>> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(Vec::new());
        }
        let pattern = like_pattern(term);

        let mut hits = Vec::new();
        for (kind, sql) in [
            (
                InventoryKind::Equipment,
                "SELECT equipment_id, name, manufacturer FROM equipment
                 WHERE lower(name) LIKE ?1 ESCAPE '\\' OR lower(manufacturer) LIKE ?1 ESCAPE '\\'
                    OR CAST(equipment_id AS TEXT) LIKE ?1 ESCAPE '\\'
                 ORDER BY equipment_id",
            ),
            (
                InventoryKind::Medicines,
                "SELECT medicine_id, name, manufacturer FROM medicines
                 WHERE lower(name) LIKE ?1 ESCAPE '\\' OR lower(manufacturer) LIKE ?1 ESCAPE '\\'
                    OR CAST(medicine_id AS TEXT) LIKE ?1 ESCAPE '\\'
                 ORDER BY medicine_id",
            ),
            (
                InventoryKind::Surgery,
                "SELECT supply_id, name, manufacturer FROM surgical_supplies
                 WHERE lower(name) LIKE ?1 ESCAPE '\\' OR lower(manufacturer) LIKE ?1 ESCAPE '\\'
                    OR CAST(supply_id AS TEXT) LIKE ?1 ESCAPE '\\'
                 ORDER BY supply_id",
            ),
        ] {
            hits.extend(exec.query(sql, [pattern.as_str()], |row| {
                Ok(SearchHit {
                    kind: kind.label().to_string(),
                    id: row.get(0)?,
                    name: row.get(1)?,
                    manufacturer: row.get(2)?,
                })
            })?);
        }
        Ok(hits)
    }

    /// Name completions, at most five per table. Short terms give nothing.
    pub fn suggestions(exec: &QueryExecutor, term: &str) -> AppResult<Vec<Suggestion>> {
        let term = term.trim();
        if term.chars().count() < SUGGEST_MIN_CHARS {
            return Ok(Vec::new());
        }
        let pattern = like_pattern(term);

        let mut out = Vec::new();
        for (kind, sql) in [
            (
                InventoryKind::Equipment,
                "SELECT name FROM equipment
                 WHERE lower(name) LIKE ?1 ESCAPE '\\' OR lower(manufacturer) LIKE ?1 ESCAPE '\\' LIMIT ?2",
            ),
            (
                InventoryKind::Medicines,
                "SELECT name FROM medicines
                 WHERE lower(name) LIKE ?1 ESCAPE '\\' OR lower(manufacturer) LIKE ?1 ESCAPE '\\' LIMIT ?2",
            ),
            (
                InventoryKind::Surgery,
                "SELECT name FROM surgical_supplies
                 WHERE lower(name) LIKE ?1 ESCAPE '\\' OR lower(manufacturer) LIKE ?1 ESCAPE '\\' LIMIT ?2",
            ),
        ] {
            out.extend(exec.query(sql, params![pattern, SUGGEST_PER_TABLE], |row| {
                Ok(Suggestion {
                    name: row.get(0)?,
                    kind: kind.label().to_string(),
                })
            })?);
        }
        Ok(out)
    }

    pub fn counts(exec: &QueryExecutor) -> AppResult<(i64, i64, i64)> {
        Ok((
            exec.query_scalar("SELECT COUNT(*) FROM equipment", [])?,
            exec.query_scalar("SELECT COUNT(*) FROM medicines", [])?,
            exec.query_scalar("SELECT COUNT(*) FROM surgical_supplies", [])?,
        ))
    }
}

fn like_pattern(term: &str) -> String {
    like_contains(&term.to_lowercase())
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

fn check_text(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::InvalidInput(format!("{field} must not be empty")));
    }
    Ok(())
}

fn check_amount(field: &str, value: f64) -> AppResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::InvalidNumber(field.to_string()));
    }
    Ok(())
}

fn check_count(field: &str, value: i64) -> AppResult<()> {
    if value < 0 {
        return Err(AppError::InvalidNumber(field.to_string()));
    }
    Ok(())
}
