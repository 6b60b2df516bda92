use crate::core::audit::AuditLogic;
use crate::core::seedgen::{hash_sensitive, is_valid_national_id, registration_code};
use crate::db::executor::QueryExecutor;
use crate::errors::{AppError, AppResult};
use crate::models::audit::NewAuditEntry;
use crate::models::registration::{Event, Faculty, Registration, RegistrationType};
use crate::utils::time::now_stamp;
use rand::Rng;
use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, warn};

/// Fresh codes tried before giving up on a registration.
pub const MAX_CODE_ATTEMPTS: usize = 8;

const SELECT_REGISTRATION: &str = "
    SELECT r.id, r.event_id, e.name AS event_name, r.registration_type, r.registration_code,
           r.primary_registrant_name, r.national_id_hash, r.registration_date
    FROM event_registrations r
    JOIN events e ON r.event_id = e.id";

/// Input of a registration. `national_id` is the raw value; only its digest
/// is written.
#[derive(Debug, Clone)]
pub struct NewRegistration<'a> {
    pub event_id: i64,
    pub kind: RegistrationType,
    pub registrant: &'a str,
    pub national_id: &'a str,
    pub members: &'a [&'a str],
}

/// Insert a registration (and its team members) on `conn`.
///
/// The code comes from the generator and is retried on a `UNIQUE` clash;
/// a failed INSERT only aborts its own statement, so retrying inside the
/// caller's transaction is safe. Returns `(id, code)`.
pub fn insert_registration<R: Rng + ?Sized>(
    conn: &Connection,
    reg: &NewRegistration<'_>,
    rng: &mut R,
) -> AppResult<(i64, String)> {
    if !is_valid_national_id(reg.national_id) {
        return Err(AppError::InvalidInput(
            "national ID must be exactly 12 digits".into(),
        ));
    }
    if reg.registrant.trim().is_empty() {
        return Err(AppError::InvalidInput("registrant name is empty".into()));
    }

    let event: Option<i64> = conn
        .query_row("SELECT id FROM events WHERE id = ?1", [reg.event_id], |row| {
            row.get(0)
        })
        .optional()?;
    if event.is_none() {
        return Err(AppError::NotFound(format!("event {}", reg.event_id)));
    }

    let digest = hash_sensitive(reg.national_id);
    let mut stmt = conn.prepare_cached(
        "INSERT INTO event_registrations
            (event_id, registration_type, registration_code, primary_registrant_name,
             national_id_hash, registration_date)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;

    let mut inserted = None;
    for attempt in 1..=MAX_CODE_ATTEMPTS {
        let code = registration_code(reg.kind, rng);
        let result = stmt.execute(params![
            reg.event_id,
            reg.kind.to_db_str(),
            code,
            reg.registrant.trim(),
            digest,
            now_stamp(),
        ]);

        match result.map_err(AppError::from) {
            Ok(_) => {
                inserted = Some((conn.last_insert_rowid(), code));
                break;
            }
            Err(AppError::Duplicate(_)) => {
                debug!(attempt, code = %code, "registration code taken, retrying");
            }
            Err(e) => return Err(e),
        }
    }

    let Some((id, code)) = inserted else {
        warn!(attempts = MAX_CODE_ATTEMPTS, "no free registration code found");
        return Err(AppError::Duplicate(format!(
            "no free {} code after {MAX_CODE_ATTEMPTS} attempts",
            reg.kind.code_prefix()
        )));
    };

    if reg.kind == RegistrationType::Team {
        let mut member_stmt = conn.prepare_cached(
            "INSERT INTO team_members (registration_id, member_name) VALUES (?1, ?2)",
        )?;
        for member in reg.members.iter().map(|m| m.trim()).filter(|m| !m.is_empty()) {
            member_stmt.execute(params![id, member])?;
        }
    }

    Ok((id, code))
}

pub struct RegistrationLogic;

impl RegistrationLogic {
    pub fn register_individual(
        exec: &QueryExecutor,
        event_id: i64,
        name: &str,
        national_id: &str,
    ) -> AppResult<Registration> {
        let reg = NewRegistration {
            event_id,
            kind: RegistrationType::Individual,
            registrant: name,
            national_id,
            members: &[],
        };
        Self::register_with_rng(exec, &reg, &mut rand::thread_rng())
    }

    pub fn register_team(
        exec: &QueryExecutor,
        event_id: i64,
        leader: &str,
        national_id: &str,
        members: &[&str],
    ) -> AppResult<Registration> {
        if members.iter().all(|m| m.trim().is_empty()) {
            return Err(AppError::InvalidInput("a team needs at least one member".into()));
        }
        let reg = NewRegistration {
            event_id,
            kind: RegistrationType::Team,
            registrant: leader,
            national_id,
            members,
        };
        Self::register_with_rng(exec, &reg, &mut rand::thread_rng())
    }

    /// Registration plus audit entry in one transaction, with a caller
    /// supplied random source for the code.
    pub fn register_with_rng<R: Rng + ?Sized>(
        exec: &QueryExecutor,
        reg: &NewRegistration<'_>,
        rng: &mut R,
    ) -> AppResult<Registration> {
        let (id, code) = exec.transaction(|tx| {
            let (id, code) = insert_registration(tx, reg, rng)?;
            AuditLogic::append(
                tx,
                &NewAuditEntry::new(reg.registrant.trim(), "register", "registration")
                    .target(id)
                    .details(format!("{} registration {code}", reg.kind.to_db_str())),
            )?;
            Ok((id, code))
        })?;

        Self::find_by_code(exec, &code)?
            .filter(|r| r.id == id)
            .ok_or_else(|| AppError::NotFound(format!("registration {code}")))
    }

    pub fn list(exec: &QueryExecutor) -> AppResult<Vec<Registration>> {
        let sql = format!("{SELECT_REGISTRATION} ORDER BY r.id ASC");
        let mut regs = exec.query(&sql, [], Registration::from_row)?;
        for reg in regs.iter_mut() {
            if reg.registration_type == RegistrationType::Team {
                reg.members = Self::members(exec, reg.id)?;
            }
        }
        Ok(regs)
    }

    pub fn find_by_code(exec: &QueryExecutor, code: &str) -> AppResult<Option<Registration>> {
        let sql = format!("{SELECT_REGISTRATION} WHERE r.registration_code = ?1");
        let Some(mut reg) = exec.query_opt(&sql, [code], Registration::from_row)? else {
            return Ok(None);
        };
        reg.members = Self::members(exec, reg.id)?;
        Ok(Some(reg))
    }

    pub fn members(exec: &QueryExecutor, registration_id: i64) -> AppResult<Vec<String>> {
        exec.query(
            "SELECT member_name FROM team_members WHERE registration_id = ?1 ORDER BY id ASC",
            [registration_id],
            |row| row.get(0),
        )
    }

    /// Events by date, with how many registrations each has.
    pub fn events(exec: &QueryExecutor) -> AppResult<Vec<Event>> {
        exec.query(
            "SELECT e.id, e.name, e.category, e.event_date,
                    (SELECT COUNT(*) FROM event_registrations r WHERE r.event_id = e.id) AS registrations
             FROM events e
             ORDER BY e.event_date IS NULL, e.event_date ASC, e.id ASC",
            [],
            Event::from_row,
        )
    }

    /// Faculty directory, optionally narrowed to one department.
    pub fn faculty(exec: &QueryExecutor, department: Option<&str>) -> AppResult<Vec<Faculty>> {
        let department = department.map(str::trim).filter(|d| !d.is_empty());
        exec.query(
            "SELECT id, name, qualification, department, subjects, email
             FROM faculty
             WHERE (?1 IS NULL OR lower(department) = lower(?1))
             ORDER BY id ASC",
            [department],
            Faculty::from_row,
        )
    }

    pub fn count(exec: &QueryExecutor) -> AppResult<i64> {
        exec.query_scalar("SELECT COUNT(*) FROM event_registrations", [])
    }
}
