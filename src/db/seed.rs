//! Demonstration rows inserted once into a fresh database.

use crate::core::registrations::{NewRegistration, insert_registration};
use crate::core::seedgen::hash_password;
use crate::db::schema::SchemaSet;
use crate::errors::AppResult;
use crate::models::registration::RegistrationType;
use crate::utils::date::{format_date, today};
use rand::Rng;
use rusqlite::{Connection, params};

pub const SEED_MANAGER_EMAIL: &str = "manager@kmrl.com";
pub const SEED_MANAGER_PASSWORD: &str = "password";

/// Whether the sentinel row of `set` is already there.
pub fn is_seeded(conn: &Connection, set: SchemaSet) -> AppResult<bool> {
    let sql = match set {
        SchemaSet::Portal => "SELECT COUNT(*) FROM users WHERE role = 'manager'",
        SchemaSet::Inventory => {
            "SELECT (SELECT COUNT(*) FROM equipment)
                  + (SELECT COUNT(*) FROM medicines)
                  + (SELECT COUNT(*) FROM surgical_supplies)"
        }
        SchemaSet::Registrations => "SELECT COUNT(*) FROM faculty WHERE id = 1",
    };
    let count: i64 = conn.query_row(sql, [], |row| row.get(0))?;
    Ok(count > 0)
}

/// Insert the demonstration rows of `set`. Returns how many rows were written.
pub fn insert_seed<R: Rng + ?Sized>(conn: &Connection, set: SchemaSet, rng: &mut R) -> AppResult<usize> {
    match set {
        SchemaSet::Portal => seed_portal(conn),
        SchemaSet::Inventory => seed_inventory(conn),
        SchemaSet::Registrations => seed_registrations(conn, rng),
    }
}

fn seed_portal(conn: &Connection) -> AppResult<usize> {
    let n = conn.execute(
        "INSERT INTO users (full_name, email, password, role) VALUES (?1, ?2, ?3, 'manager')",
        params![
            "Admin Manager",
            SEED_MANAGER_EMAIL,
            hash_password(SEED_MANAGER_PASSWORD)
        ],
    )?;
    Ok(n)
}

fn seed_inventory(conn: &Connection) -> AppResult<usize> {
    let added = format_date(today());
    let mut n = 0;

    n += conn.execute(
        "INSERT INTO equipment
            (equipment_id, name, manufacturer, cost, location, last_maintenance, next_maintenance, date_added)
         VALUES (1, 'X-Ray Machine', 'Siemens', 50000.00, 'Radiology', '2024-12-01', '2025-06-01', ?1)",
        [&added],
    )?;
    n += conn.execute(
        "INSERT INTO medicines (medicine_id, name, manufacturer, quantity, cost, expiry_date, date_added)
         VALUES (1, 'Paracetamol', 'GSK', 100, 5.99, '2025-12-31', ?1)",
        [&added],
    )?;
    n += conn.execute(
        "INSERT INTO surgical_supplies
            (supply_id, name, manufacturer, cost, last_maintenance, next_maintenance, quantity, supply_type, date_added)
         VALUES (1, 'Surgical Scissors', 'Medtronic', 129.99, '2024-11-15', '2025-05-15', 50, 'Cutting', ?1)",
        [&added],
    )?;
    Ok(n)
}

fn seed_registrations<R: Rng + ?Sized>(conn: &Connection, rng: &mut R) -> AppResult<usize> {
    let mut n = 0;

    let mut faculty = conn.prepare(
        "INSERT INTO faculty (id, name, qualification, department, subjects, email)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;
    for row in [
        (
            1,
            "Dr. Anuj Kumar",
            "Ph.D, M.Tech (HOD, CSE)",
            "CSE",
            "Engineering Maths, Data Structures",
            "anuj.k@srms.ac.in",
        ),
        (
            2,
            "Prof. Shweta Sharma",
            "M.Tech (CSE)",
            "CSE",
            "C Programming, Web Tech",
            "shweta.s@srms.ac.in",
        ),
    ] {
        n += faculty.execute(params![row.0, row.1, row.2, row.3, row.4, row.5])?;
    }

    let mut events =
        conn.prepare("INSERT INTO events (id, name, category, event_date) VALUES (?1, ?2, ?3, ?4)")?;
    for (id, name, category, date) in [
        (1, "CodeClash 2025", "Tech", "2025-08-15"),
        (2, "RoboWars", "Tech", "2025-09-01"),
    ] {
        n += events.execute(params![id, name, category, date])?;
    }

    let individual = NewRegistration {
        event_id: 1,
        kind: RegistrationType::Individual,
        registrant: "Amit Kumar",
        national_id: "123456789012",
        members: &[],
    };
    insert_registration(conn, &individual, rng)?;
    n += 1;

    let members = ["Sunita Sharma", "Rajesh Verma", "Priya Gupta"];
    let team = NewRegistration {
        event_id: 2,
        kind: RegistrationType::Team,
        registrant: "Sunita Sharma (Team Leader)",
        national_id: "987654321098",
        members: &members,
    };
    insert_registration(conn, &team, rng)?;
    n += 1 + members.len();

    Ok(n)
}
