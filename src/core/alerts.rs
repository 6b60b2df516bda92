use crate::core::inventory::InventoryLogic;
use crate::db::executor::QueryExecutor;
use crate::errors::{AppError, AppResult};
use crate::models::inventory::{
    Alerts, Dashboard, Equipment, ExpiringMedicine, InventoryKind, LowStockItem, MaintenanceDue,
    Medicine,
};
use crate::utils::date::{DATE_FORMAT, format_date};
use chrono::{Duration, NaiveDate};
use rusqlite::params;
use tracing::warn;

pub const DEFAULT_EXPIRY_WINDOW_DAYS: i64 = 30;
pub const DEFAULT_MAINTENANCE_WINDOW_DAYS: i64 = 7;
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 5;
/// A hundred years.
pub const MAX_ALERT_WINDOW_DAYS: i64 = 36_500;

/// Thresholds of the three alert kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertSettings {
    pub expiry_window_days: i64,
    pub maintenance_window_days: i64,
    pub low_stock_threshold: i64,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            expiry_window_days: DEFAULT_EXPIRY_WINDOW_DAYS,
            maintenance_window_days: DEFAULT_MAINTENANCE_WINDOW_DAYS,
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
        }
    }
}

pub struct AlertLogic;

impl AlertLogic {
    /// Everything that needs attention as of `today`.
    ///
    /// Windows have no lower bound: expired medicines and overdue
    /// maintenance keep showing up, with a negative day count.
    pub fn alerts(exec: &QueryExecutor, settings: &AlertSettings, today: NaiveDate) -> AppResult<Alerts> {
        let expiry_limit = format_date(window_end(today, "expiry", settings.expiry_window_days)?);
        let maintenance_limit = format_date(window_end(
            today,
            "maintenance",
            settings.maintenance_window_days,
        )?);

        let expiring_medicines: Vec<ExpiringMedicine> = exec
            .query(
                "SELECT medicine_id, name, manufacturer, quantity, cost, expiry_date, date_added
                 FROM medicines
                 WHERE expiry_date <= ?1
                 ORDER BY expiry_date, medicine_id",
                [&expiry_limit],
                Medicine::from_row,
            )?
            .into_iter()
            .map(|medicine| ExpiringMedicine {
                days_until_expiry: days_between(today, &medicine.expiry_date),
                medicine,
            })
            .collect();

        let maintenance_equipment: Vec<MaintenanceDue> = exec
            .query(
                "SELECT equipment_id, name, manufacturer, cost, location, last_maintenance,
                        next_maintenance, status, date_added
                 FROM equipment
                 WHERE next_maintenance <= ?1
                 ORDER BY next_maintenance, equipment_id",
                [&maintenance_limit],
                Equipment::from_row,
            )?
            .into_iter()
            .map(|equipment| MaintenanceDue {
                days_until_maintenance: days_between(today, &equipment.next_maintenance),
                equipment,
            })
            .collect();

        let mut low_stock_items = Vec::new();
        for (kind, sql) in [
            (
                InventoryKind::Medicines,
                "SELECT medicine_id, name, quantity, cost, manufacturer
                 FROM medicines WHERE quantity <= ?1 ORDER BY quantity, medicine_id",
            ),
            (
                InventoryKind::Surgery,
                "SELECT supply_id, name, quantity, cost, manufacturer
                 FROM surgical_supplies WHERE quantity <= ?1 ORDER BY quantity, supply_id",
            ),
        ] {
            low_stock_items.extend(exec.query(sql, params![settings.low_stock_threshold], |row| {
                Ok(LowStockItem {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    kind: kind.label().to_string(),
                    quantity: row.get(2)?,
                    cost: row.get(3)?,
                    manufacturer: row.get(4)?,
                })
            })?);
        }

        let alert_count =
            expiring_medicines.len() + maintenance_equipment.len() + low_stock_items.len();

        Ok(Alerts {
            expiring_medicines,
            maintenance_equipment,
            low_stock_items,
            alert_count,
        })
    }

    pub fn dashboard(exec: &QueryExecutor, settings: &AlertSettings, today: NaiveDate) -> AppResult<Dashboard> {
        let (equipment_count, medicine_count, surgery_count) = InventoryLogic::counts(exec)?;
        let alerts = Self::alerts(exec, settings, today)?;

        Ok(Dashboard {
            equipment_count,
            medicine_count,
            surgery_count,
            alert_count: alerts.alert_count,
        })
    }
}

/// Last day covered by a window of `days` starting at `today`.
fn window_end(today: NaiveDate, what: &str, days: i64) -> AppResult<NaiveDate> {
    if !(0..=MAX_ALERT_WINDOW_DAYS).contains(&days) {
        return Err(AppError::InvalidInput(format!(
            "{what} window of {days} days is outside 0..={MAX_ALERT_WINDOW_DAYS}"
        )));
    }
    Duration::try_days(days)
        .and_then(|d| today.checked_add_signed(d))
        .ok_or_else(|| AppError::InvalidInput(format!("{what} window of {days} days overflows the calendar")))
}

fn days_between(today: NaiveDate, stored: &str) -> i64 {
    match NaiveDate::parse_from_str(stored, DATE_FORMAT) {
        Ok(date) => (date - today).num_days(),
        Err(e) => {
            warn!(value = stored, error = %e, "unparseable date in inventory row");
            0
        }
    }
}
