use crate::db::executor::QueryExecutor;
use crate::errors::{AppError, AppResult};
use crate::models::inventory::{InventoryKind, Report, ReportRow};
use crate::utils::date::format_date;
use chrono::NaiveDate;
use csv::Writer;
use rusqlite::params;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    #[default]
    All,
    Equipment,
    Medicines,
    Surgery,
}

impl ReportKind {
    fn includes(&self, kind: InventoryKind) -> bool {
        match self {
            ReportKind::All => true,
            ReportKind::Equipment => kind == InventoryKind::Equipment,
            ReportKind::Medicines => kind == InventoryKind::Medicines,
            ReportKind::Surgery => kind == InventoryKind::Surgery,
        }
    }
}

/// Which rows a report covers. Both bounds are inclusive and apply to
/// `date_added`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportQuery {
    pub kind: ReportKind,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

struct Section {
    kind: InventoryKind,
    summary: &'static str,
    detail: &'static str,
}

const SECTIONS: [Section; 3] = [
    Section {
        kind: InventoryKind::Equipment,
        summary: "SELECT COUNT(*), SUM(cost) FROM equipment
                  WHERE (?1 IS NULL OR date_added >= ?1) AND (?2 IS NULL OR date_added <= ?2)",
        detail: "SELECT equipment_id, name, manufacturer, cost, NULL,
                        location || ' / ' || status, date_added
                 FROM equipment
                 WHERE (?1 IS NULL OR date_added >= ?1) AND (?2 IS NULL OR date_added <= ?2)
                 ORDER BY equipment_id DESC",
    },
    Section {
        kind: InventoryKind::Medicines,
        summary: "SELECT COUNT(*), SUM(cost * quantity) FROM medicines
                  WHERE (?1 IS NULL OR date_added >= ?1) AND (?2 IS NULL OR date_added <= ?2)",
        detail: "SELECT medicine_id, name, manufacturer, cost, quantity,
                        'expires ' || expiry_date, date_added
                 FROM medicines
                 WHERE (?1 IS NULL OR date_added >= ?1) AND (?2 IS NULL OR date_added <= ?2)
                 ORDER BY medicine_id DESC",
    },
    Section {
        kind: InventoryKind::Surgery,
        summary: "SELECT COUNT(*), SUM(cost * quantity) FROM surgical_supplies
                  WHERE (?1 IS NULL OR date_added >= ?1) AND (?2 IS NULL OR date_added <= ?2)",
        detail: "SELECT supply_id, name, manufacturer, cost, quantity, supply_type, date_added
                 FROM surgical_supplies
                 WHERE (?1 IS NULL OR date_added >= ?1) AND (?2 IS NULL OR date_added <= ?2)
                 ORDER BY supply_id DESC",
    },
];

pub struct ReportLogic;

impl ReportLogic {
    /// Counts and values per table plus the detail rows.
    ///
    /// Equipment is valued at its cost, medicines and supplies at
    /// cost × quantity. Values are rounded to cents.
    pub fn report(exec: &QueryExecutor, q: &ReportQuery) -> AppResult<Report> {
        if let (Some(from), Some(to)) = (q.from, q.to) {
            if from > to {
                return Err(AppError::InvalidInput(format!(
                    "start date {from} is after end date {to}"
                )));
            }
        }
        let from = q.from.map(format_date);
        let to = q.to.map(format_date);

        let mut report = Report {
            start_date: from.clone(),
            end_date: to.clone(),
            total_items: 0,
            total_value: 0.0,
            equipment_count: 0,
            medicines_count: 0,
            surgery_count: 0,
            equipment_value: 0.0,
            medicines_value: 0.0,
            surgery_value: 0.0,
            detailed_data: Vec::new(),
        };

        let mut raw_total = 0.0;
        for section in SECTIONS.iter().filter(|s| q.kind.includes(s.kind)) {
            let summary = exec.query_opt(section.summary, params![from, to], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, Option<f64>>(1)?.unwrap_or(0.0)))
            })?;
            let (count, value) = summary.unwrap_or((0, 0.0));
            raw_total += value;

            match section.kind {
                InventoryKind::Equipment => {
                    report.equipment_count = count;
                    report.equipment_value = round2(value);
                }
                InventoryKind::Medicines => {
                    report.medicines_count = count;
                    report.medicines_value = round2(value);
                }
                InventoryKind::Surgery => {
                    report.surgery_count = count;
                    report.surgery_value = round2(value);
                }
            }
            report.total_items += count;

            let label = section.kind.label();
            report
                .detailed_data
                .extend(exec.query(section.detail, params![from, to], |row| {
                    Ok(ReportRow {
                        kind: label.to_string(),
                        id: row.get(0)?,
                        name: row.get(1)?,
                        manufacturer: row.get(2)?,
                        cost: row.get(3)?,
                        quantity: row.get(4)?,
                        detail: row.get(5)?,
                        date_added: row.get(6)?,
                    })
                })?);
        }
        report.total_value = round2(raw_total);

        Ok(report)
    }

    /// Write the detail rows of `report` as CSV.
    pub fn write_csv(report: &Report, path: &Path) -> AppResult<()> {
        let mut wtr = Writer::from_path(path)?;
        for row in &report.detailed_data {
            wtr.serialize(row)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_cents() {
        assert_eq!(round2(1234.5678), 1234.57);
        assert_eq!(round2(0.004), 0.0);
    }

    #[test]
    fn kind_selects_sections() {
        assert!(ReportKind::All.includes(InventoryKind::Surgery));
        assert!(ReportKind::Medicines.includes(InventoryKind::Medicines));
        assert!(!ReportKind::Medicines.includes(InventoryKind::Equipment));
    }
}
