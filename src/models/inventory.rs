use rusqlite::Row;
use serde::{Deserialize, Serialize};

/// The three inventory tables.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum InventoryKind {
    Equipment,
    Medicines,
    Surgery,
}

impl InventoryKind {
    pub fn label(&self) -> &'static str {
        match self {
            InventoryKind::Equipment => "equipment",
            InventoryKind::Medicines => "medicine",
            InventoryKind::Surgery => "surgery",
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Equipment {
    pub equipment_id: i64,
    pub name: String,
    pub manufacturer: String,
    pub cost: f64,
    pub location: String,
    pub last_maintenance: String,
    pub next_maintenance: String,
    pub status: String,
    pub date_added: String,
}

impl Equipment {
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            equipment_id: row.get("equipment_id")?,
            name: row.get("name")?,
            manufacturer: row.get("manufacturer")?,
            cost: row.get("cost")?,
            location: row.get("location")?,
            last_maintenance: row.get("last_maintenance")?,
            next_maintenance: row.get("next_maintenance")?,
            status: row.get("status")?,
            date_added: row.get("date_added")?,
        })
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Medicine {
    pub medicine_id: i64,
    pub name: String,
    pub manufacturer: String,
    pub quantity: i64,
    pub cost: f64,
    pub expiry_date: String,
    pub date_added: String,
}

impl Medicine {
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            medicine_id: row.get("medicine_id")?,
            name: row.get("name")?,
            manufacturer: row.get("manufacturer")?,
            quantity: row.get("quantity")?,
            cost: row.get("cost")?,
            expiry_date: row.get("expiry_date")?,
            date_added: row.get("date_added")?,
        })
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SurgicalSupply {
    pub supply_id: i64,
    pub name: String,
    pub manufacturer: String,
    pub cost: f64,
    pub last_maintenance: String,
    pub next_maintenance: String,
    pub quantity: i64,
    pub supply_type: String,
    pub date_added: String,
}

impl SurgicalSupply {
    pub fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            supply_id: row.get("supply_id")?,
            name: row.get("name")?,
            manufacturer: row.get("manufacturer")?,
            cost: row.get("cost")?,
            last_maintenance: row.get("last_maintenance")?,
            next_maintenance: row.get("next_maintenance")?,
            quantity: row.get("quantity")?,
            supply_type: row.get("supply_type")?,
            date_added: row.get("date_added")?,
        })
    }
}

/// Rows of one inventory table.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum InventoryRows {
    Equipment(Vec<Equipment>),
    Medicines(Vec<Medicine>),
    Surgery(Vec<SurgicalSupply>),
}

impl InventoryRows {
    pub fn len(&self) -> usize {
        match self {
            InventoryRows::Equipment(v) => v.len(),
            InventoryRows::Medicines(v) => v.len(),
            InventoryRows::Surgery(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Hit of the cross-table search.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SearchHit {
    pub kind: String,
    pub id: i64,
    pub name: String,
    pub manufacturer: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Suggestion {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExpiringMedicine {
    #[serde(flatten)]
    pub medicine: Medicine,
    pub days_until_expiry: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MaintenanceDue {
    #[serde(flatten)]
    pub equipment: Equipment,
    pub days_until_maintenance: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LowStockItem {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub quantity: i64,
    pub cost: f64,
    pub manufacturer: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Alerts {
    pub expiring_medicines: Vec<ExpiringMedicine>,
    pub maintenance_equipment: Vec<MaintenanceDue>,
    pub low_stock_items: Vec<LowStockItem>,
    pub alert_count: usize,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Dashboard {
    pub equipment_count: i64,
    pub medicine_count: i64,
    pub surgery_count: i64,
    pub alert_count: usize,
}

/// One line of the detailed report.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ReportRow {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: i64,
    pub name: String,
    pub manufacturer: String,
    pub cost: f64,
    pub quantity: Option<i64>,
    pub detail: String,
    pub date_added: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub total_items: i64,
    pub total_value: f64,
    pub equipment_count: i64,
    pub medicines_count: i64,
    pub surgery_count: i64,
    pub equipment_value: f64,
    pub medicines_value: f64,
    pub surgery_value: f64,
    pub detailed_data: Vec<ReportRow>,
}
