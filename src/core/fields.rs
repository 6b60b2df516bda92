//! Updatable inventory columns.
//!
//! A field name coming from the user is only ever matched against these
//! enums; each variant owns a fixed `UPDATE` statement. No column name is
//! ever formatted into SQL.

use crate::errors::{AppError, AppResult};
use crate::models::inventory::InventoryKind;
use crate::utils::date::{format_date, parse_count, parse_date, parse_number};
use rusqlite::types::Value;

/// How the new value of a field is validated before it is bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    /// Non-negative decimal amount.
    Number,
    /// Non-negative integer.
    Count,
    /// Strict `YYYY-MM-DD`.
    Date,
}

impl ValueKind {
    /// Validate `raw` for the column `field` and turn it into a bindable value.
    pub fn convert(&self, field: &str, raw: &str) -> AppResult<Value> {
        match self {
            ValueKind::Text => {
                let v = raw.trim();
                if v.is_empty() {
                    return Err(AppError::InvalidInput(format!("{field} must not be empty")));
                }
                Ok(Value::Text(v.to_string()))
            }
            ValueKind::Number => Ok(Value::Real(parse_number(field, raw)?)),
            ValueKind::Count => Ok(Value::Integer(parse_count(field, raw)?)),
            ValueKind::Date => Ok(Value::Text(format_date(parse_date(raw)?))),
        }
    }
}

macro_rules! updatable_fields {
    (
        $(#[$meta:meta])*
        $name:ident on $table:literal by $key:literal {
            $($variant:ident => $column:literal as $kind:ident),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn column(&self) -> &'static str {
                match self {
                    $($name::$variant => $column),+
                }
            }

            pub fn kind(&self) -> ValueKind {
                match self {
                    $($name::$variant => ValueKind::$kind),+
                }
            }

            /// `?1` is the new value, `?2` the row id.
            pub fn update_sql(&self) -> &'static str {
                match self {
                    $($name::$variant => concat!(
                        "UPDATE ", $table, " SET ", $column, " = ?1 WHERE ", $key, " = ?2"
                    )),+
                }
            }

            pub fn parse(s: &str) -> Option<Self> {
                let s = s.trim().to_lowercase().replace('-', "_");
                Self::ALL.iter().copied().find(|f| f.column() == s)
            }
        }
    };
}

updatable_fields! {
    EquipmentField on "equipment" by "equipment_id" {
        Name => "name" as Text,
        Manufacturer => "manufacturer" as Text,
        Cost => "cost" as Number,
        Location => "location" as Text,
        LastMaintenance => "last_maintenance" as Date,
        NextMaintenance => "next_maintenance" as Date,
        Status => "status" as Text,
    }
}

updatable_fields! {
    MedicineField on "medicines" by "medicine_id" {
        Name => "name" as Text,
        Manufacturer => "manufacturer" as Text,
        Quantity => "quantity" as Count,
        Cost => "cost" as Number,
        ExpiryDate => "expiry_date" as Date,
    }
}

updatable_fields! {
    SupplyField on "surgical_supplies" by "supply_id" {
        Name => "name" as Text,
        Manufacturer => "manufacturer" as Text,
        Cost => "cost" as Number,
        LastMaintenance => "last_maintenance" as Date,
        NextMaintenance => "next_maintenance" as Date,
        Quantity => "quantity" as Count,
        SupplyType => "supply_type" as Text,
    }
}

/// A field of one of the three inventory tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InventoryField {
    Equipment(EquipmentField),
    Medicine(MedicineField),
    Supply(SupplyField),
}

impl InventoryField {
    /// Resolve a user-supplied field name for `kind`. Unknown → `InvalidField`.
    pub fn parse(kind: InventoryKind, name: &str) -> AppResult<Self> {
        let field = match kind {
            InventoryKind::Equipment => EquipmentField::parse(name).map(InventoryField::Equipment),
            InventoryKind::Medicines => MedicineField::parse(name).map(InventoryField::Medicine),
            InventoryKind::Surgery => SupplyField::parse(name).map(InventoryField::Supply),
        };
        field.ok_or_else(|| AppError::InvalidField(format!("{} has no field '{}'", kind.label(), name.trim())))
    }

    pub fn column(&self) -> &'static str {
        match self {
            InventoryField::Equipment(f) => f.column(),
            InventoryField::Medicine(f) => f.column(),
            InventoryField::Supply(f) => f.column(),
        }
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            InventoryField::Equipment(f) => f.kind(),
            InventoryField::Medicine(f) => f.kind(),
            InventoryField::Supply(f) => f.kind(),
        }
    }

    pub fn update_sql(&self) -> &'static str {
        match self {
            InventoryField::Equipment(f) => f.update_sql(),
            InventoryField::Medicine(f) => f.update_sql(),
            InventoryField::Supply(f) => f.update_sql(),
        }
    }

    /// Column names accepted for `kind`, for help and error output.
    pub fn names(kind: InventoryKind) -> Vec<&'static str> {
        match kind {
            InventoryKind::Equipment => EquipmentField::ALL.iter().map(|f| f.column()).collect(),
            InventoryKind::Medicines => MedicineField::ALL.iter().map(|f| f.column()).collect(),
            InventoryKind::Surgery => SupplyField::ALL.iter().map(|f| f.column()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statements_are_fixed_per_field() {
        assert_eq!(
            EquipmentField::NextMaintenance.update_sql(),
            "UPDATE equipment SET next_maintenance = ?1 WHERE equipment_id = ?2"
        );
        assert_eq!(
            MedicineField::Quantity.update_sql(),
            "UPDATE medicines SET quantity = ?1 WHERE medicine_id = ?2"
        );
    }

    #[test]
    fn unknown_or_injected_names_are_rejected() {
        assert!(InventoryField::parse(InventoryKind::Medicines, "expiry-date").is_ok());
        assert!(InventoryField::parse(InventoryKind::Medicines, "location").is_err());
        assert!(InventoryField::parse(InventoryKind::Equipment, "name = 'x' --").is_err());
    }

    #[test]
    fn values_are_validated_by_kind() {
        assert!(ValueKind::Number.convert("cost", "12.50").is_ok());
        assert!(matches!(
            ValueKind::Count.convert("quantity", "ten"),
            Err(AppError::InvalidNumber(_))
        ));
        assert!(matches!(
            ValueKind::Date.convert("expiry_date", "2025/01/01"),
            Err(AppError::InvalidDate(_))
        ));
    }
}
