use chrono::NaiveDate;
use rportal::core::alerts::{AlertLogic, AlertSettings};
use rportal::core::inventory::{InventoryLogic, NewEquipment, NewMedicine, NewSupply, Search, SearchBy};
use rportal::core::reports::{ReportKind, ReportLogic, ReportQuery};
use rportal::db::executor::QueryExecutor;
use rportal::errors::AppError;
use rportal::models::inventory::{InventoryKind, InventoryRows};
use rportal::utils::date::today;

mod common;
use common::open_exec;

const ACTOR: &str = "tester";

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn medicine(id: i64, name: &str, quantity: i64, expiry: &str) -> NewMedicine {
    NewMedicine {
        medicine_id: id,
        name: name.into(),
        manufacturer: "Cipla".into(),
        quantity,
        cost: 2.5,
        expiry_date: date(expiry),
    }
}

fn medicines(exec: &QueryExecutor, search: Search) -> Vec<String> {
    match InventoryLogic::list(exec, InventoryKind::Medicines, &search).unwrap() {
        InventoryRows::Medicines(rows) => rows.into_iter().map(|m| m.name).collect(),
        other => panic!("wrong rows: {other:?}"),
    }
}

#[test]
fn test_add_each_kind_and_count() {
    let (_dir, exec) = open_exec("add_kinds", 2);

    InventoryLogic::add_equipment(
        &exec,
        ACTOR,
        &NewEquipment {
            equipment_id: 2,
            name: "Ventilator".into(),
            manufacturer: "Philips".into(),
            cost: 12000.0,
            location: None,
            last_maintenance: date("2025-01-10"),
            next_maintenance: date("2025-07-10"),
            status: Some("  ".into()),
        },
    )
    .unwrap();
    InventoryLogic::add_medicine(&exec, ACTOR, &medicine(2, "Ibuprofen", 40, "2027-01-01")).unwrap();
    InventoryLogic::add_supply(
        &exec,
        ACTOR,
        &NewSupply {
            supply_id: 2,
            name: "Forceps".into(),
            manufacturer: "B. Braun".into(),
            cost: 45.0,
            last_maintenance: date("2025-02-01"),
            next_maintenance: date("2025-08-01"),
            quantity: 12,
            supply_type: "Grasping".into(),
        },
    )
    .unwrap();

    assert_eq!(InventoryLogic::counts(&exec).unwrap(), (2, 2, 2));

    let InventoryRows::Equipment(rows) =
        InventoryLogic::list(&exec, InventoryKind::Equipment, &Search::default()).unwrap()
    else {
        panic!("expected equipment rows");
    };
    let vent = rows.iter().find(|e| e.equipment_id == 2).unwrap();
    assert_eq!(vent.location, "Unknown");
    assert_eq!(vent.status, "Operational");

    let audited = exec
        .query_scalar("SELECT COUNT(*) FROM audit_log WHERE action = 'add' AND actor = ?1", [ACTOR])
        .unwrap();
    assert_eq!(audited, 3);
}

#[test]
fn test_duplicate_id_is_reported_and_store_unchanged() {
    let (_dir, exec) = open_exec("dup_item", 1);

    let err = InventoryLogic::add_medicine(&exec, ACTOR, &medicine(1, "Clone", 1, "2030-01-01")).unwrap_err();

    match err {
        AppError::Duplicate(msg) => assert!(msg.contains("already exists"), "{msg}"),
        other => panic!("expected Duplicate, got {other:?}"),
    }
    assert_eq!(medicines(&exec, Search::default()), vec!["Paracetamol"]);
}

#[test]
fn test_invalid_amounts_are_refused() {
    let (_dir, exec) = open_exec("bad_amounts", 1);
    let mut bad = medicine(5, "Negative", -1, "2030-01-01");
    assert!(matches!(
        InventoryLogic::add_medicine(&exec, ACTOR, &bad),
        Err(AppError::InvalidNumber(_))
    ));
    bad.quantity = 1;
    bad.name = "  ".into();
    assert!(matches!(
        InventoryLogic::add_medicine(&exec, ACTOR, &bad),
        Err(AppError::InvalidInput(_))
    ));
}

#[test]
fn test_list_filters_by_name_or_id() {
    let (_dir, exec) = open_exec("list_filter", 1);
    InventoryLogic::add_medicine(&exec, ACTOR, &medicine(7, "Amoxicillin", 20, "2027-03-01")).unwrap();

    let by_name = medicines(
        &exec,
        Search {
            term: Some("AMOX".into()),
            by: SearchBy::Name,
        },
    );
    assert_eq!(by_name, vec!["Amoxicillin"]);

    let by_maker = medicines(
        &exec,
        Search {
            term: Some("gsk".into()),
            by: SearchBy::Name,
        },
    );
    assert_eq!(by_maker, vec!["Paracetamol"]);

    let by_id = medicines(
        &exec,
        Search {
            term: Some("7".into()),
            by: SearchBy::Id,
        },
    );
    assert_eq!(by_id, vec!["Amoxicillin"]);

    let err = InventoryLogic::list(
        &exec,
        InventoryKind::Medicines,
        &Search {
            term: Some("seven".into()),
            by: SearchBy::Id,
        },
    )
    .unwrap_err();
    assert!(matches!(err, AppError::InvalidNumber(_)));
}

#[test]
fn test_update_field_validates_name_and_value() {
    let (_dir, exec) = open_exec("update_field", 1);

    InventoryLogic::update_field(&exec, ACTOR, InventoryKind::Medicines, 1, "quantity", "3").unwrap();
    InventoryLogic::update_field(&exec, ACTOR, InventoryKind::Equipment, 1, "next-maintenance", "2026-02-01")
        .unwrap();

    let qty = exec
        .query_scalar("SELECT quantity FROM medicines WHERE medicine_id = 1", [])
        .unwrap();
    assert_eq!(qty, 3);

    assert!(matches!(
        InventoryLogic::update_field(&exec, ACTOR, InventoryKind::Medicines, 1, "name; DROP TABLE medicines", "x"),
        Err(AppError::InvalidField(_))
    ));
    assert!(matches!(
        InventoryLogic::update_field(&exec, ACTOR, InventoryKind::Medicines, 1, "location", "ward"),
        Err(AppError::InvalidField(_))
    ));
    assert!(matches!(
        InventoryLogic::update_field(&exec, ACTOR, InventoryKind::Medicines, 1, "cost", "cheap"),
        Err(AppError::InvalidNumber(_))
    ));
    assert!(matches!(
        InventoryLogic::update_field(&exec, ACTOR, InventoryKind::Medicines, 1, "expiry_date", "31/12/2025"),
        Err(AppError::InvalidDate(_))
    ));
    assert!(matches!(
        InventoryLogic::update_field(&exec, ACTOR, InventoryKind::Surgery, 404, "quantity", "1"),
        Err(AppError::NotFound(_))
    ));

    let updates = exec
        .query_scalar("SELECT COUNT(*) FROM audit_log WHERE action = 'update'", [])
        .unwrap();
    assert_eq!(updates, 2);
}

#[test]
fn test_search_spans_all_tables() {
    let (_dir, exec) = open_exec("search_all", 1);

    let hits = InventoryLogic::search(&exec, "s").unwrap();
    let kinds: Vec<&str> = hits.iter().map(|h| h.kind.as_str()).collect();
    assert!(kinds.contains(&"equipment"), "Siemens");
    assert!(kinds.contains(&"surgery"), "Scissors");

    assert!(InventoryLogic::search(&exec, "   ").unwrap().is_empty());
    assert!(InventoryLogic::search(&exec, "zzz").unwrap().is_empty());
}

#[test]
fn test_wildcards_in_terms_match_literally() {
    let (_dir, exec) = open_exec("literal_terms", 1);
    InventoryLogic::add_medicine(&exec, ACTOR, &medicine(8, "Vit_C 500", 40, "2027-01-01")).unwrap();
    InventoryLogic::add_medicine(&exec, ACTOR, &medicine(9, "VitXC", 40, "2027-01-01")).unwrap();

    let names = medicines(
        &exec,
        Search {
            term: Some("t_c".into()),
            by: SearchBy::Name,
        },
    );
    assert_eq!(names, vec!["Vit_C 500"]);

    // a bare % no longer matches every row
    assert!(InventoryLogic::search(&exec, "%").unwrap().is_empty());
    assert!(InventoryLogic::suggestions(&exec, "%%").unwrap().is_empty());
}

#[test]
fn test_suggestions_need_two_characters() {
    let (_dir, exec) = open_exec("suggest", 1);

    assert!(InventoryLogic::suggestions(&exec, "p").unwrap().is_empty());

    let s = InventoryLogic::suggestions(&exec, "pa").unwrap();
    assert_eq!(s.len(), 1);
    assert_eq!(s[0].name, "Paracetamol");
    assert_eq!(s[0].kind, "medicine");
}

#[test]
fn test_suggestions_are_capped_per_table() {
    let (_dir, exec) = open_exec("suggest_cap", 1);
    for id in 10..18 {
        InventoryLogic::add_medicine(&exec, ACTOR, &medicine(id, &format!("Vitamin {id}"), 10, "2030-01-01"))
            .unwrap();
    }
    let s = InventoryLogic::suggestions(&exec, "vitamin").unwrap();
    assert_eq!(s.len(), 5);
}

#[test]
fn test_alerts_for_seeded_inventory() {
    let (_dir, exec) = open_exec("alerts", 1);
    let settings = AlertSettings::default();

    let quiet = AlertLogic::alerts(&exec, &settings, date("2025-01-01")).unwrap();
    assert_eq!(quiet.alert_count, 0);

    let busy = AlertLogic::alerts(&exec, &settings, date("2025-12-10")).unwrap();
    assert_eq!(busy.alert_count, 2);
    assert_eq!(busy.expiring_medicines[0].medicine.name, "Paracetamol");
    assert_eq!(busy.expiring_medicines[0].days_until_expiry, 21);
    // overdue maintenance stays listed with a negative count
    assert!(busy.maintenance_equipment[0].days_until_maintenance < 0);
    assert!(busy.low_stock_items.is_empty());
}

#[test]
fn test_oversized_alert_window_is_an_error() {
    let (_dir, exec) = open_exec("alerts_window", 1);
    let settings = AlertSettings {
        expiry_window_days: 100_000_000,
        ..AlertSettings::default()
    };

    let err = AlertLogic::alerts(&exec, &settings, date("2025-01-01")).unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));
    let err = AlertLogic::dashboard(&exec, &settings, date("2025-01-01")).unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));

    // near the end of the calendar the widest window still overflows
    let edge = AlertSettings {
        maintenance_window_days: 36_500,
        ..AlertSettings::default()
    };
    let err = AlertLogic::alerts(&exec, &edge, NaiveDate::MAX).unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));
}

#[test]
fn test_low_stock_threshold_is_inclusive() {
    let (_dir, exec) = open_exec("low_stock", 1);
    InventoryLogic::add_medicine(&exec, ACTOR, &medicine(3, "Insulin", 5, "2040-01-01")).unwrap();
    InventoryLogic::add_medicine(&exec, ACTOR, &medicine(4, "Saline", 6, "2040-01-01")).unwrap();

    let alerts = AlertLogic::alerts(&exec, &AlertSettings::default(), date("2025-01-01")).unwrap();

    assert_eq!(alerts.low_stock_items.len(), 1);
    assert_eq!(alerts.low_stock_items[0].name, "Insulin");
    assert_eq!(alerts.low_stock_items[0].kind, "medicine");

    let dash = AlertLogic::dashboard(&exec, &AlertSettings::default(), date("2025-01-01")).unwrap();
    assert_eq!(dash.medicine_count, 3);
    assert_eq!(dash.alert_count, alerts.alert_count);
}

#[test]
fn test_report_totals_for_seed_rows() {
    let (dir, exec) = open_exec("report", 1);

    let report = ReportLogic::report(&exec, &ReportQuery::default()).unwrap();
    assert_eq!(report.total_items, 3);
    assert_eq!(report.equipment_value, 50000.0);
    assert_eq!(report.medicines_value, 599.0);
    assert_eq!(report.surgery_value, 6499.5);
    assert_eq!(report.total_value, 57098.5);
    assert_eq!(report.detailed_data.len(), 3);

    let path = dir.path().join("report.csv");
    ReportLogic::write_csv(&report, &path).unwrap();
    let csv = std::fs::read_to_string(&path).unwrap();
    assert_eq!(csv.lines().count(), 4);
    assert!(csv.contains("Paracetamol"));
}

#[test]
fn test_report_kind_and_date_range() {
    let (_dir, exec) = open_exec("report_range", 1);

    let medicines_only = ReportLogic::report(
        &exec,
        &ReportQuery {
            kind: ReportKind::Medicines,
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(medicines_only.total_items, 1);
    assert_eq!(medicines_only.equipment_count, 0);
    assert_eq!(medicines_only.total_value, 599.0);

    let past = ReportLogic::report(
        &exec,
        &ReportQuery {
            kind: ReportKind::All,
            from: Some(date("2000-01-01")),
            to: Some(date("2000-12-31")),
        },
    )
    .unwrap();
    assert_eq!(past.total_items, 0);
    assert_eq!(past.total_value, 0.0);

    let including_today = ReportLogic::report(
        &exec,
        &ReportQuery {
            kind: ReportKind::All,
            from: Some(today()),
            to: Some(today()),
        },
    )
    .unwrap();
    assert_eq!(including_today.total_items, 3);

    assert!(matches!(
        ReportLogic::report(
            &exec,
            &ReportQuery {
                kind: ReportKind::All,
                from: Some(date("2025-02-01")),
                to: Some(date("2025-01-01")),
            },
        ),
        Err(AppError::InvalidInput(_))
    ));
}
