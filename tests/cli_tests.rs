use predicates::prelude::*;
use predicates::str::contains;

mod common;
use common::{init_db, rp, setup_test_db, write_file};

const MANAGER: [&str; 4] = ["--user", "manager@kmrl.com", "--password", "password"];

#[test]
fn test_init_creates_and_seeds_database() {
    let (_dir, db_path) = setup_test_db("cli_init");

    rp().args(["--db", &db_path, "--test", "init"])
        .assert()
        .success()
        .stdout(contains("Tables ready for: portal, inventory, registrations"))
        .stdout(contains("demonstration rows"));

    // second run finds the seed rows already there
    rp().args(["--db", &db_path, "--test", "init"])
        .assert()
        .success()
        .stdout(contains("nothing inserted"));
}

#[test]
fn test_seed_manager_login() {
    let (_dir, db_path) = setup_test_db("cli_login");
    init_db(&db_path);

    rp().args(["--db", &db_path, "--test", "user", "login"])
        .args(MANAGER)
        .assert()
        .success()
        .stdout(contains("Welcome, Admin Manager (manager)"));

    rp().args(["--db", &db_path, "--test", "user", "login"])
        .args(["--user", "manager@kmrl.com", "--password", "wrong"])
        .assert()
        .failure()
        .stderr(contains("Invalid email or password"));
}

#[test]
fn test_upload_review_flow() {
    let (dir, db_path) = setup_test_db("cli_docs");
    init_db(&db_path);
    let file = write_file(&dir, "bill.txt", "Invoice INV-77 total $300.00");

    rp().args(["--db", &db_path, "--test", "user", "register"])
        .args(["--name", "Ravi", "--email", "ravi@example.com", "--password", "pw"])
        .assert()
        .success()
        .stdout(contains("Registered Ravi"));

    rp().args(["--db", &db_path, "--test", "doc", "upload", &file])
        .args(["--user", "ravi@example.com", "--password", "pw"])
        .assert()
        .success()
        .stdout(contains("Uploaded 'bill.txt' as document 1"))
        .stdout(contains("Classified as 'Invoice'"));

    rp().args(["--db", &db_path, "--test", "doc", "approve", "1"])
        .args(["--user", "ravi@example.com", "--password", "pw"])
        .assert()
        .failure()
        .stderr(contains("Permission denied"));

    rp().args(["--db", &db_path, "--test", "doc", "approve", "1"])
        .args(MANAGER)
        .assert()
        .success()
        .stdout(contains("Document 1 approved"));

    rp().args(["--db", &db_path, "--test", "--json", "doc", "show", "1"])
        .args(["--user", "ravi@example.com", "--password", "pw"])
        .assert()
        .success()
        .stdout(contains("\"status\": \"Approved\""))
        .stdout(contains("\"Invoice\""));

    rp().args(["--db", &db_path, "--test", "log", "--limit", "50"])
        .assert()
        .success()
        .stdout(contains("approve"))
        .stdout(contains("upload"));
}

#[test]
fn test_manager_only_commands() {
    let (dir, db_path) = setup_test_db("cli_roles");
    init_db(&db_path);
    let file = write_file(&dir, "memo.txt", "private memo");
    let ravi = ["--user", "ravi@example.com", "--password", "pw"];
    let nina = ["--user", "nina@example.com", "--password", "pw"];

    for (name, email) in [("Ravi", "ravi@example.com"), ("Nina", "nina@example.com")] {
        rp().args(["--db", &db_path, "--test", "user", "register"])
            .args(["--name", name, "--email", email, "--password", "pw"])
            .assert()
            .success()
            .stdout(contains("as user"));
    }

    // self-registration cannot ask for a manager role
    rp().args(["--db", &db_path, "--test", "user", "register"])
        .args(["--name", "Eve", "--email", "eve@example.com", "--password", "pw", "--manager"])
        .assert()
        .failure();

    rp().args(["--db", &db_path, "--test", "user", "add-manager"])
        .args(["--name", "Eve", "--email", "eve@example.com", "--new-password", "pw"])
        .args(ravi)
        .assert()
        .failure()
        .stderr(contains("Permission denied"));

    rp().args(["--db", &db_path, "--test", "user", "add-manager"])
        .args(["--name", "Deputy", "--email", "deputy@example.com", "--new-password", "pw"])
        .args(MANAGER)
        .assert()
        .success()
        .stdout(contains("as manager"));

    rp().args(["--db", &db_path, "--test", "doc", "upload", &file])
        .args(ravi)
        .assert()
        .success();

    rp().args(["--db", &db_path, "--test", "doc", "pending"])
        .args(ravi)
        .assert()
        .failure()
        .stderr(contains("Permission denied"));

    rp().args(["--db", &db_path, "--test", "doc", "pending"])
        .args(["--user", "deputy@example.com", "--password", "pw"])
        .assert()
        .success()
        .stdout(contains("memo.txt"));

    rp().args(["--db", &db_path, "--test", "doc", "show", "1"])
        .args(nina)
        .assert()
        .failure()
        .stderr(contains("Permission denied"));

    rp().args(["--db", &db_path, "--test", "doc", "show", "1"])
        .args(ravi)
        .assert()
        .success()
        .stdout(contains("Document 1 - memo.txt"));
}

#[test]
fn test_inventory_commands() {
    let (_dir, db_path) = setup_test_db("cli_inv");
    init_db(&db_path);

    rp().args(["--db", &db_path, "--test", "inv", "add-medicine"])
        .args(["--id", "2", "--name", "Ibuprofen", "--manufacturer", "Abbott"])
        .args(["--quantity", "3", "--cost", "1.5", "--expiry", "2030-01-01"])
        .assert()
        .success()
        .stdout(contains("Added medicine with id 2"));

    rp().args(["--db", &db_path, "--test", "inv", "add-medicine"])
        .args(["--id", "2", "--name", "Again", "--manufacturer", "Abbott"])
        .args(["--quantity", "3", "--cost", "1.5", "--expiry", "2030-01-01"])
        .assert()
        .failure()
        .stderr(contains("already exists"));

    rp().args(["--db", &db_path, "--test", "inv", "add-medicine"])
        .args(["--id", "3", "--name", "Bad", "--manufacturer", "X"])
        .args(["--quantity", "1", "--cost", "1", "--expiry", "01-01-2030"])
        .assert()
        .failure()
        .stderr(contains("Invalid date format"));

    rp().args(["--db", &db_path, "--test", "inv", "update", "medicines", "2", "colour", "red"])
        .assert()
        .failure()
        .stderr(contains("valid: name, manufacturer, quantity, cost, expiry_date"));

    rp().args(["--db", &db_path, "--test", "--json", "inv", "dashboard"])
        .assert()
        .success()
        .stdout(contains("\"equipment_count\": 1"))
        .stdout(contains("\"medicine_count\": 2"));

    rp().args(["--db", &db_path, "--test", "inv", "list", "medicines", "--search", "ibu"])
        .assert()
        .success()
        .stdout(contains("Ibuprofen"));

    rp().args(["--db", &db_path, "--test", "inv", "suggest", "ibu"])
        .assert()
        .success()
        .stdout(contains("Ibuprofen (medicine)"));
}

#[test]
fn test_report_csv_export() {
    let (dir, db_path) = setup_test_db("cli_report");
    init_db(&db_path);
    let csv_path = dir.path().join("out.csv").to_string_lossy().to_string();

    rp().args(["--db", &db_path, "--test", "inv", "report", "--csv", &csv_path])
        .assert()
        .success()
        .stdout(contains("Report written to"))
        .stdout(contains("57098.50"));

    let content = std::fs::read_to_string(&csv_path).unwrap();
    assert!(content.contains("X-Ray Machine"));

    // existing file and --force: no prompt
    rp().args(["--db", &db_path, "--test", "inv", "report", "--csv", &csv_path, "-f"])
        .assert()
        .success();
}

#[test]
fn test_registration_commands() {
    let (_dir, db_path) = setup_test_db("cli_reg");
    init_db(&db_path);

    rp().args(["--db", &db_path, "--test", "reg", "individual"])
        .args(["--event", "1", "--name", "Meena", "--national-id", "444455556666"])
        .assert()
        .success()
        .stdout(contains("Registered Meena for CodeClash 2025 with code PID-"));

    rp().args(["--db", &db_path, "--test", "reg", "team"])
        .args(["--event", "2", "--leader", "Arun", "--national-id", "777788889999"])
        .args(["--member", "Arun", "--member", "Divya"])
        .assert()
        .success()
        .stdout(contains("with code TID-"));

    rp().args(["--db", &db_path, "--test", "reg", "individual"])
        .args(["--event", "1", "--name", "Short", "--national-id", "12345"])
        .assert()
        .failure()
        .code(1)
        .stderr(contains("12 digits"));

    rp().args(["--db", &db_path, "--test", "reg", "list"])
        .assert()
        .success()
        .stdout(contains("Amit Kumar"))
        .stdout(contains("Meena"))
        .stdout(contains("Arun"))
        .stdout(contains("444455556666").not());
}

#[test]
fn test_events_and_faculty_listing() {
    let (_dir, db_path) = setup_test_db("cli_events");
    init_db(&db_path);

    rp().args(["--db", &db_path, "--test", "reg", "events"])
        .assert()
        .success()
        .stdout(contains("CodeClash 2025"))
        .stdout(contains("RoboWars"));

    rp().args(["--db", &db_path, "--test", "--json", "reg", "faculty", "--department", "CSE"])
        .assert()
        .success()
        .stdout(contains("\"name\": \"Prof. Shweta Sharma\""));
}

#[test]
fn test_db_info_and_check() {
    let (_dir, db_path) = setup_test_db("cli_db");
    init_db(&db_path);

    rp().args(["--db", &db_path, "--test", "db", "--info", "--check"])
        .assert()
        .success()
        .stdout(contains("event_registrations"))
        .stdout(contains("Integrity check passed"));

    rp().args(["--db", &db_path, "--test", "--json", "db", "--check"])
        .assert()
        .success()
        .stdout(contains("\"integrity\": \"ok\""));
}
