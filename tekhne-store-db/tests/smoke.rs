// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Smoke tests for tekhne-store-db.
//!
//! These tests verify the schema, the seeded accounts and the query and
//! write operations using an in-memory database.

use rusqlite::params;
use tekhne_store_db::{
    ActionType, Error, InsertStepParams, OpenMode, ReportDb, Role, SCHEMA_VERSION, Session,
};

/// MD5 digest of the demo password "123456".
const DEMO_HASH: &str = "e10adc3949ba59abbe56e057f20f883e";

fn tech_session(db: &ReportDb) -> Session {
    db.authenticate("tech", DEMO_HASH).unwrap()
}

fn step(component_id: i64, user_id: i64, number: u32) -> InsertStepParams {
    InsertStepParams {
        component_id,
        user_id,
        action_type: ActionType::Disassemble,
        step_number: number,
        description: Some(format!("step {number}")),
        photo_ref: None,
    }
}

/// Add a second technician account, assigned to the Electrical workshop.
fn add_technician(db: &ReportDb, username: &str, display_name: &str) -> i64 {
    db.connection()
        .execute(
            "INSERT INTO users (username, password_hash, display_name, role, workshop_id)
             VALUES (?1, ?2, ?3, 'Technician', 2)",
            params![username, DEMO_HASH, display_name],
        )
        .unwrap();
    db.connection().last_insert_rowid()
}

/// Verify schema creation and the seed rows.
#[test]
fn test_schema_and_seed() {
    let db = ReportDb::open_memory().unwrap();
    assert!(db.has_schema().unwrap());

    let workshops: i32 = db
        .connection()
        .query_row("SELECT COUNT(*) FROM workshops", [], |row| row.get(0))
        .unwrap();
    assert_eq!(workshops, 3);

    let users: i32 = db
        .connection()
        .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
        .unwrap();
    assert_eq!(users, 2);
}

/// Verify both seeded accounts authenticate with the expected identity.
#[test]
fn test_authenticate_seeded_accounts() {
    let db = ReportDb::open_memory().unwrap();

    let admin = db.authenticate("admin", DEMO_HASH).unwrap();
    assert_eq!(admin.role, Role::Admin);
    assert_eq!(admin.workshop_id, None);
    assert_eq!(admin.workshop_name, None);

    let tech = tech_session(&db);
    assert_eq!(tech.role, Role::Technician);
    assert_eq!(tech.display_name, "Juan Perez");
    assert_eq!(tech.workshop_id, Some(1));
    assert_eq!(tech.workshop_name.as_deref(), Some("Electromechanical"));
}

/// A wrong hash, an unknown user and a deactivated user all fail the same
/// way.
#[test]
fn test_authenticate_rejections() {
    let db = ReportDb::open_memory().unwrap();

    let wrong_hash = db.authenticate("tech", "0000");
    assert!(matches!(wrong_hash, Err(Error::InvalidCredentials)));

    let unknown = db.authenticate("nobody", DEMO_HASH);
    assert!(matches!(unknown, Err(Error::InvalidCredentials)));

    db.connection()
        .execute("UPDATE users SET is_active = 0 WHERE username = 'tech'", [])
        .unwrap();
    let inactive = db.authenticate("tech", DEMO_HASH);
    assert!(matches!(inactive, Err(Error::InvalidCredentials)));
}

/// resolve_component is find-or-create: a second call with a different name
/// and workshop returns the same id and leaves the stored row untouched.
#[test]
fn test_resolve_component_idempotent() {
    let mut db = ReportDb::open_memory().unwrap();

    let first = db.resolve_component("Motor", "INV-001", 1).unwrap();
    let second = db
        .resolve_component("Renamed Motor", "INV-001", 2)
        .unwrap();
    assert_eq!(first, second);

    let (name, workshop_id): (String, i64) = db
        .connection()
        .query_row(
            "SELECT name, workshop_id FROM components WHERE id = ?1",
            params![first],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(name, "Motor");
    assert_eq!(workshop_id, 1);
}

/// Empty name or inventory code is rejected before anything is written.
#[test]
fn test_resolve_component_validation() {
    let mut db = ReportDb::open_memory().unwrap();

    assert!(matches!(
        db.resolve_component("", "INV-001", 1),
        Err(Error::Validation(_))
    ));
    assert!(matches!(
        db.resolve_component("Motor", "  ", 1),
        Err(Error::Validation(_))
    ));
}

/// Steps inserted out of order come back ordered by step number, anchored
/// at any member step.
#[test]
fn test_derive_report_orders_steps() {
    let mut db = ReportDb::open_memory().unwrap();
    let tech = tech_session(&db);
    let component = db.resolve_component("Motor", "INV-001", 1).unwrap();

    let second = db
        .insert_step(&InsertStepParams {
            component_id: component,
            user_id: tech.user_id,
            action_type: ActionType::Disassemble,
            step_number: 2,
            description: Some("tighten bolts".into()),
            photo_ref: Some("photos/p2.jpg".into()),
        })
        .unwrap();
    db.insert_step(&InsertStepParams {
        component_id: component,
        user_id: tech.user_id,
        action_type: ActionType::Disassemble,
        step_number: 1,
        description: Some("remove cover".into()),
        photo_ref: None,
    })
    .unwrap();

    // Anchoring at the later step must still return the whole sequence.
    let report = db.derive_report(second).unwrap();
    let numbers: Vec<u32> = report.steps.iter().map(|s| s.step_number).collect();
    assert_eq!(numbers, vec![1, 2]);
    assert!(report.steps.iter().any(|s| s.id == second));
    assert!(
        report
            .steps
            .iter()
            .all(|s| s.component_id == component
                && s.action_type == ActionType::Disassemble)
    );

    assert_eq!(report.header.component_name, "Motor");
    assert_eq!(report.header.inventory_code, "INV-001");
    assert_eq!(report.header.action_type, ActionType::Disassemble);
    assert_eq!(report.header.technician_name, "Juan Perez");
    assert_eq!(
        report.header.workshop_name.as_deref(),
        Some("Electromechanical")
    );
}

/// The derived set only contains steps of the anchor's action type.
#[test]
fn test_derive_report_homogeneous_action() {
    let mut db = ReportDb::open_memory().unwrap();
    let tech = tech_session(&db);
    let component = db.resolve_component("Motor", "INV-001", 1).unwrap();

    let disassemble = db.insert_step(&step(component, tech.user_id, 1)).unwrap();
    db.insert_step(&InsertStepParams {
        action_type: ActionType::Assemble,
        ..step(component, tech.user_id, 10)
    })
    .unwrap();

    let report = db.derive_report(disassemble).unwrap();
    assert_eq!(report.steps.len(), 1);
    assert_eq!(report.steps[0].action_type, ActionType::Disassemble);
}

/// Unknown anchor ids are a typed miss.
#[test]
fn test_derive_report_not_found() {
    let db = ReportDb::open_memory().unwrap();
    assert!(matches!(
        db.derive_report(999),
        Err(Error::ReportNotFound(999))
    ));
}

/// Technicians only see their own rows; admins see everything.
#[test]
fn test_list_reports_role_filter() {
    let mut db = ReportDb::open_memory().unwrap();
    let tech = tech_session(&db);
    let other_id = add_technician(&db, "maria", "Maria Lopez");

    let component = db.resolve_component("Motor", "INV-001", 1).unwrap();
    db.insert_step(&step(component, tech.user_id, 1)).unwrap();
    db.insert_step(&step(component, other_id, 2)).unwrap();

    let own = db.list_reports(&tech).unwrap();
    assert_eq!(own.len(), 1);
    assert_eq!(own[0].technician_name, "Juan Perez");
    assert_eq!(own[0].workshop_name, "Electromechanical");

    let admin = db.authenticate("admin", DEMO_HASH).unwrap();
    let all = db.list_reports(&admin).unwrap();
    assert_eq!(all.len(), 2);
    // The listing workshop comes from the authoring user.
    assert!(
        all.iter()
            .any(|s| s.technician_name == "Maria Lopez" && s.workshop_name == "Electrical")
    );
}

/// Write/read round-trip: what goes into a step comes back out of the
/// derived report unchanged.
#[test]
fn test_step_round_trip() {
    let mut db = ReportDb::open_memory().unwrap();
    let tech = tech_session(&db);
    let component = db.resolve_component("Gearbox", "INV-077", 1).unwrap();

    let id = db
        .insert_step(&InsertStepParams {
            component_id: component,
            user_id: tech.user_id,
            action_type: ActionType::Assemble,
            step_number: 1,
            description: Some("seat the input shaft".into()),
            photo_ref: Some("photos/shaft.jpg".into()),
        })
        .unwrap();

    let report = db.derive_report(id).unwrap();
    assert_eq!(report.header.inventory_code, "INV-077");
    assert_eq!(report.header.component_name, "Gearbox");
    assert_eq!(report.header.action_type, ActionType::Assemble);

    let step = &report.steps[0];
    assert_eq!(step.id, id);
    assert_eq!(step.step_number, 1);
    assert_eq!(step.description.as_deref(), Some("seat the input shaft"));
    assert_eq!(step.photo(), Some("photos/shaft.jpg"));
}

/// Duplicate step numbers per component are a typed integrity violation.
#[test]
fn test_duplicate_step_number_rejected() {
    let mut db = ReportDb::open_memory().unwrap();
    let tech = tech_session(&db);
    let component = db.resolve_component("Motor", "INV-001", 1).unwrap();

    db.insert_step(&step(component, tech.user_id, 1)).unwrap();
    let duplicate = db.insert_step(&step(component, tech.user_id, 1));
    assert!(matches!(duplicate, Err(Error::Integrity(_))));
}

/// A step without a description and without a photo is rejected.
#[test]
fn test_empty_step_rejected() {
    let mut db = ReportDb::open_memory().unwrap();
    let tech = tech_session(&db);
    let component = db.resolve_component("Motor", "INV-001", 1).unwrap();

    let empty = db.insert_step(&InsertStepParams {
        component_id: component,
        user_id: tech.user_id,
        action_type: ActionType::Disassemble,
        step_number: 1,
        description: Some("   ".into()),
        photo_ref: None,
    });
    assert!(matches!(empty, Err(Error::Validation(_))));

    let zero = db.insert_step(&InsertStepParams {
        step_number: 0,
        ..step(component, tech.user_id, 0)
    });
    assert!(matches!(zero, Err(Error::Validation(_))));
}

/// The step counter starts at 1 and spans both action types.
#[test]
fn test_next_step_number() {
    let mut db = ReportDb::open_memory().unwrap();
    let tech = tech_session(&db);
    let component = db.resolve_component("Motor", "INV-001", 1).unwrap();

    assert_eq!(db.next_step_number(component).unwrap(), 1);

    db.insert_step(&step(component, tech.user_id, 1)).unwrap();
    db.insert_step(&InsertStepParams {
        action_type: ActionType::Assemble,
        ..step(component, tech.user_id, 5)
    })
    .unwrap();

    assert_eq!(db.next_step_number(component).unwrap(), 6);
}

/// A version bump on a writable open drops and re-seeds everything.
#[test]
fn test_version_mismatch_rebuilds() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tekhne.db");

    {
        let mut db = ReportDb::open(&path, OpenMode::Create).unwrap();
        db.resolve_component("Motor", "INV-001", 1).unwrap();
        db.connection()
            .pragma_update(None, "user_version", SCHEMA_VERSION + 1)
            .unwrap();
    }

    let db = ReportDb::open(&path, OpenMode::Create).unwrap();
    let components: i32 = db
        .connection()
        .query_row("SELECT COUNT(*) FROM components", [], |row| row.get(0))
        .unwrap();
    assert_eq!(components, 0);
    // Seed rows are back after the rebuild.
    tech_session(&db);
}

/// A read-only open cannot rebuild and reports the mismatch instead.
#[test]
fn test_version_mismatch_read_only() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tekhne.db");

    {
        let db = ReportDb::open(&path, OpenMode::Create).unwrap();
        db.connection()
            .pragma_update(None, "user_version", SCHEMA_VERSION + 1)
            .unwrap();
    }

    let result = ReportDb::open(&path, OpenMode::ReadOnly);
    assert!(matches!(
        result,
        Err(Error::SchemaVersionMismatch { found, .. }) if found == SCHEMA_VERSION + 1
    ));
}
