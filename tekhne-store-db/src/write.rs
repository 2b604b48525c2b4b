// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Write operations for the maintenance log.
//!
//! Authoring is append-only: components are created on first use and never
//! updated, steps are inserted one by one and never edited or deleted.

use rusqlite::params;
use tracing::debug;

use crate::connection::ReportDb;
use crate::error::{Error, Result};
use crate::types::ActionType;

/// Parameters for logging a new procedure step.
#[derive(Debug, Clone)]
pub struct InsertStepParams {
    /// Component the procedure is performed on
    pub component_id: i64,
    /// Authoring user
    pub user_id: i64,
    /// Procedure classification
    pub action_type: ActionType,
    /// Position within the logical report, starting at 1
    pub step_number: u32,
    /// What was done in this step
    pub description: Option<String>,
    /// Photo reference (path or URI)
    pub photo_ref: Option<String>,
}

impl ReportDb {
    /// Find a component by inventory code, creating it on first use.
    ///
    /// An existing row is returned unchanged: the given name and workshop
    /// never overwrite what was stored first. Lookup and insert run inside
    /// one transaction, and a raced UNIQUE violation on the insert falls
    /// back to a second lookup before giving up.
    pub fn resolve_component(
        &mut self,
        name: &str,
        inventory_code: &str,
        workshop_id: i64,
    ) -> Result<i64> {
        if name.trim().is_empty() || inventory_code.trim().is_empty() {
            return Err(Error::Validation(
                "component name and inventory code are required".into(),
            ));
        }

        let tx = self.conn.transaction()?;

        let existing = tx.query_row(
            "SELECT id FROM components WHERE inventory_code = ?1",
            params![inventory_code],
            |row| row.get::<_, i64>(0),
        );

        let id = match existing {
            Ok(id) => id,
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                let inserted = tx.execute(
                    "INSERT INTO components (name, inventory_code, workshop_id) VALUES (?1, ?2, ?3)",
                    params![name, inventory_code, workshop_id],
                );
                match inserted {
                    Ok(_) => {
                        let id = tx.last_insert_rowid();
                        debug!("Created component '{inventory_code}' (id {id})");
                        id
                    }
                    Err(e) if is_constraint_violation(&e) => {
                        // Lost the insert race; the row exists now.
                        tx.query_row(
                            "SELECT id FROM components WHERE inventory_code = ?1",
                            params![inventory_code],
                            |row| row.get(0),
                        )
                        .map_err(|_| {
                            Error::Integrity(format!(
                                "component '{inventory_code}' conflicts with an existing row: {e}"
                            ))
                        })?
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            Err(e) => return Err(e.into()),
        };

        tx.commit()?;
        Ok(id)
    }

    /// Log one procedure step.
    ///
    /// `logged_at` defaults to the insertion time. A step must carry a
    /// description or a photo; whitespace-only values count as missing.
    /// Returns the database id of the new step.
    pub fn insert_step(&self, params: &InsertStepParams) -> Result<i64> {
        if params.step_number < 1 {
            return Err(Error::Validation("step number must be positive".into()));
        }
        let description = params
            .description
            .as_deref()
            .filter(|d| !d.trim().is_empty());
        let photo_ref = params.photo_ref.as_deref().filter(|p| !p.trim().is_empty());
        if description.is_none() && photo_ref.is_none() {
            return Err(Error::Validation(
                "a step needs a description or a photo".into(),
            ));
        }

        let result = self.conn.execute(
            r#"
            INSERT INTO steps (component_id, user_id, action_type, step_number, description, photo_ref)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                params.component_id,
                params.user_id,
                params.action_type,
                params.step_number,
                description,
                photo_ref.unwrap_or(""),
            ],
        );

        match result {
            Ok(_) => Ok(self.conn.last_insert_rowid()),
            Err(e) if is_constraint_violation(&e) => Err(Error::Integrity(format!(
                "cannot log step {} for component {}: {e}",
                params.step_number, params.component_id
            ))),
            Err(e) => Err(e.into()),
        }
    }

    /// Next free step number for a component (1 for a fresh one).
    ///
    /// Step numbers are unique per component, not per action type, so the
    /// counter spans both action types.
    pub fn next_step_number(&self, component_id: i64) -> Result<u32> {
        let max: Option<u32> = self.conn.query_row(
            "SELECT MAX(step_number) FROM steps WHERE component_id = ?1",
            params![component_id],
            |row| row.get(0),
        )?;
        Ok(max.unwrap_or(0) + 1)
    }
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}
