// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Read query operations for the maintenance log.

use rusqlite::params;

use crate::connection::ReportDb;
use crate::error::{Error, Result};
use crate::types::{
    ActionType, LogicalReport, ReportHeader, ReportSummary, Role, Session, StepRow, UserSummary,
};

impl ReportDb {
    /// Verify a username/password-hash pair against the active user records.
    ///
    /// The hash is computed by the caller; storage only does an equality
    /// comparison. Inactive users never authenticate. A miss is reported as
    /// [`Error::InvalidCredentials`] without distinguishing an unknown user
    /// from a wrong password.
    pub fn authenticate(&self, username: &str, password_hash: &str) -> Result<Session> {
        let mut stmt = self.conn.prepare_cached(
            r#"
            SELECT u.id, u.display_name, u.role, u.workshop_id, w.name
            FROM users u
            LEFT JOIN workshops w ON u.workshop_id = w.id
            WHERE u.username = ?1 AND u.password_hash = ?2 AND u.is_active = 1
            "#,
        )?;

        let session = stmt.query_row(params![username, password_hash], |row| {
            Ok(Session {
                user_id: row.get(0)?,
                display_name: row.get(1)?,
                role: row.get(2)?,
                workshop_id: row.get(3)?,
                workshop_name: row.get(4)?,
            })
        });

        match session {
            Ok(session) => Ok(session),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(Error::InvalidCredentials),
            Err(e) => Err(e.into()),
        }
    }

    /// Reconstruct the logical report that contains `step_id`.
    ///
    /// Reports are not stored as rows of their own, so the lookup is
    /// two-phase: resolve the `(component_id, action_type)` group key from
    /// the anchor step, then re-query the full step sequence by that key.
    /// Any member step works as the anchor; it need not be the first one.
    pub fn derive_report(&self, step_id: i64) -> Result<LogicalReport> {
        let (component_id, action_type) = self.step_group_key(step_id)?;
        let header = self.group_header(component_id, action_type)?;
        let steps = self.steps_in_group(component_id, action_type)?;
        Ok(LogicalReport { header, steps })
    }

    /// Role-filtered listing of logged steps, most recent first.
    ///
    /// One row per step: every member of a multi-step report shows up as
    /// its own entry. The workshop column comes from the authoring user
    /// (unlike the report header, which resolves it through the component),
    /// and technicians only get their own rows; the restriction lives in
    /// the WHERE clause, not in post-processing.
    pub fn list_reports(&self, session: &Session) -> Result<Vec<ReportSummary>> {
        let mut summaries = Vec::new();
        match session.role {
            Role::Admin => {
                let mut stmt = self.conn.prepare_cached(
                    r#"
                    SELECT s.id, c.name, c.inventory_code, s.action_type,
                           u.display_name, w.name, s.logged_at
                    FROM steps s
                    INNER JOIN components c ON s.component_id = c.id
                    INNER JOIN users u ON s.user_id = u.id
                    INNER JOIN workshops w ON u.workshop_id = w.id
                    ORDER BY s.logged_at DESC
                    "#,
                )?;
                let mut rows = stmt.query([])?;
                while let Some(row) = rows.next()? {
                    summaries.push(summary_from_row(row)?);
                }
            }
            Role::Technician => {
                let mut stmt = self.conn.prepare_cached(
                    r#"
                    SELECT s.id, c.name, c.inventory_code, s.action_type,
                           u.display_name, w.name, s.logged_at
                    FROM steps s
                    INNER JOIN components c ON s.component_id = c.id
                    INNER JOIN users u ON s.user_id = u.id
                    INNER JOIN workshops w ON u.workshop_id = w.id
                    WHERE s.user_id = ?1
                    ORDER BY s.logged_at DESC
                    "#,
                )?;
                let mut rows = stmt.query(params![session.user_id])?;
                while let Some(row) = rows.next()? {
                    summaries.push(summary_from_row(row)?);
                }
            }
        }
        Ok(summaries)
    }

    /// All user accounts with their workshop, ordered by display name.
    pub fn list_users(&self) -> Result<Vec<UserSummary>> {
        let mut stmt = self.conn.prepare_cached(
            r#"
            SELECT u.id, u.display_name, u.role, w.name
            FROM users u
            LEFT JOIN workshops w ON u.workshop_id = w.id
            ORDER BY u.display_name ASC
            "#,
        )?;

        let mut users = Vec::new();
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            users.push(UserSummary {
                user_id: row.get(0)?,
                display_name: row.get(1)?,
                role: row.get(2)?,
                workshop_name: row.get(3)?,
            });
        }
        Ok(users)
    }

    /// Resolve the group key of the anchor step (phase one).
    fn step_group_key(&self, step_id: i64) -> Result<(i64, ActionType)> {
        let mut stmt = self.conn.prepare_cached(
            r#"
            SELECT component_id, action_type FROM steps WHERE id = ?1
            "#,
        )?;

        let key = stmt.query_row(params![step_id], |row| Ok((row.get(0)?, row.get(1)?)));

        match key {
            Ok(key) => Ok(key),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(Error::ReportNotFound(step_id)),
            Err(e) => Err(e.into()),
        }
    }

    /// The full step sequence of a group, ordered by step number (phase two).
    fn steps_in_group(&self, component_id: i64, action_type: ActionType) -> Result<Vec<StepRow>> {
        let mut stmt = self.conn.prepare_cached(
            r#"
            SELECT id, component_id, user_id, action_type, step_number,
                   description, photo_ref, logged_at
            FROM steps
            WHERE component_id = ?1 AND action_type = ?2
            ORDER BY step_number ASC
            "#,
        )?;

        let mut steps = Vec::new();
        let mut rows = stmt.query(params![component_id, action_type])?;
        while let Some(row) = rows.next()? {
            steps.push(StepRow {
                id: row.get(0)?,
                component_id: row.get(1)?,
                user_id: row.get(2)?,
                action_type: row.get(3)?,
                step_number: row.get(4)?,
                description: row.get(5)?,
                photo_ref: row.get(6)?,
                logged_at: row.get(7)?,
            });
        }
        Ok(steps)
    }

    /// Header fields for a group, taken from its earliest-logged step.
    ///
    /// Ties on the timestamp (same-second inserts) are broken by step
    /// number. The workshop is resolved through the component and may be
    /// absent, which is not an error.
    fn group_header(&self, component_id: i64, action_type: ActionType) -> Result<ReportHeader> {
        let mut stmt = self.conn.prepare_cached(
            r#"
            SELECT c.name, c.inventory_code, s.action_type, u.display_name, w.name, s.logged_at
            FROM steps s
            INNER JOIN components c ON s.component_id = c.id
            INNER JOIN users u ON s.user_id = u.id
            LEFT JOIN workshops w ON c.workshop_id = w.id
            WHERE s.component_id = ?1 AND s.action_type = ?2
            ORDER BY s.logged_at ASC, s.step_number ASC
            LIMIT 1
            "#,
        )?;

        let header = stmt.query_row(params![component_id, action_type], |row| {
            Ok(ReportHeader {
                component_name: row.get(0)?,
                inventory_code: row.get(1)?,
                action_type: row.get(2)?,
                technician_name: row.get(3)?,
                workshop_name: row.get(4)?,
                logged_at: row.get(5)?,
            })
        })?;
        Ok(header)
    }
}

fn summary_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ReportSummary> {
    Ok(ReportSummary {
        step_id: row.get(0)?,
        component_name: row.get(1)?,
        inventory_code: row.get(2)?,
        action_type: row.get(3)?,
        technician_name: row.get(4)?,
        workshop_name: row.get(5)?,
        logged_at: row.get(6)?,
    })
}
