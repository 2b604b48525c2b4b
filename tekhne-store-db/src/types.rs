// SPDX-FileCopyrightText: 2025 Jörg Thalheim
// SPDX-License-Identifier: MIT

//! Row and domain types for maintenance procedure records.

use std::fmt;
use std::str::FromStr;

use rusqlite::ToSql;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use thiserror::Error;

/// Unknown role value in the database or on the command line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown role '{0}', expected 'Admin' or 'Technician'")]
pub struct UnknownRole(pub String);

/// Account role. Admins see every report; technicians only their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    Technician,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Technician => "Technician",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Admin" => Ok(Role::Admin),
            "Technician" => Ok(Role::Technician),
            other => Err(UnknownRole(other.to_owned())),
        }
    }
}

impl FromSql for Role {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: UnknownRole| FromSqlError::Other(Box::new(e)))
    }
}

impl ToSql for Role {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

/// Unknown action-type value in the database or on the command line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown action type '{0}', expected 'Assemble' or 'Disassemble'")]
pub struct UnknownActionType(pub String);

/// Procedure classification. Together with the component it forms the
/// grouping key of a logical report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionType {
    Assemble,
    Disassemble,
}

impl ActionType {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionType::Assemble => "Assemble",
            ActionType::Disassemble => "Disassemble",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionType {
    type Err = UnknownActionType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Assemble" => Ok(ActionType::Assemble),
            "Disassemble" => Ok(ActionType::Disassemble),
            other => Err(UnknownActionType(other.to_owned())),
        }
    }
}

impl FromSql for ActionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: UnknownActionType| FromSqlError::Other(Box::new(e)))
    }
}

impl ToSql for ActionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

/// Authenticated caller identity.
///
/// Passed explicitly into every query that depends on who is asking; there
/// is no ambient session state anywhere in the crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Database row id of the user
    pub user_id: i64,
    /// Full display name
    pub display_name: String,
    /// Account role
    pub role: Role,
    /// Workshop assignment (admins may have none)
    pub workshop_id: Option<i64>,
    /// Name of the assigned workshop
    pub workshop_name: Option<String>,
}

/// A catalogued physical component, keyed by inventory code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentRow {
    pub id: i64,
    pub name: String,
    pub inventory_code: String,
    pub workshop_id: i64,
}

/// One logged procedure step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRow {
    /// Database row id
    pub id: i64,
    /// Component the procedure was performed on
    pub component_id: i64,
    /// Author of the step
    pub user_id: i64,
    /// Procedure classification
    pub action_type: ActionType,
    /// Position within the logical report, starting at 1
    pub step_number: u32,
    /// Free-text description of what was done
    pub description: Option<String>,
    /// Photo reference; empty when no photo was attached
    pub photo_ref: String,
    /// Insertion timestamp (`YYYY-MM-DD HH:MM:SS`)
    pub logged_at: String,
}

impl StepRow {
    /// The photo reference, if one was attached.
    pub fn photo(&self) -> Option<&str> {
        if self.photo_ref.is_empty() {
            None
        } else {
            Some(&self.photo_ref)
        }
    }
}

/// Header fields of a logical report, taken from its earliest-logged step
/// joined to the component, the authoring user and the component's workshop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportHeader {
    pub component_name: String,
    pub inventory_code: String,
    pub action_type: ActionType,
    pub technician_name: String,
    /// Resolved through the component; may be absent
    pub workshop_name: Option<String>,
    pub logged_at: String,
}

impl ReportHeader {
    /// Date portion of the timestamp.
    pub fn logged_date(&self) -> &str {
        self.logged_at.get(..10).unwrap_or(&self.logged_at)
    }
}

/// A logical report: header plus the full step sequence in step-number
/// order. Never stored; always derived from a member step id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalReport {
    pub header: ReportHeader,
    pub steps: Vec<StepRow>,
}

/// One row of the report listing.
///
/// The listing is per step: a multi-step report contributes one entry per
/// member step. The workshop here is the authoring user's, not the
/// component's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSummary {
    pub step_id: i64,
    pub component_name: String,
    pub inventory_code: String,
    pub action_type: ActionType,
    pub technician_name: String,
    pub workshop_name: String,
    pub logged_at: String,
}

/// One row of the user listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSummary {
    pub user_id: i64,
    pub display_name: String,
    pub role: Role,
    pub workshop_name: Option<String>,
}
