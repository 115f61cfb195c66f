//! SQL statements issued against the EMPLOYEES table.
//!
//! Each statement carries its named-placeholder text (`:FIELD`) with the
//! matching bind map, plus the structured parts (action, ordered columns,
//! target id) a gateway uses to build its own driver query. Caller input
//! only ever reaches the store through a bind; the SQL text is assembled
//! from fixed column names.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::employee::{EmployeeField, EmployeeUpdate, FieldKind, NewEmployee};

pub const TABLE: &str = "EMPLOYEES";
pub const ID: &str = "EMPLOYEE_ID";

/// A typed value bound to a placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    Integer(i64),
    Text(String),
    Float(f64),
    Date(NaiveDate),
    Null(FieldKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    List,
    Get,
    Insert,
    Update,
    Delete,
}

/// What the store hands back for a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// Returns rows.
    Query,
    /// Returns a row count. Committed on its own.
    Mutation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub action: Action,
    pub sql: String,
    pub binds: BTreeMap<String, BindValue>,
    /// Columns inserted or assigned, in statement order.
    pub columns: Vec<(EmployeeField, BindValue)>,
    /// Identifier the WHERE clause matches, if any.
    pub target: Option<i64>,
}

#[derive(Debug, Error, PartialEq)]
pub enum BuildError {
    #[error("no updatable fields supplied")]
    NoFields,
    #[error("EMPLOYEE_ID in body ({body}) does not match the target employee ({target})")]
    IdentifierMismatch { body: i64, target: i64 },
}

pub fn select_list() -> String {
    EmployeeField::ALL
        .iter()
        .map(|field| field.select_expr())
        .collect::<Vec<_>>()
        .join(", ")
}

fn id_binds(id: i64) -> BTreeMap<String, BindValue> {
    BTreeMap::from([(ID.to_string(), BindValue::Integer(id))])
}

impl Statement {
    pub fn kind(&self) -> StatementKind {
        match self.action {
            Action::List | Action::Get => StatementKind::Query,
            Action::Insert | Action::Update | Action::Delete => StatementKind::Mutation,
        }
    }

    pub fn list_employees() -> Self {
        Statement {
            action: Action::List,
            sql: format!("SELECT {} FROM {TABLE} ORDER BY {ID}", select_list()),
            binds: BTreeMap::new(),
            columns: Vec::new(),
            target: None,
        }
    }

    pub fn get_employee(id: i64) -> Self {
        Statement {
            action: Action::Get,
            sql: format!("SELECT {} FROM {TABLE} WHERE {ID} = :{ID}", select_list()),
            binds: id_binds(id),
            columns: Vec::new(),
            target: Some(id),
        }
    }

    pub fn insert_employee(employee: &NewEmployee) -> Self {
        let columns: Vec<(EmployeeField, BindValue)> = EmployeeField::ALL
            .iter()
            .map(|&field| (field, employee.value(field)))
            .collect();
        let names: Vec<&str> = columns.iter().map(|(field, _)| field.name()).collect();
        let placeholders: Vec<String> = names.iter().map(|name| format!(":{name}")).collect();
        let binds = columns
            .iter()
            .map(|(field, value)| (field.name().to_string(), value.clone()))
            .collect();

        Statement {
            action: Action::Insert,
            sql: format!(
                "INSERT INTO {TABLE} ({}) VALUES ({})",
                names.join(", "),
                placeholders.join(", ")
            ),
            binds,
            columns,
            target: None,
        }
    }

    pub fn delete_employee(id: i64) -> Self {
        Statement {
            action: Action::Delete,
            sql: format!("DELETE FROM {TABLE} WHERE {ID} = :{ID}"),
            binds: id_binds(id),
            columns: Vec::new(),
            target: Some(id),
        }
    }

    /// Builds `UPDATE EMPLOYEES SET .. WHERE EMPLOYEE_ID = :EMPLOYEE_ID` from
    /// the fields present in `update`, targeting `target`.
    pub fn update_employee(target: i64, update: &EmployeeUpdate) -> Result<Self, BuildError> {
        let mut columns = Vec::new();

        for field in EmployeeField::ALL {
            let Some(value) = update.value(field) else {
                continue;
            };
            if let (EmployeeField::EmployeeId, BindValue::Integer(body)) = (field, &value) {
                if *body != target {
                    return Err(BuildError::IdentifierMismatch { body: *body, target });
                }
            }
            columns.push((field, value));
        }

        if columns.is_empty() {
            return Err(BuildError::NoFields);
        }

        let assignments: Vec<String> = columns
            .iter()
            .map(|(field, _)| format!("{} = :{}", field.name(), field.name()))
            .collect();
        let mut binds: BTreeMap<String, BindValue> = columns
            .iter()
            .map(|(field, value)| (field.name().to_string(), value.clone()))
            .collect();
        binds.insert(ID.to_string(), BindValue::Integer(target));

        Ok(Statement {
            action: Action::Update,
            sql: format!(
                "UPDATE {TABLE} SET {} WHERE {ID} = :{ID}",
                assignments.join(", ")
            ),
            binds,
            columns,
            target: Some(target),
        })
    }
}
