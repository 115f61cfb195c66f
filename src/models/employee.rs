use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::db::statement::BindValue;

/// Storage kind of an EMPLOYEES column, used to bind typed values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Integer,
    Text,
    Date,
    Decimal,
}

/// The eleven known EMPLOYEES columns, in table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmployeeField {
    EmployeeId,
    FirstName,
    LastName,
    Email,
    PhoneNumber,
    HireDate,
    JobId,
    Salary,
    CommissionPct,
    ManagerId,
    DepartmentId,
}

impl EmployeeField {
    pub const ALL: [EmployeeField; 11] = [
        EmployeeField::EmployeeId,
        EmployeeField::FirstName,
        EmployeeField::LastName,
        EmployeeField::Email,
        EmployeeField::PhoneNumber,
        EmployeeField::HireDate,
        EmployeeField::JobId,
        EmployeeField::Salary,
        EmployeeField::CommissionPct,
        EmployeeField::ManagerId,
        EmployeeField::DepartmentId,
    ];

    /// Column name, which doubles as the JSON key and the bind name.
    pub fn name(self) -> &'static str {
        match self {
            EmployeeField::EmployeeId => "EMPLOYEE_ID",
            EmployeeField::FirstName => "FIRST_NAME",
            EmployeeField::LastName => "LAST_NAME",
            EmployeeField::Email => "EMAIL",
            EmployeeField::PhoneNumber => "PHONE_NUMBER",
            EmployeeField::HireDate => "HIRE_DATE",
            EmployeeField::JobId => "JOB_ID",
            EmployeeField::Salary => "SALARY",
            EmployeeField::CommissionPct => "COMMISSION_PCT",
            EmployeeField::ManagerId => "MANAGER_ID",
            EmployeeField::DepartmentId => "DEPARTMENT_ID",
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            EmployeeField::EmployeeId | EmployeeField::ManagerId | EmployeeField::DepartmentId => {
                FieldKind::Integer
            }
            EmployeeField::HireDate => FieldKind::Date,
            EmployeeField::Salary | EmployeeField::CommissionPct => FieldKind::Decimal,
            _ => FieldKind::Text,
        }
    }

    /// Select-list expression that decodes into the matching `Employee` field.
    pub fn select_expr(self) -> String {
        let cast = match self.kind() {
            FieldKind::Integer => "::int8",
            FieldKind::Decimal => "::float8",
            FieldKind::Text => "::text",
            FieldKind::Date => "",
        };
        format!("{}{} AS {}", self.name(), cast, self.name())
    }
}

/// One EMPLOYEES row as returned to clients.
#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Employee {
    pub employee_id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub hire_date: Option<NaiveDate>,
    pub job_id: Option<String>,
    pub salary: Option<f64>,
    pub commission_pct: Option<f64>,
    pub manager_id: Option<i64>,
    pub department_id: Option<i64>,
}

/// Create payload. Every column is passed to the insert; only the
/// identifier must be present.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct NewEmployee {
    pub employee_id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub hire_date: Option<NaiveDate>,
    pub job_id: Option<String>,
    pub salary: Option<f64>,
    pub commission_pct: Option<f64>,
    pub manager_id: Option<i64>,
    pub department_id: Option<i64>,
}

/// Sparse update payload: only the fields a caller wants to change.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct EmployeeUpdate {
    pub employee_id: Option<i64>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub hire_date: Option<NaiveDate>,
    pub job_id: Option<String>,
    pub salary: Option<f64>,
    pub commission_pct: Option<f64>,
    pub manager_id: Option<i64>,
    pub department_id: Option<i64>,
}

fn text(value: &Option<String>) -> Option<BindValue> {
    value
        .as_ref()
        .filter(|s| !s.is_empty())
        .map(|s| BindValue::Text(s.clone()))
}

impl EmployeeUpdate {
    /// Value supplied for `field`, if any. Empty strings count as absent;
    /// numeric zero is a real value.
    pub fn value(&self, field: EmployeeField) -> Option<BindValue> {
        match field {
            EmployeeField::EmployeeId => self.employee_id.map(BindValue::Integer),
            EmployeeField::FirstName => text(&self.first_name),
            EmployeeField::LastName => text(&self.last_name),
            EmployeeField::Email => text(&self.email),
            EmployeeField::PhoneNumber => text(&self.phone_number),
            EmployeeField::HireDate => self.hire_date.map(BindValue::Date),
            EmployeeField::JobId => text(&self.job_id),
            EmployeeField::Salary => self.salary.map(BindValue::Float),
            EmployeeField::CommissionPct => self.commission_pct.map(BindValue::Float),
            EmployeeField::ManagerId => self.manager_id.map(BindValue::Integer),
            EmployeeField::DepartmentId => self.department_id.map(BindValue::Integer),
        }
    }
}

impl NewEmployee {
    /// Value bound for `field` on insert; missing values bind as typed NULLs.
    pub fn value(&self, field: EmployeeField) -> BindValue {
        let value = match field {
            EmployeeField::EmployeeId => Some(BindValue::Integer(self.employee_id)),
            EmployeeField::FirstName => self.first_name.clone().map(BindValue::Text),
            EmployeeField::LastName => self.last_name.clone().map(BindValue::Text),
            EmployeeField::Email => self.email.clone().map(BindValue::Text),
            EmployeeField::PhoneNumber => self.phone_number.clone().map(BindValue::Text),
            EmployeeField::HireDate => self.hire_date.map(BindValue::Date),
            EmployeeField::JobId => self.job_id.clone().map(BindValue::Text),
            EmployeeField::Salary => self.salary.map(BindValue::Float),
            EmployeeField::CommissionPct => self.commission_pct.map(BindValue::Float),
            EmployeeField::ManagerId => self.manager_id.map(BindValue::Integer),
            EmployeeField::DepartmentId => self.department_id.map(BindValue::Integer),
        };
        value.unwrap_or(BindValue::Null(field.kind()))
    }
}
