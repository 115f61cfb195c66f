//! In-memory gateway for handler tests. Interprets the statements built in
//! `statement.rs` from their action, columns and target, and counts
//! connection acquisitions and releases.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::statement::{Action, BindValue, Statement};
use super::{Connection, Gateway, GatewayError, Outcome, UNIQUE_VIOLATION};
use crate::models::employee::{Employee, EmployeeField};

#[derive(Default)]
struct State {
    rows: Mutex<BTreeMap<i64, Employee>>,
    acquired: AtomicUsize,
    released: AtomicUsize,
    executed: AtomicUsize,
    unreachable: AtomicBool,
    rejecting: AtomicBool,
}

#[derive(Clone, Default)]
pub struct MemoryGateway {
    state: Arc<State>,
}

impl MemoryGateway {
    pub fn with_rows(rows: Vec<Employee>) -> Self {
        let gateway = MemoryGateway::default();
        {
            let mut stored = gateway.state.rows.lock().unwrap();
            for row in rows {
                stored.insert(row.employee_id, row);
            }
        }
        gateway
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        self.state.unreachable.store(unreachable, Ordering::SeqCst);
    }

    /// Makes every statement fail after connecting, as a store rejecting
    /// the input would.
    pub fn set_rejecting(&self, rejecting: bool) {
        self.state.rejecting.store(rejecting, Ordering::SeqCst);
    }

    pub fn acquired(&self) -> usize {
        self.state.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.state.released.load(Ordering::SeqCst)
    }

    pub fn executed(&self) -> usize {
        self.state.executed.load(Ordering::SeqCst)
    }

    pub fn row(&self, id: i64) -> Option<Employee> {
        self.state.rows.lock().unwrap().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.state.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl Gateway for MemoryGateway {
    async fn connect(&self) -> Result<Box<dyn Connection>, GatewayError> {
        if self.state.unreachable.load(Ordering::SeqCst) {
            return Err(GatewayError::Connect("connection refused".to_string()));
        }
        self.state.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryConnection {
            state: Arc::clone(&self.state),
        }))
    }
}

struct MemoryConnection {
    state: Arc<State>,
}

fn target(statement: &Statement) -> Result<i64, GatewayError> {
    statement.target.ok_or_else(|| GatewayError::Execute {
        code: Some("42601".to_string()),
        message: "statement has no target".to_string(),
    })
}

fn assign(employee: &mut Employee, field: EmployeeField, value: &BindValue) {
    let integer = match value {
        BindValue::Integer(v) => Some(*v),
        _ => None,
    };
    let text = match value {
        BindValue::Text(v) => Some(v.clone()),
        _ => None,
    };
    let float = match value {
        BindValue::Float(v) => Some(*v),
        _ => None,
    };
    match field {
        EmployeeField::EmployeeId => {
            if let Some(id) = integer {
                employee.employee_id = id;
            }
        }
        EmployeeField::FirstName => employee.first_name = text,
        EmployeeField::LastName => employee.last_name = text,
        EmployeeField::Email => employee.email = text,
        EmployeeField::PhoneNumber => employee.phone_number = text,
        EmployeeField::HireDate => {
            employee.hire_date = match value {
                BindValue::Date(d) => Some(*d),
                _ => None,
            }
        }
        EmployeeField::JobId => employee.job_id = text,
        EmployeeField::Salary => employee.salary = float,
        EmployeeField::CommissionPct => employee.commission_pct = float,
        EmployeeField::ManagerId => employee.manager_id = integer,
        EmployeeField::DepartmentId => employee.department_id = integer,
    }
}

#[async_trait]
impl Connection for MemoryConnection {
    async fn execute(&mut self, statement: &Statement) -> Result<Outcome, GatewayError> {
        self.state.executed.fetch_add(1, Ordering::SeqCst);
        if self.state.rejecting.load(Ordering::SeqCst) {
            return Err(GatewayError::Execute {
                code: Some("22P02".to_string()),
                message: "invalid input syntax for type numeric".to_string(),
            });
        }
        let mut rows = self.state.rows.lock().unwrap();

        match statement.action {
            Action::List => Ok(Outcome::Rows(rows.values().cloned().collect())),
            Action::Get => {
                let id = target(statement)?;
                Ok(Outcome::Rows(rows.get(&id).cloned().into_iter().collect()))
            }
            Action::Insert => {
                let mut employee = Employee::default();
                for (field, value) in &statement.columns {
                    assign(&mut employee, *field, value);
                }
                let id = employee.employee_id;
                if rows.contains_key(&id) {
                    return Err(GatewayError::Execute {
                        code: Some(UNIQUE_VIOLATION.to_string()),
                        message: "duplicate key value violates unique constraint \"emp_emp_id_pk\""
                            .to_string(),
                    });
                }
                rows.insert(id, employee);
                Ok(Outcome::RowsAffected(1))
            }
            Action::Update => {
                let id = target(statement)?;
                let Some(employee) = rows.get_mut(&id) else {
                    return Ok(Outcome::RowsAffected(0));
                };
                for (field, value) in &statement.columns {
                    assign(employee, *field, value);
                }
                Ok(Outcome::RowsAffected(1))
            }
            Action::Delete => {
                let id = target(statement)?;
                Ok(Outcome::RowsAffected(rows.remove(&id).map_or(0, |_| 1)))
            }
        }
    }

    async fn release(self: Box<Self>) -> Result<(), GatewayError> {
        self.state.released.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
