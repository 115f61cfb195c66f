use actix_web::{http::header, web, HttpResponse};

use crate::db::statement::Statement;
use crate::db::{Database, Outcome, RunError};
use crate::errors::ApiError;
use crate::models::employee::{Employee, EmployeeUpdate, NewEmployee};

// Identifiers are integers in the store; anything else cannot match a row.
fn parse_id(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}

fn rows(outcome: Outcome) -> Vec<Employee> {
    match outcome {
        Outcome::Rows(rows) => rows,
        Outcome::RowsAffected(_) => Vec::new(),
    }
}

fn rows_affected(outcome: Outcome) -> u64 {
    match outcome {
        Outcome::RowsAffected(count) => count,
        Outcome::Rows(rows) => rows.len() as u64,
    }
}

fn log_failure(label: &str, err: RunError) -> RunError {
    log::error!("{}: {}", label, err);
    err
}

pub async fn get_employees(db: web::Data<Database>) -> Result<HttpResponse, ApiError> {
    let label = "GET /employees";
    let outcome = db
        .run(&Statement::list_employees(), label)
        .await
        .map_err(|err| ApiError::from_read(log_failure(label, err), "Error getting the employee"))?;

    Ok(HttpResponse::Ok().json(rows(outcome)))
}

pub async fn get_employee(
    db: web::Data<Database>,
    employee_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let not_found = ApiError::NotFound("Employee doesn't exist");
    let id = parse_id(&employee_id).ok_or(not_found.clone())?;

    let label = format!("GET /employees/{}", id);
    let outcome = db
        .run(&Statement::get_employee(id), &label)
        .await
        .map_err(|err| ApiError::from_read(log_failure(&label, err), "Error getting the employee"))?;

    let employees = rows(outcome);
    if employees.is_empty() {
        return Err(not_found);
    }
    Ok(HttpResponse::Ok().json(employees))
}

pub async fn create_employee(
    db: web::Data<Database>,
    new_employee: web::Json<NewEmployee>,
) -> Result<HttpResponse, ApiError> {
    let label = "POST /employees";
    db.run(&Statement::insert_employee(&new_employee), label)
        .await
        .map_err(|err| ApiError::from_write(log_failure(label, err)))?;

    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, format!("/employees/{}", new_employee.employee_id)))
        .finish())
}

pub async fn update_employee(
    db: web::Data<Database>,
    employee_id: web::Path<String>,
    update: web::Json<EmployeeUpdate>,
) -> Result<HttpResponse, ApiError> {
    let missing = ApiError::BadRequest {
        message: "User doesn't exist",
        detail: None,
    };
    let id = parse_id(&employee_id).ok_or(missing.clone())?;
    let statement = Statement::update_employee(id, &update).map_err(ApiError::input)?;

    let label = format!("PUT /employees/{}", id);
    let outcome = db
        .run(&statement, &label)
        .await
        .map_err(|err| ApiError::from_write(log_failure(&label, err)))?;

    if rows_affected(outcome) == 0 {
        return Err(missing);
    }
    Ok(HttpResponse::NoContent().finish())
}

pub async fn delete_employee(
    db: web::Data<Database>,
    employee_id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let missing = ApiError::BadRequest {
        message: "Employee doesn't exist",
        detail: None,
    };
    let id = parse_id(&employee_id).ok_or(missing.clone())?;

    let label = format!("DELETE /employees/{}", id);
    let outcome = db
        .run(&Statement::delete_employee(id), &label)
        .await
        .map_err(|err| ApiError::from_write(log_failure(&label, err)))?;

    if rows_affected(outcome) == 0 {
        return Err(missing);
    }
    Ok(HttpResponse::NoContent().finish())
}
