use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use log::warn;
use sqlx::pool::PoolConnection;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Connection as _, PgPool, Postgres, QueryBuilder};
use tokio::time::timeout;

use super::statement::{select_list, Action, BindValue, Statement, StatementKind, ID, TABLE};
use super::{Connection, Gateway, GatewayError, Outcome};
use crate::config::Config;
use crate::models::employee::{Employee, FieldKind};

/// Gateway backed by a sqlx Postgres pool.
pub struct PgGateway {
    pool: PgPool,
    timeout: Duration,
}

impl PgGateway {
    /// Builds the pool without connecting; connections are opened on demand
    /// so an unreachable store surfaces per request rather than at startup.
    pub fn new(config: &Config) -> Result<Self, GatewayError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.db_timeout)
            .connect_lazy(&config.database_url)
            .map_err(|err| GatewayError::Connect(err.to_string()))?;
        Ok(PgGateway {
            pool,
            timeout: config.db_timeout,
        })
    }
}

#[async_trait]
impl Gateway for PgGateway {
    async fn connect(&self) -> Result<Box<dyn Connection>, GatewayError> {
        let conn = self
            .pool
            .acquire()
            .await
            .map_err(|err| GatewayError::Connect(err.to_string()))?;
        Ok(Box::new(PooledConnection {
            conn,
            in_flight: false,
            timeout: self.timeout,
        }))
    }
}

struct PooledConnection {
    conn: PoolConnection<Postgres>,
    // Left set when an execute future is dropped before completing.
    in_flight: bool,
    timeout: Duration,
}

fn push_bind(query: &mut QueryBuilder<'static, Postgres>, value: &BindValue) {
    match value {
        BindValue::Integer(v) => query.push_bind(*v),
        BindValue::Text(v) => query.push_bind(v.clone()),
        BindValue::Float(v) => query.push_bind(*v),
        BindValue::Date(v) => query.push_bind(*v),
        BindValue::Null(FieldKind::Integer) => query.push_bind(None::<i64>),
        BindValue::Null(FieldKind::Text) => query.push_bind(None::<String>),
        BindValue::Null(FieldKind::Decimal) => query.push_bind(None::<f64>),
        BindValue::Null(FieldKind::Date) => query.push_bind(None::<NaiveDate>),
    };
}

/// Postgres form of `statement`, with `$n` placeholders bound in order.
fn build_query(statement: &Statement) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new("");

    match statement.action {
        Action::List | Action::Get => {
            query.push(format!("SELECT {} FROM {TABLE}", select_list()));
        }
        Action::Insert => {
            let names: Vec<&str> = statement.columns.iter().map(|(f, _)| f.name()).collect();
            query.push(format!("INSERT INTO {TABLE} ({}) VALUES (", names.join(", ")));
            for (i, (_, value)) in statement.columns.iter().enumerate() {
                if i > 0 {
                    query.push(", ");
                }
                push_bind(&mut query, value);
            }
            query.push(")");
        }
        Action::Update => {
            query.push(format!("UPDATE {TABLE} SET "));
            for (i, (field, value)) in statement.columns.iter().enumerate() {
                if i > 0 {
                    query.push(", ");
                }
                query.push(field.name()).push(" = ");
                push_bind(&mut query, value);
            }
        }
        Action::Delete => {
            query.push(format!("DELETE FROM {TABLE}"));
        }
    }

    if let Some(id) = statement.target {
        query.push(format!(" WHERE {ID} = "));
        query.push_bind(id);
    }
    if statement.action == Action::List {
        query.push(format!(" ORDER BY {ID}"));
    }

    query
}

fn execute_error(err: sqlx::Error) -> GatewayError {
    match err {
        sqlx::Error::Database(db_err) => GatewayError::Execute {
            code: db_err.code().map(|code| code.into_owned()),
            message: db_err.message().to_string(),
        },
        other => GatewayError::Execute {
            code: None,
            message: other.to_string(),
        },
    }
}

/// Waits at most `limit` for a connection close; past that the close
/// future, and the connection with it, is dropped.
async fn close_within<F>(limit: Duration, close: F) -> Result<(), GatewayError>
where
    F: Future<Output = Result<(), sqlx::Error>>,
{
    match timeout(limit, close).await {
        Ok(result) => result.map_err(|err| GatewayError::Release(err.to_string())),
        Err(_) => Err(GatewayError::Release(format!(
            "connection close timed out after {:?}",
            limit
        ))),
    }
}

#[async_trait]
impl Connection for PooledConnection {
    async fn execute(&mut self, statement: &Statement) -> Result<Outcome, GatewayError> {
        let mut query = build_query(statement);

        self.in_flight = true;
        let outcome = match statement.kind() {
            StatementKind::Query => query
                .build_query_as::<Employee>()
                .fetch_all(&mut *self.conn)
                .await
                .map(Outcome::Rows),
            StatementKind::Mutation => query
                .build()
                .execute(&mut *self.conn)
                .await
                .map(|result| Outcome::RowsAffected(result.rows_affected())),
        };
        self.in_flight = false;

        outcome.map_err(execute_error)
    }

    async fn release(self: Box<Self>) -> Result<(), GatewayError> {
        if self.in_flight {
            warn!("closing connection left mid-statement");
            return close_within(self.timeout, self.conn.detach().close()).await;
        }
        drop(self.conn);
        Ok(())
    }
}
