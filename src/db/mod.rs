pub mod postgres;
pub mod statement;

#[cfg(test)]
pub mod memory;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, error};
use thiserror::Error;
use tokio::time::timeout;

use crate::models::employee::Employee;
use statement::Statement;

/// SQLSTATE the store reports for a unique-constraint violation.
pub const UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("{0}")]
    Connect(String),
    #[error("{message}")]
    Execute {
        code: Option<String>,
        message: String,
    },
    #[error("{0}")]
    Release(String),
    #[error("database call timed out after {0:?}")]
    Timeout(Duration),
}

impl GatewayError {
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, GatewayError::Execute { code: Some(code), .. } if code == UNIQUE_VIOLATION)
    }
}

/// Result of executing one statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Rows(Vec<Employee>),
    RowsAffected(u64),
}

#[async_trait]
pub trait Gateway: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn Connection>, GatewayError>;
}

#[async_trait]
pub trait Connection: Send {
    /// Runs one statement; mutations are committed on their own.
    async fn execute(&mut self, statement: &Statement) -> Result<Outcome, GatewayError>;

    async fn release(self: Box<Self>) -> Result<(), GatewayError>;
}

/// Error from a single database round trip, split by the step that failed.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("connect: {0}")]
    Connect(GatewayError),
    #[error("execute: {0}")]
    Execute(GatewayError),
}

/// Shared handle the handlers run statements through.
#[derive(Clone)]
pub struct Database {
    gateway: Arc<dyn Gateway>,
    timeout: Duration,
}

impl Database {
    pub fn new(gateway: Arc<dyn Gateway>, timeout: Duration) -> Self {
        Database { gateway, timeout }
    }

    /// Acquires a connection, executes `statement` and releases the
    /// connection on every path out, whatever the outcome.
    pub async fn run(&self, statement: &Statement, label: &str) -> Result<Outcome, RunError> {
        let mut connection = match timeout(self.timeout, self.gateway.connect()).await {
            Ok(Ok(connection)) => connection,
            Ok(Err(err)) => return Err(RunError::Connect(err)),
            Err(_) => return Err(RunError::Connect(GatewayError::Timeout(self.timeout))),
        };

        let outcome = match timeout(self.timeout, connection.execute(statement)).await {
            Ok(result) => result,
            Err(_) => Err(GatewayError::Timeout(self.timeout)),
        };

        match connection.release().await {
            Ok(()) => debug!("{} : Connection released", label),
            Err(err) => error!("{} : failed to release connection: {}", label, err),
        }

        outcome.map_err(RunError::Execute)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Stalled {
        released: Arc<AtomicUsize>,
    }

    struct StalledConnection {
        released: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Gateway for Stalled {
        async fn connect(&self) -> Result<Box<dyn Connection>, GatewayError> {
            Ok(Box::new(StalledConnection {
                released: Arc::clone(&self.released),
            }))
        }
    }

    #[async_trait]
    impl Connection for StalledConnection {
        async fn execute(&mut self, _statement: &Statement) -> Result<Outcome, GatewayError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(Outcome::RowsAffected(1))
        }

        async fn release(self: Box<Self>) -> Result<(), GatewayError> {
            self.released.fetch_add(1, Ordering::SeqCst);
            Err(GatewayError::Release("socket closed".to_string()))
        }
    }

    #[actix_web::test]
    async fn timed_out_statement_still_releases() {
        let gateway = Stalled::default();
        let released = Arc::clone(&gateway.released);
        let database = Database::new(Arc::new(gateway), Duration::from_millis(20));

        let result = database.run(&Statement::list_employees(), "GET /employees").await;

        assert!(matches!(
            result,
            Err(RunError::Execute(GatewayError::Timeout(_)))
        ));
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unique_violation_is_detected_by_code() {
        let duplicate = GatewayError::Execute {
            code: Some(UNIQUE_VIOLATION.to_string()),
            message: "duplicate key".to_string(),
        };
        let other = GatewayError::Execute {
            code: Some("22P02".to_string()),
            message: "invalid input syntax".to_string(),
        };
        assert!(duplicate.is_unique_violation());
        assert!(!other.is_unique_violation());
        assert!(!GatewayError::Connect("refused".to_string()).is_unique_violation());
    }
}
