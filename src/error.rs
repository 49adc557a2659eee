use rusqlite;
use thiserror::Error;
use tracing::{error, warn};

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("storage unavailable: {message}")]
    Storage { message: String },

    #[error("record not found")]
    NotFound,

    #[error("foreign key violation: {message}")]
    ForeignKey { message: String },

    #[error("constraint violation: {message}")]
    Constraint { message: String },

    #[error("no active workplace selected")]
    NoActiveWorkplace,

    #[error("validation failed: {message}")]
    Validation { message: String },

    #[error("invalid amount: {message}")]
    InvalidAmount { message: String },

    #[error("invalid wage: {message}")]
    InvalidWage { message: String },

    #[error("backup document malformed: {0}")]
    ImportParse(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl AppError {
    pub fn storage(message: impl Into<String>) -> Self {
        let message = message.into();
        error!(target: "app::db", %message, "storage error");
        AppError::Storage { message }
    }

    pub fn not_found() -> Self {
        warn!(target: "app::db", "record not found");
        AppError::NotFound
    }

    pub fn foreign_key(message: impl Into<String>) -> Self {
        let message = message.into();
        warn!(target: "app::db", %message, "foreign key violation");
        AppError::ForeignKey { message }
    }

    pub fn constraint(message: impl Into<String>) -> Self {
        let message = message.into();
        warn!(target: "app::db", %message, "constraint violation");
        AppError::Constraint { message }
    }

    pub fn no_active_workplace() -> Self {
        warn!(target: "app::data", "mutation attempted without an active workplace");
        AppError::NoActiveWorkplace
    }

    pub fn validation(message: impl Into<String>) -> Self {
        let message = message.into();
        warn!(target: "app::validation", %message, "validation error");
        AppError::Validation { message }
    }

    pub fn invalid_amount(message: impl Into<String>) -> Self {
        let message = message.into();
        warn!(target: "app::validation", %message, "invalid amount");
        AppError::InvalidAmount { message }
    }

    pub fn invalid_wage(message: impl Into<String>) -> Self {
        let message = message.into();
        warn!(target: "app::validation", %message, "invalid wage");
        AppError::InvalidWage { message }
    }

    pub fn other(message: impl Into<String>) -> Self {
        let message = message.into();
        error!(target: "app::other", %message, "other error");
        AppError::Other(message)
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(error: rusqlite::Error) -> Self {
        use rusqlite::ffi;
        use rusqlite::Error::{QueryReturnedNoRows, SqliteFailure};
        use rusqlite::ErrorCode;

        match &error {
            QueryReturnedNoRows => AppError::not_found(),
            SqliteFailure(err, detail) if err.code == ErrorCode::ConstraintViolation => {
                let message = detail
                    .clone()
                    .unwrap_or_else(|| "constraint failed".to_string());
                if err.extended_code == ffi::SQLITE_CONSTRAINT_FOREIGNKEY {
                    AppError::foreign_key(message)
                } else {
                    AppError::constraint(message)
                }
            }
            _ => {
                error!(target: "app::db", error = ?error, "sqlite error");
                AppError::storage(error.to_string())
            }
        }
    }
}
