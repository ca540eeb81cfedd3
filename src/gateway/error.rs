use thiserror::Error;

/// Errors crossing the remote query gateway boundary.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Query error: {0}")]
    QueryError(String),

    /// A row came back in a shape the table model cannot decode.
    #[error("Decode error on \"{table}\": {detail}")]
    Decode { table: String, detail: String },

    #[error(transparent)]
    Sqlx(sqlx::Error),
}

impl GatewayError {
    /// Map a sqlx error into the gateway taxonomy, tagging decode failures
    /// with the table they came from.
    pub fn from_sqlx(table: &str, err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => GatewayError::NotFound("Record not found".to_string()),
            sqlx::Error::ColumnDecode { index, source } => GatewayError::Decode {
                table: table.to_string(),
                detail: format!("column {}: {}", index, source),
            },
            sqlx::Error::ColumnNotFound(name) => GatewayError::Decode {
                table: table.to_string(),
                detail: format!("missing column {}", name),
            },
            sqlx::Error::TypeNotFound { type_name } => GatewayError::Decode {
                table: table.to_string(),
                detail: format!("unknown type {}", type_name),
            },
            sqlx::Error::Decode(source) => GatewayError::Decode {
                table: table.to_string(),
                detail: source.to_string(),
            },
            other => GatewayError::Sqlx(other),
        }
    }
}
