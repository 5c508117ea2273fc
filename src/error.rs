#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// A date field is not in `YYYY-MM` form. Fatal to the whole load.
    #[error("Parse error at row {row}: '{value}' is not a YYYY-MM date")]
    ParseError { row: usize, value: String },

    #[error("Invalid price at row {row}: '{value}'")]
    InvalidPrice { row: usize, value: String },

    #[error("Invalid month name: {0}")]
    InvalidMonth(String),

    #[error("Invalid year range: {year_min} > {year_max}")]
    InvalidCriteria { year_min: i32, year_max: i32 },
}

pub type Result<T> = std::result::Result<T, DashboardError>;
