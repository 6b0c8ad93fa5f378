use thiserror::Error;

/// Reasons a submitted draft is refused before anything reaches the store.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("{field} must be a number, got '{value}'")]
    NotANumber { field: &'static str, value: String },

    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: f64,
        max: f64,
    },

    #[error("unknown price range '{0}'")]
    UnknownPriceTier(String),
}

impl ValidationError {
    /// Name of the offending form field.
    pub fn field(&self) -> &'static str {
        match self {
            Self::Required(field) => field,
            Self::NotANumber { field, .. } => field,
            Self::OutOfRange { field, .. } => field,
            Self::UnknownPriceTier(_) => "price_range",
        }
    }
}

pub type Result<T> = std::result::Result<T, ValidationError>;
