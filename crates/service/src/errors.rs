use models::errors::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("database error: {0}")]
    Db(String),
    #[error("model error: {0}")]
    Model(#[from] ModelError),
}

impl ServiceError {
    pub fn not_found(entity: &str, id: i32) -> Self { Self::NotFound(format!("{entity} with id {id} not found")) }

    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::Model(ModelError::invalid(field, message))
    }

    /// Offending input field, for validation failures that carry one.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::Model(ModelError::Validation { field, .. }) => Some(field),
            _ => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Model(ModelError::Validation { .. }))
    }
}

impl From<sea_orm::DbErr> for ServiceError {
    fn from(e: sea_orm::DbErr) -> Self { Self::Db(e.to_string()) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_validation_keeps_field() {
        let e: ServiceError = ModelError::invalid("carNumber", "must be between 1 and 99").into();
        assert!(e.is_validation());
        assert_eq!(e.field(), Some("carNumber"));
        assert_eq!(e.to_string(), "model error: carNumber: must be between 1 and 99");
    }

    #[test]
    fn db_failures_are_not_validation() {
        let e: ServiceError = ModelError::Db("disk I/O error".into()).into();
        assert!(!e.is_validation());
        assert_eq!(e.field(), None);
        assert!(!ServiceError::not_found("team", 3).is_validation());
        assert_eq!(ServiceError::not_found("team", 3).to_string(), "not found: team with id 3 not found");
    }
}
