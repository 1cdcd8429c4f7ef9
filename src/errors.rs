use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Configuration(String),

    #[error("Failed to generate content: {0}")]
    Provider(String),
}

impl GenerationError {
    pub fn error_code(&self) -> &'static str {
        match self {
            GenerationError::Validation(_) => "VALIDATION_ERROR",
            GenerationError::Configuration(_) => "CONFIGURATION_ERROR",
            GenerationError::Provider(_) => "PROVIDER_ERROR",
        }
    }
}

impl From<anyhow::Error> for GenerationError {
    fn from(err: anyhow::Error) -> Self {
        GenerationError::Provider(format!("{:#}", err))
    }
}

pub type GenerationResult<T> = Result<T, GenerationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            GenerationError::Validation("x".into()).error_code(),
            "VALIDATION_ERROR"
        );
        assert_eq!(
            GenerationError::Configuration("x".into()).error_code(),
            "CONFIGURATION_ERROR"
        );
        assert_eq!(
            GenerationError::Provider("x".into()).error_code(),
            "PROVIDER_ERROR"
        );
    }

    #[test]
    fn test_error_messages() {
        let err = GenerationError::Configuration("Gemini API key is not configured.".into());
        assert_eq!(err.to_string(), "Gemini API key is not configured.");

        let err = GenerationError::Provider("quota exceeded".into());
        assert_eq!(err.to_string(), "Failed to generate content: quota exceeded");
    }

    #[test]
    fn test_from_anyhow_keeps_context_chain() {
        let inner = anyhow::anyhow!("connection reset").context("Failed to send request");
        let err: GenerationError = inner.into();
        assert_eq!(
            err,
            GenerationError::Provider("Failed to send request: connection reset".into())
        );
    }
}
