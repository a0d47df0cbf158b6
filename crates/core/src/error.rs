#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unknown step '{value}' for the {flow} flow")]
    UnknownStep { flow: &'static str, value: String },
}
