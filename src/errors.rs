use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlannerError {
    #[error("{0}")] Input(String),
    #[error("failed to read file {name}: {message}")] FileRead { name: String, message: String },
    #[error("generation failed: {0}")] Generation(String),
    #[error("response did not match the expected shape: {0}")] Schema(String),
    #[error("chat failed: {0}")] Chat(String),
    #[error("no active session; generate something first")] NoSession,
    #[error("another request is still in flight")] Busy,
}

pub type PlannerResult<T> = Result<T, PlannerError>;
