use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Initialization failed: {0}")]
    InitializationFailed(String),
}

impl From<core_runtime::Error> for CoreError {
    fn from(err: core_runtime::Error) -> Self {
        CoreError::InitializationFailed(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
