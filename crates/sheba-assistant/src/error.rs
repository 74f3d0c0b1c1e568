use sheba_common::error::PipelineError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}
