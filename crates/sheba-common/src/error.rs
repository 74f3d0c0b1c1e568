/// Error types shared by the pipeline and the crates that serve it.
///
/// The pipeline operations themselves are total; these errors only arise while building or
/// loading configuration. Server crates define their own error type and wrap `PipelineError`
/// via `#[from]`.

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("invalid price band: low {low} <= optimal {optimal} <= high {high} must hold")]
    PriceBandOrder { low: f64, optimal: f64, high: f64 },

    #[error("multiplier {name} must be positive, got {value}")]
    NonPositiveMultiplier { name: String, value: f64 },

    #[error("confidence for {category} must be within [0, 1], got {value}")]
    ConfidenceOutOfRange { category: String, value: f64 },

    #[error("invalid hour window {name}: {start}..{end}")]
    HourWindow { name: String, start: u32, end: u32 },

    #[error("failed to read pipeline config {path}: {source}")]
    ConfigRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse pipeline config: {0}")]
    ConfigParse(#[from] serde_json::Error),
}
