use thiserror::Error;

// ---------------------------------------------------------------------------
// Pipeline errors
// ---------------------------------------------------------------------------

/// Failures raised by the load → filter → render pipeline.
///
/// I/O and decoder failures are wrapped by `anyhow` context at the call site;
/// these variants cover the conditions the pipeline itself detects.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Unsupported file extension: .{0}")]
    UnsupportedExtension(String),

    #[error("input is missing the '{0}' column")]
    MissingColumn(&'static str),

    #[error("row {row}: '{text}' is not a valid date")]
    InvalidDate { row: usize, text: String },

    #[error("row {row}: '{text}' is not a number")]
    InvalidValue { row: usize, text: String },

    #[error("no observations left after outlier filtering")]
    EmptyTable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_input() {
        let err = PipelineError::InvalidDate {
            row: 3,
            text: "2024-13-45".to_string(),
        };
        assert_eq!(err.to_string(), "row 3: '2024-13-45' is not a valid date");

        let err = PipelineError::MissingColumn("value");
        assert_eq!(err.to_string(), "input is missing the 'value' column");

        let err = PipelineError::UnsupportedExtension("xlsx".to_string());
        assert_eq!(err.to_string(), "Unsupported file extension: .xlsx");
    }
}
