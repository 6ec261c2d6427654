use thiserror::Error;

/// Errors raised by the loader and the filter pipeline.
#[derive(Error, Debug, PartialEq)]
pub enum DataError {
    /// A required column is absent from the CSV header.
    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),

    /// A numeric cell did not parse.
    #[error("line {line}: column '{column}' value '{value}' is not a number")]
    InvalidNumber {
        line: u64,
        column: &'static str,
        value: String,
    },

    /// Month bounds must satisfy `1 <= min <= max <= 12`.
    #[error("invalid month range {min}..={max} (expected 1 <= min <= max <= 12)")]
    InvalidMonthRange { min: u32, max: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_input() {
        assert_eq!(
            DataError::MissingColumn("Rating").to_string(),
            "missing required column 'Rating'"
        );
        let e = DataError::InvalidMonthRange { min: 4, max: 2 };
        assert!(e.to_string().contains("4..=2"));
    }
}
