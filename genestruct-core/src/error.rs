//! Error handling for gene models and compression parameters

use crate::types::GenomicPos;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeneStructError {
    #[error("Gene {gene} has no valid exons")]
    NoExons { gene: String },

    #[error("Invalid interval: end {end} must be greater than start {start}")]
    InvalidInterval { start: GenomicPos, end: GenomicPos },

    #[error("Invalid strand: {value:?} (expected '+' or '-')")]
    InvalidStrand { value: String },

    #[error("Invalid parameters: {message}")]
    InvalidParams { message: String },
}

impl GeneStructError {
    pub fn no_exons<S: Into<String>>(gene: S) -> Self {
        Self::NoExons { gene: gene.into() }
    }

    pub fn invalid_interval(start: GenomicPos, end: GenomicPos) -> Self {
        Self::InvalidInterval { start, end }
    }

    pub fn invalid_strand<S: Into<String>>(value: S) -> Self {
        Self::InvalidStrand { value: value.into() }
    }

    pub fn invalid_params<S: Into<String>>(message: S) -> Self {
        Self::InvalidParams { message: message.into() }
    }
}

pub type Result<T> = std::result::Result<T, GeneStructError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = GeneStructError::no_exons("TP53");
        assert_eq!(err.to_string(), "Gene TP53 has no valid exons");

        let err = GeneStructError::invalid_interval(200, 100);
        assert!(matches!(err, GeneStructError::InvalidInterval { start: 200, end: 100 }));
        assert!(err.to_string().contains("end 100"));
    }
}
