//! genestruct core library
//!
//! Gene structure models and the intron compression map used to lay out
//! exon/intron diagrams on a fixed `[0, 1]` axis.

pub mod types;
pub mod error;
pub mod compress;
pub mod gene;

// Re-export commonly used types and functions
pub use types::{merge_overlapping, GeneSpan, GenomicInterval, GenomicPos, Strand};
pub use error::{GeneStructError, Result};
pub use compress::{CompressionParams, CoordinateCompressor, DEFAULT_SHRINK_BUDGET, DEFAULT_SHRINK_THRESHOLD};
pub use gene::{
    derive_introns, find_gene_enhancers, normalize_chromosome, Enhancer, EnhancerClass, ExonOverlap,
    GeneModel, PromoterSite, PromoterWindow,
};

/// Version information for the genestruct core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
