/*!
# genestruct layout and renderer seam

Builds intron-compressed gene diagrams as plain drawing primitives. Painting
is left to whatever implements [`Renderer`]; [`SceneBuffer`] records the
primitives so they can be inspected or serialized to JSON.

## Layers

1. **config**: TOML-backed [`LayoutConfig`] (compression, promoter window,
   enhancer tracks, axis ticks, colours)
2. **layout**: per-gene [`GeneLayout`] with primitives, axis and legend
3. **protein**: [`ProteinLayout`] with domain, region, secondary-structure
   and modification tracks
4. **scene**: primitive types and the [`Renderer`] trait
*/

pub mod config;
pub mod layout;
pub mod protein;
pub mod scene;

pub use config::{AxisConfig, EnhancerConfig, LayoutConfig, StyleConfig};
pub use layout::{axis_ticks, format_bp, layout_gene, legend, Axis, GeneLayout, LegendEntry, Swatch, Tick};
pub use protein::{
    classify_modification, layout_protein, protein_legend, Modification, ModificationType, ProteinFeature,
    ProteinFeatures, ProteinLayout, SecondaryStructure, StructureElement,
};
pub use scene::{Line, Marker, MarkerShape, Primitive, Rect, Renderer, SceneBuffer, Text, TextAnchor};

use genestruct_core::{Enhancer, GeneModel, Result};
use rayon::prelude::*;

/// Lay out every gene independently and in parallel. Results keep the input
/// order; a failing gene is logged and does not affect the others. The
/// config is validated once; if it is invalid every gene gets that error.
pub fn layout_genes(genes: &[GeneModel], enhancers: &[Enhancer], config: &LayoutConfig) -> Vec<Result<GeneLayout>> {
    log::info!("Laying out {} gene(s)", genes.len());

    if let Err(e) = layout::checked_config(config) {
        log::error!("Invalid layout configuration: {}", e);
        return genes.iter().map(|_| Err(e.clone())).collect();
    }

    let results: Vec<Result<GeneLayout>> = genes
        .par_iter()
        .map(|gene| {
            let result = layout::layout_checked(gene, enhancers, config);
            if let Err(e) = &result {
                log::warn!("Skipping gene {}: {}", gene.name, e);
            }
            result
        })
        .collect();

    let ok = results.iter().filter(|r| r.is_ok()).count();
    log::info!("Laid out {} of {} gene(s)", ok, genes.len());
    results
}
