//! Data and QA layer resolution against a product catalog.

use regex::Regex;

use crate::payload::{CatalogLayer, LayerCatalog, LayerMetadata};

/// Resolve the data layer: preferred names in order (exact, then
/// case-insensitive), then patterns in order against catalog names.
pub fn resolve_data_layer<'a>(
    catalog: &'a LayerCatalog,
    preferred: &[String],
    patterns: &[Regex],
) -> Option<&'a CatalogLayer> {
    preferred
        .iter()
        .find_map(|name| catalog.lookup(name))
        .or_else(|| {
            patterns.iter().find_map(|pattern| {
                catalog
                    .layers()
                    .iter()
                    .find(|layer| pattern.is_match(&layer.name))
            })
        })
}

/// Resolve the QA companion of a data layer.
///
/// Order: declared `QualityLayers` candidates (exact, then
/// case-insensitive), the first layer flagged `IsQA`, then the first
/// layer whose name mentions quality or QC.
pub fn resolve_qa_layer<'a>(
    data: &LayerMetadata,
    catalog: &'a LayerCatalog,
) -> Option<&'a CatalogLayer> {
    data.quality_layers
        .candidates()
        .iter()
        .find_map(|name| catalog.lookup(name))
        .or_else(|| catalog.layers().iter().find(|layer| layer.metadata.is_qa))
        .or_else(|| {
            catalog
                .layers()
                .iter()
                .find(|layer| looks_like_quality(&layer.name))
        })
}

fn looks_like_quality(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.contains("quality") || lower.contains("qc")
}
