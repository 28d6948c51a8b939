//! Per-request metric definitions.

use futures::future::try_join_all;
use tracing::{info, instrument};

use earthpulse_common::{ExploreError, ExploreResult, Metric, Provider};

use crate::api::AppeearsApi;
use crate::layers::{resolve_data_layer, resolve_qa_layer};
use crate::payload::{LayerMetadata, LayerRef};
use crate::provider::{MetricSource, ProviderTable};
use crate::quality::{classify_quality, AcceptableCodes};

/// Everything needed to request and aggregate one metric.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricDefinition {
    pub metric: Metric,
    pub product: String,
    pub data_layer: String,
    pub qa_layer: String,
    pub acceptable_qa: AcceptableCodes,
    pub scale: f64,
    pub offset: f64,
    /// Sentinel meaning "no data"; `None` disables the check.
    pub fill_value: Option<f64>,
}

impl MetricDefinition {
    /// Scale, offset and fill taken from the data layer's catalog entry.
    pub fn from_metadata(
        metric: Metric,
        product: impl Into<String>,
        data_layer: impl Into<String>,
        qa_layer: impl Into<String>,
        acceptable_qa: AcceptableCodes,
        metadata: &LayerMetadata,
    ) -> Self {
        Self {
            metric,
            product: product.into(),
            data_layer: data_layer.into(),
            qa_layer: qa_layer.into(),
            acceptable_qa,
            scale: metadata.scale_factor.filter(|s| *s != 0.0).unwrap_or(1.0),
            offset: metadata.add_offset.unwrap_or(0.0),
            fill_value: metadata.fill_value,
        }
    }

    /// The data and QA layers this metric needs from a task.
    pub fn layer_refs(&self) -> [LayerRef; 2] {
        [
            LayerRef::new(&self.product, &self.data_layer),
            LayerRef::new(&self.product, &self.qa_layer),
        ]
    }

    pub fn is_fill(&self, raw: f64) -> bool {
        self.fill_value == Some(raw)
    }

    pub fn transform(&self, raw: f64) -> f64 {
        raw * self.scale + self.offset
    }
}

/// Resolve layers and acceptable QA codes for one metric.
#[instrument(skip(api, token, source), fields(product = %source.product))]
pub async fn build_metric_definition(
    api: &dyn AppeearsApi,
    token: &str,
    metric: Metric,
    source: &MetricSource,
) -> ExploreResult<MetricDefinition> {
    let catalog = api.product_layers(token, &source.product).await?;

    let data = resolve_data_layer(&catalog, &source.preferred_layers, &source.layer_patterns)
        .ok_or_else(|| ExploreError::LayerResolution {
            product: source.product.clone(),
            metric,
        })?;

    let qa = resolve_qa_layer(&data.metadata, &catalog).ok_or_else(|| {
        ExploreError::QaLayerResolution {
            product: source.product.clone(),
            metric,
        }
    })?;

    let acceptable = classify_quality(api, token, &source.product, &qa.name).await;

    info!(
        metric = %metric,
        data_layer = %data.name,
        qa_layer = %qa.name,
        acceptable_codes = acceptable.len(),
        "Resolved metric layers"
    );

    Ok(MetricDefinition::from_metadata(
        metric,
        &source.product,
        &data.name,
        &qa.name,
        acceptable,
        &data.metadata,
    ))
}

/// Build definitions for every requested metric concurrently, in request order.
pub async fn build_metric_definitions(
    api: &dyn AppeearsApi,
    token: &str,
    provider: Provider,
    metrics: &[Metric],
    table: &ProviderTable,
) -> ExploreResult<Vec<MetricDefinition>> {
    let sources = metrics
        .iter()
        .map(|&metric| {
            table
                .source(provider, metric)
                .map(|source| (metric, source))
                .ok_or_else(|| {
                    ExploreError::Unexpected(format!(
                        "No provider config found for {}/{}",
                        provider, metric
                    ))
                })
        })
        .collect::<ExploreResult<Vec<_>>>()?;

    try_join_all(
        sources
            .into_iter()
            .map(|(metric, source)| build_metric_definition(api, token, metric, source)),
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_scale_treated_as_one() {
        let meta = LayerMetadata {
            scale_factor: Some(0.0),
            add_offset: None,
            fill_value: None,
            ..LayerMetadata::default()
        };
        let def = MetricDefinition::from_metadata(
            Metric::Ndvi,
            "P",
            "D",
            "Q",
            AcceptableCodes::unrestricted(),
            &meta,
        );
        assert_eq!(def.scale, 1.0);
        assert_eq!(def.offset, 0.0);
        assert_eq!(def.fill_value, None);
        assert!(!def.is_fill(0.0));
    }

    #[test]
    fn test_transform_and_fill() {
        let meta = LayerMetadata {
            scale_factor: Some(0.02),
            add_offset: Some(-273.15),
            fill_value: Some(0.0),
            ..LayerMetadata::default()
        };
        let def = MetricDefinition::from_metadata(
            Metric::Lst,
            "MOD11A2.061",
            "LST_Day_1km",
            "QC_Day",
            AcceptableCodes::unrestricted(),
            &meta,
        );
        assert!((def.transform(15000.0) - 26.85).abs() < 1e-9);
        assert!(def.is_fill(0.0));
        assert!(!def.is_fill(1.0));

        let refs = def.layer_refs();
        assert_eq!(refs[0], LayerRef::new("MOD11A2.061", "LST_Day_1km"));
        assert_eq!(refs[1], LayerRef::new("MOD11A2.061", "QC_Day"));
    }

    #[test]
    fn test_blank_catalog_fill_disables_fill_check() {
        let meta = LayerMetadata::from_value(&serde_json::json!({
            "ScaleFactor": 0.0001,
            "FillValue": ""
        }));
        let def = MetricDefinition::from_metadata(
            Metric::Ndvi,
            "MOD13Q1.061",
            "_250m_16_days_NDVI",
            "_250m_16_days_VI_Quality",
            AcceptableCodes::unrestricted(),
            &meta,
        );
        assert_eq!(def.fill_value, None);
        assert!(!def.is_fill(0.0));
    }
}
