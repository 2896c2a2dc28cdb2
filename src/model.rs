//! Response shapes of the analysis backend and their validated domain forms.
//!
//! Responses deserialize into raw wire structs with optional fields, then
//! normalize into domain types. Anything missing or misshapen becomes a
//! `DataShape` error naming the field instead of a NaN reaching a chart.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{DashError, Result};
use crate::logging::{self, obj, Domain, Level};

/// Which curve an elbow query concerns; doubles as the `/find-elbow` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveKind {
    Scree,
    Kmeans,
}

impl CurveKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CurveKind::Scree => "scree",
            CurveKind::Kmeans => "kmeans",
        }
    }
}

/// One standardized dataset row, attribute name -> value.
pub type DatasetRow = BTreeMap<String, f64>;

/// Ranked attribute with its summed squared loading over the top components.
#[derive(Debug, Clone, PartialEq)]
pub struct TopAttribute {
    pub name: String,
    pub loading: f64,
}

// ---------------------------------------------------------------------------
// /pca
// ---------------------------------------------------------------------------

#[derive(Deserialize, Debug, Default)]
pub struct PcaWire {
    #[serde(default)]
    pub eigenvalues: Option<Vec<f64>>,
    #[serde(default)]
    pub scores: Option<Vec<Vec<f64>>>,
    #[serde(default)]
    pub eigenvectors: Option<Vec<Vec<f64>>>,
    #[serde(default)]
    pub column_names: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PcaBundle {
    pub eigenvalues: Vec<f64>,
    pub scores: Vec<Vec<f64>>,
    pub eigenvectors: Vec<Vec<f64>>,
    pub column_names: Vec<String>,
}

impl PcaBundle {
    pub fn num_components(&self) -> usize {
        self.eigenvalues.len()
    }

    /// Per-component share of total variance, in percent: the scree curve,
    /// derived client-side from the eigenvalues.
    pub fn variance_explained(&self) -> Result<Vec<f64>> {
        if self.eigenvalues.is_empty() {
            return Err(DashError::degenerate("empty eigenvalue curve"));
        }
        let total: f64 = self.eigenvalues.iter().sum();
        if !(total > 0.0) {
            return Err(DashError::degenerate(format!(
                "non-positive variance total {total}"
            )));
        }
        Ok(self
            .eigenvalues
            .iter()
            .map(|e| e / total * 100.0)
            .collect())
    }
}

pub fn validate_pca(wire: PcaWire) -> Result<PcaBundle> {
    let eigenvalues = wire
        .eigenvalues
        .ok_or_else(|| DashError::shape("eigenvalues"))?;
    let scores = wire.scores.ok_or_else(|| DashError::shape("scores"))?;
    let eigenvectors = wire
        .eigenvectors
        .ok_or_else(|| DashError::shape("eigenvectors"))?;
    let column_names = wire
        .column_names
        .ok_or_else(|| DashError::shape("column_names"))?;
    let width = scores.first().map(|row| row.len()).unwrap_or(0);
    if scores.iter().any(|row| row.len() != width) {
        return Err(DashError::shape("scores"));
    }
    // Eigenvector rows are per-component loadings over the original columns.
    if eigenvectors
        .iter()
        .any(|row| row.len() != column_names.len())
    {
        return Err(DashError::shape("eigenvectors"));
    }
    Ok(PcaBundle {
        eigenvalues,
        scores,
        eigenvectors,
        column_names,
    })
}

// ---------------------------------------------------------------------------
// /kmeans
// ---------------------------------------------------------------------------

#[derive(Deserialize, Debug, Default)]
pub struct KmeansWire {
    #[serde(default)]
    pub mse_scores: Option<Vec<f64>>,
    // JSON object keys are strings even though they are candidate k values.
    #[serde(default)]
    pub clusters: Option<BTreeMap<String, Vec<i64>>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KmeansBundle {
    pub mse_scores: Vec<f64>,
    pub clusters: BTreeMap<usize, Vec<usize>>,
}

impl KmeansBundle {
    /// Labels for a candidate k, if the server precomputed it.
    pub fn labels_for(&self, k: usize) -> Option<&[usize]> {
        self.clusters.get(&k).map(|labels| labels.as_slice())
    }
}

pub fn validate_kmeans(wire: KmeansWire) -> Result<KmeansBundle> {
    let mse_scores = wire
        .mse_scores
        .ok_or_else(|| DashError::shape("mse_scores"))?;
    let raw = wire.clusters.ok_or_else(|| DashError::shape("clusters"))?;
    let mut clusters = BTreeMap::new();
    for (key, labels) in raw {
        let k: usize = key.parse().map_err(|_| DashError::shape("clusters"))?;
        if k == 0 {
            return Err(DashError::shape("clusters"));
        }
        let labels = labels
            .into_iter()
            .map(|label| usize::try_from(label).map_err(|_| DashError::shape("clusters")))
            .collect::<Result<Vec<_>>>()?;
        clusters.insert(k, labels);
    }
    Ok(KmeansBundle {
        mse_scores,
        clusters,
    })
}

// ---------------------------------------------------------------------------
// /dataset
// ---------------------------------------------------------------------------

#[derive(Deserialize, Debug, Default)]
pub struct DatasetWire {
    #[serde(default)]
    pub dataset: Option<Vec<DatasetRow>>,
}

pub fn validate_dataset(wire: DatasetWire) -> Result<Vec<DatasetRow>> {
    wire.dataset.ok_or_else(|| DashError::shape("dataset"))
}

// ---------------------------------------------------------------------------
// /top-attributes
// ---------------------------------------------------------------------------

#[derive(Deserialize, Debug, Default)]
pub struct TopAttributesWire {
    #[serde(default)]
    pub top_attributes: Option<Vec<Value>>,
}

/// Entries arrive as `[name, score]` pairs. A malformed entry is skipped with
/// a logged error; the valid remainder still renders.
pub fn validate_top_attributes(wire: TopAttributesWire) -> Result<Vec<TopAttribute>> {
    let raw = wire
        .top_attributes
        .ok_or_else(|| DashError::shape("top_attributes"))?;
    let mut out = Vec::with_capacity(raw.len());
    for entry in &raw {
        match parse_attribute(entry) {
            Some(attr) => out.push(attr),
            None => logging::log(
                Level::Error,
                Domain::Gateway,
                "top_attribute_skipped",
                obj(&[("entry", entry.clone())]),
            ),
        }
    }
    Ok(out)
}

fn parse_attribute(entry: &Value) -> Option<TopAttribute> {
    let pair = entry.as_array()?;
    if pair.len() != 2 {
        return None;
    }
    let name = pair[0].as_str()?.to_string();
    let loading = pair[1].as_f64()?;
    Some(TopAttribute { name, loading })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_column_names_is_named_in_error() {
        let wire: PcaWire = serde_json::from_value(json!({
            "eigenvalues": [1.0], "scores": [[0.1]], "eigenvectors": [[0.5]]
        }))
        .unwrap();
        let err = validate_pca(wire).unwrap_err();
        assert!(matches!(err, DashError::DataShape { ref field } if field == "column_names"));
    }

    #[test]
    fn ragged_scores_rejected() {
        let wire: PcaWire = serde_json::from_value(json!({
            "eigenvalues": [1.0, 2.0],
            "scores": [[0.1, 0.2], [0.3]],
            "eigenvectors": [[0.5, 0.5]],
            "column_names": ["a", "b"]
        }))
        .unwrap();
        assert!(matches!(
            validate_pca(wire).unwrap_err(),
            DashError::DataShape { ref field } if field == "scores"
        ));
    }

    #[test]
    fn eigenvector_width_must_match_columns() {
        let wire: PcaWire = serde_json::from_value(json!({
            "eigenvalues": [1.0, 2.0],
            "scores": [[0.1, 0.2]],
            "eigenvectors": [[0.5, 0.5, 0.5]],
            "column_names": ["a", "b"]
        }))
        .unwrap();
        assert!(matches!(
            validate_pca(wire).unwrap_err(),
            DashError::DataShape { ref field } if field == "eigenvectors"
        ));
    }

    #[test]
    fn variance_explained_sums_to_hundred() {
        let bundle = PcaBundle {
            eigenvalues: vec![5.0, 3.0, 1.0, 0.5],
            scores: vec![],
            eigenvectors: vec![],
            column_names: vec![],
        };
        let ve = bundle.variance_explained().unwrap();
        assert!((ve.iter().sum::<f64>() - 100.0).abs() < 1e-9);
        assert!((ve[0] - 52.631578947368425).abs() < 1e-9);
    }

    #[test]
    fn zero_total_variance_is_degenerate() {
        let bundle = PcaBundle {
            eigenvalues: vec![0.0, 0.0],
            scores: vec![],
            eigenvectors: vec![],
            column_names: vec![],
        };
        assert!(matches!(
            bundle.variance_explained().unwrap_err(),
            DashError::DegenerateInput(_)
        ));
    }

    #[test]
    fn kmeans_keys_parse_to_usize() {
        let wire: KmeansWire = serde_json::from_value(json!({
            "mse_scores": [100.0, 40.0],
            "clusters": {"1": [0, 0], "2": [0, 1]}
        }))
        .unwrap();
        let bundle = validate_kmeans(wire).unwrap();
        assert_eq!(bundle.labels_for(2), Some(&[0usize, 1][..]));
        assert_eq!(bundle.labels_for(3), None);
    }

    #[test]
    fn negative_cluster_label_rejected() {
        let wire: KmeansWire = serde_json::from_value(json!({
            "mse_scores": [1.0],
            "clusters": {"1": [0, -2]}
        }))
        .unwrap();
        assert!(matches!(
            validate_kmeans(wire).unwrap_err(),
            DashError::DataShape { ref field } if field == "clusters"
        ));
    }

    #[test]
    fn malformed_top_attribute_entries_are_skipped() {
        let wire: TopAttributesWire = serde_json::from_value(json!({
            "top_attributes": [
                ["radius_mean", 0.41],
                ["missing_score"],
                [13, 0.2],
                ["texture_mean", 0.33]
            ]
        }))
        .unwrap();
        let attrs = validate_top_attributes(wire).unwrap();
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs[0].name, "radius_mean");
        assert_eq!(attrs[1].name, "texture_mean");
    }

    #[test]
    fn missing_top_attributes_field_fails() {
        let wire = TopAttributesWire::default();
        assert!(matches!(
            validate_top_attributes(wire).unwrap_err(),
            DashError::DataShape { ref field } if field == "top_attributes"
        ));
    }
}
