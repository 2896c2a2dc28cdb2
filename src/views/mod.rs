//! The four chart views plus the top-attributes table.
//!
//! Each view is a pure function `(data, selection) -> Scene`; the controller
//! decides when a view runs and which container receives the result. Color
//! and highlight rules live here, refresh rules live in the controller.

pub mod biplot;
pub mod mse;
pub mod scatter_matrix;
pub mod scree;
pub mod top_attributes;

use crate::error::{DashError, Result};
use crate::model::KmeansBundle;
use crate::scene::{Anchor, BandScale, LinearScale, Scene, AXIS_STROKE};
use crate::selection::SelectionState;

pub const SCREE_CONTAINER: &str = "scree-container";
pub const BIPLOT_CONTAINER: &str = "biplot-container";
pub const MSE_CONTAINER: &str = "mse-plot";
pub const SCATTER_MATRIX_CONTAINER: &str = "scatterplot-matrix";
pub const TOP_ATTRIBUTES_CONTAINER: &str = "top-attributes-table";

// Shared frame geometry for the rectangular charts.
pub(crate) const CHART_WIDTH: f64 = 500.0;
pub(crate) const CHART_HEIGHT: f64 = 300.0;
pub(crate) const MARGIN_LEFT: f64 = 50.0;
pub(crate) const TOP: f64 = 50.0;
pub(crate) const BASELINE: f64 = 250.0;

/// Title plus axis captions, the frame every rectangular chart shares.
pub(crate) fn chart_frame(scene: &mut Scene, title: &str, x_label: &str, y_label: &str) {
    scene.text(CHART_WIDTH / 2.0, 20.0, title, Anchor::Middle);
    scene.rotated_text(-150.0, 10.0, y_label, Anchor::Middle, -90.0);
    scene.text(
        CHART_WIDTH / 2.0 + 10.0,
        CHART_HEIGHT - 15.0,
        x_label,
        Anchor::Middle,
    );
}

/// Bottom axis line with one tick label per band.
pub(crate) fn band_axis(
    scene: &mut Scene,
    bands: &BandScale,
    labels: impl Iterator<Item = String>,
) {
    scene.line(MARGIN_LEFT, BASELINE, CHART_WIDTH, BASELINE, AXIS_STROKE);
    for (i, label) in labels.enumerate() {
        scene.text(bands.center(i), BASELINE + 15.0, &label, Anchor::Middle);
    }
}

/// Left axis line with numeric tick labels.
pub(crate) fn y_axis(
    scene: &mut Scene,
    scale: &LinearScale,
    ticks: usize,
    fmt: impl Fn(f64) -> String,
) {
    scene.line(MARGIN_LEFT, TOP, MARGIN_LEFT, BASELINE, AXIS_STROKE);
    for t in scale.ticks(ticks) {
        scene.text(MARGIN_LEFT - 5.0, scale.map(t) + 4.0, &fmt(t), Anchor::End);
    }
}

/// Both axis lines with numeric ticks, for scatter charts.
pub(crate) fn xy_axes(scene: &mut Scene, x: &LinearScale, y: &LinearScale, ticks: usize) {
    scene.line(MARGIN_LEFT, BASELINE, CHART_WIDTH, BASELINE, AXIS_STROKE);
    scene.line(MARGIN_LEFT, TOP, MARGIN_LEFT, BASELINE, AXIS_STROKE);
    for t in x.ticks(ticks) {
        scene.text(x.map(t), BASELINE + 15.0, &format!("{t:.1}"), Anchor::Middle);
    }
    for t in y.ticks(ticks) {
        scene.text(MARGIN_LEFT - 5.0, y.map(t) + 4.0, &format!("{t:.1}"), Anchor::End);
    }
}

/// Cluster labels for the current k, if usable for a chart with `rows` marks.
///
/// No assignment for the current k is fine (views fall back to the base
/// fill); an assignment of the wrong length is a degenerate input and
/// short-circuits the render.
pub(crate) fn cluster_labels<'a>(
    kmeans: Option<&'a KmeansBundle>,
    selection: &SelectionState,
    rows: usize,
) -> Result<Option<&'a [usize]>> {
    let Some(km) = kmeans else { return Ok(None) };
    match km.labels_for(selection.cluster_k()) {
        None => Ok(None),
        Some(labels) if labels.len() == rows => Ok(Some(labels)),
        Some(labels) => Err(DashError::degenerate(format!(
            "cluster labels for k={} cover {} rows, chart has {}",
            selection.cluster_k(),
            labels.len(),
            rows
        ))),
    }
}
