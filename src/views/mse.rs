//! K-means MSE plot: one bar per candidate k, the current pick highlighted.

use crate::error::{DashError, Result};
use crate::scene::{extent, BandScale, LinearScale, Scene, BASE_FILL, HIGHLIGHT_FILL};
use crate::selection::SelectionState;

use super::{band_axis, chart_frame, y_axis, BASELINE, CHART_HEIGHT, CHART_WIDTH, MARGIN_LEFT, TOP};

pub fn render(mse_scores: &[f64], selection: &SelectionState) -> Result<Scene> {
    if mse_scores.is_empty() {
        return Err(DashError::degenerate("MSE curve is empty"));
    }
    let (_, max) = extent(mse_scores.iter().copied())
        .ok_or_else(|| DashError::degenerate("MSE curve has no finite values"))?;

    let x = BandScale::new(mse_scores.len(), (MARGIN_LEFT, CHART_WIDTH), 0.1);
    let y = LinearScale::new((0.0, max), (BASELINE, TOP));

    let mut scene = Scene::new(CHART_WIDTH, CHART_HEIGHT);
    chart_frame(&mut scene, "K-Means MSE Plot", "k", "Mean Square Error Score");
    // Bars are candidate cluster counts, so ticks are 1-based k values.
    band_axis(
        &mut scene,
        &x,
        (0..mse_scores.len()).map(|i| (i + 1).to_string()),
    );
    y_axis(&mut scene, &y, 5, |v| format!("{v:.0}"));

    for (i, &value) in mse_scores.iter().enumerate() {
        let fill = if i + 1 == selection.cluster_k() {
            HIGHLIGHT_FILL
        } else {
            BASE_FILL
        };
        let top = y.map(value);
        scene.rect(x.position(i), top, x.bandwidth(), BASELINE - top, fill);
    }
    Ok(scene)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Shape;

    #[test]
    fn current_k_bar_highlighted() {
        let mut selection = SelectionState::new();
        selection.set_cluster_k(2);
        let scene = render(&[100.0, 40.0, 35.0, 33.0, 32.0], &selection).unwrap();
        let fills: Vec<_> = scene
            .shapes()
            .iter()
            .filter_map(|s| match s {
                Shape::Rect { fill, .. } => Some(fill.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(
            fills,
            vec![BASE_FILL, HIGHLIGHT_FILL, BASE_FILL, BASE_FILL, BASE_FILL]
        );
    }

    #[test]
    fn empty_curve_short_circuits() {
        assert!(render(&[], &SelectionState::new()).is_err());
    }
}
