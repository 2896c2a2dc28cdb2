//! Scree plot: per-component variance explained, selected PCs highlighted.

use crate::error::{DashError, Result};
use crate::scene::{extent, BandScale, LinearScale, Scene, BASE_FILL, HIGHLIGHT_FILL};
use crate::selection::SelectionState;

use super::{band_axis, chart_frame, y_axis, BASELINE, CHART_HEIGHT, CHART_WIDTH, MARGIN_LEFT, TOP};

pub fn render(variance_explained: &[f64], selection: &SelectionState) -> Result<Scene> {
    if variance_explained.is_empty() {
        return Err(DashError::degenerate("scree curve is empty"));
    }
    let (_, max) = extent(variance_explained.iter().copied())
        .ok_or_else(|| DashError::degenerate("scree curve has no finite values"))?;

    let x = BandScale::new(variance_explained.len(), (MARGIN_LEFT, CHART_WIDTH), 0.1);
    let y = LinearScale::new((0.0, max), (BASELINE, TOP));

    let mut scene = Scene::new(CHART_WIDTH, CHART_HEIGHT);
    chart_frame(
        &mut scene,
        "Scree Plot",
        "Principal Components",
        "Variance Explained",
    );
    band_axis(
        &mut scene,
        &x,
        (0..variance_explained.len()).map(|i| (i + 1).to_string()),
    );
    y_axis(&mut scene, &y, 5, |v| format!("{v:.1}%"));

    for (i, &value) in variance_explained.iter().enumerate() {
        let fill = if selection.pcs().contains(&i) {
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

    fn rect_fills(scene: &Scene) -> Vec<&str> {
        scene
            .shapes()
            .iter()
            .filter_map(|s| match s {
                Shape::Rect { fill, .. } => Some(fill.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn one_bar_per_component() {
        let scene = render(&[52.6, 31.6, 10.5, 5.3], &SelectionState::new()).unwrap();
        assert_eq!(rect_fills(&scene).len(), 4);
    }

    #[test]
    fn selected_components_highlighted() {
        let mut selection = SelectionState::new();
        selection.seed_pcs(0, 2);
        let scene = render(&[52.6, 31.6, 10.5, 5.3], &selection).unwrap();
        assert_eq!(
            rect_fills(&scene),
            vec![HIGHLIGHT_FILL, BASE_FILL, HIGHLIGHT_FILL, BASE_FILL]
        );
    }

    #[test]
    fn empty_curve_short_circuits() {
        assert!(matches!(
            render(&[], &SelectionState::new()).unwrap_err(),
            DashError::DegenerateInput(_)
        ));
    }
}
