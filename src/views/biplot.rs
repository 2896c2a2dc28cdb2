//! Biplot: score rows projected onto the two selected components, colored by
//! the current cluster assignment when one is available.

use crate::error::{DashError, Result};
use crate::model::{KmeansBundle, PcaBundle};
use crate::scene::{cluster_color, extent, Anchor, LinearScale, Scene, BASE_FILL, LOADING_STROKE};
use crate::selection::SelectionState;

use super::{chart_frame, cluster_labels, xy_axes, BASELINE, CHART_HEIGHT, CHART_WIDTH, MARGIN_LEFT, TOP};

pub fn render(
    pca: &PcaBundle,
    kmeans: Option<&KmeansBundle>,
    selection: &SelectionState,
) -> Result<Scene> {
    let (pc_a, pc_b) = selection
        .pc_pair()
        .ok_or_else(|| DashError::degenerate("biplot needs exactly two selected components"))?;
    if pca.scores.is_empty() {
        return Err(DashError::degenerate("no score rows to project"));
    }
    let width = pca.scores[0].len();
    if pc_a >= width || pc_b >= width {
        return Err(DashError::shape("scores"));
    }
    let labels = cluster_labels(kmeans, selection, pca.scores.len())?;

    let (x0, x1) = extent(pca.scores.iter().map(|row| row[pc_a]))
        .ok_or_else(|| DashError::degenerate("x extent has no finite values"))?;
    let (y0, y1) = extent(pca.scores.iter().map(|row| row[pc_b]))
        .ok_or_else(|| DashError::degenerate("y extent has no finite values"))?;
    let x = LinearScale::new((x0, x1), (MARGIN_LEFT, CHART_WIDTH));
    let y = LinearScale::new((y0, y1), (BASELINE, TOP));

    let mut scene = Scene::new(CHART_WIDTH, CHART_HEIGHT);
    chart_frame(
        &mut scene,
        &format!("Biplot (PC{} vs PC{})", pc_a + 1, pc_b + 1),
        &format!("PC{}", pc_a + 1),
        &format!("PC{}", pc_b + 1),
    );
    xy_axes(&mut scene, &x, &y, 4);

    for (i, row) in pca.scores.iter().enumerate() {
        let fill = match labels {
            Some(labels) => cluster_color(labels[i]),
            None => BASE_FILL,
        };
        scene.circle(x.map(row[pc_a]), y.map(row[pc_b]), 5.0, fill);
    }

    // Loading-vector overlay: one arrow per original attribute, when the
    // eigenvectors cover both selected components.
    if pca.eigenvectors.len() > pc_a.max(pc_b) {
        let cx = (MARGIN_LEFT + CHART_WIDTH) / 2.0;
        let cy = (TOP + BASELINE) / 2.0;
        let span = (CHART_WIDTH - MARGIN_LEFT) / 2.0 * 0.8;
        for (j, name) in pca.column_names.iter().enumerate() {
            let lx = cx + pca.eigenvectors[pc_a][j] * span;
            let ly = cy - pca.eigenvectors[pc_b][j] * span;
            scene.line(cx, cy, lx, ly, LOADING_STROKE);
            scene.text(lx, ly - 4.0, name, Anchor::Middle);
        }
    }
    Ok(scene)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Shape;
    use std::collections::BTreeMap;

    fn pca() -> PcaBundle {
        PcaBundle {
            eigenvalues: vec![5.0, 3.0, 1.0],
            scores: vec![
                vec![1.0, 2.0, 0.1],
                vec![-1.0, 0.5, 0.2],
                vec![0.0, -2.0, 0.3],
            ],
            eigenvectors: vec![],
            column_names: vec!["a".into(), "b".into(), "c".into()],
        }
    }

    fn kmeans() -> KmeansBundle {
        let mut clusters = BTreeMap::new();
        clusters.insert(1, vec![0, 0, 0]);
        clusters.insert(2, vec![0, 1, 0]);
        KmeansBundle {
            mse_scores: vec![100.0, 40.0],
            clusters,
        }
    }

    fn circle_fills(scene: &Scene) -> Vec<&str> {
        scene
            .shapes()
            .iter()
            .filter_map(|s| match s {
                Shape::Circle { fill, .. } => Some(fill.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn requires_a_full_pair() {
        let mut selection = SelectionState::new();
        selection.toggle_pc(0);
        assert!(matches!(
            render(&pca(), None, &selection).unwrap_err(),
            DashError::DegenerateInput(_)
        ));
    }

    #[test]
    fn colors_follow_current_k_assignment() {
        let mut selection = SelectionState::new();
        selection.seed_pcs(0, 1);
        selection.set_cluster_k(2);
        let scene = render(&pca(), Some(&kmeans()), &selection).unwrap();
        let fills = circle_fills(&scene);
        assert_eq!(fills.len(), 3);
        assert_eq!(fills[0], cluster_color(0));
        assert_eq!(fills[1], cluster_color(1));
    }

    #[test]
    fn missing_assignment_falls_back_to_base_fill() {
        let mut selection = SelectionState::new();
        selection.seed_pcs(0, 1);
        selection.set_cluster_k(5);
        let scene = render(&pca(), Some(&kmeans()), &selection).unwrap();
        assert!(circle_fills(&scene).iter().all(|f| *f == BASE_FILL));
    }

    #[test]
    fn label_length_mismatch_is_degenerate() {
        let mut km = kmeans();
        km.clusters.insert(2, vec![0, 1]);
        let mut selection = SelectionState::new();
        selection.seed_pcs(0, 1);
        selection.set_cluster_k(2);
        assert!(matches!(
            render(&pca(), Some(&km), &selection).unwrap_err(),
            DashError::DegenerateInput(_)
        ));
    }

    #[test]
    fn loading_vectors_drawn_when_eigenvectors_cover_the_pair() {
        let mut bundle = pca();
        bundle.eigenvectors = vec![
            vec![0.7, -0.1, 0.2],
            vec![0.1, 0.6, -0.3],
            vec![0.2, 0.2, 0.9],
        ];
        let mut selection = SelectionState::new();
        selection.seed_pcs(0, 1);
        let scene = render(&bundle, None, &selection).unwrap();
        let loading_lines = scene
            .shapes()
            .iter()
            .filter(|s| matches!(s, Shape::Line { stroke, .. } if stroke == LOADING_STROKE))
            .count();
        assert_eq!(loading_lines, 3);
    }

    #[test]
    fn overlay_skipped_without_eigenvectors() {
        let mut selection = SelectionState::new();
        selection.seed_pcs(0, 1);
        let scene = render(&pca(), None, &selection).unwrap();
        assert!(!scene
            .shapes()
            .iter()
            .any(|s| matches!(s, Shape::Line { stroke, .. } if stroke == LOADING_STROKE)));
    }

    #[test]
    fn out_of_range_component_is_a_shape_error() {
        let mut selection = SelectionState::new();
        selection.seed_pcs(0, 9);
        assert!(matches!(
            render(&pca(), None, &selection).unwrap_err(),
            DashError::DataShape { .. }
        ));
    }
}
