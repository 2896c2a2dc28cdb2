//! Scatterplot matrix over the current top attributes, colored by the current
//! cluster assignment.

use crate::error::{DashError, Result};
use crate::model::{DatasetRow, KmeansBundle, TopAttribute};
use crate::scene::{cluster_color, extent, Anchor, LinearScale, Scene, BASE_FILL};
use crate::selection::SelectionState;

use super::cluster_labels;

const MATRIX_SIZE: f64 = 500.0;
const PADDING: f64 = 50.0;

pub fn render(
    dataset: &[DatasetRow],
    attributes: &[TopAttribute],
    kmeans: Option<&KmeansBundle>,
    selection: &SelectionState,
) -> Result<Scene> {
    if dataset.is_empty() {
        return Err(DashError::degenerate("dataset is empty"));
    }
    if attributes.is_empty() {
        return Err(DashError::degenerate("no attributes to plot"));
    }
    let labels = cluster_labels(kmeans, selection, dataset.len())?;

    // Column vectors up front; an attribute absent from any row is a shape
    // error, not a silently skipped point.
    let mut columns = Vec::with_capacity(attributes.len());
    let mut extents = Vec::with_capacity(attributes.len());
    for attr in attributes {
        let mut values = Vec::with_capacity(dataset.len());
        for row in dataset {
            values.push(
                *row.get(&attr.name)
                    .ok_or_else(|| DashError::shape(attr.name.clone()))?,
            );
        }
        extents.push(
            extent(values.iter().copied()).ok_or_else(|| {
                DashError::degenerate(format!("attribute {} has no finite values", attr.name))
            })?,
        );
        columns.push(values);
    }

    let cell = (MATRIX_SIZE - PADDING) / attributes.len() as f64;
    let mut scene = Scene::new(MATRIX_SIZE, MATRIX_SIZE);
    scene.text(MATRIX_SIZE / 2.0, 20.0, "Scatterplot Matrix", Anchor::Middle);

    for (col, x_values) in columns.iter().enumerate() {
        for (row_idx, y_values) in columns.iter().enumerate() {
            let x = LinearScale::new(
                extents[col],
                (col as f64 * cell + PADDING, (col + 1) as f64 * cell + PADDING),
            );
            let y = LinearScale::new(
                extents[row_idx],
                ((row_idx + 1) as f64 * cell, row_idx as f64 * cell),
            );
            for (i, (&vx, &vy)) in x_values.iter().zip(y_values).enumerate() {
                let fill = match labels {
                    Some(labels) => cluster_color(labels[i]),
                    None => BASE_FILL,
                };
                scene.circle(x.map(vx), y.map(vy), 2.0, fill);
            }
            if row_idx == attributes.len() - 1 {
                scene.text(
                    col as f64 * cell + PADDING + cell / 2.0,
                    MATRIX_SIZE,
                    &attributes[col].name,
                    Anchor::Middle,
                );
            }
            if col == 0 {
                scene.text(
                    10.0,
                    row_idx as f64 * cell + cell / 2.0,
                    &attributes[row_idx].name,
                    Anchor::End,
                );
            }
        }
    }
    Ok(scene)
}
