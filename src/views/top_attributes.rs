//! Top-attributes table: server-ranked attribute names with loading scores.

use crate::error::{DashError, Result};
use crate::model::TopAttribute;
use crate::scene::{Anchor, Scene};

const WIDTH: f64 = 500.0;
const ROW_HEIGHT: f64 = 20.0;

pub fn render(attributes: &[TopAttribute]) -> Result<Scene> {
    if attributes.is_empty() {
        return Err(DashError::degenerate("no attributes to list"));
    }
    let height = 40.0 + ROW_HEIGHT * attributes.len() as f64;
    let mut scene = Scene::new(WIDTH, height);
    scene.text(WIDTH / 2.0, 20.0, "Top Attributes", Anchor::Middle);
    for (i, attr) in attributes.iter().enumerate() {
        let y = 40.0 + ROW_HEIGHT * i as f64;
        scene.text(20.0, y, &format!("{}.", i + 1), Anchor::Start);
        scene.text(50.0, y, &attr.name, Anchor::Start);
        scene.text(WIDTH - 20.0, y, &format!("{:.3}", attr.loading), Anchor::End);
    }
    Ok(scene)
}
