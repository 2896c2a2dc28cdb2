//! One-shot headless render: load everything once, write the SVGs, exit.

use std::sync::Arc;

use anyhow::Result;

use kneeboard::config::Config;
use kneeboard::controller::Dashboard;
use kneeboard::elbow::{ElbowConvention, ElbowKind};
use kneeboard::gateway::{DataSource, HttpGateway};
use kneeboard::scene::SvgSurface;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cfg = Config::from_env();
    let source: Arc<dyn DataSource> = Arc::new(HttpGateway::new(&cfg)?);
    let detector = ElbowKind::from_env().build(ElbowConvention::from_env(), source.clone());
    let surface = SvgSurface::new(&cfg.out_dir)?;

    let mut dashboard = Dashboard::new(source, detector, surface);
    dashboard.load().await?;

    println!(
        "rendered into {} (d={}, k={}, pcs={:?})",
        cfg.out_dir,
        dashboard.selection().dimensionality(),
        dashboard.selection().cluster_k(),
        dashboard.selection().pcs()
    );
    Ok(())
}
