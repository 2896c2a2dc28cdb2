use std::io::BufRead;
use std::sync::Arc;

use anyhow::Result;

use kneeboard::config::Config;
use kneeboard::controller::{Dashboard, Gesture};
use kneeboard::elbow::{ElbowConvention, ElbowKind};
use kneeboard::gateway::{DataSource, HttpGateway};
use kneeboard::logging::{self, obj, v_str, Domain, Level};
use kneeboard::scene::SvgSurface;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cfg = Config::from_env();
    logging::log(
        Level::Info,
        Domain::System,
        "startup",
        obj(&[
            ("backend", v_str(&cfg.backend_base)),
            ("out_dir", v_str(&cfg.out_dir)),
        ]),
    );

    let source: Arc<dyn DataSource> = Arc::new(HttpGateway::new(&cfg)?);
    let detector = ElbowKind::from_env().build(ElbowConvention::from_env(), source.clone());
    let surface = SvgSurface::new(&cfg.out_dir)?;

    let mut dashboard = Dashboard::new(source, detector, surface);
    dashboard.load().await?;

    // Gesture loop: one interaction at a time, in program order.
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed == "quit" {
            break;
        }
        match Gesture::parse(trimmed) {
            Some(gesture) => dashboard.handle(gesture).await?,
            None => logging::log(
                Level::Warn,
                Domain::System,
                "unparsed_gesture",
                obj(&[("line", v_str(trimmed))]),
            ),
        }
    }

    logging::log(Level::Info, Domain::System, "shutdown", obj(&[]));
    Ok(())
}
