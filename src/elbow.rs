//! Elbow (knee point) detection over a 1-D curve.
//!
//! The client-side measure is a discrete total-variation proxy, not a true
//! second derivative: `bend(i) = |c[i-1]-c[i]| + |c[i]-c[i+1]|`. Summing two
//! consecutive absolute differences biases toward points adjacent to large
//! swings in either direction. The server-side kneedle variant is reachable
//! through [`RemoteKnee`].

use std::sync::Arc;

use async_trait::async_trait;

use crate::gateway::DataSource;
use crate::logging::{self, obj, v_str, v_usize, Domain, Level};
use crate::model::CurveKind;

/// Interior index of the maximal bend. Strict `>` keeps the first maximum;
/// curves shorter than 3 points have no interior and yield `None`, as do
/// all-equal curves (no bend ever exceeds zero).
fn interior_max(curve: &[f64]) -> Option<usize> {
    let mut max_bend = 0.0;
    let mut found = None;
    for i in 1..curve.len().saturating_sub(1) {
        let bend = (curve[i - 1] - curve[i]).abs() + (curve[i] - curve[i + 1]).abs();
        if bend > max_bend {
            max_bend = bend;
            found = Some(i);
        }
    }
    found
}

/// Canonical client-side elbow: the interior index of maximal bend, 0 for
/// degenerate curves. Deterministic and side-effect-free.
pub fn bend_index(curve: &[f64]) -> usize {
    interior_max(curve).unwrap_or(0)
}

/// The bend can be reported as the interior index itself or as its
/// successor. `Interior` is canonical for seeding selection state;
/// `Successor` matches chart highlights that mark the bar after the bend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElbowConvention {
    Interior,
    Successor,
}

impl ElbowConvention {
    pub fn from_env() -> Self {
        match std::env::var("ELBOW_CONVENTION").as_deref() {
            Ok("successor") => ElbowConvention::Successor,
            _ => ElbowConvention::Interior,
        }
    }

    pub fn apply(self, curve: &[f64]) -> usize {
        match self {
            ElbowConvention::Interior => bend_index(curve),
            ElbowConvention::Successor => interior_max(curve).map(|i| i + 1).unwrap_or(0),
        }
    }
}

/// Pluggable elbow strategy. Detection never fails: the remote strategy falls
/// back to the local computation on any gateway or range problem, so behavior
/// is identical to [`LocalBend`] whenever the backend is unavailable.
#[async_trait]
pub trait ElbowDetector: Send + Sync {
    async fn detect(&self, kind: CurveKind, curve: &[f64]) -> usize;
}

pub struct LocalBend {
    convention: ElbowConvention,
}

impl LocalBend {
    pub fn new(convention: ElbowConvention) -> Self {
        Self { convention }
    }
}

#[async_trait]
impl ElbowDetector for LocalBend {
    async fn detect(&self, _kind: CurveKind, curve: &[f64]) -> usize {
        self.convention.apply(curve)
    }
}

/// Asks `/find-elbow` and trusts its answer when it is in range.
pub struct RemoteKnee {
    source: Arc<dyn DataSource>,
    convention: ElbowConvention,
}

impl RemoteKnee {
    pub fn new(source: Arc<dyn DataSource>, convention: ElbowConvention) -> Self {
        Self { source, convention }
    }
}

#[async_trait]
impl ElbowDetector for RemoteKnee {
    async fn detect(&self, kind: CurveKind, curve: &[f64]) -> usize {
        match self.source.fetch_elbow(kind, curve).await {
            Ok(index) if index < curve.len() => index,
            Ok(index) => {
                logging::log(
                    Level::Warn,
                    Domain::Elbow,
                    "remote_index_out_of_range",
                    obj(&[
                        ("curve", v_str(kind.as_str())),
                        ("index", v_usize(index)),
                        ("len", v_usize(curve.len())),
                    ]),
                );
                self.convention.apply(curve)
            }
            Err(err) => {
                logging::log(
                    Level::Warn,
                    Domain::Elbow,
                    "remote_elbow_failed",
                    obj(&[
                        ("curve", v_str(kind.as_str())),
                        ("error", v_str(&err.to_string())),
                    ]),
                );
                self.convention.apply(curve)
            }
        }
    }
}

/// Which strategy to build, mirroring the env-selected collaborators elsewhere
/// in the stack.
#[derive(Clone, Copy, Debug)]
pub enum ElbowKind {
    Local,
    Remote,
}

impl ElbowKind {
    pub fn from_env() -> Self {
        match std::env::var("ELBOW").as_deref() {
            Ok("remote") => ElbowKind::Remote,
            _ => ElbowKind::Local,
        }
    }

    pub fn build(
        self,
        convention: ElbowConvention,
        source: Arc<dyn DataSource>,
    ) -> Box<dyn ElbowDetector> {
        match self {
            ElbowKind::Local => Box::new(LocalBend::new(convention)),
            ElbowKind::Remote => Box::new(RemoteKnee::new(source, convention)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_curves_yield_zero() {
        for curve in [vec![], vec![1.0], vec![1.0, 2.0]] {
            assert_eq!(bend_index(&curve), 0);
            assert_eq!(ElbowConvention::Successor.apply(&curve), 0);
        }
    }

    #[test]
    fn flat_curve_yields_zero() {
        let curve = [3.0; 7];
        assert_eq!(bend_index(&curve), 0);
        assert_eq!(ElbowConvention::Successor.apply(&curve), 0);
    }

    #[test]
    fn index_always_in_range() {
        let curves: [&[f64]; 5] = [
            &[1.0, 2.0, 10.0, 11.0, 12.0],
            &[100.0, 40.0, 35.0, 33.0, 32.0],
            &[0.0, 0.0, 1.0],
            &[5.0, 3.0, 1.0, 0.5],
            &[1.0, 1.0, 1.0, 50.0],
        ];
        for curve in curves {
            assert!(bend_index(curve) < curve.len());
            assert!(ElbowConvention::Successor.apply(curve) < curve.len());
        }
    }

    #[test]
    fn successor_convention_reports_bar_after_bend() {
        // bend(1) = |1-2|+|2-10| = 9 ties bend(2) = |2-10|+|10-11| = 9;
        // strict > keeps i = 1, the successor convention reports i + 1 = 2.
        let curve = [1.0, 2.0, 10.0, 11.0, 12.0];
        assert_eq!(ElbowConvention::Successor.apply(&curve), 2);
        assert_eq!(bend_index(&curve), 1);
    }

    #[test]
    fn mse_curve_elbow_at_sharpest_bend() {
        // bend(1) = 60 + 5 = 65 dominates every other interior point.
        let mse = [100.0, 40.0, 35.0, 33.0, 32.0];
        assert_eq!(bend_index(&mse), 1);
    }

    #[test]
    fn variance_explained_curve_verified_against_formula() {
        // eigenvalues [5, 3, 1, 0.5], total 9.5 -> ~[52.6, 31.6, 10.5, 5.3].
        let eigen = [5.0, 3.0, 1.0, 0.5];
        let total: f64 = eigen.iter().sum();
        let ve: Vec<f64> = eigen.iter().map(|e| e / total * 100.0).collect();
        // bend(1) = 21.05 + 21.05 = 42.1, bend(2) = 21.05 + 5.26 = 26.3.
        assert_eq!(bend_index(&ve), 1);
    }

    #[tokio::test]
    async fn local_strategy_applies_convention() {
        let curve = [1.0, 2.0, 10.0, 11.0, 12.0];
        let local = LocalBend::new(ElbowConvention::Successor);
        assert_eq!(local.detect(CurveKind::Scree, &curve).await, 2);
    }
}
