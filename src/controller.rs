//! Orchestrates load order and gesture-driven refresh propagation.
//!
//! The refresh rules are the heart of the dashboard: each gesture mutates the
//! selection and re-renders exactly the views that read the changed value. A
//! render can never mix selection values from different instants because every
//! render re-reads the one `SelectionState` right before building its scene.
//! Gestures are processed strictly one at a time on the single UI task.

use std::sync::Arc;

use anyhow::Result;
use serde_json::json;

use crate::elbow::ElbowDetector;
use crate::error::DashError;
use crate::gateway::DataSource;
use crate::logging::{self, obj, v_str, v_usize, Domain, Level};
use crate::model::{CurveKind, DatasetRow, KmeansBundle, PcaBundle, TopAttribute};
use crate::scene::{Scene, Surface};
use crate::selection::SelectionState;
use crate::views;

/// A user interaction, index-addressed exactly like the chart bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    /// Select or deselect a principal component (a scree bar click).
    TogglePc(usize),
    /// Pick an intrinsic dimensionality (the secondary action on a scree bar).
    PickDimensionality(usize),
    /// Pick a cluster count (an MSE bar click).
    PickClusterCount(usize),
    /// Refetch everything and re-render.
    Reload,
}

impl Gesture {
    /// Parse one gesture line: `pc <i>`, `dim <i>`, `k <i>`, `reload`.
    pub fn parse(line: &str) -> Option<Gesture> {
        let mut parts = line.split_whitespace();
        match parts.next()? {
            "reload" => Some(Gesture::Reload),
            verb => {
                let index: usize = parts.next()?.parse().ok()?;
                match verb {
                    "pc" => Some(Gesture::TogglePc(index)),
                    "dim" => Some(Gesture::PickDimensionality(index)),
                    "k" => Some(Gesture::PickClusterCount(index)),
                    _ => None,
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Initial,
    Loaded,
    Interactive,
}

pub struct Dashboard<S: Surface> {
    source: Arc<dyn DataSource>,
    detector: Box<dyn ElbowDetector>,
    surface: S,
    selection: SelectionState,
    phase: Phase,
    pca: Option<PcaBundle>,
    kmeans: Option<KmeansBundle>,
    dataset: Option<Vec<DatasetRow>>,
    top_attributes: Vec<TopAttribute>,
}

impl<S: Surface> Dashboard<S> {
    pub fn new(source: Arc<dyn DataSource>, detector: Box<dyn ElbowDetector>, surface: S) -> Self {
        Self {
            source,
            detector,
            surface,
            selection: SelectionState::new(),
            phase: Phase::Initial,
            pca: None,
            kmeans: None,
            dataset: None,
            top_attributes: Vec::new(),
        }
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Initial load: fetch both analysis bundles once, seed the selection from
    /// the two elbows, fetch attribute data for the seeded d, render all
    /// views. A failed fetch aborts only the renders that need its data.
    pub async fn load(&mut self) -> Result<()> {
        match self.source.fetch_pca().await {
            Ok(pca) => self.pca = Some(pca),
            Err(err) => self.log_fetch_failed("pca", &err),
        }
        match self.source.fetch_kmeans().await {
            Ok(km) => self.kmeans = Some(km),
            Err(err) => self.log_fetch_failed("kmeans", &err),
        }

        if let Some(pca) = &self.pca {
            match pca.variance_explained() {
                Ok(ve) => {
                    let elbow = self.detector.detect(CurveKind::Scree, &ve).await;
                    self.selection.set_dimensionality(elbow + 1);
                }
                Err(err) => self.log_fetch_failed("pca", &err),
            }
            if pca.num_components() >= 2 {
                self.selection.seed_pcs(0, 1);
            }
        }
        if let Some(km) = &self.kmeans {
            let elbow = self.detector.detect(CurveKind::Kmeans, &km.mse_scores).await;
            self.selection.set_cluster_k(elbow + 1);
        }
        logging::log(
            Level::Info,
            Domain::Selection,
            "seeded",
            obj(&[
                ("dimensionality", v_usize(self.selection.dimensionality())),
                ("cluster_k", v_usize(self.selection.cluster_k())),
                ("pcs", json!(self.selection.pcs())),
            ]),
        );

        self.refresh_top_attributes().await;
        self.refresh_dataset().await;

        self.phase = Phase::Loaded;
        self.render_scree();
        self.render_biplot();
        self.render_mse();
        self.render_top_attributes();
        self.render_scatter_matrix();
        Ok(())
    }

    /// Apply one gesture and re-render exactly the dependent views.
    pub async fn handle(&mut self, gesture: Gesture) -> Result<()> {
        self.phase = Phase::Interactive;
        match gesture {
            Gesture::TogglePc(index) => {
                if let Some(pca) = &self.pca {
                    if index >= pca.num_components() {
                        logging::log(
                            Level::Warn,
                            Domain::Selection,
                            "pc_out_of_range",
                            obj(&[("index", v_usize(index))]),
                        );
                        return Ok(());
                    }
                }
                self.selection.toggle_pc(index);
                logging::log(
                    Level::Info,
                    Domain::Selection,
                    "pc_toggled",
                    obj(&[
                        ("index", v_usize(index)),
                        ("selected", json!(self.selection.pcs())),
                    ]),
                );
                // Only the biplot depends on the pair; the scree re-renders to
                // move its highlight, its data never changes.
                self.render_scree();
                if self.selection.pc_pair().is_some() {
                    self.render_biplot();
                }
            }
            Gesture::PickDimensionality(index) => {
                self.selection.set_dimensionality(index + 1);
                logging::log(
                    Level::Info,
                    Domain::Selection,
                    "dimensionality_set",
                    obj(&[("d", v_usize(self.selection.dimensionality()))]),
                );
                self.refresh_top_attributes().await;
                self.render_top_attributes();
                self.render_scatter_matrix();
            }
            Gesture::PickClusterCount(index) => {
                self.selection.set_cluster_k(index + 1);
                logging::log(
                    Level::Info,
                    Domain::Selection,
                    "cluster_k_set",
                    obj(&[("k", v_usize(self.selection.cluster_k()))]),
                );
                self.render_mse();
                if self.selection.pc_pair().is_some() {
                    self.render_biplot();
                }
                self.render_scatter_matrix();
            }
            Gesture::Reload => self.load().await?,
        }
        Ok(())
    }

    fn render_scree(&mut self) {
        let Some(pca) = &self.pca else { return };
        let result = pca
            .variance_explained()
            .and_then(|ve| views::scree::render(&ve, &self.selection));
        self.present(views::SCREE_CONTAINER, result);
    }

    fn render_biplot(&mut self) {
        let Some(pca) = &self.pca else { return };
        let result = views::biplot::render(pca, self.kmeans.as_ref(), &self.selection);
        self.present(views::BIPLOT_CONTAINER, result);
    }

    fn render_mse(&mut self) {
        let Some(km) = &self.kmeans else { return };
        let result = views::mse::render(&km.mse_scores, &self.selection);
        self.present(views::MSE_CONTAINER, result);
    }

    fn render_top_attributes(&mut self) {
        if self.top_attributes.is_empty() {
            // Nothing fetched yet; the container keeps whatever it shows.
            return;
        }
        let result = views::top_attributes::render(&self.top_attributes);
        self.present(views::TOP_ATTRIBUTES_CONTAINER, result);
    }

    fn render_scatter_matrix(&mut self) {
        let Some(dataset) = &self.dataset else { return };
        let result = views::scatter_matrix::render(
            dataset,
            &self.top_attributes,
            self.kmeans.as_ref(),
            &self.selection,
        );
        self.present(views::SCATTER_MATRIX_CONTAINER, result);
    }

    /// Replace a container's scene, or log why it keeps its previous one.
    fn present(&mut self, container: &str, scene: crate::error::Result<Scene>) {
        match scene {
            Ok(scene) => {
                if let Err(err) = self.surface.render(container, &scene) {
                    logging::log(
                        Level::Error,
                        Domain::View,
                        "surface_write_failed",
                        obj(&[
                            ("container", v_str(container)),
                            ("error", v_str(&err.to_string())),
                        ]),
                    );
                } else {
                    logging::log(
                        Level::Debug,
                        Domain::View,
                        "rendered",
                        obj(&[("container", v_str(container))]),
                    );
                }
            }
            Err(err) => {
                // Short-circuit: the container keeps its previous scene.
                logging::log(
                    Level::Error,
                    Domain::View,
                    "render_skipped",
                    obj(&[
                        ("container", v_str(container)),
                        ("kind", v_str(err.kind())),
                        ("error", v_str(&err.to_string())),
                    ]),
                );
            }
        }
    }

    async fn refresh_top_attributes(&mut self) {
        let d = self.selection.dimensionality();
        match self.source.fetch_top_attributes(d).await {
            Ok(attrs) => self.top_attributes = attrs,
            Err(err) => self.log_fetch_failed("top-attributes", &err),
        }
    }

    async fn refresh_dataset(&mut self) {
        match self.source.fetch_dataset().await {
            Ok(rows) => self.dataset = Some(rows),
            Err(err) => self.log_fetch_failed("dataset", &err),
        }
    }

    fn log_fetch_failed(&self, endpoint: &str, err: &DashError) {
        logging::log(
            Level::Error,
            Domain::Gateway,
            "fetch_failed",
            obj(&[
                ("endpoint", v_str(endpoint)),
                ("kind", v_str(err.kind())),
                ("error", v_str(&err.to_string())),
            ]),
        );
    }
}
