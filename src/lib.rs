//! Headless dashboard client for a PCA / k-means analysis backend.
//!
//! `kneeboard` fetches precomputed dimensionality-reduction and clustering
//! results over HTTP and renders four coupled chart views (scree plot, biplot,
//! MSE plot, scatterplot matrix) plus a top-attributes table into named
//! containers. The interesting part is small: elbow detection over a curve,
//! and the selection state that keeps the views mutually consistent while the
//! user toggles principal components, dimensionality, and cluster count.

pub mod config;
pub mod controller;
pub mod elbow;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod model;
pub mod scene;
pub mod selection;
pub mod views;
