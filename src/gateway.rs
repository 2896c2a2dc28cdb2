//! Fetch wrappers for the five read-only backend endpoints.
//!
//! One async trait so the controller and elbow strategies can run against the
//! HTTP backend or a test fixture interchangeably. No retry, caching, or rate
//! limiting: the backend is treated as always available, and a failed round
//! trip surfaces as a `Network` error on the calling operation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::Config;
use crate::error::{DashError, Result};
use crate::logging::{self, obj, v_str, Domain, Level};
use crate::model::{self, CurveKind, DatasetRow, KmeansBundle, PcaBundle, TopAttribute};

#[async_trait]
pub trait DataSource: Send + Sync {
    async fn fetch_pca(&self) -> Result<PcaBundle>;
    async fn fetch_kmeans(&self) -> Result<KmeansBundle>;
    async fn fetch_dataset(&self) -> Result<Vec<DatasetRow>>;
    async fn fetch_top_attributes(&self, d: usize) -> Result<Vec<TopAttribute>>;
    async fn fetch_elbow(&self, kind: CurveKind, values: &[f64]) -> Result<usize>;
}

pub struct HttpGateway {
    client: Client,
    base: Url,
}

impl HttpGateway {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        let base = Url::parse(&cfg.backend_base)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.http_timeout_secs))
            .build()?;
        Ok(Self { client, base })
    }

    fn endpoint_url(&self, endpoint: &'static str) -> Result<Url> {
        self.base.join(endpoint).map_err(|e| DashError::Network {
            endpoint,
            message: format!("bad url: {e}"),
        })
    }

    fn elbow_url(&self, kind: CurveKind, values: &[f64]) -> Result<Url> {
        let mut url = self.endpoint_url("find-elbow")?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair(kind.as_str(), "1");
            for v in values {
                pairs.append_pair("values", &v.to_string());
            }
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &'static str, url: Url) -> Result<T> {
        logging::log(
            Level::Debug,
            Domain::Gateway,
            "fetch",
            obj(&[("endpoint", v_str(endpoint))]),
        );
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DashError::Network {
                endpoint,
                message: e.to_string(),
            })?;
        let status = resp.status();
        if !status.is_success() {
            return Err(DashError::Network {
                endpoint,
                message: format!("status {status}"),
            });
        }
        resp.json::<T>()
            .await
            .map_err(|_| DashError::shape(format!("{endpoint} response body")))
    }
}

#[async_trait]
impl DataSource for HttpGateway {
    async fn fetch_pca(&self) -> Result<PcaBundle> {
        let url = self.endpoint_url("pca")?;
        let wire: model::PcaWire = self.get_json("pca", url).await?;
        model::validate_pca(wire)
    }

    async fn fetch_kmeans(&self) -> Result<KmeansBundle> {
        let url = self.endpoint_url("kmeans")?;
        let wire: model::KmeansWire = self.get_json("kmeans", url).await?;
        model::validate_kmeans(wire)
    }

    async fn fetch_dataset(&self) -> Result<Vec<DatasetRow>> {
        let url = self.endpoint_url("dataset")?;
        let wire: model::DatasetWire = self.get_json("dataset", url).await?;
        model::validate_dataset(wire)
    }

    async fn fetch_top_attributes(&self, d: usize) -> Result<Vec<TopAttribute>> {
        let mut url = self.endpoint_url("top-attributes")?;
        url.query_pairs_mut().append_pair("d", &d.to_string());
        let wire: model::TopAttributesWire = self.get_json("top-attributes", url).await?;
        model::validate_top_attributes(wire)
    }

    async fn fetch_elbow(&self, kind: CurveKind, values: &[f64]) -> Result<usize> {
        let url = self.elbow_url(kind, values)?;
        // The endpoint replies with a bare JSON integer.
        let index: i64 = self.get_json("find-elbow", url).await?;
        usize::try_from(index).map_err(|_| DashError::shape("find-elbow index"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway() -> HttpGateway {
        let cfg = Config {
            backend_base: "http://127.0.0.1:5000".to_string(),
            out_dir: "./out".to_string(),
            http_timeout_secs: 10,
        };
        HttpGateway::new(&cfg).unwrap()
    }

    #[test]
    fn endpoint_urls_join_base() {
        let gw = gateway();
        assert_eq!(
            gw.endpoint_url("pca").unwrap().as_str(),
            "http://127.0.0.1:5000/pca"
        );
    }

    #[test]
    fn elbow_url_carries_flag_and_repeated_values() {
        let gw = gateway();
        let url = gw
            .elbow_url(CurveKind::Scree, &[52.6, 31.6, 10.5])
            .unwrap();
        let query = url.query().unwrap();
        assert!(query.contains("scree=1"));
        assert_eq!(query.matches("values=").count(), 3);
        assert!(query.contains("values=52.6"));
    }

    #[test]
    fn kmeans_flag_differs_from_scree() {
        let gw = gateway();
        let url = gw.elbow_url(CurveKind::Kmeans, &[1.0]).unwrap();
        assert!(url.query().unwrap().contains("kmeans=1"));
    }
}
