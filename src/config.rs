/// Runtime configuration, environment-driven like the rest of the tooling.
#[derive(Clone, Debug)]
pub struct Config {
    /// Base URL of the analysis backend serving /pca, /kmeans, /dataset,
    /// /top-attributes and /find-elbow.
    pub backend_base: String,
    /// Directory the SVG surface writes rendered containers into.
    pub out_dir: String,
    /// Per-request timeout for the HTTP client. A hung request past this
    /// stalls only the dependent view's refresh.
    pub http_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            backend_base: std::env::var("BACKEND_BASE")
                .unwrap_or_else(|_| "http://127.0.0.1:5000".to_string()),
            out_dir: std::env::var("OUT_DIR").unwrap_or_else(|_| "./out".to_string()),
            http_timeout_secs: std::env::var("HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
        }
    }
}
