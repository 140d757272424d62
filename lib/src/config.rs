//! Configuration of the SPARQL endpoint the remote client talks to.

use crate::errors::RemoteError;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::io::{BufReader, Write};
use std::path::Path;
use std::time::Duration;
use url::Url;

fn default_query_path() -> String {
    "query".to_string()
}

fn default_update_path() -> String {
    "update".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    2
}

/// Where a SPARQL service lives and how patiently to talk to it.
///
/// `service_url` is the dataset base (for Fuseki, `http://host:3030/dataset`);
/// the query and update paths are resolved against it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EndpointConfig {
    pub service_url: String,
    #[serde(default = "default_query_path")]
    pub query_path: String,
    #[serde(default = "default_update_path")]
    pub update_path: String,
    // per request, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    // extra attempts for read-only requests after a transport failure
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl EndpointConfig {
    pub fn new(service_url: impl Into<String>) -> Self {
        EndpointConfig {
            service_url: service_url.into(),
            query_path: default_query_path(),
            update_path: default_update_path(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn query_url(&self) -> Result<Url, RemoteError> {
        self.resolve(&self.query_path)
    }

    pub fn update_url(&self) -> Result<Url, RemoteError> {
        self.resolve(&self.update_path)
    }

    fn resolve(&self, path: &str) -> Result<Url, RemoteError> {
        let invalid = |message: String| RemoteError::InvalidEndpoint {
            url: self.service_url.clone(),
            message,
        };
        // a base without a trailing slash would lose its last segment on join
        let mut base = self.service_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base = Url::parse(&base).map_err(|e| invalid(e.to_string()))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", base.scheme())));
        }
        base.join(path.trim_start_matches('/'))
            .map_err(|e| invalid(e.to_string()))
    }

    pub fn save_to_file(&self, file: &Path) -> Result<()> {
        let config_str = serde_json::to_string_pretty(&self)?;
        let mut file = std::fs::File::create(file)?;
        file.write_all(config_str.as_bytes())?;
        Ok(())
    }

    pub fn from_file(file: &Path) -> Result<Self> {
        let file = std::fs::File::open(file)?;
        let reader = BufReader::new(file);
        let config: EndpointConfig = serde_json::from_reader(reader)?;
        Ok(config)
    }

    /// Prints out the configuration in a readable way for command line output.
    pub fn print(&self) {
        println!("Endpoint configuration:");
        println!("  Service: {}", self.service_url);
        match (self.query_url(), self.update_url()) {
            (Ok(query), Ok(update)) => {
                println!("  Query: {}", query);
                println!("  Update: {}", update);
            }
            (Err(e), _) | (_, Err(e)) => println!("  Invalid: {}", e),
        }
        println!("  Timeout: {}s", self.timeout_secs);
        println!("  Max Retries: {}", self.max_retries);
    }
}
