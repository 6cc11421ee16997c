//! HTTP client for the backing store.
use readload::{BoxError, ReadOperation, SetupError};
use reqwest::{Client, StatusCode, Url};
use std::time::Duration;
use tracing::{debug, info};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Reads rows from `GET {endpoint}/tables/{table}/rows/{key}`.
///
/// 200 is a hit, 404 a miss; both are successful reads. Anything else is a failure.
#[derive(Debug, Clone)]
pub struct HttpStore {
    client: Client,
    base: Url,
    table: String,
}

impl HttpStore {
    pub fn new(endpoint: &str, table: &str, pool_size: usize) -> Result<Self, SetupError> {
        let base = Url::parse(endpoint)
            .map_err(|err| SetupError::Connect(format!("invalid endpoint `{endpoint}`: {err}")))?;
        if base.cannot_be_a_base() {
            return Err(SetupError::Connect(format!(
                "invalid endpoint `{endpoint}`: not a base URL"
            )));
        }

        let client = Client::builder()
            .pool_max_idle_per_host(pool_size.max(1))
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|err| SetupError::Connect(format!("building client: {err}")))?;

        Ok(Self {
            client,
            base,
            table: table.to_string(),
        })
    }

    /// Build the client and make sure the store answers its health check.
    pub async fn connect(endpoint: &str, table: &str, pool_size: usize) -> Result<Self, SetupError> {
        let store = Self::new(endpoint, table, pool_size)?;
        let url = store.url(&["health"]);

        info!("Dialing {}...", store.base);
        let res = store
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| SetupError::Connect(err.to_string()))?;
        if !res.status().is_success() {
            return Err(SetupError::Connect(format!(
                "health check returned {}",
                res.status()
            )));
        }
        debug!("Store at {} is healthy", store.base);

        Ok(store)
    }

    pub fn row_url(&self, key: &str) -> Url {
        self.url(&["tables", &self.table, "rows", key])
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // NOTE: checked in `new`
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

impl ReadOperation for HttpStore {
    async fn read(&self, key: &str) -> Result<bool, BoxError> {
        let res = self.client.get(self.row_url(key)).send().await?;
        let status = res.status();
        // NOTE: drain the body so the connection goes back to the pool
        res.bytes().await?;
        match status {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(format!("unexpected status {status}").into()),
        }
    }
}
