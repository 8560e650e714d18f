//! Runtime settings for [`TcpConnector`](super::TcpConnector).

use std::time::Duration;

use crate::{
    config::{
        CloudConfig, DEFAULT_CONNECT_TIMEOUT, DEFAULT_MAX_FRAME_SIZE, DEFAULT_WRITE_TIMEOUT,
        Endpoint,
    },
    error::ConfigError,
};

use super::backoff::BackoffPolicy;

/// Resolved connector settings.
#[derive(Clone, Debug)]
pub struct TransportConfig {
    pub endpoint: Endpoint,
    /// Skip TLS certificate validation.
    pub tls_insecure: bool,
    pub connect_timeout: Duration,
    pub write_timeout: Duration,
    pub max_frame_size: usize,
    pub backoff: BackoffPolicy,
    /// Credentials written in the authentication frame after each connect.
    pub token: String,
    pub app_key: String,
}

impl TransportConfig {
    /// Settings for `endpoint` with default timeouts and backoff.
    pub fn new(endpoint: Endpoint, token: impl Into<String>, app_key: impl Into<String>) -> Self {
        Self {
            endpoint,
            tls_insecure: false,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            backoff: BackoffPolicy::default(),
            token: token.into(),
            app_key: app_key.into(),
        }
    }

    /// Resolve the cloud channel options, parsing the host.
    pub fn from_cloud(cloud: &CloudConfig) -> Result<Self, ConfigError> {
        let endpoint = Endpoint::parse(&cloud.host)?;
        Ok(Self {
            endpoint,
            tls_insecure: cloud.tls_insecure,
            connect_timeout: cloud.connect_timeout(),
            write_timeout: cloud.write_timeout(),
            max_frame_size: cloud.frame_limit(),
            backoff: BackoffPolicy::from(&cloud.backoff),
            token: cloud.token.clone(),
            app_key: cloud.app_key.clone(),
        })
    }

    pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn with_max_frame_size(mut self, size: usize) -> Self {
        self.max_frame_size = size;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}
