//! Connection configuration applied to the driver's client options

use docbridge_common::{DocBridgeError, Result};
use mongodb::options::{ClientOptions, ServerAddress, WriteConcern};
use std::time::Duration;

/// Default MongoDB port
pub const DEFAULT_PORT: u16 = 27017;

/// Environment variable holding the server host
pub const HOST_ENV: &str = "MONGODB_HOST";

/// Environment variable holding the server port
pub const PORT_ENV: &str = "MONGODB_PORT";

/// Where and how to reach the server.
///
/// Set once when the handler is built; every operation opens its own client
/// from this configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionConfig {
    /// Server host name or IP literal
    pub host: String,
    /// Server port
    pub port: u16,
    /// Connection timeout (default: 10s)
    pub connect_timeout: Option<Duration>,
    /// Server selection timeout (default: 30s)
    pub server_selection_timeout: Option<Duration>,
    /// How long the server may take to confirm a write (default: none).
    ///
    /// When set, writes use a majority write concern with this `wtimeout`.
    /// A write that exceeds it has an unknown outcome.
    pub write_timeout: Option<Duration>,
    /// Application name for server logs
    pub app_name: Option<String>,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: DEFAULT_PORT,
            connect_timeout: Some(Duration::from_secs(10)),
            server_selection_timeout: Some(Duration::from_secs(30)),
            write_timeout: None,
            app_name: Some("docbridge".to_string()),
        }
    }
}

impl ConnectionConfig {
    /// Configuration for `host:port` with default timeouts
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    /// Reads `MONGODB_HOST` and `MONGODB_PORT`, falling back to the defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Ok(host) = std::env::var(HOST_ENV) {
            if !host.is_empty() {
                config.host = host;
            }
        }
        if let Ok(port) = std::env::var(PORT_ENV) {
            config.port = port.parse().map_err(|_| {
                DocBridgeError::InvalidArgument(format!(
                    "{} is not a valid port: '{}'",
                    PORT_ENV, port
                ))
            })?;
        }
        Ok(config)
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn with_server_selection_timeout(mut self, timeout: Duration) -> Self {
        self.server_selection_timeout = Some(timeout);
        self
    }

    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = Some(timeout);
        self
    }

    pub fn with_app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = Some(name.into());
        self
    }

    /// `host:port` as the driver expects it; IPv6 literals are bracketed
    pub fn address(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    /// Parses the configured address into a driver server address
    pub fn server_address(&self) -> Result<ServerAddress> {
        if self.host.is_empty() {
            return Err(DocBridgeError::Connection(
                "Host cannot be empty".to_string(),
            ));
        }
        let address = self.address();
        ServerAddress::parse(&address).map_err(|e| {
            DocBridgeError::Connection(format!("Invalid server address '{}': {}", address, e))
        })
    }

    /// Builds driver client options from this configuration
    pub fn to_client_options(&self) -> Result<ClientOptions> {
        let mut client_options = ClientOptions::default();
        client_options.hosts = vec![self.server_address()?];

        if let Some(connect) = self.connect_timeout {
            client_options.connect_timeout = Some(connect);
        }
        if let Some(server_sel) = self.server_selection_timeout {
            client_options.server_selection_timeout = Some(server_sel);
        }
        if let Some(app) = &self.app_name {
            client_options.app_name = Some(app.clone());
        }
        if let Some(wtimeout) = self.write_timeout {
            let mut write_concern = WriteConcern::majority();
            write_concern.w_timeout = Some(wtimeout);
            client_options.write_concern = Some(write_concern);
        }

        Ok(client_options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::options::Acknowledgment;

    #[test]
    fn test_default_config() {
        let config = ConnectionConfig::default();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 27017);
        assert_eq!(config.connect_timeout, Some(Duration::from_secs(10)));
        assert!(config.write_timeout.is_none());
        assert_eq!(config.app_name, Some("docbridge".to_string()));
    }

    #[test]
    fn test_builder_setters() {
        let config = ConnectionConfig::new("db.internal", 27018)
            .with_server_selection_timeout(Duration::from_millis(500))
            .with_write_timeout(Duration::from_secs(2))
            .with_app_name("movies");
        assert_eq!(config.address(), "db.internal:27018");
        assert_eq!(
            config.server_selection_timeout,
            Some(Duration::from_millis(500))
        );
        assert_eq!(config.write_timeout, Some(Duration::from_secs(2)));
        assert_eq!(config.app_name.as_deref(), Some("movies"));
    }

    #[test]
    fn test_ipv6_address_is_bracketed() {
        let config = ConnectionConfig::new("::1", 27017);
        assert_eq!(config.address(), "[::1]:27017");
    }

    #[test]
    fn test_empty_host_is_connection_error() {
        let config = ConnectionConfig::new("", 27017);
        assert!(matches!(
            config.server_address(),
            Err(DocBridgeError::Connection(_))
        ));
    }

    #[test]
    fn test_client_options_carry_config() {
        let config = ConnectionConfig::new("127.0.0.1", 27019)
            .with_write_timeout(Duration::from_secs(1));
        let options = config.to_client_options().unwrap();

        assert_eq!(options.hosts.len(), 1);
        assert_eq!(options.hosts[0].to_string(), "127.0.0.1:27019");
        assert_eq!(options.app_name.as_deref(), Some("docbridge"));

        let write_concern = options.write_concern.unwrap();
        assert_eq!(write_concern.w_timeout, Some(Duration::from_secs(1)));
        assert_eq!(write_concern.w, Some(Acknowledgment::Majority));
    }

    #[test]
    fn test_no_write_concern_without_timeout() {
        let options = ConnectionConfig::default().to_client_options().unwrap();
        assert!(options.write_concern.is_none());
    }
}
