use std::time::Duration;

#[derive(Debug, Clone)]
pub struct DgraphConfig {
    /// Alpha endpoints as `host:port` (a scheme is optional).
    pub hosts: Vec<String>,
    pub connect_timeout: Duration,
}

impl Default for DgraphConfig {
    fn default() -> Self {
        Self {
            hosts: vec!["localhost:9080".to_string()],
            connect_timeout: Duration::from_secs(5),
        }
    }
}

impl DgraphConfig {
    /// Parse a comma-separated host list, ignoring blanks.
    pub fn from_hosts(list: &str) -> Self {
        let hosts = list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        Self {
            hosts,
            ..Default::default()
        }
    }
}

/// Endpoint URI for a configured host.
pub(crate) fn endpoint_uri(host: &str) -> String {
    if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("http://{host}")
    }
}
