use std::net::IpAddr;

use reqwest::Url;

use super::{JsonFetcher, JsonObject};
use crate::SolrError;

/// [`JsonFetcher`] that queries Solr over plain HTTP
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    /// HTTP client shared by all the requests
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a new [`HttpFetcher`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the URL of `path` on `host:port`
    ///
    /// `host` may be a domain name, an IPv4 address, or an IPv6 address with
    /// or without brackets.
    fn url(host: &str, port: u16, path: &str) -> crate::Result<Url> {
        let invalid = |reason: String| SolrError::InvalidUrl {
            url: format!("{host}:{port}{path}"),
            reason,
        };

        let mut url = Url::parse("http://localhost/").map_err(|err| invalid(err.to_string()))?;
        match host.parse::<IpAddr>() {
            Ok(ip) => url
                .set_ip_host(ip)
                .map_err(|()| invalid("cannot set an IP host".to_owned()))?,
            Err(_) => url
                .set_host(Some(host))
                .map_err(|err| invalid(err.to_string()))?,
        }
        url.set_port(Some(port))
            .map_err(|()| invalid("cannot set the port".to_owned()))?;

        url.join(path).map_err(|err| invalid(err.to_string()))
    }

    async fn fetch(&self, url: Url) -> Result<String, reqwest::Error> {
        self.client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }
}

#[async_trait::async_trait]
impl JsonFetcher for HttpFetcher {
    async fn get_url(&self, host: &str, ports: &[u16], path: &str) -> crate::Result<JsonObject> {
        for &port in ports {
            let url = Self::url(host, port, path)?;
            log::debug!("Fetch Solr endpoint: {url}");

            // Unreachable ports and error statuses move on to the next port
            let body = match self.fetch(url.clone()).await {
                Ok(body) => body,
                Err(err) => {
                    log::debug!("Could not fetch {url}: {err}");
                    continue;
                }
            };
            if body.trim().is_empty() {
                log::debug!("Ignore empty response from {url}");
                continue;
            }

            // A port that answered with broken json aborts the fetch
            let value = serde_json::from_str::<serde_json::Value>(&body).map_err(|source| {
                SolrError::Response {
                    endpoint: url.to_string(),
                    source,
                }
            })?;

            match value {
                serde_json::Value::Object(object) if !object.is_empty() => {
                    log::trace!("Fetched {url}: {object:?}");
                    return Ok(object);
                }
                _ => log::debug!("Ignore empty or non-object response from {url}"),
            }
        }

        Ok(JsonObject::new())
    }
}
