use reqwest::Url;

use crate::SolrError;

pub mod http;

/// Generic JSON object returned by Solr admin endpoints
pub type JsonObject = serde_json::Map<String, serde_json::Value>;

/// Absolute path made of `segments`, each one percent-encoded
pub fn encode_path(segments: &[&str]) -> crate::Result<String> {
    let invalid = |reason: &str| SolrError::InvalidUrl {
        url: segments.join("/"),
        reason: reason.to_owned(),
    };

    let mut url = Url::parse("http://localhost/").map_err(|err| invalid(&err.to_string()))?;
    url.path_segments_mut()
        .map_err(|()| invalid("cannot hold a path"))?
        .clear()
        .extend(segments);

    Ok(url.path().to_owned())
}

/// Trait to fetch JSON documents from a Solr node
#[async_trait::async_trait]
pub trait JsonFetcher: Send + Sync {
    /// GET `path` on `host`, trying each port in order
    ///
    /// remarks: An unreachable node yields an empty object, not an error
    async fn get_url(&self, host: &str, ports: &[u16], path: &str) -> crate::Result<JsonObject>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoded_segments() {
        assert_eq!(
            encode_path(&["solr", "films", "admin", "mbeans"]).unwrap(),
            "/solr/films/admin/mbeans"
        );
        assert_eq!(
            encode_path(&["solr", "a#b?c/d", "admin"]).unwrap(),
            "/solr/a%23b%3Fc%2Fd/admin"
        );
    }
}
