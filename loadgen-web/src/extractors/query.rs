use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use std::collections::HashMap;

/// Raw query parameters of a workload request.
///
/// Never rejects: a malformed query string yields an empty parameter set,
/// and typed accessors return `None` for values they cannot interpret so
/// callers fall back to their defaults. A repeated key keeps its first value.
#[derive(Debug, Clone, Default)]
pub struct WorkloadParams(HashMap<String, String>);

impl WorkloadParams {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut params = HashMap::new();
        for (key, value) in pairs {
            params.entry(key.into()).or_insert_with(|| value.into());
        }
        Self(params)
    }

    /// Raw value of a parameter
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// A strictly positive integer parameter; anything else is `None`
    pub fn positive_int(&self, name: &str) -> Option<u64> {
        self.get(name)
            .and_then(|raw| raw.parse::<i64>().ok())
            .filter(|value| *value > 0)
            .map(|value| value as u64)
    }

    /// A boolean flag, enabled only by the literal value `true`
    pub fn flag(&self, name: &str) -> bool {
        self.get(name) == Some("true")
    }
}

impl<S> FromRequestParts<S> for WorkloadParams
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let pairs = match Query::<Vec<(String, String)>>::try_from_uri(&parts.uri) {
            Ok(Query(pairs)) => pairs,
            Err(err) => {
                tracing::debug!("Ignoring malformed query string: {}", err);
                Vec::new()
            }
        };

        Ok(WorkloadParams::from_pairs(pairs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(uri: &str) -> WorkloadParams {
        let (mut parts, _) = Request::builder().uri(uri).body(()).unwrap().into_parts();
        WorkloadParams::from_request_parts(&mut parts, &()).await.unwrap()
    }

    #[tokio::test]
    async fn test_positive_int_parsing() {
        let params = extract("/cpu?iterations=250").await;
        assert_eq!(params.positive_int("iterations"), Some(250));

        for bad in ["0", "-5", "abc", "", "1.5", "%202", "2%20"] {
            let params = extract(&format!("/cpu?iterations={}", bad)).await;
            assert_eq!(params.positive_int("iterations"), None, "value {:?}", bad);
        }

        assert_eq!(extract("/cpu").await.positive_int("iterations"), None);
    }

    #[tokio::test]
    async fn test_flag_requires_literal_true() {
        assert!(extract("/memory?heavy_agg=true").await.flag("heavy_agg"));
        assert!(!extract("/memory?heavy_agg=TRUE").await.flag("heavy_agg"));
        assert!(!extract("/memory?heavy_agg=1").await.flag("heavy_agg"));
        assert!(!extract("/memory").await.flag("heavy_agg"));
    }

    #[tokio::test]
    async fn test_repeated_key_keeps_first_value() {
        let params = extract("/cpu?iterations=2&iterations=3").await;
        assert_eq!(params.positive_int("iterations"), Some(2));

        let params = extract("/memory?heavy_agg=true&heavy_agg=false").await;
        assert!(params.flag("heavy_agg"));
    }

    #[test]
    fn test_from_pairs() {
        let params = WorkloadParams::from_pairs([("size", "42")]);
        assert_eq!(params.positive_int("size"), Some(42));
        assert_eq!(params.get("missing"), None);
    }
}
