//! URL normalisation for cross-query deduplication.
//!
//! The pipeline's aggregator treats the URL as the dedup key for a whole
//! run. Canonicalising first means two providers (or two queries) that
//! surface the same page with cosmetic differences — parameter order,
//! tracking parameters, fragments, capitalisation — compare as equal.

use url::Url;

/// Tracking query parameters stripped during normalisation.
const TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "fbclid",
    "gclid",
    "ref",
    "si",
    "feature",
];

/// Normalise a URL into its deduplication key.
///
/// Transformations applied:
///
/// 1. Lowercase scheme and host (path is preserved as-is).
/// 2. Remove default ports (`:80` for HTTP, `:443` for HTTPS).
/// 3. Remove trailing slash from the path (unless path is exactly `"/"`).
/// 4. Strip known tracking parameters, then sort the remainder by key.
/// 5. Remove the fragment.
///
/// If the input cannot be parsed as a URL, it is returned unchanged — an
/// unparsable URL still deduplicates against an identical unparsable URL.
pub fn normalize_url(raw: &str) -> String {
    let Ok(mut parsed) = Url::parse(raw) else {
        return raw.to_string();
    };

    parsed.set_fragment(None);

    if is_default_port(&parsed) {
        let _ = parsed.set_port(None);
    }

    let filtered_params: Vec<(String, String)> = {
        let mut params: Vec<(String, String)> = parsed
            .query_pairs()
            .filter(|(key, _)| {
                let k = key.to_lowercase();
                !TRACKING_PARAMS.contains(&k.as_str())
            })
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        params.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
        params
    };

    if filtered_params.is_empty() {
        parsed.set_query(None);
    } else {
        let qs: String = filtered_params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        parsed.set_query(Some(&qs));
    }

    let path = parsed.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        parsed.set_path(&path[..path.len() - 1]);
    }

    // Url::parse lowercases scheme and host, so the serialised form is canonical.
    parsed.to_string()
}

/// Returns `true` if the URL uses the default port for its scheme.
fn is_default_port(url: &Url) -> bool {
    matches!(
        (url.scheme(), url.port()),
        ("http", Some(80)) | ("https", Some(443))
    )
}
