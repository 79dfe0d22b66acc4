//! Base URL normalisation and full-URL resolution.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::Url;

use crate::error::RequestError;
use crate::params::{render, render_all, ParamView};

/// Path values keep only the unreserved characters literal.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// Parse a base URL, assuming `http://` when no scheme is given.
pub fn normalize_base_url(base_url: &str) -> Result<Url, RequestError> {
    let trimmed = base_url.trim();
    let candidate = if has_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed.trim_start_matches(':').trim_start_matches('/'))
    };
    Url::parse(&candidate).map_err(|e| RequestError::InvalidBaseUrl {
        url: base_url.to_string(),
        reason: e.to_string(),
    })
}

fn has_scheme(text: &str) -> bool {
    match text.find("://") {
        Some(idx) if idx > 0 => text[..idx]
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')),
        _ => false,
    }
}

/// Join `path` onto `base`, fill `{name}` placeholders and append the query.
pub(crate) fn resolve_url(
    base: Option<&Url>,
    path: Option<&str>,
    path_params: ParamView<'_>,
    query: ParamView<'_>,
) -> Result<Url, RequestError> {
    let path = path
        .filter(|p| !p.is_empty())
        .map(|p| expand_path(p, path_params));

    let mut url = match (base, path) {
        (Some(base), None) => base.clone(),
        (Some(base), Some(path)) => base.join(&path).map_err(|e| RequestError::InvalidPath {
            path: path.clone(),
            reason: e.to_string(),
        })?,
        (None, Some(path)) => Url::parse(&path).map_err(|_| RequestError::MissingBaseUrl)?,
        (None, None) => return Err(RequestError::MissingBaseUrl),
    };

    if !query.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (name, value) in query.iter() {
            for rendered in render_all(value) {
                pairs.append_pair(name, &rendered);
            }
        }
    }
    Ok(url)
}

fn expand_path(path: &str, params: ParamView<'_>) -> String {
    let mut expanded = path.to_string();
    for (name, value) in params.iter() {
        let placeholder = format!("{{{name}}}");
        if expanded.contains(&placeholder) {
            let segment = utf8_percent_encode(&render(value), SEGMENT).to_string();
            expanded = expanded.replace(&placeholder, &segment);
        }
    }
    expanded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{ParamLocation, ParamStore};

    #[test]
    fn scheme_is_added_when_missing() {
        assert_eq!(normalize_base_url("example.com").unwrap().as_str(), "http://example.com/");
        assert_eq!(
            normalize_base_url("https://example.com/api").unwrap().as_str(),
            "https://example.com/api"
        );
        assert_eq!(
            normalize_base_url("localhost:8080").unwrap().as_str(),
            "http://localhost:8080/"
        );
    }

    #[test]
    fn garbage_base_is_rejected() {
        let err = normalize_base_url("http://exa mple.com").unwrap_err();
        assert!(matches!(err, RequestError::InvalidBaseUrl { .. }));
    }

    #[test]
    fn path_params_and_query_are_applied() {
        let mut store = ParamStore::new();
        store.set(ParamLocation::Path, "id", "a b/c");
        store.set(ParamLocation::Query, "page", 2);
        store.set(ParamLocation::Query, "tag", serde_json::json!(["x", "y"]));

        let base = Url::parse("http://example.com/api/").unwrap();
        let url = resolve_url(
            Some(&base),
            Some("items/{id}"),
            ParamView::new(&store, ParamLocation::Path),
            ParamView::new(&store, ParamLocation::Query),
        )
        .unwrap();
        assert_eq!(
            url.as_str(),
            "http://example.com/api/items/a%20b%2Fc?page=2&tag=x&tag=y"
        );
    }

    #[test]
    fn path_values_encode_as_utf8_segments() {
        let mut store = ParamStore::new();
        store.set(ParamLocation::Path, "name", "café?x=1~ok");

        let base = Url::parse("http://example.com/").unwrap();
        let url = resolve_url(
            Some(&base),
            Some("users/{name}"),
            ParamView::new(&store, ParamLocation::Path),
            ParamView::new(&store, ParamLocation::Query),
        )
        .unwrap();
        assert_eq!(url.path(), "/users/caf%C3%A9%3Fx%3D1~ok");
        assert!(url.query().is_none());
    }

    #[test]
    fn absolute_path_without_base() {
        let store = ParamStore::new();
        let url = resolve_url(
            None,
            Some("http://other.test/x"),
            ParamView::new(&store, ParamLocation::Path),
            ParamView::new(&store, ParamLocation::Query),
        )
        .unwrap();
        assert_eq!(url.as_str(), "http://other.test/x");
    }

    #[test]
    fn nothing_to_resolve() {
        let store = ParamStore::new();
        let err = resolve_url(
            None,
            Some("/relative"),
            ParamView::new(&store, ParamLocation::Path),
            ParamView::new(&store, ParamLocation::Query),
        )
        .unwrap_err();
        assert_eq!(err, RequestError::MissingBaseUrl);
    }
}
