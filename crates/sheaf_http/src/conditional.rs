//! Conditional request validators (`ETag`, `Last-Modified`).

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use hyper::header::{HeaderMap, IF_MODIFIED_SINCE, IF_NONE_MATCH};
use sheaf_common::ContentHash;

/// The validators describing one artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validators {
    /// Strong entity tag: the quoted content hash of the artifact.
    pub etag: String,
    /// Artifact modification time, truncated to whole seconds.
    pub last_modified: SystemTime,
}

impl Validators {
    /// Derives validators from artifact bytes and modification time.
    pub fn for_artifact(bytes: &[u8], modified: SystemTime) -> Self {
        Self {
            etag: format!("\"{}\"", ContentHash::from_bytes(bytes)),
            last_modified: truncate_to_secs(modified),
        }
    }

    /// Formats `last_modified` as an HTTP date.
    pub fn last_modified_header(&self) -> String {
        httpdate::fmt_http_date(self.last_modified)
    }
}

/// The conditional headers of an inbound request.
#[derive(Debug, Clone, Default)]
pub struct ValidationContext {
    /// Parsed `If-Modified-Since`. An unparseable date counts as absent.
    pub if_modified_since: Option<SystemTime>,
    /// Entity tags listed in `If-None-Match`, as sent.
    pub if_none_match: Vec<String>,
}

impl ValidationContext {
    /// Reads `If-Modified-Since` and `If-None-Match` from request headers.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let if_modified_since = headers
            .get(IF_MODIFIED_SINCE)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| httpdate::parse_http_date(s.trim()).ok());

        let if_none_match = headers
            .get_all(IF_NONE_MATCH)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|s| s.split(','))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Self {
            if_modified_since,
            if_none_match,
        }
    }

    /// Returns `true` if the client's copy is still current.
    ///
    /// Either validator is enough: a matching entity tag, or an
    /// `If-Modified-Since` at or after the artifact's `Last-Modified`.
    pub fn matches(&self, validators: &Validators) -> bool {
        let etag = opaque_tag(&validators.etag);
        let tag_hit = self
            .if_none_match
            .iter()
            .any(|candidate| candidate == "*" || opaque_tag(candidate) == etag);
        let date_hit = self
            .if_modified_since
            .is_some_and(|since| validators.last_modified <= since);
        tag_hit || date_hit
    }
}

/// Strips the weak prefix and quotes from an entity tag.
fn opaque_tag(tag: &str) -> &str {
    tag.trim_start_matches("W/").trim_matches('"')
}

/// HTTP dates carry whole seconds only.
fn truncate_to_secs(time: SystemTime) -> SystemTime {
    match time.duration_since(UNIX_EPOCH) {
        Ok(d) => UNIX_EPOCH + Duration::from_secs(d.as_secs()),
        Err(_) => time,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::header::HeaderValue;

    fn validators() -> Validators {
        let modified = UNIX_EPOCH + Duration::new(1_700_000_000, 750_000_000);
        Validators::for_artifact(b"a{color:red}", modified)
    }

    #[test]
    fn etag_is_quoted_content_hash() {
        let v = validators();
        let hash = ContentHash::from_bytes(b"a{color:red}").to_string();
        assert_eq!(v.etag, format!("\"{hash}\""));
    }

    #[test]
    fn last_modified_drops_subsecond_part() {
        let v = validators();
        assert_eq!(v.last_modified, UNIX_EPOCH + Duration::from_secs(1_700_000_000));
        assert_eq!(v.last_modified_header(), "Tue, 14 Nov 2023 22:13:20 GMT");
    }

    #[test]
    fn empty_context_never_matches() {
        assert!(!ValidationContext::default().matches(&validators()));
    }

    #[test]
    fn matching_etag() {
        let v = validators();
        let ctx = ValidationContext {
            if_none_match: vec![v.etag.clone()],
            ..Default::default()
        };
        assert!(ctx.matches(&v));
    }

    #[test]
    fn unquoted_and_weak_etags_match() {
        let v = validators();
        let bare = opaque_tag(&v.etag).to_string();
        for candidate in [bare.clone(), format!("W/\"{bare}\"")] {
            let ctx = ValidationContext {
                if_none_match: vec![candidate],
                ..Default::default()
            };
            assert!(ctx.matches(&v));
        }
    }

    #[test]
    fn wildcard_matches() {
        let ctx = ValidationContext {
            if_none_match: vec!["*".to_string()],
            ..Default::default()
        };
        assert!(ctx.matches(&validators()));
    }

    #[test]
    fn different_etag_does_not_match() {
        let ctx = ValidationContext {
            if_none_match: vec!["\"deadbeef\"".to_string()],
            ..Default::default()
        };
        assert!(!ctx.matches(&validators()));
    }

    #[test]
    fn modified_since_same_second_matches() {
        let v = validators();
        let ctx = ValidationContext {
            if_modified_since: Some(v.last_modified),
            ..Default::default()
        };
        assert!(ctx.matches(&v));
    }

    #[test]
    fn modified_since_earlier_does_not_match() {
        let v = validators();
        let ctx = ValidationContext {
            if_modified_since: Some(v.last_modified - Duration::from_secs(1)),
            ..Default::default()
        };
        assert!(!ctx.matches(&v));
    }

    #[test]
    fn from_headers_parses_both() {
        let mut headers = HeaderMap::new();
        headers.insert(
            IF_MODIFIED_SINCE,
            HeaderValue::from_static("Tue, 14 Nov 2023 22:13:20 GMT"),
        );
        headers.insert(IF_NONE_MATCH, HeaderValue::from_static("\"a\", \"b\""));

        let ctx = ValidationContext::from_headers(&headers);
        assert_eq!(
            ctx.if_modified_since,
            Some(UNIX_EPOCH + Duration::from_secs(1_700_000_000))
        );
        assert_eq!(ctx.if_none_match, vec!["\"a\"", "\"b\""]);
    }

    #[test]
    fn from_headers_ignores_bad_date() {
        let mut headers = HeaderMap::new();
        headers.insert(IF_MODIFIED_SINCE, HeaderValue::from_static("yesterday"));
        let ctx = ValidationContext::from_headers(&headers);
        assert!(ctx.if_modified_since.is_none());
        assert!(ctx.if_none_match.is_empty());
    }
}
