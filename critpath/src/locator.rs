use adblock::Engine;
use adblock::lists::ParseOptions;
use adblock::request::Request;

use crate::records::{NetworkRecord, RecordId};

/// Decides whether a request URL is the ad request a critical path should be built for.
pub trait AdRequestMatcher {
    fn is_ad_request(&self, url: &str) -> bool;
}

impl<F: Fn(&str) -> bool> AdRequestMatcher for F {
    fn is_ad_request(&self, url: &str) -> bool {
        self(url)
    }
}

/// Matches Google Publisher Tag ad requests: `/gampad/ads` on `doubleclick.net` or any of its
/// subdomains.
#[derive(Debug, Clone, Copy, Default)]
pub struct GptAdRequestMatcher;

impl AdRequestMatcher for GptAdRequestMatcher {
    fn is_ad_request(&self, url: &str) -> bool {
        let url = match url::Url::parse(url) {
            Ok(url) => url,
            Err(_) => return false,
        };
        let host = match url.host_str() {
            Some(host) => host,
            None => return false,
        };
        (host == "doubleclick.net" || host.ends_with(".doubleclick.net")) && url.path() == "/gampad/ads"
    }
}

/// Matches requests against a list of adblock network filters, in ABP syntax.
pub struct FilterListMatcher {
    engine: Engine,
    source_url: Option<String>,
}

impl FilterListMatcher {
    pub fn new(rules: &[String]) -> Self {
        Self {
            engine: Engine::from_rules(rules, ParseOptions::default()),
            source_url: None,
        }
    }

    /// Sets the URL of the page the requests were made from, so that party-sensitive filters
    /// (`$third-party`, `$domain=...`) can apply. Without it, each request is treated as coming
    /// from its own origin.
    pub fn with_source_url(mut self, source_url: impl Into<String>) -> Self {
        self.source_url = Some(source_url.into());
        self
    }
}

impl AdRequestMatcher for FilterListMatcher {
    fn is_ad_request(&self, url: &str) -> bool {
        let source_url = self.source_url.as_deref().unwrap_or(url);
        match Request::new(url, source_url, "xmlhttprequest") {
            Ok(request) => self.engine.check_network_request(&request).matched,
            Err(_) => false,
        }
    }
}

/// Why no critical path can be built for a set of records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum NotApplicableReason {
    /// None of the records is an ad request.
    NoAdRequest,
    /// No record was loaded as a script, so nothing could form a dependency chain.
    NoScripts,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Location<'a> {
    Found(RecordId, &'a NetworkRecord),
    NotApplicable(NotApplicableReason),
}

/// Finds the first record, in input order, that the matcher accepts as an ad request.
pub fn locate<'a, M: AdRequestMatcher + ?Sized>(records: &'a [NetworkRecord], matcher: &M) -> Location<'a> {
    let found = records
        .iter()
        .enumerate()
        .find(|(_, record)| matcher.is_ad_request(&record.url));

    let (i, record) = match found {
        Some(found) => found,
        None => {
            tracing::debug!(records = records.len(), "no ad request found");
            return Location::NotApplicable(NotApplicableReason::NoAdRequest);
        }
    };

    if !records.iter().any(NetworkRecord::is_script) {
        tracing::debug!(records = records.len(), "no script records found");
        return Location::NotApplicable(NotApplicableReason::NoScripts);
    }

    let id = RecordId::from(i);
    tracing::debug!(url = %record.url, record = %id, "located ad request");
    Location::Found(id, record)
}
