//! Domain matching against the seller directory.
//!
//! A [`DirectoryIndex`] is built once per request from a fresh directory
//! read and thrown away afterwards. Results whose domain misses the index
//! feed the deduplicated unknown-domain list surfaced for discovery triage.

use std::collections::{HashMap, HashSet};

use crate::types::{MatchedResult, SearchResult, Seller};

/// Normalize a URL or bare hostname to a comparable domain.
///
/// Strips the scheme and a single leading "www.", lowercases. Idempotent:
/// `normalize_domain(normalize_domain(x)) == normalize_domain(x)`.
pub fn normalize_domain(input: &str) -> String {
    let host = if input.contains("://") {
        match url::Url::parse(input) {
            Ok(u) => u.host_str().unwrap_or_default().to_string(),
            // Unparseable URL: fall back to the raw text after the scheme.
            Err(_) => {
                let after = &input[input.find("://").map(|i| i + 3).unwrap_or(0)..];
                after.split(['/', '?', '#']).next().unwrap_or_default().to_string()
            }
        }
    } else {
        input
            .split(['/', '?', '#'])
            .next()
            .unwrap_or_default()
            .to_string()
    };

    let host = host.trim().to_lowercase();
    match host.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => host,
    }
}

/// Dedup key for a result URL within one run.
///
/// URLs differing only in casing (host or query string) collapse to one
/// result, first occurrence wins.
pub fn url_key(url: &str) -> String {
    url.trim().to_lowercase()
}

/// Annotated results plus the unknown domains they surfaced.
#[derive(Debug, Clone)]
pub struct AnnotatedResults {
    pub results: Vec<MatchedResult>,
    /// Deduplicated, in first-seen order.
    pub unknown_domains: Vec<String>,
}

/// Normalized-domain → seller map for one request.
///
/// Never cached across requests; "known" is always defined against the
/// directory snapshot taken at run start.
#[derive(Debug, Clone)]
pub struct DirectoryIndex {
    by_domain: HashMap<String, Seller>,
}

impl DirectoryIndex {
    /// Build the index from a directory snapshot. Inactive sellers are
    /// skipped even if the directory hands them over.
    pub fn from_sellers(sellers: impl IntoIterator<Item = Seller>) -> Self {
        let by_domain = sellers
            .into_iter()
            .filter(|s| s.is_active)
            .map(|s| (normalize_domain(&s.domain), s))
            .collect();
        Self { by_domain }
    }

    /// Look up a seller by result domain (already-normalized input is fine).
    pub fn seller_for(&self, domain: &str) -> Option<&Seller> {
        self.by_domain.get(&normalize_domain(domain))
    }

    /// All indexed domains (normalized).
    pub fn domains(&self) -> HashSet<String> {
        self.by_domain.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.by_domain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_domain.is_empty()
    }

    /// Annotate every result against the snapshot, collecting unknown
    /// domains in first-seen order.
    pub fn annotate(&self, results: Vec<SearchResult>) -> AnnotatedResults {
        let mut unknown_domains = Vec::new();
        let mut seen_unknown: HashSet<String> = HashSet::new();

        let results = results
            .into_iter()
            .map(|r| match self.seller_for(&r.domain) {
                Some(seller) => MatchedResult {
                    dealer_id: Some(seller.id),
                    dealer_name: Some(seller.name.clone()),
                    reliability_tier: Some(seller.reliability_tier),
                    is_known_dealer: true,
                    result: r,
                },
                None => {
                    if !r.domain.is_empty() && seen_unknown.insert(r.domain.clone()) {
                        unknown_domains.push(r.domain.clone());
                    }
                    MatchedResult::unknown(r)
                }
            })
            .collect();

        AnnotatedResults {
            results,
            unknown_domains,
        }
    }
}
