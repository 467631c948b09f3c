//! Discovery of seller candidates not yet in the directory.
//!
//! One discovery run resolves a localized search query for a (region,
//! seller type, language) triple, spends a single bounded text-search call,
//! and hands the raw snippets to the extractor's suggestion mode. The
//! known-domain set is recomputed from a fresh directory snapshot on every
//! call, so re-running with identical inputs cannot manufacture duplicates.

use crate::extractor::MarketExtractor;
use crate::matching::DirectoryIndex;
use crate::providers::google::MAX_RESULTS_PER_CALL;
use crate::traits::{ChatModel, SearchOptions, SellerDirectory, TextSearch};
use crate::types::{DiscoveryRequest, DiscoveryResponse};

/// Finds candidate sellers for a region and seller type.
pub struct DealerScout<T, M, D> {
    search: T,
    extractor: MarketExtractor<M>,
    directory: D,
}

impl<T, M, D> DealerScout<T, M, D>
where
    T: TextSearch,
    M: ChatModel,
    D: SellerDirectory,
{
    pub fn new(search: T, model: M, directory: D) -> Self {
        Self {
            search,
            extractor: MarketExtractor::new(model),
            directory,
        }
    }

    /// Run one discovery pass. Failures are folded into the response's
    /// `error` field; whatever partial work succeeded is still returned.
    pub async fn discover(&self, request: &DiscoveryRequest) -> DiscoveryResponse {
        let query = resolve_query(&request.seller_type, &request.region, &request.language);
        tracing::debug!(
            region = %request.region,
            seller_type = %request.seller_type,
            language = %request.language,
            query = %query,
            "Dealer discovery"
        );

        let mut errors: Vec<String> = Vec::new();

        // Fresh snapshot every call; stale known-domain sets would let the
        // extractor re-suggest sellers added since the last run.
        let known_domains = match self.directory.active_sellers().await {
            Ok(sellers) => DirectoryIndex::from_sellers(sellers).domains(),
            Err(e) => {
                return DiscoveryResponse {
                    query,
                    suggestions: Vec::new(),
                    total_search_results: 0,
                    credits_used: 0,
                    error: Some(format!("directory snapshot failed: {}", e)),
                };
            }
        };

        let options = SearchOptions::new()
            .with_max_results(request.max_results.clamp(1, MAX_RESULTS_PER_CALL));
        let search = self.search.search(&query, &options).await;
        if let Some(e) = &search.error {
            errors.push(e.clone());
        }

        let mut suggestions = Vec::new();
        if !search.results.is_empty() {
            match self
                .extractor
                .suggest_sellers(
                    &request.region,
                    &request.seller_type,
                    &known_domains,
                    &search.results,
                )
                .await
            {
                Ok(found) => suggestions = found,
                Err(e) => errors.push(format!("suggestion extraction failed: {}", e)),
            }
        }
        suggestions.truncate(request.max_results);

        DiscoveryResponse {
            query,
            suggestions,
            total_search_results: search.total_results,
            credits_used: search.credits_used,
            error: (!errors.is_empty()).then(|| errors.join("; ")),
        }
    }
}

/// Resolve the localized query for a seller type, falling back to the
/// English template for unknown languages and to a generic template for
/// unknown seller types.
fn resolve_query(seller_type: &str, region: &str, language: &str) -> String {
    let place = region_display_name(region, language);
    let template = match (seller_type, language) {
        ("auction_house", "fr") => "maisons de ventes aux enchères affiches anciennes {region}",
        ("auction_house", "de") => "Auktionshäuser alte Plakate {region}",
        ("auction_house", "it") => "case d'asta manifesti d'epoca {region}",
        ("auction_house", _) => "auction houses selling vintage posters {region}",
        ("gallery", "fr") => "galeries affiches originales anciennes {region}",
        ("gallery", "de") => "Galerien Originalplakate {region}",
        ("gallery", "it") => "gallerie manifesti originali d'epoca {region}",
        ("gallery", _) => "galleries selling original vintage posters {region}",
        ("dealer", "fr") => "marchands spécialisés affiches anciennes {region}",
        ("dealer", "de") => "Händler alte Originalplakate {region}",
        ("dealer", "it") => "commercianti manifesti d'epoca {region}",
        ("dealer", _) => "specialist vintage poster dealers {region}",
        ("bookshop", "fr") => "librairies anciennes affiches {region}",
        ("bookshop", "de") => "Antiquariate Plakate {region}",
        ("bookshop", _) => "antiquarian bookshops selling posters {region}",
        (other, _) => {
            return format!("{} selling vintage posters {}", other.replace('_', " "), place);
        }
    };
    template.replace("{region}", &place)
}

/// Display name for a region key in the requested language, falling back
/// to the English name, then to the raw key.
fn region_display_name(region: &str, language: &str) -> String {
    let name = match (region, language) {
        ("ch", "fr") => "Suisse",
        ("ch", "de") => "Schweiz",
        ("ch", "it") => "Svizzera",
        ("ch", _) => "Switzerland",
        ("fr", _) => "France",
        ("de", "de") => "Deutschland",
        ("de", "fr") => "Allemagne",
        ("de", _) => "Germany",
        ("it", "it") => "Italia",
        ("it", "fr") => "Italie",
        ("it", _) => "Italy",
        ("at", "de") => "Österreich",
        ("at", _) => "Austria",
        ("be", "fr") => "Belgique",
        ("be", _) => "Belgium",
        ("nl", _) => "Netherlands",
        ("uk", "fr") => "Royaume-Uni",
        ("uk", _) => "United Kingdom",
        ("us", "fr") => "États-Unis",
        ("us", _) => "United States",
        (other, _) => other,
    };
    name.to_string()
}
