//! Query variation generation from item metadata.
//!
//! Pure text munging: strip listing boilerplate from the title, pull a year
//! or decade out of free-text dates, clean up the creator name, and emit
//! ranked search queries in ascending specificity. No I/O, fully
//! deterministic.

use std::sync::OnceLock;

use regex::Regex;

use crate::types::QueryVariation;

/// Boilerplate suffixes commonly appended to listing titles, longest first.
const BOILERPLATE_SUFFIXES: &[&str] = &[
    "original vintage poster",
    "vintage movie poster",
    "original poster",
    "vintage poster",
    "movie poster",
    "linen backed",
    "linen-backed",
    "on linen",
    "poster",
    "affiche",
    "lithograph",
];

/// Creator confidence (0-100) at or above which `pick_query` folds the
/// creator into the chosen query.
pub const CREATOR_CONFIDENCE_THRESHOLD: u8 = 70;

fn year_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(1[89][0-9]{2}|20[0-2][0-9])\b").unwrap())
}

fn decade_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(1[89][0-9]0|20[0-2]0)s\b").unwrap())
}

fn parenthetical_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\([^)]*\)").unwrap())
}

fn subtitle_sep_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+[–—-]\s+|\s*:\s+").unwrap())
}

/// Case-insensitive suffix strip for ASCII suffixes, safe on any input.
fn strip_suffix_ignore_ascii_case<'a>(s: &'a str, suffix: &str) -> Option<&'a str> {
    let n = suffix.chars().count();
    let mut start = None;
    let mut count = 0;
    for (i, _) in s.char_indices().rev() {
        count += 1;
        if count == n {
            start = Some(i);
            break;
        }
    }
    let start = start?;
    let tail_matches = s[start..]
        .chars()
        .map(|c| c.to_ascii_lowercase())
        .eq(suffix.chars());
    tail_matches.then(|| &s[..start])
}

/// Strip known boilerplate suffixes (and the separators left behind) from
/// the end of a title, repeatedly, case-insensitively.
pub fn strip_boilerplate(title: &str) -> String {
    let mut current = title.trim().to_string();
    loop {
        let trimmed = current
            .trim_end()
            .trim_end_matches(['–', '—', '-', ',', ':', '|'])
            .trim_end();

        let mut next = trimmed;
        for suffix in BOILERPLATE_SUFFIXES {
            if let Some(rest) = strip_suffix_ignore_ascii_case(trimmed, suffix) {
                // Word boundary: never bite into "Composter".
                if rest.chars().last().map_or(true, |c| !c.is_alphanumeric()) {
                    next = rest;
                    break;
                }
            }
        }
        let next = next.trim_end().to_string();

        if next == current {
            return current;
        }
        current = next;
    }
}

/// Extract the main title: boilerplate stripped, subtitle cut at the first
/// dash/colon separator, iterated to a fixpoint.
///
/// Idempotent: `extract_main_title(extract_main_title(t)) ==
/// extract_main_title(t)`.
pub fn extract_main_title(title: &str) -> String {
    let mut current = title.trim().to_string();
    loop {
        let stripped = strip_boilerplate(&current);
        let cut = match subtitle_sep_re().find(&stripped) {
            Some(m) if m.start() > 0 => stripped[..m.start()].trim().to_string(),
            _ => stripped,
        };
        if cut == current {
            return current;
        }
        current = cut;
    }
}

/// Extract a year token from free-text date metadata.
///
/// Prefers an explicit 4-digit year in 1800..=2029 ("printed in 1931" →
/// "1931"); falls back to a bare decade token ("early 1930s" → "1930s");
/// `None` otherwise.
pub fn extract_year(date: &str) -> Option<String> {
    if let Some(m) = year_re().find(date) {
        return Some(m.as_str().to_string());
    }
    decade_re().find(date).map(|m| m.as_str().to_string())
}

/// Clean a creator name: drop parenthetical qualifiers, collapse whitespace.
pub fn clean_creator(creator: &str) -> String {
    let without_parens = parenthetical_re().replace_all(creator, " ");
    without_parens.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Generates ranked search queries from item metadata.
#[derive(Debug, Clone)]
pub struct QueryGenerator {
    /// Domain keyword appended to every derived query (default "poster").
    domain_term: String,
}

impl Default for QueryGenerator {
    fn default() -> Self {
        Self {
            domain_term: "poster".to_string(),
        }
    }
}

impl QueryGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different domain keyword (e.g. "print", "lithograph").
    pub fn with_domain_term(mut self, term: impl Into<String>) -> Self {
        self.domain_term = term.into();
        self
    }

    /// Emit query variations in ascending specificity.
    ///
    /// No title yields no variations (never an error). A title whose main
    /// title resolves to nothing yields one fallback variation built from
    /// the raw title.
    pub fn generate(
        &self,
        title: Option<&str>,
        creator: Option<&str>,
        date: Option<&str>,
    ) -> Vec<QueryVariation> {
        let Some(raw_title) = title.map(str::trim).filter(|t| !t.is_empty()) else {
            return Vec::new();
        };

        let main = extract_main_title(raw_title);
        if main.is_empty() {
            return vec![QueryVariation::new(
                format!("\"{}\" {}", raw_title, self.domain_term),
                "fallback",
                1,
            )];
        }

        let creator = creator.map(clean_creator).filter(|c| !c.is_empty());
        let year = date.and_then(extract_year);

        let mut variations = vec![QueryVariation::new(
            format!("\"{}\" {}", main, self.domain_term),
            "title",
            1,
        )];

        if let Some(creator) = &creator {
            variations.push(QueryVariation::new(
                format!("\"{}\" {} {}", main, creator, self.domain_term),
                "title-creator",
                2,
            ));
        }
        if let Some(year) = &year {
            variations.push(QueryVariation::new(
                format!("\"{}\" {} {}", main, year, self.domain_term),
                "title-year",
                3,
            ));
        }
        if let (Some(creator), Some(year)) = (&creator, &year) {
            variations.push(QueryVariation::new(
                format!("\"{}\" {} {} {}", main, creator, year, self.domain_term),
                "title-creator-year",
                4,
            ));
        }

        // The exact title only earns its own query when main-title extraction
        // cut something beyond listing boilerplate (a subtitle, a qualifier).
        let cleaned_full = strip_boilerplate(raw_title);
        if !cleaned_full.is_empty() && cleaned_full != main {
            variations.push(QueryVariation::new(
                format!("\"{}\"", cleaned_full),
                "full-title",
                5,
            ));
        }

        dedup_variations(variations)
    }

    /// Pick a single query for callers that can afford only one search.
    ///
    /// Selects the broad title query unless the creator is known with
    /// confidence at or above [`CREATOR_CONFIDENCE_THRESHOLD`], in which
    /// case the creator is folded in.
    pub fn pick_query(
        &self,
        title: &str,
        creator: Option<&str>,
        creator_confidence: u8,
    ) -> Option<String> {
        let raw_title = title.trim();
        if raw_title.is_empty() {
            return None;
        }

        let main = extract_main_title(raw_title);
        let main = if main.is_empty() { raw_title } else { &main };

        let creator = creator.map(clean_creator).filter(|c| !c.is_empty());
        match creator {
            Some(creator) if creator_confidence >= CREATOR_CONFIDENCE_THRESHOLD => {
                Some(format!("\"{}\" {} {}", main, creator, self.domain_term))
            }
            _ => Some(format!("\"{}\" {}", main, self.domain_term)),
        }
    }
}

fn dedup_variations(variations: Vec<QueryVariation>) -> Vec<QueryVariation> {
    let mut seen = std::collections::HashSet::new();
    variations
        .into_iter()
        .filter(|v| seen.insert(v.query.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_strip_boilerplate_handles_separator_and_case() {
        assert_eq!(
            strip_boilerplate("Voyage en Suisse – Vintage Poster"),
            "Voyage en Suisse"
        );
        assert_eq!(strip_boilerplate("Nord Express ORIGINAL POSTER"), "Nord Express");
        assert_eq!(strip_boilerplate("Monaco, linen backed"), "Monaco");
    }

    #[test]
    fn test_strip_boilerplate_repeats() {
        assert_eq!(
            strip_boilerplate("Bally - Vintage Poster, linen backed"),
            "Bally"
        );
    }

    #[test]
    fn test_extract_main_title_cuts_subtitle() {
        assert_eq!(
            extract_main_title("Voyage en Suisse – Chemins de Fer Fédéraux"),
            "Voyage en Suisse"
        );
    }

    #[test]
    fn test_extract_year_prefers_explicit_year() {
        assert_eq!(extract_year("printed 1931, from the 1930s"), Some("1931".into()));
        assert_eq!(extract_year("circa 1930s"), Some("1930s".into()));
        assert_eq!(extract_year("ca. 2029"), Some("2029".into()));
        assert_eq!(extract_year("1799 reprint of unknown date"), None);
        assert_eq!(extract_year("no date"), None);
        assert_eq!(extract_year("2030"), None);
    }

    #[test]
    fn test_clean_creator_strips_parentheticals() {
        assert_eq!(
            clean_creator("Herbert  Matter (attributed)"),
            "Herbert Matter"
        );
        assert_eq!(clean_creator("(after) Cassandre"), "Cassandre");
    }

    #[test]
    fn test_scenario_voyage_en_suisse() {
        let gen = QueryGenerator::new();
        let variations = gen.generate(Some("Voyage en Suisse – Vintage Poster"), None, None);
        assert_eq!(variations.len(), 1);
        assert_eq!(variations[0].query, "\"Voyage en Suisse\" poster");
        assert_eq!(variations[0].priority, 1);
    }

    #[test]
    fn test_full_ladder_with_creator_and_year() {
        let gen = QueryGenerator::new();
        let variations = gen.generate(
            Some("Voyage en Suisse – Vintage Poster"),
            Some("Herbert Matter (attributed)"),
            Some("circa 1935"),
        );
        let queries: Vec<_> = variations.iter().map(|v| v.query.as_str()).collect();
        assert_eq!(
            queries,
            vec![
                "\"Voyage en Suisse\" poster",
                "\"Voyage en Suisse\" Herbert Matter poster",
                "\"Voyage en Suisse\" 1935 poster",
                "\"Voyage en Suisse\" Herbert Matter 1935 poster",
            ]
        );
        // Priorities ascend with specificity.
        let priorities: Vec<_> = variations.iter().map(|v| v.priority).collect();
        assert_eq!(priorities, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_subtitle_earns_full_title_variation() {
        let gen = QueryGenerator::new();
        let variations = gen.generate(
            Some("Voyage en Suisse – Chemins de Fer Fédéraux"),
            None,
            None,
        );
        assert!(variations
            .iter()
            .any(|v| v.query == "\"Voyage en Suisse – Chemins de Fer Fédéraux\""
                && v.priority == 5));
    }

    #[test]
    fn test_no_title_no_variations() {
        let gen = QueryGenerator::new();
        assert!(gen.generate(None, Some("Cassandre"), Some("1931")).is_empty());
        assert!(gen.generate(Some("   "), None, None).is_empty());
    }

    #[test]
    fn test_all_boilerplate_title_falls_back_to_raw() {
        let gen = QueryGenerator::new();
        let variations = gen.generate(Some("Vintage Poster"), None, None);
        assert_eq!(variations.len(), 1);
        assert_eq!(variations[0].label, "fallback");
        assert_eq!(variations[0].query, "\"Vintage Poster\" poster");
    }

    #[test]
    fn test_pick_query_confidence_threshold() {
        let gen = QueryGenerator::new();
        let low = gen.pick_query("Nord Express poster", Some("Cassandre"), 69);
        assert_eq!(low.as_deref(), Some("\"Nord Express\" poster"));

        let high = gen.pick_query("Nord Express poster", Some("Cassandre"), 70);
        assert_eq!(high.as_deref(), Some("\"Nord Express\" Cassandre poster"));

        assert!(gen.pick_query("", Some("Cassandre"), 90).is_none());
    }

    proptest! {
        #[test]
        fn prop_extract_main_title_is_idempotent(t in "\\PC{0,60}") {
            let once = extract_main_title(&t);
            prop_assert_eq!(extract_main_title(&once), once.clone());
        }

        #[test]
        fn prop_nonempty_title_yields_variations_without_duplicates(
            t in "[A-Za-z][A-Za-z ]{0,30}",
        ) {
            let gen = QueryGenerator::new();
            let variations = gen.generate(Some(&t), None, None);
            prop_assert!(!variations.is_empty());
            let queries: Vec<_> = variations.iter().map(|v| &v.query).collect();
            let unique: std::collections::HashSet<_> = queries.iter().collect();
            prop_assert_eq!(unique.len(), queries.len());
        }
    }
}
