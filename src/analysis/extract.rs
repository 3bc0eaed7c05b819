//! Heuristics that turn free-text model answers into a category and search keywords.

/// Category returned when no trigger substring matches.
pub const DEFAULT_CATEGORY: &str = "general";

/// Maximum number of keywords kept from a model answer.
pub const MAX_KEYWORDS: usize = 5;

/// Ordered (category, trigger substrings) table.
///
/// Evaluated top to bottom; the first category with any trigger present wins,
/// so the order decides ties (e.g. "engine warning light" is `warning_light`).
pub const CATEGORY_TRIGGERS: &[(&str, &[&str])] = &[
    (
        "dashboard",
        &["dashboard", "instrument cluster", "speedometer", "odometer"],
    ),
    (
        "warning_light",
        &["warning light", "indicator light", "check engine", "warning lamp"],
    ),
    ("button", &["button", "switch", "control"]),
    ("engine", &["engine", "motor", "cylinder"]),
    ("brake", &["brake", "braking system"]),
    ("electrical", &["electrical", "wiring", "fuse", "battery"]),
    ("ac", &["air conditioning", "a/c", "ac", "cooling"]),
    ("tire", &["tire", "tyre", "wheel"]),
];

/// Classify text into a coarse category by case-insensitive substring match.
pub fn extract_category(text: &str) -> &'static str {
    let lower = text.to_lowercase();

    CATEGORY_TRIGGERS
        .iter()
        .find(|(_, triggers)| triggers.iter().any(|t| lower.contains(t)))
        .map(|(category, _)| *category)
        .unwrap_or(DEFAULT_CATEGORY)
}

/// Scrape search keywords from lines mentioning "keyword" or "search".
///
/// Each matching line is split on `:`; the segment after the first colon is
/// split on `,`. At most [`MAX_KEYWORDS`] trimmed, non-empty fragments are taken
/// per line and in total. Empty fragments are dropped before counting, so a bare
/// `Search Keywords:` line yields nothing and never produces an empty query.
pub fn scrape_keywords(text: &str) -> Vec<String> {
    let mut keywords = Vec::new();

    for line in text.lines() {
        let lower = line.to_lowercase();
        if !lower.contains("keyword") && !lower.contains("search") {
            continue;
        }

        let Some(segment) = line.split(':').nth(1) else {
            continue;
        };

        keywords.extend(
            segment
                .split(',')
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .take(MAX_KEYWORDS)
                .map(str::to_string),
        );
    }

    keywords.truncate(MAX_KEYWORDS);
    keywords
}

/// Like [`scrape_keywords`], falling back to `fallback` when nothing is found.
pub fn extract_keywords(text: &str, fallback: &[String]) -> Vec<String> {
    let keywords = scrape_keywords(text);
    if keywords.is_empty() {
        fallback.to_vec()
    } else {
        keywords
    }
}
