use once_cell::sync::Lazy;
use strsim::normalized_levenshtein;

/// Fixed corpus offered for completion. Free text outside the corpus is
/// still accepted on submit.
pub static RESTAURANTS: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "The French Laundry",
        "Eleven Madison Park",
        "Osteria Francescana",
        "Per Se",
        "Narisawa",
        "Mirazur",
        "Alinea",
        "Le Bernardin",
        "Noma",
        "The Ledbury",
    ]
});

/// Rank corpus entries against free-text input.
///
/// Scoring is edit-distance based (normalized Levenshtein, with substring
/// hits counting as exact); `looseness` is the maximum accepted distance in
/// [0, 1], where 0 keeps only exact/substring matches. Results are ordered
/// best-first.
pub fn suggest(corpus: &[&str], input: &str, looseness: f64) -> Vec<String> {
    let query = input.trim().to_lowercase();
    if query.is_empty() {
        return Vec::new();
    }
    let mut scored: Vec<(f64, &str)> = corpus
        .iter()
        .filter_map(|name| {
            let candidate = name.to_lowercase();
            let distance = if candidate.contains(&query) {
                0.0
            } else {
                1.0 - normalized_levenshtein(&query, &candidate)
            };
            (distance <= looseness).then_some((distance, *name))
        })
        .collect();
    scored.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal).then_with(|| a.1.cmp(b.1)));
    scored.into_iter().map(|(_, name)| name.to_string()).collect()
}
