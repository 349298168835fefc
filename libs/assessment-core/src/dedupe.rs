//! Near-duplicate detection for question stems.

use crate::normalize::normalize;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeSet, HashSet};

/// Default minimum score (0-100) for a corpus entry to count as similar.
pub const DEFAULT_THRESHOLD: f64 = 90.0;

/// Default maximum number of matches returned.
pub const DEFAULT_LIMIT: usize = 5;

/// SHA-256 hex digest of the normalized text.
///
/// Texts that differ only by case, accents, punctuation or spacing share a
/// fingerprint.
pub fn fingerprint(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalize(text).as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Order-independent similarity between two normalized texts, scored 0-100.
pub trait TokenSimilarity: Send + Sync {
    fn name(&self) -> &'static str;

    fn score(&self, a: &str, b: &str) -> f64;
}

/// Token-sort ratio: tokens of each side are sorted and re-joined, then
/// compared with an insertion/deletion edit ratio. Reordered wording scores
/// the same as the original order.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenSortRatio;

impl TokenSimilarity for TokenSortRatio {
    fn name(&self) -> &'static str {
        "token_sort"
    }

    fn score(&self, a: &str, b: &str) -> f64 {
        indel_ratio(&sorted_tokens(a), &sorted_tokens(b))
    }
}

/// Jaccard overlap of the two token sets.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenSetOverlap;

impl TokenSimilarity for TokenSetOverlap {
    fn name(&self) -> &'static str {
        "token_overlap"
    }

    fn score(&self, a: &str, b: &str) -> f64 {
        let a: BTreeSet<&str> = a.split_whitespace().collect();
        let b: BTreeSet<&str> = b.split_whitespace().collect();
        let union = a.union(&b).count();
        if union == 0 {
            return 100.0;
        }
        let shared = a.intersection(&b).count();
        100.0 * shared as f64 / union as f64
    }
}

fn sorted_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// `100 * (1 - indel_distance / (len_a + len_b))`, where the indel distance
/// counts insertions and deletions only.
fn indel_ratio(a: &str, b: &str) -> f64 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    let total = a_chars.len() + b_chars.len();
    if total == 0 {
        return 100.0;
    }

    let lcs = lcs_length(&a_chars, &b_chars);
    let distance = total - 2 * lcs;
    100.0 * (1.0 - distance as f64 / total as f64)
}

fn lcs_length(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];

    for ca in a {
        for (j, cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// A corpus entry similar to the candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarMatch {
    /// The corpus entry as supplied (not normalized).
    pub text: String,
    /// Position of the entry in the corpus.
    pub index: usize,
    pub score: f64,
}

/// What a candidate is compared against.
#[derive(Debug, Clone, Copy)]
pub enum Corpus<'a> {
    /// Raw stems of existing questions.
    Stems(&'a [String]),
    /// Precomputed fingerprints; only exact duplicates can be found.
    Fingerprints(&'a HashSet<String>),
}

/// Outcome of checking one candidate stem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateReport {
    pub fingerprint: String,
    /// Whether the candidate normalizes to an existing entry.
    pub exact: bool,
    pub similar: Vec<SimilarMatch>,
}

impl DuplicateReport {
    pub fn is_duplicate(&self) -> bool {
        self.exact || !self.similar.is_empty()
    }
}

/// Fuzzy matcher over a corpus of stems.
#[derive(Debug, Clone)]
pub struct DuplicateDetector<S = TokenSortRatio> {
    pub threshold: f64,
    pub limit: usize,
    scorer: S,
}

impl Default for DuplicateDetector<TokenSortRatio> {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl DuplicateDetector<TokenSortRatio> {
    pub fn new(threshold: f64) -> Self {
        Self::with_scorer(threshold, TokenSortRatio)
    }
}

impl<S: TokenSimilarity> DuplicateDetector<S> {
    pub fn with_scorer(threshold: f64, scorer: S) -> Self {
        Self {
            threshold,
            limit: DEFAULT_LIMIT,
            scorer,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn scorer_name(&self) -> &'static str {
        self.scorer.name()
    }

    /// Rank corpus entries by similarity to `candidate`.
    ///
    /// Entries that normalize to nothing are skipped. At most `limit`
    /// matches scoring at least `threshold` are returned, best first; ties
    /// keep corpus order.
    pub fn find_similar<I, T>(&self, candidate: &str, corpus: I) -> Vec<SimilarMatch>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let candidate = normalize(candidate);
        if candidate.is_empty() {
            return Vec::new();
        }

        let mut matches: Vec<SimilarMatch> = corpus
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| {
                let entry = entry.as_ref();
                let normalized = normalize(entry);
                if normalized.is_empty() {
                    return None;
                }
                let score = self.scorer.score(&candidate, &normalized);
                (score >= self.threshold).then(|| SimilarMatch {
                    text: entry.to_string(),
                    index,
                    score,
                })
            })
            .collect();

        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        matches.truncate(self.limit);
        matches
    }

    /// Check a candidate against stems or precomputed fingerprints.
    pub fn check(&self, candidate: &str, corpus: Corpus<'_>) -> DuplicateReport {
        let fp = fingerprint(candidate);
        match corpus {
            Corpus::Stems(stems) => {
                let exact = stems.iter().any(|s| fingerprint(s) == fp);
                DuplicateReport {
                    fingerprint: fp,
                    exact,
                    similar: self.find_similar(candidate, stems),
                }
            }
            Corpus::Fingerprints(known) => DuplicateReport {
                exact: known.contains(&fp),
                fingerprint: fp,
                similar: Vec::new(),
            },
        }
    }
}

/// [`DuplicateDetector::find_similar`] with the token-sort scorer.
pub fn find_similar<I, T>(candidate: &str, corpus: I, threshold: f64) -> Vec<SimilarMatch>
where
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    DuplicateDetector::new(threshold).find_similar(candidate, corpus)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_ignores_case_accents_and_punctuation() {
        assert_eq!(fingerprint("Texto de Prueba"), fingerprint("texto de prueba..."));
        assert_eq!(fingerprint("¿Qué es el IVA?"), fingerprint("que es el iva"));
        assert_ne!(fingerprint("texto de prueba"), fingerprint("texto de pruebas"));
    }

    #[test]
    fn fingerprint_is_sha256_hex() {
        let fp = fingerprint("anything");
        assert_eq!(fp.len(), 64);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
        // sha256("")
        assert_eq!(
            fingerprint("  ...  "),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn finds_case_variant_as_top_match() {
        let corpus = ["pregunta sobre impuestos", "definicion de iva"];
        let matches = find_similar("Pregunta SOBRE Impuestos", corpus, 90.0);
        assert!(!matches.is_empty());
        assert_eq!(matches[0].text, "pregunta sobre impuestos");
        assert!(matches[0].score >= 90.0);
    }

    #[test]
    fn reordered_wording_still_matches() {
        let corpus = ["el plazo para declarar renta"];
        let matches = find_similar("Renta: plazo para declarar el", corpus, 90.0);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].score, 100.0);
    }

    #[test]
    fn unrelated_text_is_filtered_out() {
        let corpus = ["definicion de iva", "regimen sancionatorio aduanero"];
        let matches = find_similar("pregunta sobre impuestos", corpus, 90.0);
        assert!(matches.is_empty());
    }

    #[test]
    fn empty_entries_are_skipped_without_error() {
        let corpus = ["", "   ", "¡¿?!", "pregunta sobre impuestos"];
        let matches = find_similar("pregunta sobre impuestos", corpus, 90.0);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].index, 3);

        let empty: [&str; 0] = [];
        assert!(find_similar("pregunta", empty, 90.0).is_empty());
    }

    #[test]
    fn empty_candidate_matches_nothing() {
        assert!(find_similar("...", ["algo"], 0.0).is_empty());
    }

    #[test]
    fn results_are_limited_and_sorted() {
        let corpus: Vec<String> = (0..8)
            .map(|i| format!("pregunta sobre impuestos {}", "x".repeat(i)))
            .collect();
        let detector = DuplicateDetector::new(50.0);
        let matches = detector.find_similar("pregunta sobre impuestos", &corpus);
        assert_eq!(matches.len(), DEFAULT_LIMIT);
        assert!(matches.windows(2).all(|w| w[0].score >= w[1].score));
        assert_eq!(matches[0].index, 0);
    }

    #[test]
    fn indel_ratio_matches_known_values() {
        assert_eq!(indel_ratio("abc", "abc"), 100.0);
        assert_eq!(indel_ratio("", ""), 100.0);
        assert_eq!(indel_ratio("abc", ""), 0.0);
        // lcs("kitten", "sitting") = 4 -> 100 * 8 / 13
        let score = indel_ratio("kitten", "sitting");
        assert!((score - 800.0 / 13.0).abs() < 1e-9);
    }

    #[test]
    fn token_overlap_scores_jaccard() {
        let scorer = TokenSetOverlap;
        assert_eq!(scorer.score("a b c", "c b a"), 100.0);
        assert_eq!(scorer.score("a b", "b c"), 100.0 / 3.0);
    }

    #[test]
    fn check_against_stems_reports_exact_and_similar() {
        let stems = vec!["Pregunta sobre impuestos.".to_string(), "otra cosa".to_string()];
        let report = DuplicateDetector::new(DEFAULT_THRESHOLD).check("pregunta sobre IMPUESTOS", Corpus::Stems(&stems));
        assert!(report.exact);
        assert!(report.is_duplicate());
        assert_eq!(report.similar[0].index, 0);
    }

    #[test]
    fn check_against_fingerprints_is_exact_only() {
        let known: HashSet<String> = [fingerprint("definicion de iva")].into_iter().collect();
        let detector = DuplicateDetector::new(DEFAULT_THRESHOLD);

        let hit = detector.check("Definición de IVA", Corpus::Fingerprints(&known));
        assert!(hit.exact);
        assert!(hit.similar.is_empty());

        let miss = detector.check("definicion del iva", Corpus::Fingerprints(&known));
        assert!(!miss.is_duplicate());
    }
}
