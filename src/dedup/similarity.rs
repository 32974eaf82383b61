//! Pairwise similarity scoring over question texts and fingerprints.
//! All scores are in [0.0, 1.0] and all comparisons are case-insensitive.

use super::models::Fingerprint;

/// Two identical known-for markers this many bytes apart (or closer) are
/// treated as the same sentence shape.
const KNOWN_FOR_POSITION_WINDOW: usize = 10;

/// Character-level Levenshtein distance using the two-row rolling buffer.
fn levenshtein(a: &[char], b: &[char]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, &ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let substitution = if ca == cb { prev[j] } else { prev[j] + 1 };
            curr[j + 1] = substitution.min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Normalized edit-distance similarity: 1 - distance / longer_length.
/// Inputs are trimmed and lowercased first; two empty strings score 1.0.
pub fn string_similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.trim().to_lowercase().chars().collect();
    let b: Vec<char> = b.trim().to_lowercase().chars().collect();

    let longest = a.len().max(b.len());
    if longest == 0 {
        return 1.0;
    }

    1.0 - levenshtein(&a, &b) as f64 / longest as f64
}

/// Average of the applicable fingerprint factors. A factor only enters the
/// average when at least one side carries the signal, so the divisor varies
/// from pair to pair.
pub fn fingerprint_similarity(a: &Fingerprint, b: &Fingerprint) -> f64 {
    let mut score = 0.0;
    let mut factors = 0u32;

    match (a.known_for_position, b.known_for_position) {
        (Some(pa), Some(pb)) => {
            factors += 1;
            score += if pa.abs_diff(pb) < KNOWN_FOR_POSITION_WINDOW {
                1.0
            } else {
                0.3
            };
        }
        (Some(_), None) | (None, Some(_)) => {
            factors += 1;
            score += 0.2;
        }
        (None, None) => {}
    }

    if !a.quoted_entities.is_empty() || !b.quoted_entities.is_empty() {
        factors += 1;
        score += jaccard(&a.quoted_entities, &b.quoted_entities);
    }

    if !a.property_words.is_empty() || !b.property_words.is_empty() {
        factors += 1;
        score += jaccard(&a.property_words, &b.property_words);
    }

    if factors == 0 {
        // No structural signal on either side. Stay neutral so plain
        // paraphrases are never vetoed on fingerprints they do not have.
        0.5
    } else {
        score / f64::from(factors)
    }
}

/// True when two questions demonstrably ask about different properties of
/// what may be the same subject. Used to veto merges between questions
/// whose intents already disagree.
pub fn asking_different_properties(a: &Fingerprint, b: &Fingerprint) -> bool {
    if a.quoted_entities.is_empty() != b.quoted_entities.is_empty() {
        return true;
    }

    if !a.quoted_entities.is_empty()
        && !b.quoted_entities.is_empty()
        && disjoint(&a.quoted_entities, &b.quoted_entities)
    {
        return true;
    }

    if !a.property_words.is_empty()
        && !b.property_words.is_empty()
        && disjoint(&a.property_words, &b.property_words)
    {
        return true;
    }

    if let (Some(ca), Some(cb)) = (&a.known_for_clause, &b.known_for_clause) {
        if string_similarity(ca, cb) <= 0.5 {
            return true;
        }
    }

    false
}

fn jaccard(a: &[String], b: &[String]) -> f64 {
    use std::collections::HashSet;

    if a.is_empty() && b.is_empty() {
        return 0.0;
    }

    let sa: HashSet<&str> = a.iter().map(String::as_str).collect();
    let sb: HashSet<&str> = b.iter().map(String::as_str).collect();
    let intersection = sa.intersection(&sb).count();
    let union = sa.union(&sb).count();

    intersection as f64 / union as f64
}

fn disjoint(a: &[String], b: &[String]) -> bool {
    a.iter().all(|x| !b.contains(x))
}
