//! Fixed word lists used by feature extraction and grouping.

/// Stop words dropped during keyword extraction. The tokenizer already
/// discards tokens of one or two characters, so short function words are
/// not listed here.
pub const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "are", "was", "were", "been", "being", "have", "has",
    "had", "does", "did", "will", "would", "could", "should", "might", "can",
    "not", "but", "with", "from", "into", "about", "after", "before",
    "between", "during", "this", "that", "these", "those", "there", "they",
    "them", "their", "its", "than", "what", "which", "who", "when", "where",
    "why", "how",
];

/// Creation and attribution verbs. Presence of any of these marks a
/// question as asking who made or did something.
pub const PROPERTY_VERBS: &[&str] = &[
    "paint", "write", "wrote", "written", "compose", "direct", "invent",
    "discover", "create", "design", "develop", "sculpt", "build", "built",
    "construct", "found", "establish", "sign",
];

/// Attribution nouns that behave like the verbs above for fingerprinting.
pub const PROPERTY_NOUNS: &[&str] = &["self-portrait", "actor", "scientist"];

/// Full attribution vocabulary checked against question texts.
pub fn property_words() -> impl Iterator<Item = &'static str> {
    PROPERTY_VERBS.iter().chain(PROPERTY_NOUNS.iter()).copied()
}

/// Answers too generic to anchor a duplicate group. Bucketing on these
/// would pull unrelated true/false and counting questions together.
pub const LOW_INFORMATION_ANSWERS: &[&str] = &[
    "true", "false", "yes", "no", "unknown", "none", "0", "1", "2", "3", "4",
    "5", "6", "7", "8", "9", "10",
];
