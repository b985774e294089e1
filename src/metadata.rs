//! Filename heuristics for the manifest generator.
//!
//! Everything here is a pure function over a filename stem. The behavior is
//! driven by the rule tables below, so new document categories or domain
//! terms are added as data rather than code.

/// Keyword categories tested in order against the lowercased filename.
/// The first matching rule wins.
const DESCRIPTION_RULES: &[(&[&str], &str)] = &[
    (
        &["invoice", "rechnung", "austrocontrol"],
        "Official invoice and billing document",
    ),
    (
        &["haftpflicht", "versicherung"],
        "Liability insurance policy document",
    ),
    (
        &["luft", "drohnen", "drone"],
        "Drone regulations and aviation documentation",
    ),
    (
        &["meldung", "wechsel"],
        "Drone registration and change notification",
    ),
    (
        &["bbe", "air&more", "ae"],
        "Insurance certificate and coverage document",
    ),
    (
        &["manual", "guide", "handbuch"],
        "User guide and documentation",
    ),
    (
        &["spec", "technical", "spezifikation"],
        "Technical specifications and requirements",
    ),
    (
        &["install", "installation"],
        "Installation instructions and setup guide",
    ),
    (
        &["tutorial", "anleitung"],
        "Step-by-step tutorial and walkthrough",
    ),
    (&["faq", "frage"], "Frequently asked questions"),
    (
        &["produkt", "information"],
        "Product information and documentation",
    ),
];

const FALLBACK_DESCRIPTION: &str = "Documentation and reference materials";

/// Known abbreviations and compound domain terms, rewritten to their
/// canonical casing before the title is split into words. Applied in order.
const CANONICAL_TERMS: &[(&str, &str)] = &[
    ("austrocontrol", "AustroControl"),
    ("r+v", "R+V"),
    ("bbe", "BBE"),
    ("ae", "AE"),
    ("drohnen", "Drohnen"),
    ("drone", "Drone"),
    ("haftpflicht", "Haftpflicht"),
    ("versicherung", "Versicherung"),
    ("meldung", "Meldung"),
    ("wechsel", "Wechsel"),
    ("luft", "LUFT"),
    ("invoice", "Invoice"),
    ("air&more", "AIR&MORE"),
    ("produktinformationsblatt", "Produktinformationsblatt"),
    ("ipid", "IPID"),
];

/// Words kept verbatim during the per-word casing pass.
const VERBATIM_WORDS: &[&str] = &["AustroControl", "R+V", "BBE", "AE", "AIR&MORE", "IPID", "LUFT"];

/// Derives the manifest id: lowercase the stem and map every character
/// outside `[a-z0-9]` to `-`.
pub fn slug_id(file_stem: &str) -> String {
    file_stem
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() {
                c
            } else {
                '-'
            }
        })
        .collect()
}

/// Picks the category description for a filename stem.
pub fn describe(file_stem: &str) -> &'static str {
    let name = file_stem.to_lowercase();
    for (keywords, description) in DESCRIPTION_RULES {
        if keywords.iter().any(|keyword| name.contains(keyword)) {
            return description;
        }
    }
    FALLBACK_DESCRIPTION
}

/// Formats a filename stem into a display title.
///
/// Pipeline: canonical-term substitution, `&` spacing, compound-word
/// splitting, separator normalization, per-word casing.
pub fn format_title(file_stem: &str) -> String {
    let mut formatted = file_stem.to_owned();
    for (term, canonical) in CANONICAL_TERMS {
        formatted = replace_all_ignore_case(&formatted, term, canonical);
    }
    formatted = formatted.replace('&', " & ");
    formatted = split_compound_words(&formatted);

    normalize_separators(&formatted)
        .split(' ')
        .map(cased_word)
        .collect::<Vec<_>>()
        .join(" ")
}

/// ASCII case-insensitive replacement of every occurrence of `term`.
fn replace_all_ignore_case(haystack: &str, term: &str, replacement: &str) -> String {
    let lower_haystack = haystack.to_ascii_lowercase();
    let lower_term = term.to_ascii_lowercase();
    if lower_term.is_empty() {
        return haystack.to_owned();
    }

    let mut out = String::with_capacity(haystack.len());
    let mut pos = 0;
    while let Some(found) = lower_haystack[pos..].find(&lower_term) {
        let start = pos + found;
        out.push_str(&haystack[pos..start]);
        out.push_str(replacement);
        pos = start + lower_term.len();
    }
    out.push_str(&haystack[pos..]);
    out
}

/// Inserts a space at lowercase-to-uppercase transitions (`aB` -> `a B`) and
/// between an acronym and a following word (`ABc` -> `A Bc`).
fn split_compound_words(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len() + 8);

    for (i, &c) in chars.iter().enumerate() {
        if i > 0 {
            let prev = chars[i - 1];
            let word_boundary = prev.is_lowercase() && c.is_uppercase();
            let acronym_boundary = prev.is_uppercase()
                && c.is_uppercase()
                && chars.get(i + 1).is_some_and(|next| next.is_lowercase());
            if word_boundary || acronym_boundary {
                out.push(' ');
            }
        }
        out.push(c);
    }

    out
}

/// Collapses whitespace runs and hyphen/underscore separators to single
/// spaces and trims the ends.
fn normalize_separators(input: &str) -> String {
    input
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|token| !token.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn cased_word(word: &str) -> String {
    if VERBATIM_WORDS.contains(&word) {
        return word.to_owned();
    }
    // Version numbers and dotted tokens stay untouched.
    if word.contains('.') {
        return word.to_owned();
    }
    if !word.is_empty() && word.chars().all(|c| c.is_ascii_digit()) {
        return word.to_owned();
    }

    let mut chars = word.chars();
    match chars.next() {
        Some(first) => {
            let mut out: String = first.to_uppercase().collect();
            out.push_str(&chars.as_str().to_lowercase());
            out
        }
        None => String::new(),
    }
}
