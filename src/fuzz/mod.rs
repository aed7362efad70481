//! Candidate generation.
//!
//! Every generator works on the label of a [`BaseDomain`] only and returns
//! mutated labels; [`VariantGenerator`] reattaches the TLD, validates, and
//! tags each candidate with the family that produced it.
//!
//! Labels reaching the generators are validated ASCII, so byte offsets are
//! character offsets. Homoglyph output grows exponentially with the label, so
//! generation is lazy and a capped caller only pays for what it takes.

mod tables;

use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::domain::{is_valid_domain, BaseDomain};

pub use tables::{adjacent_keys, glyphs};

const BIT_MASKS: [u8; 8] = [1, 2, 4, 8, 16, 32, 64, 128];

/// The mutation family a candidate came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MutationKind {
    Bitsquatting,
    Homoglyph,
    Repetition,
    Transposition,
    Replacement,
    Omission,
    Hyphenation,
    Subdomain,
    Insertion,
}

impl MutationKind {
    /// All families, in generation order
    pub const ALL: [MutationKind; 9] = [
        MutationKind::Bitsquatting,
        MutationKind::Homoglyph,
        MutationKind::Repetition,
        MutationKind::Transposition,
        MutationKind::Replacement,
        MutationKind::Omission,
        MutationKind::Hyphenation,
        MutationKind::Subdomain,
        MutationKind::Insertion,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MutationKind::Bitsquatting => "bitsquatting",
            MutationKind::Homoglyph => "homoglyph",
            MutationKind::Repetition => "repetition",
            MutationKind::Transposition => "transposition",
            MutationKind::Replacement => "replacement",
            MutationKind::Omission => "omission",
            MutationKind::Hyphenation => "hyphenation",
            MutationKind::Subdomain => "subdomain",
            MutationKind::Insertion => "insertion",
        }
    }

    /// Run this family's generator over a label
    pub fn mutate(&self, label: &str) -> Vec<String> {
        self.mutations(label).collect()
    }

    /// This family's mutations of `label`, produced on demand
    pub fn mutations<'a>(&self, label: &'a str) -> Box<dyn Iterator<Item = String> + 'a> {
        match self {
            MutationKind::Homoglyph => Box::new(homoglyphs(label)),
            kind => Box::new(kind.mutate_eager(label).into_iter()),
        }
    }

    fn mutate_eager(&self, label: &str) -> Vec<String> {
        match self {
            MutationKind::Bitsquatting => generate_bitsquatting(label),
            MutationKind::Homoglyph => generate_homoglyphs(label),
            MutationKind::Repetition => generate_repetition(label),
            MutationKind::Transposition => generate_transposition(label),
            MutationKind::Replacement => generate_replacement(label),
            MutationKind::Omission => generate_omission(label),
            MutationKind::Hyphenation => generate_hyphenation(label),
            MutationKind::Subdomain => generate_subdomain(label),
            MutationKind::Insertion => generate_insertion(label),
        }
    }
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MutationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MutationKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown mutation kind: {s}"))
    }
}

/// A generated candidate domain
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Variant {
    pub kind: MutationKind,
    pub candidate: String,
}

/// Produces validated candidates for a watched domain
#[derive(Debug, Clone)]
pub struct VariantGenerator {
    kinds: Vec<MutationKind>,
}

impl VariantGenerator {
    /// Generator running every family
    pub fn new() -> Self {
        Self {
            kinds: MutationKind::ALL.to_vec(),
        }
    }

    /// Generator restricted to the given families, run in canonical order
    pub fn with_kinds(kinds: &[MutationKind]) -> Self {
        Self {
            kinds: MutationKind::ALL
                .into_iter()
                .filter(|kind| kinds.contains(kind))
                .collect(),
        }
    }

    /// All candidates for `base`, in discovery order.
    ///
    /// Candidates failing validation are dropped. Duplicates across
    /// families are kept.
    pub fn generate(&self, base: &BaseDomain) -> Vec<Variant> {
        self.variants(base).collect()
    }

    /// Lazy form of [`generate`](Self::generate), same order
    pub fn variants<'a>(&'a self, base: &'a BaseDomain) -> impl Iterator<Item = Variant> + 'a {
        self.kinds
            .iter()
            .flat_map(move |kind| {
                kind.mutations(base.label()).map(move |label| Variant {
                    kind: *kind,
                    candidate: base.qualify(&label),
                })
            })
            .filter(|variant| is_valid_domain(&variant.candidate))
    }
}

impl Default for VariantGenerator {
    fn default() -> Self {
        Self::new()
    }
}

fn generate_bitsquatting(label: &str) -> Vec<String> {
    let mut variations = Vec::new();

    for (i, ch) in label.bytes().enumerate() {
        for mask in BIT_MASKS {
            let flipped = ch ^ mask;
            if flipped.is_ascii_lowercase() || flipped.is_ascii_digit() || flipped == b'-' {
                let mut new_label = label.to_string();
                new_label.replace_range(i..i + 1, &char::from(flipped).to_string());
                variations.push(new_label);
            }
        }
    }

    variations
}

fn generate_homoglyphs(label: &str) -> Vec<String> {
    homoglyphs(label).collect()
}

/// Distinct look-alike spellings of `label`, without `label` itself
fn homoglyphs(label: &str) -> impl Iterator<Item = String> + '_ {
    let mut seen = HashSet::new();
    GlyphProduct::new(label)
        .filter(move |candidate| candidate != label && seen.insert(candidate.clone()))
}

/// Every spelling of a label with any subset of characters swapped for a
/// look-alike. The last position varies fastest.
struct GlyphProduct {
    options: Vec<Vec<&'static str>>,
    originals: Vec<String>,
    cursor: Option<Vec<usize>>,
}

impl GlyphProduct {
    fn new(label: &str) -> Self {
        let originals: Vec<String> = label.chars().map(String::from).collect();
        let options = label.chars().map(|c| glyphs(c).to_vec()).collect();
        let cursor = (!originals.is_empty()).then(|| vec![0; originals.len()]);

        Self {
            options,
            originals,
            cursor,
        }
    }

    /// Spelling at position `i` for choice `choice`; 0 is the original
    fn spelling(&self, i: usize, choice: usize) -> &str {
        match choice {
            0 => self.originals[i].as_str(),
            n => self.options[i][n - 1],
        }
    }
}

impl Iterator for GlyphProduct {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let cursor = self.cursor.as_ref()?;
        let current: String = cursor
            .iter()
            .enumerate()
            .map(|(i, &choice)| self.spelling(i, choice))
            .collect();

        let mut next = cursor.clone();
        let mut exhausted = true;
        for i in (0..next.len()).rev() {
            if next[i] < self.options[i].len() {
                next[i] += 1;
                exhausted = false;
                break;
            }
            next[i] = 0;
        }
        self.cursor = (!exhausted).then_some(next);

        Some(current)
    }
}

fn generate_repetition(label: &str) -> Vec<String> {
    let mut variations = Vec::new();

    for (i, ch) in label.char_indices() {
        if ch.is_ascii_alphabetic() {
            let mut new_label = label.to_string();
            new_label.insert(i + 1, ch);
            variations.push(new_label);
        }
    }

    variations
}

fn generate_transposition(label: &str) -> Vec<String> {
    let mut variations = Vec::new();
    let bytes = label.as_bytes();

    for i in 0..bytes.len().saturating_sub(1) {
        if bytes[i] != bytes[i + 1] {
            let mut swapped = bytes.to_vec();
            swapped.swap(i, i + 1);
            variations.push(String::from_utf8_lossy(&swapped).into_owned());
        }
    }

    variations
}

fn generate_replacement(label: &str) -> Vec<String> {
    let mut variations = Vec::new();

    for (i, ch) in label.char_indices() {
        if let Some(keys) = adjacent_keys(ch) {
            for key in keys.chars() {
                variations.push(format!("{}{}{}", &label[..i], key, &label[i + 1..]));
            }
        }
    }

    variations
}

fn generate_omission(label: &str) -> Vec<String> {
    let mut variations = Vec::new();

    for i in 0..label.len() {
        let mut new_label = label.to_string();
        new_label.remove(i);
        if !new_label.is_empty() {
            variations.push(new_label);
        }
    }

    variations
}

fn generate_hyphenation(label: &str) -> Vec<String> {
    insert_at_boundaries(label, '-')
}

fn generate_subdomain(label: &str) -> Vec<String> {
    insert_at_boundaries(label, '.')
}

/// Insert `sep` at each internal boundary not touching a hyphen or dot
fn insert_at_boundaries(label: &str, sep: char) -> Vec<String> {
    let mut variations = Vec::new();
    let bytes = label.as_bytes();
    let is_separator = |b: u8| b == b'-' || b == b'.';

    for i in 1..bytes.len() {
        if !is_separator(bytes[i]) && !is_separator(bytes[i - 1]) {
            let mut new_label = label.to_string();
            new_label.insert(i, sep);
            variations.push(new_label);
        }
    }

    variations
}

fn generate_insertion(label: &str) -> Vec<String> {
    let mut variations = Vec::new();

    for i in 1..label.len().saturating_sub(1) {
        let ch = &label[i..i + 1];
        let Some(keys) = ch.chars().next().and_then(adjacent_keys) else {
            continue;
        };
        for key in keys.chars() {
            variations.push(format!("{}{}{}{}", &label[..i], key, ch, &label[i + 1..]));
            variations.push(format!("{}{}{}{}", &label[..i], ch, key, &label[i + 1..]));
        }
    }

    variations
}
