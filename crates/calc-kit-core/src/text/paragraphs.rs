//! Paragraph, word and sentence statistics over free text.
//!
//! Paragraphs are separated by blank lines (lines holding only whitespace).
//! Text without any blank line is a single paragraph.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::types::{with_metadata, ComputationOutput};

const SHORT_PARAGRAPH_MAX_WORDS: usize = 50;
const MEDIUM_PARAGRAPH_MAX_WORDS: usize = 150;
const WORDS_PER_MINUTE: Decimal = dec!(200);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParagraphLength {
    /// Up to 50 words
    Short,
    /// 51 to 150 words
    Medium,
    /// More than 150 words
    Long,
}

impl ParagraphLength {
    pub fn from_words(words: usize) -> Self {
        if words <= SHORT_PARAGRAPH_MAX_WORDS {
            ParagraphLength::Short
        } else if words <= MEDIUM_PARAGRAPH_MAX_WORDS {
            ParagraphLength::Medium
        } else {
            ParagraphLength::Long
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParagraphStats {
    /// 1-based position in the text
    pub index: usize,
    pub words: usize,
    pub sentences: usize,
    pub characters: usize,
    pub characters_no_spaces: usize,
    pub length: ParagraphLength,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextStatistics {
    pub total_paragraphs: usize,
    pub total_words: usize,
    pub total_sentences: usize,
    pub total_characters: usize,
    pub total_characters_no_spaces: usize,
    pub average_words_per_paragraph: Decimal,
    pub average_sentences_per_paragraph: Decimal,
    pub shortest_paragraph_words: usize,
    pub longest_paragraph_words: usize,
    pub short_paragraphs: usize,
    pub medium_paragraphs: usize,
    pub long_paragraphs: usize,
    pub reading_time_minutes: Decimal,
    pub paragraphs: Vec<ParagraphStats>,
}

/// Split text into paragraphs on blank lines, dropping empty ones.
pub fn split_paragraphs(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                paragraphs.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        paragraphs.push(current.join("\n"));
    }

    paragraphs
}

pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

const TERMINATORS: [char; 3] = ['.', '!', '?'];

/// Closing quotes and brackets may sit between a terminator and the space.
const CLOSERS: [char; 6] = ['"', '\'', ')', ']', '\u{201D}', '\u{2019}'];

/// Count runs of text ended by `.`, `!` or `?`. A terminator only ends a
/// sentence when whitespace or the end of input follows it (after any
/// further terminators or closing quotes), so "3.5" and "example.com" stay in
/// one sentence. Repeated terminators ("Wait...", "Really?!") close a single
/// sentence, and trailing text without a terminator still counts as one.
pub fn count_sentences(text: &str) -> usize {
    let chars: Vec<char> = text.chars().collect();
    let mut count = 0;
    let mut in_sentence = false;
    for (i, &ch) in chars.iter().enumerate() {
        if TERMINATORS.contains(&ch) {
            let boundary = chars[i + 1..]
                .iter()
                .find(|c| !TERMINATORS.contains(c) && !CLOSERS.contains(c))
                .map_or(true, |c| c.is_whitespace());
            if in_sentence && boundary {
                count += 1;
                in_sentence = false;
            }
        } else if !ch.is_whitespace() && !CLOSERS.contains(&ch) {
            in_sentence = true;
        }
    }
    if in_sentence {
        count += 1;
    }
    count
}

fn paragraph_stats(index: usize, paragraph: &str) -> ParagraphStats {
    let words = count_words(paragraph);
    ParagraphStats {
        index,
        words,
        sentences: count_sentences(paragraph),
        characters: paragraph.chars().count(),
        characters_no_spaces: paragraph.chars().filter(|c| !c.is_whitespace()).count(),
        length: ParagraphLength::from_words(words),
    }
}

fn average(total: usize, count: usize) -> Decimal {
    if count == 0 {
        return Decimal::ZERO;
    }
    (Decimal::from(total) / Decimal::from(count)).round_dp(2)
}

/// Compute paragraph statistics for the given text. Empty input yields
/// all-zero statistics.
pub fn analyze_paragraphs(text: &str) -> ComputationOutput<TextStatistics> {
    let start = Instant::now();

    let paragraphs: Vec<ParagraphStats> = split_paragraphs(text)
        .iter()
        .enumerate()
        .map(|(i, p)| paragraph_stats(i + 1, p))
        .collect();

    let mut stats = TextStatistics {
        total_paragraphs: paragraphs.len(),
        ..Default::default()
    };
    for p in &paragraphs {
        stats.total_words += p.words;
        stats.total_sentences += p.sentences;
        stats.total_characters += p.characters;
        stats.total_characters_no_spaces += p.characters_no_spaces;
        match p.length {
            ParagraphLength::Short => stats.short_paragraphs += 1,
            ParagraphLength::Medium => stats.medium_paragraphs += 1,
            ParagraphLength::Long => stats.long_paragraphs += 1,
        }
    }
    stats.shortest_paragraph_words = paragraphs.iter().map(|p| p.words).min().unwrap_or(0);
    stats.longest_paragraph_words = paragraphs.iter().map(|p| p.words).max().unwrap_or(0);
    stats.average_words_per_paragraph = average(stats.total_words, stats.total_paragraphs);
    stats.average_sentences_per_paragraph =
        average(stats.total_sentences, stats.total_paragraphs);
    stats.reading_time_minutes = (Decimal::from(stats.total_words) / WORDS_PER_MINUTE)
        .round_dp_with_strategy(1, RoundingStrategy::AwayFromZero);
    stats.paragraphs = paragraphs;

    let elapsed = start.elapsed().as_micros() as u64;
    with_metadata(
        "Blank-line paragraph split with whitespace word count",
        &serde_json::json!({
            "short_max_words": SHORT_PARAGRAPH_MAX_WORDS,
            "medium_max_words": MEDIUM_PARAGRAPH_MAX_WORDS,
            "words_per_minute": WORDS_PER_MINUTE.to_string(),
        }),
        Vec::new(),
        elapsed,
        stats,
    )
}
