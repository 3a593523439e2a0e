#![cfg(feature = "text")]

use calc_kit_core::text::paragraphs::{analyze_paragraphs, ParagraphLength};
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;

#[test]
fn test_single_paragraph_fallback() {
    let out = analyze_paragraphs("A. B.");
    assert_eq!(out.result.total_paragraphs, 1);
    assert_eq!(out.result.total_sentences, 2);
}

#[test]
fn test_two_paragraphs() {
    let out = analyze_paragraphs("Para one.\n\nPara two.");
    let s = &out.result;
    assert_eq!(s.total_paragraphs, 2);
    assert_eq!(s.paragraphs[0].index, 1);
    assert_eq!(s.paragraphs[1].words, 2);
    assert_eq!(s.average_words_per_paragraph, dec!(2));
}

#[test]
fn test_bucket_counts_and_extremes() {
    let short = "Short one here.";
    let medium = vec!["word"; 80].join(" ");
    let long = vec!["word"; 200].join(" ");
    let text = format!("{short}\n\n{medium}\n\n{long}");

    let s = analyze_paragraphs(&text).result;
    assert_eq!(
        s.paragraphs.iter().map(|p| p.length).collect::<Vec<_>>(),
        vec![
            ParagraphLength::Short,
            ParagraphLength::Medium,
            ParagraphLength::Long
        ]
    );
    assert_eq!(
        (s.short_paragraphs, s.medium_paragraphs, s.long_paragraphs),
        (1, 1, 1)
    );
    assert_eq!(s.shortest_paragraph_words, 3);
    assert_eq!(s.longest_paragraph_words, 200);
    assert_eq!(s.total_words, 283);
    // 283 / 3
    assert_eq!(s.average_words_per_paragraph, dec!(94.33));
    // 283 / 200 = 1.415, rounded up
    assert_eq!(s.reading_time_minutes, dec!(1.5));
}

#[test]
fn test_character_counts() {
    let s = analyze_paragraphs("ab cd").result;
    assert_eq!(s.total_characters, 5);
    assert_eq!(s.total_characters_no_spaces, 4);
}
