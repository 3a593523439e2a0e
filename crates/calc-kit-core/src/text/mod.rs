pub mod paragraphs;
