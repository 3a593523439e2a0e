use clap::Args;

use calc_kit_core::text::paragraphs;

use super::CommandResult;
use crate::input;
use crate::output::placeholder;

/// Arguments for paragraph statistics
#[derive(Args)]
pub struct ParagraphArgs {
    /// Text to analyse
    #[arg(long, conflicts_with = "file")]
    pub text: Option<String>,

    /// Read the text from a file
    #[arg(long)]
    pub file: Option<String>,
}

pub fn run_paragraphs(args: ParagraphArgs) -> CommandResult {
    let text = match (args.text, args.file) {
        (Some(text), _) => Some(text),
        (None, Some(path)) => Some(input::file::read_text(&path)?),
        (None, None) => input::stdin::read_stdin_text()?,
    };

    match text {
        Some(text) if !text.trim().is_empty() => {
            Ok(serde_json::to_value(paragraphs::analyze_paragraphs(&text))?)
        }
        _ => Ok(placeholder("Paste or type text to see paragraph statistics")),
    }
}
