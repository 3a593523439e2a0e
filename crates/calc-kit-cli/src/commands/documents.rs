use clap::{Args, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};

use calc_kit_core::documents::artifact::PdfArtifact;
use calc_kit_core::documents::margins::{self, MarginMode, MarginSpec, MarginUnit};
use calc_kit_core::documents::merge;
use calc_kit_core::documents::queue::{FileQueue, SourceFile};

use super::CommandResult;
use crate::input;

/// Arguments for merging PDFs
#[derive(Args)]
pub struct MergeArgs {
    /// PDF files to merge, in page order
    #[arg(long, num_args = 1.., required = true)]
    pub files: Vec<String>,

    /// Directory to write the merged document into
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ModeArg {
    Add,
    Remove,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum UnitArg {
    Pt,
    In,
    Mm,
}

/// Arguments for adding or removing page margins
#[derive(Args)]
pub struct MarginArgs {
    /// PDF file to adjust
    #[arg(long)]
    pub file: String,

    #[arg(long, value_enum, default_value_t = ModeArg::Add)]
    pub mode: ModeArg,

    /// Unit of the margin values
    #[arg(long, value_enum, default_value_t = UnitArg::Pt)]
    pub unit: UnitArg,

    /// Same margin on every side (individual sides override it)
    #[arg(long)]
    pub all: Option<f32>,

    #[arg(long)]
    pub top: Option<f32>,

    #[arg(long)]
    pub right: Option<f32>,

    #[arg(long)]
    pub bottom: Option<f32>,

    #[arg(long)]
    pub left: Option<f32>,

    /// Directory to write the adjusted document into
    #[arg(long, default_value = ".")]
    pub out_dir: PathBuf,
}

impl MarginArgs {
    fn spec(&self) -> MarginSpec {
        let side = |value: Option<f32>| value.or(self.all).unwrap_or(0.0);
        MarginSpec {
            mode: match self.mode {
                ModeArg::Add => MarginMode::Add,
                ModeArg::Remove => MarginMode::Remove,
            },
            unit: match self.unit {
                UnitArg::Pt => MarginUnit::Points,
                UnitArg::In => MarginUnit::Inches,
                UnitArg::Mm => MarginUnit::Millimetres,
            },
            top: side(self.top),
            right: side(self.right),
            bottom: side(self.bottom),
            left: side(self.left),
        }
    }
}

fn write_artifact(artifact: &PdfArtifact, out_dir: &Path) -> CommandResult {
    fs::create_dir_all(out_dir)?;
    let path = out_dir.join(&artifact.file_name);
    fs::write(&path, &artifact.bytes)
        .map_err(|e| format!("Failed to write '{}': {}", path.display(), e))?;
    log::info!("wrote {} ({} bytes)", path.display(), artifact.size_bytes);

    let mut value = serde_json::json!({ "result": artifact });
    if let Some(result) = value.get_mut("result").and_then(|r| r.as_object_mut()) {
        result.insert("path".into(), path.display().to_string().into());
    }
    Ok(value)
}

pub fn run_merge(args: MergeArgs) -> CommandResult {
    let mut queue = FileQueue::new();
    for path in &args.files {
        let (name, bytes) = input::file::read_bytes(path)?;
        queue.push(SourceFile::new(name, bytes))?;
    }
    log::debug!("merging {:?}", queue.summary());

    let artifact = merge::merge_documents(queue.files())?;
    write_artifact(&artifact, &args.out_dir)
}

pub fn run_margins(args: MarginArgs) -> CommandResult {
    let (name, bytes) = input::file::read_bytes(&args.file)?;
    let source = SourceFile::new(name, bytes);
    let artifact = margins::adjust_margins(&source, &args.spec())?;
    write_artifact(&artifact, &args.out_dir)
}
