use std::path::PathBuf;

use anyhow::{Context, Result};
use time::OffsetDateTime;
use tracing::{info, warn};
use xfa::{DocumentMetadata, FillOptions, FillStats};

use crate::common;

const DEFAULT_CREATOR: &str = "xfactl";
const CREATOR_TOOL: &str = concat!("xfactl ", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct FillArgs {
    pub template: PathBuf,
    pub data: PathBuf,
    pub output: PathBuf,
    pub flatten: bool,
    pub form_type: Option<String>,
    pub creator: Option<String>,
}

impl FillArgs {
    /// Metadata is written only when the caller names a form type or creator.
    fn options(&self, now: OffsetDateTime) -> FillOptions {
        let options = FillOptions::default().flatten(self.flatten);
        if self.form_type.is_none() && self.creator.is_none() {
            return options;
        }
        let creator = self.creator.as_deref().unwrap_or(DEFAULT_CREATOR);
        let metadata = DocumentMetadata::filled_form(self.form_type.as_deref(), creator, now)
            .with_creator_tool(CREATOR_TOOL);
        options.with_metadata(metadata)
    }
}

pub fn run(args: FillArgs) -> Result<()> {
    let stats = fill(&args)?;
    common::print_json(&stats)
}

fn fill(args: &FillArgs) -> Result<FillStats> {
    let updates = common::read_updates(&args.data)?;
    let mut store = common::open_pdf(&args.template)?;
    let options = args.options(OffsetDateTime::now_utc());

    let stats = xfa::fill_form(&mut store, &updates, &options)
        .with_context(|| format!("fill {}", args.template.display()))?;
    for error in &stats.errors {
        warn!(%error, "field not filled");
    }

    store
        .save(&args.output)
        .with_context(|| format!("save {}", args.output.display()))?;
    info!(output = %args.output.display(), filled = stats.filled, total = stats.total, "wrote filled form");
    Ok(stats)
}
