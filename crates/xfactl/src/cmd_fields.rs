use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;
use xfa::{FieldDescriptor, FieldSummary};

use crate::common;

const OPTION_PREVIEW: usize = 5;

pub fn run(pdf: &Path, json: bool) -> Result<()> {
    let store = common::open_pdf(pdf)?;
    let fields = xfa::extract_fields(&store).context("extract template fields")?;
    info!(count = fields.len(), "listed template fields");

    if json {
        return common::print_json(&fields);
    }
    print!("{}", render_table(&fields));
    Ok(())
}

fn render_table(fields: &[FieldDescriptor]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{:<48} {:<10} {}\n", "PATH", "KIND", "CAPTION"));
    for field in fields {
        let path = if field.path.is_empty() {
            "(anonymous)".to_string()
        } else {
            field.path.to_string()
        };
        out.push_str(&format!("{path:<48} {:<10} {}\n", field.kind, field.caption));
        if !field.tooltip.is_empty() {
            out.push_str(&format!("    tooltip: {}\n", field.tooltip));
        }
        if let Some(options) = &field.options {
            out.push_str(&format!(
                "    options: {}\n",
                common::preview_options(options, OPTION_PREVIEW)
            ));
        }
    }

    let summary = FieldSummary::from_fields(fields);
    out.push('\n');
    for (kind, count) in &summary.counts {
        out.push_str(&format!("{kind:<10} {count}\n"));
    }
    out.push_str(&format!("{:<10} {}\n", "total", summary.total));
    out
}
