use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use xfa::FormStore;

use crate::common;

/// Write the named XFA packet to stdout unchanged.
pub fn run(pdf: &Path, name: &str) -> Result<()> {
    let store = common::open_pdf(pdf)?;
    let bytes = store.read_named_xml(name).with_context(|| {
        let available = store
            .packet_names()
            .map(|names| names.join(", "))
            .unwrap_or_default();
        format!("read XFA packet {name} (available: {available})")
    })?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&bytes).context("write packet to stdout")?;
    if !bytes.ends_with(b"\n") {
        writeln!(stdout).context("write packet to stdout")?;
    }
    Ok(())
}
