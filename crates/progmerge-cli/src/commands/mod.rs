pub mod merge;
pub mod plan;

use anyhow::Context;
use serde::de::DeserializeOwned;
use std::path::Path;

/// Read and parse a JSON document
pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    serde_json::from_str(&source).with_context(|| format!("invalid JSON in {}", path.display()))
}

/// Write `text` to `output`, or to stdout when no path is given
pub(crate) fn emit(output: Option<&Path>, text: &str) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, text)
                .with_context(|| format!("cannot write {}", path.display()))?;
            eprintln!("✓ Wrote {}", path.display());
        }
        None => println!("{}", text),
    }
    Ok(())
}
