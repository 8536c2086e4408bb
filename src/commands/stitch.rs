use std::fs;

use anyhow::{Context, Result, bail};
use tracing::{info, warn};

use crate::chunking::MarkerGrammar;
use crate::cli::StitchArgs;
use crate::commands::windows::WINDOW_MANIFEST_FILENAME;
use crate::model::WindowManifest;
use crate::util::{read_text, write_text};

pub fn run(args: StitchArgs) -> Result<()> {
    let manifest_path = args.windows_dir.join(WINDOW_MANIFEST_FILENAME);
    let raw = fs::read(&manifest_path)
        .with_context(|| format!("failed to read {}", manifest_path.display()))?;
    let manifest: WindowManifest = serde_json::from_slice(&raw)
        .with_context(|| format!("failed to parse {}", manifest_path.display()))?;

    if manifest.windows.len() != manifest.window_count {
        warn!(
            declared = manifest.window_count,
            listed = manifest.windows.len(),
            "window manifest count mismatch"
        );
    }
    if manifest.windows.is_empty() {
        bail!("{} lists no windows", manifest_path.display());
    }

    let mut windows = manifest.windows;
    windows.sort_by_key(|entry| entry.index);

    let mut annotated = Vec::with_capacity(windows.len());
    for entry in &windows {
        let path = args.annotated_dir.join(&entry.filename);
        if !path.exists() {
            bail!(
                "annotated window {} missing: {}",
                entry.index + 1,
                path.display()
            );
        }
        annotated.push(read_text(&path)?);
    }

    let grammar = MarkerGrammar::new()?;
    let stitched = grammar.stitch_windows(&annotated);
    write_text(&args.output, &stitched)?;

    info!(
        windows = annotated.len(),
        break_markers = grammar.break_markers(&stitched).len(),
        path = %args.output.display(),
        "stitched annotated windows"
    );

    Ok(())
}
