use std::path::Path;

use anyhow::Result;
use tracing::info;

use crate::chunking::{TextWindow, split_for_budget};
use crate::cli::WindowsArgs;
use crate::model::{WindowEntry, WindowManifest};
use crate::util::{
    ensure_directory, now_utc_string, read_text, sha256_hex, write_json_pretty, write_text,
};

pub const WINDOW_MANIFEST_FILENAME: &str = "windows.json";

pub fn run(args: WindowsArgs) -> Result<()> {
    let source = read_text(&args.input)?;
    let budget = args.budget.budget();
    ensure_directory(&args.out_dir)?;

    let windows = split_for_budget(&source, budget);
    let mut entries = Vec::with_capacity(windows.len());
    for window in &windows {
        entries.push(write_window(&args.out_dir, window)?);
    }

    let manifest = WindowManifest {
        manifest_version: 1,
        generated_at: now_utc_string(),
        source_path: args.input.display().to_string(),
        source_sha256: sha256_hex(source.as_bytes()),
        budget,
        window_count: entries.len(),
        windows: entries,
    };
    let manifest_path = args.out_dir.join(WINDOW_MANIFEST_FILENAME);
    write_json_pretty(&manifest_path, &manifest)?;

    info!(
        input = %args.input.display(),
        windows = manifest.window_count,
        max_tokens = budget.max_tokens,
        overlap_tokens = budget.overlap_tokens,
        path = %manifest_path.display(),
        "wrote annotation windows"
    );

    Ok(())
}

fn window_filename(index: usize) -> String {
    format!("window_{:04}.txt", index + 1)
}

fn write_window(out_dir: &Path, window: &TextWindow) -> Result<WindowEntry> {
    let filename = window_filename(window.index);
    write_text(&out_dir.join(&filename), &window.text)?;

    Ok(WindowEntry {
        index: window.index,
        start: window.start,
        end: window.end,
        token_estimate: window.token_estimate(),
        filename,
    })
}
