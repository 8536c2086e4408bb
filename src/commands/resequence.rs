use std::io::{self, Write};

use anyhow::{Context, Result};
use tracing::info;

use crate::chunking::MarkerGrammar;
use crate::cli::ResequenceArgs;
use crate::util::{read_text, write_text};

pub fn run(args: ResequenceArgs) -> Result<()> {
    let text = read_text(&args.input)?;
    let grammar = MarkerGrammar::new()?;
    let resequenced = grammar.resequence_breaks(&text);
    let markers = grammar.break_markers(&resequenced).len();

    match &args.output {
        Some(path) => {
            write_text(path, &resequenced)?;
            info!(markers, path = %path.display(), "resequenced break markers");
        }
        None => {
            io::stdout()
                .lock()
                .write_all(resequenced.as_bytes())
                .context("failed to write resequenced text to stdout")?;
            info!(markers, "resequenced break markers");
        }
    }

    Ok(())
}
