//! Deterministic chunking of break-annotated document text.
//!
//! The text handed to this module already carries inline annotations from
//! upstream extraction and scoring: `[PAGE n]` provenance markers,
//! `[BREAK id=n score=s]` boundary candidates and delimited graphic blocks.
//! Nothing here calls a model; given the same text and parameters the output
//! is always the same.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Range;

use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

mod annotate;
mod assemble;
mod cleanup;
mod error;
mod grammar;
mod graphics;
mod headings;
mod markers;
mod page_map;
mod partition;
mod tokens;
mod windows;

pub use annotate::{BreakAnnotator, annotate_in_windows};
pub use assemble::{Chunk, ChunkType, DocumentChunker};
pub use cleanup::CleanedText;
pub use error::ChunkingError;
pub use grammar::MarkerGrammar;
pub use graphics::GraphicPayload;
pub use markers::BreakMarker;
pub use page_map::PageMapping;
pub use partition::{PartitionParams, Partitioner};
pub use tokens::estimate_tokens;
pub use windows::{TextWindow, WindowBudget, split_for_budget};
