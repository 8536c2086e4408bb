use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChunkingError {
    /// Every run and graphic collapsed to empty content.
    #[error("no chunks generated from document ({input_bytes} bytes of input)")]
    NoContent { input_bytes: usize },
}
