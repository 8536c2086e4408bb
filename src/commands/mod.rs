pub mod chunk;
pub mod resequence;
pub mod status;
pub mod stitch;
pub mod windows;
