//! Text layouts for repeat-count matrices.

mod formatter;

pub use formatter::{render_matrix, write_matrix, OutputLayout, BLOCK_TERMINATOR};
