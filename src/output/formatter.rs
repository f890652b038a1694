use anyhow::{anyhow, Result};
use std::io::{self, Write};

use crate::mutation::RepeatMatrix;

/// Line closing each replicate in [`OutputLayout::PerIndividual`].
pub const BLOCK_TERMINATOR: &str = "//";

/// How a replicate's repeat counts are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputLayout {
    /// One line per replicate, all individuals at locus 0 first, then locus 1, ...
    #[default]
    Standard,
    /// One line per individual holding its loci, then a `//` line.
    PerIndividual,
}

/// Write one replicate's matrix as tab-separated integers.
pub fn write_matrix<W: Write>(
    writer: &mut W,
    matrix: &RepeatMatrix,
    layout: OutputLayout,
) -> io::Result<()> {
    match layout {
        OutputLayout::Standard => {
            let counts = (0..matrix.linked_n()).flat_map(move |locus| matrix.locus(locus));
            write_row(writer, counts)?;
        }
        OutputLayout::PerIndividual => {
            for individual in 0..matrix.nsam() {
                write_row(writer, matrix.individual(individual).iter().copied())?;
            }
            writeln!(writer, "{}", BLOCK_TERMINATOR)?;
        }
    }
    Ok(())
}

fn write_row<W: Write>(writer: &mut W, counts: impl Iterator<Item = i64>) -> io::Result<()> {
    for (idx, count) in counts.enumerate() {
        if idx > 0 {
            writer.write_all(b"\t")?;
        }
        write!(writer, "{}", count)?;
    }
    writer.write_all(b"\n")
}

/// Render a matrix into a string (useful for tests and snapshots).
pub fn render_matrix(matrix: &RepeatMatrix, layout: OutputLayout) -> Result<String> {
    let mut buffer = Vec::new();
    write_matrix(&mut buffer, matrix, layout)?;
    String::from_utf8(buffer).map_err(|_| anyhow!("rendered matrix is not valid UTF-8"))
}
