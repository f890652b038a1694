//! Reader for `ms` coalescent simulator output.
//!
//! The stream starts with a two-line header (command line, seed line) and is
//! followed by one record per replicate:
//!
//! ```text
//! //
//! segsites: 3
//! positions: 0.1012 0.4410 0.9175
//! 010
//! 110
//! ```
//!
//! Some `ms` modes print a `prob: <p>` line before the positions; it is
//! skipped.

mod parser;
mod tokenizer;
mod types;

pub use parser::{MalformedRecordError, ParseError, ParseStage, RecordParser};
pub use tokenizer::MsTokenizer;
pub use types::{Haplotype, Replicate, SimulationHeader};
