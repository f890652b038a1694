//! Single-step mutation model for fully linked STR loci.
//!
//! Every segregating site of a replicate is one mutation event on the shared
//! genealogy. Each event gets a direction (+1 or -1 repeat unit) and a target
//! locus drawn from the theta proportions, then is added to every individual
//! carrying the derived allele.

mod accumulator;
mod assigner;
mod locus;
mod source;

pub use accumulator::{accumulate, RepeatMatrix};
pub use assigner::{MutationAssigner, SiteAssignment};
pub use locus::{ArgumentError, LocusConfig, THETA_TOLERANCE};
pub use source::{RngSource, UniformSource};
