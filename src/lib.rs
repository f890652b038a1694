//! # Linked microsatellites from coalescent simulations
//!
//! Turns `ms` output into repeat-length data for fully linked short tandem
//! repeat (STR) loci under the single-step mutation model.
//!
//! ## Pipeline
//!
//! For each replicate:
//! 1. **Parse**: read the `//` record (segsites, positions, haplotypes)
//! 2. **Assign**: give every segregating site a ±1 step and a target locus
//!    drawn from the theta proportions
//! 3. **Accumulate**: add each step to every individual carrying the derived allele
//! 4. **Emit**: write the individual × locus repeat counts
//!
//! ## Usage Example
//!
//! ```
//! use microsat::{ConversionConfig, Converter, LocusConfig, RngSource};
//!
//! let input = "ms 2 1 -t 1.0\n123 456 789\n\n//\nsegsites: 1\npositions: 0.5\n1\n0\n";
//! let config = ConversionConfig::default()
//!     .with_ancestral_state(20)
//!     .with_loci(LocusConfig::new(vec![0.5, 0.5]).unwrap());
//!
//! let mut out = Vec::new();
//! let summary = Converter::new(config)
//!     .run(input.as_bytes(), &mut out, RngSource::seeded(7))
//!     .unwrap();
//! assert_eq!(summary.replicates, 1);
//! ```

#![warn(missing_docs, missing_debug_implementations)]

/// Growable site storage
pub mod buffer;
/// `ms` output reader
pub mod ms;
/// Mutation assignment and repeat accumulation
pub mod mutation;
/// Output layouts
pub mod output;

pub use buffer::{AllocationError, BufferProfile, SiteBuffers};
pub use ms::{MalformedRecordError, ParseError, ParseStage, RecordParser, Replicate, SimulationHeader};
pub use mutation::{
    accumulate, ArgumentError, LocusConfig, MutationAssigner, RepeatMatrix, RngSource,
    SiteAssignment, UniformSource,
};
pub use output::{render_matrix, write_matrix, OutputLayout};

use std::io::{self, BufRead, Write};

use thiserror::Error;
use tracing::{debug, info, warn};

/// Settings for one conversion run
#[derive(Debug, Clone)]
pub struct ConversionConfig {
    /// Repeat count every individual starts from at every locus
    pub ancestral_state: i64,

    /// Linked loci and their theta proportions
    pub loci: LocusConfig,

    /// Output layout
    pub layout: OutputLayout,

    /// Sites the buffers hold before growing
    pub initial_capacity: usize,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            ancestral_state: 0,
            loci: LocusConfig::single(),
            layout: OutputLayout::Standard,
            initial_capacity: buffer::DEFAULT_SITE_CAPACITY,
        }
    }
}

impl ConversionConfig {
    /// Set the ancestral repeat count
    pub fn with_ancestral_state(mut self, ancestral_state: i64) -> Self {
        self.ancestral_state = ancestral_state;
        self
    }

    /// Set the linked loci
    pub fn with_loci(mut self, loci: LocusConfig) -> Self {
        self.loci = loci;
        self
    }

    /// Set the output layout
    pub fn with_layout(mut self, layout: OutputLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Set the initial site capacity
    pub fn with_initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }
}

/// What a run processed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionSummary {
    /// Header of the input stream
    pub header: SimulationHeader,

    /// Replicates converted
    pub replicates: usize,

    /// Segregating sites across all replicates
    pub total_segsites: usize,

    /// Site buffer growth over the run
    pub buffer_profile: BufferProfile,
}

impl ConversionSummary {
    /// Whether every replicate announced in the header was converted
    pub fn is_complete(&self) -> bool {
        self.replicates == self.header.ms_datasets
    }
}

/// Errors that abort a conversion run
#[derive(Error, Debug)]
pub enum MicrosatError {
    /// Invalid configuration
    #[error("argument error: {0}")]
    Argument(#[from] ArgumentError),

    /// Input did not follow the `ms` grammar
    #[error(transparent)]
    MalformedRecord(#[from] MalformedRecordError),

    /// Site buffers could not grow
    #[error("allocation error: {0}")]
    Allocation(#[from] AllocationError),

    /// Site buffers sized for a different sample
    #[error("buffer error: {0}")]
    Buffers(#[source] ParseError),

    /// Reading input failed
    #[error("input error: {0}")]
    Input(#[source] io::Error),

    /// Writing output failed
    #[error("output error: {0}")]
    Output(#[source] io::Error),
}

impl From<ParseError> for MicrosatError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::Malformed(inner) => Self::MalformedRecord(inner),
            ParseError::Allocation(inner) => Self::Allocation(inner),
            ParseError::Io(inner) => Self::Input(inner),
            mismatch @ ParseError::BufferMismatch { .. } => Self::Buffers(mismatch),
        }
    }
}

/// Drives parse, assign, accumulate and emit over a whole `ms` stream
#[derive(Debug, Clone)]
pub struct Converter {
    config: ConversionConfig,
}

impl Converter {
    /// Create converter
    pub fn new(config: ConversionConfig) -> Self {
        Self { config }
    }

    /// Configuration in use
    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    /// Convert every replicate of `input`, writing to `output`.
    ///
    /// Stops after the number of replicates the header announces, or earlier
    /// if the input ends cleanly between records.
    pub fn run<R, W, S>(
        &self,
        input: R,
        output: &mut W,
        source: S,
    ) -> Result<ConversionSummary, MicrosatError>
    where
        R: BufRead,
        W: Write,
        S: UniformSource,
    {
        let mut parser = RecordParser::new(input)?;
        let header = parser.header().clone();
        let linked_n = self.config.loci.linked_n();

        let mut buffers = SiteBuffers::new(header.nsam, self.config.initial_capacity)?;
        let mut assigner = MutationAssigner::new(&self.config.loci, source);
        let mut assignments = Vec::new();
        let mut total_segsites = 0;

        while parser.replicates_read() < header.ms_datasets {
            let Some(replicate) = parser.read_next_replicate(&mut buffers)? else {
                warn!(
                    expected = header.ms_datasets,
                    found = parser.replicates_read(),
                    "input ended before all replicates were read"
                );
                break;
            };

            assigner.assign_sites(replicate.segsites(), &mut assignments);
            let matrix = accumulate(
                &replicate,
                &assignments,
                linked_n,
                self.config.ancestral_state,
            );
            write_matrix(output, &matrix, self.config.layout).map_err(MicrosatError::Output)?;

            total_segsites += replicate.segsites();
            debug!(
                replicate = parser.replicates_read(),
                segsites = replicate.segsites(),
                "converted replicate"
            );
        }
        output.flush().map_err(MicrosatError::Output)?;

        let summary = ConversionSummary {
            replicates: parser.replicates_read(),
            header,
            total_segsites,
            buffer_profile: buffers.profile().clone(),
        };
        info!(
            replicates = summary.replicates,
            segsites = summary.total_segsites,
            loci = linked_n,
            "conversion finished"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_single_locus_standard() {
        let config = ConversionConfig::default();
        assert_eq!(config.ancestral_state, 0);
        assert_eq!(config.loci.linked_n(), 1);
        assert_eq!(config.layout, OutputLayout::Standard);
        assert_eq!(config.initial_capacity, 1000);
    }

    #[test]
    fn parse_errors_keep_their_kind() {
        let err: MicrosatError = ParseError::Io(io::Error::other("boom")).into();
        assert!(matches!(err, MicrosatError::Input(_)));

        let err: MicrosatError = ParseError::BufferMismatch {
            expected: 4,
            found: 2,
        }
        .into();
        assert!(matches!(err, MicrosatError::Buffers(_)));
    }

    #[test]
    fn stops_at_declared_replicate_count() {
        let input = "ms 1 1\nseed\n//\nsegsites: 0\n//\nsegsites: 0\n";
        let mut out = Vec::new();
        let summary = Converter::new(ConversionConfig::default())
            .run(input.as_bytes(), &mut out, RngSource::seeded(1))
            .unwrap();
        assert_eq!(summary.replicates, 1);
        assert!(summary.is_complete());
        assert_eq!(String::from_utf8(out).unwrap(), "0\n");
    }

    #[test]
    fn early_end_of_input_is_not_an_error() {
        let input = "ms 2 3\nseed\n\n//\nsegsites: 0\n";
        let mut out = Vec::new();
        let summary = Converter::new(ConversionConfig::default().with_ancestral_state(4))
            .run(input.as_bytes(), &mut out, RngSource::seeded(1))
            .unwrap();
        assert_eq!(summary.replicates, 1);
        assert!(!summary.is_complete());
        assert_eq!(String::from_utf8(out).unwrap(), "4\t4\n");
    }
}
