//! Growable site storage
//!
//! Holds site positions and per-individual haplotypes for the replicate
//! currently being parsed. Capacity only ever grows.

mod allocator;

pub use allocator::{AllocationError, SiteBuffers, DEFAULT_SITE_CAPACITY, GROWTH_SLACK};

/// Growth history of a [`SiteBuffers`] instance
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BufferProfile {
    /// Capacity the buffers started with
    pub initial_capacity: usize,

    /// Largest capacity reached
    pub peak_capacity: usize,

    /// Number of times storage was grown
    pub growth_events: usize,

    /// Largest site count stored in a single replicate
    pub max_sites_seen: usize,
}

impl BufferProfile {
    /// Whether the buffers ever had to grow
    pub fn grew(&self) -> bool {
        self.growth_events > 0
    }

    /// Generate report
    pub fn report(&self) -> String {
        format!(
            "Site capacity: {} -> {} ({} growth events)\nLargest replicate: {} sites",
            self.initial_capacity, self.peak_capacity, self.growth_events, self.max_sites_seen
        )
    }
}
