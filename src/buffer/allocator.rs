//! Site buffer allocation

use bitvec::prelude::*;
use thiserror::Error;
use tracing::debug;

use super::BufferProfile;

/// Sites each buffer can hold before the first growth.
pub const DEFAULT_SITE_CAPACITY: usize = 1000;

/// Extra sites reserved on top of the requested minimum when growing.
pub const GROWTH_SLACK: usize = 10;

/// Storage for a replicate's site data could not be obtained.
#[derive(Debug, Error)]
#[error("cannot grow site buffers to {requested} sites for {individuals} haplotypes")]
pub struct AllocationError {
    /// Site capacity that was requested
    pub requested: usize,
    /// Number of haplotype buffers being grown
    pub individuals: usize,
}

/// Position and haplotype buffers shared by every replicate of a run
#[derive(Debug)]
pub struct SiteBuffers {
    /// Site positions of the current replicate
    positions: Vec<f64>,

    /// One allele vector per sampled individual, `true` = derived allele
    haplotypes: Vec<BitVec<u64, Lsb0>>,

    /// Guaranteed capacity of every buffer
    capacity: usize,

    profile: BufferProfile,
}

impl SiteBuffers {
    /// Create buffers for `nsam` individuals with room for `capacity` sites
    pub fn new(nsam: usize, capacity: usize) -> Result<Self, AllocationError> {
        let mut buffers = Self {
            positions: Vec::new(),
            haplotypes: (0..nsam).map(|_| BitVec::new()).collect(),
            capacity: 0,
            profile: BufferProfile {
                initial_capacity: capacity,
                peak_capacity: capacity,
                ..BufferProfile::default()
            },
        };
        buffers.reserve_to(capacity)?;
        Ok(buffers)
    }

    /// Make room for at least `min_sites` sites.
    ///
    /// When the current capacity is insufficient the buffers grow to
    /// `min_sites + GROWTH_SLACK`. Contents are not preserved across growth.
    pub fn ensure_capacity(&mut self, min_sites: usize) -> Result<(), AllocationError> {
        if min_sites <= self.capacity {
            return Ok(());
        }

        let target = min_sites
            .checked_add(GROWTH_SLACK)
            .ok_or(AllocationError {
                requested: min_sites,
                individuals: self.haplotypes.len(),
            })?;

        debug!(from = self.capacity, to = target, "growing site buffers");
        self.reserve_to(target)?;
        self.profile.growth_events += 1;
        self.profile.peak_capacity = self.profile.peak_capacity.max(target);
        Ok(())
    }

    fn reserve_to(&mut self, target: usize) -> Result<(), AllocationError> {
        let err = || AllocationError {
            requested: target,
            individuals: self.haplotypes.len(),
        };

        self.positions.clear();
        self.positions.try_reserve_exact(target).map_err(|_| err())?;

        if target > BitSlice::<u64, Lsb0>::MAX_BITS {
            return Err(err());
        }
        // BitVec has no fallible reserve; claim the backing words up front.
        let words = target.div_ceil(u64::BITS as usize);
        let mut grown = Vec::new();
        grown.try_reserve_exact(self.haplotypes.len()).map_err(|_| err())?;
        for _ in 0..self.haplotypes.len() {
            let mut backing: Vec<u64> = Vec::new();
            backing.try_reserve_exact(words).map_err(|_| err())?;
            grown.push(BitVec::from_vec(backing));
        }
        self.haplotypes = grown;

        self.capacity = target;
        Ok(())
    }

    /// Guaranteed site capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of haplotype buffers
    pub fn individuals(&self) -> usize {
        self.haplotypes.len()
    }

    /// Discard the previous replicate's contents.
    pub fn reset(&mut self) {
        self.positions.clear();
        for haplotype in &mut self.haplotypes {
            haplotype.clear();
        }
    }

    pub(crate) fn push_position(&mut self, position: f64) {
        self.positions.push(position);
    }

    pub(crate) fn haplotype_mut(&mut self, individual: usize) -> &mut BitVec<u64, Lsb0> {
        &mut self.haplotypes[individual]
    }

    pub(crate) fn record_sites(&mut self, sites: usize) {
        self.profile.max_sites_seen = self.profile.max_sites_seen.max(sites);
    }

    /// Site positions currently stored
    pub fn positions(&self) -> &[f64] {
        &self.positions
    }

    /// Haplotypes currently stored
    pub fn haplotypes(&self) -> &[BitVec<u64, Lsb0>] {
        &self.haplotypes
    }

    /// Growth history so far
    pub fn profile(&self) -> &BufferProfile {
        &self.profile
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_requested_capacity() {
        let buffers = SiteBuffers::new(4, DEFAULT_SITE_CAPACITY).unwrap();
        assert_eq!(buffers.capacity(), DEFAULT_SITE_CAPACITY);
        assert_eq!(buffers.individuals(), 4);
        assert!(!buffers.profile().grew());
    }

    #[test]
    fn grows_with_slack_when_insufficient() {
        let mut buffers = SiteBuffers::new(2, 8).unwrap();
        buffers.ensure_capacity(8).unwrap();
        assert_eq!(buffers.capacity(), 8);

        buffers.ensure_capacity(25).unwrap();
        assert_eq!(buffers.capacity(), 25 + GROWTH_SLACK);
        assert!(buffers.haplotypes().iter().all(|h| h.capacity() >= 35));
        assert!(buffers.positions.capacity() >= 35);
        assert_eq!(buffers.profile().growth_events, 1);
        assert_eq!(buffers.profile().peak_capacity, 35);
    }

    #[test]
    fn never_shrinks() {
        let mut buffers = SiteBuffers::new(1, 4).unwrap();
        buffers.ensure_capacity(100).unwrap();
        buffers.ensure_capacity(3).unwrap();
        assert_eq!(buffers.capacity(), 110);
        assert_eq!(buffers.profile().growth_events, 1);
    }

    #[test]
    fn unobtainable_storage_is_an_allocation_error() {
        let mut buffers = SiteBuffers::new(3, 4).unwrap();
        let huge = BitSlice::<u64, Lsb0>::MAX_BITS - GROWTH_SLACK;
        let err = buffers.ensure_capacity(huge).unwrap_err();
        assert_eq!(err.individuals, 3);
        assert_eq!(buffers.capacity(), 4);
        assert!(!buffers.profile().grew());

        buffers.ensure_capacity(100).unwrap();
        assert_eq!(buffers.individuals(), 3);
        assert!(buffers.haplotypes().iter().all(|h| h.is_empty() && h.capacity() >= 110));
    }

    #[test]
    fn impossible_growth_is_an_allocation_error() {
        let mut buffers = SiteBuffers::new(1, 4).unwrap();
        let err = buffers.ensure_capacity(usize::MAX).unwrap_err();
        assert_eq!(err.requested, usize::MAX);
        assert_eq!(buffers.capacity(), 4);
    }
}
