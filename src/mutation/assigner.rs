use super::{LocusConfig, UniformSource};

/// Outcome of one mutation event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiteAssignment {
    /// Locus receiving the mutation.
    pub locus: usize,
    /// Repeat-unit change, `-1` or `+1`.
    pub step: i64,
}

/// Draws a direction and a target locus for each segregating site.
///
/// Per site the direction is drawn first, then the locus when there is more
/// than one. Single-locus runs never draw a locus.
#[derive(Debug)]
pub struct MutationAssigner<'a, S> {
    loci: &'a LocusConfig,
    source: S,
}

impl<'a, S: UniformSource> MutationAssigner<'a, S> {
    /// Create an assigner over the configured loci.
    pub fn new(loci: &'a LocusConfig, source: S) -> Self {
        Self { loci, source }
    }

    /// Assign one site.
    pub fn assign(&mut self) -> SiteAssignment {
        let step = if self.source.next_uniform() < 0.5 { -1 } else { 1 };
        let locus = if self.loci.linked_n() == 1 {
            0
        } else {
            self.loci.locus_for(self.source.next_uniform())
        };
        SiteAssignment { locus, step }
    }

    /// Assign `segsites` sites in site order, reusing `out`.
    pub fn assign_sites(&mut self, segsites: usize, out: &mut Vec<SiteAssignment>) {
        out.clear();
        out.extend((0..segsites).map(|_| self.assign()));
    }

    /// Return the random source.
    pub fn into_source(self) -> S {
        self.source
    }
}
