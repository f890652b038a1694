use bitvec::prelude::*;

/// Alleles of one sampled individual, `true` marking the derived allele.
pub type Haplotype = BitVec<u64, Lsb0>;

/// Run-level parameters taken from the first line of `ms` output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationHeader {
    /// Program token the header line starts with (usually `ms`).
    pub program: String,
    /// Number of sampled chromosomes per replicate.
    pub nsam: usize,
    /// Number of replicates the simulator was asked to produce.
    pub ms_datasets: usize,
}

impl SimulationHeader {
    /// Construct a header directly.
    pub fn new(program: impl Into<String>, nsam: usize, ms_datasets: usize) -> Self {
        Self {
            program: program.into(),
            nsam,
            ms_datasets,
        }
    }
}

/// One parsed replicate, borrowed from the run's site buffers.
///
/// Valid until the buffers are handed to the parser again.
#[derive(Debug, Clone, Copy)]
pub struct Replicate<'a> {
    positions: &'a [f64],
    haplotypes: &'a [Haplotype],
}

impl<'a> Replicate<'a> {
    /// Wrap positions and haplotypes that already agree in length.
    ///
    /// # Panics
    /// Panics if any haplotype length differs from the number of positions.
    pub fn new(positions: &'a [f64], haplotypes: &'a [Haplotype]) -> Self {
        let segsites = positions.len();
        assert!(
            haplotypes.iter().all(|h| h.len() == segsites),
            "every haplotype must span exactly {} sites",
            segsites
        );
        Self {
            positions,
            haplotypes,
        }
    }

    /// Number of segregating sites.
    pub fn segsites(&self) -> usize {
        self.positions.len()
    }

    /// Number of sampled individuals.
    pub fn nsam(&self) -> usize {
        self.haplotypes.len()
    }

    /// Site positions in input order.
    pub fn positions(&self) -> &'a [f64] {
        self.positions
    }

    /// Haplotype of one individual.
    pub fn haplotype(&self, individual: usize) -> &'a BitSlice<u64, Lsb0> {
        &self.haplotypes[individual]
    }

    /// Whether `individual` carries the derived allele at `site`.
    pub fn carries(&self, individual: usize, site: usize) -> bool {
        self.haplotypes[individual][site]
    }

    /// Number of individuals carrying the derived allele at `site`.
    pub fn carriers(&self, site: usize) -> usize {
        self.haplotypes.iter().filter(|h| h[site]).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carriership_follows_bits() {
        let haplotypes = vec![bitvec![u64, Lsb0; 1, 0], bitvec![u64, Lsb0; 1, 1]];
        let positions = [0.25, 0.75];
        let replicate = Replicate::new(&positions, &haplotypes);

        assert_eq!(replicate.segsites(), 2);
        assert_eq!(replicate.nsam(), 2);
        assert!(replicate.carries(0, 0));
        assert!(!replicate.carries(0, 1));
        assert_eq!(replicate.carriers(0), 2);
        assert_eq!(replicate.carriers(1), 1);
    }

    #[test]
    #[should_panic(expected = "exactly 2 sites")]
    fn rejects_ragged_haplotypes() {
        let haplotypes = vec![bitvec![u64, Lsb0; 1]];
        let positions = [0.1, 0.2];
        let _ = Replicate::new(&positions, &haplotypes);
    }
}
