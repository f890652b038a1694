use super::SiteAssignment;
use crate::ms::Replicate;

/// Repeat counts for every (individual, locus) pair of one replicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepeatMatrix {
    nsam: usize,
    linked_n: usize,
    /// Row-major by individual.
    cells: Vec<i64>,
}

impl RepeatMatrix {
    /// Matrix with every cell at `ancestral_state`.
    pub fn new(nsam: usize, linked_n: usize, ancestral_state: i64) -> Self {
        Self {
            nsam,
            linked_n,
            cells: vec![ancestral_state; nsam * linked_n],
        }
    }

    /// Build from explicit rows, one per individual.
    ///
    /// # Panics
    /// Panics if the rows differ in length.
    pub fn from_rows(rows: &[Vec<i64>]) -> Self {
        let linked_n = rows.first().map_or(0, Vec::len);
        assert!(
            rows.iter().all(|row| row.len() == linked_n),
            "every row must hold {} loci",
            linked_n
        );
        Self {
            nsam: rows.len(),
            linked_n,
            cells: rows.concat(),
        }
    }

    /// Number of individuals.
    pub fn nsam(&self) -> usize {
        self.nsam
    }

    /// Number of loci.
    pub fn linked_n(&self) -> usize {
        self.linked_n
    }

    /// Repeat count of `individual` at `locus`.
    pub fn get(&self, individual: usize, locus: usize) -> i64 {
        self.cells[self.index(individual, locus)]
    }

    /// Repeat counts of one individual across loci.
    pub fn individual(&self, individual: usize) -> &[i64] {
        let start = individual * self.linked_n;
        &self.cells[start..start + self.linked_n]
    }

    /// Repeat counts at one locus across individuals.
    pub fn locus(&self, locus: usize) -> impl Iterator<Item = i64> + '_ {
        (0..self.nsam).map(move |individual| self.get(individual, locus))
    }

    fn add(&mut self, individual: usize, locus: usize, step: i64) {
        let idx = self.index(individual, locus);
        self.cells[idx] += step;
    }

    fn index(&self, individual: usize, locus: usize) -> usize {
        debug_assert!(individual < self.nsam && locus < self.linked_n);
        individual * self.linked_n + locus
    }
}

/// Fold site assignments into repeat counts.
///
/// Each individual carrying the derived allele at site `i` gains
/// `assignments[i].step` at `assignments[i].locus`.
///
/// # Panics
/// Panics if `assignments` does not cover every site, or names a locus
/// outside `linked_n`.
pub fn accumulate(
    replicate: &Replicate<'_>,
    assignments: &[SiteAssignment],
    linked_n: usize,
    ancestral_state: i64,
) -> RepeatMatrix {
    assert_eq!(
        assignments.len(),
        replicate.segsites(),
        "one assignment per segregating site"
    );

    let mut matrix = RepeatMatrix::new(replicate.nsam(), linked_n, ancestral_state);
    for individual in 0..replicate.nsam() {
        for site in replicate.haplotype(individual).iter_ones() {
            let SiteAssignment { locus, step } = assignments[site];
            assert!(locus < linked_n, "locus {} out of range", locus);
            matrix.add(individual, locus, step);
        }
    }
    matrix
}
