use thiserror::Error;

/// Allowed distance of the theta sum from 1.
pub const THETA_TOLERANCE: f64 = 1e-14;

/// Invalid run configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ArgumentError {
    /// A flag was given without its value.
    #[error("no value following -{flag} flag")]
    MissingValue {
        /// Flag letter
        flag: char,
    },
    /// A flag value could not be parsed.
    #[error("invalid value '{value}' for -{flag} flag")]
    InvalidValue {
        /// Flag letter
        flag: char,
        /// Offending text
        value: String,
    },
    /// Locus count below one.
    #[error("number of linked loci must be at least 1, got {0}")]
    InvalidLocusCount(i64),
    /// Fewer theta proportions than loci.
    #[error("only {found} thetas for {expected} STRs")]
    MissingThetas {
        /// Loci requested
        expected: usize,
        /// Proportions supplied
        found: usize,
    },
    /// A theta proportion is negative or not finite.
    #[error("theta proportion {value} for locus {locus} must be a non-negative number")]
    InvalidTheta {
        /// 0-based locus index
        locus: usize,
        /// Offending weight
        value: f64,
    },
    /// Proportions do not sum to 1.
    #[error("sum of thetas (= {0}) is not 1")]
    ThetaSum(f64),
    /// Command-line syntax error (unknown option and the like).
    #[error("{0}")]
    Usage(String),
}

/// Number of linked loci and the share of mutations each receives.
#[derive(Debug, Clone, PartialEq)]
pub struct LocusConfig {
    thetas: Vec<f64>,
}

impl LocusConfig {
    /// A single locus receiving every mutation.
    pub fn single() -> Self {
        Self { thetas: vec![1.0] }
    }

    /// Validate theta proportions for `thetas.len()` linked loci.
    pub fn new(thetas: Vec<f64>) -> Result<Self, ArgumentError> {
        if thetas.is_empty() {
            return Err(ArgumentError::InvalidLocusCount(0));
        }

        for (locus, &value) in thetas.iter().enumerate() {
            if !value.is_finite() || value < 0.0 {
                return Err(ArgumentError::InvalidTheta { locus, value });
            }
        }

        let sum: f64 = thetas.iter().sum();
        if (1.0 - sum).abs() > THETA_TOLERANCE {
            return Err(ArgumentError::ThetaSum(sum));
        }

        Ok(Self { thetas })
    }

    /// Build from a `-l` style request: a locus count followed by proportions.
    ///
    /// A single locus needs no proportions. Proportions beyond the locus count
    /// are ignored.
    pub fn from_request(linked_n: i64, thetas: &[f64]) -> Result<Self, ArgumentError> {
        if linked_n < 1 {
            return Err(ArgumentError::InvalidLocusCount(linked_n));
        }
        let linked_n = linked_n as usize;
        if linked_n == 1 {
            return Ok(Self::single());
        }
        if thetas.len() < linked_n {
            return Err(ArgumentError::MissingThetas {
                expected: linked_n,
                found: thetas.len(),
            });
        }
        Self::new(thetas[..linked_n].to_vec())
    }

    /// Number of linked loci.
    pub fn linked_n(&self) -> usize {
        self.thetas.len()
    }

    /// Theta proportions in locus order.
    pub fn thetas(&self) -> &[f64] {
        &self.thetas
    }

    /// Locus receiving a mutation for uniform draw `r`.
    ///
    /// Smallest `j` whose cumulative proportion reaches `r`. If rounding
    /// leaves `r` above the total, locus 0 receives the mutation.
    pub fn locus_for(&self, r: f64) -> usize {
        let mut cumulative = 0.0;
        for (locus, theta) in self.thetas.iter().enumerate() {
            cumulative += theta;
            if r <= cumulative {
                return locus;
            }
        }
        0
    }
}

impl Default for LocusConfig {
    fn default() -> Self {
        Self::single()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(&[0.4, 0.6] ; "two loci")]
    #[test_case(&[0.25, 0.25, 0.5] ; "three loci")]
    #[test_case(&[0.5, 0.49999999999999] ; "within tolerance")]
    #[test_case(&[0.0, 1.0] ; "zero weight locus")]
    fn accepts_valid_thetas(thetas: &[f64]) {
        let config = LocusConfig::new(thetas.to_vec()).unwrap();
        assert_eq!(config.linked_n(), thetas.len());
    }

    #[test_case(&[0.4, 0.5] ; "sum too small")]
    #[test_case(&[0.6, 0.6] ; "sum too large")]
    #[test_case(&[0.5, 0.4999999999999] ; "just outside tolerance")]
    fn rejects_bad_sums(thetas: &[f64]) {
        assert!(matches!(
            LocusConfig::new(thetas.to_vec()),
            Err(ArgumentError::ThetaSum(_))
        ));
    }

    #[test]
    fn rejects_negative_and_nan_weights() {
        assert_eq!(
            LocusConfig::new(vec![1.5, -0.5]),
            Err(ArgumentError::InvalidTheta {
                locus: 1,
                value: -0.5
            })
        );
        assert!(matches!(
            LocusConfig::new(vec![f64::NAN, 1.0]),
            Err(ArgumentError::InvalidTheta { locus: 0, .. })
        ));
    }

    #[test]
    fn single_locus_request_ignores_thetas() {
        assert_eq!(LocusConfig::from_request(1, &[]).unwrap(), LocusConfig::single());
        assert_eq!(LocusConfig::from_request(1, &[0.3]).unwrap().thetas(), &[1.0]);
    }

    #[test]
    fn request_validation() {
        assert_eq!(
            LocusConfig::from_request(0, &[]),
            Err(ArgumentError::InvalidLocusCount(0))
        );
        assert_eq!(
            LocusConfig::from_request(3, &[0.5, 0.5]),
            Err(ArgumentError::MissingThetas {
                expected: 3,
                found: 2
            })
        );
        let config = LocusConfig::from_request(2, &[0.3, 0.7, 0.9]).unwrap();
        assert_eq!(config.thetas(), &[0.3, 0.7]);
    }

    #[test]
    fn locus_selection_uses_cumulative_boundaries() {
        let config = LocusConfig::new(vec![0.25, 0.25, 0.5]).unwrap();
        assert_eq!(config.locus_for(0.0), 0);
        assert_eq!(config.locus_for(0.25), 0);
        assert_eq!(config.locus_for(0.2500001), 1);
        assert_eq!(config.locus_for(0.5), 1);
        assert_eq!(config.locus_for(0.75), 2);
        assert_eq!(config.locus_for(0.999999), 2);
    }

    #[test]
    fn overshoot_falls_back_to_first_locus() {
        let config = LocusConfig::new(vec![0.5, 0.49999999999999]).unwrap();
        assert_eq!(config.locus_for(1.0 - f64::EPSILON / 2.0), 0);

        let trailing_zero = LocusConfig::new(vec![0.5, 0.49999999999999, 0.0]).unwrap();
        assert_eq!(trailing_zero.locus_for(0.999999999999999), 0);
    }
}
