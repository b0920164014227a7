/// Sequencing noise model and the log-likelihood table derived from it.
use crate::error::{Result, ScoreError};
use crate::genotype::{MISSING, MUTANT, WILD_TYPE};

/// Log-likelihoods for one site, indexed `[observed][true]`.
/// The `MISSING` row is all zeros.
pub type SiteLogScores = [[f64; 2]; 3];

/// Error rates of the single-cell genotype calls.
///
/// `alpha` holds either one rate shared by every site or one rate per site;
/// `beta` is shared by every site.
#[derive(Clone, Debug, PartialEq)]
pub struct NoiseModel {
    alpha: Vec<f64>,
    beta: f64,
}

fn check_rate(parameter: &'static str, value: f64) -> Result<()> {
    // NaN fails both comparisons
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(ScoreError::DomainError { parameter, value })
    }
}

impl NoiseModel {
    pub fn new(alpha: Vec<f64>, beta: f64) -> Result<Self> {
        check_rate("beta", beta)?;
        for &rate in &alpha {
            check_rate("alpha", rate)?;
        }
        Ok(NoiseModel { alpha, beta })
    }

    /// Same alpha at every site.
    pub fn uniform(alpha: f64, beta: f64) -> Result<Self> {
        Self::new(vec![alpha], beta)
    }

    /// One alpha per site.
    pub fn per_site(alpha: &[f64], beta: f64) -> Result<Self> {
        Self::new(alpha.to_vec(), beta)
    }

    pub fn alpha(&self) -> &[f64] {
        &self.alpha
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    /// Alpha at `site`, broadcasting a single shared rate.
    pub fn alpha_at(&self, site: usize) -> Option<f64> {
        match self.alpha.as_slice() {
            [shared] => Some(*shared),
            rates => rates.get(site).copied(),
        }
    }

    /// True when every site uses the same alpha.
    pub fn is_uniform(&self) -> bool {
        self.alpha.windows(2).all(|pair| pair[0] == pair[1])
    }
}

/// Per-site log-likelihoods of an observed call given the true genotype.
///
/// Built once per scorer so the hot loop does table lookups only.
#[derive(Clone, Debug, PartialEq)]
pub struct LogScoreTable {
    sites: Vec<SiteLogScores>,
}

impl LogScoreTable {
    /// Precompute the table for `mutation_number` sites.
    ///
    /// Fails with `DimensionMismatch` when the model carries per-site rates
    /// for a different number of sites.
    pub fn build(noise: &NoiseModel, mutation_number: usize) -> Result<Self> {
        let rates = noise.alpha.len();
        if rates != 1 && rates != mutation_number {
            return Err(ScoreError::DimensionMismatch {
                what: "alpha",
                expected: mutation_number,
                found: rates,
            });
        }

        // Observed 0, true 0: P(obs=0 | true=0) = 1 - beta
        let like_00 = (1.0 - noise.beta).ln();
        // Observed 1, true 0: P(obs=1 | true=0) = beta
        let like_10 = noise.beta.ln();

        let sites = (0..mutation_number)
            .map(|site| {
                let alpha = noise.alpha_at(site).ok_or(ScoreError::DimensionMismatch {
                    what: "alpha",
                    expected: mutation_number,
                    found: rates,
                })?;
                let mut scores = [[0.0; 2]; 3];
                scores[WILD_TYPE as usize][WILD_TYPE as usize] = like_00;
                scores[WILD_TYPE as usize][MUTANT as usize] = alpha.ln();
                scores[MUTANT as usize][WILD_TYPE as usize] = like_10;
                scores[MUTANT as usize][MUTANT as usize] = (1.0 - alpha).ln();
                Ok(scores)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(LogScoreTable { sites })
    }

    pub fn mutation_number(&self) -> usize {
        self.sites.len()
    }

    /// Contribution of one `(observed, true)` pair at `site`.
    ///
    /// `None` when `site` is out of range, `observed` is not 0, 1 or 2, or
    /// `truth` is not 0 or 1.
    pub fn get(&self, observed: i32, truth: i32, site: usize) -> Option<f64> {
        if !(WILD_TYPE..=MISSING).contains(&observed) || !(WILD_TYPE..=MUTANT).contains(&truth) {
            return None;
        }
        self.sites
            .get(site)
            .map(|scores| scores[observed as usize][truth as usize])
    }

    pub(crate) fn sites(&self) -> &[SiteLogScores] {
        &self.sites
    }
}
