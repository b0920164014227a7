/// Best-fit log-likelihood of a candidate tree given an observed cell x mutation matrix.
use std::iter::Sum;
use std::ops::Add;

use log::{debug, trace};
use ndarray::ArrayView1;
use rayon::prelude::*;

use crate::error::{Result, ScoreError};
use crate::genotype::{GenotypeTable, MISSING, WILD_TYPE};
use crate::noise::{LogScoreTable, NoiseModel};

/// How cells are visited when scoring.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Execution {
    #[default]
    Sequential,
    /// Cells are scored on the rayon thread pool. Totals may differ from the
    /// sequential result by floating-point summation order.
    Parallel,
}

/// The node a cell attaches to and the log-likelihood of that attachment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellAttachment {
    pub node: usize,
    pub log_likelihood: f64,
}

/// Best attachment of every cell, in cell order.
#[derive(Clone, Debug, PartialEq)]
pub struct Attachments {
    pub cells: Vec<CellAttachment>,
}

impl Attachments {
    pub fn total(&self) -> f64 {
        self.cells.iter().map(|cell| cell.log_likelihood).sum()
    }

    /// Winning node index per cell.
    pub fn nodes(&self) -> Vec<usize> {
        self.cells.iter().map(|cell| cell.node).collect()
    }
}

/// Agreement between observed calls and the genotype of each cell's best node.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ErrorCounts {
    /// Observed 1, true 0.
    pub false_positives: usize,
    /// Observed 0, true 1.
    pub false_negatives: usize,
    pub true_positives: usize,
    pub true_negatives: usize,
    pub missing: usize,
}

impl ErrorCounts {
    fn record(&mut self, observed: i32, truth: i32) {
        match (observed, truth) {
            (MISSING, _) => self.missing += 1,
            (WILD_TYPE, WILD_TYPE) => self.true_negatives += 1,
            (WILD_TYPE, _) => self.false_negatives += 1,
            (_, WILD_TYPE) => self.false_positives += 1,
            _ => self.true_positives += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.false_positives
            + self.false_negatives
            + self.true_positives
            + self.true_negatives
            + self.missing
    }
}

impl Add for ErrorCounts {
    type Output = ErrorCounts;

    fn add(self, other: ErrorCounts) -> ErrorCounts {
        ErrorCounts {
            false_positives: self.false_positives + other.false_positives,
            false_negatives: self.false_negatives + other.false_negatives,
            true_positives: self.true_positives + other.true_positives,
            true_negatives: self.true_negatives + other.true_negatives,
            missing: self.missing + other.missing,
        }
    }
}

impl Sum for ErrorCounts {
    fn sum<I: Iterator<Item = ErrorCounts>>(iter: I) -> ErrorCounts {
        iter.fold(ErrorCounts::default(), Add::add)
    }
}

/// Scores candidate node sets against one observed matrix.
///
/// The observed matrix is validated and the log-likelihood table is built
/// once, so a search driver can evaluate many candidate trees cheaply.
#[derive(Clone, Debug)]
pub struct Scorer<'a> {
    observed: GenotypeTable<'a>,
    log_scores: LogScoreTable,
    execution: Execution,
}

impl<'a> Scorer<'a> {
    pub fn new(
        observed: &'a [i32],
        cells: usize,
        mutation_number: usize,
        noise: &NoiseModel,
    ) -> Result<Self> {
        let log_scores = LogScoreTable::build(noise, mutation_number)?;
        let observed = GenotypeTable::observed(observed, cells, mutation_number)?;
        debug!(
            "Scorer ready: {} cells, {} mutations, {} alpha, beta={}",
            cells,
            mutation_number,
            if noise.is_uniform() { "uniform" } else { "per-site" },
            noise.beta()
        );
        Ok(Scorer {
            observed,
            log_scores,
            execution: Execution::default(),
        })
    }

    pub fn with_execution(mut self, execution: Execution) -> Self {
        self.execution = execution;
        self
    }

    pub fn execution(&self) -> Execution {
        self.execution
    }

    pub fn cells(&self) -> usize {
        self.observed.rows()
    }

    pub fn mutation_number(&self) -> usize {
        self.observed.mutation_number()
    }

    pub fn log_scores(&self) -> &LogScoreTable {
        &self.log_scores
    }

    /// Sum over cells of the best log-likelihood across candidate nodes.
    ///
    /// `candidates` is a flattened `nodes_length x mutation_number` table of
    /// 0/1 genotypes. An empty candidate set is an error.
    pub fn score(&self, candidates: &[i32], nodes_length: usize) -> Result<f64> {
        let nodes = self.candidates(candidates, nodes_length)?;
        let total = self.sum_cells(|cell| self.best_attachment(cell, &nodes).log_likelihood);
        trace!(
            "Scored {} nodes over {} cells ({:?}): {:.4}",
            nodes_length,
            self.cells(),
            self.execution,
            total
        );
        Ok(total)
    }

    /// Best node and its log-likelihood for every cell.
    /// Ties go to the lowest node index.
    pub fn attachments(&self, candidates: &[i32], nodes_length: usize) -> Result<Attachments> {
        let nodes = self.candidates(candidates, nodes_length)?;
        let cells = match self.execution {
            Execution::Sequential => (0..self.cells())
                .map(|cell| self.best_attachment(cell, &nodes))
                .collect(),
            Execution::Parallel => (0..self.cells())
                .into_par_iter()
                .map(|cell| self.best_attachment(cell, &nodes))
                .collect(),
        };
        Ok(Attachments { cells })
    }

    /// Count false/true positives/negatives and missing calls of every cell
    /// against the genotype of its best node.
    pub fn error_counts(&self, candidates: &[i32], nodes_length: usize) -> Result<ErrorCounts> {
        let nodes = self.candidates(candidates, nodes_length)?;
        Ok(self.sum_cells(|cell| {
            let best = self.best_attachment(cell, &nodes);
            let mut counts = ErrorCounts::default();
            for (&observed, &truth) in self.observed.row(cell).iter().zip(nodes.row(best.node)) {
                counts.record(observed, truth);
            }
            counts
        }))
    }

    fn candidates<'c>(&self, values: &'c [i32], nodes_length: usize) -> Result<GenotypeTable<'c>> {
        if nodes_length == 0 {
            return Err(ScoreError::EmptyCandidateSet);
        }
        GenotypeTable::nodes(values, nodes_length, self.mutation_number())
    }

    fn sum_cells<T, F>(&self, per_cell: F) -> T
    where
        T: Send + Sum<T>,
        F: Fn(usize) -> T + Sync + Send,
    {
        match self.execution {
            Execution::Sequential => (0..self.cells()).map(per_cell).sum(),
            Execution::Parallel => (0..self.cells()).into_par_iter().map(per_cell).sum(),
        }
    }

    fn best_attachment(&self, cell: usize, nodes: &GenotypeTable<'_>) -> CellAttachment {
        let observed = self.observed.row(cell);
        let mut best = CellAttachment {
            node: 0,
            log_likelihood: f64::NEG_INFINITY,
        };
        for (node, genotype) in nodes.iter_rows().enumerate() {
            let log_likelihood = self.node_log_likelihood(observed, genotype);
            if log_likelihood > best.log_likelihood {
                best = CellAttachment {
                    node,
                    log_likelihood,
                };
            }
        }
        best
    }

    fn node_log_likelihood(
        &self,
        observed: ArrayView1<'_, i32>,
        genotype: ArrayView1<'_, i32>,
    ) -> f64 {
        // codes were validated when the tables were built
        observed
            .iter()
            .zip(genotype.iter())
            .zip(self.log_scores.sites())
            .map(|((&obs, &truth), site)| site[obs as usize][truth as usize])
            .sum()
    }
}

/// Score one candidate node set in a single call.
///
/// `alpha` holds one shared false-positive rate or one rate per site;
/// `beta` is the shared false-negative rate. Both tables are flattened
/// row-major with `mutation_number` columns.
pub fn greedy_tree_loglikelihood(
    observed: &[i32],
    node_genotypes: &[i32],
    cells: usize,
    nodes_length: usize,
    mutation_number: usize,
    alpha: &[f64],
    beta: f64,
) -> Result<f64> {
    if nodes_length == 0 {
        return Err(ScoreError::EmptyCandidateSet);
    }
    let noise = NoiseModel::per_site(alpha, beta)?;
    Scorer::new(observed, cells, mutation_number, &noise)?.score(node_genotypes, nodes_length)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn two_site_scorer(observed: &[i32], cells: usize) -> Scorer<'_> {
        let noise = NoiseModel::uniform(0.01, 0.2).unwrap();
        Scorer::new(observed, cells, 2, &noise).unwrap()
    }

    #[test]
    fn test_single_cell_example() {
        let observed = [0, 1];
        let candidates = [0, 0, 0, 1];
        let score =
            greedy_tree_loglikelihood(&observed, &candidates, 1, 2, 2, &[0.01], 0.2).unwrap();
        assert_relative_eq!(score, 0.8f64.ln() + 0.99f64.ln(), epsilon = 1e-12);
        assert_relative_eq!(score, -0.2333, epsilon = 1e-3);
    }

    #[test]
    fn test_attachment_picks_best_node() {
        let observed = [0, 1, 1, 1];
        let scorer = two_site_scorer(&observed, 2);
        let candidates = [0, 0, 0, 1, 1, 1];
        let attachments = scorer.attachments(&candidates, 3).unwrap();
        assert_eq!(attachments.nodes(), vec![1, 2]);
        assert_relative_eq!(
            attachments.total(),
            scorer.score(&candidates, 3).unwrap(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_tie_goes_to_first_node() {
        let observed = [2, 2];
        let scorer = two_site_scorer(&observed, 1);
        let attachments = scorer.attachments(&[0, 0, 1, 1], 2).unwrap();
        assert_eq!(attachments.cells[0].node, 0);
        assert_eq!(attachments.cells[0].log_likelihood, 0.0);
    }

    #[test]
    fn test_error_counts() {
        // cell 0 attaches to [0,1]; cell 1 attaches to [1,1]
        let observed = [0, 1, 1, 2];
        let scorer = two_site_scorer(&observed, 2);
        let counts = scorer.error_counts(&[0, 1, 1, 1], 2).unwrap();
        assert_eq!(
            counts,
            ErrorCounts {
                false_positives: 0,
                false_negatives: 0,
                true_positives: 2,
                true_negatives: 1,
                missing: 1,
            }
        );

        let counts = scorer.error_counts(&[0, 0], 1).unwrap();
        assert_eq!(counts.false_positives, 2);
        assert_eq!(counts.true_negatives, 1);
        assert_eq!(counts.missing, 1);
        assert_eq!(counts.total(), 4);
    }

    #[test]
    fn test_empty_candidate_set() {
        let observed = [0, 1];
        let scorer = two_site_scorer(&observed, 1);
        assert!(matches!(scorer.score(&[], 0), Err(ScoreError::EmptyCandidateSet)));
        assert!(matches!(
            greedy_tree_loglikelihood(&observed, &[], 1, 0, 2, &[0.01], 0.2),
            Err(ScoreError::EmptyCandidateSet)
        ));
    }

    #[test]
    fn test_no_cells_scores_zero() {
        let scorer = two_site_scorer(&[], 0);
        assert_eq!(scorer.score(&[0, 1], 1).unwrap(), 0.0);
    }

    #[test]
    fn test_no_sites_scores_zero() {
        let noise = NoiseModel::uniform(0.1, 0.1).unwrap();
        let scorer = Scorer::new(&[], 3, 0, &noise).unwrap();
        assert_eq!(scorer.score(&[], 2).unwrap(), 0.0);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let observed = [0, 1, 2, 1, 1, 0, 0, 0, 2, 1, 0, 1];
        let noise = NoiseModel::per_site(&[0.05, 0.1, 0.2], 0.3).unwrap();
        let sequential = Scorer::new(&observed, 4, 3, &noise).unwrap();
        let parallel = sequential.clone().with_execution(Execution::Parallel);
        let candidates = [0, 0, 0, 1, 0, 0, 1, 1, 0, 1, 1, 1];
        assert_relative_eq!(
            sequential.score(&candidates, 4).unwrap(),
            parallel.score(&candidates, 4).unwrap(),
            max_relative = 1e-12
        );
        assert_eq!(
            sequential.attachments(&candidates, 4).unwrap(),
            parallel.attachments(&candidates, 4).unwrap()
        );
        assert_eq!(
            sequential.error_counts(&candidates, 4).unwrap(),
            parallel.error_counts(&candidates, 4).unwrap()
        );
    }
}
