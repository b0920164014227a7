//! Best-fit log-likelihood of single-cell mutation data under a candidate mutation tree.
//!
//! Each cell is attached to the candidate node whose genotype best explains its
//! observed calls; the tree score is the sum of those per-cell log-likelihoods.
//! A greedy tree search calls this repeatedly to compare candidate trees.
//!
//! ```
//! use greedylh::{greedy_tree_loglikelihood, NoiseModel, Scorer};
//!
//! // one cell, two sites; candidate nodes [0,0] and [0,1]
//! let observed = [0, 1];
//! let nodes = [0, 0, 0, 1];
//! let score = greedy_tree_loglikelihood(&observed, &nodes, 1, 2, 2, &[0.01], 0.2).unwrap();
//! assert!((score - (0.8f64.ln() + 0.99f64.ln())).abs() < 1e-12);
//!
//! let noise = NoiseModel::uniform(0.01, 0.2).unwrap();
//! let scorer = Scorer::new(&observed, 1, 2, &noise).unwrap();
//! assert_eq!(scorer.attachments(&nodes, 2).unwrap().nodes(), vec![1]);
//! ```

pub mod config;
pub mod error;
pub mod genotype;
pub mod noise;
pub mod score;

pub use config::{AlphaSpec, ScorerConfig};
pub use error::{Result, ScoreError};
pub use genotype::{GenotypeTable, MISSING, MUTANT, WILD_TYPE};
pub use noise::{LogScoreTable, NoiseModel};
pub use score::{
    greedy_tree_loglikelihood, Attachments, CellAttachment, ErrorCounts, Execution, Scorer,
};
