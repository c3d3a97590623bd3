//! Monte Carlo Tree Search advisor.
//!
//! ## Overview
//!
//! Given a state in which the opponent's hand and both deck orders are
//! hidden, the search ranks the legal actions of the player who decides
//! next. Key features:
//!
//! - **Determinization**: each iteration redeals hidden zones while
//!   keeping the deck-wide trigger/heal/sentinel totals
//! - **Two sub-scores**: own vanguard grade and opponent damage, blended
//!   with configurable weights
//! - **Guard-aware rollouts**: rollouts guard like a cautious player
//!   instead of at random
//! - **Tree reuse**: [`MCTSSearch::advance`] keeps the subtree of the
//!   action actually played
//! - **Serializable**: Tree and config can be saved/loaded
//!
//! ## Usage
//!
//! ```rust
//! use std::time::Duration;
//!
//! use vanguard_sim::games::trial::TrialMatchBuilder;
//! use vanguard_sim::mcts::{MCTSConfig, MCTSSearch};
//!
//! let (engine, state) = TrialMatchBuilder::new().build(7).unwrap();
//! let config = MCTSConfig::default()
//!     .with_max_iterations(50)
//!     .with_time_budget(Duration::from_secs(5));
//! let mut search = MCTSSearch::new(engine, config);
//!
//! let ranked = search.search(&state);
//! let best = &ranked[0];
//! assert!(best.visits > 0);
//!
//! // After the action is played, keep the work under it.
//! search.advance(&best.action);
//! ```

pub mod config;
pub mod determinize;
pub mod node;
pub mod policy;
pub mod search;
pub mod stats;
pub mod tree;

// Re-export main types
pub use config::MCTSConfig;
pub use determinize::{CardCategory, CategoryCounts, Determinizer};
pub use node::{MCTSNode, NodeId, Scores};
pub use policy::{evaluate, GuardHeuristicRollout, RandomSimulation, SelectionPolicy, SimulationPolicy, UCT};
pub use search::{MCTSSearch, RankedAction};
pub use stats::SearchStats;
pub use tree::{MCTSTree, TreeStats};
