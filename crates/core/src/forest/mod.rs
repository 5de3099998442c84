//! Random-forest regression model
//!
//! A forest is a bag of regression trees whose outputs are averaged. Trees are
//! grown by the trainer crate; this module only holds the fitted structure and
//! evaluates it.
//!
//! # Usage
//!
//! ```rust
//! use rumah_core::forest::{ForestParams, Node, RandomForest, RegressionTree};
//!
//! let tree = RegressionTree::new(vec![
//!     Node::split(0, 50.0, 1, 2),
//!     Node::leaf(10.0),
//!     Node::leaf(20.0),
//! ]);
//! let forest = RandomForest::new(vec![tree], ForestParams::default(), 1);
//!
//! assert_eq!(forest.predict(&[30.0]).unwrap(), 10.0);
//! assert_eq!(forest.predict(&[60.0]).unwrap(), 20.0);
//! ```

pub mod model;
pub mod params;
pub mod tree;

pub use model::RandomForest;
pub use params::{ForestParams, MaxFeatures};
pub use tree::{Node, RegressionTree};
