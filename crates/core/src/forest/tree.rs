//! Regression tree structure and traversal.

use serde::{Deserialize, Serialize};

/// A tree node. Node 0 of a tree is its root.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Node {
    /// Route `x[feature] <= threshold` to `left`, everything else to `right`.
    Split {
        feature: u32,
        threshold: f64,
        left: u32,
        right: u32,
    },
    /// Mean target of the training samples that reached this node.
    Leaf { value: f64 },
}

impl Node {
    pub fn split(feature: u32, threshold: f64, left: u32, right: u32) -> Self {
        Node::Split {
            feature,
            threshold,
            left,
            right,
        }
    }

    pub fn leaf(value: f64) -> Self {
        Node::Leaf { value }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }
}

/// A single regression tree stored as a flat node array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    pub nodes: Vec<Node>,
}

impl RegressionTree {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Evaluate this tree on a feature vector.
    ///
    /// Returns `None` if the traversal leaves the node array or reads a
    /// feature outside `features`.
    pub fn evaluate(&self, features: &[f64]) -> Option<f64> {
        let mut idx = 0usize;

        // A valid path visits each node at most once.
        for _ in 0..self.nodes.len() {
            match self.nodes.get(idx)? {
                Node::Leaf { value } => return Some(*value),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let value = *features.get(*feature as usize)?;
                    idx = if value <= *threshold {
                        *left as usize
                    } else {
                        *right as usize
                    };
                }
            }
        }

        None
    }

    /// Number of leaves.
    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_leaf()).count()
    }

    /// Longest root-to-leaf path, in edges.
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], idx: usize, remaining: usize) -> usize {
            if remaining == 0 {
                return 0;
            }
            match nodes.get(idx) {
                Some(Node::Split { left, right, .. }) => {
                    1 + walk(nodes, *left as usize, remaining - 1)
                        .max(walk(nodes, *right as usize, remaining - 1))
                }
                _ => 0,
            }
        }

        walk(&self.nodes, 0, self.nodes.len())
    }

    /// Validate tree structure against the expected feature count.
    pub fn validate(&self, feature_count: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }

        for (i, node) in self.nodes.iter().enumerate() {
            match *node {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    // Children are always appended after their parent.
                    if left as usize <= i || left as usize >= self.nodes.len() {
                        return Err(format!("node {i} has invalid left child: {left}"));
                    }
                    if right as usize <= i || right as usize >= self.nodes.len() {
                        return Err(format!("node {i} has invalid right child: {right}"));
                    }
                    if feature as usize >= feature_count {
                        return Err(format!("node {i} splits on unknown feature {feature}"));
                    }
                    if threshold.is_nan() {
                        return Err(format!("node {i} has a NaN threshold"));
                    }
                }
                Node::Leaf { value } => {
                    if !value.is_finite() {
                        return Err(format!("leaf {i} has non-finite value {value}"));
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump() -> RegressionTree {
        // if x[0] <= 50 then 100 else 200
        RegressionTree::new(vec![
            Node::split(0, 50.0, 1, 2),
            Node::leaf(100.0),
            Node::leaf(200.0),
        ])
    }

    #[test]
    fn test_tree_evaluation() {
        let tree = stump();
        assert_eq!(tree.evaluate(&[30.0]), Some(100.0));
        assert_eq!(tree.evaluate(&[50.0]), Some(100.0)); // equal goes left
        assert_eq!(tree.evaluate(&[60.0]), Some(200.0));
    }

    #[test]
    fn test_missing_feature_is_none() {
        let tree = RegressionTree::new(vec![
            Node::split(3, 1.0, 1, 2),
            Node::leaf(1.0),
            Node::leaf(2.0),
        ]);
        assert_eq!(tree.evaluate(&[0.0, 0.0]), None);
    }

    #[test]
    fn test_tree_validation() {
        assert!(stump().validate(1).is_ok());

        let dangling = RegressionTree::new(vec![
            Node::split(0, 50.0, 5, 2),
            Node::leaf(100.0),
            Node::leaf(200.0),
        ]);
        assert!(dangling.validate(1).is_err());

        let cyclic = RegressionTree::new(vec![
            Node::split(0, 50.0, 0, 1),
            Node::leaf(100.0),
        ]);
        assert!(cyclic.validate(1).is_err());

        assert!(stump().validate(0).is_err());
        assert!(RegressionTree::new(Vec::new()).validate(1).is_err());
    }

    #[test]
    fn test_shape() {
        let tree = RegressionTree::new(vec![
            Node::split(0, 5.0, 1, 2),
            Node::leaf(1.0),
            Node::split(1, 2.0, 3, 4),
            Node::leaf(2.0),
            Node::leaf(3.0),
        ]);
        assert_eq!(tree.leaf_count(), 3);
        assert_eq!(tree.depth(), 2);
        assert_eq!(tree.evaluate(&[6.0, 1.0]), Some(2.0));
        assert_eq!(tree.evaluate(&[6.0, 9.0]), Some(3.0));
    }
}
