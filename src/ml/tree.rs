//! Depth-bounded regression tree fitted on gradient statistics.

use ndarray::{ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

/// Splits must improve the objective by more than this.
const MIN_SPLIT_GAIN: f64 = 1e-6;

/// Settings shared by every tree of an ensemble.
#[derive(Clone, Copy, Debug)]
pub struct TreeParams {
    pub max_depth: usize,
    pub reg_lambda: f64,
    pub min_child_weight: f64,
    /// Shrinkage applied to leaf weights.
    pub learning_rate: f64,
}

/// Gradient and hessian of every training row.
pub struct GradientPairs<'a> {
    pub grad: &'a [f64],
    pub hess: &'a [f64],
}

/// Simple regression tree over dense rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    root: Option<Box<TreeNode>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct TreeNode {
    /// Split feature, `None` for leaves.
    feature: Option<usize>,
    /// Rows with `x[feature] < threshold` go left.
    threshold: f64,
    /// Leaf weight (already shrunk).
    value: f64,
    left: Option<Box<TreeNode>>,
    right: Option<Box<TreeNode>>,
}

impl TreeNode {
    fn leaf(value: f64) -> Box<Self> {
        Box::new(TreeNode {
            feature: None,
            threshold: 0.0,
            value,
            left: None,
            right: None,
        })
    }
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    gain: f64,
    left: Vec<usize>,
    right: Vec<usize>,
}

impl RegressionTree {
    /// Fit a tree on the sampled `rows`, considering only `columns` for splits.
    pub fn fit(
        features: ArrayView2<'_, f64>,
        gradients: &GradientPairs<'_>,
        rows: &[usize],
        columns: &[usize],
        params: &TreeParams,
    ) -> Self {
        let builder = TreeBuilder {
            features: features.view(),
            gradients,
            columns,
            params,
        };
        RegressionTree {
            root: Some(builder.build_tree(rows, 0)),
        }
    }

    pub fn predict(&self, x: ArrayView1<'_, f64>) -> f64 {
        let mut node = match self.root.as_deref() {
            Some(root) => root,
            None => return 0.0,
        };
        loop {
            let feature = match node.feature {
                Some(feature) => feature,
                None => return node.value,
            };
            let value = x.get(feature).copied().unwrap_or(0.0);
            let next = if value < node.threshold {
                node.left.as_deref()
            } else {
                node.right.as_deref()
            };
            match next {
                Some(child) => node = child,
                None => return node.value,
            }
        }
    }

    /// Number of leaves.
    pub fn n_leaves(&self) -> usize {
        fn count(node: &TreeNode) -> usize {
            match (&node.left, &node.right) {
                (None, None) => 1,
                (left, right) => {
                    left.as_deref().map_or(0, count) + right.as_deref().map_or(0, count)
                }
            }
        }
        self.root.as_deref().map_or(0, count)
    }

    pub fn depth(&self) -> usize {
        fn depth(node: &TreeNode) -> usize {
            let left = node.left.as_deref().map_or(0, depth);
            let right = node.right.as_deref().map_or(0, depth);
            if node.feature.is_some() { 1 + left.max(right) } else { 0 }
        }
        self.root.as_deref().map_or(0, depth)
    }

    /// Largest feature index used by any split.
    pub fn max_feature(&self) -> Option<usize> {
        fn walk(node: &TreeNode) -> Option<usize> {
            let here = node.feature;
            let left = node.left.as_deref().and_then(walk);
            let right = node.right.as_deref().and_then(walk);
            [here, left, right].into_iter().flatten().max()
        }
        self.root.as_deref().and_then(walk)
    }
}

struct TreeBuilder<'a> {
    features: ArrayView2<'a, f64>,
    gradients: &'a GradientPairs<'a>,
    columns: &'a [usize],
    params: &'a TreeParams,
}

impl TreeBuilder<'_> {
    fn sums(&self, rows: &[usize]) -> (f64, f64) {
        rows.iter().fold((0.0, 0.0), |(g, h), &i| {
            (g + self.gradients.grad[i], h + self.gradients.hess[i])
        })
    }

    fn leaf_weight(&self, g: f64, h: f64) -> f64 {
        -g / (h + self.params.reg_lambda) * self.params.learning_rate
    }

    fn score(&self, g: f64, h: f64) -> f64 {
        g * g / (h + self.params.reg_lambda)
    }

    /// Recursively build the tree. Stops at max depth or when no split
    /// improves the objective.
    fn build_tree(&self, rows: &[usize], depth: usize) -> Box<TreeNode> {
        let (g, h) = self.sums(rows);
        let value = self.leaf_weight(g, h);
        if depth >= self.params.max_depth || rows.len() < 2 {
            return TreeNode::leaf(value);
        }

        match self.find_best_split(rows, g, h) {
            Some(split) => Box::new(TreeNode {
                feature: Some(split.feature),
                threshold: split.threshold,
                value,
                left: Some(self.build_tree(&split.left, depth + 1)),
                right: Some(self.build_tree(&split.right, depth + 1)),
            }),
            None => TreeNode::leaf(value),
        }
    }

    /// Exact greedy search over the sampled columns.
    fn find_best_split(&self, rows: &[usize], g: f64, h: f64) -> Option<SplitCandidate> {
        let parent = self.score(g, h);
        let mut best: Option<SplitCandidate> = None;

        for &feature in self.columns {
            let mut sorted: Vec<(f64, usize)> = rows
                .iter()
                .map(|&i| (self.features[[i, feature]], i))
                .collect();
            sorted.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

            let (mut gl, mut hl) = (0.0, 0.0);
            for k in 1..sorted.len() {
                let prev = sorted[k - 1].1;
                gl += self.gradients.grad[prev];
                hl += self.gradients.hess[prev];
                if sorted[k - 1].0 == sorted[k].0 {
                    continue;
                }
                let (gr, hr) = (g - gl, h - hl);
                if hl < self.params.min_child_weight || hr < self.params.min_child_weight {
                    continue;
                }
                let gain = 0.5 * (self.score(gl, hl) + self.score(gr, hr) - parent);
                if gain > MIN_SPLIT_GAIN && best.as_ref().is_none_or(|b| gain > b.gain) {
                    best = Some(SplitCandidate {
                        feature,
                        threshold: (sorted[k - 1].0 + sorted[k].0) / 2.0,
                        gain,
                        left: sorted[..k].iter().map(|(_, i)| *i).collect(),
                        right: sorted[k..].iter().map(|(_, i)| *i).collect(),
                    });
                }
            }
        }

        best
    }
}
