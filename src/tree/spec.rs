//! Nested tree description accepted from callers.

use serde::{Deserialize, Serialize};

/// A tree as nested data: each node is either a leaf naming its site or an
/// inner node listing its children.
///
/// ```json
/// { "children": [ { "site": 0 }, { "children": [ { "site": 1 }, { "site": 2 } ] } ] }
/// ```
///
/// Children are kept as a list so that non-binary input is reported as a
/// typed error rather than a deserialization failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeSpec {
    Leaf { site: usize },
    Inner { children: Vec<TreeSpec> },
}

impl TreeSpec {
    pub fn leaf(site: usize) -> Self {
        TreeSpec::Leaf { site }
    }

    pub fn inner(first: TreeSpec, second: TreeSpec) -> Self {
        TreeSpec::Inner {
            children: vec![first, second],
        }
    }

    /// Caterpillar tree over sites `0..n`: `((((0, 1), 2), 3), ...)`.
    pub fn caterpillar(n: usize) -> Self {
        (1..n).fold(TreeSpec::leaf(0), |acc, site| {
            TreeSpec::inner(acc, TreeSpec::leaf(site))
        })
    }

    /// Random binary topology over sites `0..n`, built by repeatedly
    /// joining two random subtrees.
    #[cfg(test)]
    pub(crate) fn random(rng: &mut impl rand::Rng, n: usize) -> Self {
        let mut pool: Vec<TreeSpec> = (0..n).map(TreeSpec::leaf).collect();
        while pool.len() > 1 {
            let a = pool.swap_remove(rng.gen_range(0..pool.len()));
            let b = pool.swap_remove(rng.gen_range(0..pool.len()));
            pool.push(TreeSpec::inner(a, b));
        }
        pool.remove(0)
    }
}
