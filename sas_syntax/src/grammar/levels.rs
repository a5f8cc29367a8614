//! Numeric levels from pairwise precedence relations
//!
//! Every terminal owns a left and a right level variable. `a = b` merges
//! right(a) with left(b); `a < b` orders right(a) below left(b); `a > b`
//! orders left(b) below right(a). Merged classes are then layered
//! topologically, so any ordering cycle is reported instead of resolved.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::error::GrammarError;
use super::precedence::Relation;

/// Spacing between consecutive layers
const LEVEL_STEP: u32 = 10;

struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            self.parent[rb] = ra;
        }
    }
}

fn left_var(index: usize) -> usize {
    2 * index
}

fn right_var(index: usize) -> usize {
    2 * index + 1
}

/// Solve the relations into `(left, right)` levels per terminal
pub fn solve(
    terminals: &[&'static str],
    relations: &BTreeMap<(&'static str, &'static str), Relation>,
) -> Result<HashMap<&'static str, (u32, u32)>, GrammarError> {
    let index: HashMap<&str, usize> = terminals.iter().enumerate().map(|(i, t)| (*t, i)).collect();
    let mut classes = UnionFind::new(terminals.len() * 2);

    for (&(a, b), relation) in relations {
        if *relation == Relation::Eq {
            if let (Some(&ia), Some(&ib)) = (index.get(a), index.get(b)) {
                classes.union(right_var(ia), left_var(ib));
            }
        }
    }

    // smaller -> larger, keyed by class root
    let mut edges: BTreeSet<(usize, usize)> = BTreeSet::new();
    for (&(a, b), relation) in relations {
        let (Some(&ia), Some(&ib)) = (index.get(a), index.get(b)) else {
            continue;
        };
        let (smaller, larger) = match relation {
            Relation::Eq => continue,
            Relation::Lt => (right_var(ia), left_var(ib)),
            Relation::Gt => (left_var(ib), right_var(ia)),
        };
        let (smaller, larger) = (classes.find(smaller), classes.find(larger));
        if smaller == larger {
            return Err(GrammarError::Cycle {
                tokens: vec![a.to_string(), b.to_string()],
            });
        }
        edges.insert((smaller, larger));
    }

    let roots: BTreeSet<usize> = (0..terminals.len() * 2).map(|v| classes.find(v)).collect();
    let mut indegree: HashMap<usize, usize> = roots.iter().map(|&r| (r, 0)).collect();
    for &(_, larger) in &edges {
        *indegree.entry(larger).or_default() += 1;
    }

    let mut levels: HashMap<usize, u32> = HashMap::new();
    let mut layer: Vec<usize> = roots
        .iter()
        .copied()
        .filter(|r| indegree[r] == 0)
        .collect();
    let mut level = 0;

    while !layer.is_empty() {
        let mut next = Vec::new();
        for &root in &layer {
            levels.insert(root, level);
            for &(_, larger) in edges.range((root, 0)..=(root, usize::MAX)) {
                if let Some(count) = indegree.get_mut(&larger) {
                    *count -= 1;
                    if *count == 0 {
                        next.push(larger);
                    }
                }
            }
        }
        layer = next;
        level += LEVEL_STEP;
    }

    if levels.len() < roots.len() {
        let mut stuck: BTreeSet<String> = BTreeSet::new();
        for (i, terminal) in terminals.iter().enumerate() {
            for var in [left_var(i), right_var(i)] {
                if !levels.contains_key(&classes.find(var)) {
                    stuck.insert(terminal.to_string());
                }
            }
        }
        return Err(GrammarError::Cycle {
            tokens: stuck.into_iter().collect(),
        });
    }

    Ok(terminals
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let left = levels[&classes.find(left_var(i))];
            let right = levels[&classes.find(right_var(i))];
            (*t, (left, right))
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn relations(
        pairs: &[(&'static str, &'static str, Relation)],
    ) -> BTreeMap<(&'static str, &'static str), Relation> {
        pairs.iter().map(|&(a, b, r)| ((a, b), r)).collect()
    }

    #[test]
    fn test_orders_and_merges() {
        let rels = relations(&[
            ("+", "+", Relation::Gt),
            ("+", "*", Relation::Lt),
            ("*", "+", Relation::Gt),
            ("(", ")", Relation::Eq),
        ]);
        let levels = solve(&["+", "*", "(", ")"], &rels).unwrap();

        let (plus_left, plus_right) = levels["+"];
        let (star_left, star_right) = levels["*"];
        assert!(plus_right > plus_left);
        assert!(plus_right < star_left);
        assert!(star_right > plus_left);
        assert_eq!(levels["("].1, levels[")"].0);
    }

    #[test]
    fn test_same_class_ordering_is_a_cycle() {
        let rels = relations(&[("a", "b", Relation::Eq), ("a", "c", Relation::Lt), ("b", "b", Relation::Eq)]);
        assert!(solve(&["a", "b", "c"], &rels).is_ok());

        let rels = relations(&[("a", "a", Relation::Eq), ("b", "a", Relation::Gt), ("b", "b", Relation::Eq), ("a", "b", Relation::Gt)]);
        // left(a) < right(b) and left(b) < right(a) with each terminal's
        // sides merged: the two classes order each other
        assert_matches!(solve(&["a", "b"], &rels), Err(GrammarError::Cycle { tokens }) if tokens.len() == 2);
    }
}
