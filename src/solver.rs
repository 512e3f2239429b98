//! Binary constraint network with arc-consistency and backtracking search.
//!
//! Key points:
//! - Domains live in one indexed array; an `FxHashMap` maps each variable key
//!   to its slot, so there is no hidden shared state
//! - Each constraint pre-computes support tables in both directions
//! - Propagation is AC-3 over an explicit worklist of arcs
//! - Search is iterative (explicit stack) and re-establishes arc-consistency
//!   after every assignment

use std::collections::{BTreeSet, VecDeque};
use std::fmt::Debug;
use std::hash::Hash;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::errors::EngineError;
use crate::ConstraintEngine;

/// Values supported on the other side of a constraint, keyed by own value.
type SupportTable<V> = FxHashMap<V, FxHashSet<V>>;

/// One domain per variable slot.
type Domains<V> = Vec<BTreeSet<V>>;

/// Which end of a constraint an arc revises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Side {
    X,
    Y,
}

/// A directed arc: (relation index, end whose domain gets revised).
type DirectedArc = (usize, Side);

/// A binary relation between two variable slots.
#[derive(Debug, Clone)]
struct Relation<V> {
    x: usize,
    y: usize,
    /// For each value of `x`, the values of `y` it is allowed with.
    x_supports: SupportTable<V>,
    /// For each value of `y`, the values of `x` it is allowed with.
    y_supports: SupportTable<V>,
}

impl<V: Clone + Eq + Hash> Relation<V> {
    fn new(x: usize, y: usize, allowed: Vec<(V, V)>) -> Self {
        let mut x_supports: SupportTable<V> = FxHashMap::default();
        let mut y_supports: SupportTable<V> = FxHashMap::default();
        for (a, b) in allowed {
            x_supports.entry(a.clone()).or_default().insert(b.clone());
            y_supports.entry(b).or_default().insert(a);
        }
        Self {
            x,
            y,
            x_supports,
            y_supports,
        }
    }

    /// Returns (revised slot, other slot, supports of the revised slot).
    #[inline]
    fn orient(&self, side: Side) -> (usize, usize, &SupportTable<V>) {
        match side {
            Side::X => (self.x, self.y, &self.x_supports),
            Side::Y => (self.y, self.x, &self.y_supports),
        }
    }
}

/// A complete assignment: every variable mapped to one value, in slot order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment<K, V> {
    values: Vec<(K, V)>,
}

impl<K: PartialEq, V> Assignment<K, V> {
    pub fn get(&self, key: &K) -> Option<&V> {
        self.values.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(K, V)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K, V> IntoIterator for Assignment<K, V> {
    type Item = (K, V);
    type IntoIter = std::vec::IntoIter<(K, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

/// A node in the iterative search.
///
/// Holds the domains after propagation, the variable being branched on, and
/// the index of the next value to try for it.
struct SearchFrame<V> {
    domains: Domains<V>,
    variable: usize,
    candidates: Vec<V>,
    next_candidate: usize,
}

impl<V: Clone> SearchFrame<V> {
    fn new(domains: Domains<V>, variable: usize) -> Self {
        let candidates = domains[variable].iter().cloned().collect();
        Self {
            domains,
            variable,
            candidates,
            next_candidate: 0,
        }
    }
}

/// A constraint network over variables keyed by `K` with values `V`.
#[derive(Debug, Clone)]
pub struct Network<K, V> {
    keys: Vec<K>,
    slots: FxHashMap<K, usize>,
    domains: Domains<V>,
    relations: Vec<Relation<V>>,
    /// Relation indices touching each slot.
    incident: Vec<Vec<usize>>,
}

impl<K, V> Default for Network<K, V> {
    fn default() -> Self {
        Self {
            keys: Vec::new(),
            slots: FxHashMap::default(),
            domains: Vec::new(),
            relations: Vec::new(),
            incident: Vec::new(),
        }
    }
}

impl<K, V> Network<K, V>
where
    K: Clone + Eq + Hash + Debug,
    V: Clone + Ord + Hash,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn num_variables(&self) -> usize {
        self.keys.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.relations.len()
    }

    /// Current domain of `key`.
    pub fn domain(&self, key: &K) -> Option<&BTreeSet<V>> {
        self.slots.get(key).map(|&slot| &self.domains[slot])
    }

    fn slot(&self, key: &K) -> Result<usize, EngineError> {
        self.slots
            .get(key)
            .copied()
            .ok_or_else(|| EngineError::UnknownVariable {
                name: format!("{key:?}"),
            })
    }

    fn all_arcs(&self) -> VecDeque<DirectedArc> {
        (0..self.relations.len())
            .flat_map(|index| [(index, Side::X), (index, Side::Y)])
            .collect()
    }

    /// Arcs that revise the neighbours of `slot` against it.
    fn arcs_into(&self, slot: usize) -> VecDeque<DirectedArc> {
        let mut arcs = VecDeque::new();
        for &index in &self.incident[slot] {
            let relation = &self.relations[index];
            if relation.x == slot {
                arcs.push_back((index, Side::Y));
            }
            if relation.y == slot {
                arcs.push_back((index, Side::X));
            }
        }
        arcs
    }

    /// Removes unsupported values from one end of an arc.
    ///
    /// Returns `true` if the revised domain shrank.
    fn revise(&self, domains: &mut Domains<V>, (index, side): DirectedArc) -> bool {
        let (target, other, supports) = self.relations[index].orient(side);
        let kept: BTreeSet<V> = domains[target]
            .iter()
            .filter(|value| {
                supports
                    .get(*value)
                    .is_some_and(|partners| partners.iter().any(|p| domains[other].contains(p)))
            })
            .cloned()
            .collect();

        if kept.len() == domains[target].len() {
            return false;
        }
        domains[target] = kept;
        true
    }

    /// Runs AC-3 starting from `worklist`.
    ///
    /// Returns `false` as soon as a domain becomes empty.
    fn propagate(&self, domains: &mut Domains<V>, mut worklist: VecDeque<DirectedArc>) -> bool {
        let mut queued: FxHashSet<DirectedArc> = worklist.iter().copied().collect();

        while let Some(arc) = worklist.pop_front() {
            queued.remove(&arc);
            if !self.revise(domains, arc) {
                continue;
            }

            let (target, _, _) = self.relations[arc.0].orient(arc.1);
            if domains[target].is_empty() {
                return false;
            }

            // the revised variable lost values: recheck everything that leans on it
            for &index in &self.incident[target] {
                if index == arc.0 {
                    continue;
                }
                let relation = &self.relations[index];
                let dependent = if relation.x == target {
                    (index, Side::Y)
                } else {
                    (index, Side::X)
                };
                if queued.insert(dependent) {
                    worklist.push_back(dependent);
                }
            }
        }

        true
    }

    /// Picks the unfixed variable with the smallest domain, lowest slot first.
    fn select_unfixed(domains: &Domains<V>) -> Option<usize> {
        domains
            .iter()
            .enumerate()
            .filter(|(_, domain)| domain.len() > 1)
            .min_by_key(|&(slot, domain)| (domain.len(), slot))
            .map(|(slot, _)| slot)
    }

    fn to_assignment(&self, domains: &Domains<V>) -> Assignment<K, V> {
        let values = self
            .keys
            .iter()
            .zip(domains)
            .filter_map(|(key, domain)| domain.first().map(|value| (key.clone(), value.clone())))
            .collect();
        Assignment { values }
    }
}

impl<K, V> ConstraintEngine for Network<K, V>
where
    K: Clone + Eq + Hash + Debug,
    V: Clone + Ord + Hash,
{
    type Key = K;
    type Value = V;

    fn add_variable(&mut self, key: K, domain: BTreeSet<V>) {
        if let Some(&slot) = self.slots.get(&key) {
            self.domains[slot] = domain;
            return;
        }
        let slot = self.keys.len();
        self.slots.insert(key.clone(), slot);
        self.keys.push(key);
        self.domains.push(domain);
        self.incident.push(Vec::new());
    }

    fn add_constraint(&mut self, x: &K, y: &K, allowed: Vec<(V, V)>) -> Result<(), EngineError> {
        let x = self.slot(x)?;
        let y = self.slot(y)?;
        let index = self.relations.len();
        self.relations.push(Relation::new(x, y, allowed));
        self.incident[x].push(index);
        if y != x {
            self.incident[y].push(index);
        }
        Ok(())
    }

    fn maintain_arc_consistency(&mut self) -> bool {
        if self.domains.iter().any(BTreeSet::is_empty) {
            return false;
        }
        let mut domains = std::mem::take(&mut self.domains);
        let consistent = self.propagate(&mut domains, self.all_arcs());
        self.domains = domains;
        consistent
    }

    /// Finds up to `max_solutions` assignments (all of them for `None`).
    ///
    /// Uses iterative backtracking with a stack to avoid recursion depth
    /// limits. Values are tried in ascending order, so results are
    /// reproducible.
    fn solve(&self, max_solutions: Option<usize>) -> Vec<Assignment<K, V>> {
        let mut solutions = Vec::new();
        if max_solutions == Some(0) {
            return solutions;
        }

        let mut root = self.domains.clone();
        if root.iter().any(BTreeSet::is_empty) || !self.propagate(&mut root, self.all_arcs()) {
            log::debug!("network is inconsistent before search");
            return solutions;
        }

        let Some(first_variable) = Self::select_unfixed(&root) else {
            solutions.push(self.to_assignment(&root));
            return solutions;
        };

        let mut search_stack = vec![SearchFrame::new(root, first_variable)];
        let mut nodes = 0usize;

        while let Some(frame) = search_stack.last_mut() {
            let Some(value) = frame.candidates.get(frame.next_candidate).cloned() else {
                // every value of this variable has been tried
                search_stack.pop();
                continue;
            };
            frame.next_candidate += 1;
            nodes += 1;

            let variable = frame.variable;
            let mut child = frame.domains.clone();
            child[variable] = BTreeSet::from([value]);

            if !self.propagate(&mut child, self.arcs_into(variable)) {
                continue;
            }

            match Self::select_unfixed(&child) {
                Some(next_variable) => search_stack.push(SearchFrame::new(child, next_variable)),
                None => {
                    solutions.push(self.to_assignment(&child));
                    if max_solutions.is_some_and(|limit| solutions.len() >= limit) {
                        break;
                    }
                }
            }
        }

        log::debug!(
            "search visited {nodes} nodes and found {} solutions",
            solutions.len()
        );
        solutions
    }
}
