//! Exact inference with a junction tree (Koller & Friedman Chapter 10).
//!
//! The tree is compiled once from a `BayesianNetwork`: the network is triangulated by simulating
//! variable elimination, the cliques formed along the way are linked into an elimination tree,
//! and each CPD is assigned to the smallest clique covering it. Queries calibrate the tree with
//! two passes of Hugin message passing and read the answer off a clique. Calibration is kept
//! until the evidence changes, so repeated queries under the same evidence are cheap.

use crate::diagnostics::Outcome;
use crate::factor::Factor;
use crate::model::{BayesianNetwork, Model};
use crate::util::{Error, Result};
use crate::variable::{Domains, Evidence};
use super::order::OrderHeuristic;
use super::{finish, free_variables, resolve_evidence, resolve_query};

use std::collections::{BTreeSet, VecDeque};


/// A junction tree over the variables of a `BayesianNetwork`.
///
/// # Representation
/// Cliques live in an arena and are addressed by index. The tree structure is kept as adjacency
/// sets over clique indices. Each clique owns the product of the CPDs assigned to it; the
/// evidence-reduced copies of those potentials are the starting point of calibration.
///
/// A `FactorTree` is either *dirty* (evidence changed since the last calibration) or
/// *calibrated*, in which case it holds the calibrated belief of every clique.
#[derive(Clone, Debug)]
pub struct FactorTree {

    /// The ordered domains of all variables of the network
    domains: Domains,

    /// The scope of each clique, in network order
    scopes: Vec<Vec<String>>,

    /// The product of the CPDs assigned to each clique
    potentials: Vec<Factor>,

    /// The neighbors of each clique in the tree
    neighbors: Vec<BTreeSet<usize>>,

    /// The current evidence
    evidence: Evidence,

    /// `potentials` reduced by `evidence`
    reduced: Vec<Factor>,

    /// The calibrated beliefs, `None` while the tree is dirty
    beliefs: Option<Vec<Factor>>,

    /// Number of calibrations run so far
    calibrations: usize,

}


impl FactorTree {

    /// Compile `network` into a junction tree, triangulating with the min-degree order.
    pub fn create_jointree(network: &BayesianNetwork) -> Result<Self> {
        FactorTree::create_jointree_with(network, &OrderHeuristic::MinDegree)
    }


    /// Compile `network` into a junction tree, triangulating with the order chosen by
    /// `heuristic`.
    ///
    /// # Errors
    /// * `Error::RunningIntersection` if the tree does not have the running intersection property
    pub fn create_jointree_with(network: &BayesianNetwork, heuristic: &OrderHeuristic)
        -> Result<Self>
    {
        let order = heuristic.order(network, &[])?;
        let mut graph = network.interaction_graph();

        ///////////////////////////////////////////////////////////////////////
        // 1) Triangulate: clique k is formed by eliminating the k-th variable
        let mut position = vec![0; graph.num_vertices()];
        let mut eliminated = Vec::with_capacity(order.len());
        for (k, var) in order.iter().enumerate() {
            let idx = graph.index_of(var).ok_or_else(|| Error::UnknownVariable(var.clone()))?;
            position[idx] = k;
            eliminated.push(idx);
        }

        let mut cliques: Vec<BTreeSet<usize>> = Vec::with_capacity(eliminated.len());
        let mut remaining: Vec<BTreeSet<usize>> = Vec::with_capacity(eliminated.len());
        for &idx in eliminated.iter() {
            let rest = graph.eliminate(idx);
            let mut clique = rest.clone();
            clique.insert(idx);
            cliques.push(clique);
            remaining.push(rest);
        }

        ///////////////////////////////////////////////////////////////////////
        // 2) Link each clique to the clique of its earliest eliminated remaining variable, which
        //    contains all of its remaining variables
        let mut neighbors = vec![BTreeSet::new(); cliques.len()];
        let mut roots = Vec::new();
        for (k, rest) in remaining.iter().enumerate() {
            match rest.iter().map(|&v| position[v]).min() {
                Some(parent) => link(&mut neighbors, k, parent),
                None => roots.push(k)
            }
        }

        // the components of the graph share no variables, so any link between them will do
        if let Some((&first, others)) = roots.split_first() {
            for &root in others {
                link(&mut neighbors, first, root);
            }
        }

        ///////////////////////////////////////////////////////////////////////
        // 3) Absorb every clique into an adjacent superset
        let mut alive = vec![true; cliques.len()];
        while let Some((k, j)) = contractible(&cliques, &neighbors, &alive) {
            tracing::trace!(clique = k, into = j, "absorbing non-maximal clique");
            let adjacent = std::mem::take(&mut neighbors[k]);
            for n in adjacent {
                neighbors[n].remove(&k);
                if n != j {
                    link(&mut neighbors, n, j);
                }
            }
            alive[k] = false;
        }

        ///////////////////////////////////////////////////////////////////////
        // 4) Compact the arena
        let survivors: Vec<usize> = (0..cliques.len()).filter(|&k| alive[k]).collect();
        let mut index = vec![0; cliques.len()];
        for (new, &old) in survivors.iter().enumerate() {
            index[old] = new;
        }

        let scopes: Vec<Vec<String>> = survivors.iter()
            .map(|&k| cliques[k].iter().map(|&v| String::from(graph.name(v))).collect())
            .collect();
        let neighbors: Vec<BTreeSet<usize>> = survivors.iter()
            .map(|&k| neighbors[k].iter().map(|&n| index[n]).collect())
            .collect();

        ///////////////////////////////////////////////////////////////////////
        // 5) Assign every CPD to the smallest clique covering it
        let domains = network.domains();
        let mut potentials = Vec::with_capacity(scopes.len());
        for scope in scopes.iter() {
            let clique_domains = scope.iter()
                .map(|v| {
                    domains.get(v)
                           .map(|d| (v.clone(), d.clone()))
                           .ok_or_else(|| Error::UnknownVariable(v.clone()))
                })
                .collect::<Result<Domains>>()?;
            potentials.push(Factor::ones(clique_domains));
        }

        for cpd in network.joint_factors() {
            let target = (0..scopes.len())
                .filter(|&c| cpd.variables().iter().all(|v| scopes[c].contains(v)))
                .min_by_key(|&c| scopes[c].len())
                .ok_or_else(|| Error::InvalidScope(format!(
                    "no clique covers {:?}", cpd.variables()
                )))?;
            potentials[target] = potentials[target].product(&cpd)?;
        }

        tracing::debug!(cliques = ?scopes, "built junction tree");

        let tree = FactorTree {
            domains,
            scopes,
            reduced: potentials.clone(),
            potentials,
            neighbors,
            evidence: Evidence::new(),
            beliefs: None,
            calibrations: 0
        };
        tree.check_running_intersection()?;
        Ok(tree)
    }


    /// The scope of every clique, in network order
    pub fn cliques(&self) -> &[Vec<String>] {
        &self.scopes
    }


    /// The edges of the tree, as pairs of clique indices ```(a, b)``` with ```a < b```
    pub fn edges(&self) -> Vec<(usize, usize)> {
        self.neighbors.iter()
                      .enumerate()
                      .flat_map(|(a, ns)| ns.iter().filter(move |&&b| a < b).map(move |&b| (a, b)))
                      .collect()
    }


    /// The separator between cliques `a` and `b`, or `None` if they are not adjacent
    pub fn separator(&self, a: usize, b: usize) -> Option<Vec<String>> {
        if !self.neighbors.get(a)?.contains(&b) {
            return None;
        }

        Some(self.scopes[a].iter().filter(|v| self.scopes[b].contains(v)).cloned().collect())
    }


    /// The evidence the tree currently answers queries under
    pub fn evidence(&self) -> &Evidence {
        &self.evidence
    }


    pub fn is_calibrated(&self) -> bool {
        self.beliefs.is_some()
    }


    /// Number of times the tree has been calibrated
    pub fn calibrations(&self) -> usize {
        self.calibrations
    }


    /// Verify that every variable occurs in a connected subtree of cliques.
    ///
    /// # Errors
    /// * `Error::RunningIntersection` naming the first variable that does not
    pub fn check_running_intersection(&self) -> Result<()> {
        for var in self.domains.keys() {
            let holders = self.scopes.iter().filter(|s| s.contains(var)).count();
            let first = match self.scopes.iter().position(|s| s.contains(var)) {
                Some(c) => c,
                None => continue
            };

            // walk the tree without leaving the cliques that hold var
            let mut seen = BTreeSet::new();
            let mut stack = vec![first];
            seen.insert(first);
            while let Some(c) = stack.pop() {
                for &n in self.neighbors[c].iter() {
                    if self.scopes[n].contains(var) && seen.insert(n) {
                        stack.push(n);
                    }
                }
            }

            if seen.len() != holders {
                return Err(Error::RunningIntersection(var.clone()));
            }
        }

        Ok(())
    }


    /// Replace the evidence of the tree. The cliques keep their scopes; their potentials are
    /// reduced by the evidence and the tree needs calibrating before the next query.
    ///
    /// Observations of variables not in the network are dropped with a warning.
    ///
    /// # Errors
    /// * `Error::UnknownValue` if an observed value is not in its variable's domain. The tree is
    ///   left unchanged.
    pub fn set_evidence(&mut self, evidence: &Evidence) -> Result<Outcome<()>> {
        let (evidence, warnings) = resolve_evidence(&self.domains, evidence)?;
        let reduced = self.potentials.iter()
                                     .map(|p| p.reduce(&evidence))
                                     .collect::<Result<Vec<Factor>>>()?;

        tracing::debug!(?evidence, "evidence set");
        self.evidence = evidence;
        self.reduced = reduced;
        self.beliefs = None;
        Ok(Outcome::new((), warnings))
    }


    /// Drop all evidence
    pub fn reset_evidence(&mut self) {
        self.evidence = Evidence::new();
        self.reduced = self.potentials.clone();
        self.beliefs = None;
    }


    /// Compute ```P(query | evidence)``` for the current evidence.
    ///
    /// The query is answered from the smallest clique containing all unobserved query
    /// variables. If no clique does, the calibrated beliefs of a connected subtree covering them
    /// are combined instead.
    ///
    /// # Errors
    /// * `Error::ImpossibleEvidence` if the evidence has probability zero
    pub fn marginals<K: AsRef<str>>(&mut self, query: &[K]) -> Result<Outcome<Factor>> {
        let (query, warnings) = resolve_query(&self.domains, query);
        let free = free_variables(&query, &self.evidence);

        let beliefs = match self.beliefs.take() {
            Some(beliefs) => beliefs,
            None => {
                let beliefs = self.calibrate()?;
                self.calibrations += 1;
                beliefs
            }
        };

        let joint = self.joint(&beliefs, &free);
        self.beliefs = Some(beliefs);

        let res = finish(joint?, &query, &self.evidence, &self.domains)?;
        Ok(Outcome::new(res, warnings))
    }


    /// Calibrate the reduced potentials: collect messages towards clique 0, then distribute
    /// them back out, dividing out what each clique sent on the way up.
    fn calibrate(&self) -> Result<Vec<Factor>> {
        let mut beliefs = self.reduced.clone();
        if beliefs.is_empty() {
            return Ok(beliefs);
        }

        let (visit, parent) = self.traversal(0);
        let mut upward: Vec<Option<Factor>> = vec![None; beliefs.len()];

        for &c in visit.iter().rev() {
            if let Some(p) = parent[c] {
                let msg = beliefs[c].marginalize_to(&self.message_scope(c, p))?;
                beliefs[p] = beliefs[p].product(&msg)?;
                upward[c] = Some(msg);
            }
        }

        for &c in visit.iter() {
            if let (Some(p), Some(sent)) = (parent[c], upward[c].take()) {
                let msg = beliefs[p].marginalize_to(&self.message_scope(c, p))?;
                beliefs[c] = beliefs[c].product(&msg.divide(&sent)?)?;
            }
        }

        tracing::debug!(cliques = beliefs.len(), "calibrated junction tree");
        Ok(beliefs)
    }


    /// The unnormalized joint over `free` from calibrated `beliefs`
    fn joint(&self, beliefs: &[Factor], free: &[String]) -> Result<Factor> {
        if beliefs.is_empty() {
            return Ok(Factor::identity());
        }

        let covering = (0..self.scopes.len())
            .filter(|&c| free.iter().all(|v| self.scopes[c].contains(v)))
            .min_by_key(|&c| self.scopes[c].len());
        if let Some(c) = covering {
            tracing::trace!(clique = c, "query covered by a single clique");
            return beliefs[c].marginalize_to(free);
        }

        // the calibrated subtree factorizes as the product of its beliefs over the product of
        // its separator marginals
        let (subtree, parent) = self.covering_subtree(free)?;
        tracing::trace!(?subtree, "query spans several cliques");

        let mut joint = Factor::identity();
        for &c in subtree.iter() {
            joint = match parent[c] {
                Some(p) if subtree.contains(&p) => {
                    let mu = beliefs[c].marginalize_to(&self.message_scope(c, p))?;
                    joint.product(&beliefs[c].divide(&mu)?)?
                },
                _ => joint.product(&beliefs[c])?
            };
        }

        joint.marginalize_to(free)
    }


    /// A connected set of cliques holding every variable of `free`: the paths from the first
    /// clique holding each variable up to the one holding the first variable. Returned in
    /// traversal order, with the parent of every clique in that traversal.
    fn covering_subtree(&self, free: &[String]) -> Result<(Vec<usize>, Vec<Option<usize>>)> {
        let targets = free.iter()
            .map(|v| {
                self.scopes.iter()
                           .position(|s| s.contains(v))
                           .ok_or_else(|| Error::UnknownVariable(v.clone()))
            })
            .collect::<Result<Vec<usize>>>()?;

        let root = match targets.first() {
            Some(&root) => root,
            None => return Ok((vec![0], vec![None; self.scopes.len()]))
        };

        let (visit, parent) = self.traversal(root);
        let mut keep = BTreeSet::new();
        keep.insert(root);
        for &t in targets.iter() {
            let mut c = t;
            while keep.insert(c) {
                match parent[c] {
                    Some(p) => c = p,
                    None => break
                }
            }
        }

        let subtree = visit.into_iter().filter(|c| keep.contains(c)).collect();
        Ok((subtree, parent))
    }


    /// Breadth first traversal from `root`: the visiting order and the parent of every clique
    fn traversal(&self, root: usize) -> (Vec<usize>, Vec<Option<usize>>) {
        let mut parent = vec![None; self.scopes.len()];
        let mut visit = Vec::with_capacity(self.scopes.len());
        let mut seen = vec![false; self.scopes.len()];
        let mut queue = VecDeque::new();

        seen[root] = true;
        queue.push_back(root);
        while let Some(c) = queue.pop_front() {
            visit.push(c);
            for &n in self.neighbors[c].iter() {
                if !seen[n] {
                    seen[n] = true;
                    parent[n] = Some(c);
                    queue.push_back(n);
                }
            }
        }

        (visit, parent)
    }


    /// The variables of the separator between `a` and `b` that are not observed
    fn message_scope(&self, a: usize, b: usize) -> Vec<String> {
        self.scopes[a].iter()
                      .filter(|v| self.scopes[b].contains(v) && !self.evidence.contains(v))
                      .cloned()
                      .collect()
    }
}


fn link(neighbors: &mut [BTreeSet<usize>], a: usize, b: usize) {
    neighbors[a].insert(b);
    neighbors[b].insert(a);
}


/// The first live clique, by index, that is a subset of an adjacent clique, together with the
/// smallest such neighbor
fn contractible(cliques: &[BTreeSet<usize>], neighbors: &[BTreeSet<usize>], alive: &[bool])
    -> Option<(usize, usize)>
{
    (0..cliques.len()).filter(|&k| alive[k]).find_map(|k| {
        neighbors[k].iter()
                    .find(|&&j| cliques[k].is_subset(&cliques[j]))
                    .map(|&j| (k, j))
    })
}
