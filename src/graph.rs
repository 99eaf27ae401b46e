//! The undirected interaction graph of a model, used to simulate variable elimination.
//!
//! Vertices live in an arena and are addressed by index; the name of each vertex is kept in a
//! side table. Eliminating a vertex connects its remaining neighbors pairwise (the fill-in edges
//! of the triangulation) and leaves it without neighbors.

use std::collections::BTreeSet;

use itertools::Itertools;

#[derive(Clone, Debug)]
pub struct InteractionGraph {
    /// The name of every vertex, by index
    names: Vec<String>,

    /// Adjacency sets, by index. Eliminated vertices have no neighbors.
    adjacency: Vec<BTreeSet<usize>>,
}

impl InteractionGraph {

    /// Build the graph over `names` in which all variables of each scope are pairwise connected.
    /// Names in a scope that are not in `names` are ignored.
    pub fn new<S: AsRef<[String]>>(names: Vec<String>, scopes: &[S]) -> Self {
        let mut graph = InteractionGraph {
            adjacency: vec![BTreeSet::new(); names.len()],
            names,
        };

        for scope in scopes {
            let idxs: Vec<usize> = scope.as_ref()
                                        .iter()
                                        .filter_map(|v| graph.index_of(v))
                                        .collect();
            graph.connect_all(&idxs);
        }

        graph
    }

    /// Number of vertices, including eliminated ones
    pub fn num_vertices(&self) -> usize {
        self.names.len()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn name(&self, idx: usize) -> &str {
        &self.names[idx]
    }

    pub fn degree(&self, idx: usize) -> usize {
        self.adjacency[idx].len()
    }

    /// Eliminate vertex `idx`: connect its neighbors pairwise, then remove it.
    ///
    /// # Returns
    /// the neighbors of `idx` at the time of elimination
    pub fn eliminate(&mut self, idx: usize) -> BTreeSet<usize> {
        let neighbors = std::mem::take(&mut self.adjacency[idx]);
        for &n in neighbors.iter() {
            self.adjacency[n].remove(&idx);
        }

        let idxs: Vec<usize> = neighbors.iter().cloned().collect();
        self.connect_all(&idxs);

        neighbors
    }

    fn connect_all(&mut self, idxs: &[usize]) {
        for (&a, &b) in idxs.iter().tuple_combinations() {
            if a != b {
                self.adjacency[a].insert(b);
                self.adjacency[b].insert(a);
            }
        }
    }
}


#[cfg(test)]
mod tests {

    use super::*;
    use crate::variable::names;

    fn square() -> InteractionGraph {
        // a - b - c - d - a
        let scopes = vec![names(vec!["a", "b"]), names(vec!["b", "c"]),
                          names(vec!["c", "d"]), names(vec!["d", "a"])];
        InteractionGraph::new(names(vec!["a", "b", "c", "d"]), &scopes)
    }

    #[test]
    fn build() {
        let g = square();
        assert_eq!(4, g.num_vertices());
        for i in 0..4 {
            assert_eq!(2, g.degree(i));
        }
        assert_eq!(Some(2), g.index_of("c"));
        assert_eq!("c", g.name(2));
    }

    #[test]
    fn eliminate_adds_fill_in() {
        let mut g = square();
        let removed = g.eliminate(0);

        assert_eq!(vec![1, 3], removed.into_iter().collect::<Vec<_>>());
        assert_eq!(0, g.degree(0));
        assert_eq!(2, g.degree(1));

        // b and d are now connected through the fill-in edge
        let removed = g.eliminate(1);
        assert_eq!(vec![2, 3], removed.into_iter().collect::<Vec<_>>());
        assert_eq!(1, g.degree(3));
    }

    #[test]
    fn unknown_names_ignored() {
        let scopes = vec![names(vec!["a", "zz"])];
        let g = InteractionGraph::new(names(vec!["a", "b"]), &scopes);
        assert_eq!(0, g.degree(0));
        assert_eq!(None, g.index_of("zz"));
    }
}
