//! Directed follow-graph

use rand::Rng;

/// `follows(i, j)` is true iff node `i` follows node `j`, i.e. `i` hears
/// what `j` proposes. Nodes never follow themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowGraph {
    followees: Vec<Vec<bool>>,
    followers: Vec<Vec<usize>>,
}

impl FollowGraph {
    /// Every ordered pair `i != j` becomes an edge with probability `p_graph`.
    pub fn random<R: Rng + ?Sized>(num_nodes: usize, p_graph: f64, rng: &mut R) -> Self {
        let mut rows = vec![vec![false; num_nodes]; num_nodes];
        for (i, row) in rows.iter_mut().enumerate() {
            for (j, edge) in row.iter_mut().enumerate() {
                if i != j && rng.random::<f64>() < p_graph {
                    *edge = true;
                }
            }
        }
        Self::from_rows(rows)
    }

    /// Build from an explicit adjacency matrix. Diagonal entries are ignored.
    pub fn from_rows(mut rows: Vec<Vec<bool>>) -> Self {
        let num_nodes = rows.len();
        for (i, row) in rows.iter_mut().enumerate() {
            row.resize(num_nodes, false);
            row[i] = false;
        }

        let mut followers = vec![Vec::new(); num_nodes];
        for (follower, row) in rows.iter().enumerate() {
            for (followee, edge) in row.iter().enumerate() {
                if *edge {
                    followers[followee].push(follower);
                }
            }
        }

        Self {
            followees: rows,
            followers,
        }
    }

    pub fn len(&self) -> usize {
        self.followees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.followees.is_empty()
    }

    pub fn follows(&self, follower: usize, followee: usize) -> bool {
        self.followees
            .get(follower)
            .and_then(|row| row.get(followee))
            .copied()
            .unwrap_or(false)
    }

    /// Adjacency row handed to `node` through `set_followees`.
    pub fn followees_of(&self, node: usize) -> &[bool] {
        &self.followees[node]
    }

    /// Nodes that hear what `node` proposes, ascending.
    pub fn followers_of(&self, node: usize) -> &[usize] {
        &self.followers[node]
    }

    pub fn edge_count(&self) -> usize {
        self.followers.iter().map(Vec::len).sum()
    }
}
