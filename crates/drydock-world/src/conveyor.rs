//! Conveyor connectivity between inventories.
//!
//! `ConveyorGraph` holds an adjacency list of conveyor-carrying blocks:
//! face neighbors on the same structure, plus docked connector pairs
//! across structures. Reachability is a plain BFS.

use std::collections::{HashMap, HashSet, VecDeque};

use drydock_logic::ids::BlockKey;
use drydock_logic::world::BlockCategory;

/// Whether a block of this category has conveyor ports.
pub fn carries_conveyor(category: BlockCategory) -> bool {
    matches!(
        category,
        BlockCategory::Conveyor
            | BlockCategory::Cargo
            | BlockCategory::Connector
            | BlockCategory::Tool
            | BlockCategory::Reactor
            | BlockCategory::GasTank
            | BlockCategory::GasGenerator
    )
}

#[derive(Debug, Clone, Default)]
pub struct ConveyorGraph {
    adj: HashMap<BlockKey, Vec<BlockKey>>,
}

impl ConveyorGraph {
    /// Build from undirected links.
    pub fn from_links(links: &[(BlockKey, BlockKey)]) -> Self {
        let mut adj: HashMap<BlockKey, Vec<BlockKey>> = HashMap::new();
        for &(a, b) in links {
            adj.entry(a).or_default().push(b);
            adj.entry(b).or_default().push(a);
        }
        Self { adj }
    }

    pub fn connected(&self, from: BlockKey, to: BlockKey) -> bool {
        if from == to {
            return true;
        }
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        visited.insert(from);
        queue.push_back(from);

        while let Some(current) = queue.pop_front() {
            let Some(neighbors) = self.adj.get(&current) else {
                continue;
            };
            for &next in neighbors {
                if next == to {
                    return true;
                }
                if visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        false
    }

    pub fn edge_count(&self) -> usize {
        self.adj.values().map(|v| v.len()).sum::<usize>() / 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use drydock_logic::ids::{BlockPos, ContainerId};

    fn key(c: u64, x: i32) -> BlockKey {
        BlockKey::new(ContainerId(c), BlockPos::new(x, 0, 0))
    }

    #[test]
    fn test_chain_is_connected() {
        let graph = ConveyorGraph::from_links(&[(key(1, 0), key(1, 1)), (key(1, 1), key(2, 0))]);
        assert!(graph.connected(key(1, 0), key(2, 0)));
        assert!(graph.connected(key(2, 0), key(1, 0)));
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_disconnected() {
        let graph = ConveyorGraph::from_links(&[(key(1, 0), key(1, 1)), (key(3, 0), key(3, 1))]);
        assert!(!graph.connected(key(1, 0), key(3, 1)));
        assert!(!graph.connected(key(1, 0), key(9, 9)));
    }

    #[test]
    fn test_same_block() {
        let graph = ConveyorGraph::default();
        assert!(graph.connected(key(1, 0), key(1, 0)));
    }

    #[test]
    fn test_armor_has_no_ports() {
        assert!(!carries_conveyor(BlockCategory::Armor));
        assert!(carries_conveyor(BlockCategory::Tool));
    }
}
