//! Minimum-cost path search over a [`Lattice`].
//!
//! The path cost is the sum of word costs plus the connection cost of
//! every adjacent pair. BOS connects to the first word at no cost; the last
//! word connects to EOS through the matrix with left id 0. Among equal
//! costs the predecessor inserted first wins.
use crate::dictionary::connector::ConnectorCost;
use crate::tokenizer::lattice::{INVALID_IDX, Lattice, MAX_COST, Node};

/// Computes the minimum cumulative cost and best predecessor of every node
/// and of EOS.
pub fn forward<C>(lattice: &mut Lattice, connector: &C)
where
    C: ConnectorCost,
{
    for end in 1..=lattice.len_char() {
        let (finished, nodes) = lattice.split_at_end_mut(end);
        for node in nodes.iter_mut() {
            let (min_idx, min_cost) = search_min_node(&finished[node.start], node.left_id, connector);
            node.min_idx = min_idx;
            node.min_cost = if min_idx == INVALID_IDX {
                MAX_COST
            } else {
                min_cost.saturating_add(i32::from(node.word_cost))
            };
        }
    }
    let (eos, ends) = lattice.eos_with_ends_mut();
    if let Some(eos) = eos {
        let (min_idx, min_cost) = search_min_node(&ends[eos.start], eos.left_id, connector);
        eos.min_idx = min_idx;
        eos.min_cost = min_cost;
    }
}

fn search_min_node<C>(left_nodes: &[Node], left_id: u16, connector: &C) -> (u32, i32)
where
    C: ConnectorCost,
{
    let mut min_idx = INVALID_IDX;
    let mut min_cost = MAX_COST;
    for (i, left_node) in left_nodes.iter().enumerate() {
        if !left_node.is_connected_to_bos() {
            continue;
        }
        let conn_cost = if left_node.is_bos() {
            0
        } else {
            connector.cost(left_node.right_id, left_id)
        };
        let new_cost = left_node.min_cost.saturating_add(conn_cost);
        if new_cost < min_cost {
            min_idx = i as u32;
            min_cost = new_cost;
        }
    }
    (min_idx, min_cost)
}

/// Appends the best path from EOS back to BOS as `(end, node)` pairs, so
/// the last word comes first. Appends nothing if EOS is unreachable.
pub fn backward(lattice: &Lattice, top_nodes: &mut Vec<(usize, Node)>) {
    let Some(eos) = lattice.eos() else {
        return;
    };
    let mut end = eos.start;
    let mut min_idx = eos.min_idx;
    while end != 0 {
        let Some(node) = lattice.ends_at(end).get(min_idx as usize) else {
            top_nodes.clear();
            return;
        };
        top_nodes.push((end, *node));
        (end, min_idx) = (node.start, node.min_idx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::common::BOS_EOS_CONNECTION_ID;
    use crate::dictionary::WordType;
    use crate::dictionary::connector::MatrixConnector;
    use crate::dictionary::lexicon::WordParam;

    fn connector() -> MatrixConnector {
        let mut conn = MatrixConnector::new(4, 4);
        let mut seed = 7i32;
        for right_id in 0..4 {
            for left_id in 0..4 {
                seed = (seed * 31 + 11) % 97;
                conn.put(right_id, left_id, (seed - 48) as i16);
            }
        }
        conn
    }

    /// (start, end, left_id, right_id, word_cost)
    const NODES: &[(usize, usize, u16, u16, i16)] = &[
        (0, 1, 1, 2, 10),
        (0, 2, 2, 1, 30),
        (0, 3, 3, 3, 55),
        (1, 2, 1, 1, -5),
        (1, 3, 2, 2, 12),
        (2, 3, 3, 1, 4),
        (2, 4, 1, 3, 20),
        (3, 4, 2, 2, 3),
        (3, 4, 3, 1, 3),
        (1, 4, 1, 2, 40),
    ];

    fn build_lattice(conn: &MatrixConnector) -> Lattice {
        let mut lattice = Lattice::default();
        lattice.reset(4);
        for (i, &(start, end, left_id, right_id, cost)) in NODES.iter().enumerate() {
            lattice.insert_node(
                start,
                end,
                i as u32,
                WordType::Known,
                WordParam::new(left_id, right_id, cost),
            );
        }
        lattice.insert_eos();
        forward(&mut lattice, conn);
        lattice
    }

    fn brute_force(conn: &MatrixConnector, pos: usize, prev: Option<usize>) -> i32 {
        if pos == 4 {
            return prev.map_or(0, |p| conn.cost(NODES[p].3, BOS_EOS_CONNECTION_ID));
        }
        NODES
            .iter()
            .enumerate()
            .filter(|(_, n)| n.0 == pos)
            .map(|(i, n)| {
                let conn_cost = prev.map_or(0, |p| conn.cost(NODES[p].3, n.2));
                conn_cost + i32::from(n.4) + brute_force(conn, n.1, Some(i))
            })
            .min()
            .unwrap_or(MAX_COST / 2)
    }

    fn path_cost(conn: &MatrixConnector, path: &[usize]) -> i32 {
        let mut cost = 0;
        for (k, &i) in path.iter().enumerate() {
            cost += i32::from(NODES[i].4);
            if k > 0 {
                cost += conn.cost(NODES[path[k - 1]].3, NODES[i].2);
            }
        }
        cost + conn.cost(NODES[*path.last().unwrap()].3, BOS_EOS_CONNECTION_ID)
    }

    #[test]
    fn test_optimal() {
        let conn = connector();
        let lattice = build_lattice(&conn);
        let expected = brute_force(&conn, 0, None);
        assert_eq!(lattice.eos().unwrap().min_cost, expected);

        let mut top_nodes = vec![];
        backward(&lattice, &mut top_nodes);
        let path: Vec<usize> = top_nodes.iter().rev().map(|(_, n)| n.word_id as usize).collect();
        assert_eq!(path_cost(&conn, &path), expected);

        let mut pos = 0;
        for (end, node) in top_nodes.iter().rev() {
            assert_eq!(node.start, pos);
            pos = *end;
        }
        assert_eq!(pos, 4);
    }

    #[test]
    fn test_first_minimum_wins() {
        let conn = MatrixConnector::new(1, 1);
        let mut lattice = Lattice::default();
        lattice.reset(2);
        lattice.insert_node(0, 2, 0, WordType::Known, WordParam::new(0, 0, 5));
        lattice.insert_node(0, 1, 1, WordType::Known, WordParam::new(0, 0, 2));
        lattice.insert_node(1, 2, 2, WordType::Known, WordParam::new(0, 0, 3));
        lattice.insert_node(0, 2, 3, WordType::Unknown, WordParam::new(0, 0, 5));
        lattice.insert_eos();
        forward(&mut lattice, &conn);

        let mut top_nodes = vec![];
        backward(&lattice, &mut top_nodes);
        assert_eq!(top_nodes.len(), 1);
        assert_eq!(top_nodes[0].1.word_id, 0);
    }

    #[test]
    fn test_unreachable_node() {
        let conn = MatrixConnector::new(1, 1);
        let mut lattice = Lattice::default();
        lattice.reset(3);
        lattice.insert_node(0, 2, 0, WordType::Known, WordParam::new(0, 0, 1));
        lattice.insert_node(1, 3, 1, WordType::Known, WordParam::new(0, 0, 1));
        lattice.insert_node(2, 3, 2, WordType::Known, WordParam::new(0, 0, 1));
        lattice.insert_eos();
        forward(&mut lattice, &conn);

        assert!(!lattice.ends_at(3)[0].is_connected_to_bos());
        let mut top_nodes = vec![];
        backward(&lattice, &mut top_nodes);
        let ids: Vec<_> = top_nodes.iter().rev().map(|(_, n)| n.word_id).collect();
        assert_eq!(ids, vec![0, 2]);
    }

    #[test]
    fn test_saturating_cost() {
        let mut conn = MatrixConnector::new(1, 1);
        conn.put(0, 0, i16::MAX);
        let mut lattice = Lattice::default();
        let len = 70_000;
        lattice.reset(len);
        for i in 0..len {
            lattice.insert_node(i, i + 1, 0, WordType::Known, WordParam::new(0, 0, i16::MAX));
        }
        lattice.insert_eos();
        forward(&mut lattice, &conn);
        assert_eq!(lattice.ends_at(len)[0].min_cost, MAX_COST);
    }
}
