//! Plans minimum length paths through an [`OccupancyGrid`], using an A* algorithm.
//!
//! Moves are 4-connected with unit cost and the heuristic is the Manhattan distance, which is
//! admissible and consistent on such a grid, so the first time the goal is popped from the heap
//! the path to it is optimal.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::collections::{BinaryHeap, HashMap};

use log::{debug, trace};
use serde::Serialize;

use crate::auto::{
    map::{GridCell, OccupancyGrid},
    path::GridPath,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Summary of a single planning attempt.
#[derive(Debug, Clone, Serialize)]
pub struct PlanReport {
    pub start: GridCell,

    pub goal: GridCell,

    /// Number of nodes popped and expanded from the open set
    pub num_expanded: usize,

    /// `None` if no path was found
    pub path: Option<GridPath>,
}

/// An A* node
#[derive(Debug, Clone, Copy)]
struct Node {
    cell: GridCell,

    /// Cost from the start to this node
    cost: usize,

    /// Cost plus heuristic
    priority: usize,

    /// Order the node was pushed in, used to break ties so that planning is deterministic
    seq: usize,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl Eq for Node {}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Note that we flip the order here so that the heap will be a min-heap, not a max-heap.
        // Equal priorities are popped in the order they were pushed.
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Plan a shortest path from `start` to `goal`.
///
/// Returns `None` if either cell is outside the grid or blocked, or if the goal cannot be reached.
/// The returned path includes both the start and the goal.
pub fn plan(grid: &OccupancyGrid, start: GridCell, goal: GridCell) -> Option<GridPath> {
    plan_with_report(grid, start, goal).path
}

/// Plan a shortest path from `start` to `goal`, also returning statistics about the search.
pub fn plan_with_report(grid: &OccupancyGrid, start: GridCell, goal: GridCell) -> PlanReport {
    let mut report = PlanReport {
        start,
        goal,
        num_expanded: 0,
        path: None,
    };

    if !grid.is_free(&start) {
        debug!("Start cell {} is outside the grid or blocked", start);
        return report;
    }
    if !grid.is_free(&goal) {
        debug!("Goal cell {} is outside the grid or blocked", goal);
        return report;
    }

    // Priority queue of nodes still to expand
    let mut heap = BinaryHeap::new();

    // Lowest known cost to each cell, and the cell it was reached from
    let mut costs: HashMap<GridCell, usize> = HashMap::new();
    let mut came_from: HashMap<GridCell, GridCell> = HashMap::new();

    let mut num_pushed = 0;

    costs.insert(start, 0);
    heap.push(Node {
        cell: start,
        cost: 0,
        priority: start.manhattan(&goal),
        seq: num_pushed,
    });
    num_pushed += 1;

    while let Some(node) = heap.pop() {
        // Stale entry, a cheaper route to this cell has already been pushed
        if costs.get(&node.cell).map_or(false, |c| node.cost > *c) {
            continue;
        }

        report.num_expanded += 1;

        if node.cell == goal {
            let path = reconstruct(&came_from, start, goal);
            trace!(
                "Found path of {} cells after {} expansions",
                path.len(),
                report.num_expanded
            );
            report.path = Some(path);
            break;
        }

        for next in grid.neighbours(&node.cell) {
            if !grid.is_free(&next) {
                continue;
            }

            let cost = node.cost + 1;

            if costs.get(&next).map_or(true, |c| cost < *c) {
                costs.insert(next, cost);
                came_from.insert(next, node.cell);
                heap.push(Node {
                    cell: next,
                    cost,
                    priority: cost + next.manhattan(&goal),
                    seq: num_pushed,
                });
                num_pushed += 1;
            }
        }
    }

    if report.path.is_none() {
        debug!(
            "No path from {} to {} after {} expansions",
            start, goal, report.num_expanded
        );
    }

    report
}

/// Walk back through the parents of `goal` to build the path.
fn reconstruct(
    came_from: &HashMap<GridCell, GridCell>,
    start: GridCell,
    goal: GridCell,
) -> GridPath {
    let mut cells = vec![goal];
    let mut current = goal;

    while current != start {
        match came_from.get(&current) {
            Some(prev) => {
                current = *prev;
                cells.push(current);
            }
            // Every cell other than the start has a parent
            None => break,
        }
    }

    cells.reverse();
    GridPath::new(cells)
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
