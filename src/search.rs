use std::{
    cmp::Ordering,
    collections::BinaryHeap,
    fmt::{Display, Formatter},
};

use derive_more::Display;
use log::{debug, trace};
use serde::Serialize;

use crate::{config::SearchConfig, euclidean, heuristic, Grid, Position};

#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum SearchError {
    #[display(fmt = "Start {} out of range", _0)]
    StartOutOfRange(Position),
    #[display(fmt = "End {} out of range", _0)]
    EndOutOfRange(Position),
    #[display(fmt = "Adjacency is stale, call compute_adjacency after editing obstacles")]
    StaleAdjacency,
    #[display(fmt = "Search result no longer matches the grid")]
    StaleWitness,
    #[display(fmt = "Parent chain from {} never reaches {}", end, start)]
    BrokenParentChain { start: Position, end: Position },
}

impl std::error::Error for SearchError {}

/// Proof that a run reached its goal. Only the search engine can create one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Found {
    pub(crate) start: Position,
    pub(crate) end: Position,
    pub(crate) epoch: u64,
}

impl Display for Found {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.start, self.end)
    }
}

impl Found {
    pub fn start(&self) -> Position {
        self.start
    }

    pub fn end(&self) -> Position {
        self.end
    }
}

/// How a search run ended.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    #[display(fmt = "Found {}", _0)]
    Found(Found),
    #[display(fmt = "No path")]
    Exhausted,
    #[display(fmt = "Expansion budget exceeded")]
    BudgetExceeded,
}

impl Outcome {
    pub fn found(self) -> Option<Found> {
        match self {
            Outcome::Found(found) => Some(found),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    InProgress,
    Done(Outcome),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SearchStats {
    pub pops: usize,
    pub expansions: usize,
    /// Expansions of a cell that had already been expanded through an older frontier entry.
    pub redundant_expansions: usize,
    pub pushes: usize,
}

/// Frontier entry keyed by the scores recorded when it was pushed.
struct FrontierEntry {
    position: Position,
    f_score: f64,
    h_score: f64,
    sequence: u64,
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FrontierEntry {}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierEntry {
    // Reversed so the max-heap pops the lowest f, then the lowest h, then the oldest push.
    fn cmp(&self, other: &Self) -> Ordering {
        self.f_score
            .total_cmp(&other.f_score)
            .then_with(|| self.h_score.total_cmp(&other.h_score))
            .then_with(|| self.sequence.cmp(&other.sequence))
            .reverse()
    }
}

/// An A* run over a [`Grid`], advanced one expansion at a time with [`Search::step`].
///
/// The run writes its scores, parents and visited flags into the grid's cells; a stale frontier
/// entry is left in the heap when a cheaper one is pushed for the same cell.
pub struct Search<'g> {
    grid: &'g mut Grid,
    start: Position,
    end: Position,
    config: SearchConfig,
    frontier: BinaryHeap<FrontierEntry>,
    sequence: u64,
    stats: SearchStats,
    finished: Option<Outcome>,
}

impl<'g> Search<'g> {
    /// Validates the endpoints, resets the grid's per-run state and seeds the frontier with
    /// `start`.
    pub fn new(
        grid: &'g mut Grid,
        start: Position,
        end: Position,
        config: SearchConfig,
    ) -> Result<Self, SearchError> {
        if !grid.contains(&start) {
            return Err(SearchError::StartOutOfRange(start));
        }

        if !grid.contains(&end) {
            return Err(SearchError::EndOutOfRange(end));
        }

        if !grid.is_adjacency_current() {
            return Err(SearchError::StaleAdjacency);
        }

        grid.reset_search_state();

        let mut search = Self {
            grid,
            start,
            end,
            config,
            frontier: BinaryHeap::new(),
            sequence: 0,
            stats: SearchStats::default(),
            finished: None,
        };
        search.push(start, 0.0, 0.0);
        Ok(search)
    }

    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    /// Pops one frontier entry and relaxes its neighbors. Once the run is done, every further
    /// call returns the same outcome.
    pub fn step(&mut self) -> Step {
        if let Some(outcome) = self.finished {
            return Step::Done(outcome);
        }

        match self.advance() {
            Some(outcome) => {
                debug!("{} after {:?}", outcome, self.stats);
                self.finished = Some(outcome);
                Step::Done(outcome)
            }
            None => Step::InProgress,
        }
    }

    /// Steps until the run is done.
    pub fn run(&mut self) -> Outcome {
        loop {
            if let Step::Done(outcome) = self.step() {
                return outcome;
            }
        }
    }

    fn advance(&mut self) -> Option<Outcome> {
        let Some(curr) = self.frontier.pop() else {
            return Some(Outcome::Exhausted);
        };
        self.stats.pops += 1;

        trace!(
            "curr:{} f:{:?} h:{:?}",
            curr.position,
            curr.f_score,
            curr.h_score
        );

        if curr.position == self.end {
            return Some(Outcome::Found(Found {
                start: self.start,
                end: self.end,
                epoch: self.grid.epoch,
            }));
        }

        // Popping the goal is not an expansion, so the budget only applies past this point.
        if self
            .config
            .max_expansions
            .is_some_and(|max| self.stats.expansions >= max)
        {
            return Some(Outcome::BudgetExceeded);
        }

        let idx = self.grid.index(&curr.position);
        let cell = &mut self.grid.cells[idx];
        if cell.visited {
            // There can be duplicate entries for a cell whose score improved after an earlier push.
            debug!("re-expanding {}", curr.position);
            self.stats.redundant_expansions += 1;
        }
        cell.visited = true;
        self.stats.expansions += 1;

        let current_g = cell.g_score;
        let neighbors = std::mem::take(&mut cell.neighbors);
        for adj in &neighbors {
            let adj_idx = self.grid.index(adj);
            let next = &mut self.grid.cells[adj_idx];
            if next.visited {
                continue;
            }

            let h_score = heuristic(adj, &self.end);
            let g_score = current_g + euclidean(adj, &curr.position);
            let f_score = g_score + h_score;
            if f_score < next.f_score {
                trace!("relax:{} g:{:?} f:{:?}", adj, g_score, f_score);
                next.f_score = f_score;
                next.g_score = g_score;
                next.parent = Some(curr.position);
                self.push(*adj, f_score, h_score);
            }
        }
        self.grid.cells[idx].neighbors = neighbors;

        None
    }

    fn push(&mut self, position: Position, f_score: f64, h_score: f64) {
        self.frontier.push(FrontierEntry {
            position,
            f_score,
            h_score,
            sequence: self.sequence,
        });
        self.sequence += 1;
        self.stats.pushes += 1;
    }
}

/**
 * Runs an unbounded A* search from `start` to `end`, leaving scores and parents in the grid.
 * Exhausted if the goal cannot be reached, including an impassable start or end.
 * Err if an endpoint is out of range or adjacency is stale.
 */
pub fn find_path(grid: &mut Grid, start: Position, end: Position) -> Result<Outcome, SearchError> {
    find_path_with(grid, start, end, SearchConfig::default())
}

/**
 * Same as `find_path`, with the limits in `config` applied.
 * BudgetExceeded once `max_expansions` cells have been expanded without popping the goal.
 */
pub fn find_path_with(
    grid: &mut Grid,
    start: Position,
    end: Position,
    config: SearchConfig,
) -> Result<Outcome, SearchError> {
    Ok(Search::new(grid, start, end, config)?.run())
}
