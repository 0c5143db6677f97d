//! Obstacle sets (gates) and the FIFO manager that spawns and retires them
//!
//! Gate placement is the only source of randomness in an episode, so the
//! manager owns its own seeded RNG.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::obstacle::Obstacle;
use crate::consts::*;
use crate::ring_center;

/// How gates are laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateLayout {
    /// Always the canonical centered block
    Fixed,
    /// Pattern and opening drawn from the manager's RNG
    Random,
}

impl GateLayout {
    pub fn from_random_flag(random_obstacles: bool) -> Self {
        if random_obstacles {
            GateLayout::Random
        } else {
            GateLayout::Fixed
        }
    }
}

/// Shape of a gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GateKind {
    /// One block straddling the ring axis; balls pass on both sides
    CenterBlock,
    /// Two blocks with an opening around the ring axis
    Split,
    /// One block attached to the left wall
    LeftWall,
    /// One block attached to the right wall
    RightWall,
}

/// One gate: 1-2 obstacles spawned together, membership fixed at creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObstacleSet {
    pub id: u64,
    pub kind: GateKind,
    obstacles: Vec<Obstacle>,
}

impl ObstacleSet {
    pub fn new(id: u64, kind: GateKind, obstacles: Vec<Obstacle>) -> Self {
        debug_assert!(
            (1..=2).contains(&obstacles.len()),
            "a gate holds one or two obstacles"
        );
        Self {
            id,
            kind,
            obstacles,
        }
    }

    /// Build a gate from horizontal spans, dropping slivers too thin to matter
    fn from_spans(id: u64, kind: GateKind, spans: &[(f32, f32)]) -> Self {
        let obstacles = spans
            .iter()
            .filter(|(l, r)| r - l >= MIN_OBSTACLE_WIDTH)
            .map(|&(l, r)| Obstacle::spawn(l, r))
            .collect();
        Self::new(id, kind, obstacles)
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Obstacle> {
        self.obstacles.iter()
    }

    pub fn move_down(&mut self) {
        for obstacle in &mut self.obstacles {
            obstacle.move_down();
        }
    }

    /// True once every obstacle has scrolled past the bottom of the board
    pub fn out_of_frame(&self) -> bool {
        self.obstacles.iter().all(Obstacle::out_of_frame)
    }

    /// Lowest edge of the gate
    pub fn bottom(&self) -> f32 {
        self.obstacles
            .iter()
            .map(Obstacle::bottom)
            .fold(f32::NEG_INFINITY, f32::max)
    }
}

impl<'a> IntoIterator for &'a ObstacleSet {
    type Item = &'a Obstacle;
    type IntoIter = std::slice::Iter<'a, Obstacle>;

    fn into_iter(self) -> Self::IntoIter {
        self.obstacles.iter()
    }
}

/// Owns the live gates, oldest first
#[derive(Debug, Clone)]
pub struct ObstacleManager {
    sets: VecDeque<ObstacleSet>,
    layout: GateLayout,
    rng: Pcg32,
    next_id: u64,
}

impl ObstacleManager {
    pub fn new(layout: GateLayout, seed: u64) -> Self {
        Self {
            sets: VecDeque::new(),
            layout,
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        }
    }

    pub fn layout(&self) -> GateLayout {
        self.layout
    }

    /// Append a freshly generated gate at the tail
    pub fn new_obstacle_set(&mut self) {
        let id = self.next_id;
        self.next_id += 1;

        let set = match self.layout {
            GateLayout::Fixed => Self::center_block(id),
            GateLayout::Random => self.random_gate(id),
        };
        log::debug!(
            "Spawned gate {} ({:?}) with {} obstacle(s)",
            set.id,
            set.kind,
            set.len()
        );
        self.sets.push_back(set);
    }

    /// Canonical layout: a block centered on the ring axis
    fn center_block(id: u64) -> ObstacleSet {
        let cx = ring_center().x;
        let half = CENTER_BLOCK_WIDTH / 2.0;
        ObstacleSet::from_spans(id, GateKind::CenterBlock, &[(cx - half, cx + half)])
    }

    /// Random layout. Every pattern keeps the ring axis clear by at least one
    /// ball radius on each side, so stacking the balls vertically always passes.
    fn random_gate(&mut self, id: u64) -> ObstacleSet {
        let width = BOARD_WIDTH as f32;
        let cx = ring_center().x;

        match self.rng.random_range(0..3u32) {
            0 => {
                let lo = (cx + BALL_RADIUS - SPLIT_GAP_WIDTH).max(0.0);
                let hi = (cx - BALL_RADIUS).min(width - SPLIT_GAP_WIDTH);
                let gap_left = self.rng.random_range(lo..=hi).round();
                let gap_right = gap_left + SPLIT_GAP_WIDTH;
                ObstacleSet::from_spans(
                    id,
                    GateKind::Split,
                    &[(0.0, gap_left), (gap_right, width)],
                )
            }
            1 => {
                let lo = cx - ORBIT_RADIUS + BALL_RADIUS;
                let hi = cx - BALL_RADIUS;
                let edge = self.rng.random_range(lo..=hi).round();
                ObstacleSet::from_spans(id, GateKind::LeftWall, &[(0.0, edge)])
            }
            _ => {
                let lo = cx + BALL_RADIUS;
                let hi = cx + ORBIT_RADIUS - BALL_RADIUS;
                let edge = self.rng.random_range(lo..=hi).round();
                ObstacleSet::from_spans(id, GateKind::RightWall, &[(edge, width)])
            }
        }
    }

    /// Pop the oldest gate. No-op when empty.
    pub fn remove_obstacle_set(&mut self) -> Option<ObstacleSet> {
        let removed = self.sets.pop_front();
        if let Some(set) = &removed {
            log::debug!("Retired gate {}", set.id);
        }
        removed
    }

    /// Oldest live gate. Callers must check `is_empty` first.
    pub fn oldest_obstacle_set(&self) -> &ObstacleSet {
        debug_assert!(!self.sets.is_empty(), "no live obstacle set");
        &self.sets[0]
    }

    /// Checked variant of [`Self::oldest_obstacle_set`]
    pub fn try_oldest(&self) -> Option<&ObstacleSet> {
        self.sets.front()
    }

    /// True iff the oldest gate has entirely left the board
    pub fn oldest_out_of_frame(&self) -> bool {
        self.sets.front().is_some_and(ObstacleSet::out_of_frame)
    }

    /// Live gates, oldest first
    pub fn obstacle_sets(&self) -> &VecDeque<ObstacleSet> {
        &self.sets
    }

    /// Every live obstacle in creation order
    pub fn iter(&self) -> impl Iterator<Item = &Obstacle> {
        self.sets.iter().flat_map(ObstacleSet::iter)
    }

    /// Advance every live obstacle by one tick
    pub fn move_all(&mut self) {
        for set in &mut self.sets {
            set.move_down();
        }
    }

    /// Append a prebuilt gate (scripted scenarios)
    pub fn push_set(&mut self, set: ObstacleSet) {
        self.next_id = self.next_id.max(set.id + 1);
        self.sets.push_back(set);
    }

    pub fn clear(&mut self) {
        self.sets.clear();
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}
