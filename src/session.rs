use std::time::Duration;

use crate::config::{drop_interval_for_level, LINES_PER_LEVEL, LINE_SCORES};

/// Score, level, lines and gravity speed for one play-through.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Session {
    pub score: u32,
    pub level: u32,
    pub lines: u32,
    pub drop_interval: Duration,
}

impl Session {
    pub fn new() -> Self {
        Self {
            score: 0,
            level: 1,
            lines: 0,
            drop_interval: drop_interval_for_level(1),
        }
    }

    /// Points for clearing `cleared` rows at once at the current level.
    pub fn line_clear_points(&self, cleared: u32) -> u32 {
        let index = (cleared as usize).min(LINE_SCORES.len() - 1);
        LINE_SCORES[index] * self.level
    }

    /// Books a clearing pass. Returns false (and changes nothing) when no rows were cleared.
    pub fn apply_line_clear(&mut self, cleared: u32) -> bool {
        if cleared == 0 {
            return false;
        }
        self.lines += cleared;
        self.score += self.line_clear_points(cleared);
        self.level = self.lines / LINES_PER_LEVEL + 1;
        self.drop_interval = drop_interval_for_level(self.level);
        true
    }

    pub fn add_points(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// What the score/level/lines display shows.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Stats {
    pub score: u32,
    pub level: u32,
    pub lines: u32,
    pub high_score: u32,
}
