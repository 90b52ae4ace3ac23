use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Result};

// ============================================================================
// Board
// ============================================================================

pub const COLS: usize = 10;
pub const ROWS: usize = 20;

// ============================================================================
// Timing (in milliseconds)
// ============================================================================

pub const BASE_DROP_MS: u64 = 1000;
pub const MIN_DROP_MS: u64 = 100;
pub const DROP_SPEEDUP_PER_LEVEL_MS: u64 = 100;
pub const LINES_PER_LEVEL: u32 = 10;

/// Display refresh period the terminal host schedules frames at (~60 Hz).
pub const FRAME_PERIOD: Duration = Duration::from_millis(16);

// ============================================================================
// Scoring
// ============================================================================

/// Points for 0, 1, 2, 3 and 4 rows cleared at once, before the level multiplier.
pub const LINE_SCORES: [u32; 5] = [0, 100, 300, 500, 800];
pub const SOFT_DROP_POINTS: u32 = 1;
pub const HARD_DROP_POINTS_PER_ROW: u32 = 2;

// ============================================================================
// Rotation
// ============================================================================

/// Horizontal corrections tried after a rotation, in order.
pub const KICKS: [i32; 5] = [0, -1, 1, -2, 2];

/// Drop interval for a given level: 1000ms at level 1, 100ms faster per level, 100ms floor.
pub fn drop_interval_for_level(level: u32) -> Duration {
    let reduction = u64::from(level.saturating_sub(1)) * DROP_SPEEDUP_PER_LEVEL_MS;
    Duration::from_millis(BASE_DROP_MS.saturating_sub(reduction).max(MIN_DROP_MS))
}

// ============================================================================
// Runtime configuration (command line)
// ============================================================================

pub const DEFAULT_LOG_FILE: &str = "blockfall.log";

pub const USAGE: &str = "usage: blockfall [--seed <u64>] [--log <path>]";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Seed for a reproducible piece sequence; entropy when absent.
    pub seed: Option<u64>,
    /// Where log output goes. The terminal is in raw mode, so logs never go to stderr.
    pub log_file: Option<PathBuf>,
    pub show_help: bool,
}

impl Config {
    /// Parses arguments (without the program name).
    pub fn from_args(args: &[String]) -> Result<Self> {
        let mut config = Config::default();
        let mut i = 0usize;
        while i < args.len() {
            match args[i].as_str() {
                "--seed" => {
                    i += 1;
                    let v = args
                        .get(i)
                        .ok_or_else(|| anyhow!("missing value for --seed"))?;
                    config.seed = Some(
                        v.parse::<u64>()
                            .map_err(|_| anyhow!("invalid --seed value: {}", v))?,
                    );
                }
                "--log" => {
                    i += 1;
                    let v = args
                        .get(i)
                        .ok_or_else(|| anyhow!("missing value for --log"))?;
                    config.log_file = Some(PathBuf::from(v));
                }
                "-h" | "--help" => config.show_help = true,
                other => return Err(anyhow!("unknown argument: {}\n{}", other, USAGE)),
            }
            i += 1;
        }
        Ok(config)
    }

    /// Log destination: the explicit `--log` path, or the default file when
    /// `RUST_LOG` asks for logging.
    pub fn log_destination(&self, rust_log_set: bool) -> Option<PathBuf> {
        match &self.log_file {
            Some(path) => Some(path.clone()),
            None if rust_log_set => Some(PathBuf::from(DEFAULT_LOG_FILE)),
            None => None,
        }
    }
}
