//! Board configuration: dimensions, gem kinds, screen geometry and animation tuning.

use thiserror::Error;

/// Screen-space geometry of the board. Units are whatever the renderer uses (pixels for a
/// sprite renderer); the engine only needs them to be consistent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    /// Edge length of one gem tile.
    pub tile_size: f32,
    /// Gap between neighbouring tiles.
    pub padding: f32,
    /// Left edge of the board.
    pub margin_x: f32,
    /// Top edge of the board.
    pub margin_y: f32,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            tile_size: 64.0,
            padding: 10.0,
            margin_x: 20.0,
            margin_y: 50.0,
        }
    }
}

/// Animation rates and thresholds for gem entities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tuning {
    /// Translation speed in units per second, applied per axis.
    pub translate_speed: f32,
    /// Shrink rate of a matched gem, in size factor per second.
    pub destroy_speed: f32,
    /// Distance under which a moving gem counts as arrived, and under which gravity snaps
    /// instead of animating.
    pub snap_threshold: f32,
    /// A matched gem is destroyed once its size factor falls below this.
    pub destroy_threshold: f32,
    /// Tilt rate of a selected gem in degrees per second.
    pub tilt_speed_deg: f32,
    /// Tilt bounces between plus and minus this angle.
    pub max_tilt_deg: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            translate_speed: 400.0,
            destroy_speed: 1.3,
            snap_threshold: 5.0,
            destroy_threshold: 0.1,
            tilt_speed_deg: 45.0,
            max_tilt_deg: 15.0,
        }
    }
}

/// Everything a [`crate::Board`] needs; passed in explicitly, no process-wide state.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardConfig {
    pub width: usize,
    pub height: usize,
    /// Number of distinct gem kinds (K); kinds are `0..kinds`.
    pub kinds: u8,
    pub geometry: Geometry,
    pub tuning: Tuning,
    /// When false, gravity and refill place gems instantly.
    pub animate_refill: bool,
    /// RNG seed for refill kinds. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            width: 8,
            height: 8,
            kinds: 8,
            geometry: Geometry::default(),
            tuning: Tuning::default(),
            animate_refill: true,
            seed: None,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("board dimensions must be non-zero (got {width}x{height})")]
    ZeroDimension { width: usize, height: usize },
    #[error("board dimensions too large: {width}x{height} (max {max} per side)")]
    TooLarge {
        width: usize,
        height: usize,
        max: usize,
    },
    #[error("at least 2 gem kinds are required (got {0})")]
    TooFewKinds(u8),
    #[error("{field} must be positive (got {value})")]
    NonPositive { field: &'static str, value: f32 },
}

/// Upper bound per board side; keeps ids and coordinates comfortably in range.
pub const MAX_BOARD_SIDE: usize = 64;

impl BoardConfig {
    /// Check that the configuration describes a playable board.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::ZeroDimension {
                width: self.width,
                height: self.height,
            });
        }
        if self.width > MAX_BOARD_SIDE || self.height > MAX_BOARD_SIDE {
            return Err(ConfigError::TooLarge {
                width: self.width,
                height: self.height,
                max: MAX_BOARD_SIDE,
            });
        }
        if self.kinds < 2 {
            return Err(ConfigError::TooFewKinds(self.kinds));
        }
        let positive = [
            ("tile_size", self.geometry.tile_size),
            ("translate_speed", self.tuning.translate_speed),
            ("destroy_speed", self.tuning.destroy_speed),
            ("snap_threshold", self.tuning.snap_threshold),
            ("destroy_threshold", self.tuning.destroy_threshold),
            ("tilt_speed_deg", self.tuning.tilt_speed_deg),
            ("max_tilt_deg", self.tuning.max_tilt_deg),
        ];
        for (field, value) in positive {
            if value.is_nan() || value <= 0.0 {
                return Err(ConfigError::NonPositive { field, value });
            }
        }
        if self.geometry.padding < 0.0 {
            return Err(ConfigError::NonPositive {
                field: "padding",
                value: self.geometry.padding,
            });
        }
        Ok(())
    }

    /// Builder-style seed override, handy for deterministic runs.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
