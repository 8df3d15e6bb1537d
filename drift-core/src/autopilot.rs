//! Grid-scanning autopilot.
//!
//! Every frame the autopilot scores a fixed grid of target points against the
//! obstacles ahead of the ship and steers toward the safest one. It is greedy
//! and memoryless: nothing carries over between frames except the ship
//! position itself.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::obstacle::Obstacle;

/// Tuning for the grid scanner. The defaults are the empirically tuned values
/// the game ships with.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutopilotConfig {
    pub x_steps: Vec<f32>,
    pub y_steps: Vec<f32>,
    /// Half-width of the box around a candidate in which an obstacle counts
    /// as a threat. Tight enough to skim past the 1.6 hitbox.
    pub threat_margin: f32,
    pub threat_weight: f32,
    pub distance_exponent: f32,
    pub centering_weight: f32,
    pub stability_weight: f32,
    pub steering_gain: f32,
    pub bound_x: f32,
    pub bound_y: f32,
    /// Obstacles are scanned while `window_far < z < window_near`.
    pub window_near: f32,
    pub window_far: f32,
}

impl Default for AutopilotConfig {
    fn default() -> Self {
        Self {
            x_steps: vec![-5.0, -2.5, 0.0, 2.5, 5.0],
            y_steps: vec![-3.0, 0.0, 3.0],
            threat_margin: 2.2,
            threat_weight: 50_000.0,
            distance_exponent: 1.2,
            centering_weight: 0.1,
            stability_weight: 5.0,
            steering_gain: 12.0,
            bound_x: 6.0,
            bound_y: 4.5,
            window_near: 8.0,
            window_far: -60.0,
        }
    }
}

impl AutopilotConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.x_steps.is_empty() || self.y_steps.is_empty() {
            return Err(ConfigError::EmptyGrid);
        }
        if self
            .x_steps
            .iter()
            .chain(self.y_steps.iter())
            .any(|step| !step.is_finite())
        {
            return Err(ConfigError::NonFiniteValue { field: "grid step" });
        }

        let scalars = [
            ("threat_margin", self.threat_margin),
            ("threat_weight", self.threat_weight),
            ("distance_exponent", self.distance_exponent),
            ("steering_gain", self.steering_gain),
            ("bound_x", self.bound_x),
            ("bound_y", self.bound_y),
        ];
        for (field, value) in scalars {
            if !value.is_finite() {
                return Err(ConfigError::NonFiniteValue { field });
            }
            if value <= 0.0 {
                return Err(ConfigError::NonPositive { field, value });
            }
        }
        for (field, value) in [
            ("centering_weight", self.centering_weight),
            ("stability_weight", self.stability_weight),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NonFiniteValue { field });
            }
        }

        if !(self.window_far < self.window_near) {
            return Err(ConfigError::InvalidWindow {
                near: self.window_near,
                far: self.window_far,
            });
        }
        Ok(())
    }

    pub fn candidate_count(&self) -> usize {
        self.x_steps.len() * self.y_steps.len()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    pub x: f32,
    pub y: f32,
    pub danger: f32,
}

#[derive(Clone, Debug)]
pub struct Autopilot {
    cfg: AutopilotConfig,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self {
            cfg: AutopilotConfig::default(),
        }
    }
}

impl Autopilot {
    pub fn new(cfg: AutopilotConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    pub fn config(&self) -> &AutopilotConfig {
        &self.cfg
    }

    fn in_window(&self, obstacle: &Obstacle) -> bool {
        obstacle.visible && obstacle.z > self.cfg.window_far && obstacle.z < self.cfg.window_near
    }

    /// Scores every grid point, in x-major order.
    pub fn score_candidates(
        &self,
        ship: (f32, f32, f32),
        obstacles: &[Obstacle],
    ) -> Vec<Candidate> {
        let (ship_x, ship_y, ship_z) = ship;
        let cfg = &self.cfg;

        let mut candidates: Vec<Candidate> = cfg
            .x_steps
            .iter()
            .flat_map(|&x| cfg.y_steps.iter().map(move |&y| Candidate { x, y, danger: 0.0 }))
            .collect();

        for obstacle in obstacles.iter().filter(|obs| self.in_window(obs)) {
            let dist_z = (obstacle.z - ship_z).abs();
            let threat = cfg.threat_weight / (dist_z.powf(cfg.distance_exponent) + 1.0);
            for cand in candidates.iter_mut() {
                let dist_x = (obstacle.x - cand.x).abs();
                let dist_y = (obstacle.y - cand.y).abs();
                if dist_x < cfg.threat_margin && dist_y < cfg.threat_margin {
                    cand.danger += threat;
                }
            }
        }

        for cand in candidates.iter_mut() {
            cand.danger += (cand.x.abs() + cand.y.abs()) * cfg.centering_weight;
            let dist_move = (cand.x - ship_x).abs() + (cand.y - ship_y).abs();
            cand.danger += dist_move * cfg.stability_weight;
        }

        candidates
    }

    /// Safest grid point. Ties go to the earliest candidate in scan order.
    pub fn choose_target(&self, ship: (f32, f32, f32), obstacles: &[Obstacle]) -> Candidate {
        let candidates = self.score_candidates(ship, obstacles);
        let mut best = candidates[0];
        for cand in &candidates[1..] {
            if cand.danger < best.danger {
                best = *cand;
            }
        }
        best
    }

    /// Moves the ship part of the way toward `target`, then clamps it to the
    /// playable area.
    pub fn steer(&self, current: (f32, f32), target: &Candidate, delta: f32) -> (f32, f32) {
        let t = delta * self.cfg.steering_gain;
        let x = lerp(current.0, target.x, t).clamp(-self.cfg.bound_x, self.cfg.bound_x);
        let y = lerp(current.1, target.y, t).clamp(-self.cfg.bound_y, self.cfg.bound_y);
        (x, y)
    }

    /// One frame of autopilot control: new ship `(x, y)`.
    pub fn drive(&self, ship: (f32, f32, f32), obstacles: &[Obstacle], delta: f32) -> (f32, f32) {
        let target = self.choose_target(ship, obstacles);
        self.steer((ship.0, ship.1), &target, delta)
    }
}

pub(crate) fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}
