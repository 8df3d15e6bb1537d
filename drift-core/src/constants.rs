//! Gameplay and anti-cheat constants shared by the game core, the API server
//! and the autopilot lab.

// Tunnel and obstacle field
pub const TUNNEL_RADIUS: f32 = 15.0;
pub const OBSTACLE_COUNT: usize = 50;
pub const SHIP_SPEED_MULTIPLIER: f32 = 0.8;
/// Obstacles spawn within `(r - 0.5) * OBSTACLE_SPREAD` on both axes.
pub const OBSTACLE_SPREAD: f32 = TUNNEL_RADIUS * 0.8;
pub const OBSTACLE_INITIAL_Z: f32 = -100.0;
pub const OBSTACLE_INITIAL_Z_DEPTH: f32 = 200.0;
pub const OBSTACLE_RECYCLE_Z: f32 = -200.0;
pub const OBSTACLE_RECYCLE_Z_DEPTH: f32 = 100.0;
/// Obstacles past this z are hidden (behind the camera plane).
pub const OBSTACLE_HIDE_Z: f32 = 2.0;
/// Obstacles past this z are recycled and count as passed.
pub const OBSTACLE_PASSED_Z: f32 = 10.0;

// Scoring and pace
pub const BASE_SPEED: f32 = 0.8;
pub const SPEED_INCREMENT: f32 = 0.001;
pub const PASS_REWARD: u32 = 10;
/// A passed obstacle speeds the game up when the roll exceeds this value.
pub const SPEED_UP_ROLL: f32 = 0.8;
/// Frame rate the per-frame movement constants were tuned against.
pub const REFERENCE_FPS: f32 = 60.0;

// Collision (discrete, sampled once per frame)
pub const COLLISION_Z_WINDOW: f32 = 1.5;
pub const COLLISION_RADIUS: f32 = 1.6;

// Human steering
pub const POINTER_STEERING_GAIN: f32 = 5.0;

// Score submission limits
pub const MAX_PLAYER_NAME_CHARS: usize = 15;
pub const MAX_SCORE: u32 = 999_999;
/// Scores above this value require a signed session token.
pub const ANTI_CHEAT_THRESHOLD: u32 = 9_999;
pub const MIN_SESSION_SECS: f64 = 5.0;
pub const MAX_POINTS_PER_SECOND: f64 = 300.0;

pub const LEADERBOARD_SIZE: usize = 10;
