//! Per-frame world update: ship steering, obstacle drift, pass rewards and
//! the collision test. Rendering is someone else's job; a renderer copies
//! positions out of [`World`] after each [`World::step`].

use crate::autopilot::{lerp, Autopilot};
use crate::constants::{
    COLLISION_RADIUS, COLLISION_Z_WINDOW, OBSTACLE_COUNT, OBSTACLE_HIDE_Z, OBSTACLE_INITIAL_Z,
    OBSTACLE_INITIAL_Z_DEPTH, OBSTACLE_PASSED_Z, OBSTACLE_RECYCLE_Z, OBSTACLE_RECYCLE_Z_DEPTH,
    OBSTACLE_SPREAD, PASS_REWARD, POINTER_STEERING_GAIN, REFERENCE_FPS, SHIP_SPEED_MULTIPLIER,
    SPEED_UP_ROLL,
};
use crate::obstacle::Obstacle;
use crate::rng::SeededRng;
use crate::state::GameStore;

/// Where the player is pointing, already mapped into world units.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Steering {
    pub x: f32,
    pub y: f32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameOutcome {
    pub passed: u32,
    pub speed_ups: u32,
    pub collided: bool,
}

pub struct World {
    ship_x: f32,
    ship_y: f32,
    obstacles: Vec<Obstacle>,
    rng: SeededRng,
    autopilot: Autopilot,
}

impl World {
    pub fn new(seed: u32) -> Self {
        Self::with_autopilot(seed, Autopilot::default())
    }

    pub fn with_autopilot(seed: u32, autopilot: Autopilot) -> Self {
        let mut rng = SeededRng::new(seed);
        let obstacles = (0..OBSTACLE_COUNT)
            .map(|_| {
                let x = rng.next_centered(OBSTACLE_SPREAD);
                let y = rng.next_centered(OBSTACLE_SPREAD);
                let z = OBSTACLE_INITIAL_Z - rng.next_f32() * OBSTACLE_INITIAL_Z_DEPTH;
                Obstacle {
                    x,
                    y,
                    z,
                    visible: true,
                }
            })
            .collect();

        Self {
            ship_x: 0.0,
            ship_y: 0.0,
            obstacles,
            rng,
            autopilot,
        }
    }

    /// Test and replay hook: a world with a hand-placed obstacle field.
    pub fn from_obstacles(seed: u32, obstacles: Vec<Obstacle>) -> Self {
        Self {
            ship_x: 0.0,
            ship_y: 0.0,
            obstacles,
            rng: SeededRng::new(seed),
            autopilot: Autopilot::default(),
        }
    }

    pub fn ship(&self) -> (f32, f32) {
        (self.ship_x, self.ship_y)
    }

    pub fn set_ship(&mut self, x: f32, y: f32) {
        self.ship_x = x;
        self.ship_y = y;
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn rng_state(&self) -> u32 {
        self.rng.state()
    }

    /// Scatters every obstacle back into the far field. Call when a game starts.
    pub fn respawn_obstacles(&mut self) {
        for obstacle in self.obstacles.iter_mut() {
            obstacle.z = OBSTACLE_INITIAL_Z - self.rng.next_f32() * OBSTACLE_INITIAL_Z_DEPTH;
            obstacle.x = self.rng.next_centered(OBSTACLE_SPREAD);
            obstacle.y = self.rng.next_centered(OBSTACLE_SPREAD);
            obstacle.visible = true;
        }
    }

    /// Advances one frame of `delta` seconds.
    ///
    /// The ship moves first (pointer lerp, or the autopilot while a bot game
    /// is running), then the obstacle field. Obstacles only move while the
    /// store says a game is in progress. A hit calls `end_game` on the store
    /// and is reported in the outcome; remaining obstacles still finish the
    /// frame. Hits are tested against the smoothed ship position after this
    /// frame's steering, not against the pointer target.
    pub fn step(&mut self, store: &mut GameStore, steering: Steering, delta: f32) -> FrameOutcome {
        self.steer_ship(store, steering, delta);

        let mut outcome = FrameOutcome::default();
        if !store.is_playing() {
            return outcome;
        }

        let move_speed = store.speed() * SHIP_SPEED_MULTIPLIER * delta * REFERENCE_FPS;
        for idx in 0..self.obstacles.len() {
            let obstacle = &mut self.obstacles[idx];
            obstacle.z += move_speed;
            obstacle.visible = obstacle.z <= OBSTACLE_HIDE_Z;

            if obstacle.z > OBSTACLE_PASSED_Z {
                obstacle.z = OBSTACLE_RECYCLE_Z - self.rng.next_f32() * OBSTACLE_RECYCLE_Z_DEPTH;
                obstacle.x = self.rng.next_centered(OBSTACLE_SPREAD);
                obstacle.y = self.rng.next_centered(OBSTACLE_SPREAD);

                store.increase_score(PASS_REWARD);
                outcome.passed += 1;
                if self.rng.next_f32() > SPEED_UP_ROLL {
                    store.increase_speed();
                    outcome.speed_ups += 1;
                }
            }

            if hits_ship(&self.obstacles[idx], self.ship_x, self.ship_y) {
                if store.is_playing() {
                    store.end_game();
                }
                outcome.collided = true;
            }
        }

        outcome
    }

    fn steer_ship(&mut self, store: &GameStore, steering: Steering, delta: f32) {
        if store.autopilot_engaged() {
            let (x, y) = self
                .autopilot
                .drive((self.ship_x, self.ship_y, 0.0), &self.obstacles, delta);
            self.ship_x = x;
            self.ship_y = y;
        } else {
            let t = delta * POINTER_STEERING_GAIN;
            self.ship_x = lerp(self.ship_x, steering.x, t);
            self.ship_y = lerp(self.ship_y, steering.y, t);
        }
    }
}

/// Discrete hit test against the ship at `z = 0`. Sampled once per frame, so
/// a very fast obstacle can skip the window entirely. `ship_x`/`ship_y` are
/// where the ship actually is, which lags the pointer while steering.
pub fn hits_ship(obstacle: &Obstacle, ship_x: f32, ship_y: f32) -> bool {
    if obstacle.z.abs() >= COLLISION_Z_WINDOW {
        return false;
    }
    let dx = obstacle.x - ship_x;
    let dy = obstacle.y - ship_y;
    let dz = obstacle.z;
    (dx * dx + dy * dy + dz * dz).sqrt() < COLLISION_RADIUS
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{BASE_SPEED, OBSTACLE_COUNT};

    const FRAME: f32 = 1.0 / 60.0;

    fn obstacle(x: f32, y: f32, z: f32) -> Obstacle {
        Obstacle {
            x,
            y,
            z,
            visible: true,
        }
    }

    #[test]
    fn new_world_spawns_full_field_in_far_range() {
        let world = World::new(7);
        assert_eq!(world.obstacles().len(), OBSTACLE_COUNT);
        for obs in world.obstacles() {
            assert!(obs.z <= -100.0 && obs.z > -300.0, "z={}", obs.z);
            assert!(obs.x.abs() <= 6.0 && obs.y.abs() <= 6.0);
        }
    }

    #[test]
    fn obstacles_hold_still_when_idle() {
        let mut world = World::new(7);
        let mut store = GameStore::new();
        let before = world.obstacles().to_vec();
        world.step(&mut store, Steering::default(), FRAME);
        assert_eq!(world.obstacles(), &before[..]);
    }

    #[test]
    fn obstacles_drift_by_speed() {
        let mut world = World::from_obstacles(1, vec![obstacle(5.0, 5.0, -50.0)]);
        let mut store = GameStore::new();
        store.start_game();
        world.step(&mut store, Steering::default(), FRAME);
        let expected = -50.0 + BASE_SPEED * SHIP_SPEED_MULTIPLIER;
        assert!((world.obstacles()[0].z - expected).abs() < 1e-4);
    }

    #[test]
    fn passing_obstacle_scores_and_recycles() {
        let mut world = World::from_obstacles(1, vec![obstacle(5.0, 5.0, 9.9)]);
        let mut store = GameStore::new();
        store.start_game();
        let outcome = world.step(&mut store, Steering::default(), FRAME);
        assert_eq!(outcome.passed, 1);
        assert_eq!(store.score(), PASS_REWARD);
        let z = world.obstacles()[0].z;
        assert!(z <= -200.0 && z > -300.0, "z={z}");
    }

    #[test]
    fn obstacle_near_camera_is_hidden() {
        let mut world = World::from_obstacles(1, vec![obstacle(5.0, 5.0, 1.9)]);
        let mut store = GameStore::new();
        store.start_game();
        world.step(&mut store, Steering::default(), FRAME);
        assert!(!world.obstacles()[0].visible);
    }

    #[test]
    fn collision_ends_game() {
        let mut world = World::from_obstacles(1, vec![obstacle(0.0, 0.0, -1.0)]);
        let mut store = GameStore::new();
        store.start_game();
        let outcome = world.step(&mut store, Steering::default(), FRAME);
        assert!(outcome.collided);
        assert!(store.is_game_over());
        assert!(!store.is_playing());
    }

    #[test]
    fn hit_test_respects_z_window_and_radius() {
        assert!(hits_ship(&obstacle(0.0, 0.0, 1.4), 0.0, 0.0));
        assert!(!hits_ship(&obstacle(0.0, 0.0, 1.6), 0.0, 0.0));
        assert!(!hits_ship(&obstacle(1.6, 0.0, 0.0), 0.0, 0.0));
        assert!(hits_ship(&obstacle(1.0, 1.0, 0.5), 0.0, 0.0));
        assert!(hits_ship(&obstacle(3.0, 0.0, 0.0), 1.5, 0.0));
    }

    #[test]
    fn collision_follows_ship_not_pointer() {
        let field = vec![obstacle(4.0, 0.0, -1.0)];

        let mut world = World::from_obstacles(1, field.clone());
        world.set_ship(4.0, 0.0);
        let mut store = GameStore::new();
        store.start_game();
        // pointer aims away from the obstacle, but the ship is still on it
        let outcome = world.step(&mut store, Steering { x: -6.0, y: 0.0 }, FRAME);
        assert!(outcome.collided);

        let mut world = World::from_obstacles(1, field);
        let mut store = GameStore::new();
        store.start_game();
        // pointer sits on the obstacle, but the ship has not got there yet
        let outcome = world.step(&mut store, Steering { x: 4.0, y: 0.0 }, FRAME);
        assert!(!outcome.collided);
        assert!(store.is_playing());
    }

    #[test]
    fn pointer_steering_lerps_toward_target() {
        let mut world = World::from_obstacles(1, vec![]);
        let mut store = GameStore::new();
        world.step(&mut store, Steering { x: 6.0, y: -3.0 }, 0.1);
        let (x, y) = world.ship();
        assert!((x - 3.0).abs() < 1e-5);
        assert!((y + 1.5).abs() < 1e-5);
    }

    #[test]
    fn autopilot_only_steers_bot_games() {
        let field = vec![obstacle(0.0, 0.0, -10.0)];

        let mut world = World::from_obstacles(1, field.clone());
        let mut store = GameStore::new();
        store.start_game();
        world.step(&mut store, Steering::default(), FRAME);
        assert_eq!(world.ship(), (0.0, 0.0));

        let mut world = World::from_obstacles(1, field);
        let mut store = GameStore::new();
        store.start_bot_game();
        world.step(&mut store, Steering::default(), FRAME);
        assert_ne!(world.ship(), (0.0, 0.0));
    }

    #[test]
    fn respawn_scatters_obstacles_back() {
        let mut world = World::from_obstacles(3, vec![obstacle(0.0, 0.0, 1.0); 4]);
        world.respawn_obstacles();
        for obs in world.obstacles() {
            assert!(obs.z <= -100.0);
            assert!(obs.visible);
        }
    }
}
