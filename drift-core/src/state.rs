//! Game session state.
//!
//! The store is a plain owned value: the frame loop and the UI hold a
//! `&mut GameStore` and can only change it through the transitions below.

use serde::Serialize;

use crate::constants::{BASE_SPEED, SPEED_INCREMENT};

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStore {
    is_playing: bool,
    is_bot_mode: bool,
    is_game_over: bool,
    score: u32,
    speed: f32,
    high_score: u32,
    session_token: Option<String>,
}

impl Default for GameStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GameStore {
    pub fn new() -> Self {
        Self {
            is_playing: false,
            is_bot_mode: false,
            is_game_over: false,
            score: 0,
            speed: BASE_SPEED,
            high_score: 0,
            session_token: None,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn is_bot_mode(&self) -> bool {
        self.is_bot_mode
    }

    pub fn is_game_over(&self) -> bool {
        self.is_game_over
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    pub fn session_token(&self) -> Option<&str> {
        self.session_token.as_deref()
    }

    /// Autopilot steering is only active while a bot game is running.
    pub fn autopilot_engaged(&self) -> bool {
        self.is_playing && self.is_bot_mode
    }

    pub fn start_game(&mut self) {
        self.begin(false);
    }

    pub fn start_bot_game(&mut self) {
        self.begin(true);
    }

    fn begin(&mut self, bot_mode: bool) {
        self.is_playing = true;
        self.is_game_over = false;
        self.score = 0;
        self.speed = BASE_SPEED;
        self.is_bot_mode = bot_mode;
    }

    pub fn increase_score(&mut self, amount: u32) {
        self.score = self.score.saturating_add(amount);
    }

    pub fn increase_speed(&mut self) {
        self.speed += SPEED_INCREMENT;
    }

    pub fn end_game(&mut self) {
        self.is_playing = false;
        self.is_game_over = true;
        self.high_score = self.high_score.max(self.score);
    }

    pub fn reset(&mut self) {
        self.is_playing = false;
        self.is_game_over = false;
        self.score = 0;
        self.speed = BASE_SPEED;
        self.is_bot_mode = false;
        self.session_token = None;
    }

    pub fn set_session_token(&mut self, token: impl Into<String>) {
        self.session_token = Some(token.into());
    }
}
