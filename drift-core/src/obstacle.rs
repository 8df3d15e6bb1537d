/// One obstacle in the field. `z` grows toward the camera; the ship sits at
/// `z = 0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Obstacle {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub visible: bool,
}
