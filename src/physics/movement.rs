//! Observer movement: mode state machine, gravity and collision response

use serde::{Deserialize, Serialize};

use crate::core::types::Vec3;
use crate::terrain::noise::NoiseField;
use crate::voxel::edit::OverrideLog;
use super::collision::{CollisionFlags, CollisionProbe, Direction};

/// Locomotion mode; each has its own horizontal speed
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Walking,
    Sneaking,
    Flying,
}

/// Movement constants
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    pub walking_speed: f32,
    pub sneaking_speed: f32,
    pub flying_speed: f32,
    /// Downward acceleration while walking or sneaking
    pub gravity: f32,
    pub terminal_fall_speed: f32,
    /// Vertical velocity set by a jump
    pub jump_speed: f32,
    /// Head-bump response: vy becomes -ceiling_bounce * dt
    pub ceiling_bounce: f32,
    /// Reach of the downward probe at rest
    pub body_height: f32,
    /// Reach of the horizontal probes
    pub body_width: f32,
    /// Reach of the upward probe
    pub head_reach: f32,
    /// Seconds the downward probe stays disabled after a jump
    pub jump_clear_time: f32,
    /// Eye drop while sneaking
    pub crouch_drop: f32,
    /// Falling below this teleports the observer to `respawn_y`
    pub floor_y: f32,
    pub respawn_y: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            walking_speed: 5.612,
            sneaking_speed: 2.55,
            flying_speed: 21.78,
            gravity: 25.0,
            terminal_fall_speed: 38.4,
            jump_speed: 8.0,
            ceiling_bounce: 225.0,
            body_height: 1.8,
            body_width: 0.5,
            head_reach: 1.2,
            jump_clear_time: 0.3,
            crouch_drop: 0.2,
            floor_y: -100.0,
            respawn_y: 60.0,
        }
    }
}

impl MovementConfig {
    /// Horizontal speed for a mode
    pub fn speed(&self, mode: Mode) -> f32 {
        match mode {
            Mode::Walking => self.walking_speed,
            Mode::Sneaking => self.sneaking_speed,
            Mode::Flying => self.flying_speed,
        }
    }
}

/// Movement keys held this tick. Forward is +x, right is +z.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MovementInput {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

/// Everything the integrator mutates
#[derive(Clone, Debug)]
pub struct ObserverState {
    /// Eye position
    pub position: Vec3,
    pub velocity: Vec3,
    pub mode: Mode,
    pub flags: CollisionFlags,
    pub jumping: bool,
    /// Current reach of the downward probe
    pub down_reach: f32,
    /// Seconds left before `down_reach` is restored after a jump
    pub jump_clear_timer: f32,
}

/// Integrates observer motion once per tick
pub struct MovementIntegrator {
    config: MovementConfig,
    state: ObserverState,
    probe: CollisionProbe,
}

impl MovementIntegrator {
    pub fn new(config: MovementConfig, position: Vec3) -> Self {
        let probe = CollisionProbe::new(config.body_width, config.head_reach);
        let state = ObserverState {
            position,
            velocity: Vec3::ZERO,
            mode: Mode::Walking,
            flags: CollisionFlags::default(),
            jumping: false,
            down_reach: config.body_height,
            jump_clear_timer: 0.0,
        };
        Self { config, state, probe }
    }

    pub fn config(&self) -> &MovementConfig {
        &self.config
    }

    pub fn state(&self) -> &ObserverState {
        &self.state
    }

    pub fn position(&self) -> Vec3 {
        self.state.position
    }

    pub fn velocity(&self) -> Vec3 {
        self.state.velocity
    }

    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    pub fn flags(&self) -> CollisionFlags {
        self.state.flags
    }

    pub fn is_jumping(&self) -> bool {
        self.state.jumping
    }

    /// Teleport, clearing vertical motion and any jump in progress
    pub fn set_position(&mut self, position: Vec3) {
        self.state.position = position;
        self.state.velocity = Vec3::ZERO;
        self.state.jumping = false;
        self.state.jump_clear_timer = 0.0;
        self.state.down_reach = self.config.body_height;
        self.probe.reset_cache();
    }

    /// Jump key pressed
    pub fn press_jump(&mut self) {
        match self.state.mode {
            Mode::Flying => self.state.velocity.y = self.config.flying_speed,
            Mode::Sneaking => {}
            Mode::Walking => {
                if self.state.jumping {
                    return;
                }
                self.state.velocity.y = self.config.jump_speed;
                self.state.jumping = true;
                self.state.flags.down = false;
                self.state.down_reach = 0.0;
                self.state.jump_clear_timer = self.config.jump_clear_time;
            }
        }
    }

    /// Jump key released
    pub fn release_jump(&mut self) {
        if self.state.mode == Mode::Flying {
            self.state.velocity.y = 0.0;
        }
    }

    /// Crouch key pressed: sneak when grounded, descend when flying
    pub fn press_crouch(&mut self) {
        match self.state.mode {
            Mode::Flying => self.state.velocity.y = -self.config.flying_speed,
            Mode::Walking if !self.state.jumping => {
                self.state.mode = Mode::Sneaking;
                self.state.position.y -= self.config.crouch_drop;
            }
            _ => {}
        }
    }

    /// Crouch key released
    pub fn release_crouch(&mut self) {
        match self.state.mode {
            Mode::Flying => self.state.velocity.y = 0.0,
            Mode::Sneaking => {
                self.state.mode = Mode::Walking;
                self.state.position.y += self.config.crouch_drop;
            }
            Mode::Walking => {}
        }
    }

    /// Switch between walking and flying; ignored while sneaking
    pub fn toggle_flight(&mut self) {
        let next = match self.state.mode {
            Mode::Walking => Mode::Flying,
            Mode::Flying => Mode::Walking,
            Mode::Sneaking => return,
        };
        self.state.mode = next;
        self.state.velocity = Vec3::ZERO;
        log::debug!("Movement mode -> {:?}", next);
    }

    /// Advance one tick of `dt` seconds
    pub fn tick(&mut self, input: &MovementInput, dt: f32, field: &NoiseField, overrides: &OverrideLog) {
        let config = &self.config;
        let state = &mut self.state;

        if state.jump_clear_timer > 0.0 {
            state.jump_clear_timer -= dt;
            if state.jump_clear_timer <= 0.0 {
                state.jump_clear_timer = 0.0;
                state.down_reach = config.body_height;
            }
        }

        let speed = config.speed(state.mode);
        let axis = |pos: bool, neg: bool| (pos as i32 - neg as i32) as f32 * speed;
        state.velocity.x = axis(input.forward, input.backward);
        state.velocity.z = axis(input.right, input.left);

        let sneaking = state.mode == Mode::Sneaking;
        let mut flags = self.probe.probe_all(state.position, state.down_reach, sneaking, field, overrides);

        if state.mode == Mode::Flying {
            state.position += state.velocity * dt;
            state.flags = flags;
            return;
        }

        // Extend the down probe by this tick's fall so fast drops cannot tunnel
        let reach = state.down_reach - state.velocity.y * dt;
        flags.down = self.probe.probe(Direction::Down, state.position, reach, sneaking, field, overrides);

        state.velocity.y = (state.velocity.y - config.gravity * dt).max(-config.terminal_fall_speed);

        if flags.up {
            state.velocity.y = -config.ceiling_bounce * dt;
            state.down_reach = config.body_height;
            state.jump_clear_timer = 0.0;
        }
        if flags.down {
            state.velocity.y = 0.0;
            state.jumping = false;
        }

        if (flags.front && input.forward) || (flags.back && input.backward) {
            state.velocity.x = 0.0;
        }
        if (flags.left && input.left) || (flags.right && input.right) {
            state.velocity.z = 0.0;
        }

        state.position += state.velocity * dt;
        if state.position.y < config.floor_y {
            log::debug!("Observer fell below {}, respawning at y={}", config.floor_y, config.respawn_y);
            state.position.y = config.respawn_y;
        }
        state.flags = flags;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::VoxelCoord;
    use crate::terrain::noise::TerrainParams;
    use crate::terrain::voxel_type::VoxelType;

    const DT: f32 = 1.0 / 60.0;

    fn field() -> NoiseField {
        NoiseField::new(0.61, TerrainParams::default())
    }

    fn flat_column(field: &NoiseField) -> (i32, i32, i32) {
        for x in -200..200 {
            for z in -200..200 {
                let c = field.column(x, z);
                let flat = [(0, 0), (1, 0), (-1, 0), (0, 1), (0, -1), (2, 0)].iter().all(|(dx, dz)| {
                    let n = field.column(x + dx, z + dz);
                    n.surface_y == c.surface_y && !n.has_tree
                });
                if flat {
                    return (x, c.surface_y, z);
                }
            }
        }
        panic!("no flat column found");
    }

    fn run(m: &mut MovementIntegrator, input: MovementInput, ticks: usize, field: &NoiseField, log: &OverrideLog) {
        for _ in 0..ticks {
            m.tick(&input, DT, field, log);
        }
    }

    #[test]
    fn test_gravity_integration() {
        let field = field();
        let log = OverrideLog::new();
        let mut m = MovementIntegrator::new(MovementConfig::default(), Vec3::new(0.0, 1000.0, 0.0));

        for n in 1..=90 {
            m.tick(&MovementInput::default(), DT, &field, &log);
            assert!(!m.flags().down);
            let expected = (-25.0 * n as f32 * DT).max(-38.4);
            assert!((m.velocity().y - expected).abs() < 1e-3, "tick {}: {} vs {}", n, m.velocity().y, expected);
        }
    }

    #[test]
    fn test_terminal_fall_speed() {
        let field = field();
        let log = OverrideLog::new();
        let mut m = MovementIntegrator::new(MovementConfig::default(), Vec3::new(0.0, 2000.0, 0.0));
        run(&mut m, MovementInput::default(), 200, &field, &log);
        assert_eq!(m.velocity().y, -38.4);
    }

    #[test]
    fn test_lands_and_rests_on_ground() {
        let field = field();
        let log = OverrideLog::new();
        let (x, s, z) = flat_column(&field);
        let mut m = MovementIntegrator::new(MovementConfig::default(), Vec3::new(x as f32, s as f32 + 6.0, z as f32));

        run(&mut m, MovementInput::default(), 600, &field, &log);
        assert!(m.flags().down);
        assert_eq!(m.velocity().y, 0.0);
        let y = m.position().y;
        assert!(y > s as f32 + 1.5 && y < s as f32 + 2.4, "rest height {}", y);
    }

    #[test]
    fn test_jump_leaves_ground_and_lands() {
        let field = field();
        let log = OverrideLog::new();
        let (x, s, z) = flat_column(&field);
        let mut m = MovementIntegrator::new(MovementConfig::default(), Vec3::new(x as f32, s as f32 + 3.0, z as f32));
        run(&mut m, MovementInput::default(), 300, &field, &log);
        let rest = m.position().y;

        m.press_jump();
        assert!(m.is_jumping());
        assert_eq!(m.velocity().y, 8.0);
        run(&mut m, MovementInput::default(), 10, &field, &log);
        assert!(m.position().y > rest + 0.5);

        run(&mut m, MovementInput::default(), 300, &field, &log);
        assert!(!m.is_jumping());
        assert!(m.flags().down);
        assert!((m.position().y - rest).abs() < 0.5);
        assert_eq!(m.state().down_reach, 1.8);
    }

    #[test]
    fn test_wall_stops_forward_motion() {
        let field = field();
        let (x, s, z) = flat_column(&field);
        let mut log = OverrideLog::new();
        log.record_placement(VoxelCoord::new(x + 1, s + 1, z), VoxelType::Stone);
        log.record_placement(VoxelCoord::new(x + 1, s + 2, z), VoxelType::Stone);

        let mut m = MovementIntegrator::new(MovementConfig::default(), Vec3::new(x as f32, s as f32 + 3.0, z as f32));
        run(&mut m, MovementInput::default(), 300, &field, &log);

        let forward = MovementInput { forward: true, ..Default::default() };
        run(&mut m, forward, 120, &field, &log);
        assert!(m.position().x < x as f32 + 0.5, "walked into wall: x={}", m.position().x);
        assert_eq!(m.position().z, z as f32);
    }

    #[test]
    fn test_ceiling_bump() {
        let field = field();
        let (x, s, z) = flat_column(&field);
        let mut log = OverrideLog::new();
        log.record_placement(VoxelCoord::new(x, s + 3, z), VoxelType::Stone);

        let mut m = MovementIntegrator::new(MovementConfig::default(), Vec3::new(x as f32, s as f32 + 2.0, z as f32));
        run(&mut m, MovementInput::default(), 30, &field, &log);
        assert!(m.flags().down);
        assert!(!m.flags().up);

        m.press_jump();
        assert_eq!(m.state().down_reach, 0.0);
        let mut bumped = false;
        for _ in 0..30 {
            m.tick(&MovementInput::default(), DT, &field, &log);
            if m.flags().up {
                bumped = true;
                break;
            }
        }
        assert!(bumped, "never reached the ceiling");
        assert!((m.velocity().y + 225.0 * DT).abs() < 1e-5, "vy={}", m.velocity().y);
        assert_eq!(m.state().down_reach, 1.8);
        assert!(m.position().y < s as f32 + 2.5);
    }

    #[test]
    fn test_sneaking_stops_at_ledge() {
        let field = field();
        let (x, s, z) = flat_column(&field);
        let mut log = OverrideLog::new();
        let pillar = s + 5;
        log.record_placement(VoxelCoord::new(x, pillar, z), VoxelType::Stone);
        let start = Vec3::new(x as f32, pillar as f32 + 1.45, z as f32);
        let forward = MovementInput { forward: true, ..Default::default() };

        let mut m = MovementIntegrator::new(MovementConfig::default(), start);
        run(&mut m, MovementInput::default(), 5, &field, &log);
        assert!(m.flags().down);
        m.press_crouch();
        assert_eq!(m.mode(), Mode::Sneaking);
        run(&mut m, forward, 120, &field, &log);
        assert!(m.position().x < x as f32 + 0.5, "slid off: x={}", m.position().x);
        assert!(m.flags().down);
        assert!((m.position().y - (start.y - 0.2)).abs() < 1e-4);

        // Walking off the same ledge drops to the ground
        let mut m = MovementIntegrator::new(MovementConfig::default(), start);
        run(&mut m, forward, 120, &field, &log);
        assert!(m.position().x > x as f32 + 1.0);
        assert!(m.position().y < pillar as f32);
    }

    #[test]
    fn test_fast_fall_does_not_tunnel() {
        let field = field();
        let log = OverrideLog::new();
        let (x, s, z) = flat_column(&field);
        let mut m = MovementIntegrator::new(MovementConfig::default(), Vec3::new(x as f32, s as f32 + 150.0, z as f32));

        // Terminal speed covers 3.84 per tick here, more than the resting probe reach
        let dt = 0.1;
        for _ in 0..100 {
            m.tick(&MovementInput::default(), dt, &field, &log);
        }
        assert!(m.flags().down);
        assert_eq!(m.velocity().y, 0.0);
        let y = m.position().y;
        assert!(y > s as f32 + 0.5 && y < s as f32 + 6.2, "landed at {} over surface {}", y, s);
    }

    #[test]
    fn test_opposite_keys_cancel() {
        let field = field();
        let log = OverrideLog::new();
        let mut m = MovementIntegrator::new(MovementConfig::default(), Vec3::new(0.0, 1000.0, 0.0));
        m.toggle_flight();
        let both = MovementInput { forward: true, backward: true, left: true, right: false };
        m.tick(&both, DT, &field, &log);
        assert_eq!(m.velocity().x, 0.0);
        assert_eq!(m.velocity().z, -21.78);
    }

    #[test]
    fn test_flying_has_no_gravity() {
        let field = field();
        let log = OverrideLog::new();
        let start = Vec3::new(0.0, 500.0, 0.0);
        let mut m = MovementIntegrator::new(MovementConfig::default(), start);
        m.toggle_flight();
        assert_eq!(m.mode(), Mode::Flying);

        run(&mut m, MovementInput::default(), 60, &field, &log);
        assert_eq!(m.position(), start);

        m.press_jump();
        run(&mut m, MovementInput::default(), 60, &field, &log);
        assert!(m.position().y > start.y + 20.0);
        m.release_jump();
        assert_eq!(m.velocity().y, 0.0);
    }

    #[test]
    fn test_mode_transitions() {
        let mut m = MovementIntegrator::new(MovementConfig::default(), Vec3::ZERO);
        m.press_crouch();
        assert_eq!(m.mode(), Mode::Sneaking);
        assert_eq!(m.position().y, -0.2);

        // No jumping or flight toggle while sneaking
        m.press_jump();
        assert!(!m.is_jumping());
        m.toggle_flight();
        assert_eq!(m.mode(), Mode::Sneaking);

        m.release_crouch();
        assert_eq!(m.mode(), Mode::Walking);
        assert_eq!(m.position().y, 0.0);

        // No crouching mid-jump
        m.press_jump();
        m.press_crouch();
        assert_eq!(m.mode(), Mode::Walking);

        m.toggle_flight();
        assert_eq!(m.mode(), Mode::Flying);
        assert_eq!(m.velocity(), Vec3::ZERO);
        m.toggle_flight();
        assert_eq!(m.mode(), Mode::Walking);
    }

    #[test]
    fn test_respawn_below_floor() {
        let field = field();
        let log = OverrideLog::new();
        let mut m = MovementIntegrator::new(MovementConfig::default(), Vec3::new(0.0, -99.99, 0.0));
        run(&mut m, MovementInput::default(), 10, &field, &log);
        let y = m.position().y;
        assert!(y > 55.0 && y <= 60.0, "y={}", y);
    }
}
