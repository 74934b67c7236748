pub const SWEEP_MIN_ANGLE: i32 = 0;
pub const SWEEP_MAX_ANGLE: i32 = 180;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Manual,
    Auto,
}

impl Mode {
    /// Text of the mode toggle button while in this mode.
    pub fn toggle_label(&self) -> &'static str {
        match self {
            Mode::Manual => "Start Auto",
            Mode::Auto => "Stop Auto",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaserState {
    Inactive,
    Active,
}

impl LaserState {
    pub fn label(&self) -> &'static str {
        match self {
            LaserState::Inactive => "Laser: Off",
            LaserState::Active => "Laser: On",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepDirection {
    Up,
    Down,
}

/// Control state owned by the sweep controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepState {
    pub mode: Mode,
    pub laser: LaserState,
    pub sweep_angle: i32,
    pub sweep_direction: SweepDirection,
    pub pending_resume: bool,
}

impl SweepState {
    /// The sweep cadence runs exactly in this state.
    pub fn sweeping(&self) -> bool {
        self.mode == Mode::Auto && self.laser == LaserState::Inactive
    }

    pub fn accepts_manual_angle(&self) -> bool {
        self.mode == Mode::Manual && self.laser == LaserState::Inactive
    }
}

impl Default for SweepState {
    fn default() -> Self {
        Self {
            mode: Mode::Manual,
            laser: LaserState::Inactive,
            sweep_angle: SWEEP_MIN_ANGLE,
            sweep_direction: SweepDirection::Up,
            pending_resume: false,
        }
    }
}

/// Advances the sweep by `step`, clamping at either bound and reversing there.
pub fn step_sweep(angle: i32, direction: SweepDirection, step: i32) -> (i32, SweepDirection) {
    match direction {
        SweepDirection::Up => {
            let next = angle + step;
            if next >= SWEEP_MAX_ANGLE {
                (SWEEP_MAX_ANGLE, SweepDirection::Down)
            } else {
                (next, SweepDirection::Up)
            }
        }
        SweepDirection::Down => {
            let next = angle - step;
            if next <= SWEEP_MIN_ANGLE {
                (SWEEP_MIN_ANGLE, SweepDirection::Up)
            } else {
                (next, SweepDirection::Down)
            }
        }
    }
}
