use serde::Serialize;

/// How an animation presents itself outside of its active duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FillMode {
    Removed,
    Forwards,
    Backwards,
    #[default]
    Both,
}

impl FillMode {
    pub fn fills_backwards(self) -> bool {
        matches!(self, FillMode::Backwards | FillMode::Both)
    }

    pub fn fills_forwards(self) -> bool {
        matches!(self, FillMode::Forwards | FillMode::Both)
    }
}

/// Media timing applied to every curve generated during a setup pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimingConfiguration {
    pub autoreverses: bool,
    /// Number of cycles; `1.0` plays once, `f32::INFINITY` repeats forever.
    pub repeat_count: f32,
    pub speed: f32,
    /// Seconds added to the elapsed time before evaluation.
    pub time_offset: f64,
    pub fill_mode: FillMode,
}

impl Default for TimingConfiguration {
    fn default() -> Self {
        Self {
            autoreverses: false,
            repeat_count: 1.0,
            speed: 1.0,
            time_offset: 0.0,
            fill_mode: FillMode::Both,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum LoopMode {
    #[default]
    PlayOnce,
    Loop,
    PingPong,
    /// Plays the given number of cycles, fractional counts stop mid-cycle.
    Repeat(f32),
}

impl LoopMode {
    pub fn timing_configuration(self, speed: f32) -> TimingConfiguration {
        let (repeat_count, autoreverses) = match self {
            LoopMode::PlayOnce => (1.0, false),
            LoopMode::Loop => (f32::INFINITY, false),
            LoopMode::PingPong => (f32::INFINITY, true),
            LoopMode::Repeat(count) => (count.max(0.0), false),
        };
        TimingConfiguration {
            autoreverses,
            repeat_count,
            speed,
            ..TimingConfiguration::default()
        }
    }
}
