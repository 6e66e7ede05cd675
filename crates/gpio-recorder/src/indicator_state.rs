use crate::RecorderState;

/// Status indicator states, one per recorder state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorState {
    /// Idle.
    Off,
    /// Recording.
    On,
}

impl From<RecorderState> for IndicatorState {
    fn from(state: RecorderState) -> Self {
        match state {
            RecorderState::Idle => IndicatorState::Off,
            RecorderState::Recording { .. } => IndicatorState::On,
        }
    }
}

/// An output that mirrors the recorder state.
pub trait Indicator {
    /// Drive the output to `state`.
    fn show(&mut self, state: IndicatorState);
}
