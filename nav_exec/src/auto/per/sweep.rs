//! Sweep state machine

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::PerParams;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// State of the perception sweep.
///
/// ```text
/// Idle -> SweepingForward <-> SweepingBackward
///              |                    |
///              +----> Stopping <----+
///                        |
///                     Stopped
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SweepState {
    Idle,
    SweepingForward,
    SweepingBackward,
    Stopping,
    Stopped,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for SweepState {
    fn default() -> Self {
        Self::Idle
    }
}

impl SweepState {
    /// State once the current leg has been completed.
    pub fn leg_complete(self) -> Self {
        match self {
            Self::Idle | Self::SweepingBackward => Self::SweepingForward,
            Self::SweepingForward => Self::SweepingBackward,
            s => s,
        }
    }

    /// State once shutdown has been requested.
    pub fn shutdown(self) -> Self {
        match self {
            Self::Stopped => Self::Stopped,
            _ => Self::Stopping,
        }
    }

    /// State once the collaborators have been released.
    pub fn released(self) -> Self {
        match self {
            Self::Stopping => Self::Stopped,
            s => s,
        }
    }

    pub fn is_sweeping(&self) -> bool {
        matches!(self, Self::SweepingForward | Self::SweepingBackward)
    }

    /// Pan angles visited during the leg for this state.
    ///
    /// The forward leg runs from the minimum towards the maximum, and the backward leg from the
    /// maximum towards the minimum, so the end angles are visited twice in a row.
    pub fn leg_angles(&self, params: &PerParams) -> Vec<i32> {
        let step = params.angle_step_deg.max(1) as usize;

        match self {
            Self::SweepingForward => (params.angle_min_deg..=params.angle_max_deg)
                .step_by(step)
                .collect(),
            Self::SweepingBackward => (params.angle_min_deg..=params.angle_max_deg)
                .rev()
                .step_by(step)
                .collect(),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_transitions() {
        let mut state = SweepState::default();
        assert!(!state.is_sweeping());

        state = state.leg_complete();
        assert_eq!(state, SweepState::SweepingForward);
        state = state.leg_complete();
        assert_eq!(state, SweepState::SweepingBackward);
        state = state.leg_complete();
        assert_eq!(state, SweepState::SweepingForward);

        state = state.shutdown();
        assert_eq!(state, SweepState::Stopping);
        assert_eq!(state.leg_complete(), SweepState::Stopping);
        state = state.released();
        assert_eq!(state, SweepState::Stopped);
        assert_eq!(state.shutdown(), SweepState::Stopped);
    }

    #[test]
    fn test_leg_angles() {
        let mut params = PerParams::default();
        assert_eq!(SweepState::SweepingForward.leg_angles(&params), vec![45, 50]);
        assert_eq!(SweepState::SweepingBackward.leg_angles(&params), vec![50, 45]);
        assert!(SweepState::Stopping.leg_angles(&params).is_empty());

        params.angle_min_deg = 0;
        params.angle_max_deg = 180;
        params.angle_step_deg = 60;
        assert_eq!(
            SweepState::SweepingForward.leg_angles(&params),
            vec![0, 60, 120, 180]
        );
        assert_eq!(
            SweepState::SweepingBackward.leg_angles(&params),
            vec![180, 120, 60, 0]
        );
    }
}
