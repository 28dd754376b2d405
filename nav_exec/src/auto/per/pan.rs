//! Pan servo bookkeeping

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::{pan::PanEqpt, EqptError};
use log::trace;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Wraps the pan servo, keeping it inside the sweep window and avoiding repeated commands.
pub struct PanCtrl {
    pan: Box<dyn PanEqpt>,
    channel: u8,
    angle_min_deg: i32,
    angle_max_deg: i32,

    /// Last angle successfully commanded, `None` before the first command
    current_deg: Option<i32>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl PanCtrl {
    pub fn new(pan: Box<dyn PanEqpt>, channel: u8, angle_min_deg: i32, angle_max_deg: i32) -> Self {
        Self {
            pan,
            channel,
            angle_min_deg: angle_min_deg.min(angle_max_deg),
            angle_max_deg: angle_max_deg.max(angle_min_deg),
            current_deg: None,
        }
    }

    /// Move to `angle_deg`, clamped into the sweep window.
    ///
    /// Returns true if a command was sent, false if the servo was already at the angle.
    pub fn move_to(&mut self, angle_deg: i32) -> Result<bool, EqptError> {
        let angle_deg = angle_deg.max(self.angle_min_deg).min(self.angle_max_deg);

        if self.current_deg == Some(angle_deg) {
            return Ok(false);
        }

        trace!("Pan to {} deg", angle_deg);
        self.pan.set_angle(self.channel, angle_deg)?;
        self.current_deg = Some(angle_deg);

        Ok(true)
    }

    pub fn current_deg(&self) -> Option<i32> {
        self.current_deg
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::sim_eqpt::SimPan;

    #[test]
    fn test_pan_ctrl() {
        let pan = SimPan::new();
        let record = pan.record();
        let mut ctrl = PanCtrl::new(Box::new(pan), 3, 30, 60);

        assert_eq!(ctrl.current_deg(), None);
        assert!(ctrl.move_to(40).unwrap());
        assert!(!ctrl.move_to(40).unwrap());
        assert!(ctrl.move_to(90).unwrap());
        assert!(!ctrl.move_to(61).unwrap());
        assert!(ctrl.move_to(-10).unwrap());

        assert_eq!(record.commands(), vec![(3, 40), (3, 60), (3, 30)]);
        assert_eq!(ctrl.current_deg(), Some(30));
    }
}
