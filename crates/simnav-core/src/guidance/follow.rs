use super::{direction_to_attitude, Guidance, GuidanceContext};
use crate::config::FollowGuidanceConfig;
use crate::models::Setpoint;

/// Chases a fixed offset from the selected target.
#[derive(Debug, Clone)]
pub struct TargetPursuit {
    config: FollowGuidanceConfig,
}

impl TargetPursuit {
    pub fn new(config: FollowGuidanceConfig) -> Self {
        Self { config }
    }
}

impl Guidance for TargetPursuit {
    fn reset(&mut self) {}

    fn update(&mut self, ctx: &GuidanceContext<'_>) -> Option<Setpoint> {
        let target = ctx.target?;
        let position = ctx.pose.position;
        let desired = target.add(&self.config.offset);
        if !position.is_finite() || !desired.is_finite() {
            return None;
        }

        let dir = desired.sub(&position).normalize_or_zero();
        let (pitch, roll) = direction_to_attitude(
            &dir,
            self.config.gain,
            self.config.max_pitch,
            self.config.max_roll,
        );

        tracing::trace!(pitch, roll, altitude = desired.y, "pursuing target");

        Some(Setpoint {
            pitch,
            roll,
            altitude: desired.y,
        })
    }
}
