//! Point-mass multirotor stand-in.
//!
//! Attitude and altitude follow the setpoint with first-order lags; tilt
//! produces horizontal acceleration against linear drag. State is kept in
//! the simulator's z-up frame and exposed as a free-joint `qpos`, so the
//! pose the core sees goes through [`Pose::from_sim_qpos`].

use simnav_core::{Point3, Pose, Setpoint};

const GRAVITY: f64 = 9.81;

#[derive(Debug, Clone)]
pub struct VehicleParams {
    /// Attitude response time constant in seconds
    pub attitude_tau: f64,
    /// Altitude response time constant in seconds
    pub altitude_tau: f64,
    /// Linear drag coefficient (1/s)
    pub drag: f64,
}

impl Default for VehicleParams {
    fn default() -> Self {
        Self {
            attitude_tau: 0.15,
            altitude_tau: 0.5,
            drag: 4.0,
        }
    }
}

/// Vehicle state in the z-up simulator frame.
#[derive(Debug, Clone)]
pub struct KinematicVehicle {
    params: VehicleParams,
    /// x, y, z with z up
    position: [f64; 3],
    velocity: [f64; 2],
    pitch: f64,
    roll: f64,
    command: Setpoint,
}

impl KinematicVehicle {
    /// Spawn hovering at a scene-frame position.
    pub fn new(params: VehicleParams, start: Point3) -> Self {
        Self {
            params,
            position: [start.x, -start.z, start.y],
            velocity: [0.0, 0.0],
            pitch: 0.0,
            roll: 0.0,
            command: Setpoint::hold(start.y),
        }
    }

    /// Latch a new setpoint; it persists until replaced.
    pub fn command(&mut self, setpoint: Setpoint) {
        self.command = setpoint;
    }

    pub fn step(&mut self, dt: f64) {
        if !(dt.is_finite() && dt > 0.0) {
            return;
        }
        let att = 1.0 - (-dt / self.params.attitude_tau).exp();
        let alt = 1.0 - (-dt / self.params.altitude_tau).exp();
        self.pitch += (self.command.pitch - self.pitch) * att;
        self.roll += (self.command.roll - self.roll) * att;
        self.position[2] += (self.command.altitude - self.position[2]) * alt;

        // Scene +x is sim +x and scene +z is sim -y. Negative pitch pushes
        // toward scene +x; positive roll toward scene +z.
        let accel = [
            -GRAVITY * self.pitch.tan(),
            -GRAVITY * self.roll.tan(),
        ];
        for axis in 0..2 {
            self.velocity[axis] += (accel[axis] - self.params.drag * self.velocity[axis]) * dt;
            self.position[axis] += self.velocity[axis] * dt;
        }
    }

    /// Free-joint `qpos`: position then `w, x, y, z` orientation.
    pub fn qpos(&self) -> [f64; 7] {
        let (sr, cr) = (self.roll / 2.0).sin_cos();
        let (sp, cp) = (self.pitch / 2.0).sin_cos();
        [
            self.position[0],
            self.position[1],
            self.position[2],
            cr * cp,
            sr * cp,
            cr * sp,
            -sr * sp,
        ]
    }

    pub fn pose(&self) -> Pose {
        let qpos = self.qpos();
        Pose::from_sim_qpos(&qpos).unwrap_or_default()
    }

    pub fn horizontal_speed(&self) -> f64 {
        self.velocity[0].hypot(self.velocity[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_pose_round_trips_through_qpos() {
        let vehicle = KinematicVehicle::new(VehicleParams::default(), Point3::new(1.0, 0.8, -2.0));
        let pose = vehicle.pose();
        assert!((pose.position.x - 1.0).abs() < 1e-12);
        assert!((pose.position.y - 0.8).abs() < 1e-12);
        assert!((pose.position.z + 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_negative_pitch_moves_toward_scene_x() {
        let mut vehicle = KinematicVehicle::new(VehicleParams::default(), Point3::ZERO);
        vehicle.command(Setpoint {
            pitch: -0.2,
            roll: 0.0,
            altitude: 0.0,
        });
        for _ in 0..100 {
            vehicle.step(0.01);
        }
        let pose = vehicle.pose();
        assert!(pose.position.x > 0.1);
        assert!(pose.position.z.abs() < 1e-9);
        assert!((pose.attitude.pitch + 0.2).abs() < 0.01);
    }

    #[test]
    fn test_positive_roll_moves_toward_scene_z() {
        let mut vehicle = KinematicVehicle::new(VehicleParams::default(), Point3::ZERO);
        vehicle.command(Setpoint {
            pitch: 0.0,
            roll: 0.2,
            altitude: 1.0,
        });
        for _ in 0..100 {
            vehicle.step(0.01);
        }
        let pose = vehicle.pose();
        assert!(pose.position.z > 0.1);
        assert!(pose.position.y > 0.8);
    }

    #[test]
    fn test_hold_decays_speed() {
        let mut vehicle = KinematicVehicle::new(VehicleParams::default(), Point3::ZERO);
        vehicle.command(Setpoint {
            pitch: -0.3,
            roll: 0.0,
            altitude: 0.0,
        });
        for _ in 0..100 {
            vehicle.step(0.01);
        }
        let moving = vehicle.horizontal_speed();
        vehicle.command(Setpoint::hold(0.0));
        for _ in 0..300 {
            vehicle.step(0.01);
        }
        assert!(vehicle.horizontal_speed() < moving * 0.1);
    }
}
