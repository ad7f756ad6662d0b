use fieldsim_core::{wrap_angle, Angle, RobotId, TeamColor, Vector2, Vector3};
use nalgebra::{Matrix3x4, Matrix4x3};
use serde::{Deserialize, Serialize};

use crate::{
    command::{Kick, MotionTarget, RobotCommand},
    config::{PhysicsConfig, RobotSetup, RobotSpecs},
    physics::WORLD_LIMIT,
};

/// Observable state of a robot, in raw simulation coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotState {
    pub team: TeamColor,
    pub id: RobotId,
    pub position: Vector2,
    /// mm/s in field coordinates
    pub velocity: Vector2,
    /// rad, wrapped into (-pi, pi]
    pub orientation: f64,
    /// rad/s, counter-clockwise positive
    pub angular_velocity: f64,
    pub radius: f64,
}

impl RobotState {
    pub(crate) fn is_finite(&self) -> bool {
        self.position.iter().all(|v| v.is_finite())
            && self.velocity.iter().all(|v| v.is_finite())
            && self.orientation.is_finite()
            && self.angular_velocity.is_finite()
    }

    /// Finite, inside the world and within the speed limits of `physics`.
    pub(crate) fn is_sane(&self, physics: &PhysicsConfig) -> bool {
        self.is_finite()
            && self.position.iter().all(|v| v.abs() <= WORLD_LIMIT)
            && self.velocity.norm() <= physics.max_body_speed
            && self.angular_velocity.abs() <= physics.max_body_angular_speed
    }

    /// Velocity in the robot frame as (forward, left).
    pub fn local_velocity(&self) -> Vector2 {
        Angle::from_radians(-self.orientation).rotate_vector(&self.velocity)
    }
}

/// Coupling matrix of an omni-wheel base: row `i` maps the body velocity
/// (forward, left, angular) to the surface speed of wheel `i`.
///
/// Wheels are ordered front-right, back-right, back-left, front-left and
/// sit at `wheel_distance` from the centre, driving tangentially.
pub fn wheel_matrix(specs: &RobotSpecs) -> Matrix4x3<f64> {
    let angles = [
        -specs.front_wheel_angle,
        -specs.back_wheel_angle,
        specs.back_wheel_angle,
        specs.front_wheel_angle,
    ];
    let mut m = Matrix4x3::zeros();
    for (i, phi) in angles.iter().enumerate() {
        m[(i, 0)] = -phi.sin();
        m[(i, 1)] = phi.cos();
        m[(i, 2)] = specs.wheel_distance;
    }
    m
}

/// Least-squares inverse of [`wheel_matrix`], mapping four wheel speeds to
/// the body velocity that explains them best. `None` for layouts that
/// cannot express every body velocity.
pub fn wheel_inverse(specs: &RobotSpecs) -> Option<Matrix3x4<f64>> {
    let m = wheel_matrix(specs);
    let mt = m.transpose();
    (mt * m).try_inverse().map(|inv| inv * mt)
}

/// Move `current` towards `target` by at most the allowed change for this
/// axis. Accelerating away from zero uses the speed-up limit, everything
/// else the brake limit.
fn approach(current: f64, target: f64, speedup: f64, brake: f64, dt: f64) -> f64 {
    let speeding_up = current * target >= 0.0 && target.abs() > current.abs();
    let limit = if speeding_up { speedup } else { brake } * dt;
    current + (target - current).clamp(-limit, limit)
}

#[derive(Debug, Clone)]
pub(crate) struct SimRobot {
    pub state: RobotState,
    pub last_valid: RobotState,
    pub specs: RobotSpecs,
    wheel_inverse: Matrix3x4<f64>,
    motion: MotionTarget,
    last_command_time: Option<f64>,
    pub pending_kick: Option<Kick>,
    pub dribbler_speed: f64,
    /// Set when a radio frame commanded the robot this step, holds the
    /// frame counter to echo.
    pub radio_counter: Option<u8>,
}

impl SimRobot {
    /// Returns `None` if the wheel layout is degenerate.
    pub fn new(setup: &RobotSetup) -> Option<Self> {
        let wheel_inverse = wheel_inverse(&setup.specs)?;
        let state = RobotState {
            team: setup.team,
            id: setup.id,
            position: setup.position,
            velocity: Vector2::zeros(),
            orientation: wrap_angle(setup.orientation),
            angular_velocity: 0.0,
            radius: setup.specs.radius,
        };
        Some(Self {
            last_valid: state.clone(),
            state,
            specs: setup.specs.clone(),
            wheel_inverse,
            motion: MotionTarget::default(),
            last_command_time: None,
            pending_kick: None,
            dribbler_speed: 0.0,
            radio_counter: None,
        })
    }

    pub fn key(&self) -> (TeamColor, RobotId) {
        (self.state.team, self.state.id)
    }

    pub fn heading(&self) -> Vector2 {
        Angle::from_radians(self.state.orientation).to_vector()
    }

    pub fn apply_command(&mut self, command: &RobotCommand, now: f64) {
        self.motion = command.motion;
        self.pending_kick = command.kick;
        self.dribbler_speed = command.dribbler_speed;
        self.last_command_time = Some(now);
    }

    /// Position of `p` in the robot frame as (forward, left).
    pub fn to_local(&self, p: &Vector2) -> Vector2 {
        Angle::from_radians(-self.state.orientation).rotate_vector(&(p - self.state.position))
    }

    /// Whether a ball centred at `ball` touches the dribbler bar.
    pub fn touches_dribbler(&self, ball: &Vector3, ball_radius: f64, physics: &PhysicsConfig) -> bool {
        if ball.z > self.specs.dribbler_height + ball_radius {
            return false;
        }
        let local = self.to_local(&ball.xy());
        local.x > 0.0
            && local.norm() <= self.state.radius + ball_radius + physics.dribbler_reach
            && local.y.abs() <= self.specs.dribbler_width / 2.0
    }

    /// Target body velocity (forward, left, angular) before limits.
    fn target_velocity(&self, now: f64, physics: &PhysicsConfig) -> Vector3 {
        let active = self
            .last_command_time
            .map_or(false, |t| now - t <= physics.command_timeout);
        if !active {
            return Vector3::zeros();
        }
        match self.motion {
            MotionTarget::LocalVelocity {
                forward,
                left,
                angular,
            } => Vector3::new(forward, left, angular),
            MotionTarget::GlobalVelocity { x, y, angular } => {
                let local = Angle::from_radians(-self.state.orientation)
                    .rotate_vector(&Vector2::new(x, y));
                Vector3::new(local.x, local.y, angular)
            }
            MotionTarget::WheelVelocity(wheels) => {
                self.wheel_inverse * nalgebra::Vector4::from(wheels)
            }
        }
    }

    /// Advance the motion controller by `dt`. Only the velocities change,
    /// the pose is integrated by the physics world.
    pub fn drive(&mut self, now: f64, dt: f64, physics: &PhysicsConfig) {
        let target = self.target_velocity(now, physics);
        let mut linear = target.xy();
        let speed = linear.norm();
        if speed > self.specs.v_max {
            linear *= self.specs.v_max / speed;
        }
        let angular = target.z.clamp(-self.specs.omega_max, self.specs.omega_max);

        let limits = &self.specs.acceleration;
        let current = self.state.local_velocity();
        let forward = approach(
            current.x,
            linear.x,
            limits.a_speedup_f_max,
            limits.a_brake_f_max,
            dt,
        );
        let left = approach(
            current.y,
            linear.y,
            limits.a_speedup_s_max,
            limits.a_brake_s_max,
            dt,
        );
        let omega = approach(
            self.state.angular_velocity,
            angular,
            limits.a_speedup_phi_max,
            limits.a_brake_phi_max,
            dt,
        );

        self.state.velocity =
            Angle::from_radians(self.state.orientation).rotate_vector(&Vector2::new(forward, left));
        self.state.angular_velocity = omega;
    }

    /// Drop the kick once it timed out with the rest of the command.
    pub fn expire_command(&mut self, now: f64, physics: &PhysicsConfig) {
        let expired = self
            .last_command_time
            .map_or(true, |t| now - t > physics.command_timeout);
        if expired {
            self.pending_kick = None;
            self.dribbler_speed = 0.0;
        }
    }

    /// Overwrite the state and make it the new recovery point.
    pub fn teleport(&mut self, state: RobotState) {
        self.last_valid = state.clone();
        self.state = state;
    }

    pub fn mark_valid(&mut self) {
        self.last_valid = self.state.clone();
    }

    /// Restore the last valid state with the robot at rest.
    pub fn restore(&mut self) {
        self.state = self.last_valid.clone();
        self.state.velocity = Vector2::zeros();
        self.state.angular_velocity = 0.0;
    }
}
