use fieldsim_core::{RobotId, TeamColor, Vector2, Vector3};
use serde::{Deserialize, Serialize};

use crate::physics::WORLD_LIMIT;

fn in_world(v: f64) -> bool {
    v.abs() <= WORLD_LIMIT
}

/// Desired motion of a robot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MotionTarget {
    /// Velocity in the robot frame in mm/s, `angular` in rad/s. Positive
    /// `left` moves to the robot's left, positive `angular` turns
    /// counter-clockwise.
    LocalVelocity {
        forward: f64,
        left: f64,
        angular: f64,
    },
    /// Velocity in reported field coordinates, the same convention as the
    /// detection packets.
    GlobalVelocity { x: f64, y: f64, angular: f64 },
    /// Wheel surface speeds in mm/s, ordered front-right, back-right,
    /// back-left, front-left. Positive speeds turn the robot
    /// counter-clockwise.
    WheelVelocity([f64; 4]),
}

impl Default for MotionTarget {
    fn default() -> Self {
        MotionTarget::LocalVelocity {
            forward: 0.0,
            left: 0.0,
            angular: 0.0,
        }
    }
}

impl MotionTarget {
    fn is_finite(&self) -> bool {
        match self {
            MotionTarget::LocalVelocity {
                forward,
                left,
                angular,
            } => forward.is_finite() && left.is_finite() && angular.is_finite(),
            MotionTarget::GlobalVelocity { x, y, angular } => {
                x.is_finite() && y.is_finite() && angular.is_finite()
            }
            MotionTarget::WheelVelocity(wheels) => wheels.iter().all(|w| w.is_finite()),
        }
    }
}

/// A kick that fires as soon as the ball touches the dribbler.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Kick {
    /// Ball speed in mm/s, capped by the robot's kicker.
    pub speed: f64,
    /// Elevation in radians. Zero is a flat kick.
    pub chip_angle: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RobotCommand {
    pub motion: MotionTarget,
    pub kick: Option<Kick>,
    /// Fraction of full dribbler power, -1 to 1. Only positive values hold
    /// the ball.
    pub dribbler_speed: f64,
}

impl RobotCommand {
    pub fn stop() -> Self {
        Self::default()
    }

    pub fn local_velocity(forward: f64, left: f64, angular: f64) -> Self {
        Self {
            motion: MotionTarget::LocalVelocity {
                forward,
                left,
                angular,
            },
            ..Default::default()
        }
    }

    pub fn global_velocity(velocity: Vector2, angular: f64) -> Self {
        Self {
            motion: MotionTarget::GlobalVelocity {
                x: velocity.x,
                y: velocity.y,
                angular,
            },
            ..Default::default()
        }
    }

    pub fn wheel_velocity(wheels: [f64; 4]) -> Self {
        Self {
            motion: MotionTarget::WheelVelocity(wheels),
            ..Default::default()
        }
    }

    pub fn with_kick(mut self, speed: f64, chip_angle: f64) -> Self {
        self.kick = Some(Kick { speed, chip_angle });
        self
    }

    pub fn with_dribbler(mut self, speed: f64) -> Self {
        self.dribbler_speed = speed;
        self
    }

    fn validate(&self) -> Result<(), String> {
        if !self.motion.is_finite() {
            return Err("motion target contains non-finite values".to_owned());
        }
        if let Some(kick) = self.kick {
            if !kick.speed.is_finite() || kick.speed < 0.0 {
                return Err(format!("invalid kick speed {}", kick.speed));
            }
            if !(0.0..=std::f64::consts::FRAC_PI_2).contains(&kick.chip_angle) {
                return Err(format!("invalid chip angle {}", kick.chip_angle));
            }
        }
        if !self.dribbler_speed.is_finite() {
            return Err("dribbler speed is not finite".to_owned());
        }
        Ok(())
    }
}

/// Overwrites parts of a robot's state. Coordinates are in the reported
/// (vision) convention; fields left as `None` are kept.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TeleportRobot {
    pub team: TeamColor,
    pub id: RobotId,
    pub position: Option<Vector2>,
    pub velocity: Option<Vector2>,
    pub orientation: Option<f64>,
    pub angular_velocity: Option<f64>,
}

impl TeleportRobot {
    pub fn new(team: TeamColor, id: RobotId) -> Self {
        Self {
            team,
            id,
            position: None,
            velocity: None,
            orientation: None,
            angular_velocity: None,
        }
    }

    pub fn to_position(mut self, position: Vector2) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_velocity(mut self, velocity: Vector2) -> Self {
        self.velocity = Some(velocity);
        self
    }

    pub fn with_orientation(mut self, orientation: f64) -> Self {
        self.orientation = Some(orientation);
        self
    }
}

/// Places the ball. Coordinates are in the reported (vision) convention.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TeleportBall {
    pub position: Vector2,
    pub velocity: Option<Vector3>,
    /// Height of the ball centre above the ground. Defaults to resting on
    /// the ground.
    pub height: Option<f64>,
}

impl TeleportBall {
    pub fn new(position: Vector2) -> Self {
        Self {
            position,
            velocity: None,
            height: None,
        }
    }

    pub fn with_velocity(mut self, velocity: Vector3) -> Self {
        self.velocity = Some(velocity);
        self
    }
}

/// Global simulation settings. Fields left as `None` are kept.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SimulationControl {
    pub paused: Option<bool>,
    /// Multiplier applied to every timestep.
    pub speed_scale: Option<f64>,
    /// Standard deviations of the vision noise, in mm and rad.
    pub ball_position_stddev: Option<f64>,
    pub robot_position_stddev: Option<f64>,
    pub robot_orientation_stddev: Option<f64>,
    /// Time in s between capturing a frame and releasing its packets.
    pub vision_delay: Option<f64>,
    /// Part of the delay spent on image processing, in s. Moves
    /// `t_capture` back from `t_sent`.
    pub vision_processing_time: Option<f64>,
}

/// An action injected into the [`Simulator`](crate::Simulator).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SimulatorCommand {
    RobotControl {
        team: TeamColor,
        id: RobotId,
        command: RobotCommand,
    },
    TeleportRobot(TeleportRobot),
    TeleportBall(TeleportBall),
    SimulationControl(SimulationControl),
}

impl SimulatorCommand {
    /// The robot this command addresses, if any.
    pub fn robot(&self) -> Option<(TeamColor, RobotId)> {
        match self {
            SimulatorCommand::RobotControl { team, id, .. } => Some((*team, *id)),
            SimulatorCommand::TeleportRobot(t) => Some((t.team, t.id)),
            SimulatorCommand::TeleportBall(_) | SimulatorCommand::SimulationControl(_) => None,
        }
    }

    /// Check every numeric field. Returns a description of the first
    /// offending value.
    pub(crate) fn validate(&self) -> Result<(), String> {
        match self {
            SimulatorCommand::RobotControl { command, .. } => command.validate(),
            SimulatorCommand::TeleportRobot(t) => {
                let finite = t.position.map_or(true, |p| p.iter().all(|v| v.is_finite()))
                    && t.velocity.map_or(true, |v| v.iter().all(|v| v.is_finite()))
                    && t.orientation.map_or(true, f64::is_finite)
                    && t.angular_velocity.map_or(true, f64::is_finite);
                if !finite {
                    Err("robot teleport contains non-finite values".to_owned())
                } else if !t.position.map_or(true, |p| p.iter().copied().all(in_world)) {
                    Err("robot teleport target is outside the world".to_owned())
                } else {
                    Ok(())
                }
            }
            SimulatorCommand::TeleportBall(t) => {
                let finite = t.position.iter().all(|v| v.is_finite())
                    && t.velocity.map_or(true, |v| v.iter().all(|v| v.is_finite()))
                    && t.height.map_or(true, f64::is_finite);
                if !finite {
                    Err("ball teleport contains non-finite values".to_owned())
                } else if !(t.position.iter().copied().all(in_world)
                    && t.height.map_or(true, in_world))
                {
                    Err("ball teleport target is outside the world".to_owned())
                } else {
                    Ok(())
                }
            }
            SimulatorCommand::SimulationControl(c) => {
                if let Some(scale) = c.speed_scale {
                    if !(scale.is_finite() && scale > 0.0) {
                        return Err(format!("speed scale must be positive, got {}", scale));
                    }
                }
                for stddev in [
                    c.ball_position_stddev,
                    c.robot_position_stddev,
                    c.robot_orientation_stddev,
                ]
                .into_iter()
                .flatten()
                {
                    if !(stddev.is_finite() && stddev >= 0.0) {
                        return Err(format!("noise deviation must be non-negative, got {}", stddev));
                    }
                }
                for latency in [c.vision_delay, c.vision_processing_time].into_iter().flatten() {
                    if !(latency.is_finite() && latency >= 0.0) {
                        return Err(format!("vision latency must be non-negative, got {}", latency));
                    }
                }
                Ok(())
            }
        }
    }
}
