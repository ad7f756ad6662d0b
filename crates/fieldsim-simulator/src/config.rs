use std::f64::consts::PI;

use fieldsim_core::{FieldGeometry, FieldTransform, RobotId, SideAssignment, TeamColor, Vector2};
use fieldsim_radio::RadioGeneration;
use serde::{Deserialize, Serialize};

/// Physical constants of the world.
///
/// Every step is split into equal substeps no longer than `substep`, each
/// one stepping the rigid body pipeline once. Contacts take the restitution
/// of the pair: the ball against the floor, a wall or a robot uses the
/// matching coefficient below, contacts between robots and with walls are
/// inelastic.
///
/// Steps longer than `substep * max_substeps` integrate only that much
/// physics. The clock still advances by the full step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Maximum length of a substep in s
    pub substep: f64,
    /// Upper bound on substeps per step
    pub max_substeps: usize,
    /// Gravity in mm/s^2
    pub gravity: f64,
    /// Linear damping of the ball, in 1/s
    pub ball_damping: f64,
    /// A rolling ball slower than this (mm/s) comes to rest
    pub ball_stop_speed: f64,
    /// Fraction of vertical speed kept when the ball bounces off the floor
    pub ball_floor_restitution: f64,
    /// Vertical speed (mm/s) below which a bounce ends and the ball rolls
    pub ball_bounce_stop_speed: f64,
    pub ball_robot_restitution: f64,
    pub wall_restitution: f64,
    /// How far (mm) in front of the robot hull the dribbler still reaches
    pub dribbler_reach: f64,
    /// Time in s after which a robot without new commands stops
    pub command_timeout: f64,
    /// Bodies faster than this (mm/s) are treated as diverged
    pub max_body_speed: f64,
    /// Robots spinning faster than this (rad/s) are treated as diverged
    pub max_body_angular_speed: f64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            substep: 0.002,
            max_substeps: 1000,
            gravity: 9810.0,
            ball_damping: 0.4,
            ball_stop_speed: 10.0,
            ball_floor_restitution: 0.5,
            ball_bounce_stop_speed: 100.0,
            ball_robot_restitution: 0.3,
            wall_restitution: 0.6,
            dribbler_reach: 20.0,
            command_timeout: 0.1,
            max_body_speed: 100_000.0,
            max_body_angular_speed: 1000.0,
        }
    }
}

/// Per-axis acceleration limits, in mm/s^2 and rad/s^2.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccelerationLimits {
    pub a_speedup_f_max: f64,
    pub a_speedup_s_max: f64,
    pub a_speedup_phi_max: f64,
    pub a_brake_f_max: f64,
    pub a_brake_s_max: f64,
    pub a_brake_phi_max: f64,
}

impl Default for AccelerationLimits {
    fn default() -> Self {
        Self {
            a_speedup_f_max: 7000.0,
            a_speedup_s_max: 6000.0,
            a_speedup_phi_max: 60.0,
            a_brake_f_max: 7000.0,
            a_brake_s_max: 6000.0,
            a_brake_phi_max: 60.0,
        }
    }
}

/// Physical description of a robot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotSpecs {
    /// Radio generation the robot firmware speaks
    pub generation: RadioGeneration,
    pub radius: f64,
    pub height: f64,
    /// Angle between the forward axis and the front wheels, in rad
    pub front_wheel_angle: f64,
    /// Angle between the forward axis and the back wheels, in rad
    pub back_wheel_angle: f64,
    /// Distance from the robot centre to the wheel contact points, in mm
    pub wheel_distance: f64,
    /// Maximum speed in mm/s
    pub v_max: f64,
    /// Maximum angular speed in rad/s
    pub omega_max: f64,
    /// Maximum flat kick speed in mm/s
    pub shot_linear_max: f64,
    /// Maximum chip kick speed in mm/s
    pub shot_chip_max: f64,
    pub dribbler_width: f64,
    /// Highest ball centre the dribbler can touch, in mm
    pub dribbler_height: f64,
    pub acceleration: AccelerationLimits,
}

impl Default for RobotSpecs {
    fn default() -> Self {
        Self {
            generation: RadioGeneration::Gen2014,
            radius: 90.0,
            height: 150.0,
            front_wheel_angle: 0.98291,
            back_wheel_angle: 2.35619,
            wheel_distance: 80.0,
            v_max: 3000.0,
            omega_max: 6.0,
            shot_linear_max: 8000.0,
            shot_chip_max: 3000.0,
            dribbler_width: 70.0,
            dribbler_height: 40.0,
            acceleration: AccelerationLimits::default(),
        }
    }
}

/// A robot present when the world is populated. Position and orientation
/// are in raw simulation coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotSetup {
    pub team: TeamColor,
    pub id: RobotId,
    pub position: Vector2,
    pub orientation: f64,
    #[serde(default)]
    pub specs: RobotSpecs,
}

/// The area of the field a camera observes, in raw coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    pub id: u32,
    pub min: Vector2,
    pub max: Vector2,
}

impl CameraConfig {
    pub fn sees(&self, p: &Vector2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Two cameras, one per field half, whose views overlap by `overlap` mm
    /// around the halfway line. Both cover the boundary up to the walls.
    pub fn halves(geometry: &FieldGeometry, overlap: f64) -> Vec<CameraConfig> {
        let ext = geometry.wall_half_extents();
        let half_overlap = overlap / 2.0;
        vec![
            CameraConfig {
                id: 0,
                min: Vector2::new(-ext.x, -ext.y),
                max: Vector2::new(half_overlap, ext.y),
            },
            CameraConfig {
                id: 1,
                min: Vector2::new(-half_overlap, -ext.y),
                max: Vector2::new(ext.x, ext.y),
            },
        ]
    }
}

/// Everything the [`Simulator`](crate::Simulator) is built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorSetup {
    pub geometry: FieldGeometry,
    pub physics: PhysicsConfig,
    pub cameras: Vec<CameraConfig>,
    pub robots: Vec<RobotSetup>,
    /// Initial ball position in raw coordinates
    pub ball_position: Vector2,
    /// Which team defends the positive x half
    pub sides: SideAssignment,
    /// Report coordinates in the frame of this team, in which it attacks
    /// towards +x. Overrides `flip`.
    pub report_as: Option<TeamColor>,
    /// Report coordinates rotated by 180 degrees
    pub flip: bool,
    /// Clamp teleports to the area inside the walls
    pub clamp_teleports: bool,
    /// Interval in s at which field geometry is attached to the packets
    pub geometry_interval: f64,
    /// Seed of the vision noise generator
    pub seed: u64,
}

impl Default for SimulatorSetup {
    fn default() -> Self {
        Self::with_robots(6, 6)
    }
}

impl SimulatorSetup {
    /// Mapping from raw simulation coordinates to the reported ones.
    pub fn field_transform(&self) -> FieldTransform {
        match self.report_as {
            Some(team) => self.sides.field_transform(team),
            None => FieldTransform::with_flip(self.flip),
        }
    }

    /// Division B field with two cameras and the given number of robots per
    /// team lined up along the bottom touch line of their own half.
    pub fn with_robots(blue: usize, yellow: usize) -> Self {
        Self::with_sides(SideAssignment::default(), blue, yellow)
    }

    /// Like [`Self::with_robots`], with the halves assigned by `sides`.
    pub fn with_sides(sides: SideAssignment, blue: usize, yellow: usize) -> Self {
        let geometry = FieldGeometry::default();
        let specs = RobotSpecs::default();

        let radius = specs.radius;
        let margin = 0.75 * radius;
        let y = -(geometry.half_width() - radius - margin);
        let mut robots = Vec::with_capacity(blue + yellow);
        for (team, count) in [(TeamColor::Blue, blue), (TeamColor::Yellow, yellow)] {
            let attack = sides.attacking_direction_sign(team);
            for i in 0..count {
                // own half is opposite to the attacking direction
                let x = -attack
                    * (geometry.half_length() - margin - i as f64 * (2.0 * radius + margin));
                robots.push(RobotSetup {
                    team,
                    id: RobotId::new(i as u32),
                    position: Vector2::new(x, y),
                    orientation: if attack > 0.0 { 0.0 } else { PI },
                    specs: specs.clone(),
                });
            }
        }

        Self {
            cameras: CameraConfig::halves(&geometry, 400.0),
            geometry,
            physics: PhysicsConfig::default(),
            robots,
            ball_position: Vector2::zeros(),
            sides,
            report_as: None,
            flip: false,
            clamp_teleports: true,
            geometry_interval: 3.0,
            seed: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_setup_has_six_robots_per_team() {
        let setup = SimulatorSetup::default();
        let count = |team| setup.robots.iter().filter(|r| r.team == team).count();
        assert_eq!(count(TeamColor::Blue), 6);
        assert_eq!(count(TeamColor::Yellow), 6);
        assert_eq!(setup.cameras.len(), 2);
    }

    #[test]
    fn default_robots_start_in_own_half() {
        let setup = SimulatorSetup::default();
        let ext = setup.geometry.wall_half_extents();
        for robot in &setup.robots {
            match robot.team {
                TeamColor::Blue => assert!(robot.position.x > 0.0),
                TeamColor::Yellow => assert!(robot.position.x < 0.0),
            }
            assert!(robot.position.x.abs() < ext.x);
            assert!(robot.position.y.abs() < ext.y);
        }
    }

    #[test]
    fn camera_halves_overlap() {
        let geometry = FieldGeometry::default();
        let cameras = CameraConfig::halves(&geometry, 400.0);
        let centre = Vector2::new(100.0, 0.0);
        assert!(cameras.iter().all(|c| c.sees(&centre)));
        let right = Vector2::new(3000.0, 1000.0);
        assert!(!cameras[0].sees(&right));
        assert!(cameras[1].sees(&right));
    }

    #[test]
    fn yellow_on_positive_swaps_halves() {
        let setup = SimulatorSetup::with_sides(SideAssignment::YellowOnPositive, 2, 2);
        for robot in &setup.robots {
            match robot.team {
                TeamColor::Blue => assert!(robot.position.x < 0.0),
                TeamColor::Yellow => assert!(robot.position.x > 0.0),
            }
        }
    }

    #[test]
    fn report_as_follows_side_assignment() {
        let mut setup = SimulatorSetup::default();
        assert!(setup.field_transform().is_identity());
        setup.flip = true;
        assert!(setup.field_transform().is_flipped());

        // blue defends +x by default, so it sees the field rotated
        setup.flip = false;
        setup.report_as = Some(TeamColor::Blue);
        assert!(setup.field_transform().is_flipped());
        setup.report_as = Some(TeamColor::Yellow);
        assert!(setup.field_transform().is_identity());

        setup.sides = SideAssignment::YellowOnPositive;
        assert!(setup.field_transform().is_flipped());
    }

    #[test]
    fn setup_deserializes_with_defaults() {
        let setup: SimulatorSetup = serde_json::from_str(r#"{"flip": true}"#).unwrap();
        assert!(setup.flip);
        assert_eq!(setup.physics, PhysicsConfig::default());
        assert_eq!(setup.robots.len(), 12);
    }
}
