//! The rigid body world.
//!
//! Robots and the ball live in [`SimRobot`] and [`SimBall`], which stay the
//! source of truth. Every substep their state is pushed into a rapier world,
//! stepped once and read back. Robots are processed in roster order so that
//! a replay of the same commands reproduces every floating point operation
//! in the same order.
//!
//! Collision groups pick the restitution of each contact pair:
//!
//! | group | bodies            | collides with | restitution         |
//! |-------|-------------------|---------------|---------------------|
//! | 1     | floor and walls   | 2, 4          | floor / wall        |
//! | 2     | robot hulls       | 1, 2          | none                |
//! | 3     | robot bumpers     | 4             | ball on robot       |
//! | 4     | ball              | 1, 3          | takes the other one |

use std::f64::consts::FRAC_PI_2;

use fieldsim_core::{wrap_angle, FieldGeometry, Vector2, Vector3};
use rapier3d_f64::prelude::*;

use crate::{ball::SimBall, config::PhysicsConfig, robot::SimRobot};

/// No coordinate may leave this range (mm). Keeps the broad phase sane.
pub(crate) const WORLD_LIMIT: f64 = 1e6;

const GROUND_THICKNESS: f64 = 100.0;
const WALL_THICKNESS: f64 = 100.0;
const WALL_HEIGHT: f64 = 1000.0;
/// Robots hover this far (mm) above the floor and never touch it.
const ROBOT_CLEARANCE: f64 = 1.0;

fn static_groups() -> InteractionGroups {
    InteractionGroups::new(Group::GROUP_1, Group::GROUP_2 | Group::GROUP_4)
}

fn hull_groups() -> InteractionGroups {
    InteractionGroups::new(Group::GROUP_2, Group::GROUP_1 | Group::GROUP_2)
}

fn bumper_groups() -> InteractionGroups {
    InteractionGroups::new(Group::GROUP_3, Group::GROUP_4)
}

fn ball_groups() -> InteractionGroups {
    InteractionGroups::new(Group::GROUP_4, Group::GROUP_1 | Group::GROUP_3)
}

fn robot_height(robot: &SimRobot) -> f64 {
    robot.specs.height / 2.0 + ROBOT_CLEARANCE
}

pub(crate) struct PhysicsWorld {
    rigid_body_set: RigidBodySet,
    collider_set: ColliderSet,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: BroadPhase,
    narrow_phase: NarrowPhase,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,
    ccd_solver: CCDSolver,
    gravity: Vector<f64>,
    /// Body of each robot, in roster order
    robot_handles: Vec<RigidBodyHandle>,
    ball_handle: RigidBodyHandle,
}

impl PhysicsWorld {
    /// Build the floor, the boundary walls and one body per robot and ball.
    pub fn new(
        geometry: &FieldGeometry,
        physics: &PhysicsConfig,
        robots: &[SimRobot],
        ball: &SimBall,
    ) -> Self {
        let mut world = Self {
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: BroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            gravity: Vector::new(0.0, 0.0, -physics.gravity),
            robot_handles: Vec::with_capacity(robots.len()),
            ball_handle: RigidBodyHandle::invalid(),
        };

        let ext = geometry.wall_half_extents();
        // z=0.0 is the ground surface
        world.add_fixed(
            Vector::new(0.0, 0.0, -GROUND_THICKNESS / 2.0),
            Vector::new(
                ext.x + WALL_THICKNESS,
                ext.y + WALL_THICKNESS,
                GROUND_THICKNESS / 2.0,
            ),
            physics.ball_floor_restitution,
        );
        let offset = WALL_THICKNESS / 2.0;
        for sign in [1.0, -1.0] {
            world.add_fixed(
                Vector::new(sign * (ext.x + offset), 0.0, WALL_HEIGHT / 2.0),
                Vector::new(offset, ext.y + WALL_THICKNESS, WALL_HEIGHT / 2.0),
                physics.wall_restitution,
            );
            world.add_fixed(
                Vector::new(0.0, sign * (ext.y + offset), WALL_HEIGHT / 2.0),
                Vector::new(ext.x + WALL_THICKNESS, offset, WALL_HEIGHT / 2.0),
                physics.wall_restitution,
            );
        }

        for robot in robots {
            let handle = world.add_robot(robot, physics);
            world.robot_handles.push(handle);
        }
        world.ball_handle = world.add_ball(ball, physics);
        world
    }

    fn add_fixed(&mut self, center: Vector<f64>, half_extents: Vector<f64>, restitution: f64) {
        let body = RigidBodyBuilder::fixed().translation(center).build();
        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            .restitution(restitution)
            .restitution_combine_rule(CoefficientCombineRule::Average)
            .collision_groups(static_groups())
            .build();
        let handle = self.rigid_body_set.insert(body);
        self.collider_set
            .insert_with_parent(collider, handle, &mut self.rigid_body_set);
    }

    fn add_robot(&mut self, robot: &SimRobot, physics: &PhysicsConfig) -> RigidBodyHandle {
        let state = &robot.state;
        let body = RigidBodyBuilder::dynamic()
            .translation(Vector::new(
                state.position.x,
                state.position.y,
                robot_height(robot),
            ))
            .rotation(Vector::z() * state.orientation)
            .locked_axes(
                LockedAxes::TRANSLATION_LOCKED_Z
                    | LockedAxes::ROTATION_LOCKED_X
                    | LockedAxes::ROTATION_LOCKED_Y,
            )
            .can_sleep(false)
            .build();
        let half_height = robot.specs.height / 2.0;
        let hull = ColliderBuilder::cylinder(half_height, state.radius)
            .rotation(Vector::x() * FRAC_PI_2)
            .restitution(0.0)
            .restitution_combine_rule(CoefficientCombineRule::Min)
            .collision_groups(hull_groups())
            .build();
        // massless copy of the hull that only the ball sees
        let bumper = ColliderBuilder::cylinder(half_height, state.radius)
            .rotation(Vector::x() * FRAC_PI_2)
            .density(0.0)
            .restitution(physics.ball_robot_restitution)
            .collision_groups(bumper_groups())
            .build();
        let handle = self.rigid_body_set.insert(body);
        self.collider_set
            .insert_with_parent(hull, handle, &mut self.rigid_body_set);
        self.collider_set
            .insert_with_parent(bumper, handle, &mut self.rigid_body_set);
        handle
    }

    fn add_ball(&mut self, ball: &SimBall, physics: &PhysicsConfig) -> RigidBodyHandle {
        let body = RigidBodyBuilder::dynamic()
            .can_sleep(false)
            .ccd_enabled(true)
            .translation(ball.state.position)
            .linear_damping(physics.ball_damping)
            .build();
        let collider = ColliderBuilder::ball(ball.radius)
            .mass(1.0)
            .friction(0.0)
            .friction_combine_rule(CoefficientCombineRule::Min)
            .restitution(1.0)
            .restitution_combine_rule(CoefficientCombineRule::Multiply)
            .collision_groups(ball_groups())
            .build();
        let handle = self.rigid_body_set.insert(body);
        self.collider_set
            .insert_with_parent(collider, handle, &mut self.rigid_body_set);
        handle
    }

    /// Integrate the world by `dt`. The states must be sane, see
    /// [`RobotState::is_sane`](crate::RobotState).
    pub fn step(
        &mut self,
        robots: &mut [SimRobot],
        ball: &mut SimBall,
        geometry: &FieldGeometry,
        physics: &PhysicsConfig,
        dt: f64,
    ) {
        self.push(robots, ball);

        self.integration_parameters.dt = dt;
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            None,
            &(),
            &(),
        );

        self.pull(robots, ball);
        ball.settle(physics);
        keep_inside_walls(robots, ball, geometry, physics);
    }

    fn push(&mut self, robots: &[SimRobot], ball: &SimBall) {
        for (robot, handle) in robots.iter().zip(&self.robot_handles) {
            let Some(body) = self.rigid_body_set.get_mut(*handle) else {
                continue;
            };
            let state = &robot.state;
            body.set_translation(
                Vector::new(state.position.x, state.position.y, robot_height(robot)),
                true,
            );
            body.set_rotation(Rotation::from_euler_angles(0.0, 0.0, state.orientation), true);
            body.set_linvel(Vector::new(state.velocity.x, state.velocity.y, 0.0), true);
            body.set_angvel(Vector::new(0.0, 0.0, state.angular_velocity), true);
        }

        if let Some(body) = self.rigid_body_set.get_mut(self.ball_handle) {
            body.set_translation(ball.state.position, true);
            body.set_linvel(ball.state.velocity, true);
            body.set_angvel(Vector::zeros(), true);
        }
    }

    fn pull(&self, robots: &mut [SimRobot], ball: &mut SimBall) {
        for (robot, handle) in robots.iter_mut().zip(&self.robot_handles) {
            let Some(body) = self.rigid_body_set.get(*handle) else {
                continue;
            };
            let position = body.translation();
            let velocity = body.linvel();
            robot.state.position = Vector2::new(position.x, position.y);
            robot.state.velocity = Vector2::new(velocity.x, velocity.y);
            robot.state.orientation = wrap_angle(body.rotation().euler_angles().2);
            robot.state.angular_velocity = body.angvel().z;
        }

        if let Some(body) = self.rigid_body_set.get(self.ball_handle) {
            ball.state.position = *body.translation();
            ball.state.velocity = *body.linvel();
        }
    }
}

/// Drop expired commands and run the motion controller of every robot, then
/// let the kickers and dribblers act on the ball.
pub(crate) fn drive_robots(
    robots: &mut [SimRobot],
    ball: &mut SimBall,
    physics: &PhysicsConfig,
    now: f64,
    dt: f64,
) {
    for robot in robots.iter_mut() {
        robot.expire_command(now, physics);
        robot.drive(now, dt, physics);
    }
    kick_and_dribble(robots, ball, physics);
}

/// Fire pending kicks and let dribbling robots hold the ball. The first
/// robot in roster order that touches the ball wins.
fn kick_and_dribble(robots: &mut [SimRobot], ball: &mut SimBall, physics: &PhysicsConfig) {
    let Some(robot) = robots
        .iter_mut()
        .find(|r| r.touches_dribbler(&ball.state.position, ball.radius, physics))
    else {
        return;
    };

    if let Some(kick) = robot.pending_kick.take() {
        let max = if kick.chip_angle > 0.0 {
            robot.specs.shot_chip_max
        } else {
            robot.specs.shot_linear_max
        };
        let speed = kick.speed.min(max);
        let heading = robot.heading();
        let flat = heading * speed * kick.chip_angle.cos();
        ball.state.velocity = Vector3::new(flat.x, flat.y, speed * kick.chip_angle.sin());
        log::debug!(
            "{} {} kicked the ball at {:.0} mm/s",
            robot.state.team,
            robot.state.id,
            speed
        );
    } else if robot.dribbler_speed > 0.0 {
        let hold = robot.state.position + robot.heading() * (robot.state.radius + ball.radius);
        ball.state.position = Vector3::new(hold.x, hold.y, ball.radius);
        ball.state.velocity = Vector3::new(robot.state.velocity.x, robot.state.velocity.y, 0.0);
    }
}

/// Backstop for bodies that slipped through a wall. Robots stop against
/// it, the ball bounces off it.
fn keep_inside_walls(
    robots: &mut [SimRobot],
    ball: &mut SimBall,
    geometry: &FieldGeometry,
    physics: &PhysicsConfig,
) {
    for robot in robots.iter_mut() {
        let before = robot.state.position;
        let (clamped, moved) = geometry.clamp_inside_walls(&before, robot.state.radius);
        if moved {
            robot.state.position = clamped;
            if clamped.x != before.x {
                robot.state.velocity.x = 0.0;
            }
            if clamped.y != before.y {
                robot.state.velocity.y = 0.0;
            }
        }
    }

    let before = ball.state.position.xy();
    let (clamped, moved) = geometry.clamp_inside_walls(&before, ball.radius);
    if moved {
        ball.state.position.x = clamped.x;
        ball.state.position.y = clamped.y;
        // reflect only the component pointing into the wall
        if clamped.x != before.x && ball.state.velocity.x * (before.x - clamped.x) > 0.0 {
            ball.state.velocity.x *= -physics.wall_restitution;
        }
        if clamped.y != before.y && ball.state.velocity.y * (before.y - clamped.y) > 0.0 {
            ball.state.velocity.y *= -physics.wall_restitution;
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use fieldsim_core::{RobotId, TeamColor};

    use super::*;
    use crate::{
        command::RobotCommand,
        config::{RobotSetup, RobotSpecs},
    };

    const R: f64 = 21.5;

    fn robot_at(id: u32, x: f64, y: f64) -> SimRobot {
        SimRobot::new(&RobotSetup {
            team: TeamColor::Blue,
            id: RobotId::new(id),
            position: Vector2::new(x, y),
            orientation: 0.0,
            specs: RobotSpecs::default(),
        })
        .unwrap()
    }

    /// Step a world of `robots` and `ball` for `seconds` in default substeps.
    fn run(robots: &mut [SimRobot], ball: &mut SimBall, seconds: f64) {
        let geometry = FieldGeometry::default();
        let physics = PhysicsConfig::default();
        let mut world = PhysicsWorld::new(&geometry, &physics, robots, ball);
        let steps = (seconds / physics.substep).round() as usize;
        for _ in 0..steps {
            world.step(robots, ball, &geometry, &physics, physics.substep);
        }
    }

    #[test]
    fn resting_ball_stays_put() {
        let mut ball = SimBall::new(Vector3::new(300.0, -200.0, R), R);
        run(&mut [], &mut ball, 0.5);
        assert_relative_eq!(ball.state.position, Vector3::new(300.0, -200.0, R), epsilon = 1e-9);
        assert_relative_eq!(ball.state.velocity, Vector3::zeros(), epsilon = 1e-9);
    }

    #[test]
    fn rolling_ball_is_damped() {
        let mut ball = SimBall::new(Vector3::new(0.0, 0.0, R), R);
        ball.state.velocity = Vector3::new(1000.0, 0.0, 0.0);
        run(&mut [], &mut ball, 1.0);
        // exp(-0.4) of the initial speed
        assert!(ball.state.velocity.x > 600.0 && ball.state.velocity.x < 700.0);
        assert!(ball.state.position.x > 700.0 && ball.state.position.x < 900.0);
        assert_relative_eq!(ball.state.position.y, 0.0, epsilon = 1e-9);

        let mut slow = SimBall::new(Vector3::new(0.0, 0.0, R), R);
        slow.state.velocity = Vector3::new(12.0, 0.0, 0.0);
        run(&mut [], &mut slow, 1.0);
        assert_eq!(slow.state.velocity, Vector3::zeros());
    }

    #[test]
    fn airborne_ball_falls_and_settles() {
        let mut ball = SimBall::new(Vector3::new(0.0, 0.0, 500.0), R);
        run(&mut [], &mut ball, 0.2);
        assert!(ball.state.is_airborne(R));
        run(&mut [], &mut ball, 3.0);
        assert_relative_eq!(ball.state.position.z, R, epsilon = 1e-9);
        assert_eq!(ball.state.velocity.z, 0.0);
        assert!(!ball.state.is_airborne(R));
    }

    #[test]
    fn ball_bounces_off_wall() {
        let mut ball = SimBall::new(Vector3::new(4700.0, 0.0, R), R);
        ball.state.velocity = Vector3::new(2000.0, 0.0, 0.0);
        run(&mut [], &mut ball, 0.2);
        assert!(ball.state.velocity.x < -1000.0);
        assert!(ball.state.velocity.x > -1300.0);
        assert!(ball.state.position.x <= 4800.0 - R);
    }

    #[test]
    fn ball_bounces_off_robot() {
        let mut robots = vec![robot_at(0, 0.0, 0.0)];
        let mut ball = SimBall::new(Vector3::new(0.0, 300.0, R), R);
        ball.state.velocity = Vector3::new(0.0, -1000.0, 0.0);
        run(&mut robots, &mut ball, 0.4);
        assert!(ball.state.velocity.y > 200.0 && ball.state.velocity.y < 320.0);
        assert!(ball.state.position.y >= 90.0 + R - 1.0);
        // the robot does not notice the ball
        assert_relative_eq!(robots[0].state.position, Vector2::zeros(), epsilon = 1e-3);
    }

    #[test_log::test]
    fn robot_stops_at_wall() {
        let mut robots = vec![robot_at(0, 0.0, 3150.0)];
        robots[0].state.velocity = Vector2::new(0.0, 800.0);
        let mut ball = SimBall::new(Vector3::new(0.0, 0.0, R), R);
        run(&mut robots, &mut ball, 0.3);
        let state = &robots[0].state;
        assert!(state.position.y <= 3300.0 - 90.0 + 1e-6);
        assert!(state.velocity.y.abs() < 1.0);
    }

    #[test_log::test]
    fn overlapping_robots_are_pushed_apart() {
        let mut robots = vec![robot_at(0, 0.0, 0.0), robot_at(1, 170.0, 0.0)];
        let mut ball = SimBall::new(Vector3::new(0.0, 2000.0, R), R);
        run(&mut robots, &mut ball, 0.5);
        let distance = (robots[1].state.position - robots[0].state.position).norm();
        assert!(distance >= 180.0 - 1.0);
        // equal masses share the correction
        assert!(robots[0].state.position.x < 0.0);
        assert!(robots[1].state.position.x > 170.0);
    }

    #[test]
    fn clamp_backstop_reflects_ball() {
        let geometry = FieldGeometry::default();
        let physics = PhysicsConfig::default();
        let mut ball = SimBall::new(Vector3::new(5000.0, 0.0, R), R);
        ball.state.velocity = Vector3::new(1000.0, 0.0, 0.0);
        keep_inside_walls(&mut [], &mut ball, &geometry, &physics);
        assert_relative_eq!(ball.state.position.x, 4800.0 - R);
        assert_relative_eq!(ball.state.velocity.x, -600.0);
    }

    #[test]
    fn kick_launches_ball_along_heading() {
        let physics = PhysicsConfig::default();
        let mut robots = vec![robot_at(0, 0.0, 0.0)];
        robots[0].apply_command(&RobotCommand::stop().with_kick(20_000.0, 0.0), 0.0);
        let mut ball = SimBall::new(Vector3::new(115.0, 0.0, R), R);
        kick_and_dribble(&mut robots, &mut ball, &physics);
        assert_relative_eq!(ball.state.velocity, Vector3::new(8000.0, 0.0, 0.0));
        assert!(robots[0].pending_kick.is_none());
    }

    #[test]
    fn chip_kick_lifts_ball() {
        let physics = PhysicsConfig::default();
        let mut robots = vec![robot_at(0, 0.0, 0.0)];
        let angle = std::f64::consts::FRAC_PI_4;
        robots[0].apply_command(&RobotCommand::stop().with_kick(2000.0, angle), 0.0);
        let mut ball = SimBall::new(Vector3::new(115.0, 0.0, R), R);
        kick_and_dribble(&mut robots, &mut ball, &physics);
        assert_relative_eq!(ball.state.velocity.x, 2000.0 * angle.cos(), epsilon = 1e-9);
        assert_relative_eq!(ball.state.velocity.z, 2000.0 * angle.sin(), epsilon = 1e-9);

        run(&mut robots, &mut ball, 0.1);
        assert!(ball.state.is_airborne(R));
    }

    #[test]
    fn dribbler_holds_ball() {
        let physics = PhysicsConfig::default();
        let mut robots = vec![robot_at(0, 0.0, 0.0)];
        robots[0].apply_command(&RobotCommand::stop().with_dribbler(1.0), 0.0);
        let mut ball = SimBall::new(Vector3::new(120.0, 10.0, R), R);
        ball.state.velocity = Vector3::new(300.0, 0.0, 0.0);
        kick_and_dribble(&mut robots, &mut ball, &physics);
        assert_relative_eq!(ball.state.position, Vector3::new(111.5, 0.0, R));
        assert_eq!(ball.state.velocity, Vector3::zeros());
    }
}
