use std::{
    collections::{BTreeMap, BTreeSet, VecDeque},
    f64::consts::FRAC_PI_4,
};

use fieldsim_core::{
    wrap_angle, Clock, FieldTransform, RobotId, SimInstant, TeamColor, Vector2, Vector3,
};
use fieldsim_radio::{
    RadioCommand, RadioError, RadioGeneration, RadioResponse, RadioResponse2012,
    RadioResponse2014,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use utils::IntervalTrigger;

mod ball;
mod command;
mod config;
mod error;
mod physics;
mod robot;
mod utils;
mod vision;

pub use ball::BallState;
pub use command::*;
pub use config::*;
pub use error::{SetupError, SimulationError, SimulationErrorKind};
pub use robot::{wheel_inverse, wheel_matrix, RobotState};
pub use vision::{DetectionBall, DetectionFrame, DetectionRobot, VisionNoise, WrapperPacket};

use ball::SimBall;
use error::ErrorLog;
use physics::{PhysicsWorld, WORLD_LIMIT};
use robot::SimRobot;

/// Elevation of chip kicks requested over the radio, which carries no angle.
const RADIO_CHIP_ANGLE: f64 = FRAC_PI_4;

/// Slack (s) when comparing a packet release time against the clock, which
/// is a sum of step lengths.
const RELEASE_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulatorState {
    /// Populated from the setup, not stepped yet
    Ready,
    /// At least one step has run since construction or the last reset
    Stepping,
}

/// An encoded radio response and the team whose transceiver receives it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RadioReply {
    pub team: TeamColor,
    pub frame: Vec<u8>,
}

#[derive(Debug)]
struct QueuedCommand {
    command: SimulatorCommand,
    /// Frame counter of the radio frame this command was decoded from
    radio_counter: Option<u8>,
}

/// A deterministic simulator of a robot soccer field.
///
/// Commands are queued with [`Simulator::handle_simulator_command`] and
/// applied, oldest first, at the start of the next
/// [`Simulator::step_simulation`]. Problems never fail a call; they are
/// collected and handed out by [`Simulator::get_errors`].
///
/// Positions handed in through teleports and reported through packets use
/// the reported convention given by [`Simulator::field_transform`]. The
/// state accessors ([`Simulator::robot`], [`Simulator::ball`]) expose raw
/// simulation coordinates.
///
/// ## Usage
///
/// ```
/// use fieldsim_core::{FixedClock, SimInstant, Vector2};
/// use fieldsim_simulator::{Simulator, SimulatorCommand, SimulatorSetup, TeleportBall};
///
/// let clock = FixedClock::new(SimInstant::default());
/// let mut simulator = Simulator::new(SimulatorSetup::default(), &clock).unwrap();
///
/// simulator.handle_simulator_command(SimulatorCommand::TeleportBall(TeleportBall::new(
///     Vector2::new(50.0, 200.0),
/// )));
/// simulator.step_simulation(0.01);
///
/// for packet in simulator.get_ssl_wrapper_packets() {
///     // Do something with the detection
///     let _ = &packet.detection.balls;
/// }
/// assert!(simulator.get_errors().is_empty());
/// ```
pub struct Simulator {
    setup: SimulatorSetup,
    transform: FieldTransform,
    start: SimInstant,
    elapsed: f64,
    state: SimulatorState,
    robots: Vec<SimRobot>,
    index: BTreeMap<(TeamColor, RobotId), usize>,
    ball: SimBall,
    world: PhysicsWorld,
    initial_robots: Vec<SimRobot>,
    initial_ball: SimBall,
    queue: VecDeque<QueuedCommand>,
    errors: ErrorLog,
    /// Newest released packets
    packets: Vec<WrapperPacket>,
    /// Rendered packets waiting for their release time, oldest first
    pending_packets: VecDeque<(f64, Vec<WrapperPacket>)>,
    vision_delay: f64,
    vision_processing_time: f64,
    radio_replies: Vec<RadioReply>,
    paused: bool,
    speed_scale: f64,
    noise: VisionNoise,
    rng: ChaCha8Rng,
    frame_number: u32,
    geometry_trigger: IntervalTrigger,
}

fn check(name: &'static str, value: f64, valid: bool) -> Result<(), SetupError> {
    if value.is_finite() && valid {
        Ok(())
    } else {
        Err(SetupError::InvalidParameter { name, value })
    }
}

fn validate_setup(setup: &SimulatorSetup) -> Result<(), SetupError> {
    let geometry = &setup.geometry;
    if !(geometry.field_length > 0.0
        && geometry.field_width > 0.0
        && geometry.field_length.is_finite()
        && geometry.field_width.is_finite())
    {
        return Err(SetupError::InvalidField {
            length: geometry.field_length,
            width: geometry.field_width,
        });
    }
    check("boundary_width", geometry.boundary_width, geometry.boundary_width >= 0.0)?;
    check("ball_radius", geometry.ball_radius, geometry.ball_radius > 0.0)?;

    let physics = &setup.physics;
    check("substep", physics.substep, physics.substep > 0.0)?;
    check(
        "max_substeps",
        physics.max_substeps as f64,
        physics.max_substeps > 0,
    )?;
    for (name, value) in [
        ("gravity", physics.gravity),
        ("ball_damping", physics.ball_damping),
        ("ball_stop_speed", physics.ball_stop_speed),
        ("ball_floor_restitution", physics.ball_floor_restitution),
        ("ball_bounce_stop_speed", physics.ball_bounce_stop_speed),
        ("ball_robot_restitution", physics.ball_robot_restitution),
        ("wall_restitution", physics.wall_restitution),
        ("dribbler_reach", physics.dribbler_reach),
        ("command_timeout", physics.command_timeout),
    ] {
        check(name, value, value >= 0.0)?;
    }
    check(
        "max_body_speed",
        physics.max_body_speed,
        physics.max_body_speed > 0.0,
    )?;
    check(
        "max_body_angular_speed",
        physics.max_body_angular_speed,
        physics.max_body_angular_speed > 0.0,
    )?;
    check(
        "geometry_interval",
        setup.geometry_interval,
        setup.geometry_interval >= 0.0,
    )?;

    if setup.cameras.is_empty() {
        return Err(SetupError::NoCameras);
    }

    let inside = |v: f64| v.abs() <= WORLD_LIMIT;
    for robot in &setup.robots {
        check("robot radius", robot.specs.radius, robot.specs.radius > 0.0)?;
        check("robot height", robot.specs.height, robot.specs.height > 0.0)?;
        check("robot x", robot.position.x, inside(robot.position.x))?;
        check("robot y", robot.position.y, inside(robot.position.y))?;
        check("robot orientation", robot.orientation, true)?;
    }
    check("ball x", setup.ball_position.x, inside(setup.ball_position.x))?;
    check("ball y", setup.ball_position.y, inside(setup.ball_position.y))?;
    Ok(())
}

/// Translate a radio frame into the command it asks for. Velocities arrive
/// in mm/s and mrad/s with the sideways axis pointing right.
fn radio_to_command(radio: &RadioCommand, specs: &RobotSpecs) -> RobotCommand {
    if radio.standby() {
        return RobotCommand::stop();
    }
    let (v_s, v_f, omega) = radio.velocity();
    let mut command = RobotCommand::local_velocity(v_f as f64, -(v_s as f64), omega as f64 / 1000.0)
        .with_dribbler(radio.dribbler() as f64 / 100.0);
    if radio.shot_power() > 0 {
        let fraction = radio.shot_power() as f64 / 255.0;
        command = if radio.chip() {
            command.with_kick(fraction * specs.shot_chip_max, RADIO_CHIP_ANGLE)
        } else {
            command.with_kick(fraction * specs.shot_linear_max, 0.0)
        };
    }
    command
}

/// Rounds to the nearest integer; float to int casts saturate.
fn to_wire(value: f64) -> i16 {
    value.round() as i16
}

impl Simulator {
    /// Create a new simulator populated from `setup`. The clock is read once
    /// to stamp the first frame; later timestamps follow simulated time.
    pub fn new(setup: SimulatorSetup, clock: &impl Clock) -> Result<Simulator, SetupError> {
        validate_setup(&setup)?;

        let mut robots = Vec::with_capacity(setup.robots.len());
        let mut index = BTreeMap::new();
        for robot_setup in &setup.robots {
            let key = (robot_setup.team, robot_setup.id);
            if index.contains_key(&key) {
                return Err(SetupError::DuplicateRobot {
                    team: key.0,
                    id: key.1,
                });
            }
            let robot = SimRobot::new(robot_setup).ok_or(SetupError::DegenerateWheels {
                team: key.0,
                id: key.1,
            })?;
            index.insert(key, robots.len());
            robots.push(robot);
        }

        let ball_radius = setup.geometry.ball_radius;
        let ball = SimBall::new(
            Vector3::new(setup.ball_position.x, setup.ball_position.y, ball_radius),
            ball_radius,
        );

        log::info!(
            "Simulator ready with {} robots and {} cameras",
            robots.len(),
            setup.cameras.len()
        );

        let world = PhysicsWorld::new(&setup.geometry, &setup.physics, &robots, &ball);

        let mut simulator = Simulator {
            transform: setup.field_transform(),
            start: clock.now(),
            elapsed: 0.0,
            state: SimulatorState::Ready,
            initial_robots: robots.clone(),
            initial_ball: ball.clone(),
            robots,
            index,
            ball,
            world,
            queue: VecDeque::new(),
            errors: ErrorLog::default(),
            packets: Vec::new(),
            pending_packets: VecDeque::new(),
            vision_delay: 0.0,
            vision_processing_time: 0.0,
            radio_replies: Vec::new(),
            paused: false,
            speed_scale: 1.0,
            noise: VisionNoise::default(),
            rng: ChaCha8Rng::seed_from_u64(setup.seed),
            frame_number: 0,
            geometry_trigger: IntervalTrigger::new(setup.geometry_interval),
            setup,
        };
        simulator.refresh_packets();
        Ok(simulator)
    }

    /// Put the world back into its initial configuration. Pending commands,
    /// errors, radio replies, delayed packets and simulation settings are
    /// discarded.
    pub fn reset(&mut self) {
        self.robots = self.initial_robots.clone();
        self.ball = self.initial_ball.clone();
        self.world = PhysicsWorld::new(
            &self.setup.geometry,
            &self.setup.physics,
            &self.robots,
            &self.ball,
        );
        self.elapsed = 0.0;
        self.queue.clear();
        self.errors.drain();
        self.radio_replies.clear();
        self.paused = false;
        self.speed_scale = 1.0;
        self.noise = VisionNoise::default();
        self.pending_packets.clear();
        self.vision_delay = 0.0;
        self.vision_processing_time = 0.0;
        self.rng = ChaCha8Rng::seed_from_u64(self.setup.seed);
        self.frame_number = 0;
        self.geometry_trigger = IntervalTrigger::new(self.setup.geometry_interval);
        self.state = SimulatorState::Ready;
        self.refresh_packets();
        log::debug!("Simulator reset");
    }

    /// Validate a command and queue it for the next step.
    pub fn handle_simulator_command(&mut self, command: SimulatorCommand) {
        self.enqueue(command, None);
    }

    /// Decode a radio command frame (generation tag followed by the payload)
    /// sent by `team` and queue the command it carries.
    pub fn handle_radio_command(&mut self, team: TeamColor, frame: &[u8]) {
        let radio = match RadioCommand::decode(frame) {
            Ok(radio) => radio,
            Err(RadioError::UnknownProtocolTag(tag)) => {
                self.errors.push(
                    SimulationErrorKind::UnknownProtocolTag,
                    format!("Unknown radio generation tag {:#04x}", tag),
                    None,
                );
                return;
            }
            Err(err) => {
                self.errors.push(
                    SimulationErrorKind::InvalidCommand,
                    format!("Malformed radio frame: {}", err),
                    None,
                );
                return;
            }
        };

        let key = (team, RobotId::new(radio.id() as u32));
        let Some(&slot) = self.index.get(&key) else {
            self.errors.push(
                SimulationErrorKind::UnknownRobot,
                format!("No robot {} {} in the roster", key.0, key.1),
                Some(key),
            );
            return;
        };
        let specs = &self.robots[slot].specs;
        if specs.generation != radio.generation() {
            let message = format!(
                "Robot speaks {:?} but the frame is {:?}",
                specs.generation,
                radio.generation()
            );
            self.errors
                .push(SimulationErrorKind::InvalidCommand, message, Some(key));
            return;
        }

        let command = radio_to_command(&radio, specs);
        self.enqueue(
            SimulatorCommand::RobotControl {
                team: key.0,
                id: key.1,
                command,
            },
            Some(radio.counter()),
        );
    }

    fn enqueue(&mut self, command: SimulatorCommand, radio_counter: Option<u8>) {
        let robot = command.robot();
        if let Some(key) = robot {
            if !self.index.contains_key(&key) {
                self.errors.push(
                    SimulationErrorKind::UnknownRobot,
                    format!("No robot {} {} in the roster", key.0, key.1),
                    Some(key),
                );
                return;
            }
        }
        if let Err(message) = command.validate() {
            self.errors
                .push(SimulationErrorKind::InvalidCommand, message, robot);
            return;
        }

        let command = match command {
            SimulatorCommand::RobotControl { team, id, command } => {
                SimulatorCommand::RobotControl {
                    team,
                    id,
                    command: self.robot_command_to_raw(command),
                }
            }
            SimulatorCommand::TeleportRobot(teleport) => {
                SimulatorCommand::TeleportRobot(self.teleport_robot_to_raw(teleport))
            }
            SimulatorCommand::TeleportBall(teleport) => {
                SimulatorCommand::TeleportBall(self.teleport_ball_to_raw(teleport))
            }
            control @ SimulatorCommand::SimulationControl(_) => control,
        };
        self.queue.push_back(QueuedCommand {
            command,
            radio_counter,
        });
    }

    fn robot_command_to_raw(&self, mut command: RobotCommand) -> RobotCommand {
        if let MotionTarget::GlobalVelocity { x, y, angular } = command.motion {
            let raw = self.transform.apply_inverse_speed(&Vector2::new(x, y));
            command.motion = MotionTarget::GlobalVelocity {
                x: raw.x,
                y: raw.y,
                angular,
            };
        }
        command
    }

    fn teleport_robot_to_raw(&mut self, teleport: TeleportRobot) -> TeleportRobot {
        let transform = self.transform;
        let key = (teleport.team, teleport.id);
        let mut raw = TeleportRobot {
            position: teleport
                .position
                .map(|p| transform.apply_inverse_position(&p)),
            velocity: teleport.velocity.map(|v| transform.apply_inverse_speed(&v)),
            orientation: teleport.orientation.map(|o| transform.apply_inverse_angle(o)),
            ..teleport
        };

        let radius = self
            .index
            .get(&key)
            .map_or(0.0, |&slot| self.robots[slot].state.radius);
        if let (true, Some(position)) = (self.setup.clamp_teleports, raw.position) {
            let (clamped, moved) = self.setup.geometry.clamp_inside_walls(&position, radius);
            if moved {
                self.errors.push(
                    SimulationErrorKind::OutOfBounds,
                    format!(
                        "Teleport target ({:.1}, {:.1}) clamped to ({:.1}, {:.1})",
                        position.x, position.y, clamped.x, clamped.y
                    ),
                    Some(key),
                );
                raw.position = Some(clamped);
            }
        }
        raw
    }

    fn teleport_ball_to_raw(&mut self, teleport: TeleportBall) -> TeleportBall {
        let transform = self.transform;
        let mut position = transform.apply_inverse_position(&teleport.position);
        let velocity = teleport.velocity.map(|v| {
            let planar = transform.apply_inverse_speed(&v.xy());
            Vector3::new(planar.x, planar.y, v.z)
        });

        if self.setup.clamp_teleports {
            let (clamped, moved) = self
                .setup
                .geometry
                .clamp_inside_walls(&position, self.ball.radius);
            if moved {
                self.errors.push(
                    SimulationErrorKind::OutOfBounds,
                    format!(
                        "Ball teleport target ({:.1}, {:.1}) clamped to ({:.1}, {:.1})",
                        position.x, position.y, clamped.x, clamped.y
                    ),
                    None,
                );
                position = clamped;
            }
        }
        TeleportBall {
            position,
            velocity,
            height: teleport.height,
        }
    }

    /// Advance the world by `dt` seconds, scaled by the current speed scale.
    pub fn step_simulation(&mut self, dt: f64) {
        if !(dt.is_finite() && dt > 0.0) {
            self.errors.push(
                SimulationErrorKind::InvalidTimestep,
                format!("Timestep must be positive and finite, got {}", dt),
                None,
            );
            return;
        }
        self.state = SimulatorState::Stepping;

        for robot in self.robots.iter_mut() {
            robot.radio_counter = None;
        }
        let queued = std::mem::take(&mut self.queue);
        for entry in queued {
            self.apply(entry);
        }

        if !self.paused {
            self.integrate(dt * self.speed_scale);
        }

        self.collect_radio_replies();
        self.refresh_packets();
    }

    fn apply(&mut self, entry: QueuedCommand) {
        let now = self.elapsed;
        match entry.command {
            SimulatorCommand::RobotControl { team, id, command } => {
                if let Some(robot) = self.robot_mut(team, id) {
                    robot.apply_command(&command, now);
                    if entry.radio_counter.is_some() {
                        robot.radio_counter = entry.radio_counter;
                    }
                }
            }
            SimulatorCommand::TeleportRobot(teleport) => {
                if let Some(robot) = self.robot_mut(teleport.team, teleport.id) {
                    let mut state = robot.state.clone();
                    if let Some(position) = teleport.position {
                        state.position = position;
                    }
                    if let Some(velocity) = teleport.velocity {
                        state.velocity = velocity;
                    }
                    if let Some(orientation) = teleport.orientation {
                        state.orientation = wrap_angle(orientation);
                    }
                    if let Some(angular_velocity) = teleport.angular_velocity {
                        state.angular_velocity = angular_velocity;
                    }
                    robot.teleport(state);
                }
            }
            SimulatorCommand::TeleportBall(teleport) => {
                let radius = self.ball.radius;
                let height = teleport.height.unwrap_or(radius).max(radius);
                self.ball.teleport(BallState {
                    position: Vector3::new(teleport.position.x, teleport.position.y, height),
                    velocity: teleport.velocity.unwrap_or_else(Vector3::zeros),
                });
            }
            SimulatorCommand::SimulationControl(control) => {
                if let Some(paused) = control.paused {
                    if paused != self.paused {
                        log::info!("Simulation {}", if paused { "paused" } else { "resumed" });
                    }
                    self.paused = paused;
                }
                if let Some(scale) = control.speed_scale {
                    self.speed_scale = scale;
                }
                if let Some(stddev) = control.ball_position_stddev {
                    self.noise.ball_position = stddev;
                }
                if let Some(stddev) = control.robot_position_stddev {
                    self.noise.robot_position = stddev;
                }
                if let Some(stddev) = control.robot_orientation_stddev {
                    self.noise.robot_orientation = stddev;
                }
                if let Some(delay) = control.vision_delay {
                    self.vision_delay = delay;
                }
                if let Some(processing_time) = control.vision_processing_time {
                    self.vision_processing_time = processing_time;
                }
            }
        }
    }

    fn integrate(&mut self, duration: f64) {
        let physics = self.setup.physics.clone();
        let count = ((duration / physics.substep).ceil() as usize).clamp(1, physics.max_substeps);
        let dt = (duration / count as f64).min(physics.substep);
        let mut reported = BTreeSet::new();
        for i in 0..count {
            let now = self.elapsed + dt * i as f64;
            physics::drive_robots(&mut self.robots, &mut self.ball, &physics, now, dt);
            self.recover_anomalies(&physics, &mut reported);
            self.world.step(
                &mut self.robots,
                &mut self.ball,
                &self.setup.geometry,
                &physics,
                dt,
            );
        }
        self.recover_anomalies(&physics, &mut reported);
        for robot in self.robots.iter_mut() {
            robot.mark_valid();
        }
        self.ball.mark_valid();
        self.elapsed += duration;
    }

    /// Restore every entity whose state diverged to its last valid state.
    /// Each entity is reported once per step, keyed by robot or `None` for
    /// the ball.
    fn recover_anomalies(
        &mut self,
        physics: &PhysicsConfig,
        reported: &mut BTreeSet<Option<(TeamColor, RobotId)>>,
    ) {
        for robot in self.robots.iter_mut() {
            if robot.state.is_sane(physics) {
                continue;
            }
            let key = robot.key();
            if reported.insert(Some(key)) {
                self.errors.push(
                    SimulationErrorKind::PhysicsAnomaly,
                    "Robot state diverged, restored last valid state",
                    Some(key),
                );
            }
            robot.restore();
        }
        if !self.ball.state.is_sane(physics) {
            if reported.insert(None) {
                self.errors.push(
                    SimulationErrorKind::PhysicsAnomaly,
                    "Ball state diverged, restored last valid state",
                    None,
                );
            }
            self.ball.restore();
        }
    }

    fn collect_radio_replies(&mut self) {
        for robot in self.robots.iter() {
            let Some(counter) = robot.radio_counter else {
                continue;
            };
            let local = robot.state.local_velocity();
            let v_f = to_wire(local.x);
            let v_s = to_wire(-local.y);
            let omega = to_wire(robot.state.angular_velocity * 1000.0);
            let ball_detected = robot.touches_dribbler(
                &self.ball.state.position,
                self.ball.radius,
                &self.setup.physics,
            );
            let id = (robot.state.id.as_u32() & 0x0F) as u8;
            let response = match robot.specs.generation {
                RadioGeneration::Gen2012 => RadioResponse::Gen2012(RadioResponse2012 {
                    counter,
                    id,
                    main_active: true,
                    kicker_active: true,
                    ball_detected,
                    cap_charged: true,
                    battery: u8::MAX,
                    packet_loss: 0,
                    v_s,
                    v_f,
                    omega,
                    motor_in_power_limit: false,
                }),
                RadioGeneration::Gen2014 => RadioResponse::Gen2014(RadioResponse2014 {
                    counter,
                    id,
                    power_enabled: true,
                    error_present: false,
                    ball_detected,
                    cap_charged: true,
                    battery: u8::MAX,
                    packet_loss: 0,
                    extension_id: 0,
                    v_s,
                    v_f,
                    omega,
                }),
            };
            self.radio_replies.push(RadioReply {
                team: robot.state.team,
                frame: response.encode(),
            });
        }
    }

    /// Render the current state and release every frame whose vision delay
    /// has passed. While paused everything is released at once.
    fn refresh_packets(&mut self) {
        let attach_geometry = self.geometry_trigger.trigger(self.elapsed);
        let release = self.elapsed + self.vision_delay;
        let t_sent = (self.start + release).as_secs_f64();
        let snapshot = vision::Snapshot {
            robots: &self.robots,
            ball: &self.ball,
            transform: &self.transform,
            t_capture: t_sent - self.vision_processing_time,
            t_sent,
            frame_number: self.frame_number,
            geometry: attach_geometry.then_some(&self.setup.geometry),
        };
        let packets =
            vision::render_packets(&snapshot, &self.setup.cameras, &self.noise, &mut self.rng);
        self.pending_packets.push_back((release, packets));
        self.frame_number = self.frame_number.wrapping_add(1);

        let horizon = if self.paused {
            f64::INFINITY
        } else {
            self.elapsed + RELEASE_TOLERANCE
        };
        while let Some((release, _)) = self.pending_packets.front() {
            if *release > horizon {
                break;
            }
            if let Some((_, packets)) = self.pending_packets.pop_front() {
                self.packets = packets;
            }
        }
    }

    /// Detection packets released by the last step, one per camera. With a
    /// vision delay these show the world as it was that long ago.
    pub fn get_ssl_wrapper_packets(&self) -> &[WrapperPacket] {
        &self.packets
    }

    /// Take all errors recorded since the last call, oldest first.
    pub fn get_errors(&mut self) -> Vec<SimulationError> {
        self.errors.drain()
    }

    /// Take the encoded responses of robots that received radio commands.
    pub fn take_radio_responses(&mut self) -> Vec<RadioReply> {
        std::mem::take(&mut self.radio_replies)
    }

    fn robot_mut(&mut self, team: TeamColor, id: RobotId) -> Option<&mut SimRobot> {
        let slot = *self.index.get(&(team, id))?;
        self.robots.get_mut(slot)
    }

    pub fn robot(&self, team: TeamColor, id: RobotId) -> Option<&RobotState> {
        let slot = *self.index.get(&(team, id))?;
        self.robots.get(slot).map(|r| &r.state)
    }

    /// All robots in roster order.
    pub fn robots(&self) -> impl Iterator<Item = &RobotState> {
        self.robots.iter().map(|r| &r.state)
    }

    pub fn ball(&self) -> &BallState {
        &self.ball.state
    }

    pub fn time(&self) -> SimInstant {
        self.start + self.elapsed
    }

    pub fn state(&self) -> SimulatorState {
        self.state
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Mapping from raw simulation coordinates to reported coordinates.
    pub fn field_transform(&self) -> FieldTransform {
        self.transform
    }

    pub fn setup(&self) -> &SimulatorSetup {
        &self.setup
    }
}
