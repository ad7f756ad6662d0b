use std::fmt;

use fieldsim_core::{RobotId, TeamColor};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SimulationErrorKind {
    /// A command addressed a robot that is not in the roster
    UnknownRobot,
    /// `step_simulation` was called with a non-positive or non-finite dt
    InvalidTimestep,
    /// A teleport target was clamped to the field
    OutOfBounds,
    /// A radio frame carried an unrecognised generation tag
    UnknownProtocolTag,
    /// Integration produced a non-finite state
    PhysicsAnomaly,
    /// A command carried values that cannot be simulated
    InvalidCommand,
}

impl fmt::Display for SimulationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            SimulationErrorKind::UnknownRobot => "UNKNOWN_ROBOT",
            SimulationErrorKind::InvalidTimestep => "INVALID_TIMESTEP",
            SimulationErrorKind::OutOfBounds => "OUT_OF_BOUNDS",
            SimulationErrorKind::UnknownProtocolTag => "UNKNOWN_PROTOCOL_TAG",
            SimulationErrorKind::PhysicsAnomaly => "PHYSICS_ANOMALY",
            SimulationErrorKind::InvalidCommand => "INVALID_COMMAND",
        };
        write!(f, "{}", code)
    }
}

/// A recoverable problem observed by the simulator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationError {
    pub kind: SimulationErrorKind,
    pub message: String,
    pub robot: Option<(TeamColor, RobotId)>,
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.robot {
            Some((team, id)) => write!(f, "[{}] {} {}: {}", self.kind, team, id, self.message),
            None => write!(f, "[{}] {}", self.kind, self.message),
        }
    }
}

/// Append-only error log, drained oldest first.
#[derive(Debug, Default)]
pub(crate) struct ErrorLog {
    entries: Vec<SimulationError>,
}

impl ErrorLog {
    pub fn push(
        &mut self,
        kind: SimulationErrorKind,
        message: impl Into<String>,
        robot: Option<(TeamColor, RobotId)>,
    ) {
        let error = SimulationError {
            kind,
            message: message.into(),
            robot,
        };
        log::debug!("{}", error);
        self.entries.push(error);
    }

    pub fn drain(&mut self) -> Vec<SimulationError> {
        std::mem::take(&mut self.entries)
    }
}

/// Problems with a [`SimulatorSetup`](crate::SimulatorSetup) that prevent
/// building a world.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SetupError {
    #[error("Robot {team} {id} appears more than once in the roster")]
    DuplicateRobot { team: TeamColor, id: RobotId },
    #[error("Field length and width must be positive, got {length} x {width}")]
    InvalidField { length: f64, width: f64 },
    #[error("Invalid value for {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },
    #[error("Wheel layout of robot {team} {id} cannot be inverted")]
    DegenerateWheels { team: TeamColor, id: RobotId },
    #[error("At least one camera is required")]
    NoCameras,
}
