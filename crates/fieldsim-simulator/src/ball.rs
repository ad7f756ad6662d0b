use fieldsim_core::Vector3;
use serde::{Deserialize, Serialize};

use crate::{config::PhysicsConfig, physics::WORLD_LIMIT};

/// How far (mm) above its resting height the ball still counts as lying on
/// the floor. Contacts settle with a small gap or penetration.
const GROUND_TOLERANCE: f64 = 1.0;

/// Observable state of the ball, in raw simulation coordinates. `z` is the
/// height of the ball centre above the ground.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BallState {
    pub position: Vector3,
    pub velocity: Vector3,
}

impl BallState {
    pub(crate) fn is_finite(&self) -> bool {
        self.position.iter().all(|v| v.is_finite()) && self.velocity.iter().all(|v| v.is_finite())
    }

    /// Finite, inside the world and no faster than `physics` allows.
    pub(crate) fn is_sane(&self, physics: &PhysicsConfig) -> bool {
        self.is_finite()
            && self.position.iter().all(|v| v.abs() <= WORLD_LIMIT)
            && self.velocity.norm() <= physics.max_body_speed
    }

    pub fn is_airborne(&self, radius: f64) -> bool {
        self.position.z > radius + GROUND_TOLERANCE || self.velocity.z > 0.0
    }
}

#[derive(Debug, Clone)]
pub(crate) struct SimBall {
    pub state: BallState,
    pub last_valid: BallState,
    pub radius: f64,
}

impl SimBall {
    pub fn new(position: Vector3, radius: f64) -> Self {
        let state = BallState {
            position,
            velocity: Vector3::zeros(),
        };
        Self {
            last_valid: state.clone(),
            state,
            radius,
        }
    }

    pub fn teleport(&mut self, state: BallState) {
        self.last_valid = state.clone();
        self.state = state;
    }

    pub fn mark_valid(&mut self) {
        self.last_valid = self.state.clone();
    }

    pub fn restore(&mut self) {
        self.state = self.last_valid.clone();
        self.state.velocity = Vector3::zeros();
    }

    /// End small bounces and bring a slow rolling ball to rest.
    pub fn settle(&mut self, physics: &PhysicsConfig) {
        let radius = self.radius;
        let state = &mut self.state;
        if state.position.z > radius + GROUND_TOLERANCE {
            return;
        }
        if state.velocity.z.abs() < physics.ball_bounce_stop_speed {
            state.velocity.z = 0.0;
            state.position.z = radius;
        }
        if state.velocity.z == 0.0 && state.velocity.xy().norm() < physics.ball_stop_speed {
            state.velocity.x = 0.0;
            state.velocity.y = 0.0;
        }
    }
}
