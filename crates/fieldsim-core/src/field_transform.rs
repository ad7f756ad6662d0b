//! # Field transform
//!
//! Maps between raw simulation coordinates and the coordinates reported to a
//! consumer on a given field half.
//!
//! The transform is a per-axis mirror followed by a translation:
//!
//! ```text
//! x' = sx * x + ox        sx, sy in {1, -1}
//! y' = sy * y + oy
//! ```
//!
//! Speeds only see the mirror, never the offset. Headings follow the mirror:
//! flipping both axes rotates by pi, flipping one axis reflects the heading.
//! With a zero offset every mirror is its own inverse, so positions round trip
//! bit-exactly. Headings come back modulo 2 pi: any mirror wraps its result
//! into (-pi, pi], the identity returns its input as is.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::{angle::wrap_angle, Angle, Vector2};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldTransform {
    flip_x: bool,
    flip_y: bool,
    offset: Vector2,
}

impl Default for FieldTransform {
    fn default() -> Self {
        Self::identity()
    }
}

impl FieldTransform {
    /// The uniform transform. Every operation returns its input.
    pub fn identity() -> Self {
        Self {
            flip_x: false,
            flip_y: false,
            offset: Vector2::zeros(),
        }
    }

    /// 180° side flip: both axes negated.
    pub fn flipped() -> Self {
        Self::mirrored(true, true)
    }

    pub fn mirrored(flip_x: bool, flip_y: bool) -> Self {
        Self {
            flip_x,
            flip_y,
            offset: Vector2::zeros(),
        }
    }

    /// Build from a side flip flag, as stored in setups and commands.
    pub fn with_flip(flip: bool) -> Self {
        if flip {
            Self::flipped()
        } else {
            Self::identity()
        }
    }

    /// Add a translation applied after the mirror.
    pub fn with_offset(mut self, offset: Vector2) -> Self {
        self.offset = offset;
        self
    }

    pub fn is_identity(&self) -> bool {
        !self.flip_x && !self.flip_y && self.offset == Vector2::zeros()
    }

    pub fn is_flipped(&self) -> bool {
        self.flip_x && self.flip_y
    }

    fn sign_x(&self) -> f64 {
        if self.flip_x {
            -1.0
        } else {
            1.0
        }
    }

    fn sign_y(&self) -> f64 {
        if self.flip_y {
            -1.0
        } else {
            1.0
        }
    }

    pub fn apply_pos_x(&self, x: f64, _y: f64) -> f64 {
        if self.flip_x {
            -x + self.offset.x
        } else {
            x + self.offset.x
        }
    }

    pub fn apply_pos_y(&self, _x: f64, y: f64) -> f64 {
        if self.flip_y {
            -y + self.offset.y
        } else {
            y + self.offset.y
        }
    }

    pub fn apply_position(&self, p: &Vector2) -> Vector2 {
        Vector2::new(self.apply_pos_x(p.x, p.y), self.apply_pos_y(p.x, p.y))
    }

    pub fn apply_speed_x(&self, dx: f64, _dy: f64) -> f64 {
        self.sign_x() * dx
    }

    pub fn apply_speed_y(&self, _dx: f64, dy: f64) -> f64 {
        self.sign_y() * dy
    }

    pub fn apply_speed(&self, v: &Vector2) -> Vector2 {
        Vector2::new(self.apply_speed_x(v.x, v.y), self.apply_speed_y(v.x, v.y))
    }

    /// Heading in the reported frame. Mirrored results are wrapped into
    /// (-pi, pi].
    pub fn apply_angle(&self, theta: f64) -> f64 {
        match (self.flip_x, self.flip_y) {
            (false, false) => theta,
            (true, true) => wrap_angle(theta + PI),
            (true, false) => Angle::from_radians(theta).mirror_x().radians(),
            (false, true) => Angle::from_radians(theta).mirror_y().radians(),
        }
    }

    pub fn apply_inverse_x(&self, x: f64, _y: f64) -> f64 {
        self.sign_x() * (x - self.offset.x)
    }

    pub fn apply_inverse_y(&self, _x: f64, y: f64) -> f64 {
        self.sign_y() * (y - self.offset.y)
    }

    pub fn apply_inverse_position(&self, p: &Vector2) -> Vector2 {
        Vector2::new(
            self.apply_inverse_x(p.x, p.y),
            self.apply_inverse_y(p.x, p.y),
        )
    }

    /// Mirrors are self-inverse, so this equals [`Self::apply_speed`].
    pub fn apply_inverse_speed(&self, v: &Vector2) -> Vector2 {
        self.apply_speed(v)
    }

    /// Raw heading of a reported one. Equal to the original heading modulo
    /// 2 pi.
    pub fn apply_inverse_angle(&self, theta: f64) -> f64 {
        match (self.flip_x, self.flip_y) {
            (false, false) => theta,
            (true, true) => wrap_angle(theta - PI),
            // Reflections are their own inverse
            _ => self.apply_angle(theta),
        }
    }
}
