use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::Vector2;

/// A single field arc -- eg. the center circle
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FieldCircularArc {
    /// Readable name of the arc
    pub name: String,
    /// Center of the arc
    pub center: Vector2,
    // Radius of the arc, in mm
    pub radius: f64,
    // Start angle in counter-clockwise order, in radians
    pub a1: f64,
    // End angle in counter-clockwise order, in radians
    pub a2: f64,
    // Thickness of the arc stroke, in mm
    pub thickness: f64,
}

/// A single field line segment
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FieldLineSegment {
    /// Readable name of the line segment
    pub name: String,
    pub p1: Vector2,
    pub p2: Vector2,
    /// Thickness of the line segment, in mm
    pub thickness: f64,
}

impl FieldLineSegment {
    fn new(name: &str, p1: Vector2, p2: Vector2, thickness: f64) -> Self {
        Self {
            name: name.to_owned(),
            p1,
            p2,
            thickness,
        }
    }
}

/// The field geometry. All lengths are in mm, the field is centered on the
/// origin with the goals on the x axis.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FieldGeometry {
    /// Field length (distance between goal lines)
    pub field_length: f64,
    /// Field width (distance between touch lines)
    pub field_width: f64,
    /// Goal width (distance inner edges of goal posts)
    pub goal_width: f64,
    /// Goal depth (distance from outer goal line edge to inner goal back)
    pub goal_depth: f64,
    /// Boundary width (distance from touch/goal line centers to boundary walls)
    pub boundary_width: f64,
    /// Depth of the penalty area, measured from the goal line
    pub penalty_area_depth: f64,
    /// Width of the penalty area
    pub penalty_area_width: f64,
    pub center_circle_radius: f64,
    pub line_thickness: f64,
    pub ball_radius: f64,
}

impl Default for FieldGeometry {
    /// Division B field.
    fn default() -> Self {
        Self {
            field_length: 9000.0,
            field_width: 6000.0,
            goal_width: 1000.0,
            goal_depth: 180.0,
            boundary_width: 300.0,
            penalty_area_depth: 1000.0,
            penalty_area_width: 2000.0,
            center_circle_radius: 500.0,
            line_thickness: 10.0,
            ball_radius: 21.5,
        }
    }
}

impl FieldGeometry {
    pub fn half_length(&self) -> f64 {
        self.field_length / 2.0
    }

    pub fn half_width(&self) -> f64 {
        self.field_width / 2.0
    }

    /// Half extents of the area enclosed by the boundary walls.
    pub fn wall_half_extents(&self) -> Vector2 {
        Vector2::new(
            self.half_length() + self.boundary_width,
            self.half_width() + self.boundary_width,
        )
    }

    /// Clamp a point so that a disc of `radius` around it stays inside the
    /// boundary walls. Returns the clamped point and whether it moved.
    pub fn clamp_inside_walls(&self, p: &Vector2, radius: f64) -> (Vector2, bool) {
        let ext = self.wall_half_extents();
        let max_x = (ext.x - radius).max(0.0);
        let max_y = (ext.y - radius).max(0.0);
        let clamped = Vector2::new(p.x.clamp(-max_x, max_x), p.y.clamp(-max_y, max_y));
        (clamped, clamped != *p)
    }

    /// Field markings in the same layout ssl-vision reports them.
    pub fn line_segments(&self) -> Vec<FieldLineSegment> {
        let hl = self.half_length();
        let hw = self.half_width();
        let t = self.line_thickness;
        let pen_x = hl - self.penalty_area_depth;
        let pen_hw = self.penalty_area_width / 2.0;
        let v = Vector2::new;
        vec![
            FieldLineSegment::new("TopTouchLine", v(-hl, hw), v(hl, hw), t),
            FieldLineSegment::new("BottomTouchLine", v(-hl, -hw), v(hl, -hw), t),
            FieldLineSegment::new("LeftGoalLine", v(-hl, -hw), v(-hl, hw), t),
            FieldLineSegment::new("RightGoalLine", v(hl, -hw), v(hl, hw), t),
            FieldLineSegment::new("HalfwayLine", v(0.0, -hw), v(0.0, hw), t),
            FieldLineSegment::new("CenterLine", v(-hl, 0.0), v(hl, 0.0), t),
            FieldLineSegment::new("LeftPenaltyStretch", v(-pen_x, -pen_hw), v(-pen_x, pen_hw), t),
            FieldLineSegment::new("RightPenaltyStretch", v(pen_x, -pen_hw), v(pen_x, pen_hw), t),
            FieldLineSegment::new("LeftFieldLeftPenaltyStretch", v(-hl, -pen_hw), v(-pen_x, -pen_hw), t),
            FieldLineSegment::new("LeftFieldRightPenaltyStretch", v(-hl, pen_hw), v(-pen_x, pen_hw), t),
            FieldLineSegment::new("RightFieldRightPenaltyStretch", v(hl, -pen_hw), v(pen_x, -pen_hw), t),
            FieldLineSegment::new("RightFieldLeftPenaltyStretch", v(hl, pen_hw), v(pen_x, pen_hw), t),
        ]
    }

    pub fn circular_arcs(&self) -> Vec<FieldCircularArc> {
        vec![FieldCircularArc {
            name: "CenterCircle".to_owned(),
            center: Vector2::zeros(),
            radius: self.center_circle_radius,
            a1: 0.0,
            a2: 2.0 * PI,
            thickness: self.line_thickness,
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_keeps_disc_inside_walls() {
        let geom = FieldGeometry::default();
        let (p, moved) = geom.clamp_inside_walls(&Vector2::new(10_000.0, -100.0), 90.0);
        assert!(moved);
        assert_eq!(p, Vector2::new(4500.0 + 300.0 - 90.0, -100.0));

        let inside = Vector2::new(50.0, 200.0);
        assert_eq!(geom.clamp_inside_walls(&inside, 21.5), (inside, false));
    }

    #[test]
    fn markings_are_symmetric() {
        let geom = FieldGeometry::default();
        let lines = geom.line_segments();
        let left = lines.iter().find(|l| l.name == "LeftPenaltyStretch").unwrap();
        let right = lines.iter().find(|l| l.name == "RightPenaltyStretch").unwrap();
        assert_eq!(left.p1.x, -right.p1.x);
        assert_eq!(left.p1.x, -3500.0);
        assert_eq!(geom.circular_arcs()[0].radius, 500.0);
    }
}
