use serde::{Deserialize, Serialize};

use crate::FieldTransform;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TeamColor {
    Blue,
    Yellow,
}

impl TeamColor {
    pub fn opponent(&self) -> TeamColor {
        match self {
            TeamColor::Blue => TeamColor::Yellow,
            TeamColor::Yellow => TeamColor::Blue,
        }
    }
}

impl std::fmt::Display for TeamColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TeamColor::Blue => write!(f, "Blue"),
            TeamColor::Yellow => write!(f, "Yellow"),
        }
    }
}

/// Shell number of a robot. Only unique together with a [`TeamColor`].
#[derive(Clone, Copy, Debug, Serialize, Deserialize, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct RobotId(u32);

impl RobotId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for RobotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which team defends the positive x side of the field.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SideAssignment {
    /// Blue team defends the positive x side (+x goal)
    #[default]
    BlueOnPositive,
    /// Yellow team defends the positive x side (+x goal)
    YellowOnPositive,
}

impl SideAssignment {
    /// Sign of the direction the given team attacks in, in raw field
    /// coordinates: `1.0` towards +x, `-1.0` towards -x.
    pub fn attacking_direction_sign(&self, color: TeamColor) -> f64 {
        match (self, color) {
            (SideAssignment::BlueOnPositive, TeamColor::Blue) => -1.0,
            (SideAssignment::BlueOnPositive, TeamColor::Yellow) => 1.0,
            (SideAssignment::YellowOnPositive, TeamColor::Blue) => 1.0,
            (SideAssignment::YellowOnPositive, TeamColor::Yellow) => -1.0,
        }
    }

    /// Transform into the coordinate system of `color`, in which that team
    /// always attacks towards +x. Teams attacking -x get a 180° flip.
    pub fn field_transform(&self, color: TeamColor) -> FieldTransform {
        if self.attacking_direction_sign(color) > 0.0 {
            FieldTransform::identity()
        } else {
            FieldTransform::flipped()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Vector2;

    #[test]
    fn test_attacking_direction_sign() {
        use SideAssignment::*;
        assert_eq!(BlueOnPositive.attacking_direction_sign(TeamColor::Blue), -1.0);
        assert_eq!(BlueOnPositive.attacking_direction_sign(TeamColor::Yellow), 1.0);
        assert_eq!(YellowOnPositive.attacking_direction_sign(TeamColor::Blue), 1.0);
        assert_eq!(YellowOnPositive.attacking_direction_sign(TeamColor::Yellow), -1.0);
    }

    #[test]
    fn test_team_transform_points_towards_opponent_goal() {
        let sides = SideAssignment::BlueOnPositive;
        // Blue defends +x, so its own goal must end up at -x.
        let own_goal = Vector2::new(4500.0, 0.0);
        let t = sides.field_transform(TeamColor::Blue);
        assert_eq!(t.apply_position(&own_goal), Vector2::new(-4500.0, 0.0));

        let t = sides.field_transform(TeamColor::Yellow);
        assert_eq!(t.apply_position(&own_goal), own_goal);
    }
}
