use fieldsim_core::{FieldGeometry, FieldTransform, TeamColor, Vector2};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::{ball::SimBall, config::CameraConfig, robot::SimRobot};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionBall {
    pub confidence: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionRobot {
    pub confidence: f64,
    pub robot_id: u32,
    pub x: f64,
    pub y: f64,
    pub orientation: f64,
}

/// What one camera saw in one frame, in reported coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionFrame {
    pub frame_number: u32,
    /// Seconds, on the simulator clock. Lags `t_sent` by the processing time.
    pub t_capture: f64,
    /// Seconds, when the frame left the vision system
    pub t_sent: f64,
    pub camera_id: u32,
    pub balls: Vec<DetectionBall>,
    pub robots_blue: Vec<DetectionRobot>,
    pub robots_yellow: Vec<DetectionRobot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WrapperPacket {
    pub detection: DetectionFrame,
    /// Attached periodically
    pub geometry: Option<FieldGeometry>,
}

/// Standard deviations of the gaussian noise added to detections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VisionNoise {
    /// mm
    pub ball_position: f64,
    /// mm
    pub robot_position: f64,
    /// rad
    pub robot_orientation: f64,
}

/// Zero-mean gaussian sample. Nothing is drawn for a zero deviation so that
/// noise-free runs leave the generator untouched.
fn jitter<R: Rng>(rng: &mut R, stddev: f64) -> f64 {
    if stddev <= 0.0 {
        return 0.0;
    }
    Normal::new(0.0, stddev)
        .map(|normal| normal.sample(rng))
        .unwrap_or(0.0)
}

/// Inputs for one round of packets.
pub(crate) struct Snapshot<'a> {
    pub robots: &'a [SimRobot],
    pub ball: &'a SimBall,
    pub transform: &'a FieldTransform,
    pub t_capture: f64,
    pub t_sent: f64,
    pub frame_number: u32,
    pub geometry: Option<&'a FieldGeometry>,
}

/// One packet per camera, each listing the entities inside its view.
pub(crate) fn render_packets(
    snapshot: &Snapshot,
    cameras: &[CameraConfig],
    noise: &VisionNoise,
    rng: &mut ChaCha8Rng,
) -> Vec<WrapperPacket> {
    let transform = snapshot.transform;
    cameras
        .iter()
        .map(|camera| {
            let mut frame = DetectionFrame {
                frame_number: snapshot.frame_number,
                t_capture: snapshot.t_capture,
                t_sent: snapshot.t_sent,
                camera_id: camera.id,
                balls: Vec::new(),
                robots_blue: Vec::new(),
                robots_yellow: Vec::new(),
            };

            let ball = &snapshot.ball.state.position;
            if camera.sees(&ball.xy()) {
                let raw = Vector2::new(
                    ball.x + jitter(rng, noise.ball_position),
                    ball.y + jitter(rng, noise.ball_position),
                );
                let reported = transform.apply_position(&raw);
                frame.balls.push(DetectionBall {
                    confidence: 1.0,
                    x: reported.x,
                    y: reported.y,
                    z: ball.z,
                });
            }

            for robot in snapshot.robots {
                let state = &robot.state;
                if !camera.sees(&state.position) {
                    continue;
                }
                let raw = Vector2::new(
                    state.position.x + jitter(rng, noise.robot_position),
                    state.position.y + jitter(rng, noise.robot_position),
                );
                let reported = transform.apply_position(&raw);
                let orientation = transform
                    .apply_angle(state.orientation + jitter(rng, noise.robot_orientation));
                let detection = DetectionRobot {
                    confidence: 1.0,
                    robot_id: state.id.as_u32(),
                    x: reported.x,
                    y: reported.y,
                    orientation,
                };
                match state.team {
                    TeamColor::Blue => frame.robots_blue.push(detection),
                    TeamColor::Yellow => frame.robots_yellow.push(detection),
                }
            }

            WrapperPacket {
                detection: frame,
                geometry: snapshot.geometry.cloned(),
            }
        })
        .collect()
}
