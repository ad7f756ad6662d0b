use fieldsim_core::{FixedClock, RobotId, SimInstant, TeamColor, Vector2, Vector3};
use fieldsim_radio::{RadioCommand, RadioCommand2014};
use fieldsim_simulator::{
    RobotCommand, SimulationControl, SimulationError, Simulator, SimulatorCommand,
    SimulatorSetup, TeleportBall, TeleportRobot, WrapperPacket,
};

fn scripted_run(setup: SimulatorSetup) -> (Vec<Vec<WrapperPacket>>, Vec<SimulationError>) {
    let clock = FixedClock::new(SimInstant::from_secs_f64(100.0).unwrap());
    let mut simulator = Simulator::new(setup, &clock).unwrap();
    let mut packets = Vec::new();
    let mut errors = Vec::new();

    simulator.handle_simulator_command(SimulatorCommand::SimulationControl(SimulationControl {
        ball_position_stddev: Some(3.0),
        robot_position_stddev: Some(2.0),
        robot_orientation_stddev: Some(0.01),
        ..Default::default()
    }));
    simulator.handle_simulator_command(SimulatorCommand::TeleportBall(
        TeleportBall::new(Vector2::new(-500.0, 300.0))
            .with_velocity(Vector3::new(2500.0, -800.0, 1500.0)),
    ));

    for step in 0..300u32 {
        for id in 0..3 {
            let angle = step as f64 * 0.02 + id as f64;
            simulator.handle_simulator_command(SimulatorCommand::RobotControl {
                team: TeamColor::Blue,
                id: RobotId::new(id),
                command: RobotCommand::local_velocity(
                    1500.0 * angle.cos(),
                    800.0 * angle.sin(),
                    2.0,
                )
                .with_kick(5000.0, 0.0),
            });
        }
        let frame = RadioCommand::Gen2014(RadioCommand2014 {
            counter: step as u8,
            id: 1,
            v_f: 2000,
            omega: 1500,
            dribbler: 80,
            ..Default::default()
        })
        .encode();
        simulator.handle_radio_command(TeamColor::Yellow, &frame);
        if step == 150 {
            simulator.handle_simulator_command(SimulatorCommand::TeleportRobot(
                TeleportRobot::new(TeamColor::Yellow, RobotId::new(2))
                    .to_position(Vector2::new(9000.0, 0.0)),
            ));
        }

        simulator.step_simulation(0.016);
        packets.push(simulator.get_ssl_wrapper_packets().to_vec());
        errors.extend(simulator.get_errors());
        simulator.take_radio_responses();
    }
    (packets, errors)
}

#[test_log::test]
fn replays_are_identical() {
    let (packets_a, errors_a) = scripted_run(SimulatorSetup::default());
    let (packets_b, errors_b) = scripted_run(SimulatorSetup::default());
    assert_eq!(packets_a, packets_b);
    assert_eq!(errors_a, errors_b);
    // the out of field teleport is reported
    assert!(!errors_a.is_empty());
}

#[test]
fn seed_changes_noise() {
    let mut setup = SimulatorSetup::default();
    setup.seed = 7;
    let (packets_a, _) = scripted_run(SimulatorSetup::default());
    let (packets_b, _) = scripted_run(setup);
    assert_ne!(packets_a, packets_b);
}

#[test]
fn timestamps_follow_simulated_time() {
    let (packets, _) = scripted_run(SimulatorSetup::default());
    let last = &packets.last().unwrap()[0].detection;
    assert!((last.t_capture - (100.0 + 300.0 * 0.016)).abs() < 1e-9);
    assert_eq!(last.frame_number, 300);
}

#[test_log::test]
fn teleport_round_trip_in_both_conventions() {
    for flip in [false, true] {
        let setup = SimulatorSetup {
            flip,
            ..SimulatorSetup::default()
        };
        let clock = FixedClock::new(SimInstant::default());
        let mut simulator = Simulator::new(setup, &clock).unwrap();
        simulator.handle_simulator_command(SimulatorCommand::TeleportBall(TeleportBall::new(
            Vector2::new(50.0, 200.0),
        )));
        simulator.step_simulation(0.01);

        for packet in simulator.get_ssl_wrapper_packets() {
            let ball = &packet.detection.balls[0];
            assert!((ball.x - 50.0).abs() < 1e-9);
            assert!((ball.y - 200.0).abs() < 1e-9);
        }
        assert!(simulator.get_errors().is_empty());
    }
}
