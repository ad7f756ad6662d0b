use std::{
    io::{BufWriter, Write},
    str::FromStr,
};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use fieldsim_core::{SideAssignment, SystemClock, TeamColor, Vector2, Vector3};
use fieldsim_simulator::{Simulator, SimulatorCommand, SimulatorSetup, TeleportBall};
use tokio::time::{Duration, MissedTickBehavior};

#[derive(Debug, Clone, Copy, PartialEq, ValueEnum)]
enum Team {
    Blue,
    Yellow,
}

impl From<Team> for TeamColor {
    fn from(team: Team) -> Self {
        match team {
            Team::Blue => TeamColor::Blue,
            Team::Yellow => TeamColor::Yellow,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "fieldsim", about = "Headless robot soccer field simulator")]
pub(crate) struct Args {
    /// Number of steps to run
    #[clap(long, default_value = "600")]
    steps: u64,

    /// Step length in seconds
    #[clap(long, default_value = "0.016666666666666666")]
    dt: f64,

    #[clap(long, default_value = "6")]
    blue: usize,

    #[clap(long, default_value = "6")]
    yellow: usize,

    /// Report positions mirrored through the field centre
    #[clap(long, default_value = "false")]
    flip: bool,

    /// Team defending the +x half
    #[clap(long, value_enum, default_value = "blue")]
    positive_side: Team,

    /// Report positions in the frame of this team, attacking towards +x
    #[clap(long, value_enum)]
    report_as: Option<Team>,

    /// Pace the steps to wall clock time
    #[clap(long, default_value = "false")]
    realtime: bool,

    #[clap(long, default_value = "info")]
    log_level: String,

    /// Print every detection packet to stdout as one JSON object per line
    #[clap(long, default_value = "false")]
    dump_packets: bool,

    #[clap(long, default_value = "0")]
    seed: u64,

    /// Initial ball velocity in mm/s, as `x,y`
    #[clap(long)]
    ball_velocity: Option<String>,
}

fn parse_vector(value: &str) -> Result<Vector2> {
    let parts = value
        .split(',')
        .map(|part| f64::from_str(part.trim()))
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("Invalid vector: {}", value))?;
    match parts.as_slice() {
        [x, y] => Ok(Vector2::new(*x, *y)),
        _ => bail!("Expected two components, got {}", value),
    }
}

fn build_simulator(args: &Args) -> Result<Simulator> {
    let sides = match args.positive_side {
        Team::Blue => SideAssignment::BlueOnPositive,
        Team::Yellow => SideAssignment::YellowOnPositive,
    };
    let setup = SimulatorSetup {
        flip: args.flip,
        report_as: args.report_as.map(TeamColor::from),
        seed: args.seed,
        ..SimulatorSetup::with_sides(sides, args.blue, args.yellow)
    };
    let mut simulator =
        Simulator::new(setup, &SystemClock).context("Failed to set up the simulator")?;

    if let Some(velocity) = &args.ball_velocity {
        let velocity = parse_vector(velocity)?;
        let position = simulator
            .field_transform()
            .apply_position(&simulator.ball().position.xy());
        simulator.handle_simulator_command(SimulatorCommand::TeleportBall(
            TeleportBall::new(position).with_velocity(Vector3::new(velocity.x, velocity.y, 0.0)),
        ));
    }
    Ok(simulator)
}

async fn run(args: Args) -> Result<()> {
    if !(args.dt.is_finite() && args.dt > 0.0) {
        bail!("--dt must be positive, got {}", args.dt);
    }
    let mut simulator = build_simulator(&args)?;
    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    let period = Duration::try_from_secs_f64(args.dt)
        .with_context(|| format!("--dt of {} s is not a valid period", args.dt))?;
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::info!(
        "Running {} steps of {:.4} s{}",
        args.steps,
        args.dt,
        if args.realtime { " in real time" } else { "" }
    );

    let mut error_count = 0usize;
    for step in 0..args.steps {
        if args.realtime {
            tokio::select! {
                _ = interval.tick() => {}
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Interrupted after {} steps", step);
                    break;
                }
            }
        }

        simulator.step_simulation(args.dt);

        for err in simulator.get_errors() {
            error_count += 1;
            tracing::warn!(kind = %err.kind, step, "{}", err.message);
        }
        // nobody listens for radio replies here
        simulator.take_radio_responses();

        if args.dump_packets {
            for packet in simulator.get_ssl_wrapper_packets() {
                serde_json::to_writer(&mut out, packet).context("Failed to encode packet")?;
                writeln!(out).context("Failed to write packet")?;
            }
        }
    }
    out.flush().context("Failed to flush stdout")?;

    let ball = simulator.ball();
    tracing::info!(
        "Finished at t={:.3} s, ball at ({:.1}, {:.1}), {} errors",
        simulator.time().as_secs_f64(),
        ball.position.x,
        ball.position.y,
        error_count
    );
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = match tracing::Level::from_str(&args.log_level) {
        Ok(level) => level,
        Err(_) => {
            eprintln!("Invalid log level: {}", args.log_level);
            std::process::exit(1);
        }
    };
    // stdout carries the packet stream
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    run(args).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_vectors() {
        assert_eq!(parse_vector("1.5, -2").unwrap(), Vector2::new(1.5, -2.0));
        assert!(parse_vector("1").is_err());
        assert!(parse_vector("a,b").is_err());
    }

    #[test]
    fn args_have_sane_defaults() {
        let args = Args::parse_from(["fieldsim"]);
        assert_eq!(args.steps, 600);
        assert_eq!(args.blue, 6);
        assert!(!args.flip);
        let simulator = build_simulator(&args).unwrap();
        assert_eq!(simulator.robots().count(), 12);
    }

    #[test]
    fn report_as_uses_side_assignment() {
        let args = Args::parse_from([
            "fieldsim",
            "--report-as",
            "blue",
            "--blue",
            "1",
            "--yellow",
            "0",
        ]);
        let simulator = build_simulator(&args).unwrap();
        // blue defends +x by default
        assert!(simulator.field_transform().is_flipped());
        let robot = simulator.robots().next().unwrap();
        assert!(robot.position.x > 0.0);

        let args = Args::parse_from([
            "fieldsim",
            "--report-as",
            "blue",
            "--positive-side",
            "yellow",
        ]);
        let simulator = build_simulator(&args).unwrap();
        assert!(simulator.field_transform().is_identity());
        assert!(Args::try_parse_from(["fieldsim", "--report-as", "green"]).is_err());
    }

    #[tokio::test]
    async fn oversized_dt_is_rejected() {
        let args = Args::parse_from(["fieldsim", "--steps", "1", "--dt", "1e30"]);
        let err = run(args).await.unwrap_err();
        assert!(err.to_string().contains("not a valid period"));
    }

    #[test]
    fn ball_velocity_is_applied() {
        let args = Args::parse_from(["fieldsim", "--ball-velocity", "1000,0", "--flip"]);
        let mut simulator = build_simulator(&args).unwrap();
        simulator.step_simulation(0.01);
        // reported +x is raw -x when flipped
        assert!(simulator.ball().velocity.x < 0.0);
        assert!(simulator.get_errors().is_empty());
    }
}
