//! Interactive streaming player
//!
//! Connects to a streaming server, drives the session over the control
//! channel, and while playing runs the media-poll and feedback ticks on a
//! single cooperative scheduler loop. Operator commands arrive on stdin:
//! setup, play, pause, info, stats, teardown, quit.

use anyhow::Context;
use clap::Parser;
use crossbeam::channel::{unbounded, Receiver, TryRecvError};
use rtstream_cli::config::PlayerConfig;
use rtstream_cli::stats::{display_stats, format_compact_stats};
use rtstream_io::{DatagramSocket, TcpControlChannel, Timer, DEFAULT_RESPONSE_TIMEOUT};
use rtstream_protocol::{
    ActionOutcome, FeedbackAccumulator, Session, SessionState, StreamReceiver,
};
use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};
use std::net::{SocketAddr, ToSocketAddrs};
use std::thread;
use std::time::{Duration, Instant};

#[derive(Parser, Debug)]
#[command(name = "rtstream-player")]
#[command(about = "Streaming media client", long_about = None)]
struct Args {
    /// Server host name or address
    #[arg(short, long, default_value = "localhost")]
    server: String,

    /// Server control port
    #[arg(short, long, default_value = "13569")]
    port: u16,

    /// Stream name to request
    #[arg(long, default_value = "movie.Mjpeg")]
    stream: String,

    /// Local media-receive port
    #[arg(long, default_value = "25000")]
    media_port: u16,

    /// Server feedback port
    #[arg(long, default_value = "19001")]
    feedback_port: u16,

    /// Output for received frames ('-' for stdout)
    #[arg(short, long)]
    output: Option<String>,

    /// Configuration file (overrides the flags above)
    #[arg(short, long)]
    config: Option<String>,
}

/// Operator commands read from stdin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Setup,
    Play,
    Pause,
    Info,
    Stats,
    Teardown,
    Quit,
}

impl Command {
    fn parse(line: &str) -> Option<Command> {
        match line.trim().to_ascii_lowercase().as_str() {
            "setup" => Some(Command::Setup),
            "play" => Some(Command::Play),
            "pause" => Some(Command::Pause),
            "info" | "session" | "describe" => Some(Command::Info),
            "stats" => Some(Command::Stats),
            "teardown" | "close" => Some(Command::Teardown),
            "quit" | "exit" => Some(Command::Quit),
            _ => None,
        }
    }
}

/// Everything allocated when SETUP succeeds and released at teardown
struct DataPlane {
    media: DatagramSocket,
    feedback: DatagramSocket,
    receiver: StreamReceiver,
    accumulator: FeedbackAccumulator,
    recv_buf: Vec<u8>,
    /// Last fired poll tick, for play-time accounting; cleared on pause
    last_tick: Option<Instant>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => PlayerConfig::from_file(path)
            .with_context(|| format!("failed to load config {path}"))?,
        None => PlayerConfig {
            server: args.server.clone(),
            control_port: args.port,
            stream: args.stream.clone(),
            media_port: args.media_port,
            feedback_port: args.feedback_port,
            output: args.output.clone(),
            ..PlayerConfig::example()
        },
    };

    let control_addr = resolve(&config.server, config.control_port)
        .with_context(|| format!("cannot resolve {}:{}", config.server, config.control_port))?;
    let feedback_addr = resolve(&config.server, config.feedback_port)
        .with_context(|| format!("cannot resolve {}:{}", config.server, config.feedback_port))?;

    tracing::info!(%control_addr, stream = %config.stream, "connecting");
    let channel = TcpControlChannel::connect(control_addr, DEFAULT_RESPONSE_TIMEOUT)?;
    let mut session = Session::new(channel, config.stream.clone(), config.media_port);

    let mut sink = open_sink(config.output.as_deref())?;
    let commands = spawn_stdin_reader();

    println!("commands: setup | play | pause | info | stats | teardown | quit");

    let mut data_plane: Option<DataPlane> = None;
    let mut poll_timer = Timer::new(config.poll_interval());
    let mut report_timer = Timer::new(config.report_interval());
    let mut display_timer = Timer::new_delayed(Duration::from_secs(1));

    loop {
        match commands.try_recv() {
            Ok(Command::Setup) => match session.setup() {
                Ok(ActionOutcome::Applied) => {
                    data_plane = Some(build_data_plane(&config, &session)?);
                    tracing::info!(session_id = session.session_id(), "setup complete");
                }
                Ok(ActionOutcome::Ignored) => {}
                Err(e) => tracing::error!(error = %e, "setup failed"),
            },
            Ok(Command::Play) => match session.play() {
                Ok(ActionOutcome::Applied) => {
                    poll_timer.reset();
                    report_timer.reset();
                }
                Ok(ActionOutcome::Ignored) => {}
                Err(e) => tracing::error!(error = %e, "play failed"),
            },
            Ok(Command::Pause) => match session.pause() {
                Ok(ActionOutcome::Applied) => {
                    if let Some(plane) = data_plane.as_mut() {
                        plane.last_tick = None;
                    }
                }
                Ok(ActionOutcome::Ignored) => {}
                Err(e) => tracing::error!(error = %e, "pause failed"),
            },
            Ok(Command::Info) => match session.describe() {
                Ok(Some(lines)) => {
                    for line in &lines {
                        println!("{line}");
                    }
                }
                Ok(None) => println!("no session description available"),
                Err(e) => tracing::error!(error = %e, "describe failed"),
            },
            Ok(Command::Stats) => display_stats(&session.stats()),
            Ok(Command::Teardown) | Ok(Command::Quit) | Err(TryRecvError::Disconnected) => {
                if session.state() != SessionState::Init {
                    if let Err(e) = session.teardown() {
                        tracing::error!(error = %e, "teardown failed");
                    }
                }
                drop(data_plane.take());
                display_stats(&session.stats());
                break;
            }
            Err(TryRecvError::Empty) => {}
        }

        if session.is_playing() {
            if let Some(plane) = data_plane.as_mut() {
                if poll_timer.try_fire() {
                    media_tick(plane, &session, sink.as_deref_mut());
                }
                if report_timer.try_fire() {
                    feedback_tick(plane, &session, feedback_addr);
                }
                if display_timer.try_fire() {
                    eprintln!("{}", format_compact_stats(&session.stats()));
                }
            }
        }

        thread::sleep(Duration::from_millis(2));
    }

    if let Some(sink) = sink.as_mut() {
        let _ = sink.flush();
    }
    Ok(())
}

fn resolve(host: &str, port: u16) -> anyhow::Result<SocketAddr> {
    (host, port)
        .to_socket_addrs()?
        .next()
        .context("no address found")
}

fn open_sink(output: Option<&str>) -> anyhow::Result<Option<Box<dyn Write>>> {
    Ok(match output {
        None => None,
        Some("-") => Some(Box::new(io::stdout())),
        Some(path) => {
            let file =
                File::create(path).with_context(|| format!("failed to create {path}"))?;
            Some(Box::new(BufWriter::new(file)))
        }
    })
}

fn build_data_plane<C: rtstream_protocol::ControlChannel>(
    config: &PlayerConfig,
    session: &Session<C>,
) -> anyhow::Result<DataPlane> {
    let media_addr: SocketAddr = format!("0.0.0.0:{}", config.media_port).parse()?;
    let media = DatagramSocket::bind(media_addr, config.recv_timeout())
        .with_context(|| format!("failed to bind media port {}", config.media_port))?;
    let feedback = DatagramSocket::unbound(false)?;

    Ok(DataPlane {
        media,
        feedback,
        receiver: StreamReceiver::new(session.stats_handle()),
        accumulator: FeedbackAccumulator::new(),
        recv_buf: vec![0u8; config.recv_buffer_bytes],
        last_tick: None,
    })
}

/// One media-poll tick: at most one datagram, one displayable frame
fn media_tick<C: rtstream_protocol::ControlChannel>(
    plane: &mut DataPlane,
    session: &Session<C>,
    sink: Option<&mut (dyn Write + 'static)>,
) {
    let now = Instant::now();
    if let Some(last) = plane.last_tick {
        session.stats_handle().write().record_play_time(now - last);
    }
    plane.last_tick = Some(now);

    match plane.media.recv(&mut plane.recv_buf) {
        Ok(Some(n)) => {
            if let Err(e) = plane.receiver.handle_datagram(&plane.recv_buf[..n]) {
                tracing::warn!(error = %e, "malformed media datagram, tick skipped");
                return;
            }
            if let Some(frame) = plane.receiver.next_frame() {
                if let Some(sink) = sink {
                    if let Err(e) = sink.write_all(&frame) {
                        tracing::error!(error = %e, "frame sink write failed");
                    }
                }
            }
        }
        Ok(None) => tracing::trace!("no datagram this tick"),
        Err(e) => tracing::warn!(error = %e, "media receive failed"),
    }
}

/// One feedback tick: build a report and send it best-effort
fn feedback_tick<C: rtstream_protocol::ControlChannel>(
    plane: &mut DataPlane,
    session: &Session<C>,
    feedback_addr: SocketAddr,
) {
    let report = {
        let stats = session.stats_handle();
        let guard = stats.read();
        plane.accumulator.build_report(&guard)
    };

    let bytes = report.to_bytes();
    match plane.feedback.send_to(&bytes, feedback_addr) {
        Ok(_) => tracing::debug!(
            fraction_lost = report.fraction_lost,
            cumulative_lost = report.cumulative_lost,
            highest_seq = report.highest_seq,
            "feedback report sent"
        ),
        // Best-effort path: the next interval's baselines advanced anyway.
        Err(e) => tracing::warn!(error = %e, "feedback send failed"),
    }
}

fn spawn_stdin_reader() -> Receiver<Command> {
    let (tx, rx) = unbounded();
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            match Command::parse(&line) {
                Some(cmd) => {
                    let quit = cmd == Command::Quit || cmd == Command::Teardown;
                    if tx.send(cmd).is_err() {
                        break;
                    }
                    if quit {
                        break;
                    }
                }
                None if line.trim().is_empty() => {}
                None => eprintln!("unknown command: {}", line.trim()),
            }
        }
        // Dropping the sender tells the scheduler loop to shut down.
    });
    rx
}
