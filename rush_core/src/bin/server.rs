use std::io::{self, BufRead, BufReader, Read};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, Sender};
use tracing::{info, warn};

use rush_core::network::{start_event_server, EventStreamServer, StatusFrame};
use rush_core::{
    build_app_with_config, drain_game_events, load_game_config_from_env, run_tick,
    submit_command, DaySession, GameEvent, Ledger, SessionMetrics,
};
use rush_runtime::{parse_command_line, CommandPayload};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = load_game_config_from_env();
    let tick = Duration::from_millis(config.clock.tick_ms);
    let mut app = build_app_with_config((*config).clone());

    let event_server = start_event_server(config.server.event_bind);
    let command_rx = match spawn_command_listener(config.server.command_bind) {
        Ok(receiver) => receiver,
        Err(err) => {
            tracing::error!(
                target: "order_rush::server",
                bind = %config.server.command_bind,
                error = %err,
                "command_listener.bind_failed"
            );
            return;
        }
    };

    info!(
        target: "order_rush::server",
        command_bind = %config.server.command_bind,
        event_bind = %config.server.event_bind,
        tick_ms = config.clock.tick_ms,
        seed = config.seed,
        "Order Rush headless server ready"
    );

    publish_status(&app, event_server.as_ref());
    let mut next_tick = Instant::now() + tick;
    loop {
        while let Ok(command) = command_rx.try_recv() {
            info!(target: "order_rush::server", ?command, "command.received");
            submit_command(&mut app, command);
        }

        run_tick(&mut app);
        let events = drain_game_events(&mut app);
        if !events.is_empty() {
            if let Some(server) = event_server.as_ref() {
                server.broadcast_events(&events);
            }
            publish_status(&app, event_server.as_ref());
            log_session_end(&app, &events);
        }

        let now = Instant::now();
        if next_tick > now {
            thread::sleep(next_tick - now);
            next_tick += tick;
        } else {
            // Fell behind; resume from the current instant instead of bursting.
            next_tick = now + tick;
        }
    }
}

fn publish_status(app: &bevy::prelude::App, server: Option<&EventStreamServer>) {
    let Some(server) = server else {
        return;
    };
    let status = StatusFrame::capture(
        app.world.resource::<DaySession>(),
        app.world.resource::<Ledger>(),
    );
    server.broadcast_status(&status);
}

fn log_session_end(app: &bevy::prelude::App, events: &[GameEvent]) {
    for event in events {
        if let GameEvent::GameOver {
            final_score,
            reason,
        } = event
        {
            let metrics = app.world.resource::<SessionMetrics>();
            info!(
                target: "order_rush::server",
                final_score,
                reason = reason.as_str(),
                days_completed = metrics.days_completed,
                tasks_spawned = metrics.tasks_spawned,
                board_timeouts = metrics.board_timeouts,
                resolutions_succeeded = metrics.resolutions_succeeded,
                resolutions_failed = metrics.resolutions_failed,
                queue_timeouts = metrics.queue_timeouts,
                peak_stress = metrics.peak_stress,
                "session.summary"
            );
        }
    }
}

fn spawn_command_listener(bind_addr: SocketAddr) -> io::Result<Receiver<CommandPayload>> {
    let listener = TcpListener::bind(bind_addr)?;
    listener.set_nonblocking(true)?;

    let (sender, receiver) = unbounded::<CommandPayload>();
    thread::spawn(move || loop {
        match listener.accept() {
            Ok((stream, addr)) => {
                info!(target: "order_rush::server", %addr, "command_client.connected");
                let sender = sender.clone();
                thread::spawn(move || handle_client(stream, sender));
            }
            Err(ref err) if err.kind() == io::ErrorKind::WouldBlock => {
                thread::sleep(Duration::from_millis(50));
            }
            Err(err) => {
                warn!(target: "order_rush::server", error = %err, "command_client.accept_failed");
                thread::sleep(Duration::from_millis(200));
            }
        }
    });

    Ok(receiver)
}

const MAX_COMMAND_LINE_BYTES: usize = 256;

#[derive(Debug, PartialEq, Eq)]
enum CommandLine {
    Eof,
    Line(String),
    Oversized,
}

/// Reads one newline-terminated command, bounded in size. Overlong lines
/// are discarded up to their newline; invalid UTF-8 is decoded lossily.
fn read_command_line<R: BufRead>(reader: &mut R, buf: &mut Vec<u8>) -> io::Result<CommandLine> {
    buf.clear();
    let read = reader
        .by_ref()
        .take(MAX_COMMAND_LINE_BYTES as u64 + 1)
        .read_until(b'\n', buf)?;
    if read == 0 {
        return Ok(CommandLine::Eof);
    }
    if buf.last() != Some(&b'\n') && buf.len() > MAX_COMMAND_LINE_BYTES {
        discard_line(reader)?;
        return Ok(CommandLine::Oversized);
    }
    Ok(CommandLine::Line(String::from_utf8_lossy(buf).trim().to_string()))
}

fn discard_line<R: BufRead>(reader: &mut R) -> io::Result<()> {
    loop {
        let available = reader.fill_buf()?;
        if available.is_empty() {
            return Ok(());
        }
        match available.iter().position(|byte| *byte == b'\n') {
            Some(end) => {
                reader.consume(end + 1);
                return Ok(());
            }
            None => {
                let len = available.len();
                reader.consume(len);
            }
        }
    }
}

fn handle_client(stream: TcpStream, sender: Sender<CommandPayload>) {
    if let Err(err) = stream.set_nonblocking(false) {
        warn!(target: "order_rush::server", error = %err, "command_client.blocking_failed");
        return;
    }
    let mut reader = BufReader::new(stream);
    let mut buf = Vec::new();
    loop {
        match read_command_line(&mut reader, &mut buf) {
            Ok(CommandLine::Eof) => break,
            Ok(CommandLine::Oversized) => warn!(
                target: "order_rush::server",
                limit = MAX_COMMAND_LINE_BYTES,
                "command.rejected=oversized"
            ),
            Ok(CommandLine::Line(line)) => {
                if line.is_empty() {
                    continue;
                }
                match parse_command_line(&line) {
                    Ok(command) => {
                        if sender.send(command).is_err() {
                            break;
                        }
                    }
                    Err(err) => warn!(
                        target: "order_rush::server",
                        input = %line,
                        error = %err,
                        "command.rejected"
                    ),
                }
            }
            Err(err) => {
                warn!(target: "order_rush::server", error = %err, "command_client.read_failed");
                break;
            }
        }
    }
}
