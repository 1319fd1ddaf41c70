use std::io::{self, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::Serialize;

use crate::events::GameEvent;
use crate::ledger::Ledger;
use crate::session::DaySession;

/// Pushes length-prefixed JSON frames to every connected client.
pub struct EventStreamServer {
    sender: Sender<Vec<u8>>,
    latest_status: Arc<Mutex<Option<Vec<u8>>>>,
}

/// Compact state summary sent to clients as they connect, and after
/// every tick that produced events.
#[derive(Debug, Clone, Serialize)]
pub struct StatusFrame {
    pub event: &'static str,
    pub day: u32,
    pub day_elapsed_secs: u32,
    pub chaos_mode: bool,
    pub paused: bool,
    pub score: i64,
    pub stress: f32,
}

impl StatusFrame {
    pub fn capture(session: &DaySession, ledger: &Ledger) -> Self {
        Self {
            event: "status",
            day: session.current_day,
            day_elapsed_secs: session.day_elapsed_secs,
            chaos_mode: session.chaos_mode,
            paused: session.paused,
            score: ledger.score(),
            stress: ledger.stress(),
        }
    }
}

impl EventStreamServer {
    pub fn broadcast_events(&self, events: &[GameEvent]) {
        for event in events {
            match serde_json::to_vec(event) {
                Ok(bytes) => self.queue_frame(bytes),
                Err(err) => tracing::error!(
                    target: "order_rush::network",
                    error = %err,
                    "event.serialize_failed"
                ),
            }
        }
    }

    pub fn broadcast_status(&self, status: &StatusFrame) {
        let bytes = match serde_json::to_vec(status) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::error!(target: "order_rush::network", error = %err, "status.serialize_failed");
                return;
            }
        };
        match self.latest_status.lock() {
            Ok(mut guard) => *guard = Some(bytes.clone()),
            Err(err) => {
                tracing::error!(target: "order_rush::network", error = %err, "status.lock_poisoned");
            }
        }
        self.queue_frame(bytes);
    }

    fn queue_frame(&self, bytes: Vec<u8>) {
        if let Err(err) = self.sender.send(bytes) {
            tracing::error!(target: "order_rush::network", error = %err, "frame.queue_failed");
        }
    }
}

pub fn start_event_server(bind_addr: SocketAddr) -> Option<EventStreamServer> {
    let listener = match TcpListener::bind(bind_addr) {
        Ok(listener) => listener,
        Err(err) => {
            tracing::warn!(
                target: "order_rush::network",
                %bind_addr,
                error = %err,
                "event_server.bind_failed; broadcasting disabled"
            );
            return None;
        }
    };
    if let Err(err) = listener.set_nonblocking(true) {
        tracing::warn!(target: "order_rush::network", error = %err, "event_server.nonblocking_failed");
        return None;
    }

    let (sender, receiver) = unbounded::<Vec<u8>>();
    let latest_status: Arc<Mutex<Option<Vec<u8>>>> = Arc::new(Mutex::new(None));
    let accept_status = Arc::clone(&latest_status);

    thread::spawn(move || run_event_stream(listener, receiver, accept_status));

    Some(EventStreamServer {
        sender,
        latest_status,
    })
}

fn run_event_stream(
    listener: TcpListener,
    receiver: Receiver<Vec<u8>>,
    latest_status: Arc<Mutex<Option<Vec<u8>>>>,
) {
    let mut clients: Vec<TcpStream> = Vec::new();
    loop {
        match listener.accept() {
            Ok((mut stream, addr)) => {
                tracing::info!(target: "order_rush::network", %addr, "event_client.connected");
                if let Err(err) = stream.set_nodelay(true) {
                    tracing::warn!(target: "order_rush::network", error = %err, "event_client.nodelay_failed");
                }
                if let Err(err) = stream.set_nonblocking(false) {
                    tracing::warn!(target: "order_rush::network", %addr, error = %err, "event_client.blocking_failed");
                }
                let initial = latest_status.lock().ok().and_then(|guard| guard.clone());
                let greeted = match initial {
                    Some(frame) => write_frame(&mut stream, &frame),
                    None => Ok(()),
                };
                match greeted {
                    Ok(()) => clients.push(stream),
                    Err(err) => {
                        tracing::warn!(target: "order_rush::network", %addr, error = %err, "event_client.greeting_failed");
                    }
                }
            }
            Err(ref err) if err.kind() == io::ErrorKind::WouldBlock => {}
            Err(err) => {
                tracing::error!(target: "order_rush::network", error = %err, "event_client.accept_failed");
                thread::sleep(Duration::from_millis(200));
            }
        }

        while let Ok(frame) = receiver.try_recv() {
            clients.retain_mut(|stream| match write_frame(stream, &frame) {
                Ok(()) => true,
                Err(err) => {
                    tracing::warn!(target: "order_rush::network", error = %err, "event_client.dropped");
                    false
                }
            });
        }

        thread::sleep(Duration::from_millis(16));
    }
}

pub fn write_frame<W: Write>(stream: &mut W, frame: &[u8]) -> io::Result<()> {
    let len = frame.len() as u32;
    let mut buffer = Vec::with_capacity(4 + frame.len());
    buffer.extend_from_slice(&len.to_le_bytes());
    buffer.extend_from_slice(frame);
    stream.write_all(&buffer)
}
