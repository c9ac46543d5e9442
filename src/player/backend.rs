//! Rodio-backed audio player running on a dedicated OS thread.
//!
//! # Design
//!
//! `rodio::OutputStream` is not `Send` — it must live and die on one
//! thread. [`RodioPlayer::new`] therefore spawns a dedicated playback
//! thread that owns the stream and the `Sink`, and the handle talks to it
//! over a std mpsc channel. The thread refreshes a shared `AtomicBool`
//! busy flag on every loop tick, which is what [`is_busy`] reads — there
//! is no push notification from rodio, polling is the contract.
//!
//! Dropping the handle shuts the thread down.
//!
//! [`is_busy`]: crate::player::AudioPlayer::is_busy

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;

use rodio::{Decoder, OutputStream, Sink};

use super::{AudioPlayer, PlayerError};

/// How often the playback thread refreshes the busy flag while idle.
const TICK: Duration = Duration::from_millis(50);

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

enum Cmd {
    /// Replace the loaded artifact; replies once the file is decoded and
    /// queued (paused).
    Load(PathBuf, mpsc::Sender<Result<(), PlayerError>>),
    Play,
    Pause,
    Resume,
    Stop,
    Shutdown,
}

// ---------------------------------------------------------------------------
// RodioPlayer
// ---------------------------------------------------------------------------

/// Production [`AudioPlayer`] backed by a dedicated rodio thread.
pub struct RodioPlayer {
    cmd_tx: mpsc::Sender<Cmd>,
    busy: Arc<AtomicBool>,
}

impl RodioPlayer {
    /// Spawn the playback thread and open the default output device.
    ///
    /// # Errors
    ///
    /// [`PlayerError::DeviceUnavailable`] when no output device can be
    /// opened; the thread exits immediately in that case.
    pub fn new() -> Result<Self, PlayerError> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<Cmd>();
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), PlayerError>>();
        let busy = Arc::new(AtomicBool::new(false));
        let busy_thread = Arc::clone(&busy);

        std::thread::Builder::new()
            .name("audio-playback".into())
            .spawn(move || playback_thread(cmd_rx, ready_tx, busy_thread))
            .map_err(|e| PlayerError::DeviceUnavailable(e.to_string()))?;

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Self { cmd_tx, busy }),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(PlayerError::Disconnected),
        }
    }

    fn send(&self, cmd: Cmd) {
        if self.cmd_tx.send(cmd).is_err() {
            log::warn!("player: playback thread is gone, command dropped");
        }
    }
}

impl AudioPlayer for RodioPlayer {
    fn load(&self, path: &Path) -> Result<(), PlayerError> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.cmd_tx
            .send(Cmd::Load(path.to_path_buf(), reply_tx))
            .map_err(|_| PlayerError::Disconnected)?;
        reply_rx.recv().map_err(|_| PlayerError::Disconnected)?
    }

    fn play(&self) -> Result<(), PlayerError> {
        self.cmd_tx.send(Cmd::Play).map_err(|_| PlayerError::Disconnected)
    }

    fn pause(&self) {
        self.send(Cmd::Pause);
    }

    fn resume(&self) {
        self.send(Cmd::Resume);
    }

    fn stop(&self) {
        self.send(Cmd::Stop);
    }

    fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

impl Drop for RodioPlayer {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(Cmd::Shutdown);
    }
}

// ---------------------------------------------------------------------------
// Playback thread
// ---------------------------------------------------------------------------

fn playback_thread(
    cmd_rx: mpsc::Receiver<Cmd>,
    ready_tx: mpsc::Sender<Result<(), PlayerError>>,
    busy: Arc<AtomicBool>,
) {
    // The stream handle must outlive every sink created from it.
    let (_stream, handle) = match OutputStream::try_default() {
        Ok(pair) => pair,
        Err(e) => {
            let _ = ready_tx.send(Err(PlayerError::DeviceUnavailable(e.to_string())));
            return;
        }
    };

    let mut sink = match Sink::try_new(&handle) {
        Ok(s) => s,
        Err(e) => {
            let _ = ready_tx.send(Err(PlayerError::DeviceUnavailable(e.to_string())));
            return;
        }
    };

    let _ = ready_tx.send(Ok(()));
    log::debug!("player: playback thread started");

    loop {
        match cmd_rx.recv_timeout(TICK) {
            Ok(Cmd::Load(path, reply)) => {
                // A fresh sink discards whatever the old one still held.
                match Sink::try_new(&handle) {
                    Ok(new_sink) => {
                        sink.stop();
                        sink = new_sink;
                    }
                    Err(e) => {
                        let _ = reply.send(Err(PlayerError::Load(e.to_string())));
                        continue;
                    }
                }

                let result = File::open(&path)
                    .map_err(|e| PlayerError::Load(format!("{}: {e}", path.display())))
                    .and_then(|file| {
                        Decoder::new(BufReader::new(file))
                            .map_err(|e| PlayerError::Load(format!("{}: {e}", path.display())))
                    });

                match result {
                    Ok(source) => {
                        sink.append(source);
                        sink.pause();
                        log::debug!("player: loaded {}", path.display());
                        let _ = reply.send(Ok(()));
                    }
                    Err(e) => {
                        let _ = reply.send(Err(e));
                    }
                }
            }
            Ok(Cmd::Play) | Ok(Cmd::Resume) => sink.play(),
            Ok(Cmd::Pause) => sink.pause(),
            Ok(Cmd::Stop) => sink.stop(),
            Ok(Cmd::Shutdown) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }

        busy.store(!sink.empty(), Ordering::Release);
    }

    log::debug!("player: playback thread shutting down");
}
