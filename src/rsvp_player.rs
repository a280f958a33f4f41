/*!
 * RSVP playback engine.
 *
 * Plays a [`WordSequence`] back one word at a time at a fixed
 * words-per-minute rate. Each call to [`RsvpPlayer::start`] spawns a single
 * cooperative display loop on the tokio runtime and hands back a
 * [`PlaybackSession`] the caller owns; pause, resume and stop are delivered
 * to the loop over a watch channel, so a state change takes effect within
 * the shorter of the per-word delay and the pause poll interval.
 */

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use log::debug;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::document_extractor::WordSequence;
use crate::errors::PlayerError;

/// Upper bound on how long the display loop sits in a paused wait before
/// re-checking its control channel.
pub const PAUSE_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Observable playback state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackStatus {
    /// No session has started yet
    Idle,
    /// Words are being emitted
    Running,
    /// Emission is suspended, index held in place
    Paused,
    /// The session was cancelled before reaching the end
    Stopped,
    /// Every word was emitted
    Completed,
}

impl PlaybackStatus {
    /// Whether the session has reached a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Stopped | Self::Completed)
    }

    /// Get a human-readable status string
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Running => "Running",
            Self::Paused => "Paused",
            Self::Stopped => "Stopped",
            Self::Completed => "Completed",
        }
    }
}

impl fmt::Display for PlaybackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Control signal delivered from the session handle to the display loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ControlSignal {
    Run,
    Pause,
    Stop,
}

/// Per-word emission interface. The loop calls this once per displayed word
/// with the word, its 0-based index and the total word count so hosts can
/// render progress alongside the word itself.
pub trait DisplaySink: Send + Sync {
    /// Present a single word to the user
    fn display(&self, word: &str, index: usize, total: usize);
}

impl<F> DisplaySink for F
where
    F: Fn(&str, usize, usize) + Send + Sync,
{
    fn display(&self, word: &str, index: usize, total: usize) {
        self(word, index, total)
    }
}

/// Factory for playback sessions
pub struct RsvpPlayer {
    // @field: Pause re-check interval, shortened in tests
    poll_interval: Duration,
}

impl RsvpPlayer {
    /// Create a player with the default 100 ms pause poll interval
    pub fn new() -> Self {
        Self::with_poll_interval(PAUSE_POLL_INTERVAL)
    }

    /// Create a player with a custom pause poll interval
    pub fn with_poll_interval(poll_interval: Duration) -> Self {
        RsvpPlayer { poll_interval }
    }

    /// Start playing a word sequence at the given rate.
    ///
    /// Fails with [`PlayerError::InvalidRate`] when `wpm` is zero, leaving
    /// no session behind. Otherwise a fresh session starts at index 0 with a
    /// fixed per-word delay of `60000 / wpm` milliseconds; the rate cannot
    /// change mid-session.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start<S>(
        &self,
        words: WordSequence,
        wpm: u32,
        sink: S,
    ) -> Result<PlaybackSession, PlayerError>
    where
        S: DisplaySink + 'static,
    {
        if wpm == 0 {
            return Err(PlayerError::InvalidRate(wpm));
        }

        let delay = Duration::from_millis(60_000 / u64::from(wpm));
        let total = words.len();
        debug!("Starting playback: {} words at {} wpm ({:?}/word)", total, wpm, delay);

        let (control_tx, control_rx) = watch::channel(ControlSignal::Run);
        let (status_tx, status_rx) = watch::channel(PlaybackStatus::Running);
        let index = Arc::new(AtomicUsize::new(0));

        let task = tokio::spawn(display_loop(
            words,
            delay,
            self.poll_interval,
            Box::new(sink),
            control_rx,
            status_tx,
            Arc::clone(&index),
        ));

        Ok(PlaybackSession {
            control: control_tx,
            status: status_rx,
            index,
            total,
            wpm,
            task,
        })
    }
}

impl Default for RsvpPlayer {
    fn default() -> Self {
        Self::new()
    }
}

/// A running (or finished) playback session, owned by the caller.
///
/// Dropping the session drops the control channel, which the display loop
/// treats as a stop signal, so sessions never leak their task.
pub struct PlaybackSession {
    control: watch::Sender<ControlSignal>,
    status: watch::Receiver<PlaybackStatus>,
    index: Arc<AtomicUsize>,
    total: usize,
    wpm: u32,
    task: JoinHandle<()>,
}

impl PlaybackSession {
    /// Suspend emission. No-op unless the session is currently running.
    pub fn pause(&self) {
        self.control.send_if_modified(|signal| {
            if *signal == ControlSignal::Run {
                *signal = ControlSignal::Pause;
                true
            } else {
                false
            }
        });
    }

    /// Continue emission from the current index. No-op unless paused.
    pub fn resume(&self) {
        self.control.send_if_modified(|signal| {
            if *signal == ControlSignal::Pause {
                *signal = ControlSignal::Run;
                true
            } else {
                false
            }
        });
    }

    /// Cancel the session. The loop observes the signal within one poll
    /// interval (or immediately, mid-delay) and exits without emitting
    /// further words. Idempotent.
    pub fn stop(&self) {
        self.control.send_if_modified(|signal| {
            if *signal == ControlSignal::Stop {
                false
            } else {
                *signal = ControlSignal::Stop;
                true
            }
        });
    }

    /// Latest status published by the display loop
    pub fn status(&self) -> PlaybackStatus {
        *self.status.borrow()
    }

    /// Index of the next word to emit; equals the count of words emitted so
    /// far, and the sequence length once playback completed.
    pub fn current_index(&self) -> usize {
        self.index.load(Ordering::SeqCst)
    }

    /// Total number of words in the session's sequence
    pub fn total_words(&self) -> usize {
        self.total
    }

    /// The fixed rate this session was started with
    pub fn wpm(&self) -> u32 {
        self.wpm
    }

    /// Progress through the sequence as a percentage
    pub fn progress_percentage(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.current_index() as f64 / self.total as f64) * 100.0
    }

    /// Whether the display loop has exited
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the display loop to exit and return the terminal status
    pub async fn wait(mut self) -> PlaybackStatus {
        let _ = (&mut self.task).await;
        *self.status.borrow()
    }
}

impl fmt::Debug for PlaybackSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybackSession")
            .field("status", &self.status())
            .field("index", &self.current_index())
            .field("total", &self.total)
            .field("wpm", &self.wpm)
            .finish()
    }
}

/// The cooperative display loop. One per session.
async fn display_loop(
    words: WordSequence,
    delay: Duration,
    poll_interval: Duration,
    sink: Box<dyn DisplaySink>,
    mut control: watch::Receiver<ControlSignal>,
    status: watch::Sender<PlaybackStatus>,
    index: Arc<AtomicUsize>,
) {
    let total = words.len();
    let mut current = 0usize;

    loop {
        if current >= total {
            let _ = status.send(PlaybackStatus::Completed);
            debug!("Playback completed: {} words emitted", total);
            break;
        }

        // The session handle owns the control sender; a closed channel means
        // the handle was dropped and the session is abandoned.
        if control.has_changed().is_err() {
            let _ = status.send(PlaybackStatus::Stopped);
            debug!("Playback abandoned at word {}/{}", current, total);
            break;
        }

        // Copy the signal out so no watch read guard is held across an await
        let signal = *control.borrow_and_update();
        match signal {
            ControlSignal::Stop => {
                let _ = status.send(PlaybackStatus::Stopped);
                debug!("Playback stopped at word {}/{}", current, total);
                break;
            }
            ControlSignal::Pause => {
                let _ = status.send(PlaybackStatus::Paused);
                // Wake on the next control change; the timeout keeps the
                // wait bounded even when no change ever arrives.
                let _ = tokio::time::timeout(poll_interval, control.changed()).await;
            }
            ControlSignal::Run => {
                let _ = status.send(PlaybackStatus::Running);
                if let Some(word) = words.get(current) {
                    sink.display(word, current, total);
                }
                current += 1;
                index.store(current, Ordering::SeqCst);
                wait_word_delay(delay, &mut control).await;
            }
        }
    }
}

/// Sleep out the per-word delay, returning early only for a stop signal.
/// A pause arriving mid-delay is left for the loop head, so the in-flight
/// delay runs to completion and pause never shortens it.
async fn wait_word_delay(delay: Duration, control: &mut watch::Receiver<ControlSignal>) {
    let sleep = tokio::time::sleep(delay);
    tokio::pin!(sleep);

    loop {
        tokio::select! {
            _ = &mut sleep => break,
            changed = control.changed() => {
                if changed.is_err() || *control.borrow() == ControlSignal::Stop {
                    break;
                }
            }
        }
    }
}
