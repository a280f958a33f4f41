use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{debug, info, warn};
use parking_lot::Mutex;

use crate::app_config::Config;
use crate::document_extractor::{DocumentExtractor, DocumentFormat, WordSequence};
use crate::errors::{AppError, PlayerError};
use crate::file_utils::FileManager;
use crate::rsvp_player::{DisplaySink, PlaybackSession, PlaybackStatus, RsvpPlayer};

// @module: Reading controller tying extraction to playback

/// A document that has been loaded and tokenized
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    // @field: Source file path
    pub path: PathBuf,

    // @field: Detected or declared format
    pub format: DocumentFormat,

    // @field: Extracted word sequence
    pub words: WordSequence,
}

/// Coordinates document loading and playback for a host UI.
///
/// Holds at most one active playback session; starting a new one cancels
/// whatever was playing before.
pub struct ReaderController {
    // @field: Reader configuration
    config: Config,

    // @field: Playback session factory
    player: RsvpPlayer,

    // @field: Currently loaded document, if any
    document: Option<LoadedDocument>,

    // @field: The single active session slot
    active: Mutex<Option<PlaybackSession>>,
}

impl ReaderController {
    /// Create a controller with the default configuration
    pub fn new() -> Self {
        Self::with_config_unchecked(Config::default())
    }

    /// Create a controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self, AppError> {
        config.validate()?;
        Ok(Self::with_config_unchecked(config))
    }

    fn with_config_unchecked(config: Config) -> Self {
        let poll_interval = Duration::from_millis(config.poll_interval_ms);
        ReaderController {
            config,
            player: RsvpPlayer::with_poll_interval(poll_interval),
            document: None,
            active: Mutex::new(None),
        }
    }

    /// The current configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Update the display rate. Takes effect on the next `start`; an active
    /// session keeps the rate it was started with.
    pub fn set_wpm(&mut self, wpm: u32) -> Result<(), PlayerError> {
        if wpm == 0 {
            return Err(PlayerError::InvalidRate(wpm));
        }
        self.config.wpm = wpm;
        Ok(())
    }

    /// Load a document, extract its text and keep the resulting word
    /// sequence for playback. Returns the word count.
    pub fn load_document<P: AsRef<Path>>(&mut self, path: P) -> Result<usize, AppError> {
        let path = path.as_ref();

        if !FileManager::file_exists(path) {
            return Err(AppError::File(format!("File does not exist: {:?}", path)));
        }

        // Extension first, header sniff as fallback for misnamed files
        let format = match DocumentFormat::from_path(path) {
            Ok(format) => format,
            Err(err) => match FileManager::detect_document_format(path)? {
                Some(format) => {
                    debug!("Extension lookup failed for {:?}, sniffed {}", path, format);
                    format
                }
                None => return Err(err.into()),
            },
        };

        let words = DocumentExtractor::extract_with_format(path, format)?;
        info!("Loaded {:?} ({}): {} words", path, format, words.len());
        if words.is_empty() {
            warn!("Document {:?} has no readable text", path);
        }

        self.document = Some(LoadedDocument {
            path: path.to_path_buf(),
            format,
            words: words.clone(),
        });

        Ok(words.len())
    }

    /// The currently loaded document, if any
    pub fn document(&self) -> Option<&LoadedDocument> {
        self.document.as_ref()
    }

    /// Start playback of the loaded document at the configured rate
    pub fn start<S>(&self, sink: S) -> Result<(), AppError>
    where
        S: DisplaySink + 'static,
    {
        self.start_with_wpm(self.config.wpm, sink)
    }

    /// Start playback at an explicit rate, replacing any active session.
    ///
    /// A failed start (no document, invalid rate) leaves the previous
    /// session untouched.
    pub fn start_with_wpm<S>(&self, wpm: u32, sink: S) -> Result<(), AppError>
    where
        S: DisplaySink + 'static,
    {
        let document = self
            .document
            .as_ref()
            .ok_or_else(|| AppError::Unknown("No document loaded".to_string()))?;

        // Validate before touching the active slot
        let session = self.player.start(document.words.clone(), wpm, sink)?;

        let mut active = self.active.lock();
        if let Some(previous) = active.take() {
            debug!("Replacing active session at word {}", previous.current_index());
            previous.stop();
        }
        *active = Some(session);

        Ok(())
    }

    /// Pause the active session, if it is running
    pub fn pause(&self) {
        if let Some(session) = self.active.lock().as_ref() {
            session.pause();
        }
    }

    /// Resume the active session, if it is paused
    pub fn resume(&self) {
        if let Some(session) = self.active.lock().as_ref() {
            session.resume();
        }
    }

    /// Stop the active session
    pub fn stop(&self) {
        if let Some(session) = self.active.lock().as_ref() {
            session.stop();
        }
    }

    /// Status of the active session, `Idle` when none was ever started
    pub fn status(&self) -> PlaybackStatus {
        self.active
            .lock()
            .as_ref()
            .map(|session| session.status())
            .unwrap_or(PlaybackStatus::Idle)
    }

    /// Progress of the active session as (emitted words, total words)
    pub fn progress(&self) -> Option<(usize, usize)> {
        self.active
            .lock()
            .as_ref()
            .map(|session| (session.current_index(), session.total_words()))
    }

    /// Hand the active session over to the caller, e.g. to `wait` on it
    pub fn take_session(&self) -> Option<PlaybackSession> {
        self.active.lock().take()
    }
}

impl Default for ReaderController {
    fn default() -> Self {
        Self::new()
    }
}
