/*!
 * # wordgaze - RSVP document reading engine
 *
 * A Rust library for reading PDF and EPUB documents via rapid serial visual
 * presentation (RSVP): one word at a time at a configurable pace.
 *
 * ## Features
 *
 * - Extract text from PDF and EPUB documents as a flat word sequence
 * - Play the sequence back at a configurable words-per-minute rate
 * - Cooperative pause/resume/stop with bounded reaction latency
 * - Per-word emission callback with index/total for progress display
 * - JSON configuration with defaults and validation
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `document_extractor`: Document text extraction and tokenization
 * - `rsvp_player`: The RSVP playback engine and session handles
 * - `file_utils`: File system and document-type utilities
 * - `app_controller`: Controller tying extraction to playback for a host UI
 * - `errors`: Custom error types for the library
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod document_extractor;
pub mod errors;
pub mod file_utils;
pub mod rsvp_player;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{LoadedDocument, ReaderController};
pub use document_extractor::{DocumentExtractor, DocumentFormat, WordSequence};
pub use errors::{AppError, ExtractorError, PlayerError};
pub use rsvp_player::{DisplaySink, PlaybackSession, PlaybackStatus, RsvpPlayer};
