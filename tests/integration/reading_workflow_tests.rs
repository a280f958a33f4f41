/*!
 * End-to-end tests: load a document, read it back via RSVP, drive the
 * session through the controller the way a host UI would.
 */

use std::time::Duration;

use anyhow::Result;

use wordgaze::app_config::Config;
use wordgaze::app_controller::ReaderController;
use wordgaze::document_extractor::DocumentFormat;
use wordgaze::errors::{AppError, PlayerError};
use wordgaze::rsvp_player::PlaybackStatus;

use crate::common;
use crate::common::CollectingSink;

/// Load an EPUB and play it to completion
#[tokio::test(start_paused = true)]
async fn test_workflow_loadEpubAndPlay_shouldEmitEveryWord() -> Result<()> {
    common::init_logging();
    let temp_dir = common::create_temp_dir()?;
    let epub_path = common::create_test_epub(&temp_dir.path().to_path_buf(), "book.epub")?;

    let mut controller = ReaderController::new();
    assert_eq!(controller.status(), PlaybackStatus::Idle);

    let word_count = controller.load_document(&epub_path)?;
    assert!(word_count >= common::FIXTURE_EPUB_WORDS.len());

    let document = controller.document().expect("document should be loaded");
    assert_eq!(document.format, DocumentFormat::Epub);
    assert_eq!(document.words.len(), word_count);

    let sink = CollectingSink::new();
    controller.start_with_wpm(600, sink.clone())?;
    assert_eq!(controller.status(), PlaybackStatus::Running);

    let session = controller.take_session().expect("session should be active");
    let status = session.wait().await;

    assert_eq!(status, PlaybackStatus::Completed);
    assert_eq!(sink.count(), word_count);
    common::assert_contains_in_order(&sink.words(), &common::FIXTURE_EPUB_WORDS);

    Ok(())
}

/// Pause, resume and stop flow through the controller to the session
#[tokio::test(start_paused = true)]
async fn test_workflow_pauseResumeStop_shouldControlActiveSession() -> Result<()> {
    common::init_logging();
    let temp_dir = common::create_temp_dir()?;
    let epub_path = common::create_test_epub(&temp_dir.path().to_path_buf(), "book.epub")?;

    let mut controller = ReaderController::new();
    controller.load_document(&epub_path)?;

    let sink = CollectingSink::new();
    // 60 wpm -> 1 s per word, slow enough to steer mid-flight
    controller.start_with_wpm(60, sink.clone())?;

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(sink.count(), 1);

    controller.pause();
    // The in-flight word delay runs out before the pause is observed
    tokio::time::sleep(Duration::from_millis(1000)).await;
    assert_eq!(controller.status(), PlaybackStatus::Paused);
    let progress_while_paused = controller.progress();

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(controller.progress(), progress_while_paused);

    controller.resume();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(controller.status(), PlaybackStatus::Running);

    controller.stop();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(controller.status(), PlaybackStatus::Stopped);
    let emitted_at_stop = sink.count();

    tokio::time::sleep(Duration::from_millis(2000)).await;
    assert_eq!(sink.count(), emitted_at_stop);

    Ok(())
}

/// Starting again replaces the previous session and begins at word zero
#[tokio::test(start_paused = true)]
async fn test_workflow_restart_shouldBeginFromFirstWord() -> Result<()> {
    common::init_logging();
    let temp_dir = common::create_temp_dir()?;
    let epub_path = common::create_test_epub(&temp_dir.path().to_path_buf(), "book.epub")?;

    let mut controller = ReaderController::new();
    controller.load_document(&epub_path)?;

    let first_sink = CollectingSink::new();
    controller.start_with_wpm(60, first_sink.clone())?;
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(first_sink.count(), 1);

    // Second start cancels the first session
    let second_sink = CollectingSink::new();
    controller.start_with_wpm(600, second_sink.clone())?;

    let session = controller.take_session().expect("replacement session");
    let status = session.wait().await;
    assert_eq!(status, PlaybackStatus::Completed);

    let emissions = second_sink.emissions();
    assert_eq!(emissions[0].index, 0);
    assert_eq!(second_sink.count(), controller.document().unwrap().words.len());

    // The replaced session stays frozen where it was cancelled
    assert_eq!(first_sink.count(), 1);

    Ok(())
}

/// Controller-level error paths: no document, bad rate, bad files
#[tokio::test(start_paused = true)]
async fn test_workflow_errorPaths_shouldSurfaceTaxonomy() -> Result<()> {
    common::init_logging();
    let temp_dir = common::create_temp_dir()?;

    let mut controller = ReaderController::new();

    // Starting before loading anything
    let err = controller.start(CollectingSink::new()).unwrap_err();
    assert!(matches!(err, AppError::Unknown(_)));

    // Missing file
    let err = controller.load_document("/no/such/book.epub").unwrap_err();
    assert!(matches!(err, AppError::File(_)));

    // Unsupported document type
    let txt_path =
        common::create_test_file(&temp_dir.path().to_path_buf(), "notes.txt", b"plain words")?;
    let err = controller.load_document(&txt_path).unwrap_err();
    assert!(matches!(err, AppError::Extractor(_)));

    // Invalid rate leaves the loaded document and idle status untouched
    let epub_path = common::create_test_epub(&temp_dir.path().to_path_buf(), "book.epub")?;
    controller.load_document(&epub_path)?;
    let err = controller.start_with_wpm(0, CollectingSink::new()).unwrap_err();
    assert!(matches!(err, AppError::Player(PlayerError::InvalidRate(0))));
    assert_eq!(controller.status(), PlaybackStatus::Idle);
    assert!(controller.document().is_some());

    assert!(controller.set_wpm(0).is_err());
    assert!(controller.set_wpm(400).is_ok());
    assert_eq!(controller.config().wpm, 400);

    Ok(())
}

/// A controller built from an invalid config is rejected up front
#[tokio::test]
async fn test_workflow_withInvalidConfig_shouldFailConstruction() {
    let config = Config {
        wpm: 0,
        ..Config::default()
    };

    assert!(ReaderController::with_config(config).is_err());
}

/// A misnamed EPUB still loads through header sniffing
#[tokio::test(start_paused = true)]
async fn test_workflow_withMisnamedEpub_shouldLoadViaSniffing() -> Result<()> {
    common::init_logging();
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_epub(&temp_dir.path().to_path_buf(), "book.download")?;

    let mut controller = ReaderController::new();
    let word_count = controller.load_document(&path)?;

    assert!(word_count >= common::FIXTURE_EPUB_WORDS.len());
    assert_eq!(controller.document().unwrap().format, DocumentFormat::Epub);

    Ok(())
}
