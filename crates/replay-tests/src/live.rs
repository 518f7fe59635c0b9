//! Opening clips, live growth and configuration.

use crate::fixture::{header, value, Recording};
use replay_core::{FieldMode, ReplayError, Result};
use replay_engine::{ReplayConfig, ReplayProducer, SeekTarget};
use replay_media::{ClipPaths, DecodedField, PayloadDecoder, RawBgraDecoder};
use std::io::Write;
use std::thread;
use std::time::Duration;

fn quick_open(timeout_ms: u64) -> ReplayConfig {
    ReplayConfig {
        open_initial_backoff_ms: 2,
        open_max_backoff_ms: 20,
        open_timeout_ms: timeout_ms,
        ..Default::default()
    }
}

// ── Opening ────────────────────────────────────────────────────

#[test]
fn open_waits_for_index_header() {
    let dir = tempfile::tempdir().unwrap();
    let essence = Recording::empty(dir.path());
    let index_path = dir.path().join("clip.idx");

    let writer = thread::spawn(move || {
        thread::sleep(Duration::from_millis(60));
        let mut index = std::fs::OpenOptions::new()
            .append(true)
            .open(index_path)
            .unwrap();
        index
            .write_all(&header(FieldMode::Progressive).to_bytes())
            .unwrap();
    });

    let producer = ReplayProducer::open(&essence, None, &quick_open(5_000)).unwrap();
    writer.join().unwrap();
    assert_eq!(producer.header().field_mode, FieldMode::Progressive);
    assert_eq!(producer.position(), 0);
}

#[test]
fn open_gives_up_on_index_that_never_grows() {
    let dir = tempfile::tempdir().unwrap();
    let essence = Recording::empty(dir.path());
    let err = ReplayProducer::open(&essence, None, &quick_open(40))
        .err()
        .unwrap();
    assert!(matches!(err, ReplayError::TransientUnavailable(_)));
}

#[test]
fn missing_files_are_not_found() {
    let recording = Recording::progressive(2);
    std::fs::remove_file(recording.index_path()).unwrap();
    let err = ReplayProducer::open(recording.essence_path(), None, &ReplayConfig::default())
        .err()
        .unwrap();
    assert!(matches!(err, ReplayError::NotFound(_)));

    let dir = tempfile::tempdir().unwrap();
    let err = ReplayProducer::open(dir.path().join("gone.mav"), None, &ReplayConfig::default())
        .err()
        .unwrap();
    assert!(matches!(err, ReplayError::NotFound(_)));
}

#[test]
fn open_clip_by_name_in_media_folder() {
    let recording = Recording::progressive(6);
    let config = ReplayConfig {
        media_folder: recording.dir().to_path_buf(),
        ..Default::default()
    };
    let mut producer =
        ReplayProducer::open_clip("clip", Some(SeekTarget::absolute(4)), &config).unwrap();
    assert_eq!(value(&producer.receive()), 4);
    assert_eq!(producer.status().clip, "clip.mav");

    assert!(matches!(
        ReplayProducer::open_clip("other", None, &config),
        Err(ReplayError::NotFound(_))
    ));
}

// ── Live growth ────────────────────────────────────────────────

#[test]
fn playback_resumes_when_recorder_appends() {
    let mut recording = Recording::progressive(2);
    let mut producer = recording.open();
    producer.receive();
    producer.receive();
    let frozen = producer.receive();
    assert_eq!(value(&frozen), 1);
    assert!(producer.status().end_of_data);

    recording.append(2);
    assert_eq!(value(&producer.receive()), 2);
    assert!(!producer.status().end_of_data);
    assert_eq!(value(&producer.receive()), 3);
}

#[test]
fn from_end_follows_growing_index() {
    let mut recording = Recording::progressive(10);
    let mut producer = recording.open_at(SeekTarget::from_end(0));
    assert_eq!(producer.position(), 6);

    recording.append(10);
    assert_eq!(recording.entries(), 20);
    producer.call("SEEK |0").unwrap();
    assert_eq!(value(&producer.receive()), 16);
}

// ── Configuration ──────────────────────────────────────────────

#[test]
fn config_file_sets_margin_and_extensions() {
    let recording = Recording::progressive(12);
    let path = recording.dir().join("replay.json");
    std::fs::write(
        &path,
        format!(
            r#"{{"media_folder": {:?}, "extensions": ["mxf", "mav"], "from_end_margin": 1}}"#,
            recording.dir().to_string_lossy()
        ),
    )
    .unwrap();

    let config = ReplayConfig::load(&path).unwrap();
    let mut producer =
        ReplayProducer::open_clip("clip", Some(SeekTarget::from_end(0)), &config).unwrap();
    assert_eq!(value(&producer.receive()), 11);
}

#[test]
fn invalid_config_is_rejected_before_opening() {
    let recording = Recording::progressive(2);
    let config = ReplayConfig {
        extensions: Vec::new(),
        ..Default::default()
    };
    assert!(matches!(
        ReplayProducer::open(recording.essence_path(), None, &config),
        Err(ReplayError::Config(_))
    ));
}

// ── Decoder seam ───────────────────────────────────────────────

struct Inverting;

impl PayloadDecoder for Inverting {
    fn name(&self) -> &str {
        "inverting"
    }

    fn decode(&self, payload: &[u8]) -> Result<DecodedField> {
        let mut field = RawBgraDecoder.decode(payload)?;
        field.pixels.iter_mut().for_each(|b| *b = 255 - *b);
        Ok(field)
    }
}

#[test]
fn custom_decoder_feeds_the_compositor() {
    let recording = Recording::progressive(3);
    let paths = ClipPaths::for_essence(recording.essence_path(), "idx");
    let mut producer = ReplayProducer::open_with_decoder(
        &paths,
        None,
        &ReplayConfig::default(),
        Box::new(Inverting),
    )
    .unwrap();
    assert_eq!(value(&producer.receive()), 255);
    assert_eq!(value(&producer.receive()), 254);
}
