//! Progressive playback through the producer.

use crate::fixture::{rows, value, Recording, HEIGHT, WIDTH};
use replay_engine::SeekTarget;
use std::sync::Arc;

// ── Speed ──────────────────────────────────────────────────────

#[test]
fn unit_speed_plays_every_frame() {
    let recording = Recording::progressive(5);
    let mut producer = recording.open();
    let seen: Vec<u8> = (0..5).map(|_| value(&producer.receive())).collect();
    assert_eq!(seen, vec![0, 1, 2, 3, 4]);
    assert_eq!(producer.status().ticks, 5);
}

#[test]
fn integer_speed_skips_frames() {
    let recording = Recording::progressive(20);
    let mut producer = recording.open();
    producer.call("SPEED 3").unwrap();
    let seen: Vec<u8> = (0..7).map(|_| value(&producer.receive())).collect();
    assert_eq!(seen, vec![0, 3, 6, 9, 12, 15, 18]);
}

#[test]
fn fractional_speed_on_progressive_plays_every_frame() {
    let recording = Recording::progressive(4);
    let mut producer = recording.open();
    producer.set_speed(0.75).unwrap();
    let seen: Vec<u8> = (0..4).map(|_| value(&producer.receive())).collect();
    assert_eq!(seen, vec![0, 1, 2, 3]);
}

#[test]
fn slow_speed_holds_each_frame() {
    let recording = Recording::progressive(10);
    let mut producer = recording.open();
    producer.call("SPEED 0.25").unwrap();
    let seen: Vec<u8> = (0..9).map(|_| value(&producer.receive())).collect();
    assert_eq!(seen, vec![0, 0, 0, 0, 1, 1, 1, 1, 2]);
    assert_eq!(producer.status().repeats, 6);
}

#[test]
fn output_keeps_header_geometry() {
    let recording = Recording::progressive(2);
    let mut producer = recording.open();
    assert_eq!(producer.receive().dimensions(), (WIDTH, HEIGHT));
    assert_eq!(producer.header().width, WIDTH);
}

// ── Row shift ──────────────────────────────────────────────────

#[test]
fn odd_running_count_shifts_up_one_row() {
    let recording = Recording::striped(4);
    let mut producer = recording.open();
    let seen: Vec<(u8, u8)> = (0..4).map(|_| rows(&producer.receive())).collect();
    // entries 0 and 2 leave the count odd after stepping
    assert_eq!(seen, vec![(1, 2), (10, 11), (21, 22), (30, 31)]);

    let last = producer.receive();
    assert_eq!(last.row(HEIGHT - 1)[0], 33);
    assert_eq!(last.row(HEIGHT - 2)[0], 32);
}

#[test]
fn even_stride_never_shifts() {
    let recording = Recording::striped(6);
    let mut producer = recording.open();
    producer.call("SPEED 2").unwrap();
    let seen: Vec<(u8, u8)> = (0..3).map(|_| rows(&producer.receive())).collect();
    assert_eq!(seen, vec![(0, 1), (20, 21), (40, 41)]);
}

#[test]
fn reverse_shift_follows_entry_parity() {
    let recording = Recording::striped(4);
    let mut producer = recording.open_at(SeekTarget::absolute(3));
    producer.call("SPEED -1").unwrap();
    let seen: Vec<(u8, u8)> = (0..4).map(|_| rows(&producer.receive())).collect();
    assert_eq!(seen, vec![(30, 31), (21, 22), (10, 11), (1, 2)]);
}

// ── Pause & seek ───────────────────────────────────────────────

#[test]
fn pause_repeats_identical_frame() {
    let recording = Recording::progressive(10);
    let mut producer = recording.open();
    producer.receive();
    let shown = producer.receive();
    producer.call("PAUSE").unwrap();

    let position = producer.position();
    for _ in 0..4 {
        assert!(Arc::ptr_eq(&producer.receive(), &shown));
    }
    assert_eq!(producer.position(), position);
    assert_eq!(producer.status().speed, 0.0);
}

#[test]
fn seek_while_paused_shows_target_once() {
    let recording = Recording::progressive(20);
    let mut producer = recording.open();
    producer.receive();
    producer.call("PAUSE").unwrap();
    producer.call("SEEK 12").unwrap();

    let refreshed = producer.receive();
    assert_eq!(value(&refreshed), 12);
    assert_eq!(producer.status().frame, 12);
    assert!(Arc::ptr_eq(&producer.receive(), &refreshed));
}

#[test]
fn relative_seeks_move_from_playhead() {
    let recording = Recording::progressive(20);
    let mut producer = recording.open_at(SeekTarget::absolute(10));
    producer.call("SEEK +4").unwrap();
    assert_eq!(value(&producer.receive()), 14);
    producer.call("SEEK -9").unwrap();
    assert_eq!(value(&producer.receive()), 6);
    producer.call("SEEK -100").unwrap();
    assert_eq!(value(&producer.receive()), 0);
}

#[test]
fn seek_from_end_keeps_margin() {
    let recording = Recording::progressive(20);
    let mut producer = recording.open();
    assert_eq!(producer.seek(SeekTarget::from_end(0)).unwrap(), 16);
    assert_eq!(value(&producer.receive()), 16);
    producer.call("SEEK |5").unwrap();
    assert_eq!(producer.position(), 11);
}

#[test]
fn seek_past_end_lands_on_live_edge() {
    let mut recording = Recording::progressive(10);
    let mut producer = recording.open();
    assert_eq!(producer.seek(SeekTarget::absolute(1000)).unwrap(), 10);
    assert_eq!(producer.status().entry, 10);
    producer.call("SEEK +50").unwrap();
    assert_eq!(producer.position(), 10);

    recording.append(1);
    assert_eq!(value(&producer.receive()), 10);
}

#[test]
fn start_position_from_end() {
    let recording = Recording::progressive(30);
    let mut producer = recording.open_at(SeekTarget::from_end(6));
    assert_eq!(value(&producer.receive()), 20);
}

// ── Reverse ────────────────────────────────────────────────────

#[test]
fn reverse_stops_at_first_frame() {
    let recording = Recording::progressive(10);
    let mut producer = recording.open_at(SeekTarget::absolute(5));
    producer.call("SPEED -1").unwrap();

    let seen: Vec<u8> = (0..6).map(|_| value(&producer.receive())).collect();
    assert_eq!(seen, vec![5, 4, 3, 2, 1, 0]);

    let first = producer.last_frame();
    for _ in 0..3 {
        assert!(Arc::ptr_eq(&producer.receive(), &first));
    }
    assert!(producer.status().end_of_data);
    assert_eq!(producer.status().frame, 0);
}

#[test]
fn forward_after_reverse_restarts_at_zero() {
    let recording = Recording::progressive(10);
    let mut producer = recording.open_at(SeekTarget::absolute(1));
    producer.call("SPEED -1").unwrap();
    producer.receive();
    producer.receive();
    producer.receive();

    producer.call("SPEED 1").unwrap();
    let seen: Vec<u8> = (0..3).map(|_| value(&producer.receive())).collect();
    assert_eq!(seen, vec![0, 1, 2]);
}

#[test]
fn fast_reverse() {
    let recording = Recording::progressive(20);
    let mut producer = recording.open_at(SeekTarget::absolute(15));
    producer.call("SPEED -4").unwrap();
    let seen: Vec<u8> = (0..4).map(|_| value(&producer.receive())).collect();
    assert_eq!(seen, vec![15, 11, 7, 3]);
}

// ── End of data ────────────────────────────────────────────────

#[test]
fn end_of_data_freezes_position() {
    let recording = Recording::progressive(3);
    let mut producer = recording.open();
    for _ in 0..3 {
        producer.receive();
    }
    let last = producer.last_frame();
    assert_eq!(value(&last), 2);

    for _ in 0..3 {
        assert!(Arc::ptr_eq(&producer.receive(), &last));
        assert_eq!(producer.position(), 3);
    }
    let status = producer.status();
    assert!(status.end_of_data);
    assert_eq!(status.repeats, 3);
}

#[test]
fn fast_forward_past_end_freezes_on_last_read() {
    let recording = Recording::progressive(20);
    let mut producer = recording.open();
    producer.call("SPEED 3").unwrap();
    for _ in 0..7 {
        producer.receive();
    }
    let frozen = producer.receive();
    assert_eq!(value(&frozen), 18);
    assert!(producer.status().end_of_data);
}
