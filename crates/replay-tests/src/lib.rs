//! Integration test crate for the replay engine.
//!
//! This crate exists solely to hold cross-crate integration tests.
//! Recordings are written to temporary folders in the same format a live
//! recorder produces, then played through `replay-engine`.

#[cfg(test)]
mod fixture;

#[cfg(test)]
mod playback;


#[cfg(test)]
mod live;
