//! Frame sinks.
//!
//! Sinks consume rendered frames in playback order and are driven by
//! [`Player::play`](crate::Player::play).

/// `ffmpeg`-based MP4 sink.
pub(crate) mod ffmpeg;
/// Sink trait, in-memory and PNG sequence sinks.
pub(crate) mod sink;
