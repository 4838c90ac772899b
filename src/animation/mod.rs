//! Keyframe clips, looping playback and clip selection.

pub mod clip;
pub mod player;
pub mod select;

pub use clip::{AnimationClip, Channel, ChannelValues, Interpolation};
pub use player::{AnimationPlayer, PlaybackState};
pub use select::{select_and_play, select_clip};
