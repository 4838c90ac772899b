use crate::animation::{AnimationClip, AnimationPlayer};
use crate::scene::{NodeId, SceneGraph};

/// Clip named `preferred`, else the first clip, else nothing
pub fn select_clip<'a>(clips: &'a [AnimationClip], preferred: &str) -> Option<&'a AnimationClip> {
    clips
        .iter()
        .find(|clip| clip.name == preferred)
        .or_else(|| clips.first())
}

/// Pick a clip, bind it to `model` and start looped playback
///
/// An unmatched name is not an error; the first clip plays instead.
pub fn select_and_play(
    clips: &[AnimationClip],
    scene: &SceneGraph,
    model: NodeId,
    preferred: &str,
) -> Option<AnimationPlayer> {
    let Some(clip) = select_clip(clips, preferred) else {
        log::info!("model has no animations");
        return None;
    };
    if clip.name != preferred {
        log::info!("no clip named '{preferred}', playing '{}'", clip.name);
    } else {
        log::info!("playing clip '{}' ({:.2}s)", clip.name, clip.duration);
    }

    let mut player = AnimationPlayer::new(clip, scene, model);
    player.play();
    Some(player)
}
