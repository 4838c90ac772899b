use crate::animation::AnimationClip;
use crate::scene::{NodeId, SceneGraph};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackState {
    /// Seconds of playback since the clip started, not wrapped
    pub elapsed: f32,
    pub is_playing: bool,
}

/// Plays one clip on a model subtree, looping forever
#[derive(Debug, Clone)]
pub struct AnimationPlayer {
    clip: AnimationClip,
    root: NodeId,
    time: f32,
    elapsed: f32,
    playing: bool,
}

impl AnimationPlayer {
    /// Bind `clip` to the subtree under `root`; playback starts paused
    pub fn new(clip: &AnimationClip, scene: &SceneGraph, root: NodeId) -> Self {
        Self {
            clip: clip.bound_to(scene, root),
            root,
            time: 0.0,
            elapsed: 0.0,
            playing: false,
        }
    }

    pub fn play(&mut self) {
        self.playing = true;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    pub fn clip(&self) -> &AnimationClip {
        &self.clip
    }

    pub fn clip_name(&self) -> &str {
        &self.clip.name
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Position inside the clip, always in `[0, duration)`
    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn state(&self) -> PlaybackState {
        PlaybackState {
            elapsed: self.elapsed,
            is_playing: self.playing,
        }
    }

    /// Move playback forward and pose the bound nodes
    pub fn advance(&mut self, delta_seconds: f32, scene: &mut SceneGraph) {
        if !self.playing {
            return;
        }
        let delta = delta_seconds.max(0.0);
        self.elapsed += delta;
        self.time += delta;
        if self.clip.duration > 0.0 {
            self.time = self.time.rem_euclid(self.clip.duration);
        } else {
            self.time = 0.0;
        }
        self.clip.sample(self.time, scene);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{Channel, ChannelValues, Interpolation};
    use crate::scene::Transform;
    use glam::Vec3;

    fn slide(scene: &mut SceneGraph) -> (NodeId, AnimationClip) {
        let root = scene.add_node(None, Transform::IDENTITY);
        let clip = AnimationClip::new(
            "slide",
            vec![Channel {
                target: root,
                interpolation: Interpolation::Linear,
                times: vec![0.0, 2.0],
                values: ChannelValues::Translation(vec![Vec3::ZERO, Vec3::new(4.0, 0.0, 0.0)]),
            }],
        );
        (root, clip)
    }

    #[test]
    fn test_paused_player_does_not_pose() {
        let mut scene = SceneGraph::new();
        let (root, clip) = slide(&mut scene);
        let mut player = AnimationPlayer::new(&clip, &scene, root);

        player.advance(1.0, &mut scene);
        assert_eq!(player.state().elapsed, 0.0);
        assert_eq!(scene.node(root).transform.translation, Vec3::ZERO);
    }

    #[test]
    fn test_advance_poses_nodes() {
        let mut scene = SceneGraph::new();
        let (root, clip) = slide(&mut scene);
        let mut player = AnimationPlayer::new(&clip, &scene, root);
        player.play();

        player.advance(0.5, &mut scene);
        assert_eq!(scene.node(root).transform.translation, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_playback_wraps_without_gap() {
        let mut scene = SceneGraph::new();
        let (root, clip) = slide(&mut scene);
        let mut player = AnimationPlayer::new(&clip, &scene, root);
        player.play();

        player.advance(1.5, &mut scene);
        player.advance(1.0, &mut scene);
        assert!((player.time() - 0.5).abs() < 1e-6);
        assert!((player.state().elapsed - 2.5).abs() < 1e-6);
        assert!(player.state().is_playing);

        player.advance(1.5, &mut scene);
        assert_eq!(player.time(), 0.0);
    }

    #[test]
    fn test_zero_length_clip_stays_at_start() {
        let mut scene = SceneGraph::new();
        let root = scene.add_node(None, Transform::IDENTITY);
        let mut player = AnimationPlayer::new(&AnimationClip::new("empty", Vec::new()), &scene, root);
        player.play();
        player.advance(0.3, &mut scene);
        assert_eq!(player.time(), 0.0);
    }
}
