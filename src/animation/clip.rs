use glam::{Quat, Vec3, Vec4};

use crate::scene::{NodeId, SceneGraph};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    Step,
    Linear,
    /// Values are stored as `(in_tangent, value, out_tangent)` triples
    CubicSpline,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChannelValues {
    Translation(Vec<Vec3>),
    Rotation(Vec<Quat>),
    Scale(Vec<Vec3>),
}

/// Keyframes driving one transform property of one node
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    pub target: NodeId,
    pub interpolation: Interpolation,
    pub times: Vec<f32>,
    pub values: ChannelValues,
}

impl Channel {
    pub fn end_time(&self) -> f32 {
        self.times.last().copied().unwrap_or(0.0)
    }

    /// Write the value at `time` into the target node's local transform
    pub fn apply(&self, time: f32, scene: &mut SceneGraph) {
        let Some(node) = scene.get(self.target) else {
            return;
        };
        let mut transform = node.transform;
        match &self.values {
            ChannelValues::Translation(values) => {
                if let Some(v) = sample(&self.times, values, self.interpolation, time) {
                    transform.translation = v;
                }
            }
            ChannelValues::Rotation(values) => {
                if let Some(q) = sample(&self.times, values, self.interpolation, time) {
                    transform.rotation = q.normalize();
                }
            }
            ChannelValues::Scale(values) => {
                if let Some(v) = sample(&self.times, values, self.interpolation, time) {
                    transform.scale = v;
                }
            }
        }
        scene.node_mut(self.target).transform = transform;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClip {
    pub name: String,
    pub duration: f32,
    pub channels: Vec<Channel>,
}

impl AnimationClip {
    /// Build a clip whose duration is the latest keyframe of any channel
    pub fn new(name: impl Into<String>, channels: Vec<Channel>) -> Self {
        let duration = channels.iter().map(Channel::end_time).fold(0.0, f32::max);
        Self {
            name: name.into(),
            duration,
            channels,
        }
    }

    pub fn sample(&self, time: f32, scene: &mut SceneGraph) {
        for channel in &self.channels {
            channel.apply(time, scene);
        }
    }

    /// Copy of this clip restricted to channels that target `root` or its descendants
    pub fn bound_to(&self, scene: &SceneGraph, root: NodeId) -> AnimationClip {
        let channels: Vec<Channel> = self
            .channels
            .iter()
            .filter(|c| scene.get(c.target).is_some() && scene.is_in_subtree(root, c.target))
            .cloned()
            .collect();
        let dropped = self.channels.len() - channels.len();
        if dropped > 0 {
            log::warn!("clip '{}': {dropped} channels target nodes outside the model", self.name);
        }
        AnimationClip {
            name: self.name.clone(),
            duration: self.duration,
            channels,
        }
    }
}

trait Keyframe: Copy {
    fn interpolate(a: Self, b: Self, u: f32) -> Self;
    fn hermite(v0: Self, m0: Self, v1: Self, m1: Self, u: f32, dt: f32) -> Self;
}

fn hermite_weights(u: f32) -> [f32; 4] {
    let u2 = u * u;
    let u3 = u2 * u;
    [
        2.0 * u3 - 3.0 * u2 + 1.0,
        u3 - 2.0 * u2 + u,
        -2.0 * u3 + 3.0 * u2,
        u3 - u2,
    ]
}

impl Keyframe for Vec3 {
    fn interpolate(a: Self, b: Self, u: f32) -> Self {
        a.lerp(b, u)
    }

    fn hermite(v0: Self, m0: Self, v1: Self, m1: Self, u: f32, dt: f32) -> Self {
        let [h00, h10, h01, h11] = hermite_weights(u);
        v0 * h00 + m0 * (h10 * dt) + v1 * h01 + m1 * (h11 * dt)
    }
}

impl Keyframe for Quat {
    fn interpolate(a: Self, b: Self, u: f32) -> Self {
        a.slerp(b, u)
    }

    fn hermite(v0: Self, m0: Self, v1: Self, m1: Self, u: f32, dt: f32) -> Self {
        let [h00, h10, h01, h11] = hermite_weights(u);
        let v = Vec4::from(v0) * h00
            + Vec4::from(m0) * (h10 * dt)
            + Vec4::from(v1) * h01
            + Vec4::from(m1) * (h11 * dt);
        Quat::from_vec4(v).normalize()
    }
}

fn sample<T: Keyframe>(times: &[f32], values: &[T], interpolation: Interpolation, time: f32) -> Option<T> {
    let count = times.len();
    if count == 0 {
        return None;
    }
    let stride = if interpolation == Interpolation::CubicSpline { 3 } else { 1 };
    if values.len() < count * stride {
        return None;
    }
    // for cubic splines the keyframe value sits in the middle of each triple
    let value = |i: usize| values[i * stride + stride / 2];

    if count == 1 || time <= times[0] {
        return Some(value(0));
    }
    if time >= times[count - 1] {
        return Some(value(count - 1));
    }

    let next = times.partition_point(|t| *t <= time);
    let prev = next - 1;
    let dt = times[next] - times[prev];
    if dt <= 0.0 {
        return Some(value(next));
    }
    let u = (time - times[prev]) / dt;

    Some(match interpolation {
        Interpolation::Step => value(prev),
        Interpolation::Linear => T::interpolate(value(prev), value(next), u),
        Interpolation::CubicSpline => {
            let out_tangent = values[prev * 3 + 2];
            let in_tangent = values[next * 3];
            T::hermite(value(prev), out_tangent, value(next), in_tangent, u, dt)
        }
    })
}
