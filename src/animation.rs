use glam::Quat;

use crate::scene_graph::{ObjectId, Scene};

/// Rotation keyframes, sampled with spherical interpolation.
#[derive(Debug, Clone)]
pub struct QuaternionKeyframeTrack {
    pub times: Vec<f32>,
    pub values: Vec<Quat>,
}

impl QuaternionKeyframeTrack {
    pub fn new(times: Vec<f32>, values: Vec<Quat>) -> anyhow::Result<Self> {
        if times.len() != values.len() {
            anyhow::bail!(
                "Keyframe track has {} times but {} values",
                times.len(),
                values.len()
            );
        }
        if times.is_empty() {
            anyhow::bail!("Keyframe track has no keys");
        }
        if times.windows(2).any(|pair| pair[1] < pair[0]) {
            anyhow::bail!("Keyframe times must be non-decreasing");
        }

        Ok(Self {
            times,
            values: values.into_iter().map(Quat::normalize).collect(),
        })
    }

    /// Holds the first value before the first key and the last value after the last key.
    pub fn sample(&self, time: f32) -> Quat {
        let last = self.times.len() - 1;

        if time <= self.times[0] {
            return self.values[0];
        }
        if time >= self.times[last] {
            return self.values[last];
        }

        // First key strictly after `time`; always in 1..=last here
        let next = self.times.partition_point(|&t| t <= time);
        let prev = next - 1;

        let span = self.times[next] - self.times[prev];
        if span <= f32::EPSILON {
            return self.values[next];
        }

        let t = (time - self.times[prev]) / span;
        self.values[prev].slerp(self.values[next], t)
    }
}

#[derive(Debug, Clone)]
pub struct AnimationClip {
    pub name: String,
    pub duration: f32,
    pub tracks: Vec<QuaternionKeyframeTrack>,
}

impl AnimationClip {
    /// Half turn about the XY diagonal and back over two seconds, then rests for one.
    pub fn cube_rotation() -> anyhow::Result<Self> {
        let half = std::f32::consts::FRAC_1_SQRT_2;
        let track = QuaternionKeyframeTrack::new(
            vec![0.0, 1.0, 2.0],
            vec![
                Quat::IDENTITY,
                Quat::from_xyzw(half, half, 0.0, 0.0),
                Quat::IDENTITY,
            ],
        )?;

        Ok(Self {
            name: "rotate".to_string(),
            duration: 3.0,
            tracks: vec![track],
        })
    }
}

/// A clip playing on the mixer's target, looping forever.
#[derive(Debug, Clone)]
pub struct AnimationAction {
    pub clip: AnimationClip,
    pub time: f32,
    pub playing: bool,
}

impl AnimationAction {
    fn advance(&mut self, delta: f32) {
        if !self.playing || self.clip.duration <= 0.0 {
            return;
        }
        self.time = (self.time + delta).rem_euclid(self.clip.duration);
    }
}

pub struct AnimationMixer {
    target: ObjectId,
    actions: Vec<AnimationAction>,
}

impl AnimationMixer {
    pub fn new(target: ObjectId) -> Self {
        Self {
            target,
            actions: Vec::new(),
        }
    }

    /// Starts playing `clip` from the beginning. Returns the action index.
    pub fn play(&mut self, clip: AnimationClip) -> usize {
        log::debug!("Playing clip {} ({}s)", clip.name, clip.duration);

        self.actions.push(AnimationAction {
            clip,
            time: 0.0,
            playing: true,
        });
        self.actions.len() - 1
    }

    pub fn actions(&self) -> &[AnimationAction] {
        &self.actions
    }

    pub fn update(&mut self, scene: &mut Scene, delta: f32) {
        for action in &mut self.actions {
            action.advance(delta);
        }

        // Later actions win if several drive the same property
        let rotation = self
            .actions
            .iter()
            .filter(|action| action.playing)
            .flat_map(|action| {
                action
                    .clip
                    .tracks
                    .iter()
                    .map(move |track| track.sample(action.time))
            })
            .last();

        let Some(rotation) = rotation else {
            return;
        };
        if scene.get_object(self.target).is_none() {
            log::warn!("Animation target {:?} is no longer in the scene", self.target);
            return;
        }
        scene.set_object_rotation(self.target, rotation);
    }
}
