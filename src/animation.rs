//! Keyframe animation of a model's transforms.
//!
//! Keyframes are stored sorted by frame number. Each keeps two numbers:
//! `original_frame`, the spacing it was authored with, and `frame_num`, the
//! position on the timeline after the playback speed factor is applied.
//! Changing the speed only ever rewrites `frame_num`, so returning to normal
//! speed is exact.

use log::{debug, trace, warn};

use crate::math::binomial;
use crate::math::mat4::Mat4;
use crate::math::vec4::Vec4;
use crate::transform::{action_matrix, apply_in_space, Action, Space};

/// How in-between frames are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interpolation {
    /// Re-applies a fraction of the next keyframe's recorded manipulation on
    /// top of the previous keyframe.
    #[default]
    Linear,
    /// Blends every keyframe as the control points of one Bernstein polynomial.
    Bezier,
}

const UNIT_SCALE: Vec4 = Vec4::direction(1.0, 1.0, 1.0);

/// A keyframe, or an interpolated frame produced from keyframes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub object_to_world: Mat4,
    pub view_transform: Mat4,
    /// Timeline position after speed scaling.
    pub frame_num: i32,
    /// Timeline position at authoring speed.
    pub original_frame: i32,
    /// Manipulation that led from the previous keyframe to this one.
    pub action: Action,
    pub space: Space,
    pub translation: Vec4,
    pub scale: Vec4,
    /// Degrees around X, Y and Z.
    pub rotation: Vec4,
}

impl Frame {
    /// A keyframe with no recorded manipulation.
    pub fn new(object_to_world: Mat4, view_transform: Mat4, frame_num: i32) -> Self {
        Self {
            object_to_world,
            view_transform,
            frame_num,
            original_frame: frame_num,
            action: Action::default(),
            space: Space::default(),
            translation: Vec4::ZERO,
            scale: UNIT_SCALE,
            rotation: Vec4::ZERO,
        }
    }

    /// Attach the manipulation this keyframe was reached with.
    pub fn with_manipulation(
        mut self,
        action: Action,
        space: Space,
        translation: Vec4,
        scale: Vec4,
        rotation: Vec4,
    ) -> Self {
        self.action = action;
        self.space = space;
        self.translation = translation;
        self.scale = scale;
        self.rotation = rotation;
        self
    }

    fn at(&self, frame_num: i32) -> Self {
        Self { frame_num, ..*self }
    }
}

/// Keyframe track plus a playback cursor.
#[derive(Debug, Clone)]
pub struct Animation {
    keyframes: Vec<Frame>,
    max_frame: i32,
    current: Option<Frame>,
    speed_factor: f64,
}

impl Default for Animation {
    fn default() -> Self {
        Self::new()
    }
}

impl Animation {
    pub fn new() -> Self {
        Self {
            keyframes: Vec::new(),
            max_frame: -1,
            current: None,
            speed_factor: 1.0,
        }
    }

    pub fn keyframes(&self) -> &[Frame] {
        &self.keyframes
    }

    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    /// Frame number of the last keyframe, or -1 with no keyframes.
    pub fn last_frame_number(&self) -> i32 {
        self.max_frame
    }

    pub fn speed_factor(&self) -> f64 {
        self.speed_factor
    }

    /// Appends `frame` if it lies past the last keyframe.
    ///
    /// Every keyframe after the first is rebased: its original frame becomes
    /// the previous original frame plus the raw distance to the previous
    /// keyframe, and its frame number is that scaled by the current speed.
    /// Adding frame 0 moves the cursor to it. Returns whether the frame was kept.
    pub fn add_key_frame(&mut self, mut frame: Frame) -> bool {
        if frame.frame_num <= self.max_frame {
            warn!(
                "Dropping keyframe {}: animation already runs to frame {}",
                frame.frame_num, self.max_frame
            );
            return false;
        }

        if let (Some(first), Some(prev)) = (self.keyframes.first(), self.keyframes.last()) {
            frame.original_frame = prev.original_frame + (frame.frame_num - prev.frame_num);
            frame.frame_num = scaled_frame(frame.original_frame, self.speed_factor, first.original_frame)
                .max(prev.frame_num + 1);
        }

        debug!(
            "Keyframe {} (original {}): {:?} in {:?} space",
            frame.frame_num, frame.original_frame, frame.action, frame.space
        );
        self.max_frame = frame.frame_num;
        self.keyframes.push(frame);

        if frame.frame_num == 0 {
            self.current = Some(frame);
        }
        true
    }

    /// The frame at `frame_num`, or `None` outside `[0, last_frame_number]`.
    pub fn frame(&self, frame_num: i32, interpolation: Interpolation, only_translation: bool) -> Option<Frame> {
        if self.keyframes.is_empty() || frame_num < 0 || frame_num > self.max_frame {
            return None;
        }

        match interpolation {
            Interpolation::Linear => {
                if let Some(key) = self.keyframes.iter().find(|k| k.frame_num == frame_num) {
                    return Some(key.at(frame_num));
                }
                self.keyframes
                    .windows(2)
                    .find(|pair| pair[0].frame_num < frame_num && frame_num < pair[1].frame_num)
                    .map(|pair| linear_frame(&pair[0], &pair[1], frame_num))
            }
            Interpolation::Bezier => Some(self.bezier_frame(frame_num, only_translation)),
        }
    }

    fn bezier_frame(&self, frame_num: i32, only_translation: bool) -> Frame {
        let first = &self.keyframes[0];
        if self.max_frame == 0 {
            return first.at(frame_num);
        }

        let degree = (self.keyframes.len() - 1) as u32;
        let t = f64::from(frame_num) / f64::from(self.max_frame);
        trace!("Bezier frame {frame_num}: t = {t:.3}, degree {degree}");

        let mut object_to_world = Mat4::zero();
        let mut view_transform = Mat4::zero();
        for (i, key) in self.keyframes.iter().enumerate() {
            let i = i as u32;
            let weight = binomial(degree, i) * (1.0 - t).powi((degree - i) as i32) * t.powi(i as i32);
            object_to_world = object_to_world + key.object_to_world * weight;
            view_transform = view_transform + key.view_transform * weight;
        }
        object_to_world.set(3, 3, 1.0);
        view_transform.set(3, 3, 1.0);

        if only_translation {
            object_to_world = with_translation_of(first.object_to_world, &object_to_world);
            view_transform = with_translation_of(first.view_transform, &view_transform);
        }

        Frame {
            object_to_world,
            view_transform,
            frame_num,
            original_frame: frame_num,
            ..*first
        }
    }

    // ============ Playback cursor ============

    pub fn current_frame(&self) -> Option<&Frame> {
        self.current.as_ref()
    }

    /// True when there is nothing left to step to.
    pub fn is_finished(&self) -> bool {
        self.current.map_or(true, |c| c.frame_num >= self.max_frame)
    }

    /// Moves the cursor back to frame 0.
    pub fn reset(&mut self) {
        if self.keyframes.is_empty() {
            return;
        }
        self.current = self.frame(0, Interpolation::Linear, false);
    }

    pub fn step_to_next_frame(&mut self, interpolation: Interpolation, only_translation: bool) {
        let Some(current) = self.current else {
            return;
        };
        if self.keyframes.is_empty() || current.frame_num >= self.max_frame {
            return;
        }

        if let Some(next) = self.frame(current.frame_num + 1, interpolation, only_translation) {
            trace!("Stepped to frame {}", next.frame_num);
            self.current = Some(next);
        }
    }

    pub fn to_first_keyframe(&mut self) {
        self.current = self.keyframes.first().copied();
    }

    pub fn to_last_keyframe(&mut self) {
        self.current = self.keyframes.last().copied();
    }

    /// Jumps to the first keyframe after the cursor. Stays put on the last one.
    pub fn to_next_keyframe(&mut self) {
        let at = self.current.map_or(-1, |c| c.frame_num);
        if let Some(next) = self.keyframes.iter().find(|k| k.frame_num > at) {
            self.current = Some(*next);
        }
    }

    /// Jumps to the last keyframe before the cursor. Stays put on the first one.
    pub fn to_previous_keyframe(&mut self) {
        let Some(current) = self.current else {
            return;
        };
        if let Some(prev) = self.keyframes.iter().rev().find(|k| k.frame_num < current.frame_num) {
            self.current = Some(*prev);
        }
    }

    /// Drops every keyframe and the cursor and restores normal speed.
    pub fn clear(&mut self) {
        self.keyframes.clear();
        self.current = None;
        self.max_frame = -1;
        self.speed_factor = 1.0;
    }

    // ============ Playback speed ============

    /// Speeds playback up by `percent`: keyframes move closer together.
    pub fn increase_playback_speed(&mut self, percent: f64) -> bool {
        self.change_speed(1.0 - percent / 100.0)
    }

    /// Slows playback down by `percent`: keyframes move further apart.
    pub fn decrease_playback_speed(&mut self, percent: f64) -> bool {
        self.change_speed(1.0 + percent / 100.0)
    }

    /// Restores every keyframe to its authored frame number.
    pub fn normal_playback_speed(&mut self) {
        for key in &mut self.keyframes {
            key.frame_num = key.original_frame;
        }
        self.speed_factor = 1.0;
        self.refresh_max_frame();
        debug!("Playback speed reset, last frame {}", self.max_frame);
    }

    fn change_speed(&mut self, multiplier: f64) -> bool {
        let factor = self.speed_factor * multiplier;
        if !(factor > 0.0 && factor.is_finite()) {
            warn!("Rejecting playback speed factor {factor}");
            return false;
        }
        self.speed_factor = factor;

        let Some(base) = self.keyframes.first().map(|k| k.original_frame) else {
            return true;
        };
        let mut prev = base;
        for key in self.keyframes.iter_mut().skip(1) {
            key.frame_num = scaled_frame(key.original_frame, factor, base).max(prev + 1);
            prev = key.frame_num;
        }
        self.refresh_max_frame();
        debug!("Playback speed factor {factor:.3}, last frame {}", self.max_frame);
        true
    }

    fn refresh_max_frame(&mut self) {
        self.max_frame = self.keyframes.last().map_or(-1, |k| k.frame_num);
    }
}

fn scaled_frame(original_frame: i32, speed_factor: f64, base: i32) -> i32 {
    (f64::from(original_frame) * speed_factor + f64::from(base)).round() as i32
}

/// Applies the fraction `t` of `after`'s manipulation to `before`'s transforms.
fn linear_frame(before: &Frame, after: &Frame, frame_num: i32) -> Frame {
    let t = f64::from(frame_num - before.frame_num) / f64::from(after.frame_num - before.frame_num);
    trace!(
        "Linear frame {frame_num} between {} and {}: t = {t:.3}",
        before.frame_num,
        after.frame_num
    );

    let delta = action_matrix(
        after.action,
        after.translation * t,
        UNIT_SCALE + (after.scale - UNIT_SCALE) * t,
        after.rotation * t,
    );
    let mut object_to_world = before.object_to_world;
    let mut view_transform = before.view_transform;
    apply_in_space(&delta, after.space, &mut object_to_world, &mut view_transform);

    Frame {
        object_to_world,
        view_transform,
        frame_num,
        original_frame: frame_num,
        ..*after
    }
}

/// `base` with its translation row replaced by the one in `blended`.
fn with_translation_of(mut base: Mat4, blended: &Mat4) -> Mat4 {
    for col in 0..3 {
        base.set(3, col, blended.get(3, col));
    }
    base
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn identity_at(frame_num: i32) -> Frame {
        Frame::new(Mat4::identity(), Mat4::identity(), frame_num)
    }

    fn translated_x(frame_num: i32, x: f64) -> Frame {
        Frame::new(Mat4::translation(x, 0.0, 0.0), Mat4::identity(), frame_num).with_manipulation(
            Action::Translate,
            Space::Object,
            Vec4::direction(x, 0.0, 0.0),
            UNIT_SCALE,
            Vec4::ZERO,
        )
    }

    fn two_keys() -> Animation {
        let mut animation = Animation::new();
        animation.add_key_frame(identity_at(0));
        animation.add_key_frame(translated_x(10, 10.0));
        animation
    }

    #[test]
    fn linear_interpolates_recorded_translation() {
        let frame = two_keys().frame(5, Interpolation::Linear, false).unwrap();
        assert_relative_eq!(frame.object_to_world, Mat4::translation(5.0, 0.0, 0.0), epsilon = 1e-12);
        assert_eq!(frame.frame_num, 5);
    }

    #[test]
    fn linear_interpolates_scale_from_unit() {
        let mut animation = Animation::new();
        animation.add_key_frame(identity_at(0));
        animation.add_key_frame(
            Frame::new(Mat4::scaling(3.0), Mat4::identity(), 4).with_manipulation(
                Action::Scale,
                Space::World,
                Vec4::ZERO,
                Vec4::direction(3.0, 3.0, 3.0),
                Vec4::ZERO,
            ),
        );

        let frame = animation.frame(2, Interpolation::Linear, false).unwrap();
        assert_relative_eq!(frame.object_to_world, Mat4::scaling(2.0), epsilon = 1e-12);
    }

    #[test]
    fn exact_keyframe_is_returned_unchanged() {
        let animation = two_keys();
        let frame = animation.frame(10, Interpolation::Linear, false).unwrap();
        assert_eq!(frame, animation.keyframes()[1]);
    }

    #[test]
    fn out_of_range_frames_are_none() {
        let animation = two_keys();
        assert!(animation.frame(-1, Interpolation::Linear, false).is_none());
        assert!(animation.frame(11, Interpolation::Bezier, false).is_none());
        assert!(Animation::new().frame(0, Interpolation::Linear, false).is_none());
    }

    #[test]
    fn stale_keyframes_are_dropped() {
        let mut animation = two_keys();
        assert!(!animation.add_key_frame(translated_x(10, 20.0)));
        assert!(!animation.add_key_frame(translated_x(3, 20.0)));
        assert_eq!(animation.keyframes().len(), 2);
        assert_eq!(animation.last_frame_number(), 10);
    }

    #[test]
    fn bezier_two_keys_is_a_straight_blend() {
        let frame = two_keys().frame(5, Interpolation::Bezier, false).unwrap();
        assert_relative_eq!(frame.object_to_world, Mat4::translation(5.0, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn bezier_weights_all_keyframes() {
        let mut animation = two_keys();
        animation.add_key_frame(translated_x(20, 20.0));

        // Weights 1/4, 1/2, 1/4 at the midpoint
        let frame = animation.frame(10, Interpolation::Bezier, false).unwrap();
        assert_relative_eq!(frame.object_to_world, Mat4::translation(10.0, 0.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(frame.object_to_world.get(3, 3), 1.0);
    }

    #[test]
    fn only_translation_keeps_first_keyframe_orientation() {
        let mut animation = Animation::new();
        animation.add_key_frame(identity_at(0));
        animation.add_key_frame(Frame::new(
            Mat4::scaling(3.0) * Mat4::translation(10.0, 0.0, 0.0),
            Mat4::identity(),
            10,
        ));

        let blended = animation.frame(5, Interpolation::Bezier, false).unwrap();
        assert_relative_eq!(blended.object_to_world.get(0, 0), 2.0, epsilon = 1e-12);

        let translated = animation.frame(5, Interpolation::Bezier, true).unwrap();
        assert_relative_eq!(
            translated.object_to_world,
            Mat4::translation(5.0, 0.0, 0.0),
            epsilon = 1e-12
        );
    }

    #[test]
    fn cursor_steps_until_last_frame() {
        let mut animation = two_keys();
        assert_eq!(animation.current_frame().unwrap().frame_num, 0);

        for _ in 0..15 {
            animation.step_to_next_frame(Interpolation::Linear, false);
        }
        assert_eq!(animation.current_frame().unwrap().frame_num, 10);
        assert!(animation.is_finished());

        animation.reset();
        assert_eq!(animation.current_frame().unwrap().frame_num, 0);
        assert!(!animation.is_finished());
    }

    #[test]
    fn speed_change_round_trips_through_normal_speed() {
        let mut animation = two_keys();
        animation.add_key_frame(translated_x(20, 20.0));
        let before: Vec<i32> = animation.keyframes().iter().map(|k| k.frame_num).collect();

        assert!(animation.increase_playback_speed(25.0));
        let faster: Vec<i32> = animation.keyframes().iter().map(|k| k.frame_num).collect();
        assert_eq!(faster, vec![0, 8, 15]);
        assert_eq!(animation.last_frame_number(), 15);

        animation.normal_playback_speed();
        let after: Vec<i32> = animation.keyframes().iter().map(|k| k.frame_num).collect();
        assert_eq!(after, before);
        assert_relative_eq!(animation.speed_factor(), 1.0);
    }

    #[test]
    fn new_keyframes_follow_current_speed() {
        let mut animation = two_keys();
        animation.decrease_playback_speed(100.0);
        assert_eq!(animation.last_frame_number(), 20);

        // Recorded 5 frames after the (scaled) last keyframe
        animation.add_key_frame(translated_x(25, 30.0));
        let key = animation.keyframes()[2];
        assert_eq!(key.original_frame, 15);
        assert_eq!(key.frame_num, 30);
    }

    #[test]
    fn non_positive_speed_is_rejected() {
        let mut animation = two_keys();
        assert!(!animation.increase_playback_speed(100.0));
        assert_relative_eq!(animation.speed_factor(), 1.0);
        assert_eq!(animation.last_frame_number(), 10);
    }

    #[test]
    fn keyframe_navigation() {
        let mut animation = two_keys();
        animation.add_key_frame(translated_x(20, 20.0));

        animation.to_next_keyframe();
        assert_eq!(animation.current_frame().unwrap().frame_num, 10);
        animation.to_last_keyframe();
        animation.to_next_keyframe();
        assert_eq!(animation.current_frame().unwrap().frame_num, 20);
        animation.to_previous_keyframe();
        assert_eq!(animation.current_frame().unwrap().frame_num, 10);
        animation.to_first_keyframe();
        assert_eq!(animation.current_frame().unwrap().frame_num, 0);
    }

    #[test]
    fn clear_resets_everything() {
        let mut animation = two_keys();
        animation.increase_playback_speed(10.0);
        animation.clear();
        assert!(animation.is_empty());
        assert!(animation.current_frame().is_none());
        assert_eq!(animation.last_frame_number(), -1);
        assert_relative_eq!(animation.speed_factor(), 1.0);
    }
}
