//! Broadside aim curve shown while the player is in attack mode.
//!
//! Control points live in the player ship's local frame. The last point is
//! steered by camera movement: yaw swings it around the second-last point
//! and looking down shortens the final segment.

use glam::{Quat, Vec3};

use broadside_core::constants::{
    AIM_MIN_REACH, AIM_POLAR_SCALE, AIM_PREVIEW_SEGMENTS, SHOT_EXTENSION_POINTS,
};
use broadside_core::enums::AimSide;

use crate::curve::CatmullRomCurve;

#[derive(Debug, Clone)]
pub struct AimCurve {
    side: AimSide,
    points: Vec<Vec3>,
    preview: Vec<Vec3>,
    /// Camera azimuth and polar angle seen by the previous update.
    last_view: Option<(f32, f32)>,
}

impl AimCurve {
    /// Starting curve for a broadside on `side`.
    pub fn preset(side: AimSide) -> Self {
        let reach = match side {
            AimSide::Left => 1.0,
            AimSide::Right => -1.0,
        };
        let points = vec![
            Vec3::ZERO,
            Vec3::new(0.0, 10.0, 10.0 * reach),
            Vec3::new(-5.0, 0.0, 20.0 * reach),
        ];
        let mut curve = Self {
            side,
            points,
            preview: Vec::new(),
            last_view: None,
        };
        curve.rebuild();
        curve
    }

    pub fn side(&self) -> AimSide {
        self.side
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    /// Preview polyline in ship-local space.
    pub fn preview(&self) -> &[Vec3] {
        &self.preview
    }

    pub fn set_points(&mut self, points: Vec<Vec3>) {
        self.points = points;
        self.rebuild();
    }

    /// Follow the camera. The first call only records the starting view.
    pub fn update(&mut self, azimuth: f32, polar: f32) {
        let (last_azimuth, last_polar) = self.last_view.unwrap_or((azimuth, polar));
        self.last_view = Some((azimuth, polar));

        let n = self.points.len();
        if n < 2 {
            return;
        }
        let pivot = self.points[n - 2];
        let reach = (1.0 - (polar - last_polar) * AIM_POLAR_SCALE).max(AIM_MIN_REACH);
        let relative = Quat::from_rotation_y(azimuth - last_azimuth) * (self.points[n - 1] - pivot);
        self.points[n - 1] = pivot + relative * reach;
        self.rebuild();
    }

    /// Control points continued past the end along the exit direction.
    /// Each extra point adds one more final-segment length.
    pub fn extended_points(&self) -> Vec<Vec3> {
        let mut points = self.points.clone();
        let n = points.len();
        if n < 2 {
            return points;
        }
        let last = points[n - 1];
        let exit = last - points[n - 2];
        let step = exit.length();
        let direction = exit.normalize_or_zero();
        points.extend((1..=SHOT_EXTENSION_POINTS).map(|i| last + direction * step * i as f32));
        points
    }

    fn rebuild(&mut self) {
        self.preview = CatmullRomCurve::new(self.points.clone())
            .map(|curve| curve.sample(AIM_PREVIEW_SEGMENTS))
            .unwrap_or_default();
    }
}
