use glam::Quat;
use once_cell::sync::Lazy;

/// Orientations of the gridline meshes on the three background planes.
///
/// Each plane has a regular and a flipped variant, used when the camera
/// looks at the plane from the other side.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLineRotations {
    pub floor: Quat,
    pub floor_flipped: Quat,
    pub side_wall: Quat,
    pub side_wall_flipped: Quat,
    pub back_wall: Quat,
    pub back_wall_flipped: Quat,
}

static GRID_LINE_ROTATIONS: Lazy<GridLineRotations> = Lazy::new(|| {
    let degrees = |x: f32, y: f32, z: f32| {
        Quat::from_euler(
            glam::EulerRot::YXZ,
            y.to_radians(),
            x.to_radians(),
            z.to_radians(),
        )
    };
    GridLineRotations {
        floor: degrees(90.0, 0.0, 0.0),
        floor_flipped: degrees(90.0, 0.0, 180.0),
        side_wall: degrees(0.0, 90.0, 0.0),
        side_wall_flipped: degrees(0.0, -90.0, 0.0),
        back_wall: Quat::IDENTITY,
        back_wall_flipped: degrees(0.0, 180.0, 0.0),
    }
});

impl GridLineRotations {
    /// Process-wide table, computed on first use.
    #[must_use]
    pub fn get() -> &'static Self {
        &GRID_LINE_ROTATIONS
    }
}
