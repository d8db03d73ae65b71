use foundation::Rgb;
use foundation::math::Vec3;
use tracing::warn;

use crate::engine::{
    GeometryDesc, GeometryHandle, MaterialDesc, MaterialHandle, MeshHandle, RenderEngine,
};

pub const DEFAULT_POINT_RADIUS: f64 = 0.3;
pub const DEFAULT_POINT_HEIGHT: f64 = 0.05;
pub const DEFAULT_POINT_COLOR: Rgb = Rgb::from_hex(0x1e90ff);

#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum PathPointError {
    #[error("path point was already disposed")]
    Disposed,
    #[error("invalid path point {field}: {value}")]
    InvalidParameter { field: &'static str, value: f64 },
    #[error("invalid path point position: {0:?}")]
    InvalidPosition(Vec3),
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PathPointStyle {
    pub radius: f64,
    pub height: f64,
    pub color: Rgb,
}

impl Default for PathPointStyle {
    fn default() -> Self {
        Self {
            radius: DEFAULT_POINT_RADIUS,
            height: DEFAULT_POINT_HEIGHT,
            color: DEFAULT_POINT_COLOR,
        }
    }
}

impl PathPointStyle {
    fn validate(&self) -> Result<(), PathPointError> {
        for (field, value) in [("radius", self.radius), ("height", self.height)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(PathPointError::InvalidParameter { field, value });
            }
        }
        Ok(())
    }
}

/// Renderer-side objects owned by one path point.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PathPointResources {
    pub geometry: GeometryHandle,
    pub material: MaterialHandle,
    pub mesh: MeshHandle,
}

/// Cylindrical marker drawn at one path segment.
///
/// The point owns its geometry, material and mesh until [`PathPoint::dispose`]
/// is called. Disposal is idempotent; after it, every accessor returns
/// [`PathPointError::Disposed`].
#[derive(Debug)]
pub struct PathPoint {
    position: Vec3,
    style: PathPointStyle,
    resources: Option<PathPointResources>,
}

impl PathPoint {
    pub fn create<E: RenderEngine + ?Sized>(
        engine: &mut E,
        position: Vec3,
        radius: f64,
        height: f64,
        color: Rgb,
    ) -> Result<Self, PathPointError> {
        Self::with_style(
            engine,
            position,
            PathPointStyle {
                radius,
                height,
                color,
            },
        )
    }

    pub fn with_style<E: RenderEngine + ?Sized>(
        engine: &mut E,
        position: Vec3,
        style: PathPointStyle,
    ) -> Result<Self, PathPointError> {
        style.validate()?;
        if !position.is_finite() {
            return Err(PathPointError::InvalidPosition(position));
        }

        let geometry = engine.create_geometry(GeometryDesc::Cylinder {
            radius: style.radius,
            height: style.height,
        });
        let material = engine.create_material(MaterialDesc::Basic { color: style.color });
        let mesh = engine.create_mesh(geometry, material, position);

        Ok(Self {
            position,
            style,
            resources: Some(PathPointResources {
                geometry,
                material,
                mesh,
            }),
        })
    }

    pub fn is_disposed(&self) -> bool {
        self.resources.is_none()
    }

    pub fn position(&self) -> Result<Vec3, PathPointError> {
        self.live()?;
        Ok(self.position)
    }

    pub fn style(&self) -> Result<PathPointStyle, PathPointError> {
        self.live()?;
        Ok(self.style)
    }

    pub fn handles(&self) -> Result<PathPointResources, PathPointError> {
        self.live()
    }

    pub fn set_position<E: RenderEngine + ?Sized>(
        &mut self,
        engine: &mut E,
        position: Vec3,
    ) -> Result<(), PathPointError> {
        let resources = self.live()?;
        if !position.is_finite() {
            return Err(PathPointError::InvalidPosition(position));
        }
        engine.set_mesh_position(resources.mesh, position);
        self.position = position;
        Ok(())
    }

    /// Release the owned engine objects.
    ///
    /// Returns `true` if this call released them, `false` if the point was
    /// already disposed.
    pub fn dispose<E: RenderEngine + ?Sized>(&mut self, engine: &mut E) -> bool {
        let Some(resources) = self.resources.take() else {
            return false;
        };
        engine.dispose_mesh(resources.mesh);
        engine.dispose_geometry(resources.geometry);
        engine.dispose_material(resources.material);
        true
    }

    fn live(&self) -> Result<PathPointResources, PathPointError> {
        self.resources.ok_or(PathPointError::Disposed)
    }
}

impl Drop for PathPoint {
    fn drop(&mut self) {
        if let Some(resources) = self.resources {
            warn!(
                mesh = %resources.mesh.0,
                "path point dropped without dispose; engine objects leaked"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{PathPoint, PathPointError};
    use crate::recording::RecordingEngine;
    use foundation::Rgb;
    use foundation::math::Vec3;

    #[test]
    fn create_allocates_and_dispose_releases_once() {
        let mut engine = RecordingEngine::new("#viewer");
        let mut point =
            PathPoint::create(&mut engine, Vec3::new(1.0, 0.0, 2.0), 0.5, 0.1, Rgb::from_hex(0xff0000))
                .unwrap();
        assert_eq!(engine.live_geometries(), 1);
        assert_eq!(engine.live_materials(), 1);
        assert_eq!(engine.live_meshes(), 1);

        assert!(point.dispose(&mut engine));
        assert!(!point.dispose(&mut engine));

        assert_eq!(engine.live_geometries(), 0);
        assert_eq!(engine.live_materials(), 0);
        assert_eq!(engine.live_meshes(), 0);
        assert_eq!(engine.disposals(), 3);
        assert_eq!(engine.invalid_disposals(), 0);
    }

    #[test]
    fn disposed_point_refuses_reads_and_moves() {
        let mut engine = RecordingEngine::new("#viewer");
        let mut point =
            PathPoint::create(&mut engine, Vec3::ZERO, 0.5, 0.1, Rgb::new(0, 0, 0)).unwrap();
        point.set_position(&mut engine, Vec3::new(0.0, 1.0, 0.0)).unwrap();
        assert_eq!(point.position(), Ok(Vec3::new(0.0, 1.0, 0.0)));

        point.dispose(&mut engine);
        assert!(point.is_disposed());
        assert_eq!(point.position(), Err(PathPointError::Disposed));
        assert_eq!(point.handles(), Err(PathPointError::Disposed));
        assert_eq!(
            point.set_position(&mut engine, Vec3::ZERO),
            Err(PathPointError::Disposed)
        );
    }

    #[test]
    fn rejects_degenerate_markers() {
        let mut engine = RecordingEngine::new("#viewer");
        let err = PathPoint::create(&mut engine, Vec3::ZERO, 0.0, 0.1, Rgb::new(0, 0, 0))
            .unwrap_err();
        assert!(matches!(
            err,
            PathPointError::InvalidParameter { field: "radius", .. }
        ));
        assert_eq!(engine.live_geometries(), 0);
    }

    #[test]
    fn rejects_non_finite_positions() {
        let mut engine = RecordingEngine::new("#viewer");
        let far = Vec3::new(f64::INFINITY, 0.0, 0.0);
        let err = PathPoint::create(&mut engine, far, 0.5, 0.1, Rgb::new(0, 0, 0)).unwrap_err();
        assert_eq!(err, PathPointError::InvalidPosition(far));
        assert_eq!(engine.live_meshes(), 0);

        let mut point =
            PathPoint::create(&mut engine, Vec3::ZERO, 0.5, 0.1, Rgb::new(0, 0, 0)).unwrap();
        assert_eq!(
            point.set_position(&mut engine, far),
            Err(PathPointError::InvalidPosition(far))
        );
        assert_eq!(point.position(), Ok(Vec3::ZERO));
        assert_eq!(engine.mesh_position(point.handles().unwrap().mesh), Some(Vec3::ZERO));
        point.dispose(&mut engine);
    }
}
