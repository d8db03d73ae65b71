use std::collections::BTreeMap;

use foundation::math::Vec3;
use tracing::debug;

use crate::engine::RenderEngine;
use crate::path_point::{PathPoint, PathPointError, PathPointStyle};

/// Path markers keyed by segment index.
#[derive(Debug, Default)]
pub struct PathLayer {
    points: BTreeMap<usize, PathPoint>,
}

impl PathLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, segment: usize) -> Option<&PathPoint> {
        self.points.get(&segment)
    }

    /// Segment indices in ascending order.
    pub fn segments(&self) -> impl Iterator<Item = usize> + '_ {
        self.points.keys().copied()
    }

    /// Create a marker for `segment`, disposing any marker already there.
    pub fn insert_segment<E: RenderEngine + ?Sized>(
        &mut self,
        engine: &mut E,
        segment: usize,
        position: Vec3,
        style: PathPointStyle,
    ) -> Result<(), PathPointError> {
        let point = PathPoint::with_style(engine, position, style)?;
        if let Some(mut old) = self.points.insert(segment, point) {
            old.dispose(engine);
        }
        Ok(())
    }

    pub fn move_segment<E: RenderEngine + ?Sized>(
        &mut self,
        engine: &mut E,
        segment: usize,
        position: Vec3,
    ) -> Result<bool, PathPointError> {
        let Some(point) = self.points.get_mut(&segment) else {
            return Ok(false);
        };
        point.set_position(engine, position)?;
        Ok(true)
    }

    /// Returns `false` when no marker exists for `segment`.
    pub fn remove_segment<E: RenderEngine + ?Sized>(
        &mut self,
        engine: &mut E,
        segment: usize,
    ) -> bool {
        match self.points.remove(&segment) {
            Some(mut point) => {
                point.dispose(engine);
                true
            }
            None => false,
        }
    }

    /// Replace the whole path with one marker per position.
    pub fn draw<E: RenderEngine + ?Sized>(
        &mut self,
        engine: &mut E,
        positions: &[Vec3],
        style: PathPointStyle,
    ) -> Result<(), PathPointError> {
        self.clear(engine);
        for (segment, position) in positions.iter().enumerate() {
            self.insert_segment(engine, segment, *position, style)?;
        }
        Ok(())
    }

    /// Dispose every marker. Returns how many were removed.
    pub fn clear<E: RenderEngine + ?Sized>(&mut self, engine: &mut E) -> usize {
        let removed = self.points.len();
        for (_, mut point) in std::mem::take(&mut self.points) {
            point.dispose(engine);
        }
        if removed > 0 {
            debug!(removed, "cleared path markers");
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::PathLayer;
    use crate::path_point::PathPointStyle;
    use crate::recording::RecordingEngine;
    use foundation::math::Vec3;

    #[test]
    fn replacing_a_segment_disposes_the_old_marker() {
        let mut engine = RecordingEngine::new("#viewer");
        let mut layer = PathLayer::new();
        let style = PathPointStyle::default();
        layer.insert_segment(&mut engine, 0, Vec3::ZERO, style).unwrap();
        layer
            .insert_segment(&mut engine, 0, Vec3::new(1.0, 0.0, 0.0), style)
            .unwrap();

        assert_eq!(layer.len(), 1);
        assert_eq!(engine.live_meshes(), 1);
        assert_eq!(
            layer.get(0).unwrap().position(),
            Ok(Vec3::new(1.0, 0.0, 0.0))
        );
        layer.clear(&mut engine);
    }

    #[test]
    fn remove_and_clear_release_everything() {
        let mut engine = RecordingEngine::new("#viewer");
        let mut layer = PathLayer::new();
        let path = [Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0)];
        layer.draw(&mut engine, &path, PathPointStyle::default()).unwrap();
        assert_eq!(layer.segments().collect::<Vec<_>>(), vec![0, 1, 2]);

        assert!(layer.remove_segment(&mut engine, 1));
        assert!(!layer.remove_segment(&mut engine, 1));
        assert_eq!(engine.live_meshes(), 2);

        assert!(layer.move_segment(&mut engine, 2, Vec3::new(5.0, 0.0, 0.0)).unwrap());
        assert!(!layer.move_segment(&mut engine, 9, Vec3::ZERO).unwrap());

        assert_eq!(layer.clear(&mut engine), 2);
        assert!(layer.is_empty());
        assert_eq!(engine.live_geometries(), 0);
        assert_eq!(engine.live_materials(), 0);
        assert_eq!(engine.live_meshes(), 0);
        assert_eq!(engine.invalid_disposals(), 0);
    }
}
