use std::f64::consts::PI;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

const TILE_SIZE: f64 = 256.0;
const MAX_SIN_LATITUDE: f64 = 0.9999;

/// Card placement relative to its pin: up and to the right.
pub const CARD_OFFSET: PixelOffset = PixelOffset { dx: 16.0, dy: -24.0 };

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// Visible geographic rectangle of the map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl Bounds {
    pub fn contains(&self, point: LatLng) -> bool {
        let within_lat = point.lat <= self.north && point.lat >= self.south;
        let within_lng = if self.west <= self.east {
            point.lng >= self.west && point.lng <= self.east
        } else {
            // viewport straddles the antimeridian
            point.lng >= self.west || point.lng <= self.east
        };
        within_lat && within_lng
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportState {
    pub bounds: Bounds,
    pub zoom: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pixel {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelOffset {
    pub dx: f64,
    pub dy: f64,
}

/// Page coordinates of an overlay anchor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenPosition {
    pub left: f64,
    pub top: f64,
}

/// Coordinate-to-pixel conversion supplied by the mapping provider.
pub trait MapProjection: Send + Sync {
    /// Position in the provider's global pixel space at `zoom`, if the coordinate is drawable.
    fn to_global_pixels(&self, coord: LatLng, zoom: f64) -> Option<Pixel>;
}

/// Spherical Mercator with 256px tiles, the projection used by common web map providers.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebMercator;

impl MapProjection for WebMercator {
    fn to_global_pixels(&self, coord: LatLng, zoom: f64) -> Option<Pixel> {
        if !coord.is_valid() || !zoom.is_finite() || zoom < 0.0 {
            return None;
        }

        let scale = TILE_SIZE * 2f64.powf(zoom);
        let sin_lat = (coord.lat * PI / 180.0)
            .sin()
            .clamp(-MAX_SIN_LATITUDE, MAX_SIN_LATITUDE);

        let x = (coord.lng + 180.0) / 360.0 * scale;
        let y = (0.5 - ((1.0 + sin_lat) / (1.0 - sin_lat)).ln() / (4.0 * PI)) * scale;

        Some(Pixel { x, y })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContainerSize {
    pub width: f64,
    pub height: f64,
}

/// Snapshot of a live map instance: what it shows and where its container sits on the page.
#[derive(Clone)]
pub struct MapView {
    projection: Option<Arc<dyn MapProjection>>,
    pub center: LatLng,
    pub zoom: f64,
    pub size: ContainerSize,
    /// Page coordinates of the container's top-left corner.
    pub container_origin: Pixel,
}

impl std::fmt::Debug for MapView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapView")
            .field("projection_loaded", &self.projection.is_some())
            .field("center", &self.center)
            .field("zoom", &self.zoom)
            .field("size", &self.size)
            .field("container_origin", &self.container_origin)
            .finish()
    }
}

impl MapView {
    pub fn new(
        projection: Arc<dyn MapProjection>,
        center: LatLng,
        zoom: f64,
        size: ContainerSize,
        container_origin: Pixel,
    ) -> Self {
        Self {
            projection: Some(projection),
            center,
            zoom,
            size,
            container_origin,
        }
    }

    /// Map whose provider script has not finished loading its projection yet.
    pub fn without_projection(
        center: LatLng,
        zoom: f64,
        size: ContainerSize,
        container_origin: Pixel,
    ) -> Self {
        Self {
            projection: None,
            center,
            zoom,
            size,
            container_origin,
        }
    }

    pub fn set_center(&mut self, center: LatLng, zoom: f64) {
        self.center = center;
        self.zoom = zoom;
    }

    pub fn resize(&mut self, size: ContainerSize, container_origin: Pixel) {
        self.size = size;
        self.container_origin = container_origin;
    }

    fn to_page(&self, coord: LatLng) -> Result<Pixel, GeoCapabilityError> {
        let projection = self
            .projection
            .as_ref()
            .ok_or(GeoCapabilityError::MissingProjection)?;

        let center = projection
            .to_global_pixels(self.center, self.zoom)
            .ok_or(GeoCapabilityError::InvalidCoordinate(self.center))?;
        let point = projection
            .to_global_pixels(coord, self.zoom)
            .ok_or(GeoCapabilityError::InvalidCoordinate(coord))?;

        let top_left_x = center.x - self.size.width / 2.0;
        let top_left_y = center.y - self.size.height / 2.0;

        Ok(Pixel {
            x: point.x - top_left_x + self.container_origin.x,
            y: point.y - top_left_y + self.container_origin.y,
        })
    }
}

/// Reasons a map overlay cannot be placed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeoCapabilityError {
    #[error("map instance not available")]
    MissingMap,
    #[error("map projection not loaded")]
    MissingProjection,
    #[error("no coordinate to project")]
    MissingCoordinate,
    #[error("coordinate {0:?} cannot be projected")]
    InvalidCoordinate(LatLng),
}

/// Converts a geographic coordinate into page pixels for anchoring an overlay.
pub fn try_project_to_screen(
    map: Option<&MapView>,
    coord: Option<LatLng>,
    offset: PixelOffset,
) -> Result<ScreenPosition, GeoCapabilityError> {
    let map = map.ok_or(GeoCapabilityError::MissingMap)?;
    let coord = coord.ok_or(GeoCapabilityError::MissingCoordinate)?;
    let page = map.to_page(coord)?;

    Ok(ScreenPosition {
        left: page.x + offset.dx,
        top: page.y + offset.dy,
    })
}

/// Like [`try_project_to_screen`], but any failure hides the overlay and is only logged.
pub fn project_to_screen(
    map: Option<&MapView>,
    coord: Option<LatLng>,
    offset: PixelOffset,
) -> Option<ScreenPosition> {
    match try_project_to_screen(map, coord, offset) {
        Ok(position) => Some(position),
        Err(err) => {
            warn!(error = %err, "map overlay hidden");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(center: LatLng, zoom: f64) -> MapView {
        MapView::new(
            Arc::new(WebMercator),
            center,
            zoom,
            ContainerSize {
                width: 800.0,
                height: 600.0,
            },
            Pixel { x: 100.0, y: 50.0 },
        )
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn mercator_places_origin_at_world_center() {
        let pixel = WebMercator
            .to_global_pixels(LatLng::new(0.0, 0.0), 0.0)
            .expect("projectable");
        assert!(close(pixel.x, 128.0));
        assert!(close(pixel.y, 128.0));

        let zoomed = WebMercator
            .to_global_pixels(LatLng::new(0.0, 0.0), 1.0)
            .expect("projectable");
        assert!(close(zoomed.x, 256.0));
    }

    #[test]
    fn mercator_rejects_out_of_range_coordinates() {
        assert!(WebMercator
            .to_global_pixels(LatLng::new(91.0, 0.0), 3.0)
            .is_none());
        assert!(WebMercator
            .to_global_pixels(LatLng::new(f64::NAN, 0.0), 3.0)
            .is_none());
    }

    #[test]
    fn center_projects_to_container_middle_plus_offset() {
        let center = LatLng::new(42.8746, 74.5698);
        let position = project_to_screen(
            Some(&view(center, 12.0)),
            Some(center),
            PixelOffset { dx: 16.0, dy: -24.0 },
        )
        .expect("projectable");

        assert!(close(position.left, 100.0 + 400.0 + 16.0));
        assert!(close(position.top, 50.0 + 300.0 - 24.0));
    }

    #[test]
    fn points_east_and_north_move_right_and_up() {
        let center = LatLng::new(42.8746, 74.5698);
        let map = view(center, 14.0);
        let origin = project_to_screen(Some(&map), Some(center), CARD_OFFSET).expect("center");
        let north_east = project_to_screen(
            Some(&map),
            Some(LatLng::new(42.88, 74.58)),
            CARD_OFFSET,
        )
        .expect("nearby point");

        assert!(north_east.left > origin.left);
        assert!(north_east.top < origin.top);
    }

    #[test]
    fn missing_inputs_hide_the_overlay() {
        let center = LatLng::new(42.8746, 74.5698);
        assert!(project_to_screen(None, Some(center), CARD_OFFSET).is_none());
        assert!(project_to_screen(Some(&view(center, 12.0)), None, CARD_OFFSET).is_none());
        assert_eq!(
            try_project_to_screen(None, None, CARD_OFFSET),
            Err(GeoCapabilityError::MissingMap)
        );
    }

    #[test]
    fn unloaded_projection_hides_the_overlay() {
        let center = LatLng::new(42.8746, 74.5698);
        let map = MapView::without_projection(
            center,
            12.0,
            ContainerSize {
                width: 800.0,
                height: 600.0,
            },
            Pixel { x: 0.0, y: 0.0 },
        );
        assert_eq!(
            try_project_to_screen(Some(&map), Some(center), CARD_OFFSET),
            Err(GeoCapabilityError::MissingProjection)
        );
        assert!(project_to_screen(Some(&map), Some(center), CARD_OFFSET).is_none());
    }

    #[test]
    fn resize_shifts_the_anchor() {
        let center = LatLng::new(42.8746, 74.5698);
        let mut map = view(center, 12.0);
        let before = project_to_screen(Some(&map), Some(center), CARD_OFFSET).expect("anchor");

        map.resize(
            ContainerSize {
                width: 400.0,
                height: 600.0,
            },
            Pixel { x: 100.0, y: 50.0 },
        );
        let after = project_to_screen(Some(&map), Some(center), CARD_OFFSET).expect("anchor");

        assert!(close(before.left - after.left, 200.0));
        assert!(close(before.top, after.top));
    }

    #[test]
    fn bounds_handle_the_antimeridian() {
        let bounds = Bounds {
            north: 10.0,
            south: -10.0,
            east: -170.0,
            west: 170.0,
        };
        assert!(bounds.contains(LatLng::new(0.0, 175.0)));
        assert!(bounds.contains(LatLng::new(0.0, -175.0)));
        assert!(!bounds.contains(LatLng::new(0.0, 0.0)));
    }
}
