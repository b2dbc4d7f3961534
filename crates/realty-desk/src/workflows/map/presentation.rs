use serde::{Deserialize, Serialize};

pub const MOBILE_BREAKPOINT_PX: u32 = 768;
pub const DISMISS_DISTANCE_PX: f64 = 120.0;
pub const DISMISS_VELOCITY_PX_PER_MS: f64 = 0.5;

/// How the selected listing's card is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresentationMode {
    /// Full-width sheet sliding up from the bottom edge.
    BottomSheet,
    /// Floating card pinned next to the map marker.
    AnchoredCard,
}

impl PresentationMode {
    pub const fn for_viewport_width(width_px: u32) -> Self {
        if width_px < MOBILE_BREAKPOINT_PX {
            PresentationMode::BottomSheet
        } else {
            PresentationMode::AnchoredCard
        }
    }

    /// Only the anchored card follows the map projection.
    pub const fn needs_anchor(self) -> bool {
        matches!(self, PresentationMode::AnchoredCard)
    }
}

/// Finished drag gesture on a bottom sheet. Positive values point down.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SheetDrag {
    pub distance_px: f64,
    pub duration_ms: f64,
}

impl SheetDrag {
    pub fn velocity_px_per_ms(&self) -> f64 {
        if self.duration_ms > 0.0 {
            self.distance_px / self.duration_ms
        } else {
            0.0
        }
    }

    pub fn should_dismiss(&self) -> bool {
        self.distance_px > DISMISS_DISTANCE_PX
            || self.velocity_px_per_ms() > DISMISS_VELOCITY_PX_PER_MS
    }
}
