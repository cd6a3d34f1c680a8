use egui::Pos2;
use std::fmt;

/// Where the canvas is within a pointer gesture
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum StrokeState {
    #[default]
    Idle,
    Gesturing {
        /// Where the gesture started
        anchor: Pos2,
        /// The most recent point drawn to
        last: Pos2,
        /// Whether an uncommitted preview is currently visible
        has_preview: bool,
    },
}

impl StrokeState {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Gesturing { .. })
    }

    /// Only ever true while gesturing
    pub fn has_preview(&self) -> bool {
        matches!(self, Self::Gesturing { has_preview: true, .. })
    }

    pub fn anchor(&self) -> Option<Pos2> {
        match self {
            Self::Gesturing { anchor, .. } => Some(*anchor),
            Self::Idle => None,
        }
    }

    pub fn last(&self) -> Option<Pos2> {
        match self {
            Self::Gesturing { last, .. } => Some(*last),
            Self::Idle => None,
        }
    }

    pub(crate) fn begin(&mut self, point: Pos2) {
        *self = Self::Gesturing {
            anchor: point,
            last: point,
            has_preview: false,
        };
    }

    pub(crate) fn set_last(&mut self, point: Pos2) {
        if let Self::Gesturing { last, .. } = self {
            *last = point;
        }
    }

    pub(crate) fn set_preview(&mut self, visible: bool) {
        if let Self::Gesturing { has_preview, .. } = self {
            *has_preview = visible;
        }
    }

    pub(crate) fn end(&mut self) {
        *self = Self::Idle;
    }
}

/// The status line shown to the user, recomputed from the current state
impl fmt::Display for StrokeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Ready..."),
            Self::Gesturing {
                anchor,
                last,
                has_preview: true,
            } => write!(
                f,
                "Drawing a preview from {}, {} to {}, {}",
                anchor.x.round() as i32,
                anchor.y.round() as i32,
                last.x.round() as i32,
                last.y.round() as i32
            ),
            Self::Gesturing { last, .. } => write!(
                f,
                "Drawing at {}, {}",
                last.x.round() as i32,
                last.y.round() as i32
            ),
        }
    }
}
