use egui::Pos2;
use serde::{Deserialize, Serialize};

use crate::brush::{BrushMode, BrushModel};
use crate::canvas::Canvas;
use crate::error::CanvasResult;

/// A primary-button pointer event, in buffer coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    /// Button was pressed
    PointerDown { position: Pos2 },
    /// Pointer moved, with or without the button held
    PointerMove { position: Pos2 },
    /// Button was released
    PointerUp { position: Pos2 },
}

impl InputEvent {
    pub fn position(&self) -> Pos2 {
        match self {
            InputEvent::PointerDown { position }
            | InputEvent::PointerMove { position }
            | InputEvent::PointerUp { position } => *position,
        }
    }
}

impl Canvas {
    /// Route a pointer event to the matching handler
    ///
    /// Returns the status line to show after the event.
    pub fn handle_input(&mut self, event: &InputEvent, brush: &BrushModel) -> CanvasResult<String> {
        match *event {
            InputEvent::PointerDown { position } => self.pointer_down(position, brush),
            InputEvent::PointerMove { position } => self.pointer_move(position, brush),
            InputEvent::PointerUp { position } => self.pointer_up(position, brush),
        }
    }

    /// Checkpoint the canvas and put the brush down. A freehand brush leaves a dot.
    pub fn pointer_down(&mut self, position: Pos2, brush: &BrushModel) -> CanvasResult<String> {
        self.snapshot();
        self.begin_gesture(position);
        if brush.mode() == BrushMode::Freehand {
            self.extend(position, brush)?;
        }
        Ok(self.status())
    }

    /// Extend the gesture. Moves without the brush down are ignored.
    pub fn pointer_move(&mut self, position: Pos2, brush: &BrushModel) -> CanvasResult<String> {
        if self.is_drawing() {
            self.extend(position, brush)?;
        }
        Ok(self.status())
    }

    /// Commit a straight line if one is in progress, then lift the brush
    pub fn pointer_up(&mut self, position: Pos2, brush: &BrushModel) -> CanvasResult<String> {
        if self.is_drawing() && brush.mode() == BrushMode::StraightLine {
            self.commit(position, brush)?;
        }
        self.end_gesture();
        Ok(self.status())
    }
}
