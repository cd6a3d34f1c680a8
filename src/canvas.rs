//! The drawing engine: one open document's pixels, gesture state and undo history.
//!
//! Freehand gestures commit every segment as the pointer moves. Straight-line
//! gestures draw a thin preview on every move and replace it with the real line
//! on commit. The preview is backed by a single dedicated copy of the clean
//! buffer, so preview churn never consumes undo checkpoints.
//!
//! A gesture is expected to be preceded by [`Canvas::snapshot`], which makes the
//! whole gesture undoable in one step.

use std::path::Path;

use egui::{Color32, Pos2};
use image::ImageFormat;
use uuid::Uuid;

use crate::brush::{BrushMode, BrushModel};
use crate::buffer::{format_for_path, PixelBuffer, Size};
use crate::config::CanvasConfig;
use crate::error::{CanvasError, CanvasResult};
use crate::history::History;
use crate::stroke::StrokeState;

/// A single open document.
#[derive(Debug, Clone)]
pub struct Canvas {
    id: Uuid,
    /// Logical size the buffer is fitted into
    size: Size,
    background: Color32,
    image: PixelBuffer,
    state: StrokeState,
    history: History,
    /// Clean copy of the buffer taken before the live preview was drawn
    preview_backing: Option<PixelBuffer>,
    saved: bool,
}

impl Canvas {
    /// Create a blank white canvas with the default history limit
    pub fn new(size: Size) -> Self {
        let config = CanvasConfig::default();
        Self::build(size, config.background, History::new(config.history_limit))
    }

    pub fn with_config(config: &CanvasConfig) -> CanvasResult<Self> {
        Ok(Self::build(
            config.size()?,
            config.background,
            History::new(config.history_limit),
        ))
    }

    fn build(size: Size, background: Color32, history: History) -> Self {
        let id = Uuid::new_v4();
        log::info!("Created canvas {} ({})", id, size);
        Self {
            id,
            size,
            background,
            image: PixelBuffer::new(size, background),
            state: StrokeState::Idle,
            history,
            preview_backing: None,
            saved: false,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The logical size the buffer is fitted into
    pub fn size(&self) -> Size {
        self.size
    }

    /// The pixels to render this frame, including any live preview
    pub fn image(&self) -> &PixelBuffer {
        &self.image
    }

    /// The pixels without any live preview
    pub fn committed_image(&self) -> &PixelBuffer {
        self.preview_backing.as_ref().unwrap_or(&self.image)
    }

    pub fn state(&self) -> &StrokeState {
        &self.state
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    /// Human readable description of what the canvas is doing
    pub fn status(&self) -> String {
        self.state.to_string()
    }

    pub fn is_drawing(&self) -> bool {
        self.state.is_active()
    }

    /// True whenever there is something to undo
    pub fn is_edited(&self) -> bool {
        !self.history.is_empty()
    }

    /// True only between a successful save and the next change to the pixels
    pub fn is_saved(&self) -> bool {
        self.saved
    }

    /// Whether closing the document would lose work
    pub fn has_unsaved_changes(&self) -> bool {
        self.is_edited() && !self.saved
    }

    /// Push a checkpoint of the committed pixels onto the history
    pub fn snapshot(&mut self) {
        let checkpoint = self.committed_image().clone();
        self.history.push(checkpoint);
        log::debug!("Checkpoint stored ({} in history)", self.history.len());
    }

    /// Undo the last checkpointed change. Does nothing when there is nothing to undo.
    ///
    /// A live preview is removed first; an active gesture keeps going from the
    /// restored pixels.
    pub fn undo(&mut self) {
        self.revert_preview();
        if self.undo_once() {
            log::debug!("Undo ({} left in history)", self.history.len());
        } else {
            log::debug!("Nothing to undo");
        }
    }

    fn undo_once(&mut self) -> bool {
        match self.history.pop() {
            Some(checkpoint) => {
                // The canvas may have been resized since the checkpoint was taken
                self.image = checkpoint.scaled_to(self.size);
                self.touch();
                true
            }
            None => false,
        }
    }

    /// Put the brush on the canvas at `point`.
    ///
    /// Starting over while a gesture is active ends the old gesture first.
    pub fn begin_gesture(&mut self, point: Pos2) {
        if self.state.is_active() {
            log::warn!("Gesture started while another was active, ending it");
            self.end_gesture();
        }
        self.state.begin(point);
        log::debug!("Gesture started at {:?}", point);
    }

    /// Continue the active gesture to `point`.
    ///
    /// Freehand brushes commit a segment from the last point straight away.
    /// Straight-line brushes replace the preview with a new one from the anchor.
    pub fn extend(&mut self, point: Pos2, brush: &BrushModel) -> CanvasResult<()> {
        let (anchor, last) = self.gesture_points("extend")?;

        match brush.mode() {
            BrushMode::Freehand => {
                // A line preview left over from a mode switch must not hide this segment
                self.revert_preview();
                self.image.stroke_line(last, point, &brush.main_pen());
                self.touch();
            }
            BrushMode::StraightLine => {
                match &self.preview_backing {
                    Some(backing) => self.image.clone_from(backing),
                    None => self.preview_backing = Some(self.image.clone()),
                }
                self.image.stroke_line(anchor, point, &brush.preview_pen());
                self.state.set_preview(true);
            }
        }

        self.state.set_last(point);
        Ok(())
    }

    /// Draw the final line from the anchor to `point` with the main pen,
    /// replacing any preview. No checkpoint is pushed.
    pub fn commit(&mut self, point: Pos2, brush: &BrushModel) -> CanvasResult<()> {
        let (anchor, _) = self.gesture_points("commit")?;

        self.revert_preview();
        self.image.stroke_line(anchor, point, &brush.main_pen());
        self.state.set_last(point);
        self.touch();
        log::debug!("Committed line {:?} -> {:?}", anchor, point);
        Ok(())
    }

    /// Take the brush off the canvas. A preview that was never committed is erased.
    pub fn end_gesture(&mut self) {
        if !self.state.is_active() {
            return;
        }
        if self.state.has_preview() {
            log::debug!("Gesture ended without commit, discarding preview");
        }
        self.revert_preview();
        self.state.end();
        log::debug!("Gesture ended");
    }

    /// Start over with a blank canvas and an empty history. Not undoable.
    pub fn clear(&mut self) {
        self.preview_backing = None;
        self.state.set_preview(false);
        self.image = PixelBuffer::new(self.size, self.background);
        self.history.clear();
        self.touch();
        log::info!("Canvas {} cleared", self.id);
    }

    /// Replace the pixels with `source` fitted into the canvas size.
    /// Callers wanting to undo the load should snapshot first.
    pub fn load_image(&mut self, source: &PixelBuffer) {
        self.preview_backing = None;
        self.state.set_preview(false);
        self.image = source.scaled_to(self.size);
        self.touch();
        log::info!(
            "Loaded {} image as {}",
            source.size(),
            self.image.size()
        );
    }

    /// Open an image file as a fresh document. On failure the canvas is untouched.
    pub fn open(&mut self, path: impl AsRef<Path>) -> CanvasResult<()> {
        let source = PixelBuffer::open(path.as_ref())?;
        self.clear();
        self.load_image(&source);
        log::info!("Opened {}", path.as_ref().display());
        Ok(())
    }

    /// Change the logical size and rescale the pixels into it. History is kept.
    pub fn resize(&mut self, size: Size) {
        self.size = size;
        self.refit();
    }

    /// Rescale the pixels to fit the current logical size
    pub fn refit(&mut self) {
        self.revert_preview();
        let fitted = self.image.scaled_to(self.size);
        if fitted.size() != self.image.size() {
            log::info!("Rescaled canvas {} -> {}", self.image.size(), fitted.size());
            self.image = fitted;
            self.touch();
        }
    }

    /// Save the committed pixels, choosing the format from the file extension
    pub fn save(&mut self, path: impl AsRef<Path>) -> CanvasResult<()> {
        let path = path.as_ref();
        let format = format_for_path(path)?;
        self.save_as(path, format)
    }

    pub fn save_as(&mut self, path: impl AsRef<Path>, format: ImageFormat) -> CanvasResult<()> {
        self.committed_image().encode(path, format)?;
        self.saved = true;
        Ok(())
    }

    /// Anchor and last point of the active gesture, or an error naming `operation`
    fn gesture_points(&self, operation: &'static str) -> CanvasResult<(Pos2, Pos2)> {
        match self.state {
            StrokeState::Gesturing { anchor, last, .. } => Ok((anchor, last)),
            StrokeState::Idle => {
                log::warn!("{} called without an active gesture", operation);
                Err(CanvasError::InvalidState(
                    "the brush must be on the canvas before drawing",
                ))
            }
        }
    }

    /// Erase the live preview, if any, by restoring the clean copy
    fn revert_preview(&mut self) {
        if let Some(backing) = self.preview_backing.take() {
            self.image = backing;
        }
        self.state.set_preview(false);
    }

    fn touch(&mut self) {
        self.saved = false;
    }
}
