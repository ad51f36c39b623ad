//! Source/destination highlight, one pair at a time.

use chess::Square;
use tracing::warn;

use crate::engine::{BoardDisplay, Mark};

#[derive(Debug, Default)]
pub struct HighlightController {
    current: Option<(Square, Square)>,
}

impl HighlightController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently highlighted `(source, destination)`.
    pub fn current(&self) -> Option<(Square, Square)> {
        self.current
    }

    /// Replace any existing highlight with `from` -> `to`.
    ///
    /// Squares the display cannot show are logged and skipped; this never fails.
    pub fn highlight<D: BoardDisplay + ?Sized>(&mut self, display: &mut D, from: Square, to: Square) {
        self.clear(display);

        for (square, mark) in [(from, Mark::Source), (to, Mark::Destination)] {
            if let Err(e) = display.mark(square, mark) {
                warn!(square = %square, error = %e, "Highlight skipped");
            }
        }
        self.current = Some((from, to));
    }

    pub fn clear<D: BoardDisplay + ?Sized>(&mut self, display: &mut D) {
        if self.current.take().is_some() {
            display.clear_marks();
        }
    }
}
