//! Frame-coalesced redraw bookkeeping.

use serde::{Deserialize, Serialize};

/// Layers waiting for the next frame.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DirtyLayers {
    /// Static layer on the score chart, heatmap on the timeline chart.
    pub background: bool,
    /// Series layer on the score chart, scatter on the timeline chart.
    pub foreground: bool,
}

impl DirtyLayers {
    pub const BOTH: Self = Self {
        background: true,
        foreground: true,
    };
    pub const FOREGROUND: Self = Self {
        background: false,
        foreground: true,
    };

    pub fn is_empty(&self) -> bool {
        !self.background && !self.foreground
    }

    fn merge(&mut self, other: DirtyLayers) {
        self.background |= other.background;
        self.foreground |= other.foreground;
    }
}

/// What triggered a redraw.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum RedrawCause {
    Data,
    Resize,
    Theme,
    Toggle,
}

impl RedrawCause {
    pub fn layers(self) -> DirtyLayers {
        match self {
            RedrawCause::Toggle => DirtyLayers::FOREGROUND,
            RedrawCause::Data | RedrawCause::Resize | RedrawCause::Theme => DirtyLayers::BOTH,
        }
    }
}

/// Single-flight scheduler: at most one frame is outstanding per chart.
#[derive(Clone, Debug, Default)]
pub struct RedrawScheduler {
    pending: bool,
    dirty: DirtyLayers,
}

impl RedrawScheduler {
    /// Mark layers dirty. Returns `true` when the caller must request a frame.
    pub fn request(&mut self, cause: RedrawCause) -> bool {
        self.dirty.merge(cause.layers());
        if self.pending {
            return false;
        }
        self.pending = true;
        true
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Called from the frame callback; hands over everything accumulated.
    pub fn take(&mut self) -> DirtyLayers {
        self.pending = false;
        std::mem::take(&mut self.dirty)
    }

    /// Forget outstanding work, e.g. when the chart is torn down.
    pub fn cancel(&mut self) {
        self.pending = false;
        self.dirty = DirtyLayers::default();
    }
}
