//! Viewport capacity measurement and layout-change signalling.

use super::slot_pool::Slot;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::trace;

/// Answers whether a span of bound slots still fits the viewport.
///
/// Implementations must be monotonic within one pass: once a span stops
/// fitting, every longer span starting at the same slot does not fit either.
pub trait CapacityOracle {
    /// `span` covers slots `[0, i]` of the current pass
    fn fits(&self, span: &[Slot]) -> bool;
}

impl<F> CapacityOracle for F
where
    F: Fn(&[Slot]) -> bool,
{
    fn fits(&self, span: &[Slot]) -> bool {
        self(span)
    }
}

/// Wrap `line` to `width` columns; empty lines still take one row
pub fn wrap_line(line: &str, width: u16) -> Vec<String> {
    if line.is_empty() {
        return vec![String::new()];
    }
    textwrap::wrap(line, usize::from(width.max(1)))
        .into_iter()
        .map(|l| l.into_owned())
        .collect()
}

/// Terminal-backed oracle: bound lines are wrapped to the viewport width and
/// the resulting rows must fit the viewport height.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewportOracle {
    width: u16,
    height: u16,
}

impl ViewportOracle {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// Update the viewport, returns whether anything changed
    pub fn set_viewport(&mut self, width: u16, height: u16) -> bool {
        let changed = self.width != width || self.height != height;
        self.width = width;
        self.height = height;
        changed
    }
}

impl CapacityOracle for ViewportOracle {
    fn fits(&self, span: &[Slot]) -> bool {
        let rows: usize = span.iter().map(|slot| slot.rows(self.width)).sum();
        rows <= usize::from(self.height)
    }
}

#[derive(Debug, Default)]
struct SignalState {
    raised: AtomicBool,
    busy: AtomicBool,
}

/// Shared "layout changed" flag raised by the list surface or an oracle.
///
/// The paginator marks a pass in progress while it renders or discovers. A
/// raise during a pass is coalesced into a single follow-up pass; raises
/// outside a pass wait for the next [`super::Paginator::flush_layout`].
#[derive(Debug, Clone, Default)]
pub struct LayoutSignal {
    state: Arc<SignalState>,
}

impl LayoutSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        let already = self.state.raised.swap(true, Ordering::SeqCst);
        if self.in_pass() {
            trace!(already, "layout change during pass coalesced");
        }
    }

    pub fn is_raised(&self) -> bool {
        self.state.raised.load(Ordering::SeqCst)
    }

    /// Consume the raised flag
    pub fn take(&self) -> bool {
        self.state.raised.swap(false, Ordering::SeqCst)
    }

    pub fn in_pass(&self) -> bool {
        self.state.busy.load(Ordering::SeqCst)
    }

    /// Mark a pass in progress until the guard drops; `None` when one already is
    pub(crate) fn begin_pass(&self) -> Option<PassGuard> {
        if self.state.busy.swap(true, Ordering::SeqCst) {
            return None;
        }
        Some(PassGuard {
            state: Arc::clone(&self.state),
        })
    }
}

/// Holds the busy flag for the duration of a pass
#[derive(Debug)]
pub(crate) struct PassGuard {
    state: Arc<SignalState>,
}

impl Drop for PassGuard {
    fn drop(&mut self) {
        self.state.busy.store(false, Ordering::SeqCst);
    }
}
