//! Reusable draw surfaces for list items.
//!
//! Slots are rebound on every render pass instead of being recreated. The pool
//! only ever grows; slots past the active length keep stale bindings and are
//! never drawn.

use super::capacity::wrap_line;
use std::sync::OnceLock;

/// A single reusable rendering surface
#[derive(Debug, Clone, Default)]
pub struct Slot {
    /// Absolute index of the bound item
    index: Option<usize>,

    /// Serialized identity of the bound item
    identity: Option<String>,

    /// Bound text, one entry per template line
    lines: Vec<String>,

    /// Whether the bound item is the current selection
    selected: bool,

    /// Whether the slot is part of the presented page
    active: bool,

    /// Wrapped row count of `lines`, keyed by the width it was measured at
    rows: OnceLock<(u16, usize)>,
}

impl Slot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamp the slot with the item it now represents
    pub fn stamp(&mut self, index: usize, identity: String, selected: bool) {
        self.index = Some(index);
        self.identity = Some(identity);
        self.selected = selected;
    }

    /// Replace the bound text, reusing the existing line buffers
    pub fn set_lines<I>(&mut self, lines: I)
    where
        I: IntoIterator<Item = String>,
    {
        self.lines.clear();
        self.lines.extend(lines);
        self.rows = OnceLock::new();
    }

    /// Rows the bound lines occupy when wrapped to `width`, at least one.
    ///
    /// The count is remembered until the lines change, so growing a span one
    /// slot at a time only wraps the newly bound slot.
    pub fn rows(&self, width: u16) -> usize {
        let (measured_at, rows) = *self.rows.get_or_init(|| (width, self.measure(width)));
        if measured_at == width {
            rows
        } else {
            self.measure(width)
        }
    }

    /// Whether a row count is remembered for the current lines
    pub fn is_measured(&self) -> bool {
        self.rows.get().is_some()
    }

    fn measure(&self, width: u16) -> usize {
        self.lines
            .iter()
            .map(|line| wrap_line(line, width).len())
            .sum::<usize>()
            .max(1)
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

/// Ordered arena of slots addressed by position
#[derive(Debug, Clone, Default)]
pub struct SlotPool {
    slots: Vec<Slot>,
}

impl SlotPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Grow the pool by exactly the shortfall so that `len` slots exist
    pub fn ensure(&mut self, len: usize) {
        if self.slots.len() < len {
            self.slots.resize_with(len, Slot::new);
        }
    }

    /// Slot at `position`, growing the pool if needed
    pub fn slot_mut(&mut self, position: usize) -> &mut Slot {
        self.ensure(position + 1);
        &mut self.slots[position]
    }

    pub fn get(&self, position: usize) -> Option<&Slot> {
        self.slots.get(position)
    }

    /// The bound span `[0, last]`
    pub fn span(&self, last: usize) -> &[Slot] {
        &self.slots[..=last.min(self.slots.len().saturating_sub(1))]
    }

    /// Mark the first `len` slots active and every later slot inactive
    pub fn set_active_len(&mut self, len: usize) {
        for (position, slot) in self.slots.iter_mut().enumerate() {
            slot.active = position < len;
        }
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn active(&self) -> impl Iterator<Item = &Slot> {
        self.slots.iter().take_while(|slot| slot.active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_grows_by_shortfall_only() {
        let mut pool = SlotPool::new();
        assert!(pool.is_empty());

        pool.ensure(3);
        assert_eq!(pool.len(), 3);

        pool.slot_mut(4).stamp(9, "nine".to_string(), false);
        assert_eq!(pool.len(), 5);

        pool.ensure(2);
        assert_eq!(pool.len(), 5);
        assert_eq!(pool.get(4).and_then(Slot::index), Some(9));
    }

    #[test]
    fn test_inactive_slots_keep_stale_bindings() {
        let mut pool = SlotPool::new();
        for i in 0..4 {
            let slot = pool.slot_mut(i);
            slot.stamp(i, i.to_string(), false);
            slot.set_lines(vec![format!("item {}", i)]);
        }

        pool.set_active_len(2);
        assert_eq!(pool.active().count(), 2);
        assert!(!pool.slots()[3].is_active());
        assert_eq!(pool.slots()[3].lines(), &["item 3".to_string()]);
        assert_eq!(pool.slots()[3].identity(), Some("3"));
    }

    #[test]
    fn test_rows_are_remembered_until_rebound() {
        let mut slot = Slot::new();
        slot.set_lines(vec!["word word word".to_string()]);
        assert!(!slot.is_measured());

        assert_eq!(slot.rows(10), 2);
        assert!(slot.is_measured());
        // a different width is measured afresh
        assert_eq!(slot.rows(40), 1);
        assert_eq!(slot.rows(10), 2);

        slot.set_lines(vec!["a".to_string(), "b".to_string()]);
        assert!(!slot.is_measured());
        assert_eq!(slot.rows(10), 2);

        slot.set_lines(Vec::new());
        assert_eq!(slot.rows(10), 1);
    }

    #[test]
    fn test_span_is_inclusive() {
        let mut pool = SlotPool::new();
        pool.ensure(5);
        assert_eq!(pool.span(0).len(), 1);
        assert_eq!(pool.span(2).len(), 3);
    }
}
