//! Viewport-driven pagination.
//!
//! Page boundaries depend on the rendered size of each item, which is only
//! known once the item has been bound to a slot and measured. The paginator
//! discovers every page start up front by materializing page after page into
//! the slot pool, memoizes the starts in an [`OffsetTable`], and afterwards
//! answers navigation and selection with table lookups. The table is rebuilt
//! only when the items are replaced or the viewport changes.

use super::binder::ItemBinder;
use super::capacity::{CapacityOracle, LayoutSignal};
use super::offsets::OffsetTable;
use super::record::Record;
use super::slot_pool::{Slot, SlotPool};
use std::fmt;
use std::ops::Range;
use tracing::{debug, trace};

/// Selection target, either by value or by absolute index
#[derive(Debug, Clone, Copy)]
pub enum Selector<'a, T> {
    Index(usize),
    Item(&'a T),
}

/// Work counters, mostly useful to bound the cost of layout churn
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaginationMetrics {
    /// Full page table recomputations
    pub discoveries: usize,
    /// Passes that presented a page
    pub renders: usize,
    /// Items bound into slots
    pub binds: usize,
    /// Capacity oracle queries
    pub fit_checks: usize,
}

#[derive(Debug, Clone)]
struct Selection<T> {
    index: usize,
    item: T,
}

#[derive(Debug, Clone, Copy)]
enum Restore {
    /// Back to the first page
    Start,
    /// Page containing the item the current page started with
    Offset,
}

#[derive(Debug, Clone, Copy)]
enum Pass {
    Render,
    Discover(Restore),
}

type ChangedListener = Box<dyn Fn() + Send + Sync>;

pub struct Paginator<T: Record, O: CapacityOracle, B: ItemBinder<T>> {
    items: Vec<T>,
    offsets: OffsetTable,
    read_offset: usize,
    selected: Option<Selection<T>>,
    pool: SlotPool,
    oracle: O,
    binder: B,
    layout: LayoutSignal,
    metrics: PaginationMetrics,
    listeners: Vec<ChangedListener>,
}

impl<T: Record, O: CapacityOracle, B: ItemBinder<T>> Paginator<T, O, B> {
    pub fn new(oracle: O, binder: B) -> Self {
        Self {
            items: Vec::new(),
            offsets: OffsetTable::new(),
            read_offset: 0,
            selected: None,
            pool: SlotPool::new(),
            oracle,
            binder,
            layout: LayoutSignal::new(),
            metrics: PaginationMetrics::default(),
            listeners: Vec::new(),
        }
    }

    /// Share a layout signal with the hosting surface
    pub fn with_layout_signal(mut self, layout: LayoutSignal) -> Self {
        self.layout = layout;
        self
    }

    /// Register a listener called once per completed pass
    pub fn on_changed<F>(&mut self, listener: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    /// Replace the items, clear the selection and rediscover from page 0
    pub fn set_items<I>(&mut self, items: I)
    where
        I: IntoIterator<Item = T>,
    {
        self.items = items.into_iter().collect();
        self.selected = None;
        debug!(count = self.items.len(), "items replaced");
        self.reload();
    }

    /// Rediscover every page of the current items and return to page 0
    pub fn reload(&mut self) {
        self.read_offset = 0;
        self.run(Pass::Discover(Restore::Start));
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn page_count(&self) -> usize {
        self.offsets.len()
    }

    /// Rank of the current page, 0 when there are no pages
    pub fn current_page(&self) -> usize {
        self.offsets.rank(self.read_offset).unwrap_or(0)
    }

    /// Index of the first item on the current page
    pub fn read_offset(&self) -> usize {
        self.read_offset
    }

    pub fn offsets(&self) -> &[usize] {
        self.offsets.as_slice()
    }

    /// Item range covered by the current page
    pub fn page_range(&self) -> Range<usize> {
        if self.items.is_empty() {
            return 0..0;
        }
        let end = self
            .offsets
            .get(self.current_page() + 1)
            .unwrap_or(self.items.len());
        self.read_offset..end
    }

    /// Page rank containing the item at `index`
    pub fn page_of(&self, index: usize) -> Option<usize> {
        if index >= self.items.len() {
            return None;
        }
        self.offsets
            .resolve(index)
            .and_then(|offset| self.offsets.rank(offset))
    }

    /// Move to the following page, returns whether the page changed
    pub fn next(&mut self) -> bool {
        let target = self
            .offsets
            .rank(self.read_offset)
            .and_then(|rank| self.offsets.get(rank + 1));
        match target {
            Some(offset) => self.relocate(offset),
            None => false,
        }
    }

    /// Move to the preceding page, returns whether the page changed
    pub fn previous(&mut self) -> bool {
        let target = self
            .offsets
            .rank(self.read_offset)
            .and_then(|rank| rank.checked_sub(1))
            .and_then(|rank| self.offsets.get(rank));
        match target {
            Some(offset) => self.relocate(offset),
            None => false,
        }
    }

    /// Go to `page`, clamped into the valid page range
    pub fn jump(&mut self, page: isize) -> bool {
        let Some(last) = self.offsets.len().checked_sub(1) else {
            return false;
        };
        let page = usize::try_from(page).unwrap_or(0).min(last);
        if page == self.current_page() {
            return false;
        }
        self.relocate(self.offsets[page])
    }

    /// Select an item and move to its page.
    ///
    /// An unresolvable target clears the selection and leaves the page alone.
    /// Returns whether the target resolved.
    pub fn select(&mut self, selector: Selector<'_, T>) -> bool {
        let index = match selector {
            Selector::Index(index) if index < self.items.len() => Some(index),
            Selector::Index(_) => None,
            Selector::Item(item) => self.items.iter().position(|c| c.same_record(item)),
        };

        let Some(index) = index else {
            debug!("selection target not found");
            if self.selected.take().is_some() {
                self.run(Pass::Render);
            }
            return false;
        };

        self.selected = Some(Selection {
            index,
            item: self.items[index].clone(),
        });
        if let Some(offset) = self.offsets.resolve(index) {
            self.read_offset = offset;
        }
        debug!(index, offset = self.read_offset, "item selected");
        self.run(Pass::Render);
        true
    }

    pub fn select_index(&mut self, index: usize) -> bool {
        self.select(Selector::Index(index))
    }

    pub fn select_item(&mut self, item: &T) -> bool {
        self.select(Selector::Item(item))
    }

    pub fn clear_selection(&mut self) {
        if self.selected.take().is_some() {
            self.run(Pass::Render);
        }
    }

    pub fn selected(&self) -> Option<&T> {
        self.selected.as_ref().map(|s| &s.item)
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected.as_ref().map(|s| s.index)
    }

    /// Rediscover pages after the viewport changed, keeping the item the
    /// current page starts with on screen
    pub fn resize(&mut self) {
        self.run(Pass::Discover(Restore::Offset));
    }

    /// Resize once if the layout signal was raised since the last pass
    pub fn flush_layout(&mut self) -> bool {
        if self.layout.take() {
            self.resize();
            true
        } else {
            false
        }
    }

    pub fn layout_signal(&self) -> LayoutSignal {
        self.layout.clone()
    }

    pub fn oracle_mut(&mut self) -> &mut O {
        &mut self.oracle
    }

    pub fn slots(&self) -> &[Slot] {
        self.pool.slots()
    }

    /// Slots presented for the current page
    pub fn active_slots(&self) -> impl Iterator<Item = &Slot> {
        self.pool.active()
    }

    pub fn metrics(&self) -> PaginationMetrics {
        self.metrics
    }

    fn relocate(&mut self, offset: usize) -> bool {
        debug!(from = self.read_offset, to = offset, "page changed");
        self.read_offset = offset;
        self.run(Pass::Render);
        true
    }

    fn run(&mut self, pass: Pass) {
        let Some(guard) = self.layout.begin_pass() else {
            trace!(?pass, "pass already running, deferring");
            self.layout.raise();
            return;
        };

        // a discovery measures the current layout, which absorbs earlier raises
        let deferred = self.layout.take();

        match pass {
            Pass::Render => self.render(),
            Pass::Discover(restore) => self.discover(restore),
        }
        self.emit_changed();

        // layout changes raised by the pass itself get exactly one more pass
        let rediscovered = self.layout.take();
        if rediscovered {
            debug!("layout changed during pass, rediscovering");
            self.discover(Restore::Offset);
            self.emit_changed();
            if self.layout.take() {
                trace!("dropping layout change raised during rediscovery");
            }
        }

        drop(guard);

        if deferred && !rediscovered && matches!(pass, Pass::Render) {
            self.layout.raise();
        }
    }

    fn discover(&mut self, restore: Restore) {
        self.metrics.discoveries += 1;
        let previous = self.read_offset;
        let count = self.items.len();

        self.offsets.reset(count);
        let mut working = 0;
        while working < count {
            working += self.materialize(working);
            if working < count {
                self.offsets.insert(working);
            }
        }

        self.read_offset = match restore {
            Restore::Start => 0,
            Restore::Offset => self.offsets.resolve(previous).unwrap_or(0),
        };
        debug!(
            pages = self.offsets.len(),
            offset = self.read_offset,
            "pages discovered"
        );
        self.render();
    }

    fn render(&mut self) {
        self.metrics.renders += 1;
        if self.items.is_empty() {
            self.pool.set_active_len(0);
            return;
        }
        self.materialize(self.read_offset);
    }

    /// Bind items from `offset` until the viewport is full, returns the page length.
    ///
    /// The slot that overflowed stays bound but inactive. A page always holds at
    /// least one item, even one that alone exceeds the viewport.
    fn materialize(&mut self, offset: usize) -> usize {
        let remaining = self.items.len().saturating_sub(offset);
        let selected = self.selected_index();
        let mut length = 0;

        for i in 0..remaining {
            let index = offset + i;
            self.binder.bind(
                &self.items[index],
                index,
                selected == Some(index),
                self.pool.slot_mut(i),
            );
            self.metrics.binds += 1;
            self.metrics.fit_checks += 1;
            if !self.oracle.fits(self.pool.span(i)) {
                break;
            }
            length = i + 1;
        }

        let length = length.max(remaining.min(1));
        self.pool.set_active_len(length);
        trace!(offset, length, "page materialized");
        length
    }

    fn emit_changed(&self) {
        for listener in &self.listeners {
            listener();
        }
    }
}

impl<T: Record, O: CapacityOracle, B: ItemBinder<T>> fmt::Debug for Paginator<T, O, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Paginator")
            .field("items", &self.items.len())
            .field("offsets", &self.offsets)
            .field("read_offset", &self.read_offset)
            .field("selected", &self.selected_index())
            .field("slots", &self.pool.len())
            .field("metrics", &self.metrics)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::components::lists::{TemplateBinder, ViewportOracle};
    use proptest::prelude::*;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn tracks(count: usize) -> Vec<Value> {
        (0..count)
            .map(|i| json!({ "id": i, "name": format!("Track {}", i) }))
            .collect()
    }

    fn binder() -> TemplateBinder {
        TemplateBinder::parse(&["{name}"]).unwrap()
    }

    /// One row per item, `rows` items per page
    fn paginator(rows: u16) -> Paginator<Value, ViewportOracle, TemplateBinder> {
        Paginator::new(ViewportOracle::new(40, rows), binder())
    }

    #[test]
    fn test_fixed_height_pages() {
        let mut list = paginator(10);
        list.set_items(tracks(25));

        assert_eq!(list.page_count(), 3);
        assert_eq!(list.offsets(), &[0, 10, 20]);
        assert_eq!(list.current_page(), 0);
        assert_eq!(list.page_range(), 0..10);
        assert_eq!(list.active_slots().count(), 10);
    }

    #[test]
    fn test_jump_clamps() {
        let mut list = paginator(10);
        list.set_items(tracks(25));

        assert!(list.jump(5));
        assert_eq!(list.current_page(), 2);
        assert_eq!(list.read_offset(), 20);
        assert_eq!(list.page_range(), 20..25);
        assert_eq!(list.active_slots().count(), 5);

        assert!(!list.jump(2));
        assert!(list.jump(-3));
        assert_eq!(list.current_page(), 0);
        assert!(!list.jump(isize::MIN));
    }

    #[test]
    fn test_next_and_previous() {
        let mut list = paginator(10);
        list.set_items(tracks(25));

        assert!(!list.previous());
        assert!(list.next());
        assert_eq!(list.read_offset(), 10);
        assert!(list.next());
        assert!(!list.next());
        assert_eq!(list.current_page(), 2);
        assert!(list.previous());
        assert_eq!(list.read_offset(), 10);
    }

    #[test]
    fn test_select_moves_to_owning_page() {
        let mut list = paginator(10);
        let items = tracks(25);
        list.set_items(items.clone());

        assert!(list.select_item(&items[15]));
        assert_eq!(list.current_page(), 1);
        assert_eq!(list.read_offset(), 10);
        assert_eq!(list.selected_index(), Some(15));

        let highlighted: Vec<_> = list
            .active_slots()
            .filter(|slot| slot.is_selected())
            .filter_map(Slot::index)
            .collect();
        assert_eq!(highlighted, vec![15]);

        assert!(list.select(Selector::Index(3)));
        assert_eq!(list.current_page(), 0);
        assert_eq!(list.selected(), Some(&items[3]));
    }

    #[test]
    fn test_select_by_reloaded_value() {
        let mut list = paginator(10);
        list.set_items(tracks(25));

        let reloaded: Value = serde_json::from_str(r#"{"name":"Track 21","id":21}"#).unwrap();
        assert!(list.select_item(&reloaded));
        assert_eq!(list.current_page(), 2);
    }

    #[test]
    fn test_select_absent_item() {
        let mut list = paginator(10);
        list.set_items(tracks(25));
        list.select_index(12);
        assert_eq!(list.read_offset(), 10);

        assert!(!list.select_item(&json!({ "id": 99 })));
        assert_eq!(list.selected(), None);
        assert_eq!(list.read_offset(), 10);
        assert!(list.active_slots().all(|slot| !slot.is_selected()));

        assert!(!list.select_index(25));
        assert_eq!(list.selected_index(), None);
    }

    #[test]
    fn test_duplicates_resolve_to_first_match() {
        let mut list = paginator(2);
        let duplicate = json!({ "name": "same" });
        list.set_items(vec![json!({ "name": "a" }), json!({ "name": "b" }), duplicate.clone(), duplicate.clone()]);

        assert!(list.select_item(&duplicate));
        assert_eq!(list.selected_index(), Some(2));
        assert_eq!(list.current_page(), 1);
    }

    #[test]
    fn test_empty_items() {
        let mut list = paginator(10);
        list.set_items(Vec::new());

        assert_eq!(list.page_count(), 0);
        assert_eq!(list.current_page(), 0);
        assert!(list.offsets().is_empty());
        assert!(!list.next());
        assert!(!list.previous());
        assert!(!list.jump(1));
        assert!(!list.select_item(&json!({ "id": 1 })));
        assert!(!list.select_index(0));
        assert_eq!(list.selected(), None);
        assert_eq!(list.page_range(), 0..0);
        assert_eq!(list.active_slots().count(), 0);
    }

    #[test]
    fn test_set_items_resets_state() {
        let mut list = paginator(10);
        list.set_items(tracks(25));
        list.select_index(22);
        assert_eq!(list.current_page(), 2);

        list.set_items(tracks(12));
        assert_eq!(list.selected(), None);
        assert_eq!(list.current_page(), 0);
        assert_eq!(list.offsets(), &[0, 10]);
    }

    #[test]
    fn test_clear_selection() {
        let mut list = paginator(10);
        let changes = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&changes);
        list.on_changed(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        list.set_items(tracks(25));
        list.select_index(14);
        assert_eq!(changes.load(Ordering::SeqCst), 2);

        list.clear_selection();
        assert_eq!(list.selected(), None);
        assert_eq!(list.read_offset(), 10);
        assert!(list.active_slots().all(|slot| !slot.is_selected()));
        assert_eq!(changes.load(Ordering::SeqCst), 3);

        // nothing selected, nothing to redraw
        list.clear_selection();
        assert_eq!(changes.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_reload_returns_to_first_page() {
        let mut list = paginator(10);
        list.set_items(tracks(25));
        list.select_index(22);

        list.reload();
        assert_eq!(list.current_page(), 0);
        assert_eq!(list.offsets(), &[0, 10, 20]);
        assert_eq!(list.selected_index(), Some(22));
        assert_eq!(list.metrics().discoveries, 2);
    }

    #[test]
    fn test_resize_preserves_item_offset() {
        let mut list = paginator(10);
        list.set_items(tracks(25));
        list.next();
        assert_eq!((list.read_offset(), list.current_page(), list.page_count()), (10, 1, 3));

        list.oracle_mut().set_viewport(40, 5);
        list.resize();
        assert_eq!(list.read_offset(), 10);
        assert_eq!(list.current_page(), 2);
        assert_eq!(list.page_count(), 5);

        // offset 15 is no page start once pages hold 10 items again
        list.next();
        list.oracle_mut().set_viewport(40, 10);
        list.resize();
        assert_eq!(list.read_offset(), 10);
        assert_eq!(list.current_page(), 1);
    }

    #[test]
    fn test_variable_height_items() {
        // width 5: "aaaa bbbb cccc" wraps to three rows
        let long = "aaaa bbbb cccc";
        let names = ["a", long, "b", "c", long, "d"];
        let items: Vec<Value> = names.iter().map(|n| json!({ "name": n })).collect();

        let mut list = Paginator::new(ViewportOracle::new(5, 4), binder());
        list.set_items(items);
        assert_eq!(list.offsets(), &[0, 2, 4]);
    }

    #[test]
    fn test_oversized_items_get_own_page() {
        let mut list = Paginator::new(
            ViewportOracle::new(40, 1),
            TemplateBinder::parse(&["{name}", "{id}"]).unwrap(),
        );
        list.set_items(tracks(4));

        assert_eq!(list.offsets(), &[0, 1, 2, 3]);
        assert_eq!(list.active_slots().count(), 1);
    }

    #[test]
    fn test_unbounded_capacity_is_one_page() {
        let mut list = Paginator::new(|_: &[Slot]| true, binder());
        list.set_items(tracks(100));

        assert_eq!(list.page_count(), 1);
        assert_eq!(list.active_slots().count(), 100);
    }

    #[test]
    fn test_slot_pool_is_reused() {
        let mut list = paginator(10);
        list.set_items(tracks(25));
        let pool = list.slots().len();
        assert_eq!(pool, 11);

        list.jump(2);
        assert_eq!(list.slots().len(), pool);
        // surplus slots keep stale bindings but are not presented
        assert!(!list.slots()[7].is_active());
        assert_eq!(list.slots()[7].index(), Some(7));
    }

    #[test]
    fn test_changed_is_emitted_once_per_pass() {
        let mut list = paginator(10);
        let changes = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&changes);
        list.on_changed(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        list.set_items(tracks(25));
        assert_eq!(changes.load(Ordering::SeqCst), 1);

        list.next();
        list.jump(9);
        assert_eq!(changes.load(Ordering::SeqCst), 3);

        list.next();
        list.jump(2);
        assert_eq!(changes.load(Ordering::SeqCst), 3);

        list.resize();
        assert_eq!(changes.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_layout_change_during_pass_runs_one_more_discovery() {
        let signal = LayoutSignal::new();
        let raiser = signal.clone();
        let oracle = move |span: &[Slot]| {
            raiser.raise();
            span.len() <= 10
        };
        let mut list = Paginator::new(oracle, binder()).with_layout_signal(signal.clone());

        list.set_items(tracks(25));
        assert_eq!(list.metrics().discoveries, 2);
        assert!(!signal.is_raised());
        assert!(!signal.in_pass());

        list.next();
        assert_eq!(list.metrics().discoveries, 3);
        assert_eq!(list.read_offset(), 10);
    }

    #[test]
    fn test_flush_layout_coalesces_signals() {
        let mut list = paginator(10);
        list.set_items(tracks(25));
        let signal = list.layout_signal();

        signal.raise();
        signal.raise();
        signal.raise();
        assert!(list.flush_layout());
        assert!(!list.flush_layout());
        assert_eq!(list.metrics().discoveries, 2);
    }

    #[test]
    fn test_navigation_does_not_rediscover() {
        let mut list = paginator(10);
        list.set_items(tracks(25));
        let binds = list.metrics().binds;

        list.next();
        list.select_index(3);
        assert_eq!(list.metrics().discoveries, 1);
        // a page pass binds one page plus the overflowing slot
        assert_eq!(list.metrics().binds, binds + 11 + 11);
    }

    proptest! {
        #[test]
        fn prop_fixed_capacity_pages(count in 0usize..200, per_page in 1usize..20) {
            let mut list = Paginator::new(move |span: &[Slot]| span.len() <= per_page, binder());
            list.set_items(tracks(count));

            prop_assert_eq!(list.page_count(), count.div_ceil(per_page));
            let offsets = list.offsets().to_vec();
            if count > 0 {
                prop_assert_eq!(offsets[0], 0);
            }
            prop_assert!(offsets.windows(2).all(|w| w[0] < w[1]));
            for pair in offsets.windows(2) {
                prop_assert_eq!(pair[1] - pair[0], per_page);
            }
        }

        #[test]
        fn prop_next_previous_are_inverse(count in 1usize..120, per_page in 1usize..12, start in 0isize..20) {
            let mut list = Paginator::new(move |span: &[Slot]| span.len() <= per_page, binder());
            list.set_items(tracks(count));
            list.jump(start);
            let origin = list.read_offset();

            if list.next() {
                prop_assert!(list.previous());
                prop_assert_eq!(list.read_offset(), origin);
            }
            if list.previous() {
                prop_assert!(list.next());
                prop_assert_eq!(list.read_offset(), origin);
            }
        }

        #[test]
        fn prop_jump_lands_in_range(count in 1usize..120, per_page in 1usize..12, page in any::<isize>()) {
            let mut list = Paginator::new(move |span: &[Slot]| span.len() <= per_page, binder());
            list.set_items(tracks(count));
            list.jump(page);

            prop_assert!(list.current_page() < list.page_count());
            prop_assert_eq!(list.offsets()[list.current_page()], list.read_offset());
        }

        #[test]
        fn prop_select_lands_on_owning_page(count in 1usize..120, per_page in 1usize..12, pick in any::<prop::sample::Index>()) {
            let mut list = Paginator::new(move |span: &[Slot]| span.len() <= per_page, binder());
            let items = tracks(count);
            list.set_items(items.clone());
            let index = pick.index(count);

            prop_assert!(list.select_item(&items[index]));
            prop_assert_eq!(Some(list.current_page()), list.page_of(index));
            prop_assert_eq!(list.current_page(), index / per_page);
        }
    }
}
