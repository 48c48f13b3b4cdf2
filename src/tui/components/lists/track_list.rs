//! The track catalogue list pane.

use super::{
    capacity::wrap_line, FieldPath, LayoutSignal, Paginator, Record, TemplateBinder,
    ViewportOracle,
};
use crate::tui::components::{Component, ComponentState};
use crate::tui::events::Event;
use crate::tui::{styles::Theme, Frame};
use anyhow::Result;
use async_trait::async_trait;
use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use serde_json::Value;
use std::ops::Range;
use tokio::sync::mpsc;
use tracing::{debug, warn};

pub type TrackPaginator = Paginator<Value, ViewportOracle, TemplateBinder>;

/// Paginated list of catalogue records
pub struct TrackList {
    paginator: TrackPaginator,
    layout: LayoutSignal,
    id_field: FieldPath,
    state: ComponentState,

    /// Screen rows of every drawn slot with the item index it shows
    rows: Vec<(Range<u16>, usize)>,

    events: mpsc::UnboundedSender<Event>,
}

impl TrackList {
    pub fn new(
        binder: TemplateBinder,
        id_field: FieldPath,
        events: mpsc::UnboundedSender<Event>,
    ) -> Self {
        let mut paginator = Paginator::new(ViewportOracle::default(), binder);
        let sender = events.clone();
        paginator.on_changed(move || {
            let _ = sender.send(Event::PaginationChanged);
        });
        let layout = paginator.layout_signal();

        Self {
            paginator,
            layout,
            id_field,
            state: ComponentState::new().with_focus(true),
            rows: Vec::new(),
            events,
        }
    }

    pub fn set_items(&mut self, items: Vec<Value>) {
        self.paginator.set_items(items);
    }

    pub fn paginator(&self) -> &TrackPaginator {
        &self.paginator
    }

    /// One-based page number for display, 0 when empty
    pub fn page(&self) -> usize {
        if self.paginator.page_count() == 0 {
            0
        } else {
            self.paginator.current_page() + 1
        }
    }

    pub fn pages(&self) -> usize {
        self.paginator.page_count()
    }

    /// Record the pane area. A changed viewport only raises the layout
    /// signal; the pages are recomputed by the next [`Self::flush_layout`].
    pub fn set_area(&mut self, area: Rect) {
        self.state.size = area;
        let inner = Self::block().inner(area);
        if self
            .paginator
            .oracle_mut()
            .set_viewport(inner.width, inner.height)
        {
            debug!(width = inner.width, height = inner.height, "list viewport changed");
            self.layout.raise();
        }
    }

    /// Apply pending layout changes, once per frame
    pub fn flush_layout(&mut self) -> bool {
        self.paginator.flush_layout()
    }

    /// Ask the app to load the selected track
    pub fn request_selected(&self) -> bool {
        let Some(item) = self.paginator.selected() else {
            return false;
        };
        match item.lookup(&self.id_field) {
            Some(id) => {
                let _ = self.events.send(Event::TrackRequested(id));
                true
            }
            None => {
                warn!(field = %self.id_field, "selected record has no id");
                false
            }
        }
    }

    /// Item index drawn at the given screen position
    pub fn item_at(&self, column: u16, row: u16) -> Option<usize> {
        let area = self.state.size;
        if column < area.x || column >= area.x.saturating_add(area.width) {
            return None;
        }
        self.rows
            .iter()
            .find(|(rows, _)| rows.contains(&row))
            .map(|(_, index)| *index)
    }

    fn step_selection(&mut self, forward: bool) -> bool {
        let count = self.paginator.items().len();
        if count == 0 {
            return false;
        }
        let target = match self.paginator.selected_index() {
            Some(index) if forward => (index + 1).min(count - 1),
            Some(index) => index.saturating_sub(1),
            None => self.paginator.read_offset(),
        };
        self.paginator.select_index(target)
    }

    fn block() -> Block<'static> {
        Block::default().borders(Borders::ALL).title(" Tracks ")
    }
}

#[async_trait]
impl Component for TrackList {
    async fn handle_key_event(&mut self, event: KeyEvent) -> Result<bool> {
        let consumed = match event.code {
            KeyCode::PageDown | KeyCode::Right | KeyCode::Char('n') => {
                self.paginator.next();
                true
            }
            KeyCode::PageUp | KeyCode::Left | KeyCode::Char('p') => {
                self.paginator.previous();
                true
            }
            KeyCode::Home => {
                self.paginator.jump(0);
                true
            }
            KeyCode::End => {
                self.paginator.jump(isize::MAX);
                true
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.step_selection(true);
                true
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.step_selection(false);
                true
            }
            KeyCode::Enter => {
                self.request_selected();
                true
            }
            _ => false,
        };
        Ok(consumed)
    }

    async fn handle_mouse_event(&mut self, event: MouseEvent) -> Result<bool> {
        if event.kind != MouseEventKind::Down(MouseButton::Left) {
            return Ok(false);
        }
        let Some(index) = self.item_at(event.column, event.row) else {
            return Ok(false);
        };
        if self.paginator.select_index(index) {
            self.request_selected();
        }
        Ok(true)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let block = Self::block().border_style(if self.state.has_focus {
            theme.focused_border_style()
        } else {
            theme.border_style()
        });
        let inner = block.inner(area);
        frame.render_widget(block, area);
        self.rows.clear();

        if self.paginator.items().is_empty() {
            let placeholder =
                Paragraph::new("No tracks loaded").style(theme.placeholder_style());
            frame.render_widget(placeholder, inner);
            return;
        }

        let bottom = inner.y.saturating_add(inner.height);
        let mut lines = Vec::new();
        let mut y = inner.y;

        for slot in self.paginator.active_slots() {
            let Some(index) = slot.index() else {
                continue;
            };
            let start = y;
            for (n, line) in slot.lines().iter().enumerate() {
                let style = if slot.is_selected() {
                    theme.selection_style()
                } else if n == 0 {
                    theme.text_style()
                } else {
                    theme.dim_style()
                };
                for row in wrap_line(line, inner.width) {
                    if y >= bottom {
                        break;
                    }
                    lines.push(Line::from(Span::styled(row, style)));
                    y += 1;
                }
            }
            if y > start {
                self.rows.push((start..y, index));
            }
        }

        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn size(&self) -> Rect {
        self.state.size
    }

    fn set_size(&mut self, size: Rect) {
        self.set_area(size);
    }

    fn has_focus(&self) -> bool {
        self.state.has_focus
    }

    fn set_focus(&mut self, focus: bool) {
        self.state.has_focus = focus;
    }

    fn help_text(&self) -> Vec<(&'static str, &'static str)> {
        vec![
            ("n / PgDn", "Next page"),
            ("p / PgUp", "Previous page"),
            ("Home / End", "First / last page"),
            ("Up / Down", "Select previous / next track"),
            ("Enter", "Show selected track"),
        ]
    }
}
