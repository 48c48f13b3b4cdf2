use super::{Component, ComponentState};
use crate::tui::{styles::Theme, Frame};
use async_trait::async_trait;
use ratatui::{layout::Alignment, layout::Rect, widgets::Paragraph};

/// "page X of Y" line under the track list
pub struct PagerIndicator {
    state: ComponentState,
    page: usize,
    pages: usize,
}

impl PagerIndicator {
    pub fn new() -> Self {
        Self {
            state: ComponentState::new(),
            page: 0,
            pages: 0,
        }
    }

    /// `page` is one-based
    pub fn update(&mut self, page: usize, pages: usize) {
        self.page = page;
        self.pages = pages;
    }

    pub fn text(&self) -> String {
        if self.pages == 0 {
            return "no pages".to_string();
        }
        let previous = if self.page > 1 { "◀" } else { " " };
        let next = if self.page < self.pages { "▶" } else { " " };
        format!("{} page {} of {} {}", previous, self.page, self.pages, next)
    }
}

impl Default for PagerIndicator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Component for PagerIndicator {
    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let paragraph = Paragraph::new(self.text())
            .alignment(Alignment::Center)
            .style(theme.dim_style());
        frame.render_widget(paragraph, area);
    }

    fn size(&self) -> Rect {
        self.state.size
    }

    fn set_size(&mut self, size: Rect) {
        self.state.size = size;
    }
}
