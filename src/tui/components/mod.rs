pub mod lists;
pub mod map;
pub mod pager;
pub mod plot;

use crate::tui::{styles::Theme, Frame};
use anyhow::Result;
use async_trait::async_trait;
use crossterm::event::{KeyEvent, MouseEvent};
use ratatui::layout::Rect;

/// Base trait for all UI components
#[async_trait]
pub trait Component: Send + Sync {
    /// Handle keyboard input, returns whether the event was consumed
    async fn handle_key_event(&mut self, event: KeyEvent) -> Result<bool> {
        let _ = event;
        Ok(false)
    }

    /// Handle mouse input, returns whether the event was consumed
    async fn handle_mouse_event(&mut self, event: MouseEvent) -> Result<bool> {
        let _ = event;
        Ok(false)
    }

    /// Render the component
    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme);

    /// Get component dimensions
    fn size(&self) -> Rect;

    /// Set component dimensions
    fn set_size(&mut self, size: Rect);

    /// Check if component has focus
    fn has_focus(&self) -> bool {
        false
    }

    /// Set component focus
    fn set_focus(&mut self, focus: bool) {
        let _ = focus;
    }

    /// Key bindings the component understands, for the help overlay
    fn help_text(&self) -> Vec<(&'static str, &'static str)> {
        Vec::new()
    }
}

/// Base component state
#[derive(Debug, Clone)]
pub struct ComponentState {
    pub size: Rect,
    pub has_focus: bool,
}

impl Default for ComponentState {
    fn default() -> Self {
        Self {
            size: Rect::default(),
            has_focus: false,
        }
    }
}

impl ComponentState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_focus(mut self, focus: bool) -> Self {
        self.has_focus = focus;
        self
    }
}
