//! Elevation profile of the selected track.

use super::{Component, ComponentState};
use crate::track::Track;
use crate::tui::{styles::Theme, Frame};
use async_trait::async_trait;
use ratatui::{
    layout::Rect,
    symbols::Marker,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
};

pub struct ProfilePlot {
    state: ComponentState,
    profile: Vec<(f64, f64)>,
}

impl ProfilePlot {
    pub fn new() -> Self {
        Self {
            state: ComponentState::new(),
            profile: Vec::new(),
        }
    }

    pub fn set_track(&mut self, track: &Track) {
        self.profile = track.profile();
    }

    pub fn clear(&mut self) {
        self.profile.clear();
    }

    /// `(x bounds, y bounds)` of the plotted profile
    pub fn ranges(&self) -> Option<([f64; 2], [f64; 2])> {
        let last = self.profile.last()?;
        let (low, high) = self
            .profile
            .iter()
            .fold((f64::MAX, f64::MIN), |(low, high), &(_, e)| {
                (low.min(e), high.max(e))
            });
        let pad = ((high - low) * 0.1).max(1.0);
        Some(([0.0, last.0.max(0.001)], [low - pad, high + pad]))
    }
}

impl Default for ProfilePlot {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Component for ProfilePlot {
    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Elevation ")
            .border_style(theme.border_style());

        let Some((x, y)) = self.ranges() else {
            let placeholder = Paragraph::new("No elevation data")
                .block(block)
                .style(theme.placeholder_style());
            frame.render_widget(placeholder, area);
            return;
        };

        let dataset = Dataset::default()
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(ratatui::style::Style::default().fg(theme.profile))
            .data(&self.profile);

        let chart = Chart::new(vec![dataset])
            .block(block)
            .x_axis(
                Axis::default()
                    .style(theme.dim_style())
                    .bounds(x)
                    .labels(vec![
                        Span::raw("0"),
                        Span::raw(format!("{:.1} km", x[1])),
                    ]),
            )
            .y_axis(
                Axis::default()
                    .style(theme.dim_style())
                    .bounds(y)
                    .labels(vec![
                        Span::raw(format!("{:.0} m", y[0])),
                        Span::raw(format!("{:.0} m", y[1])),
                    ]),
            );

        frame.render_widget(chart, area);
    }

    fn size(&self) -> Rect {
        self.state.size
    }

    fn set_size(&mut self, size: Rect) {
        self.state.size = size;
    }
}
