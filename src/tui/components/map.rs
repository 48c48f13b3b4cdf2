//! Map pane drawing the selected track over a world outline.
//!
//! Positions are plotted as-is (longitude on x, latitude on y).

use super::{Component, ComponentState};
use crate::config::MapStart;
use crate::track::{Coordinate, Track};
use crate::tui::{styles::Theme, Frame};
use async_trait::async_trait;
use ratatui::{
    layout::Rect,
    symbols::Marker,
    widgets::{
        canvas::{Canvas, Line as CanvasLine, Map, MapResolution},
        Block, Borders,
    },
};

/// Visible lat/lng window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub west: f64,
    pub east: f64,
    pub south: f64,
    pub north: f64,
}

impl Extent {
    /// Window around `center` at a web-map style zoom level
    pub fn around(center: Coordinate, zoom: u8) -> Self {
        let lng_span = 360.0 / 2f64.powi(i32::from(zoom));
        let lat_span = (lng_span / 2.0).min(180.0);
        Self {
            west: center.lng - lng_span / 2.0,
            east: center.lng + lng_span / 2.0,
            south: (center.lat - lat_span / 2.0).max(-90.0),
            north: (center.lat + lat_span / 2.0).min(90.0),
        }
    }

    /// Window fitting a track with 10% padding
    pub fn fit(track: &Track) -> Option<Self> {
        let bounds = track.bounds()?;
        let pad_lng = ((bounds.east - bounds.west) * 0.1).max(0.005);
        let pad_lat = ((bounds.north - bounds.south) * 0.1).max(0.005);
        Some(Self {
            west: bounds.west - pad_lng,
            east: bounds.east + pad_lng,
            south: bounds.south - pad_lat,
            north: bounds.north + pad_lat,
        })
    }
}

pub struct TrackMap {
    state: ComponentState,
    start: Extent,
    extent: Extent,
    title: Option<String>,
    segments: Vec<(f64, f64, f64, f64)>,
}

impl TrackMap {
    pub fn new(start: &MapStart) -> Self {
        let extent = Extent::around(Coordinate::new(start.lat, start.lng, None), start.zoom);
        Self {
            state: ComponentState::new(),
            start: extent,
            extent,
            title: None,
            segments: Vec::new(),
        }
    }

    /// Show `track` and fit the window to it
    pub fn set_path(&mut self, track: &Track) {
        self.segments = track
            .path
            .windows(2)
            .map(|pair| (pair[0].lng, pair[0].lat, pair[1].lng, pair[1].lat))
            .collect();
        self.extent = Extent::fit(track).unwrap_or(self.start);
        self.title = Some(track.title().to_string());
    }

    pub fn clear(&mut self) {
        self.segments.clear();
        self.extent = self.start;
        self.title = None;
    }

    pub fn extent(&self) -> Extent {
        self.extent
    }
}

#[async_trait]
impl Component for TrackMap {
    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let title = match &self.title {
            Some(title) => format!(" Map: {} ", title),
            None => " Map ".to_string(),
        };
        let extent = self.extent;
        let segments = &self.segments;
        let path_color = theme.path;
        let landmass = theme.landmass;

        let canvas = Canvas::default()
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(title)
                    .border_style(theme.border_style()),
            )
            .marker(Marker::Braille)
            .x_bounds([extent.west, extent.east])
            .y_bounds([extent.south, extent.north])
            .paint(move |ctx| {
                ctx.draw(&Map {
                    color: landmass,
                    resolution: MapResolution::Low,
                });
                ctx.layer();
                for &(x1, y1, x2, y2) in segments {
                    ctx.draw(&CanvasLine {
                        x1,
                        y1,
                        x2,
                        y2,
                        color: path_color,
                    });
                }
            });

        frame.render_widget(canvas, area);
    }

    fn size(&self) -> Rect {
        self.state.size
    }

    fn set_size(&mut self, size: Rect) {
        self.state.size = size;
    }
}
