use crate::config::Config;
use crate::track::{Track, TrackService};
use crate::tui::components::{
    lists::{FieldPath, TrackList},
    map::TrackMap,
    pager::PagerIndicator,
    plot::ProfilePlot,
    Component,
};
use crate::tui::{events::Event, keys::KeyMap, styles::Theme, Frame};
use anyhow::{Context, Result};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info};

/// Screen regions of the main layout
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Regions {
    list: Rect,
    pager: Rect,
    map: Rect,
    plot: Rect,
    status: Rect,
}

impl Regions {
    fn split(area: Rect) -> Self {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),    // Main content
                Constraint::Length(1), // Status bar
            ])
            .split(area);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
            .split(rows[0]);

        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(1)])
            .split(columns[0]);

        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(columns[1]);

        Self {
            list: left[0],
            pager: left[1],
            map: right[0],
            plot: right[1],
            status: rows[1],
        }
    }
}

/// Main application state and controller
pub struct App {
    /// Whether the application should quit
    pub should_quit: bool,

    /// Key mappings for the application
    pub key_map: KeyMap,

    /// Current theme for styling
    pub theme: Theme,

    /// Status message to display
    pub status_message: Option<String>,

    /// Whether the status message reports a failure
    pub status_is_error: bool,

    /// Show help overlay
    pub show_help: bool,

    regions: Regions,
    list: TrackList,
    map: TrackMap,
    plot: ProfilePlot,
    pager: PagerIndicator,
    tracks: Arc<TrackService>,

    /// Event sender for internal communication
    event_sender: mpsc::UnboundedSender<Event>,
}

impl App {
    /// Create a new application instance
    pub fn new(config: &Config, event_sender: mpsc::UnboundedSender<Event>) -> Result<Self> {
        let binder = config.list.binder()?;
        let id_field = FieldPath::parse(&config.tracks.id_field).context("invalid tracks.id_field")?;
        let tracks = TrackService::new(&config.tracks).context("invalid tracks.endpoint")?;

        Ok(Self {
            should_quit: false,
            key_map: KeyMap::default(),
            theme: Theme::default(),
            status_message: None,
            status_is_error: false,
            show_help: false,
            regions: Regions::default(),
            list: TrackList::new(binder, id_field, event_sender.clone()),
            map: TrackMap::new(&config.map.start),
            plot: ProfilePlot::new(),
            pager: PagerIndicator::new(),
            tracks: Arc::new(tracks),
            event_sender,
        })
    }

    /// Fetch the catalogue in the background
    pub fn load_catalogue(&mut self) {
        self.set_status("Loading tracks…", false);
        let tracks = Arc::clone(&self.tracks);
        let sender = self.event_sender.clone();
        tokio::spawn(async move {
            let event = match tracks.load_catalogue().await {
                Ok(items) => Event::CatalogueLoaded(items),
                Err(e) => Event::LoadFailed(format!("Loading tracks failed: {}", e)),
            };
            let _ = sender.send(event);
        });
    }

    /// Fetch a single track in the background
    fn load_track(&mut self, id: String) {
        self.set_status(&format!("Loading track {}…", id), false);
        let tracks = Arc::clone(&self.tracks);
        let sender = self.event_sender.clone();
        tokio::spawn(async move {
            let event = match tracks.load_track(&id).await {
                Ok(track) => Event::TrackLoaded(track),
                Err(e) => Event::LoadFailed(format!("Loading track {} failed: {}", id, e)),
            };
            let _ = sender.send(event);
        });
    }

    /// Handle incoming events, returns whether the app should quit
    pub async fn handle_event(&mut self, event: Event) -> Result<bool> {
        match event {
            Event::Key(key_event) => {
                if self.key_map.should_quit(&key_event) {
                    self.should_quit = true;
                    return Ok(true);
                }

                if self.key_map.should_show_help(&key_event) {
                    self.show_help = !self.show_help;
                    return Ok(false);
                }

                if self.key_map.should_reload(&key_event) {
                    self.load_catalogue();
                    return Ok(false);
                }

                self.list.handle_key_event(key_event).await?;
            }

            Event::Mouse(mouse_event) => {
                self.list.handle_mouse_event(mouse_event).await?;
            }

            // Layout is recomputed once at the next frame, however many
            // resize events arrive before it
            Event::Resize(_, _) => {}

            Event::Tick => {}

            Event::PaginationChanged => {
                self.pager.update(self.list.page(), self.list.pages());
            }

            Event::TrackRequested(id) => self.load_track(id),

            Event::CatalogueLoaded(items) => {
                let count = items.len();
                self.list.set_items(items);
                self.map.clear();
                self.plot.clear();
                self.set_status(&format!("{} tracks", count), false);
            }

            Event::TrackLoaded(track) => self.show_track(&track),

            Event::LoadFailed(message) => {
                error!("{}", message);
                self.set_status(&message, true);
            }
        }

        Ok(self.should_quit)
    }

    fn show_track(&mut self, track: &Track) {
        info!(id = %track.id, points = track.path.len(), "showing track");
        self.map.set_path(track);
        self.plot.set_track(track);
        self.set_status(
            &format!("{}: {:.1} km", track.title(), track.distance_km()),
            false,
        );
    }

    fn set_status(&mut self, message: &str, is_error: bool) {
        self.status_message = Some(message.to_string());
        self.status_is_error = is_error;
    }

    /// Lay out the screen and apply pending layout changes, once per frame
    pub fn prepare_frame(&mut self, area: Rect) {
        let regions = Regions::split(area);
        if regions != self.regions {
            self.regions = regions;
            self.list.set_area(regions.list);
            self.map.set_size(regions.map);
            self.plot.set_size(regions.plot);
            self.pager.set_size(regions.pager);
        }
        self.list.flush_layout();
    }

    /// Render the application UI
    pub fn render(&mut self, frame: &mut Frame) {
        let regions = self.regions;
        frame.render_widget(Block::default().style(self.theme.base_style()), frame.size());

        self.list.render(frame, regions.list, &self.theme);
        self.pager.render(frame, regions.pager, &self.theme);
        self.map.render(frame, regions.map, &self.theme);
        self.plot.render(frame, regions.plot, &self.theme);
        self.render_status_bar(frame, regions.status);

        if self.show_help {
            self.render_help_overlay(frame);
        }
    }

    /// Render the status bar
    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let (text, style) = match &self.status_message {
            Some(message) if self.status_is_error => (message.clone(), self.theme.error_style()),
            Some(message) => (message.clone(), self.theme.status_bar_style()),
            None => (
                "Press ? for help | q to quit".to_string(),
                self.theme.status_bar_style(),
            ),
        };

        frame.render_widget(Paragraph::new(text).style(style), area);
    }

    /// Render help overlay
    fn render_help_overlay(&self, frame: &mut Frame) {
        let help_area = centered_rect(60, 50, frame.size());

        let help_text = self.key_map.help_text(&self.list.help_text());
        let help_block = Block::default()
            .borders(Borders::ALL)
            .title("Help")
            .style(self.theme.help_style());

        let help_paragraph = Paragraph::new(help_text)
            .block(help_block)
            .style(self.theme.text_style());

        frame.render_widget(Clear, help_area);
        frame.render_widget(help_paragraph, help_area);
    }

    #[cfg(test)]
    fn list(&self) -> &TrackList {
        &self.list
    }
}

/// Create a centered rectangle with given percentage of the screen
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
