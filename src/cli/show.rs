use anyhow::{Context, Result};
use clap::Args;
use std::io::{self, Write};
use tracing::debug;

use crate::config::Config;
use crate::track::{Track, TrackService};

/// Summarise a single track
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Track id as found in the catalogue
    pub id: String,
}

impl ShowCommand {
    pub async fn execute(&self, config: &Config) -> Result<()> {
        debug!(id = %self.id, "Executing show command");

        let service = TrackService::new(&config.tracks).context("invalid tracks.endpoint")?;
        let track = service
            .load_track(&self.id)
            .await
            .with_context(|| format!("failed to load track {}", self.id))?;

        let stdout = io::stdout();
        write_summary(&track, &mut stdout.lock())
    }
}

fn write_summary<W: Write>(track: &Track, out: &mut W) -> Result<()> {
    writeln!(out, "{}", track.title())?;
    writeln!(out, "  points:    {}", track.path.len())?;
    writeln!(out, "  distance:  {:.2} km", track.distance_km())?;

    match track.bounds() {
        Some(bounds) => {
            let center = bounds.center();
            writeln!(
                out,
                "  bounds:    {:.5},{:.5} .. {:.5},{:.5}",
                bounds.south, bounds.west, bounds.north, bounds.east
            )?;
            writeln!(out, "  centre:    {:.5},{:.5}", center.lat, center.lng)?;
        }
        None => writeln!(out, "  bounds:    -")?,
    }

    match track.elevation_range() {
        Some((low, high)) => writeln!(out, "  elevation: {:.0} m .. {:.0} m", low, high)?,
        None => writeln!(out, "  elevation: -")?,
    }
    Ok(())
}
