use anyhow::{bail, Context, Result};
use clap::Args;
use serde_json::Value;
use std::io::{self, Write};
use tracing::{debug, info};
use unicode_width::UnicodeWidthStr;

use crate::config::Config;
use crate::track::TrackService;
use crate::tui::components::lists::{wrap_line, Paginator, TemplateBinder, ViewportOracle};

type CataloguePager = Paginator<Value, ViewportOracle, TemplateBinder>;

/// Print the catalogue one page at a time
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Rows available per page
    #[arg(short = 'r', long = "rows", default_value = "20")]
    pub rows: u16,

    /// Columns available per row, longer lines wrap
    #[arg(short = 'w', long = "width", default_value = "80")]
    pub width: u16,

    /// Only print this page (one-based)
    #[arg(short = 'p', long = "page")]
    pub page: Option<usize>,
}

impl ListCommand {
    pub async fn execute(&self, config: &Config) -> Result<()> {
        debug!(rows = self.rows, width = self.width, "Executing list command");

        let service = TrackService::new(&config.tracks).context("invalid tracks.endpoint")?;
        let catalogue = service.load_catalogue().await?;
        info!("Loaded {} tracks", catalogue.len());

        let mut pager = Paginator::new(
            ViewportOracle::new(self.width, self.rows),
            config.list.binder()?,
        );
        pager.set_items(catalogue);

        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.write_pages(&mut pager, &mut out)
    }

    fn write_pages<W: Write>(&self, pager: &mut CataloguePager, out: &mut W) -> Result<()> {
        let pages = pager.page_count();
        if pages == 0 {
            writeln!(out, "No tracks")?;
            return Ok(());
        }

        let wanted = match self.page {
            Some(page) if page == 0 || page > pages => {
                bail!("page {} out of range, the catalogue has {} pages", page, pages)
            }
            Some(page) => page - 1..page,
            None => 0..pages,
        };

        for (n, page) in wanted.enumerate() {
            if n > 0 {
                writeln!(out)?;
            }
            pager.jump(isize::try_from(page).unwrap_or(isize::MAX));
            self.write_page(pager, out)?;
        }
        Ok(())
    }

    fn write_page<W: Write>(&self, pager: &CataloguePager, out: &mut W) -> Result<()> {
        let header = format!("page {} of {}", pager.current_page() + 1, pager.page_count());
        let rows: Vec<String> = pager
            .active_slots()
            .flat_map(|slot| slot.lines().iter())
            .flat_map(|line| wrap_line(line, self.width))
            .collect();

        let rule = rows
            .iter()
            .map(|row| row.width())
            .chain(std::iter::once(header.width()))
            .max()
            .unwrap_or_default();

        writeln!(out, "{}", header)?;
        writeln!(out, "{}", "─".repeat(rule))?;
        for row in rows {
            writeln!(out, "{}", row)?;
        }
        Ok(())
    }
}
