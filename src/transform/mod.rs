//! Transformer stage: pure derivations from raw tables to the star schema.
//!
//! Every operation here is a deterministic function from input frame(s) to
//! an output frame, expressed as declarative polars transformations with no
//! I/O and no shared mutable state. Orderings are irrelevant except where an
//! explicit tie-break is documented (keep-first for catalog dedup,
//! keep-most-recent for users).

pub mod catalog;
pub mod plays;
pub mod songplays;
pub mod time;
pub mod users;

use crate::error::{EtlError, Result};
use crate::models::Table;
use polars::prelude::DataFrame;
use tracing::{debug, info};

/// The derived tables of one run. Only the tables the run needs are
/// populated; `get` indexes by table.
#[derive(Debug, Default)]
pub struct StarSchema {
    pub songs: Option<DataFrame>,
    pub artists: Option<DataFrame>,
    pub users: Option<DataFrame>,
    pub time: Option<DataFrame>,
    pub songplays: Option<DataFrame>,
}

impl StarSchema {
    pub fn get(&self, table: Table) -> Option<&DataFrame> {
        match table {
            Table::Songs => self.songs.as_ref(),
            Table::Artists => self.artists.as_ref(),
            Table::Users => self.users.as_ref(),
            Table::Time => self.time.as_ref(),
            Table::Songplays => self.songplays.as_ref(),
        }
    }
}

/// Transform-level accounting for the run summary
#[derive(Debug, Default, Clone, Copy)]
pub struct TransformStats {
    /// Events that passed the NextSong page filter
    pub events_scanned: usize,
    /// Filtered events dropped as malformed
    pub malformed_dropped: usize,
}

/// Derive the requested tables.
///
/// `raw_songs`/`raw_events` may be None when no requested table needs that
/// source. The songs and artists projections are computed whenever the fact
/// table is requested, even if they are not written themselves.
pub fn build(
    raw_songs: Option<&DataFrame>,
    raw_events: Option<&DataFrame>,
    tables: &[Table],
    max_drop_rate: f64,
) -> Result<(StarSchema, TransformStats)> {
    let wants = |t: Table| tables.contains(&t);
    let need_catalog = tables.iter().any(|t| t.needs_catalog());
    let need_events = tables.iter().any(|t| t.needs_events());

    let mut schema = StarSchema::default();
    let mut stats = TransformStats::default();

    if need_catalog {
        let raw = raw_songs.ok_or_else(|| EtlError::Configuration {
            message: "song catalog source required for requested tables".to_string(),
        })?;
        let songs = catalog::songs_table(raw)?;
        let artists = catalog::artists_table(raw)?;
        debug!("Derived {} songs, {} artists", songs.height(), artists.height());
        schema.songs = Some(songs);
        schema.artists = Some(artists);
    }

    if need_events {
        let raw = raw_events.ok_or_else(|| EtlError::Configuration {
            message: "event log source required for requested tables".to_string(),
        })?;
        let filtered = plays::filter_plays(raw)?;
        stats.events_scanned = filtered.scanned;
        stats.malformed_dropped = filtered.malformed;

        if filtered.malformed > 0 {
            info!(
                "Dropped {} of {} filtered events as malformed",
                filtered.malformed, filtered.scanned
            );
        }
        if filtered.scanned > 0 {
            let rate = filtered.malformed as f64 / filtered.scanned as f64;
            if rate > max_drop_rate {
                return Err(EtlError::MalformedThresholdExceeded {
                    dropped: filtered.malformed,
                    scanned: filtered.scanned,
                    max_drop_rate,
                });
            }
        }

        if wants(Table::Users) {
            schema.users = Some(users::users_table(&filtered.frame)?);
        }
        if wants(Table::Time) {
            schema.time = Some(time::time_table(&filtered.frame)?);
        }
        if wants(Table::Songplays) {
            let (songs, artists) = match (schema.songs.as_ref(), schema.artists.as_ref()) {
                (Some(songs), Some(artists)) => (songs, artists),
                _ => {
                    return Err(EtlError::Configuration {
                        message: "song catalog source required for songplays".to_string(),
                    });
                }
            };
            schema.songplays = Some(songplays::songplays_table(
                &filtered.frame,
                songs,
                artists,
            )?);
        }
    }

    // Projections computed only to feed the fact join are not part of the
    // requested output set
    if !wants(Table::Songs) {
        schema.songs = None;
    }
    if !wants(Table::Artists) {
        schema.artists = None;
    }

    Ok((schema, stats))
}
