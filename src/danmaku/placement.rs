// =============================================================================
// COLLISION PLACEMENT
// =============================================================================
//
// Top comments stack downward in lanes, one row per active top comment.
// Moving comments enter just past the right edge. Every moving comment travels
// at the same speed, so a newcomer can only collide with a comment in its band
// whose right edge has not yet cleared the spawn edge; it never catches up
// later. The newcomer therefore takes the first band whose latest occupant has
// fully entered the surface.
//
// =============================================================================

use std::collections::HashSet;
use std::time::Duration;

use crate::core::{Mode, OverlayConfig};
use crate::danmaku::rendered::{Phase, RenderedComment, Slot};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub slot: Slot,
    pub x: f64,
    pub y: f64,
}

impl Placement {
    /// The whole row lies inside the surface.
    pub fn fits(&self, config: &OverlayConfig) -> bool {
        self.y + config.row_height <= config.surface.height
    }
}

pub fn place(pool: &[RenderedComment], mode: Mode, width: f64, now: Duration, config: &OverlayConfig) -> Placement {
    match mode {
        Mode::Top => place_top(pool, width, config),
        Mode::Move => place_move(pool, now, config),
    }
}

/// Lowest lane not held by an active top comment, horizontally centred.
pub fn place_top(pool: &[RenderedComment], width: f64, config: &OverlayConfig) -> Placement {
    let taken: HashSet<usize> = pool
        .iter()
        .filter(|other| other.phase == Phase::Active)
        .filter_map(|other| match other.slot {
            Slot::Lane(lane) => Some(lane),
            Slot::Band(_) => None,
        })
        .collect();

    let lane = (0..).find(|lane| !taken.contains(lane)).unwrap_or(0);

    let placement = Placement {
        slot: Slot::Lane(lane),
        x: (config.surface.width - width) / 2.0,
        y: lane as f64 * config.row_height,
    };
    if !placement.fits(config) {
        log::debug!("Top lane {} at y={:.0} is below the surface", lane, placement.y);
    }
    placement
}

pub fn place_move(pool: &[RenderedComment], now: Duration, config: &OverlayConfig) -> Placement {
    let spawn_x = config.surface.width;

    let band = (0..config.band_count())
        .find(|band| match latest_in_band(pool, *band) {
            Some(older) => !would_overlap(older, spawn_x, now, config.spacing),
            None => true,
        })
        .unwrap_or_else(|| {
            log::debug!("All {} bands busy, reusing the top band", config.band_count());
            0
        });

    Placement {
        slot: Slot::Band(band),
        x: spawn_x,
        y: band as f64 * config.row_height,
    }
}

/// Most recently placed active moving comment in `band`.
fn latest_in_band(pool: &[RenderedComment], band: usize) -> Option<&RenderedComment> {
    pool.iter()
        .rev()
        .find(|other| other.phase == Phase::Active && other.slot == Slot::Band(band))
}

/// Whether a comment entering at `spawn_x` would touch `older`: true while the
/// older comment's right edge (plus spacing) is still past the spawn edge.
pub fn would_overlap(older: &RenderedComment, spawn_x: f64, now: Duration, spacing: f64) -> bool {
    older.trailing_edge(now) + spacing > spawn_x
}
