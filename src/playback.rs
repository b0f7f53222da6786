//! Animated sweeps through the sections of a loaded alignment.
//!
//! Passes alternate direction: even passes run from the first row to the
//! last, odd passes from the last back to the first. Each row is applied
//! and then held for `frames_per_view` frames.

use crate::controller;
use crate::error::InspectError;
use crate::options::PlaybackOptions;
use crate::scene::SceneHost;
use crate::session::LiveScene;

/// Arguments of one playback run.
///
/// Values are signed so that what a user typed can be checked and
/// reported instead of rejected at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayArgs {
    /// Frames drawn per section.
    pub frames_per_view: i64,
    /// Number of passes.
    pub loop_number: i64,
}

impl Default for PlayArgs {
    fn default() -> Self {
        Self::from(&PlaybackOptions::default())
    }
}

impl From<&PlaybackOptions> for PlayArgs {
    fn from(opts: &PlaybackOptions) -> Self {
        Self {
            frames_per_view: i64::from(opts.frames_per_view),
            loop_number: i64::from(opts.loop_number),
        }
    }
}

/// Why a playback request did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No alignment is loaded.
    NoAlignment,
    /// Loop number below 1.
    InvalidLoopCount(i64),
    /// Frames per view below 1.
    InvalidFramesPerView(i64),
}

/// Result of a playback request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackOutcome {
    /// Every pass ran.
    Completed {
        /// Sections applied, counting repeats.
        views: usize,
        /// Frames drawn.
        frames: u64,
    },
    /// Nothing was drawn and the scene is unchanged.
    Skipped(SkipReason),
}

/// Row indices visited by a playback run.
///
/// Even passes run `0..len`, odd passes run `len - 1` down to `0`, so
/// three rows over two loops give `0, 1, 2, 2, 1, 0`. A backward pass
/// therefore repeats the last row of the forward pass before it, instead
/// of starting over at row 0 and wrapping to `len - 1, ..., 1`.
#[derive(Debug, Clone)]
pub struct PlaybackOrder {
    len: usize,
    loops: usize,
    pass: usize,
    step: usize,
}

impl PlaybackOrder {
    /// Order for `len` rows swept `loops` times.
    #[must_use]
    pub fn new(len: usize, loops: usize) -> Self {
        Self {
            len,
            loops,
            pass: 0,
            step: 0,
        }
    }
}

impl Iterator for PlaybackOrder {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.len == 0 {
            return None;
        }
        if self.step == self.len {
            self.step = 0;
            self.pass += 1;
        }
        if self.pass >= self.loops {
            return None;
        }
        let row = if self.pass % 2 == 0 {
            self.step
        } else {
            self.len - 1 - self.step
        };
        self.step += 1;
        Some(row)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = if self.len == 0 || self.pass >= self.loops {
            0
        } else {
            (self.loops - self.pass) * self.len - self.step
        };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for PlaybackOrder {}

/// Sweep through `live` according to `args`.
///
/// # Errors
///
/// Returns the first host error raised while moving the scene.
pub fn play<H: SceneHost + ?Sized>(
    host: &mut H,
    live: &mut LiveScene,
    args: PlayArgs,
) -> Result<PlaybackOutcome, InspectError> {
    if args.loop_number < 1 {
        log::warn!("Loop number must be greater than 0.");
        return Ok(PlaybackOutcome::Skipped(SkipReason::InvalidLoopCount(
            args.loop_number,
        )));
    }
    if args.frames_per_view < 1 {
        log::warn!("Frames per view must be greater than 0.");
        return Ok(PlaybackOutcome::Skipped(
            SkipReason::InvalidFramesPerView(args.frames_per_view),
        ));
    }

    let order = PlaybackOrder::new(live.table.len(), args.loop_number as usize);
    let mut views = 0;
    let mut frames = 0;
    for row in order {
        let _ = controller::select_row(host, live, row)?;
        views += 1;
        for _ in 0..args.frames_per_view {
            host.draw_new_frame();
            frames += 1;
        }
    }
    log::debug!("playback drew {views} views in {frames} frames");
    Ok(PlaybackOutcome::Completed { views, frames })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alternates_direction() {
        let order: Vec<usize> = PlaybackOrder::new(3, 2).collect();
        assert_eq!(order, vec![0, 1, 2, 2, 1, 0]);
        let three: Vec<usize> = PlaybackOrder::new(2, 3).collect();
        assert_eq!(three, vec![0, 1, 1, 0, 0, 1]);
    }

    #[test]
    fn empty_cases() {
        assert_eq!(PlaybackOrder::new(0, 4).count(), 0);
        assert_eq!(PlaybackOrder::new(5, 0).count(), 0);
    }

    #[test]
    fn exact_size() {
        let mut order = PlaybackOrder::new(4, 3);
        assert_eq!(order.len(), 12);
        let _ = order.next();
        let _ = order.next();
        assert_eq!(order.len(), 10);
    }

    #[test]
    fn defaults_follow_options() {
        assert_eq!(
            PlayArgs::default(),
            PlayArgs {
                frames_per_view: 10,
                loop_number: 1
            }
        );
    }
}
