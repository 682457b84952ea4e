use std::collections::BTreeSet;

use log::{debug, warn};

use crate::errors::SubtitleError;
use crate::frame_time::FrameTime;
use crate::subtitle_processor::{Subtitle, SubtitleSequence};

// @module: Piecewise-linear synchronisation of subtitle timings

/// New timing requested for one subtitle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyncPoint {
    /// Zero-based subtitle index
    pub sub_no: usize,
    pub start: FrameTime,
    pub end: FrameTime,
}

impl SyncPoint {
    pub fn new(sub_no: usize, start: FrameTime, end: FrameTime) -> Self {
        Self { sub_no, start, end }
    }
}

/// Outcome of a synchronisation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Subtitles timed before the anchor preceding them, placed on that anchor
    pub clamped: Vec<usize>,
}

impl SyncReport {
    pub fn is_clean(&self) -> bool {
        self.clamped.is_empty()
    }
}

// Old and new timing of an anchoring subtitle, in milliseconds
#[derive(Debug, Clone, Copy)]
struct Anchor {
    index: usize,
    old_start: i64,
    old_end: i64,
    new_start: i64,
    new_end: i64,
}

/// Re-times a sequence in place
pub struct TimeSync<'a> {
    subs: &'a mut SubtitleSequence,
}

impl<'a> TimeSync<'a> {
    pub fn new(subs: &'a mut SubtitleSequence) -> Self {
        Self { subs }
    }

    /// Move the given subtitles to their new times and stretch everything between them.
    ///
    /// Subtitles before the first point and after the last one are anchored to their current
    /// times. The sequence is only changed when every subtitle could be re-timed.
    pub fn sync(&mut self, points: &[SyncPoint]) -> Result<SyncReport, SubtitleError> {
        if points.is_empty() {
            debug!("No sync points given, nothing to do");
            return Ok(SyncReport::default());
        }

        let subs = self.subs.subtitles();
        let fps = self.validate(points)?;
        let anchors = Self::anchors(subs, points)?;

        let out_of_range = |index: usize| SubtitleError::TimeOutOfRange(format!("subtitle {} after sync", index + 1));
        let mut warped: Vec<Subtitle> = subs.to_vec();
        let mut clamped = BTreeSet::new();

        for pair in anchors.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if a.index == b.index {
                continue;
            }

            for index in a.index..=b.index {
                let original = &subs[index];
                let Some(old_start) = original.start() else {
                    continue;
                };

                let (start, start_clamped) = warp(old_start.ms(), a.old_start, b.old_start, a.new_start, b.new_start)
                    .ok_or_else(|| out_of_range(index))?;
                warped[index].set_start(FrameTime::from_ms(fps, start)?)?;

                let mut end_clamped = false;
                if let Some(old_end) = original.end() {
                    let (end, was_clamped) = warp(old_end.ms(), a.old_end, b.old_end, a.new_end, b.new_end)
                        .ok_or_else(|| out_of_range(index))?;
                    warped[index].set_end(FrameTime::from_ms(fps, end)?)?;
                    end_clamped = was_clamped;
                }

                if (start_clamped || end_clamped) && index != b.index {
                    clamped.insert(index);
                }
            }
        }

        // Anchored subtitles land exactly on the requested times
        for anchor in &anchors {
            warped[anchor.index].set_start(FrameTime::from_ms(fps, anchor.new_start)?)?;
            warped[anchor.index].set_end(FrameTime::from_ms(fps, anchor.new_end)?)?;
        }

        for (index, sub) in warped.iter().enumerate() {
            let negative = sub.start().is_some_and(|t| t.is_negative()) || sub.end().is_some_and(|t| t.is_negative());
            if negative {
                return Err(SubtitleError::NegativeTime { index });
            }
        }

        let clamped: Vec<usize> = clamped.into_iter().collect();
        for index in &clamped {
            warn!("Subtitle {} starts before its sync anchor, pinned to the anchor", index + 1);
        }

        debug!("Synchronised {} subtitles with {} anchors", warped.len(), anchors.len());
        self.subs.replace_subtitles(warped);
        Ok(SyncReport { clamped })
    }

    /// Check indices and frame rates; returns the sequence frame rate
    fn validate(&self, points: &[SyncPoint]) -> Result<f64, SubtitleError> {
        let len = self.subs.len();
        let fps = self.subs.fps();

        for point in points {
            if point.sub_no >= len {
                return Err(SubtitleError::IndexOutOfRange { index: point.sub_no, len });
            }
            for time in [point.start, point.end] {
                if let Some(expected) = fps {
                    if !FrameTime::same_fps(expected, time.fps()) {
                        return Err(SubtitleError::IncompatibleRate { expected, found: time.fps() });
                    }
                }
            }
        }

        // A non-empty sequence always has a rate
        fps.ok_or(SubtitleError::IndexOutOfRange { index: points[0].sub_no, len })
    }

    /// Sorted anchors, with identity anchors added at both ends when missing
    fn anchors(subs: &[Subtitle], points: &[SyncPoint]) -> Result<Vec<Anchor>, SubtitleError> {
        let identity = |index: usize| -> Result<Anchor, SubtitleError> {
            let (old_start, old_end) = Self::old_times(subs, index)?;
            Ok(Anchor {
                index,
                old_start,
                old_end,
                new_start: old_start,
                new_end: old_end,
            })
        };

        let mut sorted = points.to_vec();
        sorted.sort_by_key(|p| p.sub_no);

        let mut anchors = Vec::with_capacity(sorted.len() + 2);
        if sorted.first().is_some_and(|p| p.sub_no != 0) {
            anchors.push(identity(0)?);
        }
        for point in &sorted {
            let (old_start, old_end) = Self::old_times(subs, point.sub_no)?;
            anchors.push(Anchor {
                index: point.sub_no,
                old_start,
                old_end,
                new_start: point.start.ms(),
                new_end: point.end.ms(),
            });
        }
        let last = subs.len() - 1;
        if sorted.last().is_some_and(|p| p.sub_no != last) {
            anchors.push(identity(last)?);
        }
        Ok(anchors)
    }

    fn old_times(subs: &[Subtitle], index: usize) -> Result<(i64, i64), SubtitleError> {
        let sub = &subs[index];
        let start = sub
            .start()
            .ok_or_else(|| SubtitleError::IncompleteSubtitle(format!("subtitle {} has no start time", index + 1)))?;
        let end = sub.end().unwrap_or(start);
        Ok((start.ms(), end.ms()))
    }
}

/// Map `old` from the anchor span `[a_old, b_old]` onto `[a_new, a_new + |b_new - a_new|]`.
///
/// Times before `a_old` are pinned to `a_new`; the flag reports it. `None` when the result does not
/// fit into an `i64`.
fn warp(old: i64, a_old: i64, b_old: i64, a_new: i64, b_new: i64) -> Option<(i64, bool)> {
    let old_delta = (i128::from(b_old) - i128::from(a_old)).abs();
    let new_delta = (i128::from(b_new) - i128::from(a_new)).abs();
    let offset = i128::from(old) - i128::from(a_old);

    let proportion = if old_delta == 0 {
        0.0
    } else {
        offset.max(0) as f64 / old_delta as f64
    };
    let new = i128::from(a_new) + (new_delta as f64 * proportion).round() as i128;
    i64::try_from(new).ok().map(|new| (new, offset < 0))
}
