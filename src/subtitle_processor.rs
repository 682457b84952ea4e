use std::fmt;

use log::debug;

use crate::errors::SubtitleError;
use crate::frame_time::{FrameTime, check_fps};
use crate::subtitle_header::SubtitleHeader;

// @module: Subtitle records and the ordered sequence that owns them

/// Display time given to the last subtitle when its end is unknown
pub const DEFAULT_LAST_DURATION_MS: i64 = 2_500;

/// Share of the gap to the next subtitle used as display time when the end is unknown
pub const SUCCESSOR_GAP_FACTOR: f64 = 0.85;

// @struct: Single subtitle
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Subtitle {
    start: Option<FrameTime>,
    end: Option<FrameTime>,
    text: Option<String>,
}

impl Subtitle {
    /// Creates a subtitle; `end`, when given, must use the frame rate of `start`
    pub fn new(start: FrameTime, end: Option<FrameTime>, text: impl Into<String>) -> Result<Self, SubtitleError> {
        let mut sub = Subtitle {
            start: Some(start),
            end: None,
            text: Some(text.into()),
        };
        if let Some(end) = end {
            sub.set_end(end)?;
        }
        Ok(sub)
    }

    pub fn start(&self) -> Option<FrameTime> {
        self.start
    }

    pub fn end(&self) -> Option<FrameTime> {
        self.end
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Frame rate of whichever time is set
    pub fn fps(&self) -> Option<f64> {
        self.start.or(self.end).map(|t| t.fps())
    }

    /// A subtitle is complete once it has a start and a text
    pub fn is_complete(&self) -> bool {
        self.start.is_some() && self.text.is_some()
    }

    pub fn set_start(&mut self, start: FrameTime) -> Result<(), SubtitleError> {
        if let Some(end) = &self.end {
            Self::ensure_fps(end.fps(), start.fps())?;
        }
        self.start = Some(start);
        Ok(())
    }

    pub fn set_end(&mut self, end: FrameTime) -> Result<(), SubtitleError> {
        if let Some(start) = &self.start {
            Self::ensure_fps(start.fps(), end.fps())?;
        }
        self.end = Some(end);
        Ok(())
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = Some(text.into());
    }

    /// Re-express both times at another frame rate without touching milliseconds
    pub fn change_fps(&mut self, fps: f64) -> Result<(), SubtitleError> {
        let start = self.start.map(|t| t.with_fps(fps)).transpose()?;
        let end = self.end.map(|t| t.with_fps(fps)).transpose()?;
        self.start = start;
        self.end = end;
        Ok(())
    }

    fn ensure_fps(expected: f64, found: f64) -> Result<(), SubtitleError> {
        if FrameTime::same_fps(expected, found) {
            Ok(())
        } else {
            Err(SubtitleError::IncompatibleRate { expected, found })
        }
    }
}

impl fmt::Display for Subtitle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let show = |t: &Option<FrameTime>| t.map_or_else(|| "?".to_string(), |t| t.to_time_string());
        write!(
            f,
            "{} --> {} {}",
            show(&self.start),
            show(&self.end),
            self.text.as_deref().unwrap_or("")
        )
    }
}

/// Whether the last subtitle carries a provisional end time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PendingEnd {
    /// Every end time is final
    #[default]
    Clean,
    /// The last subtitle's end was guessed without knowing its successor
    Pending,
}

/// Ordered collection of subtitles sharing one frame rate, plus the file header.
///
/// Accessors hand out copies: changing a returned `Subtitle` never changes the sequence.
#[derive(Debug, Clone)]
pub struct SubtitleSequence {
    subs: Vec<Subtitle>,
    header: SubtitleHeader,
    pending: PendingEnd,
}

impl Default for SubtitleSequence {
    fn default() -> Self {
        Self::new()
    }
}

impl SubtitleSequence {
    pub fn new() -> Self {
        SubtitleSequence {
            subs: Vec::new(),
            header: SubtitleHeader::new(),
            pending: PendingEnd::Clean,
        }
    }

    /// Add a subtitle at the end.
    ///
    /// A provisional end left by the previous append is recomputed against the new start first.
    /// A subtitle without an end gets `start + 2.5s` and becomes the pending one.
    pub fn append(&mut self, mut sub: Subtitle) -> Result<(), SubtitleError> {
        let start = Self::required_start(&sub)?;
        self.ensure_fps(start.fps())?;

        let resolved_end = match (self.pending, self.subs.last()) {
            (PendingEnd::Pending, Some(last)) => {
                let last_start = Self::required_start(last)?;
                Some(Self::successor_end(&last_start, &start)?)
            }
            _ => None,
        };

        let provisional = sub.end.is_none();
        if provisional {
            sub.end = Some(Self::last_end(&start)?);
        }

        let count = self.subs.len();
        if let (Some(end), Some(last)) = (resolved_end, self.subs.last_mut()) {
            debug!("Resolved provisional end of subtitle {} to {}", count, end);
            last.end = Some(end);
        }
        self.pending = if provisional { PendingEnd::Pending } else { PendingEnd::Clean };
        self.subs.push(sub);
        Ok(())
    }

    /// Insert a subtitle before `index`; an index past the end appends.
    ///
    /// A missing end is computed against the subtitle currently at `index`.
    pub fn insert(&mut self, index: usize, mut sub: Subtitle) -> Result<(), SubtitleError> {
        if index >= self.subs.len() {
            return self.append(sub);
        }

        let start = Self::required_start(&sub)?;
        self.ensure_fps(start.fps())?;

        if sub.end.is_none() {
            let next_start = Self::required_start(&self.subs[index])?;
            sub.end = Some(Self::successor_end(&start, &next_start)?);
        }
        self.subs.insert(index, sub);
        Ok(())
    }

    /// Remove and return the subtitle at `index`
    pub fn remove(&mut self, index: usize) -> Result<Subtitle, SubtitleError> {
        self.check_index(index)?;
        if index + 1 == self.subs.len() {
            self.pending = PendingEnd::Clean;
        }
        Ok(self.subs.remove(index))
    }

    /// Re-express every subtitle at another frame rate; milliseconds are kept
    pub fn change_fps(&mut self, fps: f64) -> Result<(), SubtitleError> {
        let fps = check_fps(fps)?;
        let mut changed = self.subs.clone();
        for sub in changed.iter_mut() {
            sub.change_fps(fps)?;
        }
        self.subs = changed;
        Ok(())
    }

    pub fn change_sub_text(&mut self, index: usize, text: impl Into<String>) -> Result<(), SubtitleError> {
        self.check_index(index)?;
        self.subs[index].set_text(text);
        Ok(())
    }

    pub fn change_sub_start(&mut self, index: usize, start: FrameTime) -> Result<(), SubtitleError> {
        self.check_index(index)?;
        self.ensure_fps(start.fps())?;
        self.subs[index].set_start(start)
    }

    /// Set an explicit end; this also settles a provisional one
    pub fn change_sub_end(&mut self, index: usize, end: FrameTime) -> Result<(), SubtitleError> {
        self.check_index(index)?;
        self.ensure_fps(end.fps())?;
        self.subs[index].set_end(end)?;
        if index + 1 == self.subs.len() {
            self.pending = PendingEnd::Clean;
        }
        Ok(())
    }

    /// Shift every start and end by `delta`. Results are not clamped at zero.
    pub fn offset(&mut self, delta: &FrameTime) -> Result<(), SubtitleError> {
        self.ensure_fps(delta.fps())?;
        let mut shifted = self.subs.clone();
        for sub in shifted.iter_mut() {
            if let Some(start) = sub.start {
                sub.start = Some(start.try_add(delta)?);
            }
            if let Some(end) = sub.end {
                sub.end = Some(end.try_add(delta)?);
            }
        }
        self.subs = shifted;
        Ok(())
    }

    /// Copy of the subtitle at `index`
    pub fn get(&self, index: usize) -> Option<Subtitle> {
        self.subs.get(index).cloned()
    }

    /// Copies of all subtitles, in order
    pub fn iter(&self) -> impl Iterator<Item = Subtitle> + '_ {
        self.subs.iter().cloned()
    }

    pub fn len(&self) -> usize {
        self.subs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subs.is_empty()
    }

    /// Frame rate of the sequence, taken from the first subtitle
    pub fn fps(&self) -> Option<f64> {
        self.subs.first().and_then(Subtitle::fps)
    }

    pub fn header(&self) -> &SubtitleHeader {
        &self.header
    }

    pub fn header_mut(&mut self) -> &mut SubtitleHeader {
        &mut self.header
    }

    pub fn pending_end(&self) -> PendingEnd {
        self.pending
    }

    pub fn has_pending_end(&self) -> bool {
        self.pending == PendingEnd::Pending
    }

    /// Drop all subtitles and header values
    pub fn clear(&mut self) {
        self.subs.clear();
        self.header.clear();
        self.pending = PendingEnd::Clean;
    }

    pub(crate) fn subtitles(&self) -> &[Subtitle] {
        &self.subs
    }

    pub(crate) fn replace_subtitles(&mut self, subs: Vec<Subtitle>) {
        self.subs = subs;
    }

    /// End time for a subtitle followed by one starting at `next_start`
    pub fn successor_end(start: &FrameTime, next_start: &FrameTime) -> Result<FrameTime, SubtitleError> {
        let gap = next_start.try_sub(start)?;
        start.try_add(&gap.scale(SUCCESSOR_GAP_FACTOR))
    }

    /// End time for a subtitle with no known successor
    pub fn last_end(start: &FrameTime) -> Result<FrameTime, SubtitleError> {
        start.try_add(&FrameTime::from_ms(start.fps(), DEFAULT_LAST_DURATION_MS)?)
    }

    fn required_start(sub: &Subtitle) -> Result<FrameTime, SubtitleError> {
        sub.start
            .ok_or_else(|| SubtitleError::IncompleteSubtitle("subtitle has no start time".to_string()))
    }

    fn check_index(&self, index: usize) -> Result<(), SubtitleError> {
        if index < self.subs.len() {
            Ok(())
        } else {
            Err(SubtitleError::IndexOutOfRange {
                index,
                len: self.subs.len(),
            })
        }
    }

    fn ensure_fps(&self, fps: f64) -> Result<(), SubtitleError> {
        match self.fps() {
            Some(expected) if !FrameTime::same_fps(expected, fps) => {
                Err(SubtitleError::IncompatibleRate { expected, found: fps })
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for SubtitleSequence {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Subtitle Sequence")?;
        match self.fps() {
            Some(fps) => writeln!(f, "FPS: {}", fps)?,
            None => writeln!(f, "FPS: undefined")?,
        }
        writeln!(f, "Subtitles: {}", self.subs.len())?;
        Ok(())
    }
}
