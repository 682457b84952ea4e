/*!
 * Frame-rate aware time values.
 *
 * A `FrameTime` stores an exact, signed millisecond count together with the frame rate it
 * belongs to. Frame numbers and the hour/minute/second breakdown are derived on demand, so
 * changing the frame rate never loses timing information.
 */

use std::cmp::Ordering;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::SubtitleError;

// @const: [+|-]H:MM:SS[.mmm]
static TIME_STRING_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([+-])?(\d+):(\d{2}):(\d{2})(?:\.(\d{1,3}))?$").unwrap()
});

const MS_PER_SECOND: i64 = 1_000;
const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;

/// An instant measured in milliseconds at a given frame rate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTime {
    fps: f64,
    ms: i64,
}

/// Returns the frame rate back if it is usable
pub(crate) fn check_fps(fps: f64) -> Result<f64, SubtitleError> {
    if fps.is_finite() && fps > 0.0 {
        Ok(fps)
    } else {
        Err(SubtitleError::InvalidRate(fps))
    }
}

impl FrameTime {
    /// Create a time from a millisecond count
    pub fn from_ms(fps: f64, ms: i64) -> Result<Self, SubtitleError> {
        Ok(Self { fps: check_fps(fps)?, ms })
    }

    /// Create a time from a frame number; milliseconds are rounded half away from zero
    pub fn from_frame(fps: f64, frame: i64) -> Result<Self, SubtitleError> {
        let fps = check_fps(fps)?;
        let ms = (frame as f64 * MS_PER_SECOND as f64 / fps).round();
        // i64::MAX as f64 rounds up to 2^63, which is already out of range
        if !ms.is_finite() || ms >= i64::MAX as f64 || ms < i64::MIN as f64 {
            return Err(SubtitleError::TimeOutOfRange(format!("frame {} at {} fps", frame, fps)));
        }
        Ok(Self { fps, ms: ms as i64 })
    }

    /// Parse a `[+|-]H:MM:SS[.mmm]` time string.
    ///
    /// The hour field has arbitrary width, minutes and seconds take exactly two digits and must be
    /// below 60. Up to three fractional digits are read as a decimal fraction of a second, so
    /// `.5` means 500 milliseconds.
    pub fn from_time_string(fps: f64, s: &str) -> Result<Self, SubtitleError> {
        let fps = check_fps(fps)?;
        let malformed = || SubtitleError::MalformedTime(s.to_string());

        let caps = TIME_STRING_REGEX.captures(s).ok_or_else(malformed)?;

        let negative = caps.get(1).is_some_and(|m| m.as_str() == "-");
        let hours: i64 = caps[2].parse().map_err(|_| malformed())?;
        let minutes: i64 = caps[3].parse().map_err(|_| malformed())?;
        let seconds: i64 = caps[4].parse().map_err(|_| malformed())?;
        let millis: i64 = match caps.get(5) {
            Some(m) => format!("{:0<3}", m.as_str()).parse().map_err(|_| malformed())?,
            None => 0,
        };

        if minutes >= 60 || seconds >= 60 {
            return Err(malformed());
        }

        let magnitude = hours
            .checked_mul(MS_PER_HOUR)
            .and_then(|h| h.checked_add(minutes * MS_PER_MINUTE + seconds * MS_PER_SECOND + millis))
            .ok_or_else(malformed)?;

        Ok(Self {
            fps,
            ms: if negative { -magnitude } else { magnitude },
        })
    }

    /// Frames per second this time is expressed in
    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// Exact millisecond count
    pub fn ms(&self) -> i64 {
        self.ms
    }

    /// Frame number, rounded half away from zero
    pub fn frame(&self) -> i64 {
        (self.ms as f64 * self.fps / MS_PER_SECOND as f64).round() as i64
    }

    /// Time in (fractional) seconds
    pub fn full_seconds(&self) -> f64 {
        self.ms as f64 / MS_PER_SECOND as f64
    }

    pub fn is_negative(&self) -> bool {
        self.ms < 0
    }

    pub fn hours(&self) -> u64 {
        self.ms.unsigned_abs() / MS_PER_HOUR as u64
    }

    pub fn minutes(&self) -> u64 {
        (self.ms.unsigned_abs() % MS_PER_HOUR as u64) / MS_PER_MINUTE as u64
    }

    pub fn seconds(&self) -> u64 {
        (self.ms.unsigned_abs() % MS_PER_MINUTE as u64) / MS_PER_SECOND as u64
    }

    pub fn milliseconds(&self) -> u64 {
        self.ms.unsigned_abs() % MS_PER_SECOND as u64
    }

    /// Same instant at another frame rate; milliseconds are preserved
    pub fn with_fps(&self, fps: f64) -> Result<Self, SubtitleError> {
        Ok(Self {
            fps: check_fps(fps)?,
            ms: self.ms,
        })
    }

    /// Sum of two times of the same frame rate
    pub fn try_add(&self, other: &FrameTime) -> Result<Self, SubtitleError> {
        self.ensure_same_fps(other)?;
        let ms = self
            .ms
            .checked_add(other.ms)
            .ok_or_else(|| SubtitleError::TimeOutOfRange(format!("{} + {}", self, other)))?;
        Ok(Self { fps: self.fps, ms })
    }

    /// Difference of two times of the same frame rate; may be negative
    pub fn try_sub(&self, other: &FrameTime) -> Result<Self, SubtitleError> {
        self.ensure_same_fps(other)?;
        let ms = self
            .ms
            .checked_sub(other.ms)
            .ok_or_else(|| SubtitleError::TimeOutOfRange(format!("{} - {}", self, other)))?;
        Ok(Self { fps: self.fps, ms })
    }

    /// Multiply by a scalar, rounding the result to whole milliseconds
    pub fn scale(&self, factor: f64) -> Self {
        Self {
            fps: self.fps,
            ms: (self.ms as f64 * factor).round() as i64,
        }
    }

    /// Ordering of two times of the same frame rate
    pub fn compare(&self, other: &FrameTime) -> Result<Ordering, SubtitleError> {
        self.ensure_same_fps(other)?;
        Ok(self.ms.cmp(&other.ms))
    }

    /// `H:MM:SS.mmm`, prefixed with `-` for negative times
    pub fn to_time_string(&self) -> String {
        format!(
            "{}{}:{:02}:{:02}.{:03}",
            if self.is_negative() { "-" } else { "" },
            self.hours(),
            self.minutes(),
            self.seconds(),
            self.milliseconds()
        )
    }

    pub fn to_frame_string(&self) -> String {
        self.frame().to_string()
    }

    /// Whether two frame rates are the same rate
    pub fn same_fps(a: f64, b: f64) -> bool {
        a == b
    }

    fn ensure_same_fps(&self, other: &FrameTime) -> Result<(), SubtitleError> {
        if Self::same_fps(self.fps, other.fps) {
            Ok(())
        } else {
            Err(SubtitleError::IncompatibleRate {
                expected: self.fps,
                found: other.fps,
            })
        }
    }
}

impl PartialOrd for FrameTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(other).ok()
    }
}

impl fmt::Display for FrameTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_time_string())
    }
}
