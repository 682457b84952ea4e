/*!
 * Parser for `--sync` expressions.
 *
 * An expression is a comma-separated list of clauses, either
 *
 * - a single bare offset applied to every subtitle: `+0:00:02.500`, `-1m 30s`, `750ms`, or
 * - indexed clauses `N: TIME`, where `N` is 1-based (negative values count from the end) and
 *   `TIME` is a signed offset (`+2s`, `-0:00:01.000`) or an absolute start time (`0:01:10.5`).
 *
 * Absolute times keep the subtitle's display duration. Bare and indexed clauses cannot be mixed.
 */

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::SubtitleError;
use crate::frame_time::FrameTime;
use crate::subtitle_processor::SubtitleSequence;
use crate::sync::time_sync::SyncPoint;

// @const: Amounts with units, e.g. "1h 2m 3s 400ms"
static UNIT_TIME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:\d+\s*(?:ms|h|m|s)\s*)+$").unwrap()
});

static UNIT_PART_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\s*(ms|h|m|s)").unwrap());

// @const: "N: TIME"
static INDEXED_CLAUSE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(-?\d+)\s*:\s*(\S.*)$").unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq)]
enum TimeSpec {
    Offset(i64),
    Absolute(i64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Clause {
    Bare(i64),
    Indexed { index: usize, time: TimeSpec },
}

/// Turn a sync expression into sync points for `sequence`
pub fn parse_sync_expr(expr: &str, sequence: &SubtitleSequence) -> Result<Vec<SyncPoint>, SubtitleError> {
    if expr.trim().is_empty() {
        return Err(SubtitleError::EmptyInput);
    }

    let clauses = expr
        .split(',')
        .map(|clause| parse_clause(clause.trim(), sequence.len()))
        .collect::<Result<Vec<_>, _>>()?;

    let bare: Vec<i64> = clauses
        .iter()
        .filter_map(|c| match c {
            Clause::Bare(offset) => Some(*offset),
            Clause::Indexed { .. } => None,
        })
        .collect();

    if !bare.is_empty() {
        if bare.len() != clauses.len() {
            return Err(invalid(expr, "an offset for all subtitles cannot be combined with indexed clauses"));
        }
        if bare.len() > 1 {
            return Err(invalid(expr, "only one offset for all subtitles is allowed"));
        }
        return shift_all(bare[0], sequence);
    }

    let mut points: Vec<SyncPoint> = Vec::with_capacity(clauses.len());
    for clause in clauses {
        let Clause::Indexed { index, time } = clause else {
            continue;
        };
        if points.iter().any(|p| p.sub_no == index) {
            return Err(invalid(expr, &format!("subtitle {} is given more than once", index + 1)));
        }
        points.push(point_for(sequence, index, time)?);
    }
    Ok(points)
}

/// Anchors on the first and last subtitle, both moved by `offset`
fn shift_all(offset: i64, sequence: &SubtitleSequence) -> Result<Vec<SyncPoint>, SubtitleError> {
    if sequence.is_empty() {
        return Ok(Vec::new());
    }

    let mut indices = vec![0];
    if sequence.len() > 1 {
        indices.push(sequence.len() - 1);
    }
    indices
        .into_iter()
        .map(|index| point_for(sequence, index, TimeSpec::Offset(offset)))
        .collect()
}

fn point_for(sequence: &SubtitleSequence, index: usize, time: TimeSpec) -> Result<SyncPoint, SubtitleError> {
    let sub = sequence.get(index).ok_or(SubtitleError::IndexOutOfRange {
        index,
        len: sequence.len(),
    })?;
    let start = sub
        .start()
        .ok_or_else(|| SubtitleError::IncompleteSubtitle(format!("subtitle {} has no start time", index + 1)))?;
    let end = sub.end().unwrap_or(start);
    let fps = start.fps();

    let out_of_range = || SubtitleError::TimeOutOfRange(format!("subtitle {} moved past the time range", index + 1));
    let (new_start, new_end) = match time {
        TimeSpec::Offset(delta) => (
            start.ms().checked_add(delta).ok_or_else(out_of_range)?,
            end.ms().checked_add(delta).ok_or_else(out_of_range)?,
        ),
        TimeSpec::Absolute(at) => {
            let duration = end.ms().checked_sub(start.ms()).ok_or_else(out_of_range)?;
            (at, at.checked_add(duration).ok_or_else(out_of_range)?)
        }
    };

    Ok(SyncPoint::new(
        index,
        FrameTime::from_ms(fps, new_start)?,
        FrameTime::from_ms(fps, new_end)?,
    ))
}

fn parse_clause(clause: &str, len: usize) -> Result<Clause, SubtitleError> {
    if clause.is_empty() {
        return Err(invalid(clause, "empty clause"));
    }

    if let Some(offset) = parse_signed(clause) {
        return Ok(Clause::Bare(offset));
    }

    let caps = INDEXED_CLAUSE_REGEX
        .captures(clause)
        .ok_or_else(|| invalid(clause, "expected an offset or 'N: TIME'"))?;
    let number: i64 = caps[1].parse().map_err(|_| invalid(clause, "bad subtitle number"))?;
    let index = resolve_index(number, len).ok_or_else(|| invalid(clause, "no such subtitle number"))?;

    let time_text = caps[2].trim();
    let time = if time_text.starts_with(['+', '-']) {
        parse_signed(time_text).map(TimeSpec::Offset)
    } else {
        parse_unsigned(time_text).map(TimeSpec::Absolute)
    };
    let time = time.ok_or_else(|| invalid(clause, "bad time"))?;

    if index >= len {
        return Err(SubtitleError::IndexOutOfRange { index, len });
    }
    Ok(Clause::Indexed { index, time })
}

/// 1-based numbers count from the start, negative ones from the end
fn resolve_index(number: i64, len: usize) -> Option<usize> {
    match number {
        0 => None,
        n if n > 0 => usize::try_from(n - 1).ok(),
        n => len.checked_sub(usize::try_from(n.unsigned_abs()).ok()?),
    }
}

/// Optionally signed duration in milliseconds
fn parse_signed(s: &str) -> Option<i64> {
    let (sign, rest) = match s.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, s.strip_prefix('+').unwrap_or(s)),
    };
    parse_unsigned(rest.trim_start()).map(|ms| sign * ms)
}

/// `H:MM:SS[.mmm]` or unit amounts, in milliseconds
fn parse_unsigned(s: &str) -> Option<i64> {
    let s = s.trim();
    if s.contains(':') {
        // Any rate works, only the milliseconds are kept
        return FrameTime::from_time_string(1.0, s)
            .ok()
            .filter(|_| !s.starts_with(['+', '-']))
            .map(|t| t.ms());
    }

    if !UNIT_TIME_REGEX.is_match(s) {
        return None;
    }
    UNIT_PART_REGEX.captures_iter(s).try_fold(0i64, |total, caps| {
        let amount: i64 = caps[1].parse().ok()?;
        let unit_ms = match &caps[2] {
            "h" => 3_600_000,
            "m" => 60_000,
            "s" => 1_000,
            _ => 1,
        };
        total.checked_add(amount.checked_mul(unit_ms)?)
    })
}

fn invalid(expr: &str, reason: &str) -> SubtitleError {
    SubtitleError::InvalidSyncExpr(format!("{}: '{}'", reason, expr))
}
