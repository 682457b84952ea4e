/*!
 * Tests for piecewise-linear synchronisation
 */

use subconvert::errors::SubtitleError;
use subconvert::subtitle_processor::SubtitleSequence;
use subconvert::sync::{SyncPoint, TimeSync};
use crate::common::{ends, ms, sequence_of, starts};

fn three_subs() -> SubtitleSequence {
    sequence_of(
        25.0,
        &[(10_000, 11_000, "one"), (20_000, 21_000, "two"), (30_000, 31_000, "three")],
    )
}

fn point(index: usize, start: i64, end: i64) -> SyncPoint {
    SyncPoint::new(index, ms(25.0, start), ms(25.0, end))
}

#[test]
fn test_sync_withBothEndsMoved_shouldStretchMiddle() {
    let mut sequence = three_subs();

    let report = TimeSync::new(&mut sequence)
        .sync(&[point(0, 0, 1_000), point(2, 100_000, 101_000)])
        .unwrap();

    assert!(report.is_clean());
    assert_eq!(starts(&sequence), vec![0, 50_000, 100_000]);
    assert_eq!(ends(&sequence), vec![1_000, 51_000, 101_000]);
}

#[test]
fn test_sync_withPointsInReverseOrder_shouldSortThem() {
    let mut sequence = three_subs();

    TimeSync::new(&mut sequence)
        .sync(&[point(2, 100_000, 101_000), point(0, 0, 1_000)])
        .unwrap();

    assert_eq!(starts(&sequence), vec![0, 50_000, 100_000]);
}

#[test]
fn test_sync_withCurrentTimes_shouldChangeNothing() {
    let mut sequence = three_subs();

    TimeSync::new(&mut sequence)
        .sync(&[point(0, 10_000, 11_000), point(2, 30_000, 31_000)])
        .unwrap();

    assert_eq!(starts(&sequence), vec![10_000, 20_000, 30_000]);
    assert_eq!(ends(&sequence), vec![11_000, 21_000, 31_000]);
}

#[test]
fn test_sync_withSingleMiddlePoint_shouldKeepEndsInPlace() {
    let mut sequence = three_subs();

    TimeSync::new(&mut sequence).sync(&[point(1, 25_000, 26_000)]).unwrap();

    assert_eq!(starts(&sequence), vec![10_000, 25_000, 30_000]);
    assert_eq!(ends(&sequence), vec![11_000, 26_000, 31_000]);
}

#[test]
fn test_sync_withSinglePointAtCurrentTime_shouldChangeNothing() {
    let mut sequence = three_subs();

    let report = TimeSync::new(&mut sequence).sync(&[point(1, 20_000, 21_000)]).unwrap();

    assert!(report.is_clean());
    assert_eq!(starts(&sequence), vec![10_000, 20_000, 30_000]);
    assert_eq!(ends(&sequence), vec![11_000, 21_000, 31_000]);
}

#[test]
fn test_sync_withNoPoints_shouldDoNothing() {
    let mut sequence = three_subs();
    let report = TimeSync::new(&mut sequence).sync(&[]).unwrap();

    assert!(report.is_clean());
    assert_eq!(starts(&sequence), vec![10_000, 20_000, 30_000]);

    let mut empty = SubtitleSequence::new();
    assert!(TimeSync::new(&mut empty).sync(&[]).is_ok());
}

#[test]
fn test_sync_withIndexOutOfRange_shouldFailAndLeaveSequence() {
    let mut sequence = three_subs();

    let result = TimeSync::new(&mut sequence).sync(&[point(0, 0, 1_000), point(5, 1, 2)]);

    assert_eq!(result, Err(SubtitleError::IndexOutOfRange { index: 5, len: 3 }));
    assert_eq!(starts(&sequence), vec![10_000, 20_000, 30_000]);
}

#[test]
fn test_sync_withNegativeResult_shouldFailAndLeaveSequence() {
    let mut sequence = three_subs();

    let result = TimeSync::new(&mut sequence).sync(&[point(0, -5_000, -4_000)]);

    assert_eq!(result, Err(SubtitleError::NegativeTime { index: 0 }));
    assert_eq!(starts(&sequence), vec![10_000, 20_000, 30_000]);
}

#[test]
fn test_sync_withOtherFrameRate_shouldFailIncompatibleRate() {
    let mut sequence = three_subs();
    let foreign = SyncPoint::new(1, ms(30.0, 0), ms(30.0, 1_000));

    let result = TimeSync::new(&mut sequence).sync(&[foreign]);

    assert_eq!(result, Err(SubtitleError::IncompatibleRate { expected: 25.0, found: 30.0 }));
}

#[test]
fn test_sync_withSubtitleBeforeAnchor_shouldClampAndReport() {
    let mut sequence = sequence_of(
        25.0,
        &[(10_000, 11_000, "one"), (5_000, 6_000, "early"), (30_000, 31_000, "three")],
    );

    let report = TimeSync::new(&mut sequence)
        .sync(&[point(0, 0, 1_000), point(2, 100_000, 101_000)])
        .unwrap();

    assert_eq!(report.clamped, vec![1]);
    assert!(!report.is_clean());
    assert_eq!(starts(&sequence), vec![0, 0, 100_000]);
    assert_eq!(ends(&sequence), vec![1_000, 1_000, 101_000]);
}

#[test]
fn test_sync_withShrinkingSpan_shouldCompressProportionally() {
    let mut sequence = sequence_of(
        25.0,
        &[(0, 1_000, "a"), (10_000, 11_000, "b"), (20_000, 21_000, "c"), (40_000, 41_000, "d")],
    );

    TimeSync::new(&mut sequence)
        .sync(&[point(0, 0, 1_000), point(3, 20_000, 21_000)])
        .unwrap();

    assert_eq!(starts(&sequence), vec![0, 5_000, 10_000, 20_000]);
    assert_eq!(ends(&sequence), vec![1_000, 6_000, 11_000, 21_000]);
}
