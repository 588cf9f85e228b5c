use crate::estimator::{estimate, EstimateResult, NotExpectedReason};
use crate::sample::Sample;
use crate::series::{ingest, Series, SeriesWindow};

fn series(points: &[(f64, f64)]) -> Vec<Sample> {
    points.iter().copied().map(Sample::from).collect()
}

fn assert_close(actual: EstimateResult, expected: EstimateResult) {
    match (actual, expected) {
        (
            EstimateResult::AlreadyCrossed { crossing_time: a },
            EstimateResult::AlreadyCrossed { crossing_time: b },
        )
        | (
            EstimateResult::PredictedCrossing { crossing_time: a },
            EstimateResult::PredictedCrossing { crossing_time: b },
        ) => assert!((a - b).abs() < 1e-9, "{a} != {b}"),
        (a, b) => assert_eq!(a, b),
    }
}

#[test]
fn interpolates_crossing_midpoint() {
    let s = series(&[(0.0, 0.0), (10.0, 10.0)]);
    assert_close(
        estimate(&s, 5.0, 0.0),
        EstimateResult::AlreadyCrossed { crossing_time: 5.0 },
    );
}

#[test]
fn crossing_wins_over_falling_tail() {
    let s = series(&[
        (0.0, 0.0),
        (1.0, 10.0),
        (2.0, 9.0),
        (3.0, 8.0),
        (4.0, 7.0),
        (5.0, 6.0),
    ]);
    assert_close(
        estimate(&s, 5.0, 1e9),
        EstimateResult::AlreadyCrossed { crossing_time: 0.5 },
    );
}

#[test]
fn earliest_crossing_is_reported() {
    let s = series(&[(0.0, 0.0), (2.0, 10.0), (4.0, 0.0), (6.0, 10.0)]);
    assert_close(
        estimate(&s, 5.0, 0.0),
        EstimateResult::AlreadyCrossed { crossing_time: 1.0 },
    );
}

#[test]
fn touching_threshold_is_not_a_crossing() {
    // reaches 5 exactly, then falls away
    let s = series(&[(0.0, 0.0), (1.0, 5.0), (2.0, 2.0), (3.0, 0.0)]);
    let r = estimate(&s, 5.0, 0.0);
    assert!(!r.is_crossed());
    assert_eq!(r.reason(), Some(NotExpectedReason::TrendNotIncreasing));
}

#[test]
fn insufficient_data() {
    let insufficient = EstimateResult::not_expected(NotExpectedReason::InsufficientData);
    assert_eq!(estimate(&[], 1.0, 0.0), insufficient);
    assert_eq!(estimate(&series(&[(0.0, 0.0)]), 1.0, 0.0), insufficient);
}

#[test]
fn single_sample_above_threshold_is_still_insufficient() {
    let s = series(&[(0.0, 50.0)]);
    assert_eq!(
        estimate(&s, 1.0, 0.0).reason(),
        Some(NotExpectedReason::InsufficientData)
    );
}

#[test]
fn decreasing_window_not_increasing() {
    let s = series(&[(0.0, 9.0), (1.0, 8.0), (2.0, 7.0), (3.0, 6.0), (4.0, 5.0)]);
    assert_eq!(
        estimate(&s, 100.0, 0.0),
        EstimateResult::not_expected(NotExpectedReason::TrendNotIncreasing)
    );
}

#[test]
fn flat_window_not_increasing() {
    let s = series(&[(0.0, 3.0), (1.0, 3.0), (2.0, 3.0)]);
    assert_eq!(
        estimate(&s, 4.0, 0.0).reason(),
        Some(NotExpectedReason::TrendNotIncreasing)
    );
}

#[test]
fn predicts_future_crossing() {
    let s = series(&[(0.0, 0.0), (1.0, 2.0), (2.0, 4.0), (3.0, 6.0), (4.0, 8.0)]);
    assert_close(
        estimate(&s, 20.0, 10.0),
        EstimateResult::PredictedCrossing { crossing_time: 14.0 },
    );
}

#[test]
fn stale_prediction_not_expected() {
    let s = series(&[(0.0, 0.0), (1.0, 2.0), (2.0, 4.0), (3.0, 6.0), (4.0, 8.0)]);
    assert_eq!(
        estimate(&s, 20.0, 14.0),
        EstimateResult::not_expected(NotExpectedReason::StaleExtrapolation)
    );
    assert_eq!(
        estimate(&s, 20.0, 100.0).reason(),
        Some(NotExpectedReason::StaleExtrapolation)
    );
}

#[test]
fn only_last_five_points_drive_the_trend() {
    // long flat prefix followed by a clean ramp
    let mut points: Vec<(f64, f64)> = (0..10).map(|t| (f64::from(t), 1.0)).collect();
    points.extend((10..15).map(|t| (f64::from(t), f64::from(t - 10) * 2.0)));
    // nothing exceeds 20, so the ramp alone sets the prediction
    let s = series(&points);
    assert_close(
        estimate(&s, 20.0, 0.0),
        EstimateResult::PredictedCrossing { crossing_time: 24.0 },
    );
}

#[test]
fn time_step_taken_from_first_window_interval() {
    // slope 2 per index, first interval 60s, later intervals irregular
    let s = series(&[(0.0, 0.0), (60.0, 2.0), (90.0, 4.0), (200.0, 6.0), (210.0, 8.0)]);
    assert_close(
        estimate(&s, 20.0, 0.0),
        EstimateResult::PredictedCrossing {
            crossing_time: 210.0 + 10.0 * 60.0,
        },
    );
}

#[test]
fn zero_interval_is_degenerate() {
    let s = series(&[(5.0, 0.0), (5.0, 1.0), (6.0, 2.0)]);
    assert_eq!(
        estimate(&s, 10.0, 0.0),
        EstimateResult::not_expected(NotExpectedReason::DegenerateInterval)
    );
}

#[test]
fn estimate_does_not_mutate_input() {
    let s = series(&[(0.0, 0.0), (1.0, 2.0), (2.0, 4.0)]);
    let before = s.clone();
    let _ = estimate(&s, 3.0, 0.0);
    let _ = estimate(&s, 30.0, 0.0);
    assert_eq!(s, before);
}

#[test]
fn threshold_can_change_between_calls() {
    let s = series(&[(0.0, 0.0), (1.0, 2.0), (2.0, 4.0), (3.0, 6.0), (4.0, 8.0)]);
    assert!(estimate(&s, 3.0, 0.0).is_crossed());
    assert!(matches!(
        estimate(&s, 30.0, 0.0),
        EstimateResult::PredictedCrossing { .. }
    ));
    assert!(estimate(&s, 3.0, 0.0).is_crossed());
}

#[test]
fn ingest_rejects_non_increasing_time() {
    let s = Series::from_history(series(&[(0.0, 1.0), (1.0, 2.0)]), SeriesWindow::default());
    let same = ingest(s.clone(), Sample::new(1.0, 5.0));
    assert_eq!(same, s);
    let older = ingest(s.clone(), Sample::new(0.5, 5.0));
    assert_eq!(older, s);
}

#[test]
fn ingest_keeps_most_recent_window() {
    const W: usize = 200;
    let mut s = Series::new(SeriesWindow::with_max_samples(W));
    for t in 0..(W as u32 + 57) {
        s = ingest(s, Sample::new(f64::from(t), f64::from(t)));
    }
    assert_eq!(s.len(), W);
    assert_eq!(s.first().map(|x| x.time), Some(57.0));
    assert_eq!(s.last().map(|x| x.time), Some(f64::from(W as u32 + 56)));
    assert!(s.as_slice().windows(2).all(|p| p[0].time < p[1].time));
}
