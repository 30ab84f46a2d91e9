//! End-to-end scenarios for detection, resolution and deposit simulation.
//!
//! Each test follows GIVEN / WHEN / THEN and uses hand-built candles or
//! outcome streams with known answers.

use breakoutlab_core::{
    BalanceModel, Candle, CandleSeries, DepositConfig, DepositSimulator, DetectorConfig,
    Direction, DirectionPolicy, Outcome, OutcomeResolver, PathPolicy, SignalDetector,
    SignalEvent, SweepParameters, TradeOutcome,
};
use chrono::{Duration, NaiveDate, NaiveDateTime};

// ──────────────────────────────────────────────
// Helpers
// ──────────────────────────────────────────────

fn t0() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 4)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

fn minute_series(bars: &[(f64, f64, f64, f64)]) -> CandleSeries {
    let candles = bars
        .iter()
        .enumerate()
        .map(|(i, &(o, h, l, c))| Candle::new(t0() + Duration::minutes(i as i64), o, h, l, c))
        .collect();
    CandleSeries::new("BTCUSDT", candles).unwrap()
}

fn stop_at(offset: Duration) -> TradeOutcome {
    TradeOutcome {
        instrument: "BTCUSDT".into(),
        time: t0() + offset,
        direction: Direction::Long,
        change_pct: 7.2,
        outcome: Outcome::Stop,
    }
}

// ──────────────────────────────────────────────
// Detection + resolution
// ──────────────────────────────────────────────

#[test]
fn breakout_long_hits_take_profit() {
    // GIVEN five one-minute candles opening at 100, the second closing at 108
    // AND a third candle reaching 114 without trading back to the stop
    let series = minute_series(&[
        (100.0, 101.0, 99.5, 100.5),
        (100.0, 108.5, 100.0, 108.0),
        (100.0, 114.0, 107.5, 112.0),
        (100.0, 101.0, 99.0, 100.0),
        (100.0, 101.0, 99.0, 100.0),
    ]);

    // AND a 7% threshold, 5% target, 1% stop, momentum direction
    let config = DetectorConfig::new(7.0, 5.0, 1.0)
        .unwrap()
        .with_direction_policy(DirectionPolicy::Momentum);
    let detector = SignalDetector::new(config);

    // WHEN the series is scanned
    let resolved: Vec<_> = detector.scan(&series).collect();

    // THEN one LONG signal fires at the second candle
    assert_eq!(resolved.len(), 1);
    let event = &resolved[0].event;
    assert_eq!(event.bar_index, 1);
    assert_eq!(event.direction, Direction::Long);
    assert!((event.change_pct - 8.0).abs() < 1e-9);
    assert_eq!(event.entry_price, 108.0);
    assert!((event.take_profit_price - 113.4).abs() < 1e-9);
    assert!((event.stop_loss_price - 106.92).abs() < 1e-9);

    // AND the third candle takes profit
    assert_eq!(resolved[0].outcome.outcome, Outcome::Take);
    assert_eq!(resolved[0].resolved_index, 2);
    assert_eq!(resolved[0].outcome.time, t0() + Duration::minutes(1));
}

#[test]
fn scanning_resumes_after_the_exit_candle() {
    // GIVEN two breakouts, the second starting on the first trade's exit candle
    let series = minute_series(&[
        (100.0, 108.5, 100.0, 108.0),
        (100.0, 114.0, 107.5, 109.0),
        (100.0, 100.5, 92.0, 92.0),
        (92.0, 92.5, 85.0, 86.0),
    ]);
    let detector = SignalDetector::new(DetectorConfig::new(7.0, 5.0, 1.0).unwrap());

    // WHEN scanned
    let outcomes = detector.outcomes(&series);

    // THEN the exit candle is never an entry; the next breakout is found after it
    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].time, t0());
    assert_eq!(outcomes[1].time, t0() + Duration::minutes(2));
    assert_eq!(outcomes[1].direction, Direction::Short);
    assert_eq!(outcomes[1].outcome, Outcome::Take);
}

#[test]
fn tie_break_depends_only_on_path_policy() {
    // GIVEN a LONG event and a candle crossing both levels
    let series = minute_series(&[
        (100.0, 108.5, 100.0, 108.0),
        (108.0, 120.0, 90.0, 108.0),
    ]);
    let config = DetectorConfig::new(7.0, 5.0, 1.0).unwrap();
    let base = SignalDetector::new(config);
    let event: SignalEvent = base.candidate_at(&series, 0).unwrap();

    // WHEN resolved under each policy, twice
    for _ in 0..2 {
        let worst = OutcomeResolver::new(PathPolicy::WorstCase).resolve(&series, &event, 0);
        let best = OutcomeResolver::new(PathPolicy::BestCase).resolve(&series, &event, 0);

        // THEN the flag alone decides
        assert_eq!(worst.outcome.outcome, Outcome::Stop);
        assert_eq!(best.outcome.outcome, Outcome::Take);
        assert_eq!(worst.resolved_index, best.resolved_index);
    }

    // AND the detector honours the configured policy
    let optimistic = SignalDetector::new(config.with_path_policy(PathPolicy::BestCase));
    assert_eq!(optimistic.outcomes(&series)[0].outcome, Outcome::Take);
    assert_eq!(base.outcomes(&series)[0].outcome, Outcome::Stop);
}

#[test]
fn reversal_policy_trades_against_the_breakout() {
    // GIVEN a +8% candle followed by a pullback
    let series = minute_series(&[
        (100.0, 108.5, 100.0, 108.0),
        (108.0, 108.2, 101.0, 102.0),
    ]);
    let config = DetectorConfig::new(7.0, 5.0, 1.0)
        .unwrap()
        .with_direction_policy(DirectionPolicy::Reversal);

    // WHEN scanned with the reversal policy
    let outcomes = SignalDetector::new(config).outcomes(&series);

    // THEN the trade is SHORT and the pullback below 102.6 takes profit
    assert_eq!(outcomes[0].direction, Direction::Short);
    assert_eq!(outcomes[0].outcome, Outcome::Take);
}

// ──────────────────────────────────────────────
// Deposit simulation
// ──────────────────────────────────────────────

#[test]
fn loss_streak_arms_suspension_and_vetoes_next_stop() {
    // GIVEN start 1.0, +3% / -1%, streak limit 2, five-day window
    let simulator = DepositSimulator::new(DepositConfig::new(1.0, 0.0).unwrap());
    let params = SweepParameters::new(
        2,
        Duration::days(5),
        BalanceModel::compounding(3.0, -1.0).unwrap(),
    )
    .unwrap();

    // AND three stops one hour apart
    let stream = vec![
        stop_at(Duration::zero()),
        stop_at(Duration::hours(1)),
        stop_at(Duration::hours(2)),
    ];

    // WHEN simulated
    let run = simulator.simulate(&stream, &params);

    // THEN the first two apply and the third is skipped
    assert_eq!(run.balance_curve.len(), 2);
    assert!((run.balance_curve[0] - 0.99).abs() < 1e-12);
    assert!((run.balance_curve[1] - 0.9801).abs() < 1e-12);
    assert_eq!(run.skipped_suspended, 1);

    // AND the suspension runs from the second stop for five days
    assert_eq!(
        run.suspended_until,
        Some(t0() + Duration::hours(1) + Duration::days(5))
    );

    // AND the skipped stop did not re-arm anything
    assert_eq!(run.suspensions, 1);
    assert!((run.final_balance - 0.9801).abs() < 1e-12);
}

#[test]
fn streak_restarts_after_suspension_expires() {
    // GIVEN streak limit 2 and a one-day window
    let simulator = DepositSimulator::default();
    let params =
        SweepParameters::new(2, Duration::days(1), BalanceModel::default()).unwrap();

    // AND stops at 0h, 1h (arms until 25h), 2h (vetoed), 30h, 31h (arms again)
    let stream = vec![
        stop_at(Duration::hours(0)),
        stop_at(Duration::hours(1)),
        stop_at(Duration::hours(2)),
        stop_at(Duration::hours(30)),
        stop_at(Duration::hours(31)),
    ];

    // WHEN simulated
    let run = simulator.simulate(&stream, &params);

    // THEN the counter started fresh after the first suspension
    assert_eq!(run.losses, 4);
    assert_eq!(run.skipped_suspended, 1);
    assert_eq!(run.suspensions, 2);
    assert_eq!(
        run.suspended_until,
        Some(t0() + Duration::hours(31) + Duration::days(1))
    );
}

#[test]
fn balance_models_are_interchangeable() {
    // GIVEN one stream and both balance models
    let stream = vec![
        stop_at(Duration::zero()),
        TradeOutcome {
            outcome: Outcome::Take,
            ..stop_at(Duration::hours(1))
        },
    ];
    let compounding =
        SweepParameters::new(0, Duration::zero(), BalanceModel::compounding(3.0, -1.0).unwrap())
            .unwrap();
    let split = SweepParameters::new(
        0,
        Duration::zero(),
        BalanceModel::split_reserve(0.8, 3.0, -1.0).unwrap(),
    )
    .unwrap();

    // WHEN both are simulated by the same simulator
    let simulator = DepositSimulator::default();
    let full = simulator.final_balance(&stream, &compounding);
    let partial = simulator.final_balance(&stream, &split);

    // THEN each follows its own arithmetic
    assert!((full - 0.99 * 1.03).abs() < 1e-12);
    assert!((partial - 0.992 * 1.024).abs() < 1e-12);
}

#[test]
fn expired_suspension_deadline_is_still_reported() {
    // GIVEN streak limit 1 and a one-hour window
    let params = SweepParameters::new(1, Duration::hours(1), BalanceModel::default()).unwrap();

    // AND a stop that arms the window, then a win a day later
    let stream = vec![
        stop_at(Duration::zero()),
        TradeOutcome {
            outcome: Outcome::Take,
            ..stop_at(Duration::days(1))
        },
    ];

    // WHEN simulated
    let run = DepositSimulator::default().simulate(&stream, &params);

    // THEN the win applied, and the last armed deadline is kept even though it passed
    assert_eq!(run.wins, 1);
    assert_eq!(run.skipped_suspended, 0);
    assert_eq!(run.suspended_until, Some(t0() + Duration::hours(1)));
}
