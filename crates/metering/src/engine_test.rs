//! Tests for the metering engine flush/clear cycle

use super::*;
use crate::config::RateWindow;
use chrono::TimeZone;
use std::time::Duration;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

fn secs(s: i64) -> DateTime<Utc> {
    t0() + chrono::Duration::seconds(s)
}

fn engine(config: MeterConfig) -> MeterEngine {
    MeterEngine::new(config, "test-host").unwrap()
}

#[test]
fn test_new_rejects_invalid_config() {
    let config = MeterConfig::default().with_rates(vec![]);
    assert!(matches!(
        MeterEngine::new(config, "host"),
        Err(MeterError::Config(_))
    ));

    let config = MeterConfig::default().with_flush_interval(Duration::from_secs(7));
    assert!(MeterEngine::new(config, "host").is_err());
}

#[test]
fn test_flush_on_empty_registry_is_empty() {
    let engine = engine(MeterConfig::default());
    assert!(engine.flush(t0()).is_empty());
}

#[test]
fn test_mark_creates_meter_lazily() {
    let engine = engine(MeterConfig::default());
    assert_eq!(engine.meter_count(), 0);

    assert!(engine.mark("requests", t0(), t0()));
    assert_eq!(engine.meter_count(), 1);

    engine.mark("requests", t0(), t0());
    assert_eq!(engine.meter_count(), 1);
}

#[test]
fn test_flush_emits_snapshot_with_configured_rates() {
    let config = MeterConfig::default().with_rates(vec![RateWindow::OneMinute]);
    let engine = engine(config);

    engine.mark("requests", t0(), t0());
    let batch = engine.flush(secs(5));

    assert_eq!(batch.len(), 1);
    let snapshot = &batch[0];
    assert_eq!(snapshot.name, "requests");
    assert_eq!(snapshot.count, 1);
    assert_eq!(snapshot.host, "test-host");
    assert_eq!(snapshot.timestamp, secs(5));
    // 1 mark / 5s tick = 0.2/s = 12/min, seeded on first tick
    assert_eq!(snapshot.rate_1m, Some(12.0));
    assert_eq!(snapshot.rate_5m, None);
    assert_eq!(snapshot.rate_15m, None);
}

#[test]
fn test_flush_periodicity_two_ticks_per_interval() {
    // flush_interval 10s, tick 5s: first snapshot lands on the 2nd cycle
    let config = MeterConfig::default().with_flush_interval(Duration::from_secs(10));
    let engine = engine(config);

    engine.mark("requests", t0(), t0());

    assert!(engine.flush(secs(5)).is_empty());

    let batch = engine.flush(secs(10));
    assert_eq!(batch.len(), 1);
    assert_eq!(batch[0].count, 1);

    // Interval restarts after emission
    assert!(engine.flush(secs(15)).is_empty());
    assert_eq!(engine.flush(secs(20)).len(), 1);
}

#[test]
fn test_clear_independent_of_flush() {
    // flush every tick, clear every third tick
    let config = MeterConfig::default()
        .with_flush_interval(Duration::from_secs(5))
        .with_clear_interval(Duration::from_secs(15));
    let engine = engine(config);

    let mut counts = Vec::new();
    for cycle in 1..=3 {
        engine.mark("requests", t0(), t0());
        let batch = engine.flush(secs(cycle * 5));
        counts.push(batch[0].count);
    }

    // Count grows across the first three flushes, cleared after tick 3
    assert_eq!(counts, vec![1, 2, 3]);

    // Marks stopped: tick 4's snapshot shows the cleared state
    let batch = engine.flush(secs(20));
    assert_eq!(batch[0].count, 0);
    assert_eq!(batch[0].rate_1m, Some(0.0));
}

#[test]
fn test_same_cycle_snapshot_reflects_pre_clear_values() {
    // flush and clear both due on every cycle
    let config = MeterConfig::default()
        .with_flush_interval(Duration::from_secs(5))
        .with_clear_interval(Duration::from_secs(5));
    let engine = engine(config);

    engine.mark("requests", t0(), t0());
    engine.mark("requests", t0(), t0());

    let batch = engine.flush(secs(5));
    assert_eq!(batch[0].count, 2);

    // The clear landed after the snapshot was built
    assert_eq!(engine.registry().get_or_create("requests").count(), 0);
}

#[test]
fn test_clear_never_fires_without_interval() {
    let engine = engine(MeterConfig::default());

    engine.mark("requests", t0(), t0());
    for cycle in 1..=10 {
        engine.flush(secs(cycle * 5));
    }

    assert_eq!(engine.registry().get_or_create("requests").count(), 1);
}

#[test]
fn test_clear_does_not_touch_other_keys() {
    let config = MeterConfig::default().with_clear_interval(Duration::from_secs(5));
    let engine = engine(config);

    engine.mark("a", t0(), t0());
    engine.flush(secs(5)); // clears "a"

    engine.mark("b", t0(), t0());
    engine.mark("b", t0(), t0());
    let batch = engine.flush(secs(10));

    let b = batch.iter().find(|s| s.name == "b").unwrap();
    assert_eq!(b.count, 2);
}

#[test]
fn test_ignore_gate_boundary() {
    let config = MeterConfig::default().with_ignore_older_than(Duration::from_secs(10));
    let engine = engine(config);

    // 11 seconds old: skipped, no registry mutation
    assert!(!engine.mark("requests", t0(), secs(11)));
    assert_eq!(engine.meter_count(), 0);

    // 9 seconds old: counted
    assert!(engine.mark("requests", t0(), secs(9)));
    assert_eq!(engine.meter_count(), 1);
    assert_eq!(engine.registry().get_or_create("requests").count(), 1);
}

#[test]
fn test_no_gate_accepts_arbitrarily_old_events() {
    let engine = engine(MeterConfig::default());
    assert!(engine.mark("requests", t0(), secs(86_400)));
}

#[test]
fn test_rates_decay_across_flush_cycles() {
    let engine = engine(MeterConfig::default());

    engine.mark("requests", t0(), t0());
    let first = engine.flush(secs(5))[0].rate_1m.unwrap();

    // No further marks: the rate decays but stays above zero
    let second = engine.flush(secs(10))[0].rate_1m.unwrap();
    assert!(second < first);
    assert!(second > 0.0);
}

#[test]
fn test_concurrent_marks_one_tick_exact_rate() {
    use std::sync::Arc;
    use std::thread;

    let engine = Arc::new(engine(MeterConfig::default()));
    let mut handles = vec![];

    for _ in 0..10 {
        let e = Arc::clone(&engine);
        handles.push(thread::spawn(move || {
            for _ in 0..100 {
                e.mark("hot", t0(), t0());
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    let batch = engine.flush(secs(5));
    assert_eq!(batch[0].count, 1000);
    // instantaneous = 1000 / 5s, seeded exactly on the first tick
    assert_eq!(batch[0].rate_1m, Some(1000.0 / 5.0 * 60.0));
}
