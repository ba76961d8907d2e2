use super::*;

#[test]
fn manual_time_sleep_jumps_to_deadline() {
    let mut t = ManualTime::new();
    t.sleep_until(Duration::from_millis(250));
    assert_eq!(t.now(), Duration::from_millis(250));
    t.sleep_until(Duration::from_millis(100));
    assert_eq!(t.now(), Duration::from_millis(250));
    t.advance(Duration::from_secs(1));
    assert_eq!(t.now(), Duration::from_millis(1250));
    t.set(Duration::ZERO);
    assert_eq!(t.now(), Duration::ZERO);
}

#[test]
fn monotonic_time_waits_at_least_until_deadline() {
    let mut t = MonotonicTime::new();
    let deadline = t.now() + Duration::from_millis(5);
    t.sleep_until(deadline);
    assert!(t.now() >= deadline);
}
