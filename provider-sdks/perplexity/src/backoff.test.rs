use super::*;

fn assert_within_band(backoff: &Backoff, attempt: u32) {
    let base = backoff.base(attempt);
    let lower = base.mul_f64(0.5);
    let upper = base.mul_f64(1.25);
    for _ in 0..200 {
        let delay = backoff.delay(attempt);
        assert!(
            delay >= lower && delay <= upper,
            "attempt {attempt}: {delay:?} outside [{lower:?}, {upper:?}]"
        );
    }
}

#[test]
fn test_base_doubles_per_attempt() {
    let backoff = Backoff::default();
    assert_eq!(backoff.base(1), Duration::from_millis(500));
    assert_eq!(backoff.base(2), Duration::from_secs(1));
    assert_eq!(backoff.base(3), Duration::from_secs(2));
    assert_eq!(backoff.base(4), Duration::from_secs(4));
}

#[test]
fn test_base_is_capped() {
    let backoff = Backoff::default();
    assert_eq!(backoff.base(10), Backoff::DEFAULT_MAX);
    assert_eq!(backoff.base(200), Backoff::DEFAULT_MAX);
}

#[test]
fn test_delay_within_jitter_band() {
    let backoff = Backoff::default();
    for attempt in 1..=8 {
        assert_within_band(&backoff, attempt);
    }
}

#[test]
fn test_delay_never_exceeds_cap_plus_jitter() {
    let backoff = Backoff::default();
    let limit = Backoff::DEFAULT_MAX.mul_f64(1.25);
    for _ in 0..100 {
        assert!(backoff.delay(30) <= limit);
    }
}

#[test]
fn test_delay_reaches_lower_half_of_band() {
    let backoff = Backoff::default();
    let base = backoff.base(2);
    let threshold = base.mul_f64(0.75);
    let reached = (0..400).any(|_| backoff.delay(2) < threshold);
    assert!(reached, "jitter should be able to remove more than 25%");
}

#[test]
fn test_delay_is_not_constant() {
    let backoff = Backoff::default();
    let first = backoff.delay(3);
    let varied = (0..50).any(|_| backoff.delay(3) != first);
    assert!(varied, "jitter should vary the delay");
}

#[test]
fn test_custom_policy() {
    let backoff = Backoff::new(Duration::from_millis(10), Duration::from_millis(25));
    assert_eq!(backoff.initial(), Duration::from_millis(10));
    assert_eq!(backoff.max(), Duration::from_millis(25));
    assert_eq!(backoff.base(1), Duration::from_millis(10));
    assert_eq!(backoff.base(2), Duration::from_millis(20));
    assert_eq!(backoff.base(3), Duration::from_millis(25));
    assert_within_band(&backoff, 3);
}
