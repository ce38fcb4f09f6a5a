use super::*;
use std::net::Ipv4Addr;

fn client(last_octet: u8) -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(127, 0, 0, last_octet))
}

#[test]
fn allows_up_to_limit() {
    let rl = RateLimiter::new();
    let now = Instant::now();

    for i in 0..rl.config.limit {
        assert!(rl.check_and_record_at(client(1), now).is_ok(), "request {i} should succeed");
    }
    assert!(matches!(
        rl.check_and_record_at(client(1), now),
        Err(RateLimitError::Exceeded { .. })
    ));
}

#[test]
fn clients_are_limited_independently() {
    let rl = RateLimiter::new();
    let now = Instant::now();

    for _ in 0..rl.config.limit {
        rl.check_and_record_at(client(1), now).unwrap();
    }
    assert!(rl.check_and_record_at(client(1), now).is_err());
    assert!(rl.check_and_record_at(client(2), now).is_ok());
}

#[test]
fn window_expiry_allows_new_requests() {
    let rl = RateLimiter::new();
    let start = Instant::now();

    for _ in 0..rl.config.limit {
        rl.check_and_record_at(client(1), start).unwrap();
    }
    assert!(rl.check_and_record_at(client(1), start).is_err());

    let later = start + rl.config.window + Duration::from_secs(1);
    assert!(rl.check_and_record_at(client(1), later).is_ok());
}

#[test]
fn error_message_names_the_limit() {
    let rl = RateLimiter::new();
    let now = Instant::now();
    for _ in 0..rl.config.limit {
        rl.check_and_record_at(client(1), now).unwrap();
    }
    let err = rl.check_and_record_at(client(1), now).unwrap_err();
    assert!(err.to_string().contains("rate limit exceeded"));
}
