//! Integration tests for the relay and render loop.
//!
//! Each test stages messages the way the receiver does and drives the render
//! loop one wake cycle at a time, checking the resident queue and the
//! directives sent to the display.
//!
//! ## Test Coverage
//! - Pending-slot overwrite when arrivals outpace promotion
//! - Stacking order of primary and secondary lines
//! - Expiry of the oldest message, one per wake cycle
//! - Capacity eviction across many arrivals

use std::thread;
use std::time::{Duration, Instant};

use crate::common::*;

/// Arrivals faster than promotion: only the last one is ever queued.
#[test]
fn test_burst_keeps_only_last_arrival() {
    let relay = relay(3, Duration::from_secs(5));
    let render = RenderLoop::new(relay.clone(), true);

    for text in ["M1", "M2", "M3", "M4"] {
        relay.stage(text);
    }
    let frame = render.tick().unwrap();

    assert_eq!(relay.resident(), vec!["M4"]);
    assert_eq!(lines(&frame), vec!["^unhide()", "^cs()", "^tw()M4", "^collapse()"]);
}

/// Promoted one by one, messages stack with the newest in the foreground.
#[test]
fn test_sequential_arrivals_stack() {
    let relay = relay(3, Duration::from_secs(5));
    let render = RenderLoop::new(relay.clone(), true);

    let mut frame = Vec::new();
    for text in ["M1", "M2", "M3"] {
        relay.stage(text);
        frame = render.tick().unwrap();
    }

    assert_eq!(relay.resident(), vec!["M1", "M2", "M3"]);
    assert_eq!(lines(&frame), vec!["^unhide()", "^cs()", "^tw()M3", "^uncollapse()", "M1", "M2"]);
}

/// The oldest message expires while newer ones stay on screen.
#[test]
fn test_oldest_expires_first() {
    let relay = relay(3, Duration::from_millis(150));
    let render = RenderLoop::new(relay.clone(), true);

    relay.stage("M1");
    render.tick();
    thread::sleep(Duration::from_millis(60));
    for text in ["M2", "M3"] {
        relay.stage(text);
        render.tick();
    }

    let frame = render.tick().unwrap();

    assert_eq!(relay.resident(), vec!["M2", "M3"]);
    assert!(!frame.contains(&Directive::Hide));
    assert_eq!(lines(&frame), vec!["^unhide()", "^cs()", "^tw()M3", "^uncollapse()", " ", "M2"]);
}

/// A lone message expiring hides the display.
#[test]
fn test_last_expiry_hides() {
    let relay = relay(1, Duration::from_millis(40));
    let render = RenderLoop::new(relay.clone(), true);

    relay.stage("M1");
    render.tick();
    let frame = render.tick().unwrap();

    assert!(relay.resident().is_empty());
    assert_eq!(frame, vec![Directive::Hide]);
}

/// Five arrivals into three slots leave the last three, in order.
#[test]
fn test_capacity_keeps_most_recent() {
    let relay = relay(3, Duration::from_secs(5));
    let render = RenderLoop::new(relay.clone(), false);

    for text in ["M1", "M2", "M3", "M4", "M5"] {
        relay.stage(text);
        render.tick();
        assert!(relay.resident().len() <= 3);
    }

    assert_eq!(relay.resident(), vec!["M3", "M4", "M5"]);
}

/// A message is never observed after its deadline.
#[test]
fn test_message_not_resident_after_deadline() {
    let ttl = Duration::from_millis(50);
    let relay = relay(2, ttl);
    let render = RenderLoop::new(relay.clone(), true);

    let staged_at = Instant::now();
    relay.stage("M1");
    render.tick();

    let frame = render.tick().unwrap();
    assert!(staged_at.elapsed() >= ttl);
    assert_eq!(frame, vec![Directive::Hide]);
}

/// The render loop writes frames to the sink until the relay closes.
#[test]
fn test_run_writes_frames_to_display() {
    let relay = relay(2, Duration::from_secs(5));
    let render = RenderLoop::new(relay.clone(), true);
    let buffer = SharedBuffer::default();
    let mut display = LineDisplay::new(buffer.clone());

    let handle = thread::spawn(move || render.run(&mut display));

    relay.stage("hello");
    assert!(wait_for(Duration::from_secs(2), || {
        buffer.lines().contains(&"^tw()hello".to_string())
    }));

    relay.stage("world");
    assert!(wait_for(Duration::from_secs(2), || {
        buffer.lines().ends_with(&["^uncollapse()".to_string(), "hello".to_string()])
    }));

    relay.close();
    handle.join().unwrap().unwrap();
}
