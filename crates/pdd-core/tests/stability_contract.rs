//! Contract Test: Stability Requires Every Round
//!
//! Constraints verified:
//! - A check passes only if all `attempts_per_check` rounds pass
//! - The first failing round ends the check; later rounds never start
//! - Rounds run back-to-back, without any pause
//!
//! If this test fails, someone has given partial credit for flapping
//! servers or added a cooldown between rounds.

mod common;

use common::*;
use pdd_core::PropagationEngine;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

#[tokio::test]
async fn all_rounds_pass() {
    let probe = Arc::new(ScriptedProbe::always(true));
    let engine = PropagationEngine::new(
        probe.clone(),
        two_server_config().with_attempts_per_check(4),
    )
    .expect("engine construction succeeds");

    assert!(engine.stable(&localhost_fingerprint()).await);
    assert_eq!(probe.total_calls(), 8, "4 rounds x 2 servers");
}

#[tokio::test]
async fn failing_round_stops_the_check() {
    for failing_round in 1..=5 {
        let probe = Arc::new(ScriptedProbe::new(move |server, nth| {
            !(server == NS2 && nth == failing_round)
        }));
        let engine = PropagationEngine::new(
            probe.clone(),
            two_server_config().with_attempts_per_check(5),
        )
        .expect("engine construction succeeds");

        assert!(
            !engine.stable(&localhost_fingerprint()).await,
            "round {} failing must fail the check",
            failing_round
        );

        // Let the other probe of the failing round finish in the background
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(
            probe.calls_to(NS2),
            failing_round,
            "no round after {} may start",
            failing_round
        );
        assert_eq!(probe.calls_to(NS1), failing_round);
    }
}

#[tokio::test]
async fn single_attempt_check_is_one_quorum() {
    let probe = Arc::new(ScriptedProbe::always(true));
    let engine = PropagationEngine::new(
        probe.clone(),
        two_server_config().with_attempts_per_check(1),
    )
    .expect("engine construction succeeds");

    assert!(engine.stable(&localhost_fingerprint()).await);
    assert_eq!(probe.total_calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn rounds_run_back_to_back() {
    let probe = Arc::new(ScriptedProbe::always(true).with_delay(Duration::from_millis(100)));
    let engine = PropagationEngine::new(
        probe.clone(),
        two_server_config().with_attempts_per_check(10),
    )
    .expect("engine construction succeeds");

    let start = Instant::now();
    assert!(engine.stable(&localhost_fingerprint()).await);

    // Ten rounds, each as long as its slowest probe, and nothing else
    assert_eq!(start.elapsed(), Duration::from_secs(1));
}
