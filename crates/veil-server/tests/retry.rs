use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use veil_core::capability::ProviderError;
use veil_server::retry::RetryPolicy;

#[test]
fn backoff_doubles_up_to_the_cap() {
    let policy = RetryPolicy::default();
    assert_eq!(policy.delay_for(0), Duration::from_millis(500));
    assert_eq!(policy.delay_for(1), Duration::from_secs(1));
    assert_eq!(policy.delay_for(2), Duration::from_secs(2));
    assert_eq!(policy.delay_for(4), Duration::from_secs(8));
    assert_eq!(policy.delay_for(10), Duration::from_secs(8));
    assert_eq!(policy.delay_for(40), Duration::from_secs(8));
}

#[tokio::test(start_paused = true)]
async fn gives_up_after_max_retries() {
    let calls = AtomicUsize::new(0);
    let policy = RetryPolicy {
        max_retries: 3,
        ..RetryPolicy::default()
    };

    let result: Result<(), _> = policy
        .run("test", Duration::from_secs(1), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(ProviderError::Transport("connection reset".into())) }
        })
        .await;

    assert!(matches!(result, Err(ProviderError::Transport(_))));
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[tokio::test(start_paused = true)]
async fn waits_between_attempts() {
    let policy = RetryPolicy::default();
    let calls = AtomicUsize::new(0);
    let started = tokio::time::Instant::now();

    let result = policy
        .run("test", Duration::from_secs(1), || {
            let attempt = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt < 2 {
                    Err(ProviderError::RateLimited("429".into()))
                } else {
                    Ok(attempt)
                }
            }
        })
        .await;

    assert_eq!(result.unwrap(), 2);
    assert_eq!(started.elapsed(), Duration::from_millis(1500));
}

#[tokio::test]
async fn no_retry_policy_makes_one_attempt() {
    let calls = AtomicUsize::new(0);

    let result: Result<(), _> = RetryPolicy::none()
        .run("test", Duration::from_secs(1), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(ProviderError::Unavailable("503".into())) }
        })
        .await;

    assert!(result.is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
