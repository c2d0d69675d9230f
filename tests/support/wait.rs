use std::time::Duration;

use tokio::time::{sleep, Instant};

const POLL: Duration = Duration::from_millis(5);
const LIMIT: Duration = Duration::from_secs(5);

/// Poll `condition` until it holds; panics with `what` after five seconds.
pub async fn eventually(what: &str, mut condition: impl FnMut() -> bool) {
    let deadline = Instant::now() + LIMIT;
    while !condition() {
        assert!(Instant::now() < deadline, "timed out waiting for {what}");
        sleep(POLL).await;
    }
}

/// Give the sync loop a moment to process anything already queued.
pub async fn settle() {
    sleep(Duration::from_millis(30)).await;
}
