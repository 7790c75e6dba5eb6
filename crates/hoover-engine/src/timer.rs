use std::time::Duration;

/// Cooperative sleep. Workflows await this instead of calling
/// `tokio::time::sleep` directly so every suspension point in a workflow
/// goes through the engine uniformly.
pub async fn timer(duration: Duration) {
    tokio::time::sleep(duration).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn timer_advances_paused_clock() {
        let before = tokio::time::Instant::now();
        timer(Duration::from_secs(10)).await;
        assert!(before.elapsed() >= Duration::from_secs(10));
    }
}
