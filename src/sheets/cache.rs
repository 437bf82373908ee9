use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use super::Rows;

/// Per-range response cache with a fixed revalidation window.
#[derive(Debug)]
pub struct RangeCache {
    window: Duration,
    entries: Mutex<HashMap<String, (Instant, Rows)>>,
}

impl RangeCache {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Returns the cached rows when they were stored less than one window ago.
    pub async fn get(&self, range: &str) -> Option<Rows> {
        if self.window.is_zero() {
            return None;
        }
        let entries = self.entries.lock().await;
        let (stored_at, rows) = entries.get(range)?;
        if stored_at.elapsed() < self.window {
            Some(rows.clone())
        } else {
            None
        }
    }

    pub async fn put(&self, range: &str, rows: Rows) {
        if self.window.is_zero() {
            return;
        }
        let mut entries = self.entries.lock().await;
        entries.insert(range.to_string(), (Instant::now(), rows));
    }

    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn entries_expire_after_window() {
        let cache = RangeCache::new(Duration::from_secs(300));
        cache.put("A", vec![vec!["x".to_string()]]).await;
        assert!(cache.get("A").await.is_some());

        tokio::time::advance(Duration::from_secs(299)).await;
        assert!(cache.get("A").await.is_some());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(cache.get("A").await.is_none());
    }

    #[tokio::test]
    async fn clear_drops_everything() {
        let cache = RangeCache::new(Duration::from_secs(300));
        cache.put("A", Vec::new()).await;
        cache.clear().await;
        assert!(cache.get("A").await.is_none());
    }
}
