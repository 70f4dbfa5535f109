//! Engine Status - latency stats for the health endpoint

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use super::artifacts::ArtifactInfo;

/// Engine Status for the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStatus {
    pub model_loaded: bool,
    pub backbone: String,
    pub artifacts: Vec<ArtifactInfo>,
    pub loaded_at: chrono::DateTime<chrono::Utc>,
    pub avg_latency_ms: f32,
    pub inference_count: u64,
}

#[derive(Debug, Default)]
pub struct LatencyStats {
    latency_sum_us: AtomicU64,
    inference_count: AtomicU64,
}

impl LatencyStats {
    pub fn record(&self, elapsed_us: u64) {
        self.latency_sum_us.fetch_add(elapsed_us, Ordering::Relaxed);
        self.inference_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn count(&self) -> u64 {
        self.inference_count.load(Ordering::Relaxed)
    }

    pub fn avg_latency_ms(&self) -> f32 {
        let sum = self.latency_sum_us.load(Ordering::Relaxed);
        let count = self.count();
        if count > 0 { (sum as f32 / count as f32) / 1000.0 } else { 0.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latency_average() {
        let stats = LatencyStats::default();
        assert_eq!(stats.avg_latency_ms(), 0.0);

        stats.record(1_000);
        stats.record(3_000);
        assert_eq!(stats.count(), 2);
        assert!((stats.avg_latency_ms() - 2.0).abs() < f32::EPSILON);
    }
}
