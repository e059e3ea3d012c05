//! Slow filesystem backend for testing
//!
//! This module provides a decorator around any FsBackend that adds
//! configurable delays to simulate a slow filesystem service (remote RPC,
//! network drives). Tests use it to count backend calls and to stage
//! listings and stats that complete in a chosen order.

use super::backend::{FsBackend, FsEntry};
use async_trait::async_trait;
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Configuration for slow filesystem simulation
#[derive(Debug, Clone)]
pub struct SlowFsConfig {
    /// Delay for read_dir operations
    pub read_dir_delay: Duration,
    /// Delay for stat operations
    pub stat_delay: Duration,
    /// Delay for rename, create and remove operations
    pub mutation_delay: Duration,
}

impl SlowFsConfig {
    /// Create a config with uniform delay for all operations
    pub fn uniform(delay: Duration) -> Self {
        Self {
            read_dir_delay: delay,
            stat_delay: delay,
            mutation_delay: delay,
        }
    }

    /// Create a config with no delays (useful as a baseline)
    pub fn none() -> Self {
        Self::uniform(Duration::ZERO)
    }

    /// Create a config simulating a remote filesystem service
    pub fn slow_network() -> Self {
        Self {
            read_dir_delay: Duration::from_millis(500),
            stat_delay: Duration::from_millis(100),
            mutation_delay: Duration::from_millis(150),
        }
    }
}

impl Default for SlowFsConfig {
    fn default() -> Self {
        Self::none()
    }
}

/// Metrics tracking for filesystem operations
#[derive(Debug, Clone, Default)]
pub struct BackendMetrics {
    /// Number of read_dir calls
    pub read_dir_calls: usize,
    /// Number of stat calls
    pub stat_calls: usize,
    /// Number of rename calls
    pub rename_calls: usize,
    /// Number of create_file and create_dir calls
    pub create_calls: usize,
    /// Number of remove calls
    pub remove_calls: usize,
    /// Total time spent in artificial delays
    pub total_delay_time: Duration,
}

impl BackendMetrics {
    /// Reset all metrics to zero
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Number of mutating calls
    pub fn mutation_calls(&self) -> usize {
        self.rename_calls + self.create_calls + self.remove_calls
    }

    /// Get total number of filesystem calls
    pub fn total_calls(&self) -> usize {
        self.read_dir_calls + self.stat_calls + self.mutation_calls()
    }
}

/// Slow filesystem backend wrapper for testing
///
/// Wraps any FsBackend implementation and adds configurable delays to each
/// operation. Also tracks metrics about operation counts and timing.
pub struct SlowFsBackend {
    /// The underlying real backend
    inner: Arc<dyn FsBackend>,
    /// Configuration for delays
    config: SlowFsConfig,
    /// Metrics tracking
    metrics: Arc<Mutex<BackendMetrics>>,
}

impl SlowFsBackend {
    /// Create a new slow filesystem backend
    pub fn new(inner: Arc<dyn FsBackend>, config: SlowFsConfig) -> Self {
        Self {
            inner,
            config,
            metrics: Arc::new(Mutex::new(BackendMetrics::default())),
        }
    }

    /// Create with uniform delay for all operations
    pub fn with_uniform_delay(inner: Arc<dyn FsBackend>, delay: Duration) -> Self {
        Self::new(inner, SlowFsConfig::uniform(delay))
    }

    /// Get a snapshot of current metrics
    pub async fn metrics(&self) -> BackendMetrics {
        self.metrics.lock().await.clone()
    }

    /// Reset metrics to zero
    pub async fn reset_metrics(&self) {
        self.metrics.lock().await.reset();
    }

    /// Add delay and update metrics
    async fn add_delay(&self, delay: Duration) {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
            self.metrics.lock().await.total_delay_time += delay;
        }
    }
}

#[async_trait]
impl FsBackend for SlowFsBackend {
    async fn read_dir(&self, path: &Path) -> io::Result<Vec<FsEntry>> {
        self.metrics.lock().await.read_dir_calls += 1;
        self.add_delay(self.config.read_dir_delay).await;
        self.inner.read_dir(path).await
    }

    async fn stat(&self, path: &Path) -> io::Result<FsEntry> {
        self.metrics.lock().await.stat_calls += 1;
        self.add_delay(self.config.stat_delay).await;
        self.inner.stat(path).await
    }

    async fn rename(&self, path: &Path, new_name: &str) -> io::Result<FsEntry> {
        self.metrics.lock().await.rename_calls += 1;
        self.add_delay(self.config.mutation_delay).await;
        self.inner.rename(path, new_name).await
    }

    async fn create_file(&self, dir: &Path, name: &str) -> io::Result<FsEntry> {
        self.metrics.lock().await.create_calls += 1;
        self.add_delay(self.config.mutation_delay).await;
        self.inner.create_file(dir, name).await
    }

    async fn create_dir(&self, dir: &Path, name: &str) -> io::Result<FsEntry> {
        self.metrics.lock().await.create_calls += 1;
        self.add_delay(self.config.mutation_delay).await;
        self.inner.create_dir(dir, name).await
    }

    async fn remove(&self, path: &Path) -> io::Result<()> {
        self.metrics.lock().await.remove_calls += 1;
        self.add_delay(self.config.mutation_delay).await;
        self.inner.remove(path).await
    }
}
