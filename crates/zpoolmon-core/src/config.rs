use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RefreshConfig {
    pub period: Duration,
    pub period_min: Duration,
    pub period_max: Duration,
    pub period_step: Duration,
    pub fetch_timeout: Duration,
    pub zpool_bin: PathBuf,
}

impl RefreshConfig {
    /// `period` pulled into `[period_min, period_max]`.
    pub fn initial_period(&self) -> Duration {
        self.period.clamp(self.period_min, self.period_max)
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            period: Duration::from_secs(10),
            period_min: Duration::from_secs(1),
            period_max: Duration::from_secs(60),
            period_step: Duration::from_secs(1),
            fetch_timeout: Duration::from_secs(30),
            zpool_bin: PathBuf::from("zpool"),
        }
    }
}
