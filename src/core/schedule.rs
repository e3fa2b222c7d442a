use crate::config::AppConfig;
use crate::domain::model::Environment;
use crate::utils::error::Result;
use chrono::{Duration, NaiveDateTime, NaiveTime};

/// Allows a run only when the local clock reads the configured `HH:MM`.
#[derive(Debug, Clone)]
pub struct ScheduleGate {
    run_at: NaiveTime,
    bypass: bool,
}

impl ScheduleGate {
    pub fn new(run_at: NaiveTime, bypass: bool, environment: Environment) -> Self {
        if bypass && environment.is_production() {
            tracing::warn!("⚠️ Schedule bypass requested but ignored in production");
        }
        Self {
            run_at,
            bypass: bypass && !environment.is_production(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(Self::new(
            config.run_at()?,
            config.schedule.bypass,
            config.environment,
        ))
    }

    pub fn allowed_time(&self) -> String {
        self.run_at.format("%H:%M").to_string()
    }

    pub fn is_bypassed(&self) -> bool {
        self.bypass
    }

    pub fn can_run(&self, now: NaiveDateTime) -> bool {
        if self.bypass {
            tracing::info!("⏭️ Schedule check bypassed");
            return true;
        }

        let current = now.format("%H:%M").to_string();
        if current == self.allowed_time() {
            tracing::info!("✅ Allowed time: {}", current);
            true
        } else {
            tracing::warn!(
                "❌ Execution not allowed now (current: {}, allowed: {})",
                current,
                self.allowed_time()
            );
            false
        }
    }

    /// Next allowed start: today at `run_at` if still ahead of `now`, else tomorrow.
    pub fn next_run(&self, now: NaiveDateTime) -> NaiveDateTime {
        let today = now.date().and_time(self.run_at);
        if today <= now {
            today + Duration::days(1)
        } else {
            today
        }
    }

    pub fn time_until_next_run(&self, now: NaiveDateTime) -> Duration {
        let next = self.next_run(now);
        let wait = next - now;
        tracing::info!(
            "Next run in {}h{:02}m, at {}",
            wait.num_hours(),
            wait.num_minutes() % 60,
            next.format("%Y-%m-%d %H:%M:%S")
        );
        wait
    }
}
