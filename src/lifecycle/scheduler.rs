//! Daily trigger for the auto mode.
//!
//! A single timer that fires one job per day at a fixed local wall-clock
//! time. The job itself knows nothing about scheduling.

use std::fmt::Display;
use std::future::Future;

use chrono::{DateTime, Duration as ChronoDuration, FixedOffset, NaiveTime, TimeZone, Utc};
use thiserror::Error;
use tokio::time::sleep;

use crate::config::ScheduleConfig;
use crate::lifecycle::shutdown::StopSignal;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("invalid time of day '{0}', expected HH:MM")]
    InvalidTime(String),

    #[error("invalid UTC offset of {0} hours")]
    InvalidOffset(i32),
}

/// Fires once per day at `at` in the `offset` time zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailySchedule {
    at: NaiveTime,
    offset: FixedOffset,
}

impl DailySchedule {
    pub fn new(at: NaiveTime, offset: FixedOffset) -> Self {
        Self { at, offset }
    }

    pub fn from_config(config: &ScheduleConfig) -> Result<Self, ScheduleError> {
        let at = NaiveTime::parse_from_str(&config.daily_at, "%H:%M")
            .map_err(|_| ScheduleError::InvalidTime(config.daily_at.clone()))?;
        let offset = FixedOffset::east_opt(config.utc_offset_hours * 3600)
            .ok_or(ScheduleError::InvalidOffset(config.utc_offset_hours))?;
        Ok(Self::new(at, offset))
    }

    /// First firing time strictly after `now`.
    pub fn next_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let local_now = now.with_timezone(&self.offset);
        let mut date = local_now.date_naive();
        loop {
            let candidate = self
                .offset
                .from_local_datetime(&date.and_time(self.at))
                .single()
                .map(|dt| dt.with_timezone(&Utc));
            if let Some(candidate) = candidate {
                if candidate > now {
                    return candidate;
                }
            }
            date = date + ChronoDuration::days(1);
        }
    }

    /// Render a UTC instant in the schedule's time zone.
    pub fn local(&self, at: DateTime<Utc>) -> DateTime<FixedOffset> {
        at.with_timezone(&self.offset)
    }

    /// Run `job` at every firing time until a stop is requested.
    ///
    /// A stop is observed between jobs; a running job is not interrupted. A
    /// failed job is logged and the schedule carries on.
    pub async fn run<F, Fut, T, E>(&self, stop: StopSignal, job: F)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        self.drive(stop, job, false).await
    }

    /// Like [`run`](Self::run), with one extra run before the first firing.
    pub async fn run_now_and_daily<F, Fut, T, E>(&self, stop: StopSignal, job: F)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        self.drive(stop, job, true).await
    }

    async fn drive<F, Fut, T, E>(&self, mut stop: StopSignal, mut job: F, immediate: bool)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        if immediate && !stop.is_requested() {
            tracing::info!("Initial run starting");
            fire(&mut job).await;
        }

        loop {
            let now = Utc::now();
            let next = self.next_after(now);
            let wait = (next - now).to_std().unwrap_or_default();
            tracing::info!(next_run = %self.local(next), "Next scheduled run");

            tokio::select! {
                _ = sleep(wait) => {
                    tracing::info!("Scheduled run starting");
                    fire(&mut job).await;
                }
                _ = stop.requested() => {
                    tracing::info!("Scheduler received stop request, exiting loop");
                    return;
                }
            }
        }
    }
}

async fn fire<F, Fut, T, E>(job: &mut F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    if let Err(e) = job().await {
        tracing::error!(error = %e, "Run failed, waiting for the next firing");
    }
}
