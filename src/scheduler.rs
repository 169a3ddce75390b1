use crate::notifier::Notifier;
use chrono::{DateTime, Duration, Local, TimeZone};
use rocket::fairing::{Fairing, Info, Kind};
use rocket::{Orbit, Rocket};
use std::future::Future;
use std::sync::Arc;

/// A fixed wall-clock time, once a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailySchedule {
    hour: u32,
    minute: u32,
}

impl DailySchedule {
    pub fn new(hour: u32, minute: u32) -> Result<Self, String> {
        if hour > 23 || minute > 59 {
            return Err(format!(
                "{:02}:{:02} is not a valid time of day.",
                hour, minute
            ));
        }
        Ok(Self { hour, minute })
    }

    /// First occurrence strictly after `now`, in `now`'s time zone.
    ///
    /// A day whose trigger time falls into a DST gap is skipped; an ambiguous
    /// local time fires at its earlier instant.
    pub fn next_after<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> DateTime<Tz> {
        let tz = now.timezone();
        let today = now.naive_local().date();
        for offset in 0..=2 {
            let candidate = (today + Duration::days(offset))
                .and_hms_opt(self.hour, self.minute, 0)
                .and_then(|naive| tz.from_local_datetime(&naive).earliest());
            if let Some(candidate) = candidate {
                if candidate > *now {
                    return candidate;
                }
            }
        }
        now.clone() + Duration::days(1)
    }
}

/// Liftoff fairing that owns the daily broadcast job for the lifetime of the server.
pub struct DailyDigest {
    notifier: Arc<Notifier>,
    schedule: DailySchedule,
}

impl DailyDigest {
    pub fn new(notifier: Arc<Notifier>, schedule: DailySchedule) -> Self {
        Self { notifier, schedule }
    }
}

#[rocket::async_trait]
impl Fairing for DailyDigest {
    fn info(&self) -> Info {
        Info {
            name: "Daily Digest",
            kind: Kind::Liftoff,
        }
    }

    async fn on_liftoff(&self, rocket: &Rocket<Orbit>) {
        tokio::spawn(run_daily(
            self.notifier.clone(),
            self.schedule,
            rocket.shutdown(),
        ));
    }
}

/// Fire `broadcast_to_subscribers` every day at the scheduled local time until
/// `shutdown` resolves.
///
/// Each run gets its own task, so a slow run never delays the next trigger.
/// Triggers missed while the process was down are not replayed.
pub async fn run_daily<S>(notifier: Arc<Notifier>, schedule: DailySchedule, shutdown: S)
where
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    loop {
        let now = Local::now();
        let next = schedule.next_after(&now);
        let wait = (next - now).to_std().unwrap_or_default();
        tracing::info!(next_run = %next, "Daily digest scheduled");

        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("Daily digest stopped");
                break;
            }
            _ = tokio::time::sleep(wait) => {
                let notifier = notifier.clone();
                tokio::spawn(async move {
                    if let Err(error) = notifier.broadcast_to_subscribers().await {
                        tracing::error!(error.cause_chain = ?error, "Daily digest failed");
                    }
                });
            }
        }
    }
}
