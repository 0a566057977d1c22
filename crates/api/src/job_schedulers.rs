use crate::{
    event::{deliver_reminders::DeliverDueRemindersUseCase, scan_due_events::ScanDueEventsUseCase},
    shared::usecase::execute,
};
use actix_web::rt::time::{interval, sleep};
use kopilka_infra::{with_timeout, KopilkaContext, ScanTrigger};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

pub fn get_start_delay(now_ts: usize, secs_before_min: usize) -> usize {
    let secs_to_next_minute = 60 - (now_ts / 1000) % 60;
    if secs_to_next_minute > secs_before_min {
        secs_to_next_minute - secs_before_min
    } else {
        secs_to_next_minute + (60 - secs_before_min)
    }
}

/// Seconds from `now_secs` until the wall clock next shows one of `seconds`
/// (seconds of a minute, sorted ascending). Never zero.
pub fn secs_until_next_cron_second(now_secs: i64, seconds: &[u32]) -> u64 {
    let current = now_secs.rem_euclid(60) as u32;
    match seconds.iter().find(|s| **s > current) {
        Some(next) => u64::from(next - current),
        None => match seconds.first() {
            Some(first) => u64::from(60 - current + first),
            None => 60,
        },
    }
}

/// Runs a scan pass unless the previous one is still going
async fn run_scan(ctx: &KopilkaContext, running: &Arc<Mutex<()>>) {
    let _guard = match running.try_lock() {
        Ok(guard) => guard,
        Err(_) => {
            warn!("Previous event scan is still running, skipping this tick");
            return;
        }
    };

    // Failures are logged by the use case, the next tick starts from scratch
    if let Ok(report) = execute(ScanDueEventsUseCase {}, ctx).await {
        if report.skipped > 0 {
            warn!("Event scan skipped {} events: {:?}", report.skipped, report);
        }
    }
}

pub fn start_event_scan_job(ctx: KopilkaContext) {
    let running = Arc::new(Mutex::new(()));

    match ctx.config.scan_trigger.clone() {
        ScanTrigger::Interval(period) => {
            actix_web::rt::spawn(async move {
                let mut interval = interval(period);
                loop {
                    interval.tick().await;
                    let ctx = ctx.clone();
                    let running = running.clone();
                    actix_web::rt::spawn(async move { run_scan(&ctx, &running).await });
                }
            });
        }
        ScanTrigger::Cron(seconds) => {
            actix_web::rt::spawn(async move {
                loop {
                    let now_secs = ctx.sys.get_timestamp_millis().div_euclid(1000);
                    let delay = secs_until_next_cron_second(now_secs, &seconds);
                    sleep(Duration::from_secs(delay)).await;

                    let ctx = ctx.clone();
                    let running = running.clone();
                    actix_web::rt::spawn(async move { run_scan(&ctx, &running).await });
                }
            });
        }
    }
}

pub fn start_dispatch_job(ctx: KopilkaContext) {
    actix_web::rt::spawn(async move {
        let now = ctx.sys.get_timestamp_millis();
        let secs_to_next_run = get_start_delay(now as usize, 0);
        sleep(Duration::from_secs(secs_to_next_run as u64 % 60)).await;

        let mut dispatch_interval = interval(ctx.config.dispatch_interval);
        loop {
            dispatch_interval.tick().await;
            dispatch_reminders(&ctx).await;
        }
    });
}

async fn dispatch_reminders(ctx: &KopilkaContext) {
    if let Ok(report) = execute(DeliverDueRemindersUseCase {}, ctx).await {
        if report.claimed > 0 {
            info!("Reminder delivery finished: {:?}", report);
        }
    }

    let before = ctx.sys.now() - ctx.config.job_retention;
    match with_timeout(
        ctx.config.io_timeout,
        ctx.queue.purge_completed_before(before),
    )
    .await
    {
        Ok(0) => (),
        Ok(purged) => info!("Purged {} completed reminder jobs", purged),
        Err(e) => error!("Could not purge completed reminder jobs: {}", e),
    }
}
