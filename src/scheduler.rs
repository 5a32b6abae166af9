use std::{io::Write, time::Duration};

use tokio::time::Instant;

use crate::{
    auth::Authenticator, chain::Chain, properties::PropertyApi, runner::TaskRunner,
    wallets::Wallet,
};

pub fn format_remaining(remaining: Duration) -> String {
    let secs = remaining.as_secs();
    format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
}

fn print_countdown_line(line: &str) {
    let mut stdout = std::io::stdout().lock();
    // display only, write errors are ignored
    let _ = write!(stdout, "{line}");
    let _ = stdout.flush();
}

/// Rewrites a single console line every second until `interval` has passed.
pub async fn countdown(interval: Duration) {
    let deadline = Instant::now() + interval;

    if let Ok(delta) = chrono::Duration::from_std(interval) {
        tracing::info!(
            "Next run scheduled for: {}",
            (chrono::Local::now() + delta).format("%Y-%m-%d %H:%M:%S")
        );
    }

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            print_countdown_line("\r\x1b[2K");
            break;
        }

        print_countdown_line(&format!("\rNext run in: {}...", format_remaining(remaining)));
        tokio::time::sleep(remaining.min(Duration::from_secs(1))).await;
    }
}

/// Runs every wallet, waits out the interval, repeats. Never returns.
pub async fn run_daily<C, A, P>(runner: &TaskRunner<C, A, P>, wallets: &[Wallet], interval: Duration)
where
    C: Chain,
    A: Authenticator,
    P: PropertyApi,
{
    loop {
        runner.run_tasks(wallets).await;
        countdown(interval).await;
    }
}
