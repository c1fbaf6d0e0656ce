use danmaku_overlay::core::{FontSize, LocalSubmission, Mode, OverlayConfig};
use danmaku_overlay::playback::{PlaybackState, ReadyState, SimulatedClock};
use danmaku_overlay::store::MemoryStore;
use danmaku_overlay::{Player, PlayerEvent};
use std::time::Duration;
use tokio::sync::broadcast;

const DEMO_DURATION_SECS: f64 = 30.0;
const FRAME: Duration = Duration::from_millis(250);

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = OverlayConfig::load()?;
    let store = match std::env::args().nth(1) {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .map_err(|e| anyhow::anyhow!("Failed to read comments from {}: {}", path, e))?;
            let store = MemoryStore::from_json(&json)?;
            log::info!("Loaded {} comments from {}", store.len(), path);
            store
        }
        None => MemoryStore::new(),
    };

    let mut player = Player::new(config, SimulatedClock::new(DEMO_DURATION_SECS), store);
    let events = tokio::spawn(log_events(player.subscribe()));

    let started = tokio::time::Instant::now();
    player.start(Duration::ZERO);
    player.clock_mut().set_ready_state(ReadyState::EnoughData);

    let mut ticker = tokio::time::interval(FRAME);
    let mut submitted = false;
    let mut last_report = 0;

    loop {
        ticker.tick().await;
        let now = started.elapsed();

        player.clock_mut().step(FRAME.as_secs_f64());
        player.advance(now);

        if player.state() == PlaybackState::Pausing && player.clock().play_requests() == 0 {
            player.toggle(now);
        }

        if !submitted && now >= Duration::from_secs(2) {
            submitted = true;
            let submission = LocalSubmission::new("hello from the demo", FontSize::Medium, Mode::Move, "#ffffff");
            if let Err(e) = player.submit_local(submission, now) {
                log::warn!("Local comment rejected: {}", e);
            }
        }

        if now.as_secs() > last_report {
            last_report = now.as_secs();
            let snapshot = player.snapshot(now);
            log::info!(
                "t={}s state={} on screen={}",
                last_report,
                player.state().name(),
                snapshot.items.len()
            );
            for item in &snapshot.items {
                log::debug!("  {} at ({:.0}, {:.0}): {}", item.id, item.x, item.y, item.text);
            }
        }

        match player.state() {
            PlaybackState::ReplayPending => {
                log::info!("Reached the end of the media");
                break;
            }
            PlaybackState::Error(error) => {
                log::error!("Stopping after media error: {}", error);
                break;
            }
            _ => {}
        }
    }

    drop(player);
    events.await?;
    Ok(())
}

async fn log_events(mut receiver: broadcast::Receiver<PlayerEvent>) {
    loop {
        match receiver.recv().await {
            Ok(PlayerEvent::ErrorSurfaced(message)) => log::error!("{}", message),
            Ok(PlayerEvent::SubmitFailed(reason)) => log::warn!("Comment not stored: {}", reason),
            Ok(event) => log::debug!("{:?}", event),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                log::warn!("Event log fell behind by {} events", skipped);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
