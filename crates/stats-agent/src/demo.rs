//! Synthetic metric generation for smoke testing

use rand::Rng;
use stats_engine::{timed, Engine, Tag};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

const ROUTES: [&str; 3] = ["index", "login", "search"];

/// Record one round of synthetic requests
pub fn emit_once(engine: &Engine) {
    let (route, depth, latency) = {
        let mut rng = rand::thread_rng();
        (
            ROUTES[rng.gen_range(0..ROUTES.len())],
            rng.gen_range(0..64),
            rng.gen_range(50.0..5000.0),
        )
    };
    let tags = [Tag::new("route", route)];

    engine.incr("statsfwd.demo.requests", &tags, 1.0);
    engine.set("statsfwd.demo.queue_depth", &[], depth as f64);
    engine.observe("statsfwd.demo.latency", &tags, latency);

    timed!(engine, "statsfwd.demo.render", &tags, {
        std::hint::black_box((0..1000u64).sum::<u64>())
    });
}

/// Emit synthetic metrics every `period` until `shutdown` flips
pub async fn run(engine: Arc<Engine>, period: Duration, mut shutdown: watch::Receiver<bool>) {
    tracing::info!("Generating demo metrics every {:?}", period);
    let mut ticker = tokio::time::interval(period);

    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            _ = ticker.tick() => emit_once(&engine),
        }
    }

    tracing::debug!("Demo metrics stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use stats_engine::SnapshotSource;

    #[test]
    fn test_emit_once_records_every_kind() {
        let engine = Engine::new();
        emit_once(&engine);

        let snapshot = engine.snapshot();
        let names: Vec<&str> = snapshot.iter().map(|m| m.name.as_str()).collect();
        assert!(names.contains(&"statsfwd.demo.requests"));
        assert!(names.contains(&"statsfwd.demo.queue_depth"));
        assert!(names.contains(&"statsfwd.demo.latency"));
        assert!(names.contains(&"statsfwd.demo.render"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_stops_on_shutdown() {
        let engine = Arc::new(Engine::new());
        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(run(Arc::clone(&engine), Duration::from_millis(100), rx));

        tokio::time::sleep(Duration::from_millis(250)).await;
        tx.send_replace(true);
        handle.await.unwrap();

        let requests: u64 = engine
            .snapshot()
            .iter()
            .filter(|m| m.name == "statsfwd.demo.requests")
            .map(|m| m.sample)
            .sum();
        assert_eq!(requests, 3);
    }
}
