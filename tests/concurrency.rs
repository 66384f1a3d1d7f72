//! Concurrent tracking and queue publication.

#![allow(clippy::unwrap_used)]

mod support;

use std::collections::HashSet;
use std::sync::{Arc, Barrier};

use releasegate_core::config::TrackingConfig;
use releasegate_core::{
    DownloadMonitor, HistoryProvider, Protocol, QueueStore, ReleaseParser, TrackedDownloadService,
};
use support::{FakeHistory, FakeParser, client, item, unit};

const TASKS: usize = 8;

fn parser() -> Arc<FakeParser> {
    Arc::new(FakeParser::with_units(vec![
        unit(10, "Geogaddi"),
        unit(11, "Campfire Headphase"),
        unit(12, "Tomorrow's Harvest"),
    ]))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_sightings_share_one_aggregate() {
    let parser = parser();
    let parser_port: Arc<dyn ReleaseParser> = parser.clone();
    let history: Arc<dyn HistoryProvider> = Arc::new(FakeHistory::default());
    let service = Arc::new(TrackedDownloadService::new(
        parser_port,
        history,
        &TrackingConfig::default(),
    ));
    let barrier = Arc::new(Barrier::new(TASKS));

    let handles: Vec<_> = (0..TASKS)
        .map(|n| {
            let service = Arc::clone(&service);
            let barrier = Arc::clone(&barrier);
            tokio::task::spawn_blocking(move || {
                barrier.wait();
                let remaining = u64::try_from(n).unwrap() * 10;
                service.track_download(
                    &client(1, Protocol::Torrent),
                    item("dl-1", "Boards of Canada - Geogaddi", Some(remaining)),
                )
            })
        })
        .collect();

    for handle in handles {
        let tracked = handle.await.unwrap();
        assert!(tracked.is_some());
    }

    assert_eq!(service.len(), 1);
    assert_eq!(parser.parse_calls(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_readers_only_see_complete_rebuilds() {
    let parser_port: Arc<dyn ReleaseParser> = parser();
    let history: Arc<dyn HistoryProvider> = Arc::new(FakeHistory::default());
    let monitor = Arc::new(DownloadMonitor::new(
        parser_port,
        history,
        &TrackingConfig::default(),
        Arc::new(QueueStore::new()),
    ));
    let full = vec![
        item("dl-1", "Boards of Canada - Geogaddi", Some(10)),
        item("dl-2", "Boards of Canada - Campfire Headphase", Some(20)),
        item("dl-3", "Boards of Canada - Tomorrow's Harvest", Some(30)),
    ];

    let writer = {
        let monitor = Arc::clone(&monitor);
        tokio::task::spawn_blocking(move || {
            let torrent = client(1, Protocol::Torrent);
            for round in 0..50 {
                let poll = if round % 2 == 0 { full.clone() } else { Vec::new() };
                monitor.refresh_client(&torrent, Ok(poll)).unwrap();
            }
        })
    };

    let readers: Vec<_> = (0..TASKS)
        .map(|_| {
            let monitor = Arc::clone(&monitor);
            tokio::task::spawn_blocking(move || {
                let mut sizes = HashSet::new();
                for _ in 0..200 {
                    let queue = monitor.get_queue();
                    sizes.insert(queue.len());
                }
                sizes
            })
        })
        .collect();

    writer.await.unwrap();
    for reader in readers {
        let sizes = reader.await.unwrap();
        assert!(sizes.iter().all(|len| *len == 0 || *len == 3), "{sizes:?}");
    }
    assert!(monitor.get_queue().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_clients_do_not_evict_each_other() {
    let parser_port: Arc<dyn ReleaseParser> = parser();
    let history: Arc<dyn HistoryProvider> = Arc::new(FakeHistory::default());
    let monitor = Arc::new(DownloadMonitor::new(
        parser_port,
        history,
        &TrackingConfig::default(),
        Arc::new(QueueStore::new()),
    ));

    let handles: Vec<_> = (1..=3_i64)
        .map(|client_id| {
            let monitor = Arc::clone(&monitor);
            tokio::task::spawn_blocking(move || {
                let definition = client(client_id, Protocol::Torrent);
                let download_id = format!("dl-{client_id}");
                for _ in 0..20 {
                    monitor
                        .refresh_client(
                            &definition,
                            Ok(vec![item(&download_id, "Boards of Canada - Geogaddi", Some(5))]),
                        )
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }

    let queue = monitor.rebuild_queue(chrono::Utc::now());
    let ids: HashSet<&str> = queue.iter().map(|e| e.download_id()).collect();
    assert_eq!(ids, HashSet::from(["dl-1", "dl-2", "dl-3"]));
}
