/* tests/watch_tests.rs */

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use linode_metadata::objects::{NetworkInfo, Resource, ResourceKind, SshKeys, UserData};
use linode_metadata::watch::Config;
use linode_metadata::{Accessor, Delta, FetchError, MemoryAccessor, WatchError, Watcher};

const TICK: Duration = Duration::from_secs(1);

fn network(public: &[&str]) -> NetworkInfo {
	let mut n = NetworkInfo::default();
	n.ipv4.public = public.iter().map(|s| s.to_string()).collect();
	n
}

fn unauthorized() -> FetchError {
	FetchError::from_status(401, vec!["Unauthorized".into()])
}

fn setup() -> (Arc<MemoryAccessor>, Watcher) {
	let accessor = Arc::new(MemoryAccessor::new());
	let watcher = Watcher::new(Arc::clone(&accessor));
	(accessor, watcher)
}

#[tokio::test(start_paused = true)]
async fn test_network_scenario() {
	let (accessor, watcher) = setup();
	accessor.push_ok(network(&["1.2.3.4"]));
	accessor.push_ok(network(&["1.2.3.4", "5.6.7.8"]));
	accessor.push_ok(network(&["1.2.3.4", "5.6.7.8"]));
	accessor.push_err(ResourceKind::Network, FetchError::Timeout);
	accessor.push_ok(network(&["5.6.7.8", "1.2.3.4"]));
	accessor.push_err(ResourceKind::Network, unauthorized());

	let mut session = watcher.watch(ResourceKind::Network, TICK).unwrap();

	let event = session.next().await.unwrap().unwrap();
	assert_eq!(event.kind, ResourceKind::Network);
	assert_eq!(event.delta.added("ipv4.public").collect::<Vec<_>>(), ["5.6.7.8"]);
	assert_eq!(event.previous.revision, 0);
	assert_eq!(event.current.revision, 1);
	assert_eq!(event.value().as_network().unwrap().ipv4.public.len(), 2);

	match session.next().await {
		Some(Err(WatchError::Fatal { kind, source })) => {
			assert_eq!(kind, ResourceKind::Network);
			assert!(matches!(source, FetchError::Unauthorized { status: 401, .. }));
		}
		other => panic!("Expected fatal error, got {other:?}"),
	}
	assert!(session.next().await.is_none());
	assert_eq!(accessor.fetch_count(ResourceKind::Network), 6);

	// No ticks after the terminal error.
	tokio::time::sleep(TICK * 10).await;
	assert_eq!(accessor.fetch_count(ResourceKind::Network), 6);
}

#[tokio::test(start_paused = true)]
async fn test_baseline_is_silent_and_unchanged_values_emit_nothing() {
	let (accessor, watcher) = setup();
	accessor.set(UserData("#!/bin/sh".into()));

	let mut session = watcher.watch(ResourceKind::UserData, TICK).unwrap();
	let res = tokio::time::timeout(Duration::from_millis(30_500), session.next()).await;

	assert!(res.is_err(), "no event expected for identical values");
	assert_eq!(accessor.fetch_count(ResourceKind::UserData), 31);
}

#[tokio::test(start_paused = true)]
async fn test_transient_failure_does_not_advance_snapshot() {
	let (accessor, watcher) = setup();
	accessor.push_ok(UserData("a".into()));
	accessor.push_err(ResourceKind::UserData, FetchError::Transport("connection reset".into()));
	accessor.push_err(
		ResourceKind::UserData,
		FetchError::Decode {
			kind: ResourceKind::UserData,
			message: "bad base64".into(),
		},
	);
	accessor.push_ok(UserData("a".into()));
	accessor.push_ok(UserData("b".into()));

	let mut session = watcher.watch(ResourceKind::UserData, TICK).unwrap();
	let event = session.next().await.unwrap().unwrap();

	assert_eq!(event.previous.value.as_user_data().unwrap().as_str(), "a");
	assert_eq!(event.value().as_user_data().unwrap().as_str(), "b");
	assert_eq!(event.delta, Delta::Replaced);
	assert_eq!(event.current.revision, 1);
	assert_eq!(accessor.fetch_count(ResourceKind::UserData), 5);
}

#[tokio::test(start_paused = true)]
async fn test_events_follow_fetch_order() {
	let (accessor, watcher) = setup();
	for text in ["a", "b", "c", "d"] {
		accessor.push_ok(UserData(text.into()));
	}

	let mut session = watcher.watch(ResourceKind::UserData, TICK).unwrap();
	let mut seen = Vec::new();
	for _ in 0..3 {
		let event = session.next().await.unwrap().unwrap();
		seen.push((
			event.previous.value.as_user_data().unwrap().as_str().to_string(),
			event.value().as_user_data().unwrap().as_str().to_string(),
			event.current.revision,
		));
	}

	assert_eq!(
		seen,
		[
			("a".to_string(), "b".to_string(), 1),
			("b".to_string(), "c".to_string(), 2),
			("c".to_string(), "d".to_string(), 3),
		]
	);
}

#[tokio::test(start_paused = true)]
async fn test_ssh_key_order_is_a_change() {
	let (accessor, watcher) = setup();
	let mut first = SshKeys::default();
	first.users.insert("root".into(), vec!["A".into(), "B".into()]);
	let mut swapped = SshKeys::default();
	swapped.users.insert("root".into(), vec!["B".into(), "A".into()]);
	accessor.push_ok(first);
	accessor.push_ok(swapped);

	let mut session = watcher.watch(ResourceKind::SshKeys, TICK).unwrap();
	let event = session.next().await.unwrap().unwrap();

	assert_eq!(event.delta.fields().len(), 1);
	assert_eq!(event.delta.fields()[0].field, "users.root");
}

#[tokio::test(start_paused = true)]
async fn test_tag_order_is_not_a_change() {
	let (accessor, watcher) = setup();
	let instance = |tags: &str| {
		format!(
			r#"{{"id": 1, "host_uuid": "h", "label": "l", "region": "r", "type": "t", "tags": {tags},
			"specs": {{"vcpus": 1, "disk": 1, "memory": 1, "transfer": 1}},
			"backups": {{"enabled": false}}}}"#
		)
	};
	accessor.push_ok(Resource::decode(ResourceKind::Tags, instance(r#"["A", "B"]"#).as_bytes()).unwrap());
	accessor.push_ok(Resource::decode(ResourceKind::Tags, instance(r#"["B", "A"]"#).as_bytes()).unwrap());
	accessor.push_ok(Resource::decode(ResourceKind::Tags, instance(r#"["B", "C"]"#).as_bytes()).unwrap());

	let mut session = watcher.watch(ResourceKind::Tags, TICK).unwrap();
	let event = session.next().await.unwrap().unwrap();

	// Only the third fetch differs.
	assert_eq!(accessor.fetch_count(ResourceKind::Tags), 3);
	assert_eq!(event.delta.added("tags").collect::<Vec<_>>(), ["C"]);
	assert_eq!(event.delta.removed("tags").collect::<Vec<_>>(), ["A"]);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_stops_before_next_fetch() {
	let (accessor, watcher) = setup();
	accessor.push_ok(network(&["1.2.3.4"]));
	accessor.push_ok(network(&["1.2.3.4", "5.6.7.8"]));

	let mut session = watcher.watch(ResourceKind::Network, TICK).unwrap();
	assert!(session.next().await.unwrap().is_ok());
	assert_eq!(accessor.fetch_count(ResourceKind::Network), 2);

	session.cancel();
	assert!(session.is_cancelled());
	assert!(session.next().await.is_none());

	tokio::time::sleep(TICK * 10).await;
	assert_eq!(accessor.fetch_count(ResourceKind::Network), 2);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_handle_from_another_task() {
	let (accessor, watcher) = setup();
	accessor.set(network(&["1.2.3.4"]));

	let mut session = watcher.watch(ResourceKind::Network, TICK).unwrap();
	let handle = session.cancel_handle();

	tokio::spawn(async move {
		tokio::time::sleep(TICK * 3 + TICK / 2).await;
		handle.cancel();
	});

	assert!(session.next().await.is_none());
	let fetched = accessor.fetch_count(ResourceKind::Network);
	assert_eq!(fetched, 4);

	tokio::time::sleep(TICK * 10).await;
	assert_eq!(accessor.fetch_count(ResourceKind::Network), fetched);
}

#[tokio::test(start_paused = true)]
async fn test_drop_cancels_session() {
	let (accessor, watcher) = setup();
	accessor.set(network(&["1.2.3.4"]));

	let session = watcher.watch(ResourceKind::Network, TICK).unwrap();
	tokio::time::sleep(TICK / 2).await;
	assert_eq!(accessor.fetch_count(ResourceKind::Network), 1);

	drop(session);
	tokio::time::sleep(TICK * 10).await;
	assert_eq!(accessor.fetch_count(ResourceKind::Network), 1);
}

#[tokio::test(start_paused = true)]
async fn test_fatal_baseline_ends_session() {
	let (accessor, watcher) = setup();

	let mut session = watcher.watch(ResourceKind::Network, TICK).unwrap();

	match session.next().await {
		Some(Err(WatchError::Fatal { source, .. })) => {
			assert!(matches!(source, FetchError::Unsupported(ResourceKind::Network)));
		}
		other => panic!("Expected fatal error, got {other:?}"),
	}
	assert!(session.next().await.is_none());
	assert_eq!(accessor.fetch_count(ResourceKind::Network), 1);
}

#[tokio::test(start_paused = true)]
async fn test_transient_baseline_is_retried() {
	let (accessor, watcher) = setup();
	accessor.push_err(ResourceKind::Network, FetchError::Timeout);
	accessor.push_ok(network(&["1.2.3.4"]));
	accessor.push_ok(network(&[]));

	let start = tokio::time::Instant::now();
	let mut session = watcher.watch(ResourceKind::Network, TICK).unwrap();
	let event = session.next().await.unwrap().unwrap();

	assert_eq!(event.delta.removed("ipv4.public").collect::<Vec<_>>(), ["1.2.3.4"]);
	let elapsed = start.elapsed();
	assert!(elapsed >= TICK * 2 && elapsed < TICK * 3, "{elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn test_initial_delay() {
	let (accessor, watcher) = setup();
	accessor.push_ok(UserData("a".into()));
	accessor.push_ok(UserData("b".into()));

	let config = Config::every(TICK).with_initial_delay(Duration::from_secs(5));
	let start = tokio::time::Instant::now();
	let mut session = watcher.watch_with(ResourceKind::UserData, config).unwrap();

	tokio::time::sleep(Duration::from_secs(4)).await;
	assert_eq!(accessor.fetch_count(ResourceKind::UserData), 0);

	assert!(session.next().await.unwrap().is_ok());
	let elapsed = start.elapsed();
	assert!(elapsed >= Duration::from_secs(6) && elapsed < Duration::from_secs(7), "{elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn test_sessions_are_independent() {
	let (accessor, watcher) = setup();
	accessor.push_ok(UserData("a".into()));
	accessor.push_ok(UserData("b".into()));
	accessor.set(network(&["1.2.3.4"]));

	let mut data = watcher.watch(ResourceKind::UserData, TICK).unwrap();
	let network_session = watcher.watch(ResourceKind::Network, TICK).unwrap();

	let event = data.next().await.unwrap().unwrap();
	assert_eq!(event.value().as_user_data().unwrap().as_str(), "b");

	drop(network_session);
	data.cancel();

	// A fresh session reseeds silently from the current value.
	let mut again = watcher.watch(ResourceKind::UserData, TICK).unwrap();
	let res = tokio::time::timeout(TICK * 5, again.next()).await;
	assert!(res.is_err());
}

#[tokio::test]
async fn test_invalid_interval_is_rejected() {
	let (_, watcher) = setup();

	let err = watcher.watch(ResourceKind::Network, Duration::ZERO).unwrap_err();
	assert!(matches!(err, WatchError::Config(_)));
}

/// Answers the first fetch, then never completes another.
#[derive(Default)]
struct StallingAccessor {
	fetches: AtomicUsize,
}

#[async_trait]
impl Accessor for StallingAccessor {
	async fn fetch(&self, _kind: ResourceKind) -> Result<Resource, FetchError> {
		if self.fetches.fetch_add(1, Ordering::SeqCst) == 0 {
			return Ok(network(&["1.2.3.4"]).into());
		}
		std::future::pending().await
	}
}

#[tokio::test(start_paused = true)]
async fn test_cancel_abandons_fetch_in_flight() {
	let accessor = Arc::new(StallingAccessor::default());
	let watcher = Watcher::new(Arc::clone(&accessor));
	let mut session = watcher.watch(ResourceKind::Network, TICK).unwrap();
	drop(watcher);

	tokio::time::sleep(TICK + TICK / 2).await;
	assert_eq!(accessor.fetches.load(Ordering::SeqCst), 2);

	session.cancel();
	assert!(session.next().await.is_none());

	tokio::time::sleep(TICK * 10).await;
	assert_eq!(accessor.fetches.load(Ordering::SeqCst), 2);
	// The poll loop has exited and released its accessor.
	assert_eq!(Arc::strong_count(&accessor), 1);
}
