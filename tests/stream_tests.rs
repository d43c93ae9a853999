/* tests/stream_tests.rs */

#![cfg(feature = "stream")]

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use linode_metadata::objects::{ResourceKind, Tags};
use linode_metadata::{FetchError, MemoryAccessor, WatchError, Watcher};

const TICK: Duration = Duration::from_secs(1);

#[tokio::test(start_paused = true)]
async fn test_stream_yields_changes_then_terminal_error() {
	let accessor = Arc::new(MemoryAccessor::new());
	accessor.push_ok(["web"].into_iter().collect::<Tags>());
	accessor.push_ok(["web", "prod"].into_iter().collect::<Tags>());
	accessor.push_err(ResourceKind::Tags, FetchError::from_status(403, Vec::new()));

	let watcher = Watcher::new(Arc::clone(&accessor));
	let mut stream = watcher.watch(ResourceKind::Tags, TICK).unwrap().into_stream();

	let event = stream.next().await.unwrap().unwrap();
	assert_eq!(event.delta.added("tags").collect::<Vec<_>>(), ["prod"]);

	let err = stream.next().await.unwrap().unwrap_err();
	assert!(matches!(err, WatchError::Fatal { kind: ResourceKind::Tags, .. }));
	assert!(stream.next().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_stream_cancel_handle() {
	let accessor = Arc::new(MemoryAccessor::new());
	accessor.push_ok(["a"].into_iter().collect::<Tags>());
	accessor.push_ok(["b"].into_iter().collect::<Tags>());

	let watcher = Watcher::new(Arc::clone(&accessor));
	let mut stream = watcher.watch(ResourceKind::Tags, TICK).unwrap().into_stream();
	let handle = stream.cancel_handle();

	assert!(stream.next().await.unwrap().is_ok());
	handle.cancel();
	assert!(stream.next().await.is_none());

	let fetched = accessor.fetch_count(ResourceKind::Tags);
	tokio::time::sleep(TICK * 10).await;
	assert_eq!(accessor.fetch_count(ResourceKind::Tags), fetched);
}

#[tokio::test(start_paused = true)]
async fn test_dropping_stream_stops_polling() {
	let accessor = Arc::new(MemoryAccessor::new());
	accessor.set(["a"].into_iter().collect::<Tags>());

	let watcher = Watcher::new(Arc::clone(&accessor));
	let stream = watcher.watch(ResourceKind::Tags, TICK).unwrap().into_stream();
	tokio::time::sleep(TICK * 2 + TICK / 2).await;
	assert_eq!(accessor.fetch_count(ResourceKind::Tags), 3);

	drop(stream);
	tokio::time::sleep(TICK * 10).await;
	assert_eq!(accessor.fetch_count(ResourceKind::Tags), 3);
}
