//! Poller and sender sharing one manager while the session is replaced.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use om::{FakeTransport, SessionConfig, SessionManager};

fn long_id(n: usize) -> String {
	format!("shard{n}:{}", format!("{n:04}").repeat(24))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn pollers_never_observe_a_torn_identifier() {
	let transport = FakeTransport::new();
	let issued: Arc<Mutex<HashSet<String>>> = Arc::default();
	let counter = Arc::new(AtomicUsize::new(0));

	{
		let issued = Arc::clone(&issued);
		let counter = Arc::clone(&counter);
		transport.respond_with("start", move |_| {
			let id = long_id(counter.fetch_add(1, Ordering::SeqCst));
			issued.lock().unwrap().insert(id.clone());
			format!("\"{id}\"")
		});
	}
	transport.respond("events", "[]").respond("send", "win");
	transport.set_latency(Duration::from_millis(1));

	let manager = Arc::new(SessionManager::builder().transport(transport.clone()).random_id("ABCD2345").build());
	manager.establish(SessionConfig::new()).await.unwrap();

	let establisher = {
		let manager = Arc::clone(&manager);
		tokio::spawn(async move {
			for _ in 0..25 {
				manager.establish(SessionConfig::new()).await.unwrap();
			}
		})
	};
	let mut workers = Vec::new();
	for worker in 0..3 {
		let manager = Arc::clone(&manager);
		workers.push(tokio::spawn(async move {
			for _ in 0..40 {
				if worker == 0 {
					manager.send_message("ping").await.unwrap();
				} else {
					manager.poll().await.unwrap();
				}
			}
		}));
	}

	establisher.await.unwrap();
	for worker in workers {
		worker.await.unwrap();
	}

	let issued = issued.lock().unwrap();
	let requests = transport.requests();
	let with_id: Vec<_> = requests.iter().filter_map(|request| request.param("id")).collect();
	assert_eq!(with_id.len(), 120);
	for id in with_id {
		assert!(issued.contains(id), "request used an identifier that was never issued: {id}");
	}
	assert_eq!(issued.len(), 26);
}

#[tokio::test]
async fn concurrent_actions_share_one_session() {
	let transport = FakeTransport::new();
	transport.respond("start", "\"front1:abc\"").respond("events", r#"[["typing"]]"#).respond("typing", "win");
	let manager = Arc::new(SessionManager::with_transport(transport.clone()));
	manager.establish(SessionConfig::new()).await.unwrap();

	let (polled, typed) = tokio::join!(manager.poll(), manager.show_typing());
	assert_eq!(polled.unwrap().len(), 1);
	typed.unwrap();

	for request in transport.requests_to("events").iter().chain(transport.requests_to("typing").iter()) {
		assert_eq!(request.param("id"), Some("front1:abc"));
	}
}
