use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;

use super::*;

type Log = Arc<Mutex<Vec<(String, Duration)>>>;

fn timed_task(log: &Log, origin: Instant, name: &'static str, fail: bool) -> impl Future<Output = Result<&'static str, String>> + Send + 'static {
	let log = Arc::clone(log);
	async move {
		log.lock().push((format!("start:{name}"), origin.elapsed()));
		tokio::time::sleep(Duration::from_millis(100)).await;
		log.lock().push((format!("end:{name}"), origin.elapsed()));
		if fail { Err(format!("{name} failed")) } else { Ok(name) }
	}
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn single_slot_runs_in_submission_order() {
	let queue = BoundedTaskQueue::new("drafts", 1);
	let log: Log = Arc::default();
	let origin = Instant::now();

	let first = queue.enqueue(timed_task(&log, origin, "a", true));
	let second = queue.enqueue(timed_task(&log, origin, "b", false));
	let third = queue.enqueue(timed_task(&log, origin, "c", false));
	assert_eq!(queue.pending(), 2);

	let (first, second, third) = tokio::join!(first, second, third);
	assert!(matches!(first, Err(QueueError::Task(ref msg)) if msg == "a failed"));
	assert_eq!(second.ok(), Some("b"));
	assert_eq!(third.ok(), Some("c"));

	let log = log.lock().clone();
	let order: Vec<_> = log.iter().map(|(event, _)| event.as_str()).collect();
	assert_eq!(order, ["start:a", "end:a", "start:b", "end:b", "start:c", "end:c"]);

	// b starts the moment a fails; the failure adds no delay.
	assert_eq!(log[2].1, Duration::from_millis(100));
	assert_eq!(log[4].1, Duration::from_millis(200));
	assert_eq!(queue.active(), 0);
	assert_eq!(queue.pending(), 0);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn limit_bounds_concurrency() {
	let queue = BoundedTaskQueue::new("wide", 2);
	let running = Arc::new(Mutex::new((0usize, 0usize)));

	let tasks: Vec<_> = (0..5)
		.map(|_| {
			let running = Arc::clone(&running);
			queue.enqueue(async move {
				{
					let mut guard = running.lock();
					guard.0 += 1;
					guard.1 = guard.1.max(guard.0);
				}
				tokio::time::sleep(Duration::from_millis(10)).await;
				running.lock().0 -= 1;
				Ok::<_, ()>(())
			})
		})
		.collect();

	for task in tasks {
		task.await.unwrap();
	}
	assert_eq!(running.lock().1, 2);
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn panicking_task_releases_its_slot() {
	let queue = BoundedTaskQueue::new("panics", 1);
	let boom = queue.enqueue(async {
		if true {
			panic!("task exploded");
		}
		Ok::<u8, ()>(0)
	});
	let next = queue.enqueue(async { Ok::<u8, ()>(7) });

	assert!(matches!(boom.await, Err(QueueError::Aborted)));
	assert_eq!(next.await.ok(), Some(7));
}

#[tokio::test(flavor = "current_thread", start_paused = true)]
async fn dropped_handle_does_not_cancel_task() {
	let queue = BoundedTaskQueue::new("detached", 1);
	let ran = Arc::new(Mutex::new(false));
	let flag = Arc::clone(&ran);
	drop(queue.enqueue(async move {
		*flag.lock() = true;
		Ok::<_, ()>(())
	}));

	queue.enqueue(async { Ok::<_, ()>(()) }).await.unwrap();
	assert!(*ran.lock());
}
