// SPDX-FileCopyrightText: 2026 Shortreel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests for the complete approval pipeline.
//!
//! Each test drives the service through its poll loop (scripted updates on
//! the mock transport) with the scheduler running, the way `shortreel run`
//! wires them. Tests are independent and order-insensitive.

use std::sync::Arc;
use std::time::Duration;

use shortreel_core::types::{GenerationRequest, QueuedVideo, APPROVE_TOKEN, REJECT_TOKEN};
use shortreel_queue::GenerationQueue;
use shortreel_scheduler::Scheduler;
use shortreel_test_utils::{
    callback_update, text_update, MockProducer, MockPublisher, ProduceCall, TestHarness,
    TransportCall,
};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

const ADMIN: i64 = 999;
const WAIT: Duration = Duration::from_secs(5);

/// A running bot plus scheduler over one harness.
struct Pipeline {
    harness: TestHarness,
    producer: Arc<MockProducer>,
    publisher: Arc<MockPublisher>,
    cancel: CancellationToken,
    scheduler: Option<JoinHandle<()>>,
}

impl Pipeline {
    fn new(harness: TestHarness) -> Self {
        let producer = Arc::new(MockProducer::new(harness.data_dir().join("out")).write_files());
        Self {
            harness,
            producer,
            publisher: Arc::new(MockPublisher::new()),
            cancel: CancellationToken::new(),
            scheduler: None,
        }
    }

    fn start(&mut self) {
        self.harness.service.start_bot();
        let scheduler = Scheduler::new(
            Arc::clone(&self.harness.service),
            self.producer.clone(),
            self.publisher.clone(),
        );
        let cancel = self.cancel.clone();
        self.scheduler = Some(tokio::spawn(async move { scheduler.run(cancel).await }));
    }

    async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.scheduler.take() {
            tokio::time::timeout(WAIT, handle).await.unwrap().unwrap();
        }
        tokio::time::timeout(WAIT, self.harness.service.stop_bot())
            .await
            .unwrap();
    }

    async fn wait_for<P>(&self, pred: P) -> TransportCall
    where
        P: Fn(&TransportCall) -> bool,
    {
        self.harness.transport.wait_for_call(WAIT, pred).await
    }
}

#[tokio::test]
async fn s1_s2_presented_video_is_rejected_through_the_bot() {
    let harness = TestHarness::builder().with_admin(ADMIN).build().unwrap();
    harness.service.start_bot();

    harness
        .service
        .queue_video(QueuedVideo::new("/v/1.mp4", "T1"))
        .await
        .unwrap();
    let pending = harness.service.pending().unwrap();
    assert_eq!(pending.video.message_ref(), Some((ADMIN, 100)));

    harness
        .push_updates(vec![callback_update(1, ADMIN, Some(100), REJECT_TOKEN)])
        .await;
    harness
        .transport
        .wait_for_call(WAIT, |call| {
            matches!(call, TransportCall::EditCaption { text, .. } if text == "*T1*\n\n❌ Rejected")
        })
        .await;

    let (verdict, video) = harness
        .service
        .wait_for_result(&CancellationToken::new())
        .await
        .unwrap();
    assert!(!verdict.approved);
    assert_eq!(video.title, "T1");
    assert!(harness.service.pending().is_none());
    assert_eq!(harness.service.offset(), 2);

    harness.service.stop_bot().await;
}

#[tokio::test]
async fn s3_generate_rejected_when_generation_queue_full() {
    let harness = TestHarness::builder().build().unwrap();
    for chat in 1..=10 {
        harness
            .service
            .generation_queue()
            .add(GenerationRequest::new("topic", chat))
            .unwrap();
    }
    harness.service.start_bot();

    harness
        .push_updates(vec![text_update(1, 50, "/generate weather")])
        .await;
    harness
        .transport
        .wait_for_call(WAIT, |call| {
            matches!(call, TransportCall::SendMessage { chat_id: 50, text } if text == "Queue full. Please wait.")
        })
        .await;
    assert_eq!(harness.service.generation_queue().len(), 10);

    harness.service.stop_bot().await;
}

#[tokio::test]
async fn s4_restart_recovers_generation_queue() {
    let dir = tempfile::tempdir().unwrap();
    {
        let queue = GenerationQueue::open(dir.path(), 10);
        queue.add(GenerationRequest::new("a", 1)).unwrap();
        queue.add(GenerationRequest::new("b", 2)).unwrap();
        queue.add(GenerationRequest::new("c", 3)).unwrap();
        queue.pop().unwrap();
        assert!(queue.is_generating());
    }

    let queue = GenerationQueue::open(dir.path(), 10);
    assert_eq!(queue.len(), 3);
    assert!(queue.list().iter().all(|r| !r.is_generating()));
}

#[tokio::test]
async fn s5_approved_video_is_published_and_caption_updated() {
    let mut pipeline = Pipeline::new(TestHarness::builder().with_admin(ADMIN).build().unwrap());
    pipeline
        .producer
        .push_video(QueuedVideo::new("/v/1.mp4", "T1"))
        .await;
    pipeline.start();

    pipeline
        .wait_for(|call| matches!(call, TransportCall::SendVideo { chat_id: ADMIN, .. }))
        .await;
    pipeline
        .harness
        .push_updates(vec![callback_update(1, ADMIN, Some(100), APPROVE_TOKEN)])
        .await;

    pipeline
        .wait_for(|call| {
            matches!(call, TransportCall::EditCaption { chat_id: ADMIN, message_id: 100, text }
                if text == "*T1*\n\n✅ Uploaded\nhttps://shorts.example/1")
        })
        .await;

    let captions: Vec<String> = pipeline
        .harness
        .transport
        .calls()
        .await
        .into_iter()
        .filter_map(|call| match call {
            TransportCall::EditCaption { text, .. } => Some(text),
            _ => None,
        })
        .collect();
    assert_eq!(
        captions,
        vec![
            "*T1*\n\n⏳ Uploading…".to_string(),
            "*T1*\n\n✅ Uploaded\nhttps://shorts.example/1".to_string(),
        ]
    );
    assert_eq!(pipeline.publisher.published().await[0].title, "T1");

    pipeline.shutdown().await;
}

#[tokio::test]
async fn s6_tick_with_admin_presents_immediately() {
    let mut pipeline = Pipeline::new(TestHarness::builder().with_admin(ADMIN).build().unwrap());
    pipeline.start();

    let call = pipeline
        .wait_for(|call| matches!(call, TransportCall::SendVideo { .. }))
        .await;
    assert!(matches!(
        call,
        TransportCall::SendVideo { chat_id: ADMIN, caption, .. } if caption.starts_with("*Trending video 1*")
    ));
    assert_eq!(pipeline.producer.calls().await, vec![ProduceCall::Autonomous]);

    pipeline.shutdown().await;
}

#[tokio::test]
async fn s6_tick_without_admin_notifies_reviewers() {
    let mut pipeline = Pipeline::new(TestHarness::builder().build().unwrap());
    pipeline.harness.send_text(5, "/review").await;
    pipeline.start();

    pipeline
        .wait_for(|call| {
            matches!(call, TransportCall::SendMessage { chat_id: 5, text }
                if text.starts_with("📥 New video queued: *Trending video 1*"))
        })
        .await;
    assert!(pipeline.harness.service.pending().is_none());
    assert_eq!(pipeline.harness.service.video_queue().len(), 1);

    pipeline.shutdown().await;
}

#[tokio::test]
async fn chat_request_flows_from_generate_to_upload() {
    let mut pipeline = Pipeline::new(TestHarness::builder().with_admin(ADMIN).build().unwrap());
    // The startup tick fails, leaving the review slot free.
    pipeline.producer.push_failure("no trending topic").await;
    pipeline.start();
    let deadline = tokio::time::Instant::now() + WAIT;
    while !pipeline
        .producer
        .calls()
        .await
        .contains(&ProduceCall::Autonomous)
    {
        assert!(tokio::time::Instant::now() < deadline, "startup tick never ran");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    pipeline
        .harness
        .push_updates(vec![text_update(1, 5, "/generate cats")])
        .await;
    pipeline
        .wait_for(|call| {
            matches!(call, TransportCall::SendVideo { chat_id: ADMIN, caption, .. }
                if caption.starts_with("*Video about cats*"))
        })
        .await;

    pipeline
        .harness
        .push_updates(vec![callback_update(2, ADMIN, Some(100), APPROVE_TOKEN)])
        .await;
    pipeline
        .wait_for(|call| {
            matches!(call, TransportCall::EditCaption { text, .. }
                if text == "*Video about cats*\n\n✅ Uploaded\nhttps://shorts.example/1")
        })
        .await;

    let to_requester = pipeline.harness.transport.messages_to(5).await;
    assert!(to_requester[0].starts_with("📝 Queued video about *cats*"));
    assert!(to_requester.iter().any(|m| m.starts_with("✅ Video ready: *Video about cats*")));
    assert!(pipeline.harness.service.generation_queue().is_empty());

    pipeline.shutdown().await;
}
