// SPDX-FileCopyrightText: 2026 Shortreel Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Property tests: queues stay bounded, keep FIFO order, and reload intact.

use std::collections::VecDeque;

use proptest::prelude::*;
use shortreel_core::types::{GenerationRequest, GenerationStatus};
use shortreel_queue::{GenerationQueue, PersistentQueue};

#[derive(Debug, Clone)]
enum Op {
    Add(u32),
    Pop,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![3 => any::<u32>().prop_map(Op::Add), 2 => Just(Op::Pop)]
}

proptest! {
    #[test]
    fn persistent_queue_matches_bounded_fifo_model(
        capacity in 1usize..6,
        ops in proptest::collection::vec(op_strategy(), 0..40),
    ) {
        let dir = tempfile::tempdir().unwrap();
        let queue: PersistentQueue<u32> =
            PersistentQueue::open("prop", dir.path(), "prop.json", capacity);
        let mut model: VecDeque<u32> = VecDeque::new();

        for op in ops {
            match op {
                Op::Add(value) => {
                    let accepted = queue.add(value).is_ok();
                    prop_assert_eq!(accepted, model.len() < capacity);
                    if accepted {
                        model.push_back(value);
                    }
                }
                Op::Pop => {
                    prop_assert_eq!(queue.pop().ok(), model.pop_front());
                }
            }
            prop_assert!(queue.len() <= capacity);
        }

        let reopened: PersistentQueue<u32> =
            PersistentQueue::open("prop", dir.path(), "prop.json", capacity);
        prop_assert_eq!(reopened.list(), model.into_iter().collect::<Vec<_>>());
    }

    #[test]
    fn generation_queue_never_runs_two_requests_per_chat(
        chats in proptest::collection::vec(0i64..3, 1..10),
        pops in 1usize..12,
    ) {
        let dir = tempfile::tempdir().unwrap();
        let queue = GenerationQueue::open(dir.path(), 10);
        for (i, chat) in chats.iter().enumerate() {
            queue.add(GenerationRequest::new(format!("topic {i}"), *chat)).unwrap();
        }
        for _ in 0..pops {
            let _ = queue.pop();
            for chat in 0..3 {
                let in_flight = queue
                    .list()
                    .iter()
                    .filter(|r| r.chat_id == chat && r.status == GenerationStatus::Generating)
                    .count();
                prop_assert!(in_flight <= 1);
            }
        }

        let reopened = GenerationQueue::open(dir.path(), 10);
        prop_assert_eq!(reopened.len(), chats.len());
        prop_assert!(!reopened.is_generating());
    }
}
