mod common;

use std::collections::HashSet;

use common::TestEnv;
use fitcoach::models::MessageRole;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_appends_wait_for_the_write_lock() {
    let env = TestEnv::new().await;
    let first = env.db.create_conversation().await.unwrap().id;
    let second = env.db.create_conversation().await.unwrap().id;

    let handles: Vec<_> = (0..64)
        .map(|i| {
            let db = env.db.clone();
            let conversation_id = if i % 2 == 0 { first } else { second };
            tokio::spawn(async move {
                db.append_message(
                    conversation_id,
                    MessageRole::User,
                    &format!("set {i}"),
                    &[],
                )
                .await
            })
        })
        .collect();

    let mut failures = Vec::new();
    for handle in handles {
        if let Err(error) = handle.await.expect("append task panicked") {
            failures.push(error.to_string());
        }
    }
    assert!(failures.is_empty(), "appends failed: {failures:?}");

    let first_messages = env.db.get_messages(first).await.unwrap();
    let second_messages = env.db.get_messages(second).await.unwrap();
    assert_eq!(first_messages.len(), 32);
    assert_eq!(second_messages.len(), 32);

    let contents: HashSet<String> = first_messages
        .into_iter()
        .chain(second_messages)
        .map(|message| message.content)
        .collect();
    assert_eq!(contents.len(), 64);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_and_deletes_succeed() {
    let env = TestEnv::new().await;

    let created: Vec<_> = (0..16)
        .map(|_| {
            let db = env.db.clone();
            tokio::spawn(async move { db.create_conversation().await })
        })
        .collect();

    let mut ids = Vec::new();
    for handle in created {
        ids.push(handle.await.unwrap().unwrap().id);
    }

    let deletes: Vec<_> = ids
        .iter()
        .map(|&id| {
            let db = env.db.clone();
            tokio::spawn(async move { db.delete_conversation(id).await })
        })
        .collect();

    for handle in deletes {
        assert!(handle.await.unwrap().unwrap());
    }
    assert!(env.db.list_conversations(20).await.unwrap().is_empty());
}
