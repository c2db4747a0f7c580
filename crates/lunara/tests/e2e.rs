// SPDX-FileCopyrightText: 2026 Lunara Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end integration tests for the complete Lunara pipeline.
//!
//! Each test creates an isolated TestHarness with temp SQLite and the real
//! conversation engine. Tests are independent and order-insensitive.

use std::sync::Arc;

use lunara_config::model::BotConfig;
use lunara_core::UserStore;
use lunara_cron::ReminderScanner;
use lunara_test_utils::{MockChannel, TestHarness};

// ---- Test 1: Full period-tracking conversation ----

#[tokio::test]
async fn test_period_tracking_conversation() {
    let harness = TestHarness::builder().build().await.unwrap();

    let menu = harness.send_expect_one("u1", "hi").await;
    assert!(menu.contains("Track my period"));

    let prompt = harness.send_expect_one("u1", "1").await;
    assert!(prompt.contains("last period start"));

    let ask = harness.send_expect_one("u1", "12/05/2025").await;
    assert!(ask.contains("09/06/2025"), "28-day prediction: {ask}");

    let noted = harness.send_expect_one("u1", "yes").await;
    assert!(noted.contains("Reminder noted"));

    // Everything landed in SQLite.
    let user = harness.store.get_user("u1").await.unwrap().unwrap();
    assert_eq!(
        user.last_period,
        chrono::NaiveDate::from_ymd_opt(2025, 5, 12)
    );
    assert_eq!(
        user.next_period,
        chrono::NaiveDate::from_ymd_opt(2025, 6, 9)
    );
    assert!(user.wants_reminder);

    // The cycle view reads it back.
    let cycle = harness.send_expect_one("u1", "5").await;
    assert!(cycle.contains("12/05/2025"));
    assert!(cycle.contains("09/06/2025"));
}

// ---- Test 2: Date validation ----

#[tokio::test]
async fn test_date_validation_re_prompts() {
    let harness = TestHarness::builder().build().await.unwrap();
    harness.send_expect_one("u1", "1").await;

    let invalid = harness.send_expect_one("u1", "sometime in may").await;
    assert!(invalid.contains("12/05/2025"), "format hint: {invalid}");

    let not_valid = harness.send_expect_one("u1", "31/02/2025").await;
    assert!(not_valid.contains("valid date"));

    // Still in the date flow; a correct date now succeeds.
    let ok = harness.send_expect_one("u1", "28/02/2025").await;
    assert!(ok.contains("28/03/2025"));
}

// ---- Test 3: Symptom logging ----

#[tokio::test]
async fn test_symptom_loop_end_to_end() {
    let harness = TestHarness::builder().build().await.unwrap();

    harness.send_expect_one("u1", "2").await;
    harness.send_expect_one("u1", "cramps").await;
    harness.send_expect_one("u1", "fatigue").await;
    let done = harness.send_expect_one("u1", "done").await;
    assert!(done.contains("2 symptoms saved"), "{done}");

    let entries = harness.store.list_symptoms("u1").await.unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].symptom, "fatigue"); // most recent first
    assert_eq!(entries[1].symptom, "cramps");

    let history = harness.send_expect_one("u1", "6").await;
    assert!(history.contains("• fatigue"));
    assert!(history.contains("• cramps"));
}

// ---- Test 4: Menu reset is idempotent from any state ----

#[tokio::test]
async fn test_menu_resets_from_every_flow() {
    let harness = TestHarness::builder().build().await.unwrap();

    for entry in ["1", "2", "3", "4", "7", "8"] {
        harness.send_expect_one("u1", entry).await;
        let menu = harness.send_expect_one("u1", "menu").await;
        assert!(
            menu.contains("Track my period"),
            "menu should reset from pick {entry}"
        );
    }
}

// ---- Test 5: Feedback flow ----

#[tokio::test]
async fn test_feedback_flow() {
    let harness = TestHarness::builder().build().await.unwrap();

    harness.send_expect_one("u1", "8").await;

    // Unrecognized first answer is ignored entirely.
    let ignored = harness.send("u1", "maybe").await.unwrap();
    assert!(ignored.is_empty());

    let q2 = harness.send_expect_one("u1", "2").await;
    assert!(q2.contains("challenges"));

    let thanks = harness.send_expect_one("u1", "too expensive").await;
    assert!(thanks.contains("thank you"));

    // Back at the menu afterwards.
    let fallback = harness.send_expect_one("u1", "gibberish").await;
    assert!(fallback.contains("didn't get that"));
}

// ---- Test 6: Ordering with vendor notification ----

#[tokio::test]
async fn test_order_with_vendor_notification() {
    let harness = TestHarness::builder()
        .with_vendor_chat("vendor-group-1")
        .build()
        .await
        .unwrap();

    harness.send_expect_one("u1", "4").await;
    let replies = harness.send("u1", "3").await.unwrap();
    assert_eq!(replies.len(), 2);
    assert_eq!(replies[0].chat.as_str(), "u1");
    assert!(replies[0].text.contains("3 packs"));
    assert_eq!(replies[1].chat.as_str(), "vendor-group-1");
    assert!(replies[1].text.contains("3 pack"));
}

// ---- Test 7: Language switch persists and localizes ----

#[tokio::test]
async fn test_language_switch_persists_across_messages() {
    let harness = TestHarness::builder().build().await.unwrap();

    harness.send_expect_one("u1", "7").await;
    let set = harness.send_expect_one("u1", "hausa").await;
    assert!(set.contains("An saita harshe"), "{set}");

    // The next message re-reads the language from storage.
    let menu = harness.send_expect_one("u1", "menu").await;
    assert!(menu.contains("Sannu"), "Hausa menu expected: {menu}");

    let user = harness.store.get_user("u1").await.unwrap().unwrap();
    assert_eq!(user.language.as_deref(), Some("Hausa"));
}

// ---- Test 8: Reminder scan against real storage ----

#[tokio::test]
async fn test_reminder_scan_day_window() {
    let harness = TestHarness::builder().build().await.unwrap();

    // Track a period and opt in through the conversation itself.
    harness.send_expect_one("u1", "1").await;
    harness.send_expect_one("u1", "12/05/2025").await;
    harness.send_expect_one("u1", "yes").await;

    let channel = Arc::new(MockChannel::new());
    let store: Arc<dyn UserStore> = harness.store.clone();
    let scanner = ReminderScanner::new(
        store,
        channel.clone(),
        harness.catalog.clone(),
        BotConfig::default().reminder_lead_days,
    );

    // next_period is 09/06/2025: exactly 3 days before fires once.
    let d = |y, m, day| chrono::NaiveDate::from_ymd_opt(y, m, day).unwrap();
    assert_eq!(scanner.scan_once(d(2025, 6, 6)).await, 1);
    assert_eq!(scanner.scan_once(d(2025, 6, 5)).await, 0); // 4 days out
    assert_eq!(scanner.scan_once(d(2025, 6, 7)).await, 0); // 2 days out

    let sent = channel.sent_messages().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].chat.as_str(), "u1");
    assert!(sent[0].text.contains("09/06/2025"));
}

// ---- Test 9: Isolation between chats ----

#[tokio::test]
async fn test_chats_do_not_share_state() {
    let harness = TestHarness::builder().build().await.unwrap();

    harness.send_expect_one("alice", "2").await; // symptom loop
    harness.send_expect_one("bob", "4").await; // order flow

    // Alice's symptom text is captured; Bob's quantity is parsed.
    harness.send_expect_one("alice", "cramps").await;
    let bob = harness.send_expect_one("bob", "2").await;
    assert!(bob.contains("2 packs"));

    let alice_symptoms = harness.store.list_symptoms("alice").await.unwrap();
    assert_eq!(alice_symptoms.len(), 1);
    assert!(harness.store.list_symptoms("bob").await.unwrap().is_empty());
}
