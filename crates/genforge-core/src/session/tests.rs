#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::config::Config;
    use crate::session::admission;
    use crate::session::dispatcher::derive_title;
    use crate::session::driver::ProgressDriver;
    use crate::session::handle::SessionHandle;
    use crate::session::ledger::CreditLedger;
    use crate::session::queue::TaskQueue;
    use crate::session::state::Session;
    use crate::session::types::{
        GenerationRequest, SubmitError, TaskKind, TaskRecord, TaskStatus, Tier, ViewerTarget,
    };

    fn signed_in_session(config: Config) -> Session {
        let mut session = Session::new(config);
        session.sign_in();
        session
    }

    fn record(kind: TaskKind) -> TaskRecord {
        TaskRecord::new(kind, "test task", "thumb.png")
    }

    // ── Ledger tests ──────────────────────────────────────────────────────────

    #[test]
    fn ledger_can_afford_is_inclusive() {
        let ledger = CreditLedger::new(25);
        assert!(ledger.can_afford(25));
        assert!(!ledger.can_afford(26));
    }

    #[test]
    fn ledger_debit_refuses_without_spending() {
        let mut ledger = CreditLedger::new(3);
        let err = ledger.debit(5).unwrap_err();
        assert_eq!(
            err,
            crate::session::types::LedgerError::InsufficientFunds {
                required: 5,
                available: 3
            }
        );
        assert_eq!(ledger.balance(), 3, "refused debit must not spend");
    }

    #[test]
    fn ledger_balance_never_negative_across_mixed_ops() {
        let mut ledger = CreditLedger::new(10);
        ledger.debit(10).expect("exact debit");
        assert_eq!(ledger.balance(), 0);
        assert!(ledger.debit(1).is_err(), "empty ledger must refuse");
        ledger.credit(7);
        ledger.debit(5).expect("covered debit");
        assert_eq!(ledger.balance(), 2);
    }

    #[test]
    fn ledger_credit_saturates() {
        let mut ledger = CreditLedger::new(u32::MAX - 1);
        ledger.credit(10);
        assert_eq!(ledger.balance(), u32::MAX);
    }

    // ── Admission tests ───────────────────────────────────────────────────────

    #[test]
    fn free_tier_admits_exactly_one() {
        assert!(admission::admit(Tier::Free, 0).is_ok());
        let err = admission::admit(Tier::Free, 1).unwrap_err();
        assert_eq!(
            err,
            SubmitError::QueueFull {
                tier: Tier::Free,
                max_processing: 1
            }
        );
    }

    #[test]
    fn paid_tiers_admit_up_to_their_cap() {
        assert!(admission::admit(Tier::Pro, 9).is_ok());
        assert!(admission::admit(Tier::Pro, 10).is_err());
        assert!(admission::admit(Tier::Studio, 19).is_ok());
        assert!(admission::admit(Tier::Studio, 20).is_err());
    }

    #[test]
    fn tier_table_carries_feature_constants() {
        assert_eq!(Tier::Free.limits().subscription_grant, 0);
        assert_eq!(Tier::Pro.limits().subscription_grant, 1000);
        assert_eq!(Tier::Studio.limits().subscription_grant, 4000);

        assert!(!Tier::Free.limits().can_export);
        assert!(Tier::Pro.limits().can_export);
        assert!(Tier::Studio.limits().can_export);

        assert_eq!(Tier::Free.limits().retry_allowance, 0);
        assert_eq!(Tier::Studio.limits().retry_allowance, 8);
    }

    // ── Queue tests ───────────────────────────────────────────────────────────

    #[test]
    fn enqueue_inserts_newest_first() {
        let mut queue = TaskQueue::new();
        let first = record(TaskKind::Model);
        let second = record(TaskKind::Image);
        let second_id = second.id.clone();
        queue.enqueue(first);
        queue.enqueue(second);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.tasks()[0].id, second_id, "newest record leads");
    }

    #[test]
    fn find_returns_exactly_the_enqueued_record() {
        let mut queue = TaskQueue::new();
        let rec = record(TaskKind::Model);
        let id = rec.id.clone();
        queue.enqueue(rec.clone());
        queue.enqueue(record(TaskKind::Image));

        let found = queue.find(&id).expect("record should be found");
        assert_eq!(found, &rec);
        assert!(queue.find("no-such-id").is_none());
    }

    #[test]
    fn tick_progress_is_monotonic_and_pinned_at_100() {
        let mut queue = TaskQueue::new();
        queue.enqueue(record(TaskKind::Model));

        let mut last = 0.0f32;
        for _ in 0..40 {
            queue.tick(7.0);
            let progress = queue.tasks()[0].progress;
            assert!(progress >= last, "progress must never decrease");
            assert!(progress <= 100.0, "progress must never overshoot");
            last = progress;
        }
        assert_eq!(queue.tasks()[0].progress, 100.0, "pinned at exactly 100");
    }

    #[test]
    fn status_flips_exactly_when_progress_reaches_100() {
        let mut queue = TaskQueue::new();
        queue.enqueue(record(TaskKind::Image));

        for _ in 0..50 {
            queue.tick(9.0);
            let rec = &queue.tasks()[0];
            // Completed if and only if progress is exactly 100.
            assert_eq!(rec.status == TaskStatus::Completed, rec.progress == 100.0);
        }
        assert_eq!(queue.tasks()[0].status, TaskStatus::Completed);
    }

    #[test]
    fn tick_skips_completed_records() {
        let mut queue = TaskQueue::new();
        queue.enqueue(record(TaskKind::Model));
        queue.tick(100.0);
        assert_eq!(queue.processing_count(), 0);

        // Ticking a drained queue changes nothing.
        let snapshot = queue.tasks().to_vec();
        queue.tick(50.0);
        assert_eq!(queue.tasks(), &snapshot[..]);
    }

    #[test]
    fn tick_advances_every_processing_record() {
        let mut queue = TaskQueue::new();
        queue.enqueue(record(TaskKind::Model));
        queue.enqueue(record(TaskKind::Image));
        queue.tick(30.0);
        assert!(queue.tasks().iter().all(|r| r.progress == 30.0));
        assert_eq!(queue.processing_count(), 2);
    }

    // ── Dispatcher tests ──────────────────────────────────────────────────────

    #[test]
    fn model_submission_debits_and_enqueues() {
        let mut session = signed_in_session(Config::default());
        let id = session
            .submit(GenerationRequest::model("x.png"))
            .expect("submit should succeed");

        assert_eq!(session.credits(), 125);
        assert_eq!(session.queue().len(), 1);
        assert_eq!(session.queue().processing_count(), 1);

        let rec = session.queue().find(&id).expect("record exists");
        assert_eq!(rec.kind, TaskKind::Model);
        assert_eq!(rec.status, TaskStatus::Processing);
        assert_eq!(rec.progress, 0.0);
        assert_eq!(rec.thumbnail, "x.png");
    }

    #[test]
    fn free_tier_second_submission_is_queue_full() {
        let mut session = signed_in_session(Config::default());
        session
            .submit(GenerationRequest::model("x.png"))
            .expect("first submit");

        let err = session
            .submit(GenerationRequest::model("y.png"))
            .unwrap_err();
        assert!(matches!(err, SubmitError::QueueFull { .. }));
        assert_eq!(session.credits(), 125, "denied submit must not debit");
        assert_eq!(session.queue().len(), 1, "denied submit must not enqueue");
    }

    #[test]
    fn ticking_to_completion_unblocks_the_free_tier() {
        let mut session = signed_in_session(Config::default());
        session
            .submit(GenerationRequest::model("x.png"))
            .expect("first submit");

        // Default increment is 4.0: 25 ticks to completion.
        for _ in 0..25 {
            session.tick();
        }
        assert_eq!(session.queue().processing_count(), 0);
        assert_eq!(session.queue().tasks()[0].progress, 100.0);

        session
            .submit(GenerationRequest::model("y.png"))
            .expect("completed records do not occupy the cap");
        assert_eq!(session.queue().len(), 2);
    }

    #[test]
    fn insufficient_credits_leaves_state_untouched() {
        let config = Config {
            starting_credits: 3,
            ..Config::default()
        };
        let mut session = signed_in_session(config);
        let err = session.submit(GenerationRequest::image("a fox")).unwrap_err();
        assert_eq!(
            err,
            SubmitError::InsufficientCredits {
                required: 5,
                available: 3
            }
        );
        assert_eq!(session.credits(), 3);
        assert!(session.queue().is_empty());
    }

    #[test]
    fn empty_prompt_is_rejected_before_any_mutation() {
        let mut session = signed_in_session(Config::default());
        for prompt in ["", "   ", "\n\t"] {
            let err = session.submit(GenerationRequest::image(prompt)).unwrap_err();
            assert_eq!(err, SubmitError::MissingPrompt);
        }
        assert_eq!(session.credits(), 150);
        assert!(session.queue().is_empty());
    }

    #[test]
    fn model_without_reference_is_rejected_before_any_mutation() {
        let mut session = signed_in_session(Config::default());
        let err = session
            .submit(GenerationRequest::model_without_reference())
            .unwrap_err();
        assert_eq!(err, SubmitError::MissingReference);
        assert_eq!(session.credits(), 150);
        assert!(session.queue().is_empty());
    }

    #[test]
    fn signed_out_submission_is_rejected_before_any_mutation() {
        let mut session = Session::new(Config::default());
        let err = session.submit(GenerationRequest::model("x.png")).unwrap_err();
        assert_eq!(err, SubmitError::NotSignedIn);
        assert_eq!(session.credits(), 150);
        assert!(session.queue().is_empty());
    }

    #[test]
    fn pro_tier_admits_beyond_the_free_cap() {
        let mut session = signed_in_session(Config::default());
        session.upgrade(Tier::Pro);

        for i in 0..3 {
            session
                .submit(GenerationRequest::image(format!("prompt {i}")))
                .expect("pro submit");
        }
        assert_eq!(session.queue().processing_count(), 3);

        session
            .submit(GenerationRequest::image("one more"))
            .expect("cap of 10 leaves room");
        assert_eq!(session.queue().len(), 4);
    }

    #[test]
    fn image_submission_without_reference_uses_placeholder_thumbnail() {
        let mut session = signed_in_session(Config::default());
        session.upgrade(Tier::Pro);

        let id = session
            .submit(GenerationRequest::image("a quiet harbor"))
            .expect("submit");
        let rec = session.queue().find(&id).expect("record exists");
        assert_eq!(rec.thumbnail, "placeholders/image.png");

        let id = session
            .submit(GenerationRequest::image("a loud harbor").with_reference("bias.png"))
            .expect("submit with guidance image");
        let rec = session.queue().find(&id).expect("record exists");
        assert_eq!(rec.thumbnail, "bias.png");
    }

    // ── Title derivation ──────────────────────────────────────────────────────

    #[test]
    fn model_tasks_take_the_fixed_title() {
        assert_eq!(derive_title(TaskKind::Model, None), "3D Model");
    }

    #[test]
    fn image_titles_truncate_on_char_boundaries() {
        assert_eq!(
            derive_title(TaskKind::Image, Some("a fox in the snowy forest")),
            "a fox in the sn"
        );
        assert_eq!(derive_title(TaskKind::Image, Some("  a fox  ")), "a fox");
        // Multi-byte prompts must not split a character.
        assert_eq!(
            derive_title(TaskKind::Image, Some("古代の森にいるパンダの彫刻をつくる")),
            "古代の森にいるパンダの彫刻をつ"
        );
    }

    // ── Session lifecycle tests ───────────────────────────────────────────────

    #[test]
    fn upgrade_replaces_tier_and_applies_grant() {
        let mut session = signed_in_session(Config::default());
        session.upgrade(Tier::Pro);
        assert_eq!(session.tier(), Tier::Pro);
        assert_eq!(session.credits(), 1150);

        // Re-upgrading into the current tier grants nothing.
        session.upgrade(Tier::Pro);
        assert_eq!(session.credits(), 1150);

        session.upgrade(Tier::Studio);
        assert_eq!(session.tier(), Tier::Studio);
        assert_eq!(session.credits(), 5150);
    }

    #[test]
    fn top_up_credits_the_ledger() {
        let mut session = signed_in_session(Config::default());
        session.top_up(600);
        assert_eq!(session.credits(), 750);
    }

    #[test]
    fn sign_out_restores_the_starting_state() {
        let mut session = signed_in_session(Config::default());
        session.upgrade(Tier::Studio);
        session
            .submit(GenerationRequest::model("x.png"))
            .expect("submit");

        session.sign_out();
        assert!(!session.signed_in());
        assert_eq!(session.tier(), Tier::Free);
        assert_eq!(session.credits(), 150);
        assert!(session.queue().is_empty());
    }

    // ── Viewer handoff tests ──────────────────────────────────────────────────

    #[test]
    fn open_task_routes_completed_records_by_kind() {
        let mut session = signed_in_session(Config::default());
        let model_id = session
            .submit(GenerationRequest::model("m.png"))
            .expect("model submit");
        session.upgrade(Tier::Pro);
        let image_id = session
            .submit(GenerationRequest::image("harbor at dusk"))
            .expect("image submit");

        assert!(
            session.open_task(&model_id).is_none(),
            "processing records do not open"
        );

        for _ in 0..25 {
            session.tick();
        }

        match session.open_task(&model_id) {
            Some(ViewerTarget::Model { id, thumbnail, .. }) => {
                assert_eq!(id, model_id);
                assert_eq!(thumbnail, "m.png");
            }
            other => panic!("expected model viewer target, got {other:?}"),
        }
        match session.open_task(&image_id) {
            Some(ViewerTarget::Image { url, title }) => {
                assert_eq!(url, "placeholders/image.png");
                assert_eq!(title, "harbor at dusk");
            }
            other => panic!("expected image viewer target, got {other:?}"),
        }
        assert!(session.open_task("no-such-id").is_none());
    }

    // ── Progress driver tests ─────────────────────────────────────────────────

    fn driver_config() -> Config {
        Config {
            tick_interval: Duration::from_millis(10),
            tick_increment: 50.0,
            ..Config::default()
        }
    }

    async fn wait_for_completion(handle: &SessionHandle, id: &str) {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                if let Some(rec) = handle.find_task(id).await {
                    if rec.is_completed() {
                        break;
                    }
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("task should complete within the timeout");
    }

    #[tokio::test(start_paused = true)]
    async fn driver_ticks_submitted_work_to_completion() {
        let handle = SessionHandle::new(driver_config());
        let driver = ProgressDriver::spawn(handle.clone(), Duration::from_millis(10));

        handle.sign_in().await;
        let id = handle
            .submit(GenerationRequest::model("x.png"))
            .await
            .expect("submit");

        wait_for_completion(&handle, &id).await;
        let rec = handle.find_task(&id).await.expect("record exists");
        assert_eq!(rec.progress, 100.0);
        assert_eq!(rec.status, TaskStatus::Completed);

        driver.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn driver_parks_when_idle_and_resumes_on_enqueue() {
        let handle = SessionHandle::new(driver_config());
        let driver = ProgressDriver::spawn(handle.clone(), Duration::from_millis(10));

        handle.sign_in().await;
        let first = handle
            .submit(GenerationRequest::image("first"))
            .await
            .expect("first submit");
        wait_for_completion(&handle, &first).await;

        // Idle gap: the driver is parked, nothing changes.
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(handle.processing_count().await, 0);

        let second = handle
            .submit(GenerationRequest::image("second"))
            .await
            .expect("second submit");
        wait_for_completion(&handle, &second).await;

        driver.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn driver_stop_terminates_promptly() {
        let handle = SessionHandle::new(driver_config());
        let driver = ProgressDriver::spawn(handle.clone(), Duration::from_millis(10));

        // Stop while parked (no work was ever submitted).
        tokio::time::timeout(Duration::from_secs(1), driver.stop())
            .await
            .expect("stop should resolve while the driver is parked");
    }

    // ── Serialization surface ─────────────────────────────────────────────────

    #[test]
    fn records_serialize_with_snake_case_tags() {
        let rec = record(TaskKind::Model);
        let json = serde_json::to_value(&rec).expect("serialize");
        assert_eq!(json["kind"], "model");
        assert_eq!(json["status"], "processing");
    }
}
