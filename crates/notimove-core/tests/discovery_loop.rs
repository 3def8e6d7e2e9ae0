mod common;

use std::time::Duration;

use common::Rig;
use config::Placement;
use notimove_core::{
    BOTTOM_Y, Error, LoopState, OsVersion, Point, Stage,
    test_support::{Event, FakeElement, banner, fast_settings, run_async_test, window},
};

#[test]
fn windows_present_at_start_are_never_resolved() {
    run_async_test(async {
        let rig = Rig::new(fast_settings(), true);
        rig.desktop.add_window(window(1, 320.0, 90.0), Some(banner().build()));
        rig.handle.start();
        rig.scanning().await;
        rig.passes(6).await;
        assert!(rig.desktop.resolved_windows().is_empty());

        rig.desktop.add_window(window(2, 320.0, 90.0), Some(banner().build()));
        assert!(
            rig.until(|| rig.sink.count(|e| matches!(e, Event::Moved(2, _, _))) == 1)
                .await
        );
        rig.passes(rig.status().await.passes + 4).await;
        assert_eq!(rig.desktop.resolved_windows(), vec![2]);
        rig.handle.shutdown().await;
    });
}

#[test]
fn one_enumeration_before_first_timed_pass() {
    run_async_test(async {
        let mut settings = fast_settings();
        settings.discovery_interval_ms = 10_000;
        let rig = Rig::new(settings, true);
        rig.handle.start();
        rig.scanning().await;
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(rig.desktop.list_calls(), 1);
        assert_eq!(rig.status().await.passes, 0);
        rig.handle.shutdown().await;
    });
}

#[test]
fn undersized_window_never_reaches_resolver() {
    run_async_test(async {
        let rig = Rig::new(fast_settings(), true);
        rig.handle.start();
        rig.scanning().await;
        rig.desktop.add_window(window(7, 40.0, 40.0), Some(banner().build()));
        rig.desktop.add_window(window(8, 320.0, 90.0), Some(banner().build()));
        assert!(
            rig.until(|| rig.sink.count(|e| matches!(e, Event::Moved(8, _, _))) == 1)
                .await
        );
        rig.passes(rig.status().await.passes + 3).await;
        assert!(!rig.desktop.resolved_windows().contains(&7));
        assert_eq!(rig.sink.count(|e| *e == Event::Detected(7)), 0);
        rig.handle.shutdown().await;
    });
}

#[test]
fn foreign_owner_is_filtered() {
    run_async_test(async {
        let rig = Rig::new(fast_settings(), true);
        rig.handle.start();
        rig.scanning().await;
        let mut other = window(9, 320.0, 90.0);
        other.app = "Safari".into();
        rig.desktop.add_window(other, Some(banner().build()));
        rig.passes(rig.status().await.passes + 4).await;
        assert!(rig.desktop.resolved_windows().is_empty());
        rig.handle.shutdown().await;
    });
}

#[test]
fn stage_three_match_is_reported_once() {
    run_async_test(async {
        let rig = Rig::new(fast_settings(), true);
        rig.handle.start();
        rig.scanning().await;
        let tree = FakeElement::new("AXWindow")
            .with_child(FakeElement::new("AXGroup").with_size(320.0, 90.0))
            .build();
        rig.desktop.add_window(window(3, 340.0, 100.0), Some(tree));
        assert!(
            rig.until(|| rig.sink.count(|e| matches!(e, Event::Moved(3, _, _))) == 1)
                .await
        );
        rig.passes(rig.status().await.passes + 5).await;
        let resolved: Vec<Event> = rig
            .sink
            .events()
            .into_iter()
            .filter(|e| matches!(e, Event::Resolved(3, _)))
            .collect();
        assert_eq!(resolved, vec![Event::Resolved(3, Stage::RoleAndSize)]);
        rig.handle.shutdown().await;
    });
}

#[test]
fn subrole_stage_follows_running_os_version() {
    run_async_test(async {
        let rig = Rig::new(fast_settings(), true);
        rig.handle.start();
        rig.scanning().await;
        let tree = || {
            FakeElement::new("AXWindow")
                .with_child(
                    FakeElement::new("AXGroup")
                        .with_subrole("AXNotificationCenterNotification")
                        .with_size(320.0, 90.0),
                )
                .build()
        };

        rig.desktop.add_window(window(11, 340.0, 100.0), Some(tree()));
        assert!(
            rig.until(|| rig.sink.count(|e| matches!(e, Event::Resolved(11, _))) == 1)
                .await
        );
        assert_eq!(rig.sink.count(|e| *e == Event::Resolved(11, Stage::RoleAndSize)), 1);

        rig.desktop.set_os(OsVersion::new(26, 0, 0));
        rig.desktop.add_window(window(12, 340.0, 100.0), Some(tree()));
        assert!(
            rig.until(|| rig.sink.count(|e| matches!(e, Event::Resolved(12, _))) == 1)
                .await
        );
        assert_eq!(rig.sink.count(|e| *e == Event::Resolved(12, Stage::Subrole)), 1);
        rig.handle.shutdown().await;
    });
}

#[test]
fn failures_are_isolated_per_window() {
    run_async_test(async {
        let rig = Rig::new(fast_settings(), true);
        rig.handle.start();
        rig.scanning().await;

        let read_only = FakeElement::new("AXWindow")
            .with_child(
                FakeElement::new("AXGroup")
                    .with_subrole("AXNotificationCenterBanner")
                    .with_size(300.0, 80.0)
                    .read_only(),
            )
            .build();
        let stuck = FakeElement::new("AXWindow")
            .with_child(
                FakeElement::new("AXGroup")
                    .with_subrole("AXNotificationCenterBanner")
                    .with_size(300.0, 80.0)
                    .ignoring_writes(),
            )
            .build();
        rig.desktop.add_window(window(10, 320.0, 90.0), None);
        rig.desktop.add_window(window(11, 320.0, 90.0), Some(read_only));
        rig.desktop.add_window(window(12, 320.0, 90.0), Some(stuck));
        rig.desktop.add_window(window(13, 320.0, 90.0), Some(banner().build()));

        assert!(
            rig.until(|| rig.sink.count(|e| matches!(e, Event::Moved(13, _, _))) == 1)
                .await
        );
        let events = rig.sink.events();
        assert!(events.contains(&Event::Failed(10, Error::NotFound)));
        assert!(events.contains(&Event::Failed(11, Error::NotSettable)));
        assert!(
            events
                .iter()
                .any(|e| matches!(e, Event::Failed(12, Error::VerificationFailed { .. })))
        );
        assert_eq!(rig.status().await.state, LoopState::Scanning);
        rig.handle.shutdown().await;
    });
}

#[test]
fn hung_window_does_not_starve_others() {
    run_async_test(async {
        let mut settings = fast_settings();
        settings.foreign_call_timeout_ms = 150;
        let rig = Rig::new(settings, true);
        rig.handle.start();
        rig.scanning().await;
        let hung = FakeElement::new("AXWindow")
            .with_delay(Duration::from_secs(2))
            .with_child(banner())
            .build();
        rig.desktop.add_window(window(20, 320.0, 90.0), Some(hung));
        rig.desktop.add_window(window(21, 320.0, 90.0), Some(banner().build()));
        assert!(
            rig.until(|| rig.sink.count(|e| matches!(e, Event::Moved(21, _, _))) == 1)
                .await
        );
        assert!(
            rig.sink
                .events()
                .contains(&Event::Failed(20, Error::Timeout { ms: 150 }))
        );
        rig.handle.shutdown().await;
    });
}

#[test]
fn moves_to_configured_placement() {
    run_async_test(async {
        let mut settings = fast_settings();
        settings.placement = Placement::BottomRight;
        settings.padding = 20.0;
        let rig = Rig::new(settings, true);
        rig.handle.start();
        rig.scanning().await;
        rig.desktop.add_window(window(30, 320.0, 90.0), Some(banner().build()));
        assert!(
            rig.until(|| rig.sink.count(|e| matches!(e, Event::Moved(30, _, _))) == 1)
                .await
        );
        assert!(rig.sink.events().contains(&Event::Moved(
            30,
            Placement::BottomRight,
            Point::new(1120.0, BOTTOM_Y)
        )));
        rig.handle.shutdown().await;
    });
}

#[test]
fn disabled_settings_detect_without_moving() {
    run_async_test(async {
        let mut settings = fast_settings();
        settings.enabled = false;
        let rig = Rig::new(settings, true);
        rig.handle.start();
        rig.scanning().await;
        rig.desktop.add_window(window(40, 320.0, 90.0), Some(banner().build()));
        assert!(rig.until(|| rig.sink.count(|e| *e == Event::Detected(40)) == 1).await);
        rig.passes(rig.status().await.passes + 3).await;
        assert!(rig.desktop.resolved_windows().is_empty());
        rig.handle.shutdown().await;
    });
}

#[test]
fn rescan_reprocesses_known_windows() {
    run_async_test(async {
        let rig = Rig::new(fast_settings(), true);
        rig.handle.start();
        rig.scanning().await;
        rig.desktop.add_window(window(50, 320.0, 90.0), Some(banner().build()));
        assert!(
            rig.until(|| rig.sink.count(|e| matches!(e, Event::Moved(50, _, _))) == 1)
                .await
        );
        rig.settings.update(|s| s.placement = Placement::TopLeft);
        rig.handle.rescan_now();
        assert!(rig.until(|| {
            rig.sink.events().contains(&Event::Moved(
                50,
                Placement::TopLeft,
                Point::new(20.0, 900.0 - 80.0 - 20.0),
            ))
        })
        .await);
        rig.handle.shutdown().await;
    });
}

#[test]
fn per_pass_budget_defers_remaining_windows() {
    run_async_test(async {
        let mut settings = fast_settings();
        settings.max_windows_per_pass = 1;
        settings.discovery_interval_ms = 100;
        let rig = Rig::new(settings, true);
        rig.handle.start();
        rig.scanning().await;
        let start = rig.status().await.passes;
        for id in 60..63 {
            rig.desktop.add_window(window(id, 320.0, 90.0), Some(banner().build()));
        }
        assert!(
            rig.until(|| rig.sink.count(|e| matches!(e, Event::Moved(_, _, _))) == 3)
                .await
        );
        assert!(rig.status().await.passes - start >= 3);
        rig.handle.shutdown().await;
    });
}
