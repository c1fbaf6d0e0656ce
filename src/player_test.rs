#[cfg(test)]
mod tests {

    use chrono::{Local, TimeZone};
    use std::time::Duration;
    use tokio::sync::broadcast;
    use crate::core::{Comment, CommentId, FontSize, LocalSubmission, Mode, OverlayConfig};
    use crate::danmaku::{Slot, SubmitError};
    use crate::playback::{MediaClock, MediaError, PlaybackState, ReadyState, SimulatedClock};
    use crate::player::{Player, PlayerEvent};
    use crate::store::MemoryStore;

    type TestPlayer = Player<SimulatedClock, MemoryStore>;

    fn secs(seconds: f64) -> Duration {
        Duration::from_secs_f64(seconds)
    }

    fn comment(id: &str, second: u64, mode: Mode) -> Comment {
        Comment {
            id: CommentId::new(id),
            text: format!("comment {}", id),
            font_size: FontSize::Medium,
            color: "#fff".to_string(),
            mode,
            scheduled_time: second,
            authored_at: "2017/03/20 10:00:00".to_string(),
        }
    }

    fn drain(receiver: &mut broadcast::Receiver<PlayerEvent>) -> Vec<PlayerEvent> {
        let mut events = Vec::new();
        while let Ok(event) = receiver.try_recv() {
            events.push(event);
        }
        events
    }

    /// Player that became ready at 1s and was started by the user right away.
    fn playing_player(comments: &[Comment], duration: f64) -> (TestPlayer, broadcast::Receiver<PlayerEvent>) {
        let mut player = Player::new(
            OverlayConfig::default(),
            SimulatedClock::new(duration),
            MemoryStore::with_comments(comments),
        );
        let receiver = player.subscribe();

        player.start(Duration::ZERO);
        player.clock_mut().set_ready_state(ReadyState::EnoughData);
        player.advance(secs(1.0));
        assert_eq!(player.state(), PlaybackState::Pausing);

        player.toggle(secs(1.0));
        assert_eq!(player.state(), PlaybackState::Playing);
        (player, receiver)
    }

    /// One media second per wall second, advancing through the whole range.
    fn run(player: &mut TestPlayer, from: u64, to: u64) {
        for t in from..=to {
            player.clock_mut().step(1.0);
            player.advance(secs(t as f64));
        }
    }

    #[test]
    fn test_start_loads_comments() {
        let (player, mut receiver) = playing_player(&[comment("a", 2, Mode::Move)], 60.0);
        assert_eq!(player.scheduler().loaded(), 1);
        assert_eq!(player.store().fetches(), 1);

        let events = drain(&mut receiver);
        assert!(events.contains(&PlayerEvent::CommentsLoaded(1)));
        assert!(events.contains(&PlayerEvent::StateChanged {
            from: PlaybackState::Loading,
            to: PlaybackState::Pausing,
        }));
    }

    #[test]
    fn test_toggle_before_ready_is_inert() {
        let mut player = Player::new(OverlayConfig::default(), SimulatedClock::new(60.0), MemoryStore::new());
        player.start(Duration::ZERO);
        player.toggle(secs(0.5));
        assert_eq!(player.state(), PlaybackState::Loading);
        assert!(player.clock().is_paused());
        assert!(player.signs().loading_spinner);
    }

    #[test]
    fn test_same_second_comments_spawn_once_in_separate_bands() {
        let (mut player, mut receiver) =
            playing_player(&[comment("a", 5, Mode::Move), comment("b", 5, Mode::Move)], 60.0);

        run(&mut player, 2, 8);

        let a = player.bullets().get(&CommentId::new("a")).expect("a should be on screen");
        let b = player.bullets().get(&CommentId::new("b")).expect("b should be on screen");
        assert_ne!(a.slot, b.slot);
        assert_eq!(a.slot, Slot::Band(0));

        let spawned: Vec<PlayerEvent> = drain(&mut receiver)
            .into_iter()
            .filter(|event| matches!(event, PlayerEvent::CommentSpawned(_)))
            .collect();
        assert_eq!(
            spawned,
            vec![
                PlayerEvent::CommentSpawned(CommentId::new("a")),
                PlayerEvent::CommentSpawned(CommentId::new("b")),
            ]
        );
    }

    #[test]
    fn test_freeze_holds_comments_until_resume() {
        let (mut player, mut receiver) =
            playing_player(&[comment("m", 2, Mode::Move), comment("t", 2, Mode::Top)], 60.0);
        run(&mut player, 2, 3);
        assert_eq!(player.bullets().active().len(), 2);
        assert_eq!(player.bullets().pending_timers(), 1);
        drain(&mut receiver);

        player.toggle(secs(3.5));
        assert_eq!(player.state(), PlaybackState::Pausing);
        let frozen_x = player.snapshot(secs(3.5)).items[0].x;

        // three ticks pass while paused, well beyond the top comment's deadline
        run(&mut player, 4, 6);
        assert_eq!(player.bullets().active().len(), 2);
        assert_eq!(player.bullets().pending_timers(), 0);
        assert_eq!(player.snapshot(secs(6.0)).items[0].x, frozen_x);
        assert!(drain(&mut receiver)
            .iter()
            .all(|event| !matches!(event, PlayerEvent::CommentRemoved(_) | PlayerEvent::CommentSpawned(_))));

        player.toggle(secs(6.5));
        assert_eq!(player.bullets().pending_timers(), 1);

        player.advance(secs(7.0));
        assert!(player.bullets().is_active(&CommentId::new("t")));

        player.advance(secs(7.5));
        assert!(!player.bullets().is_active(&CommentId::new("t")));
        assert!(player.bullets().is_active(&CommentId::new("m")));
        assert!(drain(&mut receiver).contains(&PlayerEvent::CommentRemoved(CommentId::new("t"))));
    }

    #[test]
    fn test_decode_error_clears_and_surfaces_once() {
        let (mut player, mut receiver) =
            playing_player(&[comment("m", 2, Mode::Move), comment("t", 2, Mode::Top)], 60.0);
        run(&mut player, 2, 3);
        assert_eq!(player.bullets().active().len(), 2);

        player.clock_mut().fail_with(MediaError::Decode);
        player.advance(secs(4.0));

        assert_eq!(player.state(), PlaybackState::Error(MediaError::Decode));
        assert!(player.bullets().active().is_empty());
        assert_eq!(player.bullets().pending_timers(), 0);
        assert!(!player.scheduler().is_running());
        assert_eq!(player.surfaced_error(), MediaError::Decode.user_message());
        assert_eq!(player.signs().error_prompt, MediaError::Decode.user_message());

        // later reports change nothing
        player.report_error(2, secs(4.5));
        player.advance(secs(10.0));
        player.toggle(secs(10.0));
        assert_eq!(player.state(), PlaybackState::Error(MediaError::Decode));

        let surfaced = drain(&mut receiver)
            .into_iter()
            .filter(|event| matches!(event, PlayerEvent::ErrorSurfaced(_)))
            .count();
        assert_eq!(surfaced, 1);
    }

    #[test]
    fn test_aborted_error_code_is_ignored() {
        let (mut player, _receiver) = playing_player(&[], 60.0);
        player.report_error(1, secs(2.0));
        player.report_error(42, secs(2.0));
        assert_eq!(player.state(), PlaybackState::Playing);
        assert!(player.surfaced_error().is_none());
    }

    #[test]
    fn test_empty_submission_never_reaches_store() {
        let (mut player, _receiver) = playing_player(&[], 60.0);
        let result = player.submit_local(LocalSubmission::new("", FontSize::Medium, Mode::Move, "#fff"), secs(2.0));

        assert_eq!(result, Err(SubmitError::EmptyText));
        assert_eq!(player.store().submissions(), 0);
        assert!(player.bullets().active().is_empty());
    }

    #[test]
    fn test_submission_renders_and_reloads_comment_set() {
        let (mut player, mut receiver) = playing_player(&[comment("a", 30, Mode::Move)], 60.0);
        run(&mut player, 2, 3);
        drain(&mut receiver);

        let authored = Local.timestamp_millis_opt(1_490_000_000_000).unwrap();
        let comment = player
            .submit_local_at(LocalSubmission::new("hello", FontSize::Large, Mode::Move, "#00f"), authored, secs(3.2))
            .expect("submission should be accepted");

        assert_eq!(comment.scheduled_time, 2);
        assert_eq!(player.store().submissions(), 1);
        assert_eq!(player.scheduler().loaded(), 2);
        assert!(player.bullets().get(&comment.id).unwrap().local_preview);

        let events = drain(&mut receiver);
        assert_eq!(events[0], PlayerEvent::CommentSpawned(comment.id.clone()));
        assert!(events.contains(&PlayerEvent::CommentsLoaded(2)));

        // the stored copy is not spawned a second time in the same second
        player.advance(secs(4.0));
        assert_eq!(
            player.bullets().active().iter().filter(|rendered| rendered.id() == &comment.id).count(),
            1
        );
    }

    #[test]
    fn test_store_failure_keeps_local_preview() {
        let (mut player, mut receiver) = playing_player(&[], 60.0);
        player.store_mut().fail_with("connection refused");

        let comment = player
            .submit_local(LocalSubmission::new("still here", FontSize::Small, Mode::Top, "#fff"), secs(1.5))
            .expect("local preview should render");

        assert!(player.bullets().is_active(&comment.id));
        assert_eq!(player.scheduler().loaded(), 0);
        assert!(drain(&mut receiver)
            .iter()
            .any(|event| matches!(event, PlayerEvent::SubmitFailed(_))));
    }

    #[test]
    fn test_unreachable_store_at_start_is_not_fatal() {
        let mut store = MemoryStore::with_comments(&[comment("a", 2, Mode::Move)]);
        store.fail_with("timeout");
        let mut player = Player::new(OverlayConfig::default(), SimulatedClock::new(60.0), store);

        player.start(Duration::ZERO);
        assert_eq!(player.scheduler().loaded(), 0);
        assert!(player.scheduler().is_running());

        player.store_mut().recover();
        assert_eq!(player.refresh_comments().unwrap(), 1);
    }

    #[test]
    fn test_seek_clears_overlay() {
        let (mut player, _receiver) =
            playing_player(&[comment("m", 2, Mode::Move), comment("t", 2, Mode::Top)], 60.0);
        run(&mut player, 2, 3);

        player.seek(20.0, secs(3.2)).unwrap();
        assert!(player.bullets().active().is_empty());
        assert_eq!(player.bullets().pending_timers(), 0);
        assert_eq!(player.clock().current_position(), 20.0);
        assert_eq!(player.state(), PlaybackState::Playing);
    }

    #[test]
    fn test_switching_overlay_off_and_on() {
        let (mut player, _receiver) = playing_player(&[comment("a", 3, Mode::Move)], 60.0);
        player.set_bullet_screen_enabled(false);

        run(&mut player, 2, 5);
        assert!(player.bullets().active().is_empty());

        player.set_bullet_screen_enabled(true);
        assert_eq!(player.store().fetches(), 2);
    }

    #[test]
    fn test_end_of_stream_then_replay() {
        let (mut player, _receiver) = playing_player(&[comment("a", 2, Mode::Move)], 4.0);
        run(&mut player, 2, 5);

        assert_eq!(player.state(), PlaybackState::ReplayPending);
        assert!(player.signs().replay_button);
        assert!(!player.scheduler().is_running());

        player.toggle(secs(6.0));
        assert_eq!(player.state(), PlaybackState::Playing);
        assert_eq!(player.clock().current_position(), 0.0);
        assert!(player.bullets().active().is_empty());

        run(&mut player, 7, 8);
        assert!(player.bullets().is_active(&CommentId::new("a")));
    }

    #[test]
    fn test_slow_playback_spawns_each_comment_once() {
        let (mut player, mut receiver) = playing_player(&[comment("t", 1, Mode::Top)], 60.0);
        player.clock_mut().set_playback_rate(0.2);

        // five wall seconds per media second, longer than the top display time
        run(&mut player, 2, 12);
        assert!(!player.bullets().is_active(&CommentId::new("t")));

        let spawns = drain(&mut receiver)
            .into_iter()
            .filter(|event| *event == PlayerEvent::CommentSpawned(CommentId::new("t")))
            .count();
        assert_eq!(spawns, 1);
    }

    #[test]
    fn test_parked_clock_does_not_respawn_expired_comment() {
        let (mut player, mut receiver) = playing_player(&[comment("t", 0, Mode::Top)], 60.0);
        player.clock_mut().pause();

        // state stays Playing while the media clock does not move
        for t in 2..=8 {
            player.advance(secs(t as f64));
        }
        assert_eq!(player.state(), PlaybackState::Playing);
        assert!(!player.bullets().is_active(&CommentId::new("t")));

        let spawns = drain(&mut receiver)
            .into_iter()
            .filter(|event| matches!(event, PlayerEvent::CommentSpawned(_)))
            .count();
        assert_eq!(spawns, 1);
    }

    #[test]
    fn test_seek_back_shows_comments_again() {
        let (mut player, mut receiver) = playing_player(&[comment("t", 2, Mode::Top)], 60.0);
        run(&mut player, 2, 7);
        assert!(!player.bullets().is_active(&CommentId::new("t")));

        player.seek(1.0, secs(7.0)).unwrap();
        run(&mut player, 8, 9);
        assert!(player.bullets().is_active(&CommentId::new("t")));

        let spawns = drain(&mut receiver)
            .into_iter()
            .filter(|event| matches!(event, PlayerEvent::CommentSpawned(_)))
            .count();
        assert_eq!(spawns, 2);
    }
}
