/*!
 * Integration tests for the session lifecycle, mode selection and data intake
 */

use texttrack::session::{CcService, ContentMode, DataType, Lifecycle, SessionId, SessionManager};
use texttrack::{TextTrackError, TextTrackResult};

use crate::common::create_manager;

#[test]
fn test_openSession_withSameHandleTwice_shouldReturnSameId() {
    let (manager, _) = create_manager();
    let first = manager.open_session("hdmi-0").unwrap();
    let second = manager.open_session("hdmi-0").unwrap();
    let other = manager.open_session("hdmi-1").unwrap();

    assert_eq!(first, second);
    assert_ne!(first, other);
    assert_eq!(manager.sessions().len(), 2);
}

#[test]
fn test_openSession_afterClose_shouldCreateFreshSession() {
    let (manager, renderer) = create_manager();
    let first = manager.open_session("hdmi-0").unwrap();
    manager.close_session(first).unwrap();

    let second = manager.open_session("hdmi-0").unwrap();
    assert_ne!(first, second);
    assert_eq!(renderer.closed_sessions(), vec![first]);
}

#[test]
fn test_freshSession_shouldBeMutedWithNoMode() {
    let (manager, renderer) = create_manager();
    let id = manager.open_session("hdmi-0").unwrap();

    let info = manager.session_info(id).unwrap();
    assert!(info.muted);
    assert!(!info.paused);
    assert_eq!(info.lifecycle, Lifecycle::Open);
    assert_eq!(info.content_mode, ContentMode::Unset);

    // Nothing renders until a mode is picked and the session is unmuted
    assert!(matches!(
        manager.send_session_data(id, DataType::Cc, 0, "early"),
        Err(TextTrackError::InvalidState(_))
    ));
    manager.set_session_closed_captions_service(id, "CC1").unwrap();
    manager.send_session_data(id, DataType::Cc, 0, "hidden").unwrap();
    assert!(renderer.session(id).unwrap().on_screen().is_empty());

    manager.unmute_session(id).unwrap();
    let rendered = renderer.session(id).unwrap();
    assert_eq!(rendered.on_screen().len(), 1);
    assert_eq!(rendered.on_screen()[0].payload, "hidden");
}

#[test]
fn test_selectMode_afterUnmute_shouldMuteAgain() {
    let (manager, renderer) = create_manager();
    let id = manager.open_session("hdmi-0").unwrap();

    let selections: [fn(&SessionManager, SessionId) -> TextTrackResult<()>; 6] = [
        |m, id| m.set_session_closed_captions_service(id, "SERVICE64"),
        |m, id| m.set_session_teletext_selection(id, 888),
        |m, id| m.set_session_dvb_subtitle_selection(id, 1, 2),
        |m, id| m.set_session_webvtt_selection(id),
        |m, id| m.set_session_ttml_selection(id),
        |m, id| m.set_session_scte_selection(id),
    ];

    for select in selections {
        manager.unmute_session(id).unwrap();
        assert!(!manager.session_info(id).unwrap().muted);

        select(&manager, id).unwrap();
        assert!(manager.session_info(id).unwrap().muted);
        assert!(!renderer.session(id).unwrap().visible);
    }
    assert_eq!(manager.session_info(id).unwrap().content_mode, ContentMode::Scte);
}

#[test]
fn test_selectMode_shouldReplacePreviousParameters() {
    let (manager, renderer) = create_manager();
    let id = manager.open_session("hdmi-0").unwrap();

    manager.set_session_closed_captions_service(id, "TEXT2").unwrap();
    assert_eq!(
        manager.session_info(id).unwrap().content_mode,
        ContentMode::ClosedCaptions { service: CcService::Text(2) }
    );

    manager.set_session_dvb_subtitle_selection(id, 17, 18).unwrap();
    let expected = ContentMode::DvbSubtitle {
        composition_page_id: 17,
        ancillary_page_id: 18,
    };
    assert_eq!(manager.session_info(id).unwrap().content_mode, expected);
    assert_eq!(renderer.session(id).unwrap().mode, expected);
    assert_eq!(manager.session_info(id).unwrap().lifecycle, Lifecycle::ModeSelected);
}

#[test]
fn test_teletextSelection_shouldEnforcePageBounds() {
    let (manager, _) = create_manager();
    let id = manager.open_session("hdmi-0").unwrap();

    for page in [99, 900] {
        assert!(matches!(
            manager.set_session_teletext_selection(id, page),
            Err(TextTrackError::InvalidArgument(_))
        ));
    }
    assert_eq!(manager.session_info(id).unwrap().content_mode, ContentMode::Unset);

    for page in [100, 899] {
        manager.set_session_teletext_selection(id, page).unwrap();
        assert_eq!(
            manager.session_info(id).unwrap().content_mode,
            ContentMode::Teletext { page }
        );
    }
}

#[test]
fn test_closedCaptionsService_withBadNames_shouldBeInvalidArgument() {
    let (manager, _) = create_manager();
    let id = manager.open_session("hdmi-0").unwrap();

    for service in ["CC0", "CC5", "TEXT5", "SERVICE0", "SERVICE65", "cc1", "CC01", ""] {
        assert!(
            matches!(
                manager.set_session_closed_captions_service(id, service),
                Err(TextTrackError::InvalidArgument(_))
            ),
            "{} should be rejected",
            service
        );
    }
    for service in ["CC1", "CC4", "TEXT1", "TEXT4", "SERVICE1", "SERVICE64"] {
        manager.set_session_closed_captions_service(id, service).unwrap();
    }
}

#[test]
fn test_sendData_withMismatchedType_shouldBeInvalidState() {
    let (manager, renderer) = create_manager();
    let id = manager.open_session("hdmi-0").unwrap();
    manager.set_session_webvtt_selection(id).unwrap();
    manager.unmute_session(id).unwrap();

    assert!(matches!(
        manager.send_session_data(id, DataType::Ttml, 0, "<tt/>"),
        Err(TextTrackError::InvalidState(_))
    ));
    manager.send_session_data(id, DataType::Webvtt, 0, "WEBVTT").unwrap();
    assert_eq!(renderer.session(id).unwrap().presented.len(), 1);
}

#[test]
fn test_pauseThenResume_shouldPresentHeldDataInArrivalOrder() {
    let (manager, renderer) = create_manager();
    let id = manager.open_session("hdmi-0").unwrap();
    manager.set_session_teletext_selection(id, 100).unwrap();
    manager.unmute_session(id).unwrap();

    manager.send_session_data(id, DataType::Pes, 0, "before").unwrap();
    manager.pause_session(id).unwrap();
    for payload in ["one", "two", "three"] {
        manager.send_session_data(id, DataType::Pes, 0, payload).unwrap();
    }

    let paused = renderer.session(id).unwrap();
    assert_eq!(paused.presented.len(), 1);
    assert_eq!(manager.session_info(id).unwrap().held_packets, 3);

    manager.resume_session(id).unwrap();
    let payloads: Vec<String> = renderer
        .session(id)
        .unwrap()
        .presented
        .iter()
        .map(|p| p.payload.clone())
        .collect();
    assert_eq!(payloads, vec!["before", "one", "two", "three"]);
}

#[test]
fn test_pause_shouldBeIndependentOfMute() {
    let (manager, _) = create_manager();
    let id = manager.open_session("hdmi-0").unwrap();

    manager.pause_session(id).unwrap();
    manager.unmute_session(id).unwrap();
    let info = manager.session_info(id).unwrap();
    assert!(info.paused);
    assert!(!info.muted);

    manager.mute_session(id).unwrap();
    manager.resume_session(id).unwrap();
    let info = manager.session_info(id).unwrap();
    assert!(!info.paused);
    assert!(info.muted);
}

#[test]
fn test_reset_shouldClearDisplayButKeepModeAndMute() {
    let (manager, renderer) = create_manager();
    let id = manager.open_session("hdmi-0").unwrap();
    manager.set_session_ttml_selection(id).unwrap();
    manager.unmute_session(id).unwrap();
    manager.send_session_data(id, DataType::Ttml, 0, "<tt/>").unwrap();
    manager.pause_session(id).unwrap();
    manager.send_session_data(id, DataType::Ttml, 0, "<tt>held</tt>").unwrap();

    manager.reset_session(id).unwrap();

    let info = manager.session_info(id).unwrap();
    assert_eq!(info.content_mode, ContentMode::Ttml);
    assert!(!info.muted);
    assert!(!info.paused);
    assert_eq!(info.held_packets, 0);

    let rendered = renderer.session(id).unwrap();
    assert!(rendered.presented.is_empty());
    assert_eq!(rendered.clear_count, 1);
}

#[test]
fn test_timestamps_shouldBeForwardedAsIs() {
    let (manager, renderer) = create_manager();
    let id = manager.open_session("hdmi-0").unwrap();

    for ts in [1_000, 500, 500, 2_000] {
        manager.send_session_timestamp(id, ts).unwrap();
    }
    let rendered = renderer.session(id).unwrap();
    assert_eq!(rendered.timestamps_received, 4);
    assert_eq!(rendered.last_timestamp_ms, Some(2_000));
}

#[test]
fn test_previewText_shouldDependOnMode() {
    let (manager, renderer) = create_manager();
    let id = manager.open_session("hdmi-0").unwrap();

    manager.set_session_teletext_selection(id, 150).unwrap();
    assert!(matches!(
        manager.set_preview_text(id, "Sample"),
        Err(TextTrackError::NotSupported(_))
    ));

    manager.set_session_closed_captions_service(id, "CC1").unwrap();
    manager.set_preview_text(id, "Sample").unwrap();
    assert_eq!(
        renderer.session(id).unwrap().preview_text.as_deref(),
        Some("Sample")
    );
}

#[test]
fn test_closedSession_shouldRejectEveryOperation() {
    let (manager, _) = create_manager();
    let id = manager.open_session("hdmi-0").unwrap();
    manager.close_session(id).unwrap();

    let not_found = Err(TextTrackError::SessionNotFound(id));
    assert_eq!(manager.close_session(id), not_found);
    assert_eq!(manager.reset_session(id), not_found);
    assert_eq!(manager.pause_session(id), not_found);
    assert_eq!(manager.resume_session(id), not_found);
    assert_eq!(manager.mute_session(id), not_found);
    assert_eq!(manager.unmute_session(id), not_found);
    assert_eq!(manager.send_session_data(id, DataType::Cc, 0, "x"), not_found);
    assert_eq!(manager.send_session_timestamp(id, 1), not_found);
    assert_eq!(manager.set_preview_text(id, "x"), not_found);
    assert_eq!(manager.set_session_webvtt_selection(id), not_found);
    assert_eq!(manager.set_session_teletext_selection(id, 5), not_found);
    assert_eq!(
        manager.apply_custom_style_to_session(id, Default::default()),
        not_found
    );
    assert_eq!(manager.clear_custom_style_from_session(id), not_found);
    assert!(manager.session_info(id).is_err());
    assert!(manager.effective_style(id).is_err());
}
