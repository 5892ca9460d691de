/*!
 * Integration tests for global styles, custom session styles and notifications
 */

use std::sync::Arc;

use texttrack::style::{ClosedCaptionsStyle, FontEdge, FontFamily, FontSize, StyleEvent, StyleField};
use texttrack::{ObserverError, StyleObserver, TextTrackError};

use crate::common::{create_manager, register_recorder, RecordingObserver, DELIVERY_TIMEOUT};

fn custom_style() -> ClosedCaptionsStyle {
    ClosedCaptionsStyle {
        font_family: FontFamily::Cursive,
        font_color: "#ff0000".to_string(),
        ..Default::default()
    }
}

#[test]
fn test_namedSetters_shouldRoundTripThroughGetters() {
    let (manager, _) = create_manager();

    manager.set_font_family(FontFamily::MonospaceSansSerif).unwrap();
    manager.set_font_size(FontSize::Small).unwrap();
    manager.set_font_color("#00ff00").unwrap();
    manager.set_font_opacity(-1).unwrap();
    manager.set_font_edge(FontEdge::Raised).unwrap();
    manager.set_font_edge_color("123abc").unwrap();
    manager.set_background_color("#000000").unwrap();
    manager.set_background_opacity(50).unwrap();
    manager.set_window_color("#ffffff").unwrap();
    manager.set_window_opacity(0).unwrap();

    assert_eq!(manager.get_font_family(), FontFamily::MonospaceSansSerif);
    assert_eq!(manager.get_font_size(), FontSize::Small);
    assert_eq!(manager.get_font_color(), "#00ff00");
    assert_eq!(manager.get_font_opacity(), -1);
    assert_eq!(manager.get_font_edge(), FontEdge::Raised);
    assert_eq!(manager.get_font_edge_color(), "123abc");
    assert_eq!(manager.get_background_color(), "#000000");
    assert_eq!(manager.get_background_opacity(), 50);
    assert_eq!(manager.get_window_color(), "#ffffff");
    assert_eq!(manager.get_window_opacity(), 0);
}

#[test]
fn test_outOfRangeOpacity_shouldLeaveStyleUnchanged() {
    let (manager, _) = create_manager();
    manager.set_font_opacity(40).unwrap();
    let before = manager.get_closed_captions_style();

    assert!(matches!(manager.set_font_opacity(101), Err(TextTrackError::InvalidArgument(_))));
    assert!(matches!(manager.set_window_opacity(-2), Err(TextTrackError::InvalidArgument(_))));

    let mut whole = before.clone();
    whole.font_family = FontFamily::Casual;
    whole.background_opacity = 101;
    assert!(matches!(
        manager.set_closed_captions_style(whole),
        Err(TextTrackError::InvalidArgument(_))
    ));

    assert_eq!(manager.get_closed_captions_style(), before);
}

#[test]
fn test_customStyle_shouldNotFollowGlobalChanges() {
    let (manager, renderer) = create_manager();
    let custom = manager.open_session("hdmi-0").unwrap();
    let plain_a = manager.open_session("hdmi-1").unwrap();
    let plain_b = manager.open_session("hdmi-2").unwrap();

    manager.apply_custom_style_to_session(custom, custom_style()).unwrap();

    let mut global = ClosedCaptionsStyle::default();
    global.font_size = FontSize::ExtraLarge;
    manager.set_closed_captions_style(global.clone()).unwrap();

    assert_eq!(manager.effective_style(custom).unwrap(), custom_style());
    assert_eq!(renderer.session(custom).unwrap().style, Some(custom_style()));
    for id in [plain_a, plain_b] {
        assert_eq!(manager.effective_style(id).unwrap(), global);
        assert_eq!(renderer.session(id).unwrap().style, Some(global.clone()));
    }
    assert!(manager.session_info(custom).unwrap().has_custom_style);
}

#[test]
fn test_clearCustomStyle_shouldFollowGlobalAgain() {
    let (manager, renderer) = create_manager();
    let id = manager.open_session("hdmi-0").unwrap();
    manager.apply_custom_style_to_session(id, custom_style()).unwrap();
    manager.set_font_size(FontSize::Large).unwrap();

    manager.clear_custom_style_from_session(id).unwrap();

    let global = manager.get_closed_captions_style();
    assert_eq!(manager.effective_style(id).unwrap(), global);
    assert_eq!(renderer.session(id).unwrap().style, Some(global));

    // Clearing again is harmless
    manager.clear_custom_style_from_session(id).unwrap();
}

#[test]
fn test_customStyle_withInvalidColor_shouldBeRejected() {
    let (manager, _) = create_manager();
    let id = manager.open_session("hdmi-0").unwrap();
    let mut style = custom_style();
    style.window_color = "#gg0000".to_string();

    assert!(matches!(
        manager.apply_custom_style_to_session(id, style),
        Err(TextTrackError::InvalidArgument(_))
    ));
    assert!(!manager.session_info(id).unwrap().has_custom_style);
}

#[test]
fn test_register_shouldDeliverCurrentGlobalStyleImmediately() {
    let (manager, _) = create_manager();
    manager.set_font_edge(FontEdge::Uniform).unwrap();

    let (recorder, _) = register_recorder(&manager);

    assert_eq!(
        recorder.events(),
        vec![StyleEvent::StyleChanged { style: manager.get_closed_captions_style() }]
    );
}

#[test]
fn test_fieldSetter_shouldNotifyFieldThenWholeStyle() {
    let (manager, _) = create_manager();
    let (recorder, _) = register_recorder(&manager);
    recorder.clear();

    manager.set_background_opacity(30).unwrap();
    assert!(manager.wait_for_notifications(DELIVERY_TIMEOUT));

    let events = recorder.events();
    assert_eq!(events.len(), 2);
    assert_eq!(
        events[0],
        StyleEvent::FieldChanged { change: StyleField::BackgroundOpacity(30) }
    );
    assert_eq!(
        events[1],
        StyleEvent::StyleChanged { style: manager.get_closed_captions_style() }
    );
}

#[test]
fn test_unchangedValue_shouldNotifyWholeStyleOnly() {
    let (manager, _) = create_manager();
    manager.set_font_color("#abcdef").unwrap();
    let (recorder, _) = register_recorder(&manager);
    recorder.clear();

    manager.set_font_color("#abcdef").unwrap();
    manager
        .set_closed_captions_style(manager.get_closed_captions_style())
        .unwrap();
    assert!(manager.wait_for_notifications(DELIVERY_TIMEOUT));

    let style = manager.get_closed_captions_style();
    assert_eq!(
        recorder.events(),
        vec![
            StyleEvent::StyleChanged { style: style.clone() },
            StyleEvent::StyleChanged { style },
        ]
    );
}

#[test]
fn test_setDefaultStyle_onDefaultManager_shouldStillNotify() {
    let (manager, _) = create_manager();
    let (recorder, _) = register_recorder(&manager);
    recorder.clear();

    manager
        .set_closed_captions_style(ClosedCaptionsStyle::default())
        .unwrap();
    assert!(manager.wait_for_notifications(DELIVERY_TIMEOUT));

    let events = recorder.events();
    assert_eq!(events.len(), 1);
    assert!(events.iter().all(|e| !e.is_field_change()));
}

#[test]
fn test_customStyle_shouldNotNotifyObservers() {
    let (manager, _) = create_manager();
    let id = manager.open_session("hdmi-0").unwrap();
    let (recorder, _) = register_recorder(&manager);
    recorder.clear();

    manager.apply_custom_style_to_session(id, custom_style()).unwrap();
    assert!(manager.wait_for_notifications(DELIVERY_TIMEOUT));
    assert!(recorder.events().is_empty());
}

#[test]
fn test_failingObserver_shouldNotFailSetter() {
    let (manager, _) = create_manager();
    let failing: Arc<dyn StyleObserver> = Arc::new(|_: &StyleEvent| -> Result<(), ObserverError> {
        Err(ObserverError::Unreachable("client went away".to_string()))
    });
    manager.register(failing).unwrap();
    let (recorder, _) = register_recorder(&manager);

    manager.set_font_family(FontFamily::SmallCapital).unwrap();
    assert!(manager.wait_for_notifications(DELIVERY_TIMEOUT));
    assert_eq!(
        recorder.events().last(),
        Some(&StyleEvent::StyleChanged { style: manager.get_closed_captions_style() })
    );
}

#[test]
fn test_unregister_shouldStopNotificationsAndRejectUnknown() {
    let (manager, _) = create_manager();
    let (recorder, handle) = register_recorder(&manager);
    manager.unregister(&handle).unwrap();

    manager.set_font_size(FontSize::Large).unwrap();
    assert!(manager.wait_for_notifications(DELIVERY_TIMEOUT));
    assert_eq!(recorder.events().len(), 1);

    let stranger: Arc<dyn StyleObserver> = RecordingObserver::new();
    assert!(matches!(manager.unregister(&stranger), Err(TextTrackError::NotFound(_))));
}
