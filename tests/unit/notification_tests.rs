/*!
 * Tests for the style observer registry
 */

use std::sync::Arc;

use texttrack::notification::{NotificationHub, StyleObserver};
use texttrack::style::{ClosedCaptionsStyle, FontFamily, StyleEvent, StyleField};
use texttrack::{ObserverError, TextTrackError};

use crate::common::{RecordingObserver, DELIVERY_TIMEOUT};

#[test]
fn test_register_withNoChangesYet_shouldDeliverBaselineOnce() {
    let hub = NotificationHub::new();
    let recorder = RecordingObserver::new();

    hub.register(recorder.clone(), ClosedCaptionsStyle::default).unwrap();

    assert_eq!(
        recorder.events(),
        vec![StyleEvent::StyleChanged { style: ClosedCaptionsStyle::default() }]
    );
}

#[test]
fn test_publish_withSeveralObservers_shouldReachAll() {
    let hub = NotificationHub::new();
    let first = RecordingObserver::new();
    let second = RecordingObserver::new();
    hub.register(first.clone(), ClosedCaptionsStyle::default).unwrap();
    hub.register(second.clone(), ClosedCaptionsStyle::default).unwrap();

    let change = StyleEvent::FieldChanged {
        change: StyleField::FontFamily(FontFamily::Casual),
    };
    hub.publish(vec![change.clone()]);
    assert!(hub.wait_idle(DELIVERY_TIMEOUT));

    assert_eq!(first.events().last(), Some(&change));
    assert_eq!(second.events().last(), Some(&change));
}

#[test]
fn test_unregister_shouldStopDelivery() {
    let hub = NotificationHub::new();
    let recorder = RecordingObserver::new();
    let handle: Arc<dyn StyleObserver> = recorder.clone();
    let id = hub.register(handle.clone(), ClosedCaptionsStyle::default).unwrap();

    assert_eq!(hub.unregister(&handle).unwrap(), id);
    assert_eq!(hub.observer_count(), 0);

    hub.publish(vec![StyleEvent::StyleChanged { style: ClosedCaptionsStyle::default() }]);
    assert!(hub.wait_idle(DELIVERY_TIMEOUT));
    assert_eq!(recorder.events().len(), 1);

    assert!(matches!(hub.unregister(&handle), Err(TextTrackError::NotFound(_))));
}

#[test]
fn test_slowObserver_shouldNotDelayPublisherOrOthers() {
    let hub = NotificationHub::new();
    let (release_tx, release_rx) = std::sync::mpsc::channel::<()>();
    let release_rx = parking_lot::Mutex::new(release_rx);
    let slow: Arc<dyn StyleObserver> = Arc::new(move |event: &StyleEvent| -> Result<(), ObserverError> {
        if matches!(event, StyleEvent::FieldChanged { .. }) {
            let _ = release_rx.lock().recv();
        }
        Ok(())
    });
    let fast = RecordingObserver::new();

    hub.register(slow, ClosedCaptionsStyle::default).unwrap();
    hub.register(fast.clone(), ClosedCaptionsStyle::default).unwrap();

    // Returns even though the slow observer is blocked
    hub.publish(vec![StyleEvent::FieldChanged {
        change: StyleField::FontOpacity(10),
    }]);

    let deadline = std::time::Instant::now() + DELIVERY_TIMEOUT;
    while fast.events().len() < 2 && std::time::Instant::now() < deadline {
        std::thread::sleep(std::time::Duration::from_millis(5));
    }
    assert_eq!(fast.events().len(), 2);

    release_tx.send(()).unwrap();
    assert!(hub.wait_idle(DELIVERY_TIMEOUT));
}
