/*!
 * Style change events and change detection.
 */

use serde::{Deserialize, Serialize};

use super::models::{ClosedCaptionsStyle, StyleField, StyleFieldKind};

/// Notification pushed to style observers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum StyleEvent {
    /// The whole style changed; carries the new global style
    StyleChanged { style: ClosedCaptionsStyle },
    /// One field changed; carries its new value
    FieldChanged { change: StyleField },
}

impl StyleEvent {
    /// Events describing a transition from `old` to `new`.
    ///
    /// One `FieldChanged` per differing field, in declaration order, followed by
    /// a single `StyleChanged`. The `StyleChanged` is present even when no
    /// field differs.
    pub fn changes_between(old: &ClosedCaptionsStyle, new: &ClosedCaptionsStyle) -> Vec<StyleEvent> {
        let mut events: Vec<StyleEvent> = StyleFieldKind::ALL
            .iter()
            .filter_map(|kind| {
                let after = new.field(*kind);
                (old.field(*kind) != after).then_some(StyleEvent::FieldChanged { change: after })
            })
            .collect();

        events.push(StyleEvent::StyleChanged { style: new.clone() });
        events
    }

    pub fn is_field_change(&self) -> bool {
        matches!(self, StyleEvent::FieldChanged { .. })
    }
}
