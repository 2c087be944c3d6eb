//! Manipulation library event payloads.
//!
//! The library hands its callbacks loosely shaped JS objects. They are
//! deserialized into [`RawManipulation`] and checked into a typed
//! [`ManipulationEvent`] here, so the mapping stays testable off the browser.

use kurbo::Vec2;
use liveframe_core::ManipulationEvent;
use serde::Deserialize;

/// Library events the binding subscribes to.
pub const MANIPULATION_EVENTS: [&str; 5] = ["drag", "resize", "scale", "rotate", "pinch"];

/// The fields of a library event the engine reads. Anything else is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawManipulation {
    pub transform: Option<String>,
    pub translate: Vec<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub delta: Vec<f64>,
    pub scale: Vec<f64>,
    pub rotation: Option<f64>,
}

fn vec2(values: &[f64]) -> Vec2 {
    Vec2::new(
        values.first().copied().unwrap_or(0.0),
        values.get(1).copied().unwrap_or(0.0),
    )
}

impl RawManipulation {
    /// Type the payload of the library event `name`.
    ///
    /// Returns `None` for unknown events and for payloads missing the field
    /// the event is applied with.
    pub fn into_event(self, name: &str) -> Option<ManipulationEvent> {
        match name {
            "drag" => Some(ManipulationEvent::Drag {
                translate: vec2(&self.translate),
                transform: self.transform?,
            }),
            "resize" => Some(ManipulationEvent::Resize {
                width: self.width?,
                height: self.height?,
                delta: vec2(&self.delta),
            }),
            "scale" => Some(ManipulationEvent::Scale {
                scale: if self.scale.is_empty() { Vec2::new(1.0, 1.0) } else { vec2(&self.scale) },
                transform: self.transform?,
            }),
            "rotate" => Some(ManipulationEvent::Rotate {
                rotation: self.rotation.unwrap_or(0.0),
                transform: self.transform?,
            }),
            "pinch" => Some(ManipulationEvent::Pinch {
                transform: self.transform?,
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(json: &str) -> RawManipulation {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_drag_payload() {
        let event = raw(r#"{"transform":"translate(3px, 4px)","translate":[3,4],"clientX":10}"#)
            .into_event("drag")
            .unwrap();
        assert_eq!(
            event,
            ManipulationEvent::Drag {
                translate: Vec2::new(3.0, 4.0),
                transform: "translate(3px, 4px)".to_string(),
            }
        );
    }

    #[test]
    fn test_resize_payload_keeps_delta() {
        let event = raw(r#"{"width":200,"height":50,"delta":[0,6]}"#).into_event("resize").unwrap();
        assert_eq!(
            event,
            ManipulationEvent::Resize {
                width: 200.0,
                height: 50.0,
                delta: Vec2::new(0.0, 6.0),
            }
        );
    }

    #[test]
    fn test_incomplete_payloads_are_dropped() {
        assert!(raw(r#"{"translate":[1,1]}"#).into_event("drag").is_none());
        assert!(raw(r#"{"width":10}"#).into_event("resize").is_none());
        assert!(raw(r#"{"transform":"none"}"#).into_event("warp").is_none());
    }

    #[test]
    fn test_every_subscribed_event_is_typed() {
        let full = r#"{"transform":"none","translate":[0,0],"width":1,"height":1,"delta":[0,0],"scale":[1,1],"rotation":0}"#;
        for name in MANIPULATION_EVENTS {
            let event = raw(full).into_event(name).unwrap();
            assert_eq!(event.name(), name);
        }
    }
}
