//! Live controls: parameter-change messages applied between frames.
//!
//! Input handlers send [`ControlCommand`]s through a [`ControlHandle`]; the
//! frame loop drains them with [`Controller::apply_pending`] before taking
//! its per-frame parameter snapshot, so a frame never sees a half-applied
//! change.

use log::{info, warn};
use std::sync::mpsc::{self, Receiver, Sender};
use winit::keyboard::KeyCode;

use crate::params::{Feature, Rgb, ShapeKind, VisualizerParams};

/// Sensitivity is kept in this range
pub const SENSITIVITY_RANGE: (f32, f32) = (0.0, 3.0);

/// Shape size (before the marker scale factor) is kept in this range
pub const SHAPE_SIZE_RANGE: (f32, f32) = (0.1, 3.0);

/// Step used by the keyboard adjustments
const KEY_STEP: f32 = 0.1;

/// Which colour a [`ControlCommand::SetColor`] replaces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorTarget {
    Base,
    Peak,
    Trough,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlCommand {
    SetSensitivity(f32),
    AdjustSensitivity(f32),
    SetColor(ColorTarget, Rgb),
    SetFeature(Feature, bool),
    ToggleFeature(Feature),
    SetShape(ShapeKind, bool),
    ToggleShape(ShapeKind),
    SetShapeSize(f32),
    AdjustShapeSize(f32),
    TogglePlayback,
    Quit,
}

/// Requests the frame loop acts on outside the parameter snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlOutcome {
    pub toggle_playback: bool,
    pub quit: bool,
}

/// Cloneable sender side
#[derive(Debug, Clone)]
pub struct ControlHandle {
    tx: Sender<ControlCommand>,
}

impl ControlHandle {
    /// Returns false once the controller is gone
    pub fn send(&self, command: ControlCommand) -> bool {
        self.tx.send(command).is_ok()
    }
}

/// Receiver side, owned by the frame loop
pub struct Controller {
    rx: Receiver<ControlCommand>,
}

impl Controller {
    pub fn channel() -> (ControlHandle, Controller) {
        let (tx, rx) = mpsc::channel();
        (ControlHandle { tx }, Controller { rx })
    }

    /// Apply every queued command in order
    pub fn apply_pending(&self, params: &mut VisualizerParams) -> ControlOutcome {
        let mut outcome = ControlOutcome::default();
        while let Ok(command) = self.rx.try_recv() {
            apply(command, params, &mut outcome);
        }
        outcome
    }
}

pub(crate) fn clamp_finite(value: f32, (lo, hi): (f32, f32), current: f32) -> f32 {
    if value.is_finite() {
        value.clamp(lo, hi)
    } else {
        warn!("Ignoring non-finite control value");
        current
    }
}

fn apply(command: ControlCommand, params: &mut VisualizerParams, outcome: &mut ControlOutcome) {
    let deform = &mut params.deform;
    let markers = &mut params.markers;

    match command {
        ControlCommand::SetSensitivity(v) => {
            deform.sensitivity = clamp_finite(v, SENSITIVITY_RANGE, deform.sensitivity);
        }
        ControlCommand::AdjustSensitivity(dv) => {
            let v = deform.sensitivity + dv;
            deform.sensitivity = clamp_finite(v, SENSITIVITY_RANGE, deform.sensitivity);
            info!("Sensitivity {:.1}", deform.sensitivity);
        }
        ControlCommand::SetColor(target, color) => {
            let slot = match target {
                ColorTarget::Base => &mut deform.base_color,
                ColorTarget::Peak => &mut deform.peak_color,
                ColorTarget::Trough => &mut deform.trough_color,
            };
            *slot = color.clamped();
        }
        ControlCommand::SetFeature(feature, enabled) => params.features.set(feature, enabled),
        ControlCommand::ToggleFeature(feature) => {
            let enabled = !params.features.get(feature);
            params.features.set(feature, enabled);
            info!("{:?} {}", feature, if enabled { "on" } else { "off" });
        }
        ControlCommand::SetShape(kind, enabled) => markers.kinds.set(kind, enabled),
        ControlCommand::ToggleShape(kind) => {
            let enabled = !markers.kinds.contains(kind);
            markers.kinds.set(kind, enabled);
            info!("Shape {} {}", kind.name(), if enabled { "on" } else { "off" });
        }
        ControlCommand::SetShapeSize(v) => {
            markers.shape_size = clamp_finite(v, SHAPE_SIZE_RANGE, markers.shape_size);
        }
        ControlCommand::AdjustShapeSize(dv) => {
            let v = markers.shape_size + dv;
            markers.shape_size = clamp_finite(v, SHAPE_SIZE_RANGE, markers.shape_size);
            info!("Shape size {:.1}", markers.shape_size);
        }
        ControlCommand::TogglePlayback => outcome.toggle_playback = true,
        ControlCommand::Quit => outcome.quit = true,
    }
}

/// Keyboard bindings
pub fn command_for_key(key: KeyCode) -> Option<ControlCommand> {
    let command = match key {
        KeyCode::Space => ControlCommand::TogglePlayback,
        KeyCode::Escape => ControlCommand::Quit,
        KeyCode::BracketLeft => ControlCommand::AdjustSensitivity(-KEY_STEP),
        KeyCode::BracketRight => ControlCommand::AdjustSensitivity(KEY_STEP),
        KeyCode::Minus => ControlCommand::AdjustShapeSize(-KEY_STEP),
        KeyCode::Equal => ControlCommand::AdjustShapeSize(KEY_STEP),
        KeyCode::Digit1 => ControlCommand::ToggleFeature(Feature::ShapeGeneration),
        KeyCode::Digit2 => ControlCommand::ToggleFeature(Feature::ColorTransition),
        KeyCode::Digit3 => ControlCommand::ToggleFeature(Feature::VertexLocking),
        KeyCode::Digit4 => ControlCommand::ToggleFeature(Feature::Rotation),
        KeyCode::KeyC => ControlCommand::ToggleShape(ShapeKind::Circle),
        KeyCode::KeyS => ControlCommand::ToggleShape(ShapeKind::Square),
        KeyCode::KeyT => ControlCommand::ToggleShape(ShapeKind::Triangle),
        _ => return None,
    };
    Some(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands_apply_in_order() {
        let (handle, controller) = Controller::channel();
        let mut params = VisualizerParams::default();

        handle.send(ControlCommand::SetSensitivity(1.5));
        handle.send(ControlCommand::AdjustSensitivity(0.25));
        handle.send(ControlCommand::SetFeature(Feature::VertexLocking, false));
        handle.send(ControlCommand::SetColor(
            ColorTarget::Peak,
            Rgb::new(0.0, 1.0, 0.0),
        ));

        // Nothing changes until the frame loop drains the queue
        assert!((params.deform.sensitivity - 0.8).abs() < 1e-6);

        let outcome = controller.apply_pending(&mut params);
        assert_eq!(outcome, ControlOutcome::default());
        assert!((params.deform.sensitivity - 1.75).abs() < 1e-6);
        assert!(!params.features.vertex_locking);
        assert_eq!(params.deform.peak_color, Rgb::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_values_are_clamped() {
        let (handle, controller) = Controller::channel();
        let mut params = VisualizerParams::default();

        handle.send(ControlCommand::SetSensitivity(-2.0));
        handle.send(ControlCommand::SetShapeSize(100.0));
        controller.apply_pending(&mut params);
        assert_eq!(params.deform.sensitivity, 0.0);
        assert_eq!(params.markers.shape_size, SHAPE_SIZE_RANGE.1);

        handle.send(ControlCommand::SetSensitivity(f32::NAN));
        controller.apply_pending(&mut params);
        assert_eq!(params.deform.sensitivity, 0.0);
    }

    #[test]
    fn test_toggles() {
        let (handle, controller) = Controller::channel();
        let mut params = VisualizerParams::default();

        handle.send(ControlCommand::ToggleFeature(Feature::Rotation));
        handle.send(ControlCommand::ToggleShape(ShapeKind::Square));
        handle.send(ControlCommand::TogglePlayback);
        let outcome = controller.apply_pending(&mut params);

        assert!(!params.features.rotation);
        assert!(!params.markers.kinds.contains(ShapeKind::Square));
        assert!(outcome.toggle_playback);
        assert!(!outcome.quit);

        handle.send(ControlCommand::ToggleFeature(Feature::Rotation));
        controller.apply_pending(&mut params);
        assert!(params.features.rotation);
    }

    #[test]
    fn test_send_after_controller_dropped() {
        let (handle, controller) = Controller::channel();
        drop(controller);
        assert!(!handle.send(ControlCommand::Quit));
    }

    #[test]
    fn test_key_bindings() {
        assert_eq!(
            command_for_key(KeyCode::Space),
            Some(ControlCommand::TogglePlayback)
        );
        assert_eq!(
            command_for_key(KeyCode::Digit3),
            Some(ControlCommand::ToggleFeature(Feature::VertexLocking))
        );
        assert_eq!(
            command_for_key(KeyCode::KeyT),
            Some(ControlCommand::ToggleShape(ShapeKind::Triangle))
        );
        assert_eq!(command_for_key(KeyCode::KeyQ), None);
    }
}
