//! Native viewer hosting the transform controls.
//!
//! Usage: `gizmo-viewer [config.json]`
//!
//! Keys:
//! - W / E / R: translate / rotate / scale
//! - Q: toggle local / world space
//! - X / Y / Z: toggle axis visibility
//! - S: toggle snapping
//! - + / -: handle size
//! - Escape: reset the running drag, Backspace: revert to the attached pose

use std::path::Path;

use anyhow::Context;
use bevy::prelude::*;
use gizmo_core::bevy::{
    ControlsCamera, ControlsNotification, TransformControls, TransformControlsPlugin,
};
use gizmo_core::{ControlsConfig, ControlsEvent, SpaceMode, TransformMode};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const TRANSLATION_SNAP: f32 = 0.5;
const ROTATION_SNAP_DEGREES: f32 = 15.0;
const SCALE_SNAP: f32 = 0.25;

/// Controls configuration loaded at startup.
#[derive(Resource, Debug, Clone)]
struct ViewerConfig(ControlsConfig);

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => load_config(Path::new(&path))?,
        None => ControlsConfig::default(),
    };
    tracing::info!(
        "[viewer] starting: mode={} space={} size={}",
        config.mode,
        config.space,
        config.size
    );

    let mut app = App::new();
    app.add_plugins(
        DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: "gizmo-live".to_string(),
                    ..default()
                }),
                ..default()
            })
            .disable::<bevy::log::LogPlugin>(),
    );
    app.add_plugins(TransformControlsPlugin);
    app.insert_resource(ViewerConfig(config));
    app.add_systems(Startup, setup_scene);
    app.add_systems(Update, (handle_shortcuts, log_notifications));

    app.run();
    tracing::info!("[viewer] app.run() returned");
    Ok(())
}

fn load_config(path: &Path) -> anyhow::Result<ControlsConfig> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config = ControlsConfig::from_json(&json)
        .with_context(|| format!("invalid config {}", path.display()))?;
    tracing::info!("[viewer] loaded config from {}", path.display());
    Ok(config)
}

fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    config: Res<ViewerConfig>,
) {
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(4.0, 3.0, 6.0).looking_at(Vec3::ZERO, Vec3::Y),
        ControlsCamera::default(),
    ));
    commands.spawn((
        DirectionalLight::default(),
        Transform::from_xyz(3.0, 8.0, 4.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    commands.spawn((
        Mesh3d(meshes.add(Plane3d::default().mesh().size(10.0, 10.0))),
        MeshMaterial3d(materials.add(Color::srgb(0.3, 0.32, 0.35))),
        Transform::from_xyz(0.0, -0.5, 0.0),
    ));

    // The cube sits under a tilted pivot so local and world space differ.
    let pivot = commands
        .spawn((
            Transform::from_rotation(Quat::from_rotation_y(0.4)),
            Visibility::default(),
        ))
        .id();
    let cube = commands
        .spawn((
            Mesh3d(meshes.add(Cuboid::new(1.0, 1.0, 1.0))),
            MeshMaterial3d(materials.add(Color::srgb(0.8, 0.55, 0.3))),
            Transform::from_xyz(0.0, 0.0, 0.0),
            ChildOf(pivot),
        ))
        .id();

    commands.spawn(TransformControls::with_config(cube, config.0.clone()));
    tracing::info!("[viewer] scene ready, controls attached to {}", cube);
}

fn handle_shortcuts(keys: Res<ButtonInput<KeyCode>>, mut controls: Query<&mut TransformControls>) {
    for mut controls in &mut controls {
        let controller = controls.controller_mut();

        if keys.just_pressed(KeyCode::KeyW) {
            controller.set_mode(TransformMode::Translate);
        }
        if keys.just_pressed(KeyCode::KeyE) {
            controller.set_mode(TransformMode::Rotate);
        }
        if keys.just_pressed(KeyCode::KeyR) {
            controller.set_mode(TransformMode::Scale);
        }
        if keys.just_pressed(KeyCode::KeyQ) {
            let space = match controller.config().space {
                SpaceMode::Local => SpaceMode::World,
                SpaceMode::World => SpaceMode::Local,
            };
            controller.set_space(space);
        }
        if keys.just_pressed(KeyCode::KeyX) {
            let show = !controller.config().show_x;
            controller.set_show_x(show);
        }
        if keys.just_pressed(KeyCode::KeyY) {
            let show = !controller.config().show_y;
            controller.set_show_y(show);
        }
        if keys.just_pressed(KeyCode::KeyZ) {
            let show = !controller.config().show_z;
            controller.set_show_z(show);
        }
        if keys.just_pressed(KeyCode::KeyS) {
            if controller.config().snap.translation.is_some() {
                controller.set_translation_snap(None);
                controller.set_rotation_snap(None);
                controller.set_scale_snap(None);
            } else {
                controller.set_translation_snap(Some(TRANSLATION_SNAP));
                controller.set_rotation_snap(Some(ROTATION_SNAP_DEGREES.to_radians()));
                controller.set_scale_snap(Some(SCALE_SNAP));
            }
        }
        if keys.just_pressed(KeyCode::Equal) || keys.just_pressed(KeyCode::NumpadAdd) {
            let size = controller.config().size + 0.1;
            controller.set_size(size);
        }
        if keys.just_pressed(KeyCode::Minus) || keys.just_pressed(KeyCode::NumpadSubtract) {
            let size = (controller.config().size - 0.1).max(0.1);
            controller.set_size(size);
        }
        if keys.just_pressed(KeyCode::Escape) {
            controller.reset();
        }
        if keys.just_pressed(KeyCode::Backspace) {
            controller.revert_to_default();
        }
    }
}

fn log_notifications(mut notifications: MessageReader<ControlsNotification>) {
    for notification in notifications.read() {
        match notification.event {
            ControlsEvent::DragStart { mode } => {
                tracing::info!("[viewer] {} drag started", mode);
            }
            ControlsEvent::DragEnd { mode } => {
                tracing::info!("[viewer] {} drag ended", mode);
            }
            ControlsEvent::PropertyChanged(property) => {
                tracing::info!("[viewer] {}: {:?}", property.event_name(), property);
            }
            ControlsEvent::Change | ControlsEvent::ObjectChange => {
                tracing::trace!("[viewer] {}", notification.event.name());
            }
        }
    }
}
