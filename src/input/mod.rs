use bevy::prelude::*;
use crate::shared::*;

pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<KeyBindings>()
            .init_resource::<InputContext>()
            .add_systems(
                PreUpdate,
                (manage_input_context, reset_and_read_input).chain(),
            );
    }
}

/// Rebindable keys. Arrow keys always work for movement as well.
#[derive(Resource, Debug, Clone)]
pub struct KeyBindings {
    pub move_up: KeyCode,
    pub move_down: KeyCode,
    pub move_left: KeyCode,
    pub move_right: KeyCode,
    pub dig: KeyCode,
    pub interact: KeyCode,
    pub restart: KeyCode,
    /// One key per upgrade, in `UpgradeKind::ALL` order.
    pub upgrades: [KeyCode; 4],
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            move_up: KeyCode::KeyW,
            move_down: KeyCode::KeyS,
            move_left: KeyCode::KeyA,
            move_right: KeyCode::KeyD,
            dig: KeyCode::Space,
            interact: KeyCode::KeyE,
            restart: KeyCode::KeyR,
            upgrades: [
                KeyCode::Digit1,
                KeyCode::Digit2,
                KeyCode::Digit3,
                KeyCode::Digit4,
            ],
        }
    }
}

#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputContext {
    #[default]
    Disabled,
    Gameplay,
    /// Only the restart key is live.
    GameOver,
}

/// The single point where hardware input becomes game actions.
fn reset_and_read_input(
    keys: Res<ButtonInput<KeyCode>>,
    bindings: Res<KeyBindings>,
    context: Res<InputContext>,
    mut input: ResMut<PlayerInput>,
) {
    *input = PlayerInput::default();

    match *context {
        InputContext::Disabled => {}

        InputContext::Gameplay => {
            // Grid orientation: positive y is down.
            let mut axis = Vec2::ZERO;
            if keys.pressed(bindings.move_up) || keys.pressed(KeyCode::ArrowUp) {
                axis.y -= 1.0;
            }
            if keys.pressed(bindings.move_down) || keys.pressed(KeyCode::ArrowDown) {
                axis.y += 1.0;
            }
            if keys.pressed(bindings.move_left) || keys.pressed(KeyCode::ArrowLeft) {
                axis.x -= 1.0;
            }
            if keys.pressed(bindings.move_right) || keys.pressed(KeyCode::ArrowRight) {
                axis.x += 1.0;
            }
            input.move_axis = axis.normalize_or_zero();
            input.facing = Facing::from_axis(axis);

            input.dig = keys.pressed(bindings.dig);
            input.interact = keys.just_pressed(bindings.interact);
            input.upgrade = bindings
                .upgrades
                .iter()
                .zip(UpgradeKind::ALL)
                .find(|(key, _)| keys.just_pressed(**key))
                .map(|(_, kind)| kind);
        }

        InputContext::GameOver => {
            input.restart = keys.just_pressed(bindings.restart);
        }
    }
}

/// Derives InputContext from GameState. ONE system, replaces all per-domain guards.
fn manage_input_context(game_state: Res<State<GameState>>, mut context: ResMut<InputContext>) {
    *context = match *game_state.get() {
        GameState::Loading => InputContext::Disabled,
        GameState::Playing => InputContext::Gameplay,
        GameState::GameOver => InputContext::GameOver,
    };
}
