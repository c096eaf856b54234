// Media Pick - pick an audio or video file and play it
// Module declarations
mod access;
mod audio;
mod commands;
mod error;
mod logging;
mod media;
mod notice;
mod screen;
mod settings;
mod state;
mod video;

#[cfg(test)]
mod testing;

use access::permission::{AccessPolicy, ConsentStore, PlatformVersion};
use access::{DialogConsent, DialogPicker, PermissionGate};
use audio::{AudioController, SymphoniaFactory};
use notice::EventNotifier;
use screen::Screen;
use settings::AppSettings;
use state::AppState;
use tauri::{Manager, WindowEvent};
use video::{VideoController, WebviewSurface};

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .setup(|app| {
            let log_filter = logging::init();

            // Get app config directory
            let app_dir = app.path().app_config_dir()?;

            let settings = AppSettings::load_or_default(&app_dir);
            log_filter.apply_settings(&settings.logging.filter);

            let platform = PlatformVersion::current();
            let policy = AccessPolicy::resolve(settings.access.policy, platform);
            tracing::info!(?platform, ?policy, dir = %app_dir.display(), "starting");

            let handle = app.handle().clone();
            let gate = PermissionGate::new(
                policy,
                Box::new(ConsentStore::from_settings(&settings, app_dir.clone())),
            );
            let audio = AudioController::new(
                Box::new(SymphoniaFactory::new(settings.playback.volume)),
                settings.playback.audio_stop,
            );
            let video = VideoController::new(
                Box::new(WebviewSurface::new(handle.clone())),
                settings.playback.video_stop,
            );
            let screen = Screen::new(gate, audio, video, Box::new(EventNotifier::new(handle.clone())));

            // Create and manage app state
            let app_state = AppState::new(
                screen,
                Box::new(DialogPicker::new(handle.clone())),
                Box::new(DialogConsent::new(handle.clone())),
                handle,
            );
            app.manage(app_state);

            Ok(())
        })
        .on_window_event(|window, event| {
            if let WindowEvent::Destroyed = event {
                if let Some(state) = window.try_state::<AppState>() {
                    state.teardown();
                }
            }
        })
        .invoke_handler(tauri::generate_handler![
            commands::pick_audio,
            commands::toggle_audio,
            commands::stop_audio,
            commands::pick_video,
            commands::toggle_video,
            commands::stop_video,
            commands::report_video_surface,
            commands::get_screen_state,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
