// Tauri command handlers
use tauri::{AppHandle, Manager, State};

use crate::media::PickKind;
use crate::screen::ScreenSnapshot;
use crate::state::AppState;
use crate::video::SurfaceReport;

// ===== Audio Commands =====

#[tauri::command]
pub fn pick_audio(state: State<'_, AppState>) -> Result<(), String> {
    state.press_pick(PickKind::AudioPick);
    Ok(())
}

#[tauri::command]
pub async fn toggle_audio(app: AppHandle) -> Result<(), String> {
    // Starting an engine spins up the output device, so keep it off the IPC thread
    tokio::task::spawn_blocking(move || app.state::<AppState>().toggle_audio())
        .await
        .map_err(|e| format!("Audio task failed: {}", e))
}

#[tauri::command]
pub async fn stop_audio(app: AppHandle) -> Result<(), String> {
    // Releasing waits for the playback thread to exit
    tokio::task::spawn_blocking(move || app.state::<AppState>().stop_audio())
        .await
        .map_err(|e| format!("Audio task failed: {}", e))
}

// ===== Video Commands =====

#[tauri::command]
pub fn pick_video(state: State<'_, AppState>) -> Result<(), String> {
    state.press_pick(PickKind::VideoPick);
    Ok(())
}

#[tauri::command]
pub fn toggle_video(state: State<'_, AppState>) -> Result<(), String> {
    state.toggle_video();
    Ok(())
}

#[tauri::command]
pub fn stop_video(state: State<'_, AppState>) -> Result<(), String> {
    state.stop_video();
    Ok(())
}

/// Called by the front end's video element when it prepares, finishes or fails
#[tauri::command]
pub fn report_video_surface(report: SurfaceReport, state: State<'_, AppState>) -> Result<(), String> {
    tracing::debug!(?report, "surface report");
    state.on_surface_report(report);
    Ok(())
}

// ===== Screen Commands =====

#[tauri::command]
pub fn get_screen_state(state: State<'_, AppState>) -> Result<ScreenSnapshot, String> {
    Ok(state.snapshot())
}
