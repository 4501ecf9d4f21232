use std::future::Future;
use std::io::Write;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use ratatui::Terminal;
use ratatui::layout::Rect;
use ratatui::prelude::Backend;
use ratatui::widgets::TableState;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::adb::{AdbBridge, DeviceBridge};
use crate::clipboard;
use crate::config::ConfigManager;
use crate::error::{AppError, Result};
use crate::events::AppEvent;
use crate::explorer::{
    BatchKind, BatchOutcome, ExplorerRow, ExplorerState, LoadOutcome, LoadTicket, MenuAction,
    delete_each, save_each, upload_each,
};
use crate::listing::FileEntry;
use crate::local_path::{expand_tilde, upload_sources};
use crate::mode_state::{
    DeleteConfirmationState, DeviceChange, DeviceListState, PromptKind, PromptState,
};
use crate::ui::{
    draw_context_menu, draw_delete_confirmation_popup, draw_device_list, draw_error_popup,
    draw_file_info_popup, draw_file_table, draw_footer, draw_info_popup, draw_path_bar,
    draw_prompt_popup, main_layout,
};

/// Interval within which a second click on the same row opens it.
pub const DOUBLE_CLICK_MAX_INTERVAL: Duration = Duration::from_millis(350);

/// Which panel receives keyboard input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Focus {
    Devices,
    Files,
}

/// Modal state on top of the two panels.
#[derive(Clone, Debug)]
pub enum AppMode {
    Browse,
    Prompt(PromptState),
    DeleteConfirmation(DeleteConfirmationState),
}

/// Screen regions from the last draw, used for mouse hit testing.
#[derive(Clone, Copy, Debug, Default)]
pub struct LayoutRegions {
    pub devices: Rect,
    pub files: Rect,
    /// Table body below the header row.
    pub file_rows: Rect,
    pub menu: Rect,
}

#[derive(Clone, Copy, Debug)]
struct LastClick {
    row: usize,
    time: Instant,
}

pub struct App<B: Backend + Write> {
    pub mode: AppMode,
    pub focus: Focus,
    pub error: Option<AppError>,
    pub info: Option<String>,
    /// Short status line message, cleared on the next key press.
    pub notice: Option<String>,
    /// Description of the running batch or open, shown with a spinner.
    pub busy: Option<String>,
    pub config: ConfigManager,
    pub devices: DeviceListState,
    pub explorer: ExplorerState,
    pub regions: LayoutRegions,
    pub table_state: TableState,
    bridge: AdbBridge,
    terminal: Terminal<B>,
    needs_redraw: bool, // Track if UI needs redrawing
    event_tx: Option<mpsc::Sender<AppEvent>>,
    last_click: Option<LastClick>,
    spinner_frame: usize,
}

impl<B: Backend + Write> Drop for App<B> {
    fn drop(&mut self) {
        use crossterm::event::{DisableBracketedPaste, DisableMouseCapture};
        use crossterm::execute;
        use crossterm::terminal::{LeaveAlternateScreen, disable_raw_mode};

        disable_raw_mode().ok();
        execute!(
            self.terminal.backend_mut(),
            DisableBracketedPaste,
            DisableMouseCapture,
            LeaveAlternateScreen,
        )
        .ok();
        self.terminal.show_cursor().ok();
    }
}

impl<B: Backend + Write> App<B> {
    pub fn new(
        terminal: Terminal<B>,
        config: ConfigManager,
        bridge: AdbBridge,
        start_path: &str,
        preferred_device: Option<String>,
    ) -> Self {
        Self {
            mode: AppMode::Browse,
            focus: Focus::Files,
            error: None,
            info: None,
            notice: None,
            busy: None,
            config,
            devices: DeviceListState::new(preferred_device),
            explorer: ExplorerState::new(start_path),
            regions: LayoutRegions::default(),
            table_state: TableState::default(),
            bridge,
            terminal,
            needs_redraw: true, // Initial redraw needed
            event_tx: None,     // Will be set later
            last_click: None,
            spinner_frame: 0,
        }
    }

    pub fn init_terminal(&mut self) -> Result<()> {
        use crossterm::ExecutableCommand;
        use crossterm::event::{EnableBracketedPaste, EnableMouseCapture};
        use crossterm::terminal::{EnterAlternateScreen, enable_raw_mode};

        enable_raw_mode().inspect_err(|e| tracing::error!("Error enabling raw mode: {}", e))?;
        self.terminal
            .backend_mut()
            .execute(EnterAlternateScreen)
            .inspect_err(|e| {
                tracing::error!(
                    "Error executing EnterAlternateScreen terminal command: {}",
                    e
                )
            })?;
        self.terminal
            .backend_mut()
            .execute(EnableBracketedPaste)
            .inspect_err(|e| {
                tracing::error!(
                    "Error executing EnableBracketedPaste terminal command: {}",
                    e
                )
            })?;
        self.terminal
            .backend_mut()
            .execute(EnableMouseCapture)
            .inspect_err(|e| {
                tracing::error!("Error executing EnableMouseCapture terminal command: {}", e)
            })?;
        self.terminal.clear()?;
        Ok(())
    }

    pub fn set_event_sender(&mut self, sender: mpsc::Sender<AppEvent>) {
        self.event_tx = Some(sender);
    }

    /// Mark that UI needs redrawing
    pub fn mark_redraw(&mut self) {
        self.needs_redraw = true;
    }

    /// Check if redraw is needed and mark as drawn
    pub fn should_redraw(&mut self) -> bool {
        let should = self.needs_redraw;
        self.needs_redraw = false;
        should
    }

    /// Set error and mark for redraw
    pub fn set_error(&mut self, error: AppError) {
        tracing::error!("{}", error);
        self.error = Some(error);
        self.needs_redraw = true;
    }

    /// Set info and mark for redraw
    pub fn set_info(&mut self, info: String) {
        self.info = Some(info);
        self.needs_redraw = true;
    }

    pub fn set_notice(&mut self, notice: impl Into<String>) {
        self.notice = Some(notice.into());
        self.needs_redraw = true;
    }

    pub fn spinner(&self) -> &'static str {
        const FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
        FRAMES[self.spinner_frame % FRAMES.len()]
    }

    // ---- background work ----------------------------------------------------

    /// Run `task` on the runtime and feed its event back into the loop.
    fn spawn_event<F>(&self, task: F)
    where
        F: Future<Output = AppEvent> + Send + 'static,
    {
        let Some(tx) = self.event_tx.clone() else {
            warn!("No event sender; dropping background task");
            return;
        };
        tokio::spawn(async move {
            let event = task.await;
            if tx.send(event).await.is_err() {
                debug!("Event channel closed before task finished");
            }
        });
    }

    /// Bridge scoped to the browsed device.
    fn device_bridge(&self) -> Option<AdbBridge> {
        self.devices
            .active
            .as_deref()
            .map(|serial| self.bridge.for_device(serial))
    }

    pub fn poll_devices(&mut self) {
        if self.devices.poll_in_flight {
            return;
        }
        self.devices.poll_in_flight = true;
        let bridge = self.bridge.clone();
        self.spawn_event(async move { AppEvent::DevicesLoaded(bridge.list_devices().await) });
    }

    pub fn on_devices_loaded(&mut self, result: Result<Vec<crate::adb::DeviceHandle>>) {
        self.devices.poll_in_flight = false;
        match result {
            Ok(devices) => match self.devices.apply(devices) {
                Some(DeviceChange::Selected(id)) => {
                    info!("Browsing device {}", id);
                    self.refresh();
                }
                Some(DeviceChange::Lost) => {
                    warn!("Browsed device disconnected");
                    self.explorer.abandon_load("Device disconnected");
                    self.set_notice("Device disconnected");
                }
                None => {}
            },
            Err(e) => {
                // Polling repeats every few seconds; report once per outage.
                if self.devices.failure_reported {
                    debug!("Device poll failed again: {}", e);
                } else {
                    self.devices.failure_reported = true;
                    self.set_error(e);
                }
            }
        }
        self.mark_redraw();
    }

    /// Bind the explorer to the device under the sidebar cursor.
    pub fn activate_selected_device(&mut self) {
        if let Some(id) = self.devices.activate_selected() {
            info!("Switched to device {}", id);
            self.refresh();
            self.focus = Focus::Files;
        }
    }

    fn request_listing(&mut self, ticket: LoadTicket) {
        let Some(bridge) = self.device_bridge() else {
            return;
        };
        let device = bridge.serial().unwrap_or_default().to_string();
        self.spawn_event(async move {
            let result = bridge.list_directory(&ticket.path).await;
            AppEvent::ListingLoaded {
                device,
                ticket,
                result,
            }
        });
    }

    pub fn on_listing_loaded(&mut self, device: &str, ticket: LoadTicket, result: Result<String>) {
        if self.devices.active.as_deref() != Some(device) {
            debug!("Ignoring listing from inactive device {}", device);
            return;
        }
        if let LoadOutcome::Failed(e) = self.explorer.finish_load(&ticket, result) {
            self.set_error(e);
        }
        self.mark_redraw();
    }

    // ---- navigation ---------------------------------------------------------

    fn has_device(&mut self) -> bool {
        if self.devices.active.is_some() {
            return true;
        }
        self.set_notice("No device connected");
        false
    }

    pub fn navigate_to(&mut self, path: &str) {
        if !self.has_device() {
            return;
        }
        let ticket = self.explorer.begin_load(path);
        self.request_listing(ticket);
    }

    pub fn refresh(&mut self) {
        if !self.has_device() {
            return;
        }
        let ticket = self.explorer.refresh();
        self.request_listing(ticket);
    }

    pub fn go_up(&mut self) {
        if !self.has_device() {
            return;
        }
        if let Some(ticket) = self.explorer.go_up() {
            self.request_listing(ticket);
        }
    }

    /// Directories are entered; files are opened locally.
    pub fn open_entry(&mut self, entry: FileEntry) {
        if entry.is_dir {
            self.navigate_to(&entry.path);
        } else {
            self.start_open(entry);
        }
    }

    /// Enter on the cursor row: toggles a group header or opens an entry.
    pub fn activate_cursor_row(&mut self) {
        let target = match self.explorer.cursor_row() {
            Some(ExplorerRow::Group { key, .. }) => Err(key),
            Some(ExplorerRow::Entry(entry)) => Ok(entry.clone()),
            None => return,
        };
        match target {
            Ok(entry) => self.open_entry(entry),
            Err(key) => self.explorer.toggle_group(&key),
        }
    }

    fn start_open(&mut self, entry: FileEntry) {
        let Some(bridge) = self.device_bridge() else {
            self.set_notice("No device connected");
            return;
        };
        self.busy = Some(format!("Opening {}", entry.name));
        let device_path = entry.path;
        self.spawn_event(async move {
            let result = crate::open::open_remote_file(&bridge, &device_path).await;
            AppEvent::OpenFinished {
                device_path,
                result,
            }
        });
    }

    pub fn on_open_finished(&mut self, device_path: &str, result: Result<PathBuf>) {
        self.busy = None;
        match result {
            Ok(local) => {
                debug!("{} opened from {}", device_path, local.display());
            }
            Err(e) => self.set_error(e),
        }
        self.mark_redraw();
    }

    // ---- actions ------------------------------------------------------------

    /// Run a context menu entry against the menu's target.
    pub fn run_menu_action(&mut self, action: MenuAction) {
        let target = self.explorer.menu.take().and_then(|menu| menu.target);
        match action {
            MenuAction::Open => {
                if let Some(entry) = target {
                    self.open_entry(entry);
                }
            }
            MenuAction::Info => {
                if let Some(entry) = target {
                    self.explorer.show_info(entry);
                }
            }
            MenuAction::CopyPath => self.copy_selected_paths(),
            MenuAction::SaveToLocal => self.prompt_save(),
            MenuAction::UploadHere => {
                let remote_dir = match target {
                    Some(entry) if entry.is_dir => entry.path,
                    _ => self.explorer.current_path().to_string(),
                };
                self.prompt_upload(remote_dir);
            }
            MenuAction::Delete => self.confirm_delete(),
        }
    }

    pub fn show_cursor_info(&mut self) {
        if let Some(entry) = self.explorer.cursor_entry().cloned() {
            self.explorer.show_info(entry);
        }
    }

    pub fn copy_selected_paths(&mut self) {
        let paths: Vec<String> = self
            .explorer
            .action_targets()
            .into_iter()
            .map(|e| e.path)
            .collect();
        if paths.is_empty() {
            return;
        }
        match clipboard::copy_text(&clipboard::paths_text(&paths)) {
            Ok(()) => {
                let noun = if paths.len() == 1 { "path" } else { "paths" };
                self.set_notice(format!("Copied {} {} to clipboard", paths.len(), noun));
            }
            Err(e) => self.set_error(e),
        }
    }

    pub fn prompt_goto(&mut self) {
        let current = self.explorer.current_path().to_string();
        self.mode = AppMode::Prompt(PromptState::new(PromptKind::GoTo, &current));
    }

    pub fn prompt_save(&mut self) {
        let paths: Vec<String> = self
            .explorer
            .action_targets()
            .into_iter()
            .map(|e| e.path)
            .collect();
        if paths.is_empty() {
            return;
        }
        let initial = dirs::download_dir()
            .or_else(dirs::home_dir)
            .map(|d| format!("{}/", d.display()))
            .unwrap_or_default();
        self.mode = AppMode::Prompt(PromptState::new(PromptKind::SaveTo { paths }, &initial));
    }

    pub fn prompt_upload(&mut self, remote_dir: String) {
        let initial = dirs::home_dir()
            .map(|d| format!("{}/", d.display()))
            .unwrap_or_default();
        self.mode = AppMode::Prompt(PromptState::new(
            PromptKind::UploadFrom { remote_dir },
            &initial,
        ));
    }

    pub fn confirm_delete(&mut self) {
        let targets = self.explorer.action_targets();
        if !targets.is_empty() {
            self.mode = AppMode::DeleteConfirmation(DeleteConfirmationState::new(targets));
        }
    }

    /// Act on a submitted prompt. The prompt has already been closed.
    pub fn submit_prompt(&mut self, prompt: PromptState) {
        let value = prompt.value();
        let value = value.trim();
        match prompt.kind {
            PromptKind::GoTo => {
                if !value.is_empty() {
                    self.navigate_to(value);
                }
            }
            PromptKind::SaveTo { paths } => {
                let local_dir = expand_tilde(value);
                if !local_dir.is_dir() {
                    self.set_error(AppError::ValidationError(format!(
                        "{} is not a local directory",
                        local_dir.display()
                    )));
                    return;
                }
                self.start_save(paths, local_dir);
            }
            PromptKind::UploadFrom { remote_dir } => match upload_sources(value) {
                Ok(sources) => self.start_upload(sources, remote_dir),
                Err(e) => self.set_error(e),
            },
        }
    }

    pub fn start_delete(&mut self, paths: Vec<String>) {
        let Some(bridge) = self.device_bridge() else {
            self.set_notice("No device connected");
            return;
        };
        self.busy = Some(format!("Deleting {}", describe_count(paths.len())));
        self.spawn_event(async move { AppEvent::BatchFinished(delete_each(&bridge, paths).await) });
    }

    pub fn start_save(&mut self, paths: Vec<String>, local_dir: PathBuf) {
        let Some(bridge) = self.device_bridge() else {
            self.set_notice("No device connected");
            return;
        };
        self.busy = Some(format!(
            "Saving {} to {}",
            describe_count(paths.len()),
            local_dir.display()
        ));
        self.spawn_event(async move {
            AppEvent::BatchFinished(save_each(&bridge, paths, &local_dir).await)
        });
    }

    pub fn start_upload(&mut self, local_paths: Vec<PathBuf>, remote_dir: String) {
        let Some(bridge) = self.device_bridge() else {
            self.set_notice("No device connected");
            return;
        };
        self.busy = Some(format!(
            "Uploading {} to {}",
            describe_count(local_paths.len()),
            remote_dir
        ));
        self.spawn_event(async move {
            AppEvent::BatchFinished(upload_each(&bridge, local_paths, &remote_dir).await)
        });
    }

    pub fn on_batch_finished(&mut self, outcome: BatchOutcome) {
        self.busy = None;
        info!("{}", outcome.summary());

        // Completed steps stay applied, so the listing is stale either way.
        if matches!(outcome.kind, BatchKind::Delete | BatchKind::Upload)
            && !outcome.completed.is_empty()
        {
            self.refresh();
        }

        match outcome.failed {
            Some((item, e)) => {
                warn!("Batch stopped at {}", item);
                self.set_error(e);
            }
            None if outcome.kind == BatchKind::Save => {
                self.set_info(outcome.summary());
            }
            None => self.set_notice(outcome.summary()),
        }
        self.mark_redraw();
    }

    // ---- mouse --------------------------------------------------------------

    /// Row index under a screen position in the file table, if any.
    pub fn file_row_at(&self, column: u16, row: u16) -> Option<usize> {
        let area = self.regions.file_rows;
        if column < area.x
            || column >= area.x + area.width
            || row < area.y
            || row >= area.y + area.height
        {
            return None;
        }
        let idx = self.table_state.offset() + (row - area.y) as usize;
        (idx < self.explorer.rows().len()).then_some(idx)
    }

    /// Record a left click on a table row; true when it completes a double click.
    pub fn register_left_click(&mut self, row: usize) -> bool {
        let now = Instant::now();
        let double = self.last_click.is_some_and(|last| {
            last.row == row && now.duration_since(last.time) <= DOUBLE_CLICK_MAX_INTERVAL
        });
        // A double click consumes the sequence so a third click starts fresh.
        self.last_click = if double {
            None
        } else {
            Some(LastClick { row, time: now })
        };
        double
    }

    pub fn clear_click_tracking(&mut self) {
        self.last_click = None;
    }

    // ---- drawing ------------------------------------------------------------

    fn draw(&mut self) -> Result<()> {
        let spinner = self.spinner();
        let mut regions = LayoutRegions::default();

        self.terminal.draw(|f| {
            let size = f.area();
            let layout = main_layout(size);

            draw_path_bar(f, layout.path_bar, &self.explorer, &self.devices);
            regions.devices = layout.devices;
            draw_device_list(f, layout.devices, &mut self.devices, self.focus == Focus::Devices);
            regions.files = layout.files;
            regions.file_rows = draw_file_table(
                f,
                layout.files,
                &self.explorer,
                &mut self.table_state,
                self.focus == Focus::Files,
                spinner,
            );
            draw_footer(
                f,
                layout.footer,
                self.focus,
                self.busy.as_deref().map(|b| (spinner, b)),
                self.notice.as_deref(),
            );

            if let Some(menu) = &self.explorer.menu {
                regions.menu = draw_context_menu(f, size, menu);
            }
            if let Some(entry) = &self.explorer.info {
                draw_file_info_popup(size, entry, f);
            }

            match &mut self.mode {
                AppMode::Browse => {}
                AppMode::Prompt(prompt) => draw_prompt_popup(size, prompt, f),
                AppMode::DeleteConfirmation(state) => {
                    draw_delete_confirmation_popup(size, state, f)
                }
            }

            if let Some(err) = &self.error {
                draw_error_popup(size, &err.to_string(), f);
            }
            if let Some(info) = &self.info {
                draw_info_popup(size, info, f);
            }
        })?;

        self.regions = regions;
        Ok(())
    }

    pub async fn run(&mut self, rx: &mut mpsc::Receiver<AppEvent>) -> Result<()> {
        self.poll_devices();

        loop {
            // Only render when needed
            if self.should_redraw() {
                self.draw()?;
            }

            // wait for an event (asynchronous)
            let ev = match rx.recv().await {
                Some(e) => e,
                None => {
                    warn!("App event channel closed");
                    break; // exit if channel is closed
                }
            };

            match ev {
                AppEvent::Tick => {
                    if self.busy.is_some() || self.explorer.is_loading() {
                        self.spinner_frame = self.spinner_frame.wrapping_add(1);
                        self.mark_redraw();
                    }
                }
                AppEvent::PollDevices => self.poll_devices(),
                AppEvent::DevicesLoaded(result) => self.on_devices_loaded(result),
                AppEvent::ListingLoaded {
                    device,
                    ticket,
                    result,
                } => self.on_listing_loaded(&device, ticket, result),
                AppEvent::BatchFinished(outcome) => self.on_batch_finished(outcome),
                AppEvent::OpenFinished {
                    device_path,
                    result,
                } => self.on_open_finished(&device_path, result),
                AppEvent::Input(ev) => {
                    use crossterm::event::Event;

                    self.mark_redraw(); // Input events typically need redraw
                    match ev {
                        Event::Key(key) => {
                            match crate::key_event::handle_key_event(self, key) {
                                crate::key_event::KeyFlow::Continue => {}
                                crate::key_event::KeyFlow::Quit => {
                                    return Ok(());
                                }
                            }
                        }
                        Event::Mouse(mouse) => {
                            crate::key_event::handle_mouse_event(self, mouse);
                        }
                        Event::Paste(data) => {
                            crate::key_event::handle_paste_event(self, &data);
                        }
                        _ => {}
                    }
                }
            }
        }
        Ok(())
    }
}

fn describe_count(n: usize) -> String {
    if n == 1 {
        "1 item".to_string()
    } else {
        format!("{n} items")
    }
}
