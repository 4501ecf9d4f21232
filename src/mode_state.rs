use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use tui_textarea::TextArea;

use crate::adb::DeviceHandle;
use crate::listing::FileEntry;

/// What changed about the browsed device after a poll.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeviceChange {
    /// A device became the browsed one (first poll, or the previous one left).
    Selected(String),
    /// The browsed device disappeared and no other online device is attached.
    Lost,
}

/// Device sidebar: the last polled list and which device is browsed.
#[derive(Clone, Debug, Default)]
pub struct DeviceListState {
    pub devices: Vec<DeviceHandle>,
    /// Cursor in the sidebar.
    pub selected: usize,
    /// Serial the explorer is bound to.
    pub active: Option<String>,
    /// Serial requested on the command line, preferred on first sight.
    pub preferred: Option<String>,
    /// A poll is still running; the timer skips instead of stacking calls.
    pub poll_in_flight: bool,
    /// The last poll failed and the user was already told.
    pub failure_reported: bool,
    /// Scroll position of the rendered list, kept between frames.
    pub list_state: ListState,
}

impl DeviceListState {
    pub fn new(preferred: Option<String>) -> Self {
        Self {
            preferred,
            ..Self::default()
        }
    }

    pub fn active_device(&self) -> Option<&DeviceHandle> {
        let active = self.active.as_deref()?;
        self.devices.iter().find(|d| d.id == active)
    }

    /// Replace the list with a fresh poll result. Keeps the active device
    /// while it stays online, otherwise picks the preferred or the first
    /// online device.
    pub fn apply(&mut self, devices: Vec<DeviceHandle>) -> Option<DeviceChange> {
        self.devices = devices;
        self.failure_reported = false;

        let still_online = self
            .active
            .as_deref()
            .is_some_and(|id| self.devices.iter().any(|d| d.id == id && d.is_online()));

        let change = if still_online {
            None
        } else {
            let preferred = self.preferred.as_deref();
            let next = self
                .devices
                .iter()
                .find(|d| d.is_online() && Some(d.id.as_str()) == preferred)
                .or_else(|| self.devices.iter().find(|d| d.is_online()))
                .map(|d| d.id.clone());
            match next {
                Some(id) => {
                    self.active = Some(id.clone());
                    Some(DeviceChange::Selected(id))
                }
                None if self.active.take().is_some() => Some(DeviceChange::Lost),
                None => None,
            }
        };

        if self.selected >= self.devices.len() {
            self.selected = self.devices.len().saturating_sub(1);
        }
        if let Some(DeviceChange::Selected(id)) = &change
            && let Some(idx) = self.devices.iter().position(|d| &d.id == id)
        {
            self.selected = idx;
        }
        change
    }

    /// Bind the explorer to the device under the sidebar cursor. Returns the
    /// serial when this changes the browsed device.
    pub fn activate_selected(&mut self) -> Option<String> {
        let device = self.devices.get(self.selected)?;
        if !device.is_online() || self.active.as_deref() == Some(device.id.as_str()) {
            return None;
        }
        self.active = Some(device.id.clone());
        Some(device.id.clone())
    }

    /// Device drawn at terminal `row` of the bordered sidebar `area`. Each
    /// device takes two lines.
    pub fn index_at(&self, area: Rect, row: u16) -> Option<usize> {
        let top = area.y + 1;
        let bottom = (area.y + area.height).saturating_sub(1);
        if row < top || row >= bottom {
            return None;
        }
        let idx = self.list_state.offset() + ((row - top) / 2) as usize;
        (idx < self.devices.len()).then_some(idx)
    }

    pub fn move_selection(&mut self, delta: isize) {
        if self.devices.is_empty() {
            self.selected = 0;
            return;
        }
        let last = self.devices.len() as isize - 1;
        self.selected = (self.selected as isize + delta).clamp(0, last) as usize;
    }
}

/// Which text prompt is open and what it acts on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PromptKind {
    /// Edit the path bar and navigate.
    GoTo,
    /// Choose a local directory to save device paths into.
    SaveTo { paths: Vec<String> },
    /// Choose a local file or directory to push into `remote_dir`.
    UploadFrom { remote_dir: String },
}

impl PromptKind {
    pub fn title(&self) -> String {
        match self {
            PromptKind::GoTo => "Go to device path".to_string(),
            PromptKind::SaveTo { paths } if paths.len() == 1 => {
                format!("Save {} to local directory", crate::listing::base_name(&paths[0]))
            }
            PromptKind::SaveTo { paths } => {
                format!("Save {} items to local directory", paths.len())
            }
            PromptKind::UploadFrom { remote_dir } => format!("Upload local paths into {remote_dir}"),
        }
    }

    /// Whether the input is a local path, enabling Tab completion.
    pub fn is_local(&self) -> bool {
        !matches!(self, PromptKind::GoTo)
    }
}

/// Single-line text prompt.
#[derive(Clone, Debug)]
pub struct PromptState {
    pub kind: PromptKind,
    pub input: TextArea<'static>,
}

impl PromptState {
    pub fn new(kind: PromptKind, initial: &str) -> Self {
        let mut input = TextArea::from([initial.to_string()]);
        input.move_cursor(tui_textarea::CursorMove::End);
        Self { kind, input }
    }

    pub fn value(&self) -> String {
        self.input.lines().first().cloned().unwrap_or_default()
    }

    /// Insert pasted text at the cursor, dropping line breaks.
    pub fn insert_text(&mut self, text: &str) {
        self.input.insert_str(text.replace(['\r', '\n'], ""));
    }

    pub fn set_value(&mut self, value: &str) {
        self.input = TextArea::from([value.to_string()]);
        self.input.move_cursor(tui_textarea::CursorMove::End);
    }
}

/// Pending delete, waiting for the user to confirm.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeleteConfirmationState {
    pub targets: Vec<FileEntry>,
}

impl DeleteConfirmationState {
    pub fn new(targets: Vec<FileEntry>) -> Self {
        Self { targets }
    }

    /// Human readable description of what will be deleted.
    pub fn description(&self) -> String {
        match self.targets.as_slice() {
            [one] => one.name.clone(),
            many => format!("{} items", many.len()),
        }
    }

    pub fn paths(&self) -> Vec<String> {
        self.targets.iter().map(|e| e.path.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adb::parse_devices;

    const TWO: &str = "List of devices attached\n\
        emulator-5554          device product:sdk model:Pixel_7 device:emu\n\
        R58M123                unauthorized usb:1-1\n\
        0123456789ABCDEF       device usb:1-2 model:SM_G990\n";

    #[test]
    fn test_first_poll_selects_first_online() {
        let mut state = DeviceListState::new(None);
        let change = state.apply(parse_devices(TWO));
        assert_eq!(change, Some(DeviceChange::Selected("emulator-5554".into())));
        assert_eq!(state.selected, 0);

        // Same list again changes nothing.
        assert_eq!(state.apply(parse_devices(TWO)), None);
    }

    #[test]
    fn test_preferred_device_wins() {
        let mut state = DeviceListState::new(Some("0123456789ABCDEF".into()));
        let change = state.apply(parse_devices(TWO));
        assert_eq!(change, Some(DeviceChange::Selected("0123456789ABCDEF".into())));
        assert_eq!(state.selected, 2);
    }

    #[test]
    fn test_unauthorized_is_never_selected() {
        let mut state = DeviceListState::new(Some("R58M123".into()));
        let change = state.apply(parse_devices(
            "List of devices attached\nR58M123 unauthorized usb:1-1\n",
        ));
        assert_eq!(change, None);
        assert!(state.active.is_none());

        state.selected = 0;
        assert_eq!(state.activate_selected(), None);
    }

    #[test]
    fn test_device_lost_and_replaced() {
        let mut state = DeviceListState::new(None);
        state.apply(parse_devices(TWO));

        let change = state.apply(parse_devices(
            "List of devices attached\n0123456789ABCDEF device usb:1-2\n",
        ));
        assert_eq!(change, Some(DeviceChange::Selected("0123456789ABCDEF".into())));

        let change = state.apply(parse_devices("List of devices attached\n\n"));
        assert_eq!(change, Some(DeviceChange::Lost));
        assert!(state.active.is_none());
        assert_eq!(state.selected, 0);
    }

    #[test]
    fn test_activate_selected() {
        let mut state = DeviceListState::new(None);
        state.apply(parse_devices(TWO));
        state.move_selection(5);
        assert_eq!(state.selected, 2);
        assert_eq!(state.activate_selected(), Some("0123456789ABCDEF".into()));
        assert_eq!(state.activate_selected(), None);
        assert_eq!(state.active_device().unwrap().model(), Some("SM G990".into()));
    }

    #[test]
    fn test_prompt_titles() {
        assert_eq!(
            PromptKind::SaveTo {
                paths: vec!["/sdcard/a.txt".into()]
            }
            .title(),
            "Save a.txt to local directory"
        );
        assert!(!PromptKind::GoTo.is_local());

        let mut prompt = PromptState::new(PromptKind::GoTo, "/sdcard");
        assert_eq!(prompt.value(), "/sdcard");
        prompt.set_value("/data");
        assert_eq!(prompt.value(), "/data");
    }

    #[test]
    fn test_prompt_insert_text_stays_single_line() {
        let mut prompt = PromptState::new(PromptKind::GoTo, "/sdcard/");
        prompt.insert_text("DCIM\r\nCamera\n");
        assert_eq!(prompt.value(), "/sdcard/DCIMCamera");
        assert_eq!(prompt.input.lines().len(), 1);
    }
}
