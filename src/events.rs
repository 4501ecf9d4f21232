use crossterm::event::Event;

use crate::adb::DeviceHandle;
use crate::error::Result;
use crate::explorer::{BatchOutcome, LoadTicket};

#[derive(Debug)]
pub enum AppEvent {
    Input(Event),
    Tick,
    PollDevices,                              // Device-list poll timer fired
    DevicesLoaded(Result<Vec<DeviceHandle>>), // Result of `adb devices -l`
    ListingLoaded {
        device: String,
        ticket: LoadTicket,
        result: Result<String>,
    },
    BatchFinished(BatchOutcome), // Delete/save/upload run finished
    OpenFinished {
        device_path: String,
        result: Result<std::path::PathBuf>,
    },
}
