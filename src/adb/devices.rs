//! `adb devices -l` output parsing.

/// A device reported by one enumeration poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceHandle {
    /// Serial or `host:port` for TCP devices.
    pub id: String,
    /// Connection state: `device`, `unauthorized`, `offline`, ...
    pub state: String,
    /// Remaining `key:value` details (`usb:... product:... model:...`).
    pub details: String,
}

impl DeviceHandle {
    pub fn is_online(&self) -> bool {
        self.state == "device"
    }

    /// Model name from the details, with underscores shown as spaces.
    pub fn model(&self) -> Option<String> {
        self.detail("model").map(|m| m.replace('_', " "))
    }

    pub fn detail(&self, key: &str) -> Option<&str> {
        self.details.split_whitespace().find_map(|part| {
            part.split_once(':')
                .filter(|(k, _)| *k == key)
                .map(|(_, v)| v)
        })
    }

    pub fn is_tcp(&self) -> bool {
        self.id.contains(':')
    }
}

pub fn parse_devices(output: &str) -> Vec<DeviceHandle> {
    output
        .lines()
        .filter_map(|line| {
            let line = line.trim();
            if line.is_empty() || line.starts_with("List of devices") || line.starts_with('*') {
                return None;
            }

            let mut parts = line.split_whitespace();
            let id = parts.next()?.to_string();
            let state = parts.next()?.to_string();
            let details = parts.collect::<Vec<_>>().join(" ");

            Some(DeviceHandle { id, state, details })
        })
        .collect()
}
