//! ClickerRoster: the in-memory registry of known remotes.
//!
//! Every `Registered` event adds or refreshes an entry; every `Clicked`
//! event updates the remote's last pressed value and battery voltage. The
//! roster is purely presentational bookkeeping — question data, answer
//! history, and scoring live with the UI layer, not here.

use std::collections::HashMap;

use clicker_core::{ClickerEvent, DeviceAddress};
use serde::{Deserialize, Serialize};

/// Whether a remote belongs to the teacher or a student.
///
/// The protocol does not distinguish roles; the UI assigns them after
/// registration. New remotes default to `Student`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClickerRole {
    Teacher,
    Student,
}

/// Runtime record for one remote tracked by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickerRecord {
    pub address: DeviceAddress,
    pub class_number: u8,
    pub student_number: u8,
    pub role: ClickerRole,
    /// Value of the most recent button press, if any this session.
    pub last_value: Option<u8>,
    /// Battery voltage from the most recent button press.
    pub last_voltage: Option<u8>,
}

/// In-memory registry of all remotes seen this session.
///
/// Keyed by hardware address — the student number is assigned during
/// registration and can collide across classes, but the address is burned
/// into the remote.
#[derive(Debug, Default)]
pub struct ClickerRoster {
    clickers: HashMap<DeviceAddress, ClickerRecord>,
}

impl ClickerRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or refreshes a remote after a registration acknowledgment.
    ///
    /// An existing record keeps its role and last press data; only the
    /// class/student assignment is refreshed.
    pub fn upsert_registered(&mut self, address: DeviceAddress, class_number: u8, student_number: u8) {
        self.clickers
            .entry(address)
            .and_modify(|record| {
                record.class_number = class_number;
                record.student_number = student_number;
            })
            .or_insert(ClickerRecord {
                address,
                class_number,
                student_number,
                role: ClickerRole::Student,
                last_value: None,
                last_voltage: None,
            });
    }

    /// Records a button press.
    ///
    /// A press from a remote we never saw register (e.g. registered during a
    /// previous run of the host) creates a record on the fly.
    pub fn record_click(
        &mut self,
        address: DeviceAddress,
        class_number: u8,
        student_number: u8,
        value: u8,
        voltage: u8,
    ) {
        let record = self.clickers.entry(address).or_insert(ClickerRecord {
            address,
            class_number,
            student_number,
            role: ClickerRole::Student,
            last_value: None,
            last_voltage: None,
        });
        record.last_value = Some(value);
        record.last_voltage = Some(voltage);
    }

    /// Applies one engine event to the roster. Transport events are ignored.
    pub fn apply_event(&mut self, event: &ClickerEvent) {
        match event {
            ClickerEvent::Registered {
                address,
                class_number,
                student_number,
                ..
            } => self.upsert_registered(*address, *class_number, *student_number),
            ClickerEvent::Clicked {
                address,
                class_number,
                student_number,
                value,
                voltage,
                ..
            } => self.record_click(*address, *class_number, *student_number, *value, *voltage),
            ClickerEvent::Opened | ClickerEvent::Closed | ClickerEvent::TransportError { .. } => {}
        }
    }

    /// Assigns a role to a known remote. Returns `false` for unknown addresses.
    pub fn set_role(&mut self, address: DeviceAddress, role: ClickerRole) -> bool {
        match self.clickers.get_mut(&address) {
            Some(record) => {
                record.role = role;
                true
            }
            None => false,
        }
    }

    /// Returns the record for a specific remote.
    pub fn get(&self, address: DeviceAddress) -> Option<&ClickerRecord> {
        self.clickers.get(&address)
    }

    /// Snapshot of all remotes, sorted by student number then address.
    pub fn all(&self) -> Vec<ClickerRecord> {
        let mut records: Vec<ClickerRecord> = self.clickers.values().cloned().collect();
        records.sort_by_key(|r| (r.student_number, r.address));
        records
    }

    /// Removes one remote from the roster.
    pub fn remove(&mut self, address: DeviceAddress) {
        self.clickers.remove(&address);
    }

    /// Forgets every remote.
    pub fn clear(&mut self) {
        self.clickers.clear();
    }

    pub fn len(&self) -> usize {
        self.clickers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clickers.is_empty()
    }
}
