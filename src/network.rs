//! The circuit builder: devices, connections, and monitors.
//!
//! The parser drives this module one call per grammar production. Each
//! operation validates its own slice of circuit semantics and answers with a
//! typed result code; the parser translates those codes into its diagnostic
//! taxonomy. No evaluation semantics live here, only the structural
//! bookkeeping the semantic checks need: which devices exist, which input
//! ports they expose, what is already connected, and what is monitored.

use std::collections::HashMap;

use thiserror::Error;

use crate::names::NameId;
use crate::scanner::kw;

/// The device vocabulary of the definition language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    And,
    Nand,
    Or,
    Nor,
    Xor,
    Dtype,
    Clock,
    Switch,
}

impl DeviceKind {
    /// Maps a device-type keyword id to its kind.
    pub fn from_keyword(id: NameId) -> Option<Self> {
        match id {
            kw::CLOCK => Some(Self::Clock),
            kw::SWITCH => Some(Self::Switch),
            kw::AND => Some(Self::And),
            kw::NAND => Some(Self::Nand),
            kw::OR => Some(Self::Or),
            kw::NOR => Some(Self::Nor),
            kw::XOR => Some(Self::Xor),
            kw::DTYPE => Some(Self::Dtype),
            _ => None,
        }
    }
}

/// One end of a connection: a device and an optional named port.
/// `port == None` is the single anonymous output of a non-DTYPE device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signal {
    pub device: NameId,
    pub port: Option<NameId>,
}

/// A recorded connection from an output signal to an input signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Connection {
    pub source: Signal,
    pub target: Signal,
}

/// A device record: its kind, declaration qualifier, and input-port states.
#[derive(Debug)]
pub struct Device {
    pub kind: DeviceKind,
    /// Fan-in count, switch state, or clock period, depending on kind.
    pub qualifier: Option<usize>,
    /// Valid input ports, each with the source signal feeding it (if any).
    inputs: HashMap<NameId, Option<Signal>>,
}

impl Device {
    /// True if `port` is a valid input port of this device.
    pub fn has_input(&self, port: NameId) -> bool {
        self.inputs.contains_key(&port)
    }

    /// True if `port` names an output of this device.
    pub fn has_output(&self, port: Option<NameId>) -> bool {
        match self.kind {
            DeviceKind::Dtype => matches!(port, Some(kw::Q) | Some(kw::QBAR)),
            _ => port.is_none(),
        }
    }

    /// The source currently feeding `port`, if the port exists and is wired.
    pub fn input_source(&self, port: NameId) -> Option<Signal> {
        self.inputs.get(&port).copied().flatten()
    }
}

/// Result codes for [`Network::make_device`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DeviceError {
    #[error("qualifier missing")]
    MissingQualifier,
    #[error("qualifier invalid")]
    InvalidQualifier,
    #[error("qualifier not expected")]
    UnexpectedQualifier,
}

/// Result codes for [`Network::make_connection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConnectionError {
    #[error("device absent")]
    DeviceAbsent,
    #[error("input already connected")]
    InputAlreadyConnected,
    #[error("input used as a source")]
    InputToInput,
    #[error("port absent")]
    PortAbsent,
    #[error("output used as a target")]
    OutputToOutput,
}

/// Result codes for [`Network::make_monitor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MonitorError {
    #[error("device absent")]
    DeviceAbsent,
    #[error("not an output")]
    NotAnOutput,
    #[error("already monitored")]
    AlreadyMonitored,
}

/// In-memory circuit model under construction.
#[derive(Debug, Default)]
pub struct Network {
    devices: HashMap<NameId, Device>,
    device_order: Vec<NameId>,
    connections: Vec<Connection>,
    monitors: Vec<Signal>,
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a device named `name`. The qualifier is validated per kind:
    /// fan-in 1..=16 for gates, bit for SWITCH, non-zero period for CLOCK,
    /// and nothing at all for XOR and DTYPE.
    pub fn make_device(
        &mut self,
        name: NameId,
        kind: DeviceKind,
        qualifier: Option<usize>,
    ) -> Result<(), DeviceError> {
        let inputs = match kind {
            DeviceKind::And | DeviceKind::Nand | DeviceKind::Or | DeviceKind::Nor => {
                let fan_in = qualifier.ok_or(DeviceError::MissingQualifier)?;
                if !(1..=16).contains(&fan_in) {
                    return Err(DeviceError::InvalidQualifier);
                }
                numbered_pins(fan_in)
            }
            DeviceKind::Xor => {
                if qualifier.is_some() {
                    return Err(DeviceError::UnexpectedQualifier);
                }
                numbered_pins(2)
            }
            DeviceKind::Dtype => {
                if qualifier.is_some() {
                    return Err(DeviceError::UnexpectedQualifier);
                }
                [kw::DATA, kw::CLK, kw::SET, kw::CLEAR]
                    .into_iter()
                    .map(|port| (port, None))
                    .collect()
            }
            DeviceKind::Clock => {
                let period = qualifier.ok_or(DeviceError::MissingQualifier)?;
                if period == 0 {
                    return Err(DeviceError::InvalidQualifier);
                }
                HashMap::new()
            }
            DeviceKind::Switch => {
                let state = qualifier.ok_or(DeviceError::MissingQualifier)?;
                if state > 1 {
                    return Err(DeviceError::InvalidQualifier);
                }
                HashMap::new()
            }
        };

        if self.devices
            .insert(
                name,
                Device {
                    kind,
                    qualifier,
                    inputs,
                },
            )
            .is_none()
        {
            self.device_order.push(name);
        }
        Ok(())
    }

    pub fn get_device(&self, name: NameId) -> Option<&Device> {
        self.devices.get(&name)
    }

    /// Wires `source`/`source_port` (an output) to `target`/`target_port`
    /// (an input). The target port is required; the source port only exists
    /// on DTYPE devices.
    pub fn make_connection(
        &mut self,
        source: NameId,
        source_port: Option<NameId>,
        target: NameId,
        target_port: Option<NameId>,
    ) -> Result<(), ConnectionError> {
        let source_device = self.devices.get(&source).ok_or(ConnectionError::DeviceAbsent)?;
        let target_device = self.devices.get(&target).ok_or(ConnectionError::DeviceAbsent)?;

        if !source_device.has_output(source_port) {
            return match source_port {
                Some(port) if source_device.has_input(port) => Err(ConnectionError::InputToInput),
                _ => Err(ConnectionError::PortAbsent),
            };
        }

        let port = match target_port {
            // A bare device name (or an output port) cannot be a target.
            None => return Err(ConnectionError::OutputToOutput),
            Some(port) if target_device.has_output(Some(port)) => {
                return Err(ConnectionError::OutputToOutput)
            }
            Some(port) => port,
        };
        if !target_device.has_input(port) {
            return Err(ConnectionError::PortAbsent);
        }
        if target_device.input_source(port).is_some() {
            return Err(ConnectionError::InputAlreadyConnected);
        }

        let source_signal = Signal {
            device: source,
            port: source_port,
        };
        if let Some(device) = self.devices.get_mut(&target) {
            device.inputs.insert(port, Some(source_signal));
        }
        self.connections.push(Connection {
            source: source_signal,
            target: Signal {
                device: target,
                port: target_port,
            },
        });
        Ok(())
    }

    /// Registers a monitor on an output signal.
    pub fn make_monitor(
        &mut self,
        device: NameId,
        port: Option<NameId>,
    ) -> Result<(), MonitorError> {
        let record = self.devices.get(&device).ok_or(MonitorError::DeviceAbsent)?;
        if !record.has_output(port) {
            return Err(MonitorError::NotAnOutput);
        }
        let signal = Signal { device, port };
        if self.monitors.contains(&signal) {
            return Err(MonitorError::AlreadyMonitored);
        }
        self.monitors.push(signal);
        Ok(())
    }

    /// Device names in declaration order.
    pub fn devices(&self) -> &[NameId] {
        &self.device_order
    }

    /// Connections in declaration order.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Monitored signals in declaration order.
    pub fn monitors(&self) -> &[Signal] {
        &self.monitors
    }
}

fn numbered_pins(count: usize) -> HashMap<NameId, Option<Signal>> {
    (0..count).map(|i| (kw::I1 + i, None)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SW: NameId = 100;
    const G: NameId = 101;
    const FF: NameId = 102;
    const CK: NameId = 103;

    fn switch_and_gate() -> Network {
        let mut network = Network::new();
        network
            .make_device(SW, DeviceKind::Switch, Some(0))
            .expect("switch");
        network.make_device(G, DeviceKind::And, Some(2)).expect("gate");
        network
    }

    #[test]
    fn gate_fan_in_is_bounded() {
        let mut network = Network::new();
        assert_eq!(
            network.make_device(G, DeviceKind::And, None),
            Err(DeviceError::MissingQualifier)
        );
        assert_eq!(
            network.make_device(G, DeviceKind::And, Some(0)),
            Err(DeviceError::InvalidQualifier)
        );
        assert_eq!(
            network.make_device(G, DeviceKind::And, Some(17)),
            Err(DeviceError::InvalidQualifier)
        );
        assert!(network.make_device(G, DeviceKind::And, Some(16)).is_ok());
        let device = network.get_device(G).expect("device");
        assert!(device.has_input(kw::I16));
        assert!(!device.has_input(kw::I16 + 1));
    }

    #[test]
    fn switch_takes_a_bit_and_clock_a_nonzero_period() {
        let mut network = Network::new();
        assert_eq!(
            network.make_device(SW, DeviceKind::Switch, Some(2)),
            Err(DeviceError::InvalidQualifier)
        );
        assert!(network.make_device(SW, DeviceKind::Switch, Some(1)).is_ok());
        assert_eq!(
            network.make_device(CK, DeviceKind::Clock, Some(0)),
            Err(DeviceError::InvalidQualifier)
        );
        assert!(network.make_device(CK, DeviceKind::Clock, Some(5)).is_ok());
    }

    #[test]
    fn xor_and_dtype_reject_qualifiers() {
        let mut network = Network::new();
        assert_eq!(
            network.make_device(G, DeviceKind::Xor, Some(2)),
            Err(DeviceError::UnexpectedQualifier)
        );
        assert!(network.make_device(G, DeviceKind::Xor, None).is_ok());
        assert_eq!(
            network.make_device(FF, DeviceKind::Dtype, Some(1)),
            Err(DeviceError::UnexpectedQualifier)
        );
        assert!(network.make_device(FF, DeviceKind::Dtype, None).is_ok());
        let flip_flop = network.get_device(FF).expect("dtype");
        assert!(flip_flop.has_input(kw::DATA));
        assert!(flip_flop.has_output(Some(kw::QBAR)));
        assert!(!flip_flop.has_output(None));
    }

    #[test]
    fn connection_records_and_guards_input_state() {
        let mut network = switch_and_gate();
        assert!(network.make_connection(SW, None, G, Some(kw::I1)).is_ok());
        assert_eq!(
            network.make_connection(SW, None, G, Some(kw::I1)),
            Err(ConnectionError::InputAlreadyConnected)
        );
        assert_eq!(network.connections().len(), 1);
        let wired = network.get_device(G).expect("gate").input_source(kw::I1);
        assert_eq!(
            wired,
            Some(Signal {
                device: SW,
                port: None
            })
        );
    }

    #[test]
    fn connection_rejects_bad_endpoints() {
        let mut network = switch_and_gate();
        assert_eq!(
            network.make_connection(FF, None, G, Some(kw::I1)),
            Err(ConnectionError::DeviceAbsent)
        );
        assert_eq!(
            network.make_connection(G, Some(kw::I1), G, Some(kw::I2)),
            Err(ConnectionError::InputToInput)
        );
        assert_eq!(
            network.make_connection(SW, None, G, None),
            Err(ConnectionError::OutputToOutput)
        );
        assert_eq!(
            network.make_connection(SW, None, G, Some(kw::I3)),
            Err(ConnectionError::PortAbsent)
        );
    }

    #[test]
    fn monitor_wants_an_unmonitored_output() {
        let mut network = switch_and_gate();
        network.make_device(FF, DeviceKind::Dtype, None).expect("dtype");
        assert!(network.make_monitor(SW, None).is_ok());
        assert_eq!(
            network.make_monitor(SW, None),
            Err(MonitorError::AlreadyMonitored)
        );
        assert_eq!(
            network.make_monitor(G, Some(kw::I1)),
            Err(MonitorError::NotAnOutput)
        );
        assert_eq!(network.make_monitor(FF, None), Err(MonitorError::NotAnOutput));
        assert!(network.make_monitor(FF, Some(kw::Q)).is_ok());
        assert_eq!(
            network.make_monitor(CK, None),
            Err(MonitorError::DeviceAbsent)
        );
        assert_eq!(network.monitors().len(), 2);
    }
}
