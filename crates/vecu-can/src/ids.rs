//! CAN identifier assignments for the simulated vehicle network
//!
//! Broadcast identifiers carry periodic telemetry from the simulated ECUs;
//! the 0x7xx block follows the ISO 15765-4 OBD-II addressing convention.

/// Engine ECU fast telemetry: RPM, coolant temp, throttle, MAF, load. 10 ms cycle.
pub const ENGINE_DATA_1: u16 = 0x100;

/// Engine ECU slow telemetry: intake air temp, load mirror. 100 ms cycle.
pub const ENGINE_DATA_2: u16 = 0x101;

/// Transmission ECU: gear, fluid temp, vehicle speed. 50 ms cycle.
pub const TRANS_DATA: u16 = 0x200;

/// Body control module: fuel level, odometer. 100 ms cycle.
pub const BCM_DATA: u16 = 0x300;

/// ABS/ESP wheel speeds. Reserved on this bus; not broadcast by the simulator.
pub const ABS_WHEEL_SPEED: u16 = 0x400;

/// Tester broadcast request to all ECUs.
pub const OBD_BROADCAST: u16 = 0x7DF;

/// Physical request to the engine ECU.
pub const OBD_REQ_ENGINE: u16 = 0x7E0;

/// Physical request to the transmission ECU.
pub const OBD_REQ_TRANS: u16 = 0x7E1;

/// Diagnostic response from the engine ECU.
pub const OBD_RESP_ENGINE: u16 = 0x7E8;

/// Diagnostic response from the transmission ECU.
pub const OBD_RESP_TRANS: u16 = 0x7E9;
