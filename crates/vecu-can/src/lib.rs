//! vecu-can - CAN wire contract for the simulated vehicle network
//!
//! Everything a bus participant needs to speak to the simulated ECUs:
//!
//! - [`frame`] - CAN frame model (11-bit identifiers, classic CAN payloads)
//! - [`ids`] - identifier assignments for broadcast and diagnostic traffic
//! - [`codec`] - signal packing/unpacking for the periodic broadcast messages
//! - [`obd2`] - OBD-II Mode 01 request/response types and PID formulas
//! - [`bus`] - SocketCAN transport (Linux)
//!
//! Downstream consumers (loggers, dashboards, publishers) decode frames with
//! the same codec the simulator encodes with; the byte layouts in [`codec`]
//! and [`obd2`] are the binding contract.

pub mod bus;
pub mod codec;
pub mod frame;
pub mod ids;
pub mod obd2;

pub use bus::{BusError, CanBus};
pub use codec::{BcmData, CodecError, EngineData1, EngineData2, TransData};
pub use frame::{Frame, FrameError, MAX_FRAME_DATA, MAX_STANDARD_ID};
pub use obd2::{DiagRequest, DiagResponse};
