//! OBD-II (SAE J1979 / ISO 15031-5) protocol types for Mode 01 diagnostics
//!
//! Request/response framing plus the PID conversion formulas shared with
//! downstream decoders. Only single-frame requests are handled; ISO-TP
//! multi-frame transport is out of scope.

use crate::frame::Frame;
use crate::ids;

/// OBD-II service modes (SIDs).
#[allow(dead_code)]
pub mod mode {
    /// Show current data
    pub const CURRENT_DATA: u8 = 0x01;
    /// Show freeze frame data
    pub const FREEZE_FRAME: u8 = 0x02;
    /// Show stored DTCs
    pub const READ_DTC: u8 = 0x03;
    /// Clear DTCs and freeze frame
    pub const CLEAR_DTC: u8 = 0x04;
    /// Oxygen sensor test results
    pub const TEST_RESULTS_O2: u8 = 0x05;
    /// Test results, non-continuous monitors
    pub const TEST_RESULTS: u8 = 0x06;
    /// Show pending DTCs
    pub const PENDING_DTC: u8 = 0x07;
    /// Control on-board system
    pub const CONTROL: u8 = 0x08;
    /// Request vehicle information
    pub const VEHICLE_INFO: u8 = 0x09;
    /// Permanent DTCs
    pub const PERMANENT_DTC: u8 = 0x0A;

    /// Positive response SID = request SID + this offset.
    pub const RESPONSE_OFFSET: u8 = 0x40;
}

/// Mode 01 parameter IDs.
#[allow(dead_code)]
pub mod pid {
    /// Supported PIDs \[01-20\] bitmap
    pub const SUPPORTED_01_20: u8 = 0x00;
    /// Calculated engine load
    pub const ENGINE_LOAD: u8 = 0x04;
    /// Engine coolant temperature
    pub const COOLANT_TEMP: u8 = 0x05;
    /// Engine RPM
    pub const ENGINE_RPM: u8 = 0x0C;
    /// Vehicle speed
    pub const VEHICLE_SPEED: u8 = 0x0D;
    /// Intake air temperature
    pub const INTAKE_TEMP: u8 = 0x0F;
    /// MAF air flow rate
    pub const MAF: u8 = 0x10;
    /// Throttle position
    pub const THROTTLE_POS: u8 = 0x11;
    /// Supported PIDs \[21-40\] bitmap
    pub const SUPPORTED_21_40: u8 = 0x20;
    /// Fuel tank level input
    pub const FUEL_LEVEL: u8 = 0x2F;
    /// Ambient air temperature
    pub const AMBIENT_TEMP: u8 = 0x46;
    /// Engine oil temperature
    pub const OIL_TEMP: u8 = 0x5C;
}

/// Negative response codes.
#[allow(dead_code)]
pub mod nrc {
    pub const SERVICE_NOT_SUPPORTED: u8 = 0x11;
    pub const SUB_FUNCTION_NOT_SUPPORTED: u8 = 0x12;
}

/// SID of a negative response frame.
pub const NEGATIVE_RESPONSE_SID: u8 = 0x7F;

/// A decoded diagnostic request: mode plus PID.
///
/// Transient view over one request frame's payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagRequest {
    pub mode: u8,
    pub pid: u8,
}

impl DiagRequest {
    /// Parse a diagnostic request out of a bus frame.
    ///
    /// Payload layout: byte 0 = declared length, byte 1 = mode,
    /// byte 2 = PID (defaults to 0 when absent).
    ///
    /// Returns `None` for frames on non-diagnostic identifiers and for
    /// requests too short to carry a mode byte; both are dropped without a
    /// reply.
    pub fn from_frame(frame: &Frame) -> Option<Self> {
        if frame.id() != ids::OBD_BROADCAST && frame.id() != ids::OBD_REQ_ENGINE {
            return None;
        }
        let data = frame.data();
        if data.len() < 2 {
            return None;
        }
        Some(Self {
            mode: data[1],
            pid: data.get(2).copied().unwrap_or(0),
        })
    }
}

/// A diagnostic reply, positive or negative.
///
/// Built per outgoing frame; serialization puts the declared length in
/// byte 0 and sets the frame DLC to the actual byte count (responses are
/// not padded to 8 bytes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagResponse {
    Positive {
        mode: u8,
        pid: u8,
        /// 0-5 data bytes, per the PID's formula.
        data: Vec<u8>,
    },
    Negative {
        mode: u8,
        nrc: u8,
    },
}

impl DiagResponse {
    pub fn positive(mode: u8, pid: u8, data: Vec<u8>) -> Self {
        Self::Positive { mode, pid, data }
    }

    pub fn negative(mode: u8, nrc: u8) -> Self {
        Self::Negative { mode, nrc }
    }

    /// Serialize onto the given response identifier.
    pub fn to_frame(&self, resp_id: u16) -> Frame {
        match self {
            Self::Positive { mode, pid, data } => {
                let mut bytes = Vec::with_capacity(3 + data.len());
                bytes.push((2 + data.len()) as u8);
                bytes.push(mode + mode::RESPONSE_OFFSET);
                bytes.push(*pid);
                bytes.extend_from_slice(data);
                Frame::from_parts(resp_id, &bytes)
            }
            Self::Negative { mode, nrc } => {
                Frame::from_parts(resp_id, &[3, NEGATIVE_RESPONSE_SID, *mode, *nrc])
            }
        }
    }
}

/// Physical-value conversions for Mode 01 response data bytes.
///
/// `a` and `b` are the first and second data bytes of the response. Each
/// function is the inverse of the corresponding response-building rule, so
/// downstream decoders and the simulator agree byte for byte.
pub mod value {
    /// Calculated engine load, PID 0x04, percent.
    pub fn engine_load_pct(a: u8) -> f32 {
        a as f32 * 100.0 / 255.0
    }

    /// Engine coolant temperature, PID 0x05, degrees C.
    pub fn coolant_temp_c(a: u8) -> i16 {
        a as i16 - 40
    }

    /// Engine speed, PID 0x0C, rpm.
    pub fn rpm(a: u8, b: u8) -> f32 {
        (a as f32 * 256.0 + b as f32) / 4.0
    }

    /// Vehicle speed, PID 0x0D, km/h.
    pub fn speed_kph(a: u8) -> u8 {
        a
    }

    /// Intake air temperature, PID 0x0F, degrees C.
    pub fn intake_temp_c(a: u8) -> i16 {
        a as i16 - 40
    }

    /// MAF air flow rate, PID 0x10, g/s.
    pub fn maf_gps(a: u8, b: u8) -> f32 {
        (a as f32 * 256.0 + b as f32) / 100.0
    }

    /// Throttle position, PID 0x11, percent.
    pub fn throttle_pct(a: u8) -> f32 {
        a as f32 * 100.0 / 255.0
    }

    /// Fuel tank level, PID 0x2F, percent.
    pub fn fuel_level_pct(a: u8) -> f32 {
        a as f32 * 100.0 / 255.0
    }

    /// Ambient air temperature, PID 0x46, degrees C.
    pub fn ambient_temp_c(a: u8) -> i16 {
        a as i16 - 40
    }

    /// Engine oil temperature, PID 0x5C, degrees C.
    pub fn oil_temp_c(a: u8) -> i16 {
        a as i16 - 40
    }
}

/// Human-readable name for a Mode 01 PID.
pub fn pid_name(pid: u8) -> &'static str {
    match pid {
        self::pid::ENGINE_LOAD => "Engine Load",
        self::pid::COOLANT_TEMP => "Coolant Temperature",
        self::pid::ENGINE_RPM => "Engine RPM",
        self::pid::VEHICLE_SPEED => "Vehicle Speed",
        self::pid::INTAKE_TEMP => "Intake Air Temperature",
        self::pid::MAF => "MAF Air Flow Rate",
        self::pid::THROTTLE_POS => "Throttle Position",
        self::pid::FUEL_LEVEL => "Fuel Tank Level",
        self::pid::AMBIENT_TEMP => "Ambient Air Temperature",
        self::pid::OIL_TEMP => "Engine Oil Temperature",
        _ => "Unknown PID",
    }
}

/// Display units for a Mode 01 PID.
pub fn pid_units(pid: u8) -> &'static str {
    match pid {
        self::pid::ENGINE_LOAD | self::pid::THROTTLE_POS | self::pid::FUEL_LEVEL => "%",
        self::pid::COOLANT_TEMP
        | self::pid::INTAKE_TEMP
        | self::pid::AMBIENT_TEMP
        | self::pid::OIL_TEMP => "\u{b0}C",
        self::pid::ENGINE_RPM => "rpm",
        self::pid::VEHICLE_SPEED => "km/h",
        self::pid::MAF => "g/s",
        _ => "",
    }
}
