//! OBD-II Mode 01 request handling
//!
//! Dispatch is table-driven: every supported PID maps to an encoder over
//! the live vehicle state, and the supported-PID bitmap responses are
//! derived from that same table rather than kept as literal constants.
//!
//! Requests on non-diagnostic identifiers and requests shorter than two
//! payload bytes are dropped without a reply. Unknown modes are logged and
//! ignored; unknown PIDs under Mode 01 get a negative response. The
//! asymmetry is intentional (only Mode 01 is implemented at all) and is
//! pinned by tests below.

use tracing::debug;

use vecu_can::codec;
use vecu_can::obd2::{mode, nrc, pid, DiagRequest, DiagResponse};
use vecu_can::{ids, Frame};

use crate::state::VehicleState;

struct PidEntry {
    pid: u8,
    encode: fn(&VehicleState) -> Vec<u8>,
}

fn encode_supported_01_20(_state: &VehicleState) -> Vec<u8> {
    supported_bitmap(pid::SUPPORTED_01_20).to_vec()
}

fn encode_supported_21_40(_state: &VehicleState) -> Vec<u8> {
    supported_bitmap(pid::SUPPORTED_21_40).to_vec()
}

fn encode_engine_load(state: &VehicleState) -> Vec<u8> {
    vec![codec::percent_raw(state.engine_load)]
}

fn encode_coolant_temp(state: &VehicleState) -> Vec<u8> {
    vec![codec::temp_raw(state.coolant_temp)]
}

fn encode_rpm(state: &VehicleState) -> Vec<u8> {
    codec::rpm_raw(state.rpm).to_be_bytes().to_vec()
}

fn encode_speed(state: &VehicleState) -> Vec<u8> {
    vec![codec::speed_raw(state.vehicle_speed)]
}

fn encode_intake_temp(state: &VehicleState) -> Vec<u8> {
    vec![codec::temp_raw(state.intake_temp)]
}

fn encode_maf(state: &VehicleState) -> Vec<u8> {
    codec::maf_raw(state.maf).to_be_bytes().to_vec()
}

fn encode_throttle(state: &VehicleState) -> Vec<u8> {
    vec![codec::percent_raw(state.throttle)]
}

fn encode_fuel_level(state: &VehicleState) -> Vec<u8> {
    vec![codec::percent_raw(state.fuel_level)]
}

/// Every PID this ECU answers, including the bitmap PIDs themselves.
const PID_TABLE: &[PidEntry] = &[
    PidEntry {
        pid: pid::SUPPORTED_01_20,
        encode: encode_supported_01_20,
    },
    PidEntry {
        pid: pid::ENGINE_LOAD,
        encode: encode_engine_load,
    },
    PidEntry {
        pid: pid::COOLANT_TEMP,
        encode: encode_coolant_temp,
    },
    PidEntry {
        pid: pid::ENGINE_RPM,
        encode: encode_rpm,
    },
    PidEntry {
        pid: pid::VEHICLE_SPEED,
        encode: encode_speed,
    },
    PidEntry {
        pid: pid::INTAKE_TEMP,
        encode: encode_intake_temp,
    },
    PidEntry {
        pid: pid::MAF,
        encode: encode_maf,
    },
    PidEntry {
        pid: pid::THROTTLE_POS,
        encode: encode_throttle,
    },
    PidEntry {
        pid: pid::SUPPORTED_21_40,
        encode: encode_supported_21_40,
    },
    PidEntry {
        pid: pid::FUEL_LEVEL,
        encode: encode_fuel_level,
    },
];

/// Bitmap of supported PIDs in the window `(base+1)..=(base+32)`.
///
/// Bit 7 of byte 0 marks the first PID of the window (SAE J1979
/// convention). Derived from [`PID_TABLE`], so adding an entry updates the
/// advertised support automatically.
pub fn supported_bitmap(base: u8) -> [u8; 4] {
    let mut map = [0u8; 4];
    for entry in PID_TABLE {
        let Some(offset) = entry.pid.checked_sub(base.wrapping_add(1)) else {
            continue;
        };
        if offset < 32 {
            map[offset as usize / 8] |= 0x80 >> (offset % 8);
        }
    }
    map
}

/// Handle one inbound frame against the current state.
///
/// Returns the response frame to send, or `None` when the frame is not a
/// diagnostic request for this ECU, is malformed, or carries an
/// unimplemented mode.
pub fn handle_frame(frame: &Frame, state: &VehicleState) -> Option<Frame> {
    let request = DiagRequest::from_frame(frame)?;

    match request.mode {
        mode::CURRENT_DATA => {
            let response = mode01_response(request.pid, state);
            Some(response.to_frame(ids::OBD_RESP_ENGINE))
        }
        // TODO: Mode 03 (stored DTCs) and Mode 09 (vehicle info) once the
        // simulator grows fault and identity state
        other => {
            debug!(
                mode = format!("0x{:02X}", other),
                "Ignoring request for unimplemented diagnostic mode"
            );
            None
        }
    }
}

fn mode01_response(pid: u8, state: &VehicleState) -> DiagResponse {
    match PID_TABLE.iter().find(|entry| entry.pid == pid) {
        Some(entry) => {
            DiagResponse::positive(mode::CURRENT_DATA, pid, (entry.encode)(state))
        }
        None => DiagResponse::negative(mode::CURRENT_DATA, nrc::SUB_FUNCTION_NOT_SUPPORTED),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(payload: &[u8]) -> Frame {
        Frame::new(ids::OBD_BROADCAST, payload).unwrap()
    }

    #[test]
    fn test_rpm_request_encodes_live_state() {
        let state = VehicleState {
            rpm: 2000.0,
            ..VehicleState::default()
        };
        let response = handle_frame(&request(&[0x02, 0x01, 0x0C]), &state).unwrap();
        assert_eq!(response.id(), ids::OBD_RESP_ENGINE);
        // 2000 rpm / 0.25 = 8000 = 0x1F40
        assert_eq!(response.data(), &[0x04, 0x41, 0x0C, 0x1F, 0x40]);
    }

    #[test]
    fn test_speed_request_single_byte() {
        let state = VehicleState {
            vehicle_speed: 112.0,
            ..VehicleState::default()
        };
        let response = handle_frame(&request(&[0x02, 0x01, 0x0D]), &state).unwrap();
        assert_eq!(response.data(), &[0x03, 0x41, 0x0D, 112]);
    }

    #[test]
    fn test_unsupported_pid_gets_negative_response() {
        let state = VehicleState::default();
        let response = handle_frame(&request(&[0x02, 0x01, 0xFF]), &state).unwrap();
        assert_eq!(response.data(), &[0x03, 0x7F, 0x01, 0x12]);
    }

    #[test]
    fn test_unknown_mode_is_silently_ignored() {
        // Deliberate asymmetry: an unknown PID earns a negative response,
        // an unimplemented mode earns nothing at all.
        let state = VehicleState::default();
        assert!(handle_frame(&request(&[0x01, 0x03]), &state).is_none());
        assert!(handle_frame(&request(&[0x02, 0x09, 0x02]), &state).is_none());
        assert!(handle_frame(&request(&[0x02, 0x01, 0xFF]), &state).is_some());
    }

    #[test]
    fn test_short_request_gets_no_response() {
        let state = VehicleState::default();
        assert!(handle_frame(&request(&[0x01]), &state).is_none());
        assert!(handle_frame(&request(&[]), &state).is_none());
    }

    #[test]
    fn test_non_diagnostic_identifier_is_ignored() {
        let state = VehicleState::default();
        let frame = Frame::new(ids::ENGINE_DATA_1, &[0x02, 0x01, 0x0C]).unwrap();
        assert!(handle_frame(&frame, &state).is_none());
    }

    #[test]
    fn test_bitmap_is_state_independent() {
        let idle = VehicleState::default();
        let moving = VehicleState {
            rpm: 4500.0,
            vehicle_speed: 180.0,
            ..VehicleState::default()
        };
        let a = handle_frame(&request(&[0x02, 0x01, 0x00]), &idle).unwrap();
        let b = handle_frame(&request(&[0x02, 0x01, 0x00]), &moving).unwrap();
        assert_eq!(a.data(), b.data());
        assert_eq!(a.data()[0], 6); // mode + pid + 4 bitmap bytes
        assert_eq!(&a.data()[1..3], &[0x41, 0x00]);
    }

    #[test]
    fn test_bitmap_bits_match_table() {
        // Window 0x01-0x20: PIDs 04, 05, 0C, 0D, 0F, 10, 11 and the 0x20
        // chain bit.
        assert_eq!(
            supported_bitmap(pid::SUPPORTED_01_20),
            [0x18, 0x1B, 0x80, 0x01]
        );
        // Window 0x21-0x40: fuel level (0x2F) only.
        assert_eq!(
            supported_bitmap(pid::SUPPORTED_21_40),
            [0x00, 0x02, 0x00, 0x00]
        );
    }

    #[test]
    fn test_every_supported_pid_answers_positively() {
        let state = VehicleState::default();
        for entry_pid in [0x00, 0x04, 0x05, 0x0C, 0x0D, 0x0F, 0x10, 0x11, 0x20, 0x2F] {
            let response = handle_frame(&request(&[0x02, 0x01, entry_pid]), &state).unwrap();
            assert_eq!(response.data()[1], 0x41, "pid 0x{:02X}", entry_pid);
            assert_eq!(response.data()[2], entry_pid);
        }
    }

    #[test]
    fn test_request_without_pid_byte_reads_bitmap() {
        // A two-byte Mode 01 request defaults to PID 0x00.
        let state = VehicleState::default();
        let response = handle_frame(&request(&[0x01, 0x01]), &state).unwrap();
        assert_eq!(&response.data()[1..3], &[0x41, 0x00]);
    }
}
