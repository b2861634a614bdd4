//! Signal codec for the periodic broadcast messages
//!
//! One struct per message identifier, each a pure encode/decode pair over
//! the fixed byte layout. Multi-byte signals are big-endian (Motorola
//! order), the automotive convention on this bus.
//!
//! Encoding rounds physical values to the representable grid and saturates
//! at the encodable bounds rather than wrapping. Decoding is the algebraic
//! inverse up to the quantization step.

use thiserror::Error;

use crate::frame::{Frame, MAX_FRAME_DATA};
use crate::ids;

/// RPM quantization step, rpm per bit.
pub const RPM_STEP: f32 = 0.25;

/// MAF quantization step, g/s per bit.
pub const MAF_STEP: f32 = 0.01;

/// Percentage quantization step (full scale 255 raw = 100 %).
pub const PERCENT_STEP: f32 = 100.0 / 255.0;

/// Temperature encoding offset, degrees C.
pub const TEMP_OFFSET: f32 = 40.0;

/// Errors decoding a broadcast frame.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CodecError {
    #[error("unexpected CAN ID 0x{actual:03X}, expected 0x{expected:03X}")]
    WrongId { expected: u16, actual: u16 },

    #[error("payload of 0x{id:03X} too short: {actual} bytes, need {needed}")]
    ShortPayload {
        id: u16,
        needed: usize,
        actual: usize,
    },
}

/// Scale a percentage (0-100) to its raw byte, saturating.
pub fn percent_raw(pct: f32) -> u8 {
    (pct * 255.0 / 100.0).round().clamp(0.0, 255.0) as u8
}

/// Inverse of [`percent_raw`].
pub fn percent_from_raw(raw: u8) -> f32 {
    raw as f32 * PERCENT_STEP
}

/// Scale a temperature in degrees C to its offset byte, saturating at the
/// -40..215 encodable range.
pub fn temp_raw(celsius: f32) -> u8 {
    (celsius + TEMP_OFFSET).round().clamp(0.0, 255.0) as u8
}

/// Inverse of [`temp_raw`].
pub fn temp_from_raw(raw: u8) -> f32 {
    raw as f32 - TEMP_OFFSET
}

/// Scale engine speed to its 0.25 rpm/bit raw value, saturating.
pub fn rpm_raw(rpm: f32) -> u16 {
    (rpm / RPM_STEP).round().clamp(0.0, u16::MAX as f32) as u16
}

/// Inverse of [`rpm_raw`].
pub fn rpm_from_raw(raw: u16) -> f32 {
    raw as f32 * RPM_STEP
}

/// Scale mass air flow to its 0.01 g/s per bit raw value, saturating.
pub fn maf_raw(maf: f32) -> u16 {
    (maf / MAF_STEP).round().clamp(0.0, u16::MAX as f32) as u16
}

/// Inverse of [`maf_raw`].
pub fn maf_from_raw(raw: u16) -> f32 {
    raw as f32 * MAF_STEP
}

/// Scale vehicle speed to a single km/h byte, saturating at 255.
pub fn speed_raw(kph: f32) -> u8 {
    kph.round().clamp(0.0, 255.0) as u8
}

fn payload(frame: &Frame, id: u16, needed: usize) -> Result<&[u8], CodecError> {
    if frame.id() != id {
        return Err(CodecError::WrongId {
            expected: id,
            actual: frame.id(),
        });
    }
    let data = frame.data();
    if data.len() < needed {
        return Err(CodecError::ShortPayload {
            id,
            needed,
            actual: data.len(),
        });
    }
    Ok(data)
}

/// ENGINE_DATA_1 (0x100): fast engine telemetry.
///
/// Byte 0-1: RPM (0.25 rpm/bit, BE). Byte 2: coolant temp (+40 offset).
/// Byte 3: throttle (255 = 100 %). Byte 4-5: MAF (0.01 g/s per bit, BE).
/// Byte 6: engine load (255 = 100 %). Byte 7: reserved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineData1 {
    pub rpm: f32,
    pub coolant_temp: f32,
    pub throttle: f32,
    pub maf: f32,
    pub engine_load: f32,
}

impl EngineData1 {
    pub fn to_frame(&self) -> Frame {
        let mut data = [0u8; MAX_FRAME_DATA];
        data[0..2].copy_from_slice(&rpm_raw(self.rpm).to_be_bytes());
        data[2] = temp_raw(self.coolant_temp);
        data[3] = percent_raw(self.throttle);
        data[4..6].copy_from_slice(&maf_raw(self.maf).to_be_bytes());
        data[6] = percent_raw(self.engine_load);
        Frame::from_payload(ids::ENGINE_DATA_1, data)
    }

    pub fn decode(frame: &Frame) -> Result<Self, CodecError> {
        let data = payload(frame, ids::ENGINE_DATA_1, 7)?;
        Ok(Self {
            rpm: rpm_from_raw(u16::from_be_bytes([data[0], data[1]])),
            coolant_temp: temp_from_raw(data[2]),
            throttle: percent_from_raw(data[3]),
            maf: maf_from_raw(u16::from_be_bytes([data[4], data[5]])),
            engine_load: percent_from_raw(data[6]),
        })
    }
}

/// ENGINE_DATA_2 (0x101): slow engine telemetry.
///
/// Byte 0: intake air temp (+40 offset). Byte 1: engine load mirror
/// (255 = 100 %). Bytes 2-7: reserved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineData2 {
    pub intake_temp: f32,
    pub engine_load: f32,
}

impl EngineData2 {
    pub fn to_frame(&self) -> Frame {
        let mut data = [0u8; MAX_FRAME_DATA];
        data[0] = temp_raw(self.intake_temp);
        data[1] = percent_raw(self.engine_load);
        Frame::from_payload(ids::ENGINE_DATA_2, data)
    }

    pub fn decode(frame: &Frame) -> Result<Self, CodecError> {
        let data = payload(frame, ids::ENGINE_DATA_2, 2)?;
        Ok(Self {
            intake_temp: temp_from_raw(data[0]),
            engine_load: percent_from_raw(data[1]),
        })
    }
}

/// TRANS_DATA (0x200): transmission telemetry.
///
/// Byte 0: gear (0 = neutral, 1-6 = forward, 7 = reverse). Byte 1: fluid
/// temp (+40 offset). Bytes 2-3: vehicle speed (km/h, BE). Bytes 4-7:
/// reserved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransData {
    pub gear: u8,
    pub fluid_temp: f32,
    pub vehicle_speed: u16,
}

impl TransData {
    pub fn to_frame(&self) -> Frame {
        let mut data = [0u8; MAX_FRAME_DATA];
        data[0] = self.gear;
        data[1] = temp_raw(self.fluid_temp);
        data[2..4].copy_from_slice(&self.vehicle_speed.to_be_bytes());
        Frame::from_payload(ids::TRANS_DATA, data)
    }

    pub fn decode(frame: &Frame) -> Result<Self, CodecError> {
        let data = payload(frame, ids::TRANS_DATA, 4)?;
        Ok(Self {
            gear: data[0],
            fluid_temp: temp_from_raw(data[1]),
            vehicle_speed: u16::from_be_bytes([data[2], data[3]]),
        })
    }
}

/// BCM_DATA (0x300): body control telemetry.
///
/// Byte 0: fuel level (255 = 100 %). Bytes 1-4: odometer (km, BE u32).
/// Bytes 5-7: reserved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BcmData {
    pub fuel_level: f32,
    pub odometer: u32,
}

impl BcmData {
    pub fn to_frame(&self) -> Frame {
        let mut data = [0u8; MAX_FRAME_DATA];
        data[0] = percent_raw(self.fuel_level);
        data[1..5].copy_from_slice(&self.odometer.to_be_bytes());
        Frame::from_payload(ids::BCM_DATA, data)
    }

    pub fn decode(frame: &Frame) -> Result<Self, CodecError> {
        let data = payload(frame, ids::BCM_DATA, 5)?;
        Ok(Self {
            fuel_level: percent_from_raw(data[0]),
            odometer: u32::from_be_bytes([data[1], data[2], data[3], data[4]]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine1_round_trip_within_quantization() {
        let original = EngineData1 {
            rpm: 2731.3,
            coolant_temp: 87.4,
            throttle: 42.0,
            maf: 12.345,
            engine_load: 43.6,
        };
        let decoded = EngineData1::decode(&original.to_frame()).unwrap();

        assert!((decoded.rpm - original.rpm).abs() <= RPM_STEP / 2.0 + f32::EPSILON);
        assert!((decoded.coolant_temp - original.coolant_temp).abs() <= 0.5);
        assert!((decoded.throttle - original.throttle).abs() <= PERCENT_STEP / 2.0 + 1e-4);
        assert!((decoded.maf - original.maf).abs() <= MAF_STEP / 2.0 + 1e-3);
        assert!((decoded.engine_load - original.engine_load).abs() <= PERCENT_STEP / 2.0 + 1e-4);
    }

    #[test]
    fn test_engine1_rpm_layout_big_endian() {
        let msg = EngineData1 {
            rpm: 2000.0,
            coolant_temp: 85.0,
            throttle: 0.0,
            maf: 0.0,
            engine_load: 0.0,
        };
        let frame = msg.to_frame();
        assert_eq!(frame.id(), ids::ENGINE_DATA_1);
        assert_eq!(frame.dlc(), 8);
        // 2000 / 0.25 = 8000 = 0x1F40
        assert_eq!(&frame.data()[0..2], &[0x1F, 0x40]);
        assert_eq!(frame.data()[2], 125); // 85 + 40
    }

    #[test]
    fn test_encode_saturates_instead_of_wrapping() {
        let msg = EngineData1 {
            rpm: 99999.0,
            coolant_temp: 500.0,
            throttle: 150.0,
            maf: 700.0,
            engine_load: -20.0,
        };
        let frame = msg.to_frame();
        assert_eq!(&frame.data()[0..2], &[0xFF, 0xFF]);
        assert_eq!(frame.data()[2], 0xFF);
        assert_eq!(frame.data()[3], 0xFF);
        assert_eq!(&frame.data()[4..6], &[0xFF, 0xFF]);
        assert_eq!(frame.data()[6], 0x00);

        let decoded = EngineData1::decode(&frame).unwrap();
        assert_eq!(decoded.rpm, 16383.75);
        assert_eq!(decoded.coolant_temp, 215.0);
        assert_eq!(decoded.engine_load, 0.0);
    }

    #[test]
    fn test_temp_saturates_at_negative_bound() {
        assert_eq!(temp_raw(-60.0), 0);
        assert_eq!(temp_from_raw(0), -40.0);
    }

    #[test]
    fn test_trans_round_trip() {
        let original = TransData {
            gear: 4,
            fluid_temp: 78.0,
            vehicle_speed: 112,
        };
        let decoded = TransData::decode(&original.to_frame()).unwrap();
        assert_eq!(decoded.gear, 4);
        assert_eq!(decoded.fluid_temp, 78.0);
        assert_eq!(decoded.vehicle_speed, 112);
    }

    #[test]
    fn test_bcm_round_trip() {
        let original = BcmData {
            fuel_level: 75.0,
            odometer: 45231,
        };
        let frame = original.to_frame();
        assert_eq!(&frame.data()[1..5], &45231u32.to_be_bytes());

        let decoded = BcmData::decode(&frame).unwrap();
        assert_eq!(decoded.odometer, 45231);
        assert!((decoded.fuel_level - 75.0).abs() <= PERCENT_STEP / 2.0 + 1e-4);
    }

    #[test]
    fn test_decode_rejects_wrong_id() {
        let frame = Frame::new(ids::TRANS_DATA, &[0u8; 8]).unwrap();
        assert_eq!(
            EngineData1::decode(&frame),
            Err(CodecError::WrongId {
                expected: ids::ENGINE_DATA_1,
                actual: ids::TRANS_DATA,
            })
        );
    }

    #[test]
    fn test_decode_rejects_short_payload() {
        let frame = Frame::new(ids::BCM_DATA, &[0x00, 0x01]).unwrap();
        assert_eq!(
            BcmData::decode(&frame),
            Err(CodecError::ShortPayload {
                id: ids::BCM_DATA,
                needed: 5,
                actual: 2,
            })
        );
    }
}
