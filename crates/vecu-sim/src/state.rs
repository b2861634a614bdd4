//! Canonical vehicle state

use vecu_can::codec::{BcmData, EngineData1, EngineData2, TransData};

/// Neutral gear position.
pub const GEAR_NEUTRAL: u8 = 0;

/// Reverse gear position.
pub const GEAR_REVERSE: u8 = 7;

/// The single mutable snapshot of the simulated vehicle.
///
/// Created once at startup with warm-idle defaults, mutated exclusively by
/// [`crate::cycle::advance`] and read-only everywhere else. Every physical
/// field stays within its declared range across ticks and the odometer
/// never decreases.
#[derive(Debug, Clone)]
pub struct VehicleState {
    /// Engine speed, rpm (0-16383.75)
    pub rpm: f32,
    /// Coolant temperature, degrees C (-40..215)
    pub coolant_temp: f32,
    /// Throttle position, percent (0-100)
    pub throttle: f32,
    /// Mass air flow, g/s (0-655.35)
    pub maf: f32,
    /// Calculated engine load, percent (0-100)
    pub engine_load: f32,
    /// Intake air temperature, degrees C (-40..215)
    pub intake_temp: f32,

    /// Gear position: 0 = neutral, 1-6 = forward, 7 = reverse
    pub gear: u8,
    /// Transmission fluid temperature, degrees C (-40..215)
    pub fluid_temp: f32,

    /// Fuel tank level, percent (0-100)
    pub fuel_level: f32,
    /// Odometer, km
    pub odometer: u32,
    /// Vehicle speed, km/h (0-255)
    pub vehicle_speed: f32,

    /// Elapsed simulated time, seconds
    pub sim_time: f64,
}

impl Default for VehicleState {
    fn default() -> Self {
        Self {
            rpm: 800.0,
            coolant_temp: 85.0,
            throttle: 15.0,
            maf: 5.0,
            engine_load: 20.0,
            intake_temp: 25.0,
            gear: GEAR_NEUTRAL,
            fluid_temp: 60.0,
            fuel_level: 75.0,
            odometer: 45231,
            vehicle_speed: 0.0,
            sim_time: 0.0,
        }
    }
}

impl VehicleState {
    /// Engine fast-telemetry view for ENGINE_DATA_1.
    pub fn engine_data_1(&self) -> EngineData1 {
        EngineData1 {
            rpm: self.rpm,
            coolant_temp: self.coolant_temp,
            throttle: self.throttle,
            maf: self.maf,
            engine_load: self.engine_load,
        }
    }

    /// Engine slow-telemetry view for ENGINE_DATA_2.
    pub fn engine_data_2(&self) -> EngineData2 {
        EngineData2 {
            intake_temp: self.intake_temp,
            engine_load: self.engine_load,
        }
    }

    /// Transmission view for TRANS_DATA.
    pub fn trans_data(&self) -> TransData {
        TransData {
            gear: self.gear,
            fluid_temp: self.fluid_temp,
            vehicle_speed: self.vehicle_speed as u16,
        }
    }

    /// Body-control view for BCM_DATA.
    pub fn bcm_data(&self) -> BcmData {
        BcmData {
            fuel_level: self.fuel_level,
            odometer: self.odometer,
        }
    }
}
