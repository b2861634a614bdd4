//! Four-phase driving cycle
//!
//! Advances the vehicle state through a repeating 60 second pattern:
//! idle, accelerate, cruise, decelerate. Deterministic in (sim_time, dt);
//! no external inputs, no terminal state.

use crate::state::{VehicleState, GEAR_NEUTRAL};

/// Length of one full driving cycle, seconds.
pub const CYCLE_SECS: f64 = 60.0;

/// Driving-cycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// [0, 10) s: stationary, engine idling
    Idle,
    /// [10, 25) s: linear ramp through the gears
    Accelerate,
    /// [25, 45) s: top gear, signals oscillating around set-points
    Cruise,
    /// [45, 60) s: linear roll-down back to standstill
    Decelerate,
}

impl Phase {
    /// Phase active at the given position within the cycle.
    pub fn at(cycle_pos: f64) -> Self {
        if cycle_pos < 10.0 {
            Phase::Idle
        } else if cycle_pos < 25.0 {
            Phase::Accelerate
        } else if cycle_pos < 45.0 {
            Phase::Cruise
        } else {
            Phase::Decelerate
        }
    }
}

/// Advance the simulation by `dt` seconds.
///
/// Phase signals are functions of the new sim_time, so the state after a
/// call depends only on (sim_time, dt), not on the path taken to get
/// there. Derived signals are computed after the phase signals, in
/// dependency order.
pub fn advance(state: &mut VehicleState, dt: f64) {
    state.sim_time += dt;
    let t = state.sim_time as f32;
    let pos = state.sim_time % CYCLE_SECS;

    match Phase::at(pos) {
        Phase::Idle => {
            state.rpm = 800.0 + 50.0 * (t * 2.0).sin();
            state.throttle = 0.0;
            state.vehicle_speed = 0.0;
            state.gear = GEAR_NEUTRAL;
        }
        Phase::Accelerate => {
            let p = ((pos - 10.0) / 15.0) as f32;
            state.rpm = 800.0 + 4200.0 * p;
            state.throttle = 30.0 + 50.0 * p;
            state.vehicle_speed = 120.0 * p;
            state.gear = (1 + (p * 5.0) as i32).min(6) as u8;
        }
        Phase::Cruise => {
            state.rpm = 2500.0 + 200.0 * (t * 0.5).sin();
            state.throttle = 25.0 + 5.0 * (t * 0.3).sin();
            state.vehicle_speed = 100.0 + 10.0 * (t * 0.2).sin();
            state.gear = 6;
        }
        Phase::Decelerate => {
            let p = ((pos - 45.0) / 15.0) as f32;
            state.rpm = 2500.0 - 1700.0 * p;
            state.throttle = 25.0 * (1.0 - p);
            state.vehicle_speed = 100.0 * (1.0 - p);
            state.gear = (6 - (p * 5.0) as i32).max(0) as u8;
        }
    }

    // Load tracks throttle; MAF tracks rpm and load
    state.engine_load = state.throttle * 0.8 + 10.0;
    state.maf = (state.rpm / 1000.0) * (state.engine_load / 100.0) * 15.0;

    // Temperatures drift slowly
    state.coolant_temp = 85.0 + 10.0 * (t * 0.01).sin();
    state.fluid_temp = 70.0 + 20.0 * (state.engine_load / 100.0);
    state.intake_temp = 25.0 + 5.0 * (t * 0.05).sin();

    // Fuel burns down and wraps at 50 units consumed (refill)
    state.fuel_level = 75.0 - ((state.sim_time * 0.01) % 50.0) as f32;

    // Distance accrues in whole km per tick
    state.odometer += (state.vehicle_speed as f64 * dt / 3600.0) as u32;
}
