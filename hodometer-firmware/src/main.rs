//! Hodometer - Rotation Odometer Firmware
//!
//! Main firmware binary for RP2040-based rotation counters. Counts wheel
//! rotations from a hall sensor and keeps a session ledger on raw flash
//! that survives brown-outs and reboots.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use {defmt_rtt as _, panic_probe as _};

use hodometer_core::session::SessionEngine;
use hodometer_core::storage::RecordStore;
use hodometer_drivers::sensor::VsysMonitor;
use hodometer_hal_rp2040::{HallInput, Rp2040Interrupts, Rp2040SectorFlash, VsysAdc};

mod channels;
mod config;
mod tasks;

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Hodometer firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = config::load_config();

    // Rebuild the session ledger before anything can count
    let flash = Rp2040SectorFlash::new(p.FLASH);
    let store = RecordStore::new(flash, Rp2040Interrupts::new(), config.storage.slot_count);
    let engine = SessionEngine::boot(store, config, tasks::uptime_ms());
    info!("Session ledger ready, next write index {}", engine.next_write_index());

    // Hall sensor on GPIO22 (board-specific)
    let hall = HallInput::new(p.PIN_22);

    // VSYS/3 on GPIO29 (ADC3)
    let vsys = VsysMonitor::new(VsysAdc::new(p.ADC, p.PIN_29), config.power.glitch_floor_mv);

    #[cfg(not(feature = "polled-sensor"))]
    spawner.spawn(tasks::rotation_irq_task(hall)).unwrap();
    #[cfg(feature = "polled-sensor")]
    spawner
        .spawn(tasks::rotation_poll_task(hall, config.sensor.poll_interval_ms))
        .unwrap();
    spawner
        .spawn(tasks::voltage_task(vsys, config.power.poll_interval_ms))
        .unwrap();
    spawner
        .spawn(tasks::session_task(engine, config.sensor.poll_interval_ms))
        .unwrap();

    info!("All tasks spawned, firmware running");
}
