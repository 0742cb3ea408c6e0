//! VSYS monitoring task

use defmt::*;
use embassy_time::{Duration, Ticker};

use hodometer_drivers::sensor::VsysMonitor;
use hodometer_hal_rp2040::VsysAdc;

use crate::channels::VOLTAGE_READING;

/// Publish a VSYS reading every `poll_interval_ms`
#[embassy_executor::task]
pub async fn voltage_task(mut vsys: VsysMonitor<VsysAdc<'static>>, poll_interval_ms: u32) {
    info!("Voltage task started");

    let mut ticker = Ticker::every(Duration::from_millis(poll_interval_ms as u64));

    loop {
        ticker.next().await;

        match vsys.read_mv() {
            Ok(mv) => {
                trace!("VSYS {} mV", mv);
                VOLTAGE_READING.signal(mv);
            }
            Err(e) => warn!("VSYS read failed: {}", e),
        }
    }
}
