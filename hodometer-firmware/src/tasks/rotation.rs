//! Rotation sensing tasks
//!
//! Only one of these runs, selected by the `polled-sensor` feature. Both
//! only add to [`ROTATIONS`]; the session task drains it.

#[cfg(feature = "polled-sensor")]
use embassy_time::{Duration, Ticker};

use defmt::*;
use hodometer_hal_rp2040::HallInput;

use crate::channels::ROTATIONS;

/// Count every falling edge on the hall sensor pin
///
/// Woken straight from the GPIO interrupt. The counter is a single atomic
/// add, so the session task can be arbitrarily late without losing counts.
#[cfg(not(feature = "polled-sensor"))]
#[embassy_executor::task]
pub async fn rotation_irq_task(mut hall: HallInput<'static>) {
    info!("Rotation task started (edge interrupt)");

    loop {
        hall.wait_for_rotation().await;
        ROTATIONS.record_edge();
    }
}

/// Sample the hall sensor pin on a fixed interval
#[cfg(feature = "polled-sensor")]
#[embassy_executor::task]
pub async fn rotation_poll_task(hall: HallInput<'static>, poll_interval_ms: u32) {
    use hodometer_drivers::sensor::PolledHallSensor;

    info!("Rotation task started (polled every {} ms)", poll_interval_ms);

    let mut sensor = PolledHallSensor::new(hall);
    let mut ticker = Ticker::every(Duration::from_millis(poll_interval_ms as u64));

    loop {
        ticker.next().await;
        sensor.poll(&ROTATIONS);
    }
}
