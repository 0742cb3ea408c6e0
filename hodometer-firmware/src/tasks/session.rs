//! Session task
//!
//! The single main loop. It is the only caller of the session engine and,
//! through it, the only writer of the record store:
//!
//! ```text
//!  ROTATIONS ──┐
//!  VOLTAGE ────┼──► session_task ──► flash
//!  REQUESTS ───┘         │
//!                        ├──► LIVE_REPORT
//!                        └──► SESSION_LIST
//! ```

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_time::{Duration, Ticker};

use hodometer_core::session::SessionEngine;
use hodometer_hal_rp2040::{Rp2040Interrupts, Rp2040SectorFlash};

use super::uptime_ms;
use crate::channels::{
    SessionRequest, LIVE_REPORT, ROTATIONS, SESSION_LIST, SESSION_REQUESTS, VOLTAGE_READING,
};

/// Session engine on the RP2040 flash
pub type Engine = SessionEngine<Rp2040SectorFlash<'static>, Rp2040Interrupts>;

/// Speed samples and live reports go out at this rate
const REPORT_INTERVAL_MS: u32 = 1_000;

#[embassy_executor::task]
pub async fn session_task(mut engine: Engine, poll_interval_ms: u32) {
    info!("Session task started");

    let mut ticker = Ticker::every(Duration::from_millis(poll_interval_ms as u64));
    let mut last_report_ms = uptime_ms();

    loop {
        match select(ticker.next(), SESSION_REQUESTS.receive()).await {
            Either::First(()) => {
                let now_ms = uptime_ms();
                tick(&mut engine, now_ms);

                if now_ms.wrapping_sub(last_report_ms) >= REPORT_INTERVAL_MS {
                    last_report_ms = now_ms;
                    engine.sample_speed(now_ms);
                    LIVE_REPORT.signal(engine.live_report());
                }
            }
            Either::Second(request) => handle_request(&mut engine, request),
        }
    }
}

fn tick(engine: &mut Engine, now_ms: u32) {
    let rotations = ROTATIONS.take();
    if let Err(e) = engine.tick(rotations, now_ms) {
        error!("rotation save failed: {}", e);
    }

    if let Some(mv) = VOLTAGE_READING.try_take() {
        if let Err(e) = engine.on_voltage(mv, now_ms) {
            error!("low-voltage save failed: {}", e);
        }
    }
}

fn handle_request(engine: &mut Engine, request: SessionRequest) {
    let now_ms = uptime_ms();

    match request {
        SessionRequest::Command(command) => {
            debug!("command: {}", command);
            if let Err(e) = engine.apply(command, now_ms) {
                error!("command {} failed: {}", command, e);
            }
            // Whatever changed should be visible on the next read
            LIVE_REPORT.signal(engine.live_report());
        }
        SessionRequest::ListSessions => {
            let list = engine.session_list();
            debug!("{} unreported session(s)", list.len());
            SESSION_LIST.signal(list);
        }
    }
}
