mod config;
mod gateway;
mod policy;
mod util;

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::Instant,
};

use crate::config::{CPU_FAN, HDD_FAN};
use crate::gateway::IpmiGateway;
use crate::policy::{check_cpu_temp, check_hdd_temps, ControllerState, Gateway};

const VERSION: &str = "0.1.0";

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting ({})...", VERSION);

    let cpu_poll = config::poll_interval(config::CPU_POLL_ENV, config::CPU_POLL_DEFAULT_S);
    let hdd_poll = config::poll_interval(config::HDD_POLL_ENV, config::HDD_POLL_DEFAULT_S);
    log::info!("cpu poll every {:?}, hd poll every {:?}", cpu_poll, hdd_poll);

    let gw = IpmiGateway::new();
    let mut state = ControllerState::new();

    let continue_looping = Arc::new(AtomicBool::new(true));
    let continue_looping_handler_ref = continue_looping.clone();
    ctrlc::set_handler(move || {
        log::info!("stopping...");
        continue_looping_handler_ref.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl-C handler");

    log::info!(
        "initial hard drives: {}",
        gw.enumerate_disks()
            .iter()
            .map(|d| d.display().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );

    // main loop
    loop {
        if !continue_looping.load(Ordering::SeqCst) {
            break;
        }

        check_cpu_temp(&mut state, &gw);

        if state.last_hdd_poll.elapsed() >= hdd_poll {
            // Drives come and go, so enumerate fresh each cycle
            let hdds = gw.enumerate_disks();
            check_hdd_temps(&mut state, &gw, &hdds);
            // Reset after the evaluation completes, so a slow cycle cannot
            // re-trigger back to back
            state.last_hdd_poll = Instant::now();
        }

        thread::sleep(cpu_poll);
    }

    // Leave the chassis on default speeds rather than whatever tier was last
    if let Err(err) = gw.set_fan_speeds(CPU_FAN.default, HDD_FAN.default) {
        log::warn!("could not restore default fan speeds: {}", err);
    }
}
