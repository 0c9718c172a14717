use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::{CPU_FAN, HDD_FAN, THRESHOLDS};
use crate::gateway::{ActuationError, SensorReadError};

/// Named fan tier, mapped to a duty cycle per group via config::FanPercents
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FanLevel {
    Low,
    MediumLow,
    MediumHigh,
    High,
    Default,
}

/// Everything the controller mutates across ticks.
/// Owned by the scheduler loop, handed to the evaluation procedures by &mut.
pub struct ControllerState {
    pub cpu_override_active: bool,
    pub current_cpu_level: FanLevel,
    pub current_hdd_level: FanLevel,
    pub last_hdd_poll: Instant,
}

impl ControllerState {
    pub fn new() -> Self {
        Self {
            cpu_override_active: false,
            current_cpu_level: FanLevel::Default,
            current_hdd_level: FanLevel::Default,
            last_hdd_poll: Instant::now(),
        }
    }
}

/// Boundary to the management controller and the disk temperature tool.
/// All calls block the scheduler thread; a hang here stalls the whole loop,
/// including the CPU fail-safe path (accepted, there is no timeout layer).
pub trait Gateway {
    fn read_cpu_temperature(&self) -> Result<i32, SensorReadError>;
    fn read_disk_temperature(&self, dev: &Path) -> Result<i32, SensorReadError>;
    /// Lexicographically sorted; empty on no match, never fails
    fn enumerate_disks(&self) -> Vec<PathBuf>;
    fn set_fan_speeds(&self, cpu_pct: u8, hdd_pct: u8) -> Result<(), ActuationError>;
}

/// CPU override evaluation, run every fast tick.
///
/// Edge-triggered: acts only on the transition into or out of override, not
/// on every tick spent inside a mode. Entry above cpu_override and exit below
/// cpu_normal use two distinct thresholds so readings wandering between them
/// cannot toggle the fans (hysteresis). Both comparisons are strict.
pub fn check_cpu_temp(state: &mut ControllerState, gw: &impl Gateway) {
    let cur_temp = match gw.read_cpu_temperature() {
        Ok(t) => t,
        Err(err) => {
            // Fail safe: max out every fan, but record no transition so the
            // next tick re-attempts normal evaluation.
            log::warn!("cpu temp detection failure ({}), all fans set to 100%", err);
            actuate(gw, CPU_FAN.high, HDD_FAN.high);
            return;
        }
    };
    log::debug!("current cpu temp: {}C", cur_temp);

    if cur_temp > THRESHOLDS.cpu_override && !state.cpu_override_active {
        actuate(gw, CPU_FAN.high, HDD_FAN.high);
        state.cpu_override_active = true;
        log::info!("cpu temp > {}C, all fans set to 100%", THRESHOLDS.cpu_override);
    } else if cur_temp < THRESHOLDS.cpu_normal && state.cpu_override_active {
        // Return to whatever the tier policy last chose, not to defaults
        let cpu_pct = CPU_FAN.at(state.current_cpu_level);
        let hdd_pct = HDD_FAN.at(state.current_hdd_level);
        actuate(gw, cpu_pct, hdd_pct);
        state.cpu_override_active = false;
        log::info!(
            "cpu temp < {}C, cpu fan set to {}%, hd fans set to {}%",
            THRESHOLDS.cpu_normal,
            cpu_pct,
            hdd_pct
        );
    }
}

/// Disk tier evaluation, run every slow cycle with a freshly enumerated set.
///
/// Level-triggered, unlike the CPU path: every cycle whose readings match a
/// rule re-issues the fan command, even if the tier did not change. The two
/// middle tiers match on exact equality, as the tier table documents.
pub fn check_hdd_temps(state: &mut ControllerState, gw: &impl Gateway, hdds: &[PathBuf]) {
    if state.cpu_override_active {
        log::info!("cpu temp override active, no action taken on hd fans");
        return;
    }

    let mut hdtemps = Vec::with_capacity(hdds.len());
    for hdd in hdds {
        match gw.read_disk_temperature(hdd) {
            Ok(t) => hdtemps.push(t),
            Err(err) => {
                // One unreadable drive aborts the whole cycle; the previous
                // tier survives and this cycle only fails safe.
                log::warn!(
                    "hd temp detection failure on {} ({}), all fans set to 100%",
                    hdd.display(),
                    err
                );
                actuate(gw, CPU_FAN.high, HDD_FAN.high);
                return;
            }
        }
    }
    log::debug!("current hd temps: {:?}", hdtemps);

    let tier = select_hdd_tier(&hdtemps);

    if let Some(tier) = tier {
        state.current_hdd_level = tier;
        let cpu_pct = CPU_FAN.at(state.current_cpu_level);
        let hdd_pct = HDD_FAN.at(tier);
        actuate(gw, cpu_pct, hdd_pct);
        log::info!("hd tier {:?}, hd fans set to {}%", tier, hdd_pct);
    }
}

/// Tier rules in fixed priority order. The medium tiers intentionally match
/// exact integer temperatures only; readings in the gaps (and the empty set)
/// select nothing and leave the current tier in force.
fn select_hdd_tier(hdtemps: &[i32]) -> Option<FanLevel> {
    if hdtemps.iter().any(|&t| t >= THRESHOLDS.hdd_high) {
        Some(FanLevel::High)
    } else if hdtemps.iter().any(|&t| t == THRESHOLDS.hdd_medium_high) {
        Some(FanLevel::MediumHigh)
    } else if hdtemps.iter().any(|&t| t == THRESHOLDS.hdd_medium_low) {
        Some(FanLevel::MediumLow)
    } else if !hdtemps.is_empty() && hdtemps.iter().all(|&t| t <= THRESHOLDS.hdd_low) {
        Some(FanLevel::Low)
    } else {
        None
    }
}

/// Best effort: there is no feedback channel to verify actuation, so a failed
/// command is logged and the caller carries on as if it succeeded.
fn actuate(gw: &impl Gateway, cpu_pct: u8, hdd_pct: u8) {
    if let Err(err) = gw.set_fan_speeds(cpu_pct, hdd_pct) {
        log::warn!("failed setting fans to ({}%, {}%): {}", cpu_pct, hdd_pct, err);
    }
}
