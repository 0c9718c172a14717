use std::time::Duration;

use crate::policy::FanLevel;

/// CPU polling rate
/// How often we re-read the CPU temperature and re-evaluate override
pub const CPU_POLL_DEFAULT_S: u64 = 5;

/// Disk polling rate
/// Disk temperatures move slowly and hddtemp wakes the bus, so poll rarely
pub const HDD_POLL_DEFAULT_S: u64 = 60;

/// Env vars overriding the two poll intervals at startup (whole seconds)
pub const CPU_POLL_ENV: &str = "FANCONTROLD_CPU_POLL_S";
pub const HDD_POLL_ENV: &str = "FANCONTROLD_HDD_POLL_S";

/// Glob matched against block device nodes before every disk evaluation
pub const HDD_GLOB: &str = "/dev/sd?";

pub struct Thresholds {
    /// Below this the CPU override disengages
    pub cpu_normal: i32,
    /// Above this the CPU override engages and all fans go to high
    pub cpu_override: i32,
    pub hdd_low: i32,
    pub hdd_medium_low: i32,
    pub hdd_medium_high: i32,
    pub hdd_high: i32,
}

/// Invariants: hdd_low < hdd_medium_low < hdd_medium_high < hdd_high,
/// and cpu_normal < cpu_override
pub const THRESHOLDS: Thresholds = Thresholds {
    cpu_normal: 60,
    cpu_override: 69,
    hdd_low: 38,
    hdd_medium_low: 39,
    hdd_medium_high: 40,
    hdd_high: 41,
};

/// Duty cycle (% of max) per tier, for one fan group
pub struct FanPercents {
    pub low: u8,
    pub medium_low: u8,
    pub medium_high: u8,
    pub high: u8,
    pub default: u8,
}

impl FanPercents {
    pub const fn at(&self, level: FanLevel) -> u8 {
        match level {
            FanLevel::Low => self.low,
            FanLevel::MediumLow => self.medium_low,
            FanLevel::MediumHigh => self.medium_high,
            FanLevel::High => self.high,
            FanLevel::Default => self.default,
        }
    }
}

pub const CPU_FAN: FanPercents = FanPercents {
    low: 25,
    medium_low: 50,
    medium_high: 75,
    high: 100,
    default: 100,
};

pub const HDD_FAN: FanPercents = FanPercents {
    low: 25,
    medium_low: 50,
    medium_high: 75,
    high: 100,
    default: 100,
};

/// Read a poll interval from the environment, falling back to the default.
pub fn poll_interval(env_var: &str, default_s: u64) -> Duration {
    let secs = std::env::var(env_var)
        .ok()
        .and_then(|v| match v.parse() {
            Ok(s) => Some(s),
            Err(err) => {
                log::warn!("ignoring {}={:?}: {}", env_var, v, err);
                None
            }
        })
        .unwrap_or(default_s);
    Duration::from_secs(secs)
}
