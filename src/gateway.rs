use std::path::{Path, PathBuf};

use regex::Regex;

use crate::config;
use crate::policy::Gateway;
use crate::util;

#[derive(Debug, thiserror::Error)]
pub enum SensorReadError {
    #[error("failed to invoke {tool}: {reason}")]
    Invocation { tool: &'static str, reason: String },
    #[error("no temperature in {tool} output")]
    Parse { tool: &'static str },
}

#[derive(Debug, thiserror::Error)]
#[error("failed to invoke ipmitool: {reason}")]
pub struct ActuationError {
    pub reason: String,
}

/// Production gateway: ipmitool for the CPU sensor and the fan channels,
/// hddtemp for the drives.
pub struct IpmiGateway {
    cpu_temp_re: Regex,
    hdd_temp_re: Regex,
}

impl IpmiGateway {
    pub fn new() -> Self {
        // Temperatures are reported as 2-3 digit integers; anything else in
        // the matched position is a sensor fault, not a reading.
        Self {
            cpu_temp_re: Regex::new(r"(?m)^CPU\sTemp.*\|\s(\d{2,3})\sdegrees\sC$").unwrap(),
            hdd_temp_re: Regex::new(r"(\d{2,3})°C\s*$").unwrap(),
        }
    }

    fn extract_temp(re: &Regex, out: &str, tool: &'static str) -> Result<i32, SensorReadError> {
        re.captures(out)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok())
            .ok_or(SensorReadError::Parse { tool })
    }
}

impl Gateway for IpmiGateway {
    fn read_cpu_temperature(&self) -> Result<i32, SensorReadError> {
        let out = util::run_tool("ipmitool", &["sdr", "type", "Temperature"])
            .map_err(|reason| SensorReadError::Invocation { tool: "ipmitool", reason })?;
        Self::extract_temp(&self.cpu_temp_re, &out, "ipmitool")
    }

    fn read_disk_temperature(&self, dev: &Path) -> Result<i32, SensorReadError> {
        let dev = dev.to_string_lossy();
        let out = util::run_tool("hddtemp", &[dev.as_ref()])
            .map_err(|reason| SensorReadError::Invocation { tool: "hddtemp", reason })?;
        Self::extract_temp(&self.hdd_temp_re, &out, "hddtemp")
    }

    fn enumerate_disks(&self) -> Vec<PathBuf> {
        let mut hdds: Vec<PathBuf> = match glob::glob(config::HDD_GLOB) {
            Ok(paths) => paths.filter_map(Result::ok).collect(),
            Err(err) => {
                log::warn!("bad device glob {:?}: {}", config::HDD_GLOB, err);
                Vec::new()
            }
        };
        hdds.sort();
        hdds
    }

    /// ipmitool raw 0x3a 0x01 <cpu> <hdd>*7
    /// The controller addresses eight fixed channels: one CPU fan and seven
    /// disk fans, all disk channels at the same duty cycle.
    fn set_fan_speeds(&self, cpu_pct: u8, hdd_pct: u8) -> Result<(), ActuationError> {
        let cpu = format!("{:#04x}", cpu_pct);
        let hdd = format!("{:#04x}", hdd_pct);
        let mut args = vec!["raw", "0x3a", "0x01", cpu.as_str()];
        args.extend(std::iter::repeat(hdd.as_str()).take(7));

        log::debug!("setting fans to ({}%, {}%)", cpu_pct, hdd_pct);
        util::run_tool("ipmitool", &args)
            .map(|_| ())
            .map_err(|reason| ActuationError { reason })
    }
}
