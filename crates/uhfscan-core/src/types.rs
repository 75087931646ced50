use crate::{
    Result,
    constants::{MAX_OUTPUT_POWER, MIN_OUTPUT_POWER},
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The consumer mode the inventory loop is currently serving.
///
/// Exactly one mode is active at a time. Holding the mode as a single enum
/// makes "two modes at once" unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatingMode {
    /// Loop runs but does not drain the reader buffer.
    #[default]
    Idle,

    /// Count and list every tag in range, reporting a read rate.
    ContinuousInventory,

    /// Follow one tag's signal strength and report when it disappears.
    Locate,

    /// Forward raw records to a read/write screen.
    LockRead,
}

impl OperatingMode {
    /// Whether the loop drains the reader buffer in this mode.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Idle)
    }

    /// Whether reads are bucketed into per-second rate windows.
    #[must_use]
    pub fn uses_rate_window(&self) -> bool {
        matches!(self, Self::ContinuousInventory)
    }

    /// Whether the loop watches for tag disappearance.
    #[must_use]
    pub fn reports_tag_lost(&self) -> bool {
        matches!(self, Self::Locate)
    }

    /// Whether power and custom read filters apply to pulled records.
    #[must_use]
    pub fn applies_read_gates(&self) -> bool {
        matches!(self, Self::ContinuousInventory | Self::Locate)
    }
}

impl fmt::Display for OperatingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::ContinuousInventory => "inventory",
            Self::Locate => "locate",
            Self::LockRead => "lock-read",
        };
        write!(f, "{name}")
    }
}

impl std::str::FromStr for OperatingMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "idle" => Ok(Self::Idle),
            "inventory" | "continuous_inventory" => Ok(Self::ContinuousInventory),
            "locate" | "search" => Ok(Self::Locate),
            "lock-read" | "lock_read" => Ok(Self::LockRead),
            other => Err(Error::InvalidMode(other.to_string())),
        }
    }
}

/// Reader module family.
///
/// Module identity decides how signal strength is encoded and whether a
/// temperature is reported. It is detected once when the reader is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleKind {
    /// UM series, hex RSSI.
    Um,

    /// UM510 variant of the UM series, hex RSSI with a shifted proximity scale.
    Um510,

    /// RM series, hex RSSI and chip temperature.
    Rm,

    /// SLR series, decimal RSSI.
    Slr,

    /// GX series, decimal RSSI.
    Gx,
}

impl ModuleKind {
    /// Get a human-readable name for the module.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Um => "UM",
            Self::Um510 => "UM510",
            Self::Rm => "RM",
            Self::Slr => "SLR",
            Self::Gx => "GX",
        }
    }

    /// Whether the module reports RSSI as a 4-digit hex word.
    pub fn has_hex_rssi(&self) -> bool {
        matches!(self, Self::Um | Self::Um510 | Self::Rm)
    }

    /// Whether records from this module carry a temperature.
    pub fn reports_temperature(&self) -> bool {
        matches!(self, Self::Rm)
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ModuleKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "UM" => Ok(Self::Um),
            "UM510" => Ok(Self::Um510),
            "RM" => Ok(Self::Rm),
            "SLR" => Ok(Self::Slr),
            "GX" => Ok(Self::Gx),
            other => Err(Error::UnknownModule(other.to_string())),
        }
    }
}

/// Reader transmit power in dBm.
///
/// Zero is a valid setting meaning "do not read": the engine drops every
/// record while it is configured. Values between 1 and the module minimum
/// are raised to the minimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct OutputPower(u8);

impl OutputPower {
    /// Reading disabled.
    pub const OFF: Self = Self(0);

    /// Create a power setting, normalising low values.
    ///
    /// # Errors
    /// Returns `Error::InvalidPower` if the value exceeds the module maximum.
    ///
    /// # Examples
    ///
    /// ```
    /// use uhfscan_core::OutputPower;
    ///
    /// assert_eq!(OutputPower::new(2).unwrap().dbm(), 5);
    /// assert!(OutputPower::new(0).unwrap().is_off());
    /// assert!(OutputPower::new(40).is_err());
    /// ```
    pub fn new(dbm: u8) -> Result<Self> {
        if dbm > MAX_OUTPUT_POWER {
            return Err(Error::InvalidPower {
                value: dbm,
                max: MAX_OUTPUT_POWER,
            });
        }
        if dbm == 0 {
            return Ok(Self::OFF);
        }
        Ok(Self(dbm.max(MIN_OUTPUT_POWER)))
    }

    /// Power in dBm.
    #[must_use]
    pub fn dbm(&self) -> u8 {
        self.0
    }

    /// Whether reading is disabled.
    #[must_use]
    pub fn is_off(&self) -> bool {
        self.0 == 0
    }
}

impl Default for OutputPower {
    fn default() -> Self {
        Self(crate::constants::DEFAULT_OUTPUT_POWER)
    }
}

impl TryFrom<u8> for OutputPower {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Self::new(value)
    }
}

impl From<OutputPower> for u8 {
    fn from(power: OutputPower) -> Self {
        power.0
    }
}

impl fmt::Display for OutputPower {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} dBm", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("idle", OperatingMode::Idle)]
    #[case("inventory", OperatingMode::ContinuousInventory)]
    #[case("Locate", OperatingMode::Locate)]
    #[case("search", OperatingMode::Locate)]
    #[case("lock-read", OperatingMode::LockRead)]
    fn test_mode_parse(#[case] input: &str, #[case] expected: OperatingMode) {
        let mode: OperatingMode = input.parse().unwrap();
        assert_eq!(mode, expected);
    }

    #[test]
    fn test_mode_parse_unknown() {
        let result: Result<OperatingMode> = "scan".parse();
        assert!(matches!(result, Err(Error::InvalidMode(_))));
    }

    #[test]
    fn test_mode_capabilities() {
        assert!(!OperatingMode::Idle.is_active());
        assert!(OperatingMode::ContinuousInventory.uses_rate_window());
        assert!(!OperatingMode::Locate.uses_rate_window());
        assert!(OperatingMode::Locate.reports_tag_lost());
        assert!(!OperatingMode::LockRead.reports_tag_lost());
        assert!(!OperatingMode::LockRead.uses_rate_window());
        assert!(!OperatingMode::LockRead.applies_read_gates());
        assert_eq!(OperatingMode::default(), OperatingMode::Idle);
    }

    #[test]
    fn test_mode_display_roundtrip() {
        for mode in [
            OperatingMode::Idle,
            OperatingMode::ContinuousInventory,
            OperatingMode::Locate,
            OperatingMode::LockRead,
        ] {
            let parsed: OperatingMode = mode.to_string().parse().unwrap();
            assert_eq!(parsed, mode);
        }
    }

    #[rstest]
    #[case("um", ModuleKind::Um)]
    #[case("UM510", ModuleKind::Um510)]
    #[case("rm", ModuleKind::Rm)]
    #[case("SLR", ModuleKind::Slr)]
    #[case("gx", ModuleKind::Gx)]
    fn test_module_parse(#[case] input: &str, #[case] expected: ModuleKind) {
        assert_eq!(input.parse::<ModuleKind>().unwrap(), expected);
    }

    #[test]
    fn test_module_capabilities() {
        assert!(ModuleKind::Um.has_hex_rssi());
        assert!(!ModuleKind::Slr.has_hex_rssi());
        assert!(ModuleKind::Rm.reports_temperature());
        assert!(!ModuleKind::Um.reports_temperature());
        assert!("R2000".parse::<ModuleKind>().is_err());
    }

    #[rstest]
    #[case(0, 0)]
    #[case(1, 5)]
    #[case(4, 5)]
    #[case(5, 5)]
    #[case(25, 25)]
    #[case(33, 33)]
    fn test_output_power_normalised(#[case] input: u8, #[case] expected: u8) {
        assert_eq!(OutputPower::new(input).unwrap().dbm(), expected);
    }

    #[test]
    fn test_output_power_too_high() {
        assert_eq!(
            OutputPower::new(34),
            Err(Error::InvalidPower { value: 34, max: 33 })
        );
    }

    #[test]
    fn test_output_power_serde() {
        let power: OutputPower = serde_json::from_str("3").unwrap();
        assert_eq!(power.dbm(), 5);
        assert!(serde_json::from_str::<OutputPower>("50").is_err());
        assert_eq!(serde_json::to_string(&OutputPower::OFF).unwrap(), "0");
    }
}
