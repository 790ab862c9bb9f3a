use serde::{Deserialize, Serialize};

/// Operating mode as exposed to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum HvacMode {
    #[display("cool")]
    Cool,
    #[display("heat")]
    Heat,
    #[display("fan_only")]
    FanOnly,
    #[display("dry")]
    Dry,
    #[display("off")]
    Off,
    #[display("auto")]
    Auto,
}

impl HvacMode {
    pub const ALL: [HvacMode; 6] = [
        HvacMode::Cool,
        HvacMode::Heat,
        HvacMode::FanOnly,
        HvacMode::Dry,
        HvacMode::Off,
        HvacMode::Auto,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum FanMode {
    #[display("low")]
    Low,
    #[display("medium")]
    Medium,
    #[display("high")]
    High,
}

impl FanMode {
    pub const ALL: [FanMode; 3] = [FanMode::Low, FanMode::Medium, FanMode::High];

    /// Token the device expects in `windSpeed`.
    pub fn vendor_token(&self) -> &'static str {
        match self {
            FanMode::Low => "low",
            FanMode::Medium => "mid",
            FanMode::High => "high",
        }
    }
}

/// Power takes precedence: a switched-off unit is always `Off`, whatever mode it reports.
pub fn hvac_mode_of(vendor_mode: &str, power_on: bool) -> HvacMode {
    if !power_on {
        return HvacMode::Off;
    }

    match vendor_mode {
        "cool" => HvacMode::Cool,
        "heat" => HvacMode::Heat,
        "fan" => HvacMode::FanOnly,
        "dehumidification" => HvacMode::Dry,
        "auto" => HvacMode::Auto,
        _ => HvacMode::Off,
    }
}

pub fn fan_mode_of(vendor_mode: &str) -> FanMode {
    match vendor_mode {
        "mid" => FanMode::Medium,
        "high" => FanMode::High,
        _ => FanMode::Low,
    }
}
