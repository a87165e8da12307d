// Field descriptors: bit layout, scaling and role applicability of PDO/RDO fields
// Reference: USB Power Delivery Rev 3.1, section 6.4.1 and 6.4.2

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Every field name the codec can emit or consume.
///
/// The snake_case spelling doubles as the attribute file name under a
/// sysfs capability entry, so encoder input and decoder output share keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldName {
    Voltage,
    MaximumCurrent,
    OperationalCurrent,
    PeakCurrent,
    DualRolePower,
    UsbSuspendSupported,
    HigherCapability,
    UnconstrainedPower,
    UsbCommunicationCapable,
    DualRoleData,
    UnchunkedExtendedMessagesSupported,
    FastRoleSwapCurrent,
    EprModeCapable,
    MaximumAllowablePower,
    OperationalPower,
    MinimumVoltage,
    MaximumVoltage,
    PpsPowerLimited,
    Pdp,
    ObjectPosition,
    GivebackFlag,
    CapabilityMismatch,
    NoUsbSuspend,
    OperatingCurrent,
    MaximumOperatingCurrent,
    MinimumOperatingCurrent,
    OperatingPower,
    MaximumOperatingPower,
    MinimumOperatingPower,
    OutputVoltage,
}

impl FieldName {
    pub const ALL: [FieldName; 30] = [
        FieldName::Voltage,
        FieldName::MaximumCurrent,
        FieldName::OperationalCurrent,
        FieldName::PeakCurrent,
        FieldName::DualRolePower,
        FieldName::UsbSuspendSupported,
        FieldName::HigherCapability,
        FieldName::UnconstrainedPower,
        FieldName::UsbCommunicationCapable,
        FieldName::DualRoleData,
        FieldName::UnchunkedExtendedMessagesSupported,
        FieldName::FastRoleSwapCurrent,
        FieldName::EprModeCapable,
        FieldName::MaximumAllowablePower,
        FieldName::OperationalPower,
        FieldName::MinimumVoltage,
        FieldName::MaximumVoltage,
        FieldName::PpsPowerLimited,
        FieldName::Pdp,
        FieldName::ObjectPosition,
        FieldName::GivebackFlag,
        FieldName::CapabilityMismatch,
        FieldName::NoUsbSuspend,
        FieldName::OperatingCurrent,
        FieldName::MaximumOperatingCurrent,
        FieldName::MinimumOperatingCurrent,
        FieldName::OperatingPower,
        FieldName::MaximumOperatingPower,
        FieldName::MinimumOperatingPower,
        FieldName::OutputVoltage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldName::Voltage => "voltage",
            FieldName::MaximumCurrent => "maximum_current",
            FieldName::OperationalCurrent => "operational_current",
            FieldName::PeakCurrent => "peak_current",
            FieldName::DualRolePower => "dual_role_power",
            FieldName::UsbSuspendSupported => "usb_suspend_supported",
            FieldName::HigherCapability => "higher_capability",
            FieldName::UnconstrainedPower => "unconstrained_power",
            FieldName::UsbCommunicationCapable => "usb_communication_capable",
            FieldName::DualRoleData => "dual_role_data",
            FieldName::UnchunkedExtendedMessagesSupported => {
                "unchunked_extended_messages_supported"
            }
            FieldName::FastRoleSwapCurrent => "fast_role_swap_current",
            FieldName::EprModeCapable => "epr_mode_capable",
            FieldName::MaximumAllowablePower => "maximum_allowable_power",
            FieldName::OperationalPower => "operational_power",
            FieldName::MinimumVoltage => "minimum_voltage",
            FieldName::MaximumVoltage => "maximum_voltage",
            FieldName::PpsPowerLimited => "pps_power_limited",
            FieldName::Pdp => "pdp",
            FieldName::ObjectPosition => "object_position",
            FieldName::GivebackFlag => "giveback_flag",
            FieldName::CapabilityMismatch => "capability_mismatch",
            FieldName::NoUsbSuspend => "no_usb_suspend",
            FieldName::OperatingCurrent => "operating_current",
            FieldName::MaximumOperatingCurrent => "maximum_operating_current",
            FieldName::MinimumOperatingCurrent => "minimum_operating_current",
            FieldName::OperatingPower => "operating_power",
            FieldName::MaximumOperatingPower => "maximum_operating_power",
            FieldName::MinimumOperatingPower => "minimum_operating_power",
            FieldName::OutputVoltage => "output_voltage",
        }
    }

    /// Unit suffix carried by this field's textual attribute value
    pub fn unit(&self) -> Unit {
        match self {
            FieldName::Voltage
            | FieldName::MinimumVoltage
            | FieldName::MaximumVoltage
            | FieldName::OutputVoltage => Unit::Millivolt,
            FieldName::MaximumCurrent
            | FieldName::OperationalCurrent
            | FieldName::OperatingCurrent
            | FieldName::MaximumOperatingCurrent
            | FieldName::MinimumOperatingCurrent => Unit::Milliamp,
            FieldName::MaximumAllowablePower
            | FieldName::OperationalPower
            | FieldName::Pdp
            | FieldName::OperatingPower
            | FieldName::MaximumOperatingPower
            | FieldName::MinimumOperatingPower => Unit::Milliwatt,
            _ => Unit::None,
        }
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

lazy_static::lazy_static! {
    static ref FIELD_NAMES: HashMap<&'static str, FieldName> =
        FieldName::ALL.iter().map(|n| (n.as_str(), *n)).collect();
}

impl FromStr for FieldName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FIELD_NAMES
            .get(s)
            .copied()
            .ok_or_else(|| format!("Unknown field name: {}", s))
    }
}

/// Unit of a textual attribute value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Millivolt,
    Milliamp,
    Milliwatt,
    None,
}

impl Unit {
    pub fn suffix(&self) -> &'static str {
        match self {
            Unit::Millivolt => "mV",
            Unit::Milliamp => "mA",
            Unit::Milliwatt => "mW",
            Unit::None => "",
        }
    }
}

/// Role and grouping markers of a descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FieldFlags(u8);

impl FieldFlags {
    pub const NONE: Self = Self(0);
    /// First descriptor of a block
    pub const GROUP_START: Self = Self(0x01);
    /// Source capabilities only (RDO: giveback asserted)
    pub const SOURCE_ONLY: Self = Self(0x02);
    /// Sink capabilities only (RDO: giveback clear)
    pub const SINK_ONLY: Self = Self(0x04);
    /// Traversal may cross exactly one following block boundary
    pub const CONTINUE_GROUP: Self = Self(0x08);

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether a descriptor with these flags applies to the given role
    pub fn applies_to(self, source_side: bool) -> bool {
        if source_side {
            !self.contains(Self::SINK_ONLY)
        } else {
            !self.contains(Self::SOURCE_ONLY)
        }
    }
}

/// How raw bits turn into a displayed value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scale {
    Unitless,
    /// raw * multiplier hundredths of the natural unit
    LinearMilli(u16),
    /// (raw >> 1) * 25 hundredths of a volt
    HalvedQuarterVolt,
}

impl Scale {
    pub fn display(&self, raw: u32) -> DecimalFixed2 {
        match *self {
            Scale::Unitless => DecimalFixed2::Unitless(raw),
            Scale::LinearMilli(m) => DecimalFixed2::Hundredths(raw * u32::from(m)),
            Scale::HalvedQuarterVolt => DecimalFixed2::Hundredths((raw >> 1) * 25),
        }
    }

    /// Convert an attribute value (milli-units, or a bare count when
    /// unitless) into unmasked raw field bits
    pub fn to_raw(&self, value: u32) -> u32 {
        // one hundredth of a volt/amp/watt is ten milli-units
        match *self {
            Scale::Unitless => value,
            Scale::LinearMilli(m) => value / (u32::from(m) * 10),
            Scale::HalvedQuarterVolt => (value / 250) << 1,
        }
    }
}

/// Fixed-point display value with two fractional digits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecimalFixed2 {
    /// Plain integer, printed without a decimal point
    Unitless(u32),
    Hundredths(u32),
}

impl DecimalFixed2 {
    /// Value in thousandths of the natural unit (mV, mA, mW); unitless values pass through
    pub fn to_milli(&self) -> u32 {
        match *self {
            DecimalFixed2::Unitless(v) => v,
            DecimalFixed2::Hundredths(v) => v * 10,
        }
    }
}

impl fmt::Display for DecimalFixed2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            DecimalFixed2::Unitless(v) => write!(f, "{}", v),
            DecimalFixed2::Hundredths(v) => write!(f, "{}.{:02}", v / 100, v % 100),
        }
    }
}

impl Serialize for DecimalFixed2 {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One row of the static field table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub bit_offset: u8,
    pub bit_width: u8,
    pub flags: FieldFlags,
    pub scale: Scale,
    pub name: FieldName,
}

impl FieldDescriptor {
    pub const fn new(
        bit_offset: u8,
        bit_width: u8,
        flags: FieldFlags,
        scale: Scale,
        name: FieldName,
    ) -> Self {
        Self {
            bit_offset,
            bit_width,
            flags,
            scale,
            name,
        }
    }

    pub fn mask(&self) -> u32 {
        if self.bit_width >= 32 {
            u32::MAX
        } else {
            (1u32 << self.bit_width) - 1
        }
    }

    /// Raw bits of this field within `word`
    pub fn extract(&self, word: u32) -> u32 {
        (word >> self.bit_offset) & self.mask()
    }

    /// `raw` masked to the field width and shifted into position
    pub fn place(&self, raw: u32) -> u32 {
        (raw & self.mask()) << self.bit_offset
    }

    pub fn starts_group(&self) -> bool {
        self.flags.contains(FieldFlags::GROUP_START)
    }

    pub fn continues_group(&self) -> bool {
        self.flags.contains(FieldFlags::CONTINUE_GROUP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_display() {
        assert_eq!(Scale::LinearMilli(5).display(100).to_string(), "5.00");
        assert_eq!(Scale::LinearMilli(1).display(300).to_string(), "3.00");
        assert_eq!(Scale::LinearMilli(25).display(3).to_string(), "0.75");
        assert_eq!(Scale::LinearMilli(5).display(0).to_string(), "0.00");

        for raw in [0u32, 1, 7, 99, 101, 1023] {
            for m in [1u16, 2, 5, 10, 25, 100] {
                let v = raw * u32::from(m);
                assert_eq!(
                    Scale::LinearMilli(m).display(raw).to_string(),
                    format!("{}.{:02}", v / 100, v % 100)
                );
            }
        }
    }

    #[test]
    fn test_halved_quarter_volt_display() {
        assert_eq!(Scale::HalvedQuarterVolt.display(40).to_string(), "5.00");
        assert_eq!(Scale::HalvedQuarterVolt.display(41).to_string(), "5.00");
        assert_eq!(Scale::HalvedQuarterVolt.display(3).to_string(), "0.25");
    }

    #[test]
    fn test_unitless_display() {
        assert_eq!(Scale::Unitless.display(3).to_string(), "3");
        assert_eq!(Scale::Unitless.display(0).to_string(), "0");
    }

    #[test]
    fn test_to_raw_inverts_display() {
        assert_eq!(Scale::LinearMilli(5).to_raw(5000), 100);
        assert_eq!(Scale::LinearMilli(1).to_raw(3000), 300);
        assert_eq!(Scale::LinearMilli(25).to_raw(15000), 60);
        assert_eq!(Scale::LinearMilli(100).to_raw(140_000), 140);
        assert_eq!(Scale::HalvedQuarterVolt.to_raw(5000), 40);
        assert_eq!(Scale::Unitless.to_raw(2), 2);
    }

    #[test]
    fn test_field_name_lookup() {
        for name in FieldName::ALL {
            assert_eq!(name.as_str().parse::<FieldName>().unwrap(), name);
        }
        assert!("not_a_field".parse::<FieldName>().is_err());
        assert_eq!(FieldName::Pdp.unit(), Unit::Milliwatt);
        assert_eq!(FieldName::DualRoleData.unit(), Unit::None);
    }

    #[test]
    fn test_field_name_serde_matches_as_str() {
        let json = serde_json::to_string(&FieldName::UnchunkedExtendedMessagesSupported).unwrap();
        assert_eq!(json, "\"unchunked_extended_messages_supported\"");
    }

    #[test]
    fn test_flags() {
        let f = FieldFlags::GROUP_START.union(FieldFlags::SOURCE_ONLY);
        assert!(f.contains(FieldFlags::GROUP_START));
        assert!(!f.contains(FieldFlags::SINK_ONLY));
        assert!(f.applies_to(true));
        assert!(!f.applies_to(false));
        assert!(FieldFlags::NONE.applies_to(true));
        assert!(FieldFlags::NONE.applies_to(false));
    }

    #[test]
    fn test_extract_and_place() {
        let d = FieldDescriptor::new(10, 10, FieldFlags::NONE, Scale::LinearMilli(5), FieldName::Voltage);
        assert_eq!(d.place(100), 100 << 10);
        assert_eq!(d.extract(100 << 10), 100);
        assert_eq!(d.place(0x7ff), 0x3ff << 10);
    }
}
