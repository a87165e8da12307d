// One-line human summaries of scraped capabilities

use super::scan::CapabilityEntry;
use crate::codec::{FieldName, PdoVariant};

/// Milli-units as `whole.hundredths`
fn milli(v: u32) -> String {
    format!("{}.{:02}", v / 1000, (v % 1000) / 10)
}

/// Summarize a capability from its attributes, e.g.
/// `fixed: 5.00 Volts, 3.00 Amps (max)`. Empty when there is nothing to say.
pub fn summary(entry: &CapabilityEntry) -> String {
    let a = &entry.attrs;
    if a.is_empty() {
        return String::new();
    }
    let limit = if entry.is_source { "max" } else { "op" };
    let current = if entry.is_source {
        FieldName::MaximumCurrent
    } else {
        FieldName::OperationalCurrent
    };
    let min_v = a.value_or_zero(FieldName::MinimumVoltage);
    let max_v = a.value_or_zero(FieldName::MaximumVoltage);

    match entry.variant {
        PdoVariant::Fixed => format!(
            "fixed: {} Volts, {} Amps ({})",
            milli(a.value_or_zero(FieldName::Voltage)),
            milli(a.value_or_zero(current)),
            limit
        ),
        PdoVariant::Battery => {
            let power = if entry.is_source {
                FieldName::MaximumAllowablePower
            } else {
                FieldName::OperationalPower
            };
            format!(
                "battery: {} to {} Volts, {} Watts ({})",
                milli(min_v),
                milli(max_v),
                milli(a.value_or_zero(power)),
                limit
            )
        }
        PdoVariant::Variable => format!(
            "variable: {} to {} Volts, {} Amps ({})",
            milli(min_v),
            milli(max_v),
            milli(a.value_or_zero(current)),
            limit
        ),
        PdoVariant::Pps => {
            let limited = entry.is_source && a.value_or_zero(FieldName::PpsPowerLimited) != 0;
            format!(
                "pps: {} to {} Volts, {} Amps (max){}",
                milli(min_v),
                milli(max_v),
                milli(a.value_or_zero(FieldName::MaximumCurrent)),
                if limited { " [PL]" } else { "" }
            )
        }
        PdoVariant::SprAvs | PdoVariant::EprAvs => format!(
            "avs: {} to {} Volts, {} Watts, Peak current setting {}",
            milli(min_v),
            milli(max_v),
            milli(a.value_or_zero(FieldName::Pdp)),
            a.value_or_zero(FieldName::PeakCurrent)
        ),
        PdoVariant::Null => String::new(),
    }
}
