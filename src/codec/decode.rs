// PDO/RDO decoder: packed word -> named, scaled fields

use super::classify::classify_pdo_with;
use super::fields::{DecimalFixed2, FieldName};
use super::table::{lookup_block, lookup_rdo_block, BlockHandle};
use super::types::{PdoContext, PdoVariant, RdoReference};
use serde::Serialize;
use std::fmt;

/// RDO GiveBack flag; selects which operating-current/power limit is present
pub const GIVEBACK_BIT: u32 = 1 << 27;

/// One decoded field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DecodedField {
    pub name: FieldName,
    pub raw_bits: u32,
    pub display_value: DecimalFixed2,
}

impl fmt::Display for DecodedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.display_value)
    }
}

/// Decode a PDO word with the default AVS convention
pub fn decode_pdo(
    word: u32,
    object_index_is_one: bool,
    is_source_capability: bool,
) -> Vec<DecodedField> {
    let ctx = PdoContext {
        object_index_is_one,
        is_source: is_source_capability,
        ..Default::default()
    };
    decode_pdo_with(word, &ctx)
}

/// Decode a PDO word. The Null filler and words without a block decode to
/// no fields.
pub fn decode_pdo_with(word: u32, ctx: &PdoContext) -> Vec<DecodedField> {
    let variant = classify_pdo_with(word, ctx.avs);
    if variant == PdoVariant::Null {
        tracing::debug!("PDO 0x{:08x} is a null filler, nothing to decode", word);
        return Vec::new();
    }
    let block = lookup_block(variant, ctx.object_index_is_one).for_side(ctx.is_source);
    decode_block(word, block)
}

/// Decode an RDO word against the PDO type it references
pub fn decode_rdo(word: u32, reference: RdoReference) -> Vec<DecodedField> {
    let giveback = word & GIVEBACK_BIT != 0;
    decode_block(word, lookup_rdo_block(reference, giveback))
}

fn decode_block(word: u32, block: BlockHandle) -> Vec<DecodedField> {
    block
        .fields()
        .map(|desc| {
            let raw_bits = desc.extract(word);
            DecodedField {
                name: desc.name,
                raw_bits,
                display_value: desc.scale.display(raw_bits),
            }
        })
        .collect()
}

/// Find a field by name in decoder output
pub fn find_field(fields: &[DecodedField], name: FieldName) -> Option<&DecodedField> {
    fields.iter().find(|f| f.name == name)
}

/// Render decoder output as `name=value` lines
pub fn render_lines(fields: &[DecodedField]) -> String {
    fields.iter().map(|f| format!("{}\n", f)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::types::AvsConvention;
    use std::collections::HashSet;

    fn value_of(fields: &[DecodedField], name: FieldName) -> Option<String> {
        find_field(fields, name).map(|f| f.display_value.to_string())
    }

    #[test]
    fn test_decode_fixed_source() {
        // 5 V, 3 A
        let fields = decode_pdo(0x0001_912c, false, true);
        assert_eq!(
            render_lines(&fields),
            "voltage=5.00\nmaximum_current=3.00\npeak_current=0\n"
        );
    }

    #[test]
    fn test_decode_fixed_sink() {
        let fields = decode_pdo(0x0001_912c, false, false);
        assert_eq!(render_lines(&fields), "voltage=5.00\noperational_current=3.00\n");
    }

    #[test]
    fn test_first_object_shared_and_role_bits() {
        let word = 0x0001_912c | (1 << 27) | (1 << 28);

        let src = decode_pdo(word, true, true);
        let snk = decode_pdo(word, true, false);

        assert_eq!(value_of(&src, FieldName::UnconstrainedPower).as_deref(), Some("1"));
        assert_eq!(value_of(&snk, FieldName::UnconstrainedPower).as_deref(), Some("1"));

        assert_eq!(value_of(&src, FieldName::UsbSuspendSupported).as_deref(), Some("1"));
        assert!(find_field(&src, FieldName::HigherCapability).is_none());

        assert_eq!(value_of(&snk, FieldName::HigherCapability).as_deref(), Some("1"));
        assert!(find_field(&snk, FieldName::UsbSuspendSupported).is_none());
    }

    #[test]
    fn test_first_object_fields_absent_otherwise() {
        let word = 0x0001_912c | (1 << 27);
        let fields = decode_pdo(word, false, true);
        assert!(find_field(&fields, FieldName::UnconstrainedPower).is_none());
        assert!(find_field(&fields, FieldName::DualRolePower).is_none());
    }

    #[test]
    fn test_first_object_sink_fast_role_swap() {
        let word = 0x0001_912c | (2 << 23) | (1 << 25);
        let fields = decode_pdo(word, true, false);
        let f = find_field(&fields, FieldName::FastRoleSwapCurrent).unwrap();
        assert_eq!(f.raw_bits, 2);
        assert_eq!(value_of(&fields, FieldName::DualRoleData).as_deref(), Some("1"));
        assert!(find_field(&fields, FieldName::EprModeCapable).is_none());
    }

    #[test]
    fn test_decode_battery() {
        // 5..21 V, 15 W
        let word = (1 << 30) | (420 << 20) | (100 << 10) | 60;
        let fields = decode_pdo(word, false, true);
        assert_eq!(
            render_lines(&fields),
            "maximum_allowable_power=15.00\nminimum_voltage=5.00\nmaximum_voltage=21.00\n"
        );
        let fields = decode_pdo(word, false, false);
        assert_eq!(value_of(&fields, FieldName::OperationalPower).as_deref(), Some("15.00"));
    }

    #[test]
    fn test_decode_variable() {
        let word = (2 << 30) | (240 << 20) | (100 << 10) | 150;
        let fields = decode_pdo(word, false, false);
        assert_eq!(
            render_lines(&fields),
            "operational_current=1.50\nminimum_voltage=5.00\nmaximum_voltage=12.00\n"
        );
    }

    #[test]
    fn test_decode_pps() {
        // 3.3..21 V, 3 A, power limited
        let word = (3 << 30) | (1 << 27) | (210 << 17) | (33 << 8) | 60;
        let fields = decode_pdo(word, false, true);
        assert_eq!(
            render_lines(&fields),
            "maximum_current=3.00\nminimum_voltage=3.30\nmaximum_voltage=21.00\npps_power_limited=1\n"
        );
        let fields = decode_pdo(word, false, false);
        assert!(find_field(&fields, FieldName::PpsPowerLimited).is_none());
    }

    #[test]
    fn test_decode_epr_avs() {
        // 15..48 V, 140 W
        let word = (3 << 30) | (1 << 28) | (1 << 26) | (480 << 17) | (150 << 8) | 140;
        let fields = decode_pdo(word, false, true);
        assert_eq!(
            render_lines(&fields),
            "pdp=140.00\nminimum_voltage=15.00\nmaximum_voltage=48.00\npeak_current=1\n"
        );
    }

    #[test]
    fn test_decode_spr_avs_by_convention() {
        let word = (3 << 30) | (1 << 28) | (200 << 17) | (90 << 8) | 45;
        let ctx = PdoContext::sink().with_avs(AvsConvention::Spr);
        let fields = decode_pdo_with(word, &ctx);
        assert_eq!(
            render_lines(&fields),
            "pdp=45.00\nminimum_voltage=9.00\nmaximum_voltage=20.00\n"
        );
    }

    #[test]
    fn test_null_decodes_to_nothing() {
        assert!(decode_pdo(0, true, true).is_empty());
        assert!(decode_pdo(0, false, false).is_empty());
    }

    #[test]
    fn test_rdo_giveback_partitions_block() {
        let base = (2 << 28) | (150 << 10) | 200;
        let with_gb: HashSet<FieldName> = decode_rdo(base | GIVEBACK_BIT, RdoReference::FixedOrVariable)
            .iter()
            .map(|f| f.name)
            .collect();
        let without_gb: HashSet<FieldName> = decode_rdo(base, RdoReference::FixedOrVariable)
            .iter()
            .map(|f| f.name)
            .collect();

        assert!(with_gb.contains(&FieldName::MinimumOperatingCurrent));
        assert!(!with_gb.contains(&FieldName::MaximumOperatingCurrent));
        assert!(without_gb.contains(&FieldName::MaximumOperatingCurrent));
        assert!(!without_gb.contains(&FieldName::MinimumOperatingCurrent));

        let only_gb: HashSet<_> = with_gb.difference(&without_gb).copied().collect();
        let only_no_gb: HashSet<_> = without_gb.difference(&with_gb).copied().collect();
        assert!(only_gb.is_disjoint(&only_no_gb));

        let block: HashSet<FieldName> = lookup_rdo_block(RdoReference::FixedOrVariable, false)
            .descriptors()
            .map(|d| d.name)
            .collect();
        let union: HashSet<FieldName> = with_gb.union(&without_gb).copied().collect();
        assert_eq!(union, block);
    }

    #[test]
    fn test_decode_fixed_rdo_values() {
        let word = (1 << 28) | (1 << 25) | (150 << 10) | 200;
        let fields = decode_rdo(word, RdoReference::FixedOrVariable);
        assert_eq!(value_of(&fields, FieldName::ObjectPosition).as_deref(), Some("1"));
        assert_eq!(value_of(&fields, FieldName::GivebackFlag).as_deref(), Some("0"));
        assert_eq!(
            value_of(&fields, FieldName::UsbCommunicationCapable).as_deref(),
            Some("1")
        );
        assert_eq!(value_of(&fields, FieldName::OperatingCurrent).as_deref(), Some("1.50"));
        assert_eq!(
            value_of(&fields, FieldName::MaximumOperatingCurrent).as_deref(),
            Some("2.00")
        );
    }

    #[test]
    fn test_decode_battery_rdo_giveback() {
        let word = (3 << 28) | GIVEBACK_BIT | (60 << 10) | 20;
        let fields = decode_rdo(word, RdoReference::Battery);
        assert_eq!(value_of(&fields, FieldName::OperatingPower).as_deref(), Some("15.00"));
        assert_eq!(
            value_of(&fields, FieldName::MinimumOperatingPower).as_deref(),
            Some("5.00")
        );
        assert!(find_field(&fields, FieldName::MaximumOperatingPower).is_none());
    }

    #[test]
    fn test_decode_pps_rdo() {
        // 9 V in 20 mV steps, 2 A in 50 mA steps
        let word = (4 << 28) | (450 << 9) | 40;
        let fields = decode_rdo(word, RdoReference::Pps);
        assert_eq!(
            render_lines(&fields),
            "object_position=4\ncapability_mismatch=0\nusb_communication_capable=0\n\
             no_usb_suspend=0\nunchunked_extended_messages_supported=0\nepr_mode_capable=0\n\
             output_voltage=9.00\noperating_current=2.00\n"
        );
    }

    #[test]
    fn test_decode_avs_rdo_voltage() {
        let word = (5 << 28) | (40 << 9) | 20;
        let fields = decode_rdo(word, RdoReference::Avs);
        assert_eq!(value_of(&fields, FieldName::OutputVoltage).as_deref(), Some("5.00"));
        assert_eq!(value_of(&fields, FieldName::OperatingCurrent).as_deref(), Some("1.00"));
        assert!(find_field(&fields, FieldName::GivebackFlag).is_none());
    }

    #[test]
    fn test_decoded_field_json() {
        let fields = decode_pdo(0x0001_912c, false, false);
        let json = serde_json::to_value(&fields[0]).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"name": "voltage", "raw_bits": 100, "display_value": "5.00"})
        );
    }
}
