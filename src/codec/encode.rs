// PDO encoder: attribute map -> packed word

use super::attrs::AttributeMap;
use super::fields::Scale;
use super::table::lookup_block;
use super::types::PdoVariant;

/// Pack a capability's attributes into a PDO word.
///
/// Selector bits come from `variant`; every field applying to the role is
/// filled from the attribute of the same name, converted to the field's step
/// size and masked to its width. Absent or malformed attributes contribute 0.
/// Single-bit flags are set for any non-zero value.
pub fn encode(
    variant: PdoVariant,
    is_source_capability: bool,
    object_index: u16,
    attrs: &AttributeMap,
) -> u32 {
    if variant == PdoVariant::Null {
        return 0;
    }
    let block = lookup_block(variant, object_index == 1).for_side(is_source_capability);

    let mut word = variant.selector_bits();
    for desc in block.fields() {
        let Some(value) = attrs.value(desc.name) else {
            tracing::trace!(field = %desc.name, "Attribute missing, field left at 0");
            continue;
        };
        let raw = if desc.bit_width == 1 && desc.scale == Scale::Unitless {
            u32::from(value != 0)
        } else {
            desc.scale.to_raw(value)
        };
        word |= desc.place(raw);
    }
    tracing::trace!(?variant, object_index, "Encoded PDO 0x{:08x}", word);
    word
}
