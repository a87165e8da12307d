// PDO variant classification from the selector bits of a word

use super::types::{AvsConvention, PdoVariant};

/// APDO sub-selector: set for AVS, clear for PPS
const AVS_BIT: u32 = 1 << 28;

/// Classify a PDO word using the default AVS convention
pub fn classify_pdo(word: u32) -> PdoVariant {
    classify_pdo_with(word, AvsConvention::default())
}

/// Classify a PDO word.
///
/// An all-zero word is the Null filler, checked before the selector bits so
/// it never reads as a Fixed PDO.
pub fn classify_pdo_with(word: u32, avs: AvsConvention) -> PdoVariant {
    if word == 0 {
        return PdoVariant::Null;
    }
    match word >> 30 {
        0b00 => PdoVariant::Fixed,
        0b01 => PdoVariant::Battery,
        0b10 => PdoVariant::Variable,
        _ => {
            if word & AVS_BIT == 0 {
                PdoVariant::Pps
            } else {
                avs.avs_variant()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_sentinel() {
        assert_eq!(classify_pdo(0), PdoVariant::Null);
        // Fixed with only a reserved bit set is still a real PDO
        assert_eq!(classify_pdo(1 << 22), PdoVariant::Fixed);
    }

    #[test]
    fn test_selector_bits() {
        assert_eq!(classify_pdo(0x0001_912c), PdoVariant::Fixed);
        assert_eq!(classify_pdo(0x4000_0001), PdoVariant::Battery);
        assert_eq!(classify_pdo(0x8000_0001), PdoVariant::Variable);
        assert_eq!(classify_pdo(0xc000_0000), PdoVariant::Pps);
        assert_eq!(classify_pdo(0xd000_0000), PdoVariant::EprAvs);
    }

    #[test]
    fn test_avs_convention() {
        assert_eq!(
            classify_pdo_with(0xd000_0000, AvsConvention::Spr),
            PdoVariant::SprAvs
        );
        assert_eq!(
            classify_pdo_with(0xc000_0000, AvsConvention::Spr),
            PdoVariant::Pps
        );
    }

    #[test]
    fn test_classifier_is_total() {
        let mut word: u32 = 1;
        for _ in 0..100_000 {
            let v = classify_pdo(word);
            assert_ne!(v, PdoVariant::Null);
            word = word.wrapping_mul(2_654_435_761).wrapping_add(0x9e37);
            if word == 0 {
                word = 1;
            }
        }
        assert_eq!(classify_pdo(u32::MAX), PdoVariant::EprAvs);
    }

    #[test]
    fn test_matches_encoder_selectors() {
        for v in [
            PdoVariant::Fixed,
            PdoVariant::Battery,
            PdoVariant::Variable,
            PdoVariant::Pps,
            PdoVariant::EprAvs,
        ] {
            // low bit keeps the Fixed word away from the Null sentinel
            assert_eq!(classify_pdo(v.selector_bits() | 1), v);
        }
        assert_eq!(
            classify_pdo_with(PdoVariant::SprAvs.selector_bits(), AvsConvention::Spr),
            PdoVariant::SprAvs
        );
    }
}
