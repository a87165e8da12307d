// Variant tags and decode context for PDOs and RDOs

use serde::{Deserialize, Serialize};
use std::fmt;

/// Power Data Object variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PdoVariant {
    /// All-zero filler word
    Null,
    Fixed,
    Battery,
    Variable,
    Pps,
    SprAvs,
    EprAvs,
}

impl PdoVariant {
    /// Map a sysfs capability leaf name (the part after `<index>:`)
    pub fn from_leaf_name(leaf: &str, avs: AvsConvention) -> Self {
        match leaf {
            "fixed_supply" => PdoVariant::Fixed,
            "battery" => PdoVariant::Battery,
            "variable_supply" => PdoVariant::Variable,
            "programmable_supply" => PdoVariant::Pps,
            "adjustable_supply" => avs.avs_variant(),
            _ => PdoVariant::Null,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PdoVariant::Null => "null",
            PdoVariant::Fixed => "fixed supply",
            PdoVariant::Battery => "battery supply",
            PdoVariant::Variable => "variable supply",
            PdoVariant::Pps => "programmable supply",
            PdoVariant::SprAvs | PdoVariant::EprAvs => "adjustable supply",
        }
    }

    pub fn is_augmented(&self) -> bool {
        matches!(
            self,
            PdoVariant::Pps | PdoVariant::SprAvs | PdoVariant::EprAvs
        )
    }

    /// Selector bits every word of this variant carries
    pub fn selector_bits(&self) -> u32 {
        match self {
            PdoVariant::Null | PdoVariant::Fixed => 0,
            PdoVariant::Battery => 1 << 30,
            PdoVariant::Variable => 2 << 30,
            PdoVariant::Pps => 3 << 30,
            PdoVariant::SprAvs | PdoVariant::EprAvs => (3 << 30) | (1 << 28),
        }
    }

    /// Which RDO layout a request against this PDO uses
    pub fn rdo_reference(&self) -> Option<RdoReference> {
        match self {
            PdoVariant::Null => None,
            PdoVariant::Fixed | PdoVariant::Variable => Some(RdoReference::FixedOrVariable),
            PdoVariant::Battery => Some(RdoReference::Battery),
            PdoVariant::Pps => Some(RdoReference::Pps),
            PdoVariant::SprAvs | PdoVariant::EprAvs => Some(RdoReference::Avs),
        }
    }
}

impl fmt::Display for PdoVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The PDO type an RDO refers to; never derivable from the RDO word itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RdoReference {
    FixedOrVariable,
    Battery,
    Pps,
    Avs,
}

impl fmt::Display for RdoReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RdoReference::FixedOrVariable => "fixed/variable",
            RdoReference::Battery => "battery",
            RdoReference::Pps => "pps",
            RdoReference::Avs => "avs",
        };
        f.write_str(s)
    }
}

/// Which AVS variant a bit-28-set APDO belongs to.
///
/// The word alone does not say; the caller knows from the power range the
/// capability list was read for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvsConvention {
    #[default]
    Epr,
    Spr,
}

impl AvsConvention {
    pub fn avs_variant(&self) -> PdoVariant {
        match self {
            AvsConvention::Epr => PdoVariant::EprAvs,
            AvsConvention::Spr => PdoVariant::SprAvs,
        }
    }
}

/// Context needed to decode a PDO word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PdoContext {
    /// PDO sits at object position 1 of its capability list
    pub object_index_is_one: bool,

    /// Word came from a source (rather than sink) capability list
    pub is_source: bool,

    pub avs: AvsConvention,
}

impl PdoContext {
    pub fn source() -> Self {
        Self {
            is_source: true,
            ..Default::default()
        }
    }

    pub fn sink() -> Self {
        Self::default()
    }

    pub fn with_first_object(mut self, first: bool) -> Self {
        self.object_index_is_one = first;
        self
    }

    pub fn with_avs(mut self, avs: AvsConvention) -> Self {
        self.avs = avs;
        self
    }
}
