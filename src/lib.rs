// USBPD-RS: USB Power Delivery PDO/RDO decoding and encoding
// Copyright 2024 - Licensed under GPLv3

pub mod caps;
pub mod codec;

// Re-export commonly used types
pub use caps::{scan_capabilities, scan_pd_object, summary, CapabilityEntry, CapsError};
pub use codec::{
    classify_pdo, decode_pdo, decode_pdo_with, decode_rdo, encode, lookup_block, lookup_rdo_block,
    AttributeMap, AvsConvention, DecodedField, FieldName, LiteralError, PdoContext, PdoVariant,
    RdoReference,
};

/// USBPD-RS version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
