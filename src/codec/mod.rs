// USB PD Power/Request Data Object codec
// Table-driven: every layout lives in table::FIELD_TABLE

pub mod attrs;
pub mod classify;
pub mod decode;
pub mod encode;
pub mod fields;
pub mod literal;
pub mod table;
pub mod types;

pub use attrs::{parse_unit_value, AttributeMap};
pub use classify::{classify_pdo, classify_pdo_with};
pub use decode::{
    decode_pdo, decode_pdo_with, decode_rdo, find_field, render_lines, DecodedField, GIVEBACK_BIT,
};
pub use encode::encode;
pub use fields::{DecimalFixed2, FieldDescriptor, FieldFlags, FieldName, Scale, Unit};
pub use literal::{parse_reference, parse_word, LiteralError};
pub use table::{lookup_block, lookup_rdo_block, BlockHandle, BlockIter, FIELD_TABLE};
pub use types::{AvsConvention, PdoContext, PdoVariant, RdoReference};
