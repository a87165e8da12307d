// Static PDO/RDO field table and block traversal
// Reference: USB Power Delivery Rev 3.1, Tables 6-9 to 6-23

use super::fields::{FieldDescriptor, FieldFlags, FieldName, Scale};
use super::types::{PdoVariant, RdoReference};

const GS: FieldFlags = FieldFlags::GROUP_START;
const SRC: FieldFlags = FieldFlags::SOURCE_ONLY;
const SNK: FieldFlags = FieldFlags::SINK_ONLY;
const CONT: FieldFlags = FieldFlags::CONTINUE_GROUP;
const NONE: FieldFlags = FieldFlags::NONE;

const UNITLESS: Scale = Scale::Unitless;
/// 10 mA per bit
const MA10: Scale = Scale::LinearMilli(1);
/// 20 mV per bit
const MV20: Scale = Scale::LinearMilli(2);
/// 50 mV or 50 mA per bit
const STEP50: Scale = Scale::LinearMilli(5);
/// 100 mV per bit
const MV100: Scale = Scale::LinearMilli(10);
/// 250 mW per bit
const MW250: Scale = Scale::LinearMilli(25);
/// 1 W per bit
const W1: Scale = Scale::LinearMilli(100);

const fn d(
    bit_offset: u8,
    bit_width: u8,
    flags: FieldFlags,
    scale: Scale,
    name: FieldName,
) -> FieldDescriptor {
    FieldDescriptor::new(bit_offset, bit_width, flags, scale, name)
}

// Block start indices into FIELD_TABLE
const FIXED_BASE: usize = 0;
const FIXED_FIRST_OBJECT: usize = 4;
const BATTERY: usize = 13;
const VARIABLE: usize = 17;
const PPS: usize = 21;
const SPR_AVS: usize = 25;
const EPR_AVS: usize = 29;
const RDO_FIXED_VARIABLE: usize = 33;
const RDO_BATTERY: usize = 43;
const RDO_PPS: usize = 53;
const RDO_AVS: usize = 61;

/// Every PDO and RDO field, one contiguous block per layout.
///
/// The Fixed base block ends in a CONTINUE_GROUP descriptor so a first-object
/// traversal runs on into the block holding bits 23..29.
pub static FIELD_TABLE: [FieldDescriptor; 69] = [
    // Fixed supply PDO, B31..30 = 00b
    d(10, 10, GS, STEP50, FieldName::Voltage),
    d(0, 10, SRC, MA10, FieldName::MaximumCurrent),
    d(0, 10, SNK, MA10, FieldName::OperationalCurrent),
    d(20, 2, SRC.union(CONT), UNITLESS, FieldName::PeakCurrent),
    // Fixed supply PDO at object position 1
    d(29, 1, GS, UNITLESS, FieldName::DualRolePower),
    d(28, 1, SRC, UNITLESS, FieldName::UsbSuspendSupported),
    d(28, 1, SNK, UNITLESS, FieldName::HigherCapability),
    d(27, 1, NONE, UNITLESS, FieldName::UnconstrainedPower),
    d(26, 1, NONE, UNITLESS, FieldName::UsbCommunicationCapable),
    d(25, 1, NONE, UNITLESS, FieldName::DualRoleData),
    d(24, 1, SRC, UNITLESS, FieldName::UnchunkedExtendedMessagesSupported),
    d(23, 2, SNK, UNITLESS, FieldName::FastRoleSwapCurrent),
    d(23, 1, SRC, UNITLESS, FieldName::EprModeCapable),
    // Battery supply PDO, B31..30 = 01b
    d(0, 10, GS.union(SRC), MW250, FieldName::MaximumAllowablePower),
    d(0, 10, SNK, MW250, FieldName::OperationalPower),
    d(10, 10, NONE, STEP50, FieldName::MinimumVoltage),
    d(20, 10, NONE, STEP50, FieldName::MaximumVoltage),
    // Variable supply PDO, B31..30 = 10b
    d(0, 10, GS.union(SRC), MA10, FieldName::MaximumCurrent),
    d(0, 10, SNK, MA10, FieldName::OperationalCurrent),
    d(10, 10, NONE, STEP50, FieldName::MinimumVoltage),
    d(20, 10, NONE, STEP50, FieldName::MaximumVoltage),
    // SPR PPS APDO, B31..28 = 1100b
    d(0, 7, GS, STEP50, FieldName::MaximumCurrent),
    d(8, 8, NONE, MV100, FieldName::MinimumVoltage),
    d(17, 8, NONE, MV100, FieldName::MaximumVoltage),
    d(27, 1, SRC, UNITLESS, FieldName::PpsPowerLimited),
    // SPR AVS APDO
    d(0, 8, GS, W1, FieldName::Pdp),
    d(8, 8, NONE, MV100, FieldName::MinimumVoltage),
    d(17, 8, NONE, MV100, FieldName::MaximumVoltage),
    d(26, 2, SRC, UNITLESS, FieldName::PeakCurrent),
    // EPR AVS APDO, B31..28 = 1101b
    d(0, 8, GS, W1, FieldName::Pdp),
    d(8, 8, NONE, MV100, FieldName::MinimumVoltage),
    d(17, 9, NONE, MV100, FieldName::MaximumVoltage),
    d(26, 2, SRC, UNITLESS, FieldName::PeakCurrent),
    // Fixed and Variable request
    d(28, 4, GS, UNITLESS, FieldName::ObjectPosition),
    d(27, 1, NONE, UNITLESS, FieldName::GivebackFlag),
    d(26, 1, NONE, UNITLESS, FieldName::CapabilityMismatch),
    d(25, 1, NONE, UNITLESS, FieldName::UsbCommunicationCapable),
    d(24, 1, NONE, UNITLESS, FieldName::NoUsbSuspend),
    d(23, 1, NONE, UNITLESS, FieldName::UnchunkedExtendedMessagesSupported),
    d(22, 1, NONE, UNITLESS, FieldName::EprModeCapable),
    d(10, 10, NONE, MA10, FieldName::OperatingCurrent),
    d(0, 10, SNK, MA10, FieldName::MaximumOperatingCurrent),
    d(0, 10, SRC, MA10, FieldName::MinimumOperatingCurrent),
    // Battery request
    d(28, 4, GS, UNITLESS, FieldName::ObjectPosition),
    d(27, 1, NONE, UNITLESS, FieldName::GivebackFlag),
    d(26, 1, NONE, UNITLESS, FieldName::CapabilityMismatch),
    d(25, 1, NONE, UNITLESS, FieldName::UsbCommunicationCapable),
    d(24, 1, NONE, UNITLESS, FieldName::NoUsbSuspend),
    d(23, 1, NONE, UNITLESS, FieldName::UnchunkedExtendedMessagesSupported),
    d(22, 1, NONE, UNITLESS, FieldName::EprModeCapable),
    d(10, 10, NONE, MW250, FieldName::OperatingPower),
    d(0, 10, SNK, MW250, FieldName::MaximumOperatingPower),
    d(0, 10, SRC, MW250, FieldName::MinimumOperatingPower),
    // PPS request
    d(28, 4, GS, UNITLESS, FieldName::ObjectPosition),
    d(26, 1, NONE, UNITLESS, FieldName::CapabilityMismatch),
    d(25, 1, NONE, UNITLESS, FieldName::UsbCommunicationCapable),
    d(24, 1, NONE, UNITLESS, FieldName::NoUsbSuspend),
    d(23, 1, NONE, UNITLESS, FieldName::UnchunkedExtendedMessagesSupported),
    d(22, 1, NONE, UNITLESS, FieldName::EprModeCapable),
    d(9, 12, NONE, MV20, FieldName::OutputVoltage),
    d(0, 7, NONE, STEP50, FieldName::OperatingCurrent),
    // AVS request
    d(28, 4, GS, UNITLESS, FieldName::ObjectPosition),
    d(26, 1, NONE, UNITLESS, FieldName::CapabilityMismatch),
    d(25, 1, NONE, UNITLESS, FieldName::UsbCommunicationCapable),
    d(24, 1, NONE, UNITLESS, FieldName::NoUsbSuspend),
    d(23, 1, NONE, UNITLESS, FieldName::UnchunkedExtendedMessagesSupported),
    d(22, 1, NONE, UNITLESS, FieldName::EprModeCapable),
    d(9, 12, NONE, Scale::HalvedQuarterVolt, FieldName::OutputVoltage),
    d(0, 7, NONE, STEP50, FieldName::OperatingCurrent),
];

/// Start point of one block in [`FIELD_TABLE`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHandle {
    start: usize,
    follow_continuation: bool,
    /// Role filter; `None` yields every descriptor of the block
    source_side: Option<bool>,
}

impl BlockHandle {
    /// Handle that yields no descriptors
    pub fn empty() -> Self {
        Self {
            start: FIELD_TABLE.len(),
            follow_continuation: false,
            source_side: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start >= FIELD_TABLE.len()
    }

    /// Restrict [`BlockHandle::fields`] to descriptors applying to one side
    pub fn for_side(mut self, source_side: bool) -> Self {
        self.source_side = Some(source_side);
        self
    }

    /// Every descriptor of the block in table order, role flags ignored
    pub fn descriptors(&self) -> BlockIter {
        BlockIter {
            table: &FIELD_TABLE,
            start: self.start,
            pos: self.start,
            phase: if self.follow_continuation {
                Phase::Current
            } else {
                Phase::Final
            },
        }
    }

    /// Descriptors of the block that apply to the selected side
    pub fn fields(&self) -> impl Iterator<Item = &'static FieldDescriptor> {
        let side = self.source_side;
        self.descriptors()
            .filter(move |d| side.map_or(true, |s| d.flags.applies_to(s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Inside the starting block; a CONTINUE_GROUP tail may extend it
    Current,
    /// Next group boundary ends the traversal
    Final,
    Done,
}

/// Walks one block of the table.
///
/// Traversal ends at the next GROUP_START. When continuation is enabled and
/// the descriptor just before that boundary carries CONTINUE_GROUP, the
/// boundary is crossed once and traversal ends at the following one.
#[derive(Debug, Clone)]
pub struct BlockIter {
    table: &'static [FieldDescriptor],
    start: usize,
    pos: usize,
    phase: Phase,
}

impl Iterator for BlockIter {
    type Item = &'static FieldDescriptor;

    fn next(&mut self) -> Option<Self::Item> {
        if self.phase == Phase::Done {
            return None;
        }
        let table = self.table;
        let desc = table.get(self.pos)?;

        if self.pos != self.start && desc.starts_group() {
            let continued = table[self.pos - 1].continues_group();
            if self.phase == Phase::Current && continued {
                self.phase = Phase::Final;
            } else {
                self.phase = Phase::Done;
                return None;
            }
        }

        self.pos += 1;
        Some(desc)
    }
}

/// Table region for a PDO variant.
///
/// Fixed PDOs at object position 1 continue into the bits 23..29 block.
/// Null has no fields.
pub fn lookup_block(variant: PdoVariant, object_index_is_one: bool) -> BlockHandle {
    let start = match variant {
        PdoVariant::Null => return BlockHandle::empty(),
        PdoVariant::Fixed => FIXED_BASE,
        PdoVariant::Battery => BATTERY,
        PdoVariant::Variable => VARIABLE,
        PdoVariant::Pps => PPS,
        PdoVariant::SprAvs => SPR_AVS,
        PdoVariant::EprAvs => EPR_AVS,
    };
    debug_assert!(FIELD_TABLE[FIXED_FIRST_OBJECT - 1].continues_group());
    tracing::trace!(?variant, start, object_index_is_one, "PDO block selected");
    BlockHandle {
        start,
        follow_continuation: variant == PdoVariant::Fixed && object_index_is_one,
        source_side: None,
    }
}

/// Table region for an RDO, filtered by the giveback condition.
///
/// SOURCE_ONLY descriptors apply when giveback is asserted, SINK_ONLY ones
/// when it is clear.
pub fn lookup_rdo_block(reference: RdoReference, giveback: bool) -> BlockHandle {
    let start = match reference {
        RdoReference::FixedOrVariable => RDO_FIXED_VARIABLE,
        RdoReference::Battery => RDO_BATTERY,
        RdoReference::Pps => RDO_PPS,
        RdoReference::Avs => RDO_AVS,
    };
    tracing::trace!(?reference, start, giveback, "RDO block selected");
    BlockHandle {
        start,
        follow_continuation: false,
        source_side: Some(giveback),
    }
}
