// Capability list scraping for USB PD objects exposed through sysfs
pub mod scan;
pub mod summary;

pub use scan::{
    parse_entry_name, read_attribute_dir, scan_capabilities, scan_pd_object, CapabilityEntry,
    CapsError, PdCapabilities, SINK_CAPS_DIR, SOURCE_CAPS_DIR,
};
pub use summary::summary;
