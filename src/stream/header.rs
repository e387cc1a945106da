//! Stream header flags

use bitflags::bitflags;

/// Current stream format version written into `Header` operations
pub const STREAM_FORMAT_VERSION: u32 = 1;

bitflags! {
    /// Flags carried by a `Header` operation.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct HeaderFlags: u32 {
        /// No flags.
        const NONE = 0;
        /// Parts drawn from this stream take the instancing element's
        /// current symbology rather than their own.
        const USE_CURRENT_DISPLAY_PARAMS = 0x01;
    }
}
