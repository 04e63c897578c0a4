use binrw::BinRead;

pub const HEADER_MAGIC: &[u8; 4] = b"ORBC";
pub const RECORD_MAGIC: &[u8; 8] = b"LARCHIVE";

/// Fixed record header (24 bytes) plus the single gap byte before the payload.
/// The filename field runs from the end of the fixed header up to `offset`,
/// so its length is `offset - RECORD_FIXED_SIZE`.
pub const RECORD_FIXED_SIZE: u32 = 25;

/// Lookahead window per scan probe when searching for the next record magic.
pub const SCAN_WINDOW: usize = 0x40;

#[derive(BinRead, Debug)]
pub struct MasterHeader {
    pub magic: [u8; 4], //ORBC
    _version: [u8; 4],
    pub romsize: u32,
    _bootblocksize: u32,
    pub align: u32,
    pub offset: u32, //start of the component table
    _architecture: u32,
    _pad: u32,
}

#[derive(BinRead, Debug)]
pub struct RecordHeader {
    _magic: [u8; 8], //LARCHIVE
    pub len: u32,
    pub file_type: u32,
    pub checksum: u32,
    pub offset: u32, //distance from record start to payload start
}

pub fn type_name(code: u32) -> &'static str {
    match code {
        0x00000000 => "DELETED",
        0xffffffff => "NULL",
        0x01 => "BOOTBLOCK",
        0x02 => "CBFSHEADER",
        0x10 => "LEGACY_STAGE",
        0x11 => "STAGE",
        0x20 => "SELF",
        0x21 => "FIT",
        0x30 => "OPTIONROM",
        0x40 => "BOOTSPLASH",
        0x50 => "RAW",
        0x51 => "VSA",
        0x52 => "MBI",
        0x53 => "MICROCODE",
        0x60 => "FSP",
        0x61 => "MRC",
        0x62 => "MMA",
        0x63 => "EFI",
        0x70 => "STRUCT",
        0xaa => "CMOS_DEFAULT",
        0xab => "SPD",
        0xac => "MRC_CACHE",
        0x1aa => "CMOS_LAYOUT",
        _ => "unknown",
    }
}
