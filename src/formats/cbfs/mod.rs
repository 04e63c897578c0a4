mod include;

use std::fs::{self, OpenOptions};
use std::io::{Cursor, Seek, SeekFrom, Write};
use std::path::Path;

use binrw::BinReaderExt;
use thiserror::Error;

use crate::common;
use include::*;
pub use include::{type_name, MasterHeader};

#[derive(Error, Debug)]
pub enum CbfsError {
    #[error("CBFS master header could not be found")]
    HeaderNotFound,
    #[error("malformed record at {offset:#x}: data offset {data_offset} is below the fixed header size")]
    MalformedRecord { offset: u64, data_offset: u32 },
    #[error("record at {offset:#x} has a non UTF-8 filename")]
    InvalidFilename { offset: u64 },
    #[error("image truncated at {offset:#x}")]
    TruncatedImage { offset: u64 },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// One decoded LARCHIVE record.
#[derive(Debug)]
pub struct CbfsFile {
    /// Byte offset the record magic was found at.
    pub parse_offset: u64,
    pub len: u32,
    pub file_type: u32,
    #[allow(dead_code)] //carried from the record, never validated
    pub checksum: u32,
    pub offset: u32,
    pub filename: String,
}

impl CbfsFile {
    pub fn compression_hint(&self) -> &'static str {
        if self.filename.to_lowercase().ends_with(".lzma") {
            "lzma"
        } else {
            "unknown"
        }
    }
}

#[derive(Debug)]
pub struct CbfsImage {
    pub header: MasterHeader,
    pub components: Vec<CbfsFile>,
}

/// Parses the image; with a destination folder, also writes out every payload.
pub fn parse_cbfs(data: &[u8], extract_to: Option<&Path>) -> Result<CbfsImage, CbfsError> {
    let mut cur = Cursor::new(data);
    let header = read_master_header(&mut cur)?;
    let components = walk_components(&mut cur, header.offset as u64, extract_to)?;
    Ok(CbfsImage { header, components })
}

fn read_master_header(cur: &mut Cursor<&[u8]>) -> Result<MasterHeader, CbfsError> {
    //header location is unconstrained, search the whole buffer
    let pos = common::find_bytes(cur.get_ref(), HEADER_MAGIC).ok_or(CbfsError::HeaderNotFound)?;
    cur.seek(SeekFrom::Start(pos as u64))?;
    let header: MasterHeader = cur
        .read_be()
        .map_err(|_| CbfsError::TruncatedImage { offset: pos as u64 })?;
    Ok(header)
}

/// Repositions the cursor to the next occurrence of `magic`, probing one
/// SCAN_WINDOW chunk at a time. Windows overlap by the magic length minus
/// one so a match straddling a window boundary is still found. Returns
/// false once the remaining data is exhausted without a match.
fn find_next_magic(cur: &mut Cursor<&[u8]>, magic: &[u8]) -> bool {
    let data = *cur.get_ref();
    let mut pos = cur.position() as usize;
    while pos < data.len() {
        let window = &data[pos..(pos + SCAN_WINDOW).min(data.len())];
        if let Some(hit) = common::find_bytes(window, magic) {
            cur.set_position((pos + hit) as u64);
            return true;
        }
        if window.len() < SCAN_WINDOW {
            break;
        }
        pos += SCAN_WINDOW - (magic.len() - 1);
    }
    false
}

fn walk_components(
    cur: &mut Cursor<&[u8]>,
    start: u64,
    extract_to: Option<&Path>,
) -> Result<Vec<CbfsFile>, CbfsError> {
    let total = cur.get_ref().len() as u64;
    let mut components = Vec::new();

    cur.set_position(start.min(total));

    //never more scan attempts than bytes left, so the walk terminates on garbage
    let scan_budget = total - cur.position();
    for _i in 0..scan_budget {
        if !find_next_magic(cur, RECORD_MAGIC) {
            break; //no more records, normal termination
        }
        components.push(read_cbfs_file(cur, extract_to)?);
    }

    Ok(components)
}

fn read_cbfs_file(cur: &mut Cursor<&[u8]>, extract_to: Option<&Path>) -> Result<CbfsFile, CbfsError> {
    let parse_offset = cur.position();
    let header: RecordHeader = cur
        .read_be()
        .map_err(|_| CbfsError::TruncatedImage { offset: parse_offset })?;

    if header.offset < RECORD_FIXED_SIZE {
        return Err(CbfsError::MalformedRecord {
            offset: parse_offset,
            data_offset: header.offset,
        });
    }
    let name_len = (header.offset - RECORD_FIXED_SIZE) as usize;

    let name_at = cur.position();
    let name_bytes = common::read_exact(cur, name_len)
        .map_err(|_| CbfsError::TruncatedImage { offset: name_at })?;
    let filename = String::from_utf8(common::trim_nul_padding(&name_bytes).to_vec())
        .map_err(|_| CbfsError::InvalidFilename { offset: parse_offset })?;

    if let Some(dest) = extract_to {
        //one gap byte sits between the filename field and the payload
        cur.seek(SeekFrom::Current(1))?;
        let data_at = cur.position();
        let data = common::read_exact(cur, header.len as usize)
            .map_err(|_| CbfsError::TruncatedImage { offset: data_at })?;

        fs::create_dir_all(dest)?;
        let output_path = dest.join(&filename);
        let mut out_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(output_path)?;
        out_file.write_all(&data)?;

        println!("- Saved {}!", filename);
    }

    Ok(CbfsFile {
        parse_offset,
        len: header.len,
        file_type: header.file_type,
        checksum: header.checksum,
        offset: header.offset,
        filename,
    })
}

pub fn print_components(components: &[CbfsFile]) {
    println!(
        "{:<32} {:<8}   {:<10} {:<8} {:<4}",
        "Name", "Offset", "Type", "Size", "Comp"
    );
    for comp in components {
        println!(
            "{:<32} {:>8}   {:<10} {:>8} {:<4}",
            comp.filename,
            format!("{:#x}", comp.parse_offset),
            type_name(comp.file_type),
            comp.len,
            comp.compression_hint(),
        );
    }
}
