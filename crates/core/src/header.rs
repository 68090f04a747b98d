//! Binary file header: fixed-layout fields followed by the variable-length hash name
//! and salt. See the crate-level documentation for the exact byte layout.

use std::fmt;
use std::io::{Read, Write};

use crate::error::{Error, Result};

pub const MAGIC: u32 = 0x5952_4352;

pub const CIPHER_MODE_BLOCK: u8 = 0x11;
pub const CIPHER_MODE_STREAM: u8 = 0x10;

pub const SEARCH_MODE_PREFIX: u8 = 0x00;
pub const SEARCH_MODE_SEQUENCE: u8 = 0x01;
pub const SEARCH_MODE_SERIES: u8 = 0x02;
pub const SEARCH_MODE_SCATTER: u8 = 0x03;
pub const SEARCH_MODE_MAPSCATTER: u8 = 0x04;
pub const SEARCH_MODE_PARASCATTER: u8 = 0x05;
pub const SEARCH_MODE_STREAM: u8 = 0xFF;

pub const CURRENT_VERSION: u8 = 0x02;

/// Size in bytes of the fixed-layout portion (everything before `hash_name`/`salt`).
const PACKED_LEN: usize = 4 + 1 + 1 + 2 + 2 + 2 + 2 + 1 + 8 + 1 + 1 + 8 + 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    pub magic: u32,
    pub version: u8,
    pub cipher_mode: u8,
    pub block_size: u16,
    pub nonce_size: u16,
    pub hash_size_bits: u16,
    pub output_extension: u16,
    pub hash_name: String,
    pub iv: u64,
    pub salt: Vec<u8>,
    pub search_mode: u8,
    pub original_size: u64,
    /// Reserved integrity field; never populated or verified by this crate (see
    /// `DESIGN.md`). Always all-zero on encode, ignored on decode.
    pub hmac: [u8; 32],
}

impl FileHeader {
    /// Construct a header for a fresh puzzle-block-encrypted file; `hmac` is always
    /// written as all-zero.
    #[allow(clippy::too_many_arguments)]
    pub fn new_block(
        block_size: u16,
        nonce_size: u16,
        hash_size_bits: u16,
        output_extension: u16,
        hash_name: &str,
        iv: u64,
        salt: Vec<u8>,
        search_mode: u8,
        original_size: u64,
    ) -> Result<Self> {
        if hash_name.len() > 255 {
            return Err(Error::Format("hash name too long (> 255 bytes)".into()));
        }
        if salt.len() > 255 {
            return Err(Error::Format("salt too long (> 255 bytes)".into()));
        }
        Ok(Self {
            magic: MAGIC,
            version: CURRENT_VERSION,
            cipher_mode: CIPHER_MODE_BLOCK,
            block_size,
            nonce_size,
            hash_size_bits,
            output_extension,
            hash_name: hash_name.to_string(),
            iv,
            salt,
            search_mode,
            original_size,
            hmac: [0u8; 32],
        })
    }
}

impl fmt::Display for FileHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cipher_mode_str = match self.cipher_mode {
            CIPHER_MODE_STREAM => "StreamCipher",
            CIPHER_MODE_BLOCK => "BlockCipher",
            _ => "Unknown/LegacyPuzzle",
        };
        writeln!(f, "=== Unified File Header Info ===")?;
        writeln!(f, "Magic: RCRY (0x{:08x})", self.magic)?;
        writeln!(f, "Version: {}", self.version)?;
        writeln!(
            f,
            "Cipher Mode: {cipher_mode_str} (0x{:02x})",
            self.cipher_mode
        )?;
        writeln!(f, "Block Size: {}", self.block_size)?;
        writeln!(f, "Nonce Size: {}", self.nonce_size)?;
        writeln!(f, "Hash Size: {} bits", self.hash_size_bits)?;
        writeln!(f, "Output Extension: {} bytes", self.output_extension)?;
        writeln!(f, "Hash Algorithm: {}", self.hash_name)?;
        writeln!(f, "IV (Seed): 0x{:016x}", self.iv)?;
        writeln!(f, "Salt Length: {}", self.salt.len())?;
        if !self.salt.is_empty() {
            let hex_salt: Vec<String> = self.salt.iter().map(|b| format!("{b:02x}")).collect();
            writeln!(f, "Salt Data: {}", hex_salt.join(" "))?;
        }
        writeln!(f, "Compressed Plaintext Size: {} bytes", self.original_size)?;
        writeln!(f, "Search Mode Enum: 0x{:02x}", self.search_mode)?;
        let hex_hmac: Vec<String> = self.hmac.iter().map(|b| format!("{b:02x}")).collect();
        writeln!(f, "HMAC: {}", hex_hmac.join(" "))?;
        write!(f, "===============================")
    }
}

/// Serialize `hdr` into a contiguous byte buffer (packed fields, then hash name, then
/// salt).
pub fn serialize_header(hdr: &FileHeader) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(PACKED_LEN + hdr.hash_name.len() + hdr.salt.len());
    write_header(&mut buf, hdr)?;
    Ok(buf)
}

/// Write `hdr` to `out`: packed fixed portion, then `hash_name` bytes, then `salt`
/// bytes.
pub fn write_header<W: Write>(out: &mut W, hdr: &FileHeader) -> Result<()> {
    if hdr.hash_name.len() > 255 {
        return Err(Error::Format("hash name too long (> 255 bytes)".into()));
    }
    if hdr.salt.len() > 255 {
        return Err(Error::Format("salt too long (> 255 bytes)".into()));
    }

    out.write_all(&hdr.magic.to_le_bytes())?;
    out.write_all(&[hdr.version, hdr.cipher_mode])?;
    out.write_all(&hdr.block_size.to_le_bytes())?;
    out.write_all(&hdr.nonce_size.to_le_bytes())?;
    out.write_all(&hdr.hash_size_bits.to_le_bytes())?;
    out.write_all(&hdr.output_extension.to_le_bytes())?;
    out.write_all(&[hdr.hash_name.len() as u8])?;
    out.write_all(&hdr.iv.to_le_bytes())?;
    out.write_all(&[hdr.salt.len() as u8])?;
    out.write_all(&[hdr.search_mode])?;
    out.write_all(&hdr.original_size.to_le_bytes())?;
    out.write_all(&hdr.hmac)?;

    out.write_all(hdr.hash_name.as_bytes())?;
    out.write_all(&hdr.salt)?;
    Ok(())
}

/// Read and validate a header from `input`; requires `magic == MAGIC`.
pub fn read_header<R: Read>(input: &mut R) -> Result<FileHeader> {
    let mut magic_buf = [0u8; 4];
    input.read_exact(&mut magic_buf)?;
    let magic = u32::from_le_bytes(magic_buf);
    if magic != MAGIC {
        return Err(Error::Format("bad magic number".into()));
    }

    let mut u8pair = [0u8; 2];
    input.read_exact(&mut u8pair)?;
    let version = u8pair[0];
    let cipher_mode = u8pair[1];

    let block_size = read_u16(input)?;
    let nonce_size = read_u16(input)?;
    let hash_size_bits = read_u16(input)?;
    let output_extension = read_u16(input)?;

    let mut len_buf = [0u8; 1];
    input.read_exact(&mut len_buf)?;
    let hash_name_len = len_buf[0] as usize;

    let iv = read_u64(input)?;

    input.read_exact(&mut len_buf)?;
    let salt_len = len_buf[0] as usize;

    input.read_exact(&mut len_buf)?;
    let search_mode = len_buf[0];

    let original_size = read_u64(input)?;

    let mut hmac = [0u8; 32];
    input.read_exact(&mut hmac)?;

    let mut hash_name_buf = vec![0u8; hash_name_len];
    input.read_exact(&mut hash_name_buf)?;
    let hash_name = String::from_utf8(hash_name_buf)
        .map_err(|_| Error::Format("hash name is not valid UTF-8".into()))?;

    let mut salt = vec![0u8; salt_len];
    input.read_exact(&mut salt)?;

    Ok(FileHeader {
        magic,
        version,
        cipher_mode,
        block_size,
        nonce_size,
        hash_size_bits,
        output_extension,
        hash_name,
        iv,
        salt,
        search_mode,
        original_size,
        hmac,
    })
}

fn read_u16<R: Read>(input: &mut R) -> Result<u16> {
    let mut buf = [0u8; 2];
    input.read_exact(&mut buf)?;
    Ok(u16::from_le_bytes(buf))
}

fn read_u64<R: Read>(input: &mut R) -> Result<u64> {
    let mut buf = [0u8; 8];
    input.read_exact(&mut buf)?;
    Ok(u64::from_le_bytes(buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_populated_header() {
        let hdr = FileHeader::new_block(
            16,
            8,
            256,
            0,
            "rainstorm",
            42,
            vec![0xAA, 0xBB, 0xCC],
            SEARCH_MODE_SCATTER,
            12345,
        )
        .unwrap();

        let bytes = serialize_header(&hdr).unwrap();
        let mut cursor = std::io::Cursor::new(bytes);
        let read_back = read_header(&mut cursor).unwrap();

        assert_eq!(hdr, read_back);
    }

    #[test]
    fn rejects_bad_magic() {
        let mut bytes = vec![0u8; PACKED_LEN];
        bytes[0..4].copy_from_slice(&0xDEADBEEFu32.to_le_bytes());
        let mut cursor = std::io::Cursor::new(bytes);
        assert!(read_header(&mut cursor).is_err());
    }

    #[test]
    fn rejects_oversized_hash_name() {
        let long_name = "a".repeat(256);
        let err = FileHeader::new_block(1, 1, 64, 0, &long_name, 0, vec![], 0, 0);
        assert!(err.is_err());
    }

    #[test]
    fn empty_salt_and_extension_round_trip() {
        let hdr =
            FileHeader::new_block(8, 4, 64, 0, "rainbow", 0, vec![], SEARCH_MODE_PREFIX, 0).unwrap();
        let bytes = serialize_header(&hdr).unwrap();
        let mut cursor = std::io::Cursor::new(bytes);
        assert_eq!(read_header(&mut cursor).unwrap(), hdr);
    }
}
