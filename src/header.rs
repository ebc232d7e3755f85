//! EVTC file header parsing.
//!
//! # Header Layout (16 bytes)
//!
//! | Offset | Size | Field | Description |
//! |--------|------|-------|-------------|
//! | 0x00 | 4 | `magic` | "EVTC" |
//! | 0x04 | 8 | `build_date` | arcdps build datestamp, ASCII (e.g. "20190611") |
//! | 0x0C | 1 | `revision` | Combat record layout (0 or 1) |
//! | 0x0D | 2 | `boss_species` | Species id of the logged boss |
//! | 0x0F | 1 | reserved | Unused |

use serde::Serialize;

use crate::binary::{read_bytes, read_fixed_string, read_u16_le, read_u8};
use crate::error::{ParserError, Result};
use crate::format::{Revision, EVTC_MAGIC, HEADER_SIZE};

/// Parsed EVTC file header.
///
/// # Example
///
/// ```
/// use evtc::header::Header;
/// use evtc::format::Revision;
///
/// let mut data = Vec::new();
/// data.extend_from_slice(b"EVTC20190611");
/// data.push(1);
/// data.extend_from_slice(&17154u16.to_le_bytes());
/// data.push(0);
///
/// let header = Header::parse(&data).unwrap();
/// assert_eq!(header.build_date, "20190611");
/// assert_eq!(header.revision, Revision::Current);
/// assert_eq!(header.boss_species, 17154);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Header {
    /// arcdps build datestamp.
    pub build_date: String,

    /// Combat record layout used by the rest of the file.
    pub revision: Revision,

    /// Species id of the boss this log was recorded for.
    pub boss_species: u16,
}

impl Header {
    /// Parses a header from the start of `data`.
    ///
    /// The signature is checked before anything else is read.
    ///
    /// # Errors
    ///
    /// - `ParserError::Truncated` if the data is shorter than the header
    /// - `ParserError::BadMagic` if the signature is not `EVTC`
    /// - `ParserError::UnsupportedRevision` if the revision byte is not 0 or 1
    pub fn parse(data: &[u8]) -> Result<Self> {
        let magic = read_bytes(data, 0x00, EVTC_MAGIC.len())?;
        if magic != EVTC_MAGIC {
            return Err(ParserError::bad_magic(magic));
        }

        if data.len() < HEADER_SIZE {
            return Err(ParserError::truncated(HEADER_SIZE, data.len()));
        }

        let build_date = read_fixed_string(data, 0x04, 8)?;
        let revision_byte = read_u8(data, 0x0C)?;
        let revision =
            Revision::from_byte(revision_byte).ok_or(ParserError::UnsupportedRevision(revision_byte))?;
        let boss_species = read_u16_le(data, 0x0D)?;

        Ok(Header {
            build_date,
            revision,
            boss_species,
        })
    }
}
