//! Minimal PE resource reader.
//!
//! Reads just enough of a Windows executable to pull out its first icon
//! group: the headers, the section table and the resource section. The rest
//! of the file is never loaded, which matters for multi-hundred-megabyte
//! game binaries.

use std::io::{Read, Seek, SeekFrom};

use crate::ScanError;

pub const RT_ICON: u32 = 3;
pub const RT_GROUP_ICON: u32 = 14;

const PE32_MAGIC: u16 = 0x10b;
const PE32_PLUS_MAGIC: u16 = 0x20b;
const RESOURCE_DIRECTORY_INDEX: usize = 2;
const SECTION_HEADER_SIZE: usize = 40;
const MAX_SECTIONS: usize = 96;
const MAX_RESOURCE_SECTION: usize = 64 * 1024 * 1024;

const GRPICONDIR_SIZE: usize = 6;
const GRPICONDIRENTRY_SIZE: usize = 14;
const ICONDIRENTRY_SIZE: usize = 16;

const HIGH_BIT: u32 = 0x8000_0000;

#[derive(Debug, Clone, Copy)]
struct Section {
    virtual_address: u32,
    virtual_size: u32,
    raw_size: u32,
    raw_offset: u32,
}

impl Section {
    fn contains_rva(&self, rva: u32) -> bool {
        let span = self.virtual_size.max(self.raw_size);
        rva >= self.virtual_address && rva - self.virtual_address < span
    }
}

/// The resource section of a PE image, addressed by RVA.
#[derive(Debug)]
pub struct ResourceSection {
    data: Vec<u8>,
    rva: u32,
}

#[derive(Debug, Clone, Copy)]
struct DirEntry {
    name: u32,
    offset: u32,
}

impl DirEntry {
    fn id(&self) -> Option<u32> {
        (self.name & HIGH_BIT == 0).then_some(self.name & 0xFFFF)
    }

    fn is_dir(&self) -> bool {
        self.offset & HIGH_BIT != 0
    }

    fn target(&self) -> usize {
        (self.offset & !HIGH_BIT) as usize
    }
}

impl ResourceSection {
    /// Loads the resource section from a PE image.
    pub fn read<R: Read + Seek>(reader: &mut R) -> Result<Self, ScanError> {
        let dos = read_at(reader, 0, 64)?;
        if !dos.starts_with(b"MZ") {
            return Err(ScanError::InvalidPe("missing MZ signature"));
        }
        let nt_offset = u64::from(le_u32(&dos, 0x3C)?);

        let nt = read_at(reader, nt_offset, 24)?;
        if !nt.starts_with(b"PE\0\0") {
            return Err(ScanError::InvalidPe("missing PE signature"));
        }
        let section_count = usize::from(le_u16(&nt, 6)?);
        let optional_size = usize::from(le_u16(&nt, 20)?);
        if section_count == 0 || section_count > MAX_SECTIONS {
            return Err(ScanError::InvalidPe("bad section count"));
        }

        let optional = read_at(reader, nt_offset + 24, optional_size)?;
        let directories = match le_u16(&optional, 0)? {
            PE32_MAGIC => 96,
            PE32_PLUS_MAGIC => 112,
            _ => return Err(ScanError::InvalidPe("unknown optional header magic")),
        };
        let directory_count = le_u32(&optional, directories - 4)? as usize;
        if directory_count <= RESOURCE_DIRECTORY_INDEX {
            return Err(ScanError::NoIcon);
        }
        let entry = directories + RESOURCE_DIRECTORY_INDEX * 8;
        let resource_rva = le_u32(&optional, entry)?;
        if resource_rva == 0 {
            return Err(ScanError::NoIcon);
        }

        let table = read_at(
            reader,
            nt_offset + 24 + optional_size as u64,
            section_count * SECTION_HEADER_SIZE,
        )?;
        let sections = (0..section_count)
            .map(|i| {
                let s = i * SECTION_HEADER_SIZE;
                Ok(Section {
                    virtual_size: le_u32(&table, s + 8)?,
                    virtual_address: le_u32(&table, s + 12)?,
                    raw_size: le_u32(&table, s + 16)?,
                    raw_offset: le_u32(&table, s + 20)?,
                })
            })
            .collect::<Result<Vec<_>, ScanError>>()?;

        let section = sections
            .iter()
            .find(|s| s.contains_rva(resource_rva))
            .ok_or(ScanError::InvalidPe("resource directory outside any section"))?;

        let delta = resource_rva - section.virtual_address;
        let len = section.raw_size.saturating_sub(delta) as usize;
        if len == 0 || len > MAX_RESOURCE_SECTION {
            return Err(ScanError::InvalidPe("bad resource section size"));
        }
        let data = read_at(reader, u64::from(section.raw_offset) + u64::from(delta), len)?;

        Ok(Self {
            data,
            rva: resource_rva,
        })
    }

    /// Finds a resource by type and (optionally) numeric name, taking the
    /// first language. `None` picks the first entry of the type.
    pub fn find(&self, type_id: u32, name_id: Option<u32>) -> Result<Option<&[u8]>, ScanError> {
        let Some(type_dir) = self
            .entries(0)?
            .into_iter()
            .find(|e| e.is_dir() && e.id() == Some(type_id))
        else {
            return Ok(None);
        };

        let Some(name_dir) = self
            .entries(type_dir.target())?
            .into_iter()
            .find(|e| e.is_dir() && (name_id.is_none() || e.id() == name_id))
        else {
            return Ok(None);
        };

        let Some(leaf) = self
            .entries(name_dir.target())?
            .into_iter()
            .find(|e| !e.is_dir())
        else {
            return Ok(None);
        };

        let data_rva = le_u32(&self.data, leaf.target())?;
        let size = le_u32(&self.data, leaf.target() + 4)? as usize;
        let start = data_rva
            .checked_sub(self.rva)
            .ok_or(ScanError::InvalidPe("resource data outside section"))? as usize;
        self.data
            .get(start..start + size)
            .map(Some)
            .ok_or(ScanError::InvalidPe("resource data truncated"))
    }

    fn entries(&self, offset: usize) -> Result<Vec<DirEntry>, ScanError> {
        let named = usize::from(le_u16(&self.data, offset + 12)?);
        let ids = usize::from(le_u16(&self.data, offset + 14)?);
        (0..named + ids)
            .map(|i| {
                let e = offset + 16 + i * 8;
                Ok(DirEntry {
                    name: le_u32(&self.data, e)?,
                    offset: le_u32(&self.data, e + 4)?,
                })
            })
            .collect()
    }
}

/// Extracts the largest image of the first icon group as a one-image
/// `.ico` file.
pub fn primary_icon<R: Read + Seek>(reader: &mut R) -> Result<Vec<u8>, ScanError> {
    let resources = ResourceSection::read(reader)?;
    let group = resources.find(RT_GROUP_ICON, None)?.ok_or(ScanError::NoIcon)?;

    let count = usize::from(le_u16(group, 4)?);
    let best = (0..count)
        .filter_map(|i| {
            let start = GRPICONDIR_SIZE + i * GRPICONDIRENTRY_SIZE;
            group.get(start..start + GRPICONDIRENTRY_SIZE)
        })
        .max_by_key(|e| (dimension(e[0]), u16::from_le_bytes([e[6], e[7]])))
        .ok_or(ScanError::NoIcon)?;

    let icon_id = u32::from(u16::from_le_bytes([best[12], best[13]]));
    let image = resources.find(RT_ICON, Some(icon_id))?.ok_or(ScanError::NoIcon)?;

    let mut ico = Vec::with_capacity(GRPICONDIR_SIZE + ICONDIRENTRY_SIZE + image.len());
    ico.extend_from_slice(&[0, 0, 1, 0, 1, 0]);
    // width, height, colors, reserved, planes, bit count
    ico.extend_from_slice(&best[..8]);
    ico.extend_from_slice(&(image.len() as u32).to_le_bytes());
    ico.extend_from_slice(&((GRPICONDIR_SIZE + ICONDIRENTRY_SIZE) as u32).to_le_bytes());
    ico.extend_from_slice(image);
    Ok(ico)
}

/// Icon directory dimensions store 256 as 0.
fn dimension(byte: u8) -> u16 {
    if byte == 0 { 256 } else { u16::from(byte) }
}

fn read_at<R: Read + Seek>(reader: &mut R, offset: u64, len: usize) -> Result<Vec<u8>, ScanError> {
    reader.seek(SeekFrom::Start(offset))?;
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf)?;
    Ok(buf)
}

fn le_u16(data: &[u8], offset: usize) -> Result<u16, ScanError> {
    data.get(offset..offset + 2)
        .map(|b| u16::from_le_bytes([b[0], b[1]]))
        .ok_or(ScanError::InvalidPe("truncated header"))
}

fn le_u32(data: &[u8], offset: usize) -> Result<u32, ScanError> {
    data.get(offset..offset + 4)
        .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .ok_or(ScanError::InvalidPe("truncated header"))
}
