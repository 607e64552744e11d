//! Synthetic PE images for tests.

use std::io::Cursor;

const SECTION_RVA: u32 = 0x1000;
const SECTION_FILE_OFFSET: usize = 0x200;
const HIGH_BIT: u32 = 0x8000_0000;

fn put_u16(buf: &mut [u8], at: usize, v: u16) {
    buf[at..at + 2].copy_from_slice(&v.to_le_bytes());
}

fn put_u32(buf: &mut [u8], at: usize, v: u32) {
    buf[at..at + 4].copy_from_slice(&v.to_le_bytes());
}

/// Encodes a solid square PNG of the given size.
pub fn png_bytes(size: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(size, size, image::Rgba([200, 40, 40, 255]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

/// Builds a GRPICONDIR from `(size, icon_id, byte_len)` entries.
pub fn group_icon_dir(entries: &[(u32, u16, u32)]) -> Vec<u8> {
    let mut dir = vec![0, 0, 1, 0];
    dir.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    for &(size, id, len) in entries {
        let dim = if size >= 256 { 0 } else { size as u8 };
        dir.extend_from_slice(&[dim, dim, 0, 0]);
        dir.extend_from_slice(&1u16.to_le_bytes());
        dir.extend_from_slice(&32u16.to_le_bytes());
        dir.extend_from_slice(&len.to_le_bytes());
        dir.extend_from_slice(&id.to_le_bytes());
    }
    dir
}

/// Builds a PE32+ image whose only section holds the given resources,
/// `(type, id, data)`. Resources of one type must be adjacent.
pub fn build_pe(resources: &[(u32, u32, Vec<u8>)]) -> Vec<u8> {
    let mut types: Vec<(u32, Vec<usize>)> = Vec::new();
    for (i, (type_id, _, _)) in resources.iter().enumerate() {
        match types.last_mut() {
            Some((t, members)) if t == type_id => members.push(i),
            _ => types.push((*type_id, vec![i])),
        }
    }

    let root_size = 16 + 8 * types.len();
    let mut type_dir_offsets = Vec::new();
    let mut cursor = root_size;
    for (_, members) in &types {
        type_dir_offsets.push(cursor);
        cursor += 16 + 8 * members.len();
    }
    let lang_dirs = cursor;
    let data_entries = lang_dirs + 24 * resources.len();
    let mut rsrc = vec![0u8; data_entries + 16 * resources.len()];

    put_u16(&mut rsrc, 14, types.len() as u16);
    for (t, (type_id, members)) in types.iter().enumerate() {
        let root_entry = 16 + 8 * t;
        put_u32(&mut rsrc, root_entry, *type_id);
        put_u32(&mut rsrc, root_entry + 4, HIGH_BIT | type_dir_offsets[t] as u32);

        let type_dir = type_dir_offsets[t];
        put_u16(&mut rsrc, type_dir + 14, members.len() as u16);
        for (m, &res) in members.iter().enumerate() {
            let name_entry = type_dir + 16 + 8 * m;
            put_u32(&mut rsrc, name_entry, resources[res].1);
            put_u32(&mut rsrc, name_entry + 4, HIGH_BIT | (lang_dirs + 24 * res) as u32);
        }
    }

    for (i, (_, _, data)) in resources.iter().enumerate() {
        let lang_dir = lang_dirs + 24 * i;
        let data_entry = data_entries + 16 * i;
        put_u16(&mut rsrc, lang_dir + 14, 1);
        put_u32(&mut rsrc, lang_dir + 16, 0x409);
        put_u32(&mut rsrc, lang_dir + 20, data_entry as u32);

        let data_rva = SECTION_RVA + rsrc.len() as u32;
        put_u32(&mut rsrc, data_entry, data_rva);
        put_u32(&mut rsrc, data_entry + 4, data.len() as u32);
        rsrc.extend_from_slice(data);
    }

    let mut file = vec![0u8; SECTION_FILE_OFFSET];
    file[..2].copy_from_slice(b"MZ");
    put_u32(&mut file, 0x3C, 0x40);
    file[0x40..0x44].copy_from_slice(b"PE\0\0");
    let coff = 0x44;
    put_u16(&mut file, coff, 0x8664);
    put_u16(&mut file, coff + 2, 1);
    put_u16(&mut file, coff + 16, 240);
    let optional = coff + 20;
    put_u16(&mut file, optional, 0x20b);
    put_u32(&mut file, optional + 108, 16);
    put_u32(&mut file, optional + 112 + 16, SECTION_RVA);
    put_u32(&mut file, optional + 112 + 20, rsrc.len() as u32);
    let section = optional + 240;
    file[section..section + 5].copy_from_slice(b".rsrc");
    put_u32(&mut file, section + 8, rsrc.len() as u32);
    put_u32(&mut file, section + 12, SECTION_RVA);
    put_u32(&mut file, section + 16, rsrc.len() as u32);
    put_u32(&mut file, section + 20, SECTION_FILE_OFFSET as u32);

    file.extend_from_slice(&rsrc);
    file
}

/// A PE image with a single square PNG icon of the given size.
pub fn pe_with_icon(size: u32) -> Vec<u8> {
    let png = png_bytes(size);
    let group = group_icon_dir(&[(size, 1, png.len() as u32)]);
    build_pe(&[(3, 1, png), (14, 1, group)])
}
