//! Minimal FLAC files for tests: a STREAMINFO block, a Vorbis comment block
//! and an optional PICTURE block, with no audio frames.

use std::fs;
use std::io;
use std::path::Path;

const BLOCK_STREAMINFO: u8 = 0;
const BLOCK_VORBIS_COMMENT: u8 = 4;
const BLOCK_PICTURE: u8 = 6;
const PICTURE_FRONT_COVER: u32 = 3;

pub struct FixturePicture<'a> {
    pub mime: &'a str,
    pub data: &'a [u8],
}

pub fn write_flac(
    path: &Path,
    comments: &[(&str, &str)],
    picture: Option<FixturePicture<'_>>,
) -> io::Result<()> {
    fs::write(path, flac_bytes(comments, picture))
}

pub fn flac_bytes(comments: &[(&str, &str)], picture: Option<FixturePicture<'_>>) -> Vec<u8> {
    let mut blocks = vec![
        (BLOCK_STREAMINFO, stream_info()),
        (BLOCK_VORBIS_COMMENT, vorbis_comment(comments)),
    ];
    if let Some(picture) = picture {
        blocks.push((BLOCK_PICTURE, picture_block(&picture)));
    }

    let mut out = b"fLaC".to_vec();
    let last = blocks.len() - 1;
    for (index, (kind, body)) in blocks.into_iter().enumerate() {
        let flag = if index == last { 0x80 } else { 0 };
        out.push(flag | kind);
        let len = body.len() as u32;
        out.extend_from_slice(&len.to_be_bytes()[1..]);
        out.extend_from_slice(&body);
    }
    out
}

fn stream_info() -> Vec<u8> {
    let mut out = Vec::with_capacity(34);
    out.extend_from_slice(&4096u16.to_be_bytes());
    out.extend_from_slice(&4096u16.to_be_bytes());
    out.extend_from_slice(&[0, 0, 0]);
    out.extend_from_slice(&[0, 0, 0]);
    // 20 bits rate, 3 bits channels-1, 5 bits depth-1, 36 bits samples
    let packed: u64 = (44_100u64 << 44) | (1u64 << 41) | (15u64 << 36) | 44_100u64;
    out.extend_from_slice(&packed.to_be_bytes());
    out.extend_from_slice(&[0u8; 16]);
    out
}

fn vorbis_comment(comments: &[(&str, &str)]) -> Vec<u8> {
    let vendor = b"fixture";
    let mut out = Vec::new();
    out.extend_from_slice(&(vendor.len() as u32).to_le_bytes());
    out.extend_from_slice(vendor);
    out.extend_from_slice(&(comments.len() as u32).to_le_bytes());
    for (key, value) in comments {
        let entry = format!("{}={}", key, value);
        out.extend_from_slice(&(entry.len() as u32).to_le_bytes());
        out.extend_from_slice(entry.as_bytes());
    }
    out
}

fn picture_block(picture: &FixturePicture<'_>) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&PICTURE_FRONT_COVER.to_be_bytes());
    out.extend_from_slice(&(picture.mime.len() as u32).to_be_bytes());
    out.extend_from_slice(picture.mime.as_bytes());
    out.extend_from_slice(&0u32.to_be_bytes());
    for dimension in [1u32, 1, 24, 0] {
        out.extend_from_slice(&dimension.to_be_bytes());
    }
    out.extend_from_slice(&(picture.data.len() as u32).to_be_bytes());
    out.extend_from_slice(picture.data);
    out
}
