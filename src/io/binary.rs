use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Result, Write};

/// Reads exactly `len` bytes and gives you back a new vector of length
/// `len`.
///
/// Fails with the same conditions as `read_exact`, including EOF before
/// `len` bytes were available.
pub fn read_exact(stream: &mut dyn Read, len: usize) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; len];
    stream.read_exact(&mut buf)?;
    Ok(buf)
}

#[inline]
pub fn write_u64(stream: &mut dyn Write, i: u64) -> Result<()> {
    stream.write_u64::<LittleEndian>(i)
}

#[inline]
pub fn write_usize(stream: &mut dyn Write, i: usize) -> Result<()> {
    write_u64(stream, i as u64)
}

#[inline]
pub fn read_u64(stream: &mut dyn Read) -> Result<u64> {
    stream.read_u64::<LittleEndian>()
}
