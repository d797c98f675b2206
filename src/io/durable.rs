use std::fs;
use std::io::{Cursor, Read};
use std::path::Path;
use std::sync::Arc;

use log::trace;
use thiserror::Error;

use crate::instance::{self, SharedInstance};
use crate::io::binary::{read_exact, read_u64, write_usize};

const HEADER: &[u8] = b"OHLD\x00\x01";
const FOOTER: &[u8] = b"END\x00";

/// Upper bound on the declared payload length. The instance payload is a
/// few dozen bytes; anything larger is a corrupt frame, not data.
const MAX_PAYLOAD: u64 = 4096;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("durable form ends before a complete frame was read")]
    Truncated,
    #[error("invalid durable form header")]
    InvalidHeader,
    #[error("declared payload length {0} exceeds the frame limit")]
    Oversized(u64),
    #[error("malformed instance payload: {0}")]
    Payload(#[from] bincode::Error),
    #[error("invalid durable form footer")]
    InvalidFooter,
}

impl From<std::io::Error> for DecodeError {
    fn from(_: std::io::Error) -> Self {
        // Decode reads come from an in-memory cursor; the only way they
        // fail is running off the end of the input.
        DecodeError::Truncated
    }
}

/// Encodes the instance into its framed durable form.
///
/// The byte layout (header, little-endian payload length, bincode payload,
/// footer) is not a compatibility contract; only the restore semantics are.
pub fn encode(value: &SharedInstance) -> crate::Result<Vec<u8>> {
    let payload = bincode::serialize(value)?;
    let mut buf = Vec::with_capacity(HEADER.len() + 8 + payload.len() + FOOTER.len());
    buf.extend_from_slice(HEADER);
    write_usize(&mut buf, payload.len())?;
    buf.extend_from_slice(&payload);
    buf.extend_from_slice(FOOTER);
    Ok(buf)
}

/// Restores from a durable form produced by [`encode`].
///
/// Decodes and validates a candidate from `bytes`, then discards it and
/// returns the process's canonical instance, creating it through the
/// regular one-time path if it is somehow still absent. Restoring is an
/// identity-preserving lookup, not a constructor call: any number of round
/// trips through the durable form land on the same live value.
pub fn restore(bytes: &[u8]) -> Result<Arc<SharedInstance>, DecodeError> {
    let candidate = decode(bytes)?;
    trace!(
        "discarding decoded candidate {} in favor of the canonical instance",
        candidate.id()
    );
    Ok(instance::get())
}

/// Encodes the canonical instance and writes it to `path`.
pub fn save_to_path(path: &Path) -> crate::Result<()> {
    let bytes = encode(&instance::get())?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, &bytes)?;
    trace!("saved shared instance durable form to {path:?}");
    Ok(())
}

/// Reads a durable form from `path` and [`restore`]s it.
pub fn load_from_path(path: &Path) -> crate::Result<Arc<SharedInstance>> {
    let bytes = fs::read(path)?;
    trace!("read {} byte durable form from {path:?}", bytes.len());
    Ok(restore(&bytes)?)
}

fn decode(bytes: &[u8]) -> Result<SharedInstance, DecodeError> {
    let mut stream = Cursor::new(bytes);
    if read_exact(&mut stream, HEADER.len())? != HEADER {
        return Err(DecodeError::InvalidHeader);
    }
    let len = read_u64(&mut stream)?;
    if len > MAX_PAYLOAD {
        return Err(DecodeError::Oversized(len));
    }
    let payload = read_exact(&mut stream, len as usize)?;
    let candidate = bincode::deserialize::<SharedInstance>(&payload)?;
    if read_exact(&mut stream, FOOTER.len())? != FOOTER {
        return Err(DecodeError::InvalidFooter);
    }
    let mut eof = [0];
    if stream.read(&mut eof)? != 0 {
        return Err(DecodeError::InvalidFooter);
    }
    Ok(candidate)
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use super::{decode, encode, restore, DecodeError, FOOTER, HEADER};
    use crate::instance;
    use crate::io::binary::write_u64;

    #[test]
    fn test_decode_candidate_round_trips_content() {
        let bytes = encode(&instance::get()).unwrap();
        let candidate = decode(&bytes).unwrap();
        assert_eq!(candidate.id(), instance::get().id());
    }

    #[test]
    fn test_restore_returns_canonical_instance() {
        let original = instance::get();
        let bytes = encode(&original).unwrap();
        let restored = restore(&bytes).unwrap();
        assert!(Arc::ptr_eq(&original, &restored));
    }

    #[test]
    fn test_restore_empty_input() {
        assert!(matches!(restore(&[]), Err(DecodeError::Truncated)));
    }

    #[test]
    fn test_restore_bad_magic() {
        assert!(matches!(
            restore(b"not a durable form at all"),
            Err(DecodeError::InvalidHeader)
        ));
    }

    #[test]
    fn test_restore_truncated_payload() {
        let bytes = encode(&instance::get()).unwrap();
        assert!(matches!(
            restore(&bytes[..bytes.len() / 2]),
            Err(DecodeError::Truncated)
        ));
    }

    #[test]
    fn test_restore_bad_footer() {
        let mut bytes = encode(&instance::get()).unwrap();
        let last = bytes.len() - 1;
        bytes[last] = b'!';
        assert!(matches!(restore(&bytes), Err(DecodeError::InvalidFooter)));
    }

    #[test]
    fn test_restore_trailing_bytes() {
        let mut bytes = encode(&instance::get()).unwrap();
        bytes.push(0);
        assert!(matches!(restore(&bytes), Err(DecodeError::InvalidFooter)));
    }

    #[test]
    fn test_restore_oversized_length() {
        let mut bytes = Vec::from(HEADER);
        write_u64(&mut bytes, u64::MAX).unwrap();
        assert!(matches!(
            restore(&bytes),
            Err(DecodeError::Oversized(u64::MAX))
        ));
    }

    #[test]
    fn test_restore_garbage_payload() {
        let mut bytes = Vec::from(HEADER);
        write_u64(&mut bytes, 3).unwrap();
        bytes.extend_from_slice(&[0xFF, 0xFF, 0xFF]);
        bytes.extend_from_slice(FOOTER);
        assert!(matches!(restore(&bytes), Err(DecodeError::Payload(_))));
    }
}
