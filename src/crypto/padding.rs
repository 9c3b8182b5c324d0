//! PKCS#7-style padding plus the boundary probe used to recover the true
//! plaintext length from a zero-filled, fixed-capacity window.
use crate::error::ProvisionError;

pub const DEFAULT_BLOCK_SIZE: usize = 16;

/// Number of pad bytes for `data_len`; never zero.
pub const fn pad_len(data_len: usize, block_size: usize) -> usize {
    block_size - (data_len % block_size)
}

pub const fn padded_len(data_len: usize, block_size: usize) -> usize {
    data_len + pad_len(data_len, block_size)
}

/// Appends padding after `data_len` bytes of `buf` and returns the padded length.
/// A block-aligned `data_len` still receives a full block of padding.
pub fn add_padding(
    buf: &mut [u8],
    data_len: usize,
    block_size: usize,
) -> Result<usize, ProvisionError> {
    if block_size == 0 || block_size > u8::MAX as usize {
        return Err(ProvisionError::UnalignedInput);
    }
    let pad = pad_len(data_len, block_size);
    let total = data_len
        .checked_add(pad)
        .ok_or(ProvisionError::FieldOverflow)?;
    if total > buf.len() {
        return Err(ProvisionError::FieldOverflow);
    }
    buf[data_len..total].fill(pad as u8);
    Ok(total)
}

/// Returns the unpadded length of `buf[..total_len]`, or `None` when its tail
/// is not valid padding.
pub fn remove_padding(buf: &[u8], total_len: usize, block_size: usize) -> Option<usize> {
    if total_len == 0 || total_len > buf.len() {
        return None;
    }
    let candidate = buf[total_len - 1] as usize;
    if candidate == 0 || candidate > block_size || candidate > total_len {
        return None;
    }
    let tail = &buf[total_len - candidate..total_len];
    if !tail.iter().all(|byte| *byte as usize == candidate) {
        return None;
    }
    Some(total_len - candidate)
}

/// Probes every block boundary in increasing order and returns the unpadded
/// length at the first boundary carrying valid padding.
///
/// Boundaries that would leave an empty payload are skipped: stored fields are
/// never empty. The first hit wins even if a later boundary also looks valid.
pub fn probe_unpadded_len(buf: &[u8], block_size: usize) -> Option<usize> {
    if block_size == 0 {
        return None;
    }
    (block_size..=buf.len())
        .step_by(block_size)
        .find_map(|boundary| remove_padding(buf, boundary, block_size).filter(|len| *len > 0))
}
