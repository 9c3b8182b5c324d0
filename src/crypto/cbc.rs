use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto::aes::{Aes256, BLOCK_SIZE, KEY_SIZE};
use crate::error::ProvisionError;

/// Length of the IV persisted in the record.
pub const STORED_IV_LEN: usize = 8;

/// Widens the stored 8-byte IV to a cipher block by cyclic repetition.
pub fn widen_iv(iv: &[u8; STORED_IV_LEN]) -> [u8; BLOCK_SIZE] {
    let mut full = [0u8; BLOCK_SIZE];
    for (i, byte) in full.iter_mut().enumerate() {
        *byte = iv[i % STORED_IV_LEN];
    }
    full
}

/// Call-scoped CBC context: key and IV as plain data, no cipher state kept
/// between calls.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct CbcContext {
    key: [u8; KEY_SIZE],
    iv: [u8; BLOCK_SIZE],
}

impl CbcContext {
    pub fn new(key: &[u8; KEY_SIZE], iv: [u8; BLOCK_SIZE]) -> Self {
        Self { key: *key, iv }
    }

    pub fn iv(&self) -> &[u8; BLOCK_SIZE] {
        &self.iv
    }

    pub fn encrypt_in_place(&self, buf: &mut [u8]) -> Result<(), ProvisionError> {
        if buf.len() % BLOCK_SIZE != 0 {
            return Err(ProvisionError::UnalignedInput);
        }

        let cipher = Aes256::new(&self.key);
        let mut chain = self.iv;
        for chunk in buf.chunks_exact_mut(BLOCK_SIZE) {
            let block: &mut [u8; BLOCK_SIZE] = chunk
                .try_into()
                .map_err(|_| ProvisionError::UnalignedInput)?;
            xor_block(block, &chain);
            cipher.encrypt_block(block);
            chain = *block;
        }
        chain.zeroize();
        Ok(())
    }

    pub fn decrypt_in_place(&self, buf: &mut [u8]) -> Result<(), ProvisionError> {
        if buf.len() % BLOCK_SIZE != 0 {
            return Err(ProvisionError::UnalignedInput);
        }

        let cipher = Aes256::new(&self.key);
        let mut chain = self.iv;
        for chunk in buf.chunks_exact_mut(BLOCK_SIZE) {
            let block: &mut [u8; BLOCK_SIZE] = chunk
                .try_into()
                .map_err(|_| ProvisionError::UnalignedInput)?;
            let ciphertext = *block;
            cipher.decrypt_block(block);
            xor_block(block, &chain);
            chain = ciphertext;
        }
        chain.zeroize();
        Ok(())
    }

    /// Encrypts `input` into an output buffer of the same size.
    pub fn encrypt(&self, input: &[u8], output: &mut [u8]) -> Result<(), ProvisionError> {
        if input.len() != output.len() {
            return Err(ProvisionError::FieldOverflow);
        }
        output.copy_from_slice(input);
        self.encrypt_in_place(output)
    }

    pub fn decrypt(&self, input: &[u8], output: &mut [u8]) -> Result<(), ProvisionError> {
        if input.len() != output.len() {
            return Err(ProvisionError::FieldOverflow);
        }
        output.copy_from_slice(input);
        self.decrypt_in_place(output)
    }
}

fn xor_block(block: &mut [u8; BLOCK_SIZE], mask: &[u8; BLOCK_SIZE]) {
    for (byte, m) in block.iter_mut().zip(mask.iter()) {
        *byte ^= m;
    }
}
