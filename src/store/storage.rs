//! Байтовое хранилище с фиксированным адресным пространством.
use crate::error::ProvisionError;

/// Доступ к энергонезависимой памяти по абсолютным адресам.
pub trait ByteStorage {
    fn capacity(&self) -> usize;

    /// Отвечает ли устройство; реализации без шины всегда присутствуют.
    fn detect(&mut self) -> bool {
        true
    }

    fn read(&mut self, address: usize, buf: &mut [u8]) -> Result<(), ProvisionError>;
    fn write(&mut self, address: usize, data: &[u8]) -> Result<(), ProvisionError>;
}

impl<S: ByteStorage + ?Sized> ByteStorage for &mut S {
    fn capacity(&self) -> usize {
        (**self).capacity()
    }

    fn detect(&mut self) -> bool {
        (**self).detect()
    }

    fn read(&mut self, address: usize, buf: &mut [u8]) -> Result<(), ProvisionError> {
        (**self).read(address, buf)
    }

    fn write(&mut self, address: usize, data: &[u8]) -> Result<(), ProvisionError> {
        (**self).write(address, data)
    }
}

pub fn check_bounds(capacity: usize, address: usize, len: usize) -> Result<(), ProvisionError> {
    let end = address
        .checked_add(len)
        .ok_or(ProvisionError::OutOfBounds)?;
    if end > capacity {
        Err(ProvisionError::OutOfBounds)
    } else {
        Ok(())
    }
}

/// FRAM в оперативной памяти: для хоста, тестов и эмуляции.
pub struct MemoryFram<const N: usize> {
    cells: [u8; N],
    present: bool,
}

impl<const N: usize> MemoryFram<N> {
    pub const fn new() -> Self {
        Self {
            cells: [0u8; N],
            present: true,
        }
    }

    pub const fn filled(value: u8) -> Self {
        Self {
            cells: [value; N],
            present: true,
        }
    }

    /// Имитирует отключённое устройство: `detect` вернёт `false`.
    pub fn set_present(&mut self, present: bool) {
        self.present = present;
    }

    pub fn as_bytes(&self) -> &[u8; N] {
        &self.cells
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8; N] {
        &mut self.cells
    }
}

impl<const N: usize> Default for MemoryFram<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> ByteStorage for MemoryFram<N> {
    fn capacity(&self) -> usize {
        N
    }

    fn detect(&mut self) -> bool {
        self.present
    }

    fn read(&mut self, address: usize, buf: &mut [u8]) -> Result<(), ProvisionError> {
        if !self.present {
            return Err(ProvisionError::StorageUnavailable);
        }
        check_bounds(N, address, buf.len())?;
        buf.copy_from_slice(&self.cells[address..address + buf.len()]);
        Ok(())
    }

    fn write(&mut self, address: usize, data: &[u8]) -> Result<(), ProvisionError> {
        if !self.present {
            return Err(ProvisionError::StorageUnavailable);
        }
        check_bounds(N, address, data.len())?;
        self.cells[address..address + data.len()].copy_from_slice(data);
        Ok(())
    }
}
