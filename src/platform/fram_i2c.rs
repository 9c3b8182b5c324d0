//! FRAM на шине I2C (MB85RC256V и совместимые) поверх `embedded-hal` 0.2.
//!
//! Адрес ячейки передаётся двумя байтами big-endian перед данными; чтение
//! выполняется как write-read без stop-условия между фазами.
use embedded_hal::blocking::i2c::{Write, WriteRead};

use crate::error::ProvisionError;
use crate::store::storage::{check_bounds, ByteStorage};

/// Адрес устройства по умолчанию (A0..A2 притянуты к земле).
pub const DEFAULT_I2C_ADDRESS: u8 = 0x50;
/// Ёмкость MB85RC256V.
pub const MB85RC256V_CAPACITY: usize = 32 * 1024;
/// Максимальный объём данных в одной транзакции.
pub const TRANSFER_CHUNK: usize = 32;

const ADDRESS_BYTES: usize = 2;

pub struct I2cFram<I2C> {
    bus: I2C,
    address: u8,
    capacity: usize,
}

impl<I2C, E> I2cFram<I2C>
where
    I2C: Write<Error = E> + WriteRead<Error = E>,
{
    pub fn new(bus: I2C) -> Self {
        Self::with_address(bus, DEFAULT_I2C_ADDRESS, MB85RC256V_CAPACITY)
    }

    pub fn with_address(bus: I2C, address: u8, capacity: usize) -> Self {
        Self {
            bus,
            address,
            capacity: capacity.min(usize::from(u16::MAX) + 1),
        }
    }

    pub fn release(self) -> I2C {
        self.bus
    }

    fn cell_address(offset: usize) -> Result<[u8; ADDRESS_BYTES], ProvisionError> {
        u16::try_from(offset)
            .map(u16::to_be_bytes)
            .map_err(|_| ProvisionError::OutOfBounds)
    }
}

impl<I2C, E> ByteStorage for I2cFram<I2C>
where
    I2C: Write<Error = E> + WriteRead<Error = E>,
{
    fn capacity(&self) -> usize {
        self.capacity
    }

    fn detect(&mut self) -> bool {
        let mut probe = [0u8; 1];
        self.bus
            .write_read(self.address, &[0, 0], &mut probe)
            .is_ok()
    }

    fn read(&mut self, address: usize, buf: &mut [u8]) -> Result<(), ProvisionError> {
        check_bounds(self.capacity, address, buf.len())?;
        for (index, chunk) in buf.chunks_mut(TRANSFER_CHUNK).enumerate() {
            let cell = Self::cell_address(address + index * TRANSFER_CHUNK)?;
            self.bus
                .write_read(self.address, &cell, chunk)
                .map_err(|_| ProvisionError::StorageUnavailable)?;
        }
        Ok(())
    }

    fn write(&mut self, address: usize, data: &[u8]) -> Result<(), ProvisionError> {
        check_bounds(self.capacity, address, data.len())?;
        let mut frame = [0u8; ADDRESS_BYTES + TRANSFER_CHUNK];
        for (index, chunk) in data.chunks(TRANSFER_CHUNK).enumerate() {
            let cell = Self::cell_address(address + index * TRANSFER_CHUNK)?;
            frame[..ADDRESS_BYTES].copy_from_slice(&cell);
            frame[ADDRESS_BYTES..ADDRESS_BYTES + chunk.len()].copy_from_slice(chunk);
            let result = self
                .bus
                .write(self.address, &frame[..ADDRESS_BYTES + chunk.len()]);
            if result.is_err() {
                frame.fill(0);
                return Err(ProvisionError::StorageUnavailable);
            }
        }
        frame.fill(0);
        Ok(())
    }
}
