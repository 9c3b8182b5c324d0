//! Минимальные аппаратные контракты: таймер и аналоговый вход.
use core::cell::Cell;

use crate::error::ProvisionError;

/// Монотонный таймер в микросекундах.
pub trait MonotonicTimer {
    fn now_micros(&self) -> u64;
    fn delay_ms(&mut self, ms: u32);
}

impl<T: MonotonicTimer + ?Sized> MonotonicTimer for &mut T {
    fn now_micros(&self) -> u64 {
        (**self).now_micros()
    }

    fn delay_ms(&mut self, ms: u32) {
        (**self).delay_ms(ms)
    }
}

/// Один отсчёт с плавающего аналогового входа, используется как шум.
pub trait AnalogSampler {
    fn sample(&mut self) -> Result<u16, ProvisionError>;
}

impl<A: AnalogSampler + ?Sized> AnalogSampler for &mut A {
    fn sample(&mut self) -> Result<u16, ProvisionError> {
        (**self).sample()
    }
}

/// Программный таймер для тестов и хоста: время идёт только через `delay_ms`/`advance_micros`.
pub struct SoftwareTimer {
    micros: Cell<u64>,
}

impl SoftwareTimer {
    pub const fn new() -> Self {
        Self {
            micros: Cell::new(0),
        }
    }

    pub const fn starting_at(micros: u64) -> Self {
        Self {
            micros: Cell::new(micros),
        }
    }

    pub fn advance_micros(&self, delta: u64) {
        self.micros.set(self.micros.get().wrapping_add(delta));
    }
}

impl Default for SoftwareTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicTimer for SoftwareTimer {
    fn now_micros(&self) -> u64 {
        self.micros.get()
    }

    fn delay_ms(&mut self, ms: u32) {
        self.advance_micros(u64::from(ms) * 1_000);
    }
}

/// Аналоговый вход с заранее заданной последовательностью отсчётов.
pub struct ScriptedAnalog<'a> {
    samples: &'a [u16],
    cursor: usize,
}

impl<'a> ScriptedAnalog<'a> {
    pub const fn new(samples: &'a [u16]) -> Self {
        Self { samples, cursor: 0 }
    }
}

impl<'a> AnalogSampler for ScriptedAnalog<'a> {
    fn sample(&mut self) -> Result<u16, ProvisionError> {
        if self.samples.is_empty() {
            return Err(ProvisionError::EntropyUnavailable);
        }
        let value = self.samples[self.cursor % self.samples.len()];
        self.cursor = self.cursor.wrapping_add(1);
        Ok(value)
    }
}
