//! Прямой доступ к таймеру и АЦП RP2040 без HAL.
//!
//! Блоки TIMER и ADC должны быть выведены из reset и затактированы до первого
//! обращения; на плате это делает инициализация часов `rp2040-hal`.
use core::hint::spin_loop;
use core::ptr::{read_volatile, write_volatile};

use crate::error::ProvisionError;
use crate::platform::hal::{AnalogSampler, MonotonicTimer};

const TIMER_BASE: usize = 0x4005_4000;
const TIMER_RAW_HIGH_OFFSET: usize = 0x24;
const TIMER_RAW_LOW_OFFSET: usize = 0x28;

const ADC_BASE: usize = 0x4004_c000;
const ADC_CS_OFFSET: usize = 0x00;
const ADC_RESULT_OFFSET: usize = 0x04;
const ADC_CS_EN: u32 = 1 << 0;
const ADC_CS_START_ONCE: u32 = 1 << 2;
const ADC_CS_READY: u32 = 1 << 8;
const ADC_CS_AINSEL_SHIFT: u32 = 12;
const ADC_CS_AINSEL_MASK: u32 = 0x7 << ADC_CS_AINSEL_SHIFT;
const ADC_READY_SPINS: usize = 10_000;
const ADC_CHANNELS: u8 = 5;

#[inline(always)]
fn reg(offset: usize) -> *mut u32 {
    offset as *mut u32
}

#[inline(always)]
fn timer_raw_low() -> u32 {
    unsafe { read_volatile(reg(TIMER_BASE + TIMER_RAW_LOW_OFFSET)) }
}

#[inline(always)]
fn timer_raw_high() -> u32 {
    unsafe { read_volatile(reg(TIMER_BASE + TIMER_RAW_HIGH_OFFSET)) }
}

pub struct Rp2040Timer;

impl Rp2040Timer {
    pub const fn new() -> Self {
        Self
    }

    /// 64-битное время в микросекундах; старшее слово перечитывается при переносе.
    pub fn now_ticks(&self) -> u64 {
        loop {
            let high = timer_raw_high();
            let low = timer_raw_low();
            if timer_raw_high() == high {
                return (u64::from(high) << 32) | u64::from(low);
            }
        }
    }

    pub fn delay_us(&mut self, micros: u32) {
        let start = timer_raw_low();
        while timer_raw_low().wrapping_sub(start) < micros {
            spin_loop();
        }
    }
}

impl Default for Rp2040Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicTimer for Rp2040Timer {
    fn now_micros(&self) -> u64 {
        self.now_ticks()
    }

    fn delay_ms(&mut self, ms: u32) {
        for _ in 0..ms {
            self.delay_us(1_000);
        }
    }
}

/// Однократные преобразования АЦП на неподключённом входе.
pub struct Rp2040Adc {
    channel: u8,
}

impl Rp2040Adc {
    /// Каналы 0..=3 соответствуют GPIO26..GPIO29, 4 — датчик температуры.
    pub fn new(channel: u8) -> Result<Self, ProvisionError> {
        if channel >= ADC_CHANNELS {
            return Err(ProvisionError::EntropyUnavailable);
        }
        Ok(Self { channel })
    }
}

impl AnalogSampler for Rp2040Adc {
    fn sample(&mut self) -> Result<u16, ProvisionError> {
        let cs = reg(ADC_BASE + ADC_CS_OFFSET);
        unsafe {
            let mut value = read_volatile(cs) & !ADC_CS_AINSEL_MASK;
            value |= ADC_CS_EN | (u32::from(self.channel) << ADC_CS_AINSEL_SHIFT);
            write_volatile(cs, value);
            write_volatile(cs, value | ADC_CS_START_ONCE);
        }

        for _ in 0..ADC_READY_SPINS {
            let status = unsafe { read_volatile(cs) };
            if status & ADC_CS_READY != 0 {
                let raw = unsafe { read_volatile(reg(ADC_BASE + ADC_RESULT_OFFSET)) };
                return Ok((raw & 0x0FFF) as u16);
            }
            spin_loop();
        }
        Err(ProvisionError::EntropyUnavailable)
    }
}
