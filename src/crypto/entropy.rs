//! Откуда берётся 8-байтовый IV записи.
//!
//! На плате IV даёт [`TimerNoiseEntropy`]; если АЦП не отвечает,
//! [`FallbackEntropy`] переходит на [`PseudoEntropy`]. В тестах и демо IV
//! фиксируется через [`MockEntropy`] или [`DummyEntropy`].
//!
//! ```
//! use fram_provision::crypto::entropy::MockEntropy;
//! use fram_provision::record::{encode, PlainCredentials, RecordImage};
//!
//! let plain = PlainCredentials::new("NODE_7", "Net", "pass", "admin", "tok").unwrap();
//! let iv = [9u8, 8, 7, 6, 5, 4, 3, 2];
//! let mut image = RecordImage::zeroed();
//! encode(&plain, &mut MockEntropy::from_slice(&iv), &mut image).unwrap();
//! assert_eq!(image.iv(), iv);
//! ```
use core::cmp::min;

use zeroize::Zeroize;

use crate::crypto::sha256::{Sha256, DIGEST_LEN};
use crate::error::ProvisionError;
use crate::platform::hal::{AnalogSampler, MonotonicTimer};

/// Поставщик случайных байтов для IV.
pub trait EntropySource {
    fn fill_bytes(&mut self, out: &mut [u8]) -> Result<(), ProvisionError>;
}

impl<E: EntropySource + ?Sized> EntropySource for &mut E {
    fn fill_bytes(&mut self, out: &mut [u8]) -> Result<(), ProvisionError> {
        (**self).fill_bytes(out)
    }
}

/// IV `00 01 02 ...`: одинаковые записи от запуска к запуску.
pub struct DummyEntropy;

impl EntropySource for DummyEntropy {
    fn fill_bytes(&mut self, out: &mut [u8]) -> Result<(), ProvisionError> {
        for (i, byte) in out.iter_mut().enumerate() {
            *byte = (i & 0xFF) as u8;
        }
        Ok(())
    }
}

/// Отдаёт `data` по кругу, продолжая с места прошлой остановки.
///
/// Пустой слайс ведёт себя как отсутствующий источник.
pub struct MockEntropy<'a> {
    data: &'a [u8],
    cursor: usize,
    error: Option<ProvisionError>,
}

impl<'a> MockEntropy<'a> {
    pub const fn from_slice(data: &'a [u8]) -> Self {
        Self {
            data,
            cursor: 0,
            error: None,
        }
    }

    /// Всегда возвращает `ProvisionError::EntropyUnavailable`.
    pub const fn unavailable() -> Self {
        Self::with_error(ProvisionError::EntropyUnavailable)
    }

    pub const fn with_error(error: ProvisionError) -> Self {
        Self {
            data: &[],
            cursor: 0,
            error: Some(error),
        }
    }
}

impl<'a> EntropySource for MockEntropy<'a> {
    fn fill_bytes(&mut self, out: &mut [u8]) -> Result<(), ProvisionError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        if self.data.is_empty() {
            return Err(ProvisionError::EntropyUnavailable);
        }

        for (i, byte) in out.iter_mut().enumerate() {
            *byte = self.data[(self.cursor + i) % self.data.len()];
        }
        self.cursor = (self.cursor + out.len()) % self.data.len();
        Ok(())
    }
}

/// Цепочка SHA-256 от seed'а; запасной IV, когда аппаратного шума нет.
pub struct PseudoEntropy {
    state: [u8; DIGEST_LEN],
    counter: u64,
}

impl PseudoEntropy {
    pub fn new(seed: [u8; DIGEST_LEN]) -> Self {
        Self {
            state: seed,
            counter: 0,
        }
    }
}

impl EntropySource for PseudoEntropy {
    fn fill_bytes(&mut self, out: &mut [u8]) -> Result<(), ProvisionError> {
        let mut produced = 0usize;
        while produced < out.len() {
            let mut hasher = Sha256::new();
            hasher.update(b"fram-provision-pseudo-entropy");
            hasher.update(&self.state);
            hasher.update(&self.counter.to_le_bytes());
            let mut block = hasher.finalize();
            let take = min(block.len(), out.len() - produced);
            out[produced..produced + take].copy_from_slice(&block[..take]);
            self.state.copy_from_slice(&block);
            self.counter = self.counter.wrapping_add(1);
            block.zeroize();
            produced += take;
        }
        Ok(())
    }
}

impl Drop for PseudoEntropy {
    fn drop(&mut self) {
        self.state.zeroize();
    }
}

/// `secondary` используется только при `EntropyUnavailable`; прочие ошибки
/// `primary` возвращаются как есть.
pub struct FallbackEntropy<P, S> {
    primary: P,
    secondary: S,
}

impl<P, S> FallbackEntropy<P, S> {
    pub const fn new(primary: P, secondary: S) -> Self {
        Self { primary, secondary }
    }
}

impl<P, S> EntropySource for FallbackEntropy<P, S>
where
    P: EntropySource,
    S: EntropySource,
{
    fn fill_bytes(&mut self, out: &mut [u8]) -> Result<(), ProvisionError> {
        match self.primary.fill_bytes(out) {
            Ok(()) => Ok(()),
            Err(ProvisionError::EntropyUnavailable) => self.secondary.fill_bytes(out),
            Err(err) => Err(err),
        }
    }
}

/// Задержка между байтами, чтобы джиттер таймера успевал накопиться.
pub const NOISE_DELAY_MS: u32 = 1;

/// Энтропия из джиттера таймера и шума плавающего аналогового входа.
///
/// Seed собирается из показаний таймера и АЦП, разворачивается в поток через
/// [`PseudoEntropy`], после чего каждый байт дополнительно смешивается с
/// младшими битами таймера, снятыми с интервалом [`NOISE_DELAY_MS`].
pub struct TimerNoiseEntropy<T, A> {
    timer: T,
    analog: A,
}

impl<T, A> TimerNoiseEntropy<T, A>
where
    T: MonotonicTimer,
    A: AnalogSampler,
{
    pub const fn new(timer: T, analog: A) -> Self {
        Self { timer, analog }
    }

    pub fn release(self) -> (T, A) {
        (self.timer, self.analog)
    }

    fn seed(&mut self) -> Result<[u8; DIGEST_LEN], ProvisionError> {
        let mut hasher = Sha256::new();
        hasher.update(b"fram-provision-timer-noise");
        hasher.update(&self.timer.now_micros().to_le_bytes());
        for _ in 0..4 {
            let sample = self.analog.sample()?;
            hasher.update(&sample.to_le_bytes());
            hasher.update(&self.timer.now_micros().to_le_bytes());
        }
        Ok(hasher.finalize())
    }
}

impl<T, A> EntropySource for TimerNoiseEntropy<T, A>
where
    T: MonotonicTimer,
    A: AnalogSampler,
{
    fn fill_bytes(&mut self, out: &mut [u8]) -> Result<(), ProvisionError> {
        let mut seed = self.seed()?;
        let mut stream = PseudoEntropy::new(seed);
        seed.zeroize();
        stream.fill_bytes(out)?;

        for byte in out.iter_mut() {
            *byte ^= (self.timer.now_micros() & 0xFF) as u8;
            self.timer.delay_ms(NOISE_DELAY_MS);
        }
        Ok(())
    }
}
