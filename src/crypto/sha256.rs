//! Потоковый SHA-256 без внешних зависимостей.
//!
//! Используется для вывода ключа записи и для хранения дайджеста
//! административного пароля вместо самого пароля.
//!
//! # Пример
//! ```
//! use fram_provision::crypto::sha256::Sha256;
//!
//! let mut hasher = Sha256::new();
//! hasher.update(b"ab");
//! hasher.update(b"c");
//! assert_eq!(hasher.finalize(), Sha256::digest(b"abc"));
//! ```
use zeroize::Zeroize;

pub const DIGEST_LEN: usize = 32;
pub const BLOCK_LEN: usize = 64;
/// Длина hex-представления дайджеста.
pub const HEX_DIGEST_LEN: usize = DIGEST_LEN * 2;

const INITIAL_STATE: [u32; 8] = [
    0x6a09e667, 0xbb67ae85, 0x3c6ef372, 0xa54ff53a, 0x510e527f, 0x9b05688c, 0x1f83d9ab, 0x5be0cd19,
];

const ROUND_CONSTANTS: [u32; 64] = [
    0x428a2f98, 0x71374491, 0xb5c0fbcf, 0xe9b5dba5, 0x3956c25b, 0x59f111f1, 0x923f82a4, 0xab1c5ed5,
    0xd807aa98, 0x12835b01, 0x243185be, 0x550c7dc3, 0x72be5d74, 0x80deb1fe, 0x9bdc06a7, 0xc19bf174,
    0xe49b69c1, 0xefbe4786, 0x0fc19dc6, 0x240ca1cc, 0x2de92c6f, 0x4a7484aa, 0x5cb0a9dc, 0x76f988da,
    0x983e5152, 0xa831c66d, 0xb00327c8, 0xbf597fc7, 0xc6e00bf3, 0xd5a79147, 0x06ca6351, 0x14292967,
    0x27b70a85, 0x2e1b2138, 0x4d2c6dfc, 0x53380d13, 0x650a7354, 0x766a0abb, 0x81c2c92e, 0x92722c85,
    0xa2bfe8a1, 0xa81a664b, 0xc24b8b70, 0xc76c51a3, 0xd192e819, 0xd6990624, 0xf40e3585, 0x106aa070,
    0x19a4c116, 0x1e376c08, 0x2748774c, 0x34b0bcb5, 0x391c0cb3, 0x4ed8aa4a, 0x5b9cca4f, 0x682e6ff3,
    0x748f82ee, 0x78a5636f, 0x84c87814, 0x8cc70208, 0x90befffa, 0xa4506ceb, 0xbef9a3f7, 0xc67178f2,
];

/// Состояние хеша: накопленный неполный блок и длина сообщения в битах.
#[derive(Clone)]
pub struct Sha256 {
    state: [u32; 8],
    block: [u8; BLOCK_LEN],
    block_len: usize,
    bit_len: u64,
}

impl Sha256 {
    pub const fn new() -> Self {
        Self {
            state: INITIAL_STATE,
            block: [0u8; BLOCK_LEN],
            block_len: 0,
            bit_len: 0,
        }
    }

    /// Возвращает хеш в исходное состояние.
    pub fn reset(&mut self) {
        self.state = INITIAL_STATE;
        self.block.zeroize();
        self.block_len = 0;
        self.bit_len = 0;
    }

    /// Добавляет произвольный фрагмент данных; вызывается сколько угодно раз.
    pub fn update(&mut self, mut data: &[u8]) {
        while !data.is_empty() {
            let take = (BLOCK_LEN - self.block_len).min(data.len());
            self.block[self.block_len..self.block_len + take].copy_from_slice(&data[..take]);
            self.block_len += take;
            data = &data[take..];

            if self.block_len == BLOCK_LEN {
                self.compress_block();
                self.bit_len = self.bit_len.wrapping_add((BLOCK_LEN as u64) * 8);
                self.block_len = 0;
            }
        }
    }

    /// Дописывает паддинг с длиной сообщения и возвращает дайджест.
    pub fn finalize(mut self) -> [u8; DIGEST_LEN] {
        let total_bits = self.bit_len.wrapping_add((self.block_len as u64) * 8);

        let used = self.block_len;
        self.block[used] = 0x80;
        self.block[used + 1..].fill(0);
        if used >= BLOCK_LEN - 8 {
            self.compress_block();
            self.block.fill(0);
        }
        self.block[BLOCK_LEN - 8..].copy_from_slice(&total_bits.to_be_bytes());
        self.compress_block();

        let mut out = [0u8; DIGEST_LEN];
        for (chunk, word) in out.chunks_exact_mut(4).zip(self.state.iter()) {
            chunk.copy_from_slice(&word.to_be_bytes());
        }
        out
    }

    /// Однократный хеш слайса.
    pub fn digest(data: &[u8]) -> [u8; DIGEST_LEN] {
        let mut hasher = Self::new();
        hasher.update(data);
        hasher.finalize()
    }

    fn compress_block(&mut self) {
        let mut schedule = [0u32; 64];
        for (i, chunk) in self.block.chunks_exact(4).enumerate() {
            schedule[i] = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        for i in 16..64 {
            schedule[i] = small_sigma1(schedule[i - 2])
                .wrapping_add(schedule[i - 7])
                .wrapping_add(small_sigma0(schedule[i - 15]))
                .wrapping_add(schedule[i - 16]);
        }

        let [mut a, mut b, mut c, mut d, mut e, mut f, mut g, mut h] = self.state;
        for i in 0..64 {
            let t1 = h
                .wrapping_add(big_sigma1(e))
                .wrapping_add(choose(e, f, g))
                .wrapping_add(ROUND_CONSTANTS[i])
                .wrapping_add(schedule[i]);
            let t2 = big_sigma0(a).wrapping_add(majority(a, b, c));
            h = g;
            g = f;
            f = e;
            e = d.wrapping_add(t1);
            d = c;
            c = b;
            b = a;
            a = t1.wrapping_add(t2);
        }

        for (word, add) in self.state.iter_mut().zip([a, b, c, d, e, f, g, h]) {
            *word = word.wrapping_add(add);
        }
        schedule.zeroize();
    }
}

impl Default for Sha256 {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Sha256 {
    fn drop(&mut self) {
        self.block.zeroize();
        self.state.zeroize();
    }
}

/// Пишет дайджест в нижнем регистре hex в `out`.
pub fn hex_digest(data: &[u8], out: &mut [u8; HEX_DIGEST_LEN]) {
    let mut digest = Sha256::digest(data);
    let encoded = hex::encode_to_slice(digest, out);
    debug_assert!(encoded.is_ok(), "HEX_DIGEST_LEN must be 2 * DIGEST_LEN");
    digest.zeroize();
}

#[inline(always)]
fn choose(e: u32, f: u32, g: u32) -> u32 {
    (e & f) ^ (!e & g)
}

#[inline(always)]
fn majority(a: u32, b: u32, c: u32) -> u32 {
    (a & b) ^ (a & c) ^ (b & c)
}

#[inline(always)]
fn big_sigma0(x: u32) -> u32 {
    x.rotate_right(2) ^ x.rotate_right(13) ^ x.rotate_right(22)
}

#[inline(always)]
fn big_sigma1(x: u32) -> u32 {
    x.rotate_right(6) ^ x.rotate_right(11) ^ x.rotate_right(25)
}

#[inline(always)]
fn small_sigma0(x: u32) -> u32 {
    x.rotate_right(7) ^ x.rotate_right(18) ^ (x >> 3)
}

#[inline(always)]
fn small_sigma1(x: u32) -> u32 {
    x.rotate_right(17) ^ x.rotate_right(19) ^ (x >> 10)
}
