use core::fmt::Write;

use heapless::Vec;

use crate::console::SerialPort;
use crate::platform::hal::MonotonicTimer;

/// Пауза между опросами порта, пока байтов нет.
pub const POLL_YIELD_MS: u32 = 1;

const BACKSPACE: u8 = 0x08;
const DELETE: u8 = 0x7f;

/// Построчный ввод с эхом и редактированием через backspace.
///
/// Печатные ASCII-символы сверх ёмкости молча отбрасываются; `\r\n`
/// считается одним концом строки.
pub struct LineReader<const N: usize> {
    buf: Vec<u8, N>,
    after_cr: bool,
}

impl<const N: usize> LineReader<N> {
    pub const fn new() -> Self {
        Self {
            buf: Vec::new(),
            after_cr: false,
        }
    }

    /// Обрабатывает один байт; `true`, когда строка завершена.
    pub fn feed<W: Write>(&mut self, echo: &mut W, byte: u8) -> bool {
        let after_cr = core::mem::replace(&mut self.after_cr, false);
        match byte {
            b'\n' if after_cr => false,
            b'\r' | b'\n' => {
                self.after_cr = byte == b'\r';
                let _ = echo.write_str("\r\n");
                true
            }
            BACKSPACE | DELETE => {
                if self.buf.pop().is_some() {
                    let _ = echo.write_str("\x08 \x08");
                }
                false
            }
            0x20..=0x7e => {
                if self.buf.push(byte).is_ok() {
                    let _ = echo.write_char(byte as char);
                }
                false
            }
            _ => false,
        }
    }

    /// Текущее содержимое; в буфер попадают только печатные ASCII-символы.
    pub fn line(&self) -> &str {
        core::str::from_utf8(&self.buf).unwrap_or("")
    }

    pub fn clear(&mut self) {
        self.buf.fill(0);
        self.buf.clear();
    }

    /// Блокирующее чтение строки с уступкой `POLL_YIELD_MS` между опросами.
    pub fn read_line<P, T>(&mut self, port: &mut P, timer: &mut T) -> &str
    where
        P: SerialPort,
        T: MonotonicTimer,
    {
        self.clear();
        loop {
            match port.read_byte() {
                Some(byte) => {
                    if self.feed(port, byte) {
                        return self.line();
                    }
                }
                None => timer.delay_ms(POLL_YIELD_MS),
            }
        }
    }
}

impl<const N: usize> Default for LineReader<N> {
    fn default() -> Self {
        Self::new()
    }
}
