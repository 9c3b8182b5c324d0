use core::fmt::{self, Write};

const ROW: usize = 16;

/// Классический дамп: адрес, 16 байт в hex и ASCII-колонка.
pub fn write_hex_dump<W: Write>(out: &mut W, base: usize, data: &[u8]) -> fmt::Result {
    for (row, chunk) in data.chunks(ROW).enumerate() {
        write!(out, "{:08X}: ", base + row * ROW)?;
        for byte in chunk {
            write!(out, "{:02X} ", byte)?;
        }
        for _ in chunk.len()..ROW {
            out.write_str("   ")?;
        }
        out.write_str(" |")?;
        for byte in chunk {
            let shown = if (0x20..0x7f).contains(byte) {
                *byte as char
            } else {
                '.'
            };
            out.write_char(shown)?;
        }
        out.write_str("|\r\n")?;
    }
    Ok(())
}

/// Байты в верхнем регистре hex без разделителей.
pub fn write_hex<W: Write>(out: &mut W, data: &[u8]) -> fmt::Result {
    data.iter().try_for_each(|byte| write!(out, "{:02X}", byte))
}
