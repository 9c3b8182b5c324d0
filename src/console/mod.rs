//! Текстовая консоль оператора: построчный ввод, команды и их вывод.
use core::fmt;

pub mod command;
pub mod dump;
pub mod line;
pub mod session;

pub use command::Command;
pub use line::LineReader;
pub use session::{Session, PROMPT};

/// Последовательный порт: неблокирующий опрос входа и форматированный вывод.
pub trait SerialPort: fmt::Write {
    fn read_byte(&mut self) -> Option<u8>;
}

impl<P: SerialPort + ?Sized> SerialPort for &mut P {
    fn read_byte(&mut self) -> Option<u8> {
        (**self).read_byte()
    }
}
