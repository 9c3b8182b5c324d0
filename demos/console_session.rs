//! Консоль оператора на скриптованном порту: вывод идёт в stdout.
use std::collections::VecDeque;
use std::fmt;
use std::io::Write as _;

use fram_provision::console::{SerialPort, Session};
use fram_provision::crypto::entropy::PseudoEntropy;
use fram_provision::platform::hal::SoftwareTimer;
use fram_provision::store::{CredentialStore, MemoryFram};

struct StdoutPort {
    input: VecDeque<u8>,
}

impl fmt::Write for StdoutPort {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        print!("{}", s.replace("\r\n", "\n"));
        std::io::stdout().flush().map_err(|_| fmt::Error)
    }
}

impl SerialPort for StdoutPort {
    fn read_byte(&mut self) -> Option<u8> {
        self.input.pop_front()
    }
}

const SCRIPT: &[&str] = &[
    "help\r",
    "detect\r",
    "program\rDOLEWKA_001\rMyNetwork\rMyPassword1\radmin123\rsha256:abc123\ry\r",
    "info\r",
    "verify\r",
    "test\r",
];

fn main() {
    let port = StdoutPort {
        input: VecDeque::new(),
    };
    let store = CredentialStore::new(MemoryFram::<{ 32 * 1024 }>::new());
    let mut session = Session::new(
        port,
        store,
        SoftwareTimer::new(),
        PseudoEntropy::new([0x17; 32]),
    );

    session.banner();
    for entry in SCRIPT {
        session.port_mut().input.extend(entry.bytes());
        session.step();
    }
    println!();
}
