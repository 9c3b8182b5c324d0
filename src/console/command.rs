#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Help,
    Detect,
    Info,
    Backup,
    Restore,
    Program,
    Verify,
    Test,
    Empty,
    Unknown,
}

impl Command {
    /// Регистр не важен, у каждой команды есть однобуквенный синоним.
    pub fn parse(line: &str) -> Command {
        let word = line.trim();
        if word.is_empty() {
            return Command::Empty;
        }
        const TABLE: [(&str, &str, Command); 8] = [
            ("help", "h", Command::Help),
            ("detect", "d", Command::Detect),
            ("info", "i", Command::Info),
            ("backup", "b", Command::Backup),
            ("restore", "r", Command::Restore),
            ("program", "p", Command::Program),
            ("verify", "v", Command::Verify),
            ("test", "t", Command::Test),
        ];
        TABLE
            .iter()
            .find(|(name, alias, _)| {
                word.eq_ignore_ascii_case(name) || word.eq_ignore_ascii_case(alias)
            })
            .map(|(_, _, command)| *command)
            .unwrap_or(Command::Unknown)
    }
}

pub const HELP_TEXT: &[&str] = &[
    "FRAM Programmer Commands:",
    "========================",
    "  help (h)     - Show this help",
    "  detect (d)   - Detect FRAM device",
    "  info (i)     - Show credential record header",
    "  backup (b)   - Backup entire FRAM content as hex lines",
    "  restore (r)  - Restore FRAM from backup lines",
    "  program (p)  - Program credentials to FRAM",
    "  verify (v)   - Verify and decrypt stored credentials",
    "  test (t)     - Run FRAM and cipher self-test",
];

/// Подтверждение программирования: `YES`, `yes`, `y` или пустая строка.
pub fn is_confirmation(answer: &str) -> bool {
    matches!(answer.trim(), "YES" | "yes" | "y" | "")
}
