use core::fmt::{self, Write};

use heapless::String;

use crate::console::command::{is_confirmation, Command, HELP_TEXT};
use crate::console::dump::{write_hex, write_hex_dump};
use crate::console::line::LineReader;
use crate::console::SerialPort;
use crate::crypto::entropy::EntropySource;
use crate::record::credentials::{validate_field, FieldKind, PlainCredentials};
use crate::record::layout::IV;
use crate::store::storage::ByteStorage;
use crate::store::workflow::{CredentialStore, RecordSummary};
use crate::platform::hal::MonotonicTimer;

pub const PROMPT: &str = "FRAM> ";
/// Вмещает токен максимальной длины и строку `DATA:` блока резервной копии.
pub const LINE_CAPACITY: usize = 320;

const RESTORE_CHUNK_MAX: usize = 64;
const HEADER_DUMP_LEN: usize = IV.offset + IV.size;

/// Интерактивная консоль оператора поверх последовательного порта.
pub struct Session<P, S, T, E> {
    port: P,
    store: CredentialStore<S>,
    timer: T,
    entropy: E,
    reader: LineReader<LINE_CAPACITY>,
}

impl<P, S, T, E> Session<P, S, T, E>
where
    P: SerialPort,
    S: ByteStorage,
    T: MonotonicTimer,
    E: EntropySource,
{
    pub fn new(port: P, store: CredentialStore<S>, timer: T, entropy: E) -> Self {
        Self {
            port,
            store,
            timer,
            entropy,
            reader: LineReader::new(),
        }
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    pub fn store_mut(&mut self) -> &mut CredentialStore<S> {
        &mut self.store
    }

    pub fn into_parts(self) -> (P, CredentialStore<S>, T, E) {
        (self.port, self.store, self.timer, self.entropy)
    }

    pub fn run(&mut self) -> ! {
        self.banner();
        loop {
            self.step();
        }
    }

    pub fn banner(&mut self) {
        self.line(format_args!(""));
        self.line(format_args!("=== FRAM Credential Programmer ==="));
        self.line(format_args!("Type 'help' for available commands"));
    }

    /// Печатает приглашение, читает одну строку и выполняет её.
    pub fn step(&mut self) {
        self.text(PROMPT);
        let line = self.read_line();
        self.execute(&line);
    }

    pub fn execute(&mut self, line: &str) {
        match Command::parse(line) {
            Command::Help => self.cmd_help(),
            Command::Detect => self.cmd_detect(),
            Command::Info => self.cmd_info(),
            Command::Backup => self.cmd_backup(),
            Command::Restore => self.cmd_restore(),
            Command::Program => self.cmd_program(),
            Command::Verify => self.cmd_verify(),
            Command::Test => self.cmd_test(),
            Command::Empty => {}
            Command::Unknown => {
                self.error(format_args!("Unknown command: {}", line.trim()));
                self.info(format_args!("Type 'help' for available commands"));
            }
        }
    }

    fn cmd_help(&mut self) {
        for row in HELP_TEXT {
            self.line(format_args!("{}", row));
        }
    }

    fn cmd_detect(&mut self) {
        if self.store.detect() {
            let capacity = self.store.storage().capacity();
            self.success(format_args!("FRAM detected ({} bytes)", capacity));
        } else {
            self.error(format_args!("FRAM not detected"));
        }
    }

    fn cmd_info(&mut self) {
        let image = match self.store.read_record() {
            Ok(image) => image,
            Err(err) => return self.error(format_args!("Cannot read record: {}", err)),
        };
        let summary = RecordSummary::from_image(&image);
        let address = self.store.config().credentials_addr;

        self.line(format_args!("=== CREDENTIAL RECORD @ 0x{:04X} ===", address));
        let _ = write_hex_dump(&mut self.port, address, &image.as_bytes()[..HEADER_DUMP_LEN]);
        if !summary.present {
            self.warning(format_args!(
                "No credential record (magic 0x{:08X})",
                summary.magic
            ));
            return;
        }
        self.line(format_args!("Version: 0x{:04X}", summary.version));
        self.line(format_args!(
            "Device Name: {}",
            summary.device_name.as_str().unwrap_or("<invalid>")
        ));
        self.text("IV: ");
        let _ = write_hex(&mut self.port, &summary.iv);
        self.line(format_args!(""));
        self.line(format_args!(
            "Checksum: stored 0x{:04X}, computed 0x{:04X} ({})",
            summary.stored_checksum,
            summary.computed_checksum,
            if summary.checksum_ok() { "OK" } else { "MISMATCH" }
        ));
    }

    fn cmd_backup(&mut self) {
        self.info(format_args!("Starting FRAM backup (output as hex dump)"));
        self.line(format_args!("Copy the following output to save your backup:"));
        self.line(format_args!(""));

        let Self { port, store, .. } = self;
        let capacity = store.storage().capacity();
        let _ = write!(port, "BACKUP_START\r\nSIZE:{}\r\n", capacity);
        let result = store.backup(|address, chunk| {
            let _ = write!(port, "ADDR:{:X}\r\nDATA:", address);
            let _ = write_hex(&mut *port, chunk);
            let _ = port.write_str("\r\n");
        });
        let _ = port.write_str("BACKUP_END\r\n");

        match result {
            Ok(_) => self.info(format_args!("Backup complete. Save the hex dump above for restore.")),
            Err(err) => self.error(format_args!("Backup failed: {}", err)),
        }
    }

    fn cmd_restore(&mut self) {
        self.warning(format_args!("FRAM restore will overwrite ALL data!"));
        self.text("Type 'YES' to confirm: ");
        if self.read_line().as_str() != "YES" {
            self.info(format_args!("Restore cancelled"));
            return;
        }
        self.info(format_args!("Paste backup lines below (end with BACKUP_END):"));

        let mut address: Option<usize> = None;
        let mut restored = 0usize;
        loop {
            let owned = self.read_line();
            let line = owned.trim();
            if line.is_empty() || line == "BACKUP_START" || line.starts_with("SIZE:") {
                continue;
            }
            if line == "BACKUP_END" || line == "END" {
                break;
            }
            if let Some(hex_addr) = line.strip_prefix("ADDR:") {
                match usize::from_str_radix(hex_addr.trim(), 16) {
                    Ok(value) => address = Some(value),
                    Err(_) => return self.error(format_args!("Malformed address line: {}", line)),
                }
                continue;
            }
            if let Some(hex_data) = line.strip_prefix("DATA:") {
                let Some(at) = address.take() else {
                    return self.error(format_args!("DATA line without preceding ADDR"));
                };
                let hex_data = hex_data.trim();
                let len = hex_data.len() / 2;
                let mut chunk = [0u8; RESTORE_CHUNK_MAX];
                if hex_data.len() % 2 != 0
                    || len > RESTORE_CHUNK_MAX
                    || hex::decode_to_slice(hex_data, &mut chunk[..len]).is_err()
                {
                    return self.error(format_args!("Malformed data line at 0x{:X}", at));
                }
                if let Err(err) = self.store.restore(at, &chunk[..len]) {
                    return self.error(format_args!("Restore failed at 0x{:X}: {}", at, err));
                }
                restored += len;
                continue;
            }
            return self.error(format_args!("Unrecognised backup line: {}", line));
        }

        self.success(format_args!("FRAM restore completed ({} bytes)", restored));
    }

    fn cmd_program(&mut self) {
        self.info(format_args!("=== Interactive Credential Programming ==="));
        let mut plain = PlainCredentials::default();
        for kind in FieldKind::ALL {
            let _ = write!(self.port, "{} ({}): ", kind.label(), kind.rule());
            let value = self.read_line();
            if !validate_field(kind, &value) || plain.set(kind, &value).is_err() {
                self.error(format_args!("Invalid {}: expected {}", kind.label(), kind.rule()));
                return;
            }
        }

        self.line(format_args!(""));
        self.line(format_args!("=== CREDENTIALS SUMMARY ==="));
        self.line(format_args!(
            "Device Name: {}",
            plain.device_name.as_str().unwrap_or("")
        ));
        self.line(format_args!("WiFi SSID: {}", plain.wifi_ssid.as_str().unwrap_or("")));
        self.line(format_args!("WiFi Password: ******* (hidden)"));
        self.line(format_args!("Admin Password: ******* (will be hashed)"));
        self.line(format_args!(
            "VPS Token: ******* ({} chars)",
            plain.vps_token.len()
        ));
        self.line(format_args!(""));
        self.text("Program these credentials to FRAM? (YES/no): ");
        if !is_confirmation(&self.read_line()) {
            self.info(format_args!("Programming cancelled"));
            return;
        }

        self.info(format_args!("Encrypting and writing credentials..."));
        match self.store.program(&plain, &mut self.entropy) {
            Ok(summary) => self.success(format_args!(
                "Credentials programmed and verified (checksum 0x{:04X})",
                summary.stored_checksum
            )),
            Err(err) => self.error(format_args!("Programming failed: {}", err)),
        }
    }

    fn cmd_verify(&mut self) {
        if let Err(err) = self.store.verify() {
            return self.error(format_args!("Verification FAILED: {}", err));
        }
        self.success(format_args!("Record format and checksum OK"));

        let decoded = match self.store.decode() {
            Ok(decoded) => decoded,
            Err(err) => return self.error(format_args!("Decryption failed: {}", err)),
        };

        self.line(format_args!(""));
        self.line(format_args!("=== DECRYPTED CREDENTIALS ==="));
        self.line(format_args!(
            "Device Name: {}",
            decoded.device_name.as_str().unwrap_or("<invalid>")
        ));
        self.field_line("WiFi SSID", decoded.status.wifi_ssid, decoded.wifi_ssid.as_str());
        if decoded.status.wifi_password {
            self.line(format_args!("WiFi Password: ******* (hidden)"));
        } else {
            self.field_line("WiFi Password", false, None);
        }
        self.field_line("Admin Hash", decoded.status.admin_hash, decoded.admin_hash.as_str());
        self.field_line("VPS Token", decoded.status.vps_token, decoded.vps_token.as_str());

        if decoded.status.all_ok() {
            self.success(format_args!("All fields decrypted"));
        } else {
            self.warning(format_args!(
                "{} field(s) could not be decrypted",
                decoded.status.failed_count()
            ));
        }
    }

    fn cmd_test(&mut self) {
        let report = match self.store.self_test() {
            Ok(report) => report,
            Err(err) => return self.error(format_args!("Self-test aborted: {}", err)),
        };
        let checks = [
            ("Test 0: Record layout", report.layout),
            ("Test 1: Scratch read/write", report.read_write),
            ("Test 2: Checksum function", report.checksum),
            ("Test 3: Encryption/decryption", report.cipher),
        ];
        let passed = checks.iter().filter(|(_, ok)| *ok).count();
        for (name, ok) in checks {
            self.line(format_args!("{}: {}", name, if ok { "PASS" } else { "FAIL" }));
        }
        self.line(format_args!(
            "=== TEST SUMMARY: {}/{} PASSED ===",
            passed,
            checks.len()
        ));
        if report.passed() {
            self.success(format_args!("All tests passed"));
        } else {
            self.error(format_args!("Self-test failed"));
        }
    }

    fn field_line(&mut self, name: &str, ok: bool, value: Option<&str>) {
        match (ok, value) {
            (true, Some(value)) => self.line(format_args!("{}: {}", name, value)),
            (true, None) => self.warning(format_args!("{}: not valid text", name)),
            (false, _) => self.warning(format_args!("{}: decryption failed", name)),
        }
    }

    fn read_line(&mut self) -> String<LINE_CAPACITY> {
        let mut owned = String::new();
        let line = self.reader.read_line(&mut self.port, &mut self.timer);
        let _ = owned.push_str(line);
        owned
    }

    fn text(&mut self, text: &str) {
        let _ = self.port.write_str(text);
    }

    fn line(&mut self, args: fmt::Arguments<'_>) {
        let _ = self.port.write_fmt(args);
        let _ = self.port.write_str("\r\n");
    }

    fn tagged(&mut self, tag: &str, args: fmt::Arguments<'_>) {
        let _ = write!(self.port, "[{}] ", tag);
        self.line(args);
    }

    fn success(&mut self, args: fmt::Arguments<'_>) {
        self.tagged("SUCCESS", args);
    }

    fn error(&mut self, args: fmt::Arguments<'_>) {
        self.tagged("ERROR", args);
    }

    fn warning(&mut self, args: fmt::Arguments<'_>) {
        self.tagged("WARNING", args);
    }

    fn info(&mut self, args: fmt::Arguments<'_>) {
        self.tagged("INFO", args);
    }
}
