#![cfg(feature = "cli")]

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use fram_provision::console::dump::write_hex_dump;
use fram_provision::crypto::entropy::EntropySource;
use fram_provision::record::layout::RECORD_SIZE;
use fram_provision::store::storage::check_bounds;
use fram_provision::store::{FRAM_CREDENTIALS_ADDR_CFG, FRAM_TOTAL_SIZE_CFG};
use fram_provision::{ByteStorage, CredentialStore, PlainCredentials, ProvisionError, StoreConfig};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

/// Хостовый инструмент для работы с образом FRAM (программирование, проверка, дамп).
#[derive(Parser)]
#[command(name = "fram-cli", version, about = "FRAM credential record helper")]
struct Cli {
    /// Файл с образом FRAM; создаётся при первом `program`.
    #[arg(long, env = "FRAM_IMAGE", default_value = "fram.bin")]
    image: PathBuf,
    /// Размер устройства в байтах.
    #[arg(long, default_value_t = FRAM_TOTAL_SIZE_CFG)]
    size: usize,
    /// Адрес записи (десятичный или 0x-hex).
    #[arg(long, value_parser = parse_address)]
    address: Option<usize>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Зашифровать и записать учётные данные, затем проверить запись.
    Program {
        /// JSON-документ с полями device_name, wifi_ssid, wifi_password, admin_password, vps_token.
        #[arg(long, conflicts_with_all = ["device_name", "wifi_ssid", "wifi_password", "admin_password", "vps_token"])]
        json: Option<PathBuf>,
        #[arg(long)]
        device_name: Option<String>,
        #[arg(long)]
        wifi_ssid: Option<String>,
        #[arg(long)]
        wifi_password: Option<String>,
        #[arg(long, env = "FRAM_ADMIN_PASSWORD")]
        admin_password: Option<String>,
        #[arg(long, env = "FRAM_VPS_TOKEN")]
        vps_token: Option<String>,
    },
    /// Проверить magic, version и checksum.
    Verify,
    /// Расшифровать поля записи.
    Decode {
        /// Показать пароль WiFi открытым текстом.
        #[arg(long)]
        reveal: bool,
    },
    /// Заголовок записи без расшифровки.
    Info,
    /// Hex-дамп области образа (по умолчанию вся запись).
    Dump {
        #[arg(long, value_parser = parse_address)]
        offset: Option<usize>,
        #[arg(long, default_value_t = RECORD_SIZE)]
        length: usize,
    },
}

#[derive(Deserialize)]
struct CredentialsDocument {
    device_name: String,
    wifi_ssid: String,
    wifi_password: String,
    admin_password: String,
    vps_token: String,
}

/// Образ FRAM в памяти, загруженный из файла.
struct FileFram {
    cells: Vec<u8>,
}

impl FileFram {
    fn load(path: &Path, size: usize) -> Result<Self> {
        let cells = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        if cells.len() != size {
            bail!(
                "{} holds {} bytes, expected {}",
                path.display(),
                cells.len(),
                size
            );
        }
        Ok(Self { cells })
    }

    fn load_or_blank(path: &Path, size: usize) -> Result<Self> {
        if path.exists() {
            Self::load(path, size)
        } else {
            log::info!("{} not found, starting from a blank image", path.display());
            Ok(Self {
                cells: vec![0u8; size],
            })
        }
    }

    fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, &self.cells).with_context(|| format!("writing {}", path.display()))
    }
}

impl ByteStorage for FileFram {
    fn capacity(&self) -> usize {
        self.cells.len()
    }

    fn read(&mut self, address: usize, buf: &mut [u8]) -> Result<(), ProvisionError> {
        check_bounds(self.cells.len(), address, buf.len())?;
        buf.copy_from_slice(&self.cells[address..address + buf.len()]);
        Ok(())
    }

    fn write(&mut self, address: usize, data: &[u8]) -> Result<(), ProvisionError> {
        check_bounds(self.cells.len(), address, data.len())?;
        self.cells[address..address + data.len()].copy_from_slice(data);
        Ok(())
    }
}

struct OsEntropy;

impl EntropySource for OsEntropy {
    fn fill_bytes(&mut self, out: &mut [u8]) -> Result<(), ProvisionError> {
        OsRng
            .try_fill_bytes(out)
            .map_err(|_| ProvisionError::EntropyUnavailable)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!("logging init failed: {err}"))?;

    let cli = Cli::parse();
    let config = StoreConfig::new(cli.address.unwrap_or(FRAM_CREDENTIALS_ADDR_CFG));

    match cli.command {
        Command::Program {
            json,
            device_name,
            wifi_ssid,
            wifi_password,
            admin_password,
            vps_token,
        } => {
            let document = match json {
                Some(path) => read_document(&path)?,
                None => CredentialsDocument {
                    device_name: required(device_name, "--device-name")?,
                    wifi_ssid: required(wifi_ssid, "--wifi-ssid")?,
                    wifi_password: required(wifi_password, "--wifi-password")?,
                    admin_password: required(admin_password, "--admin-password")?,
                    vps_token: required(vps_token, "--vps-token")?,
                },
            };
            let plain = PlainCredentials::new(
                &document.device_name,
                &document.wifi_ssid,
                &document.wifi_password,
                &document.admin_password,
                &document.vps_token,
            )
            .map_err(|err| anyhow!(err))?;

            let storage = FileFram::load_or_blank(&cli.image, cli.size)?;
            let mut store = CredentialStore::with_config(storage, config);
            let summary = store
                .program(&plain, &mut OsEntropy)
                .map_err(|err| anyhow!(err))?;
            store.into_inner().save(&cli.image)?;

            println!("programmed: {}", cli.image.display());
            println!("iv: {}", hex::encode(summary.iv));
            println!("checksum: 0x{:04X}", summary.stored_checksum);
        }
        Command::Verify => {
            let mut store = open_store(&cli.image, cli.size, config)?;
            let summary = store.verify().map_err(|err| anyhow!(err))?;
            println!(
                "record OK: device {}, checksum 0x{:04X}",
                summary.device_name.as_str().unwrap_or("<invalid>"),
                summary.stored_checksum
            );
        }
        Command::Decode { reveal } => {
            let mut store = open_store(&cli.image, cli.size, config)?;
            let decoded = store.decode().map_err(|err| anyhow!(err))?;
            println!("device_name: {}", decoded.device_name.as_str().unwrap_or("<invalid>"));
            print_field("wifi_ssid", decoded.status.wifi_ssid, decoded.wifi_ssid.as_str());
            if reveal || !decoded.status.wifi_password {
                print_field(
                    "wifi_password",
                    decoded.status.wifi_password,
                    decoded.wifi_password.as_str(),
                );
            } else {
                println!("wifi_password: ******* (use --reveal)");
            }
            print_field("admin_hash", decoded.status.admin_hash, decoded.admin_hash.as_str());
            print_field("vps_token", decoded.status.vps_token, decoded.vps_token.as_str());
            if !decoded.status.all_ok() {
                bail!("{} field(s) failed to decode", decoded.status.failed_count());
            }
        }
        Command::Info => {
            let mut store = open_store(&cli.image, cli.size, config)?;
            let summary = store.info().map_err(|err| anyhow!(err))?;
            println!("present: {}", summary.present);
            println!("magic: 0x{:08X}", summary.magic);
            println!("version: 0x{:04X}", summary.version);
            println!(
                "device_name: {}",
                summary.device_name.as_str().unwrap_or("<invalid>")
            );
            println!("iv: {}", hex::encode(summary.iv));
            println!(
                "checksum: stored 0x{:04X}, computed 0x{:04X}",
                summary.stored_checksum, summary.computed_checksum
            );
        }
        Command::Dump { offset, length } => {
            let mut storage = FileFram::load(&cli.image, cli.size)?;
            let start = offset.unwrap_or(config.credentials_addr);
            let mut buf = vec![0u8; length];
            storage.read(start, &mut buf).map_err(|err| anyhow!(err))?;
            let mut text = String::new();
            write_hex_dump(&mut text, start, &buf)?;
            print!("{}", text.replace("\r\n", "\n"));
        }
    }
    Ok(())
}

fn open_store(path: &Path, size: usize, config: StoreConfig) -> Result<CredentialStore<FileFram>> {
    let storage = FileFram::load(path, size)?;
    Ok(CredentialStore::with_config(storage, config))
}

fn read_document(path: &Path) -> Result<CredentialsDocument> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

fn required(value: Option<String>, flag: &str) -> Result<String> {
    value.ok_or_else(|| anyhow!("{} is required without --json", flag))
}

fn print_field(name: &str, ok: bool, value: Option<&str>) {
    match (ok, value) {
        (true, Some(value)) => println!("{}: {}", name, value),
        (true, None) => println!("{}: <not valid UTF-8>", name),
        (false, _) => println!("{}: <decode failed>", name),
    }
}

fn parse_address(input: &str) -> Result<usize, String> {
    let trimmed = input.trim();
    let parsed = match trimmed.strip_prefix("0x") {
        Some(rest) => usize::from_str_radix(rest, 16),
        None => trimmed.parse(),
    };
    parsed.map_err(|err| format!("invalid address {trimmed}: {err}"))
}
