use std::env;
use std::error::Error;
use std::fs;
use std::path::PathBuf;

const RECORD_SIZE: usize = 1024;
const DEFAULT_CREDENTIALS_ADDR: usize = 0x0018;
const DEFAULT_FRAM_SIZE: usize = 32 * 1024;

fn main() {
    println!("cargo:rerun-if-env-changed=FRAM_CREDENTIALS_ADDR");
    println!("cargo:rerun-if-env-changed=FRAM_TOTAL_SIZE");
    if let Err(err) = generate_fram_layout() {
        panic!("fram layout generation failed: {err}");
    }
}

fn generate_fram_layout() -> Result<(), Box<dyn Error>> {
    let credentials_addr =
        parse_env("FRAM_CREDENTIALS_ADDR")?.unwrap_or(DEFAULT_CREDENTIALS_ADDR);
    let total_size = parse_env("FRAM_TOTAL_SIZE")?.unwrap_or(DEFAULT_FRAM_SIZE);
    if total_size == 0 {
        return Err("FRAM_TOTAL_SIZE must be > 0".into());
    }

    let record_end = credentials_addr
        .checked_add(RECORD_SIZE)
        .ok_or("credentials address overflows")?;
    if record_end > total_size {
        return Err(format!(
            "credential record 0x{credentials_addr:04X}..0x{record_end:04X} exceeds FRAM size 0x{total_size:04X}"
        )
        .into());
    }

    let out_dir = PathBuf::from(env::var("OUT_DIR")?);
    let layout_path = out_dir.join("fram_layout.rs");
    let contents = format!(
        "pub const FRAM_CREDENTIALS_ADDR_CFG: usize = {credentials_addr};\n\
         pub const FRAM_TOTAL_SIZE_CFG: usize = {total_size};\n"
    );
    fs::write(layout_path, contents)?;
    Ok(())
}

fn parse_env(name: &str) -> Result<Option<usize>, Box<dyn Error>> {
    match env::var(name) {
        Ok(val) => {
            let trimmed = val.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }

            let parsed = if let Some(rest) = trimmed.strip_prefix("0x") {
                usize::from_str_radix(rest, 16)?
            } else {
                trimmed.parse()?
            };
            Ok(Some(parsed))
        }
        Err(env::VarError::NotPresent) => Ok(None),
        Err(other) => Err(Box::new(other)),
    }
}
