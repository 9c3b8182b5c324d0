//! Сборка записи из открытых данных и обратное восстановление полей.
//!
//! Все четыре секретных поля шифруются одним ключом и одним расширенным IV,
//! каждое в своём окне фиксированной ёмкости; хвост окна после паддинга
//! заполнен нулями и шифруется вместе с данными.
use zeroize::Zeroize;

use crate::crypto::aes::BLOCK_SIZE;
use crate::crypto::cbc::{widen_iv, CbcContext, STORED_IV_LEN};
use crate::crypto::entropy::EntropySource;
use crate::crypto::kdf::derive_record_key;
use crate::crypto::padding::{add_padding, probe_unpadded_len};
use crate::crypto::sha256::{hex_digest, HEX_DIGEST_LEN};
use crate::error::ProvisionError;
use crate::record::credentials::{FieldText, PlainCredentials, DEVICE_NAME_MAX};
use crate::record::layout::{
    FieldSpec, RecordImage, ENC_ADMIN_HASH, ENC_PASSWORD, ENC_SSID, ENC_TOKEN, RECORD_MAGIC,
    RECORD_VERSION,
};

/// Самое широкое шифрованное окно.
pub const MAX_WINDOW: usize = ENC_TOKEN.size;

pub type DecodedSsid = FieldText<{ ENC_SSID.size - 1 }>;
pub type DecodedPassword = FieldText<{ ENC_PASSWORD.size - 1 }>;
pub type DecodedAdminHash = FieldText<{ ENC_ADMIN_HASH.size - 1 }>;
pub type DecodedToken = FieldText<{ ENC_TOKEN.size - 1 }>;

/// Какие из шифрованных полей удалось восстановить.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FieldStatus {
    pub wifi_ssid: bool,
    pub wifi_password: bool,
    pub admin_hash: bool,
    pub vps_token: bool,
}

impl FieldStatus {
    pub fn all_ok(&self) -> bool {
        self.wifi_ssid && self.wifi_password && self.admin_hash && self.vps_token
    }

    pub fn failed_count(&self) -> usize {
        [self.wifi_ssid, self.wifi_password, self.admin_hash, self.vps_token]
            .iter()
            .filter(|ok| !**ok)
            .count()
    }
}

/// Результат декодирования: поле пустое, если его флаг в `status` сброшен.
#[derive(Debug, Clone, Default)]
pub struct DecodedCredentials {
    pub device_name: FieldText<DEVICE_NAME_MAX>,
    pub wifi_ssid: DecodedSsid,
    pub wifi_password: DecodedPassword,
    pub admin_hash: DecodedAdminHash,
    pub vps_token: DecodedToken,
    pub status: FieldStatus,
}

/// Собирает запись со свежим IV из `entropy`.
pub fn encode<E>(
    plain: &PlainCredentials,
    entropy: &mut E,
    out: &mut RecordImage,
) -> Result<(), ProvisionError>
where
    E: EntropySource + ?Sized,
{
    let mut iv = [0u8; STORED_IV_LEN];
    entropy.fill_bytes(&mut iv)?;
    encode_with_iv(plain, &iv, out)
}

/// Детерминированная сборка записи с заданным IV.
///
/// При ошибке `out` остаётся обнулённым.
pub fn encode_with_iv(
    plain: &PlainCredentials,
    iv: &[u8; STORED_IV_LEN],
    out: &mut RecordImage,
) -> Result<(), ProvisionError> {
    out.wipe();
    out.set_magic(RECORD_MAGIC);
    out.set_version(RECORD_VERSION);
    out.set_device_name(plain.device_name.as_bytes());
    out.set_iv(iv);

    let key = derive_record_key(out.device_name());
    let ctx = CbcContext::new(key.as_bytes(), widen_iv(iv));

    let mut admin_hex = [0u8; HEX_DIGEST_LEN];
    hex_digest(plain.admin_password.as_bytes(), &mut admin_hex);

    let sealed = seal_secrets(&ctx, plain, &admin_hex, out);
    admin_hex.zeroize();

    if let Err(err) = sealed {
        out.wipe();
        return Err(err);
    }

    let checksum = out.seal_checksum();
    fram_log_debug!("record encoded, checksum 0x{:04X}", checksum);
    Ok(())
}

fn seal_secrets(
    ctx: &CbcContext,
    plain: &PlainCredentials,
    admin_hex: &[u8],
    out: &mut RecordImage,
) -> Result<(), ProvisionError> {
    seal_field(ctx, out.field_mut(&ENC_SSID), plain.wifi_ssid.as_bytes())?;
    seal_field(ctx, out.field_mut(&ENC_PASSWORD), plain.wifi_password.as_bytes())?;
    seal_field(ctx, out.field_mut(&ENC_ADMIN_HASH), admin_hex)?;
    seal_field(ctx, out.field_mut(&ENC_TOKEN), plain.vps_token.as_bytes())
}

/// Восстанавливает поля записи; повреждение одного поля не мешает остальным.
pub fn decode(record: &RecordImage) -> Result<DecodedCredentials, ProvisionError> {
    if record.magic() != RECORD_MAGIC {
        return Err(ProvisionError::BadMagic);
    }
    if record.version() != RECORD_VERSION {
        return Err(ProvisionError::VersionMismatch);
    }

    let key = derive_record_key(record.device_name());
    let ctx = CbcContext::new(key.as_bytes(), widen_iv(&record.iv()));

    let mut decoded = DecodedCredentials {
        device_name: FieldText::from_bytes(record.device_name())?,
        ..DecodedCredentials::default()
    };

    if let Some(text) = open_text(&ctx, record, &ENC_SSID) {
        decoded.wifi_ssid = text;
        decoded.status.wifi_ssid = true;
    }
    if let Some(text) = open_text(&ctx, record, &ENC_PASSWORD) {
        decoded.wifi_password = text;
        decoded.status.wifi_password = true;
    }
    if let Some(text) = open_text(&ctx, record, &ENC_ADMIN_HASH) {
        decoded.admin_hash = text;
        decoded.status.admin_hash = true;
    }
    if let Some(text) = open_text(&ctx, record, &ENC_TOKEN) {
        decoded.vps_token = text;
        decoded.status.vps_token = true;
    }

    Ok(decoded)
}

/// Паддинг и шифрование `plaintext` во всё окно `window`, включая нулевой хвост.
pub fn seal_field(
    ctx: &CbcContext,
    window: &mut [u8],
    plaintext: &[u8],
) -> Result<(), ProvisionError> {
    window.fill(0);
    if plaintext.len() >= window.len() {
        return Err(ProvisionError::FieldOverflow);
    }
    window[..plaintext.len()].copy_from_slice(plaintext);
    add_padding(window, plaintext.len(), BLOCK_SIZE)?;
    ctx.encrypt_in_place(window)
}

/// Расшифровывает `window` в `scratch` и возвращает длину данных без паддинга.
pub fn open_field(
    ctx: &CbcContext,
    window: &[u8],
    scratch: &mut [u8],
) -> Result<usize, ProvisionError> {
    let buf = scratch
        .get_mut(..window.len())
        .ok_or(ProvisionError::FieldOverflow)?;
    ctx.decrypt(window, buf)?;
    probe_unpadded_len(buf, BLOCK_SIZE).ok_or(ProvisionError::PaddingNotFound)
}

fn open_text<const N: usize>(
    ctx: &CbcContext,
    record: &RecordImage,
    spec: &FieldSpec,
) -> Option<FieldText<N>> {
    let mut scratch = [0u8; MAX_WINDOW];
    let result = open_field(ctx, record.field(spec), &mut scratch)
        .and_then(|len| FieldText::from_bytes(&scratch[..len]));
    scratch.zeroize();

    match result {
        Ok(text) => Some(text),
        Err(err) => {
            fram_log_warn!("field {} failed to decode: {}", spec.name, err);
            None
        }
    }
}
