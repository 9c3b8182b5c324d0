//! Открытые учётные данные и правила их проверки.
use core::fmt;

use heapless::Vec;
use zeroize::Zeroize;

use crate::error::ProvisionError;

pub const DEVICE_NAME_MAX: usize = 31;
pub const WIFI_SSID_MAX: usize = 63;
pub const WIFI_PASSWORD_MAX: usize = 127;
pub const ADMIN_PASSWORD_MAX: usize = 127;
pub const VPS_TOKEN_MAX: usize = 255;

/// Вводимое оператором поле.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    DeviceName,
    WifiSsid,
    WifiPassword,
    AdminPassword,
    VpsToken,
}

impl FieldKind {
    pub const ALL: [FieldKind; 5] = [
        FieldKind::DeviceName,
        FieldKind::WifiSsid,
        FieldKind::WifiPassword,
        FieldKind::AdminPassword,
        FieldKind::VpsToken,
    ];

    pub const fn max_len(self) -> usize {
        match self {
            FieldKind::DeviceName => DEVICE_NAME_MAX,
            FieldKind::WifiSsid => WIFI_SSID_MAX,
            FieldKind::WifiPassword => WIFI_PASSWORD_MAX,
            FieldKind::AdminPassword => ADMIN_PASSWORD_MAX,
            FieldKind::VpsToken => VPS_TOKEN_MAX,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            FieldKind::DeviceName => "device name",
            FieldKind::WifiSsid => "WiFi SSID",
            FieldKind::WifiPassword => "WiFi password",
            FieldKind::AdminPassword => "admin password",
            FieldKind::VpsToken => "VPS token",
        }
    }

    /// Текстовое описание правила для подсказок оператору.
    pub const fn rule(self) -> &'static str {
        match self {
            FieldKind::DeviceName => "1-31 chars, letters, digits and underscore",
            FieldKind::WifiSsid => "1-63 chars",
            FieldKind::WifiPassword => "1-127 chars",
            FieldKind::AdminPassword => "1-127 chars",
            FieldKind::VpsToken => "1-255 chars",
        }
    }
}

/// Проверяет значение поля; длины считаются в байтах.
pub fn validate_field(kind: FieldKind, value: &str) -> bool {
    let len = value.len();
    match kind {
        FieldKind::DeviceName => {
            (1..=DEVICE_NAME_MAX).contains(&len)
                && value.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
        }
        FieldKind::WifiSsid => (1..=WIFI_SSID_MAX).contains(&len),
        FieldKind::WifiPassword => (1..=WIFI_PASSWORD_MAX).contains(&len),
        FieldKind::AdminPassword => (1..=ADMIN_PASSWORD_MAX).contains(&len),
        FieldKind::VpsToken => (1..=VPS_TOKEN_MAX).contains(&len),
    }
}

/// Текст фиксированной ёмкости без аллокаций; содержимое затирается при drop.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct FieldText<const N: usize> {
    bytes: Vec<u8, N>,
}

impl<const N: usize> FieldText<N> {
    pub const CAPACITY: usize = N;

    pub const fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, ProvisionError> {
        let bytes = Vec::from_slice(data).map_err(|_| ProvisionError::FieldOverflow)?;
        Ok(Self { bytes })
    }

    pub fn from_text(value: &str) -> Result<Self, ProvisionError> {
        Self::from_bytes(value.as_bytes())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// `None`, если содержимое не UTF-8 (например, после повреждения записи).
    pub fn as_str(&self) -> Option<&str> {
        core::str::from_utf8(&self.bytes).ok()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn push(&mut self, byte: u8) -> Result<(), ProvisionError> {
        self.bytes
            .push(byte)
            .map_err(|_| ProvisionError::FieldOverflow)
    }

    pub fn pop(&mut self) -> Option<u8> {
        self.bytes.pop()
    }

    pub fn clear(&mut self) {
        self.bytes.as_mut_slice().zeroize();
        self.bytes.clear();
    }
}

impl<const N: usize> Drop for FieldText<N> {
    fn drop(&mut self) {
        self.bytes.as_mut_slice().zeroize();
    }
}

impl<const N: usize> fmt::Debug for FieldText<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldText<{}>(len = {})", N, self.bytes.len())
    }
}

/// Учётные данные в открытом виде, как их вводит оператор.
#[derive(Clone, Default)]
pub struct PlainCredentials {
    pub device_name: FieldText<DEVICE_NAME_MAX>,
    pub wifi_ssid: FieldText<WIFI_SSID_MAX>,
    pub wifi_password: FieldText<WIFI_PASSWORD_MAX>,
    pub admin_password: FieldText<ADMIN_PASSWORD_MAX>,
    pub vps_token: FieldText<VPS_TOKEN_MAX>,
}

impl PlainCredentials {
    /// Собирает набор; превышение ёмкости поля даёт `InvalidField` этого поля.
    pub fn new(
        device_name: &str,
        wifi_ssid: &str,
        wifi_password: &str,
        admin_password: &str,
        vps_token: &str,
    ) -> Result<Self, ProvisionError> {
        Ok(Self {
            device_name: text_for(FieldKind::DeviceName, device_name)?,
            wifi_ssid: text_for(FieldKind::WifiSsid, wifi_ssid)?,
            wifi_password: text_for(FieldKind::WifiPassword, wifi_password)?,
            admin_password: text_for(FieldKind::AdminPassword, admin_password)?,
            vps_token: text_for(FieldKind::VpsToken, vps_token)?,
        })
    }

    pub fn field(&self, kind: FieldKind) -> &[u8] {
        match kind {
            FieldKind::DeviceName => self.device_name.as_bytes(),
            FieldKind::WifiSsid => self.wifi_ssid.as_bytes(),
            FieldKind::WifiPassword => self.wifi_password.as_bytes(),
            FieldKind::AdminPassword => self.admin_password.as_bytes(),
            FieldKind::VpsToken => self.vps_token.as_bytes(),
        }
    }

    /// Заменяет одно поле; используется при пошаговом вводе.
    pub fn set(&mut self, kind: FieldKind, value: &str) -> Result<(), ProvisionError> {
        match kind {
            FieldKind::DeviceName => self.device_name = text_for(kind, value)?,
            FieldKind::WifiSsid => self.wifi_ssid = text_for(kind, value)?,
            FieldKind::WifiPassword => self.wifi_password = text_for(kind, value)?,
            FieldKind::AdminPassword => self.admin_password = text_for(kind, value)?,
            FieldKind::VpsToken => self.vps_token = text_for(kind, value)?,
        }
        Ok(())
    }

    /// Проверяет все поля по порядку и возвращает первое невалидное.
    pub fn validate(&self) -> Result<(), ProvisionError> {
        for kind in FieldKind::ALL {
            let valid = core::str::from_utf8(self.field(kind))
                .map(|value| validate_field(kind, value))
                .unwrap_or(false);
            if !valid {
                return Err(ProvisionError::InvalidField(kind));
            }
        }
        Ok(())
    }
}

impl fmt::Debug for PlainCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlainCredentials")
            .field("device_name", &self.device_name.as_str())
            .field("wifi_ssid", &self.wifi_ssid.as_str())
            .finish_non_exhaustive()
    }
}

fn text_for<const N: usize>(kind: FieldKind, value: &str) -> Result<FieldText<N>, ProvisionError> {
    FieldText::from_text(value).map_err(|_| ProvisionError::InvalidField(kind))
}
