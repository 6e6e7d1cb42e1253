use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to access data file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Stored document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Redis request failed: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Stored document failed validation: {0}")]
    InvalidDocument(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

// User-facing texts. The site is served in Turkish.
pub const MISSING_SLOT_FIELDS: &str = "Tarih, saat ve kişi sayısı zorunludur.";
pub const INVALID_GUEST_COUNT: &str = "Geçerli bir kişi sayısı giriniz.";
pub const INVALID_DATE: &str = "Geçerli bir tarih giriniz (YYYY-AA-GG).";
pub const INVALID_TIME: &str = "Geçerli bir saat giriniz (SS:DD).";
pub const UNKNOWN_TIME_SLOT: &str = "Seçilen saat rezervasyon saatleri arasında değil.";
pub const MISSING_CONTACT: &str = "Ad ve telefon bilgisi zorunludur.";
pub const MISSING_CONSENT: &str = "Kişisel verilerin işlenmesine onay vermeniz gerekmektedir.";
pub const MISSING_MESSAGE_FIELDS: &str = "Ad, e-posta ve mesaj alanları zorunludur.";
pub const MALFORMED_BODY: &str = "İstek gövdesi okunamadı.";
pub const CAPACITY_CHECK_FAILED: &str =
    "Kapasite kontrolü yapılamadı. Lütfen daha sonra tekrar deneyiniz.";
pub const CAPACITY_DISABLED: &str = "Rezervasyon için uygun.";
pub const INTERNAL_ERROR: &str = "Bir hata oluştu. Lütfen daha sonra tekrar deneyiniz.";
pub const UNAUTHORIZED: &str = "Yetkisiz erişim.";
pub const RESERVATION_NOT_FOUND: &str = "Rezervasyon bulunamadı.";
pub const MENU_ITEM_NOT_FOUND: &str = "Menü öğesi bulunamadı.";
pub const MESSAGE_NOT_FOUND: &str = "Mesaj bulunamadı.";
