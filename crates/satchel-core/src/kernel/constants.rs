/// Resource key holding the application identifier
pub const APPLICATION_ID_KEY: &str = "Application.id";

/// Resource key holding the vendor identifier
pub const APPLICATION_VENDOR_ID_KEY: &str = "Application.vendorId";

/// Vendor identifier used when the resource is unset or blank
pub const DEFAULT_VENDOR_ID: &str = "UnknownApplicationVendor";

/// Storage limit value meaning "no limit"
pub const UNLIMITED_STORAGE: i64 = -1;

/// Environment variable naming the roaming application data directory (Windows)
pub const APPDATA_ENV: &str = "APPDATA";

/// Folder under the user home used on Windows when `APPDATA` is unusable
pub const WINDOWS_APP_DATA_DIR: &str = "Application Data";

/// Folder under the user home used on macOS
pub const MACOS_APP_SUPPORT_DIR: &str = "Library/Application Support";

/// Version of the stored document envelope
pub const DOCUMENT_FORMAT_VERSION: &str = "1.0.0";

/// Property name announced when the storage limit changes
pub const STORAGE_LIMIT_PROPERTY: &str = "storageLimit";

/// Property name announced when the storage directory changes
pub const DIRECTORY_PROPERTY: &str = "directory";
