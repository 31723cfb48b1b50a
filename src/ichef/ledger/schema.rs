//! Column labels used by the POS exports and the synced tables.

/// Status column carrying the void marker.
pub const STATUS_COLUMN: &str = "目前概況";
/// Substring marking a voided transaction.
pub const VOID_MARKER: &str = "已作廢";

/// Invoice number, the identifier half of the dedup key.
pub const INVOICE_NUMBER: &str = "發票號碼";
/// Checkout timestamp, the timestamp half of the dedup key.
pub const CHECKOUT_TIME: &str = "結帳時間";

/// Phone columns normalised on the order path.
pub const PHONE_COLUMNS: [&str; 2] = ["顧客電話", "訂購人電話"];

/// Markers for the product-name column, checked in order.
pub const PRODUCT_NAME_MARKERS: [&str; 2] = ["商品名稱", "Product"];

/// Category placeholder written into stub master rows.
pub const UNCLASSIFIED: &str = "未分類";

/// Columns following the name column in a product master table created by
/// the sync run.
pub const PRODUCT_MASTER_COLUMNS: [&str; 4] = ["新名稱", "大類", "小類", "建立日期"];

/// Leading column injected into loyalty snapshot rows.
pub const DATA_DATE_COLUMN: &str = "Data_Date";

/// Export-format renames, one entry per pair; both directions are registered.
pub const DEFAULT_ALIASES: [(&str, &str); 4] = [
    ("發票金額", "結帳金額"),
    ("支付模組", "支付方式"),
    ("載具／捐贈碼", "載具/捐贈碼"),
    ("訂單標籤與備註", "訂單備註"),
];

/// Filename fragments identifying line-item sales exports.
pub const PRODUCT_FILE_MARKERS: [&str; 3] = ["商品", "Product", "結帳品項紀錄"];
/// Filename fragments identifying order exports.
pub const ORDER_FILE_MARKERS: [&str; 3] = ["訂單", "Order", "作廢紀錄"];
/// Filename fragment identifying loyalty points snapshots.
pub const REWARD_POINTS_MARKER: &str = "_points_";
/// Filename fragment identifying loyalty card snapshots.
pub const REWARD_CARDS_MARKER: &str = "_cards_";
