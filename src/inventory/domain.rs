use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// Items expiring within this many days are flagged on the dashboard.
const EXPIRY_WINDOW_DAYS: i64 = 5;

/// A tracked stock-keeping record.
///
/// Quantity bounds carry no invariant at read time: display logic must
/// tolerate any combination (only the update path validates `min <= max`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub unit: String,
    pub current_quantity: f64,
    pub min_quantity: f64,
    pub max_quantity: f64,
    #[serde(default)]
    pub cost_per_unit: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "lenient_optional_date")]
    pub expiration_date: Option<NaiveDate>,
}

impl InventoryItem {
    pub fn total_value(&self) -> f64 {
        self.current_quantity * self.cost_per_unit
    }

    pub fn status(&self, today: NaiveDate) -> StockStatus {
        StockStatus::classify(self, today)
    }

    pub fn status_view(&self, today: NaiveDate) -> ItemStatusView {
        let status = self.status(today);
        ItemStatusView {
            item: self.clone(),
            status_label: status.label(),
            days_until_expiration: status.days_remaining(),
            status: status.code(),
            total_value: self.total_value(),
        }
    }
}

/// Fields accepted when creating or replacing an item; the id is assigned
/// by the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemDraft {
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub current_quantity: f64,
    #[serde(default)]
    pub min_quantity: f64,
    #[serde(default)]
    pub max_quantity: f64,
    #[serde(default)]
    pub cost_per_unit: f64,
    #[serde(default)]
    pub supplier: Option<String>,
    #[serde(default)]
    pub storage_location: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "lenient_optional_date")]
    pub expiration_date: Option<NaiveDate>,
}

impl ItemDraft {
    pub(crate) fn into_item(self, id: u64) -> InventoryItem {
        InventoryItem {
            id,
            name: self.name,
            category: self.category.filter(|value| !value.trim().is_empty()),
            unit: self.unit,
            current_quantity: self.current_quantity,
            min_quantity: self.min_quantity,
            max_quantity: self.max_quantity,
            cost_per_unit: self.cost_per_unit,
            supplier: self.supplier.filter(|value| !value.trim().is_empty()),
            storage_location: self
                .storage_location
                .filter(|value| !value.trim().is_empty()),
            notes: self.notes.filter(|value| !value.trim().is_empty()),
            expiration_date: self.expiration_date,
        }
    }
}

/// Derived stock classification for display and action gating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockStatus {
    LowStock,
    Overstock,
    ExpiringSoon { days_remaining: i64 },
    Expired,
    Normal,
}

impl StockStatus {
    /// Classify an item against a caller-supplied evaluation date.
    ///
    /// The rule order is fixed and load-bearing: quantity bounds are
    /// checked before expiry, and the low-stock branch is checked first,
    /// so `min == max == current` resolves to `LowStock`.
    pub fn classify(item: &InventoryItem, today: NaiveDate) -> Self {
        if item.current_quantity <= item.min_quantity {
            return Self::LowStock;
        }
        if item.current_quantity >= item.max_quantity {
            return Self::Overstock;
        }

        if let Some(expires) = item.expiration_date {
            // NaiveDate subtraction yields whole calendar days; both sides
            // are already midnight-truncated by construction.
            let days_remaining = (expires - today).num_days();
            if (0..=EXPIRY_WINDOW_DAYS).contains(&days_remaining) {
                return Self::ExpiringSoon { days_remaining };
            }
            if days_remaining < 0 {
                return Self::Expired;
            }
        }

        Self::Normal
    }

    /// Stable machine-readable code, used on the wire and as a style hook.
    pub const fn code(self) -> &'static str {
        match self {
            Self::LowStock => "low_stock",
            Self::Overstock => "overstock",
            Self::ExpiringSoon { .. } => "expiring_soon",
            Self::Expired => "expired",
            Self::Normal => "normal",
        }
    }

    pub fn label(self) -> String {
        match self {
            Self::LowStock => "Low Stock".to_string(),
            Self::Overstock => "Overstock".to_string(),
            Self::ExpiringSoon { days_remaining: 1 } => "Expiring in 1 day".to_string(),
            Self::ExpiringSoon { days_remaining } => {
                format!("Expiring in {days_remaining} days")
            }
            Self::Expired => "Expired".to_string(),
            Self::Normal => "Normal".to_string(),
        }
    }

    pub const fn days_remaining(self) -> Option<i64> {
        match self {
            Self::ExpiringSoon { days_remaining } => Some(days_remaining),
            _ => None,
        }
    }
}

/// Item plus derived fields, as served to the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct ItemStatusView {
    #[serde(flatten)]
    pub item: InventoryItem,
    pub status: &'static str,
    pub status_label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_until_expiration: Option<i64>,
    pub total_value: f64,
}

/// Kind of stock movement recorded against an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Usage,
    Waste,
    Purchase,
    Donation,
}

impl TransactionKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Usage => "Usage",
            Self::Waste => "Waste",
            Self::Purchase => "Purchase",
            Self::Donation => "Donation",
        }
    }

    /// Purchases add stock; every other kind consumes it.
    pub const fn adds_stock(self) -> bool {
        matches!(self, Self::Purchase)
    }
}

/// A stock movement submitted from the transaction form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockTransaction {
    #[serde(rename = "transaction_type")]
    pub kind: TransactionKind,
    pub quantity: f64,
    #[serde(default)]
    pub cost: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "lenient_optional_date")]
    pub date: Option<NaiveDate>,
}

/// The dashboard's date inputs submit empty strings for "no date"; treat
/// those (and null/absent) as `None`, otherwise expect `YYYY-MM-DD`.
fn lenient_optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    match opt {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
