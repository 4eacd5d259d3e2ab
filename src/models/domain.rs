use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role attached to an account at creation; never changes afterwards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountRole {
    User,
    Vendor,
    Guest,
}

impl AccountRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountRole::User => "user",
            AccountRole::Vendor => "vendor",
            AccountRole::Guest => "guest",
        }
    }
}

impl FromStr for AccountRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "user" => Ok(AccountRole::User),
            "vendor" => Ok(AccountRole::Vendor),
            "guest" => Ok(AccountRole::Guest),
            other => Err(format!("unknown account role: {}", other)),
        }
    }
}

/// Registered or guest account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub email: Option<String>,
    pub name: String,
    #[serde(rename = "user_type")]
    pub role: AccountRole,
    /// Empty for guests
    #[serde(skip)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Build a guest account with a synthetic local email and no usable password
    pub fn guest(name: &str) -> Self {
        let id = uuid::Uuid::new_v4().to_string();
        let email = format!("guest_{}@arangetram.local", &id[..8]);

        Self {
            id,
            email: Some(email),
            name: name.to_string(),
            role: AccountRole::Guest,
            password_hash: String::new(),
            created_at: Utc::now(),
        }
    }
}

/// Vendor categories. The list is fixed; there is no taxonomy management.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Venue,
    Catering,
    Photographer,
    Videographer,
    Decorations,
    Musicians,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Venue,
        Category::Catering,
        Category::Photographer,
        Category::Videographer,
        Category::Decorations,
        Category::Musicians,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Venue => "venue",
            Category::Catering => "catering",
            Category::Photographer => "photographer",
            Category::Videographer => "videographer",
            Category::Decorations => "decorations",
            Category::Musicians => "musicians",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Venue => "Venues",
            Category::Catering => "Catering",
            Category::Photographer => "Photographers",
            Category::Videographer => "Videographers",
            Category::Decorations => "Decorations",
            Category::Musicians => "Musicians",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Category::Venue => "Building2",
            Category::Catering => "UtensilsCrossed",
            Category::Photographer => "Camera",
            Category::Videographer => "Video",
            Category::Decorations => "Flower2",
            Category::Musicians => "Music",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Category::Venue => "Performance halls and event spaces",
            Category::Catering => "Traditional Indian cuisine",
            Category::Photographer => "Capture your special moments",
            Category::Videographer => "Professional video coverage",
            Category::Decorations => "Stage and venue decor",
            Category::Musicians => "Live Carnatic music",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| format!("unknown category: {}", s))
    }
}

/// Ordinal price tier, rendered "$" through "$$$$"
///
/// Tiers compare in the fixed order `One < Two < Three < Four`. `Two` is the
/// default used whenever a tier is missing or cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum PriceTier {
    One = 1,
    #[default]
    Two = 2,
    Three = 3,
    Four = 4,
}

impl PriceTier {
    pub fn symbol(&self) -> &'static str {
        match self {
            PriceTier::One => "$",
            PriceTier::Two => "$$",
            PriceTier::Three => "$$$",
            PriceTier::Four => "$$$$",
        }
    }

    pub fn level(&self) -> u8 {
        *self as u8
    }

    pub fn from_level(level: u64) -> Option<Self> {
        match level {
            1 => Some(PriceTier::One),
            2 => Some(PriceTier::Two),
            3 => Some(PriceTier::Three),
            4 => Some(PriceTier::Four),
            _ => None,
        }
    }

    /// Accepts the rendered form ("$$") or the ordinal ("2")
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        match raw {
            "$" => Some(PriceTier::One),
            "$$" => Some(PriceTier::Two),
            "$$$" => Some(PriceTier::Three),
            "$$$$" => Some(PriceTier::Four),
            _ => raw.parse::<u64>().ok().and_then(Self::from_level),
        }
    }

    /// Lenient conversion from an arbitrary JSON value; anything unusable is `None`
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::String(s) => Self::parse(s),
            serde_json::Value::Number(n) => n.as_u64().and_then(Self::from_level),
            _ => None,
        }
    }
}

impl fmt::Display for PriceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl TryFrom<String> for PriceTier {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("invalid price tier: {:?}", value))
    }
}

impl From<PriceTier> for &'static str {
    fn from(tier: PriceTier) -> Self {
        tier.symbol()
    }
}

/// Vendor listing; one per owner account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorListing {
    pub id: String,
    #[serde(rename = "user_id")]
    pub owner_account_id: String,
    pub business_name: String,
    pub category: Category,
    pub description: String,
    pub location: String,
    /// Rendered tier as stored. May be malformed for legacy rows, see [`VendorListing::price_tier`].
    pub price_range: String,
    pub price_estimate: String,
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default)]
    pub portfolio_images: Vec<String>,
    #[serde(default)]
    pub contact_phone: String,
    #[serde(default)]
    pub contact_email: String,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub review_count: u32,
    #[serde(rename = "is_active", default = "default_true")]
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl VendorListing {
    /// Parsed price tier, `None` if the stored value is missing or malformed
    pub fn price_tier(&self) -> Option<PriceTier> {
        PriceTier::parse(&self.price_range)
    }
}

fn default_true() -> bool { true }

/// Ordered set of vendor ids: insertion order is kept and duplicates are dropped
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct SelectedVendors(Vec<String>);

impl SelectedVendors {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Returns `false` if the id was already present
    pub fn insert(&mut self, vendor_id: &str) -> bool {
        if self.contains(vendor_id) {
            return false;
        }
        self.0.push(vendor_id.to_string());
        true
    }

    /// Returns `false` if the id was absent
    pub fn remove(&mut self, vendor_id: &str) -> bool {
        match self.0.iter().position(|id| id == vendor_id) {
            Some(index) => {
                self.0.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, vendor_id: &str) -> bool {
        self.0.iter().any(|id| id == vendor_id)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<String>> for SelectedVendors {
    fn from(ids: Vec<String>) -> Self {
        ids.into_iter().collect()
    }
}

impl From<SelectedVendors> for Vec<String> {
    fn from(set: SelectedVendors) -> Self {
        set.0
    }
}

impl FromIterator<String> for SelectedVendors {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut set = SelectedVendors::new();
        for id in iter {
            set.insert(&id);
        }
        set
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    #[default]
    Planning,
    Confirmed,
    Completed,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Planning => "planning",
            EventStatus::Confirmed => "confirmed",
            EventStatus::Completed => "completed",
        }
    }
}

impl FromStr for EventStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "planning" => Ok(EventStatus::Planning),
            "confirmed" => Ok(EventStatus::Confirmed),
            "completed" => Ok(EventStatus::Completed),
            other => Err(format!("unknown event status: {}", other)),
        }
    }
}

/// User-authored event, visible only to its owner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    #[serde(rename = "user_id")]
    pub owner_account_id: String,
    pub event_name: String,
    pub event_date: NaiveDate,
    #[serde(default)]
    pub event_time: String,
    pub guest_count: u32,
    #[serde(rename = "budget")]
    pub budget_tier: PriceTier,
    pub location_preference: String,
    #[serde(default)]
    pub special_requirements: String,
    #[serde(rename = "selected_vendors", default)]
    pub selected_vendor_ids: SelectedVendors,
    #[serde(default)]
    pub status: EventStatus,
    pub created_at: DateTime<Utc>,
}

/// Booking request lifecycle: `pending` → `accepted` | `declined`, exactly once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Accepted,
    Declined,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Accepted => "accepted",
            BookingStatus::Declined => "declined",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Accepted | BookingStatus::Declined)
    }

    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        matches!(
            (self, next),
            (BookingStatus::Pending, BookingStatus::Accepted)
                | (BookingStatus::Pending, BookingStatus::Declined)
        )
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(BookingStatus::Pending),
            "accepted" => Ok(BookingStatus::Accepted),
            "declined" => Ok(BookingStatus::Declined),
            other => Err(format!("unknown booking status: {}", other)),
        }
    }
}

/// A request from an account to book a vendor for an event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    pub id: String,
    pub event_id: String,
    pub vendor_id: String,
    #[serde(rename = "user_id")]
    pub requester_account_id: String,
    pub message: String,
    #[serde(default)]
    pub response_message: Option<String>,
    /// Copied from the event when the booking is created; not re-synced
    pub event_date: NaiveDate,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BookingRequest {
    pub fn new(event: &Event, vendor_id: &str, requester_account_id: &str, message: String) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            event_id: event.id.clone(),
            vendor_id: vendor_id.to_string(),
            requester_account_id: requester_account_id.to_string(),
            message,
            response_message: None,
            event_date: event.event_date,
            status: BookingStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Filter for vendor directory lookups. Only active listings are ever returned.
#[derive(Debug, Clone)]
pub struct VendorFilter {
    pub category: Option<Category>,
    pub location: Option<String>,
    pub price_range: Option<PriceTier>,
    pub search: Option<String>,
    pub limit: usize,
}

impl Default for VendorFilter {
    fn default() -> Self {
        Self {
            category: None,
            location: None,
            price_range: None,
            search: None,
            limit: 100,
        }
    }
}
