//! Donation hub directory: the records restaurants browse when routing
//! surplus food, plus the search/filter pipeline over them.

mod import;
mod router;
mod search;

pub use import::DirectoryImportError;
pub use router::directory_router;
pub use search::search;

use serde::{Deserialize, Serialize};

/// Organization category for a donation hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HubType {
    Community,
    Regional,
    Local,
    Specialized,
}

impl HubType {
    pub const fn ordered() -> [Self; 4] {
        [Self::Community, Self::Regional, Self::Local, Self::Specialized]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Community => "Community Food Bank",
            Self::Regional => "Regional Organization",
            Self::Local => "Local Center",
            Self::Specialized => "Specialized Service",
        }
    }

    /// Parse the lowercase token used on the wire and in CSV exports.
    pub fn from_token(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "community" => Some(Self::Community),
            "regional" => Some(Self::Regional),
            "local" => Some(Self::Local),
            "specialized" => Some(Self::Specialized),
            _ => None,
        }
    }
}

/// Food category tag a hub is willing to accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FoodCategory {
    FreshProduce,
    PreparedFoods,
    NonPerishables,
    Dairy,
}

impl FoodCategory {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::FreshProduce,
            Self::PreparedFoods,
            Self::NonPerishables,
            Self::Dairy,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::FreshProduce => "Fresh Produce",
            Self::PreparedFoods => "Prepared Foods",
            Self::NonPerishables => "Non-Perishables",
            Self::Dairy => "Dairy Products",
        }
    }

    /// Parse the kebab-case token used on the wire and in CSV exports.
    pub fn from_token(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "fresh-produce" => Some(Self::FreshProduce),
            "prepared-foods" => Some(Self::PreparedFoods),
            "non-perishables" => Some(Self::NonPerishables),
            "dairy" => Some(Self::Dairy),
            _ => None,
        }
    }
}

/// A food-bank-like organization accepting surplus food donations.
///
/// `distance_miles` is supplied data (distance from the restaurant as
/// reported by the directory source); it is never derived here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DonationHub {
    pub id: u32,
    pub name: String,
    pub address: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours: Option<String>,
    #[serde(rename = "type")]
    pub hub_type: HubType,
    pub accepts: Vec<FoodCategory>,
    #[serde(rename = "distance")]
    pub distance_miles: f64,
    pub rating: f64,
}

/// Search criteria for the directory. `None` (and an empty `query`) means
/// "any" and is a strict no-op for that predicate.
#[derive(Debug, Clone, Default)]
pub struct HubFilter {
    pub query: String,
    pub max_distance: Option<f64>,
    pub hub_type: Option<HubType>,
    pub accepts: Option<FoodCategory>,
    pub min_rating: Option<f64>,
}

/// The set of donation hubs known to the service, fully replaced on each
/// load rather than patched incrementally.
#[derive(Debug, Clone, Default)]
pub struct DonationHubDirectory {
    hubs: Vec<DonationHub>,
}

impl DonationHubDirectory {
    pub fn new(hubs: Vec<DonationHub>) -> Self {
        Self { hubs }
    }

    pub fn hubs(&self) -> &[DonationHub] {
        &self.hubs
    }

    pub fn len(&self) -> usize {
        self.hubs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hubs.is_empty()
    }

    /// Run the search pipeline against every hub in the directory.
    pub fn search(&self, filter: &HubFilter) -> Vec<DonationHub> {
        search(&self.hubs, filter)
    }

    /// The built-in Atlanta-area directory used when no CSV export is
    /// provided.
    pub fn sample() -> Self {
        Self::new(vec![
            DonationHub {
                id: 1,
                name: "Atlanta Community Food Bank".to_string(),
                address: "732 Joseph E Lowery Blvd NW, Atlanta, GA 30318".to_string(),
                description: "Serving metro Atlanta and north Georgia with fresh food \
                              donations, volunteer opportunities, and community programs."
                    .to_string(),
                phone: Some("(404) 892-9822".to_string()),
                website: Some("https://acfb.org".to_string()),
                hours: Some("Mon-Fri: 8AM-5PM".to_string()),
                hub_type: HubType::Community,
                accepts: vec![
                    FoodCategory::FreshProduce,
                    FoodCategory::PreparedFoods,
                    FoodCategory::NonPerishables,
                ],
                distance_miles: 2.3,
                rating: 4.8,
            },
            DonationHub {
                id: 2,
                name: "Second Harvest Food Bank".to_string(),
                address: "1640 Dodson Ave, Chattanooga, TN 37406".to_string(),
                description: "Fighting hunger and feeding hope through food distribution, \
                              nutrition education, and advocacy programs."
                    .to_string(),
                phone: Some("(423) 622-1800".to_string()),
                website: Some("https://secondharvestmetroatlanta.org".to_string()),
                hours: Some("Mon-Thu: 7AM-4PM, Fri: 7AM-2PM".to_string()),
                hub_type: HubType::Regional,
                accepts: vec![
                    FoodCategory::FreshProduce,
                    FoodCategory::PreparedFoods,
                    FoodCategory::NonPerishables,
                    FoodCategory::Dairy,
                ],
                distance_miles: 5.7,
                rating: 4.6,
            },
            DonationHub {
                id: 3,
                name: "Midtown Assistance Center".to_string(),
                address: "769 Juniper St NE, Atlanta, GA 30308".to_string(),
                description: "Providing emergency food assistance, financial aid, and \
                              support services to families in need."
                    .to_string(),
                phone: Some("(404) 681-5840".to_string()),
                website: Some("https://midtownassistancecenter.org".to_string()),
                hours: Some("Mon-Thu: 9AM-4PM".to_string()),
                hub_type: HubType::Local,
                accepts: vec![FoodCategory::NonPerishables, FoodCategory::FreshProduce],
                distance_miles: 1.8,
                rating: 4.9,
            },
            DonationHub {
                id: 4,
                name: "Open Hand Atlanta".to_string(),
                address: "181 Armour Dr NE, Atlanta, GA 30324".to_string(),
                description: "Preparing and delivering nutritious meals to seniors and \
                              people with chronic diseases."
                    .to_string(),
                phone: Some("(404) 872-2707".to_string()),
                website: Some("https://openhandatlanta.org".to_string()),
                hours: Some("Mon-Fri: 7AM-6PM".to_string()),
                hub_type: HubType::Specialized,
                accepts: vec![FoodCategory::PreparedFoods, FoodCategory::FreshProduce],
                distance_miles: 3.2,
                rating: 4.7,
            },
            DonationHub {
                id: 5,
                name: "Atlanta Mission".to_string(),
                address: "2353 Bolton Rd NW, Atlanta, GA 30318".to_string(),
                description: "Serving homeless and near-homeless individuals with meals, \
                              shelter, and recovery programs."
                    .to_string(),
                phone: Some("(404) 817-1500".to_string()),
                website: Some("https://atlantamission.org".to_string()),
                hours: Some("24/7 Emergency Services".to_string()),
                hub_type: HubType::Community,
                accepts: vec![
                    FoodCategory::PreparedFoods,
                    FoodCategory::NonPerishables,
                    FoodCategory::FreshProduce,
                ],
                distance_miles: 4.1,
                rating: 4.5,
            },
            DonationHub {
                id: 6,
                name: "Meals on Wheels Atlanta".to_string(),
                address: "1705 Commerce Dr NW, Atlanta, GA 30318".to_string(),
                description: "Delivering nutritious meals to homebound seniors and adults \
                              with disabilities."
                    .to_string(),
                phone: Some("(404) 351-3889".to_string()),
                website: Some("https://mealsonwheelsatlanta.org".to_string()),
                hours: Some("Mon-Fri: 8AM-4PM".to_string()),
                hub_type: HubType::Specialized,
                accepts: vec![FoodCategory::PreparedFoods, FoodCategory::FreshProduce],
                distance_miles: 6.3,
                rating: 4.8,
            },
        ])
    }

    /// Load a directory from a CSV export.
    pub fn from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self, DirectoryImportError> {
        import::from_path(path)
    }

    /// Load a directory from CSV content already in memory.
    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self, DirectoryImportError> {
        import::from_reader(reader)
    }
}
