use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use super::{DonationHub, DonationHubDirectory, FoodCategory, HubType};

/// Error raised while importing a directory CSV export.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryImportError {
    #[error("unable to read directory export: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed directory export: {0}")]
    Csv(#[from] csv::Error),
    #[error("hub '{name}' has unknown type '{value}'")]
    UnknownHubType { name: String, value: String },
    #[error("hub '{name}' has unknown accepts tag '{value}'")]
    UnknownCategory { name: String, value: String },
    #[error("hub '{name}' accepts no food categories")]
    EmptyAccepts { name: String },
}

pub(super) fn from_path<P: AsRef<Path>>(
    path: P,
) -> Result<DonationHubDirectory, DirectoryImportError> {
    let file = File::open(path)?;
    from_reader(file)
}

pub(super) fn from_reader<R: Read>(
    reader: R,
) -> Result<DonationHubDirectory, DirectoryImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut hubs = Vec::new();
    for record in csv_reader.deserialize::<HubRow>() {
        hubs.push(record?.into_hub()?);
    }

    Ok(DonationHubDirectory::new(hubs))
}

/// One row of the `Id,Name,Address,...` export. `Accepts` carries a
/// `;`-separated tag list.
#[derive(Debug, Deserialize)]
struct HubRow {
    #[serde(rename = "Id")]
    id: u32,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Address")]
    address: String,
    #[serde(rename = "Description")]
    description: String,
    #[serde(rename = "Phone", default, deserialize_with = "empty_string_as_none")]
    phone: Option<String>,
    #[serde(rename = "Website", default, deserialize_with = "empty_string_as_none")]
    website: Option<String>,
    #[serde(rename = "Hours", default, deserialize_with = "empty_string_as_none")]
    hours: Option<String>,
    #[serde(rename = "Type")]
    hub_type: String,
    #[serde(rename = "Accepts")]
    accepts: String,
    #[serde(rename = "Distance")]
    distance: f64,
    #[serde(rename = "Rating")]
    rating: f64,
}

impl HubRow {
    fn into_hub(self) -> Result<DonationHub, DirectoryImportError> {
        let hub_type = HubType::from_token(&self.hub_type).ok_or_else(|| {
            DirectoryImportError::UnknownHubType {
                name: self.name.clone(),
                value: self.hub_type.clone(),
            }
        })?;

        let mut accepts = Vec::new();
        for token in self.accepts.split(';') {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }
            let category = FoodCategory::from_token(token).ok_or_else(|| {
                DirectoryImportError::UnknownCategory {
                    name: self.name.clone(),
                    value: token.to_string(),
                }
            })?;
            if !accepts.contains(&category) {
                accepts.push(category);
            }
        }
        if accepts.is_empty() {
            return Err(DirectoryImportError::EmptyAccepts { name: self.name });
        }

        Ok(DonationHub {
            id: self.id,
            name: self.name,
            address: self.address,
            description: self.description,
            phone: self.phone,
            website: self.website,
            hours: self.hours,
            hub_type,
            accepts,
            distance_miles: self.distance,
            rating: self.rating,
        })
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
