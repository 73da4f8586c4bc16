use super::{DonationHub, HubFilter};

/// Filter and sort the hub list for display.
///
/// The five predicates are independent: an absent criterion (or an empty
/// query) drops nothing. Survivors are sorted ascending by distance with a
/// stable sort, so equal-distance hubs keep their input order. The input
/// slice is never mutated and no state is shared between calls.
pub fn search(hubs: &[DonationHub], filter: &HubFilter) -> Vec<DonationHub> {
    let query = filter.query.trim().to_lowercase();

    let mut matches: Vec<DonationHub> = hubs
        .iter()
        .filter(|hub| matches_query(hub, &query) && matches_criteria(hub, filter))
        .cloned()
        .collect();

    // Vec::sort_by is stable, which the display contract relies on.
    matches.sort_by(|a, b| a.distance_miles.total_cmp(&b.distance_miles));
    matches
}

fn matches_query(hub: &DonationHub, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }

    hub.name.to_lowercase().contains(query)
        || hub.address.to_lowercase().contains(query)
        || hub.description.to_lowercase().contains(query)
}

fn matches_criteria(hub: &DonationHub, filter: &HubFilter) -> bool {
    if let Some(max_distance) = filter.max_distance {
        if hub.distance_miles > max_distance {
            return false;
        }
    }

    if let Some(hub_type) = filter.hub_type {
        if hub.hub_type != hub_type {
            return false;
        }
    }

    if let Some(category) = filter.accepts {
        if !hub.accepts.contains(&category) {
            return false;
        }
    }

    if let Some(min_rating) = filter.min_rating {
        if hub.rating < min_rating {
            return false;
        }
    }

    true
}
