//! Field extraction from provider places
//!
//! Maps a list of typed address components onto city, state and postal
//! code by tag membership. The first component matching a category wins.
//! Nothing here fails: missing data yields empty fields.

use crate::address::{Address, AddressComponent, Coordinates, PlaceResult};
use crate::constants::tags;
use serde::{Deserialize, Serialize};

/// City, state and postal code picked out of address components
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentFields {
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
}

/// Flattened view of a provider place
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaceFields {
    pub place_id: Option<String>,
    pub place_name: Option<String>,
    /// All component long names joined with ", "
    pub address_string: Option<String>,
    pub coords: Option<Coordinates>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
}

/// Scan components once, keeping the first match per category
pub fn component_fields(components: &[AddressComponent]) -> ComponentFields {
    let mut fields = ComponentFields::default();

    for component in components {
        if fields.city.is_none()
            && (component.has_type(tags::LOCALITY) || component.has_type(tags::ADMIN_LEVEL_3))
        {
            fields.city = Some(component.long_name.clone());
        }
        if fields.state.is_none() && component.has_type(tags::ADMIN_LEVEL_1) {
            fields.state = Some(component.long_name.clone());
        }
        if fields.pincode.is_none() && component.has_type(tags::POSTAL_CODE) {
            fields.pincode = Some(component.long_name.clone());
        }
    }

    fields
}

/// Extract structured fields from a provider place
pub fn extract_place(place: &PlaceResult) -> PlaceFields {
    let components = place.address_components.as_deref();

    let address_string = components.map(|cs| {
        cs.iter()
            .map(|c| c.long_name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    });

    let coords = place
        .geometry
        .as_ref()
        .and_then(|g| g.location)
        .map(Coordinates::from);

    let ComponentFields {
        city,
        state,
        pincode,
    } = components.map(component_fields).unwrap_or_default();

    PlaceFields {
        place_id: place.place_id.clone(),
        place_name: place.name.clone(),
        address_string,
        coords,
        city,
        state,
        pincode,
    }
}

impl PlaceFields {
    /// Build the replacement address for this place
    ///
    /// The display name is the place name, or the joined component names
    /// when the place has none.
    pub fn into_address(self) -> Address {
        let name = self
            .place_name
            .filter(|n| !n.is_empty())
            .or(self.address_string)
            .unwrap_or_default();

        Address {
            coords: self.coords,
            name,
            city: self.city.unwrap_or_default(),
            state: self.state.unwrap_or_default(),
            pincode: self.pincode.unwrap_or_default(),
        }
    }
}
