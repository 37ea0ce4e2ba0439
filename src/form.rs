//! Address form fields
//!
//! Hidden inputs mirroring the current address for a native form
//! submission, and the autocomplete widget settings for the search box.

use crate::address::extract::extract_place;
use crate::address::{Address, PlaceResult};
use crate::config::Config;
use crate::geo::google::AUTOCOMPLETE_TYPES;
use serde::{Deserialize, Serialize};

pub const FIELD_LAT: &str = "pickupAddressLat";
pub const FIELD_LNG: &str = "pickupAddressLng";
pub const FIELD_NAME: &str = "pickupAddressName";
pub const FIELD_CITY: &str = "pickupAddressCity";
pub const FIELD_STATE: &str = "pickupAddressState";
pub const FIELD_PINCODE: &str = "pickupAddressPincode";

/// Name of the visible search input
pub const SEARCH_INPUT: &str = "pickupAddress";

/// One hidden input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiddenField {
    pub name: String,
    pub value: String,
}

/// Hidden inputs for an address, in a fixed order
///
/// An unset coordinate is submitted as empty strings.
pub fn hidden_fields(address: &Address) -> Vec<HiddenField> {
    let (lat, lng) = match address.coords {
        Some(c) => (c.lat.to_string(), c.lng.to_string()),
        None => (String::new(), String::new()),
    };

    vec![
        HiddenField {
            name: FIELD_LAT.to_string(),
            value: lat,
        },
        HiddenField {
            name: FIELD_LNG.to_string(),
            value: lng,
        },
        HiddenField {
            name: FIELD_NAME.to_string(),
            value: address.name.clone(),
        },
        HiddenField {
            name: FIELD_CITY.to_string(),
            value: address.city.clone(),
        },
        HiddenField {
            name: FIELD_STATE.to_string(),
            value: address.state.clone(),
        },
        HiddenField {
            name: FIELD_PINCODE.to_string(),
            value: address.pincode.clone(),
        },
    ]
}

/// Autocomplete widget settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutocompleteOptions {
    pub component_restrictions: ComponentRestrictions,
    pub fields: Vec<String>,
    pub strict_bounds: bool,
    pub types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentRestrictions {
    pub country: String,
}

impl AutocompleteOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            component_restrictions: ComponentRestrictions {
                country: config.provider.country.clone(),
            },
            fields: ["address_components", "geometry", "icon", "name"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            strict_bounds: false,
            types: AUTOCOMPLETE_TYPES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// The replacement address for a committed autocomplete selection
pub fn select_place(place: &PlaceResult) -> Address {
    extract_place(place).into_address()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::Coordinates;

    #[test]
    fn test_hidden_fields_order_and_values() {
        let address = Address {
            coords: Some(Coordinates::new(27.7, 85.3)),
            name: "Thamel".to_string(),
            city: "Kathmandu".to_string(),
            state: "Bagmati".to_string(),
            pincode: "44600".to_string(),
        };

        let fields = hidden_fields(&address);
        let names: Vec<_> = fields.iter().map(|f| f.name.as_str()).collect();

        assert_eq!(
            names,
            vec![
                "pickupAddressLat",
                "pickupAddressLng",
                "pickupAddressName",
                "pickupAddressCity",
                "pickupAddressState",
                "pickupAddressPincode"
            ]
        );
        assert_eq!(fields[0].value, "27.7");
        assert_eq!(fields[1].value, "85.3");
        assert_eq!(fields[5].value, "44600");
    }

    #[test]
    fn test_unset_coordinate_is_blank() {
        let fields = hidden_fields(&Address::default());
        assert!(fields.iter().all(|f| f.value.is_empty()));
    }

    #[test]
    fn test_autocomplete_options() {
        let options = AutocompleteOptions::from_config(&Config::default());
        let json = serde_json::to_value(&options).unwrap();

        assert_eq!(json["componentRestrictions"]["country"], "in");
        assert_eq!(json["strictBounds"], false);
        assert_eq!(json["types"], serde_json::json!(["establishment", "geocode"]));
    }

    #[test]
    fn test_select_place_without_geometry() {
        let place = PlaceResult {
            name: Some("Unknown".to_string()),
            ..Default::default()
        };
        let address = select_place(&place);
        assert_eq!(address.name, "Unknown");
        assert!(address.coords.is_none());
    }
}
