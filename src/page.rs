//! Picker page
//!
//! Renders the address picker page for a session: search box, map
//! container, overlay, error slot and the hidden form fields. Widget
//! settings travel to the browser script as an escaped data attribute.

use crate::config::Config;
use crate::constants::api::MAPS_JS_URL;
use crate::error::Result;
use crate::form::{AutocompleteOptions, SEARCH_INPUT};
use crate::map::{MapOptions, Overlay};
use crate::session::SessionView;
use handlebars::Handlebars;
use serde::Serialize;

const PAGE_TEMPLATE: &str = "picker";

const PAGE_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Pickup address</title>
  <link rel="stylesheet" href="/picker.css">
</head>
<body>
  <form id="picker-form" method="{{form_method}}" action="{{form_action}}">
    <div class="picker" id="picker" data-session="{{session_id}}" data-config="{{config_json}}">
      {{#each hidden_fields}}
      <input type="hidden" id="{{name}}" name="{{name}}" value="{{value}}">
      {{/each}}
      <div class="picker-header">
        <label for="{{search_input}}">Patient Address</label>
        <button type="button" class="detect-location" data-action="locate">Detect Location</button>
      </div>
      <input id="{{search_input}}" name="{{search_input}}" value="{{address_name}}" placeholder="Enter patient address..." autocomplete="off">
      <div class="map-frame">
        <div id="map-skeleton" class="map-skeleton"><p>Loading...</p></div>
        <div id="map" class="map"></div>
        <div id="map-overlay" class="map-overlay">
          {{#if show_marker}}
          <img src="/icons/pickup_shadow.svg" alt="">
          {{else}}
          <button type="button" class="locate-me" data-action="locate">Locate Me</button>
          {{/if}}
        </div>
      </div>
      <p id="map-error" class="error-message"{{#unless map_error}} hidden{{/unless}}>{{map_error}}</p>
    </div>
    <hr>
    <div class="submit-bar">
      <button type="submit" name="_action" value="sos">SUBMIT</button>
    </div>
  </form>
  <script src="/picker.js"></script>
  {{#if maps_script_url}}
  <script src="{{maps_script_url}}" async defer></script>
  {{/if}}
</body>
</html>
"#;

/// Settings read by the browser script
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowserConfig {
    pub map: MapOptions,
    pub autocomplete: AutocompleteOptions,
}

/// Template data for one page
#[derive(Debug, Clone, Serialize)]
struct PageContext<'a> {
    session_id: String,
    config_json: String,
    hidden_fields: &'a [crate::form::HiddenField],
    search_input: &'static str,
    address_name: &'a str,
    show_marker: bool,
    map_error: Option<&'a str>,
    maps_script_url: Option<String>,
    form_action: &'a str,
    form_method: &'a str,
}

/// Compiled page template
pub struct PageRenderer {
    registry: Handlebars<'static>,
}

impl PageRenderer {
    pub fn new() -> Result<Self> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(false);
        registry.register_template_string(PAGE_TEMPLATE, PAGE_HTML)?;
        Ok(Self { registry })
    }

    /// Render the page for a session
    pub fn render(&self, view: &SessionView, config: &Config) -> Result<String> {
        let browser = BrowserConfig {
            map: MapOptions::from_config(config),
            autocomplete: AutocompleteOptions::from_config(config),
        };

        let context = PageContext {
            session_id: view.id.to_string(),
            config_json: serde_json::to_string(&browser)?,
            hidden_fields: &view.hidden_fields,
            search_input: SEARCH_INPUT,
            address_name: &view.address.name,
            show_marker: view.overlay == Overlay::CenterMarker,
            map_error: view.map_error.as_deref(),
            maps_script_url: maps_script_url(config),
            form_action: &config.form.action,
            form_method: &config.form.method,
        };

        Ok(self.registry.render(PAGE_TEMPLATE, &context)?)
    }
}

/// Provider script URL, if a key is available
pub fn maps_script_url(config: &Config) -> Option<String> {
    config.api_key().map(|key| {
        format!(
            "{}?key={}&libraries=places&language={}&callback=initPicker",
            MAPS_JS_URL,
            urlencoding::encode(&key),
            urlencoding::encode(&config.provider.language)
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::{Address, Coordinates};
    use crate::locate::LocationQuery;
    use crate::session::PickerSession;

    fn config_with_key() -> Config {
        let mut config = Config::default();
        config.provider.api_key = "browser-key".to_string();
        config
    }

    #[test]
    fn test_render_with_coordinate() {
        let session = PickerSession::new(LocationQuery::new("27.7", "85.3"));
        let html = PageRenderer::new()
            .unwrap()
            .render(&session.view(), &config_with_key())
            .unwrap();

        assert!(html.contains(r#"name="pickupAddressLat" value="27.7""#));
        assert!(html.contains(r#"name="pickupAddressLng" value="85.3""#));
        assert!(html.contains("pickup_shadow.svg"));
        assert!(!html.contains("Locate Me"));
        assert!(html.contains("browser-key"));
        assert!(html.contains("Loading..."));
    }

    #[test]
    fn test_render_without_coordinate_offers_locate() {
        let session = PickerSession::new(LocationQuery::default());
        let html = PageRenderer::new()
            .unwrap()
            .render(&session.view(), &config_with_key())
            .unwrap();

        assert!(html.contains("Locate Me"));
        assert!(html.contains(r#"name="pickupAddressLat" value="""#));
        assert!(html.contains(r#"id="map-error" class="error-message" hidden"#));
    }

    #[test]
    fn test_values_are_escaped() {
        let mut session = PickerSession::new(LocationQuery::default());
        session.replace(Address {
            name: r#"<script>"x"</script>"#.to_string(),
            ..Address::at(Coordinates::new(1.0, 2.0))
        });

        let html = PageRenderer::new()
            .unwrap()
            .render(&session.view(), &config_with_key())
            .unwrap();

        assert!(!html.contains(r#"<script>"x""#));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_config_attribute_is_escaped_json() {
        let session = PickerSession::new(LocationQuery::default());
        let html = PageRenderer::new()
            .unwrap()
            .render(&session.view(), &config_with_key())
            .unwrap();

        assert!(html.contains("data-config=\"{&quot;map&quot;"));
    }

    #[test]
    fn test_script_url_requires_key() {
        let mut config = Config::default();
        config.provider.api_key = String::new();
        if std::env::var(crate::constants::api::API_KEY_ENV).is_err() {
            assert!(maps_script_url(&config).is_none());
        }
        assert!(maps_script_url(&config_with_key())
            .unwrap()
            .contains("libraries=places"));
    }
}
