// Viewer legend document
use crate::application::editor_session::EditorSession;
use crate::domain::inventory::InventoryLayer;
use crate::domain::project_config::ShowLayers;
use crate::domain::winter_roads;

fn section(title: &str, body: &str) -> String {
    format!(
        "<li class=\"legend-header\"><p class=\"legend-header-content\">{}</p><ul>{}</ul></li>",
        title, body
    )
}

/// Traveler information section followed by the project's own groups.
/// Inventory checkboxes reflect the project's current `showLayers`.
pub fn legend_document(
    inventory: &[InventoryLayer],
    show_layers: ShowLayers,
    winter_roads_active: bool,
    session: &EditorSession,
) -> String {
    let mut traveler = String::new();
    for layer in inventory {
        let mut layer = layer.clone();
        layer.startup_show = show_layers.is_shown(layer.resource.visibility_key);
        traveler.push_str(&layer.legend_markup());
    }
    if winter_roads_active {
        traveler.push_str(&winter_roads::legend_markup(show_layers.wrs_segments));
    }

    let mut markup = String::from("<ul id=\"legend-list\">");
    markup.push_str(&section("WI 511 Real-time Traveler Information", &traveler));
    markup.push_str(&section("WI 511 Construction Project Information", &session.legend_markup()));
    markup.push_str("</ul>");
    markup
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::bounds::Bounds;
    use crate::domain::fixtures::SAMPLE;
    use crate::domain::inventory::catalog;

    fn inventory() -> Vec<InventoryLayer> {
        let bounds = Bounds { south: 43.0, west: -89.5, north: 43.2, east: -89.3 };
        catalog()
            .into_iter()
            .map(|r| InventoryLayer::new(r, "http://example.test", bounds, false))
            .collect()
    }

    #[test]
    fn test_sections_in_order() {
        let session = EditorSession::from_config(serde_json::from_str(SAMPLE).unwrap());
        let legend = legend_document(&inventory(), session.show_layers(), true, &session);

        let traveler = legend.find("Real-time Traveler Information").unwrap();
        let wrs = legend.find("id=\"wrsSegments\"").unwrap();
        let project = legend.find("Construction Project Information").unwrap();
        let detours = legend.find("Detours").unwrap();
        assert!(traveler < wrs && wrs < project && project < detours);
        assert!(legend.starts_with("<ul id=\"legend-list\">"));
        assert!(legend.ends_with("</ul></li></ul>"));
    }

    #[test]
    fn test_inventory_checkboxes_follow_show_layers() {
        let session = EditorSession::from_config(serde_json::from_str(SAMPLE).unwrap());
        let legend = legend_document(&inventory(), session.show_layers(), false, &session);

        assert!(legend.contains("<input id=\"Incidents\" class=\"chk-inventory\" type=\"checkbox\" checked>"));
        assert!(legend.contains("<input id=\"Cameras\" class=\"chk-inventory\" type=\"checkbox\" >"));
        assert!(!legend.contains("wrsSegments"));
    }
}
