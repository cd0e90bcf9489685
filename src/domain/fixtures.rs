// Shared test fixtures

/// Project with a collapsed two-feature group and an expanded group.
pub const SAMPLE: &str = r##"{
    "initialExtent": {"center": [43.07, -89.4], "zoom": 12},
    "bounds": {"south": 43.0, "west": -89.5, "north": 43.2, "east": -89.3},
    "projectPointLocation": {"lat": 43.1, "lng": -89.4},
    "showLayers": {"incidents": true, "trafficSpeed": true},
    "projectName": "Verona Road",
    "layers": [
        {
            "layerId": "g1",
            "layerName": "Detours",
            "expand": false,
            "groupColor": "#112233",
            "groupStyle": "dashed",
            "startupShow": true,
            "layerGeoJson": {"type": "FeatureCollection", "features": [
                {"type": "Feature",
                 "properties": {"featureId": "f1", "name": "North leg", "color": "#112233",
                                "opacity": 0.8, "lineWidth": 5, "lineStyle": "dashed",
                                "legendShow": true, "initialShow": true},
                 "geometry": {"type": "LineString", "coordinates": [[-89.45, 43.05], [-89.40, 43.10]]}},
                {"type": "Feature",
                 "properties": {"featureId": "f2", "name": "", "color": "#112233",
                                "opacity": 0.6, "lineWidth": 8, "lineStyle": "dashed",
                                "legendShow": true, "initialShow": false},
                 "geometry": {"type": "LineString", "coordinates": [[-89.40, 43.10], [-89.35, 43.12]]}}
            ]}
        },
        {
            "layerId": "g2",
            "layerName": "Work Zones",
            "expand": true,
            "groupColor": null,
            "groupStyle": null,
            "startupShow": false,
            "layerGeoJson": {"type": "FeatureCollection", "features": [
                {"type": "Feature",
                 "properties": {"featureId": "f3", "name": "Stage 1", "color": "#FF6600",
                                "opacity": 1.0, "lineWidth": 12, "lineStyle": "solid",
                                "legendShow": false, "initialShow": true},
                 "geometry": {"type": "LineString", "coordinates": [[-89.42, 43.02], [-89.38, 43.03]]}}
            ]}
        }
    ]
}"##;
