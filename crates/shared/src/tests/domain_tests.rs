use crate::domain::{
    parse_hex_rgb, sort_colors, ColorOption, LocalizedText, MediaResponse, RenderedImage, Vehicle,
};

#[test]
fn decodes_vehicle_with_service_field_names() {
    let raw = r#"{
        "modelRange": "G82",
        "typeCode": "001",
        "localizedName": {"en": "M4 Coupe", "de": "M4 Coupé"},
        "series": "4",
        "engineType": "Petrol",
        "wltpCO2Emissions": {"en": "230 g/km", "de": "230 g/km"},
        "wltpCO2Class": {"en": "G"},
        "somethingNew": true
    }"#;

    let vehicle: Vehicle = serde_json::from_str(raw).expect("vehicle");
    assert_eq!(vehicle.model_range.as_str(), "G82");
    assert_eq!(vehicle.type_code.as_str(), "001");
    assert_eq!(vehicle.display_name("de"), "M4 Coupé");
    assert_eq!(vehicle.key().to_string(), "G82/001");
    assert!(vehicle.wltp_fuel_consumption.is_none());

    let attributes = vehicle.attributes("en");
    assert_eq!(attributes[0], ("Series", "4".to_string()));
    assert!(attributes.contains(&("CO2 class (WLTP)", "G".to_string())));
}

#[test]
fn decodes_color_option_with_odd_casing() {
    let raw = r##"{
        "p0ID": "P0C4W",
        "hexCode": "#1f3a5c",
        "mainColor": "blue",
        "effect": "metallic",
        "localizedName": {"en": "Portimao Blue"},
        "SortIndex": 7
    }"##;

    let color: ColorOption = serde_json::from_str(raw).expect("color");
    assert_eq!(color.p0_id.as_str(), "P0C4W");
    assert_eq!(color.sort_index, 7.0);
    assert_eq!(color.swatch_rgb(), Some([0x1f, 0x3a, 0x5c]));
    assert_eq!(color.finish_label(), "metallic blue");
}

#[test]
fn media_response_unwraps_images_array() {
    let raw = r#"{"images":[{"url":"https://renderings.evecp.bmw.cloud/a.jpg","environment":"MTown","viewAngle":"34front"}],"videos":[]}"#;
    let media: MediaResponse = serde_json::from_str(raw).expect("media");
    assert_eq!(media.images.len(), 1);
    assert_eq!(media.images[0].view_angle, "34front");
}

#[test]
fn localized_text_falls_back_to_english_then_first_entry() {
    let text = LocalizedText::from([("de", "Schwarz"), ("en", "Black")]);
    assert_eq!(text.get("fr"), "Black");

    let german_only = LocalizedText::from([("de", "Schwarz")]);
    assert_eq!(german_only.get("fr"), "Schwarz");

    assert_eq!(LocalizedText::default().get("en"), "");
}

#[test]
fn parses_short_and_long_hex_codes() {
    assert_eq!(parse_hex_rgb("#fff"), Some([255, 255, 255]));
    assert_eq!(parse_hex_rgb("000000"), Some([0, 0, 0]));
    assert_eq!(parse_hex_rgb("#12345"), None);
    assert_eq!(parse_hex_rgb("#zzzzzz"), None);
}

#[test]
fn sorts_colors_by_sort_index_keeping_ties_stable() {
    let color = |id: &str, sort_index: i64| ColorOption {
        p0_id: id.into(),
        hex_code: String::new(),
        main_color: String::new(),
        effect: String::new(),
        localized_name: LocalizedText::default(),
        sort_index: sort_index as f64,
    };
    let mut colors = vec![color("c2", 2), color("c1", 1), color("b2", 2), color("c0", 0)];
    sort_colors(&mut colors);

    let ids: Vec<_> = colors.iter().map(|c| c.p0_id.as_str()).collect();
    assert_eq!(ids, ["c0", "c1", "c2", "b2"]);
}

#[test]
fn caption_falls_back_to_brand_name() {
    let image = RenderedImage {
        url: "https://renderings.evecp.bmw.cloud/x.jpg".into(),
        environment: "Studio".into(),
        view_angle: "side".into(),
    };
    assert_eq!(image.caption(Some("M4")), "M4 - Studio - side");
    assert_eq!(image.caption(None), "BMW - Studio - side");
}

#[test]
fn fractional_sort_index_decodes_and_sorts() {
    let raw = r##"[
        {"p0ID": "late", "hexCode": "#000", "SortIndex": 10.0},
        {"p0ID": "early", "hexCode": "#fff", "SortIndex": 2.5},
        {"p0ID": "plain", "hexCode": "#888", "SortIndex": 3}
    ]"##;
    let mut colors: Vec<ColorOption> = serde_json::from_str(raw).expect("colors");
    sort_colors(&mut colors);

    let ids: Vec<_> = colors.iter().map(|c| c.p0_id.as_str()).collect();
    assert_eq!(ids, ["early", "plain", "late"]);
}

#[test]
fn null_fields_decode_as_empty() {
    let vehicles: Vec<Vehicle> = serde_json::from_str(
        r#"[
            {"modelRange": "G82", "typeCode": "001", "series": null, "localizedName": null},
            {"modelRange": "G87", "typeCode": "002", "localizedName": {"en": "M2", "de": null}}
        ]"#,
    )
    .expect("vehicles");
    assert_eq!(vehicles[0].series, "");
    assert_eq!(vehicles[0].display_name("en"), "G82");
    assert!(vehicles[0].attributes("en").is_empty());
    assert_eq!(vehicles[1].display_name("de"), "M2");

    let color: ColorOption = serde_json::from_str(
        r#"{"p0ID": "c1", "hexCode": null, "mainColor": null, "effect": null, "SortIndex": null}"#,
    )
    .expect("color");
    assert_eq!(color.swatch_rgb(), None);
    assert_eq!(color.finish_label(), "");
    assert_eq!(color.sort_index, 0.0);

    let media: MediaResponse =
        serde_json::from_str(r#"{"images": [{"url": "https://x/a.jpg", "environment": null, "viewAngle": null}]}"#)
            .expect("media");
    assert_eq!(media.images[0].environment, "");
}

#[test]
fn localized_text_falls_back_to_first_entry_as_sent() {
    let text: LocalizedText =
        serde_json::from_str(r#"{"it": "Nero", "de": "Schwarz"}"#).expect("text");
    assert_eq!(text.get("fr"), "Nero");
    assert_eq!(text.languages().collect::<Vec<_>>(), ["it", "de"]);

    let round_trip = serde_json::to_string(&text).expect("encode");
    assert_eq!(round_trip, r#"{"it":"Nero","de":"Schwarz"}"#);
}
