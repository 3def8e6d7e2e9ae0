#[cfg(test)]
mod tests {
    use crate::*;

    #[test]
    fn empty_tuple_yields_defaults() {
        let s = from_ron("()").unwrap();
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn placement_and_padding_parse() {
        let s = from_ron(r#"(placement: "bottom-right", padding: 12.5, enabled: false)"#).unwrap();
        assert_eq!(s.placement, Placement::BottomRight);
        assert_eq!(s.padding, 12.5);
        assert!(!s.enabled);
    }

    #[test]
    fn nested_sections_merge_with_defaults() {
        let s = from_ron(
            r#"(
                resolver: (max_depth: 4),
                widget: (active_ms: 2000),
            )"#,
        )
        .unwrap();
        assert_eq!(s.resolver.max_depth, 4);
        assert_eq!(s.resolver.group_roles, ResolverCfg::default().group_roles);
        assert_eq!(s.widget.active_ms, 2000);
        assert_eq!(s.widget.host_bundle_id, WidgetCfg::default().host_bundle_id);
    }

    #[test]
    fn unknown_field_is_a_parse_error() {
        let err = from_ron("(\n  placment: \"top-left\",\n)").unwrap_err();
        match err {
            Error::Parse { line, excerpt, .. } => {
                assert_eq!(line, 2);
                assert!(excerpt.contains("placment"));
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn negative_padding_fails_validation() {
        let err = from_ron("(padding: -1.0)").unwrap_err();
        assert!(matches!(err, Error::Validation { ref field, .. } if field == "padding"));
        assert!(err.pretty().contains("padding"));
    }

    #[test]
    fn inverted_constraint_fails_validation() {
        let err = from_ron(
            "(window_filter: (min_width: 500.0, min_height: 10.0, max_width: 100.0, max_height: 100.0))",
        )
        .unwrap_err();
        assert!(matches!(err, Error::Validation { ref field, .. } if field == "window_filter"));
    }

    #[test]
    fn zero_workers_rejected() {
        assert!(from_ron("(workers: 0)").is_err());
    }

    #[test]
    fn settings_round_trip_through_ron() {
        let mut s = Settings::default();
        s.placement = Placement::MiddleLeft;
        s.owners.clear();
        let text = to_ron(&s).unwrap();
        assert_eq!(from_ron(&text).unwrap(), s);
    }

    #[test]
    fn missing_file_uses_defaults() {
        let path = std::env::temp_dir().join("notimove-does-not-exist/config.ron");
        assert_eq!(load_or_default(&path).unwrap(), Settings::default());
    }

    #[test]
    fn non_ron_extension_rejected() {
        let err = load_from_path(std::path::Path::new("/tmp/config.toml")).unwrap_err();
        assert!(matches!(err, Error::Read { .. }));
    }

    #[test]
    fn shared_settings_update_visible_in_snapshot() {
        let shared = SharedSettings::new(Settings::default());
        shared.update(|s| s.placement = Placement::TopLeft);
        assert_eq!(shared.snapshot().placement, Placement::TopLeft);
    }
}
