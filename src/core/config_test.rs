#[cfg(test)]
mod tests {

    use std::time::Duration;
    use crate::core::{FontSize, OverlayConfig};

    fn temp_config_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir()
            .join(format!("danmaku-overlay-test-{}-{}", name, std::process::id()))
            .join("config.json")
    }

    #[test]
    fn test_overlay_config_default() {
        let config = OverlayConfig::default();
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
        assert_eq!(config.top_display(), Duration::from_secs(3));
        assert_eq!(config.top_resume(), Duration::from_secs(1));
        assert_eq!(config.row_height, 37.0);
        assert_eq!(config.spacing, 10.0);
        assert!(config.bullet_screen_enabled);
        assert!(!config.autoplay);
    }

    #[test]
    fn test_travel_duration_is_proportional() {
        let config = OverlayConfig::default();
        // the default surface is crossed in five seconds
        assert!((config.travel_duration(984.0).as_secs_f64() - 5.0).abs() < 1e-6);
        assert!((config.travel_duration(492.0).as_secs_f64() - 2.5).abs() < 1e-6);
        assert_eq!(config.travel_duration(-5.0), Duration::ZERO);
    }

    #[test]
    fn test_font_px_and_band_count() {
        let config = OverlayConfig::default();
        assert_eq!(config.font_px(FontSize::Small), 16.0);
        assert_eq!(config.font_px(FontSize::Large), 32.0);
        assert_eq!(config.band_count(), 14);

        let mut tiny = OverlayConfig::default();
        tiny.surface.height = 10.0;
        assert_eq!(tiny.band_count(), 1);
    }

    #[test]
    fn test_config_backward_compatibility() {
        // Older files without the newer fields still load
        let old_config_json = r#"{
            "surface": { "width": 640.0, "height": 360.0, "base_font_px": 14.0 },
            "poll_interval_ms": 500
        }"#;

        let config: OverlayConfig = serde_json::from_str(old_config_json).expect("Failed to parse old config");

        assert_eq!(config.surface.width, 640.0);
        assert_eq!(config.poll_interval_ms, 500);
        assert_eq!(config.top_display_ms, 3000);
        assert!(config.bullet_screen_enabled);
    }

    #[test]
    fn test_load_creates_default_file() {
        let path = temp_config_path("create");
        let _ = std::fs::remove_file(&path);

        let config = OverlayConfig::load_from(&path).expect("Failed to load config");
        assert_eq!(config.poll_interval_ms, 1000);
        assert!(path.exists());

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_load_replaces_broken_file() {
        let path = temp_config_path("broken");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{ not json").unwrap();

        let config = OverlayConfig::load_from(&path).expect("Failed to load config");
        assert_eq!(config.top_display_ms, 3000);

        let rewritten = std::fs::read_to_string(&path).unwrap();
        assert!(serde_json::from_str::<OverlayConfig>(&rewritten).is_ok());

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_save_then_load_keeps_changes() {
        let path = temp_config_path("roundtrip");
        let mut config = OverlayConfig::default();
        config.autoplay = true;
        config.bullet_screen_enabled = false;
        config.save_to(&path).expect("Failed to save config");

        let loaded = OverlayConfig::load_from(&path).expect("Failed to load config");
        assert!(loaded.autoplay);
        assert!(!loaded.bullet_screen_enabled);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
