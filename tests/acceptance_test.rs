//! 功能验收测试
//!
//! Acceptance tests for the locator extraction contract, run through the
//! public API against mock sessions.

mod common;

use common::{fast_settings, many_links, mock_extractor};
use locator_forge::config::Config;
use locator_forge::extract::{
    build, AttributeBundle, BestLocatorPolicy, ExtractorSettings, LocatorStrategy, ResultRecord,
    DEFAULT_PRIORITY,
};
use locator_forge::session::mock::{MockElement, MockNavigation, MockPageScript};
use serde_json::json;
use tokio_test::{assert_err, assert_ok};

// ============= Locator construction =============

fn bundle_with(strategy: LocatorStrategy) -> AttributeBundle {
    let mut bundle = AttributeBundle {
        tag: "div".to_string(),
        ..AttributeBundle::default()
    };
    match strategy {
        LocatorStrategy::TestId => bundle.test_id = Some("t".to_string()),
        LocatorStrategy::Id => bundle.id = Some("i".to_string()),
        LocatorStrategy::Role => {
            bundle.role = Some("button".to_string());
            bundle.text = Some("Go".to_string());
        }
        LocatorStrategy::Placeholder => bundle.placeholder = Some("p".to_string()),
        LocatorStrategy::Label => bundle.name = Some("n".to_string()),
        LocatorStrategy::Title => bundle.title = Some("ti".to_string()),
        LocatorStrategy::Alt => bundle.alt = Some("a".to_string()),
        LocatorStrategy::Text | LocatorStrategy::XPath => bundle.text = Some("Go".to_string()),
        LocatorStrategy::Css => bundle.classes = vec!["btn".to_string(), "primary".to_string()],
    }
    bundle
}

#[test]
fn test_templates_match_exactly() {
    let bundle = AttributeBundle {
        tag: "div".to_string(),
        id: Some("submit".to_string()),
        classes: vec!["btn".to_string(), "primary".to_string()],
        role: Some("button".to_string()),
        placeholder: Some("Search".to_string()),
        test_id: Some("search-btn".to_string()),
        title: Some("Run search".to_string()),
        name: Some("q".to_string()),
        alt: Some("magnifier".to_string()),
        text: Some("Search".to_string()),
    };

    let set = build(&bundle);
    let expected = json!({
        "testid": "search-btn",
        "id": "#submit",
        "role": "button[name='Search']",
        "placeholder": "Search",
        "label": "q",
        "title": "Run search",
        "alt": "magnifier",
        "text": "Search",
        "xpath": "//*[text()='Search']",
        "css": "div.btn.primary"
    });
    assert_eq!(serde_json::to_value(&set).unwrap(), expected);
    assert_eq!(build(&bundle), set);
}

#[test]
fn test_empty_bundle_has_no_locators() {
    let set = build(&AttributeBundle {
        tag: "span".to_string(),
        ..AttributeBundle::default()
    });
    assert!(set.is_empty());
    assert_eq!(BestLocatorPolicy::default().select_best(&set), None);
}

#[test]
fn test_role_needs_text() {
    let set = build(&AttributeBundle {
        tag: "div".to_string(),
        role: Some("dialog".to_string()),
        ..AttributeBundle::default()
    });
    assert!(set.get(LocatorStrategy::Role).is_none());
}

// ============= Best locator =============

#[test]
fn test_best_is_highest_priority_populated() {
    let policy = BestLocatorPolicy::default();

    // Every pair of strategies: the one ranked higher wins
    for (i, higher) in DEFAULT_PRIORITY.iter().enumerate() {
        for lower in DEFAULT_PRIORITY.iter().skip(i + 1) {
            let mut bundle = bundle_with(*lower);
            let extra = bundle_with(*higher);
            bundle.test_id = bundle.test_id.or(extra.test_id);
            bundle.id = bundle.id.or(extra.id);
            bundle.role = bundle.role.or(extra.role);
            bundle.placeholder = bundle.placeholder.or(extra.placeholder);
            bundle.name = bundle.name.or(extra.name);
            bundle.title = bundle.title.or(extra.title);
            bundle.alt = bundle.alt.or(extra.alt);
            bundle.text = bundle.text.or(extra.text);
            if bundle.classes.is_empty() {
                bundle.classes = extra.classes;
            }

            let set = build(&bundle);
            let top = DEFAULT_PRIORITY
                .iter()
                .find_map(|strategy| set.get(*strategy))
                .map(str::to_string);
            assert_eq!(policy.select_best(&set), top, "{} vs {}", higher, lower);
            assert!(top.is_some());
        }
    }
}

#[test]
fn test_css_outranks_xpath() {
    let mut bundle = bundle_with(LocatorStrategy::Css);
    bundle.text = Some("Go".to_string());
    let set = build(&bundle);

    let best = BestLocatorPolicy::new(vec![LocatorStrategy::Css, LocatorStrategy::XPath])
        .select_best(&set);
    assert_eq!(best.as_deref(), Some("div.btn.primary"));
    assert_eq!(
        BestLocatorPolicy::default().select_best(&set).as_deref(),
        Some("Go")
    );
}

// ============= Pipeline scenarios =============

#[tokio::test]
async fn test_button_scenario() {
    let (_manager, extractor) = mock_extractor(
        MockPageScript::new().with("button", &[("id", "go"), ("testId", "go-btn"), ("text", "Go")]),
        fast_settings(),
    );

    let records = extractor.extract_all("https://example.com").await;
    assert_eq!(
        serde_json::to_value(&records).unwrap(),
        json!([{
            "tag": "button",
            "best": "go-btn",
            "all": {
                "testid": "go-btn",
                "id": "#go",
                "text": "Go",
                "xpath": "//*[text()='Go']"
            }
        }])
    );
}

#[tokio::test]
async fn test_count_never_exceeds_cap() {
    for cap in [1, 7, 150] {
        let (_manager, extractor) = mock_extractor(
            many_links(500),
            ExtractorSettings {
                element_cap: cap,
                ..fast_settings()
            },
        );

        let records = extractor.extract_all("https://example.com").await;
        assert_eq!(records.len(), cap);

        let ids: Vec<String> = records
            .iter()
            .map(|record| record.as_element().unwrap().all.get(LocatorStrategy::Id).unwrap().to_string())
            .collect();
        let expected: Vec<String> = (0..cap).map(|i| format!("#link-{}", i)).collect();
        assert_eq!(ids, expected);
    }
}

#[tokio::test]
async fn test_long_text_never_surfaces() {
    let settings = fast_settings();
    let limit = settings.text_max_len;
    let script = (limit - 2..limit + 3).fold(MockPageScript::new(), |script, len| {
        let text = "x".repeat(len);
        script.with("button", &[("text", text.as_str()), ("role", "button")])
    });
    let (_manager, extractor) = mock_extractor(script, settings);

    let records = extractor.extract_all("https://example.com").await;
    assert_eq!(records.len(), 5);
    for record in &records {
        for (_, expression) in record.as_element().unwrap().all.iter() {
            assert!(!expression.contains(&"x".repeat(limit)), "{}", expression);
        }
    }
    let with_text = records
        .iter()
        .filter(|record| record.as_element().unwrap().all.get(LocatorStrategy::Text).is_some())
        .count();
    assert_eq!(with_text, 2);
}

#[tokio::test]
async fn test_non_http_urls_rejected_without_navigation() {
    let (manager, extractor) = mock_extractor(MockPageScript::new(), fast_settings());

    for url in ["ftp://example.com", "file:///etc/hosts", "javascript:alert(1)", "example.com", ""] {
        let records = extractor.extract_all(url).await;
        assert_eq!(records.len(), 1, "{}", url);
        let failure = records[0].as_failure().unwrap();
        assert_eq!(failure.kind, "InvalidUrl");
        assert_eq!(failure.url, url);
    }
    assert_eq!(manager.acquisitions(), 0);
    assert!(manager.pages().await.is_empty());
}

#[tokio::test]
async fn test_timeout_is_single_record_and_page_released() {
    let (manager, extractor) = mock_extractor(
        MockPageScript::new()
            .navigation(MockNavigation::Hang)
            .with("a", &[("id", "never")]),
        fast_settings(),
    );

    let records = extractor.extract_all("https://slow.example.com").await;
    assert_eq!(records.len(), 1);
    let failure = records[0].as_failure().unwrap();
    assert_eq!(failure.kind, "NavigationTimeout");
    assert!(failure.error.to_lowercase().contains("timed out"));

    let pages = manager.pages().await;
    assert_eq!(pages.len(), 1);
    assert!(pages[0].is_closed());
}

#[tokio::test]
async fn test_hung_element_does_not_stall_stream() {
    let (manager, extractor) = mock_extractor(
        MockPageScript::new()
            .with("a", &[("id", "first")])
            .element(MockElement::Hang)
            .element(MockElement::Detached)
            .with("a", &[("id", "last")]),
        fast_settings(),
    );

    let records = extractor.extract_all("https://example.com").await;
    let bests: Vec<Option<String>> = records
        .iter()
        .map(|record| record.as_element().unwrap().best.clone())
        .collect();
    assert_eq!(bests, vec![Some("#first".to_string()), Some("#last".to_string())]);
    assert!(manager.pages().await[0].is_closed());
}

#[tokio::test]
async fn test_error_record_shape() {
    let (_manager, extractor) = mock_extractor(
        MockPageScript::new().navigation(MockNavigation::EngineError("net::ERR_CONNECTION_REFUSED".to_string())),
        fast_settings(),
    );

    let records = extractor.extract_all("https://down.example.com").await;
    assert_eq!(records.len(), 1);
    assert!(matches!(records[0], ResultRecord::Failure(_)));

    let value = serde_json::to_value(&records[0]).unwrap();
    assert!(value["error"].as_str().unwrap().contains("ERR_CONNECTION_REFUSED"));
    assert_eq!(value["url"], "https://down.example.com");
    assert!(value.get("tag").is_none());
}

// ============= Configuration =============

#[tokio::test]
async fn test_configured_priority_changes_best() {
    let config: Config = toml::from_str(
        r#"
        element_cap = 10
        priority = ["text", "id"]
        "#,
    )
    .unwrap();
    assert_ok!(config.validate());

    let settings = ExtractorSettings {
        navigation_timeout: fast_settings().navigation_timeout,
        ..ExtractorSettings::from_config(&config).unwrap()
    };
    let (_manager, extractor) = mock_extractor(
        MockPageScript::new().with("button", &[("id", "go"), ("text", "Go")]),
        settings,
    );

    let records = extractor.extract_all("https://example.com").await;
    assert_eq!(records[0].as_element().unwrap().best.as_deref(), Some("Go"));
}

#[test]
fn test_unknown_priority_key_rejected() {
    let config: Config = toml::from_str(r#"priority = ["testid", "nearby"]"#).unwrap();
    assert_err!(config.validate());
}
