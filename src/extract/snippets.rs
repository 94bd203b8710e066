//! Tool snippets
//!
//! Renders a [`LocatorCandidateSet`] as ready-to-paste Playwright (Python) and
//! Selenium (Python) lookups. Values are substituted verbatim, like the
//! expressions they come from.

use serde::{Deserialize, Serialize};

use crate::extract::strategy::{LocatorCandidateSet, LocatorStrategy};

/// Automation tool a snippet targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    Playwright,
    Selenium,
}

/// Snippets for every supported tool
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSnippets {
    pub playwright: Vec<String>,
    pub selenium: Vec<String>,
}

impl ToolSnippets {
    /// Render `set` for every tool
    pub fn from_set(set: &LocatorCandidateSet) -> Self {
        Self {
            playwright: render(set, Tool::Playwright),
            selenium: render(set, Tool::Selenium),
        }
    }

    /// Whether no snippet was rendered
    pub fn is_empty(&self) -> bool {
        self.playwright.is_empty() && self.selenium.is_empty()
    }
}

/// Snippets for `tool`, one per strategy the tool can express, in strategy order
pub fn render(set: &LocatorCandidateSet, tool: Tool) -> Vec<String> {
    set.iter()
        .filter_map(|(strategy, expression)| match tool {
            Tool::Playwright => playwright(strategy, expression),
            Tool::Selenium => selenium(strategy, expression),
        })
        .collect()
}

/// `button[name='Go']` → ("button", "Go")
fn split_role(expression: &str) -> Option<(&str, &str)> {
    let (role, rest) = expression.split_once("[name='")?;
    Some((role, rest.strip_suffix("']")?))
}

fn playwright(strategy: LocatorStrategy, expression: &str) -> Option<String> {
    let snippet = match strategy {
        LocatorStrategy::TestId => format!("page.get_by_test_id('{}')", expression),
        LocatorStrategy::Id => format!("page.locator('{}')", expression),
        LocatorStrategy::Role => {
            let (role, name) = split_role(expression)?;
            format!("page.get_by_role('{}', name='{}')", role, name)
        }
        LocatorStrategy::Placeholder => format!("page.get_by_placeholder('{}')", expression),
        LocatorStrategy::Label => format!("page.locator('[name=\"{}\"]')", expression),
        LocatorStrategy::Title => format!("page.get_by_title('{}')", expression),
        LocatorStrategy::Alt => format!("page.get_by_alt_text('{}')", expression),
        LocatorStrategy::Text => format!("page.get_by_text('{}')", expression),
        LocatorStrategy::XPath => format!("page.locator(\"xpath={}\")", expression),
        LocatorStrategy::Css => format!("page.locator('css={}')", expression),
    };
    Some(snippet)
}

fn selenium(strategy: LocatorStrategy, expression: &str) -> Option<String> {
    let snippet = match strategy {
        LocatorStrategy::TestId => {
            format!("driver.find_element(By.CSS_SELECTOR, \"[data-testid='{}']\")", expression)
        }
        LocatorStrategy::Id => format!(
            "driver.find_element(By.ID, '{}')",
            expression.strip_prefix('#').unwrap_or(expression)
        ),
        LocatorStrategy::Role => {
            let (role, name) = split_role(expression)?;
            format!(
                "driver.find_element(By.XPATH, \"//*[@role='{}' and text()='{}']\")",
                role, name
            )
        }
        LocatorStrategy::Placeholder => {
            format!("driver.find_element(By.CSS_SELECTOR, \"[placeholder='{}']\")", expression)
        }
        LocatorStrategy::Label => format!("driver.find_element(By.NAME, '{}')", expression),
        LocatorStrategy::Title => {
            format!("driver.find_element(By.CSS_SELECTOR, \"[title='{}']\")", expression)
        }
        LocatorStrategy::Alt => {
            format!("driver.find_element(By.CSS_SELECTOR, \"[alt='{}']\")", expression)
        }
        // Selenium has no text lookup; the xpath entry covers it
        LocatorStrategy::Text => return None,
        LocatorStrategy::XPath => format!("driver.find_element(By.XPATH, \"{}\")", expression),
        LocatorStrategy::Css => format!("driver.find_element(By.CSS_SELECTOR, '{}')", expression),
    };
    Some(snippet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::attributes::AttributeBundle;
    use crate::extract::strategy::build;

    fn button() -> LocatorCandidateSet {
        build(&AttributeBundle {
            tag: "button".to_string(),
            id: Some("go".to_string()),
            classes: vec!["btn".to_string(), "primary".to_string()],
            text: Some("Go".to_string()),
            ..AttributeBundle::default()
        })
    }

    #[test]
    fn test_playwright_templates() {
        assert_eq!(
            render(&button(), Tool::Playwright),
            vec![
                "page.locator('#go')",
                "page.get_by_text('Go')",
                "page.locator(\"xpath=//*[text()='Go']\")",
                "page.locator('css=button.btn.primary')",
            ]
        );
    }

    #[test]
    fn test_selenium_templates() {
        assert_eq!(
            render(&button(), Tool::Selenium),
            vec![
                "driver.find_element(By.ID, 'go')",
                "driver.find_element(By.XPATH, \"//*[text()='Go']\")",
                "driver.find_element(By.CSS_SELECTOR, 'button.btn.primary')",
            ]
        );
    }

    #[test]
    fn test_attribute_templates() {
        let set = build(&AttributeBundle {
            tag: "input".to_string(),
            role: Some("searchbox".to_string()),
            placeholder: Some("Search".to_string()),
            test_id: Some("q-box".to_string()),
            title: Some("Find".to_string()),
            name: Some("q".to_string()),
            alt: Some("lens".to_string()),
            text: Some("Query".to_string()),
            ..AttributeBundle::default()
        });

        let playwright = render(&set, Tool::Playwright);
        for expected in [
            "page.get_by_test_id('q-box')",
            "page.get_by_role('searchbox', name='Query')",
            "page.get_by_placeholder('Search')",
            "page.locator('[name=\"q\"]')",
            "page.get_by_title('Find')",
            "page.get_by_alt_text('lens')",
        ] {
            assert!(playwright.iter().any(|s| s == expected), "missing {}", expected);
        }

        let selenium = render(&set, Tool::Selenium);
        for expected in [
            "driver.find_element(By.CSS_SELECTOR, \"[data-testid='q-box']\")",
            "driver.find_element(By.XPATH, \"//*[@role='searchbox' and text()='Query']\")",
            "driver.find_element(By.CSS_SELECTOR, \"[placeholder='Search']\")",
            "driver.find_element(By.NAME, 'q')",
            "driver.find_element(By.CSS_SELECTOR, \"[title='Find']\")",
            "driver.find_element(By.CSS_SELECTOR, \"[alt='lens']\")",
        ] {
            assert!(selenium.iter().any(|s| s == expected), "missing {}", expected);
        }
        assert_eq!(playwright.len(), 8);
        assert_eq!(selenium.len(), 7);
    }

    #[test]
    fn test_empty_set_renders_nothing() {
        let snippets = ToolSnippets::from_set(&LocatorCandidateSet::default());
        assert!(snippets.is_empty());
    }
}
