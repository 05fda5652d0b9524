//! Rendered view trees.
//!
//! Page components produce `View`s. A view can be printed as plain text
//! (one block per line), serialized to markup, or searched for the link or
//! button a user would activate.

use serde::Serialize;
use std::fmt;

/// Tags rendered on their own line.
const BLOCK_TAGS: &[&str] = &[
    "div", "p", "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol", "li", "header", "main", "nav",
    "section", "footer",
];

/// What activating a control does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Navigate to an already-resolved href.
    Navigate {
        /// Target href.
        to: String,
        /// Replace the current history entry instead of pushing.
        replace: bool,
    },
    /// Go back one history entry.
    Back,
    /// Go forward one history entry.
    Forward,
}

/// A rendered view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum View {
    /// Nothing.
    #[default]
    Empty,
    /// Plain text.
    Text {
        /// The text.
        text: String,
    },
    /// An element with children.
    Element {
        /// Tag name.
        tag: String,
        /// Child views.
        children: Vec<View>,
    },
    /// A navigation link.
    Link {
        /// Resolved target href.
        href: String,
        /// Link label.
        label: String,
    },
    /// A button.
    Button {
        /// Button label.
        label: String,
        /// Activation action.
        action: Action,
    },
    /// Several views without a wrapper.
    Fragment {
        /// Child views.
        children: Vec<View>,
    },
}

impl View {
    /// Create a text view.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Create an element.
    #[must_use]
    pub fn element(tag: impl Into<String>, children: Vec<View>) -> Self {
        Self::Element {
            tag: tag.into(),
            children,
        }
    }

    /// Create an `h1` heading.
    #[must_use]
    pub fn heading(text: impl Into<String>) -> Self {
        Self::element("h1", vec![Self::text(text)])
    }

    /// Create a paragraph.
    #[must_use]
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::element("p", vec![Self::text(text)])
    }

    /// Create a `ul` list, wrapping each item in `li`.
    #[must_use]
    pub fn list(items: Vec<View>) -> Self {
        Self::element(
            "ul",
            items
                .into_iter()
                .map(|item| Self::element("li", vec![item]))
                .collect(),
        )
    }

    /// Create a fragment.
    #[must_use]
    pub fn fragment(children: Vec<View>) -> Self {
        Self::Fragment { children }
    }

    /// Check if the view renders nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Fragment { children } => children.iter().all(View::is_empty),
            _ => false,
        }
    }

    /// Text content, one block per line, without link targets.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut lines = Lines::default();
        self.layout(&mut lines, false);
        lines.finish()
    }

    /// Find the action of the first link or button with this label.
    #[must_use]
    pub fn find_action(&self, label: &str) -> Option<Action> {
        match self {
            Self::Link { href, label: l } if l == label => Some(Action::Navigate {
                to: href.clone(),
                replace: false,
            }),
            Self::Button { label: l, action } if l == label => Some(action.clone()),
            Self::Element { children, .. } | Self::Fragment { children } => {
                children.iter().find_map(|child| child.find_action(label))
            }
            _ => None,
        }
    }

    /// All links as `(label, href)` pairs, in document order.
    #[must_use]
    pub fn links(&self) -> Vec<(&str, &str)> {
        let mut out = Vec::new();
        self.collect_links(&mut out);
        out
    }

    fn collect_links<'a>(&'a self, out: &mut Vec<(&'a str, &'a str)>) {
        match self {
            Self::Link { href, label } => out.push((label, href)),
            Self::Element { children, .. } | Self::Fragment { children } => {
                for child in children {
                    child.collect_links(out);
                }
            }
            _ => {}
        }
    }

    /// Serialize to HTML-like markup.
    #[must_use]
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        self.write_markup(&mut out);
        out
    }

    fn write_markup(&self, out: &mut String) {
        match self {
            Self::Empty => {}
            Self::Text { text } => out.push_str(&escape(text)),
            Self::Element { tag, children } => {
                out.push('<');
                out.push_str(tag);
                out.push('>');
                for child in children {
                    child.write_markup(out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
            Self::Link { href, label } => {
                out.push_str(&format!(
                    "<a href=\"{}\">{}</a>",
                    escape(href),
                    escape(label)
                ));
            }
            Self::Button { label, .. } => {
                out.push_str(&format!("<button>{}</button>", escape(label)));
            }
            Self::Fragment { children } => {
                for child in children {
                    child.write_markup(out);
                }
            }
        }
    }

    fn layout(&self, lines: &mut Lines, decorate: bool) {
        match self {
            Self::Empty => {}
            Self::Text { text } => lines.push(text),
            Self::Link { href, label } => {
                if decorate {
                    lines.push(&format!("[{label}]({href})"));
                } else {
                    lines.push(label);
                }
            }
            Self::Button { label, .. } => {
                if decorate {
                    lines.push(&format!("<{label}>"));
                } else {
                    lines.push(label);
                }
            }
            Self::Element { tag, children } => {
                let block = BLOCK_TAGS.contains(&tag.as_str());
                if block {
                    lines.break_line();
                }
                if decorate && tag == "li" {
                    lines.push("- ");
                }
                for child in children {
                    child.layout(lines, decorate);
                }
                if block {
                    lines.break_line();
                }
            }
            Self::Fragment { children } => {
                for child in children {
                    child.layout(lines, decorate);
                }
            }
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines = Lines::default();
        self.layout(&mut lines, true);
        f.write_str(&lines.finish())
    }
}

/// Line accumulator for text layout.
#[derive(Default)]
struct Lines {
    done: Vec<String>,
    current: String,
}

impl Lines {
    fn push(&mut self, text: &str) {
        if !self.current.is_empty() && !self.current.ends_with(' ') && !text.starts_with(' ') {
            self.current.push(' ');
        }
        self.current.push_str(text);
    }

    fn break_line(&mut self) {
        let line = self.current.trim_end();
        if !line.is_empty() {
            self.done.push(line.to_string());
        }
        self.current.clear();
    }

    fn finish(mut self) -> String {
        self.break_line();
        self.done.join("\n")
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> View {
        View::fragment(vec![
            View::element(
                "header",
                vec![View::list(vec![
                    View::Link {
                        href: "/".to_string(),
                        label: "Home".to_string(),
                    },
                    View::Button {
                        label: "About".to_string(),
                        action: Action::Navigate {
                            to: "/about".to_string(),
                            replace: false,
                        },
                    },
                ])],
            ),
            View::element(
                "main",
                vec![View::element(
                    "div",
                    vec![View::paragraph("User with 2 is named Grace")],
                )],
            ),
        ])
    }

    #[test]
    fn test_text_content_blocks() {
        assert_eq!(
            sample().text_content(),
            "Home\nAbout\nUser with 2 is named Grace"
        );
    }

    #[test]
    fn test_display_decorates_controls() {
        let text = sample().to_string();
        assert!(text.contains("- [Home](/)"));
        assert!(text.contains("- <About>"));
    }

    #[test]
    fn test_find_action() {
        let view = sample();
        assert_eq!(
            view.find_action("Home"),
            Some(Action::Navigate {
                to: "/".to_string(),
                replace: false
            })
        );
        assert!(matches!(
            view.find_action("About"),
            Some(Action::Navigate { ref to, .. }) if to == "/about"
        ));
        assert_eq!(view.find_action("Missing"), None);
    }

    #[test]
    fn test_links_in_order() {
        assert_eq!(sample().links(), vec![("Home", "/")]);
    }

    #[test]
    fn test_markup_escapes() {
        let view = View::element("p", vec![View::text("a < b & \"c\"")]);
        assert_eq!(view.to_markup(), "<p>a &lt; b &amp; &quot;c&quot;</p>");
    }

    #[test]
    fn test_is_empty() {
        assert!(View::Empty.is_empty());
        assert!(View::fragment(vec![View::Empty]).is_empty());
        assert!(!View::text("x").is_empty());
    }
}
