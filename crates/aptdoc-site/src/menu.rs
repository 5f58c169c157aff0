//! Maven site descriptor menu items for generated documents.
//!
//! Generated `.apt` files end up as `/generated/<namespace path>/<id>.html`
//! on the rendered site; these links let a `site.xml` menu point at them.

use std::fmt;

use crate::generator::GenerateReport;

/// A `site.xml` `<item>` linking to a generated page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SiteDescriptorLink {
    /// Dotted namespace of the documented unit.
    pub namespace: String,
    /// Document id (file stem).
    pub id: String,
    /// Display name of the menu item.
    pub name: String,
    /// Nested menu items.
    pub children: Vec<SiteDescriptorLink>,
}

impl SiteDescriptorLink {
    /// Create a link without children.
    pub fn new(
        namespace: impl Into<String>,
        id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            id: id.into(),
            name: name.into(),
            children: Vec::new(),
        }
    }

    /// Add a nested item.
    #[must_use]
    pub fn with_child(mut self, child: SiteDescriptorLink) -> Self {
        self.children.push(child);
        self
    }

    /// Site-relative URL of the generated page.
    #[must_use]
    pub fn href(&self) -> String {
        let path = self
            .namespace
            .split('.')
            .filter(|segment| !segment.is_empty())
            .collect::<Vec<_>>()
            .join("/");
        if path.is_empty() {
            format!("/generated/{}.html", self.id)
        } else {
            format!("/generated/{path}/{}.html", self.id)
        }
    }
}

impl fmt::Display for SiteDescriptorLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "\n<item name='{}' href='{}'>",
            escape_attr(&self.name),
            escape_attr(&self.href())
        )?;
        for child in &self.children {
            write!(f, "{child}")?;
        }
        f.write_str("</item>")
    }
}

/// One link per generated document, ordered by namespace then id.
///
/// The link name is the document title when present, otherwise its id.
#[must_use]
pub fn menu_links(report: &GenerateReport) -> Vec<SiteDescriptorLink> {
    let mut links: Vec<SiteDescriptorLink> = report
        .documents
        .iter()
        .map(|doc| {
            let name = doc.title.clone().unwrap_or_else(|| doc.id.clone());
            SiteDescriptorLink::new(doc.namespace.clone(), doc.id.clone(), name)
        })
        .collect();
    links.sort_by(|a, b| (&a.namespace, &a.id).cmp(&(&b.namespace, &b.id)));
    links.dedup_by(|a, b| a.namespace == b.namespace && a.id == b.id);
    links
}

/// Concatenate menu items into a `site.xml` fragment.
#[must_use]
pub fn render_menu(links: &[SiteDescriptorLink]) -> String {
    links.iter().map(ToString::to_string).collect()
}

/// Escape a value for a single-quoted XML attribute.
fn escape_attr(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\'' => escaped.push_str("&apos;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
