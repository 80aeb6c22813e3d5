//! Seed datasets selectable as the document "version".
//!
//! `Default` is the empty schema; the others are fixed example brand kits.

use crate::domain::entities::{
    Audience, BrandFoundations, Competitor, ContentType, Document, ProductLine, Region, Sample,
    WritingRule,
};
use crate::domain::tags::GLOBAL_TAG;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DatasetVersion {
    #[default]
    Default,
    Klaviyo,
    Xero,
}

impl DatasetVersion {
    pub const ALL: [DatasetVersion; 3] = [
        DatasetVersion::Default,
        DatasetVersion::Klaviyo,
        DatasetVersion::Xero,
    ];

    /// Stored representation.
    pub fn as_str(self) -> &'static str {
        match self {
            DatasetVersion::Default => "Default",
            DatasetVersion::Klaviyo => "Klaviyo",
            DatasetVersion::Xero => "Xero",
        }
    }
}

impl fmt::Display for DatasetVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DatasetVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Default" => Ok(DatasetVersion::Default),
            "Klaviyo" => Ok(DatasetVersion::Klaviyo),
            "Xero" => Ok(DatasetVersion::Xero),
            other => Err(format!("unknown dataset version '{}'", other)),
        }
    }
}

pub fn seed_document(version: DatasetVersion) -> Document {
    match version {
        DatasetVersion::Default => Document::empty(),
        DatasetVersion::Klaviyo => klaviyo(),
        DatasetVersion::Xero => xero(),
    }
}

fn global(name: &str, description: &str) -> WritingRule {
    WritingRule::new(name, description, [GLOBAL_TAG])
}

fn scoped(name: &str, description: &str, tag: &str) -> WritingRule {
    WritingRule::new(name, description, [tag])
}

fn audience(name: &str, description: &str, icon: &str, rules: Vec<WritingRule>) -> Audience {
    Audience {
        description: description.to_string(),
        writing_rules: rules,
        icon: Some(icon.to_string()),
        ..Audience::named(name)
    }
}

fn region(name: &str, description: &str, flag: &str, rules: Vec<WritingRule>) -> Region {
    Region {
        description: description.to_string(),
        writing_rules: rules,
        flag: Some(flag.to_string()),
        ..Region::named(name)
    }
}

fn content_type(
    name: &str,
    template: &str,
    icon: &str,
    samples: &[(&str, &str)],
    rules: Vec<WritingRule>,
) -> ContentType {
    ContentType {
        brand_tone_and_voice: template.to_string(),
        samples: samples
            .iter()
            .map(|(title, body)| Sample {
                title: Some(title.to_string()),
                body: body.to_string(),
                notes: None,
                attachment: None,
                tags: vec![name.to_string()],
            })
            .collect(),
        content_type_rules: rules,
        icon: Some(icon.to_string()),
        ..ContentType::named(name)
    }
}

fn competitor(name: &str, domain: &str, regions: &[&str]) -> Competitor {
    Competitor {
        name: name.to_string(),
        domain: domain.to_string(),
        regions: regions.iter().map(|r| r.to_string()).collect(),
    }
}

fn klaviyo() -> Document {
    let regions = ["North America", "EMEA", "APAC"];
    Document {
        brand_foundations: BrandFoundations {
            brand_name: "Klaviyo".to_string(),
            brand_domain: "klaviyo.com".to_string(),
            brand_icon: "📈".to_string(),
            brand_colors: vec!["#232426".to_string(), "#F6F3EF".to_string()],
            about_your_brand: "Klaviyo is a customer data and marketing automation platform that helps \
                               brands own their customer relationships across email, SMS and more."
                .to_string(),
            brand_story_and_purpose: "Built so growing brands can use their own first-party data to \
                                      send the right message at the right time."
                .to_string(),
            brand_tone_and_voice: "Confident, helpful and plain-spoken. We explain, we don't hype."
                .to_string(),
            writing_rules: vec![
                global("Sentence case", "Use sentence case for headings and buttons."),
                global("No jargon", "Prefer plain words over marketing jargon."),
            ],
            ..BrandFoundations::default()
        },
        product_lines: vec![
            ProductLine {
                product_line_details: "Email marketing with segmentation and flows.".to_string(),
                key_differentiators_and_positioning: "Native data platform behind every send."
                    .to_string(),
                ideal_customers: "Ecommerce brands from first sale to enterprise.".to_string(),
                competitors: vec![
                    competitor("Mailchimp", "mailchimp.com", &regions),
                    competitor("Braze", "braze.com", &["North America", "EMEA"]),
                ],
                icon: Some("✉️".to_string()),
                ..ProductLine::named("Email")
            },
            ProductLine {
                product_line_details: "Two-way SMS and MMS campaigns.".to_string(),
                key_differentiators_and_positioning: "Same profiles and flows as email.".to_string(),
                ideal_customers: "Brands with mobile-first shoppers.".to_string(),
                competitors: vec![competitor("Attentive", "attentive.com", &["North America"])],
                icon: Some("💬".to_string()),
                ..ProductLine::named("SMS")
            },
        ],
        content_types: vec![
            content_type(
                "Email",
                "## Subject\n\n## Preheader\n\n## Body\n",
                "✉️",
                &[("Welcome", "Welcome aboard. Here's how to send your first flow.")],
                vec![scoped("Subject length", "Keep subject lines under 50 characters.", "Email")],
            ),
            content_type(
                "Blog post",
                "# Title\n\n## Intro\n\n## Takeaways\n",
                "📝",
                &[],
                vec![scoped("Takeaways", "End with three concrete takeaways.", "Blog post")],
            ),
        ],
        audiences: vec![
            audience(
                "Marketers",
                "Hands-on email and SMS marketers at ecommerce brands.",
                "🎯",
                vec![scoped("Show the flow", "Lead with a concrete flow example.", "Marketers")],
            ),
            audience(
                "Developers",
                "Engineers integrating the Klaviyo APIs.",
                "🧑‍💻",
                vec![scoped("Code first", "Show a request before explaining it.", "Developers")],
            ),
        ],
        regions: vec![
            region(
                "North America",
                "US and Canada.",
                "🇺🇸",
                vec![scoped("US spelling", "Use US English spelling.", "North America")],
            ),
            region(
                "EMEA",
                "Europe, Middle East and Africa.",
                "🇪🇺",
                vec![scoped("UK spelling", "Use UK English spelling.", "EMEA")],
            ),
            region("APAC", "Asia Pacific.", "🌏", Vec::new()),
        ],
        ..Document::empty()
    }
}

fn xero() -> Document {
    Document {
        brand_foundations: BrandFoundations {
            brand_name: "Xero".to_string(),
            brand_domain: "xero.com".to_string(),
            brand_icon: "💙".to_string(),
            brand_colors: vec!["#13B5EA".to_string(), "#FFFFFF".to_string()],
            about_your_brand: "Xero is online accounting software for small businesses and their \
                               advisors."
                .to_string(),
            brand_story_and_purpose: "Making life better for people in small business, their \
                                      advisors and communities."
                .to_string(),
            brand_tone_and_voice: "Human, friendly and clear. Beautiful business, made simple."
                .to_string(),
            writing_rules: vec![
                global("Plain numbers", "Write amounts with currency symbols and no decimals unless needed."),
                global("Contractions", "Use contractions to sound human."),
            ],
            ..BrandFoundations::default()
        },
        product_lines: vec![ProductLine {
            product_line_details: "Cloud accounting: invoicing, bank reconciliation, reporting."
                .to_string(),
            key_differentiators_and_positioning: "Large app ecosystem and advisor network."
                .to_string(),
            ideal_customers: "Small businesses and their accountants.".to_string(),
            competitors: vec![
                competitor("QuickBooks", "quickbooks.intuit.com", &["North America", "UK", "ANZ"]),
                competitor("Sage", "sage.com", &["UK"]),
            ],
            icon: Some("📒".to_string()),
            ..ProductLine::named("Accounting")
        }],
        content_types: vec![content_type(
            "Help article",
            "# Task\n\n## Before you start\n\n## Steps\n",
            "❓",
            &[("Reconcile a bank account", "Go to Accounting, then Bank accounts.")],
            vec![scoped("Numbered steps", "Write procedures as numbered steps.", "Help article")],
        )],
        audiences: vec![
            audience(
                "Small business owners",
                "Owners who do their own books.",
                "🏪",
                vec![scoped(
                    "No accounting terms",
                    "Explain accounting terms the first time they appear.",
                    "Small business owners",
                )],
            ),
            audience(
                "Advisors",
                "Accountants and bookkeepers.",
                "🧮",
                Vec::new(),
            ),
        ],
        regions: vec![
            region("ANZ", "Australia and New Zealand.", "🇦🇺", vec![scoped(
                "GST",
                "Refer to GST, not sales tax.",
                "ANZ",
            )]),
            region("UK", "United Kingdom.", "🇬🇧", vec![scoped(
                "VAT",
                "Refer to VAT, not sales tax.",
                "UK",
            )]),
            region("North America", "US and Canada.", "🇺🇸", Vec::new()),
        ],
        ..Document::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tags::RuleScope;

    #[test]
    fn test_version_parse_and_display() {
        for v in DatasetVersion::ALL {
            assert_eq!(v.to_string().parse::<DatasetVersion>(), Ok(v));
        }
        assert!("Acme".parse::<DatasetVersion>().is_err());
    }

    #[test]
    fn test_default_seed_is_empty() {
        assert_eq!(seed_document(DatasetVersion::Default), Document::empty());
    }

    #[test]
    fn test_seeds_are_consistent() {
        for v in [DatasetVersion::Klaviyo, DatasetVersion::Xero] {
            let doc = seed_document(v);
            assert!(!doc.brand_foundations.brand_name.is_empty());
            for rule in &doc.brand_foundations.writing_rules {
                assert_eq!(rule.tags, vec![GLOBAL_TAG]);
            }
            for a in &doc.audiences {
                assert!(a.writing_rules.iter().all(|r| r.has_tag(&a.name)));
            }
            for c in &doc.content_types {
                assert!(c.content_type_rules.iter().all(|r| RuleScope::of(r) == RuleScope::Specific));
                assert!(c.samples.iter().all(|s| s.tags == vec![c.name.clone()]));
            }
            let regions = doc.region_names();
            for pl in &doc.product_lines {
                for comp in &pl.competitors {
                    assert!(comp.regions.iter().all(|r| regions.contains(r)));
                }
            }
        }
    }
}
