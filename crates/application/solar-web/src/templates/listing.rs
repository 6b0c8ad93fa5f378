use solar_core::text::star_row;
use solar_core::{ListingLayout, RankedInstaller};

use super::{html_escape, spinner};

/// Shell rendered on every full page load; the results arrive from the
/// activation request.
pub fn listing_shell() -> String {
    format!(
        r#"<div id="listing-results" hx-get="/partials/listing?activate=1" hx-trigger="load" hx-swap="innerHTML">
{}
</div>"#,
        spinner("Loading installers")
    )
}

fn chips(title: &str, class: &str, labels: &[String]) -> String {
    if labels.is_empty() {
        return String::new();
    }
    let items: String = labels
        .iter()
        .map(|label| format!(r#"<span class="{class}">{}</span>"#, html_escape(label)))
        .collect();
    format!(r#"<h4>{title}</h4><div class="chips">{items}</div>"#)
}

pub fn installer_card(ranked: &RankedInstaller<'_>) -> String {
    let installer = ranked.installer;
    let website = installer
        .website
        .as_deref()
        .map(|url| {
            format!(
                r#"<div><a href="{}" target="_blank" rel="noopener noreferrer">Visit Website</a></div>"#,
                html_escape(url)
            )
        })
        .unwrap_or_default();

    format!(
        r#"<article class="card {medal}">
    <div class="rank-bar"></div>
    <div class="rank-badge">#{rank}</div>
    <h3>{name}</h3>
    <div class="meta">
        <span class="stars" aria-label="{rating:.1} out of 5">{stars}</span>
        <span class="rating">{rating:.1}</span>
        <span>&bull; {years} years</span>
        <span class="price">{price}</span>
    </div>
    <p class="description">{description}</p>
    <div class="contact">
        <div><a href="tel:{phone}">{phone}</a></div>
        {website}
    </div>
    {services}
    {certifications}
</article>"#,
        medal = ranked.medal().css_class(),
        rank = ranked.rank,
        name = html_escape(&installer.name),
        rating = installer.rating,
        stars = star_row(installer.rating),
        years = installer.years_in_business,
        price = html_escape(installer.price_range.symbol()),
        description = html_escape(&installer.description),
        phone = html_escape(&installer.phone),
        website = website,
        services = chips("Services", "chip", &installer.services),
        certifications = chips("Certifications", "chip cert", &installer.certifications),
    )
}

fn empty_state(heading: &str, hint: &str) -> String {
    format!(
        r#"<div class="empty-state">
    <h3>{heading}</h3>
    <p>{hint}</p>
</div>"#
    )
}

fn grid(cards: &[RankedInstaller<'_>]) -> String {
    let cards: String = cards.iter().map(installer_card).collect();
    format!(r#"<div class="card-grid">{cards}</div>"#)
}

/// Results region: top three, the lead form slot, then the rest.
///
/// The slot carries `hx-preserve`, so a visitor's half-typed draft survives
/// re-rendering on each keystroke; `lead_form` is only used when the slot is
/// not on the page yet.
pub fn listing_results(layout: &ListingLayout<'_>, loading: bool, lead_form: &str) -> String {
    if loading {
        return spinner("Loading installers");
    }
    match layout {
        ListingLayout::NoInstallers => empty_state(
            "No installers available",
            "Check back later for solar installer listings",
        ),
        ListingLayout::NoMatches => {
            empty_state("No installers found", "Try adjusting your search terms")
        }
        ListingLayout::Ranked {
            featured,
            remaining,
        } => {
            let count = layout.match_count();
            let noun = if count == 1 { "installer" } else { "installers" };
            let rest = if remaining.is_empty() {
                String::new()
            } else {
                grid(remaining)
            };
            format!(
                r#"<p class="result-count">Showing <strong>{count}</strong> {noun}</p>
{featured}
<div id="lead-slot" hx-preserve="true">{lead_form}</div>
{rest}"#,
                featured = grid(featured),
            )
        }
    }
}
