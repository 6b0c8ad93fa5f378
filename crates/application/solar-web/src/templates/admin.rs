//! Admin console fragments.

use solar_core::text::format_timestamp;
use solar_core::{Banner, Installer, InstallerForm, PriceTier, QuoteRequest, Session};
use solar_directory::ConsoleTab;

use super::{banner, html_escape};

pub const INVALID_LOGIN: &str = "Invalid email or password";
pub const LOGIN_UNAVAILABLE: &str = "Sign-in is unavailable right now. Please try again.";

pub fn login_gate(email: &str, error: Option<&str>) -> String {
    let error = error
        .map(|text| format!(r#"<div class="flash-warn" role="alert">{}</div>"#, html_escape(text)))
        .unwrap_or_default();
    format!(
        r#"<section id="admin-root" class="panel login-gate">
    <h2>Admin Login</h2>
    {error}
    <form method="post" action="/admin/login">
        <label>Email
            <input type="email" name="email" required autocomplete="username" value="{email}">
        </label>
        <label>Password
            <input type="password" name="password" required autocomplete="current-password">
        </label>
        <button class="primary" type="submit">Sign In</button>
    </form>
</section>"#,
        email = html_escape(email),
    )
}

/// Reloads into the login gate as soon as the server reports this session gone.
const SESSION_WATCH_JS: &str = r#"
(function () {
    var events = new EventSource('/admin/session-events');
    events.addEventListener('session-lost', function () {
        events.close();
        window.location.replace('/?admin');
    });
})();
"#;

/// Signed-in console around an already-rendered panel.
pub fn console(session: &Session, panel: &str) -> String {
    format!(
        r#"<section id="admin-root">
    <div class="row signed-in">
        <span>Signed in as <strong>{email}</strong></span>
        <form method="post" action="/admin/logout"><button type="submit">Sign out</button></form>
    </div>
    <div id="console-panel" class="panel">
{panel}
    </div>
    <script>{watch}</script>
</section>"#,
        email = html_escape(&session.email),
        watch = SESSION_WATCH_JS,
    )
}

/// Open add/edit form inside the installers tab.
pub struct FormState<'a> {
    pub form: &'a InstallerForm,
    pub editing: Option<&'a str>,
}

pub struct PanelView<'a> {
    pub tab: ConsoleTab,
    pub installers: &'a [Installer],
    pub quotes: &'a [QuoteRequest],
    pub form: Option<FormState<'a>>,
    pub banner: Option<&'a Banner>,
}

fn tab_link(tab: ConsoleTab, active: ConsoleTab, label: &str) -> String {
    let class = if tab == active { "active" } else { "" };
    format!(
        r##"<a class="{class}" href="/?admin&amp;tab={name}" hx-get="/admin/panel?tab={name}" hx-target="#console-panel" hx-push-url="/?admin&amp;tab={name}">{label}</a>"##,
        name = tab.as_str(),
    )
}

pub fn console_panel(view: &PanelView<'_>) -> String {
    let quote_badge = if view.quotes.is_empty() {
        String::new()
    } else {
        format!(r#" <span class="badge">{}</span>"#, view.quotes.len())
    };
    let tabs = format!(
        r#"<nav class="tabs">{}{}</nav>"#,
        tab_link(ConsoleTab::Installers, view.tab, "Installers"),
        tab_link(
            ConsoleTab::Quotes,
            view.tab,
            &format!("Quote Requests{quote_badge}")
        ),
    );
    let notice = view.banner.map(banner).unwrap_or_default();
    let body = match view.tab {
        ConsoleTab::Installers => installers_tab(view.installers, view.form.as_ref()),
        ConsoleTab::Quotes => quotes_tab(view.quotes),
    };
    format!("{notice}\n{tabs}\n{body}")
}

fn installers_tab(installers: &[Installer], form: Option<&FormState<'_>>) -> String {
    let form = form.map(installer_form).unwrap_or_default();
    let rows = if installers.is_empty() {
        r#"<p class="empty-state">No installers yet. Add your first one!</p>"#.to_string()
    } else {
        installers.iter().map(installer_row).collect()
    };
    format!(
        r##"<div class="row panel-head">
    <h2>Installers</h2>
    <button class="primary" hx-get="/admin/installers/new" hx-target="#console-panel">+ Add Installer</button>
</div>
{form}
<div class="installer-rows">{rows}</div>"##
    )
}

fn installer_row(installer: &Installer) -> String {
    let id = html_escape(&installer.id);
    format!(
        r##"<div class="row">
    <div><h3>{name}</h3><p>{phone}</p></div>
    <div>
        <button hx-get="/admin/installers/{id}/edit" hx-target="#console-panel">Edit</button>
        <button class="danger" hx-get="/admin/installers/{id}/delete" hx-target="#console-panel">Delete</button>
    </div>
</div>"##,
        name = html_escape(&installer.name),
        phone = html_escape(&installer.phone),
    )
}

fn price_options(selected: &str) -> String {
    PriceTier::ALL
        .iter()
        .map(|tier| {
            let mark = if tier.symbol() == selected.trim() {
                " selected"
            } else {
                ""
            };
            format!(
                r#"<option value="{value}"{mark}>{label}</option>"#,
                value = html_escape(tier.symbol()),
                label = html_escape(tier.label()),
            )
        })
        .collect()
}

pub fn installer_form(state: &FormState<'_>) -> String {
    let form = state.form;
    let (title, action, submit) = match state.editing {
        Some(id) => (
            "Edit Installer",
            format!("/admin/installers/{}", html_escape(id)),
            "Update Installer",
        ),
        None => (
            "Add New Installer",
            "/admin/installers".to_string(),
            "Add Installer",
        ),
    };
    format!(
        r##"<form class="installer-form" hx-post="{action}" hx-target="#console-panel" hx-disabled-elt="find button[type=submit]">
    <h3 class="wide">{title}</h3>
    <label>Name *<input type="text" name="name" required value="{name}"></label>
    <label>Phone *<input type="tel" name="phone" required value="{phone}"></label>
    <label class="wide">Website<input type="url" name="website" value="{website}"></label>
    <label class="wide">Description *<textarea name="description" required rows="3">{description}</textarea></label>
    <label>Rating (1-5) *<input type="number" name="rating" required min="1" max="5" step="0.1" value="{rating}"></label>
    <label>Years in Business *<input type="number" name="years_in_business" required min="0" value="{years}"></label>
    <label>Price Range *<select name="price_range" required>{prices}</select></label>
    <label>Image URL<input type="url" name="image_url" value="{image_url}"></label>
    <label class="wide">Services (comma-separated) *<input type="text" name="services" required placeholder="Residential Solar, Commercial Solar, Battery Storage" value="{services}"></label>
    <label class="wide">Certifications (comma-separated) *<input type="text" name="certifications" required placeholder="NABCEP Certified, Licensed Electrician, Tesla Powerwall Certified" value="{certifications}"></label>
    <div class="wide">
        <button class="primary" type="submit">{submit}</button>
        <button type="button" hx-get="/admin/panel?tab=installers" hx-target="#console-panel">Cancel</button>
    </div>
</form>"##,
        name = html_escape(&form.name),
        phone = html_escape(&form.phone),
        website = html_escape(&form.website),
        description = html_escape(&form.description),
        rating = html_escape(&form.rating),
        years = html_escape(&form.years_in_business),
        prices = price_options(&form.price_range),
        image_url = html_escape(&form.image_url),
        services = html_escape(&form.services),
        certifications = html_escape(&form.certifications),
    )
}

fn quotes_tab(quotes: &[QuoteRequest]) -> String {
    let body = if quotes.is_empty() {
        r#"<div class="empty-state">
    <p>No quote requests yet</p>
    <p>Quote requests will appear here when customers submit them</p>
</div>"#
            .to_string()
    } else {
        quotes.iter().map(quote_card).collect()
    };
    format!(
        r#"<div class="panel-head">
    <h2>Quote Requests</h2>
    <p>View and manage customer quote requests</p>
</div>
{body}"#
    )
}

fn quote_card(quote: &QuoteRequest) -> String {
    let email = quote
        .email
        .as_deref()
        .map(|email| {
            let email = html_escape(email);
            format!(r#"<div><small>Email</small><p><a href="mailto:{email}">{email}</a></p></div>"#)
        })
        .unwrap_or_default();
    let sent = if quote.email_sent {
        r#"<span class="badge sent">Email Sent</span>"#
    } else {
        ""
    };
    format!(
        r##"<article class="row quote">
    <div>
        <h3>{name} {sent}</h3>
        <p><time datetime="{iso}">{date}</time></p>
        <div><small>Phone</small><p><a href="tel:{phone}">{phone}</a></p></div>
        {email}
        <div><small>Address</small><p>{address}</p></div>
    </div>
    <button class="danger" hx-get="/admin/quotes/{id}/delete" hx-target="#console-panel">Delete</button>
</article>"##,
        name = html_escape(&quote.name),
        iso = quote.created_at.to_rfc3339(),
        date = format_timestamp(&quote.created_at),
        phone = html_escape(&quote.phone),
        address = html_escape(&quote.address),
        id = html_escape(&quote.id),
    )
}

/// Confirmation step before a delete; only `confirm=yes` executes it.
pub fn confirm_delete(prompt: &str, subject: &str, post_url: &str, tab: ConsoleTab) -> String {
    format!(
        r##"<div class="confirm">
    <p>{prompt}</p>
    <p><strong>{subject}</strong></p>
    <form hx-post="{url}" hx-target="#console-panel">
        <input type="hidden" name="confirm" value="yes">
        <button class="danger" type="submit">Delete</button>
        <button type="button" hx-get="/admin/panel?tab={tab}" hx-target="#console-panel">Cancel</button>
    </form>
</div>"##,
        prompt = html_escape(prompt),
        subject = html_escape(subject),
        url = html_escape(post_url),
        tab = tab.as_str(),
    )
}
