use solar_core::{Banner, LeadDraft, LEAD_CONFIRMATION_WINDOW};

use super::{banner, html_escape};

/// The quote form, optionally re-filled with a rejected draft.
pub fn quote_form(draft: &LeadDraft, notice: Option<&Banner>) -> String {
    let notice = notice.map(banner).unwrap_or_default();
    format!(
        r##"<div id="lead-capture" class="lead">
    <h2>Get Your Free Solar Quote Today</h2>
    <p>Connect with Michigan's top solar installers in minutes</p>
    {notice}
    <form method="post" action="/quote" hx-post="/quote" hx-target="#lead-capture" hx-swap="outerHTML" hx-disabled-elt="find button">
        <label>Full Name *
            <input type="text" name="name" required placeholder="John Smith" value="{name}">
        </label>
        <label>Address *
            <input type="text" name="address" required placeholder="123 Main St, Detroit, MI 48201" value="{address}">
        </label>
        <label>Email Address
            <input type="email" name="email" placeholder="john@example.com" value="{email}">
        </label>
        <label>Phone Number *
            <input type="tel" name="phone" required placeholder="(555) 123-4567" value="{phone}">
        </label>
        <button type="submit">Request Free Quote</button>
    </form>
    <p class="fine-print">No obligation. Get multiple quotes from certified installers.</p>
</div>"##,
        name = html_escape(&draft.name),
        address = html_escape(&draft.address),
        email = html_escape(&draft.email),
        phone = html_escape(&draft.phone),
    )
}

/// Confirmation that swaps itself back to a blank form after the display window.
pub fn quote_thanks() -> String {
    format!(
        r#"<div id="lead-capture" class="lead lead-thanks" hx-get="/partials/quote-form" hx-trigger="load delay:{secs}s" hx-swap="outerHTML">
    <h3>Thank You!</h3>
    <p>We'll contact you soon with your free quote.</p>
</div>"#,
        secs = LEAD_CONFIRMATION_WINDOW.as_secs()
    )
}
