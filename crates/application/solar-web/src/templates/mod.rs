//! HTML templates
//!
//! Plain `format!` builders. Every interpolated value goes through
//! [`html_escape`]; fragments are returned bare for HTMX swaps and wrapped in
//! [`page`] for direct loads.

pub mod admin;
pub mod lead;
pub mod listing;

pub use solar_core::text::html_escape;
use solar_core::{Banner, STATUS_BANNER_WINDOW};

pub const TITLE: &str = "Ann Arbor Solar Installers";
pub const SOURCE_DOWNLOAD_URL: &str =
    "https://annarborsolarinstallers.com/annarborsolarinstaller.zip";

const HTMX_SRC: &str = "https://unpkg.com/htmx.org@2.0.4";

/// Which top-level mode the document renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMode {
    Listing,
    Admin,
}

impl PageMode {
    fn subtitle(self) -> &'static str {
        match self {
            PageMode::Listing => "Find trusted solar panel installation experts in your area",
            PageMode::Admin => "Manage your installer directory",
        }
    }
}

pub const STYLE_CSS: &str = r#"
:root {
    --blue: #2563eb;
    --cyan: #0891b2;
    --ink: #111827;
    --muted: #6b7280;
    --line: #e5e7eb;
    --ok: #15803d;
    --warn: #b91c1c;
}
* { box-sizing: border-box; margin: 0; padding: 0; }
body { font-family: system-ui, sans-serif; color: var(--ink); background: #f0f9ff; line-height: 1.5; }
a { color: inherit; }
.site-header { background: linear-gradient(90deg, var(--blue), var(--cyan)); color: #fff; padding: 3rem 1.5rem; }
.site-header h1 { font-size: 2.25rem; }
.site-header .subtitle { color: #dbeafe; font-size: 1.1rem; margin-top: .5rem; }
.search { margin-top: 2rem; max-width: 42rem; }
.search input { width: 100%; padding: .75rem 1rem; border-radius: .5rem; border: 0; font-size: 1rem; }
main { max-width: 80rem; margin: 0 auto; padding: 3rem 1.5rem; }
.spinner { width: 3rem; height: 3rem; margin: 5rem auto; border-radius: 50%; border: 3px solid var(--line); border-bottom-color: var(--blue); animation: spin 1s linear infinite; }
@keyframes spin { to { transform: rotate(360deg); } }
.empty-state { text-align: center; padding: 5rem 0; }
.empty-state p { color: var(--muted); }
.result-count { margin-bottom: 1.5rem; }
.card-grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(20rem, 1fr)); gap: 2rem; margin-bottom: 3rem; }
.card { position: relative; background: #fff; border-radius: .75rem; border: 1px solid var(--line); padding: 1.5rem; overflow: hidden; }
.card .rank-bar { position: absolute; top: 0; left: 0; right: 0; height: 4px; }
.card .rank-badge { position: absolute; top: 1rem; right: 1rem; width: 2.5rem; height: 2.5rem; border-radius: 50%; color: #fff; font-weight: 700; display: flex; align-items: center; justify-content: center; }
.rank-gold .rank-bar, .rank-gold .rank-badge { background: linear-gradient(90deg, #facc15, #f59e0b); }
.rank-silver .rank-bar, .rank-silver .rank-badge { background: linear-gradient(90deg, #d1d5db, #9ca3af); }
.rank-bronze .rank-bar, .rank-bronze .rank-badge { background: linear-gradient(90deg, #fb923c, #ea580c); }
.rank-standard .rank-bar, .rank-standard .rank-badge { background: linear-gradient(90deg, #60a5fa, #3b82f6); }
.stars { color: #f59e0b; letter-spacing: 1px; }
.meta { display: flex; gap: .5rem; align-items: center; font-size: .875rem; margin: .5rem 0 1rem; }
.price { color: var(--blue); font-weight: 500; }
.chips { display: flex; flex-wrap: wrap; gap: .5rem; margin: .5rem 0 1rem; }
.chip { padding: .25rem .75rem; border-radius: 999px; font-size: .75rem; background: #eff6ff; color: #1d4ed8; }
.chip.cert { background: #f0fdf4; color: var(--ok); }
.lead { background: linear-gradient(135deg, var(--blue), var(--cyan)); color: #fff; border-radius: 1rem; padding: 2rem; margin-bottom: 3rem; }
.lead form { display: grid; gap: 1rem; }
.lead input { width: 100%; padding: .75rem 1rem; border-radius: .5rem; border: 2px solid #93c5fd; }
.lead button { background: #fff; color: #1d4ed8; font-weight: 700; padding: 1rem; border: 0; border-radius: .5rem; font-size: 1.1rem; cursor: pointer; }
.lead .fine-print { color: #dbeafe; font-size: .75rem; text-align: center; margin-top: 1rem; }
.lead-thanks { background: linear-gradient(90deg, #22c55e, #059669); }
.flash-ok, .flash-warn { padding: .75rem 1rem; border-radius: .5rem; margin-bottom: 1rem; }
.flash-ok { background: #f0fdf4; color: var(--ok); border: 1px solid #bbf7d0; }
.flash-warn { background: #fef2f2; color: var(--warn); border: 1px solid #fecaca; }
.panel { background: #fff; border-radius: .75rem; border: 1px solid var(--line); padding: 1.5rem; }
.tabs { display: flex; gap: 1rem; border-bottom: 1px solid var(--line); margin-bottom: 1.5rem; }
.tabs a { padding: .5rem 1rem; text-decoration: none; color: var(--muted); }
.tabs a.active { color: var(--blue); border-bottom: 2px solid var(--blue); }
.badge { background: var(--blue); color: #fff; border-radius: 999px; padding: 0 .5rem; font-size: .75rem; margin-left: .25rem; }
.badge.sent { background: #dcfce7; color: var(--ok); }
.row { display: flex; justify-content: space-between; align-items: center; padding: 1rem; border: 1px solid var(--line); border-radius: .5rem; margin-bottom: .75rem; }
.installer-form { display: grid; grid-template-columns: 1fr 1fr; gap: 1rem; padding: 1.5rem; background: #f9fafb; border: 2px solid #bfdbfe; border-radius: .5rem; margin-bottom: 2rem; }
.installer-form .wide { grid-column: 1 / -1; }
.installer-form input, .installer-form select, .installer-form textarea { width: 100%; padding: .5rem; border: 1px solid #d1d5db; border-radius: .375rem; }
button, .button { cursor: pointer; padding: .5rem 1rem; border-radius: .375rem; border: 1px solid var(--line); background: #fff; }
.button.primary, button.primary { background: var(--blue); color: #fff; border-color: var(--blue); }
.button.danger, button.danger { background: var(--warn); color: #fff; border-color: var(--warn); }
.site-footer { background: var(--ink); color: #fff; text-align: center; padding: 2rem 1.5rem; margin-top: 5rem; }
.site-footer p { color: #9ca3af; margin-top: 1rem; }
"#;

/// Removes any `[data-dismiss-after]` element once its window elapses.
const DISMISS_JS: &str = r#"
function solarDismiss(root) {
    var found = Array.from(root.querySelectorAll('[data-dismiss-after]'));
    if (root.matches && root.matches('[data-dismiss-after]')) { found.push(root); }
    found.forEach(function (el) {
        setTimeout(function () { el.remove(); }, parseInt(el.dataset.dismissAfter, 10));
    });
}
document.addEventListener('htmx:load', function (evt) { solarDismiss(evt.detail.elt); });
"#;

fn search_box() -> &'static str {
    r##"<div class="search">
    <input type="search" name="q" placeholder="Search by name, service, or keyword..."
           aria-label="Search solar installers" autocomplete="off"
           hx-get="/partials/listing" hx-trigger="input" hx-target="#listing-results" hx-swap="innerHTML">
</div>"##
}

/// Full document around `content`.
pub fn page(mode: PageMode, content: &str) -> String {
    let search = match mode {
        PageMode::Listing => search_box(),
        PageMode::Admin => "",
    };
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{css}</style>
    <script src="{htmx}"></script>
    <script>{dismiss}</script>
</head>
<body>
<header class="site-header">
    <h1>&#9728; {title}</h1>
    <p class="subtitle">{subtitle}</p>
    {search}
</header>
<main id="main">
{content}
</main>
<footer class="site-footer" role="contentinfo">
    <a class="button primary" href="{download}" download>Download Source Code</a>
    <p>&copy; 2026 Ann Arbor Solar Directory. Connecting homeowners with trusted solar professionals.</p>
</footer>
</body>
</html>"#,
        title = TITLE,
        css = STYLE_CSS,
        htmx = HTMX_SRC,
        dismiss = DISMISS_JS,
        subtitle = mode.subtitle(),
        search = search,
        content = content,
        download = SOURCE_DOWNLOAD_URL,
    )
}

/// Transient status banner, removed client-side after its window.
pub fn banner(banner: &Banner) -> String {
    format!(
        r#"<div class="{class}" role="status" data-dismiss-after="{ms}">{text}</div>"#,
        class = banner.kind.css_class(),
        ms = STATUS_BANNER_WINDOW.as_millis(),
        text = html_escape(&banner.text),
    )
}

pub fn spinner(label: &str) -> String {
    format!(
        r#"<div class="spinner" role="status" aria-label="{}"></div>"#,
        html_escape(label)
    )
}
