//! Route definitions for the web front end

/// All routes defined in the application
pub const ROUTES: &[(&str, &str, &str)] = &[
    // Pages
    ("GET", "/", "Listing view, or the admin console with ?admin"),

    // HTMX partials
    ("GET", "/partials/listing", "Ranked results for ?q= (activate=1 re-fetches)"),
    ("GET", "/partials/quote-form", "Blank quote form"),
    ("POST", "/quote", "Submit a quote request"),

    // Admin
    ("POST", "/admin/login", "Sign in"),
    ("POST", "/admin/logout", "Sign out"),
    ("GET", "/admin/panel", "Console panel for ?tab="),
    ("GET", "/admin/installers/new", "Blank installer form"),
    ("POST", "/admin/installers", "Add installer"),
    ("GET", "/admin/installers/{id}/edit", "Pre-filled installer form"),
    ("POST", "/admin/installers/{id}", "Update installer"),
    ("GET", "/admin/installers/{id}/delete", "Confirm installer deletion"),
    ("POST", "/admin/installers/{id}/delete", "Delete installer (confirm=yes)"),
    ("GET", "/admin/quotes/{id}/delete", "Confirm quote request deletion"),
    ("POST", "/admin/quotes/{id}/delete", "Delete quote request (confirm=yes)"),
    ("GET", "/admin/session-events", "Session-change stream (SSE)"),

    // API
    ("GET", "/api/health", "Health check"),
    ("POST", "/functions/send-quote-email", "Email dispatch endpoint"),
    ("OPTIONS", "/functions/send-quote-email", "CORS preflight"),
];

/// Print all routes
pub fn print_routes() {
    println!("\nSolar Directory Routes:");
    println!("{:-<60}", "");
    for (method, path, desc) in ROUTES {
        println!("{:7} {:34} {}", method, path, desc);
    }
    println!();
}
