//! Output formatting for CLI display.

use std::fmt::Write;

use crate::geo::format_distance;
use crate::model::{DayOfWeek, Listing, Truck};
use crate::store::Status;

/// The first eight characters of an id, or the whole id if shorter.
pub(super) fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

/// One line per truck:
/// `<short-id>  <name>  [<tags>]  <distance>  <open|closed>  ★<avg> (<count>)`.
///
/// Distance shows `-` when the list was not ranked.
pub(super) fn format_listing(listing: &Listing, open: bool) -> String {
    let truck = &listing.truck;
    let distance = listing
        .distance_meters
        .map_or_else(|| "-".to_string(), format_distance);
    format!(
        "{}  {}  [{}]  {}  {}  ★{:.1} ({})",
        short_id(&truck.id),
        truck.name,
        truck.cuisine_tags.join(", "),
        distance,
        if open { "open" } else { "closed" },
        truck.rating.average,
        truck.rating.count,
    )
}

/// Everything about one truck, for `show`.
pub(super) fn format_detail(truck: &Truck, open: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}  ({})", truck.name, truck.id);
    let _ = writeln!(out, "{}", truck.description);
    let _ = writeln!(out);
    let _ = writeln!(out, "Cuisine:   {}", truck.cuisine_tags.join(", "));
    match &truck.neighborhood {
        Some(n) => {
            let _ = writeln!(out, "Address:   {} ({n})", truck.address);
        }
        None => {
            let _ = writeln!(out, "Address:   {}", truck.address);
        }
    }
    let _ = writeln!(out, "Location:  {}", truck.coordinate);
    let _ = writeln!(
        out,
        "Rating:    ★{:.1} ({} reviews)",
        truck.rating.average, truck.rating.count
    );
    let status = match (truck.active, open) {
        (false, _) => "inactive",
        (true, true) => "open now",
        (true, false) => "closed now",
    };
    let _ = writeln!(out, "Status:    {status}");

    let contact = &truck.contact;
    let social = [
        ("instagram", &contact.social.instagram),
        ("twitter", &contact.social.twitter),
        ("facebook", &contact.social.facebook),
    ];
    for (label, value) in [
        ("Phone", &contact.phone),
        ("Email", &contact.email),
        ("Website", &contact.website),
    ] {
        if let Some(value) = value {
            let _ = writeln!(out, "{:<10} {value}", format!("{label}:"));
        }
    }
    for (label, value) in social {
        if let Some(value) = value {
            let _ = writeln!(out, "{:<10} {value}", format!("{label}:"));
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Hours:");
    for day in DayOfWeek::ALL {
        let hours = match truck.weekly_hours.get(day) {
            Some(h) if !h.closed => format!("{}–{}", h.open, h.close),
            _ => "closed".to_string(),
        };
        let _ = writeln!(out, "  {:<10} {hours}", day.as_str());
    }

    if let Some(menu) = &truck.menu {
        let _ = writeln!(out);
        let _ = writeln!(out, "Menu:");
        for item in &menu.items {
            let _ = write!(out, "  {:<24} ${:>6.2}  {}", item.name, item.price, item.category);
            if let Some(level) = item.spicy_level {
                let _ = write!(out, "  {}", "🌶".repeat(usize::from(level)));
            }
            let _ = writeln!(out);
        }
    }

    out.trim_end().to_string()
}

/// A status slot as a single line, or `None` when idle and error-free.
pub(super) fn format_status(label: &str, status: &Status) -> Option<String> {
    match (status.loading, &status.error) {
        (_, Some(error)) => Some(format!("{label}: {error}")),
        (true, None) => Some(format!("{label}: loading…")),
        (false, None) => None,
    }
}
