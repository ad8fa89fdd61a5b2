//! # Rendering
//!
//! Turns controller state into HTML. Pure string building; every piece of
//! catalog text is escaped. The page script swaps the fragments in place
//! (see `RenderedView`), so fragment markup and element ids must stay in
//! step with `assets/app.js` in the server crate.

use super::categories::{Category, CategoryFilter};
use super::controller::{LoadPhase, ViewController};
use super::notifications::Notification;
use crate::catalog::{parse_sync_time, Material};
use crate::error::LOAD_FAILURE_MESSAGE;
use serde::Serialize;
use std::fmt::Write;

/// Image shown when a material image fails to load.
pub const PLACEHOLDER_IMAGE: &str = "/assets/placeholder.svg";

/// Tags shown per card.
const CARD_TAG_LIMIT: usize = 3;

const EMPTY_STATE_MESSAGE: &str = "No materials match your filters.";

/// Every independently swappable region of the page
#[derive(Debug, Clone, Serialize)]
pub struct RenderedView {
    pub filters: String,
    pub grid: String,
    pub count: String,
    pub sync: String,
    pub notifications: String,
}

impl RenderedView {
    pub fn from_controller(view: &ViewController) -> Self {
        Self {
            filters: render_filter_bar(view.categories(), view.active_filter()),
            grid: render_display(view),
            count: render_count(view.count()),
            sync: render_sync_time(view.last_sync()),
            notifications: render_notifications(view.notifications()),
        }
    }
}

/// Full HTML document.
pub fn render_page(view: &ViewController, title: &str) -> String {
    let rendered = RenderedView::from_controller(view);
    let title = escape_html(title);
    let query = escape_html(view.search_query());

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<link rel="stylesheet" href="/assets/style.css">
</head>
<body>
<header class="library-header">
<h1>{title}</h1>
<div id="sync-time">{sync}</div>
</header>
<section class="library-controls">
<input id="search-input" type="search" placeholder="Search materials..." value="{query}" autocomplete="off">
<div id="filter-bar">{filters}</div>
<div id="material-count">{count}</div>
</section>
<main id="material-grid">{grid}</main>
<div id="notifications">{notifications}</div>
<script src="/assets/app.js"></script>
</body>
</html>
"#,
        sync = rendered.sync,
        filters = rendered.filters,
        count = rendered.count,
        grid = rendered.grid,
        notifications = rendered.notifications,
    )
}

/// The display region: loading indicator, error placeholder, empty state,
/// or cards.
pub fn render_display(view: &ViewController) -> String {
    match view.phase() {
        LoadPhase::Loading => render_loading(),
        LoadPhase::Error => render_error(),
        LoadPhase::Idle | LoadPhase::Loaded => render_materials(view.filtered()),
    }
}

/// Cards for the given materials, or the empty-state placeholder.
pub fn render_materials(materials: &[Material]) -> String {
    if materials.is_empty() {
        return render_empty_state();
    }
    materials.iter().map(render_card).collect()
}

pub fn render_card(material: &Material) -> String {
    let tags: String = material
        .tags
        .iter()
        .take(CARD_TAG_LIMIT)
        .map(|tag| format!(r#"<span class="tag">{}</span>"#, escape_html(tag)))
        .collect();

    format!(
        r#"<article class="material-card" data-id="{id}">
<img src="{image}" alt="{title}" loading="lazy" onerror="this.onerror=null;this.src='{placeholder}'">
<div class="material-body">
<h3 class="material-title">{title}</h3>
<p class="material-description">{description}</p>
<div class="material-tags">{tags}</div>
<span class="material-board">{board}</span>
<button class="apply-button" data-id="{id}">Apply</button>
</div>
</article>
"#,
        id = escape_html(&material.id),
        image = escape_html(&material.image_url),
        title = escape_html(&material.title),
        placeholder = PLACEHOLDER_IMAGE,
        description = escape_html(&material.description),
        tags = tags,
        board = escape_html(&material.board),
    )
}

/// "All" control followed by one control per category; exactly one is
/// active.
pub fn render_filter_bar(categories: &[Category], active: &CategoryFilter) -> String {
    let mut html = filter_button("all", "All", *active == CategoryFilter::All);
    for category in categories {
        let is_active = matches!(active, CategoryFilter::Tag(tag) if tag == category.tag);
        html.push_str(&filter_button(category.tag, category.label, is_active));
    }
    html
}

fn filter_button(value: &str, label: &str, active: bool) -> String {
    let class = if active {
        "filter-button active"
    } else {
        "filter-button"
    };
    format!(
        r#"<button class="{class}" data-filter="{value}">{label}</button>"#,
        value = escape_html(value),
        label = escape_html(label),
    )
}

pub fn render_count(count: usize) -> String {
    let noun = if count == 1 { "material" } else { "materials" };
    format!(r#"<span class="count" data-count="{count}">{count} {noun}</span>"#)
}

/// Sync time line; empty when the catalog carries no `last_sync`.
pub fn render_sync_time(last_sync: Option<&str>) -> String {
    let Some(raw) = last_sync else {
        return String::new();
    };
    let shown = match parse_sync_time(raw) {
        Some(time) => time.format("%d %b %Y %H:%M").to_string(),
        None => raw.to_string(),
    };
    format!(
        r#"<span class="sync-time">Last synced {}</span>"#,
        escape_html(&shown)
    )
}

pub fn render_notifications(notifications: &[Notification]) -> String {
    notifications
        .iter()
        .map(|n| {
            format!(
                r#"<div class="notification {kind}" data-notification="{id}">{message}</div>"#,
                kind = n.kind.as_str(),
                id = n.id,
                message = escape_html(&n.message),
            )
        })
        .collect()
}

pub fn render_loading() -> String {
    r#"<div class="loading"><div class="spinner"></div><p>Loading materials...</p></div>"#
        .to_string()
}

pub fn render_error() -> String {
    format!(
        r#"<div class="error-state"><p>{}</p></div>"#,
        escape_html(LOAD_FAILURE_MESSAGE)
    )
}

pub fn render_empty_state() -> String {
    format!(r#"<div class="empty-state"><p>{EMPTY_STATE_MESSAGE}</p></div>"#)
}

/// Escape text for use in HTML content and double- or single-quoted
/// attributes.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Plain-text summary of the view, one line per material.
pub fn render_text(view: &ViewController) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} of {} materials (filter: {}, search: {:?})",
        view.count(),
        view.materials().len(),
        view.active_filter(),
        view.search_query()
    );
    for material in view.filtered() {
        let _ = writeln!(
            out,
            "{}\t{}\t[{}]\t{}",
            material.id,
            material.title,
            material.tags.join(", "),
            material.board
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::error::LoadError;
    use crate::view::notifications::NotificationKind;
    use std::time::Instant;

    fn material(id: &str, title: &str, tags: &[&str]) -> Material {
        Material {
            id: id.into(),
            title: title.into(),
            description: "desc".into(),
            image_url: "https://i.pinimg.com/736x/a.jpg".into(),
            source_url: String::new(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            board: "Interior".into(),
        }
    }

    fn loaded(materials: Vec<Material>, last_sync: Option<&str>) -> ViewController {
        let mut view = ViewController::default();
        let ticket = view.begin_load();
        view.finish_load(
            ticket,
            Ok(Catalog {
                materials,
                boards: Vec::new(),
                last_sync: last_sync.map(String::from),
            }),
        );
        view
    }

    #[test]
    fn test_card_shows_first_three_tags() {
        let html = render_card(&material("a", "Teak", &["kayu", "jati", "lantai", "extra"]));
        assert!(html.contains("jati"));
        assert!(html.contains("lantai"));
        assert!(!html.contains("extra"));
        assert!(html.contains(PLACEHOLDER_IMAGE));
        assert!(html.contains(r#"data-id="a""#));
    }

    #[test]
    fn test_empty_filter_renders_empty_state() {
        let mut view = loaded(vec![material("a", "Teak", &["kayu"])], None);
        view.set_search("batik");

        let rendered = RenderedView::from_controller(&view);
        assert!(rendered.grid.contains("empty-state"));
        assert!(!rendered.grid.contains("material-card"));
        assert!(rendered.count.contains(r#"data-count="0""#));
    }

    #[test]
    fn test_error_phase_renders_placeholder() {
        let mut view = loaded(vec![material("a", "Teak", &["kayu"])], None);
        let ticket = view.begin_load();
        assert!(render_display(&view).contains("loading"));

        view.finish_load(ticket, Err(LoadError::Status(502)));
        let grid = render_display(&view);
        assert!(grid.contains("error-state"));
        assert!(grid.contains(LOAD_FAILURE_MESSAGE));
    }

    #[test]
    fn test_filter_bar_has_single_active_control() {
        let mut view = loaded(
            vec![material("a", "", &["batik"]), material("b", "", &["kayu"])],
            None,
        );
        view.set_filter(CategoryFilter::Tag("batik".into()));

        let bar = render_filter_bar(view.categories(), view.active_filter());
        assert_eq!(bar.matches("filter-button active").count(), 1);
        assert!(bar.contains(r#"filter-button active" data-filter="batik""#));

        let kayu = bar.find(r#"data-filter="kayu""#).unwrap();
        let batik = bar.find(r#"data-filter="batik""#).unwrap();
        assert!(bar.find(r#"data-filter="all""#).unwrap() < kayu);
        assert!(kayu < batik);
    }

    #[test]
    fn test_sync_time_formatting() {
        assert_eq!(render_sync_time(None), "");
        assert!(render_sync_time(Some("2025-01-15T10:30:00.5")).contains("15 Jan 2025 10:30"));
        assert!(render_sync_time(Some("not a date")).contains("not a date"));
    }

    #[test]
    fn test_text_is_escaped() {
        let html = render_card(&material("a", "<script>alert('x')</script>", &[]));
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_notifications_rendered_in_order() {
        let now = Instant::now();
        let mut view = ViewController::default();
        view.notify("first", NotificationKind::Success, now);
        view.notify("second", NotificationKind::Error, now);

        let html = render_notifications(view.notifications());
        assert!(html.find("first").unwrap() < html.find("second").unwrap());
        assert!(html.contains("notification error"));
    }

    #[test]
    fn test_page_contains_regions() {
        let view = loaded(vec![material("a", "Teak", &["kayu"])], Some("2025-01-15T10:30:00"));
        let page = render_page(&view, "Material Library");
        for id in ["search-input", "filter-bar", "material-count", "material-grid", "notifications"] {
            assert!(page.contains(&format!(r#"id="{id}""#)), "missing {id}");
        }
        assert!(page.contains("Last synced"));
    }

    #[test]
    fn test_render_text_lists_filtered() {
        let mut view = loaded(
            vec![material("a", "Teak", &["kayu"]), material("b", "Marble", &["batu"])],
            None,
        );
        view.set_filter(CategoryFilter::Tag("batu".into()));
        let text = render_text(&view);
        assert!(text.starts_with("1 of 2 materials"));
        assert!(text.contains("b\tMarble"));
        assert!(!text.contains("Teak"));
    }
}
