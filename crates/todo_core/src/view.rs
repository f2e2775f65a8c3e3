//! Plain-text rendering of the page. Pure: reads state, never mutates it.

use crate::api::TodoApi;
use crate::config::Palette;
use crate::page::TodoPage;
use crate::session::SessionProvider;
use std::fmt::Write;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

pub const HEADING: &str = "TO DO";

pub fn render<A: TodoApi, S: SessionProvider>(page: &TodoPage<A, S>, palette: &Palette) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", palette.accentize(HEADING));

    if page.is_signed_out() {
        let _ = writeln!(out, "{}", palette.mutedize("Signed out."));
        return out;
    }

    let _ = writeln!(
        out,
        "{}",
        palette.mutedize(&format!(
            "Signed in as {} (type `sign-out` to sign out)",
            page.user().user_id
        ))
    );
    out.push('\n');

    let form = page.form();
    let _ = writeln!(out, "Task name:   {}", form.name());
    if let Some(message) = form.errors().name.as_deref() {
        let _ = writeln!(out, "             {}", palette.errorize(message));
    }
    let _ = writeln!(out, "Description: {}", form.description());

    if let Some(err) = page.store().last_error() {
        out.push('\n');
        let _ = writeln!(out, "{}", palette.errorize(&format!("! {err}")));
    }

    out.push('\n');
    out.push_str(&render_tasks(page, palette));
    out
}

fn render_tasks<A: TodoApi, S: SessionProvider>(page: &TodoPage<A, S>, palette: &Palette) -> String {
    let tasks = page.store().tasks();
    if tasks.is_empty() {
        return format!("{}\n", palette.mutedize("No tasks."));
    }

    let mut out = String::new();
    for (index, task) in tasks.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>2}. {}  {}",
            index + 1,
            task.name,
            palette.mutedize(&format!("[complete] ({})", task.id))
        );
        if let Some(description) = task.description.as_deref().filter(|d| !d.is_empty()) {
            for line in description.lines() {
                let _ = writeln!(out, "    {line}");
            }
        }
        if let Some(created) = task.created_at.as_deref().and_then(format_timestamp) {
            let _ = writeln!(out, "    {}", palette.mutedize(&format!("created {created}")));
        }
    }
    out
}

/// Formats an RFC 3339 timestamp in local time; `None` if it does not parse.
pub fn format_timestamp(raw: &str) -> Option<String> {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    format_timestamp_at(raw, offset)
}

fn format_timestamp_at(raw: &str, offset: UtcOffset) -> Option<String> {
    let parsed = OffsetDateTime::parse(raw, &Rfc3339).ok()?;
    parsed
        .to_offset(offset)
        .format(format_description!("[year]-[month]-[day] [hour]:[minute]"))
        .ok()
}
