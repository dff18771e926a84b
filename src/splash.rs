//! Startup banner
//!
//! Lines printed once at startup: program version, a dated announcement
//! and where to report issues.

use chrono::NaiveDate;

use crate::{APP_NAME, VERSION};

/// Announcement shown at startup until it expires
pub const ANNOUNCEMENT: &str = "Secrets can now be read from files, see the *_SECRETFILE variables";

/// Last day the announcement is shown, as `(year, month, day)`
pub const ANNOUNCEMENT_EXPIRATION: (i32, u32, u32) = (2026, 12, 31);

/// Repository from the package metadata, empty when unset
pub const REPOSITORY: &str = env!("CARGO_PKG_REPOSITORY");

/// Date after which the announcement is no longer shown
pub fn announcement_expiration() -> Option<NaiveDate> {
    let (year, month, day) = ANNOUNCEMENT_EXPIRATION;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Link for users to create issues, if the package has a repository
pub fn issue_link() -> Option<String> {
    issue_link_for(REPOSITORY)
}

fn issue_link_for(repository: &str) -> Option<String> {
    let repository = repository.trim().trim_end_matches('/');
    if repository.is_empty() {
        return None;
    }
    Some(format!("{}/issues/new", repository))
}

/// Banner lines for a given day
pub fn banner(today: NaiveDate) -> Vec<String> {
    let mut lines = vec![format!("{} v{}", APP_NAME, VERSION)];

    if announcement_expiration().is_some_and(|expiration| today <= expiration) {
        lines.push(format!("Announcement: {}", ANNOUNCEMENT));
    }

    if let Some(link) = issue_link() {
        lines.push(format!("Report issues at {}", link));
    }
    lines
}
