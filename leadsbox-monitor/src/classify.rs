//! Request classification into monitored flows.

use leadsbox_types::Flow;

const QUICK_CAPTURE_SEGMENTS: [&str; 3] = ["quick-capture", "quick_capture", "quickcapture"];
const FOLLOW_UP_SEGMENTS: [&str; 3] = ["followups", "follow-ups", "follow_ups"];

/// Map a request to the flow it belongs to, if any.
///
/// Only `POST` requests are monitored. Matching ignores case, the origin,
/// the query string, the fragment and trailing slashes:
///
/// - `…/threads/{id}/reply` → [`Flow::InboxSend`]
/// - `…/quick-capture` → [`Flow::SalesQuickCapture`]
/// - `…/followups` (the collection, not an item) → [`Flow::FollowupSchedule`]
///
/// ```rust
/// use leadsbox_monitor::{classify, Flow};
///
/// assert_eq!(classify("https://api.leadsbox.app/api/threads/7/reply", "post"), Some(Flow::InboxSend));
/// assert_eq!(classify("/api/threads/7/reply", "GET"), None);
/// ```
pub fn classify(url: &str, method: &str) -> Option<Flow> {
    if !method.trim().eq_ignore_ascii_case("post") {
        return None;
    }

    let path = request_path(url).to_ascii_lowercase();
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    match segments.as_slice() {
        [.., "threads", _, "reply"] => Some(Flow::InboxSend),
        [.., last] if QUICK_CAPTURE_SEGMENTS.contains(last) => Some(Flow::SalesQuickCapture),
        [.., last] if FOLLOW_UP_SEGMENTS.contains(last) => Some(Flow::FollowupSchedule),
        _ => None,
    }
}

/// Strip origin, query string and fragment, leaving only the path.
fn request_path(url: &str) -> &str {
    let url = url.trim();
    let url = url.split(['?', '#']).next().unwrap_or_default();

    let after_origin = if let Some((_, rest)) = url.split_once("://") {
        Some(rest)
    } else {
        url.strip_prefix("//")
    };

    match after_origin {
        Some(rest) => rest.find('/').map_or("", |idx| &rest[idx..]),
        None => url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thread_reply_is_inbox_send() {
        assert_eq!(
            classify("https://api.leadsbox.app/api/threads/abc123/reply?draft=0", "POST"),
            Some(Flow::InboxSend)
        );
        assert_eq!(classify("/API/Threads/1/Reply/", "post"), Some(Flow::InboxSend));
    }

    #[test]
    fn reply_without_thread_id_is_ignored() {
        assert_eq!(classify("/api/threads/reply", "POST"), None);
    }

    #[test]
    fn quick_capture_variants() {
        assert_eq!(
            classify("/api/sales/quick-capture", "POST"),
            Some(Flow::SalesQuickCapture)
        );
        assert_eq!(
            classify("/api/sales/QUICK_CAPTURE#top", "Post"),
            Some(Flow::SalesQuickCapture)
        );
    }

    #[test]
    fn follow_up_collection_only() {
        assert_eq!(
            classify("/api/followups", "POST"),
            Some(Flow::FollowupSchedule)
        );
        assert_eq!(
            classify("//api.leadsbox.app/api/follow-ups/", "POST"),
            Some(Flow::FollowupSchedule)
        );
        assert_eq!(classify("/api/followups/123", "POST"), None);
    }

    #[test]
    fn non_post_methods_are_ignored() {
        for method in ["GET", "PUT", "PATCH", "DELETE", ""] {
            assert_eq!(classify("/api/followups", method), None);
        }
    }

    #[test]
    fn unrelated_paths_are_ignored() {
        assert_eq!(classify("/api/auth/login", "POST"), None);
        assert_eq!(classify("https://api.leadsbox.app", "POST"), None);
    }

    #[test]
    fn request_path_strips_origin_and_query() {
        assert_eq!(request_path("https://host:8080/a/b?c=d"), "/a/b");
        assert_eq!(request_path("/a/b#frag"), "/a/b");
        assert_eq!(request_path("https://host"), "");
    }
}
