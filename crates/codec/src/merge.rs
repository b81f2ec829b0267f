//! Composite merge layer: namespacing policy and the merge-endpoint URL.
//!
//! When several applications contribute view models to one mount point,
//! each root is wrapped under its owning application's name and the other
//! siblings are embedded beside it. The `from_sibling` argument is the
//! re-entry guard: a root serialized as somebody else's sibling must not
//! expand its own siblings again.

use typed_json_schema::{Json, SiblingSet};

use crate::serializer::SerializeContext;

/// The sibling set to merge against, when the root should be wrapped in
/// its application namespace.
///
/// Wrapping requires an owning application name, a session with namespaces
/// enabled, a tree that is not the session's public view-model root, and a
/// mount point actually shared by more than one application. Sibling
/// re-entries are never wrapped; a set holding only the tree itself means
/// the ordinary unwrapped form.
pub(crate) fn namespaced_siblings<'a>(
    json: &Json,
    ctx: Option<&SerializeContext<'a>>,
    from_sibling: bool,
) -> Option<&'a SiblingSet<'a>> {
    if from_sibling {
        return None;
    }
    let ctx = ctx?;
    let siblings = ctx.siblings?;
    if json.app_name().is_some()
        && ctx.session.namespaces_enabled()
        && !ctx.session.is_public_root(json)
        && siblings.len() > 1
    {
        Some(siblings)
    } else {
        None
    }
}

/// Builds the merge-endpoint URL: every contributing application's name and
/// partial-content URL as query parameters, in sibling-set order.
pub(crate) fn merge_html_url(endpoint: &str, siblings: &SiblingSet) -> String {
    let mut url = String::with_capacity(endpoint.len() + 16);
    url.push_str(endpoint);
    url.push('?');
    for (i, sibling) in siblings.iter().enumerate() {
        if i > 0 {
            url.push('&');
        }
        url.push_str(sibling.app_name);
        url.push('=');
        url.push_str(sibling.partial_url);
    }
    url
}
