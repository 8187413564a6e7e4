//! Branch-name to task-id resolution.
//!
//! A branch encodes a task id when its short name carries the configured
//! prefix: under prefix "scm", branch "feature/scm123" links to task "123".

const MAIN_BRANCH: &str = "main";

/// Extract the short branch name from a full, slash-qualified branch name.
///
/// The main branch never links to a task and yields "". A name ending in
/// the separator also yields "".
pub fn short_branch_name(full_branch_name: &str) -> &str {
    if full_branch_name == MAIN_BRANCH {
        return "";
    }

    match full_branch_name.rfind('/') {
        None => full_branch_name,
        Some(idx) if idx == full_branch_name.len() - 1 => "",
        Some(idx) => &full_branch_name[idx + 1..],
    }
}

/// Map a short branch name to a task id under the configured prefix.
///
/// An empty prefix passes the short name through unchanged. Otherwise the
/// prefix is stripped; a name that misses the prefix, or consists of
/// nothing but the prefix, resolves to "" (no task).
pub fn task_id_for_branch<'a>(short_name: &'a str, prefix: &str) -> &'a str {
    if prefix.is_empty() {
        return short_name;
    }

    if !short_name.starts_with(prefix) || short_name == prefix {
        return "";
    }

    &short_name[prefix.len()..]
}
