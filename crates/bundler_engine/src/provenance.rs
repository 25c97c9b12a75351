/// Payload of the provenance comment stamped into bundled documents.
///
/// `--` is broken up so neither the title nor the URL can close the comment.
pub fn build_provenance_comment(title: &str, url: &str, generated_at: &str) -> String {
    let comment = format!(
        " \n single html bundled from its online original\n title: {title}\n url: {url}\n date: {generated_at}\n",
        title = title,
        url = url,
        generated_at = generated_at,
    );
    comment.replace("--", "- -")
}

/// Local time in `ctime` layout, e.g. `Sun Oct 16 09:05:01 2026`.
pub fn ctime_now() -> String {
    chrono::Local::now().format("%a %b %e %H:%M:%S %Y").to_string()
}
