const DIRECT_HOST: &str = "lh3.googleusercontent.com";
const SHARE_HOST: &str = "drive.google.com";
const RENDITION: &str = "=w1600";

/// Split a raw photo cell into candidate URLs and canonicalize each one.
/// Tokens split on runs of whitespace and/or semicolons; anything that does
/// not start with `http` is noise (`"n/a"`, stray text) and is dropped.
/// Order is preserved (the first photo is the cover image) and duplicates
/// are kept as the source wrote them.
pub fn canonicalize_photos(raw: &str) -> Vec<String> {
    raw.split(|ch: char| ch.is_whitespace() || ch == ';')
        .map(str::trim)
        .filter(|token| token.starts_with("http"))
        .map(canonicalize_url)
        .collect()
}

/// Drive share links are not embeddable at scale, so they are rewritten to
/// the lh3 direct-serving host at a 1600px rendition. Unrecognized hosts and
/// share links whose file id cannot be found pass through unchanged rather
/// than losing a photo the rewrite does not understand.
fn canonicalize_url(token: &str) -> String {
    if token.contains(DIRECT_HOST) {
        return token.to_string();
    }
    if token.contains(SHARE_HOST) {
        if let Some(file_id) = drive_file_id(token) {
            return format!("https://{DIRECT_HOST}/d/{file_id}{RENDITION}");
        }
    }
    token.to_string()
}

fn drive_file_id(url: &str) -> Option<&str> {
    let rest = url.split_once("/d/")?.1;
    let id = rest.split(['/', '?', '#']).next()?;
    if id.is_empty() { None } else { Some(id) }
}
