//! Operation naming.
//!
//! Span names must stay low-cardinality, so every run of decimal digits in
//! the request path is replaced with a fixed token. The digits themselves
//! are kept separately and reported as the `request_ids` tag.

/// Token substituted for each digit run in a templated path.
pub const ID_PLACEHOLDER: &str = "id";

/// Separator between ids in the `request_ids` tag.
pub const ID_SEPARATOR: &str = ", ";

/// Span name and id list derived from one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationName {
    /// `"<METHOD> <templated-path>"`.
    pub name: String,
    /// The path before templating: no leading slash, no query.
    pub path: String,
    /// Digit runs from `path`, left to right.
    pub request_ids: Vec<String>,
}

impl OperationName {
    /// Derive the operation name from a method and a full path, which may
    /// still carry a query string.
    pub fn new(method: &str, full_path: &str) -> Self {
        let path = trim_path(full_path);
        let (templated, request_ids) = template_path(path);

        // An empty path would leave a trailing space after the method.
        let name = if templated.is_empty() {
            method.to_string()
        } else {
            format!("{} {}", method, templated)
        };

        Self {
            name,
            path: path.to_string(),
            request_ids,
        }
    }

    /// The `request_ids` tag value, e.g. `"42, 7"`.
    pub fn request_ids_tag(&self) -> String {
        self.request_ids.join(ID_SEPARATOR)
    }
}

/// Strip one leading slash and anything from the first `?` on.
pub fn trim_path(full_path: &str) -> &str {
    let path = full_path.strip_prefix('/').unwrap_or(full_path);
    match path.find('?') {
        Some(query) => &path[..query],
        None => path,
    }
}

/// Replace each maximal run of ASCII digits with [`ID_PLACEHOLDER`],
/// returning the templated path and the runs in order.
pub fn template_path(path: &str) -> (String, Vec<String>) {
    let mut templated = String::with_capacity(path.len());
    let mut ids = Vec::new();
    let mut rest = path;

    while let Some(start) = rest.find(|c: char| c.is_ascii_digit()) {
        templated.push_str(&rest[..start]);
        let run = &rest[start..];
        let end = run
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(run.len());
        ids.push(run[..end].to_string());
        templated.push_str(ID_PLACEHOLDER);
        rest = &run[end..];
    }
    templated.push_str(rest);

    (templated, ids)
}
