//! # Path Resolver
//!
//! Maps a concrete request path (`/Carp/17`) to the declared template that
//! serves it (`/Carp/{id}`).
//!
//! An exact template match always wins. Otherwise templates are compared
//! segment by segment in declaration order: segment counts must agree and
//! each template segment is either a `{placeholder}` or byte-identical to
//! the request segment. The earliest declared match is returned, so a
//! document that declares `/Carp/search` before `/Carp/{id}` keeps the
//! literal route reachable.

use crate::document::SchemaDocument;

/// Template for `request_path`, or `None` when nothing matches.
///
/// A query string (`?limit=3`) is ignored.
pub fn resolve<'d>(document: &'d SchemaDocument, request_path: &str) -> Option<&'d str> {
    let path = strip_query(request_path);

    if let Some((template, _)) = document.paths.get_key_value(path) {
        return Some(template.as_str());
    }

    let request: Vec<&str> = segments(path).collect();
    let resolved = document
        .paths
        .keys()
        .find(|template| matches_template(template, &request))
        .map(String::as_str);

    tracing::debug!(request_path, template = resolved, "resolved request path");
    resolved
}

fn strip_query(path: &str) -> &str {
    path.split_once('?').map_or(path, |(p, _)| p)
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

fn matches_template(template: &str, request: &[&str]) -> bool {
    let template: Vec<&str> = segments(template).collect();
    template.len() == request.len()
        && template
            .iter()
            .zip(request)
            .all(|(t, r)| is_placeholder(t) || t == r)
}

fn is_placeholder(segment: &str) -> bool {
    segment.len() >= 2 && segment.starts_with('{') && segment.ends_with('}')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{load_str, DocumentFormat};
    use proptest::prelude::*;

    fn document(templates: &[&str]) -> SchemaDocument {
        let mut yaml = String::from("openapi: 3.0.0\npaths:\n");
        for t in templates {
            yaml.push_str(&format!("  \"{t}\": {{}}\n"));
        }
        load_str(&yaml, DocumentFormat::Yaml).unwrap()
    }

    #[test]
    fn exact_match() {
        let doc = document(&["/list", "/Carp"]);
        assert_eq!(resolve(&doc, "/list"), Some("/list"));
    }

    #[test]
    fn placeholder_match() {
        let doc = document(&["/Carp", "/Carp/{id}"]);
        assert_eq!(resolve(&doc, "/Carp/17"), Some("/Carp/{id}"));
    }

    #[test]
    fn segment_count_must_agree() {
        let doc = document(&["/Carp/{id}"]);
        assert_eq!(resolve(&doc, "/Carp/17/extra"), None);
        assert_eq!(resolve(&doc, "/Carp"), None);
    }

    #[test]
    fn literal_segments_are_case_sensitive() {
        let doc = document(&["/Carp/{id}"]);
        assert_eq!(resolve(&doc, "/carp/17"), None);
    }

    #[test]
    fn earliest_declaration_wins() {
        let doc = document(&["/Carp/search", "/Carp/{id}"]);
        assert_eq!(resolve(&doc, "/Carp/search"), Some("/Carp/search"));
        assert_eq!(resolve(&doc, "/Carp/9"), Some("/Carp/{id}"));

        let doc = document(&["/Carp/{id}", "/Carp/search"]);
        // Exact match still beats an earlier placeholder template.
        assert_eq!(resolve(&doc, "/Carp/search"), Some("/Carp/search"));
    }

    #[test]
    fn query_string_ignored() {
        let doc = document(&["/Carp/{id}"]);
        assert_eq!(resolve(&doc, "/Carp/4?verbose=true"), Some("/Carp/{id}"));
    }

    #[test]
    fn surrounding_slashes_ignored() {
        let doc = document(&["/tanks/{tankId}/fish"]);
        assert_eq!(resolve(&doc, "tanks/7/fish/"), Some("/tanks/{tankId}/fish"));
    }

    #[test]
    fn padded_segment_is_not_trimmed() {
        let doc = document(&["/Carp/{id}"]);
        assert_eq!(resolve(&doc, "/ Carp/42"), None);
        assert_eq!(resolve(&doc, "/Carp /42"), None);
    }

    #[test]
    fn whitespace_segment_counts() {
        let doc = document(&["/Carp/{id}"]);
        assert_eq!(resolve(&doc, "/Carp/ /42"), None);
        assert_eq!(resolve(&doc, "/Carp/ "), Some("/Carp/{id}"));
    }

    #[test]
    fn unknown_path() {
        let doc = document(&["/list"]);
        assert_eq!(resolve(&doc, "/Shark"), None);
    }

    proptest! {
        #[test]
        fn any_id_resolves_to_placeholder(id in "[A-Za-z0-9_-]{1,16}") {
            prop_assume!(id != "search");
            let doc = document(&["/Carp/search", "/Carp/{id}"]);
            let path = format!("/Carp/{id}");
            prop_assert_eq!(resolve(&doc, &path), Some("/Carp/{id}"));
        }

        #[test]
        fn resolution_is_idempotent(path in "(/[a-z{}]{1,6}){0,4}") {
            let doc = document(&["/a", "/a/{b}", "/c/{d}/e"]);
            prop_assert_eq!(resolve(&doc, &path), resolve(&doc, &path));
        }
    }
}
