//! HTTP span helpers.

use uuid::Uuid;

#[derive(Debug, Clone)]
pub(super) struct RequestSpanName {
    pub(super) otel_path: String,
    pub(super) otel_span_name: String,
}

pub(super) fn request_span_name(method: &str, path: &str) -> RequestSpanName {
    let otel_path = normalise_path_for_span_name(path);
    let otel_span_name = format!("{method} {otel_path}");

    RequestSpanName {
        otel_path,
        otel_span_name,
    }
}

/// Replace identifiers in a path with placeholders so routes group together.
///
/// Order UUIDs become `{uuid}`; cart item references are free-form and become
/// `{reference}`.
fn normalise_path_for_span_name(path: &str) -> String {
    if path == "/" {
        return "/".to_owned();
    }

    let mut normalised = String::from("/");
    let mut previous = "";

    for (index, segment) in path.trim_start_matches('/').split('/').enumerate() {
        if index > 0 {
            normalised.push('/');
        }

        if Uuid::parse_str(segment).is_ok() {
            normalised.push_str("{uuid}");
        } else if previous == "items" && !segment.is_empty() {
            normalised.push_str("{reference}");
        } else {
            normalised.push_str(segment);
        }

        previous = segment;
    }

    normalised
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_uuid_is_replaced() {
        let names = request_span_name("GET", &format!("/orders/{}/status", Uuid::nil()));

        assert_eq!(names.otel_path, "/orders/{uuid}/status");
        assert_eq!(names.otel_span_name, "GET /orders/{uuid}/status");
    }

    #[test]
    fn test_cart_item_reference_is_replaced() {
        let names = request_span_name("PATCH", "/cart/items/kb-1");

        assert_eq!(names.otel_path, "/cart/items/{reference}");
    }

    #[test]
    fn test_static_paths_are_kept() {
        assert_eq!(request_span_name("GET", "/").otel_path, "/");
        assert_eq!(request_span_name("POST", "/cart/items").otel_path, "/cart/items");
        assert_eq!(request_span_name("GET", "/admin/orders").otel_path, "/admin/orders");
    }
}
