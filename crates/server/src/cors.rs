use config::{AnyOrAsciiStringArray, AnyOrHttpMethodArray, AnyOrUrlArray, CorsConfig};
use http::{HeaderName, HeaderValue};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

pub(super) fn generate(
    CorsConfig {
        allow_credentials,
        allow_origins,
        max_age,
        allow_methods,
        allow_headers,
    }: &CorsConfig,
) -> CorsLayer {
    let mut cors_layer = CorsLayer::new().allow_credentials(*allow_credentials);

    if let Some(allow_origins) = allow_origins {
        cors_layer = cors_layer.allow_origin(match allow_origins {
            AnyOrUrlArray::Any => AllowOrigin::any(),
            AnyOrUrlArray::Explicit(origins) => {
                let origins = origins
                    .iter()
                    .filter_map(|origin| {
                        // Only the scheme://host[:port] part identifies an origin.
                        HeaderValue::from_str(&origin[..url::Position::BeforePath]).ok()
                    })
                    .collect::<Vec<_>>();

                AllowOrigin::list(origins)
            }
        });
    }

    if let Some(max_age) = max_age {
        cors_layer = cors_layer.max_age(*max_age);
    }

    if let Some(allow_methods) = allow_methods {
        cors_layer = cors_layer.allow_methods(match allow_methods {
            AnyOrHttpMethodArray::Any => AllowMethods::any(),
            AnyOrHttpMethodArray::Explicit(methods) => {
                let mut methods: Vec<http::Method> = methods.iter().map(|method| http::Method::from(*method)).collect();

                // Preflight requests must always be able to get through.
                if !methods.contains(&http::Method::OPTIONS) {
                    methods.push(http::Method::OPTIONS);
                }

                AllowMethods::list(methods)
            }
        });
    }

    if let Some(allow_headers) = allow_headers {
        cors_layer = cors_layer.allow_headers(match allow_headers {
            AnyOrAsciiStringArray::Any => AllowHeaders::any(),
            AnyOrAsciiStringArray::Explicit(headers) => {
                let headers = headers
                    .iter()
                    .filter_map(|header| HeaderName::from_bytes(header.as_bytes()).ok())
                    .collect::<Vec<_>>();

                AllowHeaders::list(headers)
            }
        });
    }

    cors_layer
}
