//! Configuration for CORS (Cross-Origin Resource Sharing).

use std::time::Duration;

use ascii::AsciiString;
use duration_str::deserialize_option_duration;
use url::Url;

/// CORS settings applied to every exposed endpoint.
#[derive(Clone, Default, Debug, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorsConfig {
    /// If false (or not defined), credentials are not allowed in requests.
    pub allow_credentials: bool,
    /// Origins from which we allow requests.
    pub allow_origins: Option<AnyOrUrlArray>,
    /// Maximum time between OPTIONS and the next request.
    #[serde(deserialize_with = "deserialize_option_duration")]
    pub max_age: Option<Duration>,
    /// HTTP methods allowed to the endpoint.
    pub allow_methods: Option<AnyOrHttpMethodArray>,
    /// Headers allowed in incoming requests.
    pub allow_headers: Option<AnyOrAsciiStringArray>,
}

/// A standard HTTP method.
#[derive(Debug, PartialEq, Clone, Copy, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// Requests a representation of the specified resource.
    Get,
    /// Submits an entity to the specified resource.
    Post,
    /// Replaces all current representations of the target resource.
    Put,
    /// Deletes the specified resource.
    Delete,
    /// Asks for a GET-identical response without the response body.
    Head,
    /// Describes the communication options for the target resource.
    Options,
    /// Establishes a tunnel to the server identified by the target resource.
    Connect,
    /// Applies partial modifications to a resource.
    Patch,
    /// Performs a message loop-back test along the path to the target.
    Trace,
}

impl std::str::FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            "HEAD" => Ok(HttpMethod::Head),
            "OPTIONS" => Ok(HttpMethod::Options),
            "CONNECT" => Ok(HttpMethod::Connect),
            "PATCH" => Ok(HttpMethod::Patch),
            "TRACE" => Ok(HttpMethod::Trace),
            _ => Err(format!("Unknown HTTP method: {s}")),
        }
    }
}

impl From<HttpMethod> for http::Method {
    fn from(value: HttpMethod) -> Self {
        match value {
            HttpMethod::Get => http::Method::GET,
            HttpMethod::Post => http::Method::POST,
            HttpMethod::Put => http::Method::PUT,
            HttpMethod::Delete => http::Method::DELETE,
            HttpMethod::Head => http::Method::HEAD,
            HttpMethod::Options => http::Method::OPTIONS,
            HttpMethod::Connect => http::Method::CONNECT,
            HttpMethod::Patch => http::Method::PATCH,
            HttpMethod::Trace => http::Method::TRACE,
        }
    }
}

/// A type alias for `AnyOrArray` specifically for `Url` values.
pub type AnyOrUrlArray = AnyOrArray<Url>;

/// A type alias for `AnyOrArray` specifically for `HttpMethod` values.
pub type AnyOrHttpMethodArray = AnyOrArray<HttpMethod>;

/// A type alias for `AnyOrArray` specifically for `AsciiString` values.
pub type AnyOrAsciiStringArray = AnyOrArray<AsciiString>;

/// A configuration option that either allows any value (the wildcard string
/// `*`) or an explicit list of values.
#[derive(Clone, Debug, PartialEq)]
pub enum AnyOrArray<T> {
    /// Any value is allowed.
    Any,
    /// A specific, explicit list of allowed values.
    Explicit(Vec<T>),
}

impl<'de, T> serde::Deserialize<'de> for AnyOrArray<T>
where
    T: serde::Deserialize<'de> + std::str::FromStr<Err: std::fmt::Display>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct AnyOrArrayVisitor<T> {
            _marker: std::marker::PhantomData<T>,
        }

        impl<'de, T> serde::de::Visitor<'de> for AnyOrArrayVisitor<T>
        where
            T: serde::Deserialize<'de> + std::str::FromStr<Err: std::fmt::Display>,
        {
            type Value = AnyOrArray<T>;

            fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                formatter.write_str("expecting string \"*\", or an array of values")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                if value == "*" {
                    Ok(AnyOrArray::Any)
                } else {
                    value
                        .parse::<T>()
                        .map_err(|err| E::custom(err))
                        .map(|value| AnyOrArray::Explicit(vec![value]))
                }
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: serde::de::SeqAccess<'de>,
            {
                let mut array = Vec::new();

                while let Some(value) = seq.next_element()? {
                    array.push(value);
                }

                Ok(AnyOrArray::Explicit(array))
            }
        }

        deserializer.deserialize_any(AnyOrArrayVisitor {
            _marker: std::marker::PhantomData,
        })
    }
}
