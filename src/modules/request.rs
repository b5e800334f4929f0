//! Bundled HTTP request modules
//!
//! - `request/get`, `request/post`, `request/put`, `request/delete` share a
//!   base schema; `get` shadows the inherited `payload`.
//! - `legacy/post` derives the scheme from an `ssl` flag.

use anyhow::{bail, Context};
use futures::future::BoxFuture;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use reqwest::{redirect, Method};
use url::Url;
use std::sync::Arc;
use std::time::Duration;

use super::registry::ModuleRegistry;
use super::schema::{ModuleInfo, ModuleSchema, SchemaBuilder};
use super::{Module, ModuleDefinition, ModuleOptions, RunContext};
use crate::options::OptionSpec;
use crate::output::terminal::{http_method, http_status, RESET};
use crate::output::Printer;

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT: f64 = 30.0;

/// Maximum redirects followed when `follow_redirects` is on
const MAX_REDIRECTS: usize = 10;

const AUTHOR: &str = "Curly Contributors";

/// Options every request module inherits
static BASE_SCHEMA: Lazy<Arc<ModuleSchema>> = Lazy::new(|| {
    SchemaBuilder::new(ModuleInfo::named("Request module"))
        .option("host", OptionSpec::string("").describe("Target host, optionally with :port"))
        .option("scheme", OptionSpec::string("http").describe("http or https"))
        .option("path", OptionSpec::string("").describe("Request path, may contain {param} placeholders"))
        .option("payload", OptionSpec::string("").describe("Request body"))
        .option("headers", OptionSpec::list().describe("Request headers"))
        .option("query_params", OptionSpec::list().describe("Query string parameters"))
        .option("path_params", OptionSpec::list().describe("Values for {param} placeholders in path"))
        .option(
            "timeout",
            OptionSpec::float(DEFAULT_TIMEOUT).advanced().describe("Timeout in seconds"),
        )
        .option(
            "follow_redirects",
            OptionSpec::bool(true).advanced().describe("Follow 3xx responses"),
        )
        .build()
});

fn method_schema(method: &Method) -> Arc<ModuleSchema> {
    let info = ModuleInfo::named(&format!("{} Request module", method))
        .description(&format!("Send an HTTP {} request built from the module options", method))
        .author(AUTHOR);
    let builder = SchemaBuilder::new(info).extends(&BASE_SCHEMA);
    if *method == Method::GET {
        builder.shadow("payload").build()
    } else {
        builder.build()
    }
}

fn legacy_post_schema() -> Arc<ModuleSchema> {
    let info = ModuleInfo::named("Post Request module")
        .description("POST a payload, choosing the scheme with the ssl flag")
        .author(AUTHOR);
    SchemaBuilder::new(info)
        .option("host", OptionSpec::string(""))
        .option("ssl", OptionSpec::bool(false).describe("Use https"))
        .option("path", OptionSpec::string(""))
        .option("payload", OptionSpec::string(""))
        .option("headers", OptionSpec::list())
        .option("query_params", OptionSpec::list())
        .build()
}

/// Register the bundled modules
pub fn register(registry: &mut ModuleRegistry) {
    for (path, method) in [
        ("request/get", Method::GET),
        ("request/post", Method::POST),
        ("request/put", Method::PUT),
        ("request/delete", Method::DELETE),
    ] {
        let schema = method_schema(&method);
        registry.register(ModuleDefinition::new(path, schema, Arc::new(HttpRequest { method })));
    }
    registry.register(ModuleDefinition::new(
        "legacy/post",
        legacy_post_schema(),
        Arc::new(LegacyPost),
    ));
}

/// Everything needed to issue one request
#[derive(Debug, Clone, PartialEq)]
pub struct RequestPlan {
    pub method: Method,
    pub url: String,
    pub headers: IndexMap<String, String>,
    pub query: IndexMap<String, String>,
    pub payload: String,
    pub timeout: Duration,
    pub follow_redirects: bool,
}

/// Replace `{name}` placeholders with their values
pub fn forge_path_params(path: &str, params: &IndexMap<String, String>) -> String {
    params.iter().fold(path.to_string(), |acc, (name, value)| {
        acc.replace(&format!("{{{}}}", name), value)
    })
}

fn require_target(options: &ModuleOptions) -> anyhow::Result<(&str, &str)> {
    let host = options.str("host");
    let path = options.str("path");
    if host.is_empty() {
        bail!("Must specify valid host");
    }
    if path.is_empty() {
        bail!("Must specify valid path");
    }
    Ok((host, path))
}

fn timeout_of(options: &ModuleOptions) -> anyhow::Result<Duration> {
    let secs = options
        .get("timeout")
        .and_then(|o| o.as_float())
        .unwrap_or(DEFAULT_TIMEOUT);
    if !secs.is_finite() || secs <= 0.0 {
        bail!("Timeout must be a positive number of seconds, got {}", secs);
    }
    Ok(Duration::from_secs_f64(secs))
}

/// Build the plan for a `request/*` module
pub fn plan_request(method: Method, options: &ModuleOptions) -> anyhow::Result<RequestPlan> {
    let (host, path) = require_target(options)?;
    let scheme = options.str("scheme");
    if scheme != "http" && scheme != "https" {
        bail!("Must specify valid scheme: [ https | http ]");
    }
    let path = forge_path_params(path, &options.entries("path_params"));

    Ok(RequestPlan {
        method,
        url: format!("{}://{}{}", scheme, host, path),
        headers: options.entries("headers"),
        query: options.entries("query_params"),
        payload: options.str("payload").to_string(),
        timeout: timeout_of(options)?,
        follow_redirects: options
            .get("follow_redirects")
            .and_then(|o| o.as_bool())
            .unwrap_or(true),
    })
}

/// Build the plan for `legacy/post`
pub fn plan_legacy_post(options: &ModuleOptions) -> anyhow::Result<RequestPlan> {
    let (host, path) = require_target(options)?;
    let ssl = options.get("ssl").and_then(|o| o.as_bool()).unwrap_or(false);
    let scheme = if ssl { "https" } else { "http" };

    Ok(RequestPlan {
        method: Method::POST,
        url: format!("{}://{}{}", scheme, host, path),
        headers: options.entries("headers"),
        query: options.entries("query_params"),
        payload: options.str("payload").to_string(),
        timeout: Duration::from_secs_f64(DEFAULT_TIMEOUT),
        follow_redirects: true,
    })
}

/// Issue the request and print the response
pub async fn send(plan: RequestPlan, printer: &Printer) -> anyhow::Result<()> {
    printer.info(format!(
        "Aiming for: {}{}{} {}",
        http_method(plan.method.as_str()),
        plan.method,
        RESET,
        plan.url
    ));

    let policy = if plan.follow_redirects {
        redirect::Policy::limited(MAX_REDIRECTS)
    } else {
        redirect::Policy::none()
    };
    let client = reqwest::Client::builder()
        .timeout(plan.timeout)
        .redirect(policy)
        .build()
        .context("Failed to build HTTP client")?;

    let mut url = Url::parse(&plan.url).with_context(|| format!("Invalid URL {}", plan.url))?;
    if !plan.query.is_empty() {
        url.query_pairs_mut().extend_pairs(&plan.query);
    }

    let mut request = client.request(plan.method.clone(), url);
    for (name, value) in &plan.headers {
        request = request.header(name.as_str(), value.as_str());
    }
    if !plan.payload.is_empty() {
        request = request.body(plan.payload.clone());
    }

    tracing::info!(method = %plan.method, url = %plan.url, "sending request");
    let response = request
        .send()
        .await
        .with_context(|| format!("{} {} failed", plan.method, plan.url))?;

    let status = response.status();
    tracing::info!(status = status.as_u16(), "response received");
    printer.info(format!(
        "{}{}{}",
        http_status(status.as_u16()),
        status,
        RESET
    ));
    for (name, value) in response.headers() {
        printer.info(format!("{}: {}", name, value.to_str().unwrap_or("<binary>")));
    }
    let body = response.text().await.context("Failed to read response body")?;
    printer.info(format!("Body:{}", body));
    Ok(())
}

/// `request/<method>` modules
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
}

impl Module for HttpRequest {
    fn run<'a>(&'a self, ctx: RunContext<'a>) -> BoxFuture<'a, anyhow::Result<()>> {
        Box::pin(async move {
            let plan = plan_request(self.method.clone(), ctx.options)?;
            send(plan, ctx.printer).await
        })
    }
}

/// `legacy/post`
#[derive(Debug, Clone, Copy)]
pub struct LegacyPost;

impl Module for LegacyPost {
    fn run<'a>(&'a self, ctx: RunContext<'a>) -> BoxFuture<'a, anyhow::Result<()>> {
        Box::pin(async move {
            let plan = plan_legacy_post(ctx.options)?;
            send(plan, ctx.printer).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(path: &str) -> ModuleOptions {
        let registry = ModuleRegistry::builtin();
        let definition = registry.resolve(path).unwrap();
        ModuleOptions::new(Arc::clone(definition.schema()))
    }

    #[test]
    fn test_get_shadows_payload() {
        let get = options("request/get");
        let post = options("request/post");
        assert!(!get.contains("payload"));
        assert!(post.contains("payload"));
        assert_eq!(post.names().len(), get.names().len() + 1);
    }

    #[test]
    fn test_advanced_flags() {
        let post = options("request/post");
        let advanced: Vec<_> = post
            .registry()
            .into_iter()
            .filter(|(_, _, adv)| *adv)
            .map(|(n, _, _)| n)
            .collect();
        assert_eq!(advanced, ["timeout", "follow_redirects"]);
    }

    #[test]
    fn test_forge_path_params() {
        let mut params = IndexMap::new();
        params.insert("id".to_string(), "42".to_string());
        params.insert("unused".to_string(), "x".to_string());
        assert_eq!(forge_path_params("/users/{id}/posts", &params), "/users/42/posts");
        assert_eq!(forge_path_params("/static", &params), "/static");
    }

    #[test]
    fn test_plan_requires_host_and_path() {
        let mut opts = options("request/get");
        let err = plan_request(Method::GET, &opts).unwrap_err();
        assert!(err.to_string().contains("host"));
        opts.set("host", "example.com").unwrap();
        let err = plan_request(Method::GET, &opts).unwrap_err();
        assert!(err.to_string().contains("path"));
    }

    #[test]
    fn test_plan_rejects_unknown_scheme() {
        let mut opts = options("request/get");
        opts.set("host", "example.com").unwrap();
        opts.set("path", "/").unwrap();
        opts.set("scheme", "ftp").unwrap();
        assert!(plan_request(Method::GET, &opts).is_err());
    }

    #[test]
    fn test_plan_builds_url() {
        let mut opts = options("request/put");
        opts.set("host", "example.com:8080").unwrap();
        opts.set("scheme", "https").unwrap();
        opts.set("path", "/items/{id}").unwrap();
        opts.add("path_params", "id", "7").unwrap();
        opts.add("headers", "X-Token", "t").unwrap();
        opts.set("payload", "{}").unwrap();
        opts.set("timeout", "2.5").unwrap();
        let plan = plan_request(Method::PUT, &opts).unwrap();
        assert_eq!(plan.url, "https://example.com:8080/items/7");
        assert_eq!(plan.headers["X-Token"], "t");
        assert_eq!(plan.payload, "{}");
        assert_eq!(plan.timeout, Duration::from_millis(2500));
    }

    #[test]
    fn test_plan_rejects_non_positive_timeout() {
        let mut opts = options("request/get");
        opts.set("host", "h").unwrap();
        opts.set("path", "/").unwrap();
        opts.set("timeout", "0").unwrap();
        assert!(plan_request(Method::GET, &opts).is_err());
    }

    #[test]
    fn test_legacy_post_scheme_from_ssl() {
        let mut opts = options("legacy/post");
        opts.set("host", "example.com").unwrap();
        opts.set("path", "/submit").unwrap();
        assert_eq!(plan_legacy_post(&opts).unwrap().url, "http://example.com/submit");
        opts.set("ssl", "true").unwrap();
        assert_eq!(plan_legacy_post(&opts).unwrap().url, "https://example.com/submit");
    }
}
