//! Annotation extraction through the standard parser set.

use std::error::Error as _;
use std::sync::Arc;

use ingress_synth::annotations::{AnnotationExtractor, VerifyClient};
use ingress_synth::config::ControllerConfig;
use ingress_synth::resolver::ResolveError;

mod common;

use common::{route, HangingResolver, StaticResolver};

fn extractor(resolver: StaticResolver) -> AnnotationExtractor {
    AnnotationExtractor::standard(&ControllerConfig::default(), Arc::new(resolver))
}

#[tokio::test]
async fn test_tls_client_auth_defaults() {
    let extractor = extractor(StaticResolver::default().with("shop/client-ca", "aa"));
    let r = route(
        "shop",
        "web",
        "shop.local",
        &[("/", "web")],
        &[
            ("auth-tls-secret", "shop/client-ca"),
            ("auth-tls-verify-client", "weird"),
            ("auth-tls-verify-depth", "0"),
        ],
    );

    let extracted = extractor.extract(&r).await;
    assert!(extracted.denials.is_empty());
    let auth = extracted.extensions.certificate_auth.unwrap();
    assert_eq!(auth.verify_client, VerifyClient::On);
    assert_eq!(auth.verify_depth, 1);
    assert!(!auth.cert_header);
    assert_eq!(auth.error_page, "");
    assert_eq!(auth.certificate.pem_sha, "aa");
}

#[tokio::test]
async fn test_tls_denials_only_disable_client_auth() {
    let extractor = extractor(StaticResolver::default());
    let cases = [("", "empty"), ("a/b/c", "malformed"), ("shop/missing", "unresolvable")];

    for (secret, case) in cases {
        let r = route(
            "shop",
            "web",
            "shop.local",
            &[("/", "web")],
            &[("auth-tls-secret", secret), ("hsts-max-age", "120")],
        );
        let extracted = extractor.extract(&r).await;

        assert_eq!(extracted.denials.len(), 1, "{case}");
        assert_eq!(extracted.denials[0].parser, "auth-tls", "{case}");
        assert!(extracted.extensions.certificate_auth.is_none(), "{case}");
        assert_eq!(extracted.extensions.hsts.map(|h| h.max_age), Some(120), "{case}");
    }
}

#[tokio::test]
async fn test_resolver_error_is_wrapped() {
    let parser = ingress_synth::annotations::AuthTlsParser::new(
        common::PREFIX,
        Arc::new(StaticResolver::default()),
        std::time::Duration::from_secs(1),
    );
    let r = route("shop", "web", "shop.local", &[], &[("auth-tls-secret", "shop/ca")]);

    let err = parser.parse_client_auth(&r).await.unwrap_err();
    assert!(err.is_denied());
    assert_eq!(
        err.to_string(),
        "error obtaining certificate: secret shop/ca does not contain a PEM certificate"
    );
    assert!(err
        .source()
        .and_then(|s| s.downcast_ref::<ResolveError>())
        .is_some());
}

#[tokio::test(start_paused = true)]
async fn test_resolver_timeout_is_denied() {
    let mut config = ControllerConfig::default();
    config.controller.resolver_timeout_ms = 50;
    let extractor = AnnotationExtractor::standard(&config, Arc::new(HangingResolver));
    let r = route("shop", "web", "shop.local", &[], &[("auth-tls-secret", "ca")]);

    let extracted = extractor.extract(&r).await;
    assert_eq!(extracted.denials.len(), 1);
    assert!(extracted.denials[0].reason.contains("timed out after 50ms"));
    assert!(extracted.extensions.certificate_auth.is_none());
}

#[tokio::test]
async fn test_fingerprint_change_breaks_equality() {
    let r = route("shop", "web", "shop.local", &[], &[("auth-tls-secret", "shop/ca")]);

    let a = extractor(StaticResolver::default().with("shop/ca", "aa")).extract(&r).await;
    let b = extractor(StaticResolver::default().with("shop/ca", "aa")).extract(&r).await;
    let c = extractor(StaticResolver::default().with("shop/ca", "bb")).extract(&r).await;

    assert_eq!(a.extensions, b.extensions);
    assert_ne!(a.extensions.certificate_auth, c.extensions.certificate_auth);
}

#[tokio::test]
async fn test_routes_without_tls_never_call_resolver() {
    let resolver = Arc::new(StaticResolver::default());
    let extractor = AnnotationExtractor::standard(&ControllerConfig::default(), resolver.clone());
    let routes = vec![
        route("a", "one", "one.local", &[("/", "one")], &[]),
        route("a", "two", "two.local", &[("/", "two")], &[("whitelist-source-range", "10.0.0.0/8")]),
    ];

    let extracted = extractor.extract_all(&routes).await;
    assert_eq!(resolver.calls(), 0);
    assert!(extracted.iter().all(|e| e.denials.is_empty()));
    assert_eq!(extracted[0].extensions.ssl_redirect, Some(true));
    assert!(extracted[1].extensions.whitelist.is_some());
}
