// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Tests for RIPE database REST API operations.

#[cfg(test)]
mod tests {
    use crate::errors::RegistryError;
    use crate::registry::{
        build_api_url, ErrorMessage, ErrorMessageArg, Registry, RipeDbClient, WhoisResources,
    };
    use crate::rpsl::RpslObject;
    use serde_json::{json, Value};
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn domain_json(domain: &str, ds: &[&str]) -> Value {
        let mut attributes = vec![
            json!({"name": "domain", "value": domain}),
            json!({"name": "nserver", "value": "ns1.example.net"}),
        ];
        for value in ds {
            attributes.push(json!({"name": "ds-rdata", "value": value}));
        }
        attributes.push(json!({"name": "mnt-by", "value": "EXAMPLE-MNT", "referenced-type": "mntner"}));
        attributes.push(json!({"name": "created", "value": "2020-01-01T00:00:00Z"}));
        attributes.push(json!({"name": "last-modified", "value": "2024-03-01T12:00:00Z"}));
        attributes.push(json!({"name": "source", "value": "RIPE"}));

        json!({
            "type": "domain",
            "source": {"id": "ripe"},
            "attributes": {"attribute": attributes}
        })
    }

    // =====================================================
    // URL Building Tests
    // =====================================================

    #[test]
    fn test_build_api_url_with_https() {
        assert_eq!(
            build_api_url("https://rest.db.ripe.net/"),
            "https://rest.db.ripe.net"
        );
    }

    #[test]
    fn test_build_api_url_without_scheme() {
        assert_eq!(build_api_url("rest.db.ripe.net"), "https://rest.db.ripe.net");
    }

    #[test]
    fn test_build_api_url_keeps_http() {
        assert_eq!(build_api_url("http://localhost:8080"), "http://localhost:8080");
    }

    #[test]
    fn test_update_url_with_password_and_dry_run() {
        let client =
            RipeDbClient::new("https://rest-test.db.ripe.net", Some("s3cr3t".to_string())).unwrap();
        let url = client.update_url("2.0.192.in-addr.arpa", true).unwrap();

        assert_eq!(
            url.as_str(),
            "https://rest-test.db.ripe.net/ripe/domain/2.0.192.in-addr.arpa?password=s3cr3t&dry-run=true"
        );
    }

    #[test]
    fn test_update_url_under_base_path() {
        let client = RipeDbClient::new("https://example.net/api/", None).unwrap();
        let url = client.update_url("example.org", false).unwrap();

        assert_eq!(url.as_str(), "https://example.net/api/ripe/domain/example.org");
    }

    #[test]
    fn test_search_url_parameters() {
        let client = RipeDbClient::new("https://rest.db.ripe.net", None).unwrap();
        let url = client.search_url("EXAMPLE-MNT").unwrap();
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        assert_eq!(url.path(), "/search.json");
        assert_eq!(
            pairs,
            vec![
                ("query-string".to_string(), "EXAMPLE-MNT".to_string()),
                ("inverse-attribute".to_string(), "mnt-by".to_string()),
                ("type-filter".to_string(), "domain".to_string()),
                ("flags".to_string(), "no-referenced".to_string()),
                ("flags".to_string(), "no-irt".to_string()),
                ("flags".to_string(), "no-filtering".to_string()),
                ("source".to_string(), "RIPE".to_string()),
            ]
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let result = RipeDbClient::new("https://", None);
        assert!(matches!(result, Err(RegistryError::InvalidUrl { .. })));
    }

    // =====================================================
    // whois-resources Tests
    // =====================================================

    #[test]
    fn test_error_message_formatting() {
        let message = ErrorMessage {
            severity: "Error".to_string(),
            text: "Authorisation for [%s] %s failed".to_string(),
            args: vec![
                ErrorMessageArg {
                    value: "domain".to_string(),
                },
                ErrorMessageArg {
                    value: "example.org".to_string(),
                },
            ],
        };

        assert!(message.is_error());
        assert_eq!(
            message.to_string(),
            "Error: Authorisation for [domain] example.org failed"
        );
    }

    #[test]
    fn test_error_message_missing_args_left_verbatim() {
        let message = ErrorMessage {
            severity: "Warning".to_string(),
            text: "Value %s converted".to_string(),
            args: vec![],
        };

        assert!(!message.is_error());
        assert_eq!(message.formatted(), "Value %s converted");
    }

    #[test]
    fn test_submission_body_shape() {
        let object: RpslObject = serde_json::from_value(domain_json("example.org", &[])).unwrap();
        let body = serde_json::to_value(WhoisResources::single(object)).unwrap();

        assert!(body["objects"]["object"].is_array());
        assert_eq!(body["objects"]["object"].as_array().unwrap().len(), 1);
        assert!(body.get("errormessages").is_none());
    }

    // =====================================================
    // HTTP Tests
    // =====================================================

    #[tokio::test]
    async fn test_maintained_domains() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search.json"))
            .and(query_param("query-string", "EXAMPLE-MNT"))
            .and(query_param("inverse-attribute", "mnt-by"))
            .and(query_param("type-filter", "domain"))
            .and(query_param("flags", "no-irt"))
            .and(query_param("source", "RIPE"))
            .and(header("accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "objects": {"object": [
                    domain_json("2.0.192.in-addr.arpa", &[]),
                    domain_json("example.org", &["1 8 2 abcd"]),
                ]}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = RipeDbClient::new(&server.uri(), None).unwrap();
        let domains = client.maintained_domains("EXAMPLE-MNT").await.unwrap();

        let names: Vec<String> = domains.iter().map(|d| d.domain_name().unwrap()).collect();
        assert_eq!(names, vec!["2.0.192.in-addr.arpa", "example.org"]);
    }

    #[tokio::test]
    async fn test_maintained_domains_not_found_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search.json"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "errormessages": {"errormessage": [
                    {"severity": "Error", "text": "There are no results for your search query."}
                ]}
            })))
            .mount(&server)
            .await;

        let client = RipeDbClient::new(&server.uri(), None).unwrap();
        let domains = client.maintained_domains("NOBODY-MNT").await.unwrap();
        assert!(domains.is_empty());
    }

    #[tokio::test]
    async fn test_maintained_domains_non_json_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
            .mount(&server)
            .await;

        let client = RipeDbClient::new(&server.uri(), None).unwrap();
        let err = client.maintained_domains("EXAMPLE-MNT").await.unwrap_err();
        assert!(matches!(err, RegistryError::Decode { ref reason, .. } if reason.contains("502")));
    }

    #[tokio::test]
    async fn test_update_domain_strips_server_attributes() {
        let server = MockServer::start().await;
        let object: RpslObject =
            serde_json::from_value(domain_json("example.org", &["2 13 2 ef01"])).unwrap();

        let expected_body = json!({
            "objects": {"object": [{
                "type": "domain",
                "source": {"id": "ripe"},
                "attributes": {"attribute": [
                    {"name": "domain", "value": "example.org"},
                    {"name": "nserver", "value": "ns1.example.net"},
                    {"name": "ds-rdata", "value": "2 13 2 ef01"},
                    {"name": "mnt-by", "value": "EXAMPLE-MNT", "referenced-type": "mntner"},
                    {"name": "source", "value": "RIPE"}
                ]}
            }]}
        });

        Mock::given(method("PUT"))
            .and(path("/ripe/domain/example.org"))
            .and(query_param("password", "s3cr3t"))
            .and(query_param("dry-run", "true"))
            .and(header("accept", "application/json"))
            .and(body_json(&expected_body))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "objects": {"object": [domain_json("example.org", &["2 13 2 ef01"])]}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = RipeDbClient::new(&server.uri(), Some("s3cr3t".to_string())).unwrap();
        let echo = client
            .update_domain("example.org", &object, true)
            .await
            .unwrap();

        assert_eq!(
            echo.attributes_named("ds-rdata").collect::<Vec<_>>(),
            vec!["2 13 2 ef01"]
        );
    }

    #[tokio::test]
    async fn test_update_domain_warnings_still_return_object() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/ripe/domain/example.org"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "objects": {"object": [domain_json("example.org", &[])]},
                "errormessages": {"errormessage": [
                    {"severity": "Warning", "text": "Dry-run performed, no changes to the database have been made"},
                    {"severity": "Info", "text": "Value %s converted to %s", "args": [{"value": "A"}, {"value": "a"}]}
                ]}
            })))
            .mount(&server)
            .await;

        let client = RipeDbClient::new(&server.uri(), None).unwrap();
        let object = RpslObject::from_pairs([("domain", "example.org")]);
        let echo = client.update_domain("example.org", &object, true).await;

        assert!(echo.is_ok());
    }

    #[tokio::test]
    async fn test_update_domain_error_severity_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/ripe/domain/example.org"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "objects": {"object": [domain_json("example.org", &[])]},
                "errormessages": {"errormessage": [
                    {"severity": "Error", "text": "Authorisation for [%s] %s failed using \"%s:\"", "args": [
                        {"value": "domain"}, {"value": "example.org"}, {"value": "mnt-by"}
                    ]}
                ]}
            })))
            .mount(&server)
            .await;

        let client = RipeDbClient::new(&server.uri(), Some("wrong".to_string())).unwrap();
        let object = RpslObject::from_pairs([("domain", "example.org")]);
        let err = client
            .update_domain("example.org", &object, false)
            .await
            .unwrap_err();

        match err {
            RegistryError::Rejected { domain, messages } => {
                assert_eq!(domain, "example.org");
                assert_eq!(
                    messages,
                    vec!["Error: Authorisation for [domain] example.org failed using \"mnt-by:\""]
                );
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_update_domain_empty_response() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let client = RipeDbClient::new(&server.uri(), None).unwrap();
        let object = RpslObject::from_pairs([("domain", "example.org")]);
        let err = client
            .update_domain("example.org", &object, false)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            RegistryError::EmptyResponse { status: 200, .. }
        ));
    }
}
