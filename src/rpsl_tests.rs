// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `rpsl.rs`

#[cfg(test)]
mod tests {
    use crate::rpsl::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn domain_object() -> RpslObject {
        RpslObject::from_pairs([
            ("domain", "2.0.192.in-addr.arpa"),
            ("descr", "Example reverse zone"),
            ("admin-c", "EX1-RIPE"),
            ("tech-c", "EX1-RIPE"),
            ("zone-c", "EX1-RIPE"),
            ("nserver", "NS1.example.net"),
            ("nserver", "ns2.example.net"),
            ("ds-rdata", "12345 8 2 ABCD"),
            ("mnt-by", "EXAMPLE-MNT"),
            ("created", "2020-01-01T00:00:00Z"),
            ("last-modified", "2024-03-01T12:30:00Z"),
            ("source", "RIPE"),
        ])
    }

    fn names(object: &RpslObject) -> Vec<&str> {
        object.attributes().iter().map(|a| a.name.as_str()).collect()
    }

    #[test]
    fn test_attributes_named_lowercases_in_order() {
        let object = domain_object();
        let values: Vec<String> = object.attributes_named("nserver").collect();
        assert_eq!(values, vec!["ns1.example.net", "ns2.example.net"]);
    }

    #[test]
    fn test_attributes_named_absent() {
        let object = domain_object();
        assert_eq!(object.attributes_named("remarks").count(), 0);
    }

    #[test]
    fn test_first_attribute_named() {
        let object = domain_object();
        assert_eq!(
            object.first_attribute_named("nserver").unwrap(),
            "ns1.example.net"
        );
    }

    #[test]
    fn test_first_attribute_named_missing() {
        let object = RpslObject::from_pairs([("nserver", "ns1.example.net")]);
        assert_eq!(
            object.domain_name().unwrap_err(),
            RpslError::MissingAttribute {
                attribute: "domain".to_string()
            }
        );
    }

    #[test]
    fn test_last_modified_parses_utc() {
        let object = domain_object();
        assert_eq!(
            object.last_modified().unwrap(),
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_last_modified_invalid() {
        let object = RpslObject::from_pairs([("last-modified", "yesterday")]);
        assert!(matches!(
            object.last_modified().unwrap_err(),
            RpslError::InvalidTimestamp { .. }
        ));
    }

    #[test]
    fn test_ds_record_set_is_canonical() {
        let object = domain_object();
        let set = object.ds_record_set();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["12345 8 2 abcd"]);
    }

    #[test]
    fn test_remove_attributes_named_keeps_order() {
        let mut object = domain_object();
        object.remove_attributes_named("nserver");

        assert_eq!(
            names(&object),
            vec![
                "domain",
                "descr",
                "admin-c",
                "tech-c",
                "zone-c",
                "ds-rdata",
                "mnt-by",
                "created",
                "last-modified",
                "source"
            ]
        );
    }

    #[test]
    fn test_insert_ds_records_after_last_nserver() {
        let mut object = domain_object();
        object.remove_attributes_named("ds-rdata");
        object.insert_ds_records(["1 13 2 aa", "2 13 2 bb"]);

        let attrs = object.attributes();
        assert_eq!(attrs[5].name, "nserver");
        assert_eq!(attrs[6].name, "nserver");
        assert_eq!(attrs[7], Attribute::new("ds-rdata", "1 13 2 aa"));
        assert_eq!(attrs[8], Attribute::new("ds-rdata", "2 13 2 bb"));
        assert_eq!(attrs[9].name, "mnt-by");
    }

    #[test]
    fn test_insert_ds_records_without_nserver_goes_first() {
        let mut object = RpslObject::from_pairs([("domain", "example.org"), ("mnt-by", "X-MNT")]);
        object.insert_ds_records(["1 13 2 aa"]);

        assert_eq!(names(&object), vec!["ds-rdata", "domain", "mnt-by"]);
    }

    #[test]
    fn test_insert_then_remove_restores_original() {
        let originals = [
            domain_object(),
            RpslObject::from_pairs([("domain", "example.org")]),
            RpslObject::from_pairs([("nserver", "a"), ("remarks", "x"), ("nserver", "b")]),
            RpslObject::default(),
        ];

        for original in originals {
            let mut without_ds = original.clone();
            without_ds.remove_attributes_named("ds-rdata");

            let mut object = without_ds.clone();
            object.insert_ds_records(["1 13 2 aa", "2 13 2 bb", "3 8 1 cc"]);
            object.remove_attributes_named("ds-rdata");

            assert_eq!(object, without_ds);
        }
    }

    #[test]
    fn test_to_rpsl_text_column_layout() {
        let object = RpslObject::from_pairs([("domain", "example.org"), ("ds-rdata", "1 13 2 aa")]);
        let text = object.to_rpsl_text();

        assert_eq!(
            text,
            "domain:             example.org\nds-rdata:           1 13 2 aa\n"
        );
    }

    #[test]
    fn test_to_rpsl_text_long_name_not_truncated() {
        let object = RpslObject::from_pairs([("a-very-long-attribute-name", "v")]);
        assert_eq!(object.to_rpsl_text(), "a-very-long-attribute-name: v\n");
    }

    #[test]
    fn test_prepare_for_submission_strips_server_attributes() {
        let object = domain_object();
        let prepared = object.prepare_for_submission();

        assert!(!names(&prepared).contains(&"created"));
        assert!(!names(&prepared).contains(&"last-modified"));
        assert_eq!(prepared.attributes().len(), object.attributes().len() - 2);
        // Original is untouched
        assert!(names(&object).contains(&"created"));
    }

    #[test]
    fn test_json_round_trip_preserves_unknown_members() {
        let value = json!({
            "type": "domain",
            "link": {"type": "locator", "href": "https://rest.db.ripe.net/ripe/domain/example.org"},
            "source": {"id": "ripe"},
            "primary-key": {"attribute": [{"name": "domain", "value": "example.org"}]},
            "attributes": {
                "attribute": [
                    {"name": "domain", "value": "example.org"},
                    {
                        "name": "mnt-by",
                        "value": "EXAMPLE-MNT",
                        "referenced-type": "mntner",
                        "link": {"type": "locator", "href": "https://rest.db.ripe.net/ripe/mntner/EXAMPLE-MNT"}
                    }
                ]
            }
        });

        let object: RpslObject = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(object.domain_name().unwrap(), "example.org");
        assert_eq!(
            object.attributes()[1].extra["referenced-type"],
            json!("mntner")
        );

        assert_eq!(serde_json::to_value(&object).unwrap(), value);
    }
}
