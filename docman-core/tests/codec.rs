use chrono::{TimeZone, Utc};

use docman_core::{
    codec::{WireFormat, WireMessage, decode_as, from_entries, to_entries},
    document::{CreateDocumentRequest, DataMap, DocumentDto, UpdateRequest},
};

fn sample() -> DocumentDto {
    let mut dto = DocumentDto::new("doc1")
        .with_data([("k1", "v1"), ("k2", "v2")])
        .with_tags(["alpha", "beta"]);
    dto.created = Some(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());
    dto.last_updated = Some(Utc.with_ymd_and_hms(2024, 5, 2, 8, 30, 0).unwrap());
    dto
}

#[test]
fn entries_round_trip_preserves_map() {
    let data = sample().data;

    assert_eq!(from_entries(to_entries(&data)), data);
}

#[test]
fn document_survives_every_format() {
    let dto = sample();

    for format in WireFormat::ALL {
        let bytes = dto.encode(format).unwrap();
        let decoded = DocumentDto::decode(&bytes, format).unwrap();

        assert_eq!(decoded, dto, "round trip through {format}");
    }
}

#[test]
fn unstamped_document_survives_every_format() {
    let dto = DocumentDto::new("plain").with_data([("only", "one")]).with_tags(["t"]);

    for format in WireFormat::ALL {
        let decoded = DocumentDto::decode(&dto.encode(format).unwrap(), format).unwrap();

        assert_eq!(decoded, dto, "round trip through {format}");
        assert!(decoded.last_updated.is_none());
    }
}

const AWKWARD: [&str; 9] = [
    "  padded  ",
    " lead",
    "trail\t",
    "",
    "   ",
    "a < b & c",
    "<tag/>",
    "line1\nline2",
    "\nwrapped\n",
];

#[test]
fn awkward_strings_survive_every_format() {
    for text in AWKWARD {
        let as_value = DocumentDto::new("d").with_data([("k", text)]);
        let as_key = DocumentDto::new("d").with_data([(text, "v")]);
        let as_tag = DocumentDto::new("d").with_tags([text, "plain"]);

        for format in WireFormat::ALL {
            for dto in [&as_value, &as_key, &as_tag] {
                let decoded = DocumentDto::decode(&dto.encode(format).unwrap(), format).unwrap();

                assert_eq!(&decoded, dto, "{text:?} through {format}");
            }
        }
    }
}

#[test]
fn awkward_update_request_survives_xml() {
    let request = UpdateRequest::new("d")
        .with_data([(" k ", " v ")])
        .with_tags([" t "]);

    let bytes = request.encode(WireFormat::Xml).unwrap();

    assert_eq!(UpdateRequest::decode(&bytes, WireFormat::Xml).unwrap(), request);
}

#[test]
fn indented_xml_keeps_padding_inside_values_only() {
    let xml = "<Document>
    <Id>doc1</Id>
    <Data>
        <Entry>
            <Key>pad</Key>
            <Value>  padded  </Value>
        </Entry>
    </Data>
    <Tags>
        <Tag> t </Tag>
    </Tags>
</Document>";

    let dto = DocumentDto::decode(xml.as_bytes(), WireFormat::Xml).unwrap();

    assert_eq!(dto.id, "doc1");
    assert_eq!(dto.data["pad"], "  padded  ");
    assert!(dto.tags.contains(" t "));
    assert_eq!(dto.tags.len(), 1);
}

#[test]
fn xml_duplicate_entries_collapse_to_last() {
    let xml = "<Document>\
        <Id>doc1</Id>\
        <Data>\
            <Entry><Key>k</Key><Value>first</Value></Entry>\
            <Entry><Key>k</Key><Value>last</Value></Entry>\
        </Data>\
        <Tags><Tag>t</Tag></Tags>\
    </Document>";

    let dto = DocumentDto::decode(xml.as_bytes(), WireFormat::Xml).unwrap();

    assert_eq!(dto.data.len(), 1);
    assert_eq!(dto.data["k"], "last");
    assert!(dto.tags.contains("t"));
}

#[test]
fn json_without_collections_decodes_empty() {
    let dto: DocumentDto = decode_as(br#"{"id":"bare"}"#, "application/json").unwrap();

    assert_eq!(dto.id, "bare");
    assert!(dto.data.is_empty());
    assert!(dto.tags.is_empty());
    assert!(dto.created.is_none());
}

#[test]
fn update_request_distinguishes_absent_from_supplied() {
    let partial = UpdateRequest::new("d1").with_tags(["x"]);

    for format in WireFormat::ALL {
        let decoded = UpdateRequest::decode(&partial.encode(format).unwrap(), format).unwrap();

        assert_eq!(decoded, partial, "round trip through {format}");
        assert!(decoded.new_data.is_none());
    }
}

#[test]
fn json_update_with_empty_data_clears() {
    let request: UpdateRequest =
        serde_json::from_str(r#"{"id":"d1","newData":{}}"#).unwrap();

    assert_eq!(request.new_data, Some(DataMap::new()));
    assert!(request.new_tags.is_none());
}

#[test]
fn create_request_survives_every_format() {
    let request = CreateDocumentRequest {
        id: "c1".into(),
        data: sample().data,
        tags: sample().tags,
    };

    for format in WireFormat::ALL {
        let decoded = CreateDocumentRequest::decode(&request.encode(format).unwrap(), format).unwrap();

        assert_eq!(decoded, request, "round trip through {format}");
    }
}

#[test]
fn garbage_is_unexpected_in_every_format() {
    for format in WireFormat::ALL {
        let err = DocumentDto::decode(&[0xff, 0x00, 0x13], format).unwrap_err();

        assert_eq!(err.kind().status_code(), 500, "decoding garbage as {format}");
    }
}
