use std::fs;
use std::path::Path;

use casiob_core::emit::HEADER;
use casiob_core::{
    AnomalyKind, CasiobError, ConvertConfig, Converter, OutputFormat, TypeSystem,
    DEFAULT_ANOMALY_LOG,
};

const Q: &str = "http://www.wikidata.org/entity/";

/// Builds a single-sentence XMI document, whitespace-tokenizing `text`.
///
/// Entities are `(begin, end, element, value, identifier)`; `element` is a
/// prefixed element name such as `ner:NamedEntity`.
fn xmi(text: &str, entities: &[(usize, usize, &str, &str, &str)]) -> String {
    let mut body = String::new();
    let mut id = 10;
    body.push_str(&format!(
        r#"  <seg:Sentence xmi:id="2" sofa="1" begin="0" end="{}"/>"#,
        text.len()
    ));
    body.push('\n');

    let mut offset = 0;
    for word in text.split(' ') {
        body.push_str(&format!(
            r#"  <seg:Token xmi:id="{id}" sofa="1" begin="{offset}" end="{}"/>"#,
            offset + word.len()
        ));
        body.push('\n');
        offset += word.len() + 1;
        id += 1;
    }
    for (begin, end, element, value, identifier) in entities {
        let identifier = if identifier.is_empty() {
            String::new()
        } else {
            format!(r#" identifier="{identifier}""#)
        };
        body.push_str(&format!(
            r#"  <{element} xmi:id="{id}" sofa="1" begin="{begin}" end="{end}" value="{value}"{identifier}/>"#
        ));
        body.push('\n');
        id += 1;
    }

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<xmi:XMI xmlns:xmi="http://www.omg.org/XMI" xmlns:cas="http:///uima/cas.ecore"
    xmlns:seg="http:///de/tudarmstadt/ukp/dkpro/core/api/segmentation/type.ecore"
    xmlns:ner="http:///de/tudarmstadt/ukp/dkpro/core/api/ner/type.ecore"
    xmlns:custom="http:///webanno/custom.ecore" xmi:version="2.0">
  <cas:NULL xmi:id="0"/>
{body}  <cas:Sofa xmi:id="1" sofaNum="1" sofaID="_InitialView" mimeType="text" sofaString="{text}"/>
</xmi:XMI>"#
    )
}

fn berlin_xmi() -> String {
    xmi(
        "Berlin is a city .",
        &[(0, 6, "ner:NamedEntity", "LOC", format!("{Q}Q64").as_str())],
    )
}

/// "Dr. Frank" with the title only annotated as a component.
fn component_only_xmi() -> String {
    xmi(
        "Dr. Frank spricht",
        &[(0, 3, "ner:NamedEntity", "COMP.title", "")],
    )
}

fn write(path: &Path, content: &str) {
    fs::write(path, content).unwrap();
}

#[test]
fn file_mode_writes_exact_tsv() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("berlin.xmi");
    let output = dir.path().join("berlin.tsv");
    write(&input, &berlin_xmi());

    let mut converter = Converter::new(ConvertConfig::new());
    let report = converter.convert_path(&input, &output).unwrap();
    assert!(report.is_success());
    assert_eq!(report.token_count(), 5);

    let expected = format!(
        "{HEADER}\n\
         Berlin\tB-LOC\tB-LOC\tO\tO\tQ64\n\
         is\tO\tO\tO\tO\tO\n\
         a\tO\tO\tO\tO\tO\n\
         city\tO\tO\tO\tO\tO\n\
         .\tO\tO\tO\tO\tO\n"
    );
    assert_eq!(fs::read_to_string(&output).unwrap(), expected);
}

#[test]
fn header_can_be_disabled() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("berlin.xmi");
    let output = dir.path().join("berlin.tsv");
    write(&input, &berlin_xmi());

    let mut converter = Converter::new(ConvertConfig::new().with_header(false));
    converter.convert_file(&input, &output).unwrap();
    let text = fs::read_to_string(&output).unwrap();
    assert!(text.starts_with("Berlin\tB-LOC"));
    assert!(!text.contains("TOKEN"));
}

#[test]
fn nested_and_component_entities_in_one_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("pers.xmi");
    let output = dir.path().join("pers.tsv");
    write(
        &input,
        &xmi(
            "Dr. Anna Weber lacht",
            &[
                (0, 14, "ner:NamedEntity", "PERS.ind", format!("{Q}Q1").as_str()),
                (4, 14, "ner:NamedEntity", "PERS.name", ""),
                (0, 3, "ner:NamedEntity", "COMP.title", ""),
            ],
        ),
    );

    let mut converter = Converter::new(ConvertConfig::new().with_header(false));
    converter.convert_file(&input, &output).unwrap();
    let text = fs::read_to_string(&output).unwrap();
    let rows: Vec<&str> = text.lines().collect();
    assert_eq!(rows[0], "Dr.\tB-PERS\tB-PERS.ind\tCOMP.title\tO\tQ1");
    assert_eq!(rows[1], "Anna\tI-PERS\tI-PERS.ind\tO\tB-PERS.name\tQ1");
    assert_eq!(rows[2], "Weber\tI-PERS\tI-PERS.ind\tO\tI-PERS.name\tQ1");
    assert_eq!(rows[3], "lacht\tO\tO\tO\tO\tO");
}

#[test]
fn batch_isolates_anomalies_per_document() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in");
    let output = dir.path().join("out");
    let log = dir.path().join(DEFAULT_ANOMALY_LOG);
    fs::create_dir(&input).unwrap();
    write(&input.join("a_berlin.xmi"), &berlin_xmi());
    write(&input.join("b_title.xmi"), &component_only_xmi());

    let mut converter = Converter::new(ConvertConfig::new().with_anomaly_log(&log));
    let report = converter.convert_path(&input, &output).unwrap();

    assert!(report.is_success());
    assert_eq!(report.converted.len(), 2);
    assert!(report.converted[0].anomalies.is_empty());
    assert_eq!(report.converted[1].anomalies.len(), 1);
    assert_eq!(report.converted[1].anomalies[0].kind, AnomalyKind::MissingPrimary);

    assert_eq!(
        fs::read_to_string(&log).unwrap(),
        "b_title.xmi\tDr.\t0\t3\n"
    );

    let berlin = fs::read_to_string(output.join("a_berlin.tsv")).unwrap();
    assert_eq!(berlin.lines().count(), 6);
    assert!(berlin.contains("Berlin\tB-LOC\tB-LOC\tO\tO\tQ64\n"));

    let title = fs::read_to_string(output.join("b_title.tsv")).unwrap();
    assert!(title.contains("Dr.\tO\tO\tCOMP.title\tO\tO\n"));
}

#[test]
fn failing_document_does_not_stop_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in");
    let output = dir.path().join("out");
    fs::create_dir(&input).unwrap();
    write(&input.join("a_broken.xmi"), "<xmi:XMI xmlns:xmi=\"http://www.omg.org/XMI\"></xmi:XMI>");
    write(&input.join("b_berlin.xmi"), &berlin_xmi());
    write(&input.join("notes.txt"), "not annotated");

    let mut converter = Converter::new(ConvertConfig::new());
    let report = converter.convert_folder(&input, &output).unwrap();

    assert!(!report.is_success());
    assert_eq!(report.failed.len(), 1);
    assert!(matches!(report.failed[0].error, CasiobError::MissingSofa));
    assert_eq!(report.converted.len(), 1);
    assert!(output.join("b_berlin.tsv").is_file());
    assert!(!output.join("notes.tsv").exists());
}

#[test]
fn folder_mode_writes_jsonl() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in");
    let output = dir.path().join("out");
    fs::create_dir(&input).unwrap();
    write(&input.join("berlin.xmi"), &berlin_xmi());

    let mut converter = Converter::new(ConvertConfig::new().with_format(OutputFormat::Jsonl));
    converter.convert_path(&input, &output).unwrap();

    let text = fs::read_to_string(output.join("berlin.jsonl")).unwrap();
    let record: serde_json::Value = serde_json::from_str(text.trim_end()).unwrap();
    assert_eq!(record["tokens"][0], "Berlin");
    assert_eq!(record["ne_coarse"][0], "B-LOC");
    assert_eq!(record["nel_ids"][0], "Q64");
}

#[test]
fn json_documents_by_pattern() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in");
    let output = dir.path().join("out");
    fs::create_dir(&input).unwrap();
    write(
        &input.join("koeln.json"),
        r#"{
            "text": "Köln liegt am Rhein",
            "sentences": [{"begin": 0, "end": 19}],
            "tokens": [{"begin": 0, "end": 4}, {"begin": 5, "end": 10},
                       {"begin": 11, "end": 13}, {"begin": 14, "end": 19}],
            "entities": [{"begin": 14, "end": 19, "value": "LOC.phys",
                          "identifier": "http://www.wikidata.org/entity/Q584"}]
        }"#,
    );
    write(&input.join("berlin.xmi"), &berlin_xmi());

    let mut converter = Converter::new(ConvertConfig::new().with_pattern("json").with_header(false));
    let report = converter.convert_path(&input, &output).unwrap();
    assert_eq!(report.converted.len(), 1);

    let text = fs::read_to_string(output.join("koeln.tsv")).unwrap();
    assert_eq!(
        text,
        "Köln\tO\tO\tO\tO\tO\n\
         liegt\tO\tO\tO\tO\tO\n\
         am\tO\tO\tO\tO\tO\n\
         Rhein\tB-LOC\tB-LOC.phys\tO\tO\tQ584\n"
    );
}

#[test]
fn typesystem_selects_custom_entity_layers() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("custom.xmi");
    let output = dir.path().join("custom.tsv");
    write(
        &input,
        &xmi(
            "Kaiser Wilhelm regiert",
            &[(0, 14, "custom:Person", "PERS.ind", format!("{Q}Q2677").as_str())],
        ),
    );
    let typesystem = TypeSystem::parse(
        r#"<typeSystemDescription><types><typeDescription>
            <name>webanno.custom.Person</name>
            <supertypeName>de.tudarmstadt.ukp.dkpro.core.api.ner.type.NamedEntity</supertypeName>
        </typeDescription></types></typeSystemDescription>"#,
    )
    .unwrap();

    let mut plain = Converter::new(ConvertConfig::new().with_header(false));
    plain.convert_file(&input, &output).unwrap();
    assert!(fs::read_to_string(&output).unwrap().starts_with("Kaiser\tO\t"));

    let mut typed = Converter::new(
        ConvertConfig::new()
            .with_header(false)
            .with_typesystem(typesystem),
    );
    typed.convert_file(&input, &output).unwrap();
    assert!(fs::read_to_string(&output)
        .unwrap()
        .starts_with("Kaiser\tB-PERS\tB-PERS.ind\tO\tO\tQ2677\nWilhelm\tI-PERS\t"));
}
