//! Templates loaded from JSON and YAML documents.

use std::io::Write;

use candidate_templates::{
    count_realizations, realize_template, realize_template_with, Node, RealizeOptions,
};
use pretty_assertions::assert_eq;
use serde::Deserialize;
use tempfile::NamedTempFile;

const SWEEP_YAML: &str = r#"
model: resnet
training:
  epochs: 10
  batch_size:
    $candidates: [32, 64]
  optimizer:
    $candidates:
      - { name: sgd, momentum: 0.9 }
      - { name: adam, momentum: 0.0 }
seeds: [1, { $candidates: [2, 3] }]
"#;

#[derive(Debug, Deserialize, PartialEq)]
struct Optimizer {
    name: String,
    momentum: f64,
}

#[derive(Debug, Deserialize, PartialEq)]
struct Training {
    epochs: u32,
    batch_size: u32,
    optimizer: Optimizer,
}

#[derive(Debug, Deserialize, PartialEq)]
struct Sweep {
    model: String,
    training: Training,
    seeds: Vec<i64>,
}

fn write_temp(contents: &str, suffix: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn yaml_template_from_file() {
    let file = write_temp(SWEEP_YAML, ".yaml");
    let source = std::fs::read_to_string(file.path()).unwrap();
    let template = Node::from_yaml_str(&source).unwrap();

    assert_eq!(count_realizations(&template).unwrap(), 8);

    let first = realize_template(&template).next().unwrap();
    let keys: Vec<&str> = first.specification.keys().map(String::as_str).collect();
    assert_eq!(
        keys,
        vec!["training.batch_size", "training.optimizer", "seeds.1"]
    );
}

#[test]
fn realizations_decode_into_typed_structs() {
    let template = Node::from_yaml_str(SWEEP_YAML).unwrap();
    let sweeps: Vec<Sweep> = realize_template(&template)
        .map(|r| r.decode().unwrap())
        .collect();

    assert_eq!(sweeps.len(), 8);
    assert_eq!(
        sweeps[0],
        Sweep {
            model: "resnet".into(),
            training: Training {
                epochs: 10,
                batch_size: 32,
                optimizer: Optimizer {
                    name: "sgd".into(),
                    momentum: 0.9,
                },
            },
            seeds: vec![1, 2],
        }
    );
    assert_eq!(sweeps[7].training.batch_size, 64);
    assert_eq!(sweeps[7].training.optimizer.name, "adam");
    assert_eq!(sweeps[7].seeds, vec![1, 3]);
}

#[test]
fn json_template_matches_yaml_template() {
    let json = r#"{
        "model": "resnet",
        "training": {
            "epochs": 10,
            "batch_size": {"$candidates": [32, 64]},
            "optimizer": {"$candidates": [
                {"name": "sgd", "momentum": 0.9},
                {"name": "adam", "momentum": 0.0}
            ]}
        },
        "seeds": [1, {"$candidates": [2, 3]}]
    }"#;
    let file = write_temp(json, ".json");
    let source = std::fs::read_to_string(file.path()).unwrap();

    let from_json = Node::from_json_str(&source).unwrap();
    let from_yaml = Node::from_yaml_str(SWEEP_YAML).unwrap();
    assert_eq!(from_json, from_yaml);
}

#[test]
fn options_from_yaml_change_keys() {
    let template = Node::from_yaml_str(SWEEP_YAML).unwrap();
    let options = RealizeOptions::from_yaml_str("path_separator: \"/\"\n").unwrap();
    let first = realize_template_with(&template, &options)
        .unwrap()
        .next()
        .unwrap();
    assert!(first.specification.contains_key("training/batch_size"));
    assert!(first.specification.contains_key("seeds/1"));
}

#[test]
fn realization_serializes_as_plain_document() {
    let template = Node::from_yaml_str("a: 1\nb:\n  $candidates: [x, y]\n").unwrap();
    let last = realize_template(&template).last().unwrap();
    assert_eq!(
        serde_json::to_value(&last).unwrap(),
        serde_json::json!({
            "specification": { "b": "y" },
            "realization": { "a": 1, "b": "y" },
        })
    );
}

#[test]
fn template_roundtrips_through_json() {
    let template = Node::from_yaml_str(SWEEP_YAML).unwrap();
    let json = serde_json::to_string(&template).unwrap();
    assert_eq!(Node::from_json_str(&json).unwrap(), template);
}

#[test]
fn empty_candidates_in_document_rejected() {
    let err = Node::from_yaml_str("a:\n  $candidates: []\n").unwrap_err();
    assert_eq!(err.code(), "YAML_ERROR");
    assert!(err.to_string().contains("Empty candidate set"));
}
