//! Tests for processing options.

use crate::options::{ExecutionStrategy, OptionsError, ProcessingOptions, Topology};

#[test]
fn test_new_uses_defaults() {
  let options = ProcessingOptions::new(Topology::BranchToBranch);
  assert!(!options.only_matching_paths);
  assert!(options.group_identical_branches);
  assert_eq!(options.execution, ExecutionStrategy::Sequential);
  assert!(options.validate().is_ok());
}

#[test]
fn test_builder_methods() {
  let options = ProcessingOptions::new(Topology::ItemToItem)
    .with_only_matching_paths(true)
    .with_group_identical_branches(false)
    .with_execution(ExecutionStrategy::Concurrent { max_in_flight: 4 });
  assert!(options.only_matching_paths);
  assert!(!options.group_identical_branches);
  assert_eq!(
    options.execution,
    ExecutionStrategy::Concurrent { max_in_flight: 4 }
  );
}

#[test]
fn test_from_json_fills_defaults() {
  let options = ProcessingOptions::from_json(r#"{"topology": "branchFlatten"}"#).unwrap();
  assert_eq!(options, ProcessingOptions::new(Topology::BranchFlatten));
}

#[test]
fn test_from_json_full_document() {
  let json = r#"{
    "topology": "itemGraft",
    "onlyMatchingPaths": true,
    "groupIdenticalBranches": false,
    "execution": { "mode": "concurrent", "maxInFlight": 8 }
  }"#;
  let options = ProcessingOptions::from_json(json).unwrap();
  assert_eq!(options.topology, Topology::ItemGraft);
  assert!(options.only_matching_paths);
  assert!(!options.group_identical_branches);
  assert_eq!(
    options.execution,
    ExecutionStrategy::Concurrent { max_in_flight: 8 }
  );
}

#[test]
fn test_options_serialize_camel_case() {
  let options = ProcessingOptions::new(Topology::ItemToItem);
  let value = serde_json::to_value(&options).unwrap();
  assert_eq!(value["topology"], "itemToItem");
  assert_eq!(value["groupIdenticalBranches"], true);
  assert_eq!(value["execution"]["mode"], "sequential");
}

#[test]
fn test_zero_concurrency_is_rejected() {
  let options = ProcessingOptions::new(Topology::ItemToItem)
    .with_execution(ExecutionStrategy::Concurrent { max_in_flight: 0 });
  assert!(matches!(
    options.validate(),
    Err(OptionsError::InvalidConcurrency)
  ));

  let json = r#"{"topology": "itemToItem", "execution": {"mode": "concurrent", "maxInFlight": 0}}"#;
  assert!(matches!(
    ProcessingOptions::from_json(json),
    Err(OptionsError::InvalidConcurrency)
  ));
}

#[test]
fn test_missing_or_unknown_topology_is_an_error() {
  assert!(matches!(
    ProcessingOptions::from_json("{}"),
    Err(OptionsError::Json(_))
  ));
  assert!(matches!(
    ProcessingOptions::from_json(r#"{"topology": "sideways"}"#),
    Err(OptionsError::Json(_))
  ));
}

#[test]
fn test_item_wise_topologies() {
  assert!(Topology::ItemToItem.is_item_wise());
  assert!(Topology::ItemGraft.is_item_wise());
  assert!(!Topology::BranchFlatten.is_item_wise());
  assert!(!Topology::BranchToBranch.is_item_wise());
}
