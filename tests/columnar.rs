mod common;

use arrow::array::{Array, ArrayRef, Int32Array, ListArray, StringArray};
use common::{chain_model, full_vocab, seg_only_vocab, SENTENCES};
use ltp::{ltp_result_schema, record_batch_to_map, results_from_record_batch, LTPError};
use serde_json::json;
use std::sync::Arc;

fn sentences() -> ArrayRef {
    Arc::new(StringArray::from(SENTENCES.to_vec()))
}

#[test]
fn pipeline_arrow() -> anyhow::Result<()> {
    let (mut ltp, _) = chain_model(full_vocab(), 8)?;

    let arrays = ltp.pipeline_arrow(sentences())?;

    assert_eq!(arrays.len(), 6);
    assert!(arrays.iter().all(|array| array.len() == 2));
    let seg = arrays[0]
        .as_any()
        .downcast_ref::<ListArray>()
        .expect("seg is a list array");
    let second = seg.value(1);
    let second = second
        .as_any()
        .downcast_ref::<StringArray>()
        .expect("words are strings");
    assert_eq!(second.len(), 3);
    assert_eq!(second.value(1), "赛尔");
    Ok(())
}

#[test]
fn record_batch_rows_follow_input() -> anyhow::Result<()> {
    let (mut ltp, _) = chain_model(full_vocab(), 8)?;
    let expected = ltp.predict(&SENTENCES)?;

    let batch = ltp.pipeline_record_batch(sentences())?;

    assert_eq!(batch.schema(), ltp_result_schema());
    assert_eq!(batch.num_rows(), 2);
    assert_eq!(results_from_record_batch(&batch)?, expected);

    let columns = record_batch_to_map(&batch)?;
    let mut keys = columns.keys().cloned().collect::<Vec<String>>();
    keys.sort();
    assert_eq!(keys, vec!["dep", "ner", "pos", "sdp", "seg", "srl"]);
    assert!(columns.values().all(|column| column.len() == 2));
    assert_eq!(columns["seg"][0], json!(["他叫", "汤姆", "去拿", "外衣", "！"]));
    assert_eq!(columns["seg"][1], json!(["我爱", "赛尔", "！"]));
    assert_eq!(columns["dep"][1][0], json!({"arc": 0, "rel": "HED"}));
    Ok(())
}

#[test]
fn missing_tasks_are_null_columns() -> anyhow::Result<()> {
    let (mut ltp, _) = chain_model(seg_only_vocab(), 8)?;

    let batch = ltp.pipeline_record_batch(sentences())?;

    assert_eq!(batch.column(0).null_count(), 0);
    for column in &batch.columns()[1..] {
        assert_eq!(column.null_count(), 2);
    }
    let columns = record_batch_to_map(&batch)?;
    assert_eq!(columns["pos"], vec![json!(null), json!(null)]);
    Ok(())
}

#[test]
fn empty_column() -> anyhow::Result<()> {
    let (mut ltp, calls) = chain_model(full_vocab(), 8)?;

    let batch = ltp.pipeline_record_batch(Arc::new(StringArray::from(Vec::<&str>::new())))?;

    assert_eq!(batch.num_rows(), 0);
    assert_eq!(batch.num_columns(), 6);
    assert!(calls.borrow().is_empty());
    Ok(())
}

#[test]
fn invalid_input_arrays() -> anyhow::Result<()> {
    let (mut ltp, _) = chain_model(full_vocab(), 8)?;

    let with_null: ArrayRef = Arc::new(StringArray::from(vec![Some("我爱赛尔！"), None]));
    let not_strings: ArrayRef = Arc::new(Int32Array::from(vec![1, 2]));

    assert!(matches!(
        ltp.pipeline_arrow(with_null),
        Err(LTPError::ValueError(_))
    ));
    assert!(matches!(
        ltp.pipeline_arrow(not_strings),
        Err(LTPError::ValueError(_))
    ));
    Ok(())
}
