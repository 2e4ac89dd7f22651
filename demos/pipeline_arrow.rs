use arrow::array::{ArrayRef, StringArray};
use arrow::util::pretty::pretty_format_batches;
use ltp::{record_batch_to_map, LTPModel};
use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    //    Set-up model
    let model_directory = std::env::var("LTP_MODEL_DIR").unwrap_or_else(|_| "onnx-small".into());
    let mut ltp = LTPModel::new(model_directory)?;

    //    Define input
    let sentences: ArrayRef = Arc::new(StringArray::from(vec![
        "他叫汤姆去拿外衣！",
        "我爱赛尔！",
    ]));

    //    Run model
    let batch = ltp.pipeline_record_batch(sentences)?;
    println!("{}", pretty_format_batches(&[batch.clone()])?);

    for (name, column) in record_batch_to_map(&batch)? {
        println!("{name}: {}", serde_json::to_string(&column)?);
    }

    Ok(())
}
