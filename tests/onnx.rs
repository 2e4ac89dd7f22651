#[cfg(feature = "all-tests")]
mod tests {
    extern crate anyhow;

    use ltp::pipelines::vocabs::Task;
    use ltp::{record_batch_to_map, LTPModel};
    use std::path::PathBuf;

    // exported LTP model directory (ltp.onnx, vocab.txt, vocab.json)
    fn model_directory() -> PathBuf {
        std::env::var_os("LTP_MODEL_DIR")
            .map(PathBuf::from)
            .expect("LTP_MODEL_DIR must point to an exported LTP model")
    }

    #[test]
    fn onnx_ltp() -> anyhow::Result<()> {
        let mut ltp = LTPModel::new(model_directory())?;

        let output = ltp.predict(&["他叫汤姆去拿外衣！", "我爱赛尔！"])?;

        assert_eq!(output.len(), 2);
        assert_eq!(output[1].seg.as_ref().map(|seg| seg.concat()), Some("我爱赛尔！".to_string()));
        for result in &output {
            let word_count = result.seg.as_ref().map_or(0, Vec::len);
            if ltp.tasks().contains(&Task::Dep) {
                let dep = result.dep.as_ref().unwrap();
                assert_eq!(dep.len(), word_count);
                assert_eq!(dep.iter().filter(|arc| arc.arc == 0).count(), 1);
            }
        }
        Ok(())
    }

    #[test]
    fn onnx_ltp_record_batch() -> anyhow::Result<()> {
        use arrow::array::{ArrayRef, StringArray};
        use std::sync::Arc;

        let mut ltp = LTPModel::new(model_directory())?;
        let sentences: ArrayRef = Arc::new(StringArray::from(vec![
            "他叫汤姆去拿外衣！",
            "我爱赛尔！",
        ]));

        let columns = record_batch_to_map(&ltp.pipeline_record_batch(sentences)?)?;

        assert_eq!(columns.len(), 6);
        assert!(columns.values().all(|column| column.len() == 2));
        Ok(())
    }
}
