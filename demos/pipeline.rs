use ltp::LTPModel;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    //    Set-up model
    let model_directory = std::env::var("LTP_MODEL_DIR").unwrap_or_else(|_| "onnx-small".into());
    let mut ltp = LTPModel::new(model_directory)?;

    //    Define input
    let input = ["他叫汤姆去拿外衣！", "我爱赛尔！"];

    //    Run model
    let output = ltp.predict(&input)?;
    for result in &output {
        println!("{}", serde_json::to_string(result)?);
    }
    println!("{:?}", output[0].entities());
    println!("{:?}", output[0].srl_frames());

    Ok(())
}
