use drivesync::core::Orchestrator;
use drivesync::drive::DriveClient;
use drivesync::params::Params;
use drivesync::{logging, outputs};

#[tokio::main]
async fn main() {
    logging::init();

    if let Err(e) = run().await {
        tracing::error!("运行失败: {:#}", e);
        outputs::set_failed(&format!("{:#}", e));
        std::process::exit(1);
    }
}

/// 解析参数、执行对应分支并写出输出
async fn run() -> anyhow::Result<()> {
    let params = Params::from_env()?;
    tracing::info!("操作类型: {}", params.action);

    let client = DriveClient::new(&params.credentials).await?;
    let orchestrator = Orchestrator::new(&client, &params);
    let report = orchestrator.run().await?;

    outputs::report(&report);
    Ok(())
}
