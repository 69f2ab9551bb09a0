use std::process::ExitCode;
use tracing::{error, info, warn};

use traefik_gateway::discovery::DiscoveryFeed;
use traefik_gateway::gateway::{Error, Gateway, GatewayOptions};
use traefik_gateway::logging::init_logging;
use traefik_gateway::publisher;
use traefik_gateway::settings::Settings;

#[tokio::main]
async fn main() -> ExitCode {
    let settings = match Settings::load().await {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("설정 로드 실패: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let _log_guard = match init_logging(&settings.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "게이트웨이 실행 실패");
            ExitCode::FAILURE
        }
    }
}

async fn run(settings: Settings) -> Result<(), Error> {
    let publisher = publisher::from_settings(&settings.publisher)?;
    let options = GatewayOptions::from(&settings.gateway);

    if options.update {
        info!(publisher = %publisher.describe(), "라우팅 설정 반영 활성화");
    } else {
        warn!(debug = settings.gateway.debug, "업데이트 비활성화: 라우팅 설정을 로그로만 출력");
    }

    let (gateway, handle) = Gateway::new(publisher, options);
    let gateway_task = tokio::spawn(gateway.run());

    let events = DiscoveryFeed::from_settings(&settings.discovery).subscribe();
    let forward_task = handle.forward(events);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("종료 신호 수신"),
        _ = forward_task => info!("디스커버리 피드 종료"),
    }

    handle.shutdown().await?;

    let snapshot = gateway_task
        .await
        .map_err(|e| Error::ChannelClosed(format!("게이트웨이 태스크 실패: {}", e)))?;

    info!(
        frontends = snapshot.frontends.len(),
        backends = snapshot.backends.len(),
        "정상 종료"
    );
    Ok(())
}
